//! Loggers for the `log` facade.
//!
//! Every crate in the workspace logs through `log::info!` and friends. A
//! binary installs one of the loggers here at startup; libraries never do.

use ::log::{Log, Metadata, Record};
use {
    anyhow::{Result, anyhow},
    std::{
        fs::{File, OpenOptions, create_dir_all},
        io::Write,
        path::PathBuf,
        sync::Mutex,
        time::{SystemTime, UNIX_EPOCH},
    },
};

pub use ::log::{Level, LevelFilter};

/// Writes one line per record to stdout.
pub struct StdoutLogger {
    max_level: LevelFilter,
}

impl StdoutLogger {
    pub fn new(max_level: LevelFilter) -> Self {
        Self { max_level }
    }
}

impl Log for StdoutLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.max_level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            println!("{}", format_record(record));
        }
    }

    fn flush(&self) {
        std::io::stdout().flush().ok();
    }
}

struct DailyFile {
    dir: PathBuf,
    date: String,
    file: File,
}

impl DailyFile {
    fn open(dir: PathBuf, date: String) -> std::io::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(dir.join(format!("{date}.log")))?;
        Ok(Self { dir, date, file })
    }
}

/// Appends records to `<dir>/<YYYY-MM-DD>.log`, switching files at midnight UTC.
pub struct FileLogger {
    max_level: LevelFilter,
    current: Mutex<DailyFile>,
}

impl FileLogger {
    pub fn new(dir: impl Into<PathBuf>, max_level: LevelFilter) -> Result<Self> {
        let dir = dir.into();
        create_dir_all(&dir)?;
        let current = DailyFile::open(dir, format_today())?;
        Ok(Self {
            max_level,
            current: Mutex::new(current),
        })
    }
}

impl Log for FileLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.max_level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        let today = format_today();
        if today != current.date {
            match DailyFile::open(current.dir.clone(), today) {
                Ok(next) => *current = next,
                Err(error) => eprintln!("log rollover failed in {:?}: {}", current.dir, error),
            }
        }
        let line = format!("{}\n", format_record(record));
        if let Err(error) = current.file.write_all(line.as_bytes()) {
            eprintln!("log write failed: {}", error);
            eprint!("{}", line);
        }
    }

    fn flush(&self) {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        current.file.flush().ok();
    }
}

/// Parse a level name such as `info` or `WARN`. `off` disables logging.
pub fn parse_level(name: &str) -> Option<LevelFilter> {
    name.trim().parse().ok()
}

pub fn init_stdout_logger(max_level: LevelFilter) {
    install(Box::new(StdoutLogger::new(max_level)), max_level);
}

pub fn init_file_logger(dir: impl Into<PathBuf>, max_level: LevelFilter) -> Result<()> {
    let logger = FileLogger::new(dir, max_level)?;
    ::log::set_boxed_logger(Box::new(logger)).map_err(|e| anyhow!("logger already set: {e}"))?;
    ::log::set_max_level(max_level);
    Ok(())
}

fn install(logger: Box<dyn Log>, max_level: LevelFilter) {
    // A second init keeps the first logger; tests call this repeatedly.
    if ::log::set_boxed_logger(logger).is_ok() {
        ::log::set_max_level(max_level);
    }
}

fn format_record(record: &Record) -> String {
    format!(
        "{} {:<5} {}:{} - {}",
        format_timestamp(),
        record.level(),
        record.file().unwrap_or(record.target()),
        record.line().unwrap_or(0),
        record.args()
    )
}

fn unix_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Current UTC time as `YYYY-MM-DDTHH:MM:SS`.
pub fn format_timestamp() -> String {
    let secs = unix_secs();
    let (year, month, day) = civil_from_days((secs / 86400) as i64);
    let time_of_day = secs % 86400;
    format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}",
        year,
        month,
        day,
        time_of_day / 3600,
        (time_of_day % 3600) / 60,
        time_of_day % 60
    )
}

/// Current UTC date as `YYYY-MM-DD`.
pub fn format_today() -> String {
    let (year, month, day) = civil_from_days((unix_secs() / 86400) as i64);
    format!("{:04}-{:02}-{:02}", year, month, day)
}

// Howard Hinnant's days-to-civil conversion.
fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719468;
    let era = if z >= 0 { z } else { z - 146096 } / 146097;
    let doe = (z - era * 146097) as u32;
    let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = doy - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = yoe as i64 + era * 400 + if month <= 2 { 1 } else { 0 };
    (year, month, day)
}
