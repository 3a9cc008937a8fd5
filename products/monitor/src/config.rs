use {
    base::{LOGICAL_HEIGHT, LOGICAL_WIDTH, LevelFilter, Vec2},
    com::{Backend, ComError},
    std::path::PathBuf,
};

pub const HOST_VAR: &str = "SENTINEL_HOST";
pub const PORT_VAR: &str = "SENTINEL_PORT";
pub const LOG_DIR_VAR: &str = "SENTINEL_LOG_DIR";
pub const LOG_LEVEL_VAR: &str = "SENTINEL_LOG_LEVEL";

#[derive(Debug, Clone)]
pub struct MonitorConfig {
    backend: Backend,
    log_dir: Option<PathBuf>,
    log_level: LevelFilter,
    window_size: Vec2<usize>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            log_dir: None,
            log_level: LevelFilter::Info,
            window_size: Vec2::new(LOGICAL_WIDTH, LOGICAL_HEIGHT),
        }
    }
}

impl MonitorConfig {
    /// Resolve from the process arguments and environment.
    pub fn from_env() -> Result<Self, ComError> {
        let arg = std::env::args().nth(1);
        Self::resolve(arg.as_deref(), |name| std::env::var(name).ok())
    }

    /// A `host[:port]` argument wins over `SENTINEL_HOST`/`SENTINEL_PORT`.
    pub fn resolve(
        arg: Option<&str>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ComError> {
        let mut config = Self::default();

        let backend = match arg {
            Some(arg) => Backend::parse(arg)?,
            None => {
                let host = env(HOST_VAR).unwrap_or_else(|| config.backend.host().to_string());
                match env(PORT_VAR) {
                    Some(port) => {
                        let port = port.trim().parse().map_err(|_| {
                            ComError::InvalidEndpoint(format!("bad {PORT_VAR} value {port:?}"))
                        })?;
                        Backend::new(host, port)
                    }
                    None => Backend::new(host, config.backend.port()),
                }
            }
        };
        config.backend = backend;

        config.log_dir = env(LOG_DIR_VAR)
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from);
        if let Some(level) = env(LOG_LEVEL_VAR) {
            match base::parse_level(&level) {
                Some(level) => config.log_level = level,
                None => eprintln!("ignoring unknown {LOG_LEVEL_VAR} value {level:?}"),
            }
        }
        Ok(config)
    }

    pub fn with_backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.log_dir = Some(dir.into());
        self
    }

    pub fn with_log_level(mut self, level: LevelFilter) -> Self {
        self.log_level = level;
        self
    }

    pub fn with_window_size(mut self, size: Vec2<usize>) -> Self {
        self.window_size = size;
        self
    }

    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    pub fn log_dir(&self) -> Option<&PathBuf> {
        self.log_dir.as_ref()
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn window_size(&self) -> Vec2<usize> {
        self.window_size
    }
}
