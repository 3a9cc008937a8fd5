use {
    com::{ClientConfig, CommandChannel, CommandConfig, Controls, TelemetryClient},
    image::{CurrentFrame, FrameSource, FrameSourceConfig, Surface},
    minifb::{Key, KeyRepeat, Window, WindowOptions},
    monitor::*,
    overlay::Style,
    tokio::time::Instant,
};

const TARGET_FPS: usize = 30;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = MonitorConfig::from_env()?;
    match config.log_dir() {
        Some(dir) => base::init_file_logger(dir, config.log_level())?,
        None => base::init_stdout_logger(config.log_level()),
    }

    let backend = config.backend().clone();
    let size = config.window_size();
    log::info!("sentinel monitor, backend {}:{}", backend.host(), backend.port());

    let client = TelemetryClient::connect(backend.telemetry_uri()?, ClientConfig::default());
    let mut snapshots = client.snapshots();

    let channel = CommandChannel::new(backend.clone(), CommandConfig::default())?;
    let http = channel.http().clone();
    let mut controls = ControlsHandle::spawn(Controls::new(channel));

    let mut source = FrameSource::new(
        FrameSourceConfig::default()
            .with_pull_url(backend.video_feed_url())
            .with_target(size),
    );
    let mut presenter: Option<PullPresenter> = None;

    let mut window = Window::new(
        "SENTINEL - ESC to exit",
        size.x,
        size.y,
        WindowOptions::default(),
    )?;
    window.set_target_fps(TARGET_FPS);

    let style = Style::default();
    let mut canvas = Surface::new(size);
    let mut hud = Hud::new(Instant::now());
    let mut current = None;

    while window.is_open() && !window.is_key_down(Key::Escape) {
        if snapshots.has_changed().unwrap_or(false) {
            current = snapshots.borrow_and_update().clone();
            if let Some(snapshot) = &current {
                source.apply(snapshot);
                controls.observe(snapshot.clone());
            }
        }
        let state = client.state();
        hud.observe(state);

        for key in window.get_keys_pressed(KeyRepeat::No) {
            if let Some(request) = key_request(key) {
                controls.request(request);
            }
        }
        while let Some(outcome) = controls.try_outcome() {
            match outcome {
                ControlOutcome::Committed(state) => log::info!(
                    "camera {}, threshold {:.2}, server drawing {}",
                    if state.camera_active { "on" } else { "off" },
                    state.settings.confidence_threshold,
                    state.settings.draw_on_server
                ),
                ControlOutcome::Alert(message) => hud.alert(message, Instant::now()),
                ControlOutcome::Report(report) => log::info!("{}", report),
            }
        }

        let snapshot = current.as_deref();
        match source.current_frame() {
            CurrentFrame::Fault(status) => {
                presenter = None;
                compose(&mut canvas, Video::Fault(&status), snapshot, &style);
            }
            CurrentFrame::Pull(url) => {
                if presenter.as_ref().is_none_or(|p| p.url() != url) {
                    presenter = Some(PullPresenter::start(http.clone(), url, size));
                }
                match presenter.as_ref().and_then(PullPresenter::latest) {
                    Some(frame) => compose(&mut canvas, Video::Frame(&frame), snapshot, &style),
                    None => compose(&mut canvas, Video::Standby, snapshot, &style),
                }
            }
            CurrentFrame::Surface(surface) => {
                presenter = None;
                surface.read(|frame| compose(&mut canvas, Video::Frame(frame), snapshot, &style));
            }
            CurrentFrame::None => {
                presenter = None;
                compose(&mut canvas, Video::Standby, snapshot, &style);
            }
        }

        window.set_title(&hud.title(snapshot, state, Instant::now()));
        window.update_with_buffer(&canvas.to_argb(), size.x, size.y)?;
        tokio::task::yield_now().await;
    }

    log::info!("shutting down");
    drop(presenter);
    source.close();
    client.close();
    Ok(())
}
