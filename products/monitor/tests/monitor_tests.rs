use {
    base::{LevelFilter, Vec2},
    com::{Backend, CommandChannel, CommandConfig, Controls},
    image::Surface,
    monitor::*,
    overlay::Style,
    std::{collections::HashMap, net::SocketAddr, sync::Arc},
    telemetry::{BoundingBox, Detection, TelemetrySnapshot},
    tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::{TcpListener, TcpStream},
        time::{Duration, timeout},
    },
};

const BOX_BLUE: [u8; 3] = [0x60, 0xa5, 0xfa];

fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |name| vars.get(name).cloned()
}

fn snapshot_with_box() -> TelemetrySnapshot {
    TelemetrySnapshot {
        detections: vec![Detection::new(
            1,
            BoundingBox::new(100.0, 100.0, 300.0, 300.0),
            0.8,
        )],
        ..TelemetrySnapshot::default()
    }
}

/// Answers every request with `status` and a JSON `body`.
async fn responder(status: u16, body: &'static str) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind failed");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            read_request(&mut stream).await;
            let response = format!(
                "HTTP/1.1 {} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).await.ok();
            stream.shutdown().await.ok();
        }
    });
    addr
}

/// Read one request, body included, so closing the socket does not reset it.
async fn read_request(stream: &mut TcpStream) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let header_end = loop {
        match stream.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };
    let head = String::from_utf8_lossy(&buf[..header_end]).to_lowercase();
    let content_length = head
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|value| value.trim().parse::<usize>().ok())
        .unwrap_or(0);
    while buf.len() < header_end + content_length {
        match stream.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }
}

/// Accepts connections and never answers them.
async fn stalled_backend() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind failed");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((stream, _)) = listener.accept().await {
            held.push(stream);
        }
    });
    addr
}

async fn controls_for(addr: SocketAddr) -> ControlsHandle {
    let channel = CommandChannel::new(Backend::from_addr(addr), CommandConfig::default())
        .expect("channel");
    ControlsHandle::spawn(Controls::new(channel))
}

async fn next_outcome(handle: &mut ControlsHandle) -> ControlOutcome {
    timeout(Duration::from_secs(5), handle.outcome())
        .await
        .expect("outcome timed out")
        .expect("controls task gone")
}

#[test]
fn test_config_defaults() {
    let config = MonitorConfig::resolve(None, env(&[])).expect("config");
    assert_eq!(config.backend(), &Backend::new("localhost", 8000));
    assert_eq!(config.log_level(), LevelFilter::Info);
    assert!(config.log_dir().is_none());
    assert_eq!(config.window_size(), Vec2::new(1280, 720));
}

#[test]
fn test_config_from_environment() {
    let config = MonitorConfig::resolve(
        None,
        env(&[
            ("SENTINEL_HOST", "10.0.0.7"),
            ("SENTINEL_PORT", "9000"),
            ("SENTINEL_LOG_LEVEL", "debug"),
            ("SENTINEL_LOG_DIR", "/tmp/sentinel"),
        ]),
    )
    .expect("config");
    assert_eq!(config.backend(), &Backend::new("10.0.0.7", 9000));
    assert_eq!(config.log_level(), LevelFilter::Debug);
    assert_eq!(
        config.log_dir().map(|d| d.to_string_lossy().to_string()),
        Some("/tmp/sentinel".to_string())
    );
}

#[test]
fn test_config_argument_wins() {
    let config = MonitorConfig::resolve(
        Some("backend.local:8100"),
        env(&[("SENTINEL_HOST", "10.0.0.7")]),
    )
    .expect("config");
    assert_eq!(config.backend(), &Backend::new("backend.local", 8100));
}

#[test]
fn test_config_rejects_bad_port() {
    assert!(MonitorConfig::resolve(None, env(&[("SENTINEL_PORT", "eighty")])).is_err());
}

#[test]
fn test_compose_frame_with_overlay() {
    let mut frame = Surface::new(Vec2::new(1280, 720));
    frame.fill([10, 10, 10]);
    let mut canvas = Surface::new(Vec2::new(1280, 720));
    let snapshot = snapshot_with_box();

    compose(
        &mut canvas,
        Video::Frame(&frame),
        Some(&snapshot),
        &Style::default(),
    );

    assert_eq!(canvas.pixel(100, 100), Some(BOX_BLUE));
    assert_eq!(canvas.pixel(200, 200), Some([10, 10, 10]));
}

#[test]
fn test_compose_fault_suppresses_overlay() {
    let frame = Surface::new(Vec2::new(1280, 720));
    let mut canvas = Surface::new(Vec2::new(1280, 720));
    let snapshot = snapshot_with_box();

    compose(
        &mut canvas,
        Video::Fault("CAMERA_ERROR: device busy"),
        Some(&snapshot),
        &Style::default(),
    );
    let blue = canvas
        .as_rgb()
        .chunks_exact(3)
        .filter(|p| *p == BOX_BLUE)
        .count();
    assert_eq!(blue, 0);

    compose(
        &mut canvas,
        Video::Frame(&frame),
        Some(&snapshot),
        &Style::default(),
    );
    assert_eq!(canvas.pixel(100, 100), Some(BOX_BLUE));
}

#[tokio::test]
async fn test_controls_commit_on_success() {
    let addr = responder(200, "{}").await;
    let mut controls = controls_for(addr).await;

    assert!(controls.request(ControlRequest::ToggleCamera));
    match next_outcome(&mut controls).await {
        ControlOutcome::Committed(state) => assert!(state.camera_active),
        other => panic!("expected commit, got {:?}", other),
    }

    assert!(controls.request(ControlRequest::StepThreshold(THRESHOLD_STEP)));
    match next_outcome(&mut controls).await {
        ControlOutcome::Committed(state) => {
            assert!((state.settings.confidence_threshold - 0.45).abs() < 1e-6)
        }
        other => panic!("expected commit, got {:?}", other),
    }
}

#[tokio::test]
async fn test_controls_alert_on_failure() {
    let addr = responder(500, r#"{"detail": "boom"}"#).await;
    let mut controls = controls_for(addr).await;

    controls.request(ControlRequest::ToggleDrawOnServer);
    match next_outcome(&mut controls).await {
        ControlOutcome::Alert(message) => assert!(message.contains("500"), "{}", message),
        other => panic!("expected alert, got {:?}", other),
    }
}

#[tokio::test]
async fn test_controls_report_analytics() {
    let addr = responder(
        200,
        r#"{"total_incidents": 7, "danger_count": 2, "warning_count": 3, "activity_trend": [1, 2]}"#,
    )
    .await;
    let mut controls = controls_for(addr).await;

    controls.request(ControlRequest::FetchAnalytics);
    assert_eq!(
        next_outcome(&mut controls).await,
        ControlOutcome::Report("analytics: 7 incidents, 2 danger, 3 warning".to_string())
    );
}

#[tokio::test]
async fn test_observed_snapshot_sets_camera_state() {
    let addr = responder(200, "{}").await;
    let mut controls = controls_for(addr).await;

    controls.observe(Arc::new(TelemetrySnapshot {
        camera_active: true,
        ..TelemetrySnapshot::default()
    }));
    assert!(controls.request(ControlRequest::ToggleCamera));
    match next_outcome(&mut controls).await {
        ControlOutcome::Committed(state) => assert!(!state.camera_active),
        other => panic!("expected commit, got {:?}", other),
    }
}

#[tokio::test]
async fn test_snapshots_do_not_crowd_out_commands() {
    let addr = stalled_backend().await;
    let controls = controls_for(addr).await;

    assert!(controls.request(ControlRequest::ToggleCamera));
    let snapshot = Arc::new(snapshot_with_box());
    for _ in 0..100 {
        controls.observe(snapshot.clone());
    }
    assert!(controls.request(ControlRequest::StepThreshold(THRESHOLD_STEP)));
    assert!(controls.request(ControlRequest::FetchHistory));
}
