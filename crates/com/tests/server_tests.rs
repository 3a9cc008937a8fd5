mod common;

use {
    com::{ClientConfig, TelemetryClient, TelemetryServer},
    common::*,
    tokio::time::{Duration, sleep},
};

#[tokio::test]
async fn test_bind_starts_empty() {
    let server = TelemetryServer::bind("127.0.0.1:0")
        .await
        .expect("bind failed");
    assert_eq!(server.client_count().await, 0);
    assert_eq!(server.accepted(), 0);
}

#[tokio::test]
async fn test_broadcast_reaches_every_client() {
    let server = TelemetryServer::bind("127.0.0.1:0")
        .await
        .expect("bind failed");
    let a = TelemetryClient::connect(ws_uri(server.local_addr()), ClientConfig::default());
    let b = TelemetryClient::connect(ws_uri(server.local_addr()), ClientConfig::default());
    let mut a_events = a.subscribe();
    let mut b_events = b.subscribe();
    wait_for_open(&mut a_events).await;
    wait_for_open(&mut b_events).await;
    wait_for_clients(&server, 2).await;

    server.send_snapshot(&snapshot(7.0)).await.expect("send failed");
    sleep(Duration::from_millis(100)).await;

    assert_eq!(a.latest().expect("a").fps, 7.0);
    assert_eq!(b.latest().expect("b").fps, 7.0);
}
