mod common;

use {
    com::{ComError, MjpegReader},
    common::*,
};

fn part(body: &[u8]) -> Vec<u8> {
    let mut out = b"--frame\r\nContent-Type: image/jpeg\r\n\r\n".to_vec();
    out.extend_from_slice(body);
    out.extend_from_slice(b"\r\n");
    out
}

#[tokio::test]
async fn test_reader_yields_frames_then_closes() {
    let mut response = b"HTTP/1.1 200 OK\r\nContent-Type: multipart/x-mixed-replace; boundary=frame\r\nConnection: close\r\n\r\n".to_vec();
    response.extend(part(&[0xff, 0xd8, 1, 0xff, 0xd9]));
    response.extend(part(&[0xff, 0xd8, 2, 2, 0xff, 0xd9]));
    let responder = HttpResponder::raw(response).await;

    let http = reqwest::Client::new();
    let url = responder.backend().video_feed_url();
    let mut reader = MjpegReader::open(&http, &url).await.expect("open");

    assert_eq!(reader.next_frame().await.expect("frame"), vec![0xff, 0xd8, 1, 0xff, 0xd9]);
    assert_eq!(
        reader.next_frame().await.expect("frame"),
        vec![0xff, 0xd8, 2, 2, 0xff, 0xd9]
    );
    assert!(matches!(
        reader.next_frame().await,
        Err(ComError::ConnectionClosed)
    ));
    assert_eq!(responder.requests().await[0].path, "/video_feed");
}

#[tokio::test]
async fn test_reader_reports_status() {
    let responder = HttpResponder::json(404, "{}").await;
    let http = reqwest::Client::new();
    let url = responder.backend().video_feed_url();
    assert!(matches!(
        MjpegReader::open(&http, &url).await,
        Err(ComError::Status(404))
    ));
}
