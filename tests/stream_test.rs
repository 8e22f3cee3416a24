//! Integration tests for the streaming route.

mod common;

use common::{pattern, TestHarness};
use vlib::config::Config;

async fn setup(name: &str, data: &[u8]) -> (TestHarness, String, String) {
    let (h, addr) = TestHarness::with_server().await;
    h.write_file(name, data);
    h.scan().await;
    let url = format!("http://{addr}/api/videos/{}/stream", h.entry(name).id);
    (h, addr.to_string(), url)
}

async fn get_range(url: &str, range: &str) -> reqwest::Response {
    reqwest::Client::new()
        .get(url)
        .header("Range", range)
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn stream_serves_full_file() {
    let data = pattern(5000);
    let (_h, _, url) = setup("clip.mp4", &data).await;

    let resp = reqwest::get(&url).await.unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.headers()["content-type"], "video/mp4");
    assert_eq!(resp.headers()["accept-ranges"], "bytes");
    assert_eq!(resp.headers()["content-length"], "5000");
    assert!(resp.headers().get("content-range").is_none());

    let body = resp.bytes().await.unwrap();
    assert_eq!(body.as_ref(), data.as_slice());
}

#[tokio::test]
async fn stream_range_request() {
    let data = pattern(2048);
    let (_h, _, url) = setup("range.mp4", &data).await;

    let resp = get_range(&url, "bytes=100-199").await;
    assert_eq!(resp.status(), 206);
    assert_eq!(resp.headers()["content-range"], "bytes 100-199/2048");
    assert_eq!(resp.headers()["content-length"], "100");
    assert_eq!(resp.headers()["accept-ranges"], "bytes");

    let body = resp.bytes().await.unwrap();
    assert_eq!(body.as_ref(), &data[100..200]);
}

#[tokio::test]
async fn stream_open_ended_and_suffix_ranges() {
    let data = pattern(1000);
    let (_h, _, url) = setup("open.mkv", &data).await;

    let resp = get_range(&url, "bytes=900-").await;
    assert_eq!(resp.status(), 206);
    assert_eq!(resp.headers()["content-range"], "bytes 900-999/1000");
    assert_eq!(resp.bytes().await.unwrap().as_ref(), &data[900..]);

    let resp = get_range(&url, "bytes=-10").await;
    assert_eq!(resp.status(), 206);
    assert_eq!(resp.headers()["content-range"], "bytes 990-999/1000");
    assert_eq!(resp.bytes().await.unwrap().as_ref(), &data[990..]);
}

#[tokio::test]
async fn stream_clamps_end_to_file_size() {
    let data = pattern(1000);
    let (_h, _, url) = setup("clamp.mp4", &data).await;

    let resp = get_range(&url, "bytes=500-999999").await;
    assert_eq!(resp.status(), 206);
    assert_eq!(resp.headers()["content-range"], "bytes 500-999/1000");
    assert_eq!(resp.headers()["content-length"], "500");
    assert_eq!(resp.bytes().await.unwrap().len(), 500);
}

#[tokio::test]
async fn stream_last_byte() {
    let data = pattern(1000);
    let (_h, _, url) = setup("last.mp4", &data).await;

    let resp = get_range(&url, "bytes=999-999").await;
    assert_eq!(resp.status(), 206);
    assert_eq!(resp.bytes().await.unwrap().as_ref(), &data[999..]);
}

#[tokio::test]
async fn stream_unsatisfiable_range_is_416() {
    let (_h, _, url) = setup("short.mp4", &pattern(1000)).await;

    for range in ["bytes=1000-", "bytes=5000-6000", "bytes=600-500"] {
        let resp = get_range(&url, range).await;
        assert_eq!(resp.status(), 416, "range {range}");
        assert_eq!(resp.headers()["content-range"], "bytes */1000");
        assert!(resp.bytes().await.unwrap().is_empty());
    }
}

#[tokio::test]
async fn stream_malformed_range_is_416() {
    let (_h, _, url) = setup("bad.mp4", &pattern(100)).await;

    for range in ["bytes=abc-def", "bytes=-", "pages=0-1", "garbage"] {
        let resp = get_range(&url, range).await;
        assert_eq!(resp.status(), 416, "range {range}");
        assert!(resp.bytes().await.unwrap().is_empty());
    }
}

#[tokio::test]
async fn stream_multi_range_uses_first() {
    let data = pattern(1000);
    let (_h, _, url) = setup("multi.mp4", &data).await;

    let resp = get_range(&url, "bytes=0-9,100-109").await;
    assert_eq!(resp.status(), 206);
    assert_eq!(resp.headers()["content-range"], "bytes 0-9/1000");
    assert_eq!(resp.bytes().await.unwrap().as_ref(), &data[..10]);
}

#[tokio::test]
async fn stream_unknown_id_is_404() {
    let (_h, addr) = TestHarness::with_server().await;

    let resp = reqwest::get(format!(
        "http://{addr}/api/videos/{}/stream",
        vlib_common::EntryId::new()
    ))
    .await
    .unwrap();
    assert_eq!(resp.status(), 404);

    let resp = reqwest::get(format!("http://{addr}/api/videos/not-an-id/stream"))
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn stream_file_deleted_after_scan_is_404() {
    let (h, _, url) = setup("gone.mp4", &pattern(10)).await;
    h.remove_file("gone.mp4");

    let resp = reqwest::get(&url).await.unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn stream_uses_size_on_disk() {
    let (h, _, url) = setup("grow.mp4", &pattern(100)).await;
    let data = pattern(300);
    h.write_file("grow.mp4", &data);

    let resp = reqwest::get(&url).await.unwrap();
    assert_eq!(resp.headers()["content-length"], "300");
    assert_eq!(resp.bytes().await.unwrap().as_ref(), data.as_slice());
}

#[tokio::test]
async fn stream_first_mebibyte_of_ten() {
    let data = pattern(10 * 1024 * 1024);
    let (_h, _, url) = setup("movie.mp4", &data).await;

    let resp = get_range(&url, "bytes=0-1048575").await;
    assert_eq!(resp.status(), 206);
    assert_eq!(resp.headers()["content-range"], "bytes 0-1048575/10485760");
    assert_eq!(resp.headers()["content-length"], "1048576");

    let body = resp.bytes().await.unwrap();
    assert_eq!(body.len(), 1024 * 1024);
    assert_eq!(body.as_ref(), &data[..1024 * 1024]);
}

#[tokio::test]
async fn stream_content_types() {
    let mut config = Config::default();
    config.library.extensions = vec!["mp4".into(), "mkv".into(), "webm".into(), "xyz".into()];
    let h = TestHarness::with_config(config);
    let addr = h.serve().await;

    for name in ["a.mp4", "b.mkv", "c.webm", "d.xyz"] {
        h.write_file(name, b"0123456789");
    }
    h.scan().await;

    for (name, expected) in [
        ("a.mp4", "video/mp4"),
        ("b.mkv", "video/x-matroska"),
        ("c.webm", "video/webm"),
        ("d.xyz", "application/octet-stream"),
    ] {
        let url = format!("http://{addr}/api/videos/{}/stream", h.entry(name).id);
        let resp = reqwest::get(url).await.unwrap();
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.headers()["content-type"], expected, "{name}");
    }
}

#[tokio::test]
async fn stream_small_chunks_match_declared_length() {
    let mut config = Config::default();
    config.streaming.chunk_size = 7;
    let h = TestHarness::with_config(config);
    let addr = h.serve().await;

    let data = pattern(1000);
    h.write_file("chunky.mp4", &data);
    h.scan().await;
    let url = format!("http://{addr}/api/videos/{}/stream", h.entry("chunky.mp4").id);

    let resp = get_range(&url, "bytes=3-503").await;
    assert_eq!(resp.headers()["content-length"], "501");
    assert_eq!(resp.bytes().await.unwrap().as_ref(), &data[3..504]);
}

#[cfg(target_os = "linux")]
#[tokio::test]
async fn client_disconnect_mid_body_releases_file() {
    use std::time::Duration;

    let mut config = Config::default();
    config.streaming.chunk_size = 64 * 1024;
    let h = TestHarness::with_config(config);
    let addr = h.serve().await;

    let data = pattern(16 * 1024 * 1024);
    let path = h.write_file("long.mp4", &data);
    h.scan().await;
    let url = format!("http://{addr}/api/videos/{}/stream", h.entry("long.mp4").id);

    let client = reqwest::Client::new();
    let mut resp = client.get(&url).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    let first = resp.chunk().await.unwrap().unwrap();
    assert!(!first.is_empty());
    assert_eq!(first.as_ref(), &data[..first.len()]);
    assert_eq!(common::open_handles(&path), 1);

    drop(resp);
    drop(client);
    assert!(common::handles_released(&path, Duration::from_secs(5)).await);

    let resp = get_range(&url, "bytes=1000-1999").await;
    assert_eq!(resp.status(), 206);
    assert_eq!(resp.bytes().await.unwrap().as_ref(), &data[1000..2000]);

    let resp = reqwest::get(&url).await.unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.bytes().await.unwrap().len(), data.len());
    assert!(common::handles_released(&path, Duration::from_secs(5)).await);
}
