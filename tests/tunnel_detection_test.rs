use anyhow::Result;
use httpmock::prelude::*;
use live_poll::adapters::tunnel::{TunnelDetector, TunnelState};
use live_poll::{PollServer, ServerConfig};
use serde_json::json;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::{sleep, timeout};

fn ngrok_payload(tunnels: serde_json::Value) -> serde_json::Value {
    json!({ "tunnels": tunnels, "uri": "/api/tunnels" })
}

#[tokio::test]
async fn test_detects_https_tunnel() {
    let server = MockServer::start_async().await;
    let api_mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/api/tunnels");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(ngrok_payload(json!([
                    {"name": "command_line (http)", "proto": "http", "public_url": "http://abc.ngrok.io"},
                    {"name": "command_line", "proto": "https", "public_url": "https://abc.ngrok.io"}
                ])));
        })
        .await;

    let state = TunnelState::new();
    let detector = TunnelDetector::new(server.url("/api/tunnels"), state.clone());

    assert_eq!(detector.poll().await.as_deref(), Some("https://abc.ngrok.io"));
    assert_eq!(state.current().as_deref(), Some("https://abc.ngrok.io"));
    api_mock.assert_async().await;
}

#[tokio::test]
async fn test_failures_leave_state_unchanged() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/http-only");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(ngrok_payload(json!([
                    {"proto": "http", "public_url": "http://abc.ngrok.io"}
                ])));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/garbage");
            then.status(200).body("<html>not the agent</html>");
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/broken");
            then.status(502);
        })
        .await;

    let state = TunnelState::new();
    state.set("https://earlier.ngrok.io".to_string());

    for path in ["/http-only", "/garbage", "/broken", "/not-mocked"] {
        let detector = TunnelDetector::new(server.url(path), state.clone());
        assert_eq!(detector.poll().await, None, "path: {}", path);
        assert_eq!(
            state.current().as_deref(),
            Some("https://earlier.ngrok.io"),
            "path: {}",
            path
        );
    }
}

#[tokio::test]
async fn test_background_polling_picks_up_late_tunnel() -> Result<()> {
    let server = MockServer::start_async().await;
    let state = TunnelState::new();

    let task = TunnelDetector::new(server.url("/api/tunnels"), state.clone())
        .spawn(Duration::from_millis(50));

    // agent has nothing to offer yet
    sleep(Duration::from_millis(150)).await;
    assert_eq!(state.current(), None);

    let api_mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/api/tunnels");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(ngrok_payload(json!([
                    {"proto": "https", "public_url": "https://late.ngrok.io"}
                ])));
        })
        .await;

    timeout(Duration::from_secs(5), async {
        while state.current().is_none() {
            sleep(Duration::from_millis(20)).await;
        }
    })
    .await?;

    assert_eq!(state.current().as_deref(), Some("https://late.ngrok.io"));
    assert!(api_mock.hits_async().await >= 1);

    task.abort();
    Ok(())
}

#[tokio::test]
async fn test_vote_url_switches_to_tunnel() -> Result<()> {
    let agent = MockServer::start_async().await;
    agent
        .mock_async(|when, then| {
            when.method(GET).path("/api/tunnels");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(ngrok_payload(json!([
                    {"proto": "https", "public_url": "https://poll.ngrok.io"}
                ])));
        })
        .await;

    let config = ServerConfig {
        port: 0,
        host: "127.0.0.1".to_string(),
        tunnel_api: agent.url("/api/tunnels"),
        tunnel_interval_secs: 1,
        ..ServerConfig::default()
    };

    let server = PollServer::bind(&config).await?;
    let addr = server.local_addr()?;
    let (tx, rx) = oneshot::channel::<()>();
    let handle = tokio::spawn(server.run_until(async move {
        let _ = rx.await;
    }));

    let client = reqwest::Client::new();
    let url = format!("http://{}/api/vote-url", addr);

    let detected = timeout(Duration::from_secs(5), async {
        loop {
            let body: serde_json::Value = client.get(&url).send().await?.json().await?;
            if body["url"] == "https://poll.ngrok.io/vote.html" {
                return Ok::<_, anyhow::Error>(body);
            }
            sleep(Duration::from_millis(50)).await;
        }
    })
    .await??;
    assert_eq!(detected["url"], "https://poll.ngrok.io/vote.html");

    let _ = tx.send(());
    timeout(Duration::from_secs(5), handle).await???;
    Ok(())
}
