//! End-to-end tests for channels against local fake endpoints.

use herald_channels::{Channel, ChannelConfig, Error};
use herald_smtp::Format;
use serde_json::json;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn rocket_chat(server: &MockServer, debug: bool) -> Channel {
    let config = json!({
        "type": "rocket_chat",
        "access_token": "token-1",
        "user_id": "user-1",
        "server_url": server.uri(),
        "debug": debug,
    });
    ChannelConfig::from_json(&config.to_string())
        .unwrap()
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_rocket_chat_delivered() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/chat.postMessage"))
        .and(header("X-User-Id", "user-1"))
        .and(header("X-Auth-Token", "token-1"))
        .and(body_json(json!({"text": "deploy done", "channel": "#general"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = rocket_chat(&server, true).send("deploy done").await.unwrap();

    assert!(outcome.success);
    assert_eq!(outcome.http_status, Some(200));
    assert_eq!(outcome.raw_result["success"], true);
}

#[tokio::test]
async fn test_rocket_chat_rejection_collected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/chat.postMessage"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "success": false,
            "message": {"msg": "room not found"}
        })))
        .mount(&server)
        .await;

    let outcome = rocket_chat(&server, false).send("hello").await.unwrap();

    assert!(!outcome.success);
    assert_eq!(outcome.message, "room not found");
    assert_eq!(outcome.http_status, Some(400));
    assert!(outcome.render(Format::PlainText).contains("--- result ---"));
}

#[tokio::test]
async fn test_rocket_chat_rejection_fails_fast() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "status": "error",
            "message": "You must be logged in to do this."
        })))
        .mount(&server)
        .await;

    let err = rocket_chat(&server, true).send("hello").await.unwrap_err();

    assert!(matches!(
        err,
        Error::Rejected {
            vendor: "rocket_chat",
            http_status: Some(401),
            ..
        }
    ));
}

/// Answers each SMTP command with the next canned reply.
async fn spawn_smtp_server(replies: Vec<&'static str>) -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        let (socket, _) = listener.accept().await.unwrap();
        let mut reader = BufReader::new(socket);
        let mut replies = replies.into_iter();
        let mut in_data = false;

        if let Some(greeting) = replies.next() {
            reader.get_mut().write_all(format!("{greeting}\r\n").as_bytes()).await.unwrap();
        }

        let mut line = String::new();
        while reader.read_line(&mut line).await.unwrap_or(0) > 0 {
            let command = line.trim_end().to_string();
            line.clear();
            if in_data && command != "." {
                continue;
            }

            let Some(reply) = replies.next() else { break };
            in_data = reply.starts_with("354");
            reader.get_mut().write_all(format!("{reply}\r\n").as_bytes()).await.unwrap();
        }
    });

    port
}

#[tokio::test]
async fn test_smtp_channel_reports_transcript() {
    let port = spawn_smtp_server(vec![
        "220 mx ready",
        "250 hello",
        "334 VXNlcm5hbWU6",
        "334 UGFzc3dvcmQ6",
        "535 bad credentials",
        "250 sender ok",
        "250 rcpt ok",
        "354 go ahead",
        "250 queued",
        "221 bye",
    ])
    .await;

    let config = json!({
        "type": "smtp",
        "host": "127.0.0.1",
        "port": port,
        "username": "robot@example.com",
        "password": "wrong",
        "debug": false,
        "mail": {"recipients": [{"email": "ops@example.com"}], "subject": "Alert"}
    });
    let channel = ChannelConfig::from_json(&config.to_string())
        .unwrap()
        .build()
        .unwrap();

    let outcome = channel.send("Disk is full").await.unwrap();

    assert!(!outcome.success);
    assert_eq!(outcome.http_status, None);
    let steps: Vec<&str> = outcome
        .raw_result
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["step"].as_str().unwrap())
        .collect();
    assert_eq!(
        steps,
        vec!["connection", "hello", "auth_type", "user", "pass", "from", "to", "data", "send", "quit"]
    );
    assert!(outcome.render(Format::PlainText).contains("pass: 535 bad credentials"));
}

#[tokio::test]
async fn test_transport_error_hides_bot_key() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let config = json!({
        "type": "telegram",
        "api_key": "123456:SECRET-BOT-KEY",
        "channel": "@ops",
        "api_base": format!("http://127.0.0.1:{port}"),
        "debug": false,
    });
    let channel = ChannelConfig::from_json(&config.to_string())
        .unwrap()
        .build()
        .unwrap();

    let err = channel.send("hello").await.unwrap_err();

    assert!(matches!(err, Error::Http(_)));
    assert!(!err.to_string().contains("SECRET-BOT-KEY"));
    assert!(!format!("{err:?}").contains("SECRET-BOT-KEY"));
}
