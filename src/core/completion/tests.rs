use super::*;
use crate::utils::test_utils::{test_request_config, ScriptedTransport};
use std::sync::{Arc, Mutex};
use std::time::Duration;

fn raw(status: u16, body: &str) -> RawResponse {
    RawResponse {
        status,
        body: body.to_string(),
    }
}

fn user(content: &str) -> ChatMessage {
    ChatMessage::new(Role::User, content)
}

#[test]
fn build_request_prepends_system_prompt() {
    let config = test_request_config();
    let request = build_request(&[user("hi")], &config);

    assert_eq!(request.model, "deepseek-chat");
    assert_eq!(request.temperature, 0.7);
    assert_eq!(request.max_tokens, 4000);
    assert_eq!(request.messages.len(), 2);
    assert_eq!(request.messages[0], ChatMessage::new(Role::System, "Be brief."));
    assert_eq!(request.messages[1], user("hi"));
}

#[test]
fn build_request_prepends_even_when_history_has_system_turn() {
    let config = test_request_config();
    let history = vec![ChatMessage::new(Role::System, "Earlier rule"), user("hi")];
    let request = build_request(&history, &config);

    let roles: Vec<&str> = request.messages.iter().map(|m| m.role.as_str()).collect();
    assert_eq!(roles, vec!["system", "system", "user"]);
    assert_eq!(request.messages[0].content, "Be brief.");
}

#[test]
fn build_request_skips_missing_or_empty_system_prompt() {
    let mut config = test_request_config();
    config.system_prompt = None;
    assert_eq!(build_request(&[user("a")], &config).messages.len(), 1);

    config.system_prompt = Some(String::new());
    assert_eq!(build_request(&[user("a")], &config).messages.len(), 1);
}

#[test]
fn decode_returns_first_choice_content() {
    let body = r#"{"choices":[
        {"message":{"role":"assistant","content":"first"}},
        {"message":{"role":"assistant","content":"second"}}
    ]}"#;
    assert_eq!(decode_response(&raw(200, body)), Ok("first".to_string()));
}

#[test]
fn decode_surfaces_api_error_with_status() {
    let body = r#"{"error":{"message":"Authentication Fails","type":"authentication_error","code":"invalid_request_error"}}"#;
    let err = decode_response(&raw(401, body)).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ApiError);
    assert_eq!(
        err,
        CompletionError::Api {
            message: "Authentication Fails".to_string(),
            status: Some(401),
            error_type: Some("authentication_error".to_string()),
            code: Some("invalid_request_error".to_string()),
        }
    );
    assert_eq!(err.to_string(), "Authentication Fails");
}

#[test]
fn decode_prefers_error_over_choices() {
    let body = r#"{"error":{"message":"quota"},"choices":[{"message":{"role":"assistant","content":"x"}}]}"#;
    let err = decode_response(&raw(200, body)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ApiError);
}

#[test]
fn decode_reports_malformed_when_no_usable_choice() {
    for body in [
        r#"{"choices":[]}"#,
        r#"{}"#,
        r#"{"choices":[{}]}"#,
        r#"{"choices":[{"message":{"role":"assistant"}}]}"#,
    ] {
        assert_eq!(
            decode_response(&raw(200, body)),
            Err(CompletionError::MalformedResponse),
            "body: {body}"
        );
    }
}

#[test]
fn decode_failure_is_a_transport_error() {
    let err = decode_response(&raw(502, "<html>Bad Gateway</html>")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transport);
    assert!(err.to_string().contains("HTTP 502"));
}

#[test]
fn credential_override_wins_over_default() {
    let client = CompletionClient::new(ScriptedTransport::new(), Some("built-in".to_string()));
    let mut config = test_request_config();
    config.credential_override = Some("override".to_string());
    assert_eq!(client.resolve_credential(&config).unwrap(), "override");

    config.credential_override = Some("   ".to_string());
    assert_eq!(client.resolve_credential(&config).unwrap(), "built-in");
}

#[tokio::test]
async fn missing_credential_fails_before_any_request() {
    let transport = ScriptedTransport::new().reply("never");
    let probe = transport.probe();
    let client = CompletionClient::new(transport, Some(String::new()));
    let mut config = test_request_config();
    config.credential_override = None;

    let result = client.complete(&[user("hi")], &config).await;

    assert_eq!(result, Err(CompletionError::MissingCredential));
    assert_eq!(probe.calls(), 0);
}

#[tokio::test]
async fn complete_sends_one_request_with_bearer_key() {
    let transport = ScriptedTransport::new().reply("pong");
    let probe = transport.probe();
    let client = CompletionClient::new(transport, None);

    let reply = client
        .complete(&[user("ping")], &test_request_config())
        .await;

    assert_eq!(reply, Ok("pong".to_string()));
    let requests = probe.requests();
    assert_eq!(requests.len(), 1);
    let (api_key, body) = &requests[0];
    assert_eq!(api_key, "test-key");
    assert_eq!(body["model"], "deepseek-chat");
    assert_eq!(body["messages"][1]["content"], "ping");
}

#[tokio::test]
async fn slow_exchange_times_out_as_transport_error() {
    let transport = ScriptedTransport::new()
        .reply("late")
        .delayed(Duration::from_secs(5));
    let client = CompletionClient::new(transport, None);
    let mut config = test_request_config();
    config.timeout = Duration::from_millis(20);

    let err = client.complete(&[user("hi")], &config).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Transport);
    assert!(err.to_string().contains("timed out"));
}

#[test]
fn completions_url_normalizes_slashes() {
    assert_eq!(
        completions_url("https://api.deepseek.com/v1/"),
        "https://api.deepseek.com/v1/chat/completions"
    );
    assert_eq!(
        HttpTransport::new("http://localhost:8080").endpoint(),
        "http://localhost:8080/chat/completions"
    );
}

type CapturedRequest = (String, Vec<(String, String)>, Vec<u8>);

async fn read_http_request(stream: &mut tokio::net::TcpStream) -> Result<CapturedRequest, String> {
    use tokio::io::AsyncReadExt;

    let mut buffer = Vec::new();
    let mut header_end = None;
    while header_end.is_none() {
        let mut chunk = [0_u8; 1024];
        let read = stream
            .read(&mut chunk)
            .await
            .map_err(|err| err.to_string())?;
        if read == 0 {
            return Err("Unexpected EOF while reading HTTP headers".to_string());
        }
        buffer.extend_from_slice(&chunk[..read]);
        header_end = buffer
            .windows(4)
            .position(|window| window == b"\r\n\r\n")
            .map(|index| index + 4);
    }

    let header_end = header_end.expect("header end should exist");
    let header_text =
        std::str::from_utf8(&buffer[..header_end]).map_err(|err| err.to_string())?;
    let mut lines = header_text.split("\r\n").filter(|line| !line.is_empty());
    let request_line = lines
        .next()
        .ok_or_else(|| "Missing HTTP request line".to_string())?
        .to_string();

    let mut headers = Vec::new();
    let mut content_length = 0_usize;
    for line in lines {
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim().to_string();
        if name.eq_ignore_ascii_case("content-length") {
            content_length = value.parse::<usize>().map_err(|err| err.to_string())?;
        }
        headers.push((name.to_string(), value));
    }

    let mut body = buffer[header_end..].to_vec();
    while body.len() < content_length {
        let mut chunk = vec![0_u8; content_length - body.len()];
        let read = stream
            .read(&mut chunk)
            .await
            .map_err(|err| err.to_string())?;
        if read == 0 {
            return Err("Unexpected EOF while reading HTTP body".to_string());
        }
        body.extend_from_slice(&chunk[..read]);
    }
    body.truncate(content_length);

    Ok((request_line, headers, body))
}

fn local_transport(base_url: &str) -> HttpTransport {
    let client = reqwest::Client::builder()
        .no_proxy()
        .build()
        .expect("client should build");
    HttpTransport::with_client(client, base_url)
}

fn header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

/// Serve exactly one canned HTTP response and hand back what was received.
async fn serve_once(
    status_line: &'static str,
    body: &'static str,
) -> (String, tokio::task::JoinHandle<Result<(), String>>, Arc<Mutex<Option<CapturedRequest>>>) {
    use tokio::io::AsyncWriteExt;
    use tokio::net::TcpListener;

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("listener should bind");
    let addr = listener.local_addr().expect("local addr should resolve");
    let captured = Arc::new(Mutex::new(None));
    let captured_for_server = Arc::clone(&captured);

    let server = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.map_err(|err| err.to_string())?;
        let request = read_http_request(&mut stream).await?;
        *captured_for_server.lock().unwrap() = Some(request);
        let response = format!(
            "{status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        );
        stream
            .write_all(response.as_bytes())
            .await
            .map_err(|err| err.to_string())?;
        stream.shutdown().await.map_err(|err| err.to_string())?;
        Ok(())
    });

    (format!("http://{addr}/v1"), server, captured)
}

#[tokio::test]
async fn http_transport_posts_json_with_auth_headers() {
    let (base_url, server, captured) = serve_once(
        "HTTP/1.1 200 OK",
        r#"{"choices":[{"message":{"role":"assistant","content":"$$x+1$$"}}]}"#,
    )
    .await;
    let client = CompletionClient::new(local_transport(&base_url), None);

    let reply = client
        .complete(&[user("math please")], &test_request_config())
        .await;

    assert_eq!(reply, Ok("$$x+1$$".to_string()));
    server.await.expect("server task").expect("server ok");

    let (request_line, headers, body) = captured.lock().unwrap().take().expect("request");
    assert_eq!(request_line, "POST /v1/chat/completions HTTP/1.1");
    assert_eq!(header(&headers, "authorization"), Some("Bearer test-key"));
    assert_eq!(header(&headers, "content-type"), Some("application/json"));

    let body: serde_json::Value = serde_json::from_slice(&body).expect("json body");
    assert_eq!(body["model"], "deepseek-chat");
    assert_eq!(body["max_tokens"], 4000);
    assert_eq!(body["messages"][0]["role"], "system");
    assert_eq!(body["messages"][1]["content"], "math please");
}

#[tokio::test]
async fn http_transport_decodes_error_payload_on_non_success_status() {
    let (base_url, server, _captured) = serve_once(
        "HTTP/1.1 402 Payment Required",
        r#"{"error":{"message":"Insufficient Balance","type":"unknown_error","code":"invalid_request_error"}}"#,
    )
    .await;
    let client = CompletionClient::new(local_transport(&base_url), None);

    let err = client
        .complete(&[user("hi")], &test_request_config())
        .await
        .unwrap_err();
    server.await.expect("server task").expect("server ok");

    match err {
        CompletionError::Api {
            message, status, ..
        } => {
            assert_eq!(message, "Insufficient Balance");
            assert_eq!(status, Some(402));
        }
        other => panic!("expected api error, got {other:?}"),
    }
}

#[tokio::test]
async fn connection_refused_is_a_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let client = CompletionClient::new(local_transport(&format!("http://{addr}")), None);
    let err = client
        .complete(&[user("hi")], &test_request_config())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Transport);
}
