//! End-to-end exercises of the RPC client over an in-memory stub
//! transport.

use pincer_client::{ClientConfig, RpcClient};
use pincer_proto::Variant;
use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream};

const PING_RESPONSE: &[u8] = b"HTTP/1.1 200 OK\r\n\
    Set-Cookie: sid=abc123; Path=/\r\n\
    Server: cmon/1.9.8\r\n\
    Content-Type: application/json\r\n\
    \r\n\
    {\"request_status\": \"ok\", \"operation\": \"ping\"}\n\n";

/// Reads one full HTTP-like request (headers plus `Content-Length` body).
async fn read_request(stream: &mut DuplexStream) -> String {
    let mut received = Vec::new();
    let mut chunk = [0u8; 1024];

    loop {
        let n = stream.read(&mut chunk).await.unwrap();
        assert!(n > 0, "client closed mid-request");
        received.extend_from_slice(&chunk[..n]);

        let text = String::from_utf8_lossy(&received).into_owned();
        if let Some(header_end) = text.find("\r\n\r\n") {
            let body_len = text[..header_end]
                .lines()
                .find_map(|line| line.strip_prefix("Content-Length: "))
                .and_then(|value| value.parse::<usize>().ok())
                .unwrap_or(0);

            if received.len() >= header_end + 4 + body_len {
                return text;
            }
        }
    }
}

#[tokio::test]
async fn ping_accumulates_and_replays_session_cookies() {
    let (client_side, mut server_side) = tokio::io::duplex(64 * 1024);

    let server = tokio::spawn(async move {
        let first = read_request(&mut server_side).await;
        assert!(first.starts_with("POST /v2/ping/ HTTP/1.0\r\n"));
        assert!(first.contains("\"operation\":\"ping\""));
        assert!(!first.contains("\r\nCookie:"));
        server_side.write_all(PING_RESPONSE).await.unwrap();

        // The cookie from the first reply must be replayed.
        let second = read_request(&mut server_side).await;
        assert!(second.contains("Cookie: sid=abc123\r\n"));
        server_side.write_all(PING_RESPONSE).await.unwrap();
    });

    let mut client = RpcClient::over_stream(ClientConfig::new("stub", 9555), client_side);

    client.ping().await.unwrap();
    assert_eq!(client.error_string(), "");
    assert!(client.reply().is_ok());
    assert_eq!(client.reply().property("operation"), Variant::from("ping"));
    assert_eq!(client.server_version().await, "cmon/1.9.8");

    client.ping().await.unwrap();
    assert!(client.reply().is_ok());

    server.await.unwrap();
}

#[tokio::test]
async fn configured_token_is_injected_into_the_payload() {
    let (client_side, mut server_side) = tokio::io::duplex(64 * 1024);

    let server = tokio::spawn(async move {
        let request = read_request(&mut server_side).await;
        assert!(request.contains("\"token\":\"sesame\""));
        server_side.write_all(PING_RESPONSE).await.unwrap();
    });

    let config = ClientConfig::new("stub", 9555).with_token("sesame");
    let mut client = RpcClient::over_stream(config, client_side);
    client.ping().await.unwrap();

    server.await.unwrap();
}

#[tokio::test]
async fn malformed_body_becomes_a_not_ok_reply() {
    let (client_side, mut server_side) = tokio::io::duplex(64 * 1024);

    let server = tokio::spawn(async move {
        let _request = read_request(&mut server_side).await;
        server_side
            .write_all(b"HTTP/1.1 200 OK\r\n\r\nthis is not json\n\n")
            .await
            .unwrap();
    });

    let mut client = RpcClient::over_stream(ClientConfig::new("stub", 9555), client_side);
    client.ping().await.unwrap();
    assert!(!client.reply().is_ok());
    assert!(!client.reply().error_string().is_empty());

    server.await.unwrap();
}

#[tokio::test]
async fn streaming_records_are_decoded_one_by_one() {
    let (client_side, mut server_side) = tokio::io::duplex(64 * 1024);

    let server = tokio::spawn(async move {
        let _request = read_request(&mut server_side).await;
        server_side
            .write_all(
                b"HTTP/1.1 200 OK\r\n\r\n\
                  {\"request_status\": \"ok\", \"seq\": 1}\n\n\
                  {\"request_status\": \"ok\", \"seq\": 2}\n\n\
                  \x1e{\"request_status\": \"ok\", \"seq\": 3}\n\n",
            )
            .await
            .unwrap();
        // Dropping the write half ends the stream.
    });

    let mut client = RpcClient::over_stream(ClientConfig::new("stub", 9555), client_side);

    let mut payload = pincer_proto::VariantMap::new();
    payload.insert("operation".into(), Variant::from("getJobLog"));
    client.send_request("/v2/jobs/", &payload).await.unwrap();
    assert_eq!(client.reply().property("seq"), Variant::from(1i64));

    assert!(client.next_reply().await.unwrap());
    assert_eq!(client.reply().property("seq"), Variant::from(2i64));

    assert!(client.next_reply().await.unwrap());
    assert_eq!(client.reply().property("seq"), Variant::from(3i64));

    assert!(!client.next_reply().await.unwrap());

    server.await.unwrap();
}

#[tokio::test]
async fn shared_clones_reuse_one_connection_and_its_cookies() {
    let (client_side, mut server_side) = tokio::io::duplex(64 * 1024);

    let server = tokio::spawn(async move {
        let _first = read_request(&mut server_side).await;
        server_side.write_all(PING_RESPONSE).await.unwrap();

        let second = read_request(&mut server_side).await;
        assert!(second.contains("Cookie: sid=abc123\r\n"));
        server_side.write_all(PING_RESPONSE).await.unwrap();
    });

    let mut client = RpcClient::over_stream(ClientConfig::new("stub", 9555), client_side);
    let mut borrower = client.clone();

    client.ping().await.unwrap();
    borrower.ping().await.unwrap();
    assert!(borrower.reply().is_ok());

    server.await.unwrap();
}
