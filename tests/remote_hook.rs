//! 远程调用器集成测试：用本地 TCP 监听器充当 composer 端点

use std::time::Duration;

use composer_hook_engine::invoker::ComposerHandler;
use composer_hook_engine::invoker::remote::RemoteHandler;
use composer_hook_engine::{HookError, HookPayload, HookVerdict};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use url::Url;

fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

async fn read_request(stream: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut tmp = [0u8; 4096];
    loop {
        let n = stream.read(&mut tmp).await.expect("read request");
        buf.extend_from_slice(&tmp[..n]);

        if let Some(pos) = find_subsequence(&buf, b"\r\n\r\n") {
            let head = String::from_utf8_lossy(&buf[..pos]).to_string();
            let content_length = head
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    if name.eq_ignore_ascii_case("content-length") {
                        value.trim().parse::<usize>().ok()
                    } else {
                        None
                    }
                })
                .unwrap_or(0);

            let mut request = buf.clone();
            while request.len() < pos + 4 + content_length {
                let n = stream.read(&mut tmp).await.expect("read body");
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&tmp[..n]);
            }
            return String::from_utf8_lossy(&request).to_string();
        }
        if n == 0 {
            return String::from_utf8_lossy(&buf).to_string();
        }
    }
}

/// 接受一个连接，读完请求后返回固定响应；完整请求文本通过通道交给断言方
async fn spawn_stub(
    status_line: &'static str,
    body: &'static str,
) -> (Url, mpsc::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::channel(1);

    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let request = read_request(&mut stream).await;
        let response = format!(
            "HTTP/1.1 {status_line}\r\ncontent-type: text/plain\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len(),
        );
        stream.write_all(response.as_bytes()).await.unwrap();
        stream.flush().await.ok();
        tx.send(request).await.ok();
    });

    let url = Url::parse(&format!("http://{addr}/hook")).unwrap();
    (url, rx)
}

#[tokio::test]
async fn test_blocking_2xx_plain_text_is_success() {
    let (url, mut rx) = spawn_stub("200 OK", "plain text").await;
    let handler = RemoteHandler::new(url, true, Duration::from_secs(5)).unwrap();

    let payload = HookPayload::new().with_header("x-a", "1");
    let verdict = handler.call(&payload).await.unwrap();

    assert_eq!(verdict, HookVerdict::success("plain text"));

    let request = rx.recv().await.unwrap();
    assert!(request.starts_with("POST /hook"));
    assert!(request.to_ascii_lowercase().contains("content-type: application/json"));
    assert!(request.contains(r#""x-a":"1""#), "request={request}");
}

#[tokio::test]
async fn test_blocking_non_2xx_plain_text_is_error() {
    let (url, _rx) = spawn_stub("500 Internal Server Error", "server error").await;
    let handler = RemoteHandler::new(url, true, Duration::from_secs(5)).unwrap();

    let verdict = handler.call(&HookPayload::new()).await.unwrap();
    assert_eq!(
        verdict,
        HookVerdict::Error {
            message: "server error".to_string()
        }
    );
}

#[tokio::test]
async fn test_blocking_2xx_with_error_status_is_error() {
    let (url, _rx) = spawn_stub("200 OK", r#"{"status":"ERROR","message":"rejected"}"#).await;
    let handler = RemoteHandler::new(url, true, Duration::from_secs(5)).unwrap();

    let verdict = handler.call(&HookPayload::new()).await.unwrap();
    assert_eq!(
        verdict,
        HookVerdict::Error {
            message: "rejected".to_string()
        }
    );
}

#[tokio::test]
async fn test_blocking_transport_failure_is_rejected() {
    // 绑定后立刻释放端口，保证连接被拒绝
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let url = Url::parse(&format!("http://{addr}/hook")).unwrap();
    let handler = RemoteHandler::new(url, true, Duration::from_secs(5)).unwrap();

    let err = handler.call(&HookPayload::new()).await.unwrap_err();
    assert!(matches!(err, HookError::Transport(_)));
}

#[tokio::test]
async fn test_non_blocking_resolves_before_response() {
    let (url, mut rx) = spawn_stub("200 OK", r#"{"status":"ERROR","message":"late"}"#).await;
    let handler = RemoteHandler::new(url, false, Duration::from_secs(5)).unwrap();

    let verdict = handler.call(&HookPayload::new()).await.unwrap();
    assert_eq!(
        verdict,
        HookVerdict::success("Remote function invoked successfully")
    );

    // 请求仍然送达端点，响应内容不影响调用方
    let request = tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("stub never saw the request")
        .unwrap();
    assert!(request.starts_with("POST /hook"));
}
