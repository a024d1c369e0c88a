use crate::error::TransferError;
use crate::transfer::Transport;
use futures::future::BoxFuture;
use futures::StreamExt;
use log::{debug, info};
use std::time::Duration;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

/// Idle connections kept per host in the shared pool.
pub const MAX_IDLE_CONNECTIONS: usize = 32;

/// HTTP(S) transport backed by a single shared `reqwest` client.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(MAX_IDLE_CONNECTIONS)
            .build()?;
        Ok(Self { client })
    }

    async fn download(
        &self,
        url: &str,
        mut file: File,
        timeout: Duration,
    ) -> Result<u64, TransferError> {
        info!("Starting download: {}", url);

        let resp = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| classify(e, timeout))?;

        if !resp.status().is_success() {
            return Err(TransferError::HttpStatus(resp.status()));
        }

        let mut downloaded: u64 = 0;
        let mut stream = resp.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| classify(e, timeout))?;
            file.write_all(&chunk).await?;
            downloaded += chunk.len() as u64;
        }

        file.flush().await?;
        debug!("Finished download: {} ({} bytes)", url, downloaded);
        Ok(downloaded)
    }
}

impl Transport for HttpTransport {
    fn fetch<'a>(
        &'a self,
        url: &'a str,
        sink: File,
        timeout: Duration,
    ) -> BoxFuture<'a, Result<u64, TransferError>> {
        Box::pin(self.download(url, sink, timeout))
    }
}

fn classify(err: reqwest::Error, timeout: Duration) -> TransferError {
    if err.is_timeout() {
        TransferError::Timeout(timeout)
    } else {
        TransferError::RequestError(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    /// Serves `/ok`, `/missing` (404) and `/slow` (stalls before answering)
    /// from a background thread. Returns the base URL.
    fn start_server(body: &'static [u8]) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().unwrap().port();
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                thread::spawn(move || handle(stream, body));
            }
        });
        format!("http://127.0.0.1:{}", port)
    }

    fn handle(mut stream: std::net::TcpStream, body: &[u8]) {
        let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
        let mut buf = [0u8; 4096];
        let n = match stream.read(&mut buf) {
            Ok(0) | Err(_) => return,
            Ok(n) => n,
        };
        let request = String::from_utf8_lossy(&buf[..n]);
        let path = request.split_whitespace().nth(1).unwrap_or("/");

        let (status, body) = match path {
            "/ok" => ("200 OK", body),
            "/slow" => {
                thread::sleep(Duration::from_millis(1500));
                ("200 OK", body)
            }
            _ => ("404 Not Found", &b"not found"[..]),
        };
        let head = format!(
            "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            status,
            body.len()
        );
        let _ = stream.write_all(head.as_bytes());
        let _ = stream.write_all(body);
    }

    async fn fetch_to(url: &str, timeout: Duration) -> (Result<u64, TransferError>, Vec<u8>) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out");
        let file = File::create(&path).await.unwrap();
        let transport = HttpTransport::new().unwrap();
        let result = transport.fetch(url, file, timeout).await;
        let contents = std::fs::read(&path).unwrap();
        (result, contents)
    }

    #[tokio::test]
    async fn writes_body_to_sink() {
        let base = start_server(b"hello massget");
        let (result, contents) = fetch_to(&format!("{}/ok", base), Duration::from_secs(5)).await;
        assert_eq!(result.unwrap(), 13);
        assert_eq!(contents, b"hello massget");
    }

    #[tokio::test]
    async fn non_success_status_is_failure() {
        let base = start_server(b"unused");
        let (result, _) = fetch_to(&format!("{}/missing", base), Duration::from_secs(5)).await;
        match result {
            Err(TransferError::HttpStatus(status)) => assert_eq!(status.as_u16(), 404),
            other => panic!("expected HttpStatus, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn stalled_server_times_out() {
        let base = start_server(b"late");
        let timeout = Duration::from_millis(200);
        let (result, contents) = fetch_to(&format!("{}/slow", base), timeout).await;
        match result {
            Err(TransferError::Timeout(t)) => assert_eq!(t, timeout),
            other => panic!("expected Timeout, got {:?}", other),
        }
        assert!(contents.is_empty());
    }

    #[tokio::test]
    async fn unreachable_host_is_request_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let (result, _) =
            fetch_to(&format!("http://127.0.0.1:{}/", port), Duration::from_secs(5)).await;
        let err = result.unwrap_err();
        assert_eq!(err.code(), 2);
    }
}
