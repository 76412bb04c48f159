use mime_guess::MimeGuess;
use serde_json::json;

use crate::error::{Error, Result};

use super::ApiClient;

/// Client of the blob store (`/storage/v1`).
#[derive(Debug, Clone)]
pub struct StorageClient {
    inner: ApiClient,
}

impl StorageClient {
    pub fn new(inner: ApiClient) -> Self {
        Self { inner }
    }

    /// Store `bytes` under `bucket/path`.
    ///
    /// Only the status decides the outcome, the response body is not read.
    pub async fn upload(&self, token: &str, bucket: &str, path: &str, bytes: Vec<u8>) -> Result<()> {
        let url = self
            .inner
            .endpoint(&format!("storage/v1/object/{}/{}", bucket, path));
        let mime = MimeGuess::from_path(path).first_or_octet_stream().to_string();
        let (status, body) = self
            .inner
            .send(Some(token), |client| {
                client
                    .post(&url)
                    .header(reqwest::header::CONTENT_TYPE, mime)
                    .body(bytes)
            })
            .await
            .map_err(|e| match e {
                Error::Network(message) => Error::Storage(message),
                other => other,
            })?;

        if !status.is_success() {
            return Err(Error::from_storage_response(status, &body));
        }
        Ok(())
    }

    /// Publicly resolvable URL of an object in a public bucket.
    pub fn public_url(&self, bucket: &str, path: &str) -> String {
        self.inner
            .endpoint(&format!("storage/v1/object/public/{}/{}", bucket, path))
    }

    pub async fn remove(&self, token: &str, bucket: &str, paths: &[&str]) -> Result<()> {
        let url = self.inner.endpoint(&format!("storage/v1/object/{}", bucket));
        let payload = json!({ "prefixes": paths });
        let (status, body) = self
            .inner
            .send(Some(token), |client| client.delete(&url).json(&payload))
            .await
            .map_err(|e| match e {
                Error::Network(message) => Error::Storage(message),
                other => other,
            })?;

        if !status.is_success() {
            return Err(Error::from_storage_response(status, &body));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpListener,
    };

    use super::*;

    /// Answers a single request on a local port with `status` and a
    /// plain-text `body`, returns the base URL.
    async fn serve_once(status: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
                if let Some(end) = request.windows(4).position(|w| w == b"\r\n\r\n") {
                    let head = String::from_utf8_lossy(&request[..end]).to_lowercase();
                    let length = head
                        .lines()
                        .find_map(|line| line.strip_prefix("content-length:"))
                        .and_then(|v| v.trim().parse::<usize>().ok())
                        .unwrap_or(0);
                    if request.len() >= end + 4 + length {
                        break;
                    }
                }
            }
            let response = format!(
                "HTTP/1.1 {}\r\ncontent-type: text/plain\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_upload_ignores_response_body() {
        let base = serve_once("200 OK", "stored, not json").await;
        let client = StorageClient::new(ApiClient::with_options(&base, "key", 1, 0));
        client
            .upload("token", "post-images", "post-1.jpg", vec![0xff, 0xd8, 0xff])
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_upload_rejected_is_storage_error() {
        let base = serve_once("413 Payload Too Large", "too big").await;
        let client = StorageClient::new(ApiClient::with_options(&base, "key", 1, 0));
        let result = client
            .upload("token", "post-images", "post-1.jpg", vec![0xff, 0xd8, 0xff])
            .await;
        assert!(matches!(result, Err(Error::Storage(_))));
    }

    #[test]
    fn test_public_url() {
        let client = StorageClient::new(ApiClient::with_options("https://demo.supabase.co", "key", 1, 0));
        assert_eq!(
            client.public_url("post-images", "post-1717000000000-k3j2h1.jpg"),
            "https://demo.supabase.co/storage/v1/object/public/post-images/post-1717000000000-k3j2h1.jpg"
        );
    }
}
