//! Hugging Face hub client: fills a local model directory with the files an
//! adapter needs, downloading only what is missing.

use std::path::{Path, PathBuf};

use futures::StreamExt;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::{ModelFile, missing_files};

pub const HUGGINGFACE_URL: &str = "https://huggingface.co";

#[derive(Error, Debug)]
pub enum HubError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{url} returned {status}")]
    Status { status: u16, url: String },
    #[error("writing {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid repository id '{0}', expected owner/name")]
    InvalidRepo(String),
}

/// Download client for `{base}/{repo}/resolve/main/{file}`.
pub struct HubClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl HubClient {
    /// Client for huggingface.co; `token` is sent as a bearer token.
    pub fn new(token: Option<String>) -> Self {
        Self::with_base_url(HUGGINGFACE_URL.to_string(), token)
    }

    /// Client for a mirror, e.g. `https://hf-mirror.com` (no trailing slash).
    pub fn with_base_url(base_url: String, token: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.is_empty()),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn file_url(&self, repo: &str, remote: &str) -> String {
        format!("{}/{repo}/resolve/main/{remote}", self.base_url)
    }

    /// Make sure every file of `files` exists in `dir`, fetching the missing
    /// ones from `repo`. Existing files are never re-downloaded.
    pub async fn ensure_model(
        &self,
        dir: &Path,
        repo: &str,
        files: &[ModelFile],
    ) -> Result<(), HubError> {
        let missing = missing_files(dir, files);
        if missing.is_empty() {
            debug!(dir = %dir.display(), "model files present");
            return Ok(());
        }
        validate_repo(repo)?;
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|source| HubError::Io {
                path: dir.to_path_buf(),
                source,
            })?;

        info!(repo, dir = %dir.display(), count = missing.len(), "downloading model files");
        for file in missing {
            self.download(repo, file.remote, &dir.join(file.local)).await?;
        }
        Ok(())
    }

    /// Stream one file to `dest`. The bytes land in a temporary file next to
    /// `dest` that is renamed into place only once complete.
    async fn download(&self, repo: &str, remote: &str, dest: &Path) -> Result<u64, HubError> {
        let url = self.file_url(repo, remote);
        let mut request = self.client.get(&url);
        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("Bearer {token}"));
        }

        let resp = request.send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(HubError::Status {
                status: status.as_u16(),
                url,
            });
        }

        let dir = dest.parent().unwrap_or(Path::new("."));
        let io_err = |source| HubError::Io {
            path: dest.to_path_buf(),
            source,
        };
        let (file, tmp_path) = tempfile::NamedTempFile::new_in(dir)
            .map_err(io_err)?
            .into_parts();
        let mut file = tokio::fs::File::from_std(file);

        let mut written = 0u64;
        let mut stream = resp.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await.map_err(io_err)?;
            written += chunk.len() as u64;
        }
        file.flush().await.map_err(io_err)?;
        drop(file);

        tmp_path.persist(dest).map_err(|e| io_err(e.error))?;
        info!(file = remote, bytes = written, "downloaded");
        Ok(written)
    }
}

fn validate_repo(repo: &str) -> Result<(), HubError> {
    let mut parts = repo.split('/');
    let valid = matches!(
        (parts.next(), parts.next(), parts.next()),
        (Some(owner), Some(name), None) if is_segment(owner) && is_segment(name)
    );
    if valid {
        Ok(())
    } else {
        Err(HubError::InvalidRepo(repo.to_string()))
    }
}

fn is_segment(s: &str) -> bool {
    !s.is_empty()
        && s != "."
        && s != ".."
        && s.chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    const FILES: &[ModelFile] = &[ModelFile::new("onnx/model.onnx", "model.onnx")];

    /// One-shot HTTP server answering every connection with `status` and `body`.
    async fn serve_once(status: &'static str, body: &'static [u8]) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;
                let head = format!(
                    "HTTP/1.1 {status}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                    body.len()
                );
                let _ = socket.write_all(head.as_bytes()).await;
                let _ = socket.write_all(body).await;
                let _ = socket.shutdown().await;
            }
        });
        format!("http://{addr}")
    }

    #[test]
    fn base_url_trailing_slash_trimmed() {
        let hub = HubClient::with_base_url("https://hf-mirror.com/".into(), None);
        assert_eq!(hub.base_url(), "https://hf-mirror.com");
        assert_eq!(
            hub.file_url("Xenova/model", "onnx/model.onnx"),
            "https://hf-mirror.com/Xenova/model/resolve/main/onnx/model.onnx"
        );
    }

    #[test]
    fn empty_token_ignored() {
        let hub = HubClient::new(Some(String::new()));
        assert!(hub.token.is_none());
    }

    #[test]
    fn repo_validation() {
        assert!(validate_repo("onnx-community/whisper-small").is_ok());
        assert!(validate_repo("Xenova/blip-image-captioning-base").is_ok());
        assert!(validate_repo("whisper-small").is_err());
        assert!(validate_repo("a/b/c").is_err());
        assert!(validate_repo("../etc").is_err());
        assert!(validate_repo("owner/na me").is_err());
    }

    #[tokio::test]
    async fn present_files_skip_network() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("model.onnx"), b"local").unwrap();

        // Unroutable base URL: any request would fail.
        let hub = HubClient::with_base_url("http://127.0.0.1:1".into(), None);
        hub.ensure_model(dir.path(), "not a repo", FILES).await.unwrap();
        assert_eq!(std::fs::read(dir.path().join("model.onnx")).unwrap(), b"local");
    }

    #[tokio::test]
    async fn downloads_missing_file() {
        let base = serve_once("200 OK", b"onnx-bytes").await;
        let dir = tempfile::tempdir().unwrap();
        let model_dir = dir.path().join("classifier");

        let hub = HubClient::with_base_url(base, Some("secret".into()));
        hub.ensure_model(&model_dir, "owner/model", FILES).await.unwrap();

        assert_eq!(std::fs::read(model_dir.join("model.onnx")).unwrap(), b"onnx-bytes");
        let leftovers = std::fs::read_dir(&model_dir).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[tokio::test]
    async fn http_error_leaves_no_file() {
        let base = serve_once("404 Not Found", b"").await;
        let dir = tempfile::tempdir().unwrap();

        let hub = HubClient::with_base_url(base, None);
        let err = hub
            .ensure_model(dir.path(), "owner/model", FILES)
            .await
            .unwrap_err();
        assert!(matches!(err, HubError::Status { status: 404, .. }));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn invalid_repo_rejected_before_download() {
        let dir = tempfile::tempdir().unwrap();
        let hub = HubClient::new(None);
        let err = hub.ensure_model(dir.path(), "bad", FILES).await.unwrap_err();
        assert!(matches!(err, HubError::InvalidRepo(_)));
    }
}
