//! API client used by the wizard
//!
//! [`ReleaseBackend`] is the seam between wizard logic and the network.
//! [`HttpBackend`] speaks the `rdesk-api` routes over reqwest; tests swap in
//! an in-memory fake.

use async_trait::async_trait;
use bytes::Bytes;
use futures::{Stream, TryStreamExt};
use reqwest::{multipart, StatusCode};
use std::time::Duration;
use thiserror::Error;
use tokio::io::AsyncRead;
use tokio::sync::watch;
use tokio_util::io::ReaderStream;
use tracing::debug;
use uuid::Uuid;

use rdesk_common::model::{
    ErrorBody, ErrorReport, GtinLookup, Invite, IsrcLookup, IswcLookup, LocalFile, NewInvite,
    ReleaseData, SaveReleaseResponse, SaveTrackRequest, TrackData, UploadKind, UploadResponse,
};

/// Errors surfaced to the user as notices; nothing here is retried
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Please sign in again")]
    Unauthorized,

    /// Another save moved the release on first
    #[error("This release was changed elsewhere: {0}")]
    Conflict(String),

    #[error("Server error {status}: {message}")]
    Server { status: u16, message: String },

    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error("File error: {0}")]
    File(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ClientError::Decode(e.to_string())
        } else {
            ClientError::Network(e.to_string())
        }
    }
}

pub type ClientResult<T> = std::result::Result<T, ClientError>;

/// Upload progress in bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UploadProgress {
    pub sent: u64,
    pub total: u64,
}

impl UploadProgress {
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        ((self.sent.min(self.total) * 100) / self.total) as u8
    }
}

/// Read size for streamed uploads
pub const UPLOAD_CHUNK_BYTES: usize = 256 * 1024;

/// Chunks of `reader`, publishing the running byte count on `progress`
pub fn progress_stream<R>(
    reader: R,
    total: u64,
    chunk_size: usize,
    progress: Option<watch::Sender<UploadProgress>>,
) -> impl Stream<Item = std::io::Result<Bytes>> + Send + Sync + 'static
where
    R: AsyncRead + Send + Sync + 'static,
{
    let mut sent: u64 = 0;
    ReaderStream::with_capacity(reader, chunk_size).inspect_ok(move |chunk| {
        sent += chunk.len() as u64;
        if let Some(tx) = &progress {
            let _ = tx.send(UploadProgress { sent, total });
        }
    })
}

#[async_trait]
pub trait ReleaseBackend: Send + Sync {
    async fn load_release(&self, id: Uuid) -> ClientResult<Option<ReleaseData>>;
    async fn save_release(&self, release: &ReleaseData) -> ClientResult<SaveReleaseResponse>;
    async fn save_track(&self, release_id: Uuid, track: &TrackData) -> ClientResult<()>;
    async fn upload(
        &self,
        kind: UploadKind,
        file: &LocalFile,
        entity_id: Option<Uuid>,
        progress: Option<watch::Sender<UploadProgress>>,
    ) -> ClientResult<UploadResponse>;
    async fn lookup_gtin(&self, gtin: &str) -> ClientResult<GtinLookup>;
    async fn verify_isrc(&self, isrc: &str) -> ClientResult<IsrcLookup>;
    async fn verify_iswc(&self, iswc: &str) -> ClientResult<IswcLookup>;
    async fn send_invite(&self, invite: &NewInvite) -> ClientResult<Invite>;
    async fn report_error(&self, report: &ErrorReport) -> ClientResult<()>;
}

/// reqwest implementation of [`ReleaseBackend`]
#[derive(Clone)]
pub struct HttpBackend {
    http: reqwest::Client,
    base_url: String,
    session_token: Option<String>,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>, session_token: Option<String>) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ClientError::Network(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session_token,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.session_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> ClientResult<T> {
        debug!(path = %path, "GET");
        let response = self
            .authorized(self.http.get(self.url(path)).query(query))
            .send()
            .await?;
        decode(response).await
    }

    async fn post_json<B: serde::Serialize + ?Sized, T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        debug!(path = %path, "POST");
        let response = self
            .authorized(self.http.post(self.url(path)).json(body))
            .send()
            .await?;
        decode(response).await
    }
}

/// Map non-2xx statuses onto [`ClientError`], otherwise parse the body
async fn decode<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
    let status = response.status();
    if status.is_success() {
        return response.json().await.map_err(|e| ClientError::Decode(e.to_string()));
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text)
        .map(|body| body.error.message)
        .unwrap_or(text);

    Err(match status {
        StatusCode::UNAUTHORIZED => ClientError::Unauthorized,
        StatusCode::CONFLICT => ClientError::Conflict(message),
        _ => ClientError::Server {
            status: status.as_u16(),
            message,
        },
    })
}

#[async_trait]
impl ReleaseBackend for HttpBackend {
    async fn load_release(&self, id: Uuid) -> ClientResult<Option<ReleaseData>> {
        let id = id.to_string();
        match self
            .get_json::<ReleaseData>("/api/music-releases", &[("id", id.as_str())])
            .await
        {
            Ok(release) => Ok(Some(release)),
            Err(ClientError::Server { status: 404, .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn save_release(&self, release: &ReleaseData) -> ClientResult<SaveReleaseResponse> {
        self.post_json("/api/music-releases", release).await
    }

    async fn save_track(&self, release_id: Uuid, track: &TrackData) -> ClientResult<()> {
        let body = SaveTrackRequest {
            release_id,
            track: track.clone(),
        };
        let _: serde_json::Value = self.post_json("/api/music-tracks", &body).await?;
        Ok(())
    }

    async fn upload(
        &self,
        kind: UploadKind,
        file: &LocalFile,
        entity_id: Option<Uuid>,
        progress: Option<watch::Sender<UploadProgress>>,
    ) -> ClientResult<UploadResponse> {
        let file_error =
            |e: std::io::Error| ClientError::File(format!("{}: {}", file.path.display(), e));
        let handle = tokio::fs::File::open(&file.path).await.map_err(file_error)?;
        let total = handle.metadata().await.map_err(file_error)?.len();

        if let Some(tx) = &progress {
            let _ = tx.send(UploadProgress { sent: 0, total });
        }

        // The service reads `type` and `entityId` before it streams the file
        let mut form = multipart::Form::new().text("type", kind.as_str());
        if let Some(id) = entity_id {
            form = form.text("entityId", id.to_string());
        }
        let body = progress_stream(handle, total, UPLOAD_CHUNK_BYTES, progress);
        let part = multipart::Part::stream_with_length(reqwest::Body::wrap_stream(body), total)
            .file_name(file.name.clone());
        form = form.part("file", part);

        debug!(file = %file.name, kind = %kind, "Uploading");
        let response = self
            .authorized(self.http.post(self.url("/api/upload")).multipart(form))
            .timeout(Duration::from_secs(60 * 60))
            .send()
            .await?;
        decode(response).await
    }

    async fn lookup_gtin(&self, gtin: &str) -> ClientResult<GtinLookup> {
        self.get_json("/api/gtin-lookup", &[("gtin", gtin)]).await
    }

    async fn verify_isrc(&self, isrc: &str) -> ClientResult<IsrcLookup> {
        self.get_json("/api/verify-isrc", &[("isrc", isrc)]).await
    }

    async fn verify_iswc(&self, iswc: &str) -> ClientResult<IswcLookup> {
        self.get_json("/api/verify-iswc", &[("iswc", iswc)]).await
    }

    async fn send_invite(&self, invite: &NewInvite) -> ClientResult<Invite> {
        self.post_json("/api/music-release-invites", invite).await
    }

    async fn report_error(&self, report: &ErrorReport) -> ClientResult<()> {
        let _: serde_json::Value = self.post_json("/api/music-release-errors", report).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_percent() {
        assert_eq!(UploadProgress::default().percent(), 0);
        assert_eq!(UploadProgress { sent: 50, total: 200 }.percent(), 25);
        assert_eq!(UploadProgress { sent: 300, total: 200 }.percent(), 100);
    }

    #[tokio::test]
    async fn test_progress_reported_per_chunk() {
        let content: &'static [u8] = &[7u8; 64];
        let (tx, mut rx) = watch::channel(UploadProgress::default());
        let mut stream = Box::pin(progress_stream(content, 64, 4, Some(tx)));

        let mut seen = Vec::new();
        let mut received = 0;
        while let Some(chunk) = stream.try_next().await.unwrap() {
            received += chunk.len();
            seen.push(rx.borrow_and_update().sent);
        }

        assert_eq!(received, 64);
        assert!(seen.len() > 1, "expected several chunks, got {:?}", seen);
        assert!(seen.windows(2).all(|w| w[0] < w[1]));
        assert!(seen.iter().any(|&sent| sent > 0 && sent < 64));
        assert_eq!(rx.borrow().percent(), 100);
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let backend = HttpBackend::new("http://127.0.0.1:5780/", None).unwrap();
        assert_eq!(backend.url("/api/upload"), "http://127.0.0.1:5780/api/upload");
    }
}
