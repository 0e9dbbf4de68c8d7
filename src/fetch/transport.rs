use super::errors::FetchError;
use async_trait::async_trait;
use bytes::Bytes;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Status and raw body of a completed GET
#[derive(Debug, Clone)]
pub struct Response {
    pub status: u16,
    pub body: Bytes,
}

impl Response {
    #[must_use]
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Network seam used by every fetch attempt.
///
/// `cancel` belongs to the attempt issuing the request. Implementations that
/// observe it should give up and return [`FetchError::Cancelled`]; ignoring it
/// is allowed, the caller discards stale outcomes either way. A `Cancelled`
/// returned while `cancel` is still live is treated as a failed request.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str, cancel: &CancellationToken) -> Result<Response, FetchError>;
}

/// reqwest-backed transport
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: Option<String>,
}

impl HttpTransport {
    /// # Errors
    ///
    /// Will return `Err` if the underlying http client cannot be built
    pub fn new(base_url: Option<&str>) -> crate::error::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("fetchdeck/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.map(|b| b.trim_end_matches('/').to_string()),
        })
    }

    #[must_use]
    pub fn resolve(&self, url: &str) -> String {
        match &self.base_url {
            Some(base) if url.starts_with('/') => format!("{base}{url}"),
            _ => url.to_string(),
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str, cancel: &CancellationToken) -> Result<Response, FetchError> {
        let target = self.resolve(url);
        debug!("GET {target}");

        let request = async {
            let response = self.client.get(&target).send().await?;
            let status = response.status().as_u16();
            let body = response.bytes().await?;
            Ok::<_, FetchError>(Response { status, body })
        };

        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(FetchError::Cancelled),
            result = request => result,
        }
    }
}
