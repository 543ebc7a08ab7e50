//! HTTP transport used by every remote fetch in the pipeline.

use std::future::Future;
use std::time::Duration;

use crate::error::FetchError;

const USER_AGENT: &str = concat!("nlib/", env!("CARGO_PKG_VERSION"));

/// Minimal GET-only transport.
///
/// `timeout` bounds the whole request including the body; `None` leaves
/// only the client defaults in place.
pub trait Transport: Send + Sync {
    fn get_text(
        &self,
        url: &str,
        timeout: Option<Duration>,
    ) -> impl Future<Output = Result<String, FetchError>> + Send;

    fn get_bytes(
        &self,
        url: &str,
        timeout: Option<Duration>,
    ) -> impl Future<Output = Result<Vec<u8>, FetchError>> + Send;
}

/// `reqwest`-backed transport.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, FetchError> {
        let http = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self { http })
    }

    async fn send(
        &self,
        url: &str,
        timeout: Option<Duration>,
    ) -> Result<reqwest::Response, FetchError> {
        let mut request = self.http.get(url);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }
        let resp = request.send().await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(resp)
    }
}

impl Transport for HttpTransport {
    async fn get_text(&self, url: &str, timeout: Option<Duration>) -> Result<String, FetchError> {
        Ok(self.send(url, timeout).await?.text().await?)
    }

    async fn get_bytes(
        &self,
        url: &str,
        timeout: Option<Duration>,
    ) -> Result<Vec<u8>, FetchError> {
        let bytes = self.send(url, timeout).await?.bytes().await?;
        Ok(bytes.to_vec())
    }
}
