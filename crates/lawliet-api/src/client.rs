// Carving service HTTP client
//
// Wraps `reqwest::Client` with base-URL path construction and
// `{ success, error }` envelope unwrapping. Endpoint groups (images,
// devices, recovery, files) are implemented as inherent methods in
// separate files to keep this module focused on transport mechanics.

use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::models::Envelope;
use crate::transport::TransportConfig;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Raw HTTP client for the carving service API.
///
/// Every method returns the decoded payload on `success: true` and an
/// [`Error::Server`] carrying the service's `error` string otherwise.
/// Connectivity problems surface as [`Error::Transport`] or
/// [`Error::Timeout`]; nothing here panics on a bad reply.
#[derive(Clone)]
pub struct RecoveryClient {
    http: reqwest::Client,
    base_url: Url,
    timeout: Duration,
    upload_timeout: Option<Duration>,
}

impl RecoveryClient {
    /// Create a client from a `TransportConfig`.
    ///
    /// `base_url` is the API root, e.g. `http://localhost:5000/api`.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self {
            http,
            base_url,
            timeout: transport.timeout,
            upload_timeout: transport.upload_timeout,
        })
    }

    /// Create a client around a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self {
            http,
            base_url,
            timeout: DEFAULT_TIMEOUT,
            upload_timeout: None,
        }
    }

    /// The API root URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The per-request timeout applied to non-upload calls.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Append path segments to the API root, percent-encoding each one.
    ///
    /// Image names and recovered-file paths come from the server and may
    /// contain spaces or other reserved characters.
    pub(crate) fn api_url<I, S>(&self, segments: I) -> Result<Url, Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET request and unwrap the envelope.
    pub(crate) async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {}", url);

        let resp = self
            .http
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| self.send_error(e))?;

        self.parse_envelope(resp).await
    }

    /// Send a POST request with JSON body and unwrap the envelope.
    pub(crate) async fn post<T: DeserializeOwned>(
        &self,
        url: Url,
        body: &impl Serialize,
    ) -> Result<T, Error> {
        debug!("POST {}", url);

        let resp = self
            .http
            .post(url)
            .timeout(self.timeout)
            .json(body)
            .send()
            .await
            .map_err(|e| self.send_error(e))?;

        self.parse_envelope(resp).await
    }

    /// Send a DELETE request and unwrap the envelope.
    pub(crate) async fn delete<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("DELETE {}", url);

        let resp = self
            .http
            .delete(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| self.send_error(e))?;

        self.parse_envelope(resp).await
    }

    /// Post a multipart form, honoring the upload timeout instead of the
    /// request timeout.
    pub(crate) async fn post_multipart<T: DeserializeOwned>(
        &self,
        url: Url,
        form: reqwest::multipart::Form,
    ) -> Result<T, Error> {
        debug!("POST (multipart) {}", url);

        let mut req = self.http.post(url).multipart(form);
        if let Some(timeout) = self.upload_timeout {
            req = req.timeout(timeout);
        }

        let resp = req.send().await.map_err(|e| self.send_error(e))?;
        self.parse_envelope(resp).await
    }

    /// Fetch a raw body, mapping a JSON failure reply to [`Error::Server`].
    pub(crate) async fn get_bytes(&self, url: Url) -> Result<bytes::Bytes, Error> {
        debug!("GET (raw) {}", url);

        let resp = self
            .http
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| self.send_error(e))?;

        let status = resp.status();
        if status.is_success() {
            return resp.bytes().await.map_err(|e| self.send_error(e));
        }

        let body = resp.text().await.map_err(|e| self.send_error(e))?;
        Err(server_failure(status, &body))
    }

    /// Translate a reqwest failure, folding timeouts into [`Error::Timeout`].
    pub(crate) fn send_error(&self, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::Timeout {
                timeout_secs: self.timeout.as_secs(),
            }
        } else {
            Error::Transport(err)
        }
    }

    /// Parse the `{ success, error }` envelope, then decode the payload.
    ///
    /// The service reports failures with a JSON body on 4xx/5xx statuses,
    /// so the body is inspected before the status code.
    async fn parse_envelope<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();
        let body = resp.text().await.map_err(|e| self.send_error(e))?;
        trace!(status = status.as_u16(), body = %body, "response");

        let envelope: Envelope = match serde_json::from_str(&body) {
            Ok(envelope) => envelope,
            Err(_) if !status.is_success() => return Err(server_failure(status, &body)),
            Err(e) => {
                return Err(Error::Deserialization {
                    message: e.to_string(),
                    body,
                });
            }
        };

        if !envelope.success {
            return Err(Error::Server {
                message: envelope
                    .error
                    .or(envelope.message)
                    .unwrap_or_else(|| format!("request failed (HTTP {})", status.as_u16())),
                status: status.as_u16(),
            });
        }

        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body,
        })
    }
}

/// Build a server error from a non-success response body, preferring the
/// envelope's `error` string when the body carries one.
fn server_failure(status: reqwest::StatusCode, body: &str) -> Error {
    let message = serde_json::from_str::<Envelope>(body)
        .ok()
        .and_then(|env| env.error)
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .map_or_else(|| format!("HTTP {}", status.as_u16()), str::to_owned)
        });

    Error::Server {
        message,
        status: status.as_u16(),
    }
}
