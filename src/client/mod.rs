//! Typed HTTP client for the booking API.
//!
//! Every call returns a [`ClientError`] that tells apart a request that never
//! got an answer, an error envelope sent back by the server, and a request
//! that could not be built in the first place.

pub mod view;

use std::time::Duration;

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::models::{ApiResponse, Booking, FieldError, HealthReport, NewBooking};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Network error - Cannot connect to backend server: {0}")]
    NoResponse(String),

    #[error("{message}")]
    Server {
        status: u16,
        message: String,
        errors: Vec<FieldError>,
    },

    #[error("request error: {0}")]
    Request(String),
}

impl ClientError {
    fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_builder() {
            ClientError::Request(err.to_string())
        } else {
            ClientError::NoResponse(err.to_string())
        }
    }
}

pub struct BookingClient {
    http: reqwest::Client,
    base_url: String,
}

impl BookingClient {
    /// `base_url` points at the API root, e.g. `http://localhost:3000/api`.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Request(e.to_string()))?;
        let base_url: String = base_url.into();

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The server's `/health` lives beside `/api`, not under it.
    pub fn health_url(&self) -> String {
        let root = self
            .base_url
            .strip_suffix("/api")
            .unwrap_or(&self.base_url);
        format!("{root}/health")
    }

    /// Probes `/health`, reporting whether the server and its store are up.
    pub async fn test_connection(&self) -> Result<HealthReport, ClientError> {
        let url = self.health_url();
        tracing::debug!(method = "GET", url = %url, "api request");

        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| self.log_failure(&url, ClientError::from_reqwest(e)))?;

        let status = resp.status();
        tracing::debug!(status = status.as_u16(), url = %url, "api response");
        if !status.is_success() {
            return Err(self.log_failure(
                &url,
                ClientError::Server {
                    status: status.as_u16(),
                    message: "Backend server is not responding".to_string(),
                    errors: vec![],
                },
            ));
        }

        resp.json::<HealthReport>()
            .await
            .map_err(|e| self.log_failure(&url, unexpected_body(status, e)))
    }

    pub async fn create_booking(&self, booking: &NewBooking) -> Result<Booking, ClientError> {
        self.send(Method::POST, "/bookings", Some(booking)).await
    }

    pub async fn get_all_bookings(&self) -> Result<Vec<Booking>, ClientError> {
        self.send::<(), _>(Method::GET, "/bookings", None).await
    }

    async fn send<B, T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, ClientError>
    where
        B: Serialize + std::fmt::Debug,
        T: DeserializeOwned,
    {
        let url = format!("{}{path}", self.base_url);
        tracing::debug!(method = %method, url = %url, body = ?body, "api request");

        let mut req = self.http.request(method, &url);
        if let Some(body) = body {
            req = req.json(body);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| self.log_failure(&url, ClientError::from_reqwest(e)))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| self.log_failure(&url, ClientError::from_reqwest(e)))?;
        tracing::debug!(status = status.as_u16(), url = %url, body = %text, "api response");

        let envelope: ApiResponse<T> =
            decode_envelope(status, &text).map_err(|e| self.log_failure(&url, e))?;

        if !status.is_success() || !envelope.success {
            return Err(self.log_failure(
                &url,
                ClientError::Server {
                    status: status.as_u16(),
                    message: envelope
                        .message
                        .unwrap_or_else(|| format!("Server returned {status}")),
                    errors: envelope.errors.unwrap_or_default(),
                },
            ));
        }

        match envelope.data {
            Some(data) => Ok(data),
            None => Err(self.log_failure(
                &url,
                ClientError::Server {
                    status: status.as_u16(),
                    message: "Response is missing data".to_string(),
                    errors: vec![],
                },
            )),
        }
    }

    fn log_failure(&self, url: &str, err: ClientError) -> ClientError {
        match &err {
            ClientError::NoResponse(detail) => {
                tracing::error!(url = %url, error = %detail, "api error");
                tracing::warn!(base_url = %self.base_url, "network error - backend might be down");
            }
            ClientError::Server { status, message, .. } => {
                tracing::error!(url = %url, status = *status, message = %message, "api error");
            }
            ClientError::Request(detail) => {
                tracing::error!(url = %url, error = %detail, "request error");
            }
        }
        err
    }
}

/// Parses a response body into the API envelope. A body that is not an
/// envelope is "Unexpected response" on success and the bare status otherwise.
fn decode_envelope<T: DeserializeOwned>(
    status: StatusCode,
    text: &str,
) -> Result<ApiResponse<T>, ClientError> {
    serde_json::from_str(text).map_err(|_| ClientError::Server {
        status: status.as_u16(),
        message: if status.is_success() {
            "Unexpected response from server".to_string()
        } else {
            format!("Server returned {status}")
        },
        errors: vec![],
    })
}

fn unexpected_body(status: StatusCode, err: reqwest::Error) -> ClientError {
    if err.is_decode() {
        ClientError::Server {
            status: status.as_u16(),
            message: "Unexpected response from server".to_string(),
            errors: vec![],
        }
    } else {
        ClientError::from_reqwest(err)
    }
}
