use std::time::{Duration, Instant};

use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{RequestBuilder, StatusCode};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::Result;
use crate::config::DiscordSettings;
use crate::error::{ConfigError, DiscordError};

use super::models::{ApiErrorBody, body_preview};

const CORRELATION_HEADER: &str = "x-correlation-id";

pub(super) type CallResult<T> = std::result::Result<T, DiscordError>;

/// Authenticated Discord REST client. Not usable for sending until it has
/// been turned into a [`super::Session`] with [`DiscordClient::connect`].
#[derive(Clone)]
pub struct DiscordClient {
    http: reqwest::Client,
    base: Url,
    correlation_id: String,
    pub(super) ready_timeout: Duration,
}

impl DiscordClient {
    /// Build a client from the Discord settings.
    ///
    /// # Errors
    ///
    /// Returns an error when no token is configured, when the token cannot be
    /// sent as a header, or when the HTTP client fails to build.
    pub fn new(settings: &DiscordSettings, correlation_id: &str) -> Result<Self> {
        let token = settings.token()?;

        let mut auth = HeaderValue::from_str(&format!("Bot {}", token.expose_secret()))
            .map_err(|_| ConfigError::InvalidField {
                field: "discord.token",
                message: "token contains characters not allowed in a header".to_string(),
            })?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let mut builder = reqwest::Client::builder()
            .default_headers(headers)
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .user_agent(concat!(
                "DiscordBot (",
                env!("CARGO_PKG_NAME"),
                ", ",
                env!("CARGO_PKG_VERSION"),
                ")"
            ));

        if settings.api_base.scheme() == "https" {
            builder = builder.https_only(true);
        }

        let http = builder
            .build()
            .map_err(|err| DiscordError::Client { source: err })?;

        Ok(Self {
            http,
            base: settings.api_base.clone(),
            correlation_id: correlation_id.to_string(),
            ready_timeout: settings.ready_timeout,
        })
    }

    pub(super) async fn get<T>(&self, segments: &[&str]) -> CallResult<T>
    where
        T: DeserializeOwned,
    {
        let url = self.endpoint(segments)?;
        let label = format!("GET {}", url.path());
        self.execute(self.http.get(url), &label).await
    }

    pub(super) async fn post<B, T>(&self, segments: &[&str], body: &B) -> CallResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(segments)?;
        let label = format!("POST {}", url.path());
        self.execute(self.http.post(url).json(body), &label).await
    }

    fn endpoint(&self, segments: &[&str]) -> CallResult<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| DiscordError::Endpoint {
                endpoint: segments.join("/"),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn execute<T>(&self, request: RequestBuilder, label: &str) -> CallResult<T>
    where
        T: DeserializeOwned,
    {
        let started = Instant::now();
        let response = request
            .header(CORRELATION_HEADER, &self.correlation_id)
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;

        if status == StatusCode::UNAUTHORIZED {
            return Err(DiscordError::Unauthorized);
        }

        if !status.is_success() {
            debug!(
                endpoint = label,
                status = status.as_u16(),
                body = %body_preview(&body),
                "discord call rejected"
            );
            return Err(match serde_json::from_slice::<ApiErrorBody>(&body) {
                Ok(api) => DiscordError::Api {
                    status,
                    code: api.code,
                    message: api.message,
                },
                Err(_) => DiscordError::HttpStatus { status },
            });
        }

        let value = serde_json::from_slice(&body).map_err(|err| DiscordError::Json {
            message: format!(
                "error decoding response body: {err}; body preview: {}",
                body_preview(&body)
            ),
        })?;

        debug!(
            endpoint = label,
            correlation_id = %self.correlation_id,
            latency_ms = started.elapsed().as_millis(),
            "discord call succeeded"
        );
        Ok(value)
    }
}
