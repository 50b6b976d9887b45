//! Async Yandex.Translate client

use reqwest::{StatusCode, Url};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::core::config::TranslatorConfig;
use crate::core::errors::{ApiError, Result, TranslationError};
use crate::core::models::{ErrorBody, LanguageTag, TranslationRequest, TranslationResult};

/// Path of the translate method, relative to the base URL
const TRANSLATE_PATH: &str = "translate";

/// Placeholder for the API key in logged and reported URLs
const REDACTED: &str = "REDACTED";

/// Client for the Yandex.Translate `translate` method
///
/// Holds only immutable configuration and a pooled HTTP client, so it can be
/// cloned and shared across tasks freely.
#[derive(Clone)]
pub struct YandexTranslator {
    client: reqwest::Client,
    config: Arc<TranslatorConfig>,
    base_url: Url,
}

impl fmt::Debug for YandexTranslator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("YandexTranslator")
            .field("base_url", &self.base_url.as_str())
            .field("timeout_ms", &self.config.timeout_ms)
            .finish_non_exhaustive()
    }
}

impl YandexTranslator {
    /// Create a new translator
    ///
    /// `http_client` is the transport to send requests over; `None` builds a
    /// default client using the configured timeout.
    pub fn new(config: TranslatorConfig, http_client: Option<reqwest::Client>) -> Result<Self> {
        config.validate()?;

        let base_url = parse_base_url(&config.base_url)?;
        let client = match http_client {
            Some(client) => client,
            None => default_client(&config)?,
        };

        Ok(Self {
            client,
            config: Arc::new(config),
            base_url,
        })
    }

    /// Create from environment
    pub fn from_env() -> Result<Self> {
        let config = TranslatorConfig::from_env()?;
        Self::new(config, None)
    }

    /// Base URL requests are resolved against
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Translate `text` into `to`, letting the provider detect the source when `from` is `None`
    ///
    /// Returns the first candidate translation.
    pub async fn translate(
        &self,
        from: Option<&LanguageTag>,
        to: &LanguageTag,
        text: &str,
    ) -> Result<String> {
        let request = TranslationRequest::new(text, *to).with_source_lang(from.copied());
        self.translate_request(&request).await?.into_first()
    }

    /// Translate, giving up when `cancel` fires first
    pub async fn translate_with_cancel(
        &self,
        from: Option<&LanguageTag>,
        to: &LanguageTag,
        text: &str,
        cancel: &CancellationToken,
    ) -> Result<String> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                warn!("Translation to {} cancelled", to);
                Err(TranslationError::Cancelled)
            }
            result = self.translate(from, to, text) => result,
        }
    }

    /// Translate, giving up when `deadline` elapses first
    pub async fn translate_with_deadline(
        &self,
        from: Option<&LanguageTag>,
        to: &LanguageTag,
        text: &str,
        deadline: Duration,
    ) -> Result<String> {
        tokio::time::timeout(deadline, self.translate(from, to, text))
            .await
            .map_err(|_| {
                warn!("Translation to {} exceeded deadline of {:?}", to, deadline);
                TranslationError::TimeoutError
            })?
    }

    /// Translate a request and return the full provider result
    ///
    /// The returned result always has at least one candidate in `text`.
    pub async fn translate_request(&self, request: &TranslationRequest) -> Result<TranslationResult> {
        let result = self.send_request(request).await?;

        if result.text.is_empty() {
            warn!("Provider returned no translations for {}", request.lang_pair());
            return Err(TranslationError::EmptyResultError);
        }

        info!(
            "Translated {} chars using {} ({} candidates)",
            request.text.chars().count(),
            result.lang,
            result.text.len()
        );
        Ok(result)
    }

    /// Build the translate URL carrying `lang` and `key` query parameters
    pub(crate) fn translate_url(&self, request: &TranslationRequest) -> Result<Url> {
        let mut url = self
            .base_url
            .join(TRANSLATE_PATH)
            .map_err(|e| TranslationError::RequestBuildError {
                message: e.to_string(),
            })?;

        url.query_pairs_mut()
            .append_pair("lang", &request.lang_pair())
            .append_pair("key", &self.config.api_key);

        Ok(url)
    }

    /// Send actual HTTP request
    async fn send_request(&self, request: &TranslationRequest) -> Result<TranslationResult> {
        let url = self.translate_url(request)?;
        let redacted_url = redact(&url);

        let http_request = self
            .client
            .post(url)
            .form(&[("text", request.text.as_str())])
            .build()
            .map_err(|e| TranslationError::RequestBuildError {
                message: e.without_url().to_string(),
            })?;
        let method = http_request.method().as_str().to_string();

        debug!("Sending {} {}", method, redacted_url);

        let response = self
            .client
            .execute(http_request)
            .await
            .map_err(transport_error)?;

        let status = response.status();
        debug!("Received HTTP {} from {}", status.as_u16(), redacted_url);

        if status != StatusCode::OK {
            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => {
                    warn!("Failed to read error body: {}", e.without_url());
                    String::new()
                }
            };

            // The status alone is enough to fail; the body only adds detail
            let parsed: ErrorBody = serde_json::from_str(&body).unwrap_or_else(|e| {
                debug!("Error body is not JSON: {}", e);
                ErrorBody::default()
            });

            return Err(ApiError {
                status: status.as_u16(),
                code: parsed.code,
                message: parsed.message,
                method,
                url: redacted_url,
                body,
            }
            .into());
        }

        let body = response.text().await.map_err(transport_error)?;

        serde_json::from_str(&body).map_err(|e| TranslationError::DecodeError {
            message: e.to_string(),
        })
    }
}

fn parse_base_url(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw.trim()).map_err(|e| TranslationError::RequestBuildError {
        message: format!("invalid base URL {:?}: {}", raw, e),
    })?;

    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(TranslationError::RequestBuildError {
            message: format!("invalid base URL {:?}: expected an http(s) URL", raw),
        });
    }

    // Without a trailing slash, joining would replace the last path segment
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}

fn default_client(config: &TranslatorConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_millis(config.timeout_ms))
        .pool_idle_timeout(Some(Duration::from_secs(30)))
        .build()
        .map_err(|e| TranslationError::RequestBuildError {
            message: e.to_string(),
        })
}

fn transport_error(err: reqwest::Error) -> TranslationError {
    if err.is_timeout() {
        return TranslationError::TimeoutError;
    }

    // reqwest errors carry the request URL, which includes the API key
    TranslationError::TransportError {
        message: err.without_url().to_string(),
    }
}

/// URL with the `key` query parameter masked
fn redact(url: &Url) -> String {
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(name, value)| {
            let value = if name == "key" {
                REDACTED.to_string()
            } else {
                value.into_owned()
            };
            (name.into_owned(), value)
        })
        .collect();

    let mut redacted = url.clone();
    redacted.query_pairs_mut().clear().extend_pairs(pairs);
    redacted.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn translator(base_url: &str) -> YandexTranslator {
        YandexTranslator::new(TranslatorConfig::new("secret").with_base_url(base_url), None)
            .unwrap()
    }

    fn request(from: Option<&str>, to: &str) -> TranslationRequest {
        TranslationRequest::new("Hello", LanguageTag::parse(to).unwrap())
            .with_source_lang(from.map(|f| LanguageTag::parse(f).unwrap()))
    }

    #[test]
    fn test_default_base_url() {
        let translator = translator(crate::core::config::DEFAULT_BASE_URL);
        let url = translator.translate_url(&request(Some("en"), "ru")).unwrap();

        assert_eq!(url.path(), "/api/v1.5/tr.json/translate");
        assert_eq!(url.query(), Some("lang=en-ru&key=secret"));
    }

    #[test]
    fn test_translate_url_without_source() {
        let translator = translator("http://localhost:8080/api/");
        let url = translator.translate_url(&request(None, "ru")).unwrap();

        assert_eq!(url.as_str(), "http://localhost:8080/api/translate?lang=ru&key=secret");
    }

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let translator = translator("http://localhost:8080/api");
        assert_eq!(translator.base_url().as_str(), "http://localhost:8080/api/");

        let url = translator.translate_url(&request(Some("de"), "en")).unwrap();
        assert_eq!(url.path(), "/api/translate");
    }

    #[test]
    fn test_malformed_base_url() {
        for bad in ["not a url", "mailto:someone@example.com", "ftp://example.com/"] {
            let err = YandexTranslator::new(TranslatorConfig::new("secret").with_base_url(bad), None)
                .unwrap_err();
            assert!(
                matches!(err, TranslationError::RequestBuildError { .. }),
                "{} gave {:?}",
                bad,
                err
            );
        }
    }

    #[test]
    fn test_missing_api_key() {
        let err = YandexTranslator::new(TranslatorConfig::default(), None).unwrap_err();
        assert!(matches!(err, TranslationError::ConfigError { .. }));
    }

    #[test]
    fn test_injected_client() {
        let client = reqwest::Client::new();
        let translator =
            YandexTranslator::new(TranslatorConfig::new("secret"), Some(client)).unwrap();
        assert_eq!(
            translator.base_url().as_str(),
            crate::core::config::DEFAULT_BASE_URL
        );
    }

    #[test]
    fn test_redact_hides_key() {
        let translator = translator("http://localhost:8080/api/");
        let url = translator.translate_url(&request(Some("en"), "ru")).unwrap();
        let redacted = redact(&url);

        assert!(!redacted.contains("secret"));
        assert!(redacted.contains("lang=en-ru"));
        assert!(redacted.contains("key=REDACTED"));
    }

    #[test]
    fn test_debug_hides_key() {
        let translator = translator("http://localhost:8080/api/");
        assert!(!format!("{:?}", translator).contains("secret"));
    }
}
