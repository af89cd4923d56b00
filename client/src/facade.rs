//! Endpoint façade
//!
//! Binds the fetch engine to the three upstream APIs. v1 and GeoFRED take
//! the credential as the `api_key` query parameter; v2 takes it as an
//! `api_key` request header and must never see it in the query string.

use crate::client::FredClient;
use crate::error::FredError;
use crate::redact::API_KEY_PARAM;
use crate::JsonObject;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

/// Which upstream API a call targets
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Upstream {
    /// FRED API v1
    Fred,
    /// GeoFRED maps API
    GeoFred,
    /// FRED API v2
    FredV2,
}

/// How the credential travels
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthScheme {
    /// `?api_key=...`
    QueryParameter,
    /// `api_key: ...` header
    Header,
}

impl Upstream {
    /// Authentication convention of this upstream
    #[must_use]
    pub const fn auth(self) -> AuthScheme {
        match self {
            Self::Fred | Self::GeoFred => AuthScheme::QueryParameter,
            Self::FredV2 => AuthScheme::Header,
        }
    }

    /// Configured base URL of this upstream
    #[must_use]
    pub fn base_url(self, client: &FredClient) -> &str {
        let config = client.config();
        match self {
            Self::Fred => &config.fred_base_url,
            Self::GeoFred => &config.geofred_base_url,
            Self::FredV2 => &config.fred_v2_base_url,
        }
    }
}

impl FredClient {
    /// GET `endpoint` on the given upstream with its auth convention
    ///
    /// # Errors
    ///
    /// See [`FredClient::fetch_json`]. A key that cannot be encoded as a
    /// header value is reported as `FredError::Validation`.
    pub async fn get(
        &self,
        upstream: Upstream,
        endpoint: &str,
        params: JsonObject,
    ) -> Result<JsonObject, FredError> {
        let base_url = upstream.base_url(self);
        match upstream.auth() {
            AuthScheme::QueryParameter => {
                self.fetch_json(base_url, endpoint, params, None, true).await
            }
            AuthScheme::Header => {
                let headers = self.api_key_header()?;
                self.fetch_json(base_url, endpoint, params, Some(headers), false)
                    .await
            }
        }
    }

    /// GET a FRED v1 endpoint
    ///
    /// # Errors
    ///
    /// See [`FredClient::fetch_json`].
    pub async fn fred_get(
        &self,
        endpoint: &str,
        params: JsonObject,
    ) -> Result<JsonObject, FredError> {
        self.get(Upstream::Fred, endpoint, params).await
    }

    /// GET a GeoFRED endpoint
    ///
    /// # Errors
    ///
    /// See [`FredClient::fetch_json`].
    pub async fn geofred_get(
        &self,
        endpoint: &str,
        params: JsonObject,
    ) -> Result<JsonObject, FredError> {
        self.get(Upstream::GeoFred, endpoint, params).await
    }

    /// GET a FRED v2 endpoint
    ///
    /// # Errors
    ///
    /// See [`FredClient::fetch_json`].
    pub async fn fred_v2_get(
        &self,
        endpoint: &str,
        params: JsonObject,
    ) -> Result<JsonObject, FredError> {
        self.get(Upstream::FredV2, endpoint, params).await
    }

    fn api_key_header(&self) -> Result<HeaderMap, FredError> {
        let key = self.config().api_key()?;
        let mut value = HeaderValue::from_str(key).map_err(|_| {
            FredError::Validation(
                "FRED_API_KEY contains characters not allowed in an HTTP header".to_string(),
            )
        })?;
        value.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(HeaderName::from_static(API_KEY_PARAM), value);
        Ok(headers)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code
mod tests {
    use super::*;
    use crate::config::{FRED_API_BASE, FRED_V2_API_BASE, FredConfig, GEOFRED_API_BASE};

    #[test]
    fn test_auth_conventions() {
        assert_eq!(Upstream::Fred.auth(), AuthScheme::QueryParameter);
        assert_eq!(Upstream::GeoFred.auth(), AuthScheme::QueryParameter);
        assert_eq!(Upstream::FredV2.auth(), AuthScheme::Header);
    }

    #[test]
    fn test_default_base_urls() {
        let client = FredClient::new(FredConfig::new("key"));
        assert_eq!(Upstream::Fred.base_url(&client), FRED_API_BASE);
        assert_eq!(Upstream::GeoFred.base_url(&client), GEOFRED_API_BASE);
        assert_eq!(Upstream::FredV2.base_url(&client), FRED_V2_API_BASE);
    }

    #[test]
    fn test_api_key_header() {
        let client = FredClient::new(FredConfig::new("test-fred-api-key"));
        let headers = client.api_key_header().unwrap();
        assert_eq!(headers.get("api_key").unwrap(), "test-fred-api-key");
        assert!(headers.get("api_key").unwrap().is_sensitive());
    }

    #[tokio::test]
    async fn test_v2_requires_key_before_io() {
        let client = FredClient::new(FredConfig::new(""));
        let result = client.fred_v2_get("release/observations", JsonObject::new()).await;
        assert!(matches!(result, Err(FredError::Validation(_))));
        assert!(!client.pool().is_initialized().await);
    }
}
