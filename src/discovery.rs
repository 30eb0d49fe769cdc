//! Parsed OpenID Connect discovery documents
//!
//! A [`ServiceDiscovery`] is built from an already-fetched
//! `/.well-known/openid-configuration` body. Only the two endpoints this
//! client needs are typed and validated; every other field the provider
//! publishes is preserved opaquely so persistence round-trips do not lose
//! information.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::configuration::ConfigurationError;

/// A provider's discovery document, validated to contain the endpoints an
/// authorization/token flow needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceDiscovery {
    /// The authorization endpoint URI (required)
    pub authorization_endpoint: Url,
    /// The token exchange and refresh endpoint URI (required)
    pub token_endpoint: Url,
    /// All other provider metadata, passed through untouched
    #[serde(flatten)]
    extra: serde_json::Map<String, Value>,
}

impl ServiceDiscovery {
    /// Parse a discovery document from a JSON value.
    ///
    /// Fails if `authorization_endpoint` or `token_endpoint` is missing or
    /// not an absolute URI.
    pub fn from_json(document: Value) -> Result<Self, ConfigurationError> {
        serde_json::from_value(document).map_err(|e| {
            debug!(error = %e, "rejected discovery document");
            ConfigurationError::InvalidDiscovery(e)
        })
    }

    /// Parse a discovery document from raw response bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, ConfigurationError> {
        serde_json::from_slice(bytes).map_err(|e| {
            debug!(error = %e, "rejected discovery document");
            ConfigurationError::InvalidDiscovery(e)
        })
    }

    /// The provider's issuer identifier, if published.
    pub fn issuer(&self) -> Option<&str> {
        self.field_str("issuer")
    }

    /// The provider's JWKS URI, if published.
    pub fn jwks_uri(&self) -> Option<&str> {
        self.field_str("jwks_uri")
    }

    /// The provider's userinfo endpoint, if published.
    pub fn userinfo_endpoint(&self) -> Option<&str> {
        self.field_str("userinfo_endpoint")
    }

    /// Look up any pass-through field as a string.
    pub fn field_str(&self, name: &str) -> Option<&str> {
        self.extra.get(name).and_then(Value::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_document() -> Value {
        json!({
            "issuer": "https://accounts.example.com",
            "authorization_endpoint": "https://accounts.example.com/authorize",
            "token_endpoint": "https://accounts.example.com/oauth/token",
            "jwks_uri": "https://accounts.example.com/jwks.json",
            "userinfo_endpoint": "https://accounts.example.com/userinfo",
            "response_types_supported": ["code"],
            "scopes_supported": ["openid", "profile", "email"]
        })
    }

    #[test]
    fn parses_well_formed_document() {
        let discovery = ServiceDiscovery::from_json(full_document()).unwrap();
        assert_eq!(
            discovery.authorization_endpoint.as_str(),
            "https://accounts.example.com/authorize"
        );
        assert_eq!(
            discovery.token_endpoint.as_str(),
            "https://accounts.example.com/oauth/token"
        );
        assert_eq!(discovery.issuer(), Some("https://accounts.example.com"));
        assert_eq!(
            discovery.jwks_uri(),
            Some("https://accounts.example.com/jwks.json")
        );
        assert_eq!(
            discovery.userinfo_endpoint(),
            Some("https://accounts.example.com/userinfo")
        );
    }

    #[test]
    fn missing_token_endpoint_is_rejected() {
        let mut document = full_document();
        document.as_object_mut().unwrap().remove("token_endpoint");
        let result = ServiceDiscovery::from_json(document);
        assert!(result.is_err(), "document without token_endpoint must fail");
    }

    #[test]
    fn missing_authorization_endpoint_is_rejected() {
        let mut document = full_document();
        document
            .as_object_mut()
            .unwrap()
            .remove("authorization_endpoint");
        assert!(ServiceDiscovery::from_json(document).is_err());
    }

    #[test]
    fn relative_endpoint_is_rejected() {
        let mut document = full_document();
        document["token_endpoint"] = json!("/oauth/token");
        assert!(
            ServiceDiscovery::from_json(document).is_err(),
            "relative URI must not pass as an endpoint"
        );
    }

    #[test]
    fn unknown_fields_survive_a_round_trip() {
        let original = full_document();
        let discovery = ServiceDiscovery::from_json(original.clone()).unwrap();
        let reserialized = serde_json::to_value(&discovery).unwrap();
        assert_eq!(
            reserialized, original,
            "pass-through fields must be preserved byte-for-byte at the value level"
        );
    }

    #[test]
    fn from_slice_parses_raw_bytes() {
        let bytes = serde_json::to_vec(&full_document()).unwrap();
        let discovery = ServiceDiscovery::from_slice(&bytes).unwrap();
        assert_eq!(discovery.issuer(), Some("https://accounts.example.com"));
    }

    #[test]
    fn from_slice_rejects_non_json() {
        assert!(ServiceDiscovery::from_slice(b"<html>404</html>").is_err());
    }

    #[test]
    fn non_string_pass_through_field_reads_as_none() {
        let discovery = ServiceDiscovery::from_json(full_document()).unwrap();
        assert_eq!(discovery.field_str("response_types_supported"), None);
        assert_eq!(discovery.field_str("no_such_field"), None);
    }
}
