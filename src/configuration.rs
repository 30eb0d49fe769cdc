//! Service configuration for authorization and token flows
//!
//! A [`ServiceConfiguration`] is the immutable endpoint pair a flow needs,
//! built either from literal URIs or from a fetched discovery document.
//! Construction either fully succeeds or fails; there is no partially
//! populated state. Once built it never changes, so it is safe to share
//! across threads and to persist for later sessions.

use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use url::Url;

use crate::discovery::ServiceDiscovery;

/// Errors from configuration construction and persistence.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("invalid discovery document: {0}")]
    InvalidDiscovery(#[source] serde_json::Error),
}

/// The information needed to drive an authorization/token flow.
///
/// Equality and hashing cover the two endpoints only: the same endpoints
/// are the same configuration whether or not a cached discovery document
/// came along for the ride.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(into = "ConfigurationRecord", from = "ConfigurationRecord")]
pub struct ServiceConfiguration {
    authorization_endpoint: Url,
    token_endpoint: Url,
    discovery: Option<Arc<ServiceDiscovery>>,
}

impl ServiceConfiguration {
    /// Build a configuration from explicit endpoint URIs.
    ///
    /// No discovery document is retained; `Url` already guarantees both
    /// endpoints are absolute.
    pub fn new(authorization_endpoint: Url, token_endpoint: Url) -> Self {
        Self {
            authorization_endpoint,
            token_endpoint,
            discovery: None,
        }
    }

    /// Build a configuration from an already-parsed discovery document.
    ///
    /// The document was validated at parse time, so this cannot fail; the
    /// endpoints are copied out and the document is retained for later
    /// inspection or persistence.
    pub fn from_discovery(discovery: ServiceDiscovery) -> Self {
        Self {
            authorization_endpoint: discovery.authorization_endpoint.clone(),
            token_endpoint: discovery.token_endpoint.clone(),
            discovery: Some(Arc::new(discovery)),
        }
    }

    /// Parse a discovery document from JSON and build a configuration from
    /// it in one step.
    ///
    /// Fails if either required endpoint is missing or malformed in the
    /// document, producing no partially populated value.
    pub fn from_discovery_json(document: Value) -> Result<Self, ConfigurationError> {
        Ok(Self::from_discovery(ServiceDiscovery::from_json(document)?))
    }

    /// The authorization endpoint URI.
    pub fn authorization_endpoint(&self) -> &Url {
        &self.authorization_endpoint
    }

    /// The token exchange and refresh endpoint URI.
    pub fn token_endpoint(&self) -> &Url {
        &self.token_endpoint
    }

    /// The discovery document this configuration was derived from, if any.
    pub fn discovery_document(&self) -> Option<&ServiceDiscovery> {
        self.discovery.as_deref()
    }
}

impl PartialEq for ServiceConfiguration {
    fn eq(&self, other: &Self) -> bool {
        self.authorization_endpoint == other.authorization_endpoint
            && self.token_endpoint == other.token_endpoint
    }
}

impl Eq for ServiceConfiguration {}

impl Hash for ServiceConfiguration {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.authorization_endpoint.hash(state);
        self.token_endpoint.hash(state);
    }
}

/// Stable persisted form: both endpoints as strings plus the full discovery
/// document when one was retained. Decoding rejects records missing either
/// endpoint because both fields are required here.
#[derive(Serialize, Deserialize)]
struct ConfigurationRecord {
    authorization_endpoint: Url,
    token_endpoint: Url,
    #[serde(skip_serializing_if = "Option::is_none")]
    discovery_document: Option<ServiceDiscovery>,
}

impl From<ServiceConfiguration> for ConfigurationRecord {
    fn from(config: ServiceConfiguration) -> Self {
        ConfigurationRecord {
            authorization_endpoint: config.authorization_endpoint,
            token_endpoint: config.token_endpoint,
            discovery_document: config
                .discovery
                .map(|d| Arc::try_unwrap(d).unwrap_or_else(|d| (*d).clone())),
        }
    }
}

impl From<ConfigurationRecord> for ServiceConfiguration {
    fn from(record: ConfigurationRecord) -> Self {
        ServiceConfiguration {
            authorization_endpoint: record.authorization_endpoint,
            token_endpoint: record.token_endpoint,
            discovery: record.discovery_document.map(Arc::new),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn endpoints() -> (Url, Url) {
        (
            Url::parse("https://accounts.example.com/authorize").unwrap(),
            Url::parse("https://accounts.example.com/oauth/token").unwrap(),
        )
    }

    fn discovery_document() -> Value {
        json!({
            "issuer": "https://accounts.example.com",
            "authorization_endpoint": "https://accounts.example.com/authorize",
            "token_endpoint": "https://accounts.example.com/oauth/token",
            "jwks_uri": "https://accounts.example.com/jwks.json"
        })
    }

    #[test]
    fn explicit_construction_retains_no_document() {
        let (authorize, token) = endpoints();
        let config = ServiceConfiguration::new(authorize.clone(), token.clone());
        assert_eq!(config.authorization_endpoint(), &authorize);
        assert_eq!(config.token_endpoint(), &token);
        assert!(config.discovery_document().is_none());
    }

    #[test]
    fn discovery_construction_copies_endpoints_and_keeps_document() {
        let config = ServiceConfiguration::from_discovery_json(discovery_document()).unwrap();
        assert_eq!(
            config.authorization_endpoint().as_str(),
            "https://accounts.example.com/authorize"
        );
        assert_eq!(
            config.token_endpoint().as_str(),
            "https://accounts.example.com/oauth/token"
        );
        let document = config.discovery_document().expect("document retained");
        assert_eq!(document.issuer(), Some("https://accounts.example.com"));
    }

    #[test]
    fn explicit_and_discovery_configs_with_same_endpoints_are_equal() {
        let (authorize, token) = endpoints();
        let explicit = ServiceConfiguration::new(authorize, token);
        let discovered =
            ServiceConfiguration::from_discovery_json(discovery_document()).unwrap();
        assert_eq!(
            explicit, discovered,
            "equality must ignore the discovery document"
        );

        use std::collections::hash_map::DefaultHasher;
        let hash = |config: &ServiceConfiguration| {
            let mut hasher = DefaultHasher::new();
            config.hash(&mut hasher);
            hasher.finish()
        };
        assert_eq!(hash(&explicit), hash(&discovered), "hash must agree with eq");
    }

    #[test]
    fn differing_endpoints_are_not_equal() {
        let (authorize, token) = endpoints();
        let a = ServiceConfiguration::new(authorize.clone(), token);
        let b = ServiceConfiguration::new(
            authorize,
            Url::parse("https://other.example.com/token").unwrap(),
        );
        assert_ne!(a, b);
    }

    #[test]
    fn missing_token_endpoint_fails_construction() {
        let mut document = discovery_document();
        document.as_object_mut().unwrap().remove("token_endpoint");
        let result = ServiceConfiguration::from_discovery_json(document);
        assert!(matches!(
            result,
            Err(ConfigurationError::InvalidDiscovery(_))
        ));
    }

    #[test]
    fn roundtrip_without_discovery_document() {
        let (authorize, token) = endpoints();
        let config = ServiceConfiguration::new(authorize, token);
        let json = serde_json::to_string(&config).unwrap();
        assert!(
            !json.contains("discovery_document"),
            "absent document must not serialize a field, got: {json}"
        );
        let restored: ServiceConfiguration = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, config);
        assert!(restored.discovery_document().is_none());
    }

    #[test]
    fn roundtrip_with_discovery_document() {
        let config = ServiceConfiguration::from_discovery_json(discovery_document()).unwrap();
        let json = serde_json::to_string(&config).unwrap();
        let restored: ServiceConfiguration = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, config);

        let original = serde_json::to_value(config.discovery_document().unwrap()).unwrap();
        let roundtripped = serde_json::to_value(restored.discovery_document().unwrap()).unwrap();
        assert_eq!(
            roundtripped, original,
            "retained document must survive persistence"
        );
    }

    #[test]
    fn decoding_rejects_record_missing_an_endpoint() {
        let record = json!({
            "authorization_endpoint": "https://accounts.example.com/authorize"
        });
        let result: Result<ServiceConfiguration, _> = serde_json::from_value(record);
        assert!(result.is_err(), "persisted record without token_endpoint must fail");
    }
}
