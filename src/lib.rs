//! Core types for an OAuth 2.0 / OpenID Connect client
//!
//! Two pieces, usable independently:
//!
//! 1. **Error classification** — heterogeneous failure signals (transport
//!    errors, HTTP error responses, RFC 6749 error bodies) normalize into
//!    one canonical [`Error`] with a stable domain/code pair.
//! 2. **Service configuration** — the immutable authorization/token
//!    endpoint pair a flow needs, built from explicit URIs or extracted
//!    from a fetched discovery document, and persistable for later
//!    sessions.
//!
//! This crate performs no network I/O. Fetching, redirect handling, PKCE,
//! and token storage belong to the calling client; it hands already-parsed
//! responses and documents to this crate for classification and
//! resolution.

pub mod configuration;
pub mod discovery;
pub mod error;

pub use configuration::{ConfigurationError, ServiceConfiguration};
pub use discovery::ServiceDiscovery;
pub use error::{
    Cause, Error, ErrorCode, ErrorDomain, GeneralErrorCode, OAUTH_AUTHORIZATION_DOMAIN,
    OAUTH_TOKEN_DOMAIN, OAuthErrorCode, OAuthErrorResponse, is_oauth_error_domain, raise,
};
