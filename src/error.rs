//! Canonical error classification for OAuth client flows
//!
//! Every failure signal the surrounding client sees — transport errors,
//! HTTP-level errors, and OAuth protocol error bodies per RFC 6749 — is
//! normalized into one [`Error`] value carrying a domain, a code scoped to
//! that domain, and a non-empty human-readable message. Collaborators that
//! perform the actual network I/O hand their raw material to the
//! constructors here and get back something stable enough to branch on.
//!
//! Unrecognized OAuth error tokens never fail classification: they resolve
//! to [`OAuthErrorCode::Other`] so servers emitting undocumented tokens
//! stay forward-compatible.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Shared reference to a lower-level cause. The classifier never takes
/// ownership of or mutates the cause; the caller keeps its own handle.
pub type Cause = Arc<dyn std::error::Error + Send + Sync + 'static>;

/// Origin of a classified error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorDomain {
    /// Internal client errors (JSON handling, canceled flows, ...)
    General,
    /// Transport and HTTP-level failures
    Network,
    /// Errors returned by the authorization endpoint (RFC 6749 §4.1.2.1)
    OAuthAuthorization,
    /// Errors returned by the token endpoint (RFC 6749 §5.2)
    OAuthToken,
    /// Errors returned by a resource server (RFC 6750)
    OAuthResourceServer,
    /// Origin could not be determined
    Unknown,
}

/// Stable domain identifier for the authorization endpoint domain.
pub const OAUTH_AUTHORIZATION_DOMAIN: &str = "oauth.authorization";

/// Stable domain identifier for the token endpoint domain.
pub const OAUTH_TOKEN_DOMAIN: &str = "oauth.token";

impl ErrorDomain {
    /// Stable string identifier, safe for persistence and log fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorDomain::General => "general",
            ErrorDomain::Network => "network",
            ErrorDomain::OAuthAuthorization => OAUTH_AUTHORIZATION_DOMAIN,
            ErrorDomain::OAuthToken => OAUTH_TOKEN_DOMAIN,
            ErrorDomain::OAuthResourceServer => "oauth.resource_server",
            ErrorDomain::Unknown => "unknown",
        }
    }

    /// Whether this domain carries RFC 6749 OAuth error semantics.
    pub fn is_oauth(&self) -> bool {
        matches!(
            self,
            ErrorDomain::OAuthAuthorization | ErrorDomain::OAuthToken
        )
    }
}

impl fmt::Display for ErrorDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns true iff the identifier names one of the two OAuth error domains.
///
/// Collaborators use this to decide whether a generic error value may carry
/// the richer RFC 6749 error-response semantics before downcasting.
pub fn is_oauth_error_domain(domain: &str) -> bool {
    domain == OAUTH_AUTHORIZATION_DOMAIN || domain == OAUTH_TOKEN_DOMAIN
}

/// Internal error codes for the general and network domains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeneralErrorCode {
    InvalidDiscoveryDocument,
    UserCanceledAuthorizationFlow,
    ProgramCanceledAuthorizationFlow,
    NetworkError,
    ServerError,
    JsonDeserializationError,
    JsonSerializationError,
    TokenUnavailable,
    TokenRefreshError,
}

impl GeneralErrorCode {
    /// Fixed default text used when no custom description and no
    /// underlying cause are supplied.
    pub fn default_message(&self) -> &'static str {
        match self {
            GeneralErrorCode::InvalidDiscoveryDocument => "Invalid discovery document",
            GeneralErrorCode::UserCanceledAuthorizationFlow => {
                "The authorization flow was canceled by the user"
            }
            GeneralErrorCode::ProgramCanceledAuthorizationFlow => {
                "The authorization flow was canceled programmatically"
            }
            GeneralErrorCode::NetworkError => "A network error occurred",
            GeneralErrorCode::ServerError => "The server returned an error",
            GeneralErrorCode::JsonDeserializationError => "JSON deserialization failed",
            GeneralErrorCode::JsonSerializationError => "JSON serialization failed",
            GeneralErrorCode::TokenUnavailable => "No valid token is available",
            GeneralErrorCode::TokenRefreshError => "The access token could not be refreshed",
        }
    }
}

/// RFC 6749 §4.1.2.1 / §5.2 error tokens, plus the RFC 6750 resource-server
/// tokens, plus an escape variant for anything a server invents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OAuthErrorCode {
    InvalidRequest,
    UnauthorizedClient,
    AccessDenied,
    UnsupportedResponseType,
    InvalidScope,
    ServerError,
    TemporarilyUnavailable,
    InvalidClient,
    InvalidGrant,
    UnsupportedGrantType,
    /// RFC 6750: the access token is expired, revoked, or malformed
    InvalidToken,
    /// RFC 6750: the token's scope is insufficient for the request
    InsufficientScope,
    /// Token not defined by RFC 6749/6750
    Other,
}

impl OAuthErrorCode {
    /// Resolve an OAuth error token string to a code.
    ///
    /// Total: unrecognized tokens map to [`OAuthErrorCode::Other`] rather
    /// than failing, preserving forward compatibility with servers that
    /// emit undocumented tokens.
    pub fn from_token(token: &str) -> Self {
        match token {
            "invalid_request" => OAuthErrorCode::InvalidRequest,
            "unauthorized_client" => OAuthErrorCode::UnauthorizedClient,
            "access_denied" => OAuthErrorCode::AccessDenied,
            "unsupported_response_type" => OAuthErrorCode::UnsupportedResponseType,
            "invalid_scope" => OAuthErrorCode::InvalidScope,
            "server_error" => OAuthErrorCode::ServerError,
            "temporarily_unavailable" => OAuthErrorCode::TemporarilyUnavailable,
            "invalid_client" => OAuthErrorCode::InvalidClient,
            "invalid_grant" => OAuthErrorCode::InvalidGrant,
            "unsupported_grant_type" => OAuthErrorCode::UnsupportedGrantType,
            "invalid_token" => OAuthErrorCode::InvalidToken,
            "insufficient_scope" => OAuthErrorCode::InsufficientScope,
            _ => OAuthErrorCode::Other,
        }
    }

    /// The wire token for this code, if RFC-defined.
    pub fn as_token(&self) -> Option<&'static str> {
        match self {
            OAuthErrorCode::InvalidRequest => Some("invalid_request"),
            OAuthErrorCode::UnauthorizedClient => Some("unauthorized_client"),
            OAuthErrorCode::AccessDenied => Some("access_denied"),
            OAuthErrorCode::UnsupportedResponseType => Some("unsupported_response_type"),
            OAuthErrorCode::InvalidScope => Some("invalid_scope"),
            OAuthErrorCode::ServerError => Some("server_error"),
            OAuthErrorCode::TemporarilyUnavailable => Some("temporarily_unavailable"),
            OAuthErrorCode::InvalidClient => Some("invalid_client"),
            OAuthErrorCode::InvalidGrant => Some("invalid_grant"),
            OAuthErrorCode::UnsupportedGrantType => Some("unsupported_grant_type"),
            OAuthErrorCode::InvalidToken => Some("invalid_token"),
            OAuthErrorCode::InsufficientScope => Some("insufficient_scope"),
            OAuthErrorCode::Other => None,
        }
    }

    /// Default text per RFC 6749/6750 terminology.
    pub fn default_message(&self) -> &'static str {
        match self {
            OAuthErrorCode::InvalidRequest => {
                "The request is missing a required parameter or is otherwise malformed"
            }
            OAuthErrorCode::UnauthorizedClient => {
                "The client is not authorized to use this grant type"
            }
            OAuthErrorCode::AccessDenied => {
                "The resource owner or authorization server denied the request"
            }
            OAuthErrorCode::UnsupportedResponseType => {
                "The authorization server does not support this response type"
            }
            OAuthErrorCode::InvalidScope => {
                "The requested scope is invalid, unknown, or malformed"
            }
            OAuthErrorCode::ServerError => {
                "The authorization server encountered an unexpected condition"
            }
            OAuthErrorCode::TemporarilyUnavailable => {
                "The authorization server is temporarily unavailable"
            }
            OAuthErrorCode::InvalidClient => "Client authentication failed",
            OAuthErrorCode::InvalidGrant => {
                "The provided authorization grant is invalid, expired, or revoked"
            }
            OAuthErrorCode::UnsupportedGrantType => {
                "The authorization server does not support this grant type"
            }
            OAuthErrorCode::InvalidToken => {
                "The access token is expired, revoked, malformed, or otherwise invalid"
            }
            OAuthErrorCode::InsufficientScope => {
                "The request requires higher privileges than provided by the access token"
            }
            OAuthErrorCode::Other => "An unrecognized OAuth error was returned",
        }
    }
}

/// Code scoped to its domain's code space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    General(GeneralErrorCode),
    OAuth(OAuthErrorCode),
    /// Caller-supplied numeric code from a resource-server response
    ResourceServer(i64),
}

/// OAuth error response body per RFC 6749 §5.2 / §4.1.2.1.
///
/// `error` is required on the wire but optional here: a body missing it
/// still classifies (as [`OAuthErrorCode::Other`]) instead of failing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OAuthErrorResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_uri: Option<String>,
}

/// The canonical error value all failure paths converge to.
///
/// `domain` and `code` are always set and `message` is never empty, so a
/// terminal error can always drive UI branching or retry logic.
#[derive(Debug, Clone)]
pub struct Error {
    domain: ErrorDomain,
    code: ErrorCode,
    message: String,
    underlying: Option<Cause>,
}

impl Error {
    /// Classify an internal error code into the general domain.
    ///
    /// Message precedence: custom description, else the underlying cause's
    /// display, else the code's fixed default text. The cause is preserved
    /// for diagnostics even when a description wins.
    pub fn from_code(
        code: GeneralErrorCode,
        underlying: Option<Cause>,
        description: Option<String>,
    ) -> Error {
        let message = description
            .filter(|d| !d.is_empty())
            .or_else(|| underlying.as_ref().map(|e| e.to_string()))
            .unwrap_or_else(|| code.default_message().to_string());
        Error {
            domain: ErrorDomain::General,
            code: ErrorCode::General(code),
            message,
            underlying,
        }
    }

    /// Classify an RFC 6749 error response from an authorization or token
    /// endpoint.
    ///
    /// `domain` must be [`ErrorDomain::OAuthAuthorization`] or
    /// [`ErrorDomain::OAuthToken`]; anything else is programmer misuse and
    /// aborts via [`raise`]. An absent or unrecognized `error` token
    /// resolves to [`OAuthErrorCode::Other`] — this constructor never fails
    /// for malformed protocol input.
    pub fn oauth(
        domain: ErrorDomain,
        response: &OAuthErrorResponse,
        underlying: Option<Cause>,
    ) -> Error {
        if !domain.is_oauth() {
            raise(
                "InvalidOAuthErrorDomain",
                Some(&format!("{domain} is not an OAuth error domain")),
            );
        }
        let code = resolve_oauth_code(response);
        Error {
            domain,
            code: ErrorCode::OAuth(code),
            message: oauth_message(code, response),
            underlying,
        }
    }

    /// Classify an OAuth-shaped error response from a resource server.
    ///
    /// The numeric code space is the resource server's own; the string
    /// `error` token is still resolved for message synthesis.
    pub fn resource_server(
        code: i64,
        response: &OAuthErrorResponse,
        underlying: Option<Cause>,
    ) -> Error {
        let oauth_code = resolve_oauth_code(response);
        Error {
            domain: ErrorDomain::OAuthResourceServer,
            code: ErrorCode::ResourceServer(code),
            message: oauth_message(oauth_code, response),
            underlying,
        }
    }

    /// Classify an HTTP error response into the network domain.
    ///
    /// A UTF-8 body becomes the message; a missing body, undecodable bytes,
    /// or an all-whitespace body degrade to `"HTTP error <status>"`. This
    /// constructor never fails.
    pub fn http(status: u16, body: Option<&[u8]>) -> Error {
        let message = body
            .and_then(|b| std::str::from_utf8(b).ok())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
            .unwrap_or_else(|| format!("HTTP error {status}"));
        Error {
            domain: ErrorDomain::Network,
            code: ErrorCode::General(GeneralErrorCode::NetworkError),
            message,
            underlying: None,
        }
    }

    pub fn domain(&self) -> ErrorDomain {
        self.domain
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// The lower-level cause, if one was attached at classification time.
    pub fn underlying(&self) -> Option<&Cause> {
        self.underlying.as_ref()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.domain, self.message)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.underlying
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

fn resolve_oauth_code(response: &OAuthErrorResponse) -> OAuthErrorCode {
    match response.error.as_deref() {
        Some(token) => {
            let code = OAuthErrorCode::from_token(token);
            if code == OAuthErrorCode::Other {
                debug!(token, "unrecognized OAuth error token, classifying as Other");
            }
            code
        }
        None => {
            debug!("OAuth error response has no error field, classifying as Other");
            OAuthErrorCode::Other
        }
    }
}

/// `error_description` wins; otherwise synthesize from the resolved code,
/// embedding the raw token when it was unrecognized.
fn oauth_message(code: OAuthErrorCode, response: &OAuthErrorResponse) -> String {
    if let Some(description) = response.error_description.as_deref() {
        if !description.is_empty() {
            return description.to_string();
        }
    }
    match (code, response.error.as_deref()) {
        (OAuthErrorCode::Other, Some(raw)) => format!("OAuth error: {raw}"),
        _ => code.default_message().to_string(),
    }
}

/// Abort the current operation with the given name and message.
///
/// Reserved for programmer misuse (invalid argument combinations). Expected
/// runtime conditions — network failures, protocol errors — always go
/// through the [`Error`] constructors instead.
pub fn raise(name: &str, message: Option<&str>) -> ! {
    match message {
        Some(m) => panic!("{name}: {m}"),
        None => panic!("{name}"),
    }
}
