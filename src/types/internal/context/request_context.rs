use uuid::Uuid;

use crate::types::internal::auth::Claims;

use super::request_source::RequestSource;

/// Request context that flows through all layers
///
/// Contains contextual information about the current request that is needed
/// for authorization, activity logging and tracing across API, coordinator
/// and store layers.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// IP address of the client making the request
    pub ip_address: Option<String>,

    /// Unique identifier for this request (for tracing across layers)
    pub request_id: String,

    /// Whether the request is authenticated (JWT validated successfully)
    pub authenticated: bool,

    /// Full JWT claims if authenticated
    pub claims: Option<Claims>,

    /// Where the request came from
    pub source: RequestSource,

    /// Who performed the action: user id, "cli" or "unknown"
    pub actor_id: String,
}

impl RequestContext {
    /// Create a new unauthenticated API context with a generated request_id
    pub fn new() -> Self {
        Self {
            ip_address: None,
            request_id: Uuid::new_v4().to_string(),
            authenticated: false,
            claims: None,
            source: RequestSource::API,
            actor_id: "unknown".to_string(),
        }
    }

    /// Context for administrative CLI commands
    pub fn for_cli(command_name: &str) -> Self {
        tracing::debug!(command = command_name, "Creating CLI request context");
        Self {
            source: RequestSource::CLI,
            actor_id: "cli".to_string(),
            ..Self::new()
        }
    }

    /// Set the ip_address
    pub fn with_ip_address(mut self, ip_address: impl Into<String>) -> Self {
        self.ip_address = Some(ip_address.into());
        self
    }

    /// Set authentication state with claims
    pub fn with_auth(mut self, claims: Claims) -> Self {
        self.authenticated = true;
        self.actor_id = claims.sub.clone();
        self.claims = Some(claims);
        self
    }

    /// Authenticated user id, if any
    pub fn user_id(&self) -> Option<&str> {
        self.claims.as_ref().map(|c| c.sub.as_str())
    }

    /// JWT id of the token used for this request, if any
    pub fn jwt_id(&self) -> Option<&str> {
        self.claims.as_ref().map(|c| c.jti.as_str())
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}
