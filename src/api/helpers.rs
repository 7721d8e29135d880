use poem::Request;
use poem_openapi::auth::Bearer;

use crate::api::BearerAuth;
use crate::errors::AdminError;
use crate::providers::TokenProvider;
use crate::types::internal::context::{ContextResult, RequestContext};

/// Client IP, preferring proxy headers over the socket address
pub fn extract_ip_address(req: &Request) -> Option<String> {
    if let Some(forwarded) = req.header("X-Forwarded-For") {
        if let Some(ip) = forwarded.split(',').next() {
            let ip = ip.trim();
            if !ip.is_empty() {
                return Some(ip.to_string());
            }
        }
    }

    if let Some(real_ip) = req.header("X-Real-IP") {
        return Some(real_ip.trim().to_string());
    }

    req.remote_addr().as_socket_addr().map(|addr| addr.ip().to_string())
}

/// Declared body size from the Content-Length header
pub fn content_length(req: &Request) -> Option<u64> {
    req.header("Content-Length").and_then(|value| value.trim().parse().ok())
}

/// Bearer token from the Authorization header, for endpoints where it is optional
///
/// poem-openapi has no `Option<BearerAuth>`, so the header is read by hand.
pub fn bearer_from_header(req: &Request) -> Option<Bearer> {
    req.header("Authorization")
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|token| Bearer {
            token: token.trim().to_string(),
        })
}

/// Build the request context from IP and an optional bearer token
///
/// An invalid or expired token yields an unauthenticated context; coordinators
/// turn that into 401 when the operation needs a caller.
pub fn create_request_context(req: &Request, auth: Option<Bearer>, token_provider: &TokenProvider) -> ContextResult {
    let mut ctx = RequestContext::new();
    if let Some(ip) = extract_ip_address(req) {
        ctx = ctx.with_ip_address(ip);
    }

    let Some(bearer) = auth else {
        return ContextResult::Ok(ctx);
    };

    match token_provider.validate_jwt(&bearer.token) {
        Ok(claims) => {
            let password_change_required = claims.password_change_required;
            let ctx = ctx.with_auth(claims);
            if password_change_required {
                ContextResult::PasswordChangeRequired(ctx)
            } else {
                ContextResult::Ok(ctx)
            }
        }
        Err(e) => {
            tracing::debug!(request_id = %ctx.request_id, "Rejected bearer token: {}", e);
            ContextResult::Ok(ctx)
        }
    }
}

/// Context for an ordinary authenticated endpoint
///
/// Rejects callers that still have to change their password.
pub fn require_context(req: &Request, auth: BearerAuth, token_provider: &TokenProvider) -> Result<RequestContext, AdminError> {
    create_request_context(req, Some(auth.0), token_provider).into_result()
}
