use crate::errors::AdminError;

use super::request_context::RequestContext;

/// Result of building a request context from a bearer token
pub enum ContextResult {
    /// Context created successfully, no password change required
    Ok(RequestContext),
    /// Password change required - context is included so allowed endpoints can extract it
    PasswordChangeRequired(RequestContext),
}

impl ContextResult {
    /// Convert ContextResult to Result, mapping PasswordChangeRequired to an error
    ///
    /// Most endpoints should use this to automatically reject users with password_change_required=true.
    pub fn into_result(self) -> Result<RequestContext, AdminError> {
        match self {
            ContextResult::Ok(ctx) => Ok(ctx),
            ContextResult::PasswordChangeRequired(_) => Err(AdminError::password_change_required()),
        }
    }

    /// Extract the context regardless of whether password change is required
    ///
    /// Only use this for endpoints that must stay reachable while a password change
    /// is pending (/auth/change-password, /auth/me).
    pub fn into_context(self) -> RequestContext {
        match self {
            ContextResult::Ok(ctx) => ctx,
            ContextResult::PasswordChangeRequired(ctx) => ctx,
        }
    }
}
