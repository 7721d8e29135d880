use union_admin_backend::types::internal::auth::Claims;
use union_admin_backend::types::internal::context::{RequestContext, RequestSource};
use union_admin_backend::types::internal::permission::SystemRole;

fn claims(sub: &str) -> Claims {
    Claims {
        sub: sub.to_string(),
        exp: 2_000_000_000,
        iat: 1_000_000_000,
        jti: "jti-1".to_string(),
        roles: vec![SystemRole::Moderator],
        password_change_required: false,
    }
}

#[test]
fn test_request_context_new_defaults_to_api_source() {
    let ctx = RequestContext::new();

    assert_eq!(ctx.source, RequestSource::API);
    assert_eq!(ctx.actor_id, "unknown");
    assert!(!ctx.authenticated);
    assert!(ctx.claims.is_none());
    assert!(ctx.user_id().is_none());
}

#[test]
fn test_request_context_for_cli() {
    let ctx = RequestContext::for_cli("bootstrap");

    assert_eq!(ctx.source, RequestSource::CLI);
    assert_eq!(ctx.actor_id, "cli");
    assert!(!ctx.authenticated);
    assert!(ctx.claims.is_none());
}

#[test]
fn test_request_context_with_ip_address() {
    let ctx = RequestContext::new().with_ip_address("192.168.1.1");

    assert_eq!(ctx.ip_address, Some("192.168.1.1".to_string()));
    assert_eq!(ctx.source, RequestSource::API);
}

#[test]
fn test_request_context_with_auth_sets_actor() {
    let ctx = RequestContext::new().with_auth(claims("user-42"));

    assert!(ctx.authenticated);
    assert_eq!(ctx.actor_id, "user-42");
    assert_eq!(ctx.user_id(), Some("user-42"));
    assert_eq!(ctx.jwt_id(), Some("jti-1"));
}

#[test]
fn test_request_ids_are_unique() {
    let first = RequestContext::new();
    let second = RequestContext::new();

    assert_ne!(first.request_id, second.request_id);
}
