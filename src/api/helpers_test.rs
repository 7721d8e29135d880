#[cfg(test)]
mod tests {
    use crate::api::helpers::*;
    use crate::providers::TokenProvider;
    use crate::test::utils::test_secret_manager;
    use crate::types::internal::context::ContextResult;
    use crate::types::internal::permission::SystemRole;
    use poem::Request;
    use poem_openapi::auth::Bearer;

    fn token_provider() -> TokenProvider {
        TokenProvider::new(test_secret_manager())
    }

    #[test]
    fn test_extract_ip_from_x_forwarded_for() {
        let req = Request::builder()
            .header("X-Forwarded-For", "192.168.1.1, 10.0.0.1")
            .finish();

        assert_eq!(extract_ip_address(&req), Some("192.168.1.1".to_string()));
    }

    #[test]
    fn test_extract_ip_from_x_real_ip() {
        let req = Request::builder().header("X-Real-IP", "192.168.1.2").finish();

        assert_eq!(extract_ip_address(&req), Some("192.168.1.2".to_string()));
    }

    #[test]
    fn test_extract_ip_fallback_to_remote_addr() {
        let req = Request::builder().finish();
        assert_eq!(extract_ip_address(&req), None);
    }

    #[test]
    fn test_content_length() {
        let req = Request::builder().header("Content-Length", "2048").finish();
        assert_eq!(content_length(&req), Some(2048));

        let garbage = Request::builder().header("Content-Length", "lots").finish();
        assert_eq!(content_length(&garbage), None);
        assert_eq!(content_length(&Request::builder().finish()), None);
    }

    #[test]
    fn test_bearer_from_header() {
        let req = Request::builder().header("Authorization", "Bearer abc").finish();
        assert_eq!(bearer_from_header(&req).map(|b| b.token), Some("abc".to_string()));

        let basic = Request::builder().header("Authorization", "Basic abc").finish();
        assert!(bearer_from_header(&basic).is_none());
    }

    #[test]
    fn test_create_request_context_with_valid_jwt() {
        let provider = token_provider();
        let jwt = provider.generate_jwt("user-1", vec![SystemRole::Admin], false).unwrap();
        let req = Request::builder().header("X-Real-IP", "10.1.1.1").finish();

        let ctx = create_request_context(&req, Some(Bearer { token: jwt.token }), &provider)
            .into_result()
            .unwrap();

        assert!(ctx.authenticated);
        assert_eq!(ctx.user_id(), Some("user-1"));
        assert_eq!(ctx.jwt_id(), Some(jwt.jti.as_str()));
        assert_eq!(ctx.ip_address.as_deref(), Some("10.1.1.1"));
    }

    #[test]
    fn test_password_change_required_is_flagged() {
        let provider = token_provider();
        let jwt = provider.generate_jwt("user-1", vec![SystemRole::PanelUser], true).unwrap();
        let req = Request::builder().finish();

        let result = create_request_context(&req, Some(Bearer { token: jwt.token }), &provider);
        assert!(matches!(result, ContextResult::PasswordChangeRequired(_)));
    }

    #[test]
    fn test_create_request_context_with_invalid_jwt() {
        let req = Request::builder().finish();
        let bearer = Bearer {
            token: "invalid-jwt-token".to_string(),
        };

        let ctx = create_request_context(&req, Some(bearer), &token_provider()).into_context();

        assert!(!ctx.authenticated);
        assert!(ctx.claims.is_none());
    }

    #[test]
    fn test_create_request_context_without_auth() {
        let req = Request::builder().finish();

        let ctx = create_request_context(&req, None, &token_provider()).into_context();

        assert!(!ctx.authenticated);
        assert_eq!(ctx.actor_id, "unknown");
    }
}
