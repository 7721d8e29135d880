mod common;

use poem::http::StatusCode;
use poem::test::TestClient;
use poem::Route;
use serde_json::json;

use common::{ADMIN_PASSWORD, ADMIN_USERNAME, bearer, login, setup_client};

async fn create_province(client: &TestClient<Route>, token: &str, code: &str) -> String {
    let resp = client
        .post("/api/provinces")
        .header("Authorization", bearer(token))
        .body_json(&json!({ "code": code, "name": format!("Province {}", code) }))
        .send()
        .await;
    resp.assert_status_is_ok();
    resp.json().await.value().object().get("id").string().to_string()
}

/// Registers and approves a member, returning its id
async fn create_active_member(client: &TestClient<Route>, token: &str, province_id: &str, national_id: &str) -> String {
    let resp = client
        .post("/api/members")
        .header("Authorization", bearer(token))
        .body_json(&json!({
            "national_id": national_id,
            "first_name": "Ayse",
            "last_name": "Yilmaz",
            "province_id": province_id,
        }))
        .send()
        .await;
    resp.assert_status_is_ok();
    let json = resp.json().await;
    let member = json.value().object();
    assert_eq!(member.get("status").string(), "PENDING");
    let member_id = member.get("id").string().to_string();

    let resp = client
        .post(format!("/api/members/{}/approve", member_id))
        .header("Authorization", bearer(token))
        .send()
        .await;
    resp.assert_status_is_ok();
    member_id
}

#[tokio::test]
async fn test_health_and_public_settings_need_no_token() {
    let (_app_data, client) = setup_client().await;

    let resp = client.get("/api/health").send().await;
    resp.assert_status_is_ok();
    resp.json().await.value().object().get("status").assert_string("healthy");

    let resp = client.get("/api/settings/public").send().await;
    resp.assert_status_is_ok();
    let json = resp.json().await;
    let keys: Vec<String> = json
        .value()
        .object_array()
        .iter()
        .map(|setting| setting.get("key").string().to_string())
        .collect();
    assert!(keys.contains(&"site_name".to_string()));
    assert!(!keys.contains(&"password_min_length".to_string()));
}

#[tokio::test]
async fn test_login_rejects_bad_password_without_detail() {
    let (_app_data, client) = setup_client().await;

    let resp = client
        .post("/api/auth/login")
        .body_json(&json!({ "username": ADMIN_USERNAME, "password": "Wrong-password1" }))
        .send()
        .await;
    resp.assert_status(StatusCode::UNAUTHORIZED);

    let resp = client
        .post("/api/auth/login")
        .body_json(&json!({ "username": "nobody", "password": ADMIN_PASSWORD }))
        .send()
        .await;
    resp.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_protected_endpoint_requires_token() {
    let (_app_data, client) = setup_client().await;

    let resp = client.get("/api/members").send().await;
    resp.assert_status(StatusCode::UNAUTHORIZED);

    let resp = client
        .get("/api/members")
        .header("Authorization", "Bearer not-a-jwt")
        .send()
        .await;
    resp.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_application_approval_creates_scoped_panel_user() {
    let (_app_data, client) = setup_client().await;
    let admin = login(&client, ADMIN_USERNAME, ADMIN_PASSWORD).await;

    let home = create_province(&client, &admin, "06").await;
    let other = create_province(&client, &admin, "34").await;
    let member_id = create_active_member(&client, &admin, &home, "12345678901").await;
    create_active_member(&client, &admin, &other, "10987654321").await;

    // Province level role holding only MEMBER_VIEW, stored with MEMBER_LIST added
    let resp = client
        .post("/api/roles")
        .header("Authorization", bearer(&admin))
        .body_json(&json!({
            "name": "Province clerk",
            "permissions": ["MEMBER_VIEW"],
            "scope_level": "PROVINCE",
        }))
        .send()
        .await;
    resp.assert_status_is_ok();
    let json = resp.json().await;
    let role = json.value().object();
    let role_id = role.get("id").string().to_string();
    let permissions: Vec<&str> = role.get("permissions").string_array();
    assert!(permissions.contains(&"MEMBER_LIST"));

    // A scoped role without scopes is refused
    let resp = client
        .post("/api/panel-user-applications")
        .header("Authorization", bearer(&admin))
        .body_json(&json!({
            "member_id": member_id,
            "requested_username": "clerk",
            "requested_role_id": role_id,
        }))
        .send()
        .await;
    resp.assert_status(StatusCode::BAD_REQUEST);

    let resp = client
        .post("/api/panel-user-applications")
        .header("Authorization", bearer(&admin))
        .body_json(&json!({
            "member_id": member_id,
            "requested_username": "clerk",
            "requested_role_id": role_id,
            "scopes": [{ "province_id": home }],
        }))
        .send()
        .await;
    resp.assert_status_is_ok();
    let application_id = resp.json().await.value().object().get("id").string().to_string();

    let resp = client
        .post(format!("/api/panel-user-applications/{}/approve", application_id))
        .header("Authorization", bearer(&admin))
        .body_json(&json!({ "note": "Welcome" }))
        .send()
        .await;
    resp.assert_status_is_ok();
    let json = resp.json().await;
    let outcome = json.value().object();
    outcome.get("application").object().get("status").assert_string("APPROVED");
    outcome.get("user").object().get("member_id").assert_string(&member_id);
    let temporary_password = outcome.get("temporary_password").string().to_string();
    assert_eq!(temporary_password.len(), 20);

    // Approving twice is a conflict
    let resp = client
        .post(format!("/api/panel-user-applications/{}/approve", application_id))
        .header("Authorization", bearer(&admin))
        .body_json(&json!({}))
        .send()
        .await;
    resp.assert_status(StatusCode::CONFLICT);

    // The new user must change the temporary password first
    let clerk = login(&client, "clerk", &temporary_password).await;
    let resp = client
        .get("/api/members")
        .header("Authorization", bearer(&clerk))
        .send()
        .await;
    resp.assert_status(StatusCode::FORBIDDEN);
    resp.json()
        .await
        .value()
        .object()
        .get("error")
        .assert_string("password_change_required");

    let resp = client
        .get("/api/auth/me")
        .header("Authorization", bearer(&clerk))
        .send()
        .await;
    resp.assert_status_is_ok();
    resp.json()
        .await
        .value()
        .object()
        .get("scope_restricted")
        .assert_bool(true);

    let resp = client
        .post("/api/auth/change-password")
        .header("Authorization", bearer(&clerk))
        .body_json(&json!({ "old_password": temporary_password, "new_password": "Meadow-pass9" }))
        .send()
        .await;
    resp.assert_status_is_ok();

    // Scope restriction: only the home province member is visible
    let clerk = login(&client, "clerk", "Meadow-pass9").await;
    let resp = client
        .get("/api/members")
        .header("Authorization", bearer(&clerk))
        .send()
        .await;
    resp.assert_status_is_ok();
    let json = resp.json().await;
    let list = json.value().object();
    list.get("page").object().get("total_items").assert_i64(1);
    list.get("items").object_array()[0].get("id").assert_string(&member_id);

    // Creating members needs MEMBER_CREATE
    let resp = client
        .post("/api/members")
        .header("Authorization", bearer(&clerk))
        .body_json(&json!({
            "national_id": "55555555555",
            "first_name": "Can",
            "last_name": "Demir",
            "province_id": home,
        }))
        .send()
        .await;
    resp.assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_maintenance_mode_blocks_non_admin_login() {
    let (_app_data, client) = setup_client().await;
    let admin = login(&client, ADMIN_USERNAME, ADMIN_PASSWORD).await;

    let resp = client
        .post("/api/users")
        .header("Authorization", bearer(&admin))
        .body_json(&json!({
            "username": "moderator",
            "password": "Harbor-pass1",
            "full_name": "Mod Erator",
            "roles": ["MODERATOR"],
        }))
        .send()
        .await;
    resp.assert_status_is_ok();

    let resp = client
        .put("/api/settings/maintenance_mode")
        .header("Authorization", bearer(&admin))
        .body_json(&json!({ "value": "true" }))
        .send()
        .await;
    resp.assert_status_is_ok();

    let resp = client
        .post("/api/auth/login")
        .body_json(&json!({ "username": "moderator", "password": "Harbor-pass1" }))
        .send()
        .await;
    resp.assert_status(StatusCode::SERVICE_UNAVAILABLE);

    // Administrators can still get in to switch it off
    login(&client, ADMIN_USERNAME, ADMIN_PASSWORD).await;
}

#[tokio::test]
async fn test_activity_log_records_mutations() {
    let (_app_data, client) = setup_client().await;
    let admin = login(&client, ADMIN_USERNAME, ADMIN_PASSWORD).await;
    create_province(&client, &admin, "35").await;

    let resp = client
        .get("/api/activity-logs")
        .query("event_type", &"region_changed")
        .header("Authorization", bearer(&admin))
        .send()
        .await;
    resp.assert_status_is_ok();
    let json = resp.json().await;
    let items = json.value().object().get("items").object_array();
    assert_eq!(items.len(), 1);
    items[0].get("data").object().get("kind").assert_string("province");
}
