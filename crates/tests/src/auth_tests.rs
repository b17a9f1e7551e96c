use crate::fixtures::test_app::{OWNER_UID, TestApp};
use serde_json::Value;

#[tokio::test]
async fn health_check_reports_ok() {
    let app = TestApp::spawn().await;

    let resp = app.client.get(app.url("/health")).send().await.unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn missing_token_is_unauthenticated() {
    let app = TestApp::spawn().await;

    let resp = app.client.get(app.url("/api/auth")).send().await.unwrap();
    assert_eq!(resp.status().as_u16(), 401);

    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["error"], "unauthenticated");
}

#[tokio::test]
async fn malformed_token_is_unauthenticated() {
    let app = TestApp::spawn().await;

    let resp = app
        .auth_get("/api/auth", "not-a-real-token")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 401);
}

#[tokio::test]
async fn unregistered_subject_is_not_found() {
    let app = TestApp::spawn().await;
    let stranger = app.identity("U-stranger", "Stranger");

    let resp = app.auth_get("/api/auth", &stranger.token).send().await.unwrap();
    assert_eq!(resp.status().as_u16(), 404);

    let resp = app
        .auth_post("/api/auth/login", &stranger.token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 404);
}

#[tokio::test]
async fn configured_owner_registers_approved_regardless_of_code() {
    let app = TestApp::spawn().await;
    let owner = app.identity(OWNER_UID, "Venue Owner");

    let resp = app.register(&owner, Some("NOSUCHCODE")).await;
    assert_eq!(resp.status().as_u16(), 201);

    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["id"], OWNER_UID);
    assert_eq!(json["role"], "owner");
    assert_eq!(json["status"], "approved");
    assert!(json["invited_by"].is_null());
    assert!(json["approved_at"].is_string());
}

#[tokio::test]
async fn user_without_code_registers_pending() {
    let app = TestApp::spawn().await;
    let guest = app.identity("U-guest", "Guest");

    let resp = app.register(&guest, None).await;
    assert_eq!(resp.status().as_u16(), 201);

    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["role"], "user");
    assert_eq!(json["status"], "pending");
    assert_eq!(json["display_name"], "Guest");
    assert_eq!(json["picture_url"], "https://profile.test/U-guest.png");
    assert!(json["approved_at"].is_null());
}

#[tokio::test]
async fn registering_twice_is_already_exists() {
    let app = TestApp::spawn().await;
    let guest = app.seed_pending("U-guest", "Guest").await;

    let resp = app.register(&guest, None).await;
    assert_eq!(resp.status().as_u16(), 409);

    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["error"], "already_exists");
}

#[tokio::test]
async fn me_and_login_return_profile() {
    let app = TestApp::spawn().await;
    let guest = app.seed_pending("U-guest", "Guest").await;

    let resp = app.auth_get("/api/auth", &guest.token).send().await.unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let me: Value = resp.json().await.unwrap();
    assert_eq!(me["id"], "U-guest");
    assert_eq!(me["status"], "pending");
    assert!(me["created_at"].is_string());

    let resp = app
        .auth_post("/api/auth/login", &guest.token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let login: Value = resp.json().await.unwrap();
    assert_eq!(login["id"], "U-guest");
    assert_eq!(login["role"], "user");
    assert!(login.get("created_at").is_none());
}

#[tokio::test]
async fn blocked_user_is_turned_away() {
    let app = TestApp::spawn().await;
    let owner = app.seed_owner().await;
    let guest = app.seed_pending("U-guest", "Guest").await;

    let resp = app
        .auth_put("/api/admin/user/U-guest", &owner.token)
        .json(&serde_json::json!({ "status": "blocked" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    let resp = app.auth_get("/api/auth", &guest.token).send().await.unwrap();
    assert_eq!(resp.status().as_u16(), 403);

    let resp = app
        .auth_post("/api/auth/login", &guest.token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 403);

    let resp = app.auth_get("/api/slot", &guest.token).send().await.unwrap();
    assert_eq!(resp.status().as_u16(), 403);
}
