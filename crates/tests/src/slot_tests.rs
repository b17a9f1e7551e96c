use serde_json::Value;

use crate::fixtures::seed::{date_str, day};
use crate::fixtures::test_app::TestApp;

#[tokio::test]
async fn owner_opens_dates_and_members_see_them_in_order() {
    let app = TestApp::spawn().await;
    let owner = app.seed_owner().await;
    let guest = app.seed_pending("U-guest", "Guest").await;

    let report = app.open_dates(&owner, &[day(5), day(3), day(4)]).await;
    assert_eq!(report["applied"], 3);
    let outcomes: Vec<&str> = report["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["outcome"].as_str().unwrap())
        .collect();
    assert_eq!(outcomes, vec!["created", "created", "created"]);

    let resp = app.auth_get("/api/slot", &guest.token).send().await.unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let slots: Vec<Value> = resp.json().await.unwrap();
    let dates: Vec<&str> = slots.iter().map(|s| s["date"].as_str().unwrap()).collect();
    assert_eq!(dates, vec![date_str(day(3)), date_str(day(4)), date_str(day(5))]);
    assert!(slots.iter().all(|s| s["available"] == true && s["reserved"] == false));
    assert!(slots[0].get("reserved_by").is_none());
}

#[tokio::test]
async fn slot_listing_honours_range() {
    let app = TestApp::spawn().await;
    let owner = app.seed_owner().await;
    app.open_dates(&owner, &[day(1), day(2), day(3), day(4)]).await;

    let path = format!(
        "/api/slot?start_date={}&end_date={}",
        date_str(day(2)),
        date_str(day(3))
    );
    let resp = app.auth_get(&path, &owner.token).send().await.unwrap();
    let slots: Vec<Value> = resp.json().await.unwrap();
    assert_eq!(slots.len(), 2);
    assert_eq!(slots[0]["date"], date_str(day(2)));
}

#[tokio::test]
async fn bad_range_date_is_invalid_input() {
    let app = TestApp::spawn().await;
    let owner = app.seed_owner().await;

    let resp = app
        .auth_get("/api/slot?start_date=tomorrow", &owner.token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);
}

#[tokio::test]
async fn unregistered_subject_cannot_list_slots() {
    let app = TestApp::spawn().await;
    let stranger = app.identity("U-stranger", "Stranger");

    let resp = app.auth_get("/api/slot", &stranger.token).send().await.unwrap();
    assert_eq!(resp.status().as_u16(), 404);
}

#[tokio::test]
async fn repeating_availability_is_idempotent() {
    let app = TestApp::spawn().await;
    let owner = app.seed_owner().await;

    app.open_dates(&owner, &[day(7)]).await;
    let report = app.open_dates(&owner, &[day(7), day(7)]).await;

    assert_eq!(report["applied"], 1);
    assert_eq!(report["results"][0]["outcome"], "updated");
    assert_eq!(report["results"].as_array().unwrap().len(), 1);

    let slot = app.admin_slot(&owner, day(7)).await.unwrap();
    assert_eq!(slot["available"], true);
    assert!(slot["reserved_by"].is_null());
}

#[tokio::test]
async fn closing_dates_creates_closed_slots() {
    let app = TestApp::spawn().await;
    let owner = app.seed_owner().await;

    let report = app.set_dates(&owner, &[day(9)], false).await;
    assert_eq!(report["results"][0]["outcome"], "created");

    let slot = app.admin_slot(&owner, day(9)).await.unwrap();
    assert_eq!(slot["available"], false);
}

#[tokio::test]
async fn empty_date_set_is_invalid_input() {
    let app = TestApp::spawn().await;
    let owner = app.seed_owner().await;

    let resp = app
        .auth_post("/api/admin/slot", &owner.token)
        .json(&serde_json::json!({ "dates": [], "available": true }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);
}

#[tokio::test]
async fn only_owner_sets_availability() {
    let app = TestApp::spawn().await;
    let owner = app.seed_owner().await;
    let member = app.seed_approved(&owner, "U-member", "Member").await;

    let resp = app
        .auth_post("/api/admin/slot", &member.token)
        .json(&serde_json::json!({ "dates": [date_str(day(2))], "available": true }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 403);

    let resp = app
        .auth_put(&format!("/api/admin/slot/{}", date_str(day(2))), &member.token)
        .json(&serde_json::json!({ "available": true }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 403);
}

#[tokio::test]
async fn closing_a_reserved_date_conflicts_without_touching_it() {
    let app = TestApp::spawn().await;
    let owner = app.seed_owner().await;
    let member = app.seed_approved(&owner, "U-member", "Member").await;
    app.open_dates(&owner, &[day(3), day(4)]).await;
    app.book_ok(&member, day(3)).await;

    let report = app.set_dates(&owner, &[day(3), day(4)], false).await;
    assert_eq!(report["applied"], 1);
    assert_eq!(report["results"][0]["date"], date_str(day(3)));
    assert_eq!(report["results"][0]["outcome"], "conflict");
    assert_eq!(report["results"][1]["outcome"], "updated");

    let reserved = app.admin_slot(&owner, day(3)).await.unwrap();
    assert_eq!(reserved["available"], true);
    assert_eq!(reserved["reserved_by"], "U-member");

    let closed = app.admin_slot(&owner, day(4)).await.unwrap();
    assert_eq!(closed["available"], false);
}

#[tokio::test]
async fn single_date_update_refuses_reserved_date() {
    let app = TestApp::spawn().await;
    let owner = app.seed_owner().await;
    let member = app.seed_approved(&owner, "U-member", "Member").await;
    app.open_dates(&owner, &[day(6)]).await;
    app.book_ok(&member, day(6)).await;

    let resp = app
        .auth_put(&format!("/api/admin/slot/{}", date_str(day(6))), &owner.token)
        .json(&serde_json::json!({ "available": false }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 409);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["error"], "conflict");

    let resp = app
        .auth_put(&format!("/api/admin/slot/{}", date_str(day(8))), &owner.token)
        .json(&serde_json::json!({ "available": true }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["date"], date_str(day(8)));
    assert_eq!(json["available"], true);
}
