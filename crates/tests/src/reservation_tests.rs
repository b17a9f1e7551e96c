use serde_json::Value;

use crate::fixtures::seed::{date_str, day};
use crate::fixtures::test_app::TestApp;

#[tokio::test]
async fn approved_member_books_open_date() {
    let app = TestApp::spawn().await;
    let owner = app.seed_owner().await;
    let member = app.seed_approved(&owner, "U-member", "Member").await;
    app.open_dates(&owner, &[day(3)]).await;

    let resp = app
        .auth_post("/api/reservation", &member.token)
        .json(&serde_json::json!({
            "date": date_str(day(3)),
            "number_of_guests": 4,
            "notes": "Birthday",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 201);

    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["status"], "confirmed");
    assert_eq!(json["user_id"], "U-member");
    assert_eq!(json["user_name"], "Member");
    assert_eq!(json["number_of_guests"], 4);
    assert_eq!(json["notes"], "Birthday");
    assert!(json["cancelled_at"].is_null());

    let slot = app.admin_slot(&owner, day(3)).await.unwrap();
    assert_eq!(slot["reserved_by"], "U-member");
}

#[tokio::test]
async fn booking_today_is_allowed() {
    let app = TestApp::spawn().await;
    let owner = app.seed_owner().await;
    let member = app.seed_approved(&owner, "U-member", "Member").await;
    app.open_dates(&owner, &[day(0)]).await;

    assert_eq!(app.book(&member, day(0), 1).await.status().as_u16(), 201);
}

#[tokio::test]
async fn pending_user_cannot_book() {
    let app = TestApp::spawn().await;
    let owner = app.seed_owner().await;
    let guest = app.seed_pending("U-guest", "Guest").await;
    app.open_dates(&owner, &[day(3)]).await;

    let resp = app.book(&guest, day(3), 2).await;
    assert_eq!(resp.status().as_u16(), 403);

    let slot = app.admin_slot(&owner, day(3)).await.unwrap();
    assert!(slot["reserved_by"].is_null());
}

#[tokio::test]
async fn authorization_is_checked_before_input() {
    let app = TestApp::spawn().await;
    let guest = app.seed_pending("U-guest", "Guest").await;

    let resp = app.book(&guest, day(-3), 0).await;
    assert_eq!(resp.status().as_u16(), 403);
}

#[tokio::test]
async fn guest_count_below_one_is_invalid_input() {
    let app = TestApp::spawn().await;
    let owner = app.seed_owner().await;
    let member = app.seed_approved(&owner, "U-member", "Member").await;
    app.open_dates(&owner, &[day(3)]).await;

    let resp = app.book(&member, day(3), 0).await;
    assert_eq!(resp.status().as_u16(), 400);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["error"], "invalid_input");
}

#[tokio::test]
async fn past_date_is_invalid_input() {
    let app = TestApp::spawn().await;
    let owner = app.seed_owner().await;
    let member = app.seed_approved(&owner, "U-member", "Member").await;
    app.open_dates(&owner, &[day(-1)]).await;

    let resp = app.book(&member, day(-1), 2).await;
    assert_eq!(resp.status().as_u16(), 400);
}

#[tokio::test]
async fn dates_without_open_slot_are_unavailable() {
    let app = TestApp::spawn().await;
    let owner = app.seed_owner().await;
    let member = app.seed_approved(&owner, "U-member", "Member").await;
    app.set_dates(&owner, &[day(4)], false).await;

    let resp = app.book(&member, day(3), 2).await;
    assert_eq!(resp.status().as_u16(), 409);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["error"], "unavailable");

    let resp = app.book(&member, day(4), 2).await;
    assert_eq!(resp.status().as_u16(), 409);
}

#[tokio::test]
async fn second_booking_for_a_date_is_unavailable() {
    let app = TestApp::spawn().await;
    let owner = app.seed_owner().await;
    let alice = app.seed_approved(&owner, "U-alice", "Alice").await;
    let bob = app.seed_approved(&owner, "U-bob", "Bob").await;
    app.open_dates(&owner, &[day(5)]).await;

    app.book_ok(&alice, day(5)).await;
    let resp = app.book(&bob, day(5), 2).await;
    assert_eq!(resp.status().as_u16(), 409);

    let slot = app.admin_slot(&owner, day(5)).await.unwrap();
    assert_eq!(slot["reserved_by"], "U-alice");
}

#[tokio::test]
async fn concurrent_bookings_have_exactly_one_winner() {
    let app = TestApp::spawn().await;
    let owner = app.seed_owner().await;
    let alice = app.seed_approved(&owner, "U-alice", "Alice").await;
    let bob = app.seed_approved(&owner, "U-bob", "Bob").await;
    app.open_dates(&owner, &[day(10)]).await;

    let (a, b) = futures::join!(app.book(&alice, day(10), 2), app.book(&bob, day(10), 2));
    let mut statuses = vec![a.status().as_u16(), b.status().as_u16()];
    statuses.sort();
    assert_eq!(statuses, vec![201, 409]);

    let winner = if a.status().as_u16() == 201 { "U-alice" } else { "U-bob" };
    let slot = app.admin_slot(&owner, day(10)).await.unwrap();
    assert_eq!(slot["reserved_by"], winner);

    let resp = app
        .auth_get("/api/admin/reservation?status=confirmed", &owner.token)
        .send()
        .await
        .unwrap();
    let confirmed: Vec<Value> = resp.json().await.unwrap();
    assert_eq!(confirmed.len(), 1);
    assert_eq!(confirmed[0]["user_id"], winner);
}

#[tokio::test]
async fn cancelled_date_can_be_rebooked_by_someone_else() {
    let app = TestApp::spawn().await;
    let owner = app.seed_owner().await;
    let alice = app.seed_approved(&owner, "U-alice", "Alice").await;
    let bob = app.seed_approved(&owner, "U-bob", "Bob").await;
    app.open_dates(&owner, &[day(5)]).await;

    let id = app.book_ok(&alice, day(5)).await;
    let resp = app
        .auth_delete(&format!("/api/reservation/{id}"), &alice.token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["status"], "cancelled");
    assert!(json["cancelled_at"].is_string());

    let slot = app.admin_slot(&owner, day(5)).await.unwrap();
    assert!(slot["reserved_by"].is_null());

    app.book_ok(&bob, day(5)).await;
    let slot = app.admin_slot(&owner, day(5)).await.unwrap();
    assert_eq!(slot["reserved_by"], "U-bob");
}

#[tokio::test]
async fn cancelled_reservation_is_final() {
    let app = TestApp::spawn().await;
    let owner = app.seed_owner().await;
    let alice = app.seed_approved(&owner, "U-alice", "Alice").await;
    app.open_dates(&owner, &[day(5)]).await;
    let id = app.book_ok(&alice, day(5)).await;

    app.auth_delete(&format!("/api/reservation/{id}"), &alice.token)
        .send()
        .await
        .unwrap();

    let resp = app
        .auth_delete(&format!("/api/reservation/{id}"), &alice.token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 422);

    let resp = app
        .auth_put(&format!("/api/reservation/{id}"), &alice.token)
        .json(&serde_json::json!({ "notes": "changed my mind" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 422);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["error"], "invalid_operation");
}

#[tokio::test]
async fn notes_only_update_leaves_slot_untouched() {
    let app = TestApp::spawn().await;
    let owner = app.seed_owner().await;
    let alice = app.seed_approved(&owner, "U-alice", "Alice").await;
    app.open_dates(&owner, &[day(5)]).await;
    let id = app.book_ok(&alice, day(5)).await;
    let before = app.admin_slot(&owner, day(5)).await.unwrap();

    let resp = app
        .auth_put(&format!("/api/reservation/{id}"), &alice.token)
        .json(&serde_json::json!({ "notes": "Vegetarian menu", "number_of_guests": 3 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["notes"], "Vegetarian menu");
    assert_eq!(json["number_of_guests"], 3);
    assert_eq!(json["date"], date_str(day(5)));

    let after = app.admin_slot(&owner, day(5)).await.unwrap();
    assert_eq!(before, after);
}

#[tokio::test]
async fn update_revalidates_guest_count() {
    let app = TestApp::spawn().await;
    let owner = app.seed_owner().await;
    let alice = app.seed_approved(&owner, "U-alice", "Alice").await;
    app.open_dates(&owner, &[day(5)]).await;
    let id = app.book_ok(&alice, day(5)).await;

    let resp = app
        .auth_put(&format!("/api/reservation/{id}"), &alice.token)
        .json(&serde_json::json!({ "number_of_guests": 0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);
}

#[tokio::test]
async fn moving_to_a_taken_date_changes_nothing() {
    let app = TestApp::spawn().await;
    let owner = app.seed_owner().await;
    let alice = app.seed_approved(&owner, "U-alice", "Alice").await;
    let bob = app.seed_approved(&owner, "U-bob", "Bob").await;
    app.open_dates(&owner, &[day(5), day(6)]).await;
    let alice_id = app.book_ok(&alice, day(5)).await;
    app.book_ok(&bob, day(6)).await;

    let resp = app
        .auth_put(&format!("/api/reservation/{alice_id}"), &alice.token)
        .json(&serde_json::json!({ "date": date_str(day(6)) }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 409);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["error"], "unavailable");

    let resp = app
        .auth_get(&format!("/api/reservation/{alice_id}"), &alice.token)
        .send()
        .await
        .unwrap();
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["date"], date_str(day(5)));
    assert_eq!(json["status"], "confirmed");

    let mine = app.admin_slot(&owner, day(5)).await.unwrap();
    assert_eq!(mine["reserved_by"], "U-alice");
    let theirs = app.admin_slot(&owner, day(6)).await.unwrap();
    assert_eq!(theirs["reserved_by"], "U-bob");
}

#[tokio::test]
async fn moving_to_an_open_date_moves_the_binding() {
    let app = TestApp::spawn().await;
    let owner = app.seed_owner().await;
    let alice = app.seed_approved(&owner, "U-alice", "Alice").await;
    app.open_dates(&owner, &[day(5), day(8)]).await;
    let id = app.book_ok(&alice, day(5)).await;

    let resp = app
        .auth_put(&format!("/api/reservation/{id}"), &alice.token)
        .json(&serde_json::json!({ "date": date_str(day(8)) }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["date"], date_str(day(8)));

    let old = app.admin_slot(&owner, day(5)).await.unwrap();
    assert!(old["reserved_by"].is_null());
    let new = app.admin_slot(&owner, day(8)).await.unwrap();
    assert_eq!(new["reserved_by"], "U-alice");
}

#[tokio::test]
async fn moving_to_a_past_date_is_invalid_input() {
    let app = TestApp::spawn().await;
    let owner = app.seed_owner().await;
    let alice = app.seed_approved(&owner, "U-alice", "Alice").await;
    app.open_dates(&owner, &[day(5), day(-2)]).await;
    let id = app.book_ok(&alice, day(5)).await;

    let resp = app
        .auth_put(&format!("/api/reservation/{id}"), &alice.token)
        .json(&serde_json::json!({ "date": date_str(day(-2)) }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);

    let slot = app.admin_slot(&owner, day(5)).await.unwrap();
    assert_eq!(slot["reserved_by"], "U-alice");
}

#[tokio::test]
async fn strangers_cannot_see_or_change_a_reservation() {
    let app = TestApp::spawn().await;
    let owner = app.seed_owner().await;
    let alice = app.seed_approved(&owner, "U-alice", "Alice").await;
    let bob = app.seed_approved(&owner, "U-bob", "Bob").await;
    app.open_dates(&owner, &[day(5)]).await;
    let id = app.book_ok(&alice, day(5)).await;
    let path = format!("/api/reservation/{id}");

    assert_eq!(app.auth_get(&path, &bob.token).send().await.unwrap().status().as_u16(), 403);
    assert_eq!(
        app.auth_put(&path, &bob.token)
            .json(&serde_json::json!({ "notes": "mine now" }))
            .send()
            .await
            .unwrap()
            .status()
            .as_u16(),
        403
    );
    assert_eq!(app.auth_delete(&path, &bob.token).send().await.unwrap().status().as_u16(), 403);
}

#[tokio::test]
async fn owner_may_view_and_cancel_but_not_edit() {
    let app = TestApp::spawn().await;
    let owner = app.seed_owner().await;
    let alice = app.seed_approved(&owner, "U-alice", "Alice").await;
    app.open_dates(&owner, &[day(5)]).await;
    let id = app.book_ok(&alice, day(5)).await;
    let path = format!("/api/reservation/{id}");

    assert_eq!(app.auth_get(&path, &owner.token).send().await.unwrap().status().as_u16(), 200);

    let resp = app
        .auth_put(&path, &owner.token)
        .json(&serde_json::json!({ "number_of_guests": 6 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 403);

    let resp = app.auth_delete(&path, &owner.token).send().await.unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    let slot = app.admin_slot(&owner, day(5)).await.unwrap();
    assert!(slot["reserved_by"].is_null());
    let texts = app.outbox.messages_to("U-alice");
    assert!(texts.last().unwrap().starts_with("[Reservation cancelled]"));
}

#[tokio::test]
async fn unknown_and_malformed_ids_are_not_found() {
    let app = TestApp::spawn().await;
    let owner = app.seed_owner().await;

    let resp = app
        .auth_get("/api/reservation/65f000000000000000000000", &owner.token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 404);

    let resp = app
        .auth_get("/api/reservation/not-an-id", &owner.token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 404);
}

#[tokio::test]
async fn my_reservations_are_latest_first_and_filterable() {
    let app = TestApp::spawn().await;
    let owner = app.seed_owner().await;
    let alice = app.seed_approved(&owner, "U-alice", "Alice").await;
    let bob = app.seed_approved(&owner, "U-bob", "Bob").await;
    app.open_dates(&owner, &[day(2), day(4), day(6)]).await;
    let early = app.book_ok(&alice, day(2)).await;
    app.book_ok(&alice, day(6)).await;
    app.book_ok(&bob, day(4)).await;
    app.auth_delete(&format!("/api/reservation/{early}"), &alice.token)
        .send()
        .await
        .unwrap();

    let resp = app.auth_get("/api/reservation", &alice.token).send().await.unwrap();
    let all: Vec<Value> = resp.json().await.unwrap();
    let dates: Vec<&str> = all.iter().map(|r| r["date"].as_str().unwrap()).collect();
    assert_eq!(dates, vec![date_str(day(6)), date_str(day(2))]);

    let resp = app
        .auth_get("/api/reservation?status=cancelled", &alice.token)
        .send()
        .await
        .unwrap();
    let cancelled: Vec<Value> = resp.json().await.unwrap();
    assert_eq!(cancelled.len(), 1);
    assert_eq!(cancelled[0]["id"], early.as_str());

    let resp = app
        .auth_get("/api/reservation?status=maybe", &alice.token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);
}

#[tokio::test]
async fn lifecycle_sends_guest_notifications() {
    let app = TestApp::spawn().await;
    let owner = app.seed_owner().await;
    let alice = app.seed_approved(&owner, "U-alice", "Alice").await;
    app.open_dates(&owner, &[day(5), day(6)]).await;

    let id = app.book_ok(&alice, day(5)).await;
    app.auth_put(&format!("/api/reservation/{id}"), &alice.token)
        .json(&serde_json::json!({ "date": date_str(day(6)) }))
        .send()
        .await
        .unwrap();
    app.auth_delete(&format!("/api/reservation/{id}"), &alice.token)
        .send()
        .await
        .unwrap();

    let texts = app.outbox.messages_to("U-alice");
    // approval, confirmation, update, cancellation
    assert_eq!(texts.len(), 4);
    assert!(texts[0].starts_with("[Membership approved]"));
    assert!(texts[1].starts_with("[Reservation confirmed]"));
    assert!(texts[2].starts_with("[Reservation updated]"));
    assert!(texts[3].starts_with("[Reservation cancelled]"));
}
