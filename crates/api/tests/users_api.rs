//! HTTP-level integration tests for the `/users` endpoints.

mod common;

use axum::http::StatusCode;
use common::{body_json, TestApp, ADMIN, EMPLOYEE, PASSWORD, VIEWER};
use seclock_core::audit::ActionKind;
use seclock_db::store::UserStore;
use serde_json::json;

#[tokio::test]
async fn user_can_read_self_but_not_others() {
    let app = TestApp::new();
    let (alice, alice_token) = app.user("alice", EMPLOYEE).await;
    let (bob, _) = app.user("bob", EMPLOYEE).await;

    let own = app.get(&format!("/api/users/{alice}"), Some(&alice_token)).await;
    assert_eq!(own.status(), StatusCode::OK);
    assert_eq!(body_json(own).await["data"]["login"], "alice");

    let other = app.get(&format!("/api/users/{bob}"), Some(&alice_token)).await;
    assert_eq!(other.status(), StatusCode::FORBIDDEN);

    let list = app.get("/api/users", Some(&alice_token)).await;
    assert_eq!(list.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn admin_lists_and_reads_users() {
    let app = TestApp::new();
    let (_, admin_token) = app.user("admin", ADMIN).await;
    let (bob, _) = app.user("bob", VIEWER).await;

    let list = body_json(app.get("/api/users", Some(&admin_token)).await).await;
    assert_eq!(list["data"].as_array().unwrap().len(), 2);

    let response = app.get(&format!("/api/users/{bob}"), Some(&admin_token)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["privilege_name"], "Viewer");
    assert!(json["data"].get("password_hash").is_none());
}

#[tokio::test]
async fn soft_delete_scrubs_and_is_irreversible() {
    let app = TestApp::new();
    let (_, admin_token) = app.user("admin", ADMIN).await;
    let (bob, bob_token) = app.user("bob", VIEWER).await;

    let uri = format!("/api/users/{bob}");
    assert_eq!(app.delete(&uri, Some(&admin_token)).await.status(), StatusCode::NO_CONTENT);
    assert_eq!(app.delete(&uri, Some(&admin_token)).await.status(), StatusCode::NOT_FOUND);
    assert_eq!(app.get(&uri, Some(&admin_token)).await.status(), StatusCode::NOT_FOUND);

    // The account is no longer visible and its token no longer authenticates.
    assert!(app.store.user_by_id(bob).await.unwrap().is_none());
    let row = app.store.user_row(bob).unwrap().expect("row is kept");
    assert!(row.deleted);
    assert!(row.login.is_none() && row.email.is_none() && row.name.is_none());
    assert!(row.password_hash.is_none());
    assert!(row.token_hash.is_none() && row.token_expires_at.is_none());
    assert_eq!(app.get("/api/locks", Some(&bob_token)).await.status(), StatusCode::UNAUTHORIZED);

    // The login and email are free again.
    let reuse = app
        .post(
            "/api/auth/register",
            None,
            json!({ "login": "bob", "password": PASSWORD, "email": "bob@test.com", "privilege_id": VIEWER }),
        )
        .await;
    assert_eq!(reuse.status(), StatusCode::CREATED);

    let events = app.system_events(ActionKind::UserDeletion.id()).await;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].detail.as_deref(), Some(format!("User {bob} deleted").as_str()));
}

#[tokio::test]
async fn reassigned_privilege_applies_after_refresh() {
    let app = TestApp::new();
    let (_, admin_token) = app.user("admin", ADMIN).await;
    let (bob, bob_token) = app.user("bob", VIEWER).await;

    let response = app
        .put(
            &format!("/api/users/{bob}/privilege"),
            Some(&admin_token),
            json!({ "privilege_id": EMPLOYEE }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["privilege_name"], "Employee");

    // The old token still carries the Viewer snapshot.
    let denied = app.post("/api/locks", Some(&bob_token), json!({ "id": 1 })).await;
    assert_eq!(denied.status(), StatusCode::FORBIDDEN);

    let refreshed = body_json(
        app.post("/api/auth/refresh", None, json!({ "token": bob_token }))
            .await,
    )
    .await;
    let fresh = refreshed["token"].as_str().unwrap();
    let created = app.post("/api/locks", Some(fresh), json!({ "id": 1 })).await;
    assert_eq!(created.status(), StatusCode::CREATED);

    let changes = app.system_events(ActionKind::PrivilegeChange.id()).await;
    assert_eq!(
        changes[0].detail.as_deref(),
        Some(format!("User {bob} assigned privilege Employee").as_str())
    );
}

#[tokio::test]
async fn reassign_to_unknown_privilege_or_user_is_not_found() {
    let app = TestApp::new();
    let (_, admin_token) = app.user("admin", ADMIN).await;
    let (bob, _) = app.user("bob", VIEWER).await;

    let bad_privilege = app
        .put(
            &format!("/api/users/{bob}/privilege"),
            Some(&admin_token),
            json!({ "privilege_id": 77 }),
        )
        .await;
    assert_eq!(bad_privilege.status(), StatusCode::NOT_FOUND);

    let bad_user = app
        .put("/api/users/9999/privilege", Some(&admin_token), json!({ "privilege_id": VIEWER }))
        .await;
    assert_eq!(bad_user.status(), StatusCode::NOT_FOUND);
}
