//! HTTP-level integration tests for the `/privileges` endpoints.

mod common;

use axum::http::StatusCode;
use common::{body_json, TestApp, ADMIN, EMPLOYEE, VIEWER};
use serde_json::json;

#[tokio::test]
async fn rights_map_reflects_updates() {
    let app = TestApp::new();
    let (_, admin_token) = app.user("admin", ADMIN).await;
    let (_, viewer_token) = app.user("viewer", VIEWER).await;

    let rights = body_json(app.get("/api/privileges/rights", Some(&viewer_token)).await).await;
    assert_eq!(rights["data"]["Admin"]["edit_users"], true);
    assert_eq!(rights["data"]["Viewer"]["view_locks"], true);
    assert_eq!(rights["data"]["Viewer"]["view_logs"], false);

    let response = app
        .put(
            &format!("/api/privileges/{VIEWER}"),
            Some(&admin_token),
            json!({ "description": "Locks and logs", "view_locks": true, "view_logs": true }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert_eq!(updated["data"]["name"], "Viewer");
    assert_eq!(updated["data"]["view_logs"], true);

    let rights = body_json(app.get("/api/privileges/rights", Some(&viewer_token)).await).await;
    assert_eq!(rights["data"]["Viewer"]["view_logs"], true);
}

#[tokio::test]
async fn privilege_management_requires_edit_users() {
    let app = TestApp::new();
    let (_, token) = app.user("emp", EMPLOYEE).await;

    assert_eq!(app.get("/api/privileges", Some(&token)).await.status(), StatusCode::FORBIDDEN);
    assert_eq!(
        app.get(&format!("/api/privileges/{EMPLOYEE}"), Some(&token)).await.status(),
        StatusCode::FORBIDDEN
    );
    assert_eq!(
        app.post("/api/privileges", Some(&token), json!({ "name": "Auditor" }))
            .await
            .status(),
        StatusCode::FORBIDDEN
    );
    assert_eq!(
        app.get("/api/privileges/rights", None).await.status(),
        StatusCode::UNAUTHORIZED
    );
}

#[tokio::test]
async fn create_and_delete_unreferenced_privilege() {
    let app = TestApp::new();
    let (_, admin_token) = app.user("admin", ADMIN).await;

    let response = app
        .post(
            "/api/privileges",
            Some(&admin_token),
            json!({ "name": "Auditor", "description": "Reads logs", "view_logs": true }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    assert_eq!(created["data"]["view_logs"], true);
    assert_eq!(created["data"]["edit_locks"], false);
    let id = created["data"]["id"].as_i64().unwrap();

    let duplicate = app
        .post("/api/privileges", Some(&admin_token), json!({ "name": "Auditor" }))
        .await;
    assert_eq!(duplicate.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(duplicate).await["field"], "name");

    let blank = app
        .post("/api/privileges", Some(&admin_token), json!({ "name": "  " }))
        .await;
    assert_eq!(blank.status(), StatusCode::BAD_REQUEST);

    let uri = format!("/api/privileges/{id}");
    assert_eq!(app.delete(&uri, Some(&admin_token)).await.status(), StatusCode::NO_CONTENT);
    assert_eq!(app.get(&uri, Some(&admin_token)).await.status(), StatusCode::NOT_FOUND);
    assert_eq!(app.delete(&uri, Some(&admin_token)).await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleting_referenced_privilege_is_conflict() {
    let app = TestApp::new();
    let (_, admin_token) = app.user("admin", ADMIN).await;

    let response = app
        .delete(&format!("/api/privileges/{ADMIN}"), Some(&admin_token))
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["code"], "CONFLICT");

    // Referenced only by a lock.
    let auditor = body_json(
        app.post("/api/privileges", Some(&admin_token), json!({ "name": "Auditor" }))
            .await,
    )
    .await;
    let auditor_id = auditor["data"]["id"].as_i64().unwrap();
    app.post(
        "/api/locks",
        Some(&admin_token),
        json!({ "id": 4, "privilege_id": auditor_id }),
    )
    .await;
    let response = app
        .delete(&format!("/api/privileges/{auditor_id}"), Some(&admin_token))
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn user_privileges_self_or_view_users() {
    let app = TestApp::new();
    let (_, admin_token) = app.user("admin", ADMIN).await;
    let (emp, emp_token) = app.user("emp", EMPLOYEE).await;
    let (viewer, _) = app.user("viewer", VIEWER).await;

    let own = app
        .get(&format!("/api/privileges/user/{emp}"), Some(&emp_token))
        .await;
    assert_eq!(own.status(), StatusCode::OK);
    let json = body_json(own).await;
    assert_eq!(json["data"]["privilege_name"], "Employee");
    assert_eq!(json["data"]["edit_locks"], true);

    let other = app
        .get(&format!("/api/privileges/user/{viewer}"), Some(&emp_token))
        .await;
    assert_eq!(other.status(), StatusCode::FORBIDDEN);

    let admin = app
        .get(&format!("/api/privileges/user/{viewer}"), Some(&admin_token))
        .await;
    assert_eq!(body_json(admin).await["data"]["privilege_id"], VIEWER);
}
