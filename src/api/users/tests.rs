use axum::http::{Method, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use crate::db::types::UserRole;
use crate::test_support;

#[tokio::test]
async fn admin_can_create_and_update_user() {
    let ctx = test_support::setup_test_context().await;

    let admin =
        test_support::insert_user(ctx.state.db(), "admin", UserRole::Admin, "admin-pass").await;
    let token = test_support::bearer_token(&admin, ctx.state.settings());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/users",
            Some(&token),
            Some(json!({
                "username": "teacher.one",
                "full_name": "Teacher One",
                "password": "teacher-pass",
                "role": "teacher"
            })),
        ))
        .await
        .expect("create user");

    let status = response.status();
    let created = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::CREATED, "response: {created}");
    assert_eq!(created["role"], "teacher");
    assert_eq!(created["is_active"], true);
    let user_id = created["id"].as_str().expect("user id").to_string();

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::PATCH,
            &format!("/api/v1/users/{user_id}"),
            Some(&token),
            Some(json!({ "full_name": "Renamed Teacher", "is_active": false })),
        ))
        .await
        .expect("update user");

    let status = response.status();
    let updated = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {updated}");
    assert_eq!(updated["full_name"], "Renamed Teacher");
    assert_eq!(updated["is_active"], false);

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::GET,
            "/api/v1/audit-logs?entity_type=user",
            Some(&token),
            None,
        ))
        .await
        .expect("audit logs");
    let logs = test_support::read_json(response).await;
    assert_eq!(logs["total_count"], 2);
}

#[tokio::test]
async fn non_admin_cannot_list_users() {
    let ctx = test_support::setup_test_context().await;

    let teacher =
        test_support::insert_user(ctx.state.db(), "teacher", UserRole::Teacher, "teacher-pass")
            .await;
    let token = test_support::bearer_token(&teacher, ctx.state.settings());

    let response = ctx
        .app
        .oneshot(test_support::json_request(Method::GET, "/api/v1/users", Some(&token), None))
        .await
        .expect("list users");

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn duplicate_username_conflicts() {
    let ctx = test_support::setup_test_context().await;

    let admin =
        test_support::insert_user(ctx.state.db(), "admin", UserRole::Admin, "admin-pass").await;
    test_support::insert_user(ctx.state.db(), "taken", UserRole::Student, "student-pass").await;
    let token = test_support::bearer_token(&admin, ctx.state.settings());

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/users",
            Some(&token),
            Some(json!({ "username": "taken", "full_name": "Dup", "password": "password123" })),
        ))
        .await
        .expect("create user");

    assert_eq!(response.status(), StatusCode::CONFLICT);
}
