mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;

use common::TestApp;

#[tokio::test]
async fn new_report_notifies_department_admins_and_superadmins() -> Result<()> {
    let app = TestApp::new();
    let author = app.user("author@example.com").await?;
    let finance = app.admin("fin@example.com", "Finance Report").await?;
    let sales = app.admin("sales@example.com", "Sales Report").await?;
    let boss = app.superadmin("boss@example.com").await?;

    app.submit_report(&author, "Budget", "Finance Report").await?;

    let (_, body) = app.get("/api/notifications", &finance.token).await?;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["data"][0]["kind"], "report");
    assert_eq!(body["data"][0]["read"], false);

    let (_, body) = app.get("/api/notifications", &boss.token).await?;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(1));

    let (_, body) = app.get("/api/notifications", &sales.token).await?;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(0));
    Ok(())
}

#[tokio::test]
async fn review_notifies_the_owner() -> Result<()> {
    let app = TestApp::new();
    let author = app.user("author@example.com").await?;
    let boss = app.superadmin("boss@example.com").await?;
    let id = app.submit_report(&author, "Budget", "Finance Report").await?;

    app.put(
        &format!("/api/reports/{}/status", id),
        &boss.token,
        json!({ "status": "Approved" }),
    )
    .await?;

    let (_, body) = app.get("/api/notifications", &author.token).await?;
    let message = body["data"][0]["message"].as_str().unwrap_or_default();
    assert!(message.contains("approved"), "{}", message);
    Ok(())
}

#[tokio::test]
async fn marking_read_twice_changes_state_once() -> Result<()> {
    let app = TestApp::new();
    let author = app.user("author@example.com").await?;
    let boss = app.superadmin("boss@example.com").await?;
    app.submit_report(&author, "Budget", "Finance Report").await?;

    let (_, body) = app.get("/api/notifications", &boss.token).await?;
    let id = body["data"][0]["id"].as_str().unwrap_or_default().to_string();
    let path = format!("/api/notifications/{}/read", id);

    let (status, first) = app.put(&path, &boss.token, json!({})).await?;
    assert_eq!(status, StatusCode::OK, "{}", first);
    assert_eq!(first["data"]["changed"], true);
    assert_eq!(first["data"]["notification"]["read"], true);
    let read_at = first["data"]["notification"]["readAt"].clone();
    assert!(read_at.is_string());

    let (status, second) = app.put(&path, &boss.token, json!({})).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["data"]["changed"], false);
    assert_eq!(second["data"]["notification"]["readAt"], read_at);

    let (_, body) = app.get("/api/notifications", &boss.token).await?;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(1));
    Ok(())
}

#[tokio::test]
async fn cannot_mark_someone_elses_notification() -> Result<()> {
    let app = TestApp::new();
    let author = app.user("author@example.com").await?;
    let boss = app.superadmin("boss@example.com").await?;
    app.submit_report(&author, "Budget", "Finance Report").await?;

    let (_, body) = app.get("/api/notifications", &boss.token).await?;
    let id = body["data"][0]["id"].as_str().unwrap_or_default().to_string();

    let (status, _) = app
        .put(&format!("/api/notifications/{}/read", id), &author.token, json!({}))
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn clear_empties_only_own_list() -> Result<()> {
    let app = TestApp::new();
    let author = app.user("author@example.com").await?;
    let boss = app.superadmin("boss@example.com").await?;
    let finance = app.admin("fin@example.com", "Finance Report").await?;
    app.submit_report(&author, "Budget", "Finance Report").await?;

    let (status, body) = app.delete("/api/notifications/clear", &boss.token).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["removed"], 1);

    let (_, body) = app.get("/api/notifications", &boss.token).await?;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(0));
    let (_, body) = app.get("/api/notifications", &finance.token).await?;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(1));
    Ok(())
}

#[tokio::test]
async fn system_broadcast_reaches_target_role() -> Result<()> {
    let app = TestApp::new();
    let boss = app.superadmin("boss@example.com").await?;
    let finance = app.admin("fin@example.com", "Finance Report").await?;
    let sales = app.admin("sales@example.com", "Sales Report").await?;
    let user = app.user("plain@example.com").await?;

    let (status, body) = app
        .post(
            "/api/admin/notifications",
            &boss.token,
            json!({ "message": "Quarter closes Friday", "target": "admin" }),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["data"]["notification"]["recipients"], 2);

    for account in [&finance, &sales] {
        let (_, body) = app.get("/api/notifications", &account.token).await?;
        assert_eq!(body["data"][0]["message"], "Quarter closes Friday");
        assert_eq!(body["data"][0]["kind"], "system");
    }
    let (_, body) = app.get("/api/notifications", &user.token).await?;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(0));

    let (_, body) = app.get("/api/admin/notifications/all", &boss.token).await?;
    assert_eq!(body["data"][0]["target"], "admin");

    let (status, _) = app
        .post(
            "/api/admin/notifications",
            &boss.token,
            json!({ "message": "x", "target": "everyone" }),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn direct_send_and_admin_views() -> Result<()> {
    let app = TestApp::new();
    let boss = app.superadmin("boss@example.com").await?;
    let finance = app.admin("fin@example.com", "Finance Report").await?;
    let user = app.user("plain@example.com").await?;

    let (status, body) = app
        .post(
            "/api/notifications/send",
            &boss.token,
            json!({ "userId": user.id(), "message": "Please resubmit", "type": "report" }),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["data"]["kind"], "report");

    let (status, body) = app
        .get(&format!("/api/notifications/user/{}", user.id()), &finance.token)
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["message"], "Please resubmit");
    assert_eq!(body["data"][0]["recipient"]["email"], "plain@example.com");

    let (_, body) = app.get("/api/notifications/admin/all", &finance.token).await?;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(1));

    let (status, _) = app
        .post(
            "/api/notifications/send",
            &boss.token,
            json!({ "userId": uuid::Uuid::new_v4(), "message": "hello?" }),
        )
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}
