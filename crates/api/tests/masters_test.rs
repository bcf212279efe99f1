mod test_utils;

use axum::http::StatusCode;
use chrono::DateTime;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

use test_utils::{TestContext, as_actor, at};

#[tokio::test]
async fn test_schedule_is_readable_without_actor() {
    let ctx = TestContext::new().await;

    let response = ctx
        .server
        .get(&format!("/api/masters/{}/schedule", ctx.master_id))
        .await;

    response.assert_status_ok();
    assert_eq!(
        response.json::<Value>(),
        json!([{
            "masterId": ctx.master_id,
            "dayOfWeek": "Mon",
            "startTime": "09:00",
            "endTime": "18:00",
            "isActive": true,
        }])
    );
}

#[tokio::test]
async fn test_admin_replaces_schedule() {
    let ctx = TestContext::new().await;
    let path = format!("/api/masters/{}/schedule", ctx.master_id);

    let response = as_actor(ctx.server.put(&path), &ctx.admin)
        .json(&json!([
            { "masterId": ctx.master_id, "dayOfWeek": "Mon", "startTime": "12:00", "endTime": "14:00", "isActive": true },
            { "masterId": ctx.master_id, "dayOfWeek": "Sat", "startTime": "10:00", "endTime": "16:00", "isActive": true },
        ]))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Vec<Value>>().len(), 2);

    let slots = ctx
        .server
        .get("/api/appointments/slots")
        .add_query_param("masterId", ctx.master_id)
        .add_query_param("serviceId", ctx.service_id)
        .add_query_param("date", "2030-01-07")
        .await
        .json::<Vec<DateTime<chrono::Utc>>>();
    assert_eq!(slots, vec![at(12, 0), at(12, 30), at(13, 0)]);
}

#[tokio::test]
async fn test_client_cannot_replace_schedule() {
    let ctx = TestContext::new().await;

    as_actor(
        ctx.server
            .put(&format!("/api/masters/{}/schedule", ctx.master_id)),
        &ctx.client,
    )
    .json(&json!([]))
    .await
    .assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_inverted_hours_are_rejected() {
    let ctx = TestContext::new().await;

    as_actor(
        ctx.server
            .put(&format!("/api/masters/{}/schedule", ctx.master_id)),
        &ctx.admin,
    )
    .json(&json!([
        { "masterId": ctx.master_id, "dayOfWeek": "Mon", "startTime": "18:00", "endTime": "09:00", "isActive": true },
    ]))
    .await
    .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_day_off_exception_clears_slots() {
    let ctx = TestContext::new().await;
    let path = format!("/api/masters/{}/exceptions", ctx.master_id);

    as_actor(ctx.server.put(&path), &ctx.admin)
        .json(&json!([
            { "masterId": ctx.master_id, "date": "2030-01-07", "isDayOff": true },
        ]))
        .await
        .assert_status_ok();

    let listed = ctx.server.get(&path).await.json::<Vec<Value>>();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["isDayOff"], json!(true));

    let slots = ctx
        .server
        .get("/api/appointments/slots")
        .add_query_param("masterId", ctx.master_id)
        .add_query_param("serviceId", ctx.service_id)
        .add_query_param("date", "2030-01-07")
        .await
        .json::<Vec<Value>>();
    assert!(slots.is_empty());
}

#[tokio::test]
async fn test_unknown_master_schedule_is_not_found() {
    let ctx = TestContext::new().await;

    ctx.server
        .get(&format!("/api/masters/{}/schedule", uuid::Uuid::new_v4()))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}
