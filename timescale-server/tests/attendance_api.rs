//! Clock in / clock out through the API

mod common;

use common::spawn;
use http::{Method, StatusCode};
use serde_json::json;

#[tokio::test]
async fn test_second_punch_closes_the_day() {
    let app = spawn().await;
    let (me, token) = app.staff("111122223333", "meera@example.com").await;

    let res = app
        .call(Method::GET, "/api/timelogs/status", Some(&token), None)
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["data"]["state"], "no_entry");

    let first = app
        .call(Method::POST, "/api/timelogs/punch", Some(&token), Some(json!({})))
        .await;
    assert_eq!(first.status, StatusCode::OK, "{}", first.body);
    assert_eq!(first.body["data"]["created"], true);
    assert_eq!(first.body["data"]["state"], "clocked_in");

    let second = app
        .call(Method::POST, "/api/timelogs/punch", Some(&token), Some(json!({})))
        .await;
    assert_eq!(second.body["data"]["created"], false);
    assert_eq!(second.body["data"]["state"], "clocked_out");
    assert_eq!(second.body["data"]["entry"]["id"], first.body["data"]["entry"]["id"]);

    let res = app
        .call(Method::GET, &format!("/api/staff/{}/timelogs", me.id), Some(&token), None)
        .await;
    assert_eq!(res.body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_manager_punches_for_staff() {
    let app = spawn().await;
    let (staff, staff_token) = app.staff("111122223333", "meera@example.com").await;
    let (other, _) = app.staff("444455556666", "anil@example.com").await;
    let (_, manager) = app.manager("777788889999", "lead@example.com").await;

    let res = app
        .call(
            Method::POST,
            "/api/timelogs/punch",
            Some(&manager),
            Some(json!({ "staff_id": staff.id })),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["data"]["entry"]["staff_id"], staff.id);

    // Plain staff cannot act for a colleague
    let res = app
        .call(
            Method::POST,
            "/api/timelogs/punch",
            Some(&staff_token),
            Some(json!({ "staff_id": other.id })),
        )
        .await;
    assert_eq!(res.status, StatusCode::SEE_OTHER);
    assert_eq!(res.code(), Some(2001));

    let res = app
        .call(
            Method::GET,
            &format!("/api/timelogs/status?staff_id={}", staff.id),
            Some(&manager),
            None,
        )
        .await;
    assert_eq!(res.body["data"]["state"], "clocked_in");
}

#[tokio::test]
async fn test_punch_picture_is_stored() {
    let app = spawn().await;
    let (_, token) = app.staff("111122223333", "meera@example.com").await;

    let res = app
        .call(
            Method::POST,
            "/api/timelogs/punch",
            Some(&token),
            Some(json!({ "picture": "data:image/png;base64,iVBORw0KGgo=" })),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.body["data"]["entry"]["picture_id"].as_i64().is_some());
    assert_eq!(app.store.put_count(), 1);
}

#[tokio::test]
async fn test_other_staff_history_is_hidden() {
    let app = spawn().await;
    let (_, token) = app.staff("111122223333", "meera@example.com").await;
    let (other, _) = app.staff("444455556666", "anil@example.com").await;

    let res = app
        .call(Method::GET, &format!("/api/staff/{}/timelogs", other.id), Some(&token), None)
        .await;
    assert_eq!(res.status, StatusCode::SEE_OTHER);
    assert_eq!(res.location(), Some("/staff/signin"));
}
