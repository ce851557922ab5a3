//! HTTP-level integration tests for the order lifecycle.

mod common;

use std::sync::Arc;

use axum::http::{Method, StatusCode};
use common::{
    body_json, delete_auth, get, post_json, post_json_auth, put_json_auth, send_multipart,
    staff_token, token_for, Part, RecordingImageStore,
};
use sarathi_api::bootstrap::seed_accounts;
use sarathi_core::seed::SPECIAL_STAFF_EMAIL;
use sarathi_db::repositories::StaffRepo;
use serde_json::{json, Value};
use sqlx::PgPool;

fn order_body() -> Value {
    json!({
        "customerName": "Asha Traders",
        "customerPhone": "9000000000",
        "items": [
            { "productId": 1, "productName": "Copper wire", "quantity": 2, "price": 500 }
        ],
        "total": 1000
    })
}

async fn create_order(app: axum::Router, body: Value) -> Value {
    let response = post_json_auth(app, "/api/orders", body, &staff_token()).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_assigns_sequential_numbers_and_defaults(pool: PgPool) {
    let app = common::build_test_app(pool);

    let first = create_order(app.clone(), order_body()).await;
    let second = create_order(app, order_body()).await;

    assert_eq!(first["orderNumber"], "ORD001");
    assert_eq!(second["orderNumber"], "ORD002");
    assert_eq!(first["status"], "pending");
    assert_eq!(first["paymentCondition"], "immediate");
    assert_eq!(first["priority"], "normal");
    assert_eq!(first["isPaid"], false);
    assert_eq!(first["iswithout"], false);
    assert_eq!(first["createdBy"], 2, "createdBy defaults to the caller");
    assert_eq!(first["items"][0]["productName"], "Copper wire");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_requires_token(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json(app, "/api/orders", order_body()).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_missing_required_fields(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json_auth(
        app,
        "/api/orders",
        json!({ "customerName": "Only a name" }),
        &staff_token(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["details"]["customerPhone"].is_string());
    assert!(json["details"]["total"].is_string());
    assert!(json["details"].get("customerName").is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_invalid_status_is_rejected(pool: PgPool) {
    let app = common::build_test_app(pool);
    let mut body = order_body();
    body["status"] = json!("shipped");

    let response = post_json_auth(app, "/api/orders", body, &staff_token()).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["details"]["status"].is_string());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_special_staff_assignment_sets_flag(pool: PgPool) {
    seed_accounts(&pool).await.unwrap();
    let special_id = StaffRepo::find_id_by_email(&pool, SPECIAL_STAFF_EMAIL)
        .await
        .unwrap()
        .unwrap();
    let app = common::build_test_app(pool);

    let mut special = order_body();
    special["assignedTo"] = json!(special_id);
    let created = create_order(app.clone(), special).await;
    assert_eq!(created["iswithout"], true);

    let mut regular = order_body();
    regular["assignedTo"] = json!(special_id + 1000);
    regular["iswithout"] = json!(true);
    let created = create_order(app.clone(), regular).await;
    assert_eq!(created["iswithout"], false, "client-supplied flag is ignored");

    // Reassigning to the special account sets the flag.
    let id = created["id"].as_i64().unwrap();
    let response = put_json_auth(
        app,
        &format!("/api/orders/{id}"),
        json!({ "assignedTo": special_id }),
        &staff_token(),
    )
    .await;
    assert_eq!(body_json(response).await["iswithout"], true);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_unassigning_special_staff_clears_flag_and_fields(pool: PgPool) {
    seed_accounts(&pool).await.unwrap();
    let special_id = StaffRepo::find_id_by_email(&pool, SPECIAL_STAFF_EMAIL)
        .await
        .unwrap()
        .unwrap();
    let app = common::build_test_app(pool);

    let mut body = order_body();
    body["assignedTo"] = json!(special_id);
    body["notes"] = json!("deliver after 5pm");
    body["scheduledDate"] = json!("2025-04-01");
    let created = create_order(app.clone(), body).await;
    assert_eq!(created["iswithout"], true);

    let uri = format!("/api/orders/{}", created["id"]);
    let response = put_json_auth(
        app.clone(),
        &uri,
        json!({ "assignedTo": null, "notes": null }),
        &staff_token(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["iswithout"], false);
    assert!(json["assignedTo"].is_null());
    assert!(json["notes"].is_null());
    assert!(json["scheduledDate"].is_string(), "absent fields are untouched");

    // Omitting assignedTo leaves both the assignee and the flag alone.
    let response = put_json_auth(app, &uri, json!({ "status": "invoice" }), &staff_token()).await;
    let json = body_json(response).await;
    assert_eq!(json["status"], "invoice");
    assert!(json["assignedTo"].is_null());
    assert_eq!(json["iswithout"], false);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_multipart_create_uploads_image_and_merges_order_data(pool: PgPool) {
    let images = Arc::new(RecordingImageStore::default());
    let app = common::build_test_app_with_images(pool, images.clone());

    let order_data = json!({ "customerName": "From JSON", "total": 250, "items": [] }).to_string();
    let response = send_multipart(
        app,
        Method::POST,
        "/api/orders",
        &[
            Part::Text("customerName", "From form"),
            Part::Text("customerPhone", "9111111111"),
            Part::Text("priority", "urgent"),
            Part::Text("orderData", &order_data),
            Part::File {
                name: "orderImage",
                filename: "invoice.png",
                content_type: "image/png",
                bytes: b"\x89PNG fake image bytes",
            },
        ],
        &staff_token(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["customerName"], "From JSON");
    assert_eq!(json["customerPhone"], "9111111111");
    assert_eq!(json["priority"], "urgent");
    assert_eq!(json["total"], 250.0);
    assert_eq!(
        json["orderImage"],
        "https://res.cloudinary.com/test/image/upload/v1/sarathi-orders/invoice.jpg"
    );
    assert_eq!(images.upload_count(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_multipart_rejects_disallowed_format(pool: PgPool) {
    let images = Arc::new(RecordingImageStore::default());
    let app = common::build_test_app_with_images(pool, images.clone());

    let response = send_multipart(
        app,
        Method::POST,
        "/api/orders",
        &[
            Part::Text("customerName", "Asha"),
            Part::Text("customerPhone", "9000000000"),
            Part::Text("total", "10"),
            Part::File {
                name: "orderImage",
                filename: "notes.txt",
                content_type: "text/plain",
                bytes: b"hello",
            },
        ],
        &staff_token(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["error"]
        .as_str()
        .unwrap()
        .starts_with("Invalid file format"));
    assert_eq!(images.upload_count(), 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_malformed_order_data_is_rejected(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = send_multipart(
        app,
        Method::POST,
        "/api/orders",
        &[Part::Text("orderData", "{not json")],
        &staff_token(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Invalid order data format");
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_filters(pool: PgPool) {
    let app = common::build_test_app(pool);

    let mut assigned = order_body();
    assigned["assignedTo"] = json!(42);
    assigned["status"] = json!("invoice");
    create_order(app.clone(), assigned).await;

    let response = post_json_auth(app.clone(), "/api/orders", order_body(), &token_for(7, "admin")).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let by_status = body_json(get(app.clone(), "/api/orders/status/invoice").await).await;
    assert_eq!(by_status.as_array().unwrap().len(), 1);

    let by_assignee = body_json(get(app.clone(), "/api/orders/assigned/42").await).await;
    assert_eq!(by_assignee.as_array().unwrap().len(), 1);
    assert_eq!(by_assignee[0]["orderNumber"], "ORD001");

    let by_creator = body_json(get(app.clone(), "/api/orders/created/7").await).await;
    assert_eq!(by_creator.as_array().unwrap().len(), 1);
    assert_eq!(by_creator[0]["orderNumber"], "ORD002");

    let all = body_json(get(app, "/api/orders").await).await;
    let numbers: Vec<&str> = all
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o["orderNumber"].as_str().unwrap())
        .collect();
    assert_eq!(numbers, ["ORD002", "ORD001"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_date_range_includes_whole_end_day(pool: PgPool) {
    let app = common::build_test_app(pool);
    create_order(app.clone(), order_body()).await;

    let today = chrono::Utc::now().date_naive();
    let uri = format!("/api/orders/date-range/{today}/{today}");
    let response = get(app.clone(), &uri).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 1);

    let bad = get(app, "/api/orders/date-range/yesterday/today").await;
    assert_eq!(bad.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_get_unknown_order_is_404(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/api/orders/424242").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Mutations
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_keeps_order_number(pool: PgPool) {
    let app = common::build_test_app(pool);
    let created = create_order(app.clone(), order_body()).await;
    let id = created["id"].as_i64().unwrap();

    let response = put_json_auth(
        app,
        &format!("/api/orders/{id}"),
        json!({ "status": "dispatched", "orderNumber": "ORD999", "notes": "left at gate" }),
        &staff_token(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["orderNumber"], "ORD001");
    assert_eq!(json["status"], "dispatched");
    assert_eq!(json["notes"], "left at gate");
    assert_eq!(json["customerName"], "Asha Traders");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_unknown_order_is_404(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = put_json_auth(
        app,
        "/api/orders/424242",
        json!({ "notes": "x" }),
        &staff_token(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_mark_paid_leaves_status(pool: PgPool) {
    let app = common::build_test_app(pool);
    let mut body = order_body();
    body["status"] = json!("invoice");
    let created = create_order(app.clone(), body).await;
    let id = created["id"].as_i64().unwrap();

    let response = put_json_auth(
        app,
        &format!("/api/orders/{id}/paid"),
        json!({ "paidBy": "Cash", "paymentReceivedBy": "Ravi" }),
        &staff_token(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["isPaid"], true);
    assert!(json["paidAt"].is_string());
    assert_eq!(json["paidBy"], "Cash");
    assert_eq!(json["paymentReceivedBy"], "Ravi");
    assert_eq!(json["status"], "invoice");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delivery_person_assignment(pool: PgPool) {
    let app = common::build_test_app(pool);
    let created = create_order(app.clone(), order_body()).await;
    let uri = format!("/api/orders/{}/delivery-person", created["id"]);

    let missing = put_json_auth(app.clone(), &uri, json!({}), &staff_token()).await;
    assert_eq!(missing.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(missing).await["error"], "Delivery person ID is required");

    let response = put_json_auth(app, &uri, json!({ "deliveryPersonId": 9 }), &staff_token()).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["deliveryPerson"], 9);
    assert_eq!(json["status"], "pending");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_replacing_image_removes_previous_upload(pool: PgPool) {
    let images = Arc::new(RecordingImageStore::default());
    let app = common::build_test_app_with_images(pool, images.clone());

    let mut body = order_body();
    body["orderImage"] =
        json!("https://res.cloudinary.com/demo/image/upload/v17/sarathi-orders/old-bill.jpg");
    let created = create_order(app.clone(), body).await;

    let response = send_multipart(
        app,
        Method::PUT,
        &format!("/api/orders/{}", created["id"]),
        &[Part::File {
            name: "orderImage",
            filename: "new-bill.png",
            content_type: "image/png",
            bytes: b"\x89PNG replacement",
        }],
        &staff_token(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await["orderImage"],
        "https://res.cloudinary.com/test/image/upload/v1/sarathi-orders/new-bill.jpg"
    );

    assert_eq!(images.wait_for_destroy().await, ["sarathi-orders/old-bill"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_non_numeric_id_is_a_json_error(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = get(app.clone(), "/api/orders/abc").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "BAD_REQUEST");
    assert!(json["error"].as_str().unwrap().starts_with("Invalid path parameter"));

    let response = delete_auth(app, "/api/orders/abc", &staff_token()).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "BAD_REQUEST");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_removes_row_then_cleans_up_image(pool: PgPool) {
    let images = Arc::new(RecordingImageStore::default());
    let app = common::build_test_app_with_images(pool, images.clone());

    let mut body = order_body();
    body["orderImage"] =
        json!("https://res.cloudinary.com/demo/image/upload/v17/sarathi-orders/abc123.jpg");
    let created = create_order(app.clone(), body).await;
    let uri = format!("/api/orders/{}", created["id"]);

    let response = delete_auth(app.clone(), &uri, &staff_token()).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["message"], "Order deleted successfully");

    assert_eq!(images.wait_for_destroy().await, ["sarathi-orders/abc123"]);

    let again = delete_auth(app, &uri, &staff_token()).await;
    assert_eq!(again.status(), StatusCode::NOT_FOUND);
}
