mod common;

use axum::http::StatusCode;
use common::{TestApp, json_request};
use serde_json::json;

#[tokio::test]
async fn test_category_lifecycle() {
    let t = TestApp::new().await;

    let (status, body) = t
        .post_json(
            "/api/categories",
            json!({ "category_kh": "ចិត្តវិទ្យា", "category_en": "Psychology" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Category created successfully");
    assert_eq!(body["data"]["category_en"], "Psychology");
    assert_eq!(body["data"]["category_kh"], "ចិត្តវិទ្យា");
    let id = body["data"]["id"].as_i64().unwrap();

    let (status, body) = t.get("/api/categories").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Category list");
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (status, body) = t.get(&format!("/api/categories/{}", id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Category details");
    assert_eq!(body["data"]["id"], id);

    let (status, body) = t
        .put_json(
            &format!("/api/categories/{}", id),
            json!({ "category_en": "Clinical Psychology" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Category updated successfully");
    assert_eq!(body["data"]["category_en"], "Clinical Psychology");
    assert_eq!(body["data"]["category_kh"], "ចិត្តវិទ្យា");

    let (status, body) = t.delete(&format!("/api/categories/{}", id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Category deleted successfully");
    assert!(body.get("data").is_none());

    let (status, body) = t.get(&format!("/api/categories/{}", id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Category not found");
}

#[tokio::test]
async fn test_duplicate_category_name_is_rejected() {
    let t = TestApp::new().await;
    t.create_category("ចិត្តវិទ្យា", "Psychology").await;

    let (status, body) = t
        .post_json(
            "/api/categories",
            json!({ "category_kh": "សុខភាព", "category_en": "Psychology" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["message"], "Validation errors");
    assert_eq!(
        body["errors"]["category_en"][0],
        "The category en has already been taken."
    );
    assert!(body["errors"].get("category_kh").is_none());

    let (_, body) = t.get("/api/categories").await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_category_field_rules() {
    let t = TestApp::new().await;

    let (status, body) = t.post_json("/api/categories", json!({})).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body["errors"]["category_kh"][0],
        "The category kh field is required."
    );
    assert_eq!(
        body["errors"]["category_en"][0],
        "The category en field is required."
    );

    // Scripts are not interchangeable
    let (status, body) = t
        .post_json(
            "/api/categories",
            json!({ "category_kh": "Psychology", "category_en": "ចិត្តវិទ្យា" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body["errors"]["category_kh"][0],
        "The category kh field format is invalid."
    );
    assert_eq!(
        body["errors"]["category_en"][0],
        "The category en field format is invalid."
    );

    // Whitespace-only counts as missing
    let (status, body) = t
        .post_json(
            "/api/categories",
            json!({ "category_kh": "   ", "category_en": "Psych0logy" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body["errors"]["category_kh"][0],
        "The category kh field is required."
    );
    assert_eq!(
        body["errors"]["category_en"][0],
        "The category en field format is invalid."
    );
}

#[tokio::test]
async fn test_category_update_rules() {
    let t = TestApp::new().await;
    let first = t.create_category("ចិត្តវិទ្យា", "Psychology").await;
    t.create_category("សុខភាព", "Health").await;

    // Keeping its own name is not a conflict
    let (status, _) = t
        .put_json(
            &format!("/api/categories/{}", first),
            json!({ "category_en": "Psychology" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = t
        .put_json(
            &format!("/api/categories/{}", first),
            json!({ "category_en": "Health" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body["errors"]["category_en"][0],
        "The category en has already been taken."
    );

    let (status, body) = t
        .put_json(
            &format!("/api/categories/{}", first),
            json!({ "category_en": "A".repeat(51) }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body["errors"]["category_en"][0],
        "The category en field must not be greater than 50 characters."
    );

    let (status, body) = t
        .put_json("/api/categories/999", json!({ "category_en": "Anything" }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Category not found");
}

#[tokio::test]
async fn test_missing_category_ids() {
    let t = TestApp::new().await;

    let (status, body) = t.get("/api/categories/42").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Category not found");

    let (status, _) = t.delete("/api/categories/42").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = t.get("/api/categories/not-a-number").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Category not found");
}

#[tokio::test]
async fn test_malformed_json_body() {
    let t = TestApp::new().await;

    let request = axum::http::Request::builder()
        .method("POST")
        .uri("/api/categories")
        .header("Content-Type", "application/json")
        .body(axum::body::Body::from("{not json"))
        .unwrap();
    let (status, body) = t.send(request).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["errors"]["body"].is_array());

    // A wrongly typed value is a field error, not a body error
    let (status, body) = t
        .send(json_request(
            "POST",
            "/api/categories",
            json!({ "category_kh": 5, "category_en": true }),
        ))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["errors"].get("body").is_none(), "{}", body);
    assert_eq!(
        body["errors"]["category_kh"][0],
        "The category kh field format is invalid."
    );
    assert_eq!(
        body["errors"]["category_en"][0],
        "The category en field format is invalid."
    );
}

#[tokio::test]
async fn test_blank_update_keeps_stored_names() {
    let t = TestApp::new().await;
    let id = t.create_category("ចិត្តវិទ្យា", "Psychology").await;
    let uri = format!("/api/categories/{}", id);

    let (status, body) = t.put_json(&uri, json!({ "category_en": "" })).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body["errors"]["category_en"][0],
        "The category en field must be a string."
    );

    let (status, body) = t
        .put_json(&uri, json!({ "category_kh": "   ", "category_en": "Health" }))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body["errors"]["category_kh"][0],
        "The category kh field must be a string."
    );
    assert!(body["errors"].get("category_en").is_none());

    let (status, body) = t.get(&uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["category_kh"], "ចិត្តវិទ្យា");
    assert_eq!(body["data"]["category_en"], "Psychology");

    // Leaving a field out still keeps it
    let (status, body) = t.put_json(&uri, json!({ "category_en": "Health" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["category_kh"], "ចិត្តវិទ្យា");
    assert_eq!(body["data"]["category_en"], "Health");
}

#[tokio::test]
async fn test_delete_category_cascades_to_content() {
    let t = TestApp::new().await;
    let category = t.create_category("ចិត្តវិទ្យា", "Psychology").await;
    let sub_category = t
        .create_sub_category(category, "គ្លីនិក", "Clinical")
        .await;
    let created = t
        .create_content(category, sub_category, "ការសិក្សា", "Case Study")
        .await;
    let content_id = created["data"][0]["id"].as_i64().unwrap();
    assert_eq!(t.stored_file_count(), 2);

    let (status, _) = t.delete(&format!("/api/categories/{}", category)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = t.get(&format!("/api/subcategories/{}", sub_category)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = t.get(&format!("/api/content/{}", content_id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (_, body) = t.get("/api/content").await;
    assert!(body["data"].as_array().unwrap().is_empty());

    assert_eq!(t.stored_file_count(), 0);
}
