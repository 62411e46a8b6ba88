mod common;

use std::time::Duration;

use axum::http::StatusCode;
use common::{json_body, location, patient_body, TestApp};

#[tokio::test]
async fn test_add_patient_and_view_detail() {
    let app = TestApp::new();
    let token = app.signup("dr_amina", "0550000001").await;

    let resp = app.post_multipart("/patient/add/", patient_body("Dermacream"), Some(&token)).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    let detail_uri = location(&resp);
    assert!(detail_uri.starts_with("/patient/"));
    let body = json_body(resp).await;
    assert_eq!(body["message"], "Patient added successfully!");

    let resp = app.get(&detail_uri, Some(&token)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    assert_eq!(body["patient"]["product_name"], "Dermacream");
    assert_eq!(body["patient"]["before_image_url"], serde_json::Value::Null);
    assert_eq!(body["conditions"], serde_json::json!(["plaques", "itching"]));
    assert_eq!(body["updates"], serde_json::json!([]));
    assert_eq!(body["doctor"]["full_name"], "Amina Benali");
}

#[tokio::test]
async fn test_add_patient_with_image() {
    let app = TestApp::new();
    let token = app.signup("dr_amina", "0550000001").await;

    let form = patient_body("Dermacream")
        .file("before_image", "before.png", "image/png", b"\x89PNG\r\n\x1a\nfake")
        .file("after_image", "", "application/octet-stream", b"");
    let resp = app.post_multipart("/patient/add/", form, Some(&token)).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let body = json_body(app.get(&location(&resp), Some(&token)).await).await;
    let url = body["patient"]["before_image_url"].as_str().unwrap();
    assert!(url.starts_with("/media/patients/before/"));
    assert!(url.ends_with(".png"));
    assert_eq!(body["patient"]["after_image"], serde_json::Value::Null);

    let key = body["patient"]["before_image"].as_str().unwrap();
    assert!(app.media_dir.path().join(key).exists());
}

#[tokio::test]
async fn test_add_patient_rejects_non_image_upload() {
    let app = TestApp::new();
    let token = app.signup("dr_amina", "0550000001").await;

    let form = patient_body("Dermacream").file("before_image", "notes.txt", "text/plain", b"hello");
    let resp = app.post_multipart("/patient/add/", form, Some(&token)).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = json_body(resp).await;
    assert!(body["fields"]["before_image"].is_array());
    assert_eq!(app.store.counts().await.2, 0);
}

#[tokio::test]
async fn test_add_patient_requires_text_fields() {
    let app = TestApp::new();
    let token = app.signup("dr_amina", "0550000001").await;

    let form = common::MultipartBody::new().text("product_name", "Dermacream");
    let resp = app.post_multipart("/patient/add/", form, Some(&token)).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = json_body(resp).await;
    assert_eq!(body["fields"]["disease_name"][0], "This field is required.");
    assert!(body["fields"].get("product_name").is_none());
}

#[tokio::test]
async fn test_patients_are_private_to_their_doctor() {
    let app = TestApp::new();
    let token_a = app.signup("dr_amina", "0550000001").await;
    let token_b = app.signup("dr_karim", "0550000002").await;
    let patient_id = app.add_patient(&token_a, "Dermacream").await;

    let dashboard = json_body(app.get("/dashboard/", Some(&token_b)).await).await;
    assert_eq!(dashboard["total_patients"], 0);

    for uri in [
        format!("/patient/{}/", patient_id),
        format!("/patient/{}/update/", patient_id),
        format!("/patient/{}/edit/", patient_id),
        format!("/patient/{}/delete/", patient_id),
    ] {
        let resp = app.get(&uri, Some(&token_b)).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{} leaked", uri);
    }

    let resp = app
        .post_form(&format!("/patient/{}/update/", patient_id), &[("update_data", "{}")], Some(&token_b))
        .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let resp = app.post_form(&format!("/patient/{}/delete/", patient_id), &[], Some(&token_b)).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(app.store.counts().await, (2, 2, 1, 0));

    let dashboard = json_body(app.get("/dashboard/", Some(&token_a)).await).await;
    assert_eq!(dashboard["total_patients"], 1);
}

#[tokio::test]
async fn test_unknown_and_malformed_ids_are_not_found() {
    let app = TestApp::new();
    let token = app.signup("dr_amina", "0550000001").await;

    let resp = app.get("/patient/not-a-uuid/", Some(&token)).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let resp = app.get(&format!("/patient/{}/", uuid::Uuid::new_v4()), Some(&token)).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_updates_round_trip_newest_first() {
    let app = TestApp::new();
    let token = app.signup("dr_amina", "0550000001").await;
    let patient_id = app.add_patient(&token, "Dermacream").await;
    let uri = format!("/patient/{}/update/", patient_id);

    let resp = app
        .post_form(&uri, &[("update_data", r#"{"date": "2025-10-28", "notes": "ok"}"#)], Some(&token))
        .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), format!("/patient/{}/", patient_id));
    let body = json_body(resp).await;
    assert_eq!(body["message"], "Patient update added successfully!");

    tokio::time::sleep(Duration::from_millis(5)).await;
    let resp = app.post_form(&uri, &[("update_data", r#"[1, 2, 3]"#)], Some(&token)).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let body = json_body(app.get(&format!("/patient/{}/", patient_id), Some(&token)).await).await;
    let updates = body["updates"].as_array().unwrap();
    assert_eq!(updates.len(), 2);
    assert_eq!(updates[0]["update_data"], serde_json::json!([1, 2, 3]));
    assert_eq!(updates[1]["update_data"], serde_json::json!({"date": "2025-10-28", "notes": "ok"}));
}

#[tokio::test]
async fn test_invalid_update_json_is_rejected() {
    let app = TestApp::new();
    let token = app.signup("dr_amina", "0550000001").await;
    let patient_id = app.add_patient(&token, "Dermacream").await;
    let uri = format!("/patient/{}/update/", patient_id);

    for payload in [r#"{"date":}"#, ""] {
        let resp = app.post_form(&uri, &[("update_data", payload)], Some(&token)).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = json_body(resp).await;
        assert!(body["fields"]["update_data"].is_array());
    }
    assert_eq!(app.store.counts().await.3, 0);
}

#[tokio::test]
async fn test_edit_patient() {
    let app = TestApp::new();
    let token = app.signup("dr_amina", "0550000001").await;
    let patient_id = app.add_patient(&token, "Dermacream").await;
    let uri = format!("/patient/{}/edit/", patient_id);

    let form = json_body(app.get(&uri, Some(&token)).await).await;
    assert_eq!(form["form"]["initial"]["product_name"], "Dermacream");

    let resp = app.post_multipart(&uri, patient_body("Dermacream Forte"), Some(&token)).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), format!("/patient/{}/", patient_id));
    assert_eq!(json_body(resp).await["message"], "Patient updated successfully!");

    let body = json_body(app.get(&format!("/patient/{}/", patient_id), Some(&token)).await).await;
    assert_eq!(body["patient"]["product_name"], "Dermacream Forte");
    assert_eq!(app.store.counts().await.2, 1);
}

#[tokio::test]
async fn test_delete_patient_cascades_to_updates() {
    let app = TestApp::new();
    let token = app.signup("dr_amina", "0550000001").await;
    let patient_id = app.add_patient(&token, "Dermacream").await;
    let other_id = app.add_patient(&token, "Keep me").await;
    for id in [&patient_id, &other_id] {
        let resp = app
            .post_form(&format!("/patient/{}/update/", id), &[("update_data", r#"{"n": 1}"#)], Some(&token))
            .await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    }
    assert_eq!(app.store.counts().await, (1, 1, 2, 2));

    let confirm = app.get(&format!("/patient/{}/delete/", patient_id), Some(&token)).await;
    assert_eq!(confirm.status(), StatusCode::OK);

    let resp = app.post_form(&format!("/patient/{}/delete/", patient_id), &[], Some(&token)).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/dashboard/");
    assert_eq!(json_body(resp).await["message"], "Patient deleted successfully!");
    assert_eq!(app.store.counts().await, (1, 1, 1, 1));

    let resp = app.get(&format!("/patient/{}/", patient_id), Some(&token)).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_update() {
    let app = TestApp::new();
    let token_a = app.signup("dr_amina", "0550000001").await;
    let token_b = app.signup("dr_karim", "0550000002").await;
    let patient_id = app.add_patient(&token_a, "Dermacream").await;
    app.post_form(&format!("/patient/{}/update/", patient_id), &[("update_data", "{}")], Some(&token_a))
        .await;

    let body = json_body(app.get(&format!("/patient/{}/", patient_id), Some(&token_a)).await).await;
    let update_id = body["updates"][0]["_id"].as_str().unwrap().to_string();
    let uri = format!("/update/{}/delete/", update_id);

    let resp = app.post_form(&uri, &[], Some(&token_b)).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(app.store.counts().await.3, 1);

    let resp = app.post_form(&uri, &[], Some(&token_a)).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), format!("/patient/{}/", patient_id));
    assert_eq!(json_body(resp).await["message"], "Update deleted successfully!");
    assert_eq!(app.store.counts().await.3, 0);
}

async fn add_patient_with_images(app: &TestApp, token: &str) -> (String, String, String) {
    let form = patient_body("Dermacream")
        .file("before_image", "before.png", "image/png", b"\x89PNG\r\n\x1a\nbefore")
        .file("after_image", "after.jpg", "image/jpeg", b"\xff\xd8\xffafter");
    let resp = app.post_multipart("/patient/add/", form, Some(token)).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    let detail_uri = location(&resp);
    let body = json_body(app.get(&detail_uri, Some(token)).await).await;
    let before = body["patient"]["before_image"].as_str().unwrap().to_string();
    let after = body["patient"]["after_image"].as_str().unwrap().to_string();
    (detail_uri, before, after)
}

#[tokio::test]
async fn test_edit_with_new_image_replaces_stored_file() {
    let app = TestApp::new();
    let token = app.signup("dr_amina", "0550000001").await;
    let (detail_uri, old_before, after) = add_patient_with_images(&app, &token).await;
    assert!(app.media_dir.path().join(&old_before).exists());

    let form = patient_body("Dermacream").file("before_image", "retake.png", "image/png", b"\x89PNG\r\n\x1a\nretake");
    let resp = app.post_multipart(&format!("{}edit/", detail_uri), form, Some(&token)).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let body = json_body(app.get(&detail_uri, Some(&token)).await).await;
    let new_before = body["patient"]["before_image"].as_str().unwrap();
    assert_ne!(new_before, old_before);
    assert!(app.media_dir.path().join(new_before).exists());
    assert!(!app.media_dir.path().join(&old_before).exists());
    assert_eq!(body["patient"]["after_image"], after.as_str());
    assert!(app.media_dir.path().join(&after).exists());
}

#[tokio::test]
async fn test_edit_without_upload_keeps_images() {
    let app = TestApp::new();
    let token = app.signup("dr_amina", "0550000001").await;
    let (detail_uri, before, after) = add_patient_with_images(&app, &token).await;

    let form = patient_body("Dermacream Forte").file("before_image", "", "application/octet-stream", b"");
    let resp = app.post_multipart(&format!("{}edit/", detail_uri), form, Some(&token)).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let body = json_body(app.get(&detail_uri, Some(&token)).await).await;
    assert_eq!(body["patient"]["product_name"], "Dermacream Forte");
    assert_eq!(body["patient"]["before_image"], before.as_str());
    assert_eq!(body["patient"]["after_image"], after.as_str());
    assert!(app.media_dir.path().join(&before).exists());
    assert!(app.media_dir.path().join(&after).exists());
}

#[tokio::test]
async fn test_delete_patient_removes_images() {
    let app = TestApp::new();
    let token = app.signup("dr_amina", "0550000001").await;
    let (detail_uri, before, after) = add_patient_with_images(&app, &token).await;

    let resp = app.post_form(&format!("{}delete/", detail_uri), &[], Some(&token)).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(app.store.counts().await.2, 0);
    assert!(!app.media_dir.path().join(&before).exists());
    assert!(!app.media_dir.path().join(&after).exists());
}
