mod common;

use common::*;

use chrono::{TimeZone, Utc};
use http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;

#[tokio::test]
async fn test_list_empty_store() {
    let setup = TestSetup::new();

    let response = setup
        .send_get_request("/images")
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(allow_origin(&response), Some("*"));
    assert_eq!(
        parse_response_body(response).await,
        json!({ "images": [], "count": 0 })
    );
}

#[tokio::test]
async fn test_list_newest_first() {
    let t1 = Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap();
    let t2 = Utc.with_ymd_and_hms(2024, 1, 2, 8, 0, 0).unwrap();
    let t3 = Utc.with_ymd_and_hms(2024, 1, 3, 8, 0, 0).unwrap();

    let setup = TestSetup::with(
        FakeMediaStore::default(),
        MemoryImageStore::with_records(vec![
            image_record("second", "b.png", t2),
            image_record("first", "a.png", t1),
            image_record("third", "c.png", t3),
        ]),
    );

    let body = parse_response_body(
        setup
            .send_get_request("/images")
            .await
            .expect("Failed to send request"),
    )
    .await;

    assert_eq!(body["count"], 3);
    let ids: Vec<&str> = body["images"]
        .as_array()
        .unwrap()
        .iter()
        .map(|image| image["imageId"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["third", "second", "first"]);
}

#[tokio::test]
async fn test_list_equal_timestamps_keep_store_order() {
    let at = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
    let later = Utc.with_ymd_and_hms(2024, 6, 2, 0, 0, 0).unwrap();

    let setup = TestSetup::with(
        FakeMediaStore::default(),
        MemoryImageStore::with_records(vec![
            image_record("tie-1", "a.png", at),
            image_record("tie-2", "b.png", at),
            image_record("newest", "c.png", later),
            image_record("tie-3", "d.png", at),
        ]),
    );

    let body = parse_response_body(
        setup
            .send_get_request("/images")
            .await
            .expect("Failed to send request"),
    )
    .await;

    let ids: Vec<&str> = body["images"]
        .as_array()
        .unwrap()
        .iter()
        .map(|image| image["imageId"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["newest", "tie-1", "tie-2", "tie-3"]);
}

#[tokio::test]
async fn test_list_normalizes_missing_size() {
    let mut record = image_record(
        "no-size",
        "cat.png",
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap(),
    );
    record.file_size = None;

    let setup = TestSetup::with(
        FakeMediaStore::default(),
        MemoryImageStore::with_records(vec![record]),
    );

    let body = parse_response_body(
        setup
            .send_get_request("/images")
            .await
            .expect("Failed to send request"),
    )
    .await;

    assert_eq!(
        body["images"][0],
        json!({
            "imageId": "no-size",
            "fileName": "cat.png",
            "fileUrl": format!("{FAKE_BUCKET_URL}/no-size-cat.png"),
            "fileType": "image/png",
            "fileSize": 0,
            "uploadedAt": "2024-05-01T12:30:00.000Z",
            "storageKey": "no-size-cat.png",
        })
    );
}

#[tokio::test]
async fn test_list_store_failure() {
    let setup = TestSetup::with(FakeMediaStore::default(), MemoryImageStore::failing_scan());

    let response = setup
        .send_get_request("/images")
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(allow_origin(&response), Some("*"));

    let body = parse_response_body(response).await;
    assert_eq!(body["error"], "Failed to fetch images");
    assert_eq!(body["code"], "list_failed");
    assert!(body.get("images").is_none());
    assert_eq!(setup.image_records.scan_calls(), 1);
}

#[tokio::test]
async fn test_upload_then_list_round_trip() {
    let setup = TestSetup::new();

    let upload = parse_response_body(
        setup
            .send_post_request(
                "/upload",
                json!({ "fileName": "cat.png", "fileType": "image/png", "fileSize": 1024 }),
            )
            .await
            .expect("Failed to send request"),
    )
    .await;

    let body = parse_response_body(
        setup
            .send_get_request("/images")
            .await
            .expect("Failed to send request"),
    )
    .await;

    assert_eq!(body["count"], 1);
    let image = &body["images"][0];
    assert_eq!(image["imageId"], upload["imageId"]);
    assert_eq!(image["fileName"], "cat.png");
    assert_eq!(image["fileType"], "image/png");
    assert_eq!(image["fileSize"], 1024);
    assert_eq!(image["fileUrl"], upload["fileUrl"]);
    assert_eq!(
        image["storageKey"],
        format!("{}-cat.png", upload["imageId"].as_str().unwrap())
    );

    let stored = &setup.image_records.records()[0];
    let uploaded_at = chrono::DateTime::parse_from_rfc3339(image["uploadedAt"].as_str().unwrap())
        .unwrap()
        .with_timezone(&Utc);
    assert_eq!(uploaded_at.timestamp_millis(), stored.uploaded_at.timestamp_millis());
}
