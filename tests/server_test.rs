//! HTTPルーターの統合テスト
//!
//! multipart本文を組み立てて `POST /api/process-excel` を呼び、
//! ステータス・ヘッダー・本文を検証する

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use percent_encoding::percent_decode_str;
use rust_xlsxwriter::Workbook;
use sheet_combiner::server::{build_router, AppState};
use sheet_combiner_common::{Capabilities, ProcessReport, XLSX_CONTENT_TYPE};
use tower::ServiceExt;

const BOUNDARY: &str = "----sheet-combiner-test-boundary";

enum Part<'a> {
    File { name: &'a str, bytes: Vec<u8> },
    Text { field: &'a str, value: &'a str },
}

fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            Part::File { name, bytes } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"files\"; filename=\"{}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n",
                        name
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
            }
            Part::Text { field, value } => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", field).as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn upload_request(parts: &[Part<'_>]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/process-excel")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}

fn xlsx(sheets: &[&str]) -> Vec<u8> {
    let mut book = Workbook::new();
    for name in sheets {
        let sheet = book.add_worksheet();
        sheet.set_name(*name).unwrap();
        sheet.write_string(0, 0, "header").unwrap();
        sheet.write_number(1, 0, 1.0).unwrap();
    }
    book.save_to_buffer().unwrap()
}

fn app(combined_mode_enabled: bool) -> Router {
    build_router(AppState {
        default_pattern: "month".to_string(),
        capabilities: Capabilities { combined_mode_enabled },
        parse_jobs: 1,
        max_upload_bytes: 10 * 1024 * 1024,
    })
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
    serde_json::from_slice(&bytes).expect("JSON本文のはず")
}

/// パーセントエンコードされたレポートヘッダーを戻す
fn decode_report(value: &str) -> ProcessReport {
    let decoded = percent_decode_str(value).decode_utf8().expect("UTF-8のはず");
    serde_json::from_str(&decoded).expect("レポートJSONのはず")
}

#[tokio::test]
async fn test_health() {
    let response = app(false)
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_process_excel_returns_workbook_and_report() {
    let request = upload_request(&[
        Part::File { name: "jan.xlsx", bytes: xlsx(&["Cover", "Month 01"]) },
        Part::File { name: "notes.xlsx", bytes: xlsx(&["Notes"]) },
        Part::Text { field: "searchPattern", value: "  MONTH " },
    ]);

    let response = app(false).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let headers = response.headers().clone();
    assert_eq!(headers[header::CONTENT_TYPE], XLSX_CONTENT_TYPE);

    let disposition = headers[header::CONTENT_DISPOSITION].to_str().unwrap();
    assert!(disposition.starts_with("attachment; filename=\"Combined_Audit_"));
    assert!(disposition.ends_with(".xlsx\""));

    let exposed = headers[header::ACCESS_CONTROL_EXPOSE_HEADERS].to_str().unwrap();
    assert!(exposed.contains("X-Process-Report"));

    let report = decode_report(headers["x-process-report"].to_str().unwrap());
    assert_eq!(report.len(), 2);
    assert_eq!(report.entries()[0].sheet_name.as_deref(), Some("Month 01"));
    assert!(!report.entries()[1].success);
    assert_eq!(
        report.entries()[1].available_sheets,
        Some(vec!["Notes".to_string()])
    );

    let body = to_bytes(response.into_body(), 10 * 1024 * 1024).await.unwrap();
    // xlsxはZIPコンテナ
    assert!(body.starts_with(b"PK"));
}

#[tokio::test]
async fn test_missing_pattern_uses_default() {
    let request = upload_request(&[Part::File { name: "a.xlsx", bytes: xlsx(&["monthly"]) }]);

    let response = app(false).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_no_files_is_bad_request() {
    let request = upload_request(&[Part::Text { field: "searchPattern", value: "month" }]);

    let response = app(false).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = json_body(response).await;
    assert_eq!(json["error"], "no files were uploaded");
}

#[tokio::test]
async fn test_zero_matches_is_not_found_with_report() {
    let request = upload_request(&[
        Part::File { name: "x.xlsx", bytes: xlsx(&["Cover", "Data"]) },
        Part::File { name: "y.xlsx", bytes: xlsx(&["Notes"]) },
        Part::Text { field: "searchPattern", value: "zzz" },
    ]);

    let response = app(false).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = json_body(response).await;
    assert_eq!(json["error"], "no sheet with \"zzz\" in its name was found");
    let report = json["report"].as_array().unwrap();
    assert_eq!(report.len(), 2);
    assert_eq!(report[0]["success"], false);
    assert_eq!(report[0]["availableSheets"], serde_json::json!(["Cover", "Data"]));
    assert_eq!(report[1]["availableSheets"], serde_json::json!(["Notes"]));
}

#[tokio::test]
async fn test_unreadable_files_are_not_found_with_errors() {
    let request = upload_request(&[
        Part::File { name: "a.xlsx", bytes: b"garbage".to_vec() },
        Part::File { name: "b.xlsx", bytes: b"more garbage".to_vec() },
    ]);

    let response = app(false).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = json_body(response).await;
    let report = json["report"].as_array().unwrap();
    assert_eq!(report.len(), 2);
    for entry in report {
        assert_eq!(entry["success"], false);
        assert!(entry["error"].as_str().unwrap().starts_with("failed to read file"));
        assert!(entry.get("availableSheets").is_none());
    }
}

#[tokio::test]
async fn test_combined_mode_is_forbidden_when_disabled() {
    let request = upload_request(&[
        Part::File { name: "a.xlsx", bytes: xlsx(&["Month"]) },
        Part::Text { field: "combineIntoOne", value: "true" },
    ]);

    let response = app(false).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let json = json_body(response).await;
    assert_eq!(json["error"], "combined mode is disabled");
}

#[tokio::test]
async fn test_combined_flag_before_files_is_forbidden() {
    let request = upload_request(&[
        Part::Text { field: "combineIntoOne", value: "true" },
        Part::File { name: "a.xlsx", bytes: xlsx(&["Month"]) },
        Part::File { name: "b.xlsx", bytes: xlsx(&["Month"]) },
    ]);

    let response = app(false).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_combined_flag_without_files_is_bad_request() {
    let request = upload_request(&[Part::Text { field: "combineIntoOne", value: "true" }]);

    let response = app(false).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = json_body(response).await;
    assert_eq!(json["error"], "no files were uploaded");
}

#[tokio::test]
async fn test_combined_mode_when_enabled() {
    let request = upload_request(&[
        Part::File { name: "a.xlsx", bytes: xlsx(&["Month"]) },
        Part::File { name: "b.xlsx", bytes: xlsx(&["Month"]) },
        Part::Text { field: "combineIntoOne", value: "true" },
    ]);

    let response = app(true).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let disposition = response.headers()[header::CONTENT_DISPOSITION].to_str().unwrap();
    assert!(disposition.contains("Combined_Sheet_"));
}

#[tokio::test]
async fn test_malformed_multipart_is_bad_request() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/process-excel")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from("this is not multipart"))
        .unwrap();

    let response = app(false).oneshot(request).await.unwrap();
    assert!(response.status().is_client_error());
}
