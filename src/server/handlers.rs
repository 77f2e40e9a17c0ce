//! HTTPハンドラ
//!
//! `POST /api/process-excel` はアップロードされたブック群から該当シートを抽出し、
//! 統合したxlsxを返す。処理レポートは `X-Process-Report` ヘッダーに載せる。

use super::error::ApiError;
use super::AppState;
use axum::extract::{Multipart, State};
use axum::http::header::{self, HeaderMap, HeaderName, HeaderValue};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use sheet_combiner_common::{
    output_file_name, run_batch, BatchOptions, Capabilities, Error as CommonError, OutputMode,
    SearchPattern, UploadFile, XLSX_CONTENT_TYPE,
};

pub const PROCESS_REPORT_HEADER: &str = "x-process-report";
const EXPOSED_HEADERS: &str = "Content-Disposition, X-Process-Report";

/// multipartフォームの内容
#[derive(Debug, Default)]
struct UploadForm {
    files: Vec<UploadFile>,
    /// 受信したファイルパート数（破棄した分も含む）
    file_count: usize,
    search_pattern: Option<String>,
    combine_into_one: bool,
}

impl UploadForm {
    /// 許可されていないモードが要求された後はファイル本体を保持しない
    fn keeps_file_bytes(&self, capabilities: &Capabilities) -> bool {
        capabilities
            .check(OutputMode::from_combine_flag(self.combine_into_one))
            .is_ok()
    }
}

async fn read_form(
    multipart: &mut Multipart,
    capabilities: &Capabilities,
) -> Result<UploadForm, ApiError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.body_text()))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "files" => {
                form.file_count += 1;
                if !form.keeps_file_bytes(capabilities) {
                    // 読まずに捨てる（次のフィールドへ進むときに読み飛ばされる）
                    continue;
                }
                let file_name = field.file_name().unwrap_or("upload.xlsx").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(e.body_text()))?;
                form.files.push(UploadFile::new(file_name, bytes.to_vec()));
            }
            "searchPattern" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(e.body_text()))?;
                form.search_pattern = Some(text);
            }
            "combineIntoOne" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(e.body_text()))?;
                form.combine_into_one = text == "true";
                if !form.keeps_file_bytes(capabilities) {
                    form.files.clear();
                }
            }
            other => {
                tracing::debug!(field = other, "ignoring unknown form field");
            }
        }
    }

    Ok(form)
}

pub async fn process_excel(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let form = read_form(&mut multipart, &state.capabilities).await?;

    if form.file_count == 0 {
        return Err(CommonError::NoFiles.into());
    }

    let mode = OutputMode::from_combine_flag(form.combine_into_one);
    state.capabilities.check(mode)?;

    let pattern = SearchPattern::resolve(form.search_pattern.as_deref(), &state.default_pattern);
    tracing::info!(
        files = form.files.len(),
        pattern = %pattern,
        mode = %mode,
        "processing upload"
    );

    let options = BatchOptions {
        mode,
        jobs: state.parse_jobs,
    };
    let files = form.files;
    let merged = tokio::task::spawn_blocking(move || run_batch(&files, &pattern, &options))
        .await
        .map_err(|e| ApiError::Internal(format!("worker task failed: {}", e)))??;

    let file_name = output_file_name(mode, chrono::Utc::now());
    let report = merged
        .report
        .to_header_value()
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(XLSX_CONTENT_TYPE));
    headers.insert(
        header::CONTENT_DISPOSITION,
        header_value(&format!("attachment; filename=\"{}\"", file_name))?,
    );
    headers.insert(
        HeaderName::from_static(PROCESS_REPORT_HEADER),
        header_value(&report)?,
    );
    headers.insert(
        header::ACCESS_CONTROL_EXPOSE_HEADERS,
        HeaderValue::from_static(EXPOSED_HEADERS),
    );

    tracing::info!(
        sheets = merged.sheet_names.len(),
        succeeded = merged.report.successes(),
        failed = merged.report.failures(),
        file_name = %file_name,
        "upload processed"
    );

    Ok((headers, merged.bytes).into_response())
}

fn header_value(value: &str) -> Result<HeaderValue, ApiError> {
    HeaderValue::from_str(value).map_err(|e| ApiError::Internal(format!("invalid header: {}", e)))
}

pub async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
