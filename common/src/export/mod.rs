//! Export core modules shared across the CLI and the HTTP service.

pub mod excel_core;

use crate::types::OutputMode;
use chrono::{DateTime, Utc};

/// xlsxのMIMEタイプ
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// ダウンロード用ファイル名を生成
///
/// `Combined_Audit_2026-01-18T09-30-00.xlsx` のように、ISO-8601の `:` と `.` を
/// `-` に置き換え、ミリ秒とタイムゾーンを落とした時刻を付ける。
pub fn output_file_name(mode: OutputMode, at: DateTime<Utc>) -> String {
    let timestamp = at.format("%Y-%m-%dT%H-%M-%S");
    match mode {
        OutputMode::Combined => format!("Combined_Sheet_{}.xlsx", timestamp),
        OutputMode::MultiSheet => format!("Combined_Audit_{}.xlsx", timestamp),
    }
}
