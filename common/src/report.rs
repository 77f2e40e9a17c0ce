//! 処理レポート
//!
//! 入力ファイル1件につき1エントリ。成功・失敗にかかわらず提出順で並ぶ。

use crate::error::Result;
use crate::types::MatchResult;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};

/// `encodeURIComponent` がエスケープしない文字
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// ファイルごとの処理結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportEntry {
    pub file_name: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheet_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_sheets: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ReportEntry {
    pub fn from_match(file_name: &str, result: &MatchResult) -> Self {
        match result {
            MatchResult::Found { sheet_name, available_sheets } => Self {
                file_name: file_name.to_string(),
                success: true,
                sheet_name: Some(sheet_name.clone()),
                available_sheets: Some(available_sheets.clone()),
                error: None,
            },
            MatchResult::NotFound { available_sheets, reason } => Self {
                file_name: file_name.to_string(),
                success: false,
                sheet_name: None,
                available_sheets: Some(available_sheets.clone()),
                error: Some(reason.clone()),
            },
            MatchResult::ParseError { reason } => Self {
                file_name: file_name.to_string(),
                success: false,
                sheet_name: None,
                available_sheets: None,
                error: Some(reason.clone()),
            },
        }
    }
}

/// バッチ全体の処理レポート
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProcessReport {
    entries: Vec<ReportEntry>,
}

impl ProcessReport {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, file_name: &str, result: &MatchResult) {
        self.entries.push(ReportEntry::from_match(file_name, result));
    }

    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn successes(&self) -> usize {
        self.entries.iter().filter(|e| e.success).count()
    }

    pub fn failures(&self) -> usize {
        self.len() - self.successes()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// レスポンスヘッダー用（パーセントエンコードしたJSON）
    pub fn to_header_value(&self) -> Result<String> {
        let json = self.to_json()?;
        Ok(utf8_percent_encode(&json, URI_COMPONENT).to_string())
    }
}
