//! エラー型定義

use crate::report::ProcessReport;
use thiserror::Error;

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no files were uploaded")]
    NoFiles,

    /// 全ファイルで該当シートなし（レポートを添付）
    #[error("no sheet with \"{pattern}\" in its name was found")]
    NoMatches {
        pattern: String,
        report: ProcessReport,
    },

    #[error("combined mode is disabled")]
    CombinedModeDisabled,

    #[error("Excel write error: {0}")]
    Excel(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<rust_xlsxwriter::XlsxError> for Error {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        Error::Excel(err.to_string())
    }
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_json() {
        let json_error = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let error = Error::Json(json_error);
        assert!(format!("{}", error).contains("JSON error"));
    }

    #[test]
    fn test_error_display_no_matches_names_pattern() {
        let error = Error::NoMatches {
            pattern: "month".to_string(),
            report: ProcessReport::default(),
        };
        assert_eq!(
            format!("{}", error),
            "no sheet with \"month\" in its name was found"
        );
    }

    #[test]
    fn test_error_from_xlsx() {
        let mut workbook = rust_xlsxwriter::Workbook::new();
        let xlsx_error = workbook
            .add_worksheet()
            .set_name("x".repeat(40))
            .err()
            .expect("31文字超のシート名はエラーになるはず");
        let error: Error = xlsx_error.into();
        assert!(matches!(error, Error::Excel(_)));
    }

    #[test]
    fn test_error_debug() {
        let error = Error::Excel("テスト".to_string());
        let debug = format!("{:?}", error);
        assert!(debug.contains("Excel"));
        assert!(debug.contains("テスト"));
    }
}
