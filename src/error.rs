use thiserror::Error;

#[derive(Error, Debug)]
pub enum CombinerError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("フォルダが見つかりません: {0}")]
    FolderNotFound(String),

    #[error("Excelファイルが見つかりません: {0}")]
    NoSpreadsheetsFound(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("サーバーエラー: {0}")]
    Server(String),

    #[error(transparent)]
    Common(#[from] sheet_combiner_common::Error),
}

pub type Result<T> = std::result::Result<T, CombinerError>;
