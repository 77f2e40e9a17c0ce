//! パイプラインの型定義
//!
//! CLIとHTTPサーバーで共有される型:
//! - UploadFile: 入力ファイル（1リクエスト分のバッチの要素）
//! - SearchPattern: シート名の検索文字列（大文字小文字を区別しない）
//! - MatchResult: ファイルごとのシート探索結果
//! - SheetGrid / ExtractedSheet: 抽出したシートのセルデータ

use serde::{Deserialize, Serialize};

/// 検索文字列が未指定・空白のみの場合の既定値
pub const DEFAULT_PATTERN: &str = "month";

/// アップロードされた1ファイル
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
    /// クライアントが申告したサイズ（ログ用）
    pub declared_size: u64,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let declared_size = bytes.len() as u64;
        Self {
            file_name: file_name.into(),
            bytes,
            declared_size,
        }
    }

    pub fn size_mb(&self) -> f64 {
        self.declared_size as f64 / 1024.0 / 1024.0
    }
}

/// シート名の検索文字列
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPattern {
    text: String,
    folded: String,
}

impl SearchPattern {
    /// 指定文字列をそのまま使う（空文字は全シートに一致）
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let folded = text.to_lowercase();
        Self { text, folded }
    }

    /// リクエスト値から解決する。前後の空白を除去し、空なら既定値。
    ///
    /// 既定値も空白のみなら `DEFAULT_PATTERN` を使う（空パターンは全シートに一致するため）。
    pub fn resolve(input: Option<&str>, default: &str) -> Self {
        let non_blank = |text: &str| {
            let text = text.trim();
            (!text.is_empty()).then(|| text.to_string())
        };
        let text = input
            .and_then(non_blank)
            .or_else(|| non_blank(default))
            .unwrap_or_else(|| DEFAULT_PATTERN.to_string());
        Self::new(text)
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn matches(&self, sheet_name: &str) -> bool {
        sheet_name.to_lowercase().contains(&self.folded)
    }
}

impl Default for SearchPattern {
    fn default() -> Self {
        Self::new(DEFAULT_PATTERN)
    }
}

impl std::fmt::Display for SearchPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.text)
    }
}

/// 出力モード
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OutputMode {
    /// ファイルごとに別シート
    #[default]
    MultiSheet,
    /// 全シートの行を "Combined" シートに連結
    Combined,
}

impl OutputMode {
    /// `combineIntoOne` フラグから変換
    pub fn from_combine_flag(combine: bool) -> Self {
        if combine {
            OutputMode::Combined
        } else {
            OutputMode::MultiSheet
        }
    }
}

impl std::fmt::Display for OutputMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputMode::MultiSheet => write!(f, "multi-sheet"),
            OutputMode::Combined => write!(f, "combined"),
        }
    }
}

/// 管理者が外部から与える機能フラグ
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub combined_mode_enabled: bool,
}

impl Capabilities {
    /// 出力モードが許可されているか確認
    pub fn check(&self, mode: OutputMode) -> crate::Result<()> {
        match mode {
            OutputMode::Combined if !self.combined_mode_enabled => {
                Err(crate::Error::CombinedModeDisabled)
            }
            _ => Ok(()),
        }
    }
}

/// ファイルごとのシート探索結果
#[derive(Debug, Clone, PartialEq)]
pub enum MatchResult {
    Found {
        sheet_name: String,
        available_sheets: Vec<String>,
    },
    NotFound {
        available_sheets: Vec<String>,
        reason: String,
    },
    ParseError {
        reason: String,
    },
}

/// セル値
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    /// Excelシリアル値
    DateTime(f64),
    /// #N/A 等のエラー値（文字列として出力）
    Error(String),
}

/// シートの2次元セルデータ
///
/// `origin` は先頭セルのシート上の位置 (行, 列)。空でない最初のセルから始まる。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetGrid {
    pub origin: (u32, u32),
    pub rows: Vec<Vec<CellValue>>,
}

impl SheetGrid {
    pub fn new(origin: (u32, u32), rows: Vec<Vec<CellValue>>) -> Self {
        Self { origin, rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// 行指向のテーブルに変換
    ///
    /// 空セルは空文字列になり、各行は最も長い行の幅まで埋められる。
    pub fn into_table(self) -> Vec<Vec<CellValue>> {
        let width = self.width();
        self.rows
            .into_iter()
            .map(|row| {
                let mut row: Vec<CellValue> = row
                    .into_iter()
                    .map(|cell| match cell {
                        CellValue::Empty => CellValue::Text(String::new()),
                        other => other,
                    })
                    .collect();
                row.resize(width, CellValue::Text(String::new()));
                row
            })
            .collect()
    }
}

/// 抽出済みシート（Assemblerが所有）
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedSheet {
    pub source_file: String,
    pub sheet_name: String,
    /// バッチ内でのファイル位置（1始まり）
    pub position: usize,
    pub grid: SheetGrid,
}
