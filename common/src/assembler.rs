//! ワークブック組み立て（Workbook Assembler）
//!
//! 抽出したシートから出力ワークブックを作る。
//! - MultiSheet: 入力ごとに1シート。名前は31文字以内で重複しないよう調整
//! - Combined: 全シートの行を "Combined" シート1枚に連結（2枚目以降はヘッダー行を除く）

use crate::types::{CellValue, ExtractedSheet, OutputMode};

/// Excelのシート名の最大文字数
pub const MAX_SHEET_NAME_LEN: usize = 31;
/// 切り詰め時に残す文字数
pub const TRUNCATED_NAME_LEN: usize = 28;
/// Combinedモードの出力シート名
pub const COMBINED_SHEET_NAME: &str = "Combined";

/// シート名に使えない文字
const INVALID_SHEET_CHARS: &[char] = &['[', ']', ':', '*', '?', '/', '\\'];

/// 出力シート
#[derive(Debug, Clone, PartialEq)]
pub struct OutputSheet {
    pub name: String,
    /// 書き込み開始位置 (行, 列)
    pub origin: (u32, u32),
    pub rows: Vec<Vec<CellValue>>,
}

impl OutputSheet {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// 出力ワークブック（シート名はワークブック内で一意）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutputWorkbook {
    sheets: Vec<OutputSheet>,
}

impl OutputWorkbook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sheets(&self) -> &[OutputSheet] {
        &self.sheets
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }

    /// Excelと同じく大文字小文字を区別せずに判定
    pub fn contains_name(&self, name: &str) -> bool {
        let folded = name.to_lowercase();
        self.sheets.iter().any(|s| s.name.to_lowercase() == folded)
    }

    fn push(&mut self, sheet: OutputSheet) {
        self.sheets.push(sheet);
    }
}

/// 抽出シートから出力ワークブックを組み立てる
pub fn assemble(sheets: Vec<ExtractedSheet>, mode: OutputMode) -> OutputWorkbook {
    match mode {
        OutputMode::MultiSheet => assemble_multi_sheet(sheets),
        OutputMode::Combined => assemble_combined(sheets),
    }
}

fn assemble_multi_sheet(sheets: Vec<ExtractedSheet>) -> OutputWorkbook {
    let mut workbook = OutputWorkbook::new();

    for sheet in sheets {
        let name = unique_sheet_name(&sheet.sheet_name, sheet.position, &workbook);
        tracing::info!(
            source = %sheet.source_file,
            sheet = %sheet.sheet_name,
            output = %name,
            "append sheet"
        );
        workbook.push(OutputSheet {
            name,
            origin: sheet.grid.origin,
            rows: sheet.grid.rows,
        });
    }

    workbook
}

fn assemble_combined(sheets: Vec<ExtractedSheet>) -> OutputWorkbook {
    let rows = combine_rows(sheets);
    tracing::info!(rows = rows.len(), "built combined sheet");

    let mut workbook = OutputWorkbook::new();
    workbook.push(OutputSheet {
        name: COMBINED_SHEET_NAME.to_string(),
        origin: (0, 0),
        rows,
    });
    workbook
}

/// 全シートの行を連結する。先頭シートのみヘッダー行（1行目）を残す。
pub fn combine_rows(sheets: Vec<ExtractedSheet>) -> Vec<Vec<CellValue>> {
    let mut combined = Vec::new();

    for (index, sheet) in sheets.into_iter().enumerate() {
        let table = sheet.grid.into_table();
        let skip = if index == 0 { 0 } else { 1 };
        tracing::debug!(
            sheet = %sheet.sheet_name,
            rows = table.len().saturating_sub(skip),
            "copy rows"
        );
        combined.extend(table.into_iter().skip(skip));
    }

    combined
}

/// 出力シート名を決める
///
/// 1. 31文字を超える場合は先頭28文字 + `_<位置>`
/// 2. 既存名と重複する場合は先頭28文字 + `_<位置>`
/// 3. それでも重複する場合は `_<位置>_<n>` を付けて空きを探す
pub fn unique_sheet_name(original: &str, position: usize, workbook: &OutputWorkbook) -> String {
    let mut name = sanitize_sheet_name(original, position);

    if name.chars().count() > MAX_SHEET_NAME_LEN {
        name = with_suffix(&name, &format!("_{}", position));
    }

    if !workbook.contains_name(&name) {
        return name;
    }

    let base = name;
    name = with_suffix(&base, &format!("_{}", position));

    let mut attempt = 2;
    while workbook.contains_name(&name) {
        name = with_suffix(&base, &format!("_{}_{}", position, attempt));
        attempt += 1;
    }

    name
}

/// 先頭28文字（接尾辞込みで31文字に収まる長さ）+ 接尾辞
fn with_suffix(name: &str, suffix: &str) -> String {
    let keep = TRUNCATED_NAME_LEN.min(MAX_SHEET_NAME_LEN.saturating_sub(suffix.chars().count()));
    let prefix: String = name.chars().take(keep).collect();
    format!("{}{}", prefix, suffix)
}

fn sanitize_sheet_name(name: &str, position: usize) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if INVALID_SHEET_CHARS.contains(&c) { '_' } else { c })
        .collect();
    let cleaned = cleaned.trim_matches('\'');
    if cleaned.is_empty() {
        format!("Sheet{}", position)
    } else {
        cleaned.to_string()
    }
}
