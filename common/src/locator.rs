//! シート探索（Sheet Locator）
//!
//! 1ファイルを解析し、検索文字列を名前に含む最初のシートを取り出す。
//! 解析済みワークブックは該当シートを抽出した時点で破棄する。

use crate::types::{CellValue, ExtractedSheet, MatchResult, SearchPattern, SheetGrid, UploadFile};
use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use std::io::Cursor;

/// 1ファイルの探索結果
#[derive(Debug, Clone)]
pub struct Located {
    pub result: MatchResult,
    /// `Found` の場合のみ
    pub sheet: Option<ExtractedSheet>,
}

/// ネイティブ順で最初に一致したシート名を返す
pub fn find_matching_sheet<'a>(names: &'a [String], pattern: &SearchPattern) -> Option<&'a str> {
    names
        .iter()
        .map(String::as_str)
        .find(|name| pattern.matches(name))
}

pub fn not_found_reason(pattern: &SearchPattern) -> String {
    format!("no sheet contains \"{}\"", pattern)
}

/// ファイルを解析して該当シートを探す
///
/// # Arguments
/// * `file` - 入力ファイル
/// * `position` - バッチ内の位置（1始まり、出力シート名の接尾辞に使用）
/// * `pattern` - 検索文字列
pub fn locate_sheet(file: &UploadFile, position: usize, pattern: &SearchPattern) -> Located {
    tracing::info!(
        file = %file.file_name,
        size_mb = file.size_mb(),
        "reading file"
    );

    let mut workbook = match open_workbook_auto_from_rs(Cursor::new(file.bytes.as_slice())) {
        Ok(workbook) => workbook,
        Err(e) => {
            tracing::warn!(file = %file.file_name, error = %e, "failed to parse workbook");
            return parse_error(format!("failed to read file: {}", e));
        }
    };

    let available_sheets = workbook.sheet_names();

    let Some(sheet_name) = find_matching_sheet(&available_sheets, pattern).map(str::to_string) else {
        tracing::warn!(
            file = %file.file_name,
            pattern = %pattern,
            available = %available_sheets.join(", "),
            "no matching sheet"
        );
        return Located {
            result: MatchResult::NotFound {
                available_sheets,
                reason: not_found_reason(pattern),
            },
            sheet: None,
        };
    };

    let range = match workbook.worksheet_range(&sheet_name) {
        Ok(range) => range,
        Err(e) => {
            tracing::warn!(file = %file.file_name, sheet = %sheet_name, error = %e, "failed to read sheet");
            return parse_error(format!("failed to read sheet \"{}\": {}", sheet_name, e));
        }
    };

    let grid = grid_from_range(&range);
    tracing::info!(
        file = %file.file_name,
        sheet = %sheet_name,
        rows = grid.row_count(),
        "found sheet"
    );

    Located {
        result: MatchResult::Found {
            sheet_name: sheet_name.clone(),
            available_sheets,
        },
        sheet: Some(ExtractedSheet {
            source_file: file.file_name.clone(),
            sheet_name,
            position,
            grid,
        }),
    }
}

fn parse_error(reason: String) -> Located {
    Located {
        result: MatchResult::ParseError { reason },
        sheet: None,
    }
}

/// calamineのRangeをSheetGridに変換
pub fn grid_from_range(range: &Range<Data>) -> SheetGrid {
    let Some(origin) = range.start() else {
        return SheetGrid::default();
    };
    let rows = range
        .rows()
        .map(|row| row.iter().map(cell_from_data).collect())
        .collect();
    SheetGrid::new(origin, rows)
}

fn cell_from_data(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => CellValue::DateTime(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => CellValue::Error(e.to_string()),
    }
}
