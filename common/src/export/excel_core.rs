//! Excel生成（共通ライブラリ）
//!
//! OutputWorkbook を rust_xlsxwriter でxlsxバイト列に書き出す。
//! 書式は日付セル以外は付けない（元ファイルのスタイルは読み込んでいない）。

use crate::assembler::{OutputSheet, OutputWorkbook};
use crate::error::{Error, Result};
use crate::types::CellValue;
use rust_xlsxwriter::{Format, Workbook, Worksheet};

/// 日付セルの表示形式
const DATE_NUM_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";

/// ワークブックをバッファに生成
pub fn generate_excel_buffer(output: &OutputWorkbook) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let date_format = Format::new().set_num_format(DATE_NUM_FORMAT);

    for sheet in output.sheets() {
        let worksheet = workbook.add_worksheet();
        worksheet
            .set_name(&sheet.name)
            .map_err(|e| Error::Excel(format!("シート名設定エラー ({}): {}", sheet.name, e)))?;
        write_sheet(worksheet, sheet, &date_format)?;
    }

    // バッファに書き出し
    workbook
        .save_to_buffer()
        .map_err(|e| Error::Excel(format!("Excel保存エラー: {}", e)))
}

fn write_sheet(worksheet: &mut Worksheet, sheet: &OutputSheet, date_format: &Format) -> Result<()> {
    let (origin_row, origin_col) = sheet.origin;

    for (r, row) in sheet.rows.iter().enumerate() {
        let row_index = origin_row + to_u32(r)?;
        for (c, cell) in row.iter().enumerate() {
            let col_index = to_col(origin_col as usize + c)?;
            write_cell(worksheet, row_index, col_index, cell, date_format)
                .map_err(|e| Error::Excel(format!("セル書き込みエラー ({}): {}", sheet.name, e)))?;
        }
    }

    Ok(())
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    cell: &CellValue,
    date_format: &Format,
) -> std::result::Result<(), rust_xlsxwriter::XlsxError> {
    match cell {
        CellValue::Empty => {}
        CellValue::Text(s) => {
            worksheet.write_string(row, col, s)?;
        }
        CellValue::Number(n) => {
            worksheet.write_number(row, col, *n)?;
        }
        CellValue::Bool(b) => {
            worksheet.write_boolean(row, col, *b)?;
        }
        CellValue::DateTime(serial) => {
            worksheet.write_number_with_format(row, col, *serial, date_format)?;
        }
        CellValue::Error(text) => {
            worksheet.write_string(row, col, text)?;
        }
    }
    Ok(())
}

fn to_u32(value: usize) -> Result<u32> {
    u32::try_from(value).map_err(|_| Error::Excel(format!("行番号が範囲外です: {}", value)))
}

fn to_col(value: usize) -> Result<u16> {
    u16::try_from(value).map_err(|_| Error::Excel(format!("列番号が範囲外です: {}", value)))
}
