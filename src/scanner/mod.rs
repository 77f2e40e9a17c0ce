//! 入力ファイル収集
//!
//! コマンドラインで指定されたファイル/フォルダからExcelファイルを集める。
//! フォルダは直下のみ（再帰しない）、ファイル名順。

use crate::error::{CombinerError, Result};
use sheet_combiner_common::UploadFile;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const SPREADSHEET_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

pub fn is_spreadsheet_extension(ext: &str) -> bool {
    let ext = ext.to_lowercase();
    SPREADSHEET_EXTENSIONS.contains(&ext.as_str())
}

fn is_spreadsheet(path: &Path) -> bool {
    let Some(file_name) = path.file_name().map(|n| n.to_string_lossy()) else {
        return false;
    };
    // Excelの一時ファイル（~$Book1.xlsx）は除外
    if file_name.starts_with("~$") {
        return false;
    }
    path.extension()
        .map(|ext| is_spreadsheet_extension(&ext.to_string_lossy()))
        .unwrap_or(false)
}

pub fn scan_folder(folder: &Path) -> Result<Vec<PathBuf>> {
    if !folder.exists() {
        return Err(CombinerError::FolderNotFound(folder.display().to_string()));
    }

    let mut files: Vec<PathBuf> = WalkDir::new(folder)
        .max_depth(1)  // 直下のみ（再帰しない）
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|entry| entry.into_path())
        .filter(|path| path.is_file() && is_spreadsheet(path))
        .collect();

    // ファイル名でソート
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    Ok(files)
}

/// 引数のパスを展開する（指定順を維持、フォルダはその位置に中身を展開）
pub fn collect_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for input in inputs {
        if input.is_dir() {
            files.extend(scan_folder(input)?);
        } else if input.is_file() {
            files.push(input.clone());
        } else {
            return Err(CombinerError::FileNotFound(input.display().to_string()));
        }
    }

    if files.is_empty() {
        let joined = inputs
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        return Err(CombinerError::NoSpreadsheetsFound(joined));
    }

    Ok(files)
}

/// ファイルを読み込んでバッチにする
pub fn load_batch(paths: &[PathBuf]) -> Result<Vec<UploadFile>> {
    paths
        .iter()
        .map(|path| -> Result<UploadFile> {
            let bytes = std::fs::read(path)?;
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| path.display().to_string());
            Ok(UploadFile::new(file_name, bytes))
        })
        .collect()
}
