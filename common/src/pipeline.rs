//! バッチ処理パイプライン
//!
//! ## 処理フロー
//! 1. 全ファイルでシート探索（既定は逐次、`jobs > 1` でrayonによる並列）
//! 2. 1件以上見つかればワークブックを組み立て
//! 3. xlsxに書き出し
//!
//! レポートは提出順で、成功・失敗どちらの場合も呼び出し側に返る。

use crate::assembler::{assemble, OutputWorkbook};
use crate::error::{Error, Result};
use crate::export::excel_core::generate_excel_buffer;
use crate::locator::{locate_sheet, Located};
use crate::report::{ProcessReport, ReportEntry};
use crate::types::{OutputMode, SearchPattern, UploadFile};
use rayon::prelude::*;

/// バッチ処理オプション
#[derive(Debug, Clone, Copy)]
pub struct BatchOptions {
    pub mode: OutputMode,
    /// シート探索の並列数（1以下なら逐次）
    pub jobs: usize,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            mode: OutputMode::MultiSheet,
            jobs: 1,
        }
    }
}

/// 組み立て済み（書き出し前）の結果
#[derive(Debug, Clone)]
pub struct AssembledBatch {
    pub workbook: OutputWorkbook,
    pub report: ProcessReport,
}

/// 書き出し済みの結果
#[derive(Debug, Clone)]
pub struct MergedWorkbook {
    pub bytes: Vec<u8>,
    pub sheet_names: Vec<String>,
    pub report: ProcessReport,
}

/// 全ファイルのシートを探し、出力ワークブックを組み立てる
pub fn assemble_batch(
    files: &[UploadFile],
    pattern: &SearchPattern,
    options: &BatchOptions,
) -> Result<AssembledBatch> {
    assemble_batch_with(files, pattern, options, |_, _| {})
}

/// `assemble_batch` と同じ。ファイルごとに `observer(index, entry)` を呼ぶ。
///
/// 並列時は完了順に呼ばれるが、レポートとワークブックは提出順になる。
pub fn assemble_batch_with<F>(
    files: &[UploadFile],
    pattern: &SearchPattern,
    options: &BatchOptions,
    observer: F,
) -> Result<AssembledBatch>
where
    F: Fn(usize, &ReportEntry) + Sync,
{
    if files.is_empty() {
        return Err(Error::NoFiles);
    }

    let locate = |(index, file): (usize, &UploadFile)| {
        let located = locate_sheet(file, index + 1, pattern);
        observer(index, &ReportEntry::from_match(&file.file_name, &located.result));
        located
    };

    let located: Vec<Located> = if options.jobs > 1 {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(options.jobs)
            .build()
            .map_err(|e| Error::Internal(format!("thread pool: {}", e)))?;
        pool.install(|| files.par_iter().enumerate().map(locate).collect())
    } else {
        files.iter().enumerate().map(locate).collect()
    };

    let mut report = ProcessReport::with_capacity(files.len());
    let mut extracted = Vec::new();
    for (file, item) in files.iter().zip(located) {
        report.push(&file.file_name, &item.result);
        if let Some(sheet) = item.sheet {
            extracted.push(sheet);
        }
    }

    if extracted.is_empty() {
        return Err(Error::NoMatches {
            pattern: pattern.as_str().to_string(),
            report,
        });
    }

    tracing::info!(sheets = extracted.len(), mode = %options.mode, "assembling workbook");
    let workbook = assemble(extracted, options.mode);

    Ok(AssembledBatch { workbook, report })
}

/// バッチ全体を処理してxlsxバイト列を返す
pub fn run_batch(
    files: &[UploadFile],
    pattern: &SearchPattern,
    options: &BatchOptions,
) -> Result<MergedWorkbook> {
    run_batch_with(files, pattern, options, |_, _| {})
}

pub fn run_batch_with<F>(
    files: &[UploadFile],
    pattern: &SearchPattern,
    options: &BatchOptions,
    observer: F,
) -> Result<MergedWorkbook>
where
    F: Fn(usize, &ReportEntry) + Sync,
{
    let AssembledBatch { workbook, report } = assemble_batch_with(files, pattern, options, observer)?;

    let bytes = generate_excel_buffer(&workbook)?;
    tracing::info!(
        size_mb = bytes.len() as f64 / 1024.0 / 1024.0,
        "wrote workbook"
    );

    Ok(MergedWorkbook {
        bytes,
        sheet_names: workbook.sheet_names().into_iter().map(str::to_string).collect(),
        report,
    })
}
