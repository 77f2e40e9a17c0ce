//! Sheet Combiner Common Library
//!
//! CLIとHTTPサーバーで共有されるパイプライン:
//! シート探索 → ワークブック組み立て → xlsx書き出し、と処理レポート

pub mod types;
pub mod error;
pub mod locator;
pub mod assembler;
pub mod report;
pub mod export;
pub mod pipeline;

pub use types::{
    Capabilities, CellValue, ExtractedSheet, MatchResult, OutputMode, SearchPattern, SheetGrid,
    UploadFile, DEFAULT_PATTERN,
};
pub use error::{Error, Result};
pub use locator::{find_matching_sheet, locate_sheet, Located};
pub use assembler::{assemble, OutputSheet, OutputWorkbook};
pub use report::{ProcessReport, ReportEntry};
pub use export::{output_file_name, XLSX_CONTENT_TYPE};
pub use pipeline::{assemble_batch, run_batch, run_batch_with, BatchOptions, MergedWorkbook};
