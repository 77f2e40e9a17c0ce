//! sheet-combiner
//!
//! 複数のExcelブックから名前が一致するシートを抽出し、1つのブックにまとめる。
//! HTTPサーバー（`server`）とCLI（`merge`）が同じパイプラインを使う。

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod scanner;
pub mod server;
