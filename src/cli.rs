use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sheet-combiner")]
#[command(about = "複数のExcelファイルから指定シートを抽出して1つのブックにまとめるツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// HTTPサーバーを起動
    Serve {
        /// 待ち受けアドレス（省略時は設定値）
        #[arg(long)]
        bind: Option<String>,

        /// ポート番号（省略時は設定値）
        #[arg(short, long)]
        port: Option<u16>,

        /// Combinedモードを有効化
        #[arg(long)]
        enable_combined: bool,
    },

    /// ローカルのファイル/フォルダからシートを抽出して統合
    Merge {
        /// Excelファイルまたはフォルダ（複数可）
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// シート名の検索文字列（大文字小文字を区別しない）
        #[arg(short = 'p', long)]
        pattern: Option<String>,

        /// 全シートを1枚の "Combined" シートに連結
        #[arg(long)]
        combine: bool,

        /// 出力ファイル/ディレクトリ（省略時はカレント）
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 並列数（省略時は設定値）
        #[arg(short, long)]
        jobs: Option<usize>,

        /// 処理レポート(JSON)の保存先
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// 設定を表示/編集
    Config {
        /// 設定を表示
        #[arg(long)]
        show: bool,

        /// 既定の検索文字列を設定
        #[arg(long)]
        set_pattern: Option<String>,

        /// ポート番号を設定
        #[arg(long)]
        set_port: Option<u16>,

        /// Combinedモードの公開 (on/off)
        #[arg(long)]
        combined_mode: Option<Toggle>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Toggle {
    On,
    Off,
}

impl Toggle {
    pub fn is_on(&self) -> bool {
        matches!(self, Toggle::On)
    }
}
