use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use sheet_combiner::{cli, config, error, logging, scanner, server};
use sheet_combiner_common::{
    output_file_name, run_batch_with, BatchOptions, Error as CommonError, OutputMode,
    ProcessReport, ReportEntry, SearchPattern,
};
use cli::{Cli, Commands};
use config::Config;
use error::Result;
use std::path::{Path, PathBuf};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    let config = Config::load()?;

    match cli.command {
        Commands::Serve { bind, port, enable_combined } => {
            let mut config = config;
            if let Some(bind) = bind {
                config.bind_address = bind;
            }
            if let Some(port) = port {
                config.port = port;
            }
            if enable_combined {
                config.combined_mode_enabled = true;
            }

            println!("🌐 sheet-combiner - サーバー起動");
            println!("  http://{}:{}/api/process-excel", config.bind_address, config.port);
            println!("  Combinedモード: {}\n", if config.combined_mode_enabled { "有効" } else { "無効" });

            server::serve(&config).await?;
        }

        Commands::Merge { inputs, pattern, combine, output, jobs, report: report_path } => {
            println!("📊 sheet-combiner - シート統合\n");

            let mode = OutputMode::from_combine_flag(combine);
            config.capabilities().check(mode)?;
            let pattern = SearchPattern::resolve(pattern.as_deref(), &config.default_pattern);

            // 1. 入力収集
            println!("[1/3] ファイルを読み込み中...");
            let paths = scanner::collect_inputs(&inputs)?;
            let files = scanner::load_batch(&paths)?;
            println!("✔ {}件のファイルを検出\n", files.len());

            // 2. シート探索と組み立て
            println!("[2/3] \"{}\" を含むシートを探索中... ({})", pattern, mode);
            let options = BatchOptions {
                mode,
                jobs: jobs.unwrap_or(config.parse_jobs).max(1),
            };
            let progress = progress_bar(files.len() as u64);
            let result = run_batch_with(&files, &pattern, &options, |_, entry: &ReportEntry| {
                progress.set_message(entry.file_name.clone());
                progress.inc(1);
            });
            progress.finish_and_clear();

            let merged = match result {
                Ok(merged) => merged,
                Err(CommonError::NoMatches { pattern, report }) => {
                    print_report(&report);
                    if let Some(path) = &report_path {
                        save_report(&report, path)?;
                    }
                    return Err(CommonError::NoMatches { pattern, report }.into());
                }
                Err(e) => return Err(e.into()),
            };
            print_report(&merged.report);
            println!("✔ {}シートを抽出\n", merged.sheet_names.len());

            // 3. 書き出し
            println!("[3/3] ブックを保存中...");
            let output_path = resolve_output_path(output.as_deref(), mode);
            if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&output_path, &merged.bytes)?;
            println!("✔ 保存: {}", output_path.display());

            if let Some(path) = &report_path {
                save_report(&merged.report, path)?;
            }

            println!("\n✅ 完了");
        }

        Commands::Config { show, set_pattern, set_port, combined_mode } => {
            let mut config = config;
            let mut changed = false;

            if let Some(pattern) = set_pattern {
                config.set_default_pattern(&pattern)?;
                changed = true;
                println!("✔ 検索文字列を設定しました: {}", config.default_pattern);
            }
            if let Some(port) = set_port {
                config.port = port;
                changed = true;
                println!("✔ ポート番号を設定しました: {}", port);
            }
            if let Some(toggle) = combined_mode {
                config.combined_mode_enabled = toggle.is_on();
                changed = true;
                println!("✔ Combinedモード: {}", if toggle.is_on() { "有効" } else { "無効" });
            }
            if changed {
                config.save()?;
            }

            if show || !changed {
                println!("設定: {}", Config::config_path()?.display());
                println!("  待ち受け: {}:{}", config.bind_address, config.port);
                println!("  検索文字列: {}", config.default_pattern);
                println!("  アップロード上限: {}MB", config.max_upload_mb);
                println!("  Combinedモード: {}", if config.combined_mode_enabled { "有効" } else { "無効" });
                println!("  並列数: {}", config.parse_jobs);
            }
        }
    }

    Ok(())
}

fn progress_bar(len: u64) -> ProgressBar {
    let bar = ProgressBar::new(len);
    if let Ok(style) = ProgressStyle::with_template("  {bar:30} {pos}/{len} {wide_msg}") {
        bar.set_style(style);
    }
    bar
}

/// ファイルごとの結果を表示
fn print_report(report: &ProcessReport) {
    for entry in report.entries() {
        if entry.success {
            println!(
                "  ✔ {} → {}",
                entry.file_name,
                entry.sheet_name.as_deref().unwrap_or("")
            );
        } else {
            println!(
                "  ✗ {}: {}",
                entry.file_name,
                entry.error.as_deref().unwrap_or("不明なエラー")
            );
            if let Some(sheets) = &entry.available_sheets {
                println!("      シート一覧: {}", sheets.join(", "));
            }
        }
    }
    println!("  成功 {}件 / 失敗 {}件", report.successes(), report.failures());
}

fn save_report(report: &ProcessReport, path: &Path) -> Result<()> {
    std::fs::write(path, report.to_json()?)?;
    println!("✔ レポートを保存: {}", path.display());
    Ok(())
}

/// 出力先がディレクトリ（または拡張子なし）なら生成したファイル名を付ける
fn resolve_output_path(output: Option<&Path>, mode: OutputMode) -> PathBuf {
    let generated = output_file_name(mode, chrono::Utc::now());
    match output {
        None => PathBuf::from(generated),
        Some(path) if path.is_dir() || path.extension().is_none() => path.join(generated),
        Some(path) => path.to_path_buf(),
    }
}
