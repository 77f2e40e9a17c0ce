//! ログ初期化

use tracing_subscriber::EnvFilter;

fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "sheet_combiner=debug,sheet_combiner_common=debug,info"
    } else {
        "info"
    }
}

/// `RUST_LOG` があればそれを優先する
pub fn init(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));

    // テストなどで二重に初期化されても無視
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
