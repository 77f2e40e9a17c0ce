use crate::error::{CombinerError, Result};
use serde::{Deserialize, Serialize};
use sheet_combiner_common::{Capabilities, DEFAULT_PATTERN};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub bind_address: String,
    pub port: u16,
    pub default_pattern: String,
    /// アップロード上限（MB、multipart全体）
    pub max_upload_mb: usize,
    /// Combinedモードの公開可否（管理者設定）
    pub combined_mode_enabled: bool,
    /// シート探索の並列数
    pub parse_jobs: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".into(),
            port: 3000,
            default_pattern: DEFAULT_PATTERN.into(),
            max_upload_mb: 100,
            combined_mode_enabled: false,
            parse_jobs: 1,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            serde_json::from_str(&content)?
        } else {
            Self::default()
        };

        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| CombinerError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("sheet-combiner").join("config.json"))
    }

    /// 環境変数を優先
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(bind) = lookup("SHEET_COMBINER_BIND") {
            self.bind_address = bind;
        }
        if let Some(port) = lookup("SHEET_COMBINER_PORT") {
            self.port = port
                .trim()
                .parse()
                .map_err(|_| CombinerError::Config(format!("ポート番号が不正です: {}", port)))?;
        }
        if let Some(pattern) = lookup("SHEET_COMBINER_PATTERN") {
            self.set_default_pattern(&pattern)?;
        }
        if let Some(flag) = lookup("SHEET_COMBINER_COMBINED_MODE") {
            self.combined_mode_enabled = parse_toggle(&flag)
                .ok_or_else(|| CombinerError::Config(format!("on/off を指定してください: {}", flag)))?;
        }
        Ok(())
    }

    /// 既定の検索文字列を設定（空白のみは不可）
    pub fn set_default_pattern(&mut self, pattern: &str) -> Result<()> {
        let pattern = pattern.trim();
        if pattern.is_empty() {
            return Err(CombinerError::Config("検索文字列が空です".into()));
        }
        self.default_pattern = pattern.to_string();
        Ok(())
    }

    pub fn capabilities(&self) -> Capabilities {
        Capabilities {
            combined_mode_enabled: self.combined_mode_enabled,
        }
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb.saturating_mul(1024 * 1024)
    }
}

fn parse_toggle(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}
