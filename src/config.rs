use crate::error::{GalleryError, Result};
use photo_gallery_common::{DEFAULT_API_URL, DEFAULT_COLLECTIONS_PAGE_SIZE, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// APIベースURLを上書きする環境変数
pub const API_URL_ENV: &str = "PHOTO_GALLERY_API_URL";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_url: String,
    pub page_size: u32,
    pub collections_page_size: u32,
    pub timeout_seconds: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.into(),
            page_size: DEFAULT_PAGE_SIZE,
            collections_page_size: DEFAULT_COLLECTIONS_PAGE_SIZE,
            timeout_seconds: 30,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path()?)?;
        if let Ok(url) = std::env::var(API_URL_ENV) {
            config.apply_api_url_override(&url);
        }
        Ok(config)
    }

    /// 指定パスから読み込み（ファイルが無ければデフォルト）
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let mut config: Config = serde_json::from_str(&content)?;
        config.page_size = config.page_size.clamp(1, MAX_PAGE_SIZE);
        config.collections_page_size = config.collections_page_size.clamp(1, MAX_PAGE_SIZE);
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| GalleryError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("photo-gallery").join("config.json"))
    }

    /// 環境変数の値を適用（空文字は無視）
    pub fn apply_api_url_override(&mut self, url: &str) {
        let url = url.trim();
        if !url.is_empty() {
            self.api_url = url.trim_end_matches('/').to_string();
        }
    }

    pub fn set_api_url(&mut self, url: String) -> Result<()> {
        let url = url.trim().trim_end_matches('/').to_string();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(GalleryError::InvalidArgument(format!(
                "APIのURLは http:// または https:// で始めてください: {}",
                url
            )));
        }
        self.api_url = url;
        Ok(())
    }

    pub fn set_page_size(&mut self, page_size: u32) -> Result<()> {
        self.page_size = check_page_size(page_size)?;
        Ok(())
    }
}

/// ページサイズがサーバーの受け付ける範囲（1〜100）か確認
pub fn check_page_size(page_size: u32) -> Result<u32> {
    if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
        return Err(GalleryError::InvalidArgument(format!(
            "ページサイズは1〜{}で指定してください: {}",
            MAX_PAGE_SIZE, page_size
        )));
    }
    Ok(page_size)
}
