//! APIレコードの型定義
//!
//! CLIとWeb(WASM)で共有される型:
//! - Photo: 一覧・グリッドに並ぶ写真
//! - PhotoDetail: ライトボックス表示用の詳細
//! - Page: ページング付き一覧レスポンス
//! - Collection / CollectionDetail: コレクション

use crate::error::{Error, Result};
use crate::feed::FeedItem;
use serde::{Deserialize, Serialize};

/// 詳細レスポンスにライセンスが無い場合の既定文言
pub const DEFAULT_LICENSE: &str = "Free to use under SolarPunk License (CC0).";

/// グリッドに表示する写真
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Photo {
    /// 一覧APIでは返らないことがある
    #[serde(default)]
    pub id: String,
    pub public_id: String,
    pub title: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub thumbnail_url: String,
    pub aspect_ratio: f64,
    #[serde(default)]
    pub download_count: u64,
    #[serde(default)]
    pub is_featured: bool,
}

impl FeedItem for Photo {
    fn key(&self) -> &str {
        &self.public_id
    }

    fn validate(&self) -> Result<()> {
        if self.public_id.is_empty() {
            return Err(Error::InvalidItem("photo without public_id".into()));
        }
        if !(self.aspect_ratio.is_finite() && self.aspect_ratio > 0.0) {
            return Err(Error::InvalidItem(format!(
                "photo {} has aspect ratio {}",
                self.public_id, self.aspect_ratio
            )));
        }
        Ok(())
    }
}

/// 写真詳細（ライトボックス）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoDetail {
    pub public_id: String,
    pub title: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub download_url: String,
    pub aspect_ratio: f64,
    #[serde(default = "default_license")]
    pub license: String,
}

fn default_license() -> String {
    DEFAULT_LICENSE.to_string()
}

/// ページング付き一覧レスポンス
///
/// `page` は1始まり。該当0件のときサーバーは `pages == 0` を返す。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub pages: u32,
    /// コレクション一覧では返らない（0 = 不明）
    #[serde(default)]
    pub limit: u32,
}

impl<T: FeedItem> Page<T> {
    /// ページ番号と件数、各アイテムの整合性を検証
    pub fn validate(&self) -> Result<()> {
        if self.page == 0 {
            return Err(Error::InvalidPage("page numbers start at 1".into()));
        }
        if self.pages > 0 && self.page > self.pages {
            return Err(Error::InvalidPage(format!(
                "page {} exceeds total pages {}",
                self.page, self.pages
            )));
        }
        if self.limit > 0 && self.items.len() > self.limit as usize {
            return Err(Error::InvalidPage(format!(
                "page {} holds {} items, limit is {}",
                self.page,
                self.items.len(),
                self.limit
            )));
        }
        self.items.iter().try_for_each(FeedItem::validate)
    }
}

/// コレクション（一覧用）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub slug: String,
    #[serde(default)]
    pub cover_photo_id: Option<String>,
    #[serde(default)]
    pub cover_photo: Option<Photo>,
    pub is_published: bool,
    #[serde(default)]
    pub view_count: u64,
    #[serde(default)]
    pub photo_count: u64,
    pub created_at: String,
    pub updated_at: String,
}

impl FeedItem for Collection {
    fn key(&self) -> &str {
        &self.id
    }

    fn validate(&self) -> Result<()> {
        if self.slug.is_empty() {
            return Err(Error::InvalidItem(format!("collection {} without slug", self.id)));
        }
        Ok(())
    }
}

/// コレクション詳細（所属写真つき）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionDetail {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub slug: String,
    #[serde(default)]
    pub cover_photo_id: Option<String>,
    #[serde(default)]
    pub cover_photo: Option<Photo>,
    pub is_published: bool,
    #[serde(default)]
    pub view_count: u64,
    #[serde(default)]
    pub photos: Vec<Photo>,
    pub created_at: String,
    pub updated_at: String,
}

/// ダウンロードサイズ
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DownloadSize {
    Small,
    Large,
    #[default]
    Original,
}

impl DownloadSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            DownloadSize::Small => "small",
            DownloadSize::Large => "large",
            DownloadSize::Original => "original",
        }
    }
}

impl std::str::FromStr for DownloadSize {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "small" | "s" => Ok(DownloadSize::Small),
            "large" | "l" => Ok(DownloadSize::Large),
            "original" | "orig" | "o" => Ok(DownloadSize::Original),
            _ => Err(format!("Unknown size: {}. Use small, large, or original", s)),
        }
    }
}

impl std::fmt::Display for DownloadSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// サイズ指定ダウンロードURL
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadLink {
    pub download_url: String,
    pub size: DownloadSize,
}

/// ダウンロード記録のレスポンス
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadRecord {
    pub message: String,
    pub download_count: u64,
}
