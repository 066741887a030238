//! Photo Gallery Common Library
//!
//! CLIとWeb(WASM)で共有される型とフィードコントローラ

pub mod types;
pub mod error;
pub mod filter;
pub mod feed;
pub mod visibility;

pub use types::{
    Collection, CollectionDetail, DownloadLink, DownloadRecord, DownloadSize, Page, Photo,
    PhotoDetail, DEFAULT_LICENSE,
};
pub use error::{Error, Result};
pub use filter::{parse_tags, FilterContext};
pub use feed::{
    FeedItem, FeedState, FeedStatus, LoadOutcome, LoadTicket, PageFetcher, DEFAULT_PAGE_SIZE,
    MAX_PAGE_SIZE,
};
pub use visibility::{LikedSet, SentinelTrigger, ViewportOptions, VisibilitySet};

/// APIのデフォルトベースURL
pub const DEFAULT_API_URL: &str = "http://localhost:8000/api/v1";

/// コレクション一覧の既定ページサイズ
pub const DEFAULT_COLLECTIONS_PAGE_SIZE: u32 = 12;
