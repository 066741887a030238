//! ギャラリーAPIクライアント
//!
//! 一覧・詳細・コレクションの各エンドポイントを叩く薄いラッパー。
//! キャッシュや自動リトライは行わない。

mod client;

pub use client::{ApiClient, CollectionPages};
