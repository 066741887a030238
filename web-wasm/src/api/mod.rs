//! ギャラリーAPIクライアント（fetch）

mod client;

pub use client::{ApiClient, CollectionPages};
