//! Photo Gallery CLI
//!
//! ギャラリーAPIのクライアントと、端末上で無限スクロールを再現するフィード閲覧

pub mod api;
pub mod browse;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
