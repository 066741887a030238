//! エラー型定義

use thiserror::Error;

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// 通信そのものが失敗した（接続不可、タイムアウトなど）
    #[error("Transport error: {0}")]
    Transport(String),

    /// サーバーが成功以外のステータスを返した
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    #[error("Invalid page: {0}")]
    InvalidPage(String),

    #[error("Invalid item: {0}")]
    InvalidItem(String),
}

impl Error {
    /// ユーザー操作での再試行に意味があるか
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Transport(_) => true,
            Error::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;
