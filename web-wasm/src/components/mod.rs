//! UIコンポーネント

pub mod collections;
pub mod header;
pub mod photo_grid;
pub mod photo_modal;
pub mod search_bar;

use photo_gallery_common::{FeedItem, FeedState, LoadTicket};

/// 再試行用のチケット
///
/// 1ページ目の取得に失敗したフィードはページが進んでいないので、
/// 同じフィルタで取り直す。
pub(crate) fn retry_ticket<T: FeedItem>(feed: &mut FeedState<T>) -> Option<LoadTicket> {
    if feed.current_page() == 0 {
        let filter = feed.filter().clone();
        Some(feed.restart(filter))
    } else {
        feed.begin_load_more()
    }
}
