//! フィード閲覧テスト
//!
//! テスト用フェッチャでページ数指定の閲覧を検証

use async_trait::async_trait;
use photo_gallery::browse::{browse_photos, walk_collections, ContinuePolicy};
use photo_gallery::error::GalleryError;
use photo_gallery_common::{
    Collection, Error, FeedStatus, FilterContext, Page, PageFetcher, Photo, Result,
};
use std::cell::RefCell;

/// 要求されたページ番号とlimitから一覧を切り出して返す
struct FakeFetcher {
    total: u64,
    fail_on: Option<u32>,
    /// (page, limit, filter)
    requests: RefCell<Vec<(u32, u32, FilterContext)>>,
}

impl FakeFetcher {
    fn new(total: u64) -> Self {
        Self { total, fail_on: None, requests: RefCell::new(Vec::new()) }
    }

    fn pages(&self, limit: u32) -> u32 {
        ((self.total + limit as u64 - 1) / limit as u64) as u32
    }

    fn limits(&self) -> Vec<u32> {
        self.requests.borrow().iter().map(|r| r.1).collect()
    }
}

#[async_trait(?Send)]
impl PageFetcher<Photo> for FakeFetcher {
    async fn fetch_page(&self, page: u32, limit: u32, filter: &FilterContext) -> Result<Page<Photo>> {
        self.requests.borrow_mut().push((page, limit, filter.clone()));
        if self.fail_on == Some(page) {
            return Err(Error::Status { status: 503, url: "http://fake/photos".into() });
        }
        let start = (page - 1) as u64 * limit as u64;
        let end = (start + limit as u64).min(self.total);
        let items = (start..end)
            .map(|i| Photo {
                public_id: format!("p{}", i + 1),
                title: format!("Photo {}", i + 1),
                thumbnail_url: format!("https://cdn.example/thumb/p{}.webp", i + 1),
                aspect_ratio: 1.0,
                ..Default::default()
            })
            .collect();
        Ok(Page { items, total: self.total, page, pages: self.pages(limit), limit })
    }
}

#[async_trait(?Send)]
impl PageFetcher<Collection> for FakeFetcher {
    async fn fetch_page(&self, page: u32, limit: u32, filter: &FilterContext) -> Result<Page<Collection>> {
        self.requests.borrow_mut().push((page, limit, filter.clone()));
        let start = (page - 1) as u64 * limit as u64;
        let end = (start + limit as u64).min(self.total);
        let items = (start..end)
            .map(|i| Collection {
                id: format!("c{}", i + 1),
                title: format!("Collection {}", i + 1),
                description: None,
                slug: format!("collection-{}", i + 1),
                cover_photo_id: None,
                cover_photo: None,
                is_published: true,
                view_count: 0,
                photo_count: 0,
                created_at: "2024-05-01T10:00:00".into(),
                updated_at: "2024-05-01T10:00:00".into(),
            })
            .collect();
        Ok(Page { items, total: self.total, page, pages: self.pages(limit), limit: 0 })
    }
}

/// 指定ページ数まで読み込んで止まる
#[tokio::test]
async fn test_browse_stops_at_page_limit() {
    let fetcher = FakeFetcher::new(10);
    let mut out = Vec::new();

    let summary = browse_photos(&fetcher, FilterContext::default(), 3, ContinuePolicy::Pages(2), false, &mut out)
        .await
        .expect("browse");

    assert_eq!(summary.feed.len(), 6);
    assert_eq!(summary.feed.current_page(), 2);
    assert!(!summary.feed.is_exhausted());
    assert_eq!(fetcher.requests.borrow().len(), 2);

    let text = String::from_utf8(out).expect("utf8");
    assert!(text.contains("該当 10 件"));
    assert!(text.contains("   6. Photo 6 [p6]"));
    assert!(!text.contains("すべて読み込みました"));
}

/// 最終ページに達したら終端マーカーを出す
#[tokio::test]
async fn test_browse_reaches_end_of_feed() {
    let fetcher = FakeFetcher::new(5);
    let mut out = Vec::new();
    let filter = FilterContext::new(Some("sea"), &[]);

    let summary = browse_photos(&fetcher, filter.clone(), 2, ContinuePolicy::Pages(10), false, &mut out)
        .await
        .expect("browse");

    assert_eq!(summary.feed.len(), 5);
    assert!(summary.feed.is_exhausted());
    assert_eq!(summary.feed.status(), FeedStatus::Exhausted);

    // 終端後は取得しない
    let requests = fetcher.requests.borrow();
    let pages: Vec<u32> = requests.iter().map(|r| r.0).collect();
    assert_eq!(pages, vec![1, 2, 3]);
    assert!(requests.iter().all(|r| r.2 == filter));

    let text = String::from_utf8(out).expect("utf8");
    assert!(text.contains("-- すべて読み込みました (5件) --"));
}

/// 0件の検索結果
#[tokio::test]
async fn test_browse_empty_result() {
    let fetcher = FakeFetcher::new(0);
    let mut out = Vec::new();

    let summary = browse_photos(&fetcher, FilterContext::default(), 20, ContinuePolicy::Pages(3), false, &mut out)
        .await
        .expect("browse");

    assert!(summary.feed.is_empty());
    assert_eq!(fetcher.requests.borrow().len(), 1);
    let text = String::from_utf8(out).expect("utf8");
    assert!(text.contains("写真が見つかりません"));
}

/// 自動読み込み中の失敗はエラーとして返る
#[tokio::test]
async fn test_browse_failure_propagates() {
    let mut fetcher = FakeFetcher::new(10);
    fetcher.fail_on = Some(2);
    let mut out = Vec::new();

    let err = browse_photos(&fetcher, FilterContext::default(), 3, ContinuePolicy::Pages(4), false, &mut out)
        .await
        .unwrap_err();

    assert!(matches!(err, GalleryError::Common(Error::Status { status: 503, .. })));
    let text = String::from_utf8(out).expect("utf8");
    assert!(text.contains("読み込みに失敗しました"));
}

/// シード取得の失敗
#[tokio::test]
async fn test_browse_seed_failure() {
    let mut fetcher = FakeFetcher::new(10);
    fetcher.fail_on = Some(1);
    let mut out = Vec::new();

    let result = browse_photos(&fetcher, FilterContext::default(), 3, ContinuePolicy::Pages(1), false, &mut out).await;
    assert!(result.is_err());
}

/// コレクションを全ページ辿る
#[tokio::test]
async fn test_walk_collections() {
    let fetcher = FakeFetcher::new(7);

    let feed = walk_collections::<FakeFetcher>(&fetcher, 3).await.expect("walk");
    assert_eq!(feed.len(), 7);
    assert_eq!(feed.current_page(), 3);
    assert_eq!(feed.items()[6].slug, "collection-7");
}

/// 上限を超えるページサイズはシードから丸められ、全ページが同じlimitで要求される
#[tokio::test]
async fn test_browse_keeps_limit_across_pages() {
    let fetcher = FakeFetcher::new(300);
    let mut out = Vec::new();

    let summary = browse_photos(&fetcher, FilterContext::default(), 150, ContinuePolicy::Pages(10), false, &mut out)
        .await
        .expect("browse");

    assert_eq!(fetcher.limits(), vec![100, 100, 100]);
    assert_eq!(summary.feed.len(), 300);
    assert!(summary.feed.is_exhausted());

    // ページ境界がずれていなければ重複は出ない
    let ids: std::collections::HashSet<&str> =
        summary.feed.items().iter().map(|p| p.public_id.as_str()).collect();
    assert_eq!(ids.len(), 300);
}

/// コレクションの全件取得も同じlimitで辿る
#[tokio::test]
async fn test_walk_collections_keeps_limit() {
    let fetcher = FakeFetcher::new(5);

    let feed = walk_collections::<FakeFetcher>(&fetcher, 0).await.expect("walk");
    assert_eq!(fetcher.limits(), vec![1; 5]);
    assert_eq!(feed.len(), 5);
}
