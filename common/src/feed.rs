//! ページングフィードコントローラ
//!
//! 無限スクロールのグリッドが持つ状態。読み込み済みアイテムは追記のみで、
//! フィルタ変更時のリセットでだけ入れ替わる。
//!
//! UIはawaitをまたいで `&mut FeedState` を保持できないため、
//! 続きの読み込みは2つの同期処理に分かれている:
//! - `begin_load_more`: 前提条件を確認し、読み込み中フラグを立ててチケットを返す
//! - `complete`: 取得結果をチケットと照合して反映する
//!
//! チケットは発行時点のフィルタ世代を持つ。リセット後に届いた古い
//! レスポンスは世代が合わないので捨てられる。

use crate::error::{Error, Result};
use crate::filter::FilterContext;
use crate::types::Page;
use async_trait::async_trait;
use tracing::{debug, info, warn};

/// 一覧APIの既定ページサイズ
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// サーバーが受け付ける最大ページサイズ
pub const MAX_PAGE_SIZE: u32 = 100;

/// フィードに並べられるアイテム
pub trait FeedItem {
    /// 読み込み済み集合の中で一意なキー
    fn key(&self) -> &str;

    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

/// ページ取得の外部協調者
///
/// WASMのfetch（非Send）とネイティブのreqwestの両方で実装するため `?Send`。
#[async_trait(?Send)]
pub trait PageFetcher<T> {
    async fn fetch_page(&self, page: u32, limit: u32, filter: &FilterContext) -> Result<Page<T>>;
}

/// 発行済みの読み込み要求
#[derive(Debug)]
pub struct LoadTicket {
    generation: u64,
    page: u32,
    limit: u32,
    filter: FilterContext,
}

impl LoadTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn filter(&self) -> &FilterContext {
        &self.filter
    }
}

/// 読み込み要求の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// 取得したページを末尾に追加した
    Appended { page: u32, added: usize },
    /// 読み込み中、または最終ページ到達済みのため何もしなかった
    Skipped,
    /// フィルタ変更後に届いたレスポンスを破棄した
    Stale,
}

/// UIが描画を切り替えるための状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedStatus {
    Idle,
    Loading,
    Failed,
    Exhausted,
}

/// 1つのフィルタコンテキストに対する累積アイテムと読み込み状態
#[derive(Debug, Clone)]
pub struct FeedState<T> {
    items: Vec<T>,
    current_page: u32,
    total_pages: u32,
    total: u64,
    page_size: u32,
    in_flight: bool,
    filter: FilterContext,
    generation: u64,
    last_error: Option<String>,
}

impl<T: FeedItem> FeedState<T> {
    /// 未シードのフィード（シードされるまでは終端扱い）
    pub fn new(page_size: u32) -> Self {
        Self {
            items: Vec::new(),
            current_page: 0,
            total_pages: 0,
            total: 0,
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
            in_flight: false,
            filter: FilterContext::default(),
            generation: 0,
            last_error: None,
        }
    }

    /// 呼び出し側で取得した1ページ目でシード済みのフィード
    pub fn seeded(seed: Page<T>, filter: FilterContext, page_size: u32) -> Self {
        let mut feed = Self::new(page_size);
        feed.reset(seed, filter);
        feed
    }

    /// 全状態をシードページで置き換える
    ///
    /// 読み込み中の要求は世代が変わるので、届いても反映されない。
    pub fn reset(&mut self, seed: Page<T>, filter: FilterContext) {
        self.generation += 1;
        debug!(
            generation = self.generation,
            filter = %filter,
            items = seed.items.len(),
            page = seed.page,
            pages = seed.pages,
            "feed reset"
        );
        self.items = seed.items;
        self.current_page = seed.page;
        self.total_pages = seed.pages;
        self.total = seed.total;
        self.in_flight = false;
        self.filter = filter;
        self.last_error = None;
    }

    /// フィルタを切り替え、1ページ目の取得チケットを発行する
    ///
    /// シードを非同期に取得するUI向け。アイテムは即座に空になる。
    pub fn restart(&mut self, filter: FilterContext) -> LoadTicket {
        self.generation += 1;
        debug!(generation = self.generation, filter = %filter, "feed restart");
        self.items.clear();
        self.current_page = 0;
        self.total_pages = 0;
        self.total = 0;
        self.filter = filter;
        self.last_error = None;
        self.in_flight = true;
        self.ticket(1)
    }

    /// 続きのページの取得を開始する
    ///
    /// 読み込み中、または最終ページ到達済みなら `None`（エラーではない）。
    pub fn begin_load_more(&mut self) -> Option<LoadTicket> {
        if self.in_flight {
            debug!(page = self.current_page, "load_more skipped: in flight");
            return None;
        }
        if self.is_exhausted() {
            debug!(page = self.current_page, pages = self.total_pages, "load_more skipped: exhausted");
            return None;
        }
        self.in_flight = true;
        Some(self.ticket(self.current_page + 1))
    }

    fn ticket(&self, page: u32) -> LoadTicket {
        LoadTicket {
            generation: self.generation,
            page,
            limit: self.page_size,
            filter: self.filter.clone(),
        }
    }

    /// 取得結果を反映する
    ///
    /// 失敗時は読み込み中フラグだけを戻し、表示用メッセージを記録してエラーを返す。
    pub fn complete(&mut self, ticket: LoadTicket, result: Result<Page<T>>) -> Result<LoadOutcome> {
        if ticket.generation != self.generation {
            warn!(
                ticket_generation = ticket.generation,
                generation = self.generation,
                page = ticket.page,
                "discarding stale page response"
            );
            return Ok(LoadOutcome::Stale);
        }
        self.in_flight = false;

        let page = match result.and_then(|page| Self::check(&ticket, page)) {
            Ok(page) => page,
            Err(e) => {
                warn!(page = ticket.page, error = %e, "page load failed");
                self.last_error = Some(e.to_string());
                return Err(e);
            }
        };

        let added = page.items.len();
        self.items.extend(page.items);
        self.current_page = page.page;
        self.total_pages = page.pages;
        self.total = page.total;
        self.last_error = None;
        info!(
            page = self.current_page,
            pages = self.total_pages,
            added,
            loaded = self.items.len(),
            "page appended"
        );
        Ok(LoadOutcome::Appended { page: self.current_page, added })
    }

    fn check(ticket: &LoadTicket, page: Page<T>) -> Result<Page<T>> {
        if page.page != ticket.page {
            return Err(Error::InvalidPage(format!(
                "requested page {}, received page {}",
                ticket.page, page.page
            )));
        }
        page.validate()?;
        Ok(page)
    }

    /// 次のページを取得して追加する
    pub async fn load_more<F>(&mut self, fetcher: &F) -> Result<LoadOutcome>
    where
        F: PageFetcher<T> + ?Sized,
    {
        let Some(ticket) = self.begin_load_more() else {
            return Ok(LoadOutcome::Skipped);
        };
        let result = fetcher.fetch_page(ticket.page, ticket.limit, &ticket.filter).await;
        self.complete(ticket, result)
    }

    /// ユーザー操作による再試行（失敗時は状態が変わらないので同じページを要求する）
    pub async fn retry<F>(&mut self, fetcher: &F) -> Result<LoadOutcome>
    where
        F: PageFetcher<T> + ?Sized,
    {
        self.last_error = None;
        self.load_more(fetcher).await
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    /// サーバー側の該当件数
    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight
    }

    pub fn is_exhausted(&self) -> bool {
        self.current_page >= self.total_pages
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn filter(&self) -> &FilterContext {
        &self.filter
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// 最後に描画されるアイテムのキー（スクロール監視対象）
    pub fn last_key(&self) -> Option<&str> {
        self.items.last().map(FeedItem::key)
    }

    pub fn status(&self) -> FeedStatus {
        if self.in_flight {
            FeedStatus::Loading
        } else if self.last_error.is_some() {
            FeedStatus::Failed
        } else if self.is_exhausted() {
            FeedStatus::Exhausted
        } else {
            FeedStatus::Idle
        }
    }
}

impl<T: FeedItem> Default for FeedState<T> {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}
