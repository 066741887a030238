//! ターミナル上のフィード閲覧
//!
//! 1ページ目を取得してフィードをシードし、続きは指定ページ数まで自動で、
//! または対話入力（スクロールの代わり）ごとに読み込む。

use crate::error::{GalleryError, Result};
use chrono::{DateTime, NaiveDateTime};
use dialoguer::Input;
use indicatif::{ProgressBar, ProgressStyle};
use photo_gallery_common::{
    Collection, Error, FeedItem, FeedState, FilterContext, LikedSet, LoadOutcome, PageFetcher, Photo,
    MAX_PAGE_SIZE,
};
use std::io::Write;
use std::time::Duration;
use tracing::{info, warn};

/// 続きを読み込む条件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContinuePolicy {
    /// 合計ページ数に達するまで自動で読み込む
    Pages(u32),
    /// 1ページごとに入力を待つ
    Interactive,
}

/// 対話アクション
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedAction {
    /// 次のページを読み込む
    More,
    /// 直前の失敗した読み込みを再試行
    Retry,
    /// 表示番号（1始まり）のいいねを切り替え
    ToggleLike(usize),
    Quit,
    Unknown(String),
}

/// 対話入力を解釈
pub fn parse_feed_action(input: &str) -> FeedAction {
    let trimmed = input.trim();
    match trimmed {
        "" | "m" | "n" => FeedAction::More,
        "r" => FeedAction::Retry,
        "q" | "Q" => FeedAction::Quit,
        _ => match trimmed.strip_prefix('l').map(str::trim).map(str::parse::<usize>) {
            Some(Ok(n)) if n > 0 => FeedAction::ToggleLike(n),
            _ => FeedAction::Unknown(trimmed.to_string()),
        },
    }
}

/// 閲覧結果
#[derive(Debug)]
pub struct BrowseSummary {
    pub feed: FeedState<Photo>,
    pub liked: LikedSet,
}

fn spinner(message: &str, enabled: bool) -> ProgressBar {
    if !enabled {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner} {msg}").unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// 写真フィードを閲覧する
pub async fn browse_photos<F, W>(
    fetcher: &F,
    filter: FilterContext,
    page_size: u32,
    policy: ContinuePolicy,
    show_progress: bool,
    out: &mut W,
) -> Result<BrowseSummary>
where
    F: PageFetcher<Photo> + ?Sized,
    W: Write,
{
    // 以降のページと同じlimitでシードを取得しないと、ページ境界がずれる
    let page_size = page_size.clamp(1, MAX_PAGE_SIZE);

    // シードは呼び出し側（ここ）で取得する
    let pb = spinner("1ページ目を取得中...", show_progress);
    let seed = fetcher.fetch_page(1, page_size, &filter).await;
    pb.finish_and_clear();
    let seed = seed?;
    seed.validate()?;

    info!(filter = %filter, total = seed.total, pages = seed.pages, "feed seeded");
    writeln!(out, "該当 {} 件 ({})", seed.total, filter)?;

    let mut feed = FeedState::seeded(seed, filter, page_size);
    let mut liked = LikedSet::new();
    write_photos(out, feed.items(), 0, &liked)?;

    loop {
        if feed.is_exhausted() {
            break;
        }

        let action = match policy {
            ContinuePolicy::Pages(max) if feed.current_page() >= max => break,
            ContinuePolicy::Pages(_) => FeedAction::More,
            ContinuePolicy::Interactive => prompt_feed_action(feed.last_error().is_some())?,
        };

        let retry = action == FeedAction::Retry;
        match action {
            FeedAction::More | FeedAction::Retry => {
                let pb = spinner(&format!("{}ページ目を取得中...", feed.current_page() + 1), show_progress);
                let result = if retry {
                    feed.retry(fetcher).await
                } else {
                    feed.load_more(fetcher).await
                };
                pb.finish_and_clear();

                match result {
                    Ok(LoadOutcome::Appended { added, .. }) => {
                        let start = feed.len() - added;
                        write_photos(out, &feed.items()[start..], start, &liked)?;
                    }
                    Ok(LoadOutcome::Skipped) | Ok(LoadOutcome::Stale) => {}
                    Err(e) => {
                        warn!(error = %e, "load more failed");
                        writeln!(out, "読み込みに失敗しました: {}", e)?;
                        if policy != ContinuePolicy::Interactive {
                            return Err(e.into());
                        }
                        writeln!(out, "{}", failure_hint(&e))?;
                    }
                }
            }
            FeedAction::ToggleLike(n) => match feed.items().get(n - 1) {
                Some(photo) => {
                    let now = liked.toggle(photo.key());
                    writeln!(out, "{} {}", if now { "♥" } else { "♡" }, photo.title)?;
                }
                None => writeln!(out, "番号 {} の写真はありません", n)?,
            },
            FeedAction::Quit => break,
            FeedAction::Unknown(input) => writeln!(out, "不明な入力: {}", input)?,
        }
    }

    if feed.is_exhausted() && !feed.is_empty() {
        writeln!(out, "-- すべて読み込みました ({}件) --", feed.len())?;
    } else if feed.is_empty() {
        writeln!(out, "写真が見つかりません")?;
    }

    Ok(BrowseSummary { feed, liked })
}

/// 対話モードで失敗したときの案内
pub fn failure_hint(err: &Error) -> &'static str {
    if err.is_retryable() {
        "r で再試行できます"
    } else {
        "再試行しても同じ結果になります（q で終了）"
    }
}

fn prompt_feed_action(failed: bool) -> Result<FeedAction> {
    let prompt = if failed {
        "r:再試行 l<番号>:いいね q:終了"
    } else {
        "Enter:続きを読み込む l<番号>:いいね q:終了"
    };
    let input: String = Input::new()
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()
        .map_err(|e| GalleryError::InvalidArgument(e.to_string()))?;
    Ok(parse_feed_action(&input))
}

/// 写真を番号付きで出力（タグは先頭3件まで）
pub fn write_photos<W: Write>(out: &mut W, photos: &[Photo], offset: usize, liked: &LikedSet) -> Result<()> {
    for (i, photo) in photos.iter().enumerate() {
        let tags: Vec<String> = photo.tags.iter().take(3).map(|t| format!("#{}", t)).collect();
        writeln!(
            out,
            "{:>4}. {}{} [{}] {:.2} {}",
            offset + i + 1,
            if liked.contains(photo.key()) { "♥ " } else { "" },
            photo.title,
            photo.public_id,
            photo.aspect_ratio,
            tags.join(" ")
        )?;
    }
    Ok(())
}

/// コレクション一覧を全ページ辿る
pub async fn walk_collections<F>(fetcher: &F, page_size: u32) -> Result<FeedState<Collection>>
where
    F: PageFetcher<Collection> + ?Sized,
{
    let filter = FilterContext::default();
    let page_size = page_size.clamp(1, MAX_PAGE_SIZE);
    let seed = fetcher.fetch_page(1, page_size, &filter).await?;
    seed.validate()?;
    let mut feed = FeedState::seeded(seed, filter, page_size);
    while !feed.is_exhausted() {
        if let LoadOutcome::Skipped = feed.load_more(fetcher).await? {
            break;
        }
    }
    Ok(feed)
}

pub fn write_collections<W: Write>(out: &mut W, collections: &[Collection]) -> Result<()> {
    for c in collections {
        writeln!(
            out,
            "{} ({}) {}枚 閲覧{} 作成{}{}",
            c.title,
            c.slug,
            c.photo_count,
            c.view_count,
            format_date(&c.created_at),
            if c.is_published { "" } else { " [非公開]" }
        )?;
        if let Some(desc) = c.description.as_deref().filter(|d| !d.is_empty()) {
            writeln!(out, "    {}", desc)?;
        }
    }
    Ok(())
}

/// APIの日時文字列を日付だけに整形（解釈できなければそのまま）
pub fn format_date(raw: &str) -> String {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.format("%Y-%m-%d").to_string();
    }
    match NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        Ok(dt) => dt.format("%Y-%m-%d").to_string(),
        Err(_) => raw.to_string(),
    }
}
