//! 無限スクロールの写真グリッド
//!
//! 最後のカードが先読みマージン内に入った瞬間に次のページを取得する。
//! カードごとの入場アニメーションは別の監視で一度だけ発火させる。

use super::retry_ticket;
use crate::api::ApiClient;
use crate::report_error;
use crate::viewport::ViewportObserver;
use leptos::prelude::*;
use leptos::task::spawn_local;
use photo_gallery_common::{
    FeedState, FeedStatus, FilterContext, LikedSet, LoadOutcome, LoadTicket, PageFetcher, Photo,
    SentinelTrigger, ViewportOptions, VisibilitySet, DEFAULT_PAGE_SIZE,
};

type Observer = StoredValue<Option<ViewportObserver>, LocalStorage>;

fn create_observer<F>(options: ViewportOptions, on_change: F) -> Observer
where
    F: FnMut(&str, bool) -> bool + 'static,
{
    let observer = match ViewportObserver::new(&options, on_change) {
        Ok(observer) => Some(observer),
        Err(e) => {
            web_sys::console::error_2(&"IntersectionObserverを作成できません".into(), &e);
            None
        }
    };
    StoredValue::new_local(observer)
}

#[component]
pub fn PhotoGrid(
    filter: RwSignal<FilterContext>,
    selected: RwSignal<Option<String>>,
) -> impl IntoView {
    let client = StoredValue::new(expect_context::<ApiClient>());
    let feed = RwSignal::new(FeedState::<Photo>::new(DEFAULT_PAGE_SIZE));
    let visible = RwSignal::new(VisibilitySet::new());
    let liked = RwSignal::new(LikedSet::new());
    let sentinel = StoredValue::new(SentinelTrigger::new());
    // 直前の失敗が再試行で解決しうるか
    let retryable = RwSignal::new(true);

    let start_fetch = move |ticket: LoadTicket| {
        let client = client.get_value();
        spawn_local(async move {
            let result = client
                .fetch_page(ticket.page(), ticket.limit(), ticket.filter())
                .await;
            // アンマウント後に届いた結果は捨てる
            let failed = feed.try_update(|f| match f.complete(ticket, result) {
                Ok(LoadOutcome::Stale) => {
                    web_sys::console::warn_1(&"フィルタ変更前のレスポンスを破棄しました".into());
                    None
                }
                Ok(_) => None,
                Err(e) => {
                    report_error("写真の読み込みに失敗しました", &e);
                    Some(e.is_retryable())
                }
            });
            if let Some(Some(can_retry)) = failed {
                retryable.set(can_retry);
            }
        });
    };

    let load_more = move || {
        if feed.with_untracked(|f| f.is_loading() || f.is_exhausted() || f.last_error().is_some()) {
            return;
        }
        if let Some(Some(ticket)) = feed.try_update(|f| f.begin_load_more()) {
            start_fetch(ticket);
        }
    };

    let retry = move || {
        if let Some(Some(ticket)) = feed.try_update(retry_ticket) {
            start_fetch(ticket);
        }
    };

    // フィルタが変わるたびに1ページ目から取り直す（初回表示を含む）
    Effect::new(move |_| {
        let next = filter.get();
        sentinel.update_value(SentinelTrigger::clear);
        if let Some(ticket) = feed.try_update(|f| f.restart(next)) {
            start_fetch(ticket);
        }
    });

    let load_observer = create_observer(ViewportOptions::load_trigger(), move |key, intersecting| {
        let fire = sentinel
            .try_update_value(|s| s.on_intersection(key, intersecting))
            .unwrap_or(false);
        if fire {
            load_more();
        }
        false
    });

    let entrance_observer = create_observer(ViewportOptions::entrance(), move |key, intersecting| {
        if intersecting && !visible.with_untracked(|v| v.contains(key)) {
            visible.update(|v| {
                v.mark(key);
            });
        }
        // 一度表示されたら監視不要
        intersecting
    });

    let status_view = move || match feed.with(FeedState::status) {
        FeedStatus::Loading => view! {
            <div class="feed-status loading">
                <div class="spinner"></div>
                <span>"読み込み中..."</span>
            </div>
        }
        .into_any(),
        FeedStatus::Failed => {
            let message = feed.with(|f| f.last_error().unwrap_or_default().to_string());
            view! {
                <div class="feed-status error">
                    <p>"読み込みに失敗しました: " {message}</p>
                    <Show
                        when=move || retryable.get()
                        fallback=|| view! { <p class="text-muted">"検索条件を変えてお試しください"</p> }
                    >
                        <button class="btn btn-secondary" on:click=move |_| retry()>"再試行"</button>
                    </Show>
                </div>
            }
            .into_any()
        }
        FeedStatus::Exhausted if feed.with(FeedState::is_empty) => view! {
            <p class="feed-status empty">"写真が見つかりません"</p>
        }
        .into_any(),
        FeedStatus::Exhausted => view! {
            <p class="feed-status end">
                {move || format!("すべての写真を表示しました（{}件）", feed.with(FeedState::len))}
            </p>
        }
        .into_any(),
        FeedStatus::Idle => view! { <div class="feed-status idle"></div> }.into_any(),
    };

    view! {
        <section class="photo-feed">
            <p class="feed-summary">
                {move || feed.with(|f| format!("該当 {} 件", f.total()))}
            </p>
            <div class="photo-grid">
                // 重複したアイテムもそのまま並べるため、キーには位置を含める
                <For
                    each=move || feed.with(|f| f.items().iter().cloned().enumerate().collect::<Vec<_>>())
                    key=|(index, photo)| (*index, photo.public_id.clone())
                    children=move |(index, photo)| {
                        let is_last = Signal::derive(move || feed.with(|f| f.len() == index + 1));
                        let page = Signal::derive(move || feed.with(FeedState::current_page));
                        view! {
                            <PhotoCard
                                photo=photo
                                is_last=is_last
                                page=page
                                visible=visible
                                liked=liked
                                selected=selected
                                sentinel=sentinel
                                load_observer=load_observer
                                entrance_observer=entrance_observer
                            />
                        }
                    }
                />
            </div>
            {status_view}
        </section>
    }
}

#[component]
fn PhotoCard(
    photo: Photo,
    is_last: Signal<bool>,
    page: Signal<u32>,
    visible: RwSignal<VisibilitySet>,
    liked: RwSignal<LikedSet>,
    selected: RwSignal<Option<String>>,
    sentinel: StoredValue<SentinelTrigger>,
    load_observer: Observer,
    entrance_observer: Observer,
) -> impl IntoView {
    let node = NodeRef::<leptos::html::Div>::new();
    let key = photo.public_id.clone();

    Effect::new(move |_| {
        if let Some(el) = node.get() {
            entrance_observer.with_value(|o| {
                if let Some(o) = o {
                    o.observe(&el);
                }
            });
        }
    });

    // 最後のカードだけを読み込みトリガーとして監視する
    Effect::new({
        let key = key.clone();
        move |_| {
            let Some(el) = node.get() else {
                return;
            };
            if is_last.get() {
                let page = page.get();
                let rearmed = sentinel.try_update_value(|s| s.observe(&key, page)).unwrap_or(false);
                if rearmed {
                    // 付け直すと現在の交差状態が改めて通知される
                    load_observer.with_value(|o| {
                        if let Some(o) = o {
                            o.unobserve(&el);
                            o.observe(&el);
                        }
                    });
                }
            } else {
                load_observer.with_value(|o| {
                    if let Some(o) = o {
                        o.unobserve(&el);
                    }
                });
            }
        }
    });

    let is_visible = {
        let key = key.clone();
        move || visible.with(|v| v.contains(&key))
    };
    let is_liked = {
        let key = key.clone();
        move || liked.with(|l| l.contains(&key))
    };
    let is_liked_label = is_liked.clone();

    let tags = photo
        .tags
        .iter()
        .take(3)
        .map(|tag| view! { <span class="tag">"#" {tag.clone()}</span> })
        .collect_view();

    view! {
        <div
            node_ref=node
            class="photo-card"
            class:visible=is_visible
            data-key=key.clone()
            style=format!("aspect-ratio: {}", photo.aspect_ratio)
            on:click={
                let key = key.clone();
                move |_| selected.set(Some(key.clone()))
            }
        >
            <img src=photo.thumbnail_url.clone() alt=photo.title.clone() loading="lazy" />
            <div class="photo-overlay">
                <h4>{photo.title.clone()}</h4>
                <div class="photo-tags">{tags}</div>
                <button
                    class="like-button"
                    class:liked=is_liked
                    on:click={
                        let key = key.clone();
                        move |ev| {
                            ev.stop_propagation();
                            liked.update(|l| {
                                l.toggle(&key);
                            });
                        }
                    }
                >
                    {move || if is_liked_label() { "♥" } else { "♡" }}
                </button>
            </div>
        </div>
    }
}
