//! コレクション一覧と詳細

use super::retry_ticket;
use crate::api::{ApiClient, CollectionPages};
use crate::report_error;
use leptos::prelude::*;
use leptos::task::spawn_local;
use photo_gallery_common::{
    Collection, CollectionDetail, FeedState, FeedStatus, FilterContext, LoadTicket, PageFetcher,
    DEFAULT_COLLECTIONS_PAGE_SIZE,
};

#[component]
pub fn Collections(selected: RwSignal<Option<String>>) -> impl IntoView {
    let client = StoredValue::new(expect_context::<ApiClient>());
    let feed = RwSignal::new(FeedState::<Collection>::new(DEFAULT_COLLECTIONS_PAGE_SIZE));
    let (opened, set_opened) = signal(None::<CollectionDetail>);
    let (detail_error, set_detail_error) = signal(None::<String>);
    let retryable = RwSignal::new(true);

    let start_fetch = move |ticket: LoadTicket| {
        let pages = CollectionPages { client: client.get_value() };
        spawn_local(async move {
            let result = pages
                .fetch_page(ticket.page(), ticket.limit(), ticket.filter())
                .await;
            let failed = feed.try_update(|f| match f.complete(ticket, result) {
                Ok(_) => None,
                Err(e) => {
                    report_error("コレクションの読み込みに失敗しました", &e);
                    Some(e.is_retryable())
                }
            });
            if let Some(Some(can_retry)) = failed {
                retryable.set(can_retry);
            }
        });
    };

    if let Some(ticket) = feed.try_update(|f| f.restart(FilterContext::default())) {
        start_fetch(ticket);
    }

    let load_more = move |_| {
        if let Some(Some(ticket)) = feed.try_update(|f| f.begin_load_more()) {
            start_fetch(ticket);
        }
    };

    let retry = move |_| {
        if let Some(Some(ticket)) = feed.try_update(retry_ticket) {
            start_fetch(ticket);
        }
    };

    let open = move |slug: String| {
        set_detail_error.set(None);
        let client = client.get_value();
        spawn_local(async move {
            match client.fetch_collection(&slug).await {
                Ok(detail) => set_opened.set(Some(detail)),
                Err(e) => {
                    report_error("コレクションの取得に失敗しました", &e);
                    set_detail_error.set(Some(e.to_string()));
                }
            }
        });
    };

    let list_footer = move || match feed.with(FeedState::status) {
        FeedStatus::Loading => view! { <div class="spinner"></div> }.into_any(),
        FeedStatus::Failed => view! {
            <div class="feed-status error">
                <p>{move || feed.with(|f| f.last_error().unwrap_or_default().to_string())}</p>
                <Show when=move || retryable.get()>
                    <button class="btn btn-secondary" on:click=retry>"再試行"</button>
                </Show>
            </div>
        }
        .into_any(),
        FeedStatus::Exhausted if feed.with(FeedState::is_empty) => view! {
            <p class="feed-status empty">"コレクションはまだありません"</p>
        }
        .into_any(),
        FeedStatus::Exhausted => view! { <div class="feed-status end"></div> }.into_any(),
        FeedStatus::Idle => view! {
            <button class="btn btn-secondary load-more" on:click=load_more>"もっと見る"</button>
        }
        .into_any(),
    };

    view! {
        <section class="collections">
            {move || detail_error.get().map(|message| view! {
                <p class="modal-error">"読み込みに失敗しました: " {message}</p>
            })}
            <Show
                when=move || opened.with(Option::is_some)
                fallback=move || view! {
                    <div class="collection-grid">
                        // 重複したアイテムもそのまま並べるため、キーには位置を含める
                        <For
                            each=move || feed.with(|f| f.items().iter().cloned().enumerate().collect::<Vec<_>>())
                            key=|(index, collection)| (*index, collection.id.clone())
                            children=move |(_, collection)| {
                                let slug = collection.slug.clone();
                                view! {
                                    <CollectionCard
                                        collection=collection
                                        on_open=move || open(slug.clone())
                                    />
                                }
                            }
                        />
                    </div>
                    {list_footer}
                }
            >
                {move || opened.get().map(|detail| view! {
                    <CollectionView
                        detail=detail
                        selected=selected
                        on_back=move || set_opened.set(None)
                    />
                })}
            </Show>
        </section>
    }
}

#[component]
fn CollectionCard<F>(collection: Collection, on_open: F) -> impl IntoView
where
    F: Fn() + 'static,
{
    let cover = collection.cover_photo.as_ref().map(|photo| {
        view! { <img src=photo.thumbnail_url.clone() alt=photo.title.clone() loading="lazy" /> }
    });

    view! {
        <article class="collection-card" on:click=move |_| on_open()>
            <div class="collection-cover">{cover}</div>
            <h3>{collection.title.clone()}</h3>
            {collection.description.clone().map(|desc| view! { <p class="text-muted">{desc}</p> })}
            <p class="collection-meta">{format!("{}枚", collection.photo_count)}</p>
        </article>
    }
}

#[component]
fn CollectionView<F>(
    detail: CollectionDetail,
    selected: RwSignal<Option<String>>,
    on_back: F,
) -> impl IntoView
where
    F: Fn() + 'static,
{
    let created = detail.created_at.get(..10).unwrap_or(detail.created_at.as_str()).to_string();

    let photos = detail
        .photos
        .iter()
        .map(|photo| {
            let public_id = photo.public_id.clone();
            view! {
                <div
                    class="photo-card visible"
                    style=format!("aspect-ratio: {}", photo.aspect_ratio)
                    on:click=move |_| selected.set(Some(public_id.clone()))
                >
                    <img src=photo.thumbnail_url.clone() alt=photo.title.clone() loading="lazy" />
                </div>
            }
        })
        .collect_view();

    view! {
        <div class="collection-detail">
            <button class="btn btn-tertiary btn-small" on:click=move |_| on_back()>"← 一覧へ戻る"</button>
            <h2>{detail.title.clone()}</h2>
            {detail.description.clone().map(|desc| view! { <p>{desc}</p> })}
            <p class="collection-meta">{format!("作成: {}  閲覧: {}", created, detail.view_count)}</p>
            <div class="photo-grid">{photos}</div>
        </div>
    }
}
