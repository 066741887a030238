//! 検索バーコンポーネント

use leptos::prelude::*;
use photo_gallery_common::{parse_tags, FilterContext};

/// 検索語とタグ（カンマ区切り）を入力してフィルタを切り替える
#[component]
pub fn SearchBar(filter: RwSignal<FilterContext>) -> impl IntoView {
    let (query, set_query) = signal(String::new());
    let (tags, set_tags) = signal(String::new());

    let apply = move |next: FilterContext| {
        // 同じ条件ではフィードをリセットしない
        if next != filter.get_untracked() {
            filter.set(next);
        }
    };

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        let q = query.get_untracked();
        apply(FilterContext::new(Some(q.as_str()), &parse_tags(&tags.get_untracked())));
    };

    let on_clear = move |_| {
        set_query.set(String::new());
        set_tags.set(String::new());
        apply(FilterContext::default());
    };

    view! {
        <form class="search-bar" on:submit=on_submit>
            <input
                type="search"
                class="search-query"
                placeholder="キーワードで検索..."
                prop:value=move || query.get()
                on:input=move |ev| set_query.set(event_target_value(&ev))
            />
            <input
                type="text"
                class="search-tags"
                placeholder="タグ（カンマ区切り）"
                prop:value=move || tags.get()
                on:input=move |ev| set_tags.set(event_target_value(&ev))
            />
            <button type="submit" class="btn btn-primary">"検索"</button>
            <button
                type="button"
                class="btn btn-tertiary"
                disabled=move || filter.with(FilterContext::is_empty)
                on:click=on_clear
            >
                "クリア"
            </button>
        </form>
    }
}
