//! メインアプリケーションコンポーネント

use crate::api::ApiClient;
use crate::components::{
    collections::Collections,
    header::Header,
    photo_grid::PhotoGrid,
    photo_modal::PhotoModal,
    search_bar::SearchBar,
};
use leptos::prelude::*;
use photo_gallery_common::FilterContext;

/// 表示中のタブ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Gallery,
    Collections,
}

#[component]
pub fn App() -> impl IntoView {
    provide_context(ApiClient::from_env());

    let (tab, set_tab) = signal(Tab::Gallery);
    let filter = RwSignal::new(FilterContext::default());
    // ライトボックスで開いている写真
    let selected = RwSignal::new(None::<String>);

    view! {
        <div class="container">
            <Header tab=tab set_tab=set_tab />

            <Show
                when=move || tab.get() == Tab::Gallery
                fallback=move || view! { <Collections selected=selected /> }
            >
                <SearchBar filter=filter />
                <PhotoGrid filter=filter selected=selected />
            </Show>

            <Show when=move || selected.with(Option::is_some)>
                <PhotoModal selected=selected />
            </Show>
        </div>
    }
}
