//! ヘッダーコンポーネント

use crate::app::Tab;
use leptos::prelude::*;

#[component]
pub fn Header(tab: ReadSignal<Tab>, set_tab: WriteSignal<Tab>) -> impl IntoView {
    view! {
        <header class="header">
            <h1>"Photo Gallery"</h1>
            <nav class="tabs">
                <button
                    class="tab"
                    class:active=move || tab.get() == Tab::Gallery
                    on:click=move |_| set_tab.set(Tab::Gallery)
                >
                    "ギャラリー"
                </button>
                <button
                    class="tab"
                    class:active=move || tab.get() == Tab::Collections
                    on:click=move |_| set_tab.set(Tab::Collections)
                >
                    "コレクション"
                </button>
            </nav>
        </header>
    }
}
