//! 写真詳細モーダル（ライトボックス）

use crate::api::ApiClient;
use crate::report_error;
use gloo::events::EventListener;
use leptos::prelude::*;
use leptos::task::spawn_local;
use photo_gallery_common::{DownloadSize, PhotoDetail};
use wasm_bindgen::JsCast;

#[component]
pub fn PhotoModal(selected: RwSignal<Option<String>>) -> impl IntoView {
    let client = StoredValue::new(expect_context::<ApiClient>());
    let (detail, set_detail) = signal(None::<PhotoDetail>);
    let (error, set_error) = signal(None::<String>);
    let (download_count, set_download_count) = signal(None::<u64>);

    let close = move || selected.set(None);

    // Escキーで閉じる（リスナーはモーダルと一緒に破棄される）
    let _escape = StoredValue::new_local(web_sys::window().map(|window| {
        EventListener::new(&window, "keydown", move |ev| {
            if let Some(ev) = ev.dyn_ref::<web_sys::KeyboardEvent>() {
                if ev.key() == "Escape" {
                    close();
                }
            }
        })
    }));

    Effect::new(move |_| {
        let Some(public_id) = selected.get() else {
            return;
        };
        set_detail.set(None);
        set_error.set(None);
        set_download_count.set(None);

        let client = client.get_value();
        spawn_local(async move {
            let result = client.fetch_photo_detail(&public_id).await;
            // 取得中に別の写真が選ばれていたら反映しない
            if selected.get_untracked().as_deref() != Some(public_id.as_str()) {
                return;
            }
            match result {
                Ok(d) => set_detail.set(Some(d)),
                Err(e) => {
                    report_error("写真詳細の取得に失敗しました", &e);
                    set_error.set(Some(e.to_string()));
                }
            }
        });
    });

    let download = move |size: DownloadSize| {
        let Some(public_id) = selected.get_untracked() else {
            return;
        };
        let client = client.get_value();
        spawn_local(async move {
            let link = match client.fetch_download_link(&public_id, size).await {
                Ok(link) => link,
                Err(e) => {
                    report_error("ダウンロードURLの取得に失敗しました", &e);
                    set_error.set(Some(e.to_string()));
                    return;
                }
            };
            match client.record_download(&public_id).await {
                Ok(record) => set_download_count.set(Some(record.download_count)),
                Err(e) => report_error("ダウンロードの記録に失敗しました", &e),
            }
            if let Some(window) = web_sys::window() {
                let _ = window.open_with_url_and_target(&link.download_url, "_blank");
            }
        });
    };

    let body = move || {
        if let Some(message) = error.get() {
            return view! { <p class="modal-error">"読み込みに失敗しました: " {message}</p> }.into_any();
        }
        let Some(d) = detail.get() else {
            return view! {
                <div class="modal-loading">
                    <div class="spinner"></div>
                </div>
            }
            .into_any();
        };
        view! {
            <figure class="modal-figure">
                <img
                    src=d.download_url.clone()
                    alt=d.title.clone()
                    style=format!("aspect-ratio: {}", d.aspect_ratio)
                />
                <figcaption>
                    <h2>{d.title.clone()}</h2>
                    <div class="photo-tags">
                        {d.tags.iter().map(|tag| view! { <span class="tag">"#" {tag.clone()}</span> }).collect_view()}
                    </div>
                    <p class="license">{d.license.clone()}</p>
                </figcaption>
            </figure>
            <div class="modal-actions">
                <button class="btn btn-secondary btn-small" on:click=move |_| download(DownloadSize::Small)>
                    "Small"
                </button>
                <button class="btn btn-secondary btn-small" on:click=move |_| download(DownloadSize::Large)>
                    "Large"
                </button>
                <button class="btn btn-primary btn-small" on:click=move |_| download(DownloadSize::Original)>
                    "オリジナルをダウンロード"
                </button>
                {move || download_count.get().map(|count| view! {
                    <span class="download-count">{format!("ダウンロード数: {}", count)}</span>
                })}
            </div>
        }
        .into_any()
    };

    view! {
        <div class="modal-backdrop" on:click=move |_| close()>
            <div class="modal" on:click=|ev| ev.stop_propagation()>
                <button class="modal-close" on:click=move |_| close()>"×"</button>
                {body}
            </div>
        </div>
    }
}
