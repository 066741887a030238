//! Photo Gallery Web App (Leptos + WASM)

mod app;
mod components;
mod api;
mod viewport;

use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    leptos::mount::mount_to_body(app::App);
}

/// エラーをブラウザのコンソールへ
pub(crate) fn report_error(context: &str, err: &photo_gallery_common::Error) {
    web_sys::console::error_1(&format!("{}: {}", context, err).into());
}
