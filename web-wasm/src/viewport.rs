//! IntersectionObserverの薄いラッパー
//!
//! 監視対象の要素は `data-key` 属性でアイテムを識別する。

use photo_gallery_common::ViewportOptions;
use wasm_bindgen::prelude::*;
use web_sys::{Element, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit};

/// アイテムキーを持たせる属性名
pub const KEY_ATTR: &str = "data-key";

type EntriesCallback = Closure<dyn FnMut(js_sys::Array, IntersectionObserver)>;

pub struct ViewportObserver {
    observer: IntersectionObserver,
    _callback: EntriesCallback,
}

impl ViewportObserver {
    /// `on_change(key, intersecting)` が `true` を返した要素は監視を外す
    pub fn new<F>(options: &ViewportOptions, mut on_change: F) -> Result<Self, JsValue>
    where
        F: FnMut(&str, bool) -> bool + 'static,
    {
        let callback: EntriesCallback = Closure::new(move |entries: js_sys::Array, observer: IntersectionObserver| {
            for entry in entries.iter() {
                let entry: IntersectionObserverEntry = entry.unchecked_into();
                let target = entry.target();
                let Some(key) = target.get_attribute(KEY_ATTR) else {
                    continue;
                };
                if on_change(&key, entry.is_intersecting()) {
                    observer.unobserve(&target);
                }
            }
        });

        let init = IntersectionObserverInit::new();
        init.set_threshold(&JsValue::from_f64(options.threshold));
        init.set_root_margin(&options.root_margin);
        let observer = IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init)?;

        Ok(Self {
            observer,
            _callback: callback,
        })
    }

    pub fn observe(&self, element: &Element) {
        self.observer.observe(element);
    }

    pub fn unobserve(&self, element: &Element) {
        self.observer.unobserve(element);
    }
}

impl Drop for ViewportObserver {
    fn drop(&mut self) {
        self.observer.disconnect();
    }
}
