//! ビューポート監視まわりのクライアント状態
//!
//! - SentinelTrigger: 最後のアイテムの交差イベントを読み込みトリガーに変換
//! - VisibilitySet: 一度でも表示されたアイテム（入場アニメーション用）
//! - LikedSet: いいね状態（ビューごと、永続化しない）

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// IntersectionObserverの設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewportOptions {
    /// 交差とみなす可視率
    pub threshold: f64,
    /// 先読みマージン（CSSのmargin表記）
    pub root_margin: String,
}

impl ViewportOptions {
    /// 最後のアイテム監視用。完全に見える少し前に発火させて取得待ちを隠す
    pub fn load_trigger() -> Self {
        Self {
            threshold: 0.1,
            root_margin: "200px".to_string(),
        }
    }

    /// 入場アニメーション用
    pub fn entrance() -> Self {
        Self {
            threshold: 0.1,
            root_margin: "50px".to_string(),
        }
    }
}

impl Default for ViewportOptions {
    fn default() -> Self {
        Self::load_trigger()
    }
}

/// 最後のアイテムが「非交差→交差」に変わった瞬間だけを検出する
///
/// 監視対象は (最後のキー, 読み込み済みページ) の組。空ページや重複で
/// 最後のキーが変わらなくても、ページが進めば再び発火できる。
#[derive(Debug, Clone, Default)]
pub struct SentinelTrigger {
    observed: Option<String>,
    page: u32,
    intersecting: bool,
}

impl SentinelTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    /// 監視対象を切り替える。キーかページが変わったら状態を戻して `true`
    ///
    /// `true` のとき、呼び出し側は監視を付け直して現在の交差状態を受け取り直す。
    pub fn observe(&mut self, key: &str, page: u32) -> bool {
        if self.observed.as_deref() == Some(key) && self.page == page {
            return false;
        }
        self.observed = Some(key.to_string());
        self.page = page;
        self.intersecting = false;
        true
    }

    pub fn observed(&self) -> Option<&str> {
        self.observed.as_deref()
    }

    /// 交差イベントを受け取り、読み込みを起動すべきなら `true`
    pub fn on_intersection(&mut self, key: &str, intersecting: bool) -> bool {
        if self.observed.as_deref() != Some(key) {
            return false;
        }
        let fire = intersecting && !self.intersecting;
        self.intersecting = intersecting;
        fire
    }

    pub fn clear(&mut self) {
        self.observed = None;
        self.page = 0;
        self.intersecting = false;
    }
}

/// 一度でもビューポートに入ったアイテムのキー集合
///
/// 追加のみ。装飾目的なのでリセットしない。
#[derive(Debug, Clone, Default)]
pub struct VisibilitySet {
    seen: HashSet<String>,
}

impl VisibilitySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// 新たに表示されたなら `true`
    pub fn mark(&mut self, key: &str) -> bool {
        if self.seen.contains(key) {
            return false;
        }
        self.seen.insert(key.to_string())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.seen.contains(key)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

/// いいね済みのキー集合
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LikedSet {
    liked: HashSet<String>,
}

impl LikedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// 切り替え後の状態を返す
    pub fn toggle(&mut self, key: &str) -> bool {
        if self.liked.remove(key) {
            false
        } else {
            self.liked.insert(key.to_string());
            true
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.liked.contains(key)
    }

    pub fn len(&self) -> usize {
        self.liked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.liked.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trigger_fires_on_transition_only() {
        let mut trigger = SentinelTrigger::new();
        assert!(trigger.observe("b", 1));

        assert!(!trigger.on_intersection("b", false));
        assert!(trigger.on_intersection("b", true));
        // 交差中の繰り返しイベントでは発火しない
        assert!(!trigger.on_intersection("b", true));
        assert!(!trigger.on_intersection("b", false));
        assert!(trigger.on_intersection("b", true));
    }

    #[test]
    fn test_trigger_rearms_on_new_key() {
        let mut trigger = SentinelTrigger::new();
        trigger.observe("b", 1);
        assert!(trigger.on_intersection("b", true));

        // 追加読み込みで最後のアイテムが変わった
        assert!(trigger.observe("d", 2));
        assert_eq!(trigger.observed(), Some("d"));
        assert!(!trigger.on_intersection("b", true));
        assert!(trigger.on_intersection("d", true));
    }

    #[test]
    fn test_trigger_rearms_when_page_advances_with_same_key() {
        let mut trigger = SentinelTrigger::new();
        trigger.observe("b", 1);
        assert!(trigger.on_intersection("b", true));

        // 空ページ、または末尾が同じキーの重複だった
        assert!(trigger.observe("b", 2));
        assert!(trigger.on_intersection("b", true));
    }

    #[test]
    fn test_trigger_same_key_and_page_keeps_state() {
        let mut trigger = SentinelTrigger::new();
        trigger.observe("b", 1);
        assert!(trigger.on_intersection("b", true));
        assert!(!trigger.observe("b", 1));
        assert!(!trigger.on_intersection("b", true));
    }

    #[test]
    fn test_trigger_ignores_unobserved() {
        let mut trigger = SentinelTrigger::new();
        assert!(!trigger.on_intersection("a", true));
        trigger.observe("a", 1);
        trigger.clear();
        assert!(!trigger.on_intersection("a", true));
    }

    #[test]
    fn test_visibility_is_one_way() {
        let mut visible = VisibilitySet::new();
        assert!(visible.mark("a"));
        assert!(!visible.mark("a"));
        assert!(visible.mark("b"));
        assert!(visible.contains("a"));
        assert!(!visible.contains("c"));
        assert_eq!(visible.len(), 2);
    }

    #[test]
    fn test_liked_toggle() {
        let mut liked = LikedSet::new();
        assert!(liked.toggle("a"));
        assert!(liked.contains("a"));
        assert!(!liked.toggle("a"));
        assert!(!liked.contains("a"));
        assert!(liked.is_empty());
    }

    #[test]
    fn test_viewport_options() {
        assert_eq!(ViewportOptions::default().root_margin, "200px");
        assert_eq!(ViewportOptions::entrance().threshold, 0.1);
    }
}
