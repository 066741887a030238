//! フィルタコンテキスト
//!
//! 検索語とタグ選択の組。フィードはこの単位でリセットされる。

use serde::{Deserialize, Serialize};

/// 検索語 + タグ選択
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterContext {
    pub query: Option<String>,
    pub tags: Vec<String>,
}

impl FilterContext {
    /// 前後の空白を除去し、空の検索語・タグは捨てる（タグの順序は保持）
    pub fn new(query: Option<&str>, tags: &[String]) -> Self {
        let query = query
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_string);
        let tags = tags
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();
        Self { query, tags }
    }

    pub fn is_empty(&self) -> bool {
        self.query.is_none() && self.tags.is_empty()
    }

    /// 一覧APIのクエリパラメータ（page, limit, q, tags の順）
    pub fn query_pairs(&self, page: u32, limit: u32) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("page", page.to_string()), ("limit", limit.to_string())];
        if let Some(q) = &self.query {
            pairs.push(("q", q.clone()));
        }
        if !self.tags.is_empty() {
            pairs.push(("tags", self.tags.join(",")));
        }
        pairs
    }
}

/// カンマ区切りのタグ指定を分解
pub fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

impl std::fmt::Display for FilterContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.query {
            Some(q) => write!(f, "q={:?}", q)?,
            None => write!(f, "q=-")?,
        }
        write!(f, " tags=[{}]", self.tags.join(","))
    }
}
