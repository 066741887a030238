//! reqwestによるHTTPクライアント

use crate::config::Config;
use crate::error::{GalleryError, Result};
use async_trait::async_trait;
use photo_gallery_common::{
    Collection, CollectionDetail, DownloadLink, DownloadRecord, DownloadSize, Error, FilterContext,
    Page, PageFetcher, Photo, PhotoDetail,
};
use reqwest::Url;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

type ApiResult<T> = photo_gallery_common::Result<T>;

/// ギャラリーAPIクライアント
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: Url,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url.trim())
            .map_err(|e| GalleryError::Config(format!("APIのURLが不正です: {} ({})", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(GalleryError::Config(format!("APIのURLが不正です: {}", base_url)));
        }
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { base_url, http })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.api_url, Duration::from_secs(config.timeout_seconds))
    }

    /// ベースURLにパスセグメントを追加（各セグメントはエンコードされる）
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get_json<R: DeserializeOwned>(&self, url: Url, query: &[(&str, String)]) -> ApiResult<R> {
        debug!(%url, ?query, "GET");
        let response = self
            .http
            .get(url.clone())
            .query(query)
            .send()
            .await
            .map_err(transport_error)?;
        decode(url, response).await
    }

    /// 写真一覧（1ページ分）
    pub async fn fetch_photos(&self, page: u32, limit: u32, filter: &FilterContext) -> ApiResult<Page<Photo>> {
        let url = self.endpoint(&["photos"]);
        self.get_json(url, &filter.query_pairs(page, limit)).await
    }

    /// 写真詳細（ライトボックス）
    pub async fn fetch_photo_detail(&self, public_id: &str) -> ApiResult<PhotoDetail> {
        let url = self.endpoint(&["photos", public_id]);
        self.get_json(url, &[]).await
    }

    /// サイズ指定のダウンロードURL
    pub async fn fetch_download_link(&self, public_id: &str, size: DownloadSize) -> ApiResult<DownloadLink> {
        let url = self.endpoint(&["photos", public_id, "download", size.as_str()]);
        self.get_json(url, &[]).await
    }

    /// ダウンロード回数を記録
    pub async fn record_download(&self, public_id: &str) -> ApiResult<DownloadRecord> {
        let url = self.endpoint(&["photos", public_id, "download"]);
        debug!(%url, "POST");
        let response = self
            .http
            .post(url.clone())
            .send()
            .await
            .map_err(transport_error)?;
        decode(url, response).await
    }

    /// コレクション一覧（1ページ分）
    pub async fn fetch_collections(&self, page: u32, limit: u32, published_only: bool) -> ApiResult<Page<Collection>> {
        let url = self.endpoint(&["collections"]);
        let query = [
            ("page", page.to_string()),
            ("limit", limit.to_string()),
            ("published_only", published_only.to_string()),
        ];
        self.get_json(url, &query).await
    }

    /// スラッグ指定のコレクション詳細
    pub async fn fetch_collection(&self, slug: &str) -> ApiResult<CollectionDetail> {
        let url = self.endpoint(&["collections", slug]);
        self.get_json(url, &[]).await
    }
}

#[async_trait(?Send)]
impl PageFetcher<Photo> for ApiClient {
    async fn fetch_page(&self, page: u32, limit: u32, filter: &FilterContext) -> ApiResult<Page<Photo>> {
        self.fetch_photos(page, limit, filter).await
    }
}

/// コレクション一覧をフィードとして辿るためのフェッチャ（フィルタは使わない）
pub struct CollectionPages<'a> {
    pub client: &'a ApiClient,
    pub published_only: bool,
}

#[async_trait(?Send)]
impl PageFetcher<Collection> for CollectionPages<'_> {
    async fn fetch_page(&self, page: u32, limit: u32, _filter: &FilterContext) -> ApiResult<Page<Collection>> {
        self.client.fetch_collections(page, limit, self.published_only).await
    }
}

fn transport_error(e: reqwest::Error) -> Error {
    Error::Transport(e.to_string())
}

async fn decode<R: DeserializeOwned>(url: Url, response: reqwest::Response) -> ApiResult<R> {
    let status = response.status();
    if !status.is_success() {
        return Err(Error::Status {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }
    let body = response.text().await.map_err(transport_error)?;
    Ok(serde_json::from_str(&body)?)
}
