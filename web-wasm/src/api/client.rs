//! fetch APIによるHTTPクライアント

use async_trait::async_trait;
use photo_gallery_common::{
    Collection, CollectionDetail, DownloadLink, DownloadRecord, DownloadSize, Error, FilterContext,
    Page, PageFetcher, Photo, PhotoDetail, Result, DEFAULT_API_URL,
};
use serde::de::DeserializeOwned;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, RequestMode, Response, Url};

/// ギャラリーAPIクライアント
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim().trim_end_matches('/').to_string(),
        }
    }

    /// ビルド時の環境変数 PHOTO_GALLERY_API_URL（なければ既定値）
    pub fn from_env() -> Self {
        Self::new(option_env!("PHOTO_GALLERY_API_URL").unwrap_or(DEFAULT_API_URL))
    }

    /// ベースURLにパスセグメントを追加（各セグメントはエンコードされる）
    fn endpoint(&self, segments: &[&str]) -> String {
        let mut url = self.base_url.clone();
        for segment in segments {
            url.push('/');
            url.push_str(&String::from(js_sys::encode_uri_component(segment)));
        }
        url
    }

    fn with_query(url: &str, query: &[(&str, String)]) -> Result<String> {
        let url = Url::new(url).map_err(js_error)?;
        let params = url.search_params();
        for (key, value) in query {
            params.append(key, value);
        }
        Ok(url.href())
    }

    async fn send<R: DeserializeOwned>(&self, method: &str, url: String) -> Result<R> {
        let opts = RequestInit::new();
        opts.set_method(method);
        opts.set_mode(RequestMode::Cors);

        let request = Request::new_with_str_and_init(&url, &opts).map_err(js_error)?;
        request
            .headers()
            .set("Accept", "application/json")
            .map_err(js_error)?;

        let window = web_sys::window().ok_or_else(|| Error::Transport("window is not available".into()))?;
        let value = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(js_error)?;
        let response: Response = value.dyn_into().map_err(js_error)?;

        if !response.ok() {
            return Err(Error::Status {
                status: response.status(),
                url,
            });
        }

        let body = JsFuture::from(response.text().map_err(js_error)?)
            .await
            .map_err(js_error)?;
        let body = body
            .as_string()
            .ok_or_else(|| Error::Transport(format!("non-text response body from {}", url)))?;
        Ok(serde_json::from_str(&body)?)
    }

    /// 写真一覧（1ページ分）
    pub async fn fetch_photos(&self, page: u32, limit: u32, filter: &FilterContext) -> Result<Page<Photo>> {
        let url = Self::with_query(&self.endpoint(&["photos"]), &filter.query_pairs(page, limit))?;
        self.send("GET", url).await
    }

    /// 写真詳細（ライトボックス）
    pub async fn fetch_photo_detail(&self, public_id: &str) -> Result<PhotoDetail> {
        self.send("GET", self.endpoint(&["photos", public_id])).await
    }

    pub async fn fetch_download_link(&self, public_id: &str, size: DownloadSize) -> Result<DownloadLink> {
        self.send("GET", self.endpoint(&["photos", public_id, "download", size.as_str()]))
            .await
    }

    /// ダウンロード回数を記録
    pub async fn record_download(&self, public_id: &str) -> Result<DownloadRecord> {
        self.send("POST", self.endpoint(&["photos", public_id, "download"])).await
    }

    /// 公開済みコレクション一覧（1ページ分）
    pub async fn fetch_collections(&self, page: u32, limit: u32) -> Result<Page<Collection>> {
        let query = [
            ("page", page.to_string()),
            ("limit", limit.to_string()),
            ("published_only", "true".to_string()),
        ];
        let url = Self::with_query(&self.endpoint(&["collections"]), &query)?;
        self.send("GET", url).await
    }

    pub async fn fetch_collection(&self, slug: &str) -> Result<CollectionDetail> {
        self.send("GET", self.endpoint(&["collections", slug])).await
    }
}

#[async_trait(?Send)]
impl PageFetcher<Photo> for ApiClient {
    async fn fetch_page(&self, page: u32, limit: u32, filter: &FilterContext) -> Result<Page<Photo>> {
        self.fetch_photos(page, limit, filter).await
    }
}

/// コレクション一覧をフィードとして辿るためのフェッチャ
pub struct CollectionPages {
    pub client: ApiClient,
}

#[async_trait(?Send)]
impl PageFetcher<Collection> for CollectionPages {
    async fn fetch_page(&self, page: u32, limit: u32, _filter: &FilterContext) -> Result<Page<Collection>> {
        self.client.fetch_collections(page, limit).await
    }
}

fn js_error(value: JsValue) -> Error {
    Error::Transport(value.as_string().unwrap_or_else(|| format!("{:?}", value)))
}
