//! APIクライアントテスト
//!
//! ローカルに立てた応答固定のHTTPサーバーに対して、
//! リクエストURLとステータスの扱いを検証

use photo_gallery::api::{ApiClient, CollectionPages};
use photo_gallery_common::{
    parse_tags, DownloadSize, Error, FeedState, FilterContext, LoadOutcome, Page, PageFetcher, Photo,
};
use serde_json::{json, Value};
use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// 受け取ったリクエスト行（"GET /path?query HTTP/1.1"）
type Requests = Arc<Mutex<Vec<String>>>;

/// 順番に (ステータス, JSON) を返すサーバーを起動し、ベースURLを返す
fn serve(responses: Vec<(u16, Value)>) -> (String, Requests) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    let requests: Requests = Arc::new(Mutex::new(Vec::new()));
    let recorded = Arc::clone(&requests);

    thread::spawn(move || {
        for (status, body) in responses {
            let Ok((mut stream, _)) = listener.accept() else {
                return;
            };
            let mut buf = Vec::new();
            let mut chunk = [0u8; 1024];
            while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                match stream.read(&mut chunk) {
                    Ok(0) | Err(_) => break,
                    Ok(n) => buf.extend_from_slice(&chunk[..n]),
                }
            }
            let head = String::from_utf8_lossy(&buf);
            let request_line = head.lines().next().unwrap_or_default().to_string();
            recorded.lock().unwrap().push(request_line);

            let body = body.to_string();
            let response = format!(
                "HTTP/1.1 {} Scripted\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            let _ = stream.write_all(response.as_bytes());
            let _ = stream.flush();
        }
    });

    (format!("http://{}/api/v1", addr), requests)
}

fn client(base_url: &str) -> ApiClient {
    ApiClient::new(base_url, Duration::from_secs(5)).expect("client")
}

fn photo_json(id: &str) -> Value {
    json!({
        "public_id": id,
        "title": format!("Photo {}", id),
        "tags": ["sky"],
        "thumbnail_url": format!("https://cdn.example/images/thumb/{}.webp", id),
        "aspect_ratio": 1.5
    })
}

fn page_json(ids: &[&str], page: u32, pages: u32, total: u64, limit: u32) -> Value {
    json!({
        "items": ids.iter().map(|id| photo_json(id)).collect::<Vec<_>>(),
        "total": total,
        "page": page,
        "pages": pages,
        "limit": limit
    })
}

/// 一覧のクエリ文字列（page, limit, q, tags）
#[tokio::test]
async fn test_fetch_photos_query_string() {
    let (base, requests) = serve(vec![(200, page_json(&["a", "b"], 2, 3, 5, 2))]);
    let filter = FilterContext::new(Some("city lights"), &parse_tags("night,neon"));

    let page = client(&base).fetch_photos(2, 2, &filter).await.expect("fetch");
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.page, 2);

    let line = requests.lock().unwrap()[0].clone();
    assert!(line.starts_with("GET /api/v1/photos?page=2&limit=2&q=city+lights&tags=night%2Cneon "));
}

/// フィルタなしではqとtagsを送らない
#[tokio::test]
async fn test_fetch_photos_without_filter() {
    let (base, requests) = serve(vec![(200, page_json(&["a"], 1, 1, 1, 20))]);

    client(&base)
        .fetch_photos(1, 20, &FilterContext::default())
        .await
        .expect("fetch");

    let line = requests.lock().unwrap()[0].clone();
    assert!(line.starts_with("GET /api/v1/photos?page=1&limit=20 "));
}

/// 成功以外のステータスはError::Statusになる
#[tokio::test]
async fn test_non_success_status() {
    let (base, _) = serve(vec![(404, json!({"detail": "Photo not found"}))]);

    let err = client(&base).fetch_photo_detail("missing").await.unwrap_err();
    match err {
        Error::Status { status, url } => {
            assert_eq!(status, 404);
            assert!(url.ends_with("/api/v1/photos/missing"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

/// 接続できない場合はError::Transport
#[tokio::test]
async fn test_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let err = client(&format!("http://{}/api/v1", addr))
        .fetch_photos(1, 20, &FilterContext::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Transport(_)));
    assert!(err.is_retryable());
}

/// 壊れたJSONはError::Json
#[tokio::test]
async fn test_invalid_body() {
    let (base, _) = serve(vec![(200, json!({"unexpected": true}))]);

    let err = client(&base)
        .fetch_photos(1, 20, &FilterContext::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Json(_)));
}

/// 詳細・サイズ指定URL・ダウンロード記録
#[tokio::test]
async fn test_detail_and_download_endpoints() {
    let (base, requests) = serve(vec![
        (
            200,
            json!({
                "public_id": "p1",
                "title": "Forest",
                "tags": ["green"],
                "download_url": "https://cdn.example/images/original/p1.webp",
                "aspect_ratio": 0.75
            }),
        ),
        (
            200,
            json!({"download_url": "https://cdn.example/images/small/p1.webp", "size": "small"}),
        ),
        (200, json!({"message": "Download recorded", "download_count": 8})),
    ]);
    let api = client(&base);

    let detail = api.fetch_photo_detail("p1").await.expect("detail");
    assert_eq!(detail.title, "Forest");
    assert!(detail.license.contains("CC0"));

    let link = api.fetch_download_link("p1", DownloadSize::Small).await.expect("link");
    assert_eq!(link.size, DownloadSize::Small);

    let record = api.record_download("p1").await.expect("record");
    assert_eq!(record.download_count, 8);

    let lines = requests.lock().unwrap().clone();
    assert!(lines[0].starts_with("GET /api/v1/photos/p1 "));
    assert!(lines[1].starts_with("GET /api/v1/photos/p1/download/small "));
    assert!(lines[2].starts_with("POST /api/v1/photos/p1/download "));
}

/// パスセグメントはエンコードされる
#[tokio::test]
async fn test_path_segment_encoding() {
    let (base, requests) = serve(vec![(404, json!({}))]);

    let _ = client(&base).fetch_collection("a b/c").await;
    let line = requests.lock().unwrap()[0].clone();
    assert!(line.starts_with("GET /api/v1/collections/a%20b%2Fc "));
}

/// コレクション一覧をフィードで全ページ辿る
#[tokio::test]
async fn test_collection_pages_through_feed() {
    let collection = |id: &str| {
        json!({
            "id": id,
            "title": format!("Collection {}", id),
            "description": null,
            "slug": format!("slug-{}", id),
            "cover_photo_id": null,
            "cover_photo": null,
            "is_published": true,
            "view_count": 0,
            "photo_count": 3,
            "created_at": "2024-05-01T10:00:00",
            "updated_at": "2024-05-01T10:00:00"
        })
    };
    let (base, requests) = serve(vec![
        (200, json!({"items": [collection("c1")], "total": 2, "page": 1, "pages": 2})),
        (200, json!({"items": [collection("c2")], "total": 2, "page": 2, "pages": 2})),
    ]);
    let api = client(&base);
    let fetcher = CollectionPages { client: &api, published_only: true };

    let seed = fetcher
        .fetch_page(1, 1, &FilterContext::default())
        .await
        .expect("seed");
    let mut feed = FeedState::seeded(seed, FilterContext::default(), 1);
    let outcome = feed.load_more(&fetcher).await.expect("page 2");

    assert_eq!(outcome, LoadOutcome::Appended { page: 2, added: 1 });
    assert_eq!(feed.len(), 2);
    assert!(feed.is_exhausted());

    let lines = requests.lock().unwrap().clone();
    assert!(lines[0].starts_with("GET /api/v1/collections?page=1&limit=1&published_only=true "));
    assert!(lines[1].starts_with("GET /api/v1/collections?page=2&limit=1&published_only=true "));
}

/// ApiClientをPageFetcherとしてフィードに使う
#[tokio::test]
async fn test_feed_over_http() {
    let (base, requests) = serve(vec![
        (200, page_json(&["c", "d"], 2, 3, 5, 2)),
        (500, json!({"detail": "boom"})),
        (200, page_json(&["e"], 3, 3, 5, 2)),
    ]);
    let api = client(&base);
    let filter = FilterContext::new(Some("sea"), &[]);
    let seed = Page {
        items: Vec::<Photo>::new(),
        total: 5,
        page: 1,
        pages: 3,
        limit: 2,
    };
    let mut feed = FeedState::seeded(seed, filter, 2);

    feed.load_more(&api).await.expect("page 2");
    let err = feed.load_more(&api).await.unwrap_err();
    assert!(matches!(err, Error::Status { status: 500, .. }));
    assert_eq!(feed.current_page(), 2);

    feed.retry(&api).await.expect("retry page 3");
    assert!(feed.is_exhausted());
    assert_eq!(feed.len(), 3);

    let lines = requests.lock().unwrap().clone();
    assert!(lines[1].contains("page=3"));
    assert!(lines[2].contains("page=3"));
    assert!(lines.iter().all(|l| l.contains("q=sea")));
}
