use clap::Parser;
use photo_gallery::{api, browse, cli, config, error, logging};
use api::{ApiClient, CollectionPages};
use browse::ContinuePolicy;
use cli::{Cli, Commands};
use config::{check_page_size, Config};
use error::{GalleryError, Result};
use photo_gallery_common::{parse_tags, FilterContext};
use std::io::IsTerminal;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let mut config = Config::load()?;
    if let Some(url) = cli.api_url.as_deref() {
        config.apply_api_url_override(url);
    }

    match cli.command {
        Commands::Browse { query, tags, pages, page_size, interactive } => {
            if pages == 0 {
                return Err(GalleryError::InvalidArgument("--pages は1以上で指定してください".into()));
            }
            let page_size = check_page_size(page_size.unwrap_or(config.page_size))?;
            let client = ApiClient::from_config(&config)?;
            let tags = tags.as_deref().map(parse_tags).unwrap_or_default();
            let filter = FilterContext::new(query.as_deref(), &tags);
            let policy = if interactive {
                ContinuePolicy::Interactive
            } else {
                ContinuePolicy::Pages(pages)
            };

            println!("📷 photo-gallery - 閲覧\n");
            let mut stdout = std::io::stdout();
            let show_progress = std::io::stderr().is_terminal();
            let summary = browse::browse_photos(
                &client,
                filter,
                page_size,
                policy,
                show_progress,
                &mut stdout,
            )
            .await?;

            if !summary.liked.is_empty() {
                println!("\n♥ いいね: {}件", summary.liked.len());
            }
        }

        Commands::Show { public_id, size } => {
            let client = ApiClient::from_config(&config)?;
            let detail = client.fetch_photo_detail(&public_id).await?;

            println!("{}", detail.title);
            println!("  ID: {}", detail.public_id);
            println!("  アスペクト比: {:.2}", detail.aspect_ratio);
            if !detail.tags.is_empty() {
                println!("  タグ: {}", detail.tags.join(", "));
            }
            println!("  ライセンス: {}", detail.license);

            let link = client.fetch_download_link(&public_id, size).await?;
            println!("  ダウンロード ({}): {}", link.size, link.download_url);
        }

        Commands::Download { public_id } => {
            let client = ApiClient::from_config(&config)?;
            let record = client.record_download(&public_id).await?;
            println!("✔ {} (累計 {}回)", record.message, record.download_count);
        }

        Commands::Collections { page, limit, all, include_unpublished } => {
            let limit = check_page_size(limit.unwrap_or(config.collections_page_size))?;
            let client = ApiClient::from_config(&config)?;
            let mut stdout = std::io::stdout();

            if all {
                let fetcher = CollectionPages { client: &client, published_only: !include_unpublished };
                let feed = browse::walk_collections(&fetcher, limit).await?;
                browse::write_collections(&mut stdout, feed.items())?;
                println!("\n全{}件", feed.total());
            } else {
                let result = client.fetch_collections(page, limit, !include_unpublished).await?;
                browse::write_collections(&mut stdout, &result.items)?;
                println!("\n{}/{}ページ (全{}件)", result.page, result.pages, result.total);
            }
        }

        Commands::Collection { slug } => {
            let client = ApiClient::from_config(&config)?;
            let detail = client.fetch_collection(&slug).await?;

            println!("{} ({})", detail.title, detail.slug);
            if let Some(desc) = detail.description.as_deref() {
                println!("  {}", desc);
            }
            println!("  作成: {}  閲覧: {}", browse::format_date(&detail.created_at), detail.view_count);
            println!();
            let mut stdout = std::io::stdout();
            browse::write_photos(&mut stdout, &detail.photos, 0, &Default::default())?;
        }

        Commands::Config { set_api_url, set_page_size, show } => {
            // 上書き（環境変数・--api-url）を保存しないようファイルから読み直す
            let effective = config;
            let mut config = Config::load_from(&Config::config_path()?)?;
            let mut changed = false;

            if let Some(url) = set_api_url {
                config.set_api_url(url)?;
                changed = true;
                println!("✔ APIのURLを設定しました");
            }

            if let Some(size) = set_page_size {
                config.set_page_size(size)?;
                changed = true;
                println!("✔ ページサイズを設定しました");
            }

            if changed {
                config.save()?;
            }

            if show || !changed {
                println!("設定:");
                println!("  API URL: {}", config.api_url);
                if effective.api_url != config.api_url && !changed {
                    println!("  (実行時の上書き: {})", effective.api_url);
                }
                println!("  ページサイズ: {}", config.page_size);
                println!("  コレクションのページサイズ: {}", config.collections_page_size);
                println!("  タイムアウト: {}秒", config.timeout_seconds);
            }
        }
    }

    Ok(())
}
