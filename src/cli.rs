use clap::{Parser, Subcommand};
use photo_gallery_common::DownloadSize;

#[derive(Parser)]
#[command(name = "photo-gallery")]
#[command(about = "写真ギャラリーの閲覧・検索ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// APIのベースURL（設定ファイル・環境変数より優先）
    #[arg(long, global = true)]
    pub api_url: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 写真フィードを閲覧（検索語・タグで絞り込み）
    Browse {
        /// 検索語（タイトル・タグの部分一致）
        #[arg(short, long)]
        query: Option<String>,

        /// タグ（カンマ区切り）
        #[arg(short, long)]
        tags: Option<String>,

        /// 読み込むページ数
        #[arg(short, long, default_value = "1")]
        pages: u32,

        /// ページあたりの件数（省略時は設定値）
        #[arg(long)]
        page_size: Option<u32>,

        /// 1ページごとに入力を待つ
        #[arg(short, long)]
        interactive: bool,
    },

    /// 写真の詳細を表示
    Show {
        /// 写真のpublic_id
        #[arg(required = true)]
        public_id: String,

        /// ダウンロードURLのサイズ (small/large/original)
        #[arg(short, long, default_value = "original")]
        size: DownloadSize,
    },

    /// ダウンロードを記録
    Download {
        /// 写真のpublic_id
        #[arg(required = true)]
        public_id: String,
    },

    /// コレクション一覧
    Collections {
        /// ページ番号
        #[arg(short, long, default_value = "1")]
        page: u32,

        /// ページあたりの件数（省略時は設定値）
        #[arg(short, long)]
        limit: Option<u32>,

        /// 全ページを取得
        #[arg(long)]
        all: bool,

        /// 非公開のコレクションも含める
        #[arg(long)]
        include_unpublished: bool,
    },

    /// コレクションの詳細と所属写真
    Collection {
        /// コレクションのスラッグ
        #[arg(required = true)]
        slug: String,
    },

    /// 設定を表示/編集
    Config {
        /// APIのベースURLを設定
        #[arg(long)]
        set_api_url: Option<String>,

        /// ページサイズを設定
        #[arg(long)]
        set_page_size: Option<u32>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}
