use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "frame-match")]
#[command(about = "参照画像と一致する写真・動画フレームを検出するツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 素材フォルダを走査して参照画像とのマッチを書き出す
    Run {
        /// プロジェクトルート（config.json・assets の基準）
        #[arg(long, default_value = ".")]
        root: PathBuf,

        /// 設定ファイル（省略時: ルート/config.json → ユーザー設定）
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// データセットID（省略時は defaultId）
        #[arg(short, long)]
        dataset: Option<String>,

        /// 素材フォルダ（デフォルト: ルート/assets）
        #[arg(short, long)]
        assets: Option<PathBuf>,

        /// 動画フレームの間引き間隔（Nフレームごとに照合）
        #[arg(short = 'i', long, default_value = "3")]
        frame_interval: u64,

        /// 1枚あたりの最大特徴点数
        #[arg(long, default_value = "2000")]
        max_features: usize,
    },

    /// マニフェストを結果フォルダの内容から再生成
    Manifest {
        /// プロジェクトルート
        #[arg(long, default_value = ".")]
        root: PathBuf,

        /// 設定ファイル
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// 結果マニフェストのみ
        #[arg(long)]
        results: bool,

        /// 参照画像マニフェストのみ
        #[arg(long)]
        search: bool,
    },

    /// 設定済みデータセットを一覧表示
    Datasets {
        /// プロジェクトルート
        #[arg(long, default_value = ".")]
        root: PathBuf,

        /// 設定ファイル
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}
