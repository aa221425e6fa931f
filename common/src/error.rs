//! 共通ライブラリのエラー

use thiserror::Error;

/// マニフェスト・設定ファイルの入出力エラー
#[derive(Error, Debug)]
pub enum Error {
    #[error("ファイル入出力エラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSONエラー: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
