use thiserror::Error;

#[derive(Error, Debug)]
pub enum FrameMatchError {
    #[error("参照画像フォルダが見つかりません: {0}")]
    SearchDirNotFound(String),

    #[error("素材フォルダが見つかりません: {0}")]
    AssetsDirNotFound(String),

    #[error("読み込める参照画像がありません: {0}")]
    NoReferenceImages(String),

    #[error("画像読み込みエラー: {0}")]
    ImageLoad(String),

    #[error("画像書き出しエラー: {0}")]
    ImageWrite(String),

    #[error("動画を開けません: {0}")]
    VideoOpen(String),

    #[error("動画デコードエラー: {0}")]
    VideoDecode(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] frame_match_common::Error),
}

pub type Result<T> = std::result::Result<T, FrameMatchError>;
