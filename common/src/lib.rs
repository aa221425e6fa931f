//! Frame Match Common Library
//!
//! マッチング本体と結果ビューアで共有される、画像処理を含まない型とユーティリティ

pub mod dataset;
pub mod error;
pub mod manifest;
pub mod media;
pub mod naming;

pub use dataset::{Dataset, DatasetConfig};
pub use error::{Error, Result};
pub use manifest::{
    parse_frame_metadata, parse_timecode, ManifestEntry, ManifestFile, ResultsManifest,
    SearchManifest, MANIFEST_FILE_NAME,
};
pub use media::{is_image_path, is_video_path, IMAGE_EXTENSIONS, VIDEO_EXTENSIONS};
pub use naming::{format_timecode, frame_match_name, frame_timestamp, image_match_name, sanitize_filename};
