//! 動画フレームの読み出し
//!
//! パイプラインは `FrameSource` に対して書かれており、デコーダの解放は
//! 実装側の `Drop` で行う（正常終了・途中終了・エラーのどの経路でも解放される）。

mod ffmpeg;

pub use ffmpeg::{parse_frame_rate, FfmpegVideo};

use crate::error::Result;
use image::RgbImage;

/// 先頭から順にフレームを返すデコーダ
pub trait FrameSource {
    /// フレームレート（不明なら0）
    fn fps(&self) -> f64;

    /// 総フレーム数（不明なら `None`）
    fn frame_count(&self) -> Option<u64>;

    /// 次のフレーム。末尾に達したら `Ok(None)`
    fn next_frame(&mut self) -> Result<Option<RgbImage>>;
}

impl<T: FrameSource + ?Sized> FrameSource for Box<T> {
    fn fps(&self) -> f64 {
        (**self).fps()
    }

    fn frame_count(&self) -> Option<u64> {
        (**self).frame_count()
    }

    fn next_frame(&mut self) -> Result<Option<RgbImage>> {
        (**self).next_frame()
    }
}
