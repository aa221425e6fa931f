//! ffmpeg/ffprobe 連携
//!
//! ffprobeでサイズとフレームレートを取得し、ffmpegにrgb24の生フレームを
//! 標準出力へ書き出させて1フレームずつ読む。

use super::FrameSource;
use crate::error::{FrameMatchError, Result};
use image::RgbImage;
use serde::Deserialize;
use std::io::{BufReader, ErrorKind, Read};
use std::path::Path;
use std::process::{Child, ChildStdout, Command, Stdio};

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    width: Option<u32>,
    height: Option<u32>,
    avg_frame_rate: Option<String>,
    r_frame_rate: Option<String>,
    nb_frames: Option<String>,
}

/// `"30000/1001"` 形式のフレームレートを数値に変換（不正・0除算は0）
pub fn parse_frame_rate(rate: &str) -> f64 {
    let mut parts = rate.trim().splitn(2, '/');
    let num: f64 = match parts.next().and_then(|n| n.parse::<f64>().ok()) {
        Some(n) => n,
        None => return 0.0,
    };
    let den: f64 = match parts.next() {
        Some(d) => match d.parse() {
            Ok(d) => d,
            Err(_) => return 0.0,
        },
        None => 1.0,
    };

    if den == 0.0 || !num.is_finite() {
        0.0
    } else {
        num / den
    }
}

/// ffmpegプロセスによる動画デコーダ
pub struct FfmpegVideo {
    child: Child,
    stdout: BufReader<ChildStdout>,
    width: u32,
    height: u32,
    fps: f64,
    frame_count: Option<u64>,
    finished: bool,
}

impl FfmpegVideo {
    pub fn open(path: &Path) -> Result<Self> {
        let (width, height, fps, frame_count) = probe(path)?;

        let mut child = Command::new("ffmpeg")
            .args(["-v", "error", "-nostdin", "-noautorotate", "-i"])
            .arg(path)
            .args(["-vsync", "passthrough", "-f", "rawvideo", "-pix_fmt", "rgb24", "-"])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| FrameMatchError::VideoOpen(format!("{}: ffmpeg起動失敗 ({})", path.display(), e)))?;

        let stdout = match child.stdout.take() {
            Some(out) => out,
            None => {
                child.kill().ok();
                child.wait().ok();
                return Err(FrameMatchError::VideoOpen(format!(
                    "{}: ffmpegの出力を取得できません",
                    path.display()
                )));
            }
        };

        Ok(Self {
            child,
            stdout: BufReader::new(stdout),
            width,
            height,
            fps,
            frame_count,
            finished: false,
        })
    }
}

fn probe(path: &Path) -> Result<(u32, u32, f64, Option<u64>)> {
    let output = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-select_streams",
            "v:0",
            "-show_entries",
            "stream=width,height,avg_frame_rate,r_frame_rate,nb_frames",
            "-of",
            "json",
        ])
        .arg(path)
        .output()
        .map_err(|e| FrameMatchError::VideoOpen(format!("{}: ffprobe起動失敗 ({})", path.display(), e)))?;

    if !output.status.success() {
        return Err(FrameMatchError::VideoOpen(format!(
            "{}: {}",
            path.display(),
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    let parsed: ProbeOutput = serde_json::from_slice(&output.stdout)?;
    let stream = parsed
        .streams
        .into_iter()
        .next()
        .ok_or_else(|| FrameMatchError::VideoOpen(format!("{}: 映像ストリームがありません", path.display())))?;

    let (width, height) = match (stream.width, stream.height) {
        (Some(w), Some(h)) if w > 0 && h > 0 => (w, h),
        _ => {
            return Err(FrameMatchError::VideoOpen(format!(
                "{}: フレームサイズが不明です",
                path.display()
            )))
        }
    };

    let fps = [stream.avg_frame_rate, stream.r_frame_rate]
        .iter()
        .flatten()
        .map(|r| parse_frame_rate(r))
        .find(|&f| f > 0.0)
        .unwrap_or(0.0);

    let frame_count = stream.nb_frames.and_then(|n| n.parse::<u64>().ok()).filter(|&n| n > 0);

    Ok((width, height, fps, frame_count))
}

impl FrameSource for FfmpegVideo {
    fn fps(&self) -> f64 {
        self.fps
    }

    fn frame_count(&self) -> Option<u64> {
        self.frame_count
    }

    fn next_frame(&mut self) -> Result<Option<RgbImage>> {
        if self.finished {
            return Ok(None);
        }

        let mut buffer = vec![0u8; self.width as usize * self.height as usize * 3];
        match self.stdout.read_exact(&mut buffer) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
                self.finished = true;
                return Ok(None);
            }
            Err(e) => {
                self.finished = true;
                return Err(FrameMatchError::VideoDecode(e.to_string()));
            }
        }

        RgbImage::from_raw(self.width, self.height, buffer)
            .map(Some)
            .ok_or_else(|| FrameMatchError::VideoDecode("フレームサイズ不一致".into()))
    }
}

impl Drop for FfmpegVideo {
    fn drop(&mut self) {
        // 途中で打ち切った場合もプロセスを回収する
        self.child.kill().ok();
        self.child.wait().ok();
    }
}
