//! 結果・参照画像マニフェスト
//!
//! 結果フォルダの `manifest.json` はビューアがポーリングで読み込む。
//! マッチ確定のたびに読み込み→追記→全体書き戻しを行うため、
//! 同じ結果フォルダに対して複数プロセスを同時に走らせてはならない。

use crate::error::Result;
use crate::media::is_image_path;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// マニフェストのファイル名
pub const MANIFEST_FILE_NAME: &str = "manifest.json";

/// 逐次追記中のマニフェストを示す `generatedAt` の値
pub const LIVE_MARKER: &str = "live";

lazy_static! {
    static ref FRAME_PATTERN: Regex = Regex::new(r"frame_(\d+)_t(\d+m\d+s\d+ms)").unwrap();
    static ref TIMECODE_PATTERN: Regex = Regex::new(r"(\d+)m(\d+)s(\d+)ms").unwrap();
}

/// 結果マニフェストの1エントリ
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    pub filename: String,
    pub frame_number: u64,
    pub timecode: String,
    pub seconds: f64,
}

/// `files` 配列の要素
///
/// 古いマニフェストはファイル名の文字列だけを並べていたため両方を受け付ける。
/// それ以外の形の要素も書き戻しで消さないよう、そのまま保持する。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ManifestFile {
    Entry(ManifestEntry),
    Name(String),
    Other(Value),
}

impl ManifestFile {
    fn from_value(value: Value) -> Self {
        if let Value::String(name) = value {
            return ManifestFile::Name(name);
        }
        match ManifestEntry::deserialize(&value) {
            Ok(entry) => ManifestFile::Entry(entry),
            Err(_) => ManifestFile::Other(value),
        }
    }

    /// ファイル名（`filename` キーのない要素は `None`）
    pub fn filename(&self) -> Option<&str> {
        match self {
            ManifestFile::Entry(entry) => Some(&entry.filename),
            ManifestFile::Name(name) => Some(name),
            ManifestFile::Other(value) => value.get("filename").and_then(Value::as_str),
        }
    }
}

/// タイムコード文字列を秒に変換
///
/// 3番目のフィールドは1/1000秒として解釈する（既存ビューアと同じ計算）。
pub fn parse_timecode(timecode: &str) -> Option<f64> {
    let caps = TIMECODE_PATTERN.captures(timecode)?;
    let minutes: f64 = caps[1].parse().ok()?;
    let seconds: f64 = caps[2].parse().ok()?;
    let millis: f64 = caps[3].parse().ok()?;
    Some(minutes * 60.0 + seconds + millis / 1000.0)
}

/// 結果ファイル名からフレーム番号・タイムコードを抽出
///
/// フレームマーカーを含まない（静止画マッチの）ファイル名は `None`。
pub fn parse_frame_metadata(filename: &str) -> Option<ManifestEntry> {
    let caps = FRAME_PATTERN.captures(filename)?;
    let frame_number: u64 = caps[1].parse().ok()?;
    let timecode = caps[2].to_string();
    let seconds = parse_timecode(&timecode)?;
    Some(ManifestEntry {
        filename: filename.to_string(),
        frame_number,
        timecode,
        seconds,
    })
}

/// 結果フォルダの `manifest.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultsManifest {
    #[serde(default = "live_marker")]
    pub generated_at: String,
    #[serde(default)]
    pub count: usize,
    #[serde(default)]
    pub files: Vec<ManifestFile>,
}

fn live_marker() -> String {
    LIVE_MARKER.to_string()
}

impl Default for ResultsManifest {
    fn default() -> Self {
        Self {
            generated_at: live_marker(),
            count: 0,
            files: Vec::new(),
        }
    }
}

impl ResultsManifest {
    /// マニフェストを読み込み
    ///
    /// 存在しない・JSONとして読めない場合は空から始める。
    /// JSONとして読める場合は既存の `files` を形に関わらず引き継ぐ
    /// （配列でなければ空配列扱い）。`count` は読み込み時に数え直す。
    pub fn load(path: &Path) -> Self {
        let file = match File::open(path) {
            Ok(f) => f,
            Err(_) => return Self::default(),
        };
        let value: Value = match serde_json::from_reader(BufReader::new(file)) {
            Ok(v) => v,
            Err(_) => return Self::default(),
        };

        let generated_at = value
            .get("generatedAt")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(live_marker);
        let files: Vec<ManifestFile> = match value.get("files") {
            Some(Value::Array(items)) => items.iter().cloned().map(ManifestFile::from_value).collect(),
            _ => Vec::new(),
        };

        Self {
            generated_at,
            count: files.len(),
            files,
        }
    }

    /// マニフェストを書き出し
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    pub fn contains(&self, filename: &str) -> bool {
        self.files.iter().any(|f| f.filename() == Some(filename))
    }

    /// フレーム結果ファイル名を追記
    ///
    /// フレームマーカーのないファイル名と既存のファイル名は追記しない。
    /// 追記した場合のみ `true`。
    pub fn append(&mut self, filename: &str) -> bool {
        let Some(entry) = parse_frame_metadata(filename) else {
            return false;
        };
        if self.contains(filename) {
            return false;
        }

        self.files.push(ManifestFile::Entry(entry));
        self.count = self.files.len();
        self.generated_at = live_marker();
        true
    }

    /// ファイル上のマニフェストへ1件追記（読み込み→追記→書き戻し）
    pub fn append_to_file(path: &Path, filename: &str) -> Result<bool> {
        let mut manifest = Self::load(path);
        if !manifest.append(filename) {
            return Ok(false);
        }
        manifest.save(path)?;
        Ok(true)
    }

    /// 結果フォルダ内のPNGからマニフェストを再構築
    pub fn rebuild(results_dir: &Path) -> Result<Self> {
        let files: Vec<ManifestFile> = sorted_file_names(results_dir)?
            .into_iter()
            .filter(|name| name.to_lowercase().ends_with(".png"))
            .filter_map(|name| parse_frame_metadata(&name))
            .map(ManifestFile::Entry)
            .collect();

        Ok(Self {
            generated_at: chrono::Utc::now().to_rfc3339(),
            count: files.len(),
            files,
        })
    }

    pub fn entries(&self) -> impl Iterator<Item = &ManifestEntry> {
        self.files.iter().filter_map(|f| match f {
            ManifestFile::Entry(entry) => Some(entry),
            _ => None,
        })
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// 参照画像マニフェストのエントリ
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchEntry {
    pub filename: String,
}

/// 参照画像フォルダの `manifest.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchManifest {
    pub generated_at: String,
    pub count: usize,
    pub files: Vec<SearchEntry>,
}

impl SearchManifest {
    /// 参照画像フォルダを走査してマニフェストを作成
    pub fn build(search_dir: &Path) -> Result<Self> {
        let files: Vec<SearchEntry> = sorted_file_names(search_dir)?
            .into_iter()
            .filter(|name| is_image_path(Path::new(name)))
            .map(|filename| SearchEntry { filename })
            .collect();

        Ok(Self {
            generated_at: chrono::Utc::now().to_rfc3339(),
            count: files.len(),
            files,
        })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }
}

fn sorted_file_names(dir: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            names.push(entry.file_name().to_string_lossy().to_string());
        }
    }
    names.sort();
    Ok(names)
}
