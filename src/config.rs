use crate::features::OrbConfig;
use crate::pipeline::DEFAULT_FRAME_INTERVAL;
use frame_match_common::{Dataset, DatasetConfig, MANIFEST_FILE_NAME};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "config.json";
pub const ASSETS_DIR_NAME: &str = "assets";

/// ユーザー設定ディレクトリの config.json
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("frame-match").join(CONFIG_FILE_NAME))
}

/// config.json を探して読み込む
///
/// 指定パス → `<root>/config.json` → ユーザー設定ディレクトリの順。
/// 見つからない・壊れている場合は `None`（組み込みの既定値で動く）。
pub fn load_dataset_config(root: &Path, explicit: Option<&Path>) -> Option<DatasetConfig> {
    let path = match explicit {
        Some(p) => {
            if !p.exists() {
                eprintln!("⚠ 設定ファイルが見つかりません: {}（既定値を使用）", p.display());
                return None;
            }
            p.to_path_buf()
        }
        None => {
            let local = root.join(CONFIG_FILE_NAME);
            if local.exists() {
                local
            } else {
                user_config_path().filter(|p| p.exists())?
            }
        }
    };

    let content = match std::fs::read_to_string(&path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("⚠ config.json を読み込めません ({})。既定値を使用します", e);
            return None;
        }
    };

    match DatasetConfig::from_json(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            eprintln!("⚠ config.json を解析できません ({})。既定値を使用します", e);
            None
        }
    }
}

/// 1回の実行に必要な設定一式
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub dataset_id: String,
    pub search_dir: PathBuf,
    pub assets_dir: PathBuf,
    pub results_dir: PathBuf,
    pub manifest_path: PathBuf,
    pub frame_interval: u64,
    pub max_features: usize,
    pub verbose: bool,
}

impl RunConfig {
    /// データセットのパスを `root` 基準で解決
    pub fn resolve(root: &Path, dataset: &Dataset, assets_dir: Option<&Path>) -> Self {
        let results_dir = root.join(&dataset.results_dir);
        Self {
            dataset_id: dataset.id.clone(),
            search_dir: root.join(&dataset.search_dir),
            assets_dir: assets_dir
                .map(Path::to_path_buf)
                .unwrap_or_else(|| root.join(ASSETS_DIR_NAME)),
            manifest_path: results_dir.join(MANIFEST_FILE_NAME),
            results_dir,
            frame_interval: DEFAULT_FRAME_INTERVAL,
            max_features: OrbConfig::default().max_features,
            verbose: false,
        }
    }

    pub fn orb_config(&self) -> OrbConfig {
        OrbConfig::with_max_features(self.max_features)
    }
}
