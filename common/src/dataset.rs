//! データセット設定（config.json）

use serde::{Deserialize, Serialize};

pub const DEFAULT_DATASET_ID: &str = "default";
pub const DEFAULT_SEARCH_DIR: &str = "data/search";
pub const DEFAULT_RESULTS_DIR: &str = "data/results";

/// 1データセット分のパス設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    #[serde(default = "default_id")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default = "default_search_dir")]
    pub search_dir: String,
    #[serde(default = "default_results_dir")]
    pub results_dir: String,
}

fn default_id() -> String {
    DEFAULT_DATASET_ID.to_string()
}

fn default_search_dir() -> String {
    DEFAULT_SEARCH_DIR.to_string()
}

fn default_results_dir() -> String {
    DEFAULT_RESULTS_DIR.to_string()
}

impl Default for Dataset {
    fn default() -> Self {
        Self {
            id: default_id(),
            label: None,
            search_dir: default_search_dir(),
            results_dir: default_results_dir(),
        }
    }
}

impl Dataset {
    /// 表示名（ラベルがなければID）
    pub fn display_name(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.id)
    }
}

/// config.json のルート
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetConfig {
    #[serde(default)]
    pub datasets: Vec<Dataset>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_id: Option<String>,
}

impl DatasetConfig {
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// IDでデータセットを検索
    pub fn find(&self, id: &str) -> Option<&Dataset> {
        self.datasets.iter().find(|d| d.id == id)
    }

    /// 既定のデータセットを選択
    ///
    /// `defaultId` に一致するもの、なければ先頭。空なら `None`。
    pub fn pick_default(&self) -> Option<&Dataset> {
        self.default_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .and_then(|id| self.find(id))
            .or_else(|| self.datasets.first())
    }

    /// 処理対象のデータセットを決定
    ///
    /// `requested` が指定されていれば優先し、見つからない場合は既定の選択に戻る。
    /// 設定がない場合は組み込みの既定値を返す。
    pub fn select(config: Option<&Self>, requested: Option<&str>) -> Dataset {
        let Some(config) = config else {
            return Dataset::default();
        };

        requested
            .and_then(|id| config.find(id))
            .or_else(|| config.pick_default())
            .cloned()
            .unwrap_or_default()
    }

    /// 全データセット（空なら既定値のみ）
    pub fn datasets_or_default(config: Option<&Self>) -> Vec<Dataset> {
        match config {
            Some(c) if !c.datasets.is_empty() => c.datasets.clone(),
            _ => vec![Dataset::default()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "defaultId": "park",
        "datasets": [
            { "id": "street", "searchDir": "data/street/search", "resultsDir": "data/street/results" },
            { "id": "park", "label": "Park walk", "searchDir": "data/park/search", "resultsDir": "data/park/results" }
        ]
    }"#;

    #[test]
    fn test_pick_by_default_id() {
        let config = DatasetConfig::from_json(SAMPLE).unwrap();
        let dataset = DatasetConfig::select(Some(&config), None);
        assert_eq!(dataset.id, "park");
        assert_eq!(dataset.display_name(), "Park walk");
        assert_eq!(dataset.search_dir, "data/park/search");
    }

    #[test]
    fn test_requested_id_wins() {
        let config = DatasetConfig::from_json(SAMPLE).unwrap();
        let dataset = DatasetConfig::select(Some(&config), Some("street"));
        assert_eq!(dataset.results_dir, "data/street/results");
    }

    #[test]
    fn test_unknown_default_id_falls_back_to_first() {
        let mut config = DatasetConfig::from_json(SAMPLE).unwrap();
        config.default_id = Some("missing".into());
        assert_eq!(DatasetConfig::select(Some(&config), None).id, "street");
    }

    #[test]
    fn test_no_default_id_picks_first() {
        let mut config = DatasetConfig::from_json(SAMPLE).unwrap();
        config.default_id = None;
        assert_eq!(DatasetConfig::select(Some(&config), Some("nope")).id, "street");
    }

    #[test]
    fn test_absent_config_uses_builtin_paths() {
        let dataset = DatasetConfig::select(None, None);
        assert_eq!(dataset.search_dir, DEFAULT_SEARCH_DIR);
        assert_eq!(dataset.results_dir, DEFAULT_RESULTS_DIR);
    }

    #[test]
    fn test_empty_datasets_uses_builtin_paths() {
        let config = DatasetConfig::from_json(r#"{ "datasets": [] }"#).unwrap();
        assert_eq!(DatasetConfig::select(Some(&config), None), Dataset::default());
        assert_eq!(DatasetConfig::datasets_or_default(Some(&config)).len(), 1);
    }
}
