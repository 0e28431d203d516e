//! 設定管理
//!
//! TOML設定ファイルの読み込みとDomain型への変換。

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::domain::{ClassMap, DomainError, DomainResult, Roi};

/// ランドマーク検出バックエンド
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum DetectorBackend {
    /// tract-onnxによるONNXモデル推論（デフォルト）
    #[default]
    Tract,
    /// 固定応答を返すモック（モデルファイルなしでの開発・テスト用）
    Mock,
}

/// アプリケーション設定のルート構造
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct AppConfig {
    /// カメラ設定
    pub camera: CameraConfig,
    /// ランドマーク検出設定
    pub detector: DetectorConfig,
    /// データセット収集・構築設定
    pub dataset: DatasetConfig,
    /// 学習設定
    pub training: TrainingConfig,
    /// ライブ推論設定
    pub inference: InferenceConfig,
    /// ラベル表示マッピング
    pub labels: LabelsConfig,
}

/// カメラ設定
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CameraConfig {
    /// カメラデバイスのインデックス
    ///
    /// 通常は0（既定のWebカメラ）
    pub index: u32,

    /// ズーム倍率（中央切り出し）
    ///
    /// 1.0で切り出しなし。切り出し後は元のフレームサイズへ拡大して戻す。
    /// デフォルト: 1.5
    pub zoom_factor: f32,
}

impl CameraConfig {
    /// デフォルトのカメラインデックス
    pub const DEFAULT_INDEX: u32 = 0;
    /// デフォルトのズーム倍率
    pub const DEFAULT_ZOOM_FACTOR: f32 = 1.5;

    /// ズーム切り出し領域を計算（フレーム中央、倍率で縮小）
    ///
    /// # Arguments
    /// - `width`: フレーム幅（ピクセル）
    /// - `height`: フレーム高さ（ピクセル）
    ///
    /// # Returns
    /// - `Ok(Roi)`: フレーム内にクランプされた切り出し領域
    /// - `Err(DomainError)`: zoom_factorが1.0未満の場合
    pub fn zoom_region(&self, width: u32, height: u32) -> DomainResult<Roi> {
        if self.zoom_factor < 1.0 {
            return Err(DomainError::Configuration(format!(
                "Zoom factor must be >= 1.0, got {}",
                self.zoom_factor
            )));
        }

        let center_x = width as f32 / 2.0;
        let center_y = height as f32 / 2.0;
        let half_width = width as f32 / (2.0 * self.zoom_factor);
        let half_height = height as f32 / (2.0 * self.zoom_factor);

        let x1 = (center_x - half_width).max(0.0) as u32;
        let y1 = (center_y - half_height).max(0.0) as u32;
        let x2 = ((center_x + half_width) as u32).min(width);
        let y2 = ((center_y + half_height) as u32).min(height);

        Ok(Roi::new(x1, y1, x2 - x1, y2 - y1))
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            index: Self::DEFAULT_INDEX,
            zoom_factor: Self::DEFAULT_ZOOM_FACTOR,
        }
    }
}

/// ランドマーク検出設定
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DetectorConfig {
    /// 検出バックエンド
    ///
    /// 選択肢: "tract", "mock"
    /// デフォルト: "tract"
    #[serde(default)]
    pub backend: DetectorBackend,

    /// ハンドランドマークONNXモデルのパス
    ///
    /// MediaPipe Hand Landmark (lite/full) 形式を想定
    pub model_path: String,

    /// 最小検出信頼度 [0.0-1.0]
    ///
    /// presenceスコアがこの値未満の検出は破棄される。
    /// 低めに設定すると再現率を優先する。
    /// デフォルト: 0.3
    pub min_detection_confidence: f32,
}

impl DetectorConfig {
    /// デフォルトのモデルパス
    pub const DEFAULT_MODEL_PATH: &'static str = "models/hand_landmark_lite.onnx";
    /// デフォルトの最小検出信頼度
    pub const DEFAULT_MIN_DETECTION_CONFIDENCE: f32 = 0.3;
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            backend: DetectorBackend::default(),
            model_path: Self::DEFAULT_MODEL_PATH.to_string(),
            min_detection_confidence: Self::DEFAULT_MIN_DETECTION_CONFIDENCE,
        }
    }
}

/// データセット収集・構築設定
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DatasetConfig {
    /// ラベル別画像フォルダのルートディレクトリ
    ///
    /// 直下のサブディレクトリ名が整数ラベルIDになる（例: data/0, data/1）
    pub data_dir: String,

    /// 構築したデータセットJSONの出力パス
    pub output_path: String,

    /// 収集するクラス数（collect_imagesが0..class_countのフォルダを作る）
    pub class_count: u32,

    /// クラスごとの収集画像枚数
    pub images_per_class: u32,

    /// 収集プレビューのフレーム間隔（ミリ秒）
    pub frame_wait_ms: u64,
}

impl DatasetConfig {
    pub const DEFAULT_DATA_DIR: &'static str = "data";
    pub const DEFAULT_OUTPUT_PATH: &'static str = "data.json";
    pub const DEFAULT_CLASS_COUNT: u32 = 3;
    pub const DEFAULT_IMAGES_PER_CLASS: u32 = 100;
    pub const DEFAULT_FRAME_WAIT_MS: u64 = 25;
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            data_dir: Self::DEFAULT_DATA_DIR.to_string(),
            output_path: Self::DEFAULT_OUTPUT_PATH.to_string(),
            class_count: Self::DEFAULT_CLASS_COUNT,
            images_per_class: Self::DEFAULT_IMAGES_PER_CLASS,
            frame_wait_ms: Self::DEFAULT_FRAME_WAIT_MS,
        }
    }
}

/// 学習設定
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TrainingConfig {
    /// テスト分割比率 (0.0, 1.0)
    ///
    /// デフォルト: 0.2（8:2分割）
    pub test_ratio: f64,

    /// ランダムフォレストの木の本数
    pub tree_count: u32,

    /// 各木の最大深さ
    pub max_depth: u32,

    /// 分割シャッフルのシード（再現可能な分割のため固定）
    pub seed: u64,

    /// モデルアーティファクトの出力ディレクトリ
    pub model_dir: String,
}

impl TrainingConfig {
    pub const DEFAULT_TEST_RATIO: f64 = 0.2;
    pub const DEFAULT_TREE_COUNT: u32 = 100;
    pub const DEFAULT_MAX_DEPTH: u32 = 16;
    pub const DEFAULT_SEED: u64 = 42;
    pub const DEFAULT_MODEL_DIR: &'static str = "model";
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            test_ratio: Self::DEFAULT_TEST_RATIO,
            tree_count: Self::DEFAULT_TREE_COUNT,
            max_depth: Self::DEFAULT_MAX_DEPTH,
            seed: Self::DEFAULT_SEED,
            model_dir: Self::DEFAULT_MODEL_DIR.to_string(),
        }
    }
}

/// ライブ推論設定
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct InferenceConfig {
    /// 統計情報の出力間隔（秒）
    pub stats_interval_sec: u64,

    /// フレーム間のキー入力待ち時間（ミリ秒）
    ///
    /// ESCキー(27)の検出間隔でもある
    pub frame_wait_ms: u64,
}

impl InferenceConfig {
    pub const DEFAULT_STATS_INTERVAL_SEC: u64 = 10;
    pub const DEFAULT_FRAME_WAIT_MS: u64 = 1;

    pub fn stats_interval(&self) -> Duration {
        Duration::from_secs(self.stats_interval_sec)
    }
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            stats_interval_sec: Self::DEFAULT_STATS_INTERVAL_SEC,
            frame_wait_ms: Self::DEFAULT_FRAME_WAIT_MS,
        }
    }
}

/// ラベル表示マッピング設定
///
/// データセットのラベルIDから自動導出はされないため、
/// データセット構築時のフォルダ名と手動で整合させること。
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct LabelsConfig {
    /// ラベル定義の一覧
    pub classes: Vec<ClassLabelConfig>,
}

/// 1クラス分のラベル定義
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ClassLabelConfig {
    /// 整数ラベルID（データセットのフォルダ名と一致させる）
    pub id: i32,
    /// 表示文字列（1文字程度の短い名前）
    pub name: String,
}

impl Default for LabelsConfig {
    fn default() -> Self {
        Self {
            classes: vec![
                ClassLabelConfig { id: 0, name: "A".to_string() },
                ClassLabelConfig { id: 1, name: "B".to_string() },
                ClassLabelConfig { id: 2, name: "L".to_string() },
            ],
        }
    }
}

impl From<&LabelsConfig> for ClassMap {
    fn from(config: &LabelsConfig) -> Self {
        ClassMap::new(
            config
                .classes
                .iter()
                .map(|class| (class.id, class.name.clone())),
        )
    }
}

impl AppConfig {
    /// TOMLファイルから設定を読み込む
    pub fn from_file<P: AsRef<Path>>(path: P) -> DomainResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            DomainError::Configuration(format!("Failed to read config file: {}", e))
        })?;

        toml::from_str(&content)
            .map_err(|e| DomainError::Configuration(format!("Failed to parse config file: {}", e)))
    }

    /// デフォルト設定をTOMLファイルに書き出す
    #[allow(dead_code)]
    pub fn write_default<P: AsRef<Path>>(path: P) -> DomainResult<()> {
        let config = Self::default();
        let content = toml::to_string_pretty(&config).map_err(|e| {
            DomainError::Configuration(format!("Failed to serialize config: {}", e))
        })?;

        std::fs::write(path, content)
            .map_err(|e| DomainError::Configuration(format!("Failed to write config file: {}", e)))
    }

    /// 設定の妥当性を検証
    pub fn validate(&self) -> DomainResult<()> {
        // ズーム倍率の検証
        if self.camera.zoom_factor < 1.0 {
            return Err(DomainError::Configuration(
                "Camera zoom_factor must be >= 1.0".to_string(),
            ));
        }

        // 検出信頼度の検証
        let confidence = self.detector.min_detection_confidence;
        if !(0.0..=1.0).contains(&confidence) {
            return Err(DomainError::Configuration(
                "min_detection_confidence must be within [0.0, 1.0]".to_string(),
            ));
        }
        if self.detector.backend == DetectorBackend::Tract && self.detector.model_path.is_empty() {
            return Err(DomainError::Configuration(
                "model_path must not be empty for the tract backend".to_string(),
            ));
        }

        // データセット設定の検証
        if self.dataset.class_count == 0 {
            return Err(DomainError::Configuration(
                "class_count must be greater than 0".to_string(),
            ));
        }
        if self.dataset.images_per_class == 0 {
            return Err(DomainError::Configuration(
                "images_per_class must be greater than 0".to_string(),
            ));
        }
        if self.dataset.frame_wait_ms == 0 {
            return Err(DomainError::Configuration(
                "dataset frame_wait_ms must be greater than 0".to_string(),
            ));
        }

        // 学習設定の検証
        if !(self.training.test_ratio > 0.0 && self.training.test_ratio < 1.0) {
            return Err(DomainError::Configuration(
                "test_ratio must be within (0.0, 1.0)".to_string(),
            ));
        }
        if self.training.tree_count == 0 {
            return Err(DomainError::Configuration(
                "tree_count must be greater than 0".to_string(),
            ));
        }
        if self.training.max_depth == 0 {
            return Err(DomainError::Configuration(
                "max_depth must be greater than 0".to_string(),
            ));
        }

        // 推論設定の検証
        if self.inference.frame_wait_ms == 0 {
            return Err(DomainError::Configuration(
                "inference frame_wait_ms must be greater than 0".to_string(),
            ));
        }

        // ラベルマッピングの検証（空・ID重複を拒否）
        if self.labels.classes.is_empty() {
            return Err(DomainError::Configuration(
                "labels.classes must not be empty".to_string(),
            ));
        }
        let mut seen = std::collections::BTreeSet::new();
        for class in &self.labels.classes {
            if !seen.insert(class.id) {
                return Err(DomainError::Configuration(format!(
                    "Duplicate label id {} in labels.classes",
                    class.id
                )));
            }
            if class.name.is_empty() {
                return Err(DomainError::Configuration(format!(
                    "Empty display name for label id {}",
                    class.id
                )));
            }
        }

        Ok(())
    }
}
