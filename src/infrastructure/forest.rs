/// ランダムフォレスト分類器アダプタ
///
/// OpenCV ml::RTreesを使用したClassifierPort実装。
/// モデルの永続化は「スキーマタグ付きマニフェスト + フォレスト本体」の
/// 2ファイル構成のアーティファクトディレクトリで行う。
/// ライブラリ内部表現の生シリアライズには依存しない。

use crate::domain::{
    config::TrainingConfig,
    features::FEATURE_LEN,
    ports::ClassifierPort,
    DomainError, DomainResult, FeatureVector,
};
use opencv::{
    core::{self, Mat, TermCriteria},
    ml,
    prelude::*,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// アーティファクトのスキーマタグ（後方互換性の判定に使用）
pub const MODEL_SCHEMA: &str = "teburi.model/1";
/// マニフェストのファイル名
pub const MANIFEST_FILE: &str = "manifest.json";
/// フォレスト本体のファイル名（OpenCV形式）
pub const FOREST_FILE: &str = "forest.yml";

/// モデルアーティファクトのマニフェスト
///
/// アーティファクトの素性を明示するメタデータ。読み込み時に
/// スキーマタグと特徴量次元を検証する。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelManifest {
    /// スキーマタグ（"teburi.model/1"）
    pub schema: String,
    /// 特徴量ベクトルの次元数
    pub feature_len: usize,
    /// 分類器の種類
    pub classifier: String,
    /// 学習時に観測したラベルID一覧（昇順）
    pub labels: Vec<i32>,
    /// フォレスト本体の相対ファイル名
    pub forest_file: String,
}

impl ModelManifest {
    /// マニフェストの妥当性を検証
    pub fn validate(&self) -> DomainResult<()> {
        if self.schema != MODEL_SCHEMA {
            return Err(DomainError::Classifier(format!(
                "Unsupported model schema '{}' (expected '{}')",
                self.schema, MODEL_SCHEMA
            )));
        }
        if self.feature_len != FEATURE_LEN {
            return Err(DomainError::Classifier(format!(
                "Model feature length {} does not match expected {}",
                self.feature_len, FEATURE_LEN
            )));
        }
        Ok(())
    }
}

/// ランダムフォレスト分類器アダプタ
pub struct RandomForestAdapter {
    model: core::Ptr<ml::RTrees>,
    /// 学習時に観測したラベルID（昇順、未学習なら空）
    labels_seen: Vec<i32>,
}

impl RandomForestAdapter {
    /// 学習設定から未学習のフォレストを作成
    pub fn new(config: &TrainingConfig) -> DomainResult<Self> {
        let mut model = ml::RTrees::create()
            .map_err(|e| DomainError::Classifier(format!("Failed to create forest: {:?}", e)))?;

        model
            .set_max_depth(config.max_depth as i32)
            .map_err(|e| DomainError::Classifier(format!("Failed to set max depth: {:?}", e)))?;
        model
            .set_min_sample_count(2)
            .map_err(|e| DomainError::Classifier(format!("Failed to set min samples: {:?}", e)))?;
        // 0 = sqrt(特徴量数)を自動選択
        model
            .set_active_var_count(0)
            .map_err(|e| DomainError::Classifier(format!("Failed to set var count: {:?}", e)))?;

        // 木の本数は終了条件の反復回数で与える
        let criteria = TermCriteria::new(
            core::TermCriteria_MAX_ITER + core::TermCriteria_EPS,
            config.tree_count as i32,
            0.01,
        )
        .map_err(|e| DomainError::Classifier(format!("Failed to build criteria: {:?}", e)))?;
        model
            .set_term_criteria(criteria)
            .map_err(|e| DomainError::Classifier(format!("Failed to set criteria: {:?}", e)))?;

        Ok(Self {
            model,
            labels_seen: Vec::new(),
        })
    }

    /// アーティファクトディレクトリからモデルを復元
    ///
    /// マニフェストのスキーマタグと特徴量次元を検証してから
    /// フォレスト本体を読み込む。
    pub fn load(dir: &Path) -> DomainResult<Self> {
        let manifest_path = dir.join(MANIFEST_FILE);
        let content = std::fs::read_to_string(&manifest_path).map_err(|e| {
            DomainError::Classifier(format!(
                "Failed to read model manifest {}: {}",
                manifest_path.display(),
                e
            ))
        })?;
        let manifest: ModelManifest = serde_json::from_str(&content)
            .map_err(|e| DomainError::Classifier(format!("Failed to parse manifest: {}", e)))?;
        manifest.validate()?;

        let forest_path = dir.join(&manifest.forest_file);
        let forest_str = forest_path.to_str().ok_or_else(|| {
            DomainError::Classifier(format!("Non-UTF8 path: {}", forest_path.display()))
        })?;
        let model = ml::RTrees::load(forest_str, "").map_err(|e| {
            DomainError::Classifier(format!(
                "Failed to load forest {}: {:?}",
                forest_path.display(),
                e
            ))
        })?;

        tracing::info!(
            "Model loaded: {} ({}, labels={:?})",
            dir.display(),
            manifest.classifier,
            manifest.labels
        );

        Ok(Self {
            model,
            labels_seen: manifest.labels,
        })
    }

    /// 学習済みモデルをアーティファクトディレクトリへ保存
    pub fn save(&self, dir: &Path) -> DomainResult<()> {
        let trained = self
            .model
            .is_trained()
            .map_err(|e| DomainError::Classifier(format!("Failed to query model: {:?}", e)))?;
        if !trained {
            return Err(DomainError::Classifier(
                "Refusing to save an untrained model".to_string(),
            ));
        }

        std::fs::create_dir_all(dir).map_err(|e| {
            DomainError::Classifier(format!("Failed to create {}: {}", dir.display(), e))
        })?;

        let forest_path = dir.join(FOREST_FILE);
        let forest_str = forest_path.to_str().ok_or_else(|| {
            DomainError::Classifier(format!("Non-UTF8 path: {}", forest_path.display()))
        })?;
        self.model.save(forest_str).map_err(|e| {
            DomainError::Classifier(format!("Failed to save forest: {:?}", e))
        })?;

        let manifest = ModelManifest {
            schema: MODEL_SCHEMA.to_string(),
            feature_len: FEATURE_LEN,
            classifier: "opencv.rtrees".to_string(),
            labels: self.labels_seen.clone(),
            forest_file: FOREST_FILE.to_string(),
        };
        let json = serde_json::to_string_pretty(&manifest)
            .map_err(|e| DomainError::Classifier(format!("Failed to serialize manifest: {}", e)))?;
        std::fs::write(dir.join(MANIFEST_FILE), json).map_err(|e| {
            DomainError::Classifier(format!("Failed to write manifest: {}", e))
        })?;

        tracing::info!("Model saved to {}", dir.display());
        Ok(())
    }
}

impl ClassifierPort for RandomForestAdapter {
    fn fit(&mut self, samples: &[FeatureVector], labels: &[i32]) -> DomainResult<()> {
        if samples.is_empty() || samples.len() != labels.len() {
            return Err(DomainError::Classifier(format!(
                "Invalid training input: {} samples, {} labels",
                samples.len(),
                labels.len()
            )));
        }

        let rows: Vec<Vec<f32>> = samples.iter().map(|s| s.values().to_vec()).collect();
        let samples_mat = Mat::from_slice_2d(&rows)
            .map_err(|e| DomainError::Classifier(format!("Failed to build samples: {:?}", e)))?;

        let label_rows: Vec<Vec<i32>> = labels.iter().map(|&label| vec![label]).collect();
        let labels_mat = Mat::from_slice_2d(&label_rows)
            .map_err(|e| DomainError::Classifier(format!("Failed to build labels: {:?}", e)))?;

        let train_data = ml::TrainData::create(&samples_mat, ml::ROW_SAMPLE, &labels_mat)
            .map_err(|e| DomainError::Classifier(format!("Failed to build train data: {:?}", e)))?;

        self.model
            .train(&train_data, 0)
            .map_err(|e| DomainError::Classifier(format!("Training failed: {:?}", e)))?;

        let mut seen: Vec<i32> = labels.to_vec();
        seen.sort_unstable();
        seen.dedup();
        self.labels_seen = seen;

        Ok(())
    }

    fn predict(&self, sample: &FeatureVector) -> DomainResult<i32> {
        let row = Mat::from_slice(sample.values())
            .map_err(|e| DomainError::Classifier(format!("Failed to build sample: {:?}", e)))?;

        let mut results = Mat::default();
        let prediction = self
            .model
            .predict(&row, &mut results, 0)
            .map_err(|e| DomainError::Classifier(format!("Prediction failed: {:?}", e)))?;

        Ok(prediction.round() as i32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest() -> ModelManifest {
        ModelManifest {
            schema: MODEL_SCHEMA.to_string(),
            feature_len: FEATURE_LEN,
            classifier: "opencv.rtrees".to_string(),
            labels: vec![0, 1, 2],
            forest_file: FOREST_FILE.to_string(),
        }
    }

    #[test]
    fn test_manifest_round_trip() {
        let original = manifest();
        let json = serde_json::to_string(&original).unwrap();
        let restored: ModelManifest = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.schema, MODEL_SCHEMA);
        assert_eq!(restored.feature_len, FEATURE_LEN);
        assert_eq!(restored.labels, vec![0, 1, 2]);
        assert!(restored.validate().is_ok());
    }

    #[test]
    fn test_manifest_rejects_unknown_schema() {
        let mut bad = manifest();
        bad.schema = "somebody-else.model/9".to_string();
        assert!(matches!(bad.validate(), Err(DomainError::Classifier(_))));
    }

    #[test]
    fn test_manifest_rejects_wrong_feature_len() {
        let mut bad = manifest();
        bad.feature_len = 42;
        assert!(matches!(bad.validate(), Err(DomainError::Classifier(_))));
    }

    fn separable_samples() -> (Vec<FeatureVector>, Vec<i32>) {
        // 先頭要素だけでクラスが決まる単純なクラスタ
        let mut samples = Vec::new();
        let mut labels = Vec::new();
        for label in 0..3i32 {
            for jitter in 0..20 {
                let mut values = vec![0.0f32; FEATURE_LEN];
                values[0] = label as f32 + jitter as f32 * 0.001;
                values[1] = label as f32 * 0.5;
                samples.push(FeatureVector::try_from(values).unwrap());
                labels.push(label);
            }
        }
        (samples, labels)
    }

    #[test]
    fn test_fit_and_predict_separable_clusters() {
        let config = TrainingConfig { tree_count: 20, ..TrainingConfig::default() };
        let mut forest = RandomForestAdapter::new(&config).unwrap();

        let (samples, labels) = separable_samples();
        forest.fit(&samples, &labels).unwrap();
        assert_eq!(forest.labels_seen, vec![0, 1, 2]);

        for (sample, &label) in samples.iter().zip(&labels) {
            assert_eq!(forest.predict(sample).unwrap(), label);
        }
    }

    #[test]
    fn test_save_load_round_trip() {
        let config = TrainingConfig { tree_count: 20, ..TrainingConfig::default() };
        let mut forest = RandomForestAdapter::new(&config).unwrap();
        let (samples, labels) = separable_samples();
        forest.fit(&samples, &labels).unwrap();

        let dir = tempfile::tempdir().unwrap();
        forest.save(dir.path()).unwrap();
        assert!(dir.path().join(MANIFEST_FILE).exists());
        assert!(dir.path().join(FOREST_FILE).exists());

        let restored = RandomForestAdapter::load(dir.path()).unwrap();
        assert_eq!(restored.labels_seen, vec![0, 1, 2]);
        for (sample, &label) in samples.iter().zip(&labels) {
            assert_eq!(restored.predict(sample).unwrap(), label);
        }
    }

    #[test]
    fn test_untrained_model_refuses_save() {
        let forest = RandomForestAdapter::new(&TrainingConfig::default()).unwrap();
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            forest.save(dir.path()),
            Err(DomainError::Classifier(_))
        ));
    }

    #[test]
    fn test_fit_rejects_mismatched_input() {
        let mut forest = RandomForestAdapter::new(&TrainingConfig::default()).unwrap();
        let samples = vec![FeatureVector::zeros()];
        assert!(forest.fit(&samples, &[0, 1]).is_err());
        assert!(forest.fit(&[], &[]).is_err());
    }
}
