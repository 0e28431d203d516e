/// データセット永続化
///
/// 特徴量ベクトル列とラベル列のペアをJSONの単一マッピング
/// `{"data": [...], "labels": [...]}`として保存・復元する。
/// 2つの列はインデックス対応であり、この整合性は読み込み時にも検証される。

use crate::domain::{DomainError, DomainResult, FeatureVector};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// ラベル付き特徴量データセット
///
/// 生成後は追記のみ（構築時）で、保存後の変更は行わない。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GestureDataset {
    /// 特徴量ベクトル列（各要素は長さ63）
    data: Vec<FeatureVector>,
    /// ラベル列（dataとインデックス対応）
    labels: Vec<i32>,
}

impl GestureDataset {
    /// 空のデータセットを作成
    pub fn new() -> Self {
        Self::default()
    }

    /// サンプルを1件追加
    pub fn push(&mut self, vector: FeatureVector, label: i32) {
        self.data.push(vector);
        self.labels.push(label);
    }

    /// サンプル数を取得
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// データセットが空かどうか
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// 特徴量ベクトル列への参照
    pub fn vectors(&self) -> &[FeatureVector] {
        &self.data
    }

    /// ラベル列への参照
    pub fn labels(&self) -> &[i32] {
        &self.labels
    }

    /// 2列のインデックス対応を検証
    fn check_integrity(&self) -> DomainResult<()> {
        if self.data.len() != self.labels.len() {
            return Err(DomainError::Dataset(format!(
                "Dataset integrity violation: {} vectors but {} labels",
                self.data.len(),
                self.labels.len()
            )));
        }
        Ok(())
    }

    /// データセットをJSONファイルへ保存
    pub fn save<P: AsRef<Path>>(&self, path: P) -> DomainResult<()> {
        self.check_integrity()?;

        let json = serde_json::to_string(self)
            .map_err(|e| DomainError::Dataset(format!("Failed to serialize dataset: {}", e)))?;

        std::fs::write(path.as_ref(), json).map_err(|e| {
            DomainError::Dataset(format!(
                "Failed to write dataset to {}: {}",
                path.as_ref().display(),
                e
            ))
        })
    }

    /// JSONファイルからデータセットを復元
    ///
    /// 各ベクトルの長さ63はserdeレイヤで、2列の長さ一致はここで検証される。
    pub fn load<P: AsRef<Path>>(path: P) -> DomainResult<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            DomainError::Dataset(format!(
                "Failed to read dataset from {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        let dataset: Self = serde_json::from_str(&content)
            .map_err(|e| DomainError::Dataset(format!("Failed to parse dataset: {}", e)))?;

        dataset.check_integrity()?;
        Ok(dataset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::features::FEATURE_LEN;

    fn vector_with(value: f32) -> FeatureVector {
        FeatureVector::try_from(vec![value; FEATURE_LEN]).unwrap()
    }

    #[test]
    fn test_push_and_len() {
        let mut dataset = GestureDataset::new();
        assert!(dataset.is_empty());

        dataset.push(vector_with(0.1), 0);
        dataset.push(vector_with(0.2), 1);

        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.labels(), &[0, 1]);
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");

        let mut dataset = GestureDataset::new();
        for label in 0..3 {
            dataset.push(vector_with(label as f32 * 0.25), label);
        }
        dataset.save(&path).unwrap();

        let restored = GestureDataset::load(&path).unwrap();

        // 長さとインデックス対応が保たれている
        assert_eq!(restored.len(), dataset.len());
        assert_eq!(restored.labels(), dataset.labels());
        for (original, loaded) in dataset.vectors().iter().zip(restored.vectors()) {
            assert_eq!(original, loaded);
        }
    }

    #[test]
    fn test_load_rejects_mismatched_lengths() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");

        // ベクトル2件に対してラベル1件
        let row: Vec<f32> = vec![0.0; FEATURE_LEN];
        let json = serde_json::json!({ "data": [row.clone(), row], "labels": [0] });
        std::fs::write(&path, json.to_string()).unwrap();

        let result = GestureDataset::load(&path);
        assert!(matches!(result, Err(DomainError::Dataset(_))));
    }

    #[test]
    fn test_load_rejects_wrong_vector_width() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("narrow.json");

        let json = serde_json::json!({ "data": [[0.0, 1.0]], "labels": [0] });
        std::fs::write(&path, json.to_string()).unwrap();

        assert!(GestureDataset::load(&path).is_err());
    }

    #[test]
    fn test_load_missing_file_is_error() {
        let result = GestureDataset::load("/nonexistent/data.json");
        assert!(matches!(result, Err(DomainError::Dataset(_))));
    }

    #[test]
    fn test_persisted_format_has_two_keys() {
        // 永続化フォーマットは{"data", "labels"}の単一マッピング
        let mut dataset = GestureDataset::new();
        dataset.push(vector_with(0.5), 7);

        let json = serde_json::to_value(&dataset).unwrap();
        let object = json.as_object().unwrap();
        assert_eq!(object.len(), 2);
        assert!(object.contains_key("data"));
        assert!(object.contains_key("labels"));
        assert_eq!(object["labels"][0], 7);
    }
}
