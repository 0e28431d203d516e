//! データセット構築モジュール
//!
//! ラベル別画像フォルダを走査し、ランドマーク検出→特徴量ベクトル化を
//! 行って`GestureDataset`を構築するユースケース。
//!
//! ## フォルダレイアウト
//! `root/<ラベルID:整数>/<画像ファイル...>`
//! 走査順はファイルシステムの列挙順（OS依存）であり、ソートはしない。

use crate::domain::{
    features::vectorize,
    ports::{ImageReaderPort, LandmarkPort},
    DomainError, DomainResult, GestureDataset,
};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// 構築結果レポート
///
/// 手が検出されなかった画像は「黙って捨てる」のではなく、
/// ラベル別に数えてここへ記録する（データセット偏りのデバッグ用）。
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    /// ラベルごとの採用サンプル数
    pub samples_per_label: BTreeMap<i32, u32>,
    /// ラベルごとの手未検出スキップ数
    pub skipped_per_label: BTreeMap<i32, u32>,
    /// ラベルごとのデコード失敗数
    pub decode_failures_per_label: BTreeMap<i32, u32>,
    /// 整数ラベルとして解釈できず無視したエントリ
    pub ignored_entries: Vec<PathBuf>,
}

impl BuildReport {
    /// 採用サンプルの総数
    pub fn total_samples(&self) -> u32 {
        self.samples_per_label.values().sum()
    }

    /// 手未検出スキップの総数
    pub fn total_skipped(&self) -> u32 {
        self.skipped_per_label.values().sum()
    }

    /// レポート内容をログに出力
    pub fn log_summary(&self) {
        info!(
            "Dataset build finished: {} samples, {} skipped (no hand), {} ignored entries",
            self.total_samples(),
            self.total_skipped(),
            self.ignored_entries.len()
        );
        for (label, count) in &self.samples_per_label {
            let skipped = self.skipped_per_label.get(label).copied().unwrap_or(0);
            let failed = self
                .decode_failures_per_label
                .get(label)
                .copied()
                .unwrap_or(0);
            if skipped > 0 || failed > 0 {
                warn!(
                    "Label {}: {} samples, {} images without a detectable hand, {} decode failures",
                    label, count, skipped, failed
                );
            } else {
                info!("Label {}: {} samples", label, count);
            }
        }
    }
}

/// データセットビルダー
///
/// 画像読み込みと検出をポート経由で注入する。
pub struct DatasetBuilder<R, D>
where
    R: ImageReaderPort,
    D: LandmarkPort,
{
    reader: R,
    detector: D,
}

impl<R, D> DatasetBuilder<R, D>
where
    R: ImageReaderPort,
    D: LandmarkPort,
{
    /// 新しいDatasetBuilderを作成
    pub fn new(reader: R, detector: D) -> Self {
        Self { reader, detector }
    }

    /// ルートディレクトリ以下を走査してデータセットを構築
    ///
    /// # Returns
    /// - `Ok((dataset, report))`: 構築されたデータセットとレポート
    /// - `Err(DomainError::Dataset)`: ルート走査不能、または検出器の致命的エラー
    pub fn build(&mut self, root: &Path) -> DomainResult<(GestureDataset, BuildReport)> {
        let mut dataset = GestureDataset::new();
        let mut report = BuildReport::default();

        let entries = std::fs::read_dir(root).map_err(|e| {
            DomainError::Dataset(format!("Failed to read dataset root {}: {}", root.display(), e))
        })?;

        for entry in entries {
            let entry = entry.map_err(|e| {
                DomainError::Dataset(format!("Failed to enumerate dataset root: {}", e))
            })?;
            let path = entry.path();

            if !path.is_dir() {
                warn!("Ignoring non-directory entry {}", path.display());
                report.ignored_entries.push(path);
                continue;
            }

            // フォルダ名を整数ラベルIDとして解釈
            let label: i32 = match path.file_name().and_then(|n| n.to_str()).and_then(|n| n.parse().ok()) {
                Some(label) => label,
                None => {
                    warn!("Ignoring directory with non-integer name {}", path.display());
                    report.ignored_entries.push(path);
                    continue;
                }
            };

            self.process_label_dir(&path, label, &mut dataset, &mut report)?;
        }

        report.log_summary();
        Ok((dataset, report))
    }

    /// 1ラベル分のフォルダを処理
    fn process_label_dir(
        &mut self,
        dir: &Path,
        label: i32,
        dataset: &mut GestureDataset,
        report: &mut BuildReport,
    ) -> DomainResult<()> {
        report.samples_per_label.entry(label).or_insert(0);

        let entries = std::fs::read_dir(dir).map_err(|e| {
            DomainError::Dataset(format!("Failed to read label directory {}: {}", dir.display(), e))
        })?;

        for entry in entries {
            let entry = entry.map_err(|e| {
                DomainError::Dataset(format!("Failed to enumerate {}: {}", dir.display(), e))
            })?;
            let image_path = entry.path();
            if image_path.is_dir() {
                continue;
            }

            // デコード失敗はこの画像を飛ばして継続（カウントは残す）
            let frame = match self.reader.read_image(&image_path) {
                Ok(frame) => frame,
                Err(e) => {
                    warn!("Failed to decode {}: {}", image_path.display(), e);
                    *report.decode_failures_per_label.entry(label).or_insert(0) += 1;
                    continue;
                }
            };

            let hands = self.detector.detect_hands(&frame)?;
            if hands.is_empty() {
                // 手が検出されない画像はサンプルを生まない（ただし数える）
                debug!("No hand detected in {}", image_path.display());
                *report.skipped_per_label.entry(label).or_insert(0) += 1;
                continue;
            }

            dataset.push(vectorize(&hands), label);
            *report.samples_per_label.entry(label).or_insert(0) += 1;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Frame, Hand, Landmark, LANDMARKS_PER_HAND};

    /// ファイル内容をそのままフレームデータとして返すモックリーダー
    struct ContentReader;

    impl ImageReaderPort for ContentReader {
        fn read_image(&mut self, path: &Path) -> DomainResult<Frame> {
            let data = std::fs::read(path)
                .map_err(|e| DomainError::Dataset(format!("read failed: {}", e)))?;
            if data == b"corrupt" {
                return Err(DomainError::Dataset("decode failed".to_string()));
            }
            Ok(Frame::new(data, 1, 1))
        }
    }

    /// フレームデータが b"hand" のときだけ手を返すモック検出器
    struct ContentDetector;

    impl LandmarkPort for ContentDetector {
        fn detect_hands(&mut self, frame: &Frame) -> DomainResult<Vec<Hand>> {
            if frame.data == b"hand" {
                let landmarks = (0..LANDMARKS_PER_HAND)
                    .map(|i| Landmark::new(i as f32 * 0.01, i as f32 * 0.02))
                    .collect();
                Ok(vec![Hand::from_landmarks(landmarks).unwrap()])
            } else {
                Ok(vec![])
            }
        }
    }

    fn write_images(dir: &Path, label: u32, contents: &[&[u8]]) {
        let label_dir = dir.join(label.to_string());
        std::fs::create_dir_all(&label_dir).unwrap();
        for (index, content) in contents.iter().enumerate() {
            std::fs::write(label_dir.join(format!("{}.jpg", index)), content).unwrap();
        }
    }

    #[test]
    fn test_build_counts_samples_per_label() {
        // ラベル0,1,2それぞれN枚、すべて手が検出可能 → ラベルごとにNサンプル
        let root = tempfile::tempdir().unwrap();
        for label in 0..3 {
            write_images(root.path(), label, &[b"hand", b"hand", b"hand", b"hand"]);
        }

        let mut builder = DatasetBuilder::new(ContentReader, ContentDetector);
        let (dataset, report) = builder.build(root.path()).unwrap();

        assert_eq!(dataset.len(), 12);
        for label in 0..3 {
            assert_eq!(report.samples_per_label[&label], 4);
        }
        // ラベル列が対応している
        for label in 0..3 {
            assert_eq!(
                dataset.labels().iter().filter(|&&l| l == label).count(),
                4
            );
        }
    }

    #[test]
    fn test_zero_hand_images_are_counted_not_sampled() {
        let root = tempfile::tempdir().unwrap();
        write_images(root.path(), 0, &[b"hand", b"empty", b"empty"]);

        let mut builder = DatasetBuilder::new(ContentReader, ContentDetector);
        let (dataset, report) = builder.build(root.path()).unwrap();

        assert_eq!(dataset.len(), 1);
        assert_eq!(report.samples_per_label[&0], 1);
        assert_eq!(report.skipped_per_label[&0], 2);
        assert_eq!(report.total_skipped(), 2);
    }

    #[test]
    fn test_decode_failures_are_counted_and_skipped() {
        let root = tempfile::tempdir().unwrap();
        write_images(root.path(), 1, &[b"hand", b"corrupt"]);

        let mut builder = DatasetBuilder::new(ContentReader, ContentDetector);
        let (dataset, report) = builder.build(root.path()).unwrap();

        assert_eq!(dataset.len(), 1);
        assert_eq!(report.decode_failures_per_label[&1], 1);
    }

    #[test]
    fn test_non_integer_directories_are_ignored() {
        let root = tempfile::tempdir().unwrap();
        write_images(root.path(), 0, &[b"hand"]);
        std::fs::create_dir(root.path().join("not_a_label")).unwrap();
        std::fs::write(root.path().join("stray.txt"), b"x").unwrap();

        let mut builder = DatasetBuilder::new(ContentReader, ContentDetector);
        let (dataset, report) = builder.build(root.path()).unwrap();

        assert_eq!(dataset.len(), 1);
        assert_eq!(report.ignored_entries.len(), 2);
    }

    #[test]
    fn test_missing_root_is_error() {
        let mut builder = DatasetBuilder::new(ContentReader, ContentDetector);
        let result = builder.build(Path::new("/nonexistent/dataset"));
        assert!(matches!(result, Err(DomainError::Dataset(_))));
    }

    #[test]
    fn test_samples_round_trip_through_persistence() {
        // 構築→保存→復元でインデックス対応が保たれる
        let root = tempfile::tempdir().unwrap();
        write_images(root.path(), 0, &[b"hand"]);
        write_images(root.path(), 5, &[b"hand", b"hand"]);

        let mut builder = DatasetBuilder::new(ContentReader, ContentDetector);
        let (dataset, _) = builder.build(root.path()).unwrap();

        let out = root.path().join("data.json");
        dataset.save(&out).unwrap();
        let restored = GestureDataset::load(&out).unwrap();

        assert_eq!(restored.len(), dataset.len());
        assert_eq!(restored.labels(), dataset.labels());
    }
}
