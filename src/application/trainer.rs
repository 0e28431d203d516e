//! 学習・評価モジュール
//!
//! 永続化されたデータセットを分割し、分類器ポート越しに学習と
//! 精度評価を行うユースケース。分類アルゴリズム自体は外部関心事。

use crate::domain::{config::TrainingConfig, ports::ClassifierPort, DomainError, DomainResult, GestureDataset};
use tracing::info;

/// 学習結果レポート
#[derive(Debug, Clone)]
pub struct TrainingReport {
    /// テスト分割に対する正解率 [0.0-1.0]
    pub accuracy: f64,
    /// 学習サンプル数
    pub train_size: usize,
    /// テストサンプル数
    pub test_size: usize,
}

/// インデックス列をシャッフルして学習/テストに分割
///
/// シードを固定すれば分割は再現可能。テスト側は最低1件、
/// 学習側にも最低1件残るようにクランプする。
pub fn train_test_split(len: usize, test_ratio: f64, seed: u64) -> (Vec<usize>, Vec<usize>) {
    let mut indices: Vec<usize> = (0..len).collect();
    if len < 2 {
        return (indices, Vec::new());
    }
    let mut rng = fastrand::Rng::with_seed(seed);
    rng.shuffle(&mut indices);

    let test_size = ((len as f64 * test_ratio).round() as usize).clamp(1, len.saturating_sub(1));
    let test = indices[..test_size].to_vec();
    let train = indices[test_size..].to_vec();
    (train, test)
}

/// データセットを分割し、学習して正解率を評価する
///
/// 学習分割でfitした分類器がそのまま永続化対象となる
/// （評価後の再学習は行わない）。
pub fn train_and_evaluate<C: ClassifierPort>(
    classifier: &mut C,
    dataset: &GestureDataset,
    config: &TrainingConfig,
) -> DomainResult<TrainingReport> {
    if dataset.len() < 2 {
        return Err(DomainError::Classifier(format!(
            "Dataset too small to split: {} samples",
            dataset.len()
        )));
    }

    let (train_indices, test_indices) =
        train_test_split(dataset.len(), config.test_ratio, config.seed);

    info!(
        "Training split: {} train / {} test (ratio={}, seed={})",
        train_indices.len(),
        test_indices.len(),
        config.test_ratio,
        config.seed
    );

    let train_vectors: Vec<_> = train_indices
        .iter()
        .map(|&i| dataset.vectors()[i].clone())
        .collect();
    let train_labels: Vec<_> = train_indices.iter().map(|&i| dataset.labels()[i]).collect();

    classifier.fit(&train_vectors, &train_labels)?;

    // ホールドアウト分割で正解率を評価
    let mut correct = 0usize;
    for &index in &test_indices {
        let predicted = classifier.predict(&dataset.vectors()[index])?;
        if predicted == dataset.labels()[index] {
            correct += 1;
        }
    }

    let accuracy = correct as f64 / test_indices.len() as f64;
    info!(
        "Evaluation: {}/{} correct ({:.2}%)",
        correct,
        test_indices.len(),
        accuracy * 100.0
    );

    Ok(TrainingReport {
        accuracy,
        train_size: train_indices.len(),
        test_size: test_indices.len(),
    })
}
