//! 検出アダプタのセレクタ（実行時選択用）
//!
//! 実行時に設定で検出バックエンドを選択するための列挙型。
//! vtableのオーバーヘッドを避けるため、trait objectではなくenumでディスパッチ。

use crate::domain::{
    config::{DetectorBackend, DetectorConfig},
    ports::LandmarkPort,
    DomainResult, Frame, Hand,
};
use crate::infrastructure::{hand_landmarks::TractLandmarkAdapter, mock_detector::MockLandmarkAdapter};

/// 検出アダプタの選択
pub enum DetectorSelector {
    /// tract-onnxによるONNXモデル推論
    Tract(TractLandmarkAdapter),
    /// 固定応答モック（モデルファイルなしでの開発用）
    Mock(MockLandmarkAdapter),
}

impl DetectorSelector {
    /// 設定から検出アダプタを構築
    pub fn from_config(config: &DetectorConfig) -> DomainResult<Self> {
        match config.backend {
            DetectorBackend::Tract => {
                Ok(Self::Tract(TractLandmarkAdapter::load(config)?))
            }
            DetectorBackend::Mock => {
                tracing::warn!("Using mock landmark detector (no model will be loaded)");
                Ok(Self::Mock(MockLandmarkAdapter::with_fixed_hand()))
            }
        }
    }
}

impl LandmarkPort for DetectorSelector {
    fn detect_hands(&mut self, frame: &Frame) -> DomainResult<Vec<Hand>> {
        match self {
            Self::Tract(adapter) => adapter.detect_hands(frame),
            Self::Mock(adapter) => adapter.detect_hands(frame),
        }
    }
}
