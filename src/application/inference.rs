//! ライブ推論エンジン
//!
//! フレーム単位の2状態（手なし/分類済み）を判定するユースケース。
//! フレーム間で持ち越す状態はなく、各フレームで完結する。

use crate::application::stats::{StatKind, StatsCollector};
use crate::domain::{
    features::vectorize,
    ports::{ClassifierPort, LandmarkPort},
    ClassMap, DomainResult, Frame, Hand,
};
use std::time::Instant;

/// 1フレームの判定結果
#[derive(Debug, Clone, PartialEq)]
pub enum FrameOutcome {
    /// 手が検出されなかったフレーム（"no hand"表示へ）
    NoHand,
    /// 手を検出し、ラベルを推定したフレーム
    Classified {
        /// 推定された整数ラベルID
        label: i32,
        /// 表示文字列（ClassMap由来、未知IDは"?"）
        display: String,
        /// 検出された手（オーバーレイ描画用）
        hands: Vec<Hand>,
    },
}

/// ライブ推論エンジン
///
/// 検出器と分類器を注入して構築する。フレームごとに
/// 検出→ベクトル化→推論→ラベル解決を行う。
pub struct InferenceEngine<D, C>
where
    D: LandmarkPort,
    C: ClassifierPort,
{
    detector: D,
    classifier: C,
    class_map: ClassMap,
    stats: StatsCollector,
}

impl<D, C> InferenceEngine<D, C>
where
    D: LandmarkPort,
    C: ClassifierPort,
{
    /// 新しいInferenceEngineを作成
    pub fn new(detector: D, classifier: C, class_map: ClassMap, stats: StatsCollector) -> Self {
        Self {
            detector,
            classifier,
            class_map,
            stats,
        }
    }

    /// 1フレームを処理して判定結果を返す
    ///
    /// 手が検出されない場合は`FrameOutcome::NoHand`（エラーではない）。
    /// 検出・推論の失敗はエラーとして伝播する。
    pub fn process_frame(&mut self, frame: &Frame) -> DomainResult<FrameOutcome> {
        let started = Instant::now();
        self.stats.record_frame();

        let detect_started = Instant::now();
        let hands = self.detector.detect_hands(frame)?;
        self.stats
            .record_duration(StatKind::Detect, detect_started.elapsed());

        if hands.is_empty() {
            self.stats.record_no_hand();
            self.maybe_report();
            return Ok(FrameOutcome::NoHand);
        }

        let classify_started = Instant::now();
        let vector = vectorize(&hands);
        let label = self.classifier.predict(&vector)?;
        self.stats
            .record_duration(StatKind::Classify, classify_started.elapsed());

        let display = self.class_map.display_name(label).to_string();

        self.stats.record_classified();
        self.stats
            .record_duration(StatKind::EndToEnd, started.elapsed());
        self.maybe_report();

        Ok(FrameOutcome::Classified { label, display, hands })
    }

    /// 出力間隔を過ぎていれば統計レポートを出力
    fn maybe_report(&mut self) {
        if self.stats.should_report() {
            self.stats.report_and_reset();
        }
    }

    /// 統計コレクターへの参照を取得
    #[allow(dead_code)]
    pub fn stats(&self) -> &StatsCollector {
        &self.stats
    }
}
