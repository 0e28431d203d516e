/// エラー型定義
///
/// Domain層の統一エラー型。thiserrorを使用して型安全なエラー処理を提供します。
///
/// # 設計方針
/// - unwrap()の使用を禁止し、明示的なエラーハンドリングを強制
/// - Result型でエラー伝播を明示化
/// - リトライは行わない（失敗は「ログして継続」か「ログして停止」のどちらか）

use thiserror::Error;

/// Domain層の統一エラー型
#[derive(Error, Debug)]
pub enum DomainError {
    /// カメラ関連のエラー（フレーム取得失敗等）
    #[error("Camera error: {0}")]
    Camera(String),

    /// ランドマーク検出関連のエラー
    #[error("Detection error: {0}")]
    Detection(String),

    /// 分類器関連のエラー（学習・推論・モデル入出力）
    #[error("Classifier error: {0}")]
    Classifier(String),

    /// データセット関連のエラー（構築・永続化・整合性）
    #[error("Dataset error: {0}")]
    Dataset(String),

    /// 設定関連のエラー
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// 初期化エラー（カメラオープン失敗、モデル読み込み失敗等、起動中断）
    #[error("Initialization failed: {0}")]
    Initialization(String),

    /// 表示関連のエラー（ウィンドウ・オーバーレイ描画）
    #[error("Display error: {0}")]
    Display(String),
}

/// Domain層の統一Result型
pub type DomainResult<T> = Result<T, DomainError>;
