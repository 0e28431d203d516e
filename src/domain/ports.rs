/// Port定義（Clean Architectureのインターフェース）
///
/// Domain層が外部実装に依存するための抽象trait。
/// Infrastructure層がこれらを実装し、各バイナリがDIで注入する。
/// プロセス全体で共有するシングルトンは置かず、所有権を持つアダプタを
/// 必要とするステージへ明示的に渡す。

use crate::domain::{DomainResult, FeatureVector, Frame, Hand};
use std::path::Path;

/// カメラポート: フレーム取得を抽象化
pub trait CameraPort {
    /// 1フレームをキャプチャする（ブロッキング）
    ///
    /// # Returns
    /// - `Ok(Frame)`: フレームの取得成功
    /// - `Err(DomainError::Camera)`: フレーム取得失敗（そのランは終了、リトライしない）
    fn read_frame(&mut self) -> DomainResult<Frame>;

    /// カメラデバイスの情報を取得
    fn camera_info(&self) -> CameraInfo;
}

/// カメラデバイス情報
#[derive(Debug, Clone)]
pub struct CameraInfo {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub name: String,
}

/// ランドマーク検出ポート: 手のランドマーク検出を抽象化
///
/// フレーム中の手を0個以上検出する。各手はちょうど21ランドマーク。
/// 検出なしはエラーではなく空のVecで表現する。
pub trait LandmarkPort {
    fn detect_hands(&mut self, frame: &Frame) -> DomainResult<Vec<Hand>>;
}

/// 分類器ポート: fit/predict能力を抽象化
///
/// アルゴリズムの選択は外部関心事であり、Domain層はこの
/// 不透明なインターフェースのみを消費する。
pub trait ClassifierPort {
    /// 特徴量ベクトル列とラベル列から分類器を学習する
    ///
    /// `samples`と`labels`は同じ長さ・同じ順序対応であること。
    fn fit(&mut self, samples: &[FeatureVector], labels: &[i32]) -> DomainResult<()>;

    /// 1つの特徴量ベクトルに対するラベルを推定する
    fn predict(&self, sample: &FeatureVector) -> DomainResult<i32>;
}

/// 画像読み込みポート: ファイルからのフレーム復元を抽象化
///
/// データセット構築時に使用。デコード失敗はDataset エラー。
pub trait ImageReaderPort {
    fn read_image(&mut self, path: &Path) -> DomainResult<Frame>;
}
