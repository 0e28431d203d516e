/// コア型定義
///
/// Domain層の中心となるデータ構造。
/// すべての処理で共有される不変の型。

use std::collections::BTreeMap;
use std::time::Instant;

/// 1つの手あたりのランドマーク数（MediaPipe準拠の固定トポロジー）
pub const LANDMARKS_PER_HAND: usize = 21;

/// 検出された手の2Dキーポイント
///
/// 座標は画像サイズに対して[0,1]に正規化された値。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
}

impl Landmark {
    /// 新しいランドマークを作成
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// 検出された1つの手（21ランドマークの固定トポロジー）
///
/// 順序は手首→親指(CMC/MCP/IP/先端)→人差し指〜小指(MCP/PIP/DIP/先端)。
/// 長さ21以外のシーケンスからは構築できない。
#[derive(Debug, Clone, PartialEq)]
pub struct Hand {
    landmarks: [Landmark; LANDMARKS_PER_HAND],
}

impl Hand {
    /// ランドマーク列からHandを構築
    ///
    /// # Returns
    /// - `Ok(Hand)`: ちょうど21個のランドマークが渡された場合
    /// - `Err(DomainError::Detection)`: 長さが21以外の場合
    pub fn from_landmarks(landmarks: Vec<Landmark>) -> crate::domain::DomainResult<Self> {
        let count = landmarks.len();
        let landmarks: [Landmark; LANDMARKS_PER_HAND] = landmarks.try_into().map_err(|_| {
            crate::domain::DomainError::Detection(format!(
                "Expected {} landmarks per hand, got {}",
                LANDMARKS_PER_HAND, count
            ))
        })?;
        Ok(Self { landmarks })
    }

    /// ランドマーク列への参照を取得（常に長さ21）
    pub fn landmarks(&self) -> &[Landmark] {
        &self.landmarks
    }
}

/// ピクセル座標で指定される矩形領域（ズーム切り出し等に使用）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Roi {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Roi {
    /// 新しいRoiを作成
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// 面積を取得
    #[allow(dead_code)]
    pub fn area(&self) -> u32 {
        self.width * self.height
    }
}

/// キャプチャ/読み込みされたフレームデータ
#[derive(Debug, Clone)]
pub struct Frame {
    /// フレーム取得時刻
    pub timestamp: Instant,
    /// フレーム画像データ（BGR形式、連続メモリ）
    pub data: Vec<u8>,
    /// 画像の幅
    pub width: u32,
    /// 画像の高さ
    pub height: u32,
}

impl Frame {
    /// 新しいフレームを作成
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            timestamp: Instant::now(),
            data,
            width,
            height,
        }
    }
}

/// ラベルID→表示文字列のマッピング
///
/// データセットからは導出されず、設定ファイルで与えられる。
/// 未知のIDは"?"として表示する。
#[derive(Debug, Clone, Default)]
pub struct ClassMap {
    entries: BTreeMap<i32, String>,
}

impl ClassMap {
    /// 未知ラベルの表示文字列
    pub const UNKNOWN: &'static str = "?";

    /// (id, name)ペアの列からClassMapを構築
    pub fn new(entries: impl IntoIterator<Item = (i32, String)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// ラベルIDに対応する表示文字列を取得
    pub fn display_name(&self, label: i32) -> &str {
        self.entries
            .get(&label)
            .map(String::as_str)
            .unwrap_or(Self::UNKNOWN)
    }

    /// 登録済みラベル数を取得
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// マッピングが空かどうか
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 登録済みラベルIDの一覧を取得（昇順）
    pub fn label_ids(&self) -> impl Iterator<Item = i32> + '_ {
        self.entries.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn landmarks(n: usize) -> Vec<Landmark> {
        (0..n).map(|i| Landmark::new(i as f32 * 0.01, i as f32 * 0.02)).collect()
    }

    #[test]
    fn test_hand_requires_exactly_21_landmarks() {
        assert!(Hand::from_landmarks(landmarks(21)).is_ok());
        assert!(Hand::from_landmarks(landmarks(20)).is_err());
        assert!(Hand::from_landmarks(landmarks(22)).is_err());
        assert!(Hand::from_landmarks(landmarks(0)).is_err());
    }

    #[test]
    fn test_hand_preserves_landmark_order() {
        let hand = Hand::from_landmarks(landmarks(21)).unwrap();
        assert_eq!(hand.landmarks().len(), 21);
        assert_eq!(hand.landmarks()[3].x, 0.03);
        assert_eq!(hand.landmarks()[3].y, 0.06);
    }

    #[test]
    fn test_roi_area() {
        let roi = Roi::new(0, 0, 320, 240);
        assert_eq!(roi.area(), 76800);
    }

    #[test]
    fn test_class_map_lookup() {
        let map = ClassMap::new([(0, "A".to_string()), (1, "B".to_string()), (2, "L".to_string())]);
        assert_eq!(map.display_name(0), "A");
        assert_eq!(map.display_name(2), "L");
        // 未知IDは"?"にフォールバック
        assert_eq!(map.display_name(99), "?");
        assert_eq!(map.len(), 3);
    }

    #[test]
    fn test_class_map_label_ids_sorted() {
        let map = ClassMap::new([(2, "L".to_string()), (0, "A".to_string()), (1, "B".to_string())]);
        let ids: Vec<i32> = map.label_ids().collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn test_frame_creation() {
        let frame = Frame::new(vec![0u8; 640 * 480 * 3], 640, 480);
        assert_eq!(frame.width, 640);
        assert_eq!(frame.height, 480);
        assert_eq!(frame.data.len(), 640 * 480 * 3);
    }
}
