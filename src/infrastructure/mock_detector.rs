/// モックランドマーク検出アダプタ
///
/// テスト・開発用のLandmarkPort実装。
/// モデルファイルなしで固定の手（または検出なし）を返す。

use crate::domain::{ports::LandmarkPort, DomainResult, Frame, Hand, Landmark, LANDMARKS_PER_HAND};

/// モックランドマーク検出アダプタ
pub struct MockLandmarkAdapter {
    hands: Vec<Hand>,
}

impl MockLandmarkAdapter {
    /// フレーム中央付近に合成した固定の手を返すモックを作成
    pub fn with_fixed_hand() -> Self {
        let landmarks = (0..LANDMARKS_PER_HAND)
            .map(|i| {
                // 中央(0.5, 0.5)の周りに点を散らす
                let angle = i as f32 / LANDMARKS_PER_HAND as f32 * std::f32::consts::TAU;
                Landmark::new(0.5 + 0.2 * angle.cos(), 0.5 + 0.2 * angle.sin())
            })
            .collect();
        let hand = Hand::from_landmarks(landmarks)
            .unwrap_or_else(|_| unreachable!("fixed mock hand always has 21 landmarks"));
        Self { hands: vec![hand] }
    }

    /// 常に検出なしを返すモックを作成
    #[allow(dead_code)]
    pub fn empty() -> Self {
        Self { hands: Vec::new() }
    }
}

impl LandmarkPort for MockLandmarkAdapter {
    fn detect_hands(&mut self, _frame: &Frame) -> DomainResult<Vec<Hand>> {
        Ok(self.hands.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_hand_is_valid() {
        let mut mock = MockLandmarkAdapter::with_fixed_hand();
        let frame = Frame::new(vec![0u8; 3], 1, 1);
        let hands = mock.detect_hands(&frame).unwrap();
        assert_eq!(hands.len(), 1);
        assert_eq!(hands[0].landmarks().len(), LANDMARKS_PER_HAND);
    }

    #[test]
    fn test_empty_mock_detects_nothing() {
        let mut mock = MockLandmarkAdapter::empty();
        let frame = Frame::new(vec![0u8; 3], 1, 1);
        assert!(mock.detect_hands(&frame).unwrap().is_empty());
    }
}
