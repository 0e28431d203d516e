/// 特徴量ベクトル化
///
/// 検出された手のランドマーク列を、分類器入力となる固定長63要素の
/// 特徴量ベクトルへ変換する。パイプライン全体で唯一の中核アルゴリズム。
///
/// # 不変条件
/// - 出力長は検出された手の数（0本、1本、2本以上）に関わらず常にちょうど63
/// - 手0本 → 全要素0.0
/// - 手1本 → 先頭42要素が検出順の(x, y)インターリーブ、残り21要素が0.0
/// - 手2本以上 → 63要素に達した時点で打ち切り（先頭の手が優先）

use crate::domain::{DomainError, Hand};
use serde::{Deserialize, Serialize};

/// 特徴量ベクトルの固定長（分類器の入力次元）
pub const FEATURE_LEN: usize = 63;

/// 固定長63の特徴量ベクトル
///
/// 長さ不変条件は型で強制される：構築は`vectorize`または
/// 検査付きの`TryFrom<Vec<f32>>`経由のみで、デシリアライズ時も
/// 長さ63以外は拒否される。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f32>", into = "Vec<f32>")]
pub struct FeatureVector(Vec<f32>);

impl FeatureVector {
    /// 全要素0.0のベクトルを作成（手が検出されなかったフレーム用）
    pub fn zeros() -> Self {
        Self(vec![0.0; FEATURE_LEN])
    }

    /// 値列への参照を取得（常に長さ63）
    pub fn values(&self) -> &[f32] {
        &self.0
    }

    /// 長さを取得（常に63）
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// 空かどうか（常にfalse、Clippy対応）
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl TryFrom<Vec<f32>> for FeatureVector {
    type Error = DomainError;

    fn try_from(values: Vec<f32>) -> Result<Self, Self::Error> {
        if values.len() != FEATURE_LEN {
            return Err(DomainError::Dataset(format!(
                "Feature vector must have length {}, got {}",
                FEATURE_LEN,
                values.len()
            )));
        }
        Ok(Self(values))
    }
}

impl From<FeatureVector> for Vec<f32> {
    fn from(vector: FeatureVector) -> Self {
        vector.0
    }
}

/// 検出された手の列を固定長の特徴量ベクトルへ変換
///
/// 検出順に各手の21ランドマークを(x, y)の順でフラット化し、
/// 63要素に満たない場合は0.0で右詰めパディングする。
/// 63要素を超える値（2本目の手の後半）は切り捨てる。
///
/// 純粋関数であり、失敗しない。
pub fn vectorize(hands: &[Hand]) -> FeatureVector {
    let mut values = Vec::with_capacity(FEATURE_LEN);

    'fill: for hand in hands {
        for landmark in hand.landmarks() {
            if values.len() >= FEATURE_LEN {
                break 'fill;
            }
            values.push(landmark.x);
            if values.len() >= FEATURE_LEN {
                break 'fill;
            }
            values.push(landmark.y);
        }
    }

    values.resize(FEATURE_LEN, 0.0);

    FeatureVector(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Landmark, LANDMARKS_PER_HAND};

    /// (0.1, 0.2), (0.3, 0.4), ... と連番で埋めた手を作る
    fn sequential_hand(offset: f32) -> Hand {
        let landmarks = (0..LANDMARKS_PER_HAND)
            .map(|i| Landmark::new(offset + i as f32 * 0.02 + 0.01, offset + i as f32 * 0.02 + 0.02))
            .collect();
        Hand::from_landmarks(landmarks).unwrap()
    }

    #[test]
    fn test_no_hands_yields_all_zeros() {
        let vector = vectorize(&[]);
        assert_eq!(vector.len(), FEATURE_LEN);
        assert!(vector.values().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_single_hand_layout() {
        let hand = sequential_hand(0.0);
        let vector = vectorize(&[hand.clone()]);

        assert_eq!(vector.len(), FEATURE_LEN);

        // 先頭42要素は(x, y)インターリーブ
        for (i, landmark) in hand.landmarks().iter().enumerate() {
            assert_eq!(vector.values()[2 * i], landmark.x);
            assert_eq!(vector.values()[2 * i + 1], landmark.y);
        }

        // 残り21要素はゼロパディング
        assert!(vector.values()[42..].iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_literal_sequence_layout() {
        // (0.1, 0.2), (0.3, 0.4), ... の21ペア → 先頭42要素がそのまま並び、末尾21要素が0
        let landmarks: Vec<Landmark> = (0..LANDMARKS_PER_HAND)
            .map(|i| Landmark::new(0.1 + i as f32 * 0.2, 0.2 + i as f32 * 0.2))
            .collect();
        let hand = Hand::from_landmarks(landmarks).unwrap();

        let vector = vectorize(&[hand]);
        assert_eq!(vector.values()[0], 0.1);
        assert_eq!(vector.values()[1], 0.2);
        assert_eq!(vector.values()[2], 0.3);
        assert_eq!(vector.values()[3], 0.4);
        assert_eq!(&vector.values()[42..], &[0.0; 21]);
    }

    #[test]
    fn test_vectorize_is_idempotent() {
        let hands = vec![sequential_hand(0.1)];
        let first = vectorize(&hands);
        let second = vectorize(&hands);
        assert_eq!(first, second);
    }

    #[test]
    fn test_two_hands_truncated_to_capacity() {
        // 2本の手 = 84値だが、出力は63で打ち切られる
        let first = sequential_hand(0.0);
        let second = sequential_hand(0.5);
        let vector = vectorize(&[first.clone(), second.clone()]);

        assert_eq!(vector.len(), FEATURE_LEN);

        // 1本目は完全に含まれる
        for (i, landmark) in first.landmarks().iter().enumerate() {
            assert_eq!(vector.values()[2 * i], landmark.x);
            assert_eq!(vector.values()[2 * i + 1], landmark.y);
        }

        // 2本目は残り21要素分のみ（ランドマーク10個 + x座標1つ）
        assert_eq!(vector.values()[42], second.landmarks()[0].x);
        assert_eq!(vector.values()[43], second.landmarks()[0].y);
        assert_eq!(vector.values()[62], second.landmarks()[10].x);
    }

    #[test]
    fn test_feature_vector_try_from_rejects_wrong_length() {
        assert!(FeatureVector::try_from(vec![0.0; 63]).is_ok());
        assert!(FeatureVector::try_from(vec![0.0; 62]).is_err());
        assert!(FeatureVector::try_from(vec![0.0; 64]).is_err());
        assert!(FeatureVector::try_from(Vec::new()).is_err());
    }

    #[test]
    fn test_feature_vector_serde_enforces_length() {
        // 長さ63はデシリアライズ成功
        let json = serde_json::to_string(&FeatureVector::zeros()).unwrap();
        let restored: FeatureVector = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.len(), FEATURE_LEN);

        // 長さ不一致はserdeレイヤで拒否される
        let bad = serde_json::to_string(&vec![0.0f32; 10]).unwrap();
        assert!(serde_json::from_str::<FeatureVector>(&bad).is_err());
    }

    #[test]
    fn test_zeros_constructor() {
        let vector = FeatureVector::zeros();
        assert_eq!(vector.len(), FEATURE_LEN);
        assert!(!vector.is_empty());
        assert!(vector.values().iter().all(|&v| v == 0.0));
    }
}
