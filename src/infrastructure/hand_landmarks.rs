/// ハンドランドマーク検出アダプタ
///
/// tract-onnxを使用してMediaPipe Hand Landmark形式のONNXモデルを
/// CPU推論するLandmarkPort実装。
///
/// # モデル契約
/// - 入力: NCHW `1x3x224x224`、RGB、[0,1]の線形スケール
/// - 出力0: screen landmarks `1x63`（入力ピクセル座標のx, y, z × 21点）
/// - 出力1: presenceスコア `1x1`（[0,1]、閾値未満の検出は破棄）
///
/// 単一の手を推定するネットワークのため、1フレームあたりの検出は0本か1本。

use crate::domain::{
    config::DetectorConfig,
    ports::LandmarkPort,
    DomainError, DomainResult, Frame, Hand, Landmark, LANDMARKS_PER_HAND,
};
use crate::infrastructure::convert::frame_to_mat;
use opencv::{core::Size, imgproc, prelude::*};
use tract_onnx::prelude::*;

/// ネットワーク入力の一辺（ピクセル）
const INPUT_SIZE: usize = 224;

/// tract-onnxによるランドマーク検出アダプタ
pub struct TractLandmarkAdapter {
    plan: TypedSimplePlan<TypedModel>,
    min_confidence: f32,
}

impl TractLandmarkAdapter {
    /// ONNXモデルを読み込んでアダプタを作成
    ///
    /// # Returns
    /// - `Ok(Self)`: モデル読み込み・最適化成功
    /// - `Err(DomainError::Initialization)`: モデルが読めない/最適化できない場合
    pub fn load(config: &DetectorConfig) -> DomainResult<Self> {
        let plan = tract_onnx::onnx()
            .model_for_path(&config.model_path)
            .map_err(|e| {
                DomainError::Initialization(format!(
                    "Failed to read ONNX model {}: {:?}",
                    config.model_path, e
                ))
            })?
            .with_input_fact(
                0,
                InferenceFact::dt_shape(
                    f32::datum_type(),
                    tvec!(1, 3, INPUT_SIZE, INPUT_SIZE),
                ),
            )
            .map_err(|e| {
                DomainError::Initialization(format!("Failed to set input fact: {:?}", e))
            })?
            .into_optimized()
            .map_err(|e| {
                DomainError::Initialization(format!("Failed to optimize model: {:?}", e))
            })?
            .into_runnable()
            .map_err(|e| {
                DomainError::Initialization(format!("Failed to make model runnable: {:?}", e))
            })?;

        tracing::info!(
            "Hand landmark model loaded: {} (min_confidence={})",
            config.model_path,
            config.min_detection_confidence
        );

        Ok(Self {
            plan,
            min_confidence: config.min_detection_confidence,
        })
    }

    /// フレームをネットワーク入力テンソルへ変換
    ///
    /// BGRの任意サイズフレームを224x224へリサイズし、RGB順・[0,1]で
    /// NCHWテンソルに詰める。
    fn preprocess(&self, frame: &Frame) -> DomainResult<Tensor> {
        let mat = frame_to_mat(frame).map_err(|e| DomainError::Detection(e.to_string()))?;

        let mut resized = opencv::core::Mat::default();
        imgproc::resize(
            &mat,
            &mut resized,
            Size::new(INPUT_SIZE as i32, INPUT_SIZE as i32),
            0.0,
            0.0,
            imgproc::INTER_LINEAR,
        )
        .map_err(|e| DomainError::Detection(format!("Failed to resize input: {:?}", e)))?;

        let bytes = resized
            .data_bytes()
            .map_err(|e| DomainError::Detection(format!("Failed to read input bytes: {:?}", e)))?;

        // BGR→RGB入れ替えしつつNCHWへ
        let input = tract_ndarray::Array4::from_shape_fn(
            (1, 3, INPUT_SIZE, INPUT_SIZE),
            |(_, channel, y, x)| {
                bytes[(y * INPUT_SIZE + x) * 3 + (2 - channel)] as f32 / 255.0
            },
        );

        Ok(input.into())
    }
}

impl LandmarkPort for TractLandmarkAdapter {
    fn detect_hands(&mut self, frame: &Frame) -> DomainResult<Vec<Hand>> {
        let input = self.preprocess(frame)?;

        let outputs = self
            .plan
            .run(tvec!(input.into()))
            .map_err(|e| DomainError::Detection(format!("Inference failed: {:?}", e)))?;

        if outputs.len() < 2 {
            return Err(DomainError::Detection(format!(
                "Unexpected model output count: {}",
                outputs.len()
            )));
        }

        let presence = outputs[1]
            .as_slice::<f32>()
            .map_err(|e| DomainError::Detection(format!("Bad presence output: {:?}", e)))?
            .first()
            .copied()
            .unwrap_or(0.0);

        if presence < self.min_confidence {
            return Ok(Vec::new());
        }

        let coords = outputs[0]
            .as_slice::<f32>()
            .map_err(|e| DomainError::Detection(format!("Bad landmark output: {:?}", e)))?;
        if coords.len() < LANDMARKS_PER_HAND * 3 {
            return Err(DomainError::Detection(format!(
                "Unexpected landmark output length: {}",
                coords.len()
            )));
        }

        // 入力ピクセル座標を[0,1]へ正規化（zは使用しない）
        let landmarks = coords
            .chunks_exact(3)
            .take(LANDMARKS_PER_HAND)
            .map(|xyz| Landmark::new(xyz[0] / INPUT_SIZE as f32, xyz[1] / INPUT_SIZE as f32))
            .collect();

        Ok(vec![Hand::from_landmarks(landmarks)?])
    }
}
