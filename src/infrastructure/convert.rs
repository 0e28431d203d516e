//! Frame⇔Mat変換の共通ユーティリティ
//!
//! Domain層の`Frame`（BGR連続メモリ）とOpenCVの`Mat`を相互変換する。
//! カメラ・画像読み込み・表示の各アダプタで共用。

use crate::domain::{DomainError, DomainResult, Frame};
use opencv::{
    core::{self, Mat},
    prelude::*,
};

/// FrameからBGR形式のMatを作成（データはコピーして所有させる）
pub fn frame_to_mat(frame: &Frame) -> DomainResult<Mat> {
    let rows = frame.height as i32;
    let expected = (frame.width * frame.height * 3) as usize;
    if frame.data.len() != expected {
        return Err(DomainError::Display(format!(
            "Frame buffer size mismatch: expected {} bytes for {}x{} BGR, got {}",
            expected,
            frame.width,
            frame.height,
            frame.data.len()
        )));
    }

    let flat = Mat::from_slice(&frame.data)
        .map_err(|e| DomainError::Display(format!("Failed to create Mat: {:?}", e)))?;
    let shaped = flat
        .reshape(3, rows)
        .map_err(|e| DomainError::Display(format!("Failed to reshape Mat: {:?}", e)))?;
    shaped
        .try_clone()
        .map_err(|e| DomainError::Display(format!("Failed to clone Mat: {:?}", e)))
}

/// BGR形式のMatからFrameを作成
pub fn mat_to_frame(mat: &Mat) -> DomainResult<Frame> {
    if mat.typ() != core::CV_8UC3 {
        return Err(DomainError::Display(format!(
            "Expected CV_8UC3 mat, got type {}",
            mat.typ()
        )));
    }

    // 非連続Matはクローンで連続メモリにする
    let owned;
    let continuous = if mat.is_continuous() {
        mat
    } else {
        owned = mat
            .try_clone()
            .map_err(|e| DomainError::Display(format!("Failed to clone Mat: {:?}", e)))?;
        &owned
    };

    let data = continuous
        .data_bytes()
        .map_err(|e| DomainError::Display(format!("Failed to read Mat bytes: {:?}", e)))?
        .to_vec();

    Ok(Frame::new(data, continuous.cols() as u32, continuous.rows() as u32))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_mat_round_trip() {
        let data: Vec<u8> = (0..4 * 2 * 3).map(|i| i as u8).collect();
        let frame = Frame::new(data.clone(), 4, 2);

        let mat = frame_to_mat(&frame).unwrap();
        assert_eq!(mat.cols(), 4);
        assert_eq!(mat.rows(), 2);

        let restored = mat_to_frame(&mat).unwrap();
        assert_eq!(restored.width, 4);
        assert_eq!(restored.height, 2);
        assert_eq!(restored.data, data);
    }

    #[test]
    fn test_frame_to_mat_rejects_size_mismatch() {
        let frame = Frame::new(vec![0u8; 10], 4, 2);
        assert!(matches!(frame_to_mat(&frame), Err(DomainError::Display(_))));
    }
}
