/// 画像ファイル入出力アダプタ
///
/// OpenCVのimgcodecsを使用したImageReaderPort実装と、
/// データセット収集用の画像書き出し。

use crate::domain::{ports::ImageReaderPort, DomainError, DomainResult, Frame};
use crate::infrastructure::convert::{frame_to_mat, mat_to_frame};
use opencv::{core::Vector, imgcodecs, prelude::*};
use std::path::Path;

/// OpenCV画像読み込みアダプタ
#[derive(Debug, Default)]
pub struct OpenCvImageReader;

impl OpenCvImageReader {
    /// 新しい画像読み込みアダプタを作成
    pub fn new() -> Self {
        Self
    }
}

impl ImageReaderPort for OpenCvImageReader {
    fn read_image(&mut self, path: &Path) -> DomainResult<Frame> {
        let path_str = path
            .to_str()
            .ok_or_else(|| DomainError::Dataset(format!("Non-UTF8 path: {}", path.display())))?;

        let mat = imgcodecs::imread(path_str, imgcodecs::IMREAD_COLOR).map_err(|e| {
            DomainError::Dataset(format!("Failed to read image {}: {:?}", path.display(), e))
        })?;

        if mat.empty() {
            return Err(DomainError::Dataset(format!(
                "Failed to decode image {}",
                path.display()
            )));
        }

        mat_to_frame(&mat).map_err(|e| DomainError::Dataset(e.to_string()))
    }
}

/// フレームをJPEGファイルとして保存（データセット収集用）
pub fn save_image(path: &Path, frame: &Frame) -> DomainResult<()> {
    let path_str = path
        .to_str()
        .ok_or_else(|| DomainError::Dataset(format!("Non-UTF8 path: {}", path.display())))?;

    let mat = frame_to_mat(frame).map_err(|e| DomainError::Dataset(e.to_string()))?;

    let written = imgcodecs::imwrite(path_str, &mat, &Vector::new()).map_err(|e| {
        DomainError::Dataset(format!("Failed to write image {}: {:?}", path.display(), e))
    })?;
    if !written {
        return Err(DomainError::Dataset(format!(
            "Image encoder refused to write {}",
            path.display()
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_then_read_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.png");

        // 単色ではない適当なパターン
        let data: Vec<u8> = (0..8 * 8 * 3).map(|i| (i % 251) as u8).collect();
        let frame = Frame::new(data.clone(), 8, 8);

        save_image(&path, &frame).unwrap();

        let mut reader = OpenCvImageReader::new();
        let restored = reader.read_image(&path).unwrap();

        // PNGはロスレスなのでピクセルが一致する
        assert_eq!(restored.width, 8);
        assert_eq!(restored.height, 8);
        assert_eq!(restored.data, data);
    }

    #[test]
    fn test_read_missing_image_is_error() {
        let mut reader = OpenCvImageReader::new();
        let result = reader.read_image(Path::new("/nonexistent/missing.jpg"));
        assert!(matches!(result, Err(DomainError::Dataset(_))));
    }
}
