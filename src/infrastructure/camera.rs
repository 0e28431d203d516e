/// Webカメラキャプチャアダプタ
///
/// OpenCVのVideoCaptureを使用したCameraPort実装。
/// 設定されたズーム倍率で中央を切り出し、元のフレームサイズへ
/// 拡大して返す。ハンドルはDropで無条件に解放される。

use crate::domain::{
    config::CameraConfig,
    ports::{CameraInfo, CameraPort},
    DomainError, DomainResult, Frame,
};
use crate::infrastructure::convert::mat_to_frame;
use opencv::{
    core::{Mat, Rect, Size},
    imgproc,
    prelude::*,
    videoio,
};

/// Webカメラキャプチャアダプタ
pub struct OpenCvCameraAdapter {
    capture: videoio::VideoCapture,
    config: CameraConfig,
    info: CameraInfo,
}

impl OpenCvCameraAdapter {
    /// カメラをオープンしてアダプタを作成
    ///
    /// # Returns
    /// - `Ok(Self)`: オープン成功
    /// - `Err(DomainError::Initialization)`: デバイスが開けない場合（プロセスは即終了する想定）
    pub fn open(config: &CameraConfig) -> DomainResult<Self> {
        let capture = videoio::VideoCapture::new(config.index as i32, videoio::CAP_ANY)
            .map_err(|e| {
                DomainError::Initialization(format!("Failed to create video capture: {:?}", e))
            })?;

        let opened = capture.is_opened().map_err(|e| {
            DomainError::Initialization(format!("Failed to query capture state: {:?}", e))
        })?;
        if !opened {
            return Err(DomainError::Initialization(format!(
                "Could not open video capture device {}",
                config.index
            )));
        }

        let width = capture
            .get(videoio::CAP_PROP_FRAME_WIDTH)
            .unwrap_or(0.0) as u32;
        let height = capture
            .get(videoio::CAP_PROP_FRAME_HEIGHT)
            .unwrap_or(0.0) as u32;
        let fps = capture.get(videoio::CAP_PROP_FPS).unwrap_or(0.0);

        let info = CameraInfo {
            width,
            height,
            fps,
            name: format!("camera{}", config.index),
        };

        tracing::info!(
            "Camera opened: {}x{} @ {:.0}fps - {}",
            info.width,
            info.height,
            info.fps,
            info.name
        );

        Ok(Self {
            capture,
            config: config.clone(),
            info,
        })
    }

    /// 中央ズーム切り出しを適用し、元サイズへ拡大して戻す
    fn apply_zoom(&self, mat: &Mat) -> DomainResult<Mat> {
        if self.config.zoom_factor <= 1.0 {
            return Ok(mat.clone());
        }

        let width = mat.cols() as u32;
        let height = mat.rows() as u32;
        let roi = self.config.zoom_region(width, height)?;

        let rect = Rect::new(roi.x as i32, roi.y as i32, roi.width as i32, roi.height as i32);
        let cropped = Mat::roi(mat, rect)
            .map_err(|e| DomainError::Camera(format!("Failed to crop frame: {:?}", e)))?;

        let mut resized = Mat::default();
        imgproc::resize(
            &cropped,
            &mut resized,
            Size::new(width as i32, height as i32),
            0.0,
            0.0,
            imgproc::INTER_LINEAR,
        )
        .map_err(|e| DomainError::Camera(format!("Failed to resize frame: {:?}", e)))?;

        Ok(resized)
    }
}

impl CameraPort for OpenCvCameraAdapter {
    fn read_frame(&mut self) -> DomainResult<Frame> {
        let mut mat = Mat::default();
        let ok = self
            .capture
            .read(&mut mat)
            .map_err(|e| DomainError::Camera(format!("Failed to read frame: {:?}", e)))?;

        // フレーム取得失敗は致命的（このランを終了、リトライしない）
        if !ok || mat.empty() {
            return Err(DomainError::Camera(
                "Could not read frame from camera".to_string(),
            ));
        }

        let zoomed = self.apply_zoom(&mat)?;
        mat_to_frame(&zoomed)
    }

    fn camera_info(&self) -> CameraInfo {
        self.info.clone()
    }
}

impl Drop for OpenCvCameraAdapter {
    fn drop(&mut self) {
        // 正常終了・エラー経路を問わず解放する
        if let Err(e) = self.capture.release() {
            tracing::warn!("Failed to release camera: {:?}", e);
        } else {
            tracing::debug!("Camera released");
        }
    }
}
