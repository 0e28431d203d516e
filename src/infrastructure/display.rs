/// 表示アダプタ
///
/// OpenCV highguiによるプレビューウィンドウ、ラベルオーバーレイ、
/// ランドマーク描画、キー入力ポーリング。
/// ウィンドウはDropで無条件に破棄される。

use crate::domain::{DomainError, DomainResult, Frame, Hand};
use crate::infrastructure::convert::frame_to_mat;
use opencv::{
    core::{Mat, Point, Scalar},
    highgui,
    imgproc::{self, FONT_HERSHEY_SIMPLEX, LINE_AA},
    prelude::*,
};

/// ESCキーのキーコード（推論ループ終了）
pub const KEY_ESC: i32 = 27;
/// 'q'キーのキーコード（収集開始トリガ）
pub const KEY_Q: i32 = 113;

/// 手の骨格接続（ランドマークインデックスのペア）
const HAND_CONNECTIONS: [(usize, usize); 21] = [
    // 手のひらの輪郭
    (0, 1),
    (1, 5),
    (5, 9),
    (9, 13),
    (13, 17),
    (17, 0),
    // 親指
    (1, 2),
    (2, 3),
    (3, 4),
    // 人差し指
    (5, 6),
    (6, 7),
    (7, 8),
    // 中指
    (9, 10),
    (10, 11),
    (11, 12),
    // 薬指
    (13, 14),
    (14, 15),
    (15, 16),
    // 小指
    (17, 18),
    (18, 19),
    (19, 20),
];

/// プレビューウィンドウ
pub struct Presenter {
    title: String,
}

impl Presenter {
    /// ウィンドウを作成
    pub fn new(title: &str) -> DomainResult<Self> {
        highgui::named_window(title, highgui::WINDOW_AUTOSIZE)
            .map_err(|e| DomainError::Display(format!("Failed to create window: {:?}", e)))?;
        Ok(Self { title: title.to_string() })
    }

    /// 推論結果をオーバーレイしてフレームを表示
    ///
    /// # Arguments
    /// - `frame`: 表示するフレーム
    /// - `label`: 推定ラベルの表示文字列（None = 手未検出）
    /// - `hands`: 検出された手（骨格を描画）
    pub fn show_prediction(
        &self,
        frame: &Frame,
        label: Option<&str>,
        hands: &[Hand],
    ) -> DomainResult<()> {
        let mut canvas = frame_to_mat(frame)?;

        for hand in hands {
            draw_hand(&mut canvas, hand, frame.width, frame.height)?;
        }

        let (text, color) = match label {
            Some(text) => (text.to_string(), green()),
            None => ("No hands detected".to_string(), red()),
        };
        put_overlay_text(&mut canvas, &text, color)?;

        highgui::imshow(&self.title, &canvas)
            .map_err(|e| DomainError::Display(format!("Failed to show frame: {:?}", e)))
    }

    /// メッセージをオーバーレイしてフレームを表示（収集の準備待ち等）
    pub fn show_message(&self, frame: &Frame, message: &str) -> DomainResult<()> {
        let mut canvas = frame_to_mat(frame)?;
        put_overlay_text(&mut canvas, message, green())?;

        highgui::imshow(&self.title, &canvas)
            .map_err(|e| DomainError::Display(format!("Failed to show frame: {:?}", e)))
    }

    /// キー入力をポーリング
    ///
    /// # Returns
    /// 押されたキーのキーコード。入力がなければNone
    pub fn poll_key(&self, wait_ms: u64) -> DomainResult<Option<i32>> {
        let key = highgui::wait_key(wait_ms as i32)
            .map_err(|e| DomainError::Display(format!("Failed to wait for key: {:?}", e)))?;
        if key < 0 {
            Ok(None)
        } else {
            Ok(Some(key))
        }
    }
}

impl Drop for Presenter {
    fn drop(&mut self) {
        // 正常終了・エラー経路を問わずウィンドウを破棄する
        if let Err(e) = highgui::destroy_all_windows() {
            tracing::warn!("Failed to destroy windows: {:?}", e);
        }
    }
}

fn green() -> Scalar {
    Scalar::new(0.0, 255.0, 0.0, 0.0)
}

fn red() -> Scalar {
    Scalar::new(0.0, 0.0, 255.0, 0.0)
}

/// 左上へステータス文字列を描画
fn put_overlay_text(canvas: &mut Mat, text: &str, color: Scalar) -> DomainResult<()> {
    imgproc::put_text(
        canvas,
        text,
        Point::new(50, 50),
        FONT_HERSHEY_SIMPLEX,
        1.3,
        color,
        3,
        LINE_AA,
        false,
    )
    .map_err(|e| DomainError::Display(format!("Failed to draw text: {:?}", e)))
}

/// 手の骨格（接続線 + ランドマーク点）を描画
fn draw_hand(canvas: &mut Mat, hand: &Hand, width: u32, height: u32) -> DomainResult<()> {
    let to_point = |index: usize| {
        let landmark = hand.landmarks()[index];
        Point::new(
            (landmark.x * width as f32) as i32,
            (landmark.y * height as f32) as i32,
        )
    };

    for &(from, to) in HAND_CONNECTIONS.iter() {
        imgproc::line(canvas, to_point(from), to_point(to), green(), 2, LINE_AA, 0)
            .map_err(|e| DomainError::Display(format!("Failed to draw line: {:?}", e)))?;
    }

    for index in 0..hand.landmarks().len() {
        imgproc::circle(canvas, to_point(index), 3, red(), 2, LINE_AA, 0)
            .map_err(|e| DomainError::Display(format!("Failed to draw circle: {:?}", e)))?;
    }

    Ok(())
}
