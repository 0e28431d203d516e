//! teburi - ライブ推論バイナリ
//!
//! Webカメラのフレームごとに 取得→ズーム→ランドマーク検出→ベクトル化→
//! 分類→オーバーレイ表示 を行う。ESCキーで終了。
//!
//! パイプラインは単一スレッドの同期ブロッキング構成。
//! カメラとウィンドウはDropにより全終了経路で解放される。

use std::path::{Path, PathBuf};

use teburi::application::inference::{FrameOutcome, InferenceEngine};
use teburi::application::stats::StatsCollector;
use teburi::domain::config::AppConfig;
use teburi::domain::ports::CameraPort;
use teburi::domain::{ClassMap, DomainResult};
use teburi::infrastructure::camera::OpenCvCameraAdapter;
use teburi::infrastructure::detector_selector::DetectorSelector;
use teburi::infrastructure::display::{Presenter, KEY_ESC};
use teburi::infrastructure::forest::RandomForestAdapter;
use teburi::logging::init_logging;

/// プレビューウィンドウのタイトル
const WINDOW_TITLE: &str = "teburi";

fn main() {
    // ログシステムの初期化（非同期ファイル出力）
    let log_dir = PathBuf::from("logs");
    let _guard = init_logging("info", false, Some(log_dir));
    // 注意: _guardはmain終了まで保持する必要がある（Dropでログスレッドが終了）

    tracing::info!("teburi starting...");

    match run() {
        Ok(_) => {
            tracing::info!("teburi terminated gracefully.");
        }
        Err(e) => {
            tracing::error!("Fatal error: {:?}", e);
            std::process::exit(1);
        }
    }
}

/// アプリケーションのメイン処理
fn run() -> Result<(), Box<dyn std::error::Error>> {
    // 設定ファイルの読み込み（存在しない場合はデフォルト設定を使用）
    let config = match AppConfig::from_file("config.toml") {
        Ok(config) => {
            tracing::info!("Loaded configuration from config.toml");
            config
        }
        Err(e) => {
            tracing::warn!("Failed to load config.toml: {:?}, using defaults", e);
            AppConfig::default()
        }
    };

    // 設定の検証
    config.validate()?;

    tracing::info!(
        "Camera: index={}, zoom={}",
        config.camera.index,
        config.camera.zoom_factor
    );
    tracing::info!(
        "Detector: backend={:?}, min_confidence={}",
        config.detector.backend,
        config.detector.min_detection_confidence
    );

    // カメラオープン失敗は即時終了（リトライしない）
    let camera = OpenCvCameraAdapter::open(&config.camera)?;

    let detector = DetectorSelector::from_config(&config.detector)?;
    let classifier = RandomForestAdapter::load(Path::new(&config.training.model_dir))?;
    let class_map: ClassMap = (&config.labels).into();
    tracing::info!("Class mapping loaded: {} labels", class_map.len());

    let stats = StatsCollector::new(config.inference.stats_interval());
    let engine = InferenceEngine::new(detector, classifier, class_map, stats);

    let presenter = Presenter::new(WINDOW_TITLE)?;

    tracing::info!("Starting inference loop (press ESC to exit)");
    run_loop(camera, engine, presenter, config.inference.frame_wait_ms)?;

    Ok(())
}

/// 推論ループ（ブロッキング）
///
/// フレーム取得失敗はこのランを終了させる（エラーとして伝播）。
/// カメラ・ウィンドウの解放は各アダプタのDropが保証する。
fn run_loop(
    mut camera: OpenCvCameraAdapter,
    mut engine: InferenceEngine<DetectorSelector, RandomForestAdapter>,
    presenter: Presenter,
    frame_wait_ms: u64,
) -> DomainResult<()> {
    loop {
        let frame = camera.read_frame()?;

        let outcome = engine.process_frame(&frame)?;
        match &outcome {
            FrameOutcome::NoHand => {
                presenter.show_prediction(&frame, None, &[])?;
            }
            FrameOutcome::Classified { display, hands, .. } => {
                presenter.show_prediction(&frame, Some(display), hands)?;
            }
        }

        if let Some(KEY_ESC) = presenter.poll_key(frame_wait_ms)? {
            tracing::info!("ESC pressed, exiting inference loop");
            break;
        }
    }

    Ok(())
}
