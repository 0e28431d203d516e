//! ラベル付き画像収集ツール
//!
//! クラスごとに準備待ち（'q'キーで開始、ESCで中断）→指定枚数の
//! フレームを`data_dir/<ラベルID>/<連番>.jpg`として保存する。
//!
//! 実行方法:
//! ```
//! cargo run --bin collect_images
//! ```

use std::path::{Path, PathBuf};

use teburi::domain::config::AppConfig;
use teburi::domain::ports::CameraPort;
use teburi::infrastructure::camera::OpenCvCameraAdapter;
use teburi::infrastructure::display::{Presenter, KEY_ESC, KEY_Q};
use teburi::infrastructure::image_store::save_image;
use teburi::logging::init_logging;

fn main() {
    let _guard = init_logging("info", false, Some(PathBuf::from("logs")));

    tracing::info!("collect_images starting...");

    match run() {
        Ok(_) => {
            tracing::info!("collect_images finished.");
        }
        Err(e) => {
            tracing::error!("Fatal error: {:?}", e);
            std::process::exit(1);
        }
    }
}

fn run() -> anyhow::Result<()> {
    let config = match AppConfig::from_file("config.toml") {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!("Failed to load config.toml: {:?}, using defaults", e);
            AppConfig::default()
        }
    };
    config.validate()?;

    let data_dir = Path::new(&config.dataset.data_dir);
    std::fs::create_dir_all(data_dir)?;

    // カメラオープン失敗は即時終了
    let mut camera = OpenCvCameraAdapter::open(&config.camera)?;
    let presenter = Presenter::new("teburi - collect")?;

    for class in 0..config.dataset.class_count {
        let class_dir = data_dir.join(class.to_string());
        std::fs::create_dir_all(&class_dir)?;

        tracing::info!("Collecting data for class {}", class);

        // 準備待ちループ: 'q'で収集開始、ESCで全体を中断
        loop {
            let frame = camera.read_frame()?;
            presenter.show_message(&frame, "Ready? Press \"q\" ! :)")?;

            match presenter.poll_key(config.dataset.frame_wait_ms)? {
                Some(KEY_Q) => break,
                Some(KEY_ESC) => {
                    tracing::info!("ESC pressed, aborting collection");
                    return Ok(());
                }
                _ => {}
            }
        }

        // 収集ループ
        let total = config.dataset.images_per_class;
        for counter in 0..total {
            let frame = camera.read_frame()?;
            presenter.show_message(&frame, &format!("Class {}: {}/{}", class, counter + 1, total))?;
            presenter.poll_key(config.dataset.frame_wait_ms)?;

            save_image(&class_dir.join(format!("{}.jpg", counter)), &frame)?;
        }

        tracing::info!("Captured {} images for class {}", total, class);
    }

    Ok(())
}
