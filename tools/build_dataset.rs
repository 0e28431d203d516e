//! データセット構築ツール
//!
//! `data_dir/<ラベルID>/<画像>`を走査してランドマーク検出→特徴量
//! ベクトル化を行い、`{"data": [...], "labels": [...]}`のJSONとして
//! 保存する。手が検出されなかった画像はサンプルを生まないが、
//! ラベル別に数えて報告される。
//!
//! 実行方法:
//! ```
//! cargo run --bin build_dataset
//! ```

use std::path::{Path, PathBuf};

use teburi::application::dataset_builder::DatasetBuilder;
use teburi::domain::config::AppConfig;
use teburi::infrastructure::detector_selector::DetectorSelector;
use teburi::infrastructure::image_store::OpenCvImageReader;
use teburi::logging::init_logging;

fn main() {
    let _guard = init_logging("info", false, Some(PathBuf::from("logs")));

    tracing::info!("build_dataset starting...");

    match run() {
        Ok(_) => {
            tracing::info!("build_dataset finished.");
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

    let reader = OpenCvImageReader::new();
    let detector = DetectorSelector::from_config(&config.detector)?;

    let mut builder = DatasetBuilder::new(reader, detector);
    let (dataset, report) = builder.build(Path::new(&config.dataset.data_dir))?;

    if dataset.is_empty() {
        anyhow::bail!(
            "No samples were produced ({} images had no detectable hand)",
            report.total_skipped()
        );
    }

    dataset.save(&config.dataset.output_path)?;
    tracing::info!(
        "Saved {} samples to {}",
        dataset.len(),
        config.dataset.output_path
    );

    Ok(())
}
