//! 学習ツール
//!
//! 永続化されたデータセットを読み込み、学習/テスト分割→ランダム
//! フォレスト学習→精度評価→アーティファクト保存を行う。
//!
//! 実行方法:
//! ```
//! cargo run --bin train_model
//! ```

use std::path::{Path, PathBuf};

use teburi::application::trainer::train_and_evaluate;
use teburi::domain::config::AppConfig;
use teburi::domain::GestureDataset;
use teburi::infrastructure::forest::RandomForestAdapter;
use teburi::logging::init_logging;

fn main() {
    let _guard = init_logging("info", false, Some(PathBuf::from("logs")));

    tracing::info!("train_model starting...");

    match run() {
        Ok(_) => {
            tracing::info!("train_model finished.");
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

    let dataset = GestureDataset::load(&config.dataset.output_path)?;
    tracing::info!(
        "Dataset loaded: {} samples from {}",
        dataset.len(),
        config.dataset.output_path
    );

    let mut classifier = RandomForestAdapter::new(&config.training)?;
    let report = train_and_evaluate(&mut classifier, &dataset, &config.training)?;

    println!(
        "{:.2}% of samples were classified correctly!",
        report.accuracy * 100.0
    );

    classifier.save(Path::new(&config.training.model_dir))?;
    tracing::info!(
        "Model artifact saved to {} (accuracy={:.4}, train={}, test={})",
        config.training.model_dir,
        report.accuracy,
        report.train_size,
        report.test_size
    );

    Ok(())
}
