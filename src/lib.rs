//! teburi - Library
//!
//! このライブラリは、バイナリターゲット（データセット構築・学習・schema生成など）で
//! プロジェクトのモジュールにアクセスするために提供されています。

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod logging;
