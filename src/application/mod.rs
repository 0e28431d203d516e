//! Application Layer
//!
//! データセット構築、学習・評価、ライブ推論、統計管理などのユースケースを実装します。
//!
//! ## モジュール構成
//! - `dataset_builder`: ラベル別フォルダ走査→特徴量ベクトル化→データセット構築
//! - `trainer`: 学習/テスト分割と分類器の学習・精度評価
//! - `inference`: フレーム単位の2状態判定（手なし/分類済み）
//! - `stats`: 統計情報管理（FPS、レイテンシ、手未検出フレーム数）

pub mod dataset_builder;
pub mod inference;
pub mod stats;
pub mod trainer;
