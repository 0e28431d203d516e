//! JSON Schema + Markdown生成ツール
//!
//! src/domain/config.rsの設定構造から以下を自動生成します：
//! 1. JSON Schema (schema/config.json)
//! 2. Markdownドキュメント (CONFIGURATION.md)
//!
//! 実行方法:
//! ```
//! cargo run --bin generate_schema
//! ```

use schemars::schema_for;
use serde_json::{Map, Value};
use std::fs;
use teburi::domain::config::AppConfig;

fn main() {
    println!("JSON Schema + Markdown生成中...");

    // AppConfigからJSON Schemaを生成
    let schema = schema_for!(AppConfig);
    let json = serde_json::to_string_pretty(&schema).expect("Failed to serialize schema to JSON");

    fs::create_dir_all("schema").expect("Failed to create schema/ directory");
    fs::write("schema/config.json", &json).expect("Failed to write schema/config.json");
    println!("  ✓ schema/config.json");

    let schema_value: Value = serde_json::from_str(&json).expect("Failed to parse generated schema");
    let markdown = generate_markdown(&schema_value);

    fs::write("CONFIGURATION.md", markdown).expect("Failed to write CONFIGURATION.md");
    println!("  ✓ CONFIGURATION.md");

    println!("✅ 生成完了: schema/config.json + CONFIGURATION.md");
}

/// JSON Schemaからマークダウンドキュメントを生成
fn generate_markdown(schema: &Value) -> String {
    let mut md = String::new();

    md.push_str("# 設定リファレンス (Configuration Reference)\n\n");
    md.push_str("## 概要\n\n");
    md.push_str("`config.toml`ファイルは、teburiの各バイナリ（収集・構築・学習・推論）が\n");
    md.push_str("共有する設定ファイルです。\n\n");
    md.push_str("**設定ファイルの場所**: `config.toml` (プロジェクトルート)  \n");
    md.push_str("**スキーマファイル**: `schema/config.json` (自動生成)  \n");
    md.push_str("**サンプル**: `config.toml.example`\n\n");
    md.push_str("⚠️ **注意**: このドキュメント（CONFIGURATION.md）は `cargo run --bin generate_schema` で自動生成されます。\n");
    md.push_str("設定項目の説明を変更する場合は、`src/domain/config.rs`のdoc commentsを編集してください。\n\n");
    md.push_str("## 設定項目\n\n");

    let defs = schema
        .get("$defs")
        .and_then(|d| d.as_object())
        .cloned()
        .unwrap_or_default();

    if let Some(props) = schema.get("properties").and_then(|p| p.as_object()) {
        for (key, prop) in props {
            md.push_str(&format!("### [{}] - {}\n\n", key, section_name(key)));

            if let Some(section) = resolve_ref(prop, &defs) {
                if let Some(desc) = section.get("description").and_then(|d| d.as_str()) {
                    md.push_str(&format!("{}\n\n", desc.replace('\n', " ")));
                }
                push_properties_table(&mut md, section, &defs);
            }
        }
    }

    md
}

/// $refを$defsから解決する（直接propertiesを持つ場合はそのまま返す）
fn resolve_ref<'a>(prop: &'a Value, defs: &'a Map<String, Value>) -> Option<&'a Value> {
    if let Some(ref_str) = prop.get("$ref").and_then(|r| r.as_str()) {
        return defs.get(ref_str.strip_prefix("#/$defs/")?);
    }
    if prop.get("properties").is_some() {
        return Some(prop);
    }
    None
}

/// 1セクション分のプロパティテーブルを出力
fn push_properties_table(md: &mut String, section: &Value, defs: &Map<String, Value>) {
    let props = match section.get("properties").and_then(|p| p.as_object()) {
        Some(props) if !props.is_empty() => props,
        _ => return,
    };

    md.push_str("| 設定項目 | 型 | デフォルト | 説明 |\n");
    md.push_str("|---------|-----|---------|---------|\n");

    for (key, prop) in props {
        md.push_str(&format!(
            "| `{}` | {} | {} | {} |\n",
            key,
            type_string(prop, defs).replace('|', "\\|"),
            default_string(prop),
            description_string(prop)
        ));
    }
    md.push('\n');
}

/// 型を文字列で取得
fn type_string(prop: &Value, defs: &Map<String, Value>) -> String {
    if let Some(ref_str) = prop.get("$ref").and_then(|r| r.as_str()) {
        if let Some(def_name) = ref_str.strip_prefix("#/$defs/") {
            if let Some(def) = defs.get(def_name) {
                if def.get("enum").is_some() {
                    return "enum".to_string();
                }
            }
            return def_name.to_string();
        }
    }

    match prop.get("type") {
        Some(Value::String(type_str)) => match type_str.as_str() {
            "integer" | "number" => prop
                .get("format")
                .and_then(|f| f.as_str())
                .unwrap_or(type_str)
                .to_string(),
            "boolean" => "bool".to_string(),
            other => other.to_string(),
        },
        Some(Value::Array(types)) => types
            .iter()
            .filter_map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(" | "),
        _ => "unknown".to_string(),
    }
}

/// デフォルト値を取得
fn default_string(prop: &Value) -> String {
    match prop.get("default") {
        Some(Value::String(s)) => format!("`\"{}\"`", s),
        Some(Value::Number(n)) => format!("`{}`", n),
        Some(Value::Bool(b)) => format!("`{}`", b),
        _ => "-".to_string(),
    }
}

/// 説明文を取得（改行・パイプをテーブル向けにエスケープ）
fn description_string(prop: &Value) -> String {
    if let Some(desc) = prop.get("description").and_then(|d| d.as_str()) {
        return desc
            .replace("\n\n", "<br><br>")
            .replace('\n', " ")
            .replace('|', "\\|");
    }
    "-".to_string()
}

/// セクション名をフォーマット
fn section_name(key: &str) -> String {
    match key {
        "camera" => "カメラ設定".to_string(),
        "detector" => "ランドマーク検出設定".to_string(),
        "dataset" => "データセット設定".to_string(),
        "training" => "学習設定".to_string(),
        "inference" => "ライブ推論設定".to_string(),
        "labels" => "ラベル表示マッピング".to_string(),
        _ => key.to_string(),
    }
}
