//! 配置文件模块
//!
//! # 设计思路
//!
//! 配置是一个 JSON 文件，所有字段都可省略。文件不存在或内容无效时回退到默认配置，
//! 不让一份写坏的配置阻止检查工具启动；只有语义上无效的值（例如指针宽度不是 4 或 8）
//! 在转换为解码选项时报错。

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::codec::{DecodeOptions, PointerWidth};
use crate::error::AppError;

/// 输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InspectorSettings {
    /// 句柄宽度（字节），省略时跟随当前平台
    pub pointer_width: Option<u8>,
    pub default_max_string_chars: Option<usize>,
    /// `env_logger` 的默认过滤规则，`RUST_LOG` 优先
    pub log_filter: Option<String>,
    pub output: OutputFormat,
}

impl InspectorSettings {
    pub fn decode_options(&self) -> Result<DecodeOptions, AppError> {
        let pointer_width = match self.pointer_width {
            None => PointerWidth::native(),
            Some(bytes) => PointerWidth::from_bytes(bytes).ok_or_else(|| {
                AppError::Config(format!("指针宽度只能是 4 或 8，实际为 {bytes}"))
            })?,
        };
        Ok(DecodeOptions {
            pointer_width,
            default_max_string_chars: self.default_max_string_chars,
        })
    }
}

/// 读取配置文件；文件不存在或无法解析时返回默认配置
pub fn load_settings_from_path(path: &Path) -> InspectorSettings {
    if path.exists() {
        match fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(settings) => return settings,
                Err(e) => log::warn!("解析配置文件失败，使用默认配置: {}", e),
            },
            Err(e) => log::warn!("读取配置文件失败，使用默认配置: {}", e),
        }
    }
    InspectorSettings::default()
}

pub fn save_settings_to_path(path: &Path, settings: &InspectorSettings) -> Result<(), AppError> {
    let content = serde_json::to_string_pretty(settings)
        .map_err(|e| AppError::Config(format!("序列化配置失败: {}", e)))?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::{SystemTime, UNIX_EPOCH};

    use super::*;

    fn unique_temp_dir() -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock error")
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("clipboard-inspector-settings-test-{nanos}"));
        std::fs::create_dir_all(&dir).expect("create temp dir");
        dir
    }

    #[test]
    fn save_and_load_settings_roundtrip() {
        let dir = unique_temp_dir();
        let path = dir.join("nested").join("settings.json");
        let settings = InspectorSettings {
            pointer_width: Some(4),
            default_max_string_chars: Some(128),
            log_filter: Some("debug".to_string()),
            output: OutputFormat::Json,
        };

        save_settings_to_path(&path, &settings).expect("save settings");
        assert_eq!(load_settings_from_path(&path), settings);

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn bad_or_missing_file_falls_back_to_default() {
        let dir = unique_temp_dir();
        let path = dir.join("settings.json");
        assert_eq!(load_settings_from_path(&path), InspectorSettings::default());

        std::fs::write(&path, "not-json").expect("write invalid settings");
        assert_eq!(load_settings_from_path(&path), InspectorSettings::default());

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let settings: InspectorSettings =
            serde_json::from_str(r#"{ "output": "json" }"#).expect("parse");
        assert_eq!(settings.output, OutputFormat::Json);
        assert_eq!(settings.pointer_width, None);
    }

    #[test]
    fn invalid_pointer_width_is_rejected() {
        let settings = InspectorSettings { pointer_width: Some(2), ..Default::default() };
        assert!(matches!(settings.decode_options(), Err(AppError::Config(_))));

        let settings = InspectorSettings { pointer_width: Some(4), ..Default::default() };
        let options = settings.decode_options().expect("options");
        assert_eq!(options.pointer_width, PointerWidth::Four);
    }
}
