//! Application configuration module / 应用配置模块
//!
//! Disk profiles are loaded from a JSON file, or from the AWS_* environment
//! variables when no file exists. Each profile is validated by its driver
//! factory when the disk is created.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::drivers::s3::S3Config;

/// Application configuration / 应用配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Disk handed out when no name is given / 默认磁盘
    #[serde(default)]
    pub default_disk: String,
    /// Named disk profiles / 磁盘配置
    #[serde(default)]
    pub disks: BTreeMap<String, DiskProfile>,
}

/// One disk profile / 单个磁盘配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiskProfile {
    /// Driver type, "s3" unless stated / 驱动类型
    #[serde(default = "default_driver")]
    pub driver: String,
    /// Driver-specific options / 驱动参数
    #[serde(flatten)]
    pub options: Map<String, Value>,
}

fn default_driver() -> String {
    "s3".to_string()
}

impl AppConfig {
    /// Single "s3" disk built from the environment / 从环境变量构建
    pub fn from_env() -> Result<Self> {
        let s3 = S3Config::from_env();
        let options = match serde_json::to_value(&s3).context("Failed to serialize S3 profile")? {
            Value::Object(map) => map,
            _ => Map::new(),
        };

        let mut disks = BTreeMap::new();
        disks.insert(
            "s3".to_string(),
            DiskProfile {
                driver: default_driver(),
                options,
            },
        );

        Ok(Self {
            default_disk: "s3".to_string(),
            disks,
        })
    }
}

/// Get the config file path / 获取配置文件路径
pub fn default_config_path() -> PathBuf {
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join("config.json")
}

/// Load configuration from file, or from the environment if it does not exist / 加载配置
pub fn load_config(path: &Path) -> Result<AppConfig> {
    if path.exists() {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;

        let config: AppConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file {:?}", path))?;

        tracing::info!("Loaded configuration from {:?}", path);
        Ok(config)
    } else {
        tracing::info!("No configuration at {:?}, using environment", path);
        AppConfig::from_env()
    }
}

/// Save configuration to file / 保存配置到文件
pub fn save_config(config: &AppConfig, path: &Path) -> Result<()> {
    let content = serde_json::to_string_pretty(config).context("Failed to serialize config")?;

    std::fs::write(path, content).with_context(|| format!("Failed to write config file {:?}", path))?;

    Ok(())
}
