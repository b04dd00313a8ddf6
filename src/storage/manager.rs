use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use anyhow::{anyhow, Context, Result};
use serde_json::Value;

use super::{DriverInfo, Filesystem};
use crate::config::AppConfig;

/// Shared handle to a configured disk / 磁盘实例句柄
pub type DiskHandle = Arc<dyn Filesystem>;

/// Driver factory trait / 驱动工厂 trait
pub trait DriverFactory: Send + Sync {
    /// Driver type name / 驱动类型名称
    fn driver_type(&self) -> &'static str;

    /// Config schema for this driver / 驱动配置信息
    fn driver_info(&self) -> DriverInfo;

    /// Build a disk from its profile options / 创建磁盘实例
    fn create_driver(&self, config: Value) -> Result<Box<dyn Filesystem>>;
}

/// Registry of named disks, one per configuration profile / 磁盘管理器
///
/// Consumers receive a `DiskHandle` from here instead of looking a disk up
/// through global state.
#[derive(Clone)]
pub struct StorageManager {
    disks: Arc<RwLock<HashMap<String, DiskHandle>>>,
    factories: Arc<RwLock<HashMap<String, Arc<dyn DriverFactory>>>>,
    /// Disk error status (name -> error message) / 磁盘错误状态
    disk_errors: Arc<RwLock<HashMap<String, String>>>,
    default_disk: Arc<RwLock<Option<String>>>,
}

impl StorageManager {
    pub fn new() -> Self {
        Self {
            disks: Arc::new(RwLock::new(HashMap::new())),
            factories: Arc::new(RwLock::new(HashMap::new())),
            disk_errors: Arc::new(RwLock::new(HashMap::new())),
            default_disk: Arc::new(RwLock::new(None)),
        }
    }

    /// Register driver factory / 注册驱动工厂
    pub async fn register_factory(&self, factory: Box<dyn DriverFactory>) -> Result<()> {
        let driver_type = factory.driver_type().to_string();

        let mut factories = self.factories.write().await;
        factories.insert(driver_type.clone(), Arc::from(factory));

        tracing::info!("Driver factory registered: {}", driver_type);
        Ok(())
    }

    /// Create a disk (verify on success, record error on failure) / 创建磁盘实例
    pub async fn create_disk(&self, name: &str, driver_type: &str, config: Value) -> Result<DiskHandle> {
        let factory = {
            let factories = self.factories.read().await;
            factories
                .get(driver_type)
                .cloned()
                .ok_or_else(|| anyhow!("Driver type not found: {}", driver_type))?
        };

        let disk: DiskHandle = match factory.create_driver(config) {
            Ok(disk) => Arc::from(disk),
            Err(e) => {
                let error_msg = e.to_string();
                self.disk_errors.write().await.insert(name.to_string(), error_msg.clone());
                tracing::error!("Disk creation failed: {} ({}) - {}", name, driver_type, error_msg);
                return Err(e).with_context(|| format!("please set {} configuration first", name));
            }
        };

        // Verify the disk by listing the bucket root / 验证磁盘有效性
        let validation_result = disk.directories("").await;

        self.disks.write().await.insert(name.to_string(), disk.clone());

        match validation_result {
            Ok(_) => {
                self.disk_errors.write().await.remove(name);
                tracing::info!("Disk created and verified: {} ({})", name, driver_type);
            }
            Err(e) => {
                // Disk is kept; the error is only recorded / 验证失败，仍然保留磁盘
                let error_msg = e.to_string();
                self.disk_errors.write().await.insert(name.to_string(), error_msg.clone());
                tracing::warn!("Disk created but verification failed: {} ({}) - {}", name, driver_type, error_msg);
            }
        }

        Ok(disk)
    }

    /// Create every disk of an app config / 根据配置创建所有磁盘
    pub async fn mount_all(&self, config: &AppConfig) -> Result<()> {
        for (name, profile) in &config.disks {
            self.create_disk(name, &profile.driver, Value::Object(profile.options.clone()))
                .await?;
        }
        if !config.default_disk.is_empty() {
            self.set_default(&config.default_disk).await?;
        }
        Ok(())
    }

    /// Get disk instance / 获取磁盘实例
    pub async fn disk(&self, name: &str) -> Option<DiskHandle> {
        self.disks.read().await.get(name).cloned()
    }

    pub async fn set_default(&self, name: &str) -> Result<()> {
        if !self.disks.read().await.contains_key(name) {
            return Err(anyhow!("Disk not found: {}", name));
        }
        *self.default_disk.write().await = Some(name.to_string());
        Ok(())
    }

    /// Get the default disk / 获取默认磁盘
    pub async fn default_disk(&self) -> Option<DiskHandle> {
        let name = self.default_disk.read().await.clone()?;
        self.disk(&name).await
    }

    /// Remove disk instance / 移除磁盘实例
    pub async fn remove_disk(&self, name: &str) -> Result<()> {
        self.disks
            .write()
            .await
            .remove(name)
            .ok_or_else(|| anyhow!("Disk not found: {}", name))?;

        let mut default_disk = self.default_disk.write().await;
        if default_disk.as_deref() == Some(name) {
            *default_disk = None;
        }

        tracing::info!("Disk removed: {}", name);
        Ok(())
    }

    /// Get disk error status / 获取磁盘错误状态
    pub async fn get_disk_error(&self, name: &str) -> Option<String> {
        self.disk_errors.read().await.get(name).cloned()
    }

    /// List all disks / 列出所有磁盘
    pub async fn list_disks(&self) -> Vec<String> {
        let mut names: Vec<String> = self.disks.read().await.keys().cloned().collect();
        names.sort();
        names
    }

    /// List all available driver types / 列出所有可用的驱动类型
    pub async fn list_driver_types(&self) -> Vec<String> {
        self.factories.read().await.keys().cloned().collect()
    }

    /// Config schema of every registered driver / 所有驱动配置信息
    pub async fn driver_infos(&self) -> Vec<DriverInfo> {
        self.factories
            .read()
            .await
            .values()
            .map(|f| f.driver_info())
            .collect()
    }
}

impl Default for StorageManager {
    fn default() -> Self {
        Self::new()
    }
}
