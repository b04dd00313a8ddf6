//! Directory-style filesystem over S3-compatible object storage / S3文件系统
//!
//! Object keys are flat; directories are emulated with key prefixes and
//! zero-byte marker objects whose keys end in "/".

pub mod config;
pub mod context;
pub mod error;
pub mod utils;
pub mod storage;

// Driver modules (point to project root drivers via path attribute) / 驱动模块
#[path = "../drivers/mod.rs"]
pub mod drivers;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub use context::RequestContext;
pub use drivers::s3::{S3Config, S3Disk, S3DriverFactory, S3Store};
pub use error::{Result, StorageError};
pub use storage::{DiskHandle, Filesystem, MemoryStore, ObjectStore, StorageManager};

// Register all storage drivers (call unified registration function from drivers module) / 注册所有存储驱动
pub async fn register_storage_drivers(manager: &storage::StorageManager) -> anyhow::Result<()> {
    drivers::register_all(manager).await
}

/// Install the fmt subscriber, filtered by RUST_LOG / 初始化日志
///
/// Returns false if a global subscriber was already set.
pub fn init_logging() -> bool {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "s3disk=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .is_ok()
}

/// Build a manager with every driver registered and every configured disk mounted / 根据配置挂载磁盘
pub async fn mount(config: &config::AppConfig) -> anyhow::Result<StorageManager> {
    let manager = StorageManager::new();
    register_storage_drivers(&manager).await?;
    manager.mount_all(config).await?;
    Ok(manager)
}
