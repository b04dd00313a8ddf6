use std::path::Path;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::context::RequestContext;
use crate::error::Result;

/// Configuration item definition / 配置项定义
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigItem {
    pub name: String,
    /// Display title (friendly name) / 显示标题
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub item_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
}

impl ConfigItem {
    pub fn new(name: &str, item_type: &str) -> Self {
        Self {
            name: name.to_string(),
            title: None,
            item_type: item_type.to_string(),
            default: None,
            required: false,
            help: None,
        }
    }

    pub fn title(mut self, val: &str) -> Self {
        self.title = Some(val.to_string());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn default(mut self, val: &str) -> Self {
        self.default = Some(val.to_string());
        self
    }

    pub fn help(mut self, val: &str) -> Self {
        self.help = Some(val.to_string());
        self
    }
}

/// Complete driver information / 驱动完整信息
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverInfo {
    pub driver_type: String,
    pub display_name: String,
    /// Driver-specific configuration items / 驱动特有配置项
    pub items: Vec<ConfigItem>,
}

/// Filesystem contract over a flat object store / 基于对象存储的文件系统接口
///
/// Directory paths are accepted in any of the forms "d", "./d", "/d", "./d/"
/// and listings return names relative to the queried directory. Object keys
/// passed to the metadata and content methods are used verbatim.
///
/// Multi-step operations (`put` with its directory markers, `move_file`,
/// `delete_directory`) are not transactional: on failure the store may be
/// left in an intermediate state and the first error is returned.
#[async_trait]
pub trait Filesystem: Send + Sync {
    /// Driver name / 驱动名称
    fn name(&self) -> &str;

    /// Immediate subdirectories, each ending in "/" / 列出直接子目录
    async fn directories(&self, path: &str) -> Result<Vec<String>>;

    /// Every directory below `path`, pre-order / 递归列出所有子目录
    async fn all_directories(&self, path: &str) -> Result<Vec<String>>;

    /// Files directly inside `path` / 列出直接文件
    async fn files(&self, path: &str) -> Result<Vec<String>>;

    /// Every file below `path` / 递归列出所有文件
    async fn all_files(&self, path: &str) -> Result<Vec<String>>;

    async fn exists(&self, key: &str) -> bool;

    async fn missing(&self, key: &str) -> bool {
        !self.exists(key).await
    }

    async fn get(&self, key: &str) -> Result<String>;

    async fn get_bytes(&self, key: &str) -> Result<Bytes>;

    async fn size(&self, key: &str) -> Result<u64>;

    async fn mime_type(&self, key: &str) -> Result<String>;

    /// Modification time in the disk's configured time zone / 最后修改时间
    async fn last_modified(&self, key: &str) -> Result<DateTime<Tz>>;

    /// Write content, creating every ancestor directory marker first / 写入内容
    async fn put(&self, key: &str, content: Bytes) -> Result<()>;

    /// Store a local file under a random name / 以随机文件名上传
    async fn put_file(&self, directory: &str, source: &Path) -> Result<String>;

    /// Store a local file under `name` / 以指定文件名上传
    async fn put_file_as(&self, directory: &str, source: &Path, name: &str) -> Result<String>;

    async fn make_directory(&self, directory: &str) -> Result<()>;

    async fn copy(&self, src_key: &str, dst_key: &str) -> Result<()>;

    /// Copy then delete; not atomic / 移动（复制后删除，非原子）
    async fn move_file(&self, src_key: &str, dst_key: &str) -> Result<()>;

    /// Batched delete of exact keys / 批量删除
    async fn delete(&self, keys: &[String]) -> Result<()>;

    /// Delete every object under a directory; idempotent / 递归删除目录
    async fn delete_directory(&self, directory: &str) -> Result<()>;

    /// Object key for a path / 对象路径
    fn path(&self, key: &str) -> String {
        key.to_string()
    }

    /// Public URL / 公开访问地址
    fn url(&self, key: &str) -> String;

    /// Presigned URL valid until `expiry` / 临时访问地址
    async fn temporary_url(&self, key: &str, expiry: DateTime<Utc>) -> Result<String>;

    /// Same disk bound to another request context / 绑定新上下文
    fn with_context(&self, ctx: RequestContext) -> Box<dyn Filesystem>;
}

pub mod manager;
pub mod memory;
pub mod mime;
pub mod store;

pub use manager::{DiskHandle, DriverFactory, StorageManager};
pub use memory::MemoryStore;
pub use mime::{Detected, MagicDetector, MimeDetector};
pub use store::{ListPage, ListRequest, ObjectMeta, ObjectStore, ObjectSummary};
