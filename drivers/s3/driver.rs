//! S3磁盘核心实现
//!
//! 设计原则：
//! - 目录是键前缀，"/"结尾的空对象作为目录标记
//! - 所有存储调用按顺序执行，不做并发和重试
//! - 每次存储调用都受 RequestContext 的取消和截止时间约束

use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use super::client::S3Store;
use super::config::S3Config;
use crate::context::RequestContext;
use crate::error::{Result, StorageError};
use crate::storage::{Filesystem, MagicDetector, MimeDetector, ObjectMeta, ObjectStore};

/// S3磁盘
#[derive(Clone)]
pub struct S3Disk {
    pub(super) config: Arc<S3Config>,
    pub(super) store: Arc<dyn ObjectStore>,
    pub(super) detector: Arc<dyn MimeDetector>,
    pub(super) ctx: RequestContext,
}

impl S3Disk {
    /// 创建新的S3磁盘实例
    pub fn new(config: S3Config) -> Result<Self> {
        config.validate()?;
        let store = Arc::new(S3Store::new(&config)?);
        Self::with_store(config, store)
    }

    /// Disk over any object store / 使用指定的对象存储
    pub fn with_store(config: S3Config, store: Arc<dyn ObjectStore>) -> Result<Self> {
        config.validate()?;
        tracing::info!("S3 disk initialized: bucket={}, backend={}", config.bucket, store.name());
        Ok(Self {
            config: Arc::new(config),
            store,
            detector: Arc::new(MagicDetector),
            ctx: RequestContext::background(),
        })
    }

    /// Replace the content sniffer / 替换内容类型检测器
    pub fn with_mime_detector(mut self, detector: Arc<dyn MimeDetector>) -> Self {
        self.detector = detector;
        self
    }

    /// Copy of this disk bound to `ctx` / 绑定新的请求上下文
    pub fn scoped(&self, ctx: RequestContext) -> Self {
        Self {
            config: self.config.clone(),
            store: self.store.clone(),
            detector: self.detector.clone(),
            ctx,
        }
    }

    pub fn config(&self) -> &S3Config {
        &self.config
    }

    pub fn context(&self) -> &RequestContext {
        &self.ctx
    }

    /// Run one store call under the disk's context / 在上下文中执行存储调用
    pub(super) async fn call<T, F>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        self.ctx.run(fut).await
    }

    async fn head(&self, key: &str) -> Result<ObjectMeta> {
        self.call(self.store.head_object(key)).await
    }

    fn timezone(&self) -> Result<Tz> {
        self.config
            .timezone
            .parse::<Tz>()
            .map_err(|_| StorageError::TimeZone(self.config.timezone.clone()))
    }
}

#[async_trait]
impl Filesystem for S3Disk {
    fn name(&self) -> &str {
        self.store.name()
    }

    async fn directories(&self, path: &str) -> Result<Vec<String>> {
        self.list_directories(path).await
    }

    async fn all_directories(&self, path: &str) -> Result<Vec<String>> {
        self.walk_directories(path).await
    }

    async fn files(&self, path: &str) -> Result<Vec<String>> {
        self.list_files(path).await
    }

    async fn all_files(&self, path: &str) -> Result<Vec<String>> {
        self.walk_files(path).await
    }

    async fn exists(&self, key: &str) -> bool {
        match self.head(key).await {
            Ok(_) => true,
            Err(e) if e.is_not_found() => {
                tracing::debug!("S3 object not found: {}", key);
                false
            }
            Err(e) => {
                tracing::warn!("error while checking file existence: {} - {}", key, e);
                false
            }
        }
    }

    async fn get(&self, key: &str) -> Result<String> {
        let data = self.get_bytes(key).await?;
        String::from_utf8(data.to_vec()).map_err(|_| StorageError::Utf8(key.to_string()))
    }

    async fn get_bytes(&self, key: &str) -> Result<Bytes> {
        self.call(self.store.get_object(key)).await
    }

    async fn size(&self, key: &str) -> Result<u64> {
        Ok(self.head(key).await?.content_length)
    }

    async fn mime_type(&self, key: &str) -> Result<String> {
        Ok(self.head(key).await?.content_type.unwrap_or_default())
    }

    async fn last_modified(&self, key: &str) -> Result<DateTime<Tz>> {
        let meta = self.head(key).await?;
        let tz = self.timezone()?;
        let modified = meta
            .last_modified
            .ok_or_else(|| StorageError::store("HeadObject", key, None, "response carries no Last-Modified"))?;
        Ok(modified.with_timezone(&tz))
    }

    async fn put(&self, key: &str, content: Bytes) -> Result<()> {
        self.write(key, content).await
    }

    async fn put_file(&self, directory: &str, source: &Path) -> Result<String> {
        self.store_file(directory, source, None).await
    }

    async fn put_file_as(&self, directory: &str, source: &Path, name: &str) -> Result<String> {
        self.store_file(directory, source, Some(name)).await
    }

    async fn make_directory(&self, directory: &str) -> Result<()> {
        self.make_dir(directory).await
    }

    async fn copy(&self, src_key: &str, dst_key: &str) -> Result<()> {
        self.copy_object(src_key, dst_key).await
    }

    async fn move_file(&self, src_key: &str, dst_key: &str) -> Result<()> {
        self.move_object(src_key, dst_key).await
    }

    async fn delete(&self, keys: &[String]) -> Result<()> {
        self.remove_keys(keys).await
    }

    async fn delete_directory(&self, directory: &str) -> Result<()> {
        self.remove_dir(directory).await
    }

    fn url(&self, key: &str) -> String {
        format!(
            "{}/{}",
            self.config.public_base().trim_end_matches('/'),
            key.trim_start_matches('/')
        )
    }

    async fn temporary_url(&self, key: &str, expiry: DateTime<Utc>) -> Result<String> {
        let remaining = (expiry - Utc::now())
            .to_std()
            .map_err(|_| StorageError::InvalidExpiry)?;
        if remaining.is_zero() {
            return Err(StorageError::InvalidExpiry);
        }
        self.call(self.store.presign_get(key, remaining)).await
    }

    fn with_context(&self, ctx: RequestContext) -> Box<dyn Filesystem> {
        Box::new(self.scoped(ctx))
    }
}
