//! S3存储驱动
//!
//! 在扁平的对象键空间上模拟目录：
//! - client: rust-s3 的 ObjectStore 实现
//! - driver: S3Disk 与 Filesystem 实现
//! - lister / writer / bulk: 列举、写入、删除复制移动

pub mod bulk;
pub mod client;
pub mod config;
pub mod driver;
pub mod factory;
pub mod lister;
pub mod writer;

pub use client::S3Store;
pub use config::S3Config;
pub use driver::S3Disk;
pub use factory::S3DriverFactory;

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use bytes::Bytes;

    use super::{S3Config, S3Disk};
    use crate::error::{Result, StorageError};
    use crate::storage::{ListPage, ListRequest, MemoryStore, ObjectMeta, ObjectStore};

    pub fn config() -> S3Config {
        S3Config {
            key: "ak".to_string(),
            secret: "sk".to_string(),
            region: "us-east-1".to_string(),
            bucket: "files".to_string(),
            url: "https://files.example.com".to_string(),
            ..Default::default()
        }
    }

    pub fn memory_disk() -> (S3Disk, Arc<MemoryStore>) {
        paged_disk(crate::storage::memory::DEFAULT_PAGE_SIZE)
    }

    pub fn paged_disk(page_size: usize) -> (S3Disk, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::with_page_size("files", page_size));
        let disk = S3Disk::with_store(config(), store.clone()).unwrap();
        (disk, store)
    }

    /// Which call the failing store rejects
    pub enum Fail {
        List,
        Put(&'static str),
        /// every delete after the first n
        DeleteAfter(usize),
    }

    pub struct FailingStore {
        inner: Arc<MemoryStore>,
        fail: Fail,
        deletes: AtomicUsize,
    }

    fn injected(op: &'static str, key: &str) -> StorageError {
        StorageError::store(op, key, Some(500), "InternalError")
    }

    #[async_trait]
    impl ObjectStore for FailingStore {
        fn name(&self) -> &str {
            "failing"
        }

        async fn list_objects(&self, request: ListRequest) -> Result<ListPage> {
            if let Fail::List = self.fail {
                return Err(injected("ListObjects", &request.prefix));
            }
            self.inner.list_objects(request).await
        }

        async fn get_object(&self, key: &str) -> Result<Bytes> {
            self.inner.get_object(key).await
        }

        async fn put_object(&self, key: &str, body: Bytes, content_type: &str, acl: Option<&str>) -> Result<()> {
            if let Fail::Put(target) = self.fail {
                if target == key {
                    return Err(injected("PutObject", key));
                }
            }
            self.inner.put_object(key, body, content_type, acl).await
        }

        async fn head_object(&self, key: &str) -> Result<ObjectMeta> {
            self.inner.head_object(key).await
        }

        async fn copy_object(&self, src_key: &str, dst_key: &str) -> Result<()> {
            self.inner.copy_object(src_key, dst_key).await
        }

        async fn delete_object(&self, key: &str) -> Result<()> {
            if let Fail::DeleteAfter(n) = self.fail {
                if self.deletes.fetch_add(1, Ordering::SeqCst) >= n {
                    return Err(injected("DeleteObject", key));
                }
            }
            self.inner.delete_object(key).await
        }

        async fn delete_objects(&self, keys: &[String], quiet: bool) -> Result<()> {
            self.inner.delete_objects(keys, quiet).await
        }

        async fn presign_get(&self, key: &str, expiry: Duration) -> Result<String> {
            self.inner.presign_get(key, expiry).await
        }
    }

    pub fn failing_disk(fail: Fail) -> (S3Disk, Arc<MemoryStore>) {
        let inner = Arc::new(MemoryStore::new("files"));
        let store = Arc::new(FailingStore {
            inner: inner.clone(),
            fail,
            deletes: AtomicUsize::new(0),
        });
        let disk = S3Disk::with_store(config(), store).unwrap();
        (disk, inner)
    }
}
