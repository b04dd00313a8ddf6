//! In-memory object store / 内存对象存储
//!
//! Mirrors the S3 listing rules the emulation depends on: keys sorted
//! lexicographically, delimiter grouping into common prefixes, paging with
//! continuation tokens. Used by tests and by embedders that want a disk
//! without a network.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};

use super::store::{ListPage, ListRequest, ObjectMeta, ObjectStore, ObjectSummary};
use crate::error::{Result, StorageError};

/// S3 returns at most 1000 keys per page / S3每页最多1000个
pub const DEFAULT_PAGE_SIZE: usize = 1000;

#[derive(Debug, Clone)]
pub struct StoredObject {
    pub body: Bytes,
    pub content_type: String,
    pub acl: Option<String>,
    pub last_modified: DateTime<Utc>,
}

pub struct MemoryStore {
    bucket: String,
    page_size: usize,
    objects: RwLock<BTreeMap<String, StoredObject>>,
    /// Operation log, e.g. "PutObject a/b.txt" / 操作日志
    journal: Mutex<Vec<String>>,
}

impl MemoryStore {
    pub fn new(bucket: &str) -> Self {
        Self::with_page_size(bucket, DEFAULT_PAGE_SIZE)
    }

    pub fn with_page_size(bucket: &str, page_size: usize) -> Self {
        Self {
            bucket: bucket.to_string(),
            page_size: page_size.max(1),
            objects: RwLock::new(BTreeMap::new()),
            journal: Mutex::new(Vec::new()),
        }
    }

    /// Snapshot of one stored object / 获取对象快照
    pub fn object(&self, key: &str) -> Option<StoredObject> {
        self.objects.read().get(key).cloned()
    }

    /// All keys in listing order / 所有键
    pub fn keys(&self) -> Vec<String> {
        self.objects.read().keys().cloned().collect()
    }

    pub fn journal(&self) -> Vec<String> {
        self.journal.lock().clone()
    }

    pub fn clear_journal(&self) {
        self.journal.lock().clear();
    }

    fn record(&self, op: &str, key: &str) {
        self.journal.lock().push(format!("{} {}", op, key));
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn list_objects(&self, request: ListRequest) -> Result<ListPage> {
        self.record("ListObjects", &request.prefix);

        let objects = self.objects.read();
        let prefix = request.prefix.as_str();
        let token = request.continuation_token.as_deref();

        let mut page = ListPage::default();
        let mut emitted = 0usize;
        let mut last: Option<String> = None;

        for (key, object) in objects.range(prefix.to_string()..) {
            if !key.starts_with(prefix) {
                break;
            }
            if let Some(token) = token {
                if key.as_str() <= token {
                    continue;
                }
            }

            let rest = &key[prefix.len()..];
            let group = request
                .delimiter
                .as_deref()
                .filter(|d| !d.is_empty())
                .and_then(|d| rest.find(d).map(|pos| format!("{}{}", prefix, &rest[..pos + d.len()])));

            match group {
                Some(common) => {
                    if token == Some(common.as_str()) || page.common_prefixes.last() == Some(&common) {
                        continue;
                    }
                    if emitted == self.page_size {
                        page.is_truncated = true;
                        break;
                    }
                    page.common_prefixes.push(common.clone());
                    last = Some(common);
                }
                None => {
                    if emitted == self.page_size {
                        page.is_truncated = true;
                        break;
                    }
                    page.entries.push(ObjectSummary {
                        key: key.clone(),
                        size: object.body.len() as u64,
                    });
                    last = Some(key.clone());
                }
            }
            emitted += 1;
        }

        if page.is_truncated {
            page.next_token = last;
        }
        Ok(page)
    }

    async fn get_object(&self, key: &str) -> Result<Bytes> {
        self.record("GetObject", key);
        self.objects
            .read()
            .get(key)
            .map(|o| o.body.clone())
            .ok_or_else(|| StorageError::not_found("GetObject", key))
    }

    async fn put_object(&self, key: &str, body: Bytes, content_type: &str, acl: Option<&str>) -> Result<()> {
        self.record("PutObject", key);
        self.objects.write().insert(
            key.to_string(),
            StoredObject {
                body,
                content_type: content_type.to_string(),
                acl: acl.map(str::to_string),
                last_modified: Utc::now(),
            },
        );
        Ok(())
    }

    async fn head_object(&self, key: &str) -> Result<ObjectMeta> {
        self.record("HeadObject", key);
        let objects = self.objects.read();
        let object = objects
            .get(key)
            .ok_or_else(|| StorageError::not_found("HeadObject", key))?;
        Ok(ObjectMeta {
            content_length: object.body.len() as u64,
            content_type: Some(object.content_type.clone()),
            last_modified: Some(object.last_modified),
        })
    }

    async fn copy_object(&self, src_key: &str, dst_key: &str) -> Result<()> {
        self.record("CopyObject", src_key);
        let mut objects = self.objects.write();
        let mut object = objects
            .get(src_key)
            .cloned()
            .ok_or_else(|| StorageError::not_found("CopyObject", src_key))?;
        object.last_modified = Utc::now();
        objects.insert(dst_key.to_string(), object);
        Ok(())
    }

    async fn delete_object(&self, key: &str) -> Result<()> {
        // Deleting a missing key succeeds, as on S3
        self.record("DeleteObject", key);
        self.objects.write().remove(key);
        Ok(())
    }

    async fn delete_objects(&self, keys: &[String], _quiet: bool) -> Result<()> {
        self.record("DeleteObjects", &keys.join(","));
        let mut objects = self.objects.write();
        for key in keys {
            objects.remove(key);
        }
        Ok(())
    }

    async fn presign_get(&self, key: &str, expiry: Duration) -> Result<String> {
        self.record("PresignGet", key);
        Ok(format!(
            "memory://{}/{}?X-Amz-Expires={}",
            self.bucket,
            key.trim_start_matches('/'),
            expiry.as_secs()
        ))
    }
}
