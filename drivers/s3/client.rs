//! S3客户端：基于 rust-s3 的 ObjectStore 实现
//!
//! 所有非2xx响应都转换为 StorageError::Store，不做重试。

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use s3::bucket::Bucket;
use s3::creds::Credentials;
use s3::error::S3Error;
use s3::serde_types::ObjectIdentifier;
use s3::Region;

use super::config::S3Config;
use crate::error::{Result, StorageError};
use crate::storage::{ListPage, ListRequest, ObjectMeta, ObjectStore, ObjectSummary};

/// 预签名URL最长有效期（7天），超出即报错
const MAX_PRESIGN_SECS: u64 = 7 * 24 * 3600;

/// S3 object store bound to one bucket / S3存储客户端
pub struct S3Store {
    bucket: Box<Bucket>,
}

impl S3Store {
    pub fn new(config: &S3Config) -> Result<Self> {
        Ok(Self {
            bucket: Self::create_bucket(config)?,
        })
    }

    /// 创建S3 Bucket客户端
    fn create_bucket(config: &S3Config) -> Result<Box<Bucket>> {
        let credentials = Credentials::new(
            Some(&config.key),
            Some(&config.secret),
            config.token.as_deref().filter(|t| !t.is_empty()),
            None,
            None,
        )
        .map_err(|e| StorageError::Config(format!("创建S3凭证失败: {}", e)))?;

        let endpoint = match config.endpoint.as_deref() {
            Some(endpoint) if !endpoint.is_empty() => endpoint.to_string(),
            _ => format!("https://s3.{}.amazonaws.com", config.region),
        };
        let region = Region::Custom {
            region: config.region.clone(),
            endpoint,
        };

        let bucket = Bucket::new(&config.bucket, region, credentials)
            .map_err(|e| StorageError::Config(format!("创建S3 Bucket失败: {}", e)))?;

        let bucket = if config.use_path_style == Some(true) {
            bucket.with_path_style()
        } else {
            bucket
        };

        Ok(bucket)
    }
}

fn s3_error(op: &'static str, key: &str, err: S3Error) -> StorageError {
    match err {
        S3Error::HttpFailWithBody(status, body) => StorageError::store(op, key, Some(status), body),
        other => StorageError::store(op, key, None, other.to_string()),
    }
}

fn check_status(op: &'static str, key: &str, status: u16, body: &[u8]) -> Result<()> {
    match status {
        200..=299 => Ok(()),
        404 => Err(StorageError::not_found(op, key)),
        _ => Err(StorageError::store(op, key, Some(status), String::from_utf8_lossy(body))),
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    fn name(&self) -> &str {
        "s3"
    }

    async fn list_objects(&self, request: ListRequest) -> Result<ListPage> {
        tracing::debug!(
            "S3 ListObjectsV2: prefix={}, delimiter={:?}, token={:?}",
            request.prefix,
            request.delimiter,
            request.continuation_token
        );

        let (result, status) = self
            .bucket
            .list_page(
                request.prefix.clone(),
                request.delimiter.clone(),
                request.continuation_token.clone(),
                None,
                None,
            )
            .await
            .map_err(|e| s3_error("ListObjects", &request.prefix, e))?;
        check_status("ListObjects", &request.prefix, status, &[])?;

        Ok(ListPage {
            entries: result
                .contents
                .into_iter()
                .map(|obj| ObjectSummary {
                    key: obj.key,
                    size: obj.size as u64,
                })
                .collect(),
            common_prefixes: result
                .common_prefixes
                .unwrap_or_default()
                .into_iter()
                .map(|cp| cp.prefix)
                .collect(),
            is_truncated: result.is_truncated,
            next_token: result.next_continuation_token,
        })
    }

    async fn get_object(&self, key: &str) -> Result<Bytes> {
        tracing::debug!("S3 GetObject: key={}", key);
        let response = self
            .bucket
            .get_object(key)
            .await
            .map_err(|e| s3_error("GetObject", key, e))?;
        check_status("GetObject", key, response.status_code(), response.bytes())?;
        Ok(Bytes::copy_from_slice(response.bytes()))
    }

    async fn put_object(&self, key: &str, body: Bytes, content_type: &str, acl: Option<&str>) -> Result<()> {
        tracing::debug!("S3 PutObject: key={}, size={}, type={}, acl={:?}", key, body.len(), content_type, acl);

        let response = match acl {
            Some(acl) => {
                let mut bucket = self.bucket.clone();
                bucket.add_header("x-amz-acl", acl);
                bucket.put_object_with_content_type(key, &body, content_type).await
            }
            None => self.bucket.put_object_with_content_type(key, &body, content_type).await,
        }
        .map_err(|e| s3_error("PutObject", key, e))?;

        check_status("PutObject", key, response.status_code(), response.bytes())
    }

    async fn head_object(&self, key: &str) -> Result<ObjectMeta> {
        tracing::debug!("S3 HeadObject: key={}", key);
        let (head, status) = self
            .bucket
            .head_object(key)
            .await
            .map_err(|e| s3_error("HeadObject", key, e))?;
        check_status("HeadObject", key, status, &[])?;

        Ok(ObjectMeta {
            content_length: head.content_length.unwrap_or(0).max(0) as u64,
            content_type: head.content_type,
            last_modified: head
                .last_modified
                .as_deref()
                .and_then(|s| DateTime::parse_from_rfc2822(s).ok())
                .map(|t| t.with_timezone(&Utc)),
        })
    }

    async fn copy_object(&self, src_key: &str, dst_key: &str) -> Result<()> {
        // copy_object_internal的from参数需要URL编码（中文等非ASCII字符）
        let encoded_src = urlencoding::encode(src_key);
        tracing::debug!("S3 CopyObject: src_key={}, encoded={}, dst_key={}", src_key, encoded_src, dst_key);

        let status = self
            .bucket
            .copy_object_internal(&encoded_src, dst_key)
            .await
            .map_err(|e| s3_error("CopyObject", src_key, e))?;
        check_status("CopyObject", src_key, status, &[])
    }

    async fn delete_object(&self, key: &str) -> Result<()> {
        tracing::debug!("S3 DeleteObject: key={}", key);
        let response = self
            .bucket
            .delete_object(key)
            .await
            .map_err(|e| s3_error("DeleteObject", key, e))?;
        match response.status_code() {
            // 删除不存在的对象视为成功
            404 => Ok(()),
            status => check_status("DeleteObject", key, status, response.bytes()),
        }
    }

    async fn delete_objects(&self, keys: &[String], quiet: bool) -> Result<()> {
        tracing::debug!("S3 DeleteObjects: count={}, quiet={}", keys.len(), quiet);
        let context = keys.first().map(String::as_str).unwrap_or_default();
        let objects: Vec<ObjectIdentifier> = keys.iter().map(|k| ObjectIdentifier::new(k.as_str())).collect();

        // rust-s3 splits requests above 1000 keys; the response is parsed either way
        let result = self
            .bucket
            .delete_objects(objects)
            .await
            .map_err(|e| s3_error("DeleteObjects", context, e))?;

        if let Some(failed) = result.errors.first() {
            tracing::warn!(
                "S3 DeleteObjects partially failed: errors={}, deleted={}",
                result.errors.len(),
                result.deleted.len()
            );
            return Err(StorageError::store(
                "DeleteObjects",
                &failed.key,
                None,
                format!("{}: {}", failed.code, failed.message),
            ));
        }

        if !quiet {
            for deleted in &result.deleted {
                tracing::debug!("S3 deleted: {}", deleted.key);
            }
        }
        Ok(())
    }

    async fn presign_get(&self, key: &str, expiry: Duration) -> Result<String> {
        let secs = expiry.as_secs().max(1);
        if secs > MAX_PRESIGN_SECS {
            return Err(StorageError::InvalidExpiry);
        }
        tracing::debug!("S3 PresignGet: key={}, expires={}s", key, secs);
        self.bucket
            .presign_get(key, secs as u32, None)
            .await
            .map_err(|e| s3_error("PresignGet", key, e))
    }
}
