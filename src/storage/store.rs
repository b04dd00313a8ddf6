//! Object store client interface / 对象存储客户端接口
//!
//! The filesystem emulation only talks to this trait. One store instance is
//! bound to a single bucket.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};

use crate::error::Result;

/// Key separator used for directory emulation / 目录分隔符
pub const DELIMITER: &str = "/";

/// One list call / 一次列举请求
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListRequest {
    pub prefix: String,
    pub delimiter: Option<String>,
    pub continuation_token: Option<String>,
}

impl ListRequest {
    /// Delimiter-scoped listing (one directory level) / 按分隔符列举
    pub fn shallow(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            delimiter: Some(DELIMITER.to_string()),
            continuation_token: None,
        }
    }

    /// Flat listing of every key under the prefix / 列举前缀下所有键
    pub fn recursive(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            delimiter: None,
            continuation_token: None,
        }
    }

    pub fn continue_from(mut self, token: Option<String>) -> Self {
        self.continuation_token = token;
        self
    }
}

/// An object reported by a listing / 列举结果中的对象
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectSummary {
    pub key: String,
    pub size: u64,
}

/// One page of listing results / 一页列举结果
#[derive(Debug, Clone, Default)]
pub struct ListPage {
    pub entries: Vec<ObjectSummary>,
    pub common_prefixes: Vec<String>,
    pub is_truncated: bool,
    pub next_token: Option<String>,
}

impl ListPage {
    /// Token for the next page, if the listing is incomplete / 下一页令牌
    pub fn next(&self) -> Option<String> {
        if self.is_truncated {
            self.next_token.clone()
        } else {
            None
        }
    }
}

/// Head metadata / 对象元数据
#[derive(Debug, Clone)]
pub struct ObjectMeta {
    pub content_length: u64,
    pub content_type: Option<String>,
    pub last_modified: Option<DateTime<Utc>>,
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Backend name for logs / 后端名称
    fn name(&self) -> &str;

    async fn list_objects(&self, request: ListRequest) -> Result<ListPage>;

    async fn get_object(&self, key: &str) -> Result<Bytes>;

    async fn put_object(&self, key: &str, body: Bytes, content_type: &str, acl: Option<&str>) -> Result<()>;

    async fn head_object(&self, key: &str) -> Result<ObjectMeta>;

    /// Server-side copy within the bucket / 服务端复制
    async fn copy_object(&self, src_key: &str, dst_key: &str) -> Result<()>;

    async fn delete_object(&self, key: &str) -> Result<()>;

    /// Batched delete; `quiet` asks the store not to echo deleted keys / 批量删除
    async fn delete_objects(&self, keys: &[String], quiet: bool) -> Result<()>;

    /// Presigned GET URL valid for `expiry` / 预签名下载链接
    async fn presign_get(&self, key: &str, expiry: Duration) -> Result<String>;
}
