//! Storage error taxonomy / 存储错误类型

use thiserror::Error;

pub type Result<T> = std::result::Result<T, StorageError>;

#[derive(Debug, Error)]
pub enum StorageError {
    /// Missing or invalid disk settings / 配置缺失或无效
    #[error("configuration error: {0}")]
    Config(String),

    /// A failed object store call, passed through untouched / 对象存储调用失败
    #[error("{op} {key} failed{}: {message}", .status.map(|s| format!(" (HTTP {})", s)).unwrap_or_default())]
    Store {
        op: &'static str,
        key: String,
        status: Option<u16>,
        message: String,
    },

    /// Could not work out an extension for an uploaded file / 无法推断扩展名
    #[error("cannot detect extension for {name}: {reason}")]
    ExtensionDetection { name: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("unknown time zone: {0}")]
    TimeZone(String),

    #[error("expiry must be in the future")]
    InvalidExpiry,

    #[error("object {0} is not valid UTF-8")]
    Utf8(String),

    #[error("request cancelled")]
    Cancelled,

    #[error("request deadline exceeded")]
    DeadlineExceeded,
}

impl StorageError {
    pub(crate) fn store(op: &'static str, key: &str, status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Store {
            op,
            key: key.to_string(),
            status,
            message: message.into(),
        }
    }

    pub(crate) fn not_found(op: &'static str, key: &str) -> Self {
        Self::store(op, key, Some(404), "object not found")
    }

    /// Whether the store reported the key as absent / 对象是否不存在
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Store { status: Some(404), .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_display() {
        let err = StorageError::store("HeadObject", "a/1.txt", Some(403), "denied");
        assert_eq!(err.to_string(), "HeadObject a/1.txt failed (HTTP 403): denied");

        let err = StorageError::store("ListObjects", "a/", None, "connection reset");
        assert_eq!(err.to_string(), "ListObjects a/ failed: connection reset");
    }

    #[test]
    fn test_is_not_found() {
        assert!(StorageError::not_found("GetObject", "x").is_not_found());
        assert!(!StorageError::store("GetObject", "x", Some(500), "boom").is_not_found());
        assert!(!StorageError::Cancelled.is_not_found());
    }
}
