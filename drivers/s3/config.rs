//! S3 disk configuration / S3磁盘配置

use serde::{Deserialize, Serialize};

use crate::error::{Result, StorageError};

/// S3 disk profile / S3配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3Config {
    /// Access Key ID
    #[serde(default)]
    pub key: String,
    /// Secret Access Key
    #[serde(default)]
    pub secret: String,
    /// 区域
    #[serde(default)]
    pub region: String,
    /// 存储桶名称
    #[serde(default)]
    pub bucket: String,
    /// Public base URL of the bucket / 公开访问地址
    #[serde(default)]
    pub url: String,
    /// S3端点地址
    /// AWS: https://s3.{region}.amazonaws.com
    /// MinIO: http://localhost:9000
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// 强制使用路径风格（MinIO等需要设置为true）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_path_style: Option<bool>,
    /// CDN base URL, preferred over `url` / 自定义域名（用于CDN加速）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cdn_url: Option<String>,
    /// Session Token（用于临时凭证）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Canned ACL sent with every write, "" sends none / 写入时的ACL
    #[serde(default = "default_acl")]
    pub object_canned_acl: String,
    /// IANA zone used by `last_modified` / 时区
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

fn default_acl() -> String {
    "public-read".to_string()
}

fn default_timezone() -> String {
    "UTC".to_string()
}

impl Default for S3Config {
    fn default() -> Self {
        Self {
            key: String::new(),
            secret: String::new(),
            region: String::new(),
            bucket: String::new(),
            url: String::new(),
            endpoint: None,
            use_path_style: None,
            cdn_url: None,
            token: None,
            object_canned_acl: default_acl(),
            timezone: default_timezone(),
        }
    }
}

fn env_opt(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

impl S3Config {
    /// Profile from AWS_* variables / 从环境变量读取
    pub fn from_env() -> Self {
        Self {
            key: env_opt("AWS_ACCESS_KEY_ID").unwrap_or_default(),
            secret: env_opt("AWS_ACCESS_KEY_SECRET").unwrap_or_default(),
            region: env_opt("AWS_REGION").unwrap_or_default(),
            bucket: env_opt("AWS_BUCKET").unwrap_or_default(),
            url: env_opt("AWS_URL").unwrap_or_default(),
            endpoint: env_opt("AWS_ENDPOINT"),
            use_path_style: env_opt("AWS_USE_PATH_STYLE").map(|v| matches!(v.as_str(), "1" | "true" | "TRUE" | "True")),
            cdn_url: env_opt("AWS_CDN_URL"),
            token: env_opt("AWS_SESSION_TOKEN"),
            object_canned_acl: env_opt("AWS_OBJECT_CANNED_ACL").unwrap_or_else(default_acl),
            timezone: env_opt("APP_TIMEZONE").unwrap_or_else(default_timezone),
        }
    }

    /// Reject profiles missing a required setting / 校验必填项
    pub fn validate(&self) -> Result<()> {
        let missing: Vec<&str> = [
            ("key", &self.key),
            ("secret", &self.secret),
            ("region", &self.region),
            ("bucket", &self.bucket),
            ("url", &self.url),
        ]
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| *name)
        .collect();

        if !missing.is_empty() {
            return Err(StorageError::Config(format!("missing required settings: {}", missing.join(", "))));
        }

        Ok(())
    }

    /// ACL header value, if any / ACL
    pub fn acl(&self) -> Option<&str> {
        let acl = self.object_canned_acl.trim();
        if acl.is_empty() {
            None
        } else {
            Some(acl)
        }
    }

    /// Base used by `url`, CDN first / 访问地址前缀
    pub fn public_base(&self) -> &str {
        match self.cdn_url.as_deref() {
            Some(cdn) if !cdn.is_empty() => cdn,
            _ => &self.url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> S3Config {
        S3Config {
            key: "ak".to_string(),
            secret: "sk".to_string(),
            region: "us-east-1".to_string(),
            bucket: "files".to_string(),
            url: "https://files.example.com".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_validate_complete() {
        complete().validate().unwrap();
    }

    #[test]
    fn test_validate_missing_fields() {
        let config = S3Config {
            secret: String::new(),
            url: " ".to_string(),
            ..complete()
        };
        match config.validate() {
            Err(StorageError::Config(msg)) => assert_eq!(msg, "missing required settings: secret, url"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_serde_defaults() {
        let config: S3Config = serde_json::from_str(r#"{"bucket":"b"}"#).unwrap();
        assert_eq!(config.object_canned_acl, "public-read");
        assert_eq!(config.timezone, "UTC");
        assert_eq!(config.acl(), Some("public-read"));

        let config: S3Config = serde_json::from_str(r#"{"object_canned_acl":""}"#).unwrap();
        assert_eq!(config.acl(), None);
    }

    #[test]
    fn test_public_base_prefers_cdn() {
        let mut config = complete();
        assert_eq!(config.public_base(), "https://files.example.com");
        config.cdn_url = Some("https://cdn.example.com/".to_string());
        assert_eq!(config.public_base(), "https://cdn.example.com/");
        config.cdn_url = Some(String::new());
        assert_eq!(config.public_base(), "https://files.example.com");
    }
}
