//! S3驱动工厂

use anyhow::{anyhow, Result};
use serde_json::Value;

use super::config::S3Config;
use super::driver::S3Disk;
use crate::storage::manager::DriverFactory;
use crate::storage::{ConfigItem, DriverInfo, Filesystem};

/// S3驱动工厂
pub struct S3DriverFactory;

impl S3DriverFactory {
    fn items(&self) -> Vec<ConfigItem> {
        vec![
            ConfigItem::new("key", "string")
                .title("Access Key ID")
                .required(),
            ConfigItem::new("secret", "password")
                .title("Secret Access Key")
                .required(),
            ConfigItem::new("region", "string")
                .title("区域")
                .help("S3区域，如 us-east-1、cn-hangzhou")
                .required(),
            ConfigItem::new("bucket", "string")
                .title("存储桶名称")
                .required(),
            ConfigItem::new("url", "string")
                .title("访问地址")
                .help("存储桶的公开访问地址，用于生成文件URL")
                .required(),
            ConfigItem::new("endpoint", "string")
                .title("端点地址")
                .help("S3兼容服务的端点URL（MinIO: http://localhost:9000），留空使用AWS"),
            ConfigItem::new("use_path_style", "bool")
                .title("强制路径风格")
                .help("MinIO等需要开启此选项")
                .default("false"),
            ConfigItem::new("cdn_url", "string")
                .title("自定义域名")
                .help("CDN加速域名（可选），优先于访问地址"),
            ConfigItem::new("token", "password")
                .title("Session Token")
                .help("临时凭证的会话令牌（可选）"),
            ConfigItem::new("object_canned_acl", "string")
                .title("对象ACL")
                .help("写入对象时附带的ACL，留空则不发送")
                .default("public-read"),
            ConfigItem::new("timezone", "string")
                .title("时区")
                .help("最后修改时间使用的IANA时区，如 Asia/Shanghai")
                .default("UTC"),
        ]
    }
}

impl DriverFactory for S3DriverFactory {
    fn driver_type(&self) -> &'static str {
        "s3"
    }

    fn driver_info(&self) -> DriverInfo {
        DriverInfo {
            driver_type: "s3".to_string(),
            display_name: "S3".to_string(),
            items: self.items(),
        }
    }

    fn create_driver(&self, config: Value) -> Result<Box<dyn Filesystem>> {
        let config: S3Config = serde_json::from_value(config)
            .map_err(|e| anyhow!("配置解析失败: {}", e))?;
        Ok(Box::new(S3Disk::new(config)?))
    }
}
