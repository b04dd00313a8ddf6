//! 上传与目录创建
//!
//! 写入对象前先为每一级父目录写入空的目录标记（"a/"、"a/b/"），
//! 任一标记写入失败则不再写入内容。

use std::path::Path;

use bytes::Bytes;

use super::driver::S3Disk;
use crate::error::{Result, StorageError};
use crate::utils::{ancestor_markers, directory_key, random_name, resolve_upload_key, RANDOM_NAME_LEN};

impl S3Disk {
    /// 写入对象（含父目录标记）
    pub(super) async fn write(&self, key: &str, content: Bytes) -> Result<()> {
        if !key.ends_with('/') {
            for marker in ancestor_markers(key) {
                self.write_object(&marker, Bytes::new()).await?;
            }
        }
        self.write_object(key, content).await
    }

    /// 仅写入目录标记本身
    pub(super) async fn make_dir(&self, directory: &str) -> Result<()> {
        self.write_object(&directory_key(directory), Bytes::new()).await
    }

    async fn write_object(&self, key: &str, content: Bytes) -> Result<()> {
        let detected = self.detector.detect(&content);
        self.call(self.store.put_object(key, content, detected.mime_type, self.config.acl()))
            .await
    }

    /// 上传本地文件，返回对象键
    pub(super) async fn store_file(&self, directory: &str, source: &Path, name: Option<&str>) -> Result<String> {
        let data = tokio::fs::read(source).await?;

        let generated;
        let name = match name {
            Some(name) => name,
            None => {
                generated = random_name(RANDOM_NAME_LEN);
                generated.as_str()
            }
        };

        let key = resolve_upload_key(directory, name, || self.infer_extension(source, &data))?;
        tracing::debug!("Uploading {:?} as {} ({} bytes)", source, key, data.len());

        self.write(&key, Bytes::from(data)).await?;
        Ok(key)
    }

    /// 扩展名推断：源文件自身的扩展名与内容一致（或内容无法细分）时保留，否则使用内容对应的扩展名
    fn infer_extension(&self, source: &Path, data: &[u8]) -> Result<String> {
        let detected = self.detector.detect(data);
        let own = source
            .extension()
            .and_then(|e| e.to_str())
            .filter(|e| !e.is_empty());

        let own_fits = own.is_some()
            && (detected.is_generic()
                || mime_guess::from_path(source)
                    .iter()
                    .any(|m| m.essence_str() == detected.essence()));

        let extension = if own_fits { own } else { detected.extension.or(own) };

        extension
            .map(str::to_string)
            .ok_or_else(|| StorageError::ExtensionDetection {
                name: source.display().to_string(),
                reason: format!("no extension known for {}", detected.mime_type),
            })
    }
}
