//! 目录与文件列举
//!
//! 返回的名称都相对于请求的路径，目录名以"/"结尾。

use super::driver::S3Disk;
use crate::error::Result;
use crate::storage::{ListPage, ListRequest};
use crate::utils::{canonicalize, relative_to};

impl S3Disk {
    /// 列举所有分页并合并
    async fn list_all(&self, request: ListRequest) -> Result<ListPage> {
        let mut merged = ListPage::default();
        let mut token: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let page = self
                .call(self.store.list_objects(request.clone().continue_from(token.take())))
                .await?;
            pages += 1;
            let next = page.next();
            merged.entries.extend(page.entries);
            merged.common_prefixes.extend(page.common_prefixes);

            match next {
                Some(t) => token = Some(t),
                None => break,
            }
        }

        if pages > 1 {
            tracing::debug!("S3 listing of '{}' spanned {} pages", request.prefix, pages);
        }
        Ok(merged)
    }

    async fn common_prefixes(&self, prefix: &str) -> Result<Vec<String>> {
        Ok(self.list_all(ListRequest::shallow(prefix)).await?.common_prefixes)
    }

    /// 直接子目录
    pub(super) async fn list_directories(&self, path: &str) -> Result<Vec<String>> {
        let prefix = canonicalize(path);
        let directories = self
            .common_prefixes(&prefix)
            .await?
            .iter()
            .map(|p| relative_to(p, &prefix).to_string())
            .collect();
        Ok(directories)
    }

    /// 所有子目录，先序遍历：父目录在前，其子目录紧随其后
    pub(super) async fn walk_directories(&self, path: &str) -> Result<Vec<String>> {
        let root = canonicalize(path);
        let mut directories = Vec::new();

        let mut pending = self.common_prefixes(&root).await?;
        pending.reverse();

        while let Some(prefix) = pending.pop() {
            let mut children = self.common_prefixes(&prefix).await?;
            directories.push(relative_to(&prefix, &root).to_string());
            children.reverse();
            pending.extend(children);
        }

        Ok(directories)
    }

    /// 直接子文件，不含目录标记本身
    pub(super) async fn list_files(&self, path: &str) -> Result<Vec<String>> {
        let prefix = canonicalize(path);
        let page = self.list_all(ListRequest::shallow(&prefix)).await?;
        let files = page
            .entries
            .iter()
            .map(|o| relative_to(&o.key, &prefix))
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect();
        Ok(files)
    }

    /// 所有子文件（含子目录中的），不含目录标记
    pub(super) async fn walk_files(&self, path: &str) -> Result<Vec<String>> {
        let prefix = canonicalize(path);
        let page = self.list_all(ListRequest::recursive(&prefix)).await?;
        let files = page
            .entries
            .iter()
            .filter(|o| !o.key.ends_with('/'))
            .map(|o| relative_to(&o.key, &prefix))
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect();
        Ok(files)
    }
}
