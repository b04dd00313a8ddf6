//! 删除、复制、移动
//!
//! 多对象操作不是原子的：中途失败时已完成的步骤不会回滚。

use super::driver::S3Disk;
use crate::error::Result;
use crate::storage::ListRequest;
use crate::utils::directory_key;

impl S3Disk {
    /// 删除目录下所有对象（逐个删除，按页推进）
    pub(super) async fn remove_dir(&self, directory: &str) -> Result<()> {
        let prefix = directory_key(directory);
        let mut token: Option<String> = None;
        let mut deleted = 0usize;

        loop {
            let page = self
                .call(self.store.list_objects(ListRequest::recursive(&prefix).continue_from(token.take())))
                .await?;

            for object in &page.entries {
                if let Err(e) = self.call(self.store.delete_object(&object.key)).await {
                    tracing::warn!(
                        "Directory delete aborted: prefix={}, deleted={}, failed_key={} - {}",
                        prefix,
                        deleted,
                        object.key,
                        e
                    );
                    return Err(e);
                }
                deleted += 1;
            }

            match page.next() {
                Some(next) => token = Some(next),
                None => break,
            }
        }

        tracing::debug!("Directory deleted: prefix={}, objects={}", prefix, deleted);
        Ok(())
    }

    /// 批量删除（单次请求）
    pub(super) async fn remove_keys(&self, keys: &[String]) -> Result<()> {
        if keys.is_empty() {
            return Ok(());
        }
        self.call(self.store.delete_objects(keys, true)).await
    }

    pub(super) async fn copy_object(&self, src_key: &str, dst_key: &str) -> Result<()> {
        self.call(self.store.copy_object(src_key, dst_key)).await
    }

    /// 移动 = 复制 + 删除源对象
    pub(super) async fn move_object(&self, src_key: &str, dst_key: &str) -> Result<()> {
        self.copy_object(src_key, dst_key).await?;
        if let Err(e) = self.call(self.store.delete_object(src_key)).await {
            tracing::warn!("Move left both copies: src={}, dst={} - {}", src_key, dst_key, e);
            return Err(e);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::{failing_disk, memory_disk, paged_disk, Fail};
    use crate::storage::Filesystem;

    #[tokio::test]
    async fn test_delete_directory() {
        let (disk, store) = memory_disk();
        disk.put("DeleteDirectory/1.txt", "Goravel".into()).await.unwrap();
        disk.put("DeleteDirectory/sub/2.txt", "Goravel".into()).await.unwrap();
        disk.put("DeleteDirectoryKeep/3.txt", "Goravel".into()).await.unwrap();

        disk.delete_directory("DeleteDirectory").await.unwrap();
        assert!(!disk.exists("DeleteDirectory/1.txt").await);
        assert!(!disk.exists("DeleteDirectory/sub/2.txt").await);
        assert!(!disk.exists("DeleteDirectory/").await);
        // sibling sharing the name prefix survives
        assert!(disk.exists("DeleteDirectoryKeep/3.txt").await);
        assert!(store.keys().iter().all(|k| !k.starts_with("DeleteDirectory/")));

        // deleting again is a no-op
        disk.delete_directory("DeleteDirectory/").await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_directory_spans_pages() {
        let (disk, store) = paged_disk(2);
        for i in 0..7 {
            disk.put(&format!("Paged/{}.txt", i), "x".into()).await.unwrap();
        }
        disk.put("Other/keep.txt", "x".into()).await.unwrap();

        disk.delete_directory("Paged").await.unwrap();
        assert_eq!(store.keys(), vec!["Other/", "Other/keep.txt"]);
    }

    #[tokio::test]
    async fn test_delete_directory_aborts_on_failure() {
        let (disk, store) = failing_disk(Fail::DeleteAfter(2));
        for i in 0..4 {
            disk.put(&format!("Abort/{}.txt", i), "x".into()).await.unwrap();
        }

        assert!(disk.delete_directory("Abort").await.is_err());
        // "Abort/" and "Abort/0.txt" went first, the rest remain
        assert_eq!(store.keys(), vec!["Abort/1.txt", "Abort/2.txt", "Abort/3.txt"]);
    }

    #[tokio::test]
    async fn test_delete_is_one_batch() {
        let (disk, store) = memory_disk();
        disk.put("Delete/1.txt", "x".into()).await.unwrap();
        disk.put("Delete/2.txt", "x".into()).await.unwrap();
        store.clear_journal();

        disk.delete(&["Delete/1.txt".to_string(), "Delete/2.txt".to_string(), "Delete/none".to_string()])
            .await
            .unwrap();
        assert_eq!(store.journal(), vec!["DeleteObjects Delete/1.txt,Delete/2.txt,Delete/none"]);
        assert_eq!(store.keys(), vec!["Delete/"]);

        store.clear_journal();
        disk.delete(&[]).await.unwrap();
        assert!(store.journal().is_empty());
    }

    #[tokio::test]
    async fn test_copy() {
        let (disk, _) = memory_disk();
        disk.put("Copy/1.txt", "Goravel".into()).await.unwrap();
        disk.copy("Copy/1.txt", "Copy1/1.txt").await.unwrap();

        assert_eq!(disk.get("Copy/1.txt").await.unwrap(), "Goravel");
        assert_eq!(disk.get("Copy1/1.txt").await.unwrap(), "Goravel");
        assert!(disk.copy("Copy/none.txt", "Copy1/none.txt").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_move() {
        let (disk, _) = memory_disk();
        disk.put("Move/1.txt", "Goravel".into()).await.unwrap();
        disk.move_file("Move/1.txt", "Move1/1.txt").await.unwrap();

        assert!(disk.missing("Move/1.txt").await);
        assert_eq!(disk.get("Move1/1.txt").await.unwrap(), "Goravel");
    }

    #[tokio::test]
    async fn test_move_of_missing_source_changes_nothing() {
        let (disk, store) = memory_disk();
        assert!(disk.move_file("Move/none.txt", "Move1/none.txt").await.is_err());
        assert!(store.keys().is_empty());
    }

    #[tokio::test]
    async fn test_move_keeps_both_when_delete_fails() {
        let (disk, store) = failing_disk(Fail::DeleteAfter(0));
        disk.put("Move/1.txt", "Goravel".into()).await.unwrap();

        assert!(disk.move_file("Move/1.txt", "Move1/1.txt").await.is_err());
        assert!(store.object("Move/1.txt").is_some());
        assert!(store.object("Move1/1.txt").is_some());
    }
}
