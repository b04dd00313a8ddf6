//! Path processing utility functions / 路径处理工具函数

use rand::distributions::Alphanumeric;
use rand::Rng;

use crate::error::Result;

/// Length of generated upload names / 随机文件名长度
pub const RANDOM_NAME_LEN: usize = 40;

/// Convert a caller path into a canonical store prefix / 将路径转换为规范前缀
/// 1. Strip one leading "./", then one "/", then one "." / 依次去掉 "./"、"/"、"."
/// 2. Append "/" unless empty or already present / 非空时确保以 / 结尾
///
/// "./a", ".a", "/a" and "./a/" all become "a/"; "", "." and "/" become "".
pub fn canonicalize(path: &str) -> String {
    let path = path.strip_prefix("./").unwrap_or(path);
    let path = path.strip_prefix('/').unwrap_or(path);
    let path = path.strip_prefix('.').unwrap_or(path);

    if path.is_empty() || path.ends_with('/') {
        path.to_string()
    } else {
        format!("{}/", path)
    }
}

/// Ensure a directory key ends with "/" / 确保目录键以 / 结尾
pub fn directory_key(path: &str) -> String {
    if path.ends_with('/') {
        path.to_string()
    } else {
        format!("{}/", path)
    }
}

/// Strip the queried prefix from a listed key / 去掉查询前缀
pub fn relative_to<'a>(key: &'a str, prefix: &str) -> &'a str {
    key.strip_prefix(prefix).unwrap_or(key)
}

/// Last path element, ignoring trailing slashes / 取最后一级名称
pub fn base_name(name: &str) -> &str {
    let trimmed = name.trim_end_matches('/');
    match trimmed.rfind('/') {
        Some(pos) => &trimmed[pos + 1..],
        None => trimmed,
    }
}

/// Extension of the final segment, without the dot / 获取扩展名（不含点）
/// Returns None when there is no dot or nothing after it.
pub fn extension_of(name: &str) -> Option<&str> {
    let base = base_name(name);
    match base.rfind('.') {
        Some(pos) if pos + 1 < base.len() => Some(&base[pos + 1..]),
        _ => None,
    }
}

/// Build the destination key for an uploaded file / 计算上传文件的目标键
///
/// A supplied name that already has an extension is used as is, even when it
/// disagrees with the content. Otherwise `infer` is asked for one; its error
/// aborts the upload before anything is written.
pub fn resolve_upload_key<F>(directory: &str, name: &str, infer: F) -> Result<String>
where
    F: FnOnce() -> Result<String>,
{
    let dir = directory.trim_end_matches('/');
    let base = base_name(name).trim_start_matches('/');

    if extension_of(name).is_some() {
        return Ok(format!("{}/{}", dir, base));
    }

    let ext = infer()?;
    Ok(format!("{}/{}.{}", dir, base, ext.trim_start_matches('.')))
}

/// Ancestor directory markers of a key: "a/b/c" -> ["a/", "a/b/"] / 计算所有父目录标记
pub fn ancestor_markers(key: &str) -> Vec<String> {
    let mut markers = Vec::new();
    for (pos, _) in key.match_indices('/') {
        let folder = &key[..pos];
        if folder.is_empty() {
            continue;
        }
        markers.push(format!("{}/", folder));
    }
    markers
}

/// Random opaque file name / 生成随机文件名
pub fn random_name(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StorageError;

    #[test]
    fn test_canonicalize() {
        assert_eq!(canonicalize("a"), "a/");
        assert_eq!(canonicalize("./a"), "a/");
        assert_eq!(canonicalize(".a"), "a/");
        assert_eq!(canonicalize("/a"), "a/");
        assert_eq!(canonicalize("./a/"), "a/");
        assert_eq!(canonicalize(".a/"), "a/");
        assert_eq!(canonicalize("/a/"), "a/");
        assert_eq!(canonicalize("a/b"), "a/b/");
        assert_eq!(canonicalize("./"), "");
        assert_eq!(canonicalize("."), "");
        assert_eq!(canonicalize("/"), "");
        assert_eq!(canonicalize(""), "");
    }

    #[test]
    fn test_canonicalize_strips_each_prefix_once() {
        // "./" then "/" then "." are each removed at most once
        assert_eq!(canonicalize(".//a"), "a/");
        assert_eq!(canonicalize("./.a"), "a/");
        assert_eq!(canonicalize("//a"), "/a/");
    }

    #[test]
    fn test_base_name_and_extension() {
        assert_eq!(base_name("a/b/c.txt"), "c.txt");
        assert_eq!(base_name("c/"), "c");
        assert_eq!(base_name("c"), "c");
        assert_eq!(extension_of("logo.png"), Some("png"));
        assert_eq!(extension_of("dir.v2/logo"), None);
        assert_eq!(extension_of("c."), None);
        assert_eq!(extension_of("archive.tar.gz"), Some("gz"));
    }

    #[test]
    fn test_resolve_upload_key() {
        let key = resolve_upload_key("a/b", "c", || Ok("png".to_string())).unwrap();
        assert_eq!(key, "a/b/c.png");

        let key = resolve_upload_key("a/b", "c.jpg", || panic!("must not infer")).unwrap();
        assert_eq!(key, "a/b/c.jpg");

        let key = resolve_upload_key("a/b/", "/c", || Ok("txt".to_string())).unwrap();
        assert_eq!(key, "a/b/c.txt");

        let key = resolve_upload_key("a", "nested/name.md", || unreachable!()).unwrap();
        assert_eq!(key, "a/name.md");
    }

    #[test]
    fn test_resolve_upload_key_inference_error() {
        let err = resolve_upload_key("a", "c", || {
            Err(StorageError::ExtensionDetection {
                name: "c".to_string(),
                reason: "unknown".to_string(),
            })
        })
        .unwrap_err();
        assert!(matches!(err, StorageError::ExtensionDetection { .. }));
    }

    #[test]
    fn test_ancestor_markers() {
        assert_eq!(ancestor_markers("d/e/f.txt"), vec!["d/", "d/e/"]);
        assert_eq!(ancestor_markers("f.txt"), Vec::<String>::new());
        assert_eq!(ancestor_markers("/f.txt"), Vec::<String>::new());
        assert_eq!(ancestor_markers("a//b"), vec!["a/", "a//"]);
    }

    #[test]
    fn test_random_name() {
        let name = random_name(RANDOM_NAME_LEN);
        assert_eq!(name.len(), RANDOM_NAME_LEN);
        assert!(name.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(name, random_name(RANDOM_NAME_LEN));
    }
}
