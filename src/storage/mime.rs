//! Content sniffing / 内容类型检测
//!
//! Content types are derived from the payload bytes, never from the key.
//! Binary formats come from `infer`; text payloads are classified here and
//! their extensions looked up through `mime_guess`.

use infer::MatcherType;

/// Result of sniffing a payload / 检测结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Detected {
    pub mime_type: &'static str,
    /// Canonical extension without the dot, if the type has one / 对应扩展名
    pub extension: Option<&'static str>,
}

pub const OCTET_STREAM: Detected = Detected {
    mime_type: "application/octet-stream",
    extension: None,
};

impl Detected {
    fn from_mime(mime_type: &'static str) -> Self {
        Self {
            mime_type,
            extension: extension_for(mime_type),
        }
    }

    /// Mime type without parameters / 去掉参数的类型
    pub fn essence(&self) -> &'static str {
        self.mime_type.split(';').next().unwrap_or(self.mime_type).trim()
    }

    /// Plain text or unknown bytes, i.e. nothing more specific was found
    pub fn is_generic(&self) -> bool {
        matches!(self.essence(), "text/plain" | "application/octet-stream")
    }
}

/// Opaque `detect(bytes) -> mime` capability / 内容类型检测接口
pub trait MimeDetector: Send + Sync {
    fn detect(&self, data: &[u8]) -> Detected;
}

/// Magic-number detector with a UTF-8 text fallback / 基于魔数的检测器
#[derive(Debug, Default, Clone, Copy)]
pub struct MagicDetector;

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";
const TEXT_HTML: &str = "text/html; charset=utf-8";
const TEXT_XML: &str = "text/xml; charset=utf-8";
const IMAGE_SVG: &str = "image/svg+xml";
const APPLICATION_JSON: &str = "application/json";

impl MimeDetector for MagicDetector {
    fn detect(&self, data: &[u8]) -> Detected {
        if data.is_empty() {
            return Detected::from_mime("text/plain");
        }

        if let Some(kind) = infer::get(data) {
            // infer's text matchers are coarser than classify_text
            if kind.matcher_type() != MatcherType::Text {
                return Detected {
                    mime_type: kind.mime_type(),
                    extension: Some(kind.extension()),
                };
            }
        }

        if looks_like_text(data) {
            Detected::from_mime(classify_text(data))
        } else {
            OCTET_STREAM
        }
    }
}

/// Preferred extension for a mime type / 根据类型查找扩展名
///
/// Among the extensions `mime_guess` knows for the type, the one named like
/// the subtype wins ("image/svg+xml" -> "svg"); text types fall back to "txt".
pub fn extension_for(mime_type: &str) -> Option<&'static str> {
    let essence = mime_type.split(';').next().unwrap_or(mime_type).trim();
    let candidates = mime_guess::get_mime_extensions_str(essence)?;

    let subtype = essence.split('/').nth(1).unwrap_or("");
    let stem = subtype.split('+').next().unwrap_or(subtype).trim_start_matches("x-");

    candidates
        .iter()
        .copied()
        .find(|ext| *ext == stem)
        .or_else(|| {
            if essence.starts_with("text/") {
                candidates.iter().copied().find(|ext| *ext == "txt")
            } else {
                None
            }
        })
        .or_else(|| candidates.first().copied())
}

fn classify_text(data: &[u8]) -> &'static str {
    let head = &data[..data.len().min(512)];
    let head = String::from_utf8_lossy(head);
    let head = head.trim_start_matches('\u{feff}').trim_start().to_ascii_lowercase();

    if head.starts_with("<!doctype html") || head.starts_with("<html") {
        return TEXT_HTML;
    }
    if head.starts_with("<svg") || (head.starts_with("<?xml") && head.contains("<svg")) {
        return IMAGE_SVG;
    }
    if head.starts_with("<?xml") {
        return TEXT_XML;
    }
    if (head.starts_with('{') || head.starts_with('['))
        && serde_json::from_slice::<serde::de::IgnoredAny>(data).is_ok()
    {
        return APPLICATION_JSON;
    }
    TEXT_PLAIN
}

fn looks_like_text(data: &[u8]) -> bool {
    // Only the head is inspected; a multibyte char may be cut at the boundary
    let head = &data[..data.len().min(3072)];
    let valid = match std::str::from_utf8(head) {
        Ok(_) => true,
        Err(e) => e.error_len().is_none() && e.valid_up_to() + 4 > head.len(),
    };
    valid && !head.iter().any(|&b| b < 0x20 && !matches!(b, b'\t' | b'\n' | b'\r' | 0x0c | 0x1b))
}
