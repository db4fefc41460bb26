// doc-index/src/extract.rs
//! 文本提取模块

use std::fs;
use std::path::Path;

use encoding_rs::{Encoding, UTF_8};

use crate::config::DisplayConfig;
use crate::error::ParseError;

/// 读取文本文件：按 BOM 识别 UTF-8 / UTF-16，否则按严格 UTF-8 解码
pub fn read_document_text(path: &Path) -> Result<String, ParseError> {
    let bytes = fs::read(path).map_err(|source| ParseError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    decode_text(path, &bytes)
}

pub(crate) fn decode_text(path: &Path, bytes: &[u8]) -> Result<String, ParseError> {
    let (encoding, bom_len) = Encoding::for_bom(bytes).unwrap_or((UTF_8, 0));
    if bom_len > 0 {
        tracing::debug!("检测到 {} BOM: {:?}", encoding.name(), path);
    }

    encoding
        .decode_without_bom_handling_and_without_replacement(&bytes[bom_len..])
        .map(|text| text.into_owned())
        .ok_or_else(|| ParseError::Decode {
            path: path.to_path_buf(),
            encoding: encoding.name(),
        })
}

const SENTENCE_ENDINGS: [char; 9] = ['。', '！', '？', '.', '!', '?', '\n', '；', ';'];

/// 格式化内容预览：过长时优先在句子结尾截断，其次在空白处截断
pub fn format_content_preview(content: &str, display: &DisplayConfig) -> String {
    let cleaned = content.trim();
    let max_len = display.preview_max_length;

    let chars: Vec<(usize, char)> = cleaned.char_indices().collect();
    if chars.len() <= max_len {
        return cleaned.to_string();
    }

    let search_start = display.sentence_search_start.min(max_len);
    let window = search_start..max_len;

    let cut = window
        .clone()
        .rev()
        .find(|&i| SENTENCE_ENDINGS.contains(&chars[i].1))
        .map(|i| i + 1)
        .or_else(|| {
            window
                .rev()
                .find(|&i| chars[i].1.is_whitespace() || chars[i].1 == '，')
        })
        .unwrap_or(max_len);

    let end = chars.get(cut).map(|(byte, _)| *byte).unwrap_or(cleaned.len());
    format!("{}...", cleaned[..end].trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn display(max: usize, start: usize) -> DisplayConfig {
        DisplayConfig {
            preview_max_length: max,
            sentence_search_start: start,
            ..Default::default()
        }
    }

    #[test]
    fn test_decode_utf8() {
        let text = decode_text(Path::new("a.md"), "héllo".as_bytes()).unwrap();
        assert_eq!(text, "héllo");
    }

    #[test]
    fn test_decode_strips_utf8_bom() {
        let bytes = [&[0xEF, 0xBB, 0xBF][..], b"# Title"].concat();
        assert_eq!(decode_text(Path::new("a.md"), &bytes).unwrap(), "# Title");
    }

    #[test]
    fn test_decode_utf16le_with_bom() {
        let mut bytes = vec![0xFF, 0xFE];
        for unit in "# Hi".encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        assert_eq!(decode_text(Path::new("a.md"), &bytes).unwrap(), "# Hi");
    }

    #[test]
    fn test_decode_rejects_invalid_utf8() {
        let err = decode_text(Path::new("bad.md"), &[b'a', 0xFF, 0xFE, b'b']).unwrap_err();
        assert!(matches!(err, ParseError::Decode { .. }));
    }

    #[test]
    fn test_preview_short_content_untouched() {
        assert_eq!(format_content_preview("  short text \n", &display(200, 50)), "short text");
    }

    #[test]
    fn test_preview_cuts_at_sentence_end() {
        let content = "First sentence here. Second sentence is much longer than the limit allows";
        let preview = format_content_preview(content, &display(30, 5));
        assert_eq!(preview, "First sentence here....");
    }

    #[test]
    fn test_preview_cuts_at_whitespace_without_sentence_end() {
        let content = "alpha beta gamma delta epsilon zeta eta theta";
        let preview = format_content_preview(content, &display(20, 5));
        assert!(preview.ends_with("..."));
        assert!(preview.len() <= 23);
        assert!(!preview.trim_end_matches("...").ends_with(' '));
    }

    #[test]
    fn test_preview_multibyte_safe() {
        let content = "文档".repeat(200);
        let preview = format_content_preview(&content, &display(10, 2));
        assert_eq!(preview.chars().count(), 13);
    }
}
