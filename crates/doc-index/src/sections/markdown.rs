// doc-index/src/sections/markdown.rs
//! Markdown / MDX 标题识别（ATX 风格 `#` ~ `######`）

use super::{Heading, lines_with_offsets};

/// 代码块围栏
struct Fence {
    marker: char,
    len: usize,
}

pub(crate) fn headings(text: &str) -> Vec<Heading> {
    let mut headings = Vec::new();
    let mut fence: Option<Fence> = None;

    for (offset, line) in lines_with_offsets(text) {
        if let Some((marker, len, rest)) = fence_marker(line) {
            match &fence {
                None => {
                    fence = Some(Fence { marker, len });
                    continue;
                }
                Some(open) if open.marker == marker && len >= open.len && rest.trim().is_empty() => {
                    fence = None;
                    continue;
                }
                Some(_) => {}
            }
        }
        if fence.is_some() {
            continue;
        }
        if let Some((level, title)) = atx_heading(line) {
            headings.push(Heading { offset, title, level });
        }
    }

    headings
}

/// 去掉最多 3 个空格的缩进；缩进更多的是缩进代码块
fn strip_indent(line: &str) -> Option<&str> {
    let rest = line.trim_start_matches(' ');
    (line.len() - rest.len() <= 3).then_some(rest)
}

/// 识别 ``` 或 ~~~ 围栏行
fn fence_marker(line: &str) -> Option<(char, usize, &str)> {
    let rest = strip_indent(line)?;
    let marker = rest.chars().next().filter(|c| *c == '`' || *c == '~')?;
    let len = rest.chars().take_while(|c| *c == marker).count();
    if len < 3 {
        return None;
    }
    Some((marker, len, &rest[len..]))
}

fn atx_heading(line: &str) -> Option<(u8, String)> {
    let line = strip_indent(line)?;
    let hashes = line.bytes().take_while(|b| *b == b'#').count();
    if hashes == 0 || hashes > 6 {
        return None;
    }
    let rest = &line[hashes..];
    if !(rest.is_empty() || rest.starts_with(' ') || rest.starts_with('\t')) {
        return None;
    }

    let title = rest.trim();
    // 去掉可选的结尾 `#` 序列
    let without_closing = title.trim_end_matches('#');
    let title = if without_closing.is_empty() {
        ""
    } else if without_closing.ends_with(' ') || without_closing.ends_with('\t') {
        without_closing.trim_end()
    } else {
        title
    };

    Some((hashes as u8, title.to_string()))
}
