// doc-index/src/sections/mod.rs
//! 章节切分
//!
//! 按标题行把文档切成扁平的章节列表（不构建树），
//! 每种格式只负责找出标题行，切分规则统一在这里处理。

mod markdown;
mod rst;

use crate::models::{Document, Section};

/// 找到的一个标题
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Heading {
    /// 标题起始行在原文中的字节偏移
    pub offset: usize,
    pub title: String,
    pub level: u8,
}

/// 按格式选择的章节解析器
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionParser {
    Markdown,
    Rst,
}

impl SectionParser {
    pub fn parse(&self, document: &Document) -> Vec<Section> {
        let headings = match self {
            SectionParser::Markdown => markdown::headings(&document.text),
            SectionParser::Rst => rst::headings(&document.text),
        };
        split_at_headings(&document.path, &document.text, &headings)
    }
}

/// 按行切分并保留每行的起始偏移（行内容不含换行符）
pub(crate) fn lines_with_offsets(text: &str) -> Vec<(usize, &str)> {
    let mut offset = 0;
    text.split_inclusive('\n')
        .map(|raw| {
            let start = offset;
            offset += raw.len();
            let line = raw.strip_suffix('\n').unwrap_or(raw);
            (start, line.strip_suffix('\r').unwrap_or(line))
        })
        .collect()
}

fn split_at_headings(path: &str, text: &str, headings: &[Heading]) -> Vec<Section> {
    let Some(first) = headings.first() else {
        return vec![Section {
            path: path.to_string(),
            section_idx: 0,
            title: String::new(),
            level: 0,
            text: text.to_string(),
        }];
    };

    let mut sections = Vec::with_capacity(headings.len() + 1);

    // 只有空白的前导内容并入第一个章节，保证拼接后不丢字节
    let preamble = &text[..first.offset];
    let mut starts: Vec<(usize, &str, u8)> = Vec::with_capacity(headings.len() + 1);
    if preamble.trim().is_empty() {
        starts.push((0, first.title.as_str(), first.level));
    } else {
        starts.push((0, "", 0));
        starts.push((first.offset, first.title.as_str(), first.level));
    }
    starts.extend(headings[1..].iter().map(|h| (h.offset, h.title.as_str(), h.level)));

    for (i, (start, title, level)) in starts.iter().enumerate() {
        let end = starts.get(i + 1).map(|(next, _, _)| *next).unwrap_or(text.len());
        sections.push(Section {
            path: path.to_string(),
            section_idx: i,
            title: title.to_string(),
            level: *level,
            text: text[*start..end].to_string(),
        });
    }

    sections
}
