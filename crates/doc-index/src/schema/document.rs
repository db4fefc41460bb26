// doc-index/src/schema/document.rs
//! 索引条目
//!
//! 每个章节对应一条索引条目，负责与 Tantivy 文档互相转换

use serde::{Deserialize, Serialize};
use tantivy::TantivyDocument;
use tantivy::doc;
use tantivy::schema::{Field, Value};

use super::builder::SchemaFields;
use crate::models::Section;

/// 索引条目 - 待写入 Tantivy 的章节
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub path: String,
    /// 所属文档的标题
    pub title: String,
    pub section_title: String,
    pub section_idx: usize,
    pub level: u8,
    /// 章节原文，原样存储
    pub content: String,
}

impl IndexEntry {
    pub fn from_section(section: Section, document_title: &str) -> Self {
        Self {
            path: section.path,
            title: document_title.to_string(),
            section_title: section.title,
            section_idx: section.section_idx,
            level: section.level,
            content: section.text,
        }
    }

    pub fn to_document(&self, fields: &SchemaFields) -> TantivyDocument {
        doc!(
            fields.path => self.path.as_str(),
            fields.title => self.title.as_str(),
            fields.section_title => self.section_title.as_str(),
            fields.section_idx => self.section_idx as u64,
            fields.level => u64::from(self.level),
            fields.content => self.content.as_str(),
        )
    }

    /// 从存储字段还原条目
    pub fn from_document(doc: &TantivyDocument, fields: &SchemaFields) -> Self {
        let text = |field: Field| {
            doc.get_first(field)
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string()
        };
        let number = |field: Field| doc.get_first(field).and_then(|v| v.as_u64()).unwrap_or(0);

        Self {
            path: text(fields.path),
            title: text(fields.title),
            section_title: text(fields.section_title),
            section_idx: number(fields.section_idx) as usize,
            level: u8::try_from(number(fields.level)).unwrap_or(u8::MAX),
            content: text(fields.content),
        }
    }
}
