// doc-index/src/schema/builder.rs
//! Schema 构建器
//!
//! 构建 Tantivy 索引 Schema，统一管理字段配置

use tantivy::schema::*;

use super::fields::*;
use crate::analyzer::ANALYZER_NAME;

/// 构建 Tantivy Schema
///
/// - `path`: 相对路径，精确匹配，存储
/// - `title`: 文档标题，只存储
/// - `section_title`: 章节标题，词干分析，存储
/// - `section_idx`: 章节序号，存储
/// - `level`: 标题层级，存储
/// - `content`: 章节原文，词干分析，存储
pub fn build_schema() -> Schema {
    let mut schema_builder = Schema::builder();

    // 建索引和解析查询使用同一个分析器
    let text_options = TextOptions::default()
        .set_indexing_options(
            TextFieldIndexing::default()
                .set_tokenizer(ANALYZER_NAME)
                .set_index_option(IndexRecordOption::WithFreqsAndPositions),
        )
        .set_stored();

    schema_builder.add_text_field(FIELD_PATH, STRING | STORED);
    schema_builder.add_text_field(FIELD_TITLE, STORED);
    schema_builder.add_text_field(FIELD_SECTION_TITLE, text_options.clone());
    schema_builder.add_u64_field(FIELD_SECTION_IDX, INDEXED | STORED | FAST);
    schema_builder.add_u64_field(FIELD_LEVEL, STORED);
    schema_builder.add_text_field(FIELD_CONTENT, text_options);

    schema_builder.build()
}

/// Schema 字段辅助结构
///
/// 缓存字段引用，避免重复查找
#[derive(Debug, Clone, Copy)]
pub struct SchemaFields {
    pub path: Field,
    pub title: Field,
    pub section_title: Field,
    pub section_idx: Field,
    pub level: Field,
    pub content: Field,
}

impl SchemaFields {
    /// 从 Schema 中提取所有字段引用
    pub fn from_schema(schema: &Schema) -> tantivy::Result<Self> {
        Ok(Self {
            path: schema.get_field(FIELD_PATH)?,
            title: schema.get_field(FIELD_TITLE)?,
            section_title: schema.get_field(FIELD_SECTION_TITLE)?,
            section_idx: schema.get_field(FIELD_SECTION_IDX)?,
            level: schema.get_field(FIELD_LEVEL)?,
            content: schema.get_field(FIELD_CONTENT)?,
        })
    }
}
