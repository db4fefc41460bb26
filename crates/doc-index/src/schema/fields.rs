// doc-index/src/schema/fields.rs
//! 字段名常量定义

/// 文档相对路径（精确匹配，不分词）
pub const FIELD_PATH: &str = "path";

/// 文档标题（第一个一级标题或文件名），只存储
pub const FIELD_TITLE: &str = "title";

/// 章节标题，分词并存储
pub const FIELD_SECTION_TITLE: &str = "section_title";

/// 章节在文档内的序号
pub const FIELD_SECTION_IDX: &str = "section_idx";

/// 标题层级，只存储
pub const FIELD_LEVEL: &str = "level";

/// 章节原文（全文检索主字段），分词并存储
pub const FIELD_CONTENT: &str = "content";
