// doc-index/src/models.rs
//! 数据模型定义

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DocIndexError;
use crate::sections::SectionParser;

/// 文档格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Markdown,
    Rst,
}

/// 扩展名 → 文档格式
const KIND_BY_EXTENSION: &[(&str, DocumentKind)] = &[
    ("md", DocumentKind::Markdown),
    ("mdx", DocumentKind::Markdown),
    ("rst", DocumentKind::Rst),
];

impl DocumentKind {
    /// 按扩展名识别（不区分大小写），不支持的格式返回 None
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        KIND_BY_EXTENSION
            .iter()
            .find(|(supported, _)| supported.eq_ignore_ascii_case(ext))
            .map(|(_, kind)| *kind)
    }

    pub fn parser(self) -> SectionParser {
        match self {
            DocumentKind::Markdown => SectionParser::Markdown,
            DocumentKind::Rst => SectionParser::Rst,
        }
    }
}

/// 一个文档源文件
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// 相对文档根目录的路径，`/` 分隔
    pub path: String,
    pub text: String,
    pub kind: DocumentKind,
}

impl Document {
    pub fn new(path: impl Into<String>, text: impl Into<String>, kind: DocumentKind) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
            kind,
        }
    }

    pub fn sections(&self) -> Vec<Section> {
        self.kind.parser().parse(self)
    }

    /// 文档标题：第一个一级标题，没有则使用文件名
    pub fn title(&self, sections: &[Section]) -> String {
        sections
            .iter()
            .find(|s| s.level == 1 && !s.title.is_empty())
            .map(|s| s.title.clone())
            .unwrap_or_else(|| {
                Path::new(&self.path)
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default()
            })
    }
}

/// 文档中一个带标题的连续片段
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub path: String,
    pub section_idx: usize,
    /// 开头无标题的部分为空字符串
    pub title: String,
    /// 标题层级，开头无标题的部分为 0
    pub level: u8,
    /// 原文片段（包含标题行），按顺序拼接可还原整个文档
    pub text: String,
}

/// 结果渲染模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    #[default]
    Snippet,
    Full,
    Section,
}

impl FromStr for SearchMode {
    type Err = DocIndexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "snippet" => Ok(SearchMode::Snippet),
            "full" => Ok(SearchMode::Full),
            "section" => Ok(SearchMode::Section),
            other => Err(DocIndexError::Query(format!(
                "未知的模式 '{}'，可选: snippet, full, section",
                other
            ))),
        }
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SearchMode::Snippet => "snippet",
            SearchMode::Full => "full",
            SearchMode::Section => "section",
        };
        f.write_str(name)
    }
}

/// 搜索结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub path: String,
    /// 文档标题
    pub title: String,
    pub section_title: String,
    pub section_idx: usize,
    pub level: u8,
    pub score: f32,
    pub mode: SearchMode,
    /// snippet 模式下为摘要，其余模式为完整片段
    pub content: String,
}

/// 索引元数据
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexInfo {
    pub exists: bool,
    pub document_count: usize,
    pub section_count: usize,
    pub skipped_files: usize,
    pub built_at: Option<DateTime<Utc>>,
    pub docs_root: Option<String>,
    pub index_dir: String,
}

/// 一次构建的结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildResult {
    pub document_count: usize,
    pub section_count: usize,
    pub skipped_files: usize,
    pub built_at: DateTime<Utc>,
    pub elapsed_ms: u64,
}
