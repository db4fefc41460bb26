// doc-index/src/config.rs
//! 配置模块

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 搜索引擎配置
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct EngineConfig {
    /// 文档根目录
    pub docs_root: PathBuf,
    /// 索引存储目录
    pub index_dir: PathBuf,
    pub index: IndexConfig,
    pub walker: WalkerConfig,
    pub display: DisplayConfig,
}

/// 索引配置
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct IndexConfig {
    /// IndexWriter 内存预算（字节）
    pub writer_memory: usize,
}

/// Walker 配置
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct WalkerConfig {
    pub respect_ignore: bool,
    pub skip_hidden: bool,
    pub follow_symlinks: bool,
    /// 0 表示不限制
    pub max_depth: usize,
    /// 额外排除的 glob
    pub custom_ignore_patterns: Vec<String>,
}

/// 显示配置
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct DisplayConfig {
    /// snippet 模式摘要的最大字符数
    pub preview_max_length: usize,
    /// 预览截断时从该位置开始向后寻找句子结尾
    pub sentence_search_start: usize,
    pub default_limit: usize,
    /// snippet 中是否用 `**` 标出命中词
    pub highlight: bool,
}

/// 单次查询允许的最大结果数
pub const MAX_LIMIT: usize = 100;

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            docs_root: PathBuf::from("./docs"),
            index_dir: PathBuf::from("./doc_index"),
            index: IndexConfig::default(),
            walker: WalkerConfig::default(),
            display: DisplayConfig::default(),
        }
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            writer_memory: 50_000_000,
        }
    }
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self {
            respect_ignore: true,
            skip_hidden: true,
            follow_symlinks: false,
            max_depth: 0,
            custom_ignore_patterns: vec![
                "node_modules".to_string(),
                "target".to_string(),
                ".git".to_string(),
            ],
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            preview_max_length: 200,
            sentence_search_start: 50,
            default_limit: 10,
            highlight: false,
        }
    }
}

impl EngineConfig {
    pub fn new(docs_root: impl Into<PathBuf>, index_dir: impl Into<PathBuf>) -> Self {
        Self {
            docs_root: docs_root.into(),
            index_dir: index_dir.into(),
            ..Default::default()
        }
    }
}
