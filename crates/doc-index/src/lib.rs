// doc-index/src/lib.rs
//! 文档全文检索引擎
//!
//! 把一个目录下的 Markdown / reStructuredText 文档按标题切成章节，
//! 建立基于 Tantivy 的词干全文索引，并按章节返回排序后的结果：
//! - 章节级索引，命中只落在包含查询词的章节
//! - 英文词干分析（running / runs / run 互相匹配）
//! - 原子发布，构建中断不影响已有索引

use std::sync::Arc;

pub mod analyzer;
pub mod config;
pub mod crawler;
pub mod error;
pub mod extract;
pub mod indexer;
pub mod models;
pub mod schema;
pub mod search;
pub mod sections;
pub mod store;

// 重导出核心类型
pub use analyzer::Analyzer;
pub use config::{DisplayConfig, EngineConfig, IndexConfig, MAX_LIMIT, WalkerConfig};
pub use crawler::{CrawlStats, DocumentCrawler};
pub use error::{DocIndexError, ParseError, Result};
pub use indexer::IndexBuilder;
pub use models::{
    BuildResult, Document, DocumentKind, IndexInfo, SearchMode, SearchResult, Section,
};
pub use search::QueryEngine;
pub use sections::SectionParser;
pub use store::{IndexStore, Manifest};

/// 检索引擎统一入口
///
/// 对外提供四个操作：查询、构建、更新、查看索引信息。
/// 可以放在 `Arc` 中被多个线程共享；查询不会被正在进行的构建阻塞。
pub struct DocSearchEngine {
    config: EngineConfig,
    store: Arc<IndexStore>,
    builder: IndexBuilder,
    query: QueryEngine,
}

impl DocSearchEngine {
    /// 文档根目录不存在/不可读，或索引目录不可写时返回 [`DocIndexError::Config`]
    pub fn new(config: EngineConfig) -> Result<Self> {
        DocumentCrawler::new(&config.docs_root, config.walker.clone())?;

        let store = Arc::new(IndexStore::open(&config.index_dir, Analyzer::new()));
        store.check_writable()?;

        tracing::debug!(
            "检索引擎已初始化: docs_root={:?}, index_dir={:?}",
            config.docs_root,
            config.index_dir
        );

        Ok(Self {
            builder: IndexBuilder::new(Arc::clone(&store), config.clone()),
            query: QueryEngine::new(Arc::clone(&store), config.display.clone()),
            store,
            config,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// 查询文档
    pub fn search_documentation(
        &self,
        query: &str,
        mode: SearchMode,
        limit: Option<usize>,
    ) -> Result<Vec<SearchResult>> {
        self.query.search(query, mode, limit)
    }

    /// 构建索引；已存在时需要 `force`
    pub fn build_documentation_index(&self, force: bool) -> Result<BuildResult> {
        self.builder.build(force)
    }

    /// 构建索引（带进度回调，参数为已处理的文档数和章节数）
    pub fn build_documentation_index_with_progress<F>(
        &self,
        force: bool,
        progress: F,
    ) -> Result<BuildResult>
    where
        F: Fn(usize, usize),
    {
        self.builder.build_with_progress(force, progress)
    }

    /// 完整重建索引
    pub fn update_documentation_index(&self) -> Result<BuildResult> {
        self.builder.update()
    }

    pub fn get_index_info(&self) -> IndexInfo {
        self.store.info()
    }

    /// 当前文档根目录下支持的文件数量
    pub fn count_documents(&self) -> Result<usize> {
        DocumentCrawler::new(&self.config.docs_root, self.config.walker.clone())?
            .exclude_dir(self.store.dir())
            .count_documents()
    }
}
