// doc-index/src/indexer.rs
//! 索引构建
//!
//! 每次构建都是完整重建：爬取 → 分章节 → 写入新的一代 → 原子发布。

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tantivy::IndexWriter;

use crate::config::EngineConfig;
use crate::crawler::DocumentCrawler;
use crate::error::{DocIndexError, Result};
use crate::models::BuildResult;
use crate::schema::IndexEntry;
use crate::store::{BuildMeta, IndexStore};

pub struct IndexBuilder {
    store: Arc<IndexStore>,
    config: EngineConfig,
}

impl IndexBuilder {
    pub fn new(store: Arc<IndexStore>, config: EngineConfig) -> Self {
        Self { store, config }
    }

    /// 构建索引；索引已存在且未设置 force 时返回 [`DocIndexError::IndexExists`]
    pub fn build(&self, force: bool) -> Result<BuildResult> {
        self.build_with_progress(force, |_, _| {})
    }

    /// 构建索引（带进度回调，参数为已处理的文档数和章节数）
    ///
    /// 同一索引目录同一时间只允许一次构建，无论来自哪个进程；
    /// 锁被占用时返回 [`DocIndexError::BuildInProgress`]
    pub fn build_with_progress<F>(&self, force: bool, progress: F) -> Result<BuildResult>
    where
        F: Fn(usize, usize),
    {
        let _lock = self.store.lock_builds()?;
        if !force && self.store.exists() {
            return Err(DocIndexError::IndexExists(self.store.dir().to_path_buf()));
        }
        self.rebuild(progress)
    }

    /// 重新构建，等价于 `build(true)`
    pub fn update(&self) -> Result<BuildResult> {
        self.build(true)
    }

    fn rebuild<F>(&self, progress: F) -> Result<BuildResult>
    where
        F: Fn(usize, usize),
    {
        let started = Instant::now();
        let crawler = DocumentCrawler::new(&self.config.docs_root, self.config.walker.clone())?
            .exclude_dir(self.store.dir());

        tracing::info!("开始构建索引: {}", crawler.root().display());

        let staged = self.store.stage()?;
        let fields = *staged.fields();
        let mut writer: IndexWriter = staged.index().writer(self.config.index.writer_memory)?;

        let mut crawl = crawler.crawl()?;
        let mut document_count = 0;
        let mut section_count = 0;

        for document in crawl.by_ref() {
            let sections = document.sections();
            let title = document.title(&sections);
            tracing::debug!("{}: {} 个章节", document.path, sections.len());

            for section in sections {
                let entry = IndexEntry::from_section(section, &title);
                writer.add_document(entry.to_document(&fields))?;
                section_count += 1;
            }

            document_count += 1;
            progress(document_count, section_count);
        }

        let skipped_files = crawl.stats().skipped;
        writer.commit()?;
        writer.wait_merging_threads()?;

        let built_at = Utc::now();
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        self.store.publish(
            staged,
            BuildMeta {
                document_count,
                section_count,
                skipped_files,
                built_at,
                elapsed_ms,
                docs_root: crawler.root().to_string_lossy().into_owned(),
            },
        )?;

        tracing::info!(
            "索引构建完成: {} 个文档, {} 个章节, 跳过 {} 个文件, 耗时 {} ms",
            document_count,
            section_count,
            skipped_files,
            elapsed_ms
        );

        Ok(BuildResult {
            document_count,
            section_count,
            skipped_files,
            built_at,
            elapsed_ms,
        })
    }
}
