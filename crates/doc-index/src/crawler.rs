// doc-index/src/crawler.rs
//! 文档爬取
//!
//! 递归遍历文档根目录，只产出 `.md` / `.mdx` / `.rst` 文件。
//! 单个文件读取失败只记录日志并跳过，不会中断遍历。

use std::fs;
use std::path::{Component, Path, PathBuf};

use ignore::overrides::OverrideBuilder;
use ignore::{DirEntry, Walk, WalkBuilder};

use crate::config::WalkerConfig;
use crate::error::{DocIndexError, Result};
use crate::extract::read_document_text;
use crate::models::{Document, DocumentKind};

/// 一次遍历的统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlStats {
    pub documents: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone)]
pub struct DocumentCrawler {
    root: PathBuf,
    /// 嵌套在根目录下的索引目录，遍历时排除
    excluded_dir: Option<PathBuf>,
    walker: WalkerConfig,
}

impl DocumentCrawler {
    /// 根目录不存在或不可读时返回配置错误
    pub fn new(root: impl Into<PathBuf>, walker: WalkerConfig) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(DocIndexError::Config(format!(
                "文档根目录不存在: {}",
                root.display()
            )));
        }
        fs::read_dir(&root).map_err(|e| {
            DocIndexError::Config(format!("文档根目录不可读 {}: {}", root.display(), e))
        })?;

        Ok(Self {
            root,
            excluded_dir: None,
            walker,
        })
    }

    /// 排除某个目录（通常是索引存储目录）
    pub fn exclude_dir(mut self, dir: &Path) -> Self {
        self.excluded_dir = Some(dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf()));
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// 开始一次新的遍历；每次调用都会重新扫描目录
    pub fn crawl(&self) -> Result<Crawl> {
        Ok(Crawl {
            root: self.root.clone(),
            walk: self.build_walker()?,
            stats: CrawlStats::default(),
        })
    }

    /// 统计支持的文件数量（不读取内容）
    pub fn count_documents(&self) -> Result<usize> {
        let count = self
            .build_walker()?
            .filter_map(|entry| entry.ok())
            .filter(|entry| is_document(entry).is_some())
            .count();
        Ok(count)
    }

    fn build_walker(&self) -> Result<Walk> {
        let mut builder = WalkBuilder::new(&self.root);
        builder
            .hidden(self.walker.skip_hidden)
            // 文档根目录是用户显式指定的，不应被 .gitignore 排除
            .git_ignore(false)
            .git_global(false)
            .git_exclude(false)
            .parents(false)
            .ignore(self.walker.respect_ignore)
            .follow_links(self.walker.follow_symlinks)
            .sort_by_file_name(|a, b| a.cmp(b));

        if self.walker.max_depth > 0 {
            builder.max_depth(Some(self.walker.max_depth));
        }

        if !self.walker.custom_ignore_patterns.is_empty() {
            let mut overrides = OverrideBuilder::new(&self.root);
            for pattern in &self.walker.custom_ignore_patterns {
                overrides.add(&format!("!{}", pattern)).map_err(|e| {
                    DocIndexError::Config(format!("无效的排除规则 '{}': {}", pattern, e))
                })?;
            }
            let overrides = overrides
                .build()
                .map_err(|e| DocIndexError::Config(format!("排除规则构建失败: {}", e)))?;
            builder.overrides(overrides);
        }

        if let Some(excluded) = self.excluded_dir.clone() {
            builder.filter_entry(move |entry| {
                let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
                !(is_dir && is_same_dir(entry.path(), &excluded))
            });
        }

        Ok(builder.build())
    }
}

fn is_same_dir(path: &Path, excluded: &Path) -> bool {
    path == excluded
        || path
            .canonicalize()
            .map(|canonical| canonical == excluded)
            .unwrap_or(false)
}

fn is_document(entry: &DirEntry) -> Option<DocumentKind> {
    if !entry.file_type().is_some_and(|t| t.is_file()) {
        return None;
    }
    DocumentKind::from_path(entry.path())
}

/// 相对根目录的稳定路径，统一使用 `/` 分隔
fn relative_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// 一次惰性遍历
pub struct Crawl {
    root: PathBuf,
    walk: Walk,
    stats: CrawlStats,
}

impl Crawl {
    pub fn stats(&self) -> CrawlStats {
        self.stats
    }
}

impl Iterator for Crawl {
    type Item = Document;

    fn next(&mut self) -> Option<Document> {
        loop {
            let entry = match self.walk.next()? {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("遍历错误: {}", e);
                    continue;
                }
            };

            let Some(kind) = is_document(&entry) else {
                continue;
            };

            match read_document_text(entry.path()) {
                Ok(text) => {
                    self.stats.documents += 1;
                    let path = relative_path(&self.root, entry.path());
                    tracing::debug!("读取文档: {}", path);
                    return Some(Document::new(path, text, kind));
                }
                Err(e) => {
                    self.stats.skipped += 1;
                    tracing::warn!("跳过文件 {:?}: {}", e.path(), e);
                }
            }
        }
    }
}
