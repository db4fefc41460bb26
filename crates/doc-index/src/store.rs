// doc-index/src/store.rs
//! 索引存储
//!
//! 目录结构：
//!
//! ```text
//! <index_dir>/
//!   manifest.json       当前发布的代 + 元数据，通过 rename 原子替换
//!   gen-<时间>-<id>/     每次构建生成一个不可变的 Tantivy 索引
//!   .build.lock         构建锁，跨进程互斥
//! ```
//!
//! 构建时先在新的代目录中完整写入，最后替换 manifest.json 完成发布；
//! 构建中断时旧的 manifest 和旧的代目录保持不变。

use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tantivy::directory::error::LockError;
use tantivy::directory::{Directory, DirectoryLock, Lock, MmapDirectory};
use tantivy::{Index, IndexReader, ReloadPolicy, TantivyError};

use crate::analyzer::Analyzer;
use crate::error::{DocIndexError, Result};
use crate::models::IndexInfo;
use crate::schema::{SchemaFields, build_schema};

pub const MANIFEST_FILE: &str = "manifest.json";
const GENERATION_PREFIX: &str = "gen-";
const BUILD_LOCK_FILE: &str = ".build.lock";
const OPEN_ATTEMPTS: usize = 3;

/// 已发布索引的元数据
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub generation: String,
    pub document_count: usize,
    pub section_count: usize,
    pub skipped_files: usize,
    pub built_at: DateTime<Utc>,
    pub elapsed_ms: u64,
    pub docs_root: String,
}

/// 已打开的某一代索引，发布后不再修改，可被多个查询共享
pub struct PublishedIndex {
    pub manifest: Manifest,
    pub index: Index,
    pub reader: IndexReader,
    pub fields: SchemaFields,
}

/// 正在构建、尚未发布的一代索引；未发布就被丢弃时删除其目录
pub(crate) struct StagedIndex {
    generation: String,
    path: PathBuf,
    index: Index,
    fields: SchemaFields,
    published: bool,
}

impl StagedIndex {
    pub fn index(&self) -> &Index {
        &self.index
    }

    pub fn fields(&self) -> &SchemaFields {
        &self.fields
    }

    pub fn generation(&self) -> &str {
        &self.generation
    }
}

impl Drop for StagedIndex {
    fn drop(&mut self) {
        if self.published {
            return;
        }
        if let Err(e) = fs::remove_dir_all(&self.path) {
            tracing::warn!("清理未发布的索引失败 {:?}: {}", self.path, e);
        } else {
            tracing::debug!("已丢弃未发布的索引: {}", self.generation);
        }
    }
}

/// 构建锁，释放前同一索引目录上的其他构建（包括其他进程）都会被拒绝
pub(crate) struct BuildLock {
    _lock: DirectoryLock,
}

/// 发布时写入清单的构建信息
pub(crate) struct BuildMeta {
    pub document_count: usize,
    pub section_count: usize,
    pub skipped_files: usize,
    pub built_at: DateTime<Utc>,
    pub elapsed_ms: u64,
    pub docs_root: String,
}

pub struct IndexStore {
    dir: PathBuf,
    analyzer: Analyzer,
    current: RwLock<Option<Arc<PublishedIndex>>>,
}

impl IndexStore {
    /// 打开索引目录；目录或索引不存在也可以，此时 `exists()` 为 false
    pub fn open(dir: impl Into<PathBuf>, analyzer: Analyzer) -> Self {
        Self {
            dir: dir.into(),
            analyzer,
            current: RwLock::new(None),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn analyzer(&self) -> &Analyzer {
        &self.analyzer
    }

    fn manifest_path(&self) -> PathBuf {
        self.dir.join(MANIFEST_FILE)
    }

    /// 读取当前清单，没有发布过则返回 None
    pub fn read_manifest(&self) -> Result<Option<Manifest>> {
        let path = self.manifest_path();
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| DocIndexError::Manifest {
                path,
                message: e.to_string(),
            })
    }

    fn published_manifest(&self) -> Result<Option<Manifest>> {
        Ok(self
            .read_manifest()?
            .filter(|m| self.dir.join(&m.generation).is_dir()))
    }

    pub fn exists(&self) -> bool {
        match self.published_manifest() {
            Ok(manifest) => manifest.is_some(),
            Err(e) => {
                tracing::warn!("读取索引清单失败: {}", e);
                false
            }
        }
    }

    pub fn info(&self) -> IndexInfo {
        let manifest = self.published_manifest().unwrap_or_else(|e| {
            tracing::warn!("读取索引清单失败: {}", e);
            None
        });
        let index_dir = self.dir.to_string_lossy().into_owned();

        match manifest {
            Some(m) => IndexInfo {
                exists: true,
                document_count: m.document_count,
                section_count: m.section_count,
                skipped_files: m.skipped_files,
                built_at: Some(m.built_at),
                docs_root: Some(m.docs_root),
                index_dir,
            },
            None => IndexInfo {
                exists: false,
                document_count: 0,
                section_count: 0,
                skipped_files: 0,
                built_at: None,
                docs_root: None,
                index_dir,
            },
        }
    }

    /// 获取当前发布的索引；清单指向新的代时重新打开
    pub fn current(&self) -> Result<Arc<PublishedIndex>> {
        let mut last_error = None;

        // 读清单与打开之间旧代可能刚被清理，重新读取清单再试
        for _ in 0..OPEN_ATTEMPTS {
            let manifest = self
                .read_manifest()?
                .ok_or_else(|| DocIndexError::IndexMissing(self.dir.clone()))?;

            if let Some(cached) = self.cached() {
                if cached.manifest.generation == manifest.generation {
                    return Ok(cached);
                }
            }

            match self.open_generation(manifest) {
                Ok(opened) => {
                    let opened = Arc::new(opened);
                    *self.current.write().unwrap_or_else(PoisonError::into_inner) =
                        Some(Arc::clone(&opened));
                    return Ok(opened);
                }
                Err(e) => {
                    tracing::debug!("打开索引失败，重新读取清单: {}", e);
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) if self.exists() => Err(e),
            _ => Err(DocIndexError::IndexMissing(self.dir.clone())),
        }
    }

    fn cached(&self) -> Option<Arc<PublishedIndex>> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn open_generation(&self, manifest: Manifest) -> Result<PublishedIndex> {
        let path = self.dir.join(&manifest.generation);
        let index = Index::open_in_dir(&path)?;
        self.analyzer.register(&index);
        let fields = SchemaFields::from_schema(&index.schema())?;
        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()?;

        tracing::debug!("已打开索引: {}", manifest.generation);
        Ok(PublishedIndex {
            manifest,
            index,
            reader,
            fields,
        })
    }

    /// 获取构建锁；已被持有时返回 [`DocIndexError::BuildInProgress`]
    pub(crate) fn lock_builds(&self) -> Result<BuildLock> {
        self.ensure_dir()?;
        let directory = MmapDirectory::open(&self.dir).map_err(TantivyError::from)?;
        let lock = Lock {
            filepath: PathBuf::from(BUILD_LOCK_FILE),
            is_blocking: false,
        };
        match directory.acquire_lock(&lock) {
            Ok(lock) => Ok(BuildLock { _lock: lock }),
            Err(LockError::LockBusy) => Err(DocIndexError::BuildInProgress),
            Err(e) => Err(TantivyError::from(e).into()),
        }
    }

    /// 创建一个新的、对查询不可见的代
    pub(crate) fn stage(&self) -> Result<StagedIndex> {
        self.ensure_dir()?;

        let generation = format!(
            "{}{}-{}",
            GENERATION_PREFIX,
            Utc::now().format("%Y%m%dT%H%M%S%3fZ"),
            &uuid::Uuid::new_v4().simple().to_string()[..8]
        );
        let path = self.dir.join(&generation);
        fs::create_dir(&path)?;

        let index = Index::create_in_dir(&path, build_schema())?;
        self.analyzer.register(&index);
        let fields = SchemaFields::from_schema(&index.schema())?;

        tracing::debug!("开始构建新的索引代: {}", generation);
        Ok(StagedIndex {
            generation,
            path,
            index,
            fields,
            published: false,
        })
    }

    /// 检查索引目录可用，不创建任何文件
    pub(crate) fn check_writable(&self) -> Result<()> {
        match fs::metadata(&self.dir) {
            Ok(metadata) if !metadata.is_dir() => Err(DocIndexError::Config(format!(
                "索引路径不是目录: {}",
                self.dir.display()
            ))),
            Ok(metadata) if metadata.permissions().readonly() => Err(DocIndexError::Config(
                format!("索引目录不可写: {}", self.dir.display()),
            )),
            Ok(_) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(DocIndexError::Config(format!(
                "无法访问索引目录 {}: {}",
                self.dir.display(),
                e
            ))),
        }
    }

    /// 确保索引目录存在且可写
    pub(crate) fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|e| {
            DocIndexError::Config(format!("无法创建索引目录 {}: {}", self.dir.display(), e))
        })?;
        self.check_writable()
    }

    /// 原子发布：写临时清单后 rename 覆盖。调用方需持有 [`BuildLock`]
    pub(crate) fn publish(&self, mut staged: StagedIndex, meta: BuildMeta) -> Result<Manifest> {
        let manifest = Manifest {
            generation: staged.generation().to_owned(),
            document_count: meta.document_count,
            section_count: meta.section_count,
            skipped_files: meta.skipped_files,
            built_at: meta.built_at,
            elapsed_ms: meta.elapsed_ms,
            docs_root: meta.docs_root,
        };

        let json = serde_json::to_vec_pretty(&manifest).map_err(|e| DocIndexError::Manifest {
            path: self.manifest_path(),
            message: e.to_string(),
        })?;

        let tmp_path = self.dir.join(format!("{}.{}.tmp", MANIFEST_FILE, manifest.generation));
        {
            let mut file = File::create(&tmp_path)?;
            file.write_all(&json)?;
            file.sync_all()?;
        }
        if let Err(e) = fs::rename(&tmp_path, self.manifest_path()) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e.into());
        }
        staged.published = true;

        tracing::info!(
            "索引已发布: {} ({} 个文档, {} 个章节)",
            manifest.generation,
            manifest.document_count,
            manifest.section_count
        );

        self.collect_garbage(&manifest.generation);
        Ok(manifest)
    }

    /// 删除当前代以外的所有代目录，失败留到下次发布再试。
    /// 持有构建锁时不会有其他代正在写入
    fn collect_garbage(&self, keep: &str) {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("无法扫描索引目录: {}", e);
                return;
            }
        };

        for entry in entries.flatten() {
            let name = entry.file_name().to_string_lossy().into_owned();
            if !name.starts_with(GENERATION_PREFIX) || name == keep {
                continue;
            }
            match fs::remove_dir_all(entry.path()) {
                Ok(()) => tracing::debug!("已删除旧索引: {}", name),
                Err(e) => tracing::warn!("删除旧索引失败 {}: {}", name, e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn meta(documents: usize, sections: usize) -> BuildMeta {
        BuildMeta {
            document_count: documents,
            section_count: sections,
            skipped_files: 0,
            built_at: Utc::now(),
            elapsed_ms: 1,
            docs_root: "/docs".to_string(),
        }
    }

    fn commit_empty(staged: &StagedIndex) {
        let mut writer: tantivy::IndexWriter = staged.index().writer(15_000_000).unwrap();
        writer.commit().unwrap();
    }

    #[test]
    fn test_absent_store() {
        let dir = TempDir::new().unwrap();
        let store = IndexStore::open(dir.path().join("index"), Analyzer::new());
        assert!(!store.exists());
        assert!(!store.info().exists);
        assert!(matches!(store.current(), Err(DocIndexError::IndexMissing(_))));
        assert!(!dir.path().join("index").exists());
    }

    #[test]
    fn test_publish_makes_index_visible() {
        let dir = TempDir::new().unwrap();
        let store = IndexStore::open(dir.path(), Analyzer::new());
        let staged = store.stage().unwrap();
        commit_empty(&staged);
        assert!(!store.exists());

        let manifest = store.publish(staged, meta(2, 5)).unwrap();
        assert!(store.exists());
        let info = store.info();
        assert_eq!(info.document_count, 2);
        assert_eq!(info.section_count, 5);
        assert_eq!(store.current().unwrap().manifest, manifest);
    }

    #[test]
    fn test_dropped_stage_leaves_previous_index() {
        let dir = TempDir::new().unwrap();
        let store = IndexStore::open(dir.path(), Analyzer::new());
        let staged = store.stage().unwrap();
        commit_empty(&staged);
        let first = store.publish(staged, meta(1, 1)).unwrap();

        let staged = store.stage().unwrap();
        let abandoned = dir.path().join(staged.generation());
        assert!(abandoned.is_dir());
        drop(staged);

        assert!(!abandoned.exists());
        assert_eq!(store.read_manifest().unwrap(), Some(first.clone()));
        assert_eq!(store.current().unwrap().manifest.generation, first.generation);
    }

    #[test]
    fn test_old_generations_collected() {
        let dir = TempDir::new().unwrap();
        let store = IndexStore::open(dir.path(), Analyzer::new());
        let staged = store.stage().unwrap();
        commit_empty(&staged);
        let first = store.publish(staged, meta(1, 1)).unwrap();
        let old_reader = store.current().unwrap();

        let staged = store.stage().unwrap();
        commit_empty(&staged);
        let second = store.publish(staged, meta(1, 1)).unwrap();

        assert!(!dir.path().join(&first.generation).exists());
        assert!(dir.path().join(&second.generation).is_dir());
        assert_eq!(store.current().unwrap().manifest.generation, second.generation);
        // 旧代已打开的读者不受影响
        assert_eq!(old_reader.manifest.generation, first.generation);
    }

    #[test]
    fn test_collects_generations_named_after_current() {
        let dir = TempDir::new().unwrap();
        let store = IndexStore::open(dir.path(), Analyzer::new());
        // 时钟回拨后留下的代，名字排在新代之后
        let future = dir.path().join("gen-99991231T235959999Z-deadbeef");
        fs::create_dir(&future).unwrap();

        let staged = store.stage().unwrap();
        commit_empty(&staged);
        let manifest = store.publish(staged, meta(1, 1)).unwrap();

        assert!(!future.exists());
        assert!(dir.path().join(&manifest.generation).is_dir());
    }

    #[test]
    fn test_build_lock_is_exclusive_per_directory() {
        let dir = TempDir::new().unwrap();
        let first = IndexStore::open(dir.path().join("index"), Analyzer::new());
        let second = IndexStore::open(dir.path().join("index"), Analyzer::new());

        let held = first.lock_builds().unwrap();
        assert!(matches!(second.lock_builds(), Err(DocIndexError::BuildInProgress)));
        assert!(matches!(first.lock_builds(), Err(DocIndexError::BuildInProgress)));

        drop(held);
        assert!(second.lock_builds().is_ok());
    }

    #[test]
    fn test_corrupt_manifest() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(MANIFEST_FILE), b"{ not json").unwrap();
        let store = IndexStore::open(dir.path(), Analyzer::new());
        assert!(matches!(store.read_manifest(), Err(DocIndexError::Manifest { .. })));
        assert!(!store.exists());
    }
}
