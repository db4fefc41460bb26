// doc-index/src/error.rs
//! 错误类型
//!
//! 单文件的读取/解码失败（[`ParseError`]）只在爬取阶段记录并跳过，
//! 不会向外传播；其余错误通过 [`DocIndexError`] 返回给调用方。

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DocIndexError>;

#[derive(Debug, Error)]
pub enum DocIndexError {
    /// 文档根目录不存在/不可读，或索引目录不可写
    #[error("配置错误: {0}")]
    Config(String),

    /// 索引已存在且未设置 force
    #[error("索引已存在: {}（使用 force=true 覆盖）", .0.display())]
    IndexExists(PathBuf),

    /// 尚未成功构建过索引
    #[error("索引不存在: {}，请先构建索引", .0.display())]
    IndexMissing(PathBuf),

    /// 已有构建正在进行
    #[error("已有索引构建正在进行")]
    BuildInProgress,

    /// 查询参数非法（limit 越界等）
    #[error("查询错误: {0}")]
    Query(String),

    #[error("索引清单损坏 {}: {message}", path.display())]
    Manifest { path: PathBuf, message: String },

    #[error(transparent)]
    Tantivy(#[from] tantivy::TantivyError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// 单个文档读取失败
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("无法读取 {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("无法解码 {} ({encoding})", path.display())]
    Decode { path: PathBuf, encoding: &'static str },
}

impl ParseError {
    pub fn path(&self) -> &std::path::Path {
        match self {
            ParseError::Read { path, .. } | ParseError::Decode { path, .. } => path,
        }
    }
}
