use crate::cli::Cli;
use crate::error::{OptionExt, Result};
use config::{create_strategy, default_index_dir};
use doc_index::{DisplayConfig, EngineConfig, IndexConfig, WalkerConfig};
use serde::{Deserialize, Serialize};
use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// 文档根目录的环境变量
pub const DOCS_ROOT_ENV: &str = "DOCS_ROOT";
/// 索引目录的环境变量
pub const INDEX_DIR_ENV: &str = "INDEX_DIR";

/// 优先级：配置文件 < 环境变量 < 命令行参数
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default = "default_config", deny_unknown_fields)]
pub struct Config {
    /// 要索引的文档根目录
    pub docs_root: Option<PathBuf>,
    pub index_dir: PathBuf,
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub walker: WalkerConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

fn default_config() -> Config {
    let index_dir = create_strategy()
        .map(|strategy| default_index_dir(&strategy))
        .unwrap_or_else(|_| {
            env::temp_dir()
                .join(config::constants::APP_NAME)
                .join(config::constants::INDEX_DIR_NAME)
        });

    Config {
        docs_root: None,
        index_dir,
        index: IndexConfig::default(),
        walker: WalkerConfig::default(),
        display: DisplayConfig::default(),
    }
}

impl Default for Config {
    fn default() -> Self {
        default_config()
    }
}

impl Config {
    fn load_str(user_config_str: &str) -> Result<Config> {
        let user_config: Config = toml::from_str(user_config_str)?;
        Ok(user_config)
    }

    /// 读取配置文件；未指定路径且默认位置没有文件时创建示例配置
    pub fn load(path: Option<&Path>) -> Result<Config> {
        if let Some(path) = path {
            let user_config_str = std::fs::read_to_string(path)?;
            return Self::load_str(&user_config_str);
        }

        let strategy = create_strategy()?;
        let config_path = config::config_file(&strategy);

        match std::fs::read_to_string(&config_path) {
            Ok(user_config_str) => Self::load_str(&user_config_str),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // 配置文件不存在，创建示例配置文件
                if let Err(e) = Self::create_example_config(&config_path) {
                    tracing::warn!("无法创建示例配置 {:?}: {}", config_path, e);
                }
                Self::load_str("")
            }
            Err(e) => Err(e.into()),
        }
    }

    /// 用环境变量覆盖
    pub fn apply_env<F>(mut self, var: F) -> Self
    where
        F: Fn(&str) -> Option<OsString>,
    {
        if let Some(docs_root) = var(DOCS_ROOT_ENV).filter(|v| !v.is_empty()) {
            self.docs_root = Some(PathBuf::from(docs_root));
        }
        if let Some(index_dir) = var(INDEX_DIR_ENV).filter(|v| !v.is_empty()) {
            self.index_dir = PathBuf::from(index_dir);
        }
        self
    }

    /// 用命令行参数覆盖
    pub fn apply_cli(mut self, cli: &Cli) -> Self {
        if let Some(docs_root) = &cli.docs_root {
            self.docs_root = Some(docs_root.clone());
        }
        if let Some(index_dir) = &cli.index_dir {
            self.index_dir = index_dir.clone();
        }
        self
    }

    pub fn engine_config(&self) -> Result<EngineConfig> {
        let docs_root = self.docs_root.clone().ok_or_eyre(
            "未配置文档根目录：使用 --docs-root、环境变量 DOCS_ROOT 或配置文件中的 docs-root",
        )?;

        Ok(EngineConfig {
            docs_root,
            index_dir: self.index_dir.clone(),
            index: self.index.clone(),
            walker: self.walker.clone(),
            display: self.display.clone(),
        })
    }

    fn create_example_config(config_path: &Path) -> Result<()> {
        use std::io::Write;

        // 确保配置目录存在
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let example_config = r#"# docsearch 配置文件
#
# 此文件在首次运行时自动创建
# 命令行参数 --docs-root / --index-dir 与环境变量 DOCS_ROOT / INDEX_DIR 优先于此文件

# 要索引的文档根目录
# docs-root = "/path/to/docs"

# 可选：自定义索引目录（默认位于缓存目录下）
# index-dir = "/custom/index/path"

# [walker]
# skip-hidden = true
# follow-symlinks = false
# max-depth = 0
# custom-ignore-patterns = ["node_modules", "target", ".git"]

# [display]
# preview-max-length = 200
# default-limit = 10
# highlight = false
"#;

        let mut file = std::fs::File::create(config_path)?;
        file.write_all(example_config.as_bytes())?;

        eprintln!("已创建配置文件: {:?}", config_path);
        Ok(())
    }
}
