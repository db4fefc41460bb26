//! 应用标识与固定文件名

pub const TOP_LEVEL_DOMAIN: &str = "io";
pub const AUTHOR: &str = "docsearch";
pub const APP_NAME: &str = "docsearch";

/// 配置目录下的配置文件
pub const CONFIG_FILE_NAME: &str = "docsearch.toml";

/// 缓存目录下默认的索引子目录
pub const INDEX_DIR_NAME: &str = "index";
