//! 应用层统一使用 color-eyre 报告错误

pub type Result<T> = color_eyre::Result<T>;

pub use color_eyre::eyre::OptionExt;
pub use color_eyre::eyre::WrapErr;
