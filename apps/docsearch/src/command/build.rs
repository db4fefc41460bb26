use super::Command;
use crate::config::Config;
use crate::error::{Result, WrapErr};
use crate::render;

use doc_index::{BuildResult, DocSearchEngine};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{BufRead, IsTerminal, Write};
use std::sync::Arc;
use std::time::Duration;

pub struct BuildCommand {
    config: Config,
    force: bool,
}

impl BuildCommand {
    pub fn new(cfg: Config, force: bool) -> Self {
        Self { config: cfg, force }
    }
}

#[async_trait::async_trait]
impl Command for BuildCommand {
    async fn execute(&self) -> Result<()> {
        let engine = Arc::new(DocSearchEngine::new(self.config.engine_config()?)?);

        let mut force = self.force;
        let info = engine.get_index_info();
        // 非交互环境下不询问，直接由引擎返回 IndexExists
        if !force && info.exists && std::io::stdin().is_terminal() {
            if !confirm_overwrite(&info.index_dir)? {
                println!("Aborted, existing index kept.");
                return Ok(());
            }
            force = true;
        }

        let result = run_build(engine, force).await?;
        println!("{}", render::build_result(&result));
        Ok(())
    }
}

fn confirm_overwrite(index_dir: &str) -> Result<bool> {
    print!("An index already exists at {}. Overwrite? (yes/no): ", index_dir);
    std::io::stdout().flush()?;

    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(is_yes(&answer))
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// 在阻塞线程池中构建索引，并显示进度
pub(crate) async fn run_build(engine: Arc<DocSearchEngine>, force: bool) -> Result<BuildResult> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner} 索引中 [{elapsed}] | 文档 {pos} | {msg}")?
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    pb.enable_steady_tick(Duration::from_millis(120));

    let progress = pb.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        engine.build_documentation_index_with_progress(force, |documents, sections| {
            progress.set_position(documents as u64);
            progress.set_message(format!("章节 {}", sections));
        })
    })
    .await
    .wrap_err("Index build task failed")?;

    pb.finish_and_clear();
    Ok(outcome?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("yes\n", true)]
    #[case("Y", true)]
    #[case("  yes  ", true)]
    #[case("no", false)]
    #[case("", false)]
    #[case("yess", false)]
    fn test_is_yes(#[case] answer: &str, #[case] expected: bool) {
        assert_eq!(is_yes(answer), expected);
    }
}
