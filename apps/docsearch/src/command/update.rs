use super::Command;
use super::build::run_build;
use crate::config::Config;
use crate::error::Result;
use crate::render;

use doc_index::DocSearchEngine;
use std::sync::Arc;

/// 完整重建，不询问
pub struct UpdateCommand {
    config: Config,
}

impl UpdateCommand {
    pub fn new(cfg: Config) -> Self {
        Self { config: cfg }
    }
}

#[async_trait::async_trait]
impl Command for UpdateCommand {
    async fn execute(&self) -> Result<()> {
        let engine = Arc::new(DocSearchEngine::new(self.config.engine_config()?)?);
        let result = run_build(engine, true).await?;
        println!("{}", render::build_result(&result));
        Ok(())
    }
}
