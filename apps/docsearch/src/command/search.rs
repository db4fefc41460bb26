use super::Command;
use crate::config::Config;
use crate::error::Result;
use crate::render;

use doc_index::{DocSearchEngine, SearchMode};

pub struct SearchCommand {
    config: Config,
    query: String,
    mode: SearchMode,
    limit: Option<usize>,
    highlight: bool,
    json: bool,
}

impl SearchCommand {
    pub fn new(
        cfg: Config,
        query: String,
        mode: SearchMode,
        limit: Option<usize>,
        highlight: bool,
        json: bool,
    ) -> Self {
        Self {
            config: cfg,
            query,
            mode,
            limit,
            highlight,
            json,
        }
    }
}

#[async_trait::async_trait]
impl Command for SearchCommand {
    async fn execute(&self) -> Result<()> {
        let mut engine_config = self.config.engine_config()?;
        engine_config.display.highlight |= self.highlight;
        let engine = DocSearchEngine::new(engine_config)?;

        let results = engine.search_documentation(&self.query, self.mode, self.limit)?;
        tracing::info!("查询 '{}' 返回 {} 条结果", self.query, results.len());

        if self.json {
            println!("{}", serde_json::to_string_pretty(&results)?);
        } else {
            println!("{}", render::search_results(&self.query, &results));
        }
        Ok(())
    }
}
