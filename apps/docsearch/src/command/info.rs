use super::Command;
use crate::config::Config;
use crate::error::Result;
use crate::render::{self, InfoReport};

use doc_index::DocSearchEngine;

pub struct InfoCommand {
    config: Config,
    json: bool,
}

impl InfoCommand {
    pub fn new(cfg: Config, json: bool) -> Self {
        Self { config: cfg, json }
    }
}

#[async_trait::async_trait]
impl Command for InfoCommand {
    async fn execute(&self) -> Result<()> {
        let engine = DocSearchEngine::new(self.config.engine_config()?)?;
        let report = InfoReport {
            info: engine.get_index_info(),
            documents_on_disk: engine.count_documents()?,
        };

        if self.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            println!("{}", render::info_report(&report));
        }
        Ok(())
    }
}
