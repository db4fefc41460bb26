mod build;
mod info;
mod search;
mod update;

use crate::error::Result;

pub use build::BuildCommand;
pub use info::InfoCommand;
pub use search::SearchCommand;
pub use update::UpdateCommand;

#[async_trait::async_trait]
pub trait Command {
    async fn execute(&self) -> Result<()>;
}
