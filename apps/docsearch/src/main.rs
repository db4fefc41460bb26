mod cli;
mod command;
mod config;
mod error;
mod render;

use error::WrapErr;

use clap::CommandFactory;
use clap::Parser;
use tracing::level_filters::LevelFilter;

// NOTE, if built using MUSL, it's probably necessary to change to use a different
// allocator just like what ripgrep does: https://github.com/BurntSushi/ripgrep/blob/0a88cccd5188074de96f54a4b6b44a63971ac157/crates/core/main.rs#L40

fn level_from_verbosity(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

#[tokio::main]
async fn main() -> error::Result<()> {
    color_eyre::install()?;
    let command_line = cli::Cli::parse();

    // 日志写到 stderr，stdout 只输出结果
    tracing_subscriber::fmt()
        .with_max_level(level_from_verbosity(command_line.verbose))
        .with_writer(std::io::stderr)
        .init();

    let cfg = config::Config::load(command_line.config.as_deref())
        .context("Load configuration error")?
        .apply_env(|key| std::env::var_os(key))
        .apply_cli(&command_line);

    if let Some(command) = command_line.command {
        let cmd: Box<dyn command::Command> = match command {
            cli::Commands::Search { query, mode, limit, highlight, json } => Box::new(
                command::SearchCommand::new(cfg, query, mode, limit, highlight, json),
            ),
            cli::Commands::Build { force } => Box::new(command::BuildCommand::new(cfg, force)),
            cli::Commands::Update => Box::new(command::UpdateCommand::new(cfg)),
            cli::Commands::Info { json } => Box::new(command::InfoCommand::new(cfg, json)),
        };
        cmd.execute().await?;
    } else {
        cli::Cli::command().print_help()?;
    }

    Ok(())
}
