use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser as _;

fn main() -> ExitCode {
    if let Err(err) = try_main() {
        eprintln!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn try_main() -> anyhow::Result<()> {
    iiifanno::logging::init().context("init logging")?;

    let cli = iiifanno::cli::Cli::parse();
    tracing::debug!(?cli, "parsed cli");

    match cli.command {
        iiifanno::cli::Command::Check(args) => {
            iiifanno::check::run(args).context("check")?;
        }
        iiifanno::cli::Command::Extract(args) => {
            iiifanno::extract::run(args).context("extract")?;
        }
        iiifanno::cli::Command::Insert(args) => {
            iiifanno::insert::run(args).context("insert")?;
        }
    }

    Ok(())
}
