use anyhow::{Context, Result};
use clap::Parser;

use frame_binarizer::cli::Cli;
use frame_binarizer::run;

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = cli.config();

    let report = run(&config).map_err(|e| {
        let stage = e.stage();
        anyhow::Error::new(e).context(format!("{} stage failed", stage))
    })?;

    if let Some(path) = &cli.report {
        report
            .write_json(path)
            .context(format!("Failed to write report: {:?}", path))?;
    }

    if !cli.quiet {
        report.print_summary();
    }

    Ok(())
}
