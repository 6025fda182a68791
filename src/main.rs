use anyhow::Context;
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use cardboard_atlas::config::{CliArgs, PipelineConfig};
use cardboard_atlas::pipeline::{Pipeline, ProcessingResult};

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(format!("cardboard_atlas={level}")))
        .init();
}

fn report(config: &PipelineConfig, result: &ProcessingResult) {
    let verb = if config.dry_run { "Inspected" } else { "Processed" };
    println!(
        "{verb} {} panels on a {}px atlas in {:.2}s",
        result.shape_count,
        config.atlas.size,
        result.duration.as_secs_f64()
    );
    if config.dry_run {
        return;
    }
    for (label, path) in [("Project", &config.output), ("Guide", &config.guide)] {
        if let Some(path) = path {
            println!("  {label}: {}", path.display());
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();
    init_tracing(args.verbose);

    let config: PipelineConfig = args.into();

    // Texture decodes run on the global rayon pool
    if let Some(threads) = config.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("Failed to size the decode thread pool")?;
    }

    let result = Pipeline::run(&config).map_err(|e| {
        error!(%e, input = %config.input.display(), "Atlas run failed");
        e
    });
    let result = result.with_context(|| format!("Cannot process {}", config.input.display()))?;

    report(&config, &result);
    Ok(())
}
