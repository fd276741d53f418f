use anyhow::{Context, Result};
use clap::Parser;
use loglifecycle::{
    cli::Cli, config::TransformerConfig, output, pass::LifecyclePass, pool::ClassPool,
    transformer::LifecycleTransformer, weaver::RecordingWeaver,
};
use std::io::Write;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber; `--debug` raises the level to TRACE
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Load config file (if any) and apply CLI overrides
fn load_config(args: &Cli) -> Result<TransformerConfig> {
    let mut config = match &args.config {
        Some(path) => TransformerConfig::from_toml_file(path)?,
        None => TransformerConfig::default(),
    };
    if args.debug {
        config.debug = true;
    }
    Ok(config)
}

fn load_pool(args: &Cli) -> Result<ClassPool> {
    let mut pool = if args.no_stubs {
        ClassPool::new()
    } else {
        ClassPool::with_framework_stubs()
    };
    pool.load_json_file(&args.pool)?;
    Ok(pool)
}

fn main() -> Result<()> {
    let args = Cli::parse();

    if args.jobs == 0 {
        anyhow::bail!("Invalid value for --jobs: 0 (must be >= 1)");
    }

    let config = load_config(&args)?;
    init_tracing(config.debug);

    let pool = load_pool(&args)?;
    let class_names = if args.classes.is_empty() {
        pool.class_names()
    } else {
        args.classes.clone()
    };

    let transformer = LifecycleTransformer::new(RecordingWeaver::new(), config);
    let pass = LifecyclePass::new(&pool, transformer);
    let summary = pass.run_parallel(&class_names, args.jobs)?;

    let patches = pass.transformer().weaver().patches();
    let rendered =
        output::render(args.format, &summary, &patches).context("Failed to render report")?;
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(rendered.as_bytes())?;
    stdout.flush()?;

    if !summary.failures.is_empty() {
        std::process::exit(2);
    }
    Ok(())
}
