use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use stt_harness::{
    logging, Config, EngineProcess, ResetPolicy, ScenarioRunner,
};
use tracing::{info, warn};

/// Benchmark speech-recognition engines with reproducible synthetic-speech
/// scenarios.
#[derive(Debug, Parser)]
#[command(name = "stt-harness", version)]
struct Cli {
    /// Config file stem, `config` crate convention (extension optional)
    #[arg(long, default_value = "config/stt-harness")]
    config: String,

    /// Override the engine command from the config file
    #[arg(long)]
    engine: Option<String>,

    /// Run scenarios back-to-back without session resets (bleed test mode)
    #[arg(long)]
    back_to_back: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();
    let cli = Cli::parse();

    let mut cfg = Config::load(&cli.config)?;
    if let Some(engine) = cli.engine {
        cfg.engine.command = engine;
    }

    let run_id = format!("run-{}", uuid::Uuid::new_v4());
    info!(
        run_id,
        engine = %cfg.engine.command,
        scenarios = cfg.scenarios.len(),
        "starting benchmark run"
    );

    let engine = Arc::new(EngineProcess::spawn(cfg.engine.clone())?);
    engine.wait_ready().await?;

    let stimulus = cfg.stimulus.build();
    let policy = if cli.back_to_back {
        ResetPolicy::BackToBack
    } else {
        ResetPolicy::ResetBetween
    };

    let mut runner = ScenarioRunner::new(Arc::clone(&engine), cfg.runner.clone());
    let outcome = runner.run_suite(&cfg.scenarios, stimulus.as_ref(), policy).await;

    // Always shut the engine down, even when the suite errored out.
    engine.stop().await;

    let results = match outcome {
        Ok(results) => results,
        Err(err) if err.is_skippable() => {
            warn!("skipping engine: {err}");
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };

    // One JSON row per scenario on stdout; logs go to stderr.
    for result in &results {
        println!("{}", serde_json::to_string(result)?);
    }

    let failed = results.iter().filter(|r| r.failed()).count();
    info!(
        run_id,
        scenarios = results.len(),
        failed,
        "benchmark run complete"
    );
    Ok(())
}
