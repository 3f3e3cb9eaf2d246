//! Run one simulation and save its artifact.

use anyhow::{bail, Context, Result};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use sugarscape::llm::{LlmOracle, MockBackend};
use sugarscape::prelude::{run_experiment_with_callback, next_run_dir, write_artifact, DecisionOracle};

use crate::commands::show::print_summary;
use crate::config::{Config, LlmSection};

/// Command-line overrides for a run.
pub struct RunOptions {
    pub ticks: Option<u64>,
    pub seed: Option<u64>,
    pub output: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub api_key: Option<String>,
    pub model: Option<String>,
}

pub async fn run(opts: RunOptions, verbose: bool) -> Result<()> {
    let mut config = match &opts.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(seed) = opts.seed {
        config.simulation.seed = Some(seed);
    }
    if let Some(model) = &opts.model {
        config.llm.model = model.clone();
    }
    let ticks = opts.ticks.unwrap_or(config.run.ticks);
    let output_dir = opts.output.clone().unwrap_or_else(|| config.run.output_dir.clone());

    config
        .simulation
        .validate()
        .context("Invalid [simulation] section")?;

    let oracle = build_oracle(opts.api_key.as_deref(), &config).await?;
    println!(
        "{} Running {} ticks with {} agents on a {}x{} grid ({} oracle)...",
        "→".blue(),
        ticks.to_string().cyan(),
        config.simulation.population.to_string().cyan(),
        config.simulation.grid_size,
        config.simulation.grid_size,
        oracle.name().cyan()
    );

    let pb = ProgressBar::new(ticks);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} ticks {msg}")?
            .progress_chars("#>-"),
    );

    let artifact = run_experiment_with_callback(config.simulation.clone(), oracle, ticks, |report| {
        if verbose {
            pb.println(format!(
                "  tick {:>3}: {} alive, +{} born, -{} died, {} messages, {} oracle failures",
                report.tick,
                report.population(),
                report.births.len(),
                report.deaths.len(),
                report.messages_sent,
                report.oracle_failures
            ));
        }
        pb.set_message(format!("pop {}", report.population()));
        pb.inc(1);
    })
    .await;
    pb.finish_and_clear();

    let run_dir = next_run_dir(&output_dir)
        .with_context(|| format!("Failed to scan {}", output_dir.display()))?;
    let file_name = match run_dir.file_name().and_then(|n| n.to_str()) {
        Some(name) => format!("{name}.json"),
        None => "run.json".to_string(),
    };
    let path = run_dir.join(file_name);
    write_artifact(&artifact, &path)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    println!();
    if let Some(err) = &artifact.error {
        println!("{} Run stopped early: {}", "✗".red().bold(), err);
    } else {
        println!("{} Simulation complete!", "✓".green().bold());
    }
    print_summary(&artifact);
    println!();
    println!("  Saved: {}", path.display().to_string().cyan());

    if let Some(err) = artifact.error {
        bail!("run ended with an error: {err}");
    }
    Ok(())
}

async fn build_oracle(api_key: Option<&str>, config: &Config) -> Result<Arc<dyn DecisionOracle>> {
    match api_key {
        Some(key) if !key.trim().is_empty() => {
            let timeout_secs = config.simulation.decision_timeout_ms.div_ceil(1000).max(1);
            api_oracle(key, &config.llm, timeout_secs as u32).await
        }
        _ => Ok(Arc::new(LlmOracle::new(MockBackend::new()))),
    }
}

#[cfg(feature = "api")]
async fn api_oracle(key: &str, llm: &LlmSection, timeout_secs: u32) -> Result<Arc<dyn DecisionOracle>> {
    use sugarscape::llm::{LlmConfig, OpenAiBackend};

    let mut llm_config = LlmConfig::xai()
        .with_model(llm.model.clone())
        .with_max_tokens(llm.max_tokens)
        .with_timeout(timeout_secs);
    if let Some(temperature) = llm.temperature {
        llm_config = llm_config.with_temperature(temperature);
    }
    let mut backend = OpenAiBackend::with_config(key, llm_config)
        .context("Failed to create the HTTP backend")?;
    if let Some(endpoint) = &llm.endpoint {
        backend = backend.with_endpoint(endpoint);
    }
    let oracle = LlmOracle::new(backend);
    println!("{} Checking {}...", "→".blue(), oracle.backend().endpoint().cyan());
    if !oracle.is_available().await {
        bail!(
            "The language-model backend at {} is unreachable or rejected the key. \
             Check the endpoint and key, or pass --mock.",
            oracle.backend().endpoint()
        );
    }
    Ok(Arc::new(oracle))
}

#[cfg(not(feature = "api"))]
async fn api_oracle(_key: &str, _llm: &LlmSection, _timeout_secs: u32) -> Result<Arc<dyn DecisionOracle>> {
    bail!(
        "An API key was given but this binary was built without the {} feature. \
         Rebuild with --features api, or pass --mock.",
        "api".cyan()
    )
}
