use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use shared::{Config, StrategyDefinition};
use strategy_graph::codegen::{CodeGenerator, CodegenOptions};
use strategy_graph::validation::StrategyValidator;
use tracing_subscriber::EnvFilter;

fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() -> Result<ExitCode> {
    let config = Config::from_env()?;
    init_logging(config.log_json);

    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .context("usage: strategy-compile <definition.json>")?;
    let raw = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let definition = StrategyDefinition::from_json(&raw)
        .with_context(|| format!("failed to parse {}", path.display()))?;

    tracing::info!(
        strategy_id = %definition.id,
        block_count = definition.blocks.len(),
        connection_count = definition.connections.len(),
        "Loaded strategy"
    );

    let report = StrategyValidator::report(&definition);
    for finding in &report.issues {
        eprintln!("{}", finding);
    }

    let options = CodegenOptions::from_config(&config);
    options
        .check()
        .context("check STRATEGY_STRUCT_NAME and STRATEGY_RUNTIME_PATH")?;
    let generator = CodeGenerator::new(options);
    match generator.generate(&definition) {
        Ok(compiled) => {
            print!("{}", compiled.code);
            tracing::info!(
                execution_order = ?compiled.execution_order,
                parameters = compiled.parameter_keys.len(),
                "Compiled strategy"
            );
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            tracing::error!("Compilation refused: {}", e);
            Ok(ExitCode::FAILURE)
        }
    }
}
