use std::{path::PathBuf, sync::Arc};

use anyhow::{bail, Context as _, Result};
use clap::Parser;
use testing_framework_core::{
    config::RunnerConfig,
    scenario::{GeckoTest, TestRunner},
};
use testing_framework_workflows::e2e_suite;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Runs the Gecko end-to-end tests against an already provisioned network.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// YAML file describing the network.
    #[arg(short, long)]
    config: PathBuf,
    /// Run only this test.
    #[arg(short, long)]
    test: Option<String>,
    /// Print the test names and exit.
    #[arg(long)]
    list: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();
    let config = RunnerConfig::load_from_file(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    let suite = e2e_suite(&config);

    if args.list {
        for name in suite.names() {
            println!("{name}");
        }
        return Ok(());
    }

    let selected: Vec<(String, Arc<dyn GeckoTest>)> = match &args.test {
        Some(name) => {
            let test = suite
                .test(name)
                .with_context(|| format!("unknown test {name}"))?;
            vec![(name.clone(), test)]
        }
        None => suite
            .tests()
            .map(|(name, test)| (name.to_owned(), Arc::clone(test)))
            .collect(),
    };

    let runner = TestRunner::new(config.request_timeout).with_poll_interval(config.poll_interval);
    let network = config.network();
    let mut failed = Vec::new();
    for (name, test) in &selected {
        match runner.run(name, test.as_ref(), &network).await {
            Ok(()) => info!(test = %name, "PASSED"),
            Err(err) => {
                error!(test = %name, error = %format!("{:#}", anyhow::Error::from(err)), "FAILED");
                failed.push(name.as_str());
            }
        }
    }

    if !failed.is_empty() {
        bail!("{} of {} tests failed: {}", failed.len(), selected.len(), failed.join(", "));
    }
    Ok(())
}
