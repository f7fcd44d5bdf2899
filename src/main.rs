use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use jobstats::{
    aggregate::Aggregator,
    config::{MissingPolicy, RunConfig},
    driver, states,
    fetch::ReqwestTransport,
};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

/// Collect engineerjobs.com job counts per state into dated CSV columns.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// YAML file overriding the built-in defaults
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Append one column to every level/field results file (default)
    Run(RunArgs),
    /// Print a single job count
    Count {
        #[arg(long)]
        level: String,
        /// Empty for all fields
        #[arg(long, default_value = "")]
        field: String,
        /// Two-letter state code, or US for the whole country
        #[arg(long, default_value = states::NATIONWIDE)]
        state: String,
    },
    /// List the state codes and their URL names
    States,
}

#[derive(Args, Debug, Default)]
struct RunArgs {
    /// Replace the configured levels (repeatable)
    #[arg(long = "level")]
    levels: Vec<String>,
    /// Replace the configured fields (repeatable)
    #[arg(long = "field")]
    fields: Vec<String>,
    #[arg(long)]
    out_dir: Option<PathBuf>,
    /// Seconds to wait after every request
    #[arg(long)]
    delay_secs: Option<u64>,
    /// Abort a level/field pair on the first missing count
    #[arg(long)]
    strict: bool,
}

impl RunArgs {
    fn apply(self, cfg: &mut RunConfig) {
        if !self.levels.is_empty() {
            cfg.levels = self.levels;
        }
        if !self.fields.is_empty() {
            cfg.fields = self.fields;
        }
        if let Some(dir) = self.out_dir {
            cfg.out_dir = dir;
        }
        if let Some(d) = self.delay_secs {
            cfg.delay_secs = d;
        }
        if self.strict {
            cfg.missing = MissingPolicy::Abort;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let mut cfg = RunConfig::load(cli.config.as_deref())?;

    match cli.command.unwrap_or(Command::Run(RunArgs::default())) {
        Command::States => {
            for (code, name) in states::STATES {
                println!("{},{}", code, name);
            }
            Ok(())
        }
        Command::Count {
            level,
            field,
            state,
        } => {
            let transport = ReqwestTransport::new(&cfg.user_agent, cfg.timeout())
                .context("building http client")?;
            let agg = Aggregator::new(&transport, &cfg)?;
            let n = agg.count(&level, &field, &state).await?;
            println!("{}", n);
            Ok(())
        }
        Command::Run(args) => {
            args.apply(&mut cfg);
            std::fs::create_dir_all(&cfg.out_dir)
                .with_context(|| format!("creating {:?}", cfg.out_dir))?;
            info!(
                levels = cfg.levels.len(),
                fields = cfg.fields.len(),
                out_dir = %cfg.out_dir.display(),
                "startup"
            );

            let transport = ReqwestTransport::new(&cfg.user_agent, cfg.timeout())
                .context("building http client")?;
            let agg = Aggregator::new(&transport, &cfg)?;
            let summary = driver::run_all(&agg, &cfg.levels, &cfg.fields).await;

            if !summary.is_success() {
                for (level, field, e) in &summary.failed {
                    eprintln!("{} / {:?}: {}", level, field, e);
                }
                bail!(
                    "{} of {} level/field pairs failed",
                    summary.failed.len(),
                    summary.failed.len() + summary.written.len()
                );
            }
            Ok(())
        }
    }
}
