// src/aggregate.rs

use chrono::{Datelike, NaiveDateTime, Timelike};
use std::{
    path::{Path, PathBuf},
    time::Duration,
};
use thiserror::Error;
use tokio::time::sleep;
use tracing::{info, instrument, warn};
use url::Url;

use crate::{
    config::{MissingPolicy, RunConfig},
    fetch::{fetch_html, urls::target_url, FetchError, Transport},
    parse::{CountParser, ParseError},
    states::{self, UnknownState},
    table::{ResultsTable, TableError},
};

#[derive(Debug, Error)]
pub enum AggregateError {
    #[error(transparent)]
    UnknownState(#[from] UnknownState),
    #[error("building target url: {0}")]
    Url(#[from] url::ParseError),
    #[error("fetching {state}: {source}")]
    Fetch {
        state: String,
        #[source]
        source: FetchError,
    },
    #[error("parsing count for {state} from {url}: {source}")]
    Parse {
        state: String,
        url: Url,
        #[source]
        source: ParseError,
    },
    #[error(transparent)]
    Table(#[from] TableError),
}

impl AggregateError {
    /// Failures that only cost one sample, as opposed to a broken setup.
    fn is_sample_failure(&self) -> bool {
        matches!(self, Self::Fetch { .. } | Self::Parse { .. })
    }
}

/// Outcome of one (level, field) column.
#[derive(Debug, Clone)]
pub struct PairReport {
    pub path: PathBuf,
    pub label: String,
    pub fetched: usize,
    pub missing: Vec<&'static str>,
}

/// `job_stats_<field>_<level>.csv`
pub fn results_file_name(field: &str, level: &str) -> String {
    format!("job_stats_{}_{}.csv", field, level)
}

/// `month-day-year-hour:minute`, unpadded, e.g. `3-7-2024-9:5`.
pub fn column_label(at: &NaiveDateTime) -> String {
    format!(
        "{}-{}-{}-{}:{}",
        at.month(),
        at.day(),
        at.year(),
        at.hour(),
        at.minute()
    )
}

pub struct Aggregator<'a, T> {
    transport: &'a T,
    parser: CountParser,
    host: String,
    delay: Duration,
    missing: MissingPolicy,
    out_dir: PathBuf,
}

impl<'a, T: Transport> Aggregator<'a, T> {
    pub fn new(transport: &'a T, cfg: &RunConfig) -> Result<Self, ParseError> {
        Ok(Self {
            transport,
            parser: CountParser::new(&cfg.count_selector)?,
            host: cfg.host.clone(),
            delay: cfg.delay(),
            missing: cfg.missing,
            out_dir: cfg.out_dir.clone(),
        })
    }

    pub fn results_path(&self, field: &str, level: &str) -> PathBuf {
        self.out_dir.join(results_file_name(field, level))
    }

    /// Number of `level` `field` jobs in `state` (`US` for nationwide).
    pub async fn count(&self, level: &str, field: &str, state: &str) -> Result<u64, AggregateError> {
        let level = level.to_lowercase();
        let field = field.to_lowercase();
        let state_path = states::resolve(state)?;
        let url = target_url(&self.host, &level, &field, state_path)?;
        let html = fetch_html(self.transport, &url)
            .await
            .map_err(|source| AggregateError::Fetch {
                state: state.to_string(),
                source,
            })?;
        let n = self
            .parser
            .parse(&html)
            .map_err(|source| AggregateError::Parse {
                state: state.to_string(),
                url: url.clone(),
                source,
            })?;
        info!(
            "Total number of {} {} jobs in {}: {}",
            level, field, state, n
        );
        Ok(n)
    }

    /// One sample per state, in results-file row order, pausing after each
    /// request.
    pub async fn collect(
        &self,
        level: &str,
        field: &str,
    ) -> Result<Vec<(&'static str, Option<u64>)>, AggregateError> {
        let mut column = Vec::with_capacity(states::STATES.len());
        for code in states::codes() {
            let result = self.count(level, field, code).await;
            if !self.delay.is_zero() {
                sleep(self.delay).await;
            }
            match result {
                Ok(n) => column.push((code, Some(n))),
                Err(e) if e.is_sample_failure() && self.missing == MissingPolicy::Skip => {
                    warn!(state = code, error = %e, "no count; leaving cell empty");
                    column.push((code, None));
                }
                Err(e) => return Err(e),
            }
        }
        Ok(column)
    }

    /// Collect every state for (`level`, `field`) and append the column to
    /// the pair's results file. The column is labelled with the time `clock`
    /// reports once collection has finished.
    #[instrument(level = "info", skip(self, clock))]
    pub async fn run_pair<C>(
        &self,
        level: &str,
        field: &str,
        clock: C,
    ) -> Result<PairReport, AggregateError>
    where
        C: FnOnce() -> NaiveDateTime,
    {
        let level = level.to_lowercase();
        let field = field.to_lowercase();

        let column = self.collect(&level, &field).await?;
        let label = column_label(&clock());
        let path = self.results_path(&field, &level);

        append_to_file(&path, &label, &column)?;

        let missing: Vec<_> = column
            .iter()
            .filter(|(_, n)| n.is_none())
            .map(|&(code, _)| code)
            .collect();
        info!(
            path = %path.display(),
            %label,
            missing = missing.len(),
            "appended column"
        );
        Ok(PairReport {
            path,
            label,
            fetched: column.len() - missing.len(),
            missing,
        })
    }
}

fn append_to_file(
    path: &Path,
    label: &str,
    column: &[(&'static str, Option<u64>)],
) -> Result<(), TableError> {
    let mut table = ResultsTable::load_or_new(path, states::codes())?;
    table.append_column(label, column)?;
    table.save(path)
}
