// src/driver.rs

use chrono::{Local, NaiveDateTime};
use tokio::time::Instant;
use tracing::{error, info};

use crate::{
    aggregate::{AggregateError, Aggregator, PairReport},
    fetch::Transport,
};

#[derive(Debug, Default)]
pub struct RunSummary {
    pub written: Vec<PairReport>,
    pub failed: Vec<(String, String, AggregateError)>,
}

impl RunSummary {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Every (level, field) pair, level-major, one after the other.
pub fn pairs<'a>(levels: &'a [String], fields: &'a [String]) -> Vec<(&'a str, &'a str)> {
    levels
        .iter()
        .flat_map(|l| fields.iter().map(move |f| (l.as_str(), f.as_str())))
        .collect()
}

/// Run the aggregator for every pair with the wall clock as column label.
pub async fn run_all<T: Transport>(
    agg: &Aggregator<'_, T>,
    levels: &[String],
    fields: &[String],
) -> RunSummary {
    run_all_at(agg, levels, fields, || Local::now().naive_local()).await
}

/// Like `run_all`, reading each pair's timestamp from `clock`. A failing pair
/// is logged and skipped; files of other pairs are unaffected.
pub async fn run_all_at<T, C>(
    agg: &Aggregator<'_, T>,
    levels: &[String],
    fields: &[String],
    mut clock: C,
) -> RunSummary
where
    T: Transport,
    C: FnMut() -> NaiveDateTime,
{
    let todo = pairs(levels, fields);
    info!("{} level/field pairs to collect", todo.len());
    let mut summary = RunSummary::default();

    for (i, (level, field)) in todo.into_iter().enumerate() {
        let start = Instant::now();
        info!(%level, %field, "pair {}", i + 1);
        match agg.run_pair(level, field, &mut clock).await {
            Ok(report) => {
                info!(
                    %level,
                    %field,
                    elapsed = ?start.elapsed(),
                    "wrote {}",
                    report.path.display()
                );
                summary.written.push(report);
            }
            Err(e) => {
                error!(%level, %field, "pair failed: {}", e);
                summary
                    .failed
                    .push((level.to_string(), field.to_string(), e));
            }
        }
    }

    info!(
        written = summary.written.len(),
        failed = summary.failed.len(),
        "all done"
    );
    summary
}
