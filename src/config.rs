// src/config.rs

use anyhow::{Context, Result};
use serde::Deserialize;
use std::{fs, path::Path, path::PathBuf, time::Duration};

use crate::{fetch::urls::DEFAULT_HOST, parse::DEFAULT_COUNT_SELECTOR};

pub static DEFAULT_LEVELS: &[&str] = &["entry-level", "mid-level", "senior-level", "jobs"];

/// The empty field is the site's "all fields" listing.
pub static DEFAULT_FIELDS: &[&str] = &[
    "software-engineering",
    "chemical-engineering",
    "petroleum-engineering",
    "process-engineering",
    "mechanical-engineering",
    "civil-engineering",
    "electrical-engineering",
    "computer-engineering",
    "",
];

/// What to do with a state whose count could not be fetched or parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingPolicy {
    /// Leave the cell empty and carry on.
    #[default]
    Skip,
    /// Drop the whole (level, field) column.
    Abort,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    pub host: String,
    pub levels: Vec<String>,
    pub fields: Vec<String>,
    pub out_dir: PathBuf,
    /// Pause after every page request.
    pub delay_secs: u64,
    pub timeout_secs: Option<u64>,
    pub count_selector: String,
    pub missing: MissingPolicy,
    pub user_agent: String,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            levels: DEFAULT_LEVELS.iter().map(|s| s.to_string()).collect(),
            fields: DEFAULT_FIELDS.iter().map(|s| s.to_string()).collect(),
            out_dir: PathBuf::from("."),
            delay_secs: 4,
            timeout_secs: None,
            count_selector: DEFAULT_COUNT_SELECTOR.to_string(),
            missing: MissingPolicy::Skip,
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl RunConfig {
    /// Defaults overlaid with the YAML file at `path`, if given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            None => Ok(Self::default()),
            Some(p) => {
                let text =
                    fs::read_to_string(p).with_context(|| format!("reading config {:?}", p))?;
                Self::from_yaml(&text).with_context(|| format!("parsing config {:?}", p))
            }
        }
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn delay(&self) -> Duration {
        Duration::from_secs(self.delay_secs)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_every_pair() {
        let cfg = RunConfig::default();
        assert_eq!(cfg.levels.len() * cfg.fields.len(), 36);
        assert!(cfg.fields.iter().any(String::is_empty));
        assert_eq!(cfg.delay(), Duration::from_secs(4));
        assert_eq!(cfg.timeout(), None);
        assert_eq!(cfg.missing, MissingPolicy::Skip);
    }

    #[test]
    fn yaml_overrides_only_what_it_names() {
        let cfg = RunConfig::from_yaml(
            "levels: [senior-level]\nfields: [civil-engineering]\ndelay_secs: 1\nmissing: abort\n",
        )
        .unwrap();
        assert_eq!(cfg.levels, vec!["senior-level"]);
        assert_eq!(cfg.fields, vec!["civil-engineering"]);
        assert_eq!(cfg.delay_secs, 1);
        assert_eq!(cfg.missing, MissingPolicy::Abort);
        assert_eq!(cfg.host, DEFAULT_HOST);
        assert_eq!(cfg.count_selector, "span");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(RunConfig::from_yaml("delay: 3\n").is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(RunConfig::load(Some(Path::new("/nonexistent/jobstats.yaml"))).is_err());
    }
}
