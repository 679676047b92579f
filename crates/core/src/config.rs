use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How several matches of one rule become a field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CollapsePolicy {
    /// One match is stored as is, several become an ordered list.
    #[default]
    CollectAll,
    /// Several matches are an anomaly; the last one wins.
    StrictSingle,
}

impl FromStr for CollapsePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "collect-all" => Ok(CollapsePolicy::CollectAll),
            "strict-single" => Ok(CollapsePolicy::StrictSingle),
            other => Err(format!("unknown collapse policy '{}'", other)),
        }
    }
}

impl fmt::Display for CollapsePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CollapsePolicy::CollectAll => "collect-all",
            CollapsePolicy::StrictSingle => "strict-single",
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub collapse: CollapsePolicy,
    /// Under `strict-single`, drop an ambiguous field instead of keeping the
    /// last match.
    pub fail_on_ambiguity: bool,
    /// A nested rule without matches yields an empty record.
    pub empty_record_on_miss: bool,
}

impl EngineConfig {
    pub fn strict() -> Self {
        Self {
            collapse: CollapsePolicy::StrictSingle,
            ..Self::default()
        }
    }

    pub fn with_collapse(mut self, collapse: CollapsePolicy) -> Self {
        self.collapse = collapse;
        self
    }
}
