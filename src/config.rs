//! Query configuration for dorina.
//!
//! A query names a genome, a first regulator set and optionally a second set
//! combined with the first through set algebra.

use crate::error::{DorinaError, Result};
use crate::types::{CombineMode, MatchMode, RegionClass};

/// One side of a query: regulators, how they combine, and where to look.
#[derive(Debug, Clone, PartialEq)]
pub struct RegulatorSet {
    /// Regulator names, resolved through the catalog.
    pub regulators: Vec<String>,
    pub match_mode: MatchMode,
    pub region: RegionClass,
    /// Expand genome features by this many bp before overlapping.
    pub window: Option<i64>,
}

impl RegulatorSet {
    pub fn new<S: Into<String>>(regulators: impl IntoIterator<Item = S>) -> Self {
        RegulatorSet {
            regulators: regulators.into_iter().map(Into::into).collect(),
            match_mode: MatchMode::Any,
            region: RegionClass::Any,
            window: None,
        }
    }

    pub fn with_match(mut self, match_mode: MatchMode) -> Self {
        self.match_mode = match_mode;
        self
    }

    pub fn with_region(mut self, region: RegionClass) -> Self {
        self.region = region;
        self
    }

    pub fn with_window(mut self, window: Option<i64>) -> Self {
        self.window = window;
        self
    }

    fn validate(&self, side: &str) -> Result<()> {
        if self.regulators.is_empty() {
            return Err(DorinaError::Configuration(format!(
                "regulator set {} is empty",
                side
            )));
        }
        if let Some(window) = self.window {
            if window < 0 {
                return Err(DorinaError::Configuration(format!(
                    "window {} of regulator set {} cannot be lower than 0 bps",
                    window, side
                )));
            }
        }
        Ok(())
    }
}

/// A complete analysis request.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub genome: String,
    pub set_a: RegulatorSet,
    pub set_b: Option<RegulatorSet>,
    /// Only meaningful with `set_b`; defaults to `or`.
    pub combine: Option<CombineMode>,
}

impl Query {
    /// Create a single-set query.
    pub fn new(genome: &str, set_a: RegulatorSet) -> Self {
        Query {
            genome: genome.to_string(),
            set_a,
            set_b: None,
            combine: None,
        }
    }

    /// Add a second set and the mode combining it with the first.
    pub fn with_set_b(mut self, set_b: RegulatorSet, combine: CombineMode) -> Self {
        self.set_b = Some(set_b);
        self.combine = Some(combine);
        self
    }

    /// The effective combine mode.
    pub fn combine_mode(&self) -> CombineMode {
        self.combine.unwrap_or_default()
    }

    /// Reject queries that cannot be evaluated.
    pub fn validate(&self) -> Result<()> {
        self.set_a.validate("A")?;
        match &self.set_b {
            Some(set_b) => set_b.validate("B"),
            None if self.combine.is_some() => Err(DorinaError::Configuration(format!(
                "combine mode '{}' needs a second regulator set",
                self.combine_mode().as_str()
            ))),
            None => Ok(()),
        }
    }
}
