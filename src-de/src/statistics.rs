//! Per-generation statistics and the generation log.
//!
//! Nothing in the algorithm reads these back; they exist for observation
//! (printing progress, plotting convergence).

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize};

use crate::individual::Individual;

/// Caller-supplied aggregation over the individuals of a generation
pub type AggregateFn = Arc<dyn Fn(&[&Individual]) -> BTreeMap<String, Vec<f64>> + Send + Sync>;

/// A named user aggregator; `fields` are the keys it reports, in header order.
#[derive(Clone)]
pub struct CustomStats {
    fields: Vec<String>,
    aggregate: AggregateFn,
}

impl CustomStats {
    pub fn new<F>(fields: &[&str], aggregate: F) -> Self
    where
        F: Fn(&[&Individual]) -> BTreeMap<String, Vec<f64>> + Send + Sync + 'static,
    {
        Self { fields: fields.iter().map(|f| f.to_string()).collect(), aggregate: Arc::new(aggregate) }
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }
}

impl fmt::Debug for CustomStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomStats").field("fields", &self.fields).finish_non_exhaustive()
    }
}

impl PartialEq for CustomStats {
    fn eq(&self, other: &Self) -> bool {
        self.fields == other.fields && Arc::ptr_eq(&self.aggregate, &other.aggregate)
    }
}

/// What to record for each generation
#[derive(Debug, Clone, Default, PartialEq)]
pub enum StatsMode {
    /// Record only the generation header
    #[default]
    None,
    /// Dump every individual as-is
    Identity,
    /// Mean/std/min/max of fitness vectors, per objective
    Numeric,
    /// Run a caller-supplied aggregator, passed through unchanged
    Custom(CustomStats),
}

/// Aggregator built from a [`StatsMode`]
#[derive(Debug, Clone, PartialEq)]
pub enum Statistics {
    Identity,
    Numeric,
    Custom(CustomStats),
}

impl Statistics {
    pub fn from_mode(mode: &StatsMode) -> Option<Self> {
        match mode {
            StatsMode::None => None,
            StatsMode::Identity => Some(Statistics::Identity),
            StatsMode::Numeric => Some(Statistics::Numeric),
            StatsMode::Custom(custom) => Some(Statistics::Custom(custom.clone())),
        }
    }

    /// Column names this aggregator contributes to a log header
    pub fn fields(&self) -> Vec<String> {
        match self {
            Statistics::Identity => vec!["id".into()],
            Statistics::Numeric => ["avg", "std", "min", "max"].iter().map(|f| f.to_string()).collect(),
            Statistics::Custom(custom) => custom.fields().to_vec(),
        }
    }

    pub fn compile<'a, I>(&self, individuals: I) -> RecordStats
    where
        I: IntoIterator<Item = &'a Individual>,
    {
        match self {
            Statistics::Identity => {
                RecordStats::Identity { individuals: individuals.into_iter().cloned().collect() }
            }
            Statistics::Numeric => RecordStats::Numeric(NumericStats::compile(individuals)),
            Statistics::Custom(custom) => {
                let all: Vec<&Individual> = individuals.into_iter().collect();
                RecordStats::Custom((custom.aggregate)(all.as_slice()))
            }
        }
    }
}

/// Fitness aggregates, one entry per objective
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericStats {
    pub avg: Vec<f64>,
    pub std: Vec<f64>,
    pub min: Vec<f64>,
    pub max: Vec<f64>,
}

impl NumericStats {
    /// Aggregate the valid fitness vectors; invalid ones are skipped.
    ///
    /// `std` is the population standard deviation (ddof = 0).
    pub fn compile<'a, I>(individuals: I) -> Self
    where
        I: IntoIterator<Item = &'a Individual>,
    {
        let rows: Vec<&[f64]> = individuals
            .into_iter()
            .filter(|ind| ind.fitness.is_valid())
            .map(|ind| ind.fitness.values())
            .collect();
        let n_obj = rows.first().map(|r| r.len()).unwrap_or(0);
        let rows: Vec<&[f64]> = rows.into_iter().filter(|r| r.len() == n_obj).collect();
        if rows.is_empty() || n_obj == 0 {
            return Self { avg: Vec::new(), std: Vec::new(), min: Vec::new(), max: Vec::new() };
        }

        let scores = Array2::from_shape_fn((rows.len(), n_obj), |(i, k)| rows[i][k]);
        let avg = scores.mean_axis(Axis(0)).map(|m| m.to_vec()).unwrap_or_default();
        let std = scores.std_axis(Axis(0), 0.0).to_vec();
        let min = scores.fold_axis(Axis(0), f64::INFINITY, |&acc, &v| acc.min(v)).to_vec();
        let max = scores.fold_axis(Axis(0), f64::NEG_INFINITY, |&acc, &v| acc.max(v)).to_vec();

        Self { avg, std, min, max }
    }
}

/// Statistics attached to one generation record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RecordStats {
    Identity { individuals: Vec<Individual> },
    Numeric(NumericStats),
    Custom(BTreeMap<String, Vec<f64>>),
}

/// One line of the generation log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRecord {
    pub generation: usize,
    /// Objective evaluations performed since the previous record
    pub nevals: usize,
    /// Whether a landscape change was detected this generation
    pub changed: bool,
    /// Sub-populations reinitialized by exclusion this generation
    pub excluded: usize,
    /// Hall-of-fame fitness after this generation's update
    pub best: Option<Vec<f64>>,
    pub stats: Option<RecordStats>,
}

impl fmt::Display for GenerationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gen {:4}  nevals {:4}", self.generation, self.nevals)?;
        if self.changed {
            write!(f, "  changed")?;
        }
        if self.excluded > 0 {
            write!(f, "  excluded={}", self.excluded)?;
        }
        if let Some(best) = &self.best {
            write!(f, "  best={}", fmt_vec(best))?;
        }
        match &self.stats {
            Some(RecordStats::Numeric(s)) => write!(
                f,
                "  avg={}  std={}  min={}  max={}",
                fmt_vec(&s.avg),
                fmt_vec(&s.std),
                fmt_vec(&s.min),
                fmt_vec(&s.max)
            ),
            Some(RecordStats::Identity { individuals }) => {
                write!(f, "  individuals={}", individuals.len())
            }
            Some(RecordStats::Custom(values)) => {
                for (key, v) in values {
                    write!(f, "  {}={}", key, fmt_vec(v))?;
                }
                Ok(())
            }
            None => Ok(()),
        }
    }
}

fn fmt_vec(v: &[f64]) -> String {
    let parts: Vec<String> = v.iter().map(|x| format!("{:.6e}", x)).collect();
    format!("[{}]", parts.join(", "))
}

/// Append-only sequence of generation records
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Logbook {
    pub header: Vec<String>,
    records: Vec<GenerationRecord>,
}

impl Logbook {
    pub fn new(stats: Option<&Statistics>) -> Self {
        let mut header: Vec<String> = vec!["gen".into(), "nevals".into()];
        if let Some(s) = stats {
            header.extend(s.fields());
        }
        Self { header, records: Vec::new() }
    }

    pub fn record(&mut self, record: GenerationRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[GenerationRecord] {
        &self.records
    }

    pub fn last(&self) -> Option<&GenerationRecord> {
        self.records.last()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Text form of the latest record
    pub fn stream(&self) -> String {
        self.last().map(|r| r.to_string()).unwrap_or_default()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
