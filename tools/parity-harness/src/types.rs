//! Result types produced by a parity run

use serde::{Deserialize, Serialize};
use sheet_parity::ParityResult;
use std::path::PathBuf;
use std::time::Duration;

/// Timings of one round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundMeasurement {
    /// 1-based round index
    pub round: usize,

    /// Wall time of the subject adapter call
    #[serde(with = "duration_secs")]
    pub subject_duration: Duration,

    /// Wall time of the reference adapter call
    #[serde(with = "duration_secs")]
    pub reference_duration: Duration,

    /// Row count reported by whichever adapter knows it
    pub row_count: Option<usize>,

    /// Raw timing line from the subject, when it printed one
    pub subject_timing: Option<String>,
}

/// Aggregate statistics over per-round durations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DurationStatistics {
    #[serde(with = "duration_secs")]
    pub median: Duration,
    #[serde(with = "duration_secs")]
    pub mean: Duration,
    #[serde(with = "duration_secs")]
    pub min: Duration,
    #[serde(with = "duration_secs")]
    pub max: Duration,
    pub sample_count: usize,
}

/// Statistics for both sides
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub subject: DurationStatistics,
    pub reference: DurationStatistics,
}

/// Everything a finished run produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub subject_name: String,
    pub reference_name: String,
    pub file: PathBuf,
    pub sheet_index: usize,
    pub rounds: Vec<RoundMeasurement>,
    /// Subject on the left, reference on the right
    pub parity: ParityResult,
    pub summary: Summary,
}

/// Serialize a [`Duration`] as fractional seconds
pub(crate) mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(duration.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}
