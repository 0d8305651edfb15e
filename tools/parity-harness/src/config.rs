//! Harness configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable that asks the subject to print its internal timings
pub const PROFILE_ENV_VAR: &str = "TURBOXL_PROFILE_TIMINGS";

/// Prefix of the subject's timing line on stderr
pub const TIMING_LINE_PREFIX: &str = "turboxl_timing_ms";

/// Inline script run by the default subject command. Receives `<path> <sheet index>`.
pub const DEFAULT_SUBJECT_SCRIPT: &str = "import sys, turboxl\n\
print(turboxl.read_sheet_to_csv(sys.argv[1], int(sys.argv[2])), end='')\n";

/// How to launch the out-of-process implementation under test
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubjectConfig {
    /// Label used in the report (e.g. `turboxl_sec=`)
    pub name: String,

    /// Executable to launch; resolved on `PATH` when not absolute
    pub program: PathBuf,

    /// Arguments placed before the file path and sheet index
    pub args: Vec<String>,

    /// Set [`SubjectConfig::profile_env`] in the child environment
    pub profile: bool,

    /// Name of the profiling environment variable
    pub profile_env: String,

    /// Stderr lines starting with this prefix are kept as timing diagnostics
    pub timing_prefix: String,
}

impl Default for SubjectConfig {
    fn default() -> Self {
        Self {
            name: "turboxl".to_string(),
            program: PathBuf::from("python3"),
            args: vec!["-c".to_string(), DEFAULT_SUBJECT_SCRIPT.to_string()],
            profile: true,
            profile_env: PROFILE_ENV_VAR.to_string(),
            timing_prefix: TIMING_LINE_PREFIX.to_string(),
        }
    }
}

/// Configuration for one parity run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Workbook both extractors read
    pub file: PathBuf,

    /// Zero-based sheet index
    pub sheet_index: usize,

    /// Number of timed rounds; only the last round's output is compared
    pub rounds: usize,

    /// Label of the in-process extractor in the report
    pub reference_name: String,

    /// Out-of-process subject
    pub subject: SubjectConfig,

    /// Also write the full report as JSON to this path
    pub json_output: Option<PathBuf>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            file: PathBuf::new(),
            sheet_index: 0,
            rounds: 3,
            reference_name: "calamine".to_string(),
            subject: SubjectConfig::default(),
            json_output: None,
        }
    }
}

impl HarnessConfig {
    /// Load a configuration from a TOML file. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Io`] if the file cannot be read and [`crate::Error::Toml`]
    /// if it is not valid TOML for this structure.
    pub fn from_toml_file(path: &Path) -> crate::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parse a configuration from TOML text.
    pub fn from_toml_str(contents: &str) -> crate::Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Config`] if any configuration value is invalid
    pub fn validate(&self) -> crate::Result<()> {
        if self.file.as_os_str().is_empty() {
            return Err(crate::Error::Config("input file path is required".to_string()));
        }

        if self.rounds == 0 {
            return Err(crate::Error::Config("rounds must be > 0".to_string()));
        }

        if self.subject.program.as_os_str().is_empty() {
            return Err(crate::Error::Config("subject program must not be empty".to_string()));
        }

        if self.subject.name.is_empty() || self.reference_name.is_empty() {
            return Err(crate::Error::Config("adapter names must not be empty".to_string()));
        }

        if self.subject.name == self.reference_name {
            return Err(crate::Error::Config(format!(
                "subject and reference need distinct names, both are '{}'",
                self.reference_name
            )));
        }

        if self.subject.profile && self.subject.profile_env.is_empty() {
            return Err(crate::Error::Config(
                "profile_env must be set when profiling is enabled".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> HarnessConfig {
        HarnessConfig {
            file: PathBuf::from("book.xlsx"),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults() {
        let config = HarnessConfig::default();
        assert_eq!(config.sheet_index, 0);
        assert_eq!(config.rounds, 3);
        assert_eq!(config.subject.name, "turboxl");
        assert_eq!(config.subject.profile_env, "TURBOXL_PROFILE_TIMINGS");
        assert_eq!(config.subject.timing_prefix, "turboxl_timing_ms");
        assert!(config.subject.profile);
    }

    #[test]
    fn test_validate_accepts_defaults_with_file() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn test_validate_requires_file() {
        let err = HarnessConfig::default().validate().unwrap_err();
        assert!(matches!(err, crate::Error::Config(_)));
    }

    #[test]
    fn test_validate_rejects_zero_rounds() {
        let config = HarnessConfig { rounds: 0, ..valid() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_duplicate_names() {
        let mut config = valid();
        config.subject.name = "calamine".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_toml_overrides_and_defaults() {
        let config = HarnessConfig::from_toml_str(
            r#"
file = "data/report.xlsx"
rounds = 5

[subject]
program = "/usr/local/bin/turboxl-csv"
args = []
profile = false
"#,
        )
        .unwrap();

        assert_eq!(config.file, PathBuf::from("data/report.xlsx"));
        assert_eq!(config.rounds, 5);
        assert_eq!(config.sheet_index, 0);
        assert_eq!(config.subject.program, PathBuf::from("/usr/local/bin/turboxl-csv"));
        assert!(config.subject.args.is_empty());
        assert!(!config.subject.profile);
        assert_eq!(config.subject.name, "turboxl");
        assert_eq!(config.reference_name, "calamine");
    }

    #[test]
    fn test_from_toml_rejects_bad_types() {
        let err = HarnessConfig::from_toml_str("rounds = \"three\"").unwrap_err();
        assert!(matches!(err, crate::Error::Toml(_)));
    }
}
