//! TOML job file parsing
//!
//! ```toml
//! [settings]
//! force = false
//! dedup = true          # merge identical STL vertices per solid
//!
//! [[jobs]]
//! input = "data/slice.vtp"
//! output = "out/slice"
//! mode = "structured"   # basic | structured | directory | auto
//! force = true          # optional, overrides settings.force
//! dedup = false         # optional, overrides settings.dedup
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::job::{ConversionJob, ConversionMode};

/// Job file structure
#[derive(Debug, Deserialize)]
pub struct JobFile {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub jobs: Vec<JobEntry>,
}

/// Defaults applied to every job
#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub force: bool,
    #[serde(default = "default_dedup")]
    pub dedup: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            force: false,
            dedup: default_dedup(),
        }
    }
}

/// One `[[jobs]]` entry
#[derive(Debug, Deserialize)]
pub struct JobEntry {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Default: auto
    #[serde(default = "default_mode")]
    pub mode: String,
    pub force: Option<bool>,
    pub dedup: Option<bool>,
}

fn default_mode() -> String {
    "auto".to_string()
}

fn default_dedup() -> bool {
    true
}

impl JobFile {
    /// Load a job file from disk
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read job file: {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Invalid job file: {}", path.display()))
    }

    /// Parse a job file from a string
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse job file")
    }

    /// Resolve entries into jobs, with relative paths taken from `base_dir`.
    pub fn jobs(&self, base_dir: &Path) -> Result<Vec<ConversionJob>> {
        self.jobs
            .iter()
            .enumerate()
            .map(|(i, entry)| -> Result<ConversionJob> {
                let input = base_dir.join(&entry.input);
                let output = base_dir.join(&entry.output);
                let mode = ConversionMode::resolve(&entry.mode, &input)
                    .with_context(|| format!("Job {} ({})", i + 1, entry.input.display()))?;
                Ok(ConversionJob::new(input, output, mode)
                    .with_force(entry.force.unwrap_or(self.settings.force))
                    .with_dedup(entry.dedup.unwrap_or(self.settings.dedup)))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_jobs() {
        let file = JobFile::parse(
            r#"
[settings]
force = true

[[jobs]]
input = "data/wing.vtk"
output = "out/wing"
mode = "basic"

[[jobs]]
input = "/abs/cases"
output = "out/cases"
mode = "directory"
force = false
"#,
        )
        .unwrap();

        let jobs = file.jobs(Path::new("/work")).unwrap();
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].input, PathBuf::from("/work/data/wing.vtk"));
        assert_eq!(jobs[0].mode, ConversionMode::Basic);
        assert!(jobs[0].force);
        assert_eq!(jobs[1].input, PathBuf::from("/abs/cases"));
        assert!(!jobs[1].force);
    }

    #[test]
    fn test_defaults() {
        let file = JobFile::parse("[[jobs]]\ninput = \"a.vtk\"\noutput = \"out\"\n").unwrap();
        assert!(!file.settings.force);
        assert!(file.settings.dedup);
        assert_eq!(file.jobs[0].mode, "auto");
        let jobs = file.jobs(Path::new("/nonexistent")).unwrap();
        assert_eq!(jobs[0].mode, ConversionMode::Structured);
        assert!(jobs[0].dedup);
    }

    #[test]
    fn test_dedup_override() {
        let file = JobFile::parse(
            r#"
[settings]
dedup = false

[[jobs]]
input = "a.stl"
output = "out/a"

[[jobs]]
input = "b.stl"
output = "out/b"
dedup = true
"#,
        )
        .unwrap();
        let jobs = file.jobs(Path::new("/work")).unwrap();
        assert!(!jobs[0].dedup);
        assert!(!jobs[0].read_options().dedup_vertices);
        assert!(jobs[1].dedup);
    }

    #[test]
    fn test_invalid_mode() {
        let file = JobFile::parse(
            "[[jobs]]\ninput = \"a.vtk\"\noutput = \"out\"\nmode = \"fast\"\n",
        )
        .unwrap();
        let err = file.jobs(Path::new(".")).unwrap_err();
        assert!(format!("{err:#}").contains("Invalid mode: fast"));
    }

    #[test]
    fn test_missing_field() {
        assert!(JobFile::parse("[[jobs]]\ninput = \"a.vtk\"\n").is_err());
    }
}
