//! Problem instances.
//!
//! Benchmark files follow the `<jobs>.<index>.txt` naming used by the
//! SMTWTP instance sets (e.g. `40.1.txt`, `100.3.txt`). Names that do not
//! follow the convention are still accepted; only the derived job count and
//! index are then unknown.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{CampaignError, Result};

/// A scheduling problem input handed to the solver by path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProblemInstance {
    /// Short name used in logs and reports (file name without extension).
    pub name: String,
    /// Path passed to the solver, exactly as given.
    pub path: PathBuf,
    /// Job count parsed from the file name, if it follows the convention.
    pub jobs: Option<u32>,
    /// Instance index parsed from the file name, if it follows the convention.
    pub index: Option<u32>,
    /// Known optimal total weighted tardiness, used for early stopping.
    pub optimal: Option<u64>,
}

impl ProblemInstance {
    /// Describes the instance stored at `path`.
    ///
    /// The file is not opened; the solver reads it. Fails if the path is
    /// empty or not valid UTF-8, since it must travel as a string argument.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let invalid = |reason: &str| CampaignError::InvalidInstance {
            name: path.display().to_string(),
            reason: reason.to_string(),
        };

        let text = path.to_str().ok_or_else(|| invalid("path is not valid UTF-8"))?;
        if text.trim().is_empty() {
            return Err(invalid("path is empty"));
        }

        let file_name = Path::new(text)
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| invalid("path has no file name"))?;
        let name = file_name
            .strip_suffix(".txt")
            .unwrap_or(file_name)
            .to_string();
        let (jobs, index) = parse_jobs_and_index(&name);

        Ok(Self {
            name,
            path,
            jobs,
            index,
            optimal: None,
        })
    }

    /// Attaches a known optimum.
    pub fn with_optimal(mut self, optimal: u64) -> Self {
        self.optimal = Some(optimal);
        self
    }

    /// The path as it appears in the solver's argument list.
    pub fn path_arg(&self) -> String {
        // `new` guarantees UTF-8, so this is lossless.
        self.path.display().to_string()
    }
}

impl fmt::Display for ProblemInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

fn parse_jobs_and_index(name: &str) -> (Option<u32>, Option<u32>) {
    match name.split_once('.') {
        Some((jobs, index)) => match (jobs.parse().ok(), index.parse().ok()) {
            (Some(j), Some(i)) => (Some(j), Some(i)),
            _ => (None, None),
        },
        None => (None, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conventional_name() {
        let inst = ProblemInstance::new("40.1.txt").unwrap();
        assert_eq!(inst.name, "40.1");
        assert_eq!(inst.jobs, Some(40));
        assert_eq!(inst.index, Some(1));
        assert_eq!(inst.optimal, None);
        assert_eq!(inst.path_arg(), "40.1.txt");
    }

    #[test]
    fn test_nested_path_keeps_full_arg() {
        let inst = ProblemInstance::new("data/smtwtp/100.3.txt").unwrap();
        assert_eq!(inst.name, "100.3");
        assert_eq!(inst.jobs, Some(100));
        assert_eq!(inst.index, Some(3));
        assert_eq!(inst.path_arg(), "data/smtwtp/100.3.txt");
    }

    #[test]
    fn test_unconventional_name() {
        let inst = ProblemInstance::new("wt40.dat").unwrap();
        assert_eq!(inst.name, "wt40.dat");
        assert_eq!(inst.jobs, None);
        assert_eq!(inst.index, None);
    }

    #[test]
    fn test_empty_path_rejected() {
        assert!(matches!(
            ProblemInstance::new(""),
            Err(CampaignError::InvalidInstance { .. })
        ));
        assert!(ProblemInstance::new("   ").is_err());
    }

    #[test]
    fn test_with_optimal() {
        let inst = ProblemInstance::new("50.1.txt").unwrap().with_optimal(2134);
        assert_eq!(inst.optimal, Some(2134));
    }
}
