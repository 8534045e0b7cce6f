use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SchedError;

/// One syllabus topic as supplied by the configuration source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicSpec {
    pub subject: String,
    pub label: String,
    /// Raw study time estimate in hours, before the planning buffer factor.
    pub time_est_hours: f64,
    /// Relative exam importance in (0, 1].
    pub weight: f64,
    /// Intrinsic hardness in [1.0, 5.0].
    pub difficulty: f64,
}

impl TopicSpec {
    /// Stable topic id. Subject and label are immutable, so this never moves.
    pub fn id(&self) -> String {
        format!("{}.{}", self.subject, self.label)
    }
}

/// The full topic catalogue for one curriculum.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalogue {
    pub topics: Vec<TopicSpec>,
}

impl Catalogue {
    /// Load from a TOML file, falling back to the built-in syllabus when the
    /// file is missing or unparseable.
    pub fn load_or_builtin(path: &Path) -> Catalogue {
        match fs::read_to_string(path) {
            Ok(content) => match toml::from_str::<Catalogue>(&content) {
                Ok(catalogue) => catalogue,
                Err(e) => {
                    tracing::warn!(path = ?path, error = %e, "Failed to parse catalogue, using built-in syllabus");
                    Catalogue::builtin()
                }
            },
            Err(e) => {
                tracing::debug!(path = ?path, error = %e, "No catalogue file, using built-in syllabus");
                Catalogue::builtin()
            }
        }
    }

    pub fn from_toml(content: &str) -> Result<Catalogue, SchedError> {
        Ok(toml::from_str::<Catalogue>(content)?)
    }

    /// Built-in demonstration syllabus: a multi-subject entrance-exam slice.
    pub fn builtin() -> Catalogue {
        let raw: &[(&str, &str, f64, f64, f64)] = &[
            // (subject, label, time_est_hours, weight, difficulty)
            ("Physics", "Kinematics", 18.0, 0.08, 3.0),
            ("Physics", "Laws of Motion", 14.0, 0.09, 4.0),
            ("Physics", "Work, Energy & Power", 12.0, 0.07, 4.0),
            ("Physics", "Thermodynamics", 14.0, 0.07, 5.0),
            ("Physics", "Electrostatics", 12.0, 0.07, 4.0),
            ("Physics", "Modern Physics", 12.0, 0.06, 4.5),
            ("Chemistry", "Stoichiometry", 8.0, 0.03, 2.5),
            ("Chemistry", "Chemical Bonding", 15.0, 0.06, 3.5),
            ("Chemistry", "Thermodynamics & Energetics", 12.0, 0.05, 4.0),
            ("Chemistry", "Equilibrium", 10.0, 0.05, 4.0),
            ("Chemistry", "Hydrocarbons", 12.0, 0.06, 4.0),
            ("Chemistry", "Coordination Compounds", 6.0, 0.02, 3.5),
            ("Biology", "Cell Structure & Cell Cycle", 6.0, 0.04, 3.0),
            ("Biology", "Plant Physiology", 10.0, 0.05, 3.5),
            ("Biology", "Human Circulation & Immunity", 12.0, 0.06, 4.0),
            ("Biology", "Nervous System", 10.0, 0.05, 4.0),
            ("Biology", "Genetics & Evolution", 18.0, 0.06, 5.0),
            ("Biology", "Ecology", 8.0, 0.04, 3.0),
        ];

        Catalogue {
            topics: raw
                .iter()
                .map(|&(subject, label, time_est_hours, weight, difficulty)| TopicSpec {
                    subject: subject.to_string(),
                    label: label.to_string(),
                    time_est_hours,
                    weight,
                    difficulty,
                })
                .collect(),
        }
    }
}
