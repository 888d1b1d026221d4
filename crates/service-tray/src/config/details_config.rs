use crate::config::{default_details_command, default_details_label, default_max_shown};

use serde::{Deserialize, Serialize};

/// Supplementary listing shown while the service runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailsConfig {
    /// Prefix of the details menu line.
    #[serde(default = "default_details_label")]
    pub label: String,

    /// Command whose output lists the entries. The first line is a header and
    /// the first column of every other line is an entry.
    #[serde(default = "default_details_command")]
    pub command: Option<Vec<String>>,

    /// Entries listed before eliding.
    #[serde(default = "default_max_shown")]
    pub max_shown: usize,
}

impl Default for DetailsConfig {
    fn default() -> Self {
        Self {
            label: default_details_label(),
            command: default_details_command(),
            max_shown: default_max_shown(),
        }
    }
}
