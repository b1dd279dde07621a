use serde::{Deserialize, Serialize};

/// Top-level settings container.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct TabKeeperSettings {
    pub suspension: SuspensionSettings,
    pub grouping: GroupingSettings,
}

/// How many tabs a single "suspend inactive" pass may discard.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SuspensionSettings {
    pub batch_limit: usize,
}

impl Default for SuspensionSettings {
    fn default() -> Self {
        Self { batch_limit: 10 }
    }
}

/// Presentation of tab groups created by "group by domain".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct GroupingSettings {
    pub collapse_groups: bool,
}
