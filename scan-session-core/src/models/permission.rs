use serde::{Deserialize, Serialize};

/// Camera permission state as reported by a platform.
///
/// Covers the Capacitor-style string vocabulary; boolean platforms convert
/// through `From<bool>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PermissionStatus {
    Granted,
    /// Partial access (e.g. iOS limited). Still usable for scanning.
    Limited,
    Denied,
    Prompt,
    PromptWithRationale,
}

impl From<bool> for PermissionStatus {
    fn from(granted: bool) -> Self {
        if granted {
            PermissionStatus::Granted
        } else {
            PermissionStatus::Denied
        }
    }
}

impl std::str::FromStr for PermissionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "granted" => Ok(PermissionStatus::Granted),
            "limited" => Ok(PermissionStatus::Limited),
            "denied" => Ok(PermissionStatus::Denied),
            "prompt" => Ok(PermissionStatus::Prompt),
            "prompt-with-rationale" => Ok(PermissionStatus::PromptWithRationale),
            _ => Err(format!("Invalid permission state: {}", s)),
        }
    }
}

/// The two-valued answer the session acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PermissionDecision {
    Granted,
    Denied,
}

impl PermissionDecision {
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted)
    }
}

impl From<PermissionStatus> for PermissionDecision {
    fn from(status: PermissionStatus) -> Self {
        match status {
            PermissionStatus::Granted | PermissionStatus::Limited => PermissionDecision::Granted,
            PermissionStatus::Denied
            | PermissionStatus::Prompt
            | PermissionStatus::PromptWithRationale => PermissionDecision::Denied,
        }
    }
}
