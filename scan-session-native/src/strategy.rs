use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Where the host app runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentTarget {
    Android,
    Ios,
    Web,
}

/// Which scanner implementation backs the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScannerStrategy {
    /// Modal ML Kit scanner (`OverlayScanner`).
    Overlay,
    /// Camera behind a transparent web view (`PassThroughScanner`).
    PassThrough,
    /// Browser media devices (`WebCameraScanner`).
    WebCamera,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StrategyError {
    #[error("{strategy} scanner is not available on {target}")]
    NotAvailable {
        strategy: ScannerStrategy,
        target: DeploymentTarget,
    },

    #[error("unknown deployment target: {0}")]
    UnknownTarget(String),

    #[error("unknown scanner strategy: {0}")]
    UnknownStrategy(String),
}

impl DeploymentTarget {
    pub fn is_native(&self) -> bool {
        !matches!(self, Self::Web)
    }

    pub fn default_strategy(&self) -> ScannerStrategy {
        match self {
            Self::Android | Self::Ios => ScannerStrategy::Overlay,
            Self::Web => ScannerStrategy::WebCamera,
        }
    }
}

impl ScannerStrategy {
    pub fn available_on(&self, target: DeploymentTarget) -> bool {
        match self {
            Self::Overlay | Self::PassThrough => target.is_native(),
            Self::WebCamera => !target.is_native(),
        }
    }
}

/// Pick the strategy for `target`, honoring `preferred` when it can run there.
pub fn select_strategy(
    target: DeploymentTarget,
    preferred: Option<ScannerStrategy>,
) -> Result<ScannerStrategy, StrategyError> {
    let strategy = preferred.unwrap_or_else(|| target.default_strategy());
    if !strategy.available_on(target) {
        return Err(StrategyError::NotAvailable { strategy, target });
    }
    log::debug!("Using {} scanner on {}", strategy, target);
    Ok(strategy)
}

impl fmt::Display for DeploymentTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Android => write!(f, "android"),
            Self::Ios => write!(f, "ios"),
            Self::Web => write!(f, "web"),
        }
    }
}

impl FromStr for DeploymentTarget {
    type Err = StrategyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "android" => Ok(Self::Android),
            "ios" => Ok(Self::Ios),
            "web" => Ok(Self::Web),
            _ => Err(StrategyError::UnknownTarget(s.to_string())),
        }
    }
}

impl fmt::Display for ScannerStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Overlay => write!(f, "overlay"),
            Self::PassThrough => write!(f, "pass-through"),
            Self::WebCamera => write!(f, "web-camera"),
        }
    }
}

impl FromStr for ScannerStrategy {
    type Err = StrategyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "overlay" | "mlkit" => Ok(Self::Overlay),
            "pass-through" | "passthrough" | "community" => Ok(Self::PassThrough),
            "web-camera" | "web" => Ok(Self::WebCamera),
            _ => Err(StrategyError::UnknownStrategy(s.to_string())),
        }
    }
}
