//! Wire data model for one token analysis response.
//!
//! Field names follow the analysis API's camelCase JSON. Every field the
//! server may omit is optional; rendering supplies the placeholder text.
//! The payload is owned by a single in-flight request and dropped when
//! the reveal sequence ends.

use std::collections::HashMap;
use std::fmt;

use serde::de::Deserializer;
use serde::Deserialize;

/// Token name and ticker symbol.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenMetadata {
    pub name: Option<String>,
    pub symbol: Option<String>,
}

/// Market metrics reported alongside the analysis.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenMetrics {
    pub market_cap: Option<f64>,
    #[serde(rename = "volume24h")]
    pub volume_24h: Option<f64>,
    #[serde(rename = "liquidityUSD")]
    pub liquidity_usd: Option<f64>,
}

/// Status tag attached to a step finding.
///
/// Unknown tags degrade to [`StepStatus::Info`] instead of failing the
/// payload decode; the renderer treats info and neutral identically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    Safe,
    Warning,
    Danger,
    Info,
    Neutral,
}

impl StepStatus {
    fn parse(tag: &str) -> Self {
        match tag {
            "safe" => Self::Safe,
            "warning" => Self::Warning,
            "danger" => Self::Danger,
            "neutral" => Self::Neutral,
            _ => Self::Info,
        }
    }
}

impl<'de> Deserialize<'de> for StepStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(Self::parse(&tag))
    }
}

/// Outcome of a single analysis step, as reported by the server.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StepFinding {
    pub value: Option<String>,
    pub status: Option<StepStatus>,
    pub reason: Option<String>,
}

/// One prediction scenario (conservative, moderate, or aggressive).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Scenario {
    pub mcap: Option<f64>,
    pub multiplier: Option<String>,
    pub probability: Option<f64>,
    pub timeframe: Option<String>,
}

/// The three market-cap prediction scenarios.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Predictions {
    pub conservative: Option<Scenario>,
    pub moderate: Option<Scenario>,
    pub aggressive: Option<Scenario>,
}

/// Verdict risk level. Unknown values degrade to `Medium`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl<'de> Deserialize<'de> for RiskLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(match tag.as_str() {
            "Low" => Self::Low,
            "High" => Self::High,
            _ => Self::Medium,
        })
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "Low"),
            Self::Medium => write!(f, "Medium"),
            Self::High => write!(f, "High"),
        }
    }
}

/// The analysis body: per-step findings plus the optional predictions
/// block and overall verdict fields.
///
/// Step findings arrive as sibling keys of the verdict fields, so the
/// step map is flattened: any key that is not one of the named fields is
/// decoded as a [`StepFinding`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub market_cap_predictions: Option<Predictions>,
    pub overall_probability: Option<f64>,
    pub risk_level: Option<RiskLevel>,
    pub recommendation: Option<String>,
    pub current_market_cap: Option<f64>,
    #[serde(flatten)]
    pub steps: HashMap<String, StepFinding>,
}

impl Analysis {
    /// Finding for the given step key, if the server reported one.
    pub fn finding(&self, key: &str) -> Option<&StepFinding> {
        self.steps.get(key)
    }

    /// True when the server reported nothing at all for this token.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
            && self.market_cap_predictions.is_none()
            && self.overall_probability.is_none()
    }

    /// Whether the verdict panel can be rendered.
    pub fn has_verdict(&self) -> bool {
        self.overall_probability.is_some()
    }
}

/// Full response for one token.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalysisPayload {
    #[serde(default)]
    pub metadata: TokenMetadata,
    #[serde(default)]
    pub metrics: TokenMetrics,
    #[serde(default)]
    pub analysis: Analysis,
}
