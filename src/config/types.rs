//! Option enums recognized by the configuration surface.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::ConfigError;

/// Supervision regime; decides batch shape, loss family and evaluation rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Many labeled classes, trained by batch-hard triplet mining.
    Class,
    /// Explicit `(query, positive, negative)` triples.
    Pair,
    /// `(query, sample, label)` binary rows.
    Point,
}

impl MatchMode {
    pub const ALL: [MatchMode; 3] = [MatchMode::Class, MatchMode::Pair, MatchMode::Point];

    pub fn as_str(&self) -> &'static str {
        match self {
            MatchMode::Class => "class",
            MatchMode::Pair => "pair",
            MatchMode::Point => "point",
        }
    }
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatchMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "class" => Ok(MatchMode::Class),
            "pair" => Ok(MatchMode::Pair),
            "point" => Ok(MatchMode::Point),
            other => Err(ConfigError::UnknownVariant {
                option: "mode",
                value: other.to_string(),
            }),
        }
    }
}

/// Whether a loss compares two scores against each other or one score against a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LossFamily {
    Pairwise,
    Pointwise,
}

impl fmt::Display for LossFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LossFamily::Pairwise => f.write_str("pairwise"),
            LossFamily::Pointwise => f.write_str("pointwise"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LossType {
    #[serde(rename = "hinge_loss")]
    Hinge,
    #[serde(rename = "improved_triplet_loss")]
    ImprovedTriplet,
    #[serde(rename = "sigmoid_loss")]
    Sigmoid,
}

impl LossType {
    pub const ALL: [LossType; 3] = [LossType::Hinge, LossType::ImprovedTriplet, LossType::Sigmoid];

    pub fn family(&self) -> LossFamily {
        match self {
            LossType::Hinge | LossType::ImprovedTriplet => LossFamily::Pairwise,
            LossType::Sigmoid => LossFamily::Pointwise,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LossType::Hinge => "hinge_loss",
            LossType::ImprovedTriplet => "improved_triplet_loss",
            LossType::Sigmoid => "sigmoid_loss",
        }
    }
}

impl fmt::Display for LossType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LossType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "hinge_loss" => Ok(LossType::Hinge),
            "improved_triplet_loss" => Ok(LossType::ImprovedTriplet),
            "sigmoid_loss" => Ok(LossType::Sigmoid),
            other => Err(ConfigError::UnknownVariant {
                option: "loss_type",
                value: other.to_string(),
            }),
        }
    }
}

/// How a `(query, sample)` pair is turned into a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimMode {
    /// Encode both texts independently, then compare vectors.
    #[default]
    Represent,
    /// Encode both texts jointly into a single score.
    Cross,
}

impl fmt::Display for SimMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimMode::Represent => f.write_str("represent"),
            SimMode::Cross => f.write_str("cross"),
        }
    }
}

impl FromStr for SimMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "represent" => Ok(SimMode::Represent),
            "cross" => Ok(SimMode::Cross),
            other => Err(ConfigError::UnknownVariant {
                option: "sim_mode",
                value: other.to_string(),
            }),
        }
    }
}

/// Data split names used for record files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Split {
    Train,
    Dev,
    Test,
}

impl Split {
    pub fn as_str(&self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Dev => "dev",
            Split::Test => "test",
        }
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Split {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "train" => Ok(Split::Train),
            "dev" => Ok(Split::Dev),
            "test" => Ok(Split::Test),
            other => Err(ConfigError::UnknownVariant {
                option: "split",
                value: other.to_string(),
            }),
        }
    }
}
