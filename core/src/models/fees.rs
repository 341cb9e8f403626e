use std::fmt;

use serde::{Deserialize, Serialize};

/// Venue fee tier of the trading account.
///
/// The set is closed. Labels that match none of the tiers resolve to
/// [`FeeTier::Regular`] through [`FeeTier::from_label`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeeTier {
    #[default]
    #[serde(rename = "Regular")]
    Regular,
    #[serde(rename = "VIP 1")]
    Vip1,
    #[serde(rename = "VIP 2")]
    Vip2,
}

/// Fixed per-tier constants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeeSchedule {
    /// Fee charged as a fraction of quote notional.
    pub fee_rate: f64,
    /// Expected share of volume filled as maker, in [0, 1].
    pub maker_taker_ratio: f64,
}

const REGULAR: FeeSchedule = FeeSchedule {
    fee_rate: 0.001,
    maker_taker_ratio: 0.6,
};

const VIP_1: FeeSchedule = FeeSchedule {
    fee_rate: 0.0007,
    maker_taker_ratio: 0.7,
};

const VIP_2: FeeSchedule = FeeSchedule {
    fee_rate: 0.0005,
    maker_taker_ratio: 0.8,
};

impl FeeTier {
    pub const ALL: [FeeTier; 3] = [FeeTier::Regular, FeeTier::Vip1, FeeTier::Vip2];

    pub fn label(&self) -> &'static str {
        match self {
            FeeTier::Regular => "Regular",
            FeeTier::Vip1 => "VIP 1",
            FeeTier::Vip2 => "VIP 2",
        }
    }

    /// Resolve a user-facing label. Case and inner whitespace are ignored
    /// (`"vip1"` == `"VIP 1"`); anything unrecognised falls back to the default tier.
    pub fn from_label(label: &str) -> FeeTier {
        Self::try_from_label(label).unwrap_or_default()
    }

    /// Strict variant of [`FeeTier::from_label`].
    pub fn try_from_label(label: &str) -> Option<FeeTier> {
        let key: String = label
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();

        match key.as_str() {
            "regular" => Some(FeeTier::Regular),
            "vip1" => Some(FeeTier::Vip1),
            "vip2" => Some(FeeTier::Vip2),
            _ => None,
        }
    }

    pub fn schedule(&self) -> FeeSchedule {
        match self {
            FeeTier::Regular => REGULAR,
            FeeTier::Vip1 => VIP_1,
            FeeTier::Vip2 => VIP_2,
        }
    }
}

impl fmt::Display for FeeTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
