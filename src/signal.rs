use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Five-step buy/sell classification, ordered from most bearish to most
/// bullish.
///
/// Serializes as `"STRONG_SELL"`, `"SELL"`, `"NEUTRAL"`, `"BUY"`,
/// `"STRONG_BUY"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrendSignal {
    StrongSell,
    Sell,
    Neutral,
    Buy,
    StrongBuy,
}

impl TrendSignal {
    /// Contribution to the composite score: −2 for `StrongSell` up to +2 for
    /// `StrongBuy`.
    #[must_use]
    pub fn weight(self) -> i32 {
        match self {
            Self::StrongSell => -2,
            Self::Sell => -1,
            Self::Neutral => 0,
            Self::Buy => 1,
            Self::StrongBuy => 2,
        }
    }

    /// Composite signal for a summed score.
    ///
    /// `>= 3` is a strong buy and `>= 1` a buy; the sell side mirrors it.
    #[must_use]
    pub fn from_score(score: i32) -> Self {
        match score {
            3.. => Self::StrongBuy,
            1..=2 => Self::Buy,
            0 => Self::Neutral,
            -2..=-1 => Self::Sell,
            ..=-3 => Self::StrongSell,
        }
    }

    /// Presentation metadata for this signal.
    #[must_use]
    pub fn style(self) -> &'static SignalStyle {
        match self {
            Self::StrongSell => &STRONG_SELL,
            Self::Sell => &SELL,
            Self::Neutral => &NEUTRAL,
            Self::Buy => &BUY,
            Self::StrongBuy => &STRONG_BUY,
        }
    }
}

impl Display for TrendSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.style().label)
    }
}

/// How a [`TrendSignal`] is shown to a user. Scoring never reads it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SignalStyle {
    pub label: &'static str,
    pub emoji: &'static str,
    /// CSS hex colour.
    pub color: &'static str,
}

static STRONG_SELL: SignalStyle = SignalStyle {
    label: "Strong Sell",
    emoji: "🔴",
    color: "#dc2626",
};

static SELL: SignalStyle = SignalStyle {
    label: "Sell",
    emoji: "🟠",
    color: "#f97316",
};

static NEUTRAL: SignalStyle = SignalStyle {
    label: "Neutral",
    emoji: "⚪",
    color: "#6b7280",
};

static BUY: SignalStyle = SignalStyle {
    label: "Buy",
    emoji: "🟢",
    color: "#22c55e",
};

static STRONG_BUY: SignalStyle = SignalStyle {
    label: "Strong Buy",
    emoji: "🚀",
    color: "#16a34a",
};
