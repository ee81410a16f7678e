use core::fmt;

use crate::*;

/// Named difficulty, resolved from a [`BoardConfig`] by exact tuple match.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
    Custom,
}

impl Difficulty {
    /// Tiers eligible for best-time records, in display order.
    pub const TIERS: [Difficulty; 3] = [Self::Easy, Self::Medium, Self::Hard];

    pub const fn preset(self) -> Option<BoardConfig> {
        match self {
            Self::Easy => Some(BoardConfig::new(9, 9, 10)),
            Self::Medium => Some(BoardConfig::new(16, 16, 40)),
            Self::Hard => Some(BoardConfig::new(30, 16, 99)),
            Self::Custom => None,
        }
    }

    /// A configuration that matches a preset tuple counts as that tier, however it was entered.
    pub fn of(config: BoardConfig) -> Self {
        Self::TIERS
            .into_iter()
            .find(|tier| tier.preset() == Some(config))
            .unwrap_or(Self::Custom)
    }

    pub const fn is_tier(self) -> bool {
        !matches!(self, Self::Custom)
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Easy => "Easy",
            Self::Medium => "Medium",
            Self::Hard => "Hard",
            Self::Custom => "Custom",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
