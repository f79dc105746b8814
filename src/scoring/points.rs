use std::sync::Arc;

use strum_macros::{Display, EnumString};

/// Turns a placement into league points.
///
/// Implementations must be deterministic in `(placement, player_count)` and
/// never award a worse placement more points than a better one.
pub trait PointsPolicy: Send + Sync {
    fn points(&self, placement: i32, player_count: usize) -> i32;

    fn name(&self) -> &'static str;
}

/// One point per player beaten plus one: first of four earns 4, last earns 1.
#[derive(Debug, Default, Clone, Copy)]
pub struct LinearPoints;

impl PointsPolicy for LinearPoints {
    fn points(&self, placement: i32, player_count: usize) -> i32 {
        let player_count = i32::try_from(player_count).unwrap_or(i32::MAX);
        (player_count - placement + 1).max(0)
    }

    fn name(&self) -> &'static str {
        "linear"
    }
}

/// A single point for every player sharing first place, nothing for the rest.
#[derive(Debug, Default, Clone, Copy)]
pub struct WinnerTakesAllPoints;

impl PointsPolicy for WinnerTakesAllPoints {
    fn points(&self, placement: i32, _player_count: usize) -> i32 {
        if placement == 1 {
            1
        } else {
            0
        }
    }

    fn name(&self) -> &'static str {
        "winner_takes_all"
    }
}

/// Points curves selectable through configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum PointsScheme {
    #[default]
    Linear,
    WinnerTakesAll,
}

impl PointsScheme {
    pub fn policy(self) -> Arc<dyn PointsPolicy> {
        match self {
            PointsScheme::Linear => Arc::new(LinearPoints),
            PointsScheme::WinnerTakesAll => Arc::new(WinnerTakesAllPoints),
        }
    }
}
