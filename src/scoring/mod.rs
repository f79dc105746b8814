//! League scoring: scorecard totals, dense placements and league points.
//!
//! Everything here is pure and synchronous. Services in `sessions` feed it
//! validated input and persist what comes out.

pub mod engine;
pub mod points;
pub mod ranking;
pub mod template;

mod errors;

pub use engine::{PlayerInput, ScoredPlayer, SessionScorer};
pub use errors::ScoringError;
pub use points::{LinearPoints, PointsPolicy, PointsScheme, WinnerTakesAllPoints};
pub use ranking::dense_placements;
pub use template::{compute_raw_score, validate_fields, FieldKind, ScoreDetails, TemplateField};
