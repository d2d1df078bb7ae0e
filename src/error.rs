//! Hand-rolled error type for the simulation kernel's load-time and
//! fatal-runtime failures. Non-fatal runtime issues (no target, no path,
//! suppressed effect errors) are not modeled as errors at all — they are
//! handled locally and logged, per the error handling design.

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum SimulationError {
    /// Unknown unit/ability/item/trait id referenced by a template or roster.
    UnknownTemplateId { kind: &'static str, id: String },
    /// A template record failed to parse or referenced a malformed effect.
    MalformedTemplate { id: String, reason: String },
    /// A roster entry's starting position is invalid or already taken.
    BadPlacement { unit_id: String, reason: String },
    /// A roster is missing units entirely, or both rosters are empty.
    EmptyRoster,
    /// A unit equips more than 3 items, or a `unique` item twice.
    InvalidLoadout { unit_id: String, reason: String },
}

impl fmt::Display for SimulationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulationError::UnknownTemplateId { kind, id } => {
                write!(f, "unknown {kind} template id: {id}")
            }
            SimulationError::MalformedTemplate { id, reason } => {
                write!(f, "malformed template '{id}': {reason}")
            }
            SimulationError::BadPlacement { unit_id, reason } => {
                write!(f, "could not place unit '{unit_id}': {reason}")
            }
            SimulationError::EmptyRoster => write!(f, "a roster has no units"),
            SimulationError::InvalidLoadout { unit_id, reason } => {
                write!(f, "invalid loadout for unit '{unit_id}': {reason}")
            }
        }
    }
}

impl std::error::Error for SimulationError {}

pub type SimResult<T> = Result<T, SimulationError>;
