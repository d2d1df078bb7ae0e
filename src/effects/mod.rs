pub mod aoe;
pub mod types;

pub use aoe::resolve_aoe;
pub use types::{apply, DamageScaling, Effect, EffectContext, EffectResult, Falloff};
