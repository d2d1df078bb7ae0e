pub mod ability;
pub mod item;
pub mod stats;
pub mod status;
pub mod template;
pub mod trait_def;
pub mod unit;

pub use ability::{AbilityTemplate, AoeConfig, Delivery, ProjectileConfig};
pub use item::{ConditionalDamageModifier, DamageCondition, ItemTemplate, TriggerType, TriggeredEffect};
pub use stats::{Stat, StatBlock, UnitStats};
pub use status::{DamageType, StatusBag};
pub use template::{UnitDefaults, UnitTemplate};
pub use trait_def::{TraitEffectTarget, TraitTemplate, TraitThreshold, TraitTriggerType};
pub use unit::{EmpoweredAttack, HealOverTime, IntervalTrigger, TargetRef, TransformOnHit, Unit, UnitScratch};
