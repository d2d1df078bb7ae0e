//! Per-unit state machine, including the three-timer cast protocol.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitState {
    Idle,
    Moving,
    Attacking,
    Casting,
    Stunned,
    Dead,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CastTimers {
    pub cast_remaining: u32,
    pub effect_delay_remaining: u32,
    pub mana_lock_remaining: u32,
    pub effect_triggered: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitStateMachine {
    pub state: UnitState,
    pub previous_state: UnitState,
    pub stun_remaining: u32,
    pub cast: Option<CastTimers>,
}

impl Default for UnitStateMachine {
    fn default() -> Self {
        UnitStateMachine {
            state: UnitState::Idle,
            previous_state: UnitState::Idle,
            stun_remaining: 0,
            cast: None,
        }
    }
}

impl UnitStateMachine {
    fn can_transition(&self, to: UnitState) -> bool {
        use UnitState::*;
        if self.state == Dead {
            return false;
        }
        match self.state {
            Idle => matches!(to, Moving | Attacking | Casting | Stunned | Dead),
            Moving => matches!(to, Idle | Attacking | Stunned | Dead),
            Attacking => matches!(to, Idle | Moving | Casting | Stunned | Dead),
            Casting => matches!(to, Idle | Stunned | Dead),
            Stunned => true, // restoring previous state or dying is always legal
            Dead => false,
        }
    }

    /// Attempts a transition, returning whether it was applied.
    pub fn transition(&mut self, to: UnitState) -> bool {
        if !self.can_transition(to) {
            return false;
        }
        self.state = to;
        true
    }

    pub fn start_cast(&mut self, cast_time: u32, effect_delay: u32, mana_lock: u32) {
        if self.transition(UnitState::Casting) {
            self.cast = Some(CastTimers {
                cast_remaining: cast_time,
                effect_delay_remaining: effect_delay,
                mana_lock_remaining: mana_lock,
                effect_triggered: false,
            });
        }
    }

    pub fn should_trigger_effect(&self) -> bool {
        match &self.cast {
            Some(c) => c.effect_delay_remaining == 0 && !c.effect_triggered,
            None => false,
        }
    }

    pub fn mark_effect_triggered(&mut self) {
        if let Some(c) = &mut self.cast {
            c.effect_triggered = true;
        }
    }

    pub fn is_mana_locked(&self) -> bool {
        self.cast.as_ref().map(|c| c.mana_lock_remaining > 0).unwrap_or(false)
    }

    /// Advances cast/mana-lock timers by one tick. Returns to `Idle` when
    /// the cast animation ends.
    pub fn tick_cast(&mut self) {
        let Some(c) = &mut self.cast else { return };
        if c.cast_remaining > 0 {
            c.cast_remaining -= 1;
        }
        if c.effect_delay_remaining > 0 {
            c.effect_delay_remaining -= 1;
        }
        if c.mana_lock_remaining > 0 {
            c.mana_lock_remaining -= 1;
        }
        let mana_lock_done = c.mana_lock_remaining == 0;
        if c.cast_remaining == 0 {
            if mana_lock_done {
                self.cast = None;
            }
            if self.state == UnitState::Casting {
                self.state = UnitState::Idle;
            }
        }
    }

    /// Stuns from any non-dead state; cancels an in-progress cast's
    /// animation/effect timers but leaves `mana_lock_remaining` untouched
    /// (see DESIGN.md's resolution of the mana-overflow open question).
    pub fn apply_stun(&mut self, duration: u32) {
        if self.state == UnitState::Dead {
            return;
        }
        if self.state != UnitState::Stunned {
            self.previous_state = self.state;
        }
        if let Some(c) = &mut self.cast {
            c.cast_remaining = 0;
            c.effect_delay_remaining = 0;
            c.effect_triggered = true;
        }
        self.state = UnitState::Stunned;
        self.stun_remaining = self.stun_remaining.max(duration);
    }

    /// Decrements the stun timer, restoring the previous state at zero.
    pub fn tick_stun(&mut self) {
        if self.state != UnitState::Stunned {
            return;
        }
        if self.stun_remaining > 0 {
            self.stun_remaining -= 1;
        }
        if self.stun_remaining == 0 {
            self.state = self.previous_state;
        }
    }

    pub fn kill(&mut self) {
        self.state = UnitState::Dead;
        self.cast = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cast_effect_fires_exactly_once() {
        let mut sm = UnitStateMachine::default();
        sm.start_cast(10, 3, 10);
        for _ in 0..3 {
            sm.tick_cast();
        }
        assert!(sm.should_trigger_effect());
        sm.mark_effect_triggered();
        assert!(!sm.should_trigger_effect());
        for _ in 0..10 {
            sm.tick_cast();
        }
        assert!(!sm.should_trigger_effect());
    }

    #[test]
    fn stun_cancels_cast_but_keeps_mana_lock() {
        let mut sm = UnitStateMachine::default();
        sm.start_cast(10, 3, 20);
        sm.apply_stun(5);
        assert_eq!(sm.state, UnitState::Stunned);
        assert!(sm.is_mana_locked());
        assert_eq!(sm.cast.as_ref().unwrap().mana_lock_remaining, 20);
        assert!(!sm.should_trigger_effect());
    }

    #[test]
    fn stun_restores_previous_state() {
        let mut sm = UnitStateMachine::default();
        sm.transition(UnitState::Attacking);
        sm.apply_stun(2);
        sm.tick_stun();
        assert_eq!(sm.state, UnitState::Stunned);
        sm.tick_stun();
        assert_eq!(sm.state, UnitState::Attacking);
    }

    #[test]
    fn dead_is_terminal() {
        let mut sm = UnitStateMachine::default();
        sm.kill();
        assert!(!sm.transition(UnitState::Idle));
        assert_eq!(sm.state, UnitState::Dead);
    }

    #[test]
    fn illegal_transition_rejected() {
        let mut sm = UnitStateMachine::default();
        sm.transition(UnitState::Casting);
        assert!(!sm.transition(UnitState::Moving));
        assert_eq!(sm.state, UnitState::Casting);
    }
}
