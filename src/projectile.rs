//! In-flight projectiles: homing or cached-position targeting, with a
//! timeout and an optional miss condition.

#[derive(Debug, Clone)]
pub struct Projectile {
    pub id: u64,
    pub source_id: String,
    pub target_id: String,
    pub ability_id: String,
    pub caster_star_level: u8,
    pub position: (f64, f64),
    pub last_known_target_pixel: (f64, f64),
    pub speed: f64,
    pub homing: bool,
    pub can_miss: bool,
    pub ticks_alive: u32,
    pub max_ticks: u32,
    pub active: bool,
}

pub enum ProjectileStep {
    InFlight,
    Arrived,
    Missed,
    TimedOut,
}

impl Projectile {
    /// Advances one tick. `live_target_pixel` is `None` when the target
    /// has died; `can_miss` projectiles deactivate in that case, others
    /// continue toward the last known position.
    pub fn tick(&mut self, live_target_pixel: Option<(f64, f64)>) -> ProjectileStep {
        if !self.active {
            return ProjectileStep::Arrived;
        }
        self.ticks_alive += 1;
        if self.ticks_alive > self.max_ticks {
            self.active = false;
            return ProjectileStep::TimedOut;
        }
        if self.can_miss && live_target_pixel.is_none() {
            self.active = false;
            return ProjectileStep::Missed;
        }

        let aim_at = if self.homing {
            live_target_pixel.unwrap_or(self.last_known_target_pixel)
        } else {
            self.last_known_target_pixel
        };

        let (dx, dy) = (aim_at.0 - self.position.0, aim_at.1 - self.position.1);
        let distance = (dx * dx + dy * dy).sqrt();

        if distance <= self.speed || distance == 0.0 {
            self.position = aim_at;
            self.active = false;
            ProjectileStep::Arrived
        } else {
            let (ux, uy) = (dx / distance, dy / distance);
            self.position = (self.position.0 + ux * self.speed, self.position.1 + uy * self.speed);
            ProjectileStep::InFlight
        }
    }
}

#[derive(Debug, Default)]
pub struct ProjectileManager {
    pub projectiles: Vec<Projectile>,
    next_id: u64,
}

impl ProjectileManager {
    pub fn spawn(
        &mut self,
        source_id: String,
        target_id: String,
        ability_id: String,
        caster_star_level: u8,
        start_pixel: (f64, f64),
        target_pixel: (f64, f64),
        speed: f64,
        homing: bool,
        can_miss: bool,
        max_ticks: u32,
    ) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.projectiles.push(Projectile {
            id,
            source_id,
            target_id,
            ability_id,
            caster_star_level,
            position: start_pixel,
            last_known_target_pixel: target_pixel,
            speed,
            homing,
            can_miss,
            ticks_alive: 0,
            max_ticks,
            active: true,
        });
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_homing_projectile_arrives_at_cached_position() {
        let mut p = Projectile {
            id: 0,
            source_id: "s".into(),
            target_id: "t".into(),
            ability_id: "a".into(),
            caster_star_level: 1,
            position: (0.0, 0.0),
            last_known_target_pixel: (3.0, 0.0),
            speed: 5.0,
            homing: false,
            can_miss: false,
            ticks_alive: 0,
            max_ticks: 300,
            active: true,
        };
        let step = p.tick(Some((10.0, 10.0)));
        assert!(matches!(step, ProjectileStep::Arrived));
        assert_eq!(p.position, (3.0, 0.0));
    }

    #[test]
    fn can_miss_projectile_deactivates_on_dead_target() {
        let mut p = Projectile {
            id: 0,
            source_id: "s".into(),
            target_id: "t".into(),
            ability_id: "a".into(),
            caster_star_level: 1,
            position: (0.0, 0.0),
            last_known_target_pixel: (30.0, 0.0),
            speed: 1.0,
            homing: true,
            can_miss: true,
            ticks_alive: 0,
            max_ticks: 300,
            active: true,
        };
        let step = p.tick(None);
        assert!(matches!(step, ProjectileStep::Missed));
        assert!(!p.active);
    }

    #[test]
    fn timeout_deactivates_projectile() {
        let mut p = Projectile {
            id: 0,
            source_id: "s".into(),
            target_id: "t".into(),
            ability_id: "a".into(),
            caster_star_level: 1,
            position: (0.0, 0.0),
            last_known_target_pixel: (1000.0, 0.0),
            speed: 1.0,
            homing: false,
            can_miss: false,
            ticks_alive: 300,
            max_ticks: 300,
            active: true,
        };
        let step = p.tick(Some((1000.0, 0.0)));
        assert!(matches!(step, ProjectileStep::TimedOut));
    }
}
