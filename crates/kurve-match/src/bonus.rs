//! The bonus effect contract: time-limited, spatial pickup effects.
//!
//! A [`Bonus`] is pure data plus behavior — it holds no reference to
//! the match that spawned it. The match loop places it on the field
//! (assigning its id), detects pickups by radius, calls [`Bonus::apply_to`]
//! on each affected actor, and calls [`Bonus::clear`] when the effect's
//! duration elapses.
//!
//! Kinds are a fixed enumeration: each variant carries its own constant
//! radius, duration and target scope, and its own effect behavior,
//! selected by tag.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Identity of a placed bonus, assigned by the match field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BonusId(pub u64);

/// Who a bonus effect lands on: the collector, or everyone else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BonusAffect {
    /// The avatar that picked the bonus up.
    #[serde(rename = "self")]
    Collector,
    /// Every other avatar in the match.
    #[serde(rename = "enemy")]
    Enemy,
}

/// The fixed set of bonus kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BonusKind {
    /// Speeds the collector up.
    Turbo,
    /// Slows everyone else down.
    Crawl,
    /// Speeds everyone else up.
    Surge,
    /// Makes the collector invincible (no trail collisions).
    Phantom,
    /// Thickens everyone else's trail.
    Broaden,
    /// Inverts everyone else's steering.
    Mirror,
}

/// Velocity factor for [`BonusKind::Turbo`].
const TURBO_FACTOR: f64 = 1.5;
/// Velocity factor for [`BonusKind::Crawl`].
const CRAWL_FACTOR: f64 = 0.5;
/// Velocity factor for [`BonusKind::Surge`].
const SURGE_FACTOR: f64 = 1.5;
/// Trail width factor for [`BonusKind::Broaden`].
const BROADEN_FACTOR: f64 = 2.0;

impl BonusKind {
    /// Every kind, for spawn tables.
    pub const ALL: [BonusKind; 6] = [
        BonusKind::Turbo,
        BonusKind::Crawl,
        BonusKind::Surge,
        BonusKind::Phantom,
        BonusKind::Broaden,
        BonusKind::Mirror,
    ];

    /// Pickup radius on the field.
    pub fn radius(self) -> f64 {
        match self {
            BonusKind::Phantom => 3.2,
            _ => 2.4,
        }
    }

    /// How long the effect lasts once applied.
    pub fn duration(self) -> Duration {
        match self {
            BonusKind::Turbo => Duration::from_millis(3000),
            BonusKind::Phantom => Duration::from_millis(2500),
            _ => Duration::from_millis(5000),
        }
    }

    /// Target scope of the effect.
    pub fn affect(self) -> BonusAffect {
        match self {
            BonusKind::Turbo | BonusKind::Phantom => BonusAffect::Collector,
            _ => BonusAffect::Enemy,
        }
    }
}

/// The mutable knobs a bonus may turn on a match avatar.
///
/// Implemented by the match engine; the gameplay math behind each knob
/// stays over there.
pub trait BonusActor {
    /// Multiplies the avatar's velocity by `factor`.
    fn scale_velocity(&mut self, factor: f64);
    /// Multiplies the avatar's trail width by `factor`.
    fn scale_trail(&mut self, factor: f64);
    /// Inverts (or restores) the avatar's steering.
    fn set_inverted(&mut self, inverted: bool);
    /// Grants (or revokes) trail-collision immunity.
    fn set_invincible(&mut self, invincible: bool);
}

/// The serialized view of a bonus: identity, tag, geometry, scope.
/// Internal bookkeeping is never exposed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BonusSnapshot {
    pub id: Option<BonusId>,
    #[serde(rename = "type")]
    pub kind: BonusKind,
    pub radius: f64,
    pub position: [f64; 2],
    pub affect: BonusAffect,
}

/// A placeable pickup effect.
///
/// Immutable except for the externally assigned id and the `applied`
/// bookkeeping: for every kind, a second [`Bonus::apply_to`] without an
/// intervening [`Bonus::clear`] is a no-op returning `0.0`, so the match
/// loop may call it defensively.
#[derive(Debug, Clone)]
pub struct Bonus {
    id: Option<BonusId>,
    kind: BonusKind,
    position: [f64; 2],
    applied: bool,
}

impl Bonus {
    /// Creates an unplaced bonus at a field position.
    pub fn new(kind: BonusKind, position: [f64; 2]) -> Self {
        Self {
            id: None,
            kind,
            position,
            applied: false,
        }
    }

    /// The identity assigned at placement, if any.
    pub fn id(&self) -> Option<BonusId> {
        self.id
    }

    /// Assigns the field identity. Called once by the match loop when
    /// the bonus is placed.
    pub fn assign_id(&mut self, id: BonusId) {
        self.id = Some(id);
    }

    pub fn kind(&self) -> BonusKind {
        self.kind
    }

    pub fn position(&self) -> [f64; 2] {
        self.position
    }

    pub fn radius(&self) -> f64 {
        self.kind.radius()
    }

    pub fn duration(&self) -> Duration {
        self.kind.duration()
    }

    pub fn affect(&self) -> BonusAffect {
        self.kind.affect()
    }

    /// Applies the effect to one actor, returning the effect magnitude
    /// (the factor for scaling effects, `1.0` for on/off effects).
    ///
    /// Idempotent per pickup: once applied, further calls return `0.0`
    /// and leave the actor untouched until [`Bonus::clear`] runs.
    pub fn apply_to(&mut self, actor: &mut dyn BonusActor) -> f64 {
        if self.applied {
            return 0.0;
        }
        self.applied = true;

        match self.kind {
            BonusKind::Turbo => {
                actor.scale_velocity(TURBO_FACTOR);
                TURBO_FACTOR
            }
            BonusKind::Crawl => {
                actor.scale_velocity(CRAWL_FACTOR);
                CRAWL_FACTOR
            }
            BonusKind::Surge => {
                actor.scale_velocity(SURGE_FACTOR);
                SURGE_FACTOR
            }
            BonusKind::Phantom => {
                actor.set_invincible(true);
                1.0
            }
            BonusKind::Broaden => {
                actor.scale_trail(BROADEN_FACTOR);
                BROADEN_FACTOR
            }
            BonusKind::Mirror => {
                actor.set_inverted(true);
                1.0
            }
        }
    }

    /// Reverses a previously applied effect and resets the bookkeeping.
    /// A no-op if the effect was never applied (or already cleared).
    pub fn clear(&mut self, actor: &mut dyn BonusActor) {
        if !self.applied {
            return;
        }
        self.applied = false;

        match self.kind {
            BonusKind::Turbo => actor.scale_velocity(1.0 / TURBO_FACTOR),
            BonusKind::Crawl => actor.scale_velocity(1.0 / CRAWL_FACTOR),
            BonusKind::Surge => actor.scale_velocity(1.0 / SURGE_FACTOR),
            BonusKind::Phantom => actor.set_invincible(false),
            BonusKind::Broaden => actor.scale_trail(1.0 / BROADEN_FACTOR),
            BonusKind::Mirror => actor.set_inverted(false),
        }
    }

    /// The wire view: identity, type tag, radius, position, affect.
    pub fn snapshot(&self) -> BonusSnapshot {
        BonusSnapshot {
            id: self.id,
            kind: self.kind,
            radius: self.radius(),
            position: self.position,
            affect: self.affect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records every knob a bonus turns.
    struct Probe {
        velocity: f64,
        trail: f64,
        inverted: bool,
        invincible: bool,
    }

    impl Probe {
        fn new() -> Self {
            Self {
                velocity: 1.0,
                trail: 1.0,
                inverted: false,
                invincible: false,
            }
        }
    }

    impl BonusActor for Probe {
        fn scale_velocity(&mut self, factor: f64) {
            self.velocity *= factor;
        }
        fn scale_trail(&mut self, factor: f64) {
            self.trail *= factor;
        }
        fn set_inverted(&mut self, inverted: bool) {
            self.inverted = inverted;
        }
        fn set_invincible(&mut self, invincible: bool) {
            self.invincible = invincible;
        }
    }

    #[test]
    fn test_kind_affect_table() {
        assert_eq!(BonusKind::Turbo.affect(), BonusAffect::Collector);
        assert_eq!(BonusKind::Phantom.affect(), BonusAffect::Collector);
        assert_eq!(BonusKind::Crawl.affect(), BonusAffect::Enemy);
        assert_eq!(BonusKind::Surge.affect(), BonusAffect::Enemy);
        assert_eq!(BonusKind::Broaden.affect(), BonusAffect::Enemy);
        assert_eq!(BonusKind::Mirror.affect(), BonusAffect::Enemy);
    }

    #[test]
    fn test_every_kind_has_positive_geometry_and_duration() {
        for kind in BonusKind::ALL {
            assert!(kind.radius() > 0.0);
            assert!(kind.duration() > Duration::ZERO);
        }
    }

    #[test]
    fn test_apply_turbo_scales_velocity_and_returns_factor() {
        let mut bonus = Bonus::new(BonusKind::Turbo, [10.0, 20.0]);
        let mut probe = Probe::new();

        let magnitude = bonus.apply_to(&mut probe);
        assert_eq!(magnitude, 1.5);
        assert_eq!(probe.velocity, 1.5);
    }

    #[test]
    fn test_second_apply_is_a_no_op() {
        let mut bonus = Bonus::new(BonusKind::Crawl, [0.0, 0.0]);
        let mut probe = Probe::new();

        bonus.apply_to(&mut probe);
        let magnitude = bonus.apply_to(&mut probe);

        assert_eq!(magnitude, 0.0);
        assert_eq!(probe.velocity, 0.5);
    }

    #[test]
    fn test_clear_reverses_scaling_effects() {
        let mut probe = Probe::new();
        for kind in [BonusKind::Turbo, BonusKind::Crawl, BonusKind::Surge, BonusKind::Broaden] {
            let mut bonus = Bonus::new(kind, [0.0, 0.0]);
            bonus.apply_to(&mut probe);
            bonus.clear(&mut probe);
        }
        assert!((probe.velocity - 1.0).abs() < 1e-9);
        assert!((probe.trail - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_clear_reverses_switch_effects() {
        let mut probe = Probe::new();

        let mut phantom = Bonus::new(BonusKind::Phantom, [0.0, 0.0]);
        phantom.apply_to(&mut probe);
        assert!(probe.invincible);
        phantom.clear(&mut probe);
        assert!(!probe.invincible);

        let mut mirror = Bonus::new(BonusKind::Mirror, [0.0, 0.0]);
        mirror.apply_to(&mut probe);
        assert!(probe.inverted);
        mirror.clear(&mut probe);
        assert!(!probe.inverted);
    }

    #[test]
    fn test_clear_without_apply_is_a_no_op() {
        let mut bonus = Bonus::new(BonusKind::Turbo, [0.0, 0.0]);
        let mut probe = Probe::new();
        bonus.clear(&mut probe);
        assert_eq!(probe.velocity, 1.0);
    }

    #[test]
    fn test_snapshot_exposes_contract_fields_only() {
        let mut bonus = Bonus::new(BonusKind::Mirror, [4.0, 8.0]);
        bonus.assign_id(BonusId(9));
        bonus.apply_to(&mut Probe::new());

        let json = serde_json::to_value(bonus.snapshot()).unwrap();
        let mut keys: Vec<_> =
            json.as_object().unwrap().keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, ["affect", "id", "position", "radius", "type"]);

        assert_eq!(json["id"], 9);
        assert_eq!(json["type"], "mirror");
        assert_eq!(json["affect"], "enemy");
        assert_eq!(json["position"], serde_json::json!([4.0, 8.0]));
    }

    #[test]
    fn test_unplaced_bonus_has_no_id() {
        let bonus = Bonus::new(BonusKind::Surge, [0.0, 0.0]);
        assert_eq!(bonus.id(), None);
        let json = serde_json::to_value(bonus.snapshot()).unwrap();
        assert!(json["id"].is_null());
    }
}
