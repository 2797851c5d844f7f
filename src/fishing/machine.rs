//! The fishing state machine
//!
//! Every notification is a plain method call that mutates the session and
//! returns the actions to perform. Nothing here touches the host directly, so
//! the caller decides where and when actions run.

use tokio::time::Instant;

use super::bite::is_bite;
use super::look::water_view_target;
use super::state::{FishingSession, Pending, Schedule, Thresholds, LureHandle, CAST_COOLDOWN_TICKS};
use crate::host::{
    Action, AgentStatus, EntityId, ObjectKind, SpawnedObject, Velocity, WorldQuery, FISHING_ROD,
};
use crate::settings::Settings;
use crate::utils::bot_state::{FisherActivity, FishingStats};

#[derive(Debug, Clone)]
pub struct FishingStateMachine {
    thresholds: Thresholds,
    session: FishingSession,
    schedule: Schedule,
    activity: FisherActivity,
    stats: FishingStats,
}

impl FishingStateMachine {
    pub fn new(settings: &Settings) -> Self {
        Self {
            thresholds: Thresholds::from(settings),
            session: FishingSession::default(),
            schedule: Schedule::default(),
            activity: FisherActivity::Idle,
            stats: FishingStats::default(),
        }
    }

    pub fn session(&self) -> &FishingSession {
        &self.session
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    pub fn activity(&self) -> FisherActivity {
        self.activity
    }

    pub fn stats(&self) -> FishingStats {
        self.stats
    }

    /// Scheduling tick. Returns at most one action.
    pub fn on_tick<W: WorldQuery + ?Sized>(
        &mut self,
        now: Instant,
        agent: &AgentStatus,
        world: &W,
    ) -> Vec<Action> {
        if agent.dead || agent.eating {
            self.session.reset();
            self.activity = FisherActivity::Incapacitated;
            return Vec::new();
        }

        if !self.schedule.tick() {
            return Vec::new();
        }

        if self.schedule.look_pending && self.thresholds.orient_view {
            self.schedule.look_pending = false;
            self.activity = FisherActivity::OrientingView;
            let target = water_view_target(world, agent.location);
            match target {
                Some(point) => tracing::debug!("[LOOK] Facing water at {:?}", point),
                None => tracing::debug!("[LOOK] No open water in range"),
            }
            return target.map(Action::LookAt).into_iter().collect();
        }

        if agent.held_item != Some(FISHING_ROD) {
            tracing::debug!("[FISHER] Rod not in hand ({:?}), equipping", agent.held_item);
            self.session.reset();
            self.activity = FisherActivity::EquippingRod;
            return vec![Action::SelectItem(FISHING_ROD)];
        }

        match self.schedule.pending {
            Pending::Reel => {
                tracing::info!("[FISHER] Reeling in");
                self.session.reset();
                self.schedule.pending = Pending::Nothing;
                self.recast();
                self.activity = FisherActivity::Reeling;
                return vec![Action::UseHeldItem];
            }
            Pending::Cast => {
                tracing::info!("[FISHER] Casting line");
                self.session.begin_cast(now);
                self.schedule.pending = Pending::Nothing;
                self.schedule.cooldown = CAST_COOLDOWN_TICKS;
                self.stats.casts += 1;
                self.activity = FisherActivity::WaitingForLure;
                return vec![Action::UseHeldItem];
            }
            Pending::Nothing => {}
        }

        if !self.session.fishing && self.session.lure_spawned() {
            tracing::debug!("[FISHER] Stale lure from an earlier cast, recasting");
            self.recast();
            self.activity = FisherActivity::Recasting;
            return Vec::new();
        }

        let deadline_passed = self.session.deadline_passed(now);
        if self.session.fishing && self.session.lure_spawned() && !deadline_passed {
            self.activity = FisherActivity::WaitingForBite;
            return Vec::new();
        }

        if self.session.settling(now) {
            return Vec::new();
        }

        if self.session.fishing && !self.session.lure_spawned() {
            tracing::warn!("[FISHER] Lure never appeared, recasting");
            self.stats.lure_failures += 1;
            self.recast();
            self.activity = FisherActivity::Recasting;
            return Vec::new();
        }

        if self.session.fishing && deadline_passed {
            tracing::info!("[FISHER] Nothing bit before the deadline, recasting");
            self.stats.timeouts += 1;
            self.recast();
            self.activity = FisherActivity::Recasting;
            return Vec::new();
        }

        self.schedule.pending = Pending::Cast;
        self.activity = FisherActivity::Casting;
        Vec::new()
    }

    /// Velocity change of any entity. Returns true if a bite was detected.
    pub fn on_entity_velocity(&mut self, now: Instant, entity: EntityId, velocity: Velocity) -> bool {
        if !self.session.fishing {
            return false;
        }
        match self.session.lure {
            Some(lure) if lure.object_id == entity => {}
            _ => return false,
        }
        if self.session.settling(now) {
            tracing::trace!("[BITE] Ignoring lure motion while it settles");
            return false;
        }
        if !is_bite(velocity, self.thresholds.motion_threshold) {
            tracing::trace!("[BITE] Lure motion {:?} below threshold", velocity);
            return false;
        }

        if self.schedule.pending != Pending::Reel {
            tracing::info!("[BITE] Fish on the line ({:?})", velocity);
            self.stats.bites += 1;
        }
        self.schedule.pending = Pending::Reel;
        self.schedule.cooldown = self.thresholds.reaction_delay_ticks;
        self.activity = FisherActivity::Reeling;
        true
    }

    /// Object spawn. Adopts our own fishing hook as the lure.
    pub fn on_object_spawned(&mut self, agent_id: EntityId, object: &SpawnedObject) -> bool {
        if object.kind != ObjectKind::FishingHook || object.owner != agent_id {
            return false;
        }

        tracing::debug!("[FISHER] Lure {} spawned at {:?}", object.object_id, object.position);
        self.session.lure = Some(LureHandle {
            object_id: object.object_id,
            owner: object.owner,
        });
        if self.session.fishing {
            self.activity = FisherActivity::WaitingForBite;
        }
        true
    }

    /// Queue a cast after the reaction delay. A queued reel is kept.
    fn recast(&mut self) {
        if self.schedule.pending != Pending::Reel {
            self.schedule.pending = Pending::Cast;
        }
        self.schedule.cooldown = self.thresholds.reaction_delay_ticks;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fishing::state::{CAST_SETTLE, MAX_WAIT};
    use crate::host::{BlockId, BlockPos, Vec3, WATER};
    use crate::settings::{ReactionSpeed, Sensitivity};
    use std::time::Duration;

    const AGENT: EntityId = 1;
    const LURE: EntityId = 99;

    struct Pond;

    impl WorldQuery for Pond {
        fn block_locations(&self, _: Vec3, _: i32, _: i32, block: BlockId) -> Vec<BlockPos> {
            if block == WATER {
                vec![BlockPos::new(0, 63, 5)]
            } else {
                Vec::new()
            }
        }

        fn block_id(&self, pos: BlockPos) -> BlockId {
            if pos == BlockPos::new(0, 63, 5) {
                WATER
            } else {
                0
            }
        }
    }

    fn agent() -> AgentStatus {
        AgentStatus {
            entity_id: AGENT,
            dead: false,
            eating: false,
            held_item: Some(FISHING_ROD),
            location: Vec3::new(0.0, 64.0, 0.0),
        }
    }

    fn hook(owner: EntityId) -> SpawnedObject {
        SpawnedObject {
            kind: ObjectKind::FishingHook,
            object_id: LURE,
            owner,
            position: Vec3::new(0.0, 63.0, 5.0),
            pitch: 0,
            yaw: 0,
        }
    }

    /// Tick until an action comes out, giving up after `max` ticks.
    fn tick_until_action(
        machine: &mut FishingStateMachine,
        now: Instant,
        agent: &AgentStatus,
        max: usize,
    ) -> Option<(Vec<Action>, usize)> {
        for i in 1..=max {
            let actions = machine.on_tick(now, agent, &Pond);
            if !actions.is_empty() {
                return Some((actions, i));
            }
        }
        None
    }

    /// Machine with a line out at `t0` and our lure adopted.
    fn fishing_at(settings: Settings, t0: Instant) -> FishingStateMachine {
        let mut machine = FishingStateMachine::new(&settings);
        let (actions, _) = tick_until_action(&mut machine, t0, &agent(), 20).unwrap();
        assert_eq!(actions, vec![Action::UseHeldItem]);
        assert!(machine.on_object_spawned(AGENT, &hook(AGENT)));
        machine
    }

    #[test]
    fn test_first_cast() {
        let t0 = Instant::now();
        let mut machine = FishingStateMachine::new(&Settings::default());

        let (actions, ticks) = tick_until_action(&mut machine, t0, &agent(), 20).unwrap();
        assert_eq!(actions, vec![Action::UseHeldItem]);
        // one tick to queue the cast, then the base cooldown, then the cast
        assert_eq!(ticks, 7);
        assert!(machine.session().fishing);
        assert_eq!(machine.session().cast_time, Some(t0));
        assert_eq!(machine.session().max_wait_deadline, Some(t0 + MAX_WAIT));
        assert_eq!(machine.stats().casts, 1);
    }

    #[test]
    fn test_bite_after_settle_reels_on_next_eligible_tick() {
        let t0 = Instant::now();
        let mut machine = fishing_at(Settings::default(), t0);
        let later = t0 + Duration::from_millis(6_100);

        assert!(machine.on_entity_velocity(later, LURE, Velocity::new(0, -300, 0)));
        assert_eq!(machine.schedule().pending, Pending::Reel);

        let (actions, ticks) = tick_until_action(&mut machine, later, &agent(), 20).unwrap();
        assert_eq!(actions, vec![Action::UseHeldItem]);
        assert_eq!(ticks, ReactionSpeed::Medium.cooldown_ticks() as usize + 1);
        assert!(!machine.session().fishing);
        assert!(machine.session().lure.is_none());
        assert_eq!(machine.schedule().pending, Pending::Cast);
        assert_eq!(machine.stats().bites, 1);
    }

    #[test]
    fn test_bite_during_settle_is_ignored() {
        let t0 = Instant::now();
        let mut machine = fishing_at(Settings::default(), t0);
        let early = t0 + Duration::from_millis(5_900);

        assert!(!machine.on_entity_velocity(early, LURE, Velocity::new(0, -300, 0)));
        assert_eq!(machine.schedule().pending, Pending::Nothing);
        assert!(tick_until_action(&mut machine, early, &agent(), 40).is_none());
    }

    #[test]
    fn test_bite_exactly_at_settle_boundary_counts() {
        let t0 = Instant::now();
        let mut machine = fishing_at(Settings::default(), t0);
        assert!(machine.on_entity_velocity(t0 + CAST_SETTLE, LURE, Velocity::new(0, -300, 0)));
    }

    #[test]
    fn test_each_bite_condition_is_required() {
        let t0 = Instant::now();
        let later = t0 + Duration::from_secs(7);
        let sinking = Velocity::new(0, -300, 0);

        let mut machine = fishing_at(Settings::default(), t0);
        assert!(!machine.on_entity_velocity(later, LURE + 1, sinking));
        assert!(!machine.on_entity_velocity(later, LURE, Velocity::new(3, -300, 0)));
        assert!(!machine.on_entity_velocity(later, LURE, Velocity::new(0, -300, 3)));
        assert!(!machine.on_entity_velocity(later, LURE, Velocity::new(0, -100, 0)));

        let mut idle = FishingStateMachine::new(&Settings::default());
        idle.on_object_spawned(AGENT, &hook(AGENT));
        assert!(!idle.on_entity_velocity(later, LURE, sinking));

        let mut lureless = FishingStateMachine::new(&Settings::default());
        tick_until_action(&mut lureless, t0, &agent(), 20).unwrap();
        assert!(!lureless.on_entity_velocity(later, LURE, sinking));
    }

    #[test]
    fn test_sensitivity_changes_acceptance() {
        let t0 = Instant::now();
        let later = t0 + Duration::from_secs(7);
        let motion = Velocity::new(0, -300, 0);

        let mut high = fishing_at(Settings { sensitivity: Sensitivity::High, ..Default::default() }, t0);
        let mut low = fishing_at(Settings { sensitivity: Sensitivity::Low, ..Default::default() }, t0);
        assert!(high.on_entity_velocity(later, LURE, motion));
        assert!(!low.on_entity_velocity(later, LURE, motion));
    }

    #[test]
    fn test_fast_reaction_reels_immediately() {
        let t0 = Instant::now();
        let settings = Settings { reaction_speed: ReactionSpeed::Fast, ..Default::default() };
        let mut machine = fishing_at(settings, t0);
        let later = t0 + Duration::from_secs(10);

        assert!(machine.on_entity_velocity(later, LURE, Velocity::new(0, -2000, 0)));
        assert_eq!(machine.on_tick(later, &agent(), &Pond), vec![Action::UseHeldItem]);
    }

    #[test]
    fn test_missing_lure_triggers_recast() {
        let t0 = Instant::now();
        let mut machine = FishingStateMachine::new(&Settings::default());
        tick_until_action(&mut machine, t0, &agent(), 20).unwrap();

        // still settling: no judgement on the missing lure yet
        assert!(tick_until_action(&mut machine, t0 + Duration::from_secs(3), &agent(), 40).is_none());
        assert_eq!(machine.stats().lure_failures, 0);

        let late = t0 + Duration::from_secs(7);
        let (actions, _) = tick_until_action(&mut machine, late, &agent(), 40).unwrap();
        assert_eq!(actions, vec![Action::UseHeldItem]);
        assert_eq!(machine.stats().lure_failures, 1);
        assert_eq!(machine.stats().casts, 2);
        assert_eq!(machine.session().cast_time, Some(late));
    }

    #[test]
    fn test_deadline_forces_recast_with_lure_present() {
        let t0 = Instant::now();
        let mut machine = fishing_at(Settings::default(), t0);

        assert!(tick_until_action(&mut machine, t0 + Duration::from_secs(30), &agent(), 40).is_none());

        let expired = t0 + MAX_WAIT + Duration::from_secs(1);
        let (actions, _) = tick_until_action(&mut machine, expired, &agent(), 40).unwrap();
        assert_eq!(actions, vec![Action::UseHeldItem]);
        assert_eq!(machine.stats().timeouts, 1);
        assert!(machine.session().lure_spawned());
    }

    #[test]
    fn test_dead_or_eating_resets_regardless_of_cooldown() {
        let t0 = Instant::now();
        for (dead, eating) in [(true, false), (false, true)] {
            let mut machine = fishing_at(Settings::default(), t0);
            assert!(machine.schedule().cooldown > 0);

            let status = AgentStatus { dead, eating, ..agent() };
            assert!(machine.on_tick(t0, &status, &Pond).is_empty());
            assert!(!machine.session().fishing);
            assert!(machine.session().lure.is_none());
            assert_eq!(machine.activity(), FisherActivity::Incapacitated);
        }
    }

    #[test]
    fn test_equips_rod_without_casting() {
        let t0 = Instant::now();
        let mut machine = fishing_at(Settings::default(), t0);
        let empty_hand = AgentStatus { held_item: None, ..agent() };

        let (actions, _) = tick_until_action(&mut machine, t0, &empty_hand, 40).unwrap();
        assert_eq!(actions, vec![Action::SelectItem(FISHING_ROD)]);
        assert!(!machine.session().fishing);
        assert!(machine.session().lure.is_none());
    }

    #[test]
    fn test_orients_once_before_fishing() {
        let t0 = Instant::now();
        let settings = Settings { keep_rotation: true, ..Default::default() };
        let mut machine = FishingStateMachine::new(&settings);

        let (actions, ticks) = tick_until_action(&mut machine, t0, &agent(), 20).unwrap();
        assert_eq!(ticks, 1);
        match actions.as_slice() {
            [Action::LookAt(target)] => {
                assert!(target.distance(Vec3::new(0.0, 63.8, 5.0)) < 1e-9)
            }
            other => panic!("expected a single look action, got {:?}", other),
        }
        assert!(!machine.schedule().look_pending);

        let (actions, _) = tick_until_action(&mut machine, t0, &agent(), 20).unwrap();
        assert_eq!(actions, vec![Action::UseHeldItem]);
    }

    #[test]
    fn test_stale_lure_queues_recast() {
        let t0 = Instant::now();
        let mut machine = FishingStateMachine::new(&Settings::default());
        machine.on_object_spawned(AGENT, &hook(AGENT));

        assert!(machine.on_tick(t0, &agent(), &Pond).is_empty());
        assert_eq!(machine.schedule().pending, Pending::Cast);
        assert_eq!(machine.activity(), FisherActivity::Recasting);
    }

    #[test]
    fn test_foreign_objects_are_ignored() {
        let mut machine = FishingStateMachine::new(&Settings::default());
        assert!(!machine.on_object_spawned(AGENT, &hook(AGENT + 1)));
        let arrow = SpawnedObject { kind: ObjectKind::Other(60), ..hook(AGENT) };
        assert!(!machine.on_object_spawned(AGENT, &arrow));
        assert!(machine.session().lure.is_none());
    }
}
