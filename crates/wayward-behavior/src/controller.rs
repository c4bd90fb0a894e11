//! Composition root: one behavior controller per entity.
//!
//! The controller keeps its [`EventEngine`] beside the [`BehaviorCore`]
//! rather than inside it. Every operation runs on the core, which only
//! queues notifications; the controller then drains the queue, handing the
//! engine a `&mut dyn ControlSurface` onto the core. Engine handlers can
//! therefore call any control operation synchronously, and whatever that
//! raises is delivered in order before the outer call returns.

use crate::config::BehaviorConfig;
use crate::context::{BehaviorContext, Gait};
use crate::control::ControlSurface;
use crate::despawn::DespawnScheduler;
use crate::escort::{EscortController, EscortState};
use crate::evade::{reset_posture, EvadeOrchestrator, EvadeOutcome};
use crate::events::{BehaviorEvent, EventEngine, EventQueue};
use crate::follow::{FollowController, RewardKind};
use crate::motion::{MotionMaster, MovementKind, MovementSlot, PointId};
use crate::paths::PathRepository;
use crate::world::World;
use std::sync::Arc;
use tracing::{debug, error};
use wayward_common::{EntityId, MarkerKind, PathId, QuestId, SpellId};

/// Events delivered by one flush before the queue is considered runaway.
pub const MAX_EVENTS_PER_FLUSH: usize = 1024;

/// Shared, thread-safe path repository handle.
pub type SharedPaths = Arc<dyn PathRepository + Send + Sync>;

/// Combat posture flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Posture {
    /// Charmed by another unit
    pub charmed: bool,
    /// Melee auto-attack enabled
    pub auto_attack: bool,
    /// Chasing the victim allowed
    pub combat_move: bool,
    /// Health floor for incoming damage; zero disables
    pub invincibility_floor: u32,
    /// Set between a respawn and the next reached-home
    pub just_reset: bool,
}

impl Default for Posture {
    fn default() -> Self {
        Self {
            charmed: false,
            auto_attack: true,
            combat_move: true,
            invincibility_floor: 0,
            just_reset: false,
        }
    }
}

/// Behavior state of one entity, without its event engine.
pub struct BehaviorCore<M, W> {
    me: EntityId,
    motion: M,
    world: W,
    paths: SharedPaths,
    config: BehaviorConfig,
    events: EventQueue,
    gait: Gait,
    despawn: DespawnScheduler,
    escort: EscortController,
    follow: FollowController,
    evade: EvadeOrchestrator,
    posture: Posture,
}

impl<M: MotionMaster, W: World> BehaviorCore<M, W> {
    fn new(me: EntityId, motion: M, world: W, paths: SharedPaths, config: BehaviorConfig) -> Self {
        let anchor = world.position(me).unwrap_or_default();
        Self {
            me,
            despawn: DespawnScheduler::new(config.hidden_phase_ms),
            motion,
            world,
            paths,
            config,
            events: EventQueue::new(),
            gait: Gait::default(),
            escort: EscortController::new(anchor),
            follow: FollowController::new(),
            evade: EvadeOrchestrator::new(),
            posture: Posture::default(),
        }
    }

    fn parts(
        &mut self,
    ) -> (
        BehaviorContext<'_>,
        &mut EscortController,
        &mut FollowController,
        &EvadeOrchestrator,
    ) {
        let ctx = BehaviorContext {
            me: self.me,
            motion: &mut self.motion,
            world: &mut self.world,
            paths: &*self.paths,
            events: &mut self.events,
            despawn: &mut self.despawn,
            gait: &mut self.gait,
            config: &self.config,
            charmed: self.posture.charmed,
        };
        (ctx, &mut self.escort, &mut self.follow, &self.evade)
    }

    fn is_ai_controlled(&self) -> bool {
        !self.posture.charmed && !self.world.is_controlled_by_party(self.me)
    }

    fn emit(&mut self, event: BehaviorEvent) {
        self.events.push(event);
    }

    fn update_escort(&mut self, diff_ms: u32) {
        let (mut ctx, escort, _, _) = self.parts();
        escort.update(&mut ctx, diff_ms);
    }

    fn update_despawn(&mut self, diff_ms: u32) {
        self.despawn.update(diff_ms, self.me, &mut self.world);
    }

    fn update_follow(&mut self, diff_ms: u32) {
        let (mut ctx, _, follow, _) = self.parts();
        follow.update(&mut ctx, diff_ms);
    }

    fn update_combat(&mut self) {
        if !self.is_ai_controlled() {
            return;
        }
        if self.world.update_victim(self.me).is_none() {
            return;
        }
        if self.posture.auto_attack {
            self.world.melee_attack_if_ready(self.me);
        }
    }

    fn movement_inform(&mut self, kind: MovementKind, point: PointId) {
        if (kind == MovementKind::Point && point == PointId::Anchor) || kind == MovementKind::Follow {
            self.world.set_evading(self.me, false);
        }
        self.emit(BehaviorEvent::MovementInform { kind, point });

        if kind != MovementKind::Point || !self.escort.state().is_escorting() {
            return;
        }
        let (mut ctx, escort, _, _) = self.parts();
        escort.point_reached(&mut ctx, point);
    }

    fn enter_evade_mode(&mut self) -> EvadeOutcome {
        let (mut ctx, escort, follow, evade) = self.parts();
        evade.enter(&mut ctx, escort, follow)
    }

    fn reset(&mut self) {
        let (mut ctx, escort, _, _) = self.parts();
        reset_posture(&mut ctx, escort);
    }

    fn just_reached_home(&mut self) {
        self.reset();
        if !self.posture.just_reset {
            self.emit(BehaviorEvent::ReachedHome);

            let idle = self.motion.current_kind() == MovementKind::Idle;
            if self.world.update_victim(self.me).is_none() && idle {
                if let Some(path) = self.world.waypoint_path(self.me) {
                    self.motion.move_path(path, true);
                }
            }
        }
        self.posture.just_reset = false;
    }

    fn just_respawned(&mut self) {
        self.despawn.reset();
        self.escort.reset();
        self.world.set_visible(self.me, true);
        self.world.restore_faction(self.me);
        self.posture.just_reset = true;
        self.just_reached_home();
        self.emit(BehaviorEvent::Respawn);
        // Follow survives a plain reset so it can be resumed after an evade.
        self.follow.clear();
    }

    fn initialize(&mut self) {
        if !self.world.is_dead(self.me) {
            self.posture.just_reset = true;
        }
        self.just_reached_home();
        self.emit(BehaviorEvent::Respawn);
    }

    fn enter_combat(&mut self, victim: EntityId) {
        let ai = self.is_ai_controlled();
        if ai {
            self.world.interrupt_non_melee_spells(self.me);
        }
        self.emit(BehaviorEvent::Aggro { victim });
        if !ai {
            return;
        }

        let here = self.world.position(self.me).unwrap_or_default();
        self.escort.set_anchor(here);
        self.gait.reapply(&mut self.motion);
        if self.motion.slot_kind(MovementSlot::Active) == MovementKind::Point {
            self.motion.movement_expired();
        }
    }

    fn just_died(&mut self, killer: Option<EntityId>) {
        self.emit(BehaviorEvent::Death { killer });
        if self.escort.state().is_escorting() {
            let (mut ctx, escort, _, _) = self.parts();
            escort.abort(&mut ctx);
            ctx.motion.stop_moving();
            ctx.motion.move_idle();
        }
    }

    fn start_attack(&mut self, victim: EntityId) {
        if !self.world.attack(self.me, victim) {
            return;
        }
        self.gait.reapply(&mut self.motion);
        if self.motion.current_kind() == MovementKind::Point {
            self.motion.movement_expired();
        }
        if self.posture.combat_move {
            self.motion.move_chase(victim);
        }
        let here = self.world.position(self.me).unwrap_or_default();
        self.escort.set_anchor(here);
    }

    fn move_in_line_of_sight(&mut self, who: EntityId) {
        self.emit(BehaviorEvent::UnitInLineOfSight { unit: who });
        if !self.is_ai_controlled() {
            return;
        }
        self.assist_party_against(who);
    }

    fn assist_party_against(&mut self, who: EntityId) -> bool {
        let me = self.me;
        if self.world.is_passive(me) || !self.is_ai_controlled() {
            return false;
        }
        let Some(victim) = self.world.victim_of(who) else {
            return false;
        };
        if !self.world.can_assist(me) || !self.world.is_party_controlled(victim) || self.world.is_friendly(me, who) {
            return false;
        }

        let close = self
            .world
            .distance(me, who)
            .is_some_and(|d| d <= self.config.assist_distance);
        if !close || !self.world.has_line_of_sight(me, who) {
            return false;
        }

        debug!(entity = %me, attacker = %who, "Assisting party");
        if self.world.victim_of(me).is_none() {
            self.start_attack(who);
        } else {
            self.world.join_combat(me, who);
        }
        true
    }

    fn damage_taken(&mut self, attacker: Option<EntityId>, damage: u32) -> u32 {
        self.emit(BehaviorEvent::Damaged { attacker, amount: damage });
        if !self.is_ai_controlled() {
            return damage;
        }

        let floor = self.posture.invincibility_floor;
        if floor != 0 {
            let allowed = self.world.health(self.me).saturating_sub(floor);
            if damage >= allowed {
                return allowed;
            }
        }
        damage
    }

    fn on_charmed(&mut self, apply: bool) {
        if apply {
            if !self.escort.state().is_empty() {
                let (mut ctx, escort, _, _) = self.parts();
                escort.abort(&mut ctx);
            }
            self.motion.stop_moving();
        }
        self.posture.charmed = apply;

        if !apply && !self.world.is_in_evade_mode(self.me) {
            if self.escort.is_repeating() {
                let run = self.gait.is_running();
                let path = self.escort.path_id();
                let (mut ctx, escort, _, _) = self.parts();
                escort.start_path(&mut ctx, run, path, true, None);
            } else {
                self.gait.reapply(&mut self.motion);
            }

            if let Some(charmer) = self.world.charmer(self.me) {
                self.start_attack(charmer);
            }
        }
        self.emit(BehaviorEvent::Charmed { applied: apply });
    }
}

impl<M: MotionMaster, W: World> ControlSurface for BehaviorCore<M, W> {
    fn entity(&self) -> EntityId {
        self.me
    }

    fn start_path(&mut self, run: bool, path: Option<PathId>, repeat: bool, invoker: Option<EntityId>) {
        let (mut ctx, escort, _, _) = self.parts();
        escort.start_path(&mut ctx, run, path, repeat, invoker);
    }

    fn pause_path(&mut self, delay_ms: u32, forced: bool) {
        let (mut ctx, escort, _, _) = self.parts();
        escort.pause_path(&mut ctx, delay_ms, forced);
    }

    fn stop_path(&mut self, despawn_ms: u32, quest: Option<QuestId>, failed: bool) {
        let (mut ctx, escort, _, _) = self.parts();
        escort.stop_path(&mut ctx, despawn_ms, quest, failed);
    }

    fn resume_path(&mut self) {
        let (mut ctx, escort, _, _) = self.parts();
        escort.resume_path(&mut ctx);
    }

    fn set_escort_targets(&mut self, targets: Vec<EntityId>) {
        self.escort.set_targets(targets);
    }

    fn set_follow(
        &mut self,
        target: Option<EntityId>,
        distance: f32,
        angle: f32,
        reward_id: u32,
        marker: MarkerKind,
        reward_kind: RewardKind,
    ) {
        let (mut ctx, _, follow, _) = self.parts();
        follow.set_follow(&mut ctx, target, distance, angle, reward_id, marker, reward_kind);
    }

    fn set_run(&mut self, run: bool) {
        self.gait.set(&mut self.motion, run);
    }

    fn set_fly(&mut self, fly: bool) {
        self.motion.set_disable_gravity(fly);
    }

    fn set_swim(&mut self, swim: bool) {
        self.motion.set_swim(swim);
    }

    fn set_combat_move(&mut self, on: bool) {
        if self.posture.combat_move == on {
            return;
        }
        self.posture.combat_move = on;
        if !self.is_ai_controlled() || self.escort.state().is_escorting() {
            return;
        }

        if on {
            let Some(victim) = self.world.victim_of(self.me) else {
                return;
            };
            if self.motion.current_kind() == MovementKind::Idle {
                self.gait.reapply(&mut self.motion);
                self.motion.move_chase(victim);
                self.world.cast_stop(self.me);
            }
        } else {
            if self.world.is_confused_or_fleeing(self.me) {
                return;
            }
            self.motion.movement_expired();
            self.motion.clear();
            self.motion.stop_moving();
            self.motion.move_idle();
        }
    }

    fn set_evade_disabled(&mut self, disabled: bool) {
        self.evade.set_disabled(disabled);
    }

    fn set_invincibility_floor(&mut self, floor: u32) {
        self.posture.invincibility_floor = floor;
    }

    fn set_auto_attack(&mut self, on: bool) {
        self.posture.auto_attack = on;
    }

    fn set_despawn_time(&mut self, delay_ms: u32, respawn_ms: u32) {
        self.despawn.schedule(delay_ms, respawn_ms);
    }

    fn start_despawn(&mut self) {
        self.despawn.start();
    }

    fn set_data(&mut self, id: u32, value: u32) {
        self.emit(BehaviorEvent::DataSet { id, value });
    }

    fn get_data(&self, _id: u32) -> u32 {
        0
    }

    fn do_action(&mut self, param: i32) {
        self.emit(BehaviorEvent::ActionDone { param });
    }

    fn attack_start(&mut self, victim: EntityId) {
        self.start_attack(victim);
    }

    fn escort_state(&self) -> EscortState {
        self.escort.state()
    }

    fn path_id(&self) -> Option<PathId> {
        self.escort.path_id()
    }

    fn can_combat_move(&self) -> bool {
        self.posture.combat_move
    }
}

/// Per-entity behavior controller.
///
/// Drives escort, despawn and follow from [`update`](Self::update),
/// forwards lifecycle hooks to the event engine, and exposes the
/// [`ControlSurface`].
pub struct BehaviorController<M, W, E> {
    core: BehaviorCore<M, W>,
    engine: E,
}

impl<M: MotionMaster, W: World, E: EventEngine> BehaviorController<M, W, E> {
    /// Creates a controller for `me`.
    pub fn new(
        me: EntityId,
        motion: M,
        world: W,
        paths: SharedPaths,
        config: BehaviorConfig,
        engine: E,
    ) -> Self {
        Self {
            core: BehaviorCore::new(me, motion, world, paths, config),
            engine,
        }
    }

    /// Delivers queued notifications until none are left.
    fn flush(&mut self) {
        let mut delivered = 0usize;
        while let Some(event) = self.core.events.pop() {
            delivered += 1;
            if delivered > MAX_EVENTS_PER_FLUSH {
                error!(
                    entity = %self.core.me,
                    dropped = self.core.events.len() + 1,
                    "Event handlers keep raising events, dropping the rest"
                );
                self.core.events.clear();
                return;
            }
            self.engine.process(&event, &mut self.core);
        }
    }

    /// Advances the entity by one tick.
    ///
    /// Order: engine tick, escort, despawn, follow, then melee when AI
    /// controlled and engaged.
    pub fn update(&mut self, diff_ms: u32) {
        self.engine.on_update(diff_ms, &mut self.core);
        self.flush();
        self.core.update_escort(diff_ms);
        self.flush();
        self.core.update_despawn(diff_ms);
        self.core.update_follow(diff_ms);
        self.flush();
        self.core.update_combat();
    }

    /// First-time setup after the entity is created.
    pub fn initialize(&mut self) {
        self.engine.on_initialize(self.core.me);
        self.core.initialize();
        self.flush();
    }

    /// Reports a finished movement.
    pub fn movement_inform(&mut self, kind: MovementKind, point: PointId) {
        self.core.movement_inform(kind, point);
        self.flush();
    }

    /// Combat ended: choose where to go and re-arm the posture.
    pub fn enter_evade_mode(&mut self) -> EvadeOutcome {
        let outcome = self.core.enter_evade_mode();
        self.flush();
        outcome
    }

    /// The entity respawned.
    pub fn just_respawned(&mut self) {
        self.core.just_respawned();
        self.flush();
    }

    /// The entity arrived home after an evade.
    pub fn just_reached_home(&mut self) {
        self.core.just_reached_home();
        self.flush();
    }

    /// The entity entered combat with `victim`.
    pub fn enter_combat(&mut self, victim: EntityId) {
        self.core.enter_combat(victim);
        self.flush();
    }

    /// The entity died.
    pub fn just_died(&mut self, killer: Option<EntityId>) {
        self.core.just_died(killer);
        self.flush();
    }

    /// The entity killed `victim`.
    pub fn killed_unit(&mut self, victim: EntityId) {
        self.notify(BehaviorEvent::Kill { victim });
    }

    /// A unit came into view.
    pub fn move_in_line_of_sight(&mut self, who: EntityId) {
        self.core.move_in_line_of_sight(who);
        self.flush();
    }

    /// Whether the entity may attack at all.
    #[must_use]
    pub fn can_ai_attack(&self, _victim: EntityId) -> bool {
        !self.core.world.is_passive(self.core.me)
    }

    /// Incoming damage. Returns the damage after the invincibility clamp.
    pub fn damage_taken(&mut self, attacker: Option<EntityId>, damage: u32) -> u32 {
        let damage = self.core.damage_taken(attacker, damage);
        self.flush();
        damage
    }

    /// Outgoing damage.
    pub fn damage_dealt(&mut self, target: EntityId, amount: u32) {
        self.notify(BehaviorEvent::DamagedTarget { target, amount });
    }

    /// The entity was healed.
    pub fn heal_received(&mut self, healer: EntityId, amount: u32) {
        self.notify(BehaviorEvent::ReceiveHeal { healer, amount });
    }

    /// Someone emoted at the entity.
    pub fn receive_emote(&mut self, source: EntityId, emote: u32) {
        self.notify(BehaviorEvent::ReceiveEmote { source, emote });
    }

    /// A spell hit the entity.
    pub fn spell_hit(&mut self, caster: EntityId, spell: SpellId) {
        self.notify(BehaviorEvent::SpellHit { caster, spell });
    }

    /// The entity's spell hit a target.
    pub fn spell_hit_target(&mut self, target: EntityId, spell: SpellId) {
        self.notify(BehaviorEvent::SpellHitTarget { target, spell });
    }

    /// The entity summoned a unit.
    pub fn summoned_unit(&mut self, summon: EntityId) {
        self.notify(BehaviorEvent::SummonedUnit { summon });
    }

    /// The entity was summoned.
    pub fn just_summoned(&mut self, summoner: EntityId) {
        self.notify(BehaviorEvent::JustSummoned { summoner });
    }

    /// A summon of the entity despawned.
    pub fn summon_despawned(&mut self, summon: EntityId) {
        self.notify(BehaviorEvent::SummonDespawned { summon });
    }

    /// The corpse was removed.
    pub fn corpse_removed(&mut self, respawn_delay_ms: u32) {
        self.notify(BehaviorEvent::CorpseRemoved { respawn_delay_ms });
    }

    /// A passenger boarded (`apply`) or left.
    pub fn passenger_boarded(&mut self, passenger: EntityId, seat: i8, apply: bool) {
        let event = if apply {
            BehaviorEvent::PassengerBoarded { passenger, seat }
        } else {
            BehaviorEvent::PassengerRemoved { passenger }
        };
        self.notify(event);
    }

    /// A charm was applied or removed.
    pub fn on_charmed(&mut self, apply: bool) {
        self.core.on_charmed(apply);
        self.flush();
    }

    /// A party opened gossip.
    pub fn gossip_hello(&mut self, party: EntityId) {
        self.notify(BehaviorEvent::GossipHello { party });
    }

    /// A party chose a gossip option.
    pub fn gossip_select(&mut self, party: EntityId, menu: u32, option: u32) {
        self.notify(BehaviorEvent::GossipSelect { party, menu, option });
    }

    /// A party accepted a quest.
    pub fn quest_accepted(&mut self, party: EntityId, quest: QuestId) {
        self.notify(BehaviorEvent::QuestAccepted { party, quest });
    }

    /// A party turned in a quest.
    pub fn quest_rewarded(&mut self, party: EntityId, quest: QuestId, option: u32) {
        self.notify(BehaviorEvent::QuestRewarded { party, quest, option });
    }

    /// A dummy spell effect hit the entity. Always handled.
    pub fn dummy_effect(&mut self, caster: EntityId, spell: SpellId, effect_index: u8) -> bool {
        self.notify(BehaviorEvent::DummyEffect {
            caster,
            spell,
            effect_index,
        });
        true
    }

    /// A world event started or ended.
    pub fn game_event(&mut self, start: bool, id: u16) {
        let event = if start {
            BehaviorEvent::GameEventStart { id }
        } else {
            BehaviorEvent::GameEventEnd { id }
        };
        self.notify(event);
    }

    /// A party clicked the entity; only successful clicks are forwarded.
    pub fn spell_click(&mut self, clicker: EntityId, result: bool) {
        if result {
            self.notify(BehaviorEvent::SpellClick { clicker });
        }
    }

    /// A party entered an area trigger tied to the entity.
    pub fn area_trigger(&mut self, party: EntityId, trigger: u32) {
        self.notify(BehaviorEvent::AreaTrigger { party, trigger });
    }

    fn notify(&mut self, event: BehaviorEvent) {
        self.core.emit(event);
        self.flush();
    }

    // === Accessors ===

    /// The controlled entity.
    #[must_use]
    pub const fn me(&self) -> EntityId {
        self.core.me
    }

    /// Motion collaborator.
    #[must_use]
    pub const fn motion(&self) -> &M {
        &self.core.motion
    }

    /// Motion collaborator, mutably.
    pub fn motion_mut(&mut self) -> &mut M {
        &mut self.core.motion
    }

    /// World collaborator.
    #[must_use]
    pub const fn world(&self) -> &W {
        &self.core.world
    }

    /// World collaborator, mutably.
    pub fn world_mut(&mut self) -> &mut W {
        &mut self.core.world
    }

    /// Event engine.
    #[must_use]
    pub const fn engine(&self) -> &E {
        &self.engine
    }

    /// Event engine, mutably.
    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    /// Escort state.
    #[must_use]
    pub const fn escort(&self) -> &EscortController {
        &self.core.escort
    }

    /// Follow state.
    #[must_use]
    pub const fn follow(&self) -> &FollowController {
        &self.core.follow
    }

    /// Despawn state.
    #[must_use]
    pub const fn despawn(&self) -> &DespawnScheduler {
        &self.core.despawn
    }

    /// Evade settings.
    #[must_use]
    pub const fn evade(&self) -> &EvadeOrchestrator {
        &self.core.evade
    }

    /// Combat posture.
    #[must_use]
    pub const fn posture(&self) -> &Posture {
        &self.core.posture
    }

    /// Remembered gait.
    #[must_use]
    pub const fn gait(&self) -> Gait {
        self.core.gait
    }

    /// Tuning constants.
    #[must_use]
    pub const fn config(&self) -> &BehaviorConfig {
        &self.core.config
    }
}

impl<M: MotionMaster, W: World, E: EventEngine> ControlSurface for BehaviorController<M, W, E> {
    fn entity(&self) -> EntityId {
        self.core.me
    }

    fn start_path(&mut self, run: bool, path: Option<PathId>, repeat: bool, invoker: Option<EntityId>) {
        self.core.start_path(run, path, repeat, invoker);
        self.flush();
    }

    fn pause_path(&mut self, delay_ms: u32, forced: bool) {
        self.core.pause_path(delay_ms, forced);
        self.flush();
    }

    fn stop_path(&mut self, despawn_ms: u32, quest: Option<QuestId>, failed: bool) {
        self.core.stop_path(despawn_ms, quest, failed);
        self.flush();
    }

    fn resume_path(&mut self) {
        self.core.resume_path();
        self.flush();
    }

    fn set_escort_targets(&mut self, targets: Vec<EntityId>) {
        self.core.set_escort_targets(targets);
    }

    fn set_follow(
        &mut self,
        target: Option<EntityId>,
        distance: f32,
        angle: f32,
        reward_id: u32,
        marker: MarkerKind,
        reward_kind: RewardKind,
    ) {
        self.core
            .set_follow(target, distance, angle, reward_id, marker, reward_kind);
        self.flush();
    }

    fn set_run(&mut self, run: bool) {
        self.core.set_run(run);
    }

    fn set_fly(&mut self, fly: bool) {
        self.core.set_fly(fly);
    }

    fn set_swim(&mut self, swim: bool) {
        self.core.set_swim(swim);
    }

    fn set_combat_move(&mut self, on: bool) {
        self.core.set_combat_move(on);
        self.flush();
    }

    fn set_evade_disabled(&mut self, disabled: bool) {
        self.core.set_evade_disabled(disabled);
    }

    fn set_invincibility_floor(&mut self, floor: u32) {
        self.core.set_invincibility_floor(floor);
    }

    fn set_auto_attack(&mut self, on: bool) {
        self.core.set_auto_attack(on);
    }

    fn set_despawn_time(&mut self, delay_ms: u32, respawn_ms: u32) {
        self.core.set_despawn_time(delay_ms, respawn_ms);
    }

    fn start_despawn(&mut self) {
        self.core.start_despawn();
    }

    fn set_data(&mut self, id: u32, value: u32) {
        self.core.set_data(id, value);
        self.flush();
    }

    fn get_data(&self, id: u32) -> u32 {
        self.core.get_data(id)
    }

    fn do_action(&mut self, param: i32) {
        self.core.do_action(param);
        self.flush();
    }

    fn attack_start(&mut self, victim: EntityId) {
        self.core.start_attack(victim);
        self.flush();
    }

    fn escort_state(&self) -> EscortState {
        self.core.escort_state()
    }

    fn path_id(&self) -> Option<PathId> {
        self.core.path_id()
    }

    fn can_combat_move(&self) -> bool {
        self.core.can_combat_move()
    }
}
