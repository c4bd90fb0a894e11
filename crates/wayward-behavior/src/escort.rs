//! Escort: walking a waypoint path node by node.
//!
//! The controller issues one point movement at a time and waits for the
//! motion collaborator to report arrival through
//! [`point_reached`](EscortController::point_reached). It never polls
//! positions for node completion.
//!
//! Flags overlap: an escort can be paused and returning at once, but
//! `PAUSED` or `RETURNING` are only ever set while `ESCORTING` is.

use crate::context::BehaviorContext;
use crate::events::BehaviorEvent;
use crate::motion::PointId;
use crate::paths::{WaypointNode, WaypointPath};
use crate::timer::Timer;
use crate::world::QuestStatus;
use bitflags::bitflags;
use std::sync::Arc;
use tracing::{debug, error, warn};
use wayward_common::{EntityId, PathId, Position, QuestId};

bitflags! {
    /// Escort mode flags.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct EscortState: u8 {
        /// Walking a path
        const ESCORTING = 1 << 0;
        /// Heading back to the anchor after combat
        const RETURNING = 1 << 1;
        /// Waiting on the pause timer
        const PAUSED    = 1 << 2;
    }
}

impl EscortState {
    /// Walking a path.
    #[must_use]
    pub const fn is_escorting(self) -> bool {
        self.contains(Self::ESCORTING)
    }

    /// Waiting on a pause timer.
    #[must_use]
    pub const fn is_paused(self) -> bool {
        self.contains(Self::PAUSED)
    }

    /// Walking back to the anchor after combat.
    #[must_use]
    pub const fn is_returning(self) -> bool {
        self.contains(Self::RETURNING)
    }

    /// `PAUSED` and `RETURNING` imply `ESCORTING`.
    #[must_use]
    pub const fn is_consistent(self) -> bool {
        self.is_escorting() || !self.intersects(Self::PAUSED.union(Self::RETURNING))
    }
}

/// Waypoint walking state of one entity.
#[derive(Debug, Clone, Default)]
pub struct EscortController {
    state: EscortState,
    path: Option<Arc<WaypointPath>>,
    path_id: Option<PathId>,
    /// 1-based ordinal of the node last issued; 0 before the first
    current: usize,
    last_wp: Option<WaypointNode>,
    last_reached: Option<PointId>,
    reached: bool,
    pause_timer: Timer,
    forced_pause: bool,
    repeat: bool,
    anchor: Position,
    quest: Option<QuestId>,
    targets: Vec<EntityId>,
    invoker_check: Timer,
}

impl EscortController {
    /// Creates an idle controller anchored at `anchor`.
    #[must_use]
    pub fn new(anchor: Position) -> Self {
        Self {
            anchor,
            ..Self::default()
        }
    }

    /// Starts walking a path. See [`ControlSurface::start_path`](crate::ControlSurface::start_path).
    pub fn start_path(
        &mut self,
        ctx: &mut BehaviorContext<'_>,
        run: bool,
        path: Option<PathId>,
        repeat: bool,
        invoker: Option<EntityId>,
    ) {
        if ctx.in_combat() {
            warn!(entity = %ctx.me, "Cannot start waypoint movement while in combat, ignoring");
            return;
        }
        if self.state.is_escorting() {
            // The path being replaced must not restart itself.
            self.repeat = false;
            self.stop_path(ctx, 0, None, false);
        }

        if let Some(id) = path {
            if !self.load_path(ctx, id) {
                return;
            }
        }
        let Some(loaded) = self.path.clone() else {
            warn!(entity = %ctx.me, "No waypoint path loaded, cannot start");
            return;
        };

        self.state.insert(EscortState::ESCORTING);
        self.repeat = repeat;
        if let Some(invoker) = invoker {
            self.targets = vec![invoker];
        }
        self.invoker_check.reset(ctx.config.invoker_check_interval_ms);
        ctx.set_run(run);

        if let Some(wp) = self.next_waypoint() {
            debug!(entity = %ctx.me, path = %loaded.id(), nodes = loaded.len(), "Escort started");
            self.anchor = ctx.position();
            ctx.motion.move_point(PointId::Waypoint(wp.id), wp.position);
            ctx.emit(BehaviorEvent::WaypointStart {
                point: wp.id,
                path: self.path_id,
            });
        }
    }

    fn load_path(&mut self, ctx: &BehaviorContext<'_>, id: PathId) -> bool {
        if self.state.is_escorting() {
            warn!(entity = %ctx.me, path = %id, "Cannot load a path while escorting");
            return false;
        }
        match ctx.paths.lookup(id) {
            Ok(path) => {
                self.path = Some(path);
                self.path_id = Some(id);
                true
            },
            Err(e) => {
                warn!(entity = %ctx.me, "Failed to load waypoint path: {e}");
                self.path = None;
                self.path_id = None;
                false
            },
        }
    }

    fn next_waypoint(&mut self) -> Option<WaypointNode> {
        let path = self.path.as_ref()?;
        let node = *path.get(self.current)?;
        self.current += 1;
        if node.id as usize != self.current {
            error!(
                path = %path.id(),
                got = node.id,
                expected = self.current,
                "Unexpected waypoint id, continuing with it"
            );
        }
        self.last_wp = Some(node);
        Some(node)
    }

    fn last_point(&self) -> u32 {
        self.last_wp.map_or(0, |wp| wp.id)
    }

    /// Pauses for `delay_ms`. A forced pause halts motion immediately.
    pub fn pause_path(&mut self, ctx: &mut BehaviorContext<'_>, delay_ms: u32, forced: bool) {
        if !self.state.is_escorting() {
            warn!(entity = %ctx.me, "Cannot pause: not escorting");
            return;
        }
        if self.state.is_paused() {
            warn!(entity = %ctx.me, "Cannot pause: already paused, ignoring");
            return;
        }

        self.forced_pause = forced;
        self.anchor = ctx.position();
        self.state.insert(EscortState::PAUSED);
        self.pause_timer.reset(delay_ms);
        if forced {
            ctx.reapply_gait();
            ctx.motion.stop_moving();
            ctx.motion.move_idle();
        }
        ctx.emit(BehaviorEvent::WaypointPaused {
            point: self.last_point(),
            path: self.path_id,
        });
    }

    /// Stops the escort, arming a despawn and optionally recording a quest.
    pub fn stop_path(
        &mut self,
        ctx: &mut BehaviorContext<'_>,
        despawn_ms: u32,
        quest: Option<QuestId>,
        failed: bool,
    ) {
        if !self.state.is_escorting() {
            debug!(entity = %ctx.me, "Stop requested while not escorting");
            return;
        }

        if quest.is_some() {
            self.quest = quest;
        }
        ctx.despawn.schedule(despawn_ms, 0);

        self.anchor = ctx.position();
        ctx.motion.stop_moving();
        ctx.motion.move_idle();
        ctx.emit(BehaviorEvent::WaypointStopped {
            point: self.last_point(),
            path: self.path_id,
        });
        self.end_path(ctx, failed);
    }

    /// Ends the escort, restarting a repeating path when AI controlled.
    pub fn end_path(&mut self, ctx: &mut BehaviorContext<'_>, failed: bool) {
        self.finish(ctx, failed, true);
    }

    /// Ends the escort as a failure without restarting it.
    ///
    /// The repeat flag and path id survive, so a later restart resumes the
    /// same path.
    pub fn abort(&mut self, ctx: &mut BehaviorContext<'_>) {
        self.finish(ctx, true, false);
    }

    fn finish(&mut self, ctx: &mut BehaviorContext<'_>, failed: bool, allow_restart: bool) {
        ctx.emit(BehaviorEvent::WaypointEnded {
            point: self.last_point(),
            path: self.path_id,
        });
        debug!(entity = %ctx.me, failed, "Escort ended");

        self.state = EscortState::empty();
        self.path = None;
        self.current = 0;
        self.pause_timer.clear();
        self.last_wp = None;
        self.last_reached = None;
        self.reached = false;
        self.forced_pause = false;

        if self.repeat {
            if allow_restart && ctx.is_ai_controlled() {
                let run = ctx.gait.is_running();
                self.start_path(ctx, run, self.path_id, true, None);
            }
        } else {
            self.path_id = None;
        }

        self.distribute_quest(ctx, failed);

        if ctx.despawn.is_armed() {
            ctx.despawn.start();
        }
    }

    fn distribute_quest(&self, ctx: &mut BehaviorContext<'_>, failed: bool) {
        let Some(quest) = self.quest else {
            return;
        };

        if let [party] = self.targets[..] {
            if ctx.world.is_party(party) {
                credit(ctx, party, quest, failed, true);
                for member in ctx.world.group_members(party) {
                    if member != party {
                        credit(ctx, member, quest, failed, false);
                    }
                }
                return;
            }
        }

        for &target in &self.targets {
            if ctx.world.is_party(target) {
                credit(ctx, target, quest, failed, false);
            }
        }
    }

    /// Moves back towards the last waypoint issued.
    pub fn resume_path(&mut self, ctx: &mut BehaviorContext<'_>) {
        ctx.reapply_gait();
        if let Some(wp) = self.last_wp {
            ctx.motion.move_point(PointId::Waypoint(wp.id), wp.position);
        }
    }

    /// Enters the returning state and heads for the anchor.
    pub fn begin_return(&mut self, ctx: &mut BehaviorContext<'_>) {
        self.state.insert(EscortState::RETURNING);
        // A node arrival left over from before combat must not count as the anchor.
        self.reached = false;
        self.return_to_anchor(ctx);
    }

    fn return_to_anchor(&mut self, ctx: &mut BehaviorContext<'_>) {
        if !ctx.is_ai_controlled() {
            return;
        }
        ctx.reapply_gait();
        ctx.motion.move_point(PointId::Anchor, self.anchor);
    }

    /// Records a point arrival reported by the motion collaborator.
    pub fn point_reached(&mut self, ctx: &mut BehaviorContext<'_>, id: PointId) {
        if let PointId::Waypoint(point) = id {
            if self.last_reached != Some(id) {
                ctx.emit(BehaviorEvent::WaypointReached {
                    point,
                    path: self.path_id,
                });
            }
        }
        self.last_reached = Some(id);
        self.reached = true;
    }

    /// Per-tick escort logic.
    pub fn update(&mut self, ctx: &mut BehaviorContext<'_>, diff_ms: u32) {
        if !self.state.is_escorting() {
            return;
        }

        if self.invoker_check.tick(diff_ms) {
            self.invoker_check.reset(ctx.config.invoker_check_interval_ms);
            if !self.invoker_in_range(ctx) {
                debug!(entity = %ctx.me, "Escort party out of range");
                let despawn_ms = ctx.despawn.delay_ms();
                self.stop_path(ctx, despawn_ms, self.quest, true);
                return;
            }
        }

        if self.state.is_paused() {
            self.pause_timer.tick(diff_ms);
            if self.pause_timer.is_expired() {
                let at_anchor = self.last_reached == Some(PointId::Anchor);
                if !ctx.in_combat()
                    && !self.state.is_returning()
                    && (self.reached || at_anchor || self.forced_pause)
                {
                    ctx.emit(BehaviorEvent::WaypointResumed {
                        point: self.last_point(),
                        path: self.path_id,
                    });
                    self.state.remove(EscortState::PAUSED);
                    if self.forced_pause {
                        self.resume_path(ctx);
                        self.reached = false;
                        self.forced_pause = false;
                    }
                    if at_anchor {
                        self.reached = true;
                    }
                }
            }
        }

        if self.state.is_returning() && self.reached && self.last_reached == Some(PointId::Anchor) {
            self.state.remove(EscortState::RETURNING);
            if !self.state.is_paused() {
                self.resume_path(ctx);
            }
            self.reached = false;
        }

        if ctx.in_combat() || self.state.intersects(EscortState::PAUSED | EscortState::RETURNING) {
            return;
        }

        if self.reached {
            self.reached = false;
            let len = self.path.as_ref().map_or(0, |p| p.len());
            if self.current >= len {
                self.end_path(ctx, false);
            } else if let Some(wp) = self.next_waypoint() {
                ctx.reapply_gait();
                ctx.motion.move_point(PointId::Waypoint(wp.id), wp.position);
            }
        }
    }

    fn invoker_in_range(&self, ctx: &BehaviorContext<'_>) -> bool {
        let max = ctx.config.escort_max_party_distance;
        let within = |other: EntityId| ctx.world.distance(ctx.me, other).is_some_and(|d| d <= max);

        if let [party] = self.targets[..] {
            if ctx.world.is_party(party) {
                return within(party) || ctx.world.group_members(party).into_iter().any(within);
            }
        }

        let mut parties = self.targets.iter().copied().filter(|t| ctx.world.is_party(*t)).peekable();
        if parties.peek().is_none() {
            return true;
        }
        parties.any(within)
    }

    /// Replaces the escorted parties.
    pub fn set_targets(&mut self, targets: Vec<EntityId>) {
        self.targets = targets;
    }

    /// Records the out-of-combat anchor.
    pub fn set_anchor(&mut self, anchor: Position) {
        self.anchor = anchor;
    }

    /// Drops all escort state.
    pub fn reset(&mut self) {
        *self = Self::new(self.anchor);
    }

    /// Current flags.
    #[must_use]
    pub const fn state(&self) -> EscortState {
        self.state
    }

    /// Loaded path id.
    #[must_use]
    pub const fn path_id(&self) -> Option<PathId> {
        self.path_id
    }

    /// Last waypoint issued.
    #[must_use]
    pub const fn last_waypoint(&self) -> Option<&WaypointNode> {
        self.last_wp.as_ref()
    }

    /// Whether the last issued point was reached.
    #[must_use]
    pub const fn is_reached(&self) -> bool {
        self.reached
    }

    /// Out-of-combat anchor.
    #[must_use]
    pub const fn anchor(&self) -> Position {
        self.anchor
    }

    /// Escorted parties.
    #[must_use]
    pub fn targets(&self) -> &[EntityId] {
        &self.targets
    }

    /// Quest credited when the escort ends.
    #[must_use]
    pub const fn quest(&self) -> Option<QuestId> {
        self.quest
    }

    /// Whether the path restarts when it ends.
    #[must_use]
    pub const fn is_repeating(&self) -> bool {
        self.repeat
    }

    /// Time left on the pause timer.
    #[must_use]
    pub const fn pause_remaining_ms(&self) -> u32 {
        self.pause_timer.remaining()
    }
}

/// Credits or fails `quest` for one party.
fn credit(ctx: &mut BehaviorContext<'_>, party: EntityId, quest: QuestId, failed: bool, group_style: bool) {
    if failed {
        if ctx.world.quest_status(party, quest) == QuestStatus::Incomplete {
            ctx.world.fail_quest(party, quest);
        }
        return;
    }
    if ctx.world.is_at_reward_distance(party, ctx.me) && !ctx.world.has_corpse(party) {
        if group_style {
            ctx.world.group_event_happens(party, quest, ctx.me);
        } else {
            ctx.world.area_explored_or_event_happens(party, quest);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::despawn::DespawnState;
    use crate::mock::{MotionCommand, QuestCall};
    use crate::test_support::Harness;
    use proptest::prelude::*;

    const PATH: PathId = PathId::new(1);

    fn started(h: &mut Harness, repeat: bool) -> EscortController {
        let mut escort = EscortController::default();
        h.with_context(|ctx| escort.start_path(ctx, false, Some(PATH), repeat, None));
        escort
    }

    fn arrive(h: &mut Harness, escort: &mut EscortController, id: PointId) {
        h.with_context(|ctx| {
            escort.point_reached(ctx, id);
            escort.update(ctx, 0);
        });
    }

    fn drain(h: &mut Harness) -> Vec<BehaviorEvent> {
        std::iter::from_fn(|| h.events.pop()).collect()
    }

    fn point_moves(h: &Harness) -> usize {
        h.motion
            .commands()
            .iter()
            .filter(|c| matches!(c, MotionCommand::Point(..)))
            .count()
    }

    #[test]
    fn test_start_moves_to_first_node() {
        let mut h = Harness::new();
        let escort = started(&mut h, false);

        assert!(escort.state().is_escorting());
        assert_eq!(escort.path_id(), Some(PATH));
        assert!(matches!(
            h.motion.last(),
            Some(MotionCommand::Point(PointId::Waypoint(1), _))
        ));
        assert_eq!(
            drain(&mut h),
            vec![BehaviorEvent::WaypointStart {
                point: 1,
                path: Some(PATH)
            }]
        );
        assert!(h.motion.is_walking());
    }

    #[test]
    fn test_start_in_combat_is_ignored() {
        let mut h = Harness::new();
        h.world.set_in_combat(h.me, true);
        let escort = started(&mut h, false);

        assert_eq!(escort.state(), EscortState::empty());
        assert!(escort.last_waypoint().is_none());
        assert!(h.motion.commands().is_empty());
        assert!(h.events.is_empty());
    }

    #[test]
    fn test_unknown_path_aborts_and_clears_id() {
        let mut h = Harness::new();
        let mut escort = EscortController::default();
        h.with_context(|ctx| escort.start_path(ctx, false, Some(PathId::new(404)), false, None));

        assert!(!escort.state().is_escorting());
        assert_eq!(escort.path_id(), None);
        assert!(h.motion.commands().is_empty());
    }

    #[test]
    fn test_five_nodes_end_once() {
        let mut h = Harness::new();
        let mut escort = started(&mut h, false);

        for id in 1..=5 {
            arrive(&mut h, &mut escort, PointId::Waypoint(id));
        }
        let events = drain(&mut h);
        let ended = events
            .iter()
            .filter(|e| matches!(e, BehaviorEvent::WaypointEnded { .. }))
            .count();
        assert_eq!(ended, 1);
        assert!(matches!(
            events.last(),
            Some(BehaviorEvent::WaypointEnded { point: 5, .. })
        ));
        assert!(!escort.state().is_escorting());
        assert_eq!(escort.path_id(), None);
        assert_eq!(point_moves(&h), 5);

        for _ in 0..10 {
            h.with_context(|ctx| escort.update(ctx, 1000));
        }
        assert_eq!(point_moves(&h), 5);
        assert!(h.events.is_empty());
    }

    #[test]
    fn test_reached_fires_once_per_node() {
        let mut h = Harness::new();
        let mut escort = started(&mut h, false);
        drain(&mut h);

        h.with_context(|ctx| {
            escort.point_reached(ctx, PointId::Waypoint(1));
            escort.point_reached(ctx, PointId::Waypoint(1));
            escort.point_reached(ctx, PointId::Anchor);
        });
        assert_eq!(
            drain(&mut h),
            vec![BehaviorEvent::WaypointReached {
                point: 1,
                path: Some(PATH)
            }]
        );
    }

    #[test]
    fn test_repeat_restarts_same_path() {
        let mut h = Harness::new();
        let mut escort = started(&mut h, true);

        for id in 1..=5 {
            arrive(&mut h, &mut escort, PointId::Waypoint(id));
        }
        let starts = drain(&mut h)
            .into_iter()
            .filter(|e| matches!(e, BehaviorEvent::WaypointStart { .. }))
            .count();
        assert_eq!(starts, 2);
        assert!(escort.state().is_escorting());
        assert_eq!(escort.path_id(), Some(PATH));
        assert!(matches!(
            h.motion.last(),
            Some(MotionCommand::Point(PointId::Waypoint(1), _))
        ));
    }

    #[test]
    fn test_repeat_needs_ai_control() {
        let mut h = Harness::new();
        let mut escort = started(&mut h, true);
        h.charmed = true;

        for id in 1..=5 {
            arrive(&mut h, &mut escort, PointId::Waypoint(id));
        }
        assert!(!escort.state().is_escorting());
        assert!(escort.is_repeating());
    }

    #[test]
    fn test_double_pause_rejected() {
        let mut h = Harness::new();
        let mut escort = started(&mut h, false);

        h.with_context(|ctx| escort.pause_path(ctx, 3000, false));
        h.with_context(|ctx| escort.pause_path(ctx, 9000, true));

        assert!(escort.state().is_paused());
        assert_eq!(escort.pause_remaining_ms(), 3000);
        let paused = drain(&mut h)
            .into_iter()
            .filter(|e| matches!(e, BehaviorEvent::WaypointPaused { .. }))
            .count();
        assert_eq!(paused, 1);
    }

    #[test]
    fn test_pause_when_idle_is_noop() {
        let mut h = Harness::new();
        let mut escort = EscortController::default();
        h.with_context(|ctx| escort.pause_path(ctx, 1000, true));
        assert_eq!(escort.state(), EscortState::empty());
        assert!(h.motion.commands().is_empty());
    }

    #[test]
    fn test_pause_resumes_after_node_reached() {
        let mut h = Harness::new();
        let mut escort = started(&mut h, false);
        h.with_context(|ctx| {
            escort.point_reached(ctx, PointId::Waypoint(1));
            escort.pause_path(ctx, 2000, false);
        });
        drain(&mut h);

        h.with_context(|ctx| escort.update(ctx, 1500));
        assert!(escort.state().is_paused());
        h.with_context(|ctx| escort.update(ctx, 500));

        assert!(!escort.state().is_paused());
        let events = drain(&mut h);
        assert!(events.contains(&BehaviorEvent::WaypointResumed {
            point: 1,
            path: Some(PATH)
        }));
        assert!(matches!(
            h.motion.last(),
            Some(MotionCommand::Point(PointId::Waypoint(2), _))
        ));
    }

    #[test]
    fn test_forced_pause_halts_and_resends() {
        let mut h = Harness::new();
        let mut escort = started(&mut h, false);

        h.with_context(|ctx| escort.pause_path(ctx, 1000, true));
        assert_eq!(h.motion.last(), Some(&MotionCommand::Idle));

        h.with_context(|ctx| escort.update(ctx, 1000));
        assert!(!escort.state().is_paused());
        assert!(matches!(
            h.motion.last(),
            Some(MotionCommand::Point(PointId::Waypoint(1), _))
        ));
    }

    #[test]
    fn test_pause_waits_for_arrival() {
        let mut h = Harness::new();
        let mut escort = started(&mut h, false);

        h.with_context(|ctx| escort.pause_path(ctx, 1000, false));
        h.with_context(|ctx| escort.update(ctx, 5000));
        assert!(escort.state().is_paused());

        h.with_context(|ctx| {
            escort.point_reached(ctx, PointId::Waypoint(1));
            escort.update(ctx, 16);
        });
        assert!(!escort.state().is_paused());
    }

    #[test]
    fn test_return_then_resume() {
        let mut h = Harness::new();
        let mut escort = started(&mut h, false);
        h.with_context(|ctx| escort.begin_return(ctx));

        assert!(escort.state().is_returning());
        assert!(matches!(
            h.motion.last(),
            Some(MotionCommand::Point(PointId::Anchor, _))
        ));

        arrive(&mut h, &mut escort, PointId::Anchor);
        assert!(!escort.state().is_returning());
        assert!(matches!(
            h.motion.last(),
            Some(MotionCommand::Point(PointId::Waypoint(1), _))
        ));
    }

    #[test]
    fn test_return_ignores_arrival_from_before_combat() {
        let mut h = Harness::new();
        let mut escort = started(&mut h, false);
        h.with_context(|ctx| escort.point_reached(ctx, PointId::Waypoint(1)));

        h.world.set_in_combat(h.me, true);
        h.with_context(|ctx| escort.update(ctx, 100));
        assert!(escort.is_reached());
        h.world.set_in_combat(h.me, false);

        h.with_context(|ctx| {
            escort.begin_return(ctx);
            escort.update(ctx, 100);
        });
        assert!(escort.state().is_returning());
        assert!(matches!(
            h.motion.last(),
            Some(MotionCommand::Point(PointId::Anchor, _))
        ));

        arrive(&mut h, &mut escort, PointId::Anchor);
        assert!(!escort.state().is_returning());
        assert!(matches!(
            h.motion.last(),
            Some(MotionCommand::Point(PointId::Waypoint(1), _))
        ));
    }

    #[test]
    fn test_walks_path_with_id_gap() {
        let mut h = Harness::new();
        let gapped = PathId::new(3);
        h.paths
            .insert(
                gapped,
                vec![
                    WaypointNode::new(1, Position::new(1.0, 0.0, 0.0)),
                    WaypointNode::new(3, Position::new(3.0, 0.0, 0.0)),
                    WaypointNode::new(4, Position::new(4.0, 0.0, 0.0)),
                ],
            )
            .expect("gapped path");

        let mut escort = EscortController::default();
        h.with_context(|ctx| escort.start_path(ctx, false, Some(gapped), false, None));
        for id in [1, 3, 4] {
            arrive(&mut h, &mut escort, PointId::Waypoint(id));
        }

        let moves: Vec<u32> = h
            .motion
            .commands()
            .iter()
            .filter_map(|c| match c {
                MotionCommand::Point(id, _) => id.waypoint(),
                _ => None,
            })
            .collect();
        assert_eq!(moves, vec![1, 3, 4]);
        let ended = drain(&mut h)
            .iter()
            .filter(|e| matches!(e, BehaviorEvent::WaypointEnded { .. }))
            .count();
        assert_eq!(ended, 1);
        assert!(!escort.state().is_escorting());
    }

    #[test]
    fn test_stop_path_arms_and_starts_despawn() {
        let mut h = Harness::new();
        let mut escort = started(&mut h, false);
        h.with_context(|ctx| escort.stop_path(ctx, 3000, Some(QuestId::new(5)), false));

        assert!(!escort.state().is_escorting());
        assert_eq!(escort.quest(), Some(QuestId::new(5)));
        assert_eq!(h.despawn.state(), DespawnState::Scheduled);
        assert!(h.despawn.is_counting());

        let events = drain(&mut h);
        let kinds: Vec<_> = events
            .iter()
            .filter(|e| e.is_waypoint())
            .map(std::mem::discriminant)
            .collect();
        assert_eq!(
            kinds,
            vec![
                std::mem::discriminant(&BehaviorEvent::WaypointStart { point: 0, path: None }),
                std::mem::discriminant(&BehaviorEvent::WaypointStopped { point: 0, path: None }),
                std::mem::discriminant(&BehaviorEvent::WaypointEnded { point: 0, path: None }),
            ]
        );
    }

    #[test]
    fn test_stop_when_idle_is_noop() {
        let mut h = Harness::new();
        let mut escort = EscortController::default();
        h.with_context(|ctx| escort.stop_path(ctx, 3000, None, true));
        assert_eq!(h.despawn.state(), DespawnState::Inactive);
        assert!(h.events.is_empty());
    }

    #[test]
    fn test_restart_while_escorting_stops_first() {
        let mut h = Harness::new();
        let mut escort = started(&mut h, true);
        drain(&mut h);

        h.with_context(|ctx| escort.start_path(ctx, true, Some(PathId::new(2)), false, None));
        let events = drain(&mut h);
        assert!(matches!(events[0], BehaviorEvent::WaypointStopped { path: Some(PATH), .. }));
        assert!(matches!(events[1], BehaviorEvent::WaypointEnded { path: Some(PATH), .. }));
        assert!(matches!(
            events[2],
            BehaviorEvent::WaypointStart { point: 1, path: Some(p) } if p == PathId::new(2)
        ));
        assert_eq!(events.len(), 3);
        assert!(!h.motion.is_walking());
    }

    #[test]
    fn test_single_party_group_distribution() {
        let mut h = Harness::new();
        let party = h.add_party(10.0);
        let friend = h.add_party(12.0);
        h.world.set_group(party, vec![party, friend]);

        let mut escort = started(&mut h, false);
        escort.set_targets(vec![party]);
        h.with_context(|ctx| escort.stop_path(ctx, 0, Some(QuestId::new(9)), false));

        assert_eq!(
            h.world.quest_calls(),
            &[
                QuestCall::GroupEvent(party, QuestId::new(9)),
                QuestCall::AreaExplored(friend, QuestId::new(9)),
            ]
        );
    }

    #[test]
    fn test_failure_fails_incomplete_only() {
        let mut h = Harness::new();
        let party = h.add_party(10.0);
        let quest = QuestId::new(9);
        h.world.set_quest_status(party, quest, QuestStatus::Incomplete);

        let mut escort = started(&mut h, false);
        escort.set_targets(vec![party]);
        h.with_context(|ctx| escort.stop_path(ctx, 0, Some(quest), true));
        assert_eq!(h.world.quest_calls(), &[QuestCall::FailQuest(party, quest)]);

        let mut h = Harness::new();
        let party = h.add_party(10.0);
        h.world.set_quest_status(party, quest, QuestStatus::Complete);
        let mut escort = started(&mut h, false);
        escort.set_targets(vec![party]);
        h.with_context(|ctx| escort.stop_path(ctx, 0, Some(quest), true));
        assert!(h.world.quest_calls().is_empty());
    }

    #[test]
    fn test_corpse_gets_no_credit() {
        let mut h = Harness::new();
        let party = h.add_party(10.0);
        h.world.set_corpse(party, true);

        let mut escort = started(&mut h, false);
        escort.set_targets(vec![party]);
        h.with_context(|ctx| escort.stop_path(ctx, 0, Some(QuestId::new(1)), false));
        assert!(h.world.quest_calls().is_empty());
    }

    #[test]
    fn test_multiple_targets_credit_individually() {
        let mut h = Harness::new();
        let a = h.add_party(10.0);
        let b = h.add_party(20.0);
        let npc = EntityId::new();
        h.world.add_entity(npc, Position::new(1.0, 0.0, 0.0));

        let mut escort = started(&mut h, false);
        escort.set_targets(vec![a, npc, b]);
        h.with_context(|ctx| escort.stop_path(ctx, 0, Some(QuestId::new(3)), false));
        assert_eq!(
            h.world.quest_calls(),
            &[
                QuestCall::AreaExplored(a, QuestId::new(3)),
                QuestCall::AreaExplored(b, QuestId::new(3)),
            ]
        );
    }

    #[test]
    fn test_no_quest_no_distribution() {
        let mut h = Harness::new();
        let party = h.add_party(10.0);
        let mut escort = started(&mut h, false);
        escort.set_targets(vec![party]);
        h.with_context(|ctx| escort.stop_path(ctx, 0, None, false));
        assert!(h.world.quest_calls().is_empty());
    }

    #[test]
    fn test_invoker_out_of_range_fails_escort() {
        let mut h = Harness::new();
        let party = h.add_party(10.0);
        let quest = QuestId::new(4);
        h.world.set_quest_status(party, quest, QuestStatus::Incomplete);

        let mut escort = EscortController::default();
        h.with_context(|ctx| escort.start_path(ctx, false, Some(PATH), false, Some(party)));
        escort.quest = Some(quest);

        h.with_context(|ctx| escort.update(ctx, 1000));
        assert!(escort.state().is_escorting());

        h.world.move_entity(party, Position::new(80.0, 0.0, 0.0));
        h.with_context(|ctx| escort.update(ctx, 999));
        assert!(escort.state().is_escorting());
        h.with_context(|ctx| escort.update(ctx, 1));
        assert!(!escort.state().is_escorting());
        assert_eq!(h.world.quest_calls(), &[QuestCall::FailQuest(party, quest)]);
    }

    #[test]
    fn test_group_member_keeps_escort_in_range() {
        let mut h = Harness::new();
        let party = h.add_party(80.0);
        let friend = h.add_party(20.0);
        h.world.set_group(party, vec![party, friend]);

        let mut escort = EscortController::default();
        h.with_context(|ctx| escort.start_path(ctx, false, Some(PATH), false, Some(party)));
        h.with_context(|ctx| escort.update(ctx, 1000));
        assert!(escort.state().is_escorting());
    }

    #[test]
    fn test_no_party_targets_always_in_range() {
        let mut h = Harness::new();
        let npc = EntityId::new();
        h.world.add_entity(npc, Position::new(500.0, 0.0, 0.0));

        let mut escort = started(&mut h, false);
        escort.set_targets(vec![npc]);
        h.with_context(|ctx| escort.update(ctx, 5000));
        assert!(escort.state().is_escorting());
    }

    #[test]
    fn test_abort_keeps_repeat_and_path() {
        let mut h = Harness::new();
        let mut escort = started(&mut h, true);
        h.with_context(|ctx| escort.abort(ctx));

        assert!(!escort.state().is_escorting());
        assert!(escort.is_repeating());
        assert_eq!(escort.path_id(), Some(PATH));
        assert_eq!(point_moves(&h), 1);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Start(bool),
        Pause(u32, bool),
        Stop(bool),
        Resume,
        Return,
        Reach(u32),
        ReachAnchor,
        Combat(bool),
        Tick(u32),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            any::<bool>().prop_map(Op::Start),
            (0u32..3000, any::<bool>()).prop_map(|(d, f)| Op::Pause(d, f)),
            any::<bool>().prop_map(Op::Stop),
            Just(Op::Resume),
            Just(Op::Return),
            (1u32..=5).prop_map(Op::Reach),
            Just(Op::ReachAnchor),
            any::<bool>().prop_map(Op::Combat),
            (0u32..2500).prop_map(Op::Tick),
        ]
    }

    proptest! {
        #[test]
        fn flags_stay_consistent(ops in prop::collection::vec(op(), 1..64)) {
            let mut h = Harness::new();
            let mut escort = EscortController::default();
            for op in ops {
                let me = h.me;
                match op {
                    Op::Combat(on) => h.world.set_in_combat(me, on),
                    op => h.with_context(|ctx| match op {
                        Op::Start(repeat) => escort.start_path(ctx, false, Some(PATH), repeat, None),
                        Op::Pause(delay, forced) => escort.pause_path(ctx, delay, forced),
                        Op::Stop(failed) => escort.stop_path(ctx, 0, None, failed),
                        Op::Resume => escort.resume_path(ctx),
                        Op::Return => {
                            if escort.state().is_escorting() {
                                escort.begin_return(ctx);
                            }
                        },
                        Op::Reach(id) => {
                            if escort.state().is_escorting() {
                                escort.point_reached(ctx, PointId::Waypoint(id));
                            }
                        },
                        Op::ReachAnchor => {
                            if escort.state().is_escorting() {
                                escort.point_reached(ctx, PointId::Anchor);
                            }
                        },
                        Op::Tick(diff) => escort.update(ctx, diff),
                        Op::Combat(_) => {},
                    }),
                }
                prop_assert!(escort.state().is_consistent(), "state {:?}", escort.state());
                let _ = std::iter::from_fn(|| h.events.pop()).count();
            }
        }
    }
}
