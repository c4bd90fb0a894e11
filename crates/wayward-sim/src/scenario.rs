//! Kinematic stand-ins for the world, the motion master and the script engine.
//!
//! Movement is a straight line at a fixed speed. Follow, chase and path
//! movement only record their kind; there is no pathfinding here.

use ahash::AHashMap;
use std::sync::Arc;
use tracing::{debug, info};
use wayward_behavior::{
    BehaviorEvent, ControlSurface, EventEngine, MotionMaster, MovementKind, MovementSlot,
    PathRepository, PathStore, PointId, QuestService, QuestStatus, UnitControl, WorldQuery,
};
use wayward_common::{EntityId, MarkerKind, PathId, Position, QuestId};

/// Walking speed in units per second.
pub const WALK_SPEED: f32 = 2.5;
/// Running speed in units per second.
pub const RUN_SPEED: f32 = 7.0;
/// Range within which a party is credited for an escort.
pub const REWARD_DISTANCE: f32 = 100.0;

/// Movement that finished during a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arrival {
    /// A point movement arrived
    Point(PointId),
    /// The entity is back home
    Home,
}

#[derive(Debug, Clone, Copy)]
enum Goal {
    Point(PointId, Position),
    Home,
}

/// Straight-line motion master.
#[derive(Debug)]
pub struct SimMotion {
    home: Position,
    goal: Option<Goal>,
    kind: MovementKind,
    walking: bool,
}

impl SimMotion {
    /// Creates an idle motion master that returns to `home`.
    pub fn new(home: Position) -> Self {
        Self {
            home,
            goal: None,
            kind: MovementKind::Idle,
            walking: false,
        }
    }

    /// Advances one tick from `from`. Returns the new position and any arrival.
    pub fn step(&mut self, from: Position, diff_ms: u32) -> (Position, Option<Arrival>) {
        let Some(goal) = self.goal else {
            return (from, None);
        };
        let target = match goal {
            Goal::Point(_, position) => position,
            Goal::Home => self.home,
        };

        let speed = if self.walking { WALK_SPEED } else { RUN_SPEED };
        let budget = speed * diff_ms as f32 / 1000.0;
        let delta = target.to_vec3() - from.to_vec3();
        let facing = from.angle_to(&target);

        if delta.length() <= budget {
            self.goal = None;
            self.kind = MovementKind::Idle;
            let arrival = match goal {
                Goal::Point(id, _) => Arrival::Point(id),
                Goal::Home => Arrival::Home,
            };
            return (target.with_facing(facing), Some(arrival));
        }

        let next = from.to_vec3() + delta.normalize() * budget;
        (Position::from_vec3(next, facing), None)
    }

    fn replace(&mut self, goal: Option<Goal>, kind: MovementKind) {
        self.goal = goal;
        self.kind = kind;
    }
}

impl MotionMaster for SimMotion {
    fn move_point(&mut self, id: PointId, target: Position) {
        debug!(point = %id, x = target.x, y = target.y, "Moving to point");
        self.replace(Some(Goal::Point(id, target)), MovementKind::Point);
    }

    fn move_follow(&mut self, _target: EntityId, _distance: f32, _angle: f32) {
        self.replace(None, MovementKind::Follow);
    }

    fn move_chase(&mut self, _target: EntityId) {
        self.replace(None, MovementKind::Chase);
    }

    fn move_idle(&mut self) {
        self.replace(None, MovementKind::Idle);
    }

    fn move_targeted_home(&mut self) {
        self.replace(Some(Goal::Home), MovementKind::Home);
    }

    fn move_path(&mut self, _path: PathId, _repeat: bool) {
        self.replace(None, MovementKind::Waypoint);
    }

    fn stop_moving(&mut self) {
        self.goal = None;
    }

    fn movement_expired(&mut self) {
        self.replace(None, MovementKind::Idle);
    }

    fn clear(&mut self) {
        self.replace(None, MovementKind::Idle);
    }

    fn current_kind(&self) -> MovementKind {
        self.kind
    }

    fn slot_kind(&self, slot: MovementSlot) -> MovementKind {
        match slot {
            MovementSlot::Active => self.kind,
            MovementSlot::Idle | MovementSlot::Controlled => MovementKind::Idle,
        }
    }

    fn set_walk(&mut self, walk: bool) {
        self.walking = walk;
    }

    fn set_disable_gravity(&mut self, disable: bool) {
        debug!(disable, "Gravity toggled");
    }

    fn set_swim(&mut self, swim: bool) {
        debug!(swim, "Swimming toggled");
    }
}

/// Peaceful world holding the entity and an optional escorting party.
#[derive(Debug)]
pub struct SimWorld {
    me: EntityId,
    positions: AHashMap<EntityId, Position>,
    party: Option<EntityId>,
    quest_status: AHashMap<(EntityId, QuestId), QuestStatus>,
    visible: bool,
    evading: bool,
    despawned: Option<u32>,
}

impl SimWorld {
    /// Creates a world with `me` at `spawn`.
    pub fn new(me: EntityId, spawn: Position) -> Self {
        let mut positions = AHashMap::new();
        positions.insert(me, spawn);
        Self {
            me,
            positions,
            party: None,
            quest_status: AHashMap::new(),
            visible: true,
            evading: false,
            despawned: None,
        }
    }

    /// Adds the escorting party.
    pub fn add_party(&mut self, party: EntityId, position: Position) {
        self.positions.insert(party, position);
        self.party = Some(party);
    }

    /// Places an entity.
    pub fn set_position(&mut self, id: EntityId, position: Position) {
        self.positions.insert(id, position);
    }

    /// Records a quest the party is on.
    pub fn set_quest_status(&mut self, party: EntityId, quest: QuestId, status: QuestStatus) {
        self.quest_status.insert((party, quest), status);
    }

    /// Whether the entity is visible.
    pub const fn is_visible(&self) -> bool {
        self.visible
    }

    /// Whether the entity was removed from the world.
    pub const fn is_despawned(&self) -> bool {
        self.despawned.is_some()
    }
}

impl WorldQuery for SimWorld {
    fn position(&self, entity: EntityId) -> Option<Position> {
        self.positions.get(&entity).copied()
    }

    fn has_line_of_sight(&self, _from: EntityId, _to: EntityId) -> bool {
        true
    }

    fn nearest_of_kind(&self, _origin: EntityId, _kind: MarkerKind, _radius: f32) -> Option<EntityId> {
        None
    }

    fn is_party(&self, entity: EntityId) -> bool {
        self.party == Some(entity)
    }

    fn is_party_controlled(&self, entity: EntityId) -> bool {
        self.is_party(entity)
    }

    fn group_members(&self, _party: EntityId) -> Vec<EntityId> {
        Vec::new()
    }

    fn victim_of(&self, _entity: EntityId) -> Option<EntityId> {
        None
    }

    fn is_friendly(&self, _a: EntityId, _b: EntityId) -> bool {
        true
    }
}

impl QuestService for SimWorld {
    fn is_at_reward_distance(&self, party: EntityId, source: EntityId) -> bool {
        self.distance(party, source)
            .is_some_and(|d| d <= REWARD_DISTANCE)
    }

    fn has_corpse(&self, _party: EntityId) -> bool {
        false
    }

    fn quest_status(&self, party: EntityId, quest: QuestId) -> QuestStatus {
        self.quest_status
            .get(&(party, quest))
            .copied()
            .unwrap_or_default()
    }

    fn group_event_happens(&mut self, party: EntityId, quest: QuestId, _source: EntityId) {
        info!(%party, quest = quest.raw(), "Quest completed for group");
        self.set_quest_status(party, quest, QuestStatus::Complete);
    }

    fn area_explored_or_event_happens(&mut self, party: EntityId, quest: QuestId) {
        info!(%party, quest = quest.raw(), "Quest completed");
        self.set_quest_status(party, quest, QuestStatus::Complete);
    }

    fn fail_quest(&mut self, party: EntityId, quest: QuestId) {
        info!(%party, quest = quest.raw(), "Quest failed");
        self.set_quest_status(party, quest, QuestStatus::Failed);
    }

    fn reward_party_at_event(&mut self, party: EntityId, reward: u32, _source: EntityId) {
        info!(%party, reward, "Event reward granted");
    }
}

impl UnitControl for SimWorld {
    fn is_in_combat(&self, _unit: EntityId) -> bool {
        false
    }

    fn is_dead(&self, _unit: EntityId) -> bool {
        self.despawned.is_some()
    }

    fn is_controlled_by_party(&self, _unit: EntityId) -> bool {
        false
    }

    fn is_in_evade_mode(&self, _unit: EntityId) -> bool {
        self.evading
    }

    fn charmer(&self, _unit: EntityId) -> Option<EntityId> {
        None
    }

    fn charmer_or_owner(&self, _unit: EntityId) -> Option<EntityId> {
        None
    }

    fn update_victim(&mut self, _unit: EntityId) -> Option<EntityId> {
        None
    }

    fn health(&self, _unit: EntityId) -> u32 {
        100
    }

    fn is_passive(&self, _unit: EntityId) -> bool {
        false
    }

    fn can_assist(&self, _unit: EntityId) -> bool {
        false
    }

    fn is_confused_or_fleeing(&self, _unit: EntityId) -> bool {
        false
    }

    fn waypoint_path(&self, _unit: EntityId) -> Option<PathId> {
        None
    }

    fn set_visible(&mut self, unit: EntityId, visible: bool) {
        debug!(%unit, visible, "Visibility changed");
        self.visible = visible;
    }

    fn set_evading(&mut self, _unit: EntityId, evading: bool) {
        self.evading = evading;
    }

    fn clear_for_evade(&mut self, _unit: EntityId) -> bool {
        true
    }

    fn restore_faction(&mut self, _unit: EntityId) {}

    fn interrupt_non_melee_spells(&mut self, _unit: EntityId) {}

    fn cast_stop(&mut self, _unit: EntityId) {}

    fn attack(&mut self, _unit: EntityId, _victim: EntityId) -> bool {
        false
    }

    fn join_combat(&mut self, _unit: EntityId, _other: EntityId) {}

    fn melee_attack_if_ready(&mut self, _unit: EntityId) {}

    fn despawn(&mut self, unit: EntityId, respawn_delay_ms: u32) {
        info!(%unit, respawn_delay_ms, "Despawned");
        debug_assert_eq!(unit, self.me);
        self.despawned = Some(respawn_delay_ms);
    }
}

/// Script engine for the harness.
///
/// Pauses at nodes that carry a wait time and, when a quest is given,
/// completes it by stopping the escort at the last node.
#[derive(Debug)]
pub struct SimEngine {
    paths: Arc<PathStore>,
    quest: Option<QuestId>,
    despawn_ms: u32,
    events: Vec<BehaviorEvent>,
}

impl SimEngine {
    /// Creates an engine reading node waits from `paths`.
    pub fn new(paths: Arc<PathStore>, quest: Option<QuestId>, despawn_ms: u32) -> Self {
        Self {
            paths,
            quest,
            despawn_ms,
            events: Vec::new(),
        }
    }

    /// Every event received.
    pub fn events(&self) -> &[BehaviorEvent] {
        &self.events
    }

    fn waypoint_reached(&self, point: u32, path: PathId, control: &mut dyn ControlSurface) {
        let Ok(path) = self.paths.lookup(path) else {
            return;
        };
        let Some(node) = path.nodes().iter().find(|n| n.id == point) else {
            return;
        };

        if node.wait_ms > 0 {
            control.pause_path(node.wait_ms, false);
        }
        let last = path.nodes().last().is_some_and(|n| n.id == point);
        if last && self.quest.is_some() {
            control.stop_path(self.despawn_ms, self.quest, false);
        }
    }
}

impl EventEngine for SimEngine {
    fn on_initialize(&mut self, me: EntityId) {
        info!(entity = %me, "Script attached");
    }

    fn process(&mut self, event: &BehaviorEvent, control: &mut dyn ControlSurface) {
        info!(entity = %control.entity(), ?event, "Event");
        self.events.push(event.clone());

        if let BehaviorEvent::WaypointReached {
            point,
            path: Some(path),
        } = *event
        {
            self.waypoint_reached(point, path, control);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wayward_behavior::{BehaviorConfig, BehaviorController, SharedPaths, WaypointNode};

    type SimController = BehaviorController<SimMotion, SimWorld, SimEngine>;

    fn store() -> Arc<PathStore> {
        let paths = PathStore::new();
        paths
            .insert(
                PathId::new(1),
                vec![
                    WaypointNode::new(1, Position::new(7.0, 0.0, 0.0)),
                    WaypointNode::new(2, Position::new(14.0, 0.0, 0.0)).with_wait(2000),
                    WaypointNode::new(3, Position::new(21.0, 0.0, 0.0)),
                ],
            )
            .expect("path");
        Arc::new(paths)
    }

    fn controller(quest: Option<QuestId>) -> (SimController, EntityId) {
        let paths = store();
        let me = EntityId::new();
        let party = EntityId::new();
        let mut world = SimWorld::new(me, Position::default());
        world.add_party(party, Position::default());
        if let Some(quest) = quest {
            world.set_quest_status(party, quest, QuestStatus::Incomplete);
        }
        let shared: SharedPaths = paths.clone();
        let mut c = BehaviorController::new(
            me,
            SimMotion::new(Position::default()),
            world,
            shared,
            BehaviorConfig::default(),
            SimEngine::new(paths, quest, 1000),
        );
        c.initialize();
        c.start_path(true, Some(PathId::new(1)), false, Some(party));
        (c, party)
    }

    /// One tick of the harness loop: behavior, then movement.
    fn tick(c: &mut SimController, diff_ms: u32) {
        c.update(diff_ms);
        let me = c.me();
        let here = c.world().position(me).unwrap_or_default();
        let (next, arrival) = c.motion_mut().step(here, diff_ms);
        c.world_mut().set_position(me, next);
        if let Some(Arrival::Point(id)) = arrival {
            c.movement_inform(MovementKind::Point, id);
        }
    }

    #[test]
    fn test_step_arrives() {
        let mut motion = SimMotion::new(Position::default());
        motion.move_point(PointId::Waypoint(1), Position::new(7.0, 0.0, 0.0));

        let (half, arrival) = motion.step(Position::default(), 500);
        assert!((half.x - 3.5).abs() < 1e-4);
        assert_eq!(arrival, None);

        let (end, arrival) = motion.step(half, 500);
        assert_eq!(end.x, 7.0);
        assert_eq!(arrival, Some(Arrival::Point(PointId::Waypoint(1))));
        assert_eq!(motion.current_kind(), MovementKind::Idle);
    }

    #[test]
    fn test_walking_is_slower() {
        let mut motion = SimMotion::new(Position::default());
        motion.set_walk(true);
        motion.move_point(PointId::Waypoint(1), Position::new(10.0, 0.0, 0.0));
        let (next, _) = motion.step(Position::default(), 1000);
        assert!((next.x - WALK_SPEED).abs() < 1e-4);
    }

    #[test]
    fn test_home_arrival() {
        let mut motion = SimMotion::new(Position::default());
        motion.move_targeted_home();
        let (_, arrival) = motion.step(Position::new(1.0, 0.0, 0.0), 1000);
        assert_eq!(arrival, Some(Arrival::Home));
    }

    #[test]
    fn test_waits_at_node() {
        let (mut c, _) = controller(None);
        // Node 2 is two seconds away at run speed.
        for _ in 0..25 {
            tick(&mut c, 100);
        }
        assert!(c.escort_state().is_paused());

        for _ in 0..40 {
            tick(&mut c, 100);
        }
        assert!(c.escort_state().is_empty());
        let paused = c
            .engine()
            .events()
            .iter()
            .filter(|e| matches!(e, BehaviorEvent::WaypointPaused { .. }))
            .count();
        assert_eq!(paused, 1);
    }

    #[test]
    fn test_quest_completed_at_last_node() {
        let quest = QuestId::new(42);
        let (mut c, party) = controller(Some(quest));
        for _ in 0..80 {
            tick(&mut c, 100);
        }

        assert_eq!(c.world().quest_status(party, quest), QuestStatus::Complete);
        assert!(c.despawn().is_counting() || !c.world().is_visible() || c.world().is_despawned());
    }
}
