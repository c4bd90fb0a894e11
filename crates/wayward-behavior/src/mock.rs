//! Recording collaborators for tests.
//!
//! [`MockMotion`] records every movement command, [`MockWorld`] is a
//! configurable world around a single controlled entity, and
//! [`ScriptedEngine`] records notifications and can react to them through
//! the control surface.

use crate::control::ControlSurface;
use crate::events::{BehaviorEvent, EventEngine};
use crate::motion::{MotionMaster, MovementKind, MovementSlot, PointId};
use crate::paths::WaypointNode;
use crate::world::{QuestService, QuestStatus, UnitControl, WorldQuery};
use ahash::{AHashMap, AHashSet};
use std::fmt;
use wayward_common::{EntityId, MarkerKind, PathId, Position, QuestId};

/// A movement command received by [`MockMotion`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MotionCommand {
    /// `move_point`
    Point(PointId, Position),
    /// `move_follow`
    Follow(EntityId, f32, f32),
    /// `move_chase`
    Chase(EntityId),
    /// `move_idle`
    Idle,
    /// `move_targeted_home`
    Home,
    /// `move_path`
    Path(PathId, bool),
    /// `stop_moving`
    Stop,
    /// `movement_expired`
    Expired,
    /// `clear`
    Clear,
}

/// Motion collaborator that records commands.
#[derive(Debug, Default)]
pub struct MockMotion {
    commands: Vec<MotionCommand>,
    kind: MovementKind,
    walking: bool,
    flying: bool,
    swimming: bool,
}

impl MockMotion {
    /// Creates an idle, running motion master.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every command received, oldest first.
    #[must_use]
    pub fn commands(&self) -> &[MotionCommand] {
        &self.commands
    }

    /// The most recent command.
    #[must_use]
    pub fn last(&self) -> Option<&MotionCommand> {
        self.commands.last()
    }

    /// Forgets recorded commands.
    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }

    /// Overrides the running movement kind.
    pub fn set_current_kind(&mut self, kind: MovementKind) {
        self.kind = kind;
    }

    /// Whether the entity walks.
    #[must_use]
    pub const fn is_walking(&self) -> bool {
        self.walking
    }

    /// Whether gravity is disabled.
    #[must_use]
    pub const fn is_flying(&self) -> bool {
        self.flying
    }

    /// Whether the entity swims.
    #[must_use]
    pub const fn is_swimming(&self) -> bool {
        self.swimming
    }

    fn record(&mut self, command: MotionCommand, kind: Option<MovementKind>) {
        self.commands.push(command);
        if let Some(kind) = kind {
            self.kind = kind;
        }
    }
}

impl MotionMaster for MockMotion {
    fn move_point(&mut self, id: PointId, target: Position) {
        self.record(MotionCommand::Point(id, target), Some(MovementKind::Point));
    }

    fn move_follow(&mut self, target: EntityId, distance: f32, angle: f32) {
        self.record(MotionCommand::Follow(target, distance, angle), Some(MovementKind::Follow));
    }

    fn move_chase(&mut self, target: EntityId) {
        self.record(MotionCommand::Chase(target), Some(MovementKind::Chase));
    }

    fn move_idle(&mut self) {
        self.record(MotionCommand::Idle, Some(MovementKind::Idle));
    }

    fn move_targeted_home(&mut self) {
        self.record(MotionCommand::Home, Some(MovementKind::Home));
    }

    fn move_path(&mut self, path: PathId, repeat: bool) {
        self.record(MotionCommand::Path(path, repeat), Some(MovementKind::Waypoint));
    }

    fn stop_moving(&mut self) {
        self.record(MotionCommand::Stop, None);
    }

    fn movement_expired(&mut self) {
        self.record(MotionCommand::Expired, Some(MovementKind::Idle));
    }

    fn clear(&mut self) {
        self.record(MotionCommand::Clear, Some(MovementKind::Idle));
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
        self.flying = disable;
    }

    fn set_swim(&mut self, swim: bool) {
        self.swimming = swim;
    }
}

/// A quest call received by [`MockWorld`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestCall {
    /// `group_event_happens`
    GroupEvent(EntityId, QuestId),
    /// `area_explored_or_event_happens`
    AreaExplored(EntityId, QuestId),
    /// `fail_quest`
    FailQuest(EntityId, QuestId),
    /// `reward_party_at_event`
    RewardAtEvent(EntityId, u32),
}

/// Configurable world around one controlled entity.
#[derive(Debug)]
pub struct MockWorld {
    me: EntityId,
    positions: AHashMap<EntityId, Position>,
    parties: AHashSet<EntityId>,
    groups: AHashMap<EntityId, Vec<EntityId>>,
    markers: Vec<(MarkerKind, EntityId)>,
    victims: AHashMap<EntityId, EntityId>,
    hostile: AHashSet<EntityId>,
    in_combat: AHashSet<EntityId>,
    evading: AHashSet<EntityId>,
    quest_status: AHashMap<(EntityId, QuestId), QuestStatus>,
    corpses: AHashSet<EntityId>,
    reward_distance: f32,
    line_of_sight: bool,

    dead: bool,
    controlled_by_party: bool,
    in_evade_mode: bool,
    charmer: Option<EntityId>,
    owner: Option<EntityId>,
    victim: Option<EntityId>,
    health: u32,
    passive: bool,
    can_assist: bool,
    confused: bool,
    waypoint_path: Option<PathId>,
    refuse_evade: bool,
    refuse_attack: bool,

    visible: bool,
    quest_calls: Vec<QuestCall>,
    attacks: Vec<EntityId>,
    joined: Vec<EntityId>,
    despawns: Vec<(EntityId, u32)>,
    melee_swings: u32,
    faction_restores: u32,
    interrupts: u32,
    cast_stops: u32,
}

impl MockWorld {
    /// Creates a world containing only `me`, at the origin.
    #[must_use]
    pub fn new(me: EntityId) -> Self {
        let mut positions = AHashMap::new();
        positions.insert(me, Position::default());
        Self {
            me,
            positions,
            parties: AHashSet::new(),
            groups: AHashMap::new(),
            markers: Vec::new(),
            victims: AHashMap::new(),
            hostile: AHashSet::new(),
            in_combat: AHashSet::new(),
            evading: AHashSet::new(),
            quest_status: AHashMap::new(),
            corpses: AHashSet::new(),
            reward_distance: 100.0,
            line_of_sight: true,
            dead: false,
            controlled_by_party: false,
            in_evade_mode: false,
            charmer: None,
            owner: None,
            victim: None,
            health: 100,
            passive: false,
            can_assist: false,
            confused: false,
            waypoint_path: None,
            refuse_evade: false,
            refuse_attack: false,
            visible: true,
            quest_calls: Vec::new(),
            attacks: Vec::new(),
            joined: Vec::new(),
            despawns: Vec::new(),
            melee_swings: 0,
            faction_restores: 0,
            interrupts: 0,
            cast_stops: 0,
        }
    }

    /// The controlled entity.
    #[must_use]
    pub const fn me(&self) -> EntityId {
        self.me
    }

    // === Setup ===

    /// Places an entity.
    pub fn add_entity(&mut self, id: EntityId, position: Position) {
        self.positions.insert(id, position);
    }

    /// Moves an entity.
    pub fn move_entity(&mut self, id: EntityId, position: Position) {
        self.positions.insert(id, position);
    }

    /// Removes an entity from the world.
    pub fn remove_entity(&mut self, id: EntityId) {
        self.positions.remove(&id);
        self.markers.retain(|(_, marker)| *marker != id);
    }

    /// Marks an entity as a party.
    pub fn set_party(&mut self, id: EntityId, party: bool) {
        if party {
            self.parties.insert(id);
        } else {
            self.parties.remove(&id);
        }
    }

    /// Sets the group of a party.
    pub fn set_group(&mut self, party: EntityId, members: Vec<EntityId>) {
        self.groups.insert(party, members);
    }

    /// Places a marker `distance` units from the controlled entity.
    pub fn add_marker(&mut self, kind: MarkerKind, id: EntityId, distance: f32) {
        let origin = self.positions.get(&self.me).copied().unwrap_or_default();
        self.positions
            .insert(id, Position::new(origin.x, origin.y + distance, origin.z));
        self.markers.push((kind, id));
    }

    /// Sets who an entity is attacking.
    pub fn set_victim_of(&mut self, attacker: EntityId, victim: EntityId) {
        self.victims.insert(attacker, victim);
    }

    /// Marks an entity as hostile to the controlled entity.
    pub fn set_hostile(&mut self, id: EntityId, hostile: bool) {
        if hostile {
            self.hostile.insert(id);
        } else {
            self.hostile.remove(&id);
        }
    }

    /// Puts an entity in or out of combat.
    pub fn set_in_combat(&mut self, id: EntityId, on: bool) {
        if on {
            self.in_combat.insert(id);
        } else {
            self.in_combat.remove(&id);
        }
    }

    /// Sets a party's quest status.
    pub fn set_quest_status(&mut self, party: EntityId, quest: QuestId, status: QuestStatus) {
        self.quest_status.insert((party, quest), status);
    }

    /// Marks a party as a corpse.
    pub fn set_corpse(&mut self, party: EntityId, corpse: bool) {
        if corpse {
            self.corpses.insert(party);
        } else {
            self.corpses.remove(&party);
        }
    }

    /// Sets line of sight for every pair.
    pub fn set_line_of_sight(&mut self, los: bool) {
        self.line_of_sight = los;
    }

    /// Marks the controlled entity dead.
    pub fn set_dead(&mut self, dead: bool) {
        self.dead = dead;
    }

    /// Marks the controlled entity as piloted by a party.
    pub fn set_controlled_by_party(&mut self, controlled: bool) {
        self.controlled_by_party = controlled;
    }

    /// Marks the controlled entity as in evade mode.
    pub fn set_in_evade_mode(&mut self, on: bool) {
        self.in_evade_mode = on;
    }

    /// Sets the charmer.
    pub fn set_charmer(&mut self, charmer: Option<EntityId>) {
        self.charmer = charmer;
    }

    /// Sets the owner.
    pub fn set_owner(&mut self, owner: Option<EntityId>) {
        self.owner = owner;
    }

    /// Sets the controlled entity's combat victim.
    pub fn set_victim(&mut self, victim: Option<EntityId>) {
        self.victim = victim;
    }

    /// Sets the controlled entity's health.
    pub fn set_health(&mut self, health: u32) {
        self.health = health;
    }

    /// Sets the passive react state.
    pub fn set_passive(&mut self, passive: bool) {
        self.passive = passive;
    }

    /// Allows assisting parties.
    pub fn set_can_assist(&mut self, can_assist: bool) {
        self.can_assist = can_assist;
    }

    /// Marks the controlled entity confused or fleeing.
    pub fn set_confused(&mut self, confused: bool) {
        self.confused = confused;
    }

    /// Gives the controlled entity an idle waypoint path.
    pub fn set_waypoint_path(&mut self, path: Option<PathId>) {
        self.waypoint_path = path;
    }

    /// Makes evade cleanup refuse.
    pub fn set_refuse_evade(&mut self, refuse: bool) {
        self.refuse_evade = refuse;
    }

    /// Makes attacks fail.
    pub fn set_refuse_attack(&mut self, refuse: bool) {
        self.refuse_attack = refuse;
    }

    // === Recorded calls ===

    /// Quest calls, oldest first.
    #[must_use]
    pub fn quest_calls(&self) -> &[QuestCall] {
        &self.quest_calls
    }

    /// Whether the controlled entity is visible.
    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.visible
    }

    /// Whether an entity carries the evading flag.
    #[must_use]
    pub fn is_evading(&self, id: EntityId) -> bool {
        self.evading.contains(&id)
    }

    /// Removals requested, with respawn delays.
    #[must_use]
    pub fn despawns(&self) -> &[(EntityId, u32)] {
        &self.despawns
    }

    /// Victims attacked, oldest first.
    #[must_use]
    pub fn attacks(&self) -> &[EntityId] {
        &self.attacks
    }

    /// Entities pulled into combat without a victim switch.
    #[must_use]
    pub fn joined(&self) -> &[EntityId] {
        &self.joined
    }

    /// Melee swings taken.
    #[must_use]
    pub const fn melee_swings(&self) -> u32 {
        self.melee_swings
    }

    /// Faction restores.
    #[must_use]
    pub const fn faction_restores(&self) -> u32 {
        self.faction_restores
    }

    /// Non-melee interrupts.
    #[must_use]
    pub const fn interrupts(&self) -> u32 {
        self.interrupts
    }

    /// Cast stops.
    #[must_use]
    pub const fn cast_stops(&self) -> u32 {
        self.cast_stops
    }
}

impl WorldQuery for MockWorld {
    fn position(&self, entity: EntityId) -> Option<Position> {
        self.positions.get(&entity).copied()
    }

    fn has_line_of_sight(&self, _from: EntityId, _to: EntityId) -> bool {
        self.line_of_sight
    }

    fn nearest_of_kind(&self, origin: EntityId, kind: MarkerKind, radius: f32) -> Option<EntityId> {
        let from = self.position(origin)?;
        self.markers
            .iter()
            .filter(|(k, _)| *k == kind)
            .filter_map(|&(_, id)| Some((id, self.position(id)?.distance(&from))))
            .filter(|&(_, d)| d <= radius)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id)
    }

    fn is_party(&self, entity: EntityId) -> bool {
        self.parties.contains(&entity)
    }

    fn is_party_controlled(&self, entity: EntityId) -> bool {
        self.parties.contains(&entity)
    }

    fn group_members(&self, party: EntityId) -> Vec<EntityId> {
        self.groups.get(&party).cloned().unwrap_or_default()
    }

    fn victim_of(&self, entity: EntityId) -> Option<EntityId> {
        if entity == self.me {
            return self.victim;
        }
        self.victims.get(&entity).copied()
    }

    fn is_friendly(&self, _a: EntityId, b: EntityId) -> bool {
        !self.hostile.contains(&b)
    }
}

impl QuestService for MockWorld {
    fn is_at_reward_distance(&self, party: EntityId, source: EntityId) -> bool {
        self.distance(party, source)
            .is_some_and(|d| d <= self.reward_distance)
    }

    fn has_corpse(&self, party: EntityId) -> bool {
        self.corpses.contains(&party)
    }

    fn quest_status(&self, party: EntityId, quest: QuestId) -> QuestStatus {
        self.quest_status.get(&(party, quest)).copied().unwrap_or_default()
    }

    fn group_event_happens(&mut self, party: EntityId, quest: QuestId, _source: EntityId) {
        self.quest_calls.push(QuestCall::GroupEvent(party, quest));
    }

    fn area_explored_or_event_happens(&mut self, party: EntityId, quest: QuestId) {
        self.quest_calls.push(QuestCall::AreaExplored(party, quest));
    }

    fn fail_quest(&mut self, party: EntityId, quest: QuestId) {
        self.quest_calls.push(QuestCall::FailQuest(party, quest));
    }

    fn reward_party_at_event(&mut self, party: EntityId, reward: u32, _source: EntityId) {
        self.quest_calls.push(QuestCall::RewardAtEvent(party, reward));
    }
}

impl UnitControl for MockWorld {
    fn is_in_combat(&self, unit: EntityId) -> bool {
        self.in_combat.contains(&unit)
    }

    fn is_dead(&self, _unit: EntityId) -> bool {
        self.dead
    }

    fn is_controlled_by_party(&self, _unit: EntityId) -> bool {
        self.controlled_by_party
    }

    fn is_in_evade_mode(&self, _unit: EntityId) -> bool {
        self.in_evade_mode
    }

    fn charmer(&self, _unit: EntityId) -> Option<EntityId> {
        self.charmer
    }

    fn charmer_or_owner(&self, _unit: EntityId) -> Option<EntityId> {
        self.charmer.or(self.owner)
    }

    fn update_victim(&mut self, _unit: EntityId) -> Option<EntityId> {
        self.victim
    }

    fn health(&self, _unit: EntityId) -> u32 {
        self.health
    }

    fn is_passive(&self, _unit: EntityId) -> bool {
        self.passive
    }

    fn can_assist(&self, _unit: EntityId) -> bool {
        self.can_assist
    }

    fn is_confused_or_fleeing(&self, _unit: EntityId) -> bool {
        self.confused
    }

    fn waypoint_path(&self, _unit: EntityId) -> Option<PathId> {
        self.waypoint_path
    }

    fn set_visible(&mut self, _unit: EntityId, visible: bool) {
        self.visible = visible;
    }

    fn set_evading(&mut self, unit: EntityId, evading: bool) {
        if evading {
            self.evading.insert(unit);
        } else {
            self.evading.remove(&unit);
        }
    }

    fn clear_for_evade(&mut self, _unit: EntityId) -> bool {
        !self.refuse_evade
    }

    fn restore_faction(&mut self, _unit: EntityId) {
        self.faction_restores += 1;
    }

    fn interrupt_non_melee_spells(&mut self, _unit: EntityId) {
        self.interrupts += 1;
    }

    fn cast_stop(&mut self, _unit: EntityId) {
        self.cast_stops += 1;
    }

    fn attack(&mut self, _unit: EntityId, victim: EntityId) -> bool {
        if self.refuse_attack {
            return false;
        }
        self.attacks.push(victim);
        self.victim = Some(victim);
        true
    }

    fn join_combat(&mut self, _unit: EntityId, other: EntityId) {
        self.joined.push(other);
    }

    fn melee_attack_if_ready(&mut self, _unit: EntityId) {
        self.melee_swings += 1;
    }

    fn despawn(&mut self, unit: EntityId, respawn_delay_ms: u32) {
        self.despawns.push((unit, respawn_delay_ms));
    }
}

/// Reaction run by [`ScriptedEngine`] for every event.
pub type Reaction = Box<dyn FnMut(&BehaviorEvent, &mut dyn ControlSurface)>;

/// Event engine that records events and runs scripted reactions.
#[derive(Default)]
pub struct ScriptedEngine {
    initialized: Option<EntityId>,
    updates: Vec<u32>,
    events: Vec<BehaviorEvent>,
    reactions: Vec<Reaction>,
}

impl ScriptedEngine {
    /// Creates an engine without reactions.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a reaction.
    #[must_use]
    pub fn with_reaction<F>(mut self, reaction: F) -> Self
    where
        F: FnMut(&BehaviorEvent, &mut dyn ControlSurface) + 'static,
    {
        self.reactions.push(Box::new(reaction));
        self
    }

    /// Events received, in delivery order.
    #[must_use]
    pub fn events(&self) -> &[BehaviorEvent] {
        &self.events
    }

    /// Number of received events matching `pred`.
    pub fn count(&self, pred: impl Fn(&BehaviorEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }

    /// Forgets received events.
    pub fn clear_events(&mut self) {
        self.events.clear();
    }

    /// Tick deltas received.
    #[must_use]
    pub fn updates(&self) -> &[u32] {
        &self.updates
    }

    /// Entity passed to `on_initialize`.
    #[must_use]
    pub const fn initialized(&self) -> Option<EntityId> {
        self.initialized
    }
}

impl fmt::Debug for ScriptedEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptedEngine")
            .field("events", &self.events)
            .field("reactions", &self.reactions.len())
            .finish_non_exhaustive()
    }
}

impl EventEngine for ScriptedEngine {
    fn on_initialize(&mut self, me: EntityId) {
        self.initialized = Some(me);
    }

    fn on_update(&mut self, diff_ms: u32, _control: &mut dyn ControlSurface) {
        self.updates.push(diff_ms);
    }

    fn process(&mut self, event: &BehaviorEvent, control: &mut dyn ControlSurface) {
        self.events.push(event.clone());
        for reaction in &mut self.reactions {
            reaction(event, control);
        }
    }
}

/// Nodes 1..=count spaced `spacing` apart along the x axis.
#[must_use]
pub fn straight_path(count: u32, spacing: f32) -> Vec<WaypointNode> {
    (1..=count)
        .map(|id| WaypointNode::new(id, Position::new(id as f32 * spacing, 0.0, 0.0)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_motion_tracks_kind() {
        let mut motion = MockMotion::new();
        motion.move_point(PointId::Anchor, Position::default());
        assert_eq!(motion.current_kind(), MovementKind::Point);
        motion.stop_moving();
        assert_eq!(motion.current_kind(), MovementKind::Point);
        motion.move_idle();
        assert_eq!(motion.slot_kind(MovementSlot::Active), MovementKind::Idle);
        assert_eq!(motion.commands().len(), 3);
    }

    #[test]
    fn test_nearest_marker() {
        let me = EntityId::new();
        let mut world = MockWorld::new(me);
        let kind = MarkerKind::new(3);
        let near = EntityId::new();
        let far = EntityId::new();
        world.add_marker(kind, far, 4.0);
        world.add_marker(kind, near, 2.0);
        world.add_marker(MarkerKind::new(4), EntityId::new(), 1.0);

        assert_eq!(world.nearest_of_kind(me, kind, 5.0), Some(near));
        assert_eq!(world.nearest_of_kind(me, kind, 1.0), None);
    }

    #[test]
    fn test_straight_path() {
        let nodes = straight_path(3, 10.0);
        assert_eq!(nodes.len(), 3);
        assert_eq!(nodes[2].id, 3);
        assert_eq!(nodes[2].position, Position::new(30.0, 0.0, 0.0));
    }
}
