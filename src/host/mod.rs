//! Host platform boundary
//!
//! The fisher never talks to the game directly. It reads the world and the
//! agent through [`WorldQuery`] and [`AgentQuery`], acts through
//! [`ActionPort`], and receives notifications by subscribing an
//! [`EventSink`] to an [`EventSource`].

pub mod sim;

use serde::{Deserialize, Serialize};

use crate::fishing::EventSink;

pub use sim::SimulatedPond;

/// World-assigned entity/object id
pub type EntityId = i32;
/// Block type id
pub type BlockId = u16;
/// Item type id
pub type ItemId = i32;

/// Item id of the fishing rod
pub const FISHING_ROD: ItemId = 346;
/// Block id of still water
pub const WATER: BlockId = 9;

/// A point in world space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn offset(&self, dx: f64, dy: f64, dz: f64) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }

    pub fn distance(&self, other: Vec3) -> f64 {
        let (dx, dy, dz) = (self.x - other.x, self.y - other.y, self.z - other.z);
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

/// Integer block coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    pub fn above(&self) -> Self {
        Self::new(self.x, self.y + 1, self.z)
    }

    pub fn to_vec3(&self) -> Vec3 {
        Vec3::new(self.x as f64, self.y as f64, self.z as f64)
    }

    pub fn distance(&self, point: Vec3) -> f64 {
        self.to_vec3().distance(point)
    }
}

/// Raw entity velocity as sent over the wire (1/8000 block per tick)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Velocity {
    pub x: i16,
    pub y: i16,
    pub z: i16,
}

impl Velocity {
    pub fn new(x: i16, y: i16, z: i16) -> Self {
        Self { x, y, z }
    }
}

/// Kind of a spawned world object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    FishingHook,
    Other(u8),
}

/// Payload of an object-spawned notification
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnedObject {
    pub kind: ObjectKind,
    pub object_id: EntityId,
    pub owner: EntityId,
    pub position: Vec3,
    pub pitch: u8,
    pub yaw: u8,
}

/// Snapshot of the controlled agent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentStatus {
    pub entity_id: EntityId,
    pub dead: bool,
    pub eating: bool,
    /// Item in the selected hotbar slot
    pub held_item: Option<ItemId>,
    /// Feet position
    pub location: Vec3,
}

/// Host-side toggles the fisher requires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostToggles {
    pub load_entities: bool,
    pub load_mobs: bool,
}

/// A side effect requested by the state machine
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    /// Select the inventory slot holding this item type
    SelectItem(ItemId),
    /// Right click with the held item (cast or reel for a rod)
    UseHeldItem,
    /// Turn the view toward a point
    LookAt(Vec3),
}

/// Read access to nearby blocks
pub trait WorldQuery {
    /// Locations of `block` within `horizontal` x `vertical` x `horizontal` around `center`
    fn block_locations(
        &self,
        center: Vec3,
        horizontal: i32,
        vertical: i32,
        block: BlockId,
    ) -> Vec<BlockPos>;

    fn block_id(&self, pos: BlockPos) -> BlockId;
}

/// Read access to the controlled agent
pub trait AgentQuery {
    fn status(&self) -> AgentStatus;

    fn toggles(&self) -> HostToggles;
}

/// Actions the agent can perform
pub trait ActionPort {
    fn select_item(&self, item: ItemId);

    fn use_held_item(&self);

    fn look_at(&self, target: Vec3);

    fn apply(&self, action: &Action) {
        match *action {
            Action::SelectItem(item) => self.select_item(item),
            Action::UseHeldItem => self.use_held_item(),
            Action::LookAt(target) => self.look_at(target),
        }
    }
}

/// Delivers tick, object-spawn and entity-velocity notifications
pub trait EventSource {
    fn subscribe(&self, sink: EventSink);

    /// Drop the subscribed sink for all three notification kinds
    fn unsubscribe(&self);
}

/// Everything the fisher needs from its host
pub trait Host: WorldQuery + AgentQuery + ActionPort + EventSource + Send + Sync {}

impl<T> Host for T where T: WorldQuery + AgentQuery + ActionPort + EventSource + Send + Sync {}
