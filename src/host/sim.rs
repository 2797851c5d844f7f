//! In-memory host with a pond, a hotbar and a fishing rod that behaves
//! like the real thing: the first use throws a lure, the next pulls it in.

use std::collections::HashSet;
use std::time::Duration;
use parking_lot::Mutex;
use tokio::time::Instant;

use super::{
    Action, ActionPort, AgentQuery, AgentStatus, BlockId, BlockPos, EntityId, EventSource,
    HostToggles, ItemId, ObjectKind, SpawnedObject, Vec3, Velocity, WorldQuery, FISHING_ROD, WATER,
};
use crate::fishing::EventSink;

const AIR: BlockId = 0;
const HOTBAR_SLOTS: usize = 9;
const AGENT_ID: EntityId = 1;
const FIRST_OBJECT_ID: EntityId = 1000;
/// Vertical lure velocity sent when a fish bites
const BITE_PULL: i16 = -400;

struct PondState {
    agent: AgentStatus,
    hotbar: [Option<ItemId>; HOTBAR_SLOTS],
    selected: usize,
    water: HashSet<BlockPos>,
    toggles: HostToggles,
    lure: Option<EntityId>,
    next_object_id: EntityId,
    spawn_lures: bool,
    bite_at: Option<Instant>,
    actions: Vec<Action>,
}

impl PondState {
    fn held_item(&self) -> Option<ItemId> {
        self.hotbar[self.selected]
    }
}

/// Simulated host used by the demo binary and the tests
pub struct SimulatedPond {
    state: Mutex<PondState>,
    sink: Mutex<Option<EventSink>>,
}

impl SimulatedPond {
    /// Agent standing on the shore of a 10x10 pond, rod in slot 2, slot 0 selected
    pub fn new() -> Self {
        let mut water = HashSet::new();
        for x in 2..12 {
            for z in 2..12 {
                water.insert(BlockPos::new(x, 63, z));
                water.insert(BlockPos::new(x, 62, z));
            }
        }

        let mut hotbar = [None; HOTBAR_SLOTS];
        hotbar[2] = Some(FISHING_ROD);

        Self {
            state: Mutex::new(PondState {
                agent: AgentStatus {
                    entity_id: AGENT_ID,
                    dead: false,
                    eating: false,
                    held_item: None,
                    location: Vec3::new(0.5, 64.0, 0.5),
                },
                hotbar,
                selected: 0,
                water,
                toggles: HostToggles {
                    load_entities: true,
                    load_mobs: true,
                },
                lure: None,
                next_object_id: FIRST_OBJECT_ID,
                spawn_lures: true,
                bite_at: None,
                actions: Vec::new(),
            }),
            sink: Mutex::new(None),
        }
    }

    pub fn with_toggles(self, load_entities: bool, load_mobs: bool) -> Self {
        self.state.lock().toggles = HostToggles {
            load_entities,
            load_mobs,
        };
        self
    }

    pub fn set_dead(&self, dead: bool) {
        self.state.lock().agent.dead = dead;
    }

    pub fn set_eating(&self, eating: bool) {
        self.state.lock().agent.eating = eating;
    }

    /// When off, casting never produces a lure (e.g. the line snagged)
    pub fn set_spawn_lures(&self, spawn: bool) {
        self.state.lock().spawn_lures = spawn;
    }

    /// Have a fish pull the current lure once `delay` has passed
    pub fn bite_after(&self, delay: Duration) {
        self.state.lock().bite_at = Some(Instant::now() + delay);
    }

    pub fn agent_id(&self) -> EntityId {
        self.state.lock().agent.entity_id
    }

    pub fn lure(&self) -> Option<EntityId> {
        self.state.lock().lure
    }

    pub fn actions(&self) -> Vec<Action> {
        self.state.lock().actions.clone()
    }

    pub fn is_subscribed(&self) -> bool {
        self.sink.lock().is_some()
    }

    /// Advance the simulation by one game tick
    pub fn tick(&self) {
        let Some(sink) = self.sink.lock().clone() else {
            return;
        };

        let bite = {
            let mut state = self.state.lock();
            match (state.bite_at, state.lure) {
                (Some(at), Some(lure)) if Instant::now() >= at => {
                    state.bite_at = None;
                    Some(lure)
                }
                _ => None,
            }
        };

        if let Some(lure) = bite {
            tracing::debug!("[SIM] Fish pulls lure {}", lure);
            sink.entity_velocity(lure, Velocity::new(0, BITE_PULL, 0));
        }
        sink.tick();
    }

    /// Deliver an arbitrary velocity notification
    pub fn push_velocity(&self, entity: EntityId, velocity: Velocity) {
        if let Some(sink) = self.sink.lock().clone() {
            sink.entity_velocity(entity, velocity);
        }
    }

    /// Deliver an arbitrary object-spawn notification
    pub fn push_spawn(&self, object: SpawnedObject) {
        if let Some(sink) = self.sink.lock().clone() {
            sink.object_spawned(object);
        }
    }
}

impl Default for SimulatedPond {
    fn default() -> Self {
        Self::new()
    }
}

impl WorldQuery for SimulatedPond {
    fn block_locations(
        &self,
        center: Vec3,
        horizontal: i32,
        vertical: i32,
        block: BlockId,
    ) -> Vec<BlockPos> {
        if block != WATER {
            return Vec::new();
        }
        let (cx, cy, cz) = (
            center.x.floor() as i32,
            center.y.floor() as i32,
            center.z.floor() as i32,
        );
        self.state
            .lock()
            .water
            .iter()
            .filter(|pos| {
                (pos.x - cx).abs() <= horizontal
                    && (pos.y - cy).abs() <= vertical
                    && (pos.z - cz).abs() <= horizontal
            })
            .copied()
            .collect()
    }

    fn block_id(&self, pos: BlockPos) -> BlockId {
        if self.state.lock().water.contains(&pos) {
            WATER
        } else {
            AIR
        }
    }
}

impl AgentQuery for SimulatedPond {
    fn status(&self) -> AgentStatus {
        let state = self.state.lock();
        AgentStatus {
            held_item: state.held_item(),
            ..state.agent
        }
    }

    fn toggles(&self) -> HostToggles {
        self.state.lock().toggles
    }
}

impl ActionPort for SimulatedPond {
    fn select_item(&self, item: ItemId) {
        let mut state = self.state.lock();
        state.actions.push(Action::SelectItem(item));
        if let Some(slot) = state.hotbar.iter().position(|held| *held == Some(item)) {
            state.selected = slot;
        }
    }

    fn use_held_item(&self) {
        let spawned = {
            let mut state = self.state.lock();
            state.actions.push(Action::UseHeldItem);
            if state.held_item() != Some(FISHING_ROD) {
                return;
            }

            if state.lure.take().is_some() {
                state.bite_at = None;
                None
            } else if state.spawn_lures {
                let object_id = state.next_object_id;
                state.next_object_id += 1;
                state.lure = Some(object_id);
                Some(SpawnedObject {
                    kind: ObjectKind::FishingHook,
                    object_id,
                    owner: state.agent.entity_id,
                    position: Vec3::new(6.5, 63.0, 6.5),
                    pitch: 0,
                    yaw: 0,
                })
            } else {
                None
            }
        };

        if let Some(object) = spawned {
            self.push_spawn(object);
        }
    }

    fn look_at(&self, target: Vec3) {
        self.state.lock().actions.push(Action::LookAt(target));
    }
}

impl EventSource for SimulatedPond {
    fn subscribe(&self, sink: EventSink) {
        *self.sink.lock() = Some(sink);
    }

    fn unsubscribe(&self) {
        *self.sink.lock() = None;
    }
}
