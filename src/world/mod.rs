//! The entity store combat runs against
//!
//! Characters and objects live in generation-checked arenas; every
//! relationship between them is a handle that resolves to nothing once the
//! other side is gone. Extraction also nulls the handles that point at the
//! extracted character, so stale links never survive a pass.

pub mod arena;
pub mod empire;
pub mod object;
pub mod room;

pub use arena::Arena;
pub use empire::{Empire, Faction, Group, Instance, PkRecord};
pub use object::{ArmorType, CorpseData, CorpseOwner, ObjKind, ObjLocation, Object, Size, WearSlot};
pub use room::Room;

use crate::combat::hooks::{CombatHooks, DefaultHooks};
use crate::combat::registry::CombatRegistry;
use crate::core::clock::Clock;
use crate::core::config::GameConfig;
use crate::core::types::{
    AccountId, CharId, EmpireId, FactionId, GroupId, InstanceId, ObjId, RoomId,
};
use crate::entity::character::Character;
use crate::entity::position::Position;
use ahash::AHashMap;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::rc::Rc;

/// Who receives an `act` message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    Actor,
    Victim,
    /// Everyone in the actor's room except actor and victim
    Room,
}

pub struct World {
    pub config: GameConfig,
    pub clock: Clock,
    pub rng: ChaCha8Rng,
    pub combat: CombatRegistry,

    pub chars: Arena<CharId, Character>,
    pub objects: Arena<ObjId, Object>,
    pub rooms: AHashMap<RoomId, Room>,

    pub empires: AHashMap<EmpireId, Empire>,
    pub factions: AHashMap<FactionId, Faction>,
    pub groups: AHashMap<GroupId, Group>,
    pub instances: AHashMap<InstanceId, Instance>,
    /// Deaths suffered, keyed by the victim's account
    pub pk_records: AHashMap<AccountId, Vec<PkRecord>>,

    hooks: Rc<dyn CombatHooks>,
}

impl World {
    pub fn new(config: GameConfig) -> Self {
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        Self {
            config,
            clock: Clock::default(),
            rng,
            combat: CombatRegistry::new(),
            chars: Arena::new(),
            objects: Arena::new(),
            rooms: AHashMap::new(),
            empires: AHashMap::new(),
            factions: AHashMap::new(),
            groups: AHashMap::new(),
            instances: AHashMap::new(),
            pk_records: AHashMap::new(),
            hooks: Rc::new(DefaultHooks),
        }
    }

    pub fn with_hooks(config: GameConfig, hooks: Rc<dyn CombatHooks>) -> Self {
        let mut world = Self::new(config);
        world.hooks = hooks;
        world
    }

    pub fn set_hooks(&mut self, hooks: Rc<dyn CombatHooks>) {
        self.hooks = hooks;
    }

    /// Shared handle to the hooks, so they can be called with `&mut self`
    pub fn hooks(&self) -> Rc<dyn CombatHooks> {
        Rc::clone(&self.hooks)
    }

    /// Inclusive percentile-style roll
    pub fn roll(&mut self, low: i32, high: i32) -> i32 {
        if high <= low {
            return low;
        }
        self.rng.gen_range(low..=high)
    }

    // === ROOMS ===

    pub fn add_room(&mut self, room: Room) -> RoomId {
        let id = room.id;
        self.rooms.insert(id, room);
        id
    }

    pub fn room(&self, id: RoomId) -> Option<&Room> {
        self.rooms.get(&id)
    }

    pub fn room_mut(&mut self, id: RoomId) -> Option<&mut Room> {
        self.rooms.get_mut(&id)
    }

    /// Snapshot of a room's occupants, newest first
    pub fn people_in(&self, room: RoomId) -> Vec<CharId> {
        self.rooms
            .get(&room)
            .map(|r| r.people.clone())
            .unwrap_or_default()
    }

    pub fn distance(&self, a: RoomId, b: RoomId) -> Option<f64> {
        Some(self.rooms.get(&a)?.distance_to(self.rooms.get(&b)?))
    }

    // === CHARACTERS ===

    pub fn ch(&self, id: CharId) -> Option<&Character> {
        self.chars.get(id)
    }

    pub fn ch_mut(&mut self, id: CharId) -> Option<&mut Character> {
        self.chars.get_mut(id)
    }

    pub fn is_present(&self, id: CharId) -> bool {
        self.chars.contains(id)
    }

    pub fn name(&self, id: CharId) -> String {
        self.ch(id)
            .map(|c| c.name.clone())
            .unwrap_or_else(|| "someone".to_string())
    }

    pub fn same_room(&self, a: CharId, b: CharId) -> bool {
        match (self.ch(a), self.ch(b)) {
            (Some(x), Some(y)) => x.room == y.room,
            _ => false,
        }
    }

    /// Place a new character in a room
    pub fn spawn(&mut self, mut ch: Character, room: RoomId) -> CharId {
        ch.room = room;
        let id = self.chars.insert(ch);
        match self.rooms.get_mut(&room) {
            Some(r) => r.people.insert(0, id),
            None => tracing::warn!(%room, "character spawned into a missing room"),
        }
        id
    }

    pub fn move_char(&mut self, id: CharId, to: RoomId) {
        let Some(from) = self.ch(id).map(|c| c.room) else {
            return;
        };
        if let Some(r) = self.rooms.get_mut(&from) {
            r.people.retain(|&p| p != id);
        }
        if let Some(r) = self.rooms.get_mut(&to) {
            r.people.insert(0, id);
        }
        if let Some(c) = self.ch_mut(id) {
            c.room = to;
        }
    }

    /// Remove a character from the world for good
    ///
    /// Everything still pointing at it is nulled, so later lookups through
    /// old handles fail cleanly.
    pub fn extract_char(&mut self, id: CharId) {
        let Some(ch) = self.chars.get(id) else {
            return;
        };
        let room = ch.room;
        let group = ch.group;
        let mut carried: Vec<ObjId> = ch.inventory.clone();
        carried.extend(ch.equipment.values().copied());

        self.combat.remove(id);

        for other in self.chars.ids() {
            if other == id {
                continue;
            }
            let mut leave_combat = false;
            if let Some(c) = self.chars.get_mut(other) {
                if c.fighting == Some(id) {
                    c.fighting = None;
                    c.in_combat_list = false;
                    if c.position == Position::Fighting {
                        c.position = Position::Standing;
                    }
                    leave_combat = true;
                }
                if c.leader == Some(id) {
                    c.leader = None;
                }
                if c.hunting == Some(id) {
                    c.hunting = None;
                }
                if c.feeding_from == Some(id) {
                    c.feeding_from = None;
                }
                if c.fed_on_by == Some(id) {
                    c.fed_on_by = None;
                }
                c.tagged_by.retain(|&t| t != id);
            }
            if leave_combat {
                self.combat.remove(other);
            }
        }

        if let Some(r) = self.rooms.get_mut(&room) {
            r.people.retain(|&p| p != id);
        }
        if let Some(g) = group.and_then(|g| self.groups.get_mut(&g)) {
            g.members.retain(|&m| m != id);
        }
        for obj in carried {
            self.extract_obj(obj);
        }
        self.chars.remove(id);
        tracing::debug!(%id, "extracted character");
    }

    // === OBJECTS ===

    pub fn obj(&self, id: ObjId) -> Option<&Object> {
        self.objects.get(id)
    }

    pub fn obj_mut(&mut self, id: ObjId) -> Option<&mut Object> {
        self.objects.get_mut(id)
    }

    pub fn create_obj(&mut self, obj: Object) -> ObjId {
        self.objects.insert(obj)
    }

    /// Unlink an object from wherever it is
    fn detach_obj(&mut self, id: ObjId) {
        let Some(location) = self.obj(id).map(|o| o.location) else {
            return;
        };
        match location {
            ObjLocation::Nowhere => {}
            ObjLocation::Room(room) => {
                if let Some(r) = self.rooms.get_mut(&room) {
                    r.contents.retain(|&o| o != id);
                }
            }
            ObjLocation::Carried(ch) => {
                if let Some(c) = self.chars.get_mut(ch) {
                    c.inventory.retain(|&o| o != id);
                }
            }
            ObjLocation::Worn(ch, slot) => {
                if let Some(c) = self.chars.get_mut(ch) {
                    if c.equipment.get(&slot) == Some(&id) {
                        c.equipment.remove(&slot);
                    }
                }
            }
            ObjLocation::Inside(container) => {
                if let Some(c) = self.objects.get_mut(container) {
                    c.contents.retain(|&o| o != id);
                }
            }
        }
        if let Some(o) = self.obj_mut(id) {
            o.location = ObjLocation::Nowhere;
        }
    }

    pub fn obj_to_room(&mut self, id: ObjId, room: RoomId) {
        self.detach_obj(id);
        if let Some(r) = self.rooms.get_mut(&room) {
            r.contents.insert(0, id);
        }
        if let Some(o) = self.obj_mut(id) {
            o.location = ObjLocation::Room(room);
        }
    }

    pub fn obj_to_char(&mut self, id: ObjId, ch: CharId) {
        self.detach_obj(id);
        if let Some(c) = self.chars.get_mut(ch) {
            c.inventory.insert(0, id);
        }
        if let Some(o) = self.obj_mut(id) {
            o.location = ObjLocation::Carried(ch);
        }
    }

    pub fn obj_to_obj(&mut self, id: ObjId, container: ObjId) {
        self.detach_obj(id);
        if let Some(c) = self.objects.get_mut(container) {
            c.contents.push(id);
        }
        if let Some(o) = self.obj_mut(id) {
            o.location = ObjLocation::Inside(container);
        }
    }

    /// Wear an object; anything already in the slot goes to the inventory
    pub fn equip(&mut self, ch: CharId, id: ObjId, slot: WearSlot) {
        if !self.is_present(ch) || !self.objects.contains(id) {
            return;
        }
        self.unequip(ch, slot);
        self.detach_obj(id);
        if let Some(c) = self.chars.get_mut(ch) {
            c.equipment.insert(slot, id);
        }
        if let Some(o) = self.obj_mut(id) {
            o.location = ObjLocation::Worn(ch, slot);
        }
    }

    pub fn unequip(&mut self, ch: CharId, slot: WearSlot) -> Option<ObjId> {
        let id = *self.ch(ch)?.equipment.get(&slot)?;
        self.obj_to_char(id, ch);
        Some(id)
    }

    pub fn equipped(&self, ch: CharId, slot: WearSlot) -> Option<&Object> {
        let id = *self.ch(ch)?.equipment.get(&slot)?;
        self.obj(id)
    }

    /// Destroy an object and everything inside it
    pub fn extract_obj(&mut self, id: ObjId) {
        let Some(contents) = self.obj(id).map(|o| o.contents.clone()) else {
            return;
        };
        for inner in contents {
            self.extract_obj(inner);
        }
        self.detach_obj(id);
        self.objects.remove(id);
    }

    /// Total weight of a character's inventory
    pub fn carried_weight(&self, ch: CharId) -> i32 {
        self.ch(ch)
            .map(|c| {
                c.inventory
                    .iter()
                    .filter_map(|&o| self.obj(o))
                    .map(|o| o.weight)
                    .sum()
            })
            .unwrap_or(0)
    }

    // === OUTPUT ===

    pub fn send(&mut self, ch: CharId, text: impl Into<String>) {
        if let Some(c) = self.ch_mut(ch) {
            c.send(text);
        }
    }

    /// Expand `$n` (actor), `$N` (victim) and `$s` and deliver to an audience
    pub fn act(&mut self, template: &str, actor: CharId, victim: Option<CharId>, to: Audience) {
        let text = template
            .replace("$n", &self.name(actor))
            .replace("$N", &victim.map(|v| self.name(v)).unwrap_or_default())
            .replace("$s", "their");
        match to {
            Audience::Actor => self.send(actor, text),
            Audience::Victim => {
                if let Some(v) = victim {
                    self.send(v, text);
                }
            }
            Audience::Room => {
                let Some(room) = self.ch(actor).map(|c| c.room) else {
                    return;
                };
                for person in self.people_in(room) {
                    if person != actor && Some(person) != victim {
                        self.send(person, text.clone());
                    }
                }
            }
        }
    }
}
