use crate::asset::{self, AssetError, Assets, PlayerRecord};
use crate::cfg;
use crate::cmtp::{
    AiState, AppState, ChangeEvent, EntityKey, Frame, GroundItem, InputEvent, InputState,
    ItemKind, MenuState, Monster, Player, Portal, TileMap,
};
use crate::systems;
use std::collections::BTreeMap;

/// Host seam. The simulation never draws or reads devices itself; the
/// frontend feeds raw key events in and takes a finished frame out.
pub trait Frontend {
    fn poll_events(&mut self) -> Vec<InputEvent>;
    fn render(&mut self, frame: &Frame);
}

/// One map with its population. Entities live in id-keyed maps; the
/// draw order is a parallel key list kept depth-sorted by the ai system.
#[derive(Debug)]
pub struct Location {
    pub id: i32,
    pub name: String,
    pub tile_map: TileMap,
    id_count: u32,
    pub monsters: BTreeMap<u32, Monster>,
    pub items: BTreeMap<u32, GroundItem>,
    pub portals: BTreeMap<u32, Portal>,
    pub draw_order: Vec<EntityKey>,
}

impl Location {
    pub fn new(id: i32, name: String, tile_map: TileMap) -> Self {
        Location {
            id,
            name,
            tile_map,
            id_count: 0,
            monsters: BTreeMap::new(),
            items: BTreeMap::new(),
            portals: BTreeMap::new(),
            draw_order: Vec::new(),
        }
    }

    fn next_id(&mut self) -> u32 {
        self.id_count += 1;
        self.id_count
    }

    pub fn add_monster(&mut self, monster: Monster) -> u32 {
        let id = self.next_id();
        self.monsters.insert(id, monster);
        self.draw_order.push(EntityKey::Monster(id));
        id
    }

    pub fn add_item(&mut self, item: GroundItem) -> u32 {
        let id = self.next_id();
        self.items.insert(id, item);
        self.draw_order.push(EntityKey::Item(id));
        id
    }

    pub fn add_portal(&mut self, portal: Portal) -> u32 {
        let id = self.next_id();
        self.portals.insert(id, portal);
        self.draw_order.push(EntityKey::Portal(id));
        id
    }

    pub fn remove_monster(&mut self, id: u32) -> Option<Monster> {
        self.draw_order.retain(|key| *key != EntityKey::Monster(id));
        self.monsters.remove(&id)
    }

    pub fn remove_item(&mut self, id: u32) -> Option<GroundItem> {
        self.draw_order.retain(|key| *key != EntityKey::Item(id));
        self.items.remove(&id)
    }

    pub fn attach_player(&mut self) {
        if !self.draw_order.contains(&EntityKey::Player) {
            self.draw_order.push(EntityKey::Player);
        }
    }

    pub fn detach_player(&mut self) {
        self.draw_order.retain(|key| *key != EntityKey::Player);
    }

    /// Painter's order: smaller Y draws first, so southern sprites
    /// overlap northern ones.
    pub fn sort_draw_order(&mut self, player: Option<&Player>) {
        let monsters = &self.monsters;
        let items = &self.items;
        let portals = &self.portals;
        let depth = |key: &EntityKey| -> f64 {
            match key {
                EntityKey::Player => player.map_or(f64::MIN, |p| p.sprite.y),
                EntityKey::Monster(id) => monsters.get(id).map_or(f64::MIN, |m| m.sprite.y),
                EntityKey::Item(id) => items.get(id).map_or(f64::MIN, |i| i.sprite.y),
                EntityKey::Portal(id) => portals.get(id).map_or(f64::MIN, |p| p.sprite.y),
            }
        };
        self.draw_order
            .sort_by(|a, b| depth(a).partial_cmp(&depth(b)).unwrap_or(std::cmp::Ordering::Equal));
    }
}

/// The whole mutable simulation context, threaded through every system.
pub struct World {
    pub app_state: AppState,
    pub input: InputState,
    /// Seconds covered by the current tick.
    pub delta: f64,
    /// Simulation clock; advances only while the Game scene is active.
    pub clock: f64,
    pub must_exit: bool,
    pub events: Vec<ChangeEvent>,
    pub assets: Assets,
    pub player: Option<Player>,
    pub locations: BTreeMap<i32, Location>,
    pub current_location: i32,
    pub main_menu: MenuState,
    pub game_menu: MenuState,
    pub game_over_menu: MenuState,
    pub inventory_menu: MenuState,
}

impl World {
    pub fn new(assets: Assets) -> Self {
        World {
            app_state: AppState::MainMenu,
            input: InputState::default(),
            delta: 0.0,
            clock: 0.0,
            must_exit: false,
            events: Vec::new(),
            assets,
            player: None,
            locations: BTreeMap::new(),
            current_location: 0,
            main_menu: MenuState::default(),
            game_menu: MenuState::default(),
            game_over_menu: MenuState::default(),
            inventory_menu: MenuState::default(),
        }
    }

    pub fn location(&self) -> Option<&Location> {
        self.locations.get(&self.current_location)
    }

    pub fn location_mut(&mut self) -> Option<&mut Location> {
        self.locations.get_mut(&self.current_location)
    }
}

/// Advances the simulation by one tick and renders the resulting frame.
pub fn tick(world: &mut World, frontend: &mut dyn Frontend, delta: f64) {
    world.delta = delta;
    if world.app_state == AppState::Game {
        world.clock += delta;
    }
    systems::input::update(world, frontend);
    systems::main_menu::update(world);
    systems::game_menu::update(world);
    systems::inventory::update(world);
    systems::game_over::update(world);
    systems::movement::update(world);
    systems::interaction::update(world);
    systems::player_action::update(world);
    systems::ai::update(world);
    systems::death::update(world);
    systems::render::update(world, frontend);
}

/// Armor reduces incoming damage proportionally, never below zero and
/// never to zero: 0 armor passes everything, 100 armor halves it.
pub fn mitigate(damage: f64, armor: f64) -> f64 {
    damage * (cfg::PERCENTAGE_BASE / (cfg::PERCENTAGE_BASE + armor))
}

/// One player swing at a monster. Gated by the player's cooldown; a
/// surviving monster strikes back in the same resolution, gated by its
/// own cooldown. A monster killed by the swing cannot retaliate, and a
/// swing at an already-dead target is a no-op that keeps the cooldown.
pub fn attack_monster(
    player: &mut Player,
    monster: &mut Monster,
    now: f64,
    events: &mut Vec<ChangeEvent>,
) -> bool {
    if monster.sprite.dead {
        return false;
    }
    if !player.sprite.try_attack(now) {
        return false;
    }
    monster.health -= player.damage();
    if monster.health <= 0.0 {
        monster.health = 0.0;
        monster.sprite.dead = true;
        events.push(ChangeEvent::MonsterDied {
            name: monster.name.clone(),
        });
        return true;
    }
    attack_player(monster, player, now, events);
    true
}

/// One monster swing at the player, gated by the monster's cooldown and
/// mitigated by the player's total armor.
pub fn attack_player(
    monster: &mut Monster,
    player: &mut Player,
    now: f64,
    events: &mut Vec<ChangeEvent>,
) -> bool {
    if !monster.sprite.try_attack(now) {
        return false;
    }
    player.hp.reduce(mitigate(monster.damage, player.armor()));
    events.push(ChangeEvent::HealthChanged {
        current: player.hp.current(),
        initial: player.hp.initial(),
    });
    if player.hp.is_depleted() {
        events.push(ChangeEvent::PlayerDied);
    }
    true
}

/// Drinking a health bottle consumes it from the inventory.
pub fn use_item(player: &mut Player, instance: u32, events: &mut Vec<ChangeEvent>) -> bool {
    let held = player
        .inventory
        .items()
        .iter()
        .find(|item| item.instance == instance);
    let health = match held {
        Some(item) => match item.kind {
            ItemKind::HealthBottle { health } => health,
            _ => return false,
        },
        None => return false,
    };
    player.inventory.remove(instance);
    player.hp.add(health);
    events.push(ChangeEvent::HealthChanged {
        current: player.hp.current(),
        initial: player.hp.initial(),
    });
    events.push(ChangeEvent::InventoryChanged {
        quantity: player.inventory.quantity(),
        capacity: player.inventory.capacity(),
    });
    true
}

/// Builds the player from a record and drops them into the recorded
/// location, resetting the session clock.
pub fn start_game(world: &mut World, from_save: bool) -> Result<(), AssetError> {
    let path = if from_save {
        cfg::SAVE_PATH.to_string()
    } else {
        format!("{}/player.json", cfg::ASSETS_DIR)
    };
    let record = asset::load_player_record(&path)?;
    let mut player = Player::new(
        record.name.clone(),
        record.initial_health,
        record.damage,
        record.armor,
        record.damage_radius,
    );
    player.hp.set(record.health);
    for item_id in &record.inventory {
        player.inventory.add(world.assets.items.build(*item_id)?);
    }
    if record.equipped_weapon_id != cfg::NO_ITEM_ID {
        player.equipment.weapon = Some(world.assets.items.build(record.equipped_weapon_id)?);
    }
    if record.equipped_armor_id != cfg::NO_ITEM_ID {
        player.equipment.armor = Some(world.assets.items.build(record.equipped_armor_id)?);
    }
    player.sprite.set_position(
        TileMap::tile_to_pixel(record.position_x),
        TileMap::tile_to_pixel(record.position_y),
    );
    world.player = Some(player);
    world.locations.clear();
    world.clock = 0.0;
    set_location(world, record.location_id)?;
    world.app_state = AppState::Game;
    if let Some(player) = &world.player {
        world.events.push(ChangeEvent::HealthChanged {
            current: player.hp.current(),
            initial: player.hp.initial(),
        });
        world.events.push(ChangeEvent::InventoryChanged {
            quantity: player.inventory.quantity(),
            capacity: player.inventory.capacity(),
        });
    }
    Ok(())
}

/// Moves the player directory entry to another location, loading it on
/// first visit. Every monster of the old location drops pursuit.
pub fn set_location(world: &mut World, location_id: i32) -> Result<(), AssetError> {
    if let Some(old) = world.locations.get_mut(&world.current_location) {
        old.detach_player();
        for monster in old.monsters.values_mut() {
            monster.ai = AiState::Wandering;
        }
    }
    if !world.locations.contains_key(&location_id) {
        let location = asset::load_location(cfg::ASSETS_DIR, location_id, &world.assets)?;
        world.locations.insert(location_id, location);
    }
    world.current_location = location_id;
    let name = match world.locations.get_mut(&location_id) {
        Some(location) => {
            location.attach_player();
            location.name.clone()
        }
        None => String::new(),
    };
    world.events.push(ChangeEvent::LocationChanged { location_id, name });
    Ok(())
}

/// Snapshots the player into the save record on disk.
pub fn save_game(world: &mut World) -> Result<(), AssetError> {
    let player = match &world.player {
        Some(player) => player,
        None => return Ok(()),
    };
    let record = PlayerRecord {
        name: player.name.clone(),
        initial_health: player.hp.initial(),
        health: player.hp.current(),
        damage: player.basic_damage,
        armor: player.basic_armor,
        damage_radius: player.basic_damage_radius,
        location_id: world.current_location,
        position_x: TileMap::pixel_to_tile(player.sprite.x),
        position_y: TileMap::pixel_to_tile(player.sprite.y),
        equipped_weapon_id: player
            .equipment
            .weapon
            .as_ref()
            .map_or(cfg::NO_ITEM_ID, |item| item.id),
        equipped_armor_id: player
            .equipment
            .armor
            .as_ref()
            .map_or(cfg::NO_ITEM_ID, |item| item.id),
        inventory: player.inventory.items().iter().map(|item| item.id).collect(),
    };
    asset::save_player_record(cfg::SAVE_PATH, &record)?;
    world.events.push(ChangeEvent::GameSaved);
    Ok(())
}

/// Drops the running session; used when leaving for the main menu.
pub fn end_session(world: &mut World) {
    world.player = None;
    world.locations.clear();
    world.clock = 0.0;
    world.current_location = 0;
}


#[cfg(test)]
mod mitigation_tests {
    use super::*;

    #[test]
    fn zero_armor_passes_full_damage() {
        assert_eq!(mitigate(20.0, 0.0), 20.0);
    }

    #[test]
    fn hundred_armor_halves_damage() {
        assert_eq!(mitigate(20.0, 100.0), 10.0);
    }

    #[test]
    fn mitigation_never_reaches_zero() {
        assert!(mitigate(20.0, 10_000.0) > 0.0);
    }
}



#[cfg(test)]
mod location_tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn removal_keeps_draw_order_in_sync() {
        let mut location = Location::new(1, String::from("Field"), open_map(4, 4));
        let monster_id = location.add_monster(plain_monster(10.0, 1.0));
        let item_id = location.add_item(GroundItem {
            sprite: still_sprite(0.0, 0.0),
            item: crate::cmtp::Item {
                id: 5,
                instance: 1,
                name: String::from("Bottle"),
                kind: ItemKind::HealthBottle { health: 10.0 },
            },
        });
        assert_eq!(location.draw_order.len(), 2);
        location.remove_monster(monster_id);
        assert_eq!(location.draw_order, vec![EntityKey::Item(item_id)]);
    }

    #[test]
    fn draw_order_sorts_by_ascending_y() {
        let mut location = Location::new(1, String::from("Field"), open_map(8, 8));
        let mut south = plain_monster(10.0, 1.0);
        south.sprite.set_position(0.0, 300.0);
        let mut north = plain_monster(10.0, 1.0);
        north.sprite.set_position(0.0, 10.0);
        let south_id = location.add_monster(south);
        let north_id = location.add_monster(north);
        let mut player = plain_player();
        player.sprite.set_position(0.0, 150.0);
        location.attach_player();
        location.sort_draw_order(Some(&player));
        assert_eq!(
            location.draw_order,
            vec![
                EntityKey::Monster(north_id),
                EntityKey::Player,
                EntityKey::Monster(south_id),
            ]
        );
    }

    #[test]
    fn switching_locations_clears_pursuit() {
        let mut world = world_with_open_location(4, 4);
        let mut monster = plain_monster(10.0, 1.0);
        monster.ai = AiState::Pursuing;
        let monster_id = match world.location_mut() {
            Some(location) => location.add_monster(monster),
            None => panic!("missing location"),
        };
        let other = Location::new(2, String::from("Cave"), open_map(4, 4));
        world.locations.insert(2, other);
        world.player = Some(plain_player());
        set_location(&mut world, 2).unwrap();
        assert_eq!(world.current_location, 2);
        let old = &world.locations[&1];
        assert_eq!(old.monsters[&monster_id].ai, AiState::Wandering);
        assert!(!old.draw_order.contains(&EntityKey::Player));
        assert!(world.locations[&2].draw_order.contains(&EntityKey::Player));
    }
}
