use crate::cfg;
use rand::seq::SliceRandom as _;
use rand::Rng as _;

/// Axis-aligned box in pixel coordinates. Touching edges do not intersect.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Rect {
            x,
            y,
            width,
            height,
        }
    }

    pub fn max_x(&self) -> f64 {
        self.x + self.width
    }

    pub fn max_y(&self) -> f64 {
        self.y + self.height
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        (self.x < other.max_x())
            && (other.x < self.max_x())
            && (self.y < other.max_y())
            && (other.y < self.max_y())
    }

    /// The same box grown by `radius` on all four sides.
    pub fn inflate(&self, radius: f64) -> Rect {
        Rect {
            x: self.x - radius,
            y: self.y - radius,
            width: self.width + 2.0 * radius,
            height: self.height + 2.0 * radius,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Direction {
    Top,
    Right,
    Bottom,
    Left,
}

/// A tile of the map. The symbol is the visual reference and stays
/// opaque to the simulation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tile {
    pub symbol: char,
    pub passable: bool,
}

impl Tile {
    /// Sentinel returned for out-of-bounds queries, never passable.
    pub const VOID: Tile = Tile {
        symbol: ' ',
        passable: false,
    };
}

/// Rectangular, immutable-after-construction grid of tiles.
#[derive(Clone, Debug)]
pub struct TileMap {
    width: i32,
    height: i32,
    tiles: Vec<Tile>,
}

impl TileMap {
    pub fn new(width: i32, height: i32) -> Self {
        TileMap {
            width,
            height,
            tiles: vec![Tile::VOID; (width * height) as usize],
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// Map extent in pixels.
    pub fn map_width(&self) -> f64 {
        (self.width * cfg::TILE_SIZE) as f64
    }

    pub fn map_height(&self) -> f64 {
        (self.height * cfg::TILE_SIZE) as f64
    }

    pub fn set_tile(&mut self, x: i32, y: i32, tile: Tile) {
        if (x >= 0) && (x < self.width) && (y >= 0) && (y < self.height) {
            self.tiles[(y * self.width + x) as usize] = tile;
        }
    }

    /// Out-of-bounds queries return the blocked sentinel, so collision
    /// checks degrade to "blocked" at map edges.
    pub fn tile(&self, x: i32, y: i32) -> Tile {
        if (x < 0) || (x >= self.width) || (y < 0) || (y >= self.height) {
            Tile::VOID
        } else {
            self.tiles[(y * self.width + x) as usize]
        }
    }

    pub fn tile_to_pixel(coordinate: i32) -> f64 {
        (coordinate * cfg::TILE_SIZE) as f64
    }

    pub fn pixel_to_tile(coordinate: f64) -> i32 {
        (coordinate / cfg::TILE_SIZE as f64) as i32
    }
}

/// Attributes shared by every entity on a map.
#[derive(Clone, Debug, PartialEq)]
pub struct Sprite {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub dead: bool,
    pub last_attack: f64,
    pub speed: f64,
    pub attack_speed: f64,
}

impl Sprite {
    pub fn new(width: f64, height: f64, speed: f64, attack_speed: f64) -> Self {
        Sprite {
            x: 0.0,
            y: 0.0,
            width,
            height,
            dead: false,
            // lets the very first attack pass the cooldown gate
            last_attack: -attack_speed,
            speed,
            attack_speed,
        }
    }

    pub fn set_position(&mut self, x: f64, y: f64) {
        self.x = x;
        self.y = y;
    }

    pub fn collision_box(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    /// Narrow slice at the feet used for tile-passability collision,
    /// distinct from the full bounding box.
    pub fn move_box(&self) -> Rect {
        let inset = self.width * cfg::MOVE_BOX_X_INSET;
        let box_height = self.height * cfg::MOVE_BOX_HEIGHT;
        Rect::new(
            self.x + inset,
            self.y + self.height - box_height,
            self.width - 2.0 * inset,
            box_height,
        )
    }

    /// Cooldown gate: succeeds and resets the timer only if at least
    /// `attack_speed` seconds of simulation time have elapsed.
    pub fn try_attack(&mut self, now: f64) -> bool {
        if (now - self.last_attack) < self.attack_speed {
            return false;
        }
        self.last_attack = now;
        true
    }
}

/// Health points clamped to `[0, initial]`. Reaching zero is terminal:
/// no healing brings a depleted pool back without an external reset.
#[derive(Clone, Debug, PartialEq)]
pub struct Hp {
    initial: f64,
    current: f64,
}

impl Hp {
    pub fn new(initial: f64) -> Self {
        Hp {
            initial,
            current: initial,
        }
    }

    pub fn initial(&self) -> f64 {
        self.initial
    }

    pub fn current(&self) -> f64 {
        self.current
    }

    pub fn is_depleted(&self) -> bool {
        self.current <= 0.0
    }

    pub fn add(&mut self, amount: f64) {
        if self.is_depleted() {
            return;
        }
        self.current = (self.current + amount).min(self.initial);
    }

    pub fn reduce(&mut self, amount: f64) {
        self.current = (self.current - amount).max(0.0);
    }

    /// Used when restoring from a save record.
    pub fn set(&mut self, value: f64) {
        self.current = value.max(0.0).min(self.initial);
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ItemKind {
    Weapon { damage: f64, radius: f64 },
    Armor { armor: f64 },
    HealthBottle { health: f64 },
}

/// `id` names the template the item was built from; `instance` is the
/// identity of this particular copy. Two bottles of the same template
/// share an id but never an instance.
#[derive(Clone, Debug, PartialEq)]
pub struct Item {
    pub id: i32,
    pub instance: u32,
    pub name: String,
    pub kind: ItemKind,
}

/// Ordered, capacity-bounded item collection without duplicates.
#[derive(Clone, Debug, PartialEq)]
pub struct Inventory {
    capacity: usize,
    items: Vec<Item>,
}

impl Inventory {
    pub fn new(capacity: usize) -> Self {
        Inventory {
            capacity,
            items: Vec::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn quantity(&self) -> usize {
        self.items.len()
    }

    pub fn is_full(&self) -> bool {
        self.items.len() == self.capacity
    }

    pub fn contains(&self, instance: u32) -> bool {
        self.items.iter().any(|item| item.instance == instance)
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Fails without mutation when full or when this very copy is
    /// already held. Another copy of the same template is fine.
    pub fn add(&mut self, item: Item) -> bool {
        if self.is_full() || self.contains(item.instance) {
            return false;
        }
        self.items.push(item);
        true
    }

    pub fn remove(&mut self, instance: u32) -> Option<Item> {
        let index = self
            .items
            .iter()
            .position(|item| item.instance == instance)?;
        Some(self.items.remove(index))
    }
}

/// One weapon slot and one armor slot. Equip/unequip is an atomic
/// exchange with an inventory.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Equipment {
    pub weapon: Option<Item>,
    pub armor: Option<Item>,
}

impl Equipment {
    /// Moves the named item out of the inventory into its slot. A previous
    /// occupant goes back to the inventory; the removal just freed a spot,
    /// so that return cannot fail.
    pub fn equip(&mut self, instance: u32, inventory: &mut Inventory) -> bool {
        let item = match inventory.remove(instance) {
            Some(item) => item,
            None => return false,
        };
        let slot = match item.kind {
            ItemKind::Weapon { .. } => &mut self.weapon,
            ItemKind::Armor { .. } => &mut self.armor,
            ItemKind::HealthBottle { .. } => {
                inventory.add(item);
                return false;
            }
        };
        if let Some(previous) = slot.take() {
            inventory.add(previous);
        }
        *slot = Some(item);
        true
    }

    /// Succeeds only if the named item occupies a slot and the inventory
    /// has room to take it back.
    pub fn unequip(&mut self, instance: u32, inventory: &mut Inventory) -> bool {
        let slot = if self.weapon.as_ref().map_or(false, |i| i.instance == instance) {
            &mut self.weapon
        } else if self.armor.as_ref().map_or(false, |i| i.instance == instance) {
            &mut self.armor
        } else {
            return false;
        };
        if inventory.is_full() {
            return false;
        }
        if let Some(item) = slot.take() {
            inventory.add(item);
        }
        true
    }

    pub fn weapon_damage(&self) -> f64 {
        match self.weapon.as_ref().map(|item| item.kind) {
            Some(ItemKind::Weapon { damage, .. }) => damage,
            _ => 0.0,
        }
    }

    pub fn weapon_radius(&self) -> f64 {
        match self.weapon.as_ref().map(|item| item.kind) {
            Some(ItemKind::Weapon { radius, .. }) => radius,
            _ => 0.0,
        }
    }

    pub fn armor_value(&self) -> f64 {
        match self.armor.as_ref().map(|item| item.kind) {
            Some(ItemKind::Armor { armor }) => armor,
            _ => 0.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    pub sprite: Sprite,
    pub name: String,
    pub basic_damage: f64,
    pub basic_armor: f64,
    pub basic_damage_radius: f64,
    pub direction: Direction,
    pub hp: Hp,
    pub inventory: Inventory,
    pub equipment: Equipment,
}

impl Player {
    pub fn new(
        name: String,
        health: f64,
        damage: f64,
        armor: f64,
        damage_radius: f64,
    ) -> Self {
        Player {
            sprite: Sprite::new(
                cfg::PLAYER_WIDTH,
                cfg::PLAYER_HEIGHT,
                cfg::PLAYER_SPEED,
                cfg::PLAYER_ATTACK_SPEED,
            ),
            name,
            basic_damage: damage,
            basic_armor: armor,
            basic_damage_radius: damage_radius,
            direction: Direction::Bottom,
            hp: Hp::new(health),
            inventory: Inventory::new(cfg::MAX_INVENTORY_SIZE),
            equipment: Equipment::default(),
        }
    }

    pub fn damage(&self) -> f64 {
        self.basic_damage + self.equipment.weapon_damage()
    }

    pub fn armor(&self) -> f64 {
        self.basic_armor + self.equipment.armor_value()
    }

    pub fn damage_radius(&self) -> f64 {
        self.basic_damage_radius + self.equipment.weapon_radius()
    }

    pub fn move_box(&self) -> Rect {
        self.sprite.move_box()
    }

    /// Bounding box inflated by the total damage radius, used to test
    /// melee reach.
    pub fn attack_box(&self) -> Rect {
        self.sprite.collision_box().inflate(self.damage_radius())
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AiState {
    Wandering,
    Pursuing,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Monster {
    pub sprite: Sprite,
    pub name: String,
    pub damage: f64,
    pub damage_radius: f64,
    pub viewing_radius: f64,
    pub health: f64,
    pub ai: AiState,
    pub direction_sequence: [Direction; 4],
    pub current_direction: usize,
    pub waiting_timer: f64,
    pub moving_timer: f64,
}

impl Monster {
    pub fn new(
        name: String,
        health: f64,
        damage: f64,
        damage_radius: f64,
        viewing_radius: f64,
        speed: f64,
        attack_speed: f64,
        width: f64,
        height: f64,
    ) -> Self {
        let mut rng = rand::thread_rng();
        let mut sequence = [
            Direction::Top,
            Direction::Right,
            Direction::Bottom,
            Direction::Left,
        ];
        sequence.shuffle(&mut rng);
        Monster {
            sprite: Sprite::new(width, height, speed, attack_speed),
            name,
            damage,
            damage_radius,
            viewing_radius,
            health,
            ai: AiState::Wandering,
            direction_sequence: sequence,
            current_direction: 0,
            waiting_timer: rng.gen_range(0.0, cfg::RANDOM_WAITING_TIME_MAX),
            moving_timer: cfg::RESET_MOVING_TIME,
        }
    }

    pub fn damage_box(&self) -> Rect {
        self.sprite.collision_box().inflate(self.damage_radius)
    }

    pub fn viewing_box(&self) -> Rect {
        self.sprite.collision_box().inflate(self.viewing_radius)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Portal {
    pub sprite: Sprite,
    pub portal_id: i32,
    pub target_location: i32,
    pub target_tile_x: i32,
    pub target_tile_y: i32,
}

/// An item lying on the ground of a location.
#[derive(Clone, Debug, PartialEq)]
pub struct GroundItem {
    pub sprite: Sprite,
    pub item: Item,
}

/// Key into a location's entity collections; the depth-sorted draw
/// order is a list of these.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EntityKey {
    Player,
    Monster(u32),
    Item(u32),
    Portal(u32),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AppState {
    MainMenu,
    GameMenu,
    Game,
    Inventory,
    GameOver,
}

impl Default for AppState {
    fn default() -> Self {
        AppState::MainMenu
    }
}

/// Raw key as delivered by the host frontend, before binding resolution.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RawKey {
    Char(char),
    Enter,
    Escape,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputEvent {
    Pressed(RawKey),
    Released(RawKey),
}

/// Resolved logical key per the bindings table.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Attack,
    Inventory,
    Equip,
    UseItem,
    Drop,
    Confirm,
    Cancel,
}

#[derive(Clone, Debug, Default)]
pub struct InputState {
    pub held: Vec<Key>,
    pub pressed: Vec<Key>,
}

impl InputState {
    pub fn is_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    pub fn was_pressed(&self, key: Key) -> bool {
        self.pressed.contains(&key)
    }
}

/// Change notifications emitted by simulation mutations and drained to
/// the frontend with every frame.
#[derive(Clone, Debug, PartialEq)]
pub enum ChangeEvent {
    HealthChanged { current: f64, initial: f64 },
    InventoryChanged { quantity: usize, capacity: usize },
    EquipmentChanged,
    ItemPickedUp { name: String },
    ItemDropped { name: String },
    MonsterDied { name: String },
    PlayerDied,
    LocationChanged { location_id: i32, name: String },
    GameSaved,
}

/// Cursor state of one menu-like scene.
#[derive(Clone, Copy, Debug, Default)]
pub struct MenuState {
    pub cursor: usize,
}

impl MenuState {
    pub fn move_cursor(&mut self, input: &InputState, option_count: usize) {
        if option_count == 0 {
            return;
        }
        if input.was_pressed(Key::Up) && (self.cursor > 0) {
            self.cursor -= 1;
        }
        if input.was_pressed(Key::Down) && (self.cursor < option_count - 1) {
            self.cursor += 1;
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SpriteKind {
    Player,
    Monster,
    Item,
    Portal,
}

#[derive(Clone, Debug)]
pub struct SpriteDraw {
    pub kind: SpriteKind,
    pub label: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Clone, Debug)]
pub struct LocationFrame {
    pub name: String,
    pub player_health: (f64, f64),
    /// Depth-sorted by ascending Y, painter's order.
    pub sprites: Vec<SpriteDraw>,
}

#[derive(Clone, Debug)]
pub struct MenuFrame {
    pub title: String,
    pub options: Vec<String>,
    pub cursor: usize,
}

/// Everything a frontend needs to draw one tick.
#[derive(Clone, Debug)]
pub struct Frame {
    pub state: AppState,
    pub location: Option<LocationFrame>,
    pub menu: Option<MenuFrame>,
    pub events: Vec<ChangeEvent>,
}

#[cfg(test)]
mod rect_tests {
    use super::*;

    #[test]
    fn overlapping_boxes_intersect() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 5.0, 10.0, 10.0);
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
    }

    #[test]
    fn touching_edges_do_not_intersect() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(10.0, 0.0, 10.0, 10.0);
        assert!(!a.intersects(&b));
        let below = Rect::new(0.0, 10.0, 10.0, 10.0);
        assert!(!a.intersects(&below));
    }

    #[test]
    fn disjoint_boxes_do_not_intersect() {
        let a = Rect::new(0.0, 0.0, 4.0, 4.0);
        let b = Rect::new(100.0, 100.0, 4.0, 4.0);
        assert!(!a.intersects(&b));
    }

    #[test]
    fn inflate_grows_every_side() {
        let inflated = Rect::new(10.0, 10.0, 4.0, 4.0).inflate(3.0);
        assert_eq!(inflated, Rect::new(7.0, 7.0, 10.0, 10.0));
    }
}



#[cfg(test)]
mod inventory_tests {
    use super::*;

    fn bottle(instance: u32) -> Item {
        Item {
            id: 5,
            instance,
            name: String::from("Health Bottle"),
            kind: ItemKind::HealthBottle { health: 40.0 },
        }
    }

    #[test]
    fn add_to_full_inventory_fails_without_mutation() {
        let mut inventory = Inventory::new(2);
        assert!(inventory.add(bottle(1)));
        assert!(inventory.add(bottle(2)));
        assert!(!inventory.add(bottle(3)));
        assert_eq!(inventory.quantity(), 2);
    }

    #[test]
    fn the_same_copy_is_rejected() {
        let mut inventory = Inventory::new(4);
        assert!(inventory.add(bottle(1)));
        assert!(!inventory.add(bottle(1)));
        assert_eq!(inventory.quantity(), 1);
    }

    #[test]
    fn two_copies_of_one_template_coexist() {
        let mut inventory = Inventory::new(4);
        assert!(inventory.add(bottle(1)));
        assert!(inventory.add(bottle(2)));
        assert_eq!(inventory.quantity(), 2);
        assert_eq!(inventory.items()[0].id, inventory.items()[1].id);
    }

    #[test]
    fn remove_absent_item_fails() {
        let mut inventory = Inventory::new(4);
        assert!(inventory.remove(7).is_none());
        inventory.add(bottle(7));
        assert!(inventory.remove(7).is_some());
        assert!(!inventory.contains(7));
    }

    #[test]
    fn size_never_exceeds_capacity() {
        let mut inventory = Inventory::new(3);
        for id in 0..10 {
            inventory.add(bottle(id));
            assert!(inventory.quantity() <= inventory.capacity());
        }
    }
}

#[cfg(test)]
mod equipment_tests {
    use super::*;

    fn weapon(instance: u32, damage: f64) -> Item {
        Item {
            id: 1,
            instance,
            name: format!("Sword {}", instance),
            kind: ItemKind::Weapon {
                damage,
                radius: 10.0,
            },
        }
    }

    fn armor(instance: u32, value: f64) -> Item {
        Item {
            id: 3,
            instance,
            name: format!("Armor {}", instance),
            kind: ItemKind::Armor { armor: value },
        }
    }

    #[test]
    fn equip_unequip_round_trip() {
        let mut equipment = Equipment::default();
        let mut inventory = Inventory::new(4);
        inventory.add(weapon(1, 15.0));
        assert!(equipment.equip(1, &mut inventory));
        assert!(!inventory.contains(1));
        assert_eq!(equipment.weapon_damage(), 15.0);
        assert!(equipment.unequip(1, &mut inventory));
        assert!(equipment.weapon.is_none());
        assert!(inventory.contains(1));
    }

    #[test]
    fn equipping_second_weapon_returns_first_to_inventory() {
        let mut equipment = Equipment::default();
        let mut inventory = Inventory::new(4);
        inventory.add(weapon(1, 15.0));
        inventory.add(weapon(2, 25.0));
        equipment.equip(1, &mut inventory);
        equipment.equip(2, &mut inventory);
        assert_eq!(equipment.weapon_damage(), 25.0);
        assert!(inventory.contains(1));
        assert!(!inventory.contains(2));
    }

    #[test]
    fn swap_works_even_when_inventory_was_full() {
        let mut equipment = Equipment::default();
        let mut inventory = Inventory::new(1);
        inventory.add(weapon(1, 15.0));
        equipment.equip(1, &mut inventory);
        inventory.add(weapon(2, 25.0));
        assert!(inventory.is_full());
        // removing the new weapon frees the spot the old one needs
        assert!(equipment.equip(2, &mut inventory));
        assert!(inventory.contains(1));
    }

    #[test]
    fn unequip_fails_when_inventory_is_full() {
        let mut equipment = Equipment::default();
        let mut inventory = Inventory::new(1);
        inventory.add(weapon(1, 15.0));
        equipment.equip(1, &mut inventory);
        inventory.add(armor(2, 20.0));
        assert!(inventory.is_full());
        assert!(!equipment.unequip(1, &mut inventory));
        assert!(equipment.weapon.is_some());
    }

    #[test]
    fn weapon_and_armor_use_separate_slots() {
        let mut equipment = Equipment::default();
        let mut inventory = Inventory::new(4);
        inventory.add(weapon(1, 15.0));
        inventory.add(armor(2, 20.0));
        equipment.equip(1, &mut inventory);
        equipment.equip(2, &mut inventory);
        assert_eq!(equipment.weapon_damage(), 15.0);
        assert_eq!(equipment.armor_value(), 20.0);
    }

    #[test]
    fn bottle_cannot_be_equipped() {
        let mut equipment = Equipment::default();
        let mut inventory = Inventory::new(4);
        inventory.add(Item {
            id: 5,
            instance: 9,
            name: String::from("Health Bottle"),
            kind: ItemKind::HealthBottle { health: 40.0 },
        });
        assert!(!equipment.equip(9, &mut inventory));
        assert!(inventory.contains(9));
    }
}


#[cfg(test)]
mod sprite_tests {
    use super::*;

    #[test]
    fn first_attack_is_never_gated() {
        let mut sprite = Sprite::new(48.0, 48.0, 100.0, 0.3);
        assert!(sprite.try_attack(0.0));
    }

    #[test]
    fn attack_within_cooldown_fails_and_keeps_timer() {
        let mut sprite = Sprite::new(48.0, 48.0, 100.0, 0.3);
        assert!(sprite.try_attack(1.0));
        assert!(!sprite.try_attack(1.2));
        assert_eq!(sprite.last_attack, 1.0);
        assert!(sprite.try_attack(1.3));
    }
}
