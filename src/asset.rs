use crate::cmtp::{GroundItem, Item, ItemKind, Key, Monster, Portal, RawKey, Tile, TileMap};
use crate::game::Location;
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {reason}")]
    Parse { path: String, reason: String },
    #[error("unknown item template id {0}")]
    UnknownItem(i32),
    #[error("unknown monster template id {0}")]
    UnknownMonster(i32),
    #[error("unknown tile symbol {0:?}")]
    UnknownTile(char),
    #[error("bad binding for {action:?}: {value:?}")]
    BadBinding { action: String, value: String },
}

fn read_file(path: &str) -> Result<String, AssetError> {
    fs::read_to_string(path).map_err(|source| AssetError::Io {
        path: path.to_string(),
        source,
    })
}

fn parse_toml<T: serde::de::DeserializeOwned>(path: &str) -> Result<T, AssetError> {
    toml::from_str(&read_file(path)?).map_err(|err| AssetError::Parse {
        path: path.to_string(),
        reason: err.to_string(),
    })
}

/// Table keys in the template files are numeric ids written as strings.
fn parse_id(path: &str, key: &str) -> Result<i32, AssetError> {
    key.parse().map_err(|_| AssetError::Parse {
        path: path.to_string(),
        reason: format!("non-numeric template id {:?}", key),
    })
}

#[derive(Debug, Deserialize)]
struct RawGameConfig {
    window_name: String,
    bindings: BTreeMap<String, String>,
}

/// Window metadata plus the key-binding table resolved to logical keys.
/// Enter and Escape are fixed to Confirm and Cancel.
#[derive(Debug)]
pub struct GameConfig {
    pub window_name: String,
    bindings: Vec<(char, Key)>,
}

impl GameConfig {
    fn from_raw(path: &str, raw: RawGameConfig) -> Result<Self, AssetError> {
        let mut bindings = Vec::new();
        for (action, value) in &raw.bindings {
            let key = match action.as_str() {
                "up" => Key::Up,
                "down" => Key::Down,
                "left" => Key::Left,
                "right" => Key::Right,
                "attack" => Key::Attack,
                "inventory" => Key::Inventory,
                "equip" => Key::Equip,
                "use_item" => Key::UseItem,
                "drop" => Key::Drop,
                _ => {
                    return Err(AssetError::Parse {
                        path: path.to_string(),
                        reason: format!("unknown binding action {:?}", action),
                    })
                }
            };
            let mut chars = value.chars();
            let symbol = match (chars.next(), chars.next()) {
                (Some(symbol), None) => symbol,
                _ => {
                    return Err(AssetError::BadBinding {
                        action: action.clone(),
                        value: value.clone(),
                    })
                }
            };
            bindings.push((symbol, key));
        }
        Ok(GameConfig {
            window_name: raw.window_name,
            bindings,
        })
    }

    pub fn resolve(&self, raw: RawKey) -> Option<Key> {
        match raw {
            RawKey::Enter => Some(Key::Confirm),
            RawKey::Escape => Some(Key::Cancel),
            RawKey::Char(symbol) => self
                .bindings
                .iter()
                .find(|(bound, _)| *bound == symbol)
                .map(|(_, key)| *key),
        }
    }

    pub fn empty() -> Self {
        GameConfig {
            window_name: String::new(),
            bindings: Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawItemTemplate {
    name: String,
    kind: String,
    #[serde(default)]
    damage: f64,
    #[serde(default)]
    radius: f64,
    #[serde(default)]
    armor: f64,
    #[serde(default)]
    health: f64,
    width: f64,
    height: f64,
}

#[derive(Debug)]
struct ItemTemplate {
    name: String,
    kind: ItemKind,
    width: f64,
    height: f64,
}

/// Id-keyed item templates, validated up front so a bad file fails at
/// load time instead of mid-session. Every built item gets a fresh
/// instance id, so copies of one template stay distinguishable.
#[derive(Debug)]
pub struct ItemCatalog {
    templates: BTreeMap<i32, ItemTemplate>,
    instances: Cell<u32>,
}

impl ItemCatalog {
    fn load(path: &str) -> Result<Self, AssetError> {
        let raw: BTreeMap<String, RawItemTemplate> = parse_toml(path)?;
        let mut templates = BTreeMap::new();
        for (key, raw) in raw {
            let id = parse_id(path, &key)?;
            let kind = match raw.kind.as_str() {
                "weapon" => ItemKind::Weapon {
                    damage: raw.damage,
                    radius: raw.radius,
                },
                "armor" => ItemKind::Armor { armor: raw.armor },
                "health_bottle" => ItemKind::HealthBottle {
                    health: raw.health,
                },
                other => {
                    return Err(AssetError::Parse {
                        path: path.to_string(),
                        reason: format!("unknown item kind {:?}", other),
                    })
                }
            };
            templates.insert(
                id,
                ItemTemplate {
                    name: raw.name,
                    kind,
                    width: raw.width,
                    height: raw.height,
                },
            );
        }
        Ok(ItemCatalog {
            templates,
            instances: Cell::new(0),
        })
    }

    pub fn build(&self, id: i32) -> Result<Item, AssetError> {
        let template = self.templates.get(&id).ok_or(AssetError::UnknownItem(id))?;
        let instance = self.instances.get() + 1;
        self.instances.set(instance);
        Ok(Item {
            id,
            instance,
            name: template.name.clone(),
            kind: template.kind,
        })
    }

    pub fn sprite_size(&self, id: i32) -> Result<(f64, f64), AssetError> {
        let template = self.templates.get(&id).ok_or(AssetError::UnknownItem(id))?;
        Ok((template.width, template.height))
    }

    pub fn empty() -> Self {
        ItemCatalog {
            templates: BTreeMap::new(),
            instances: Cell::new(0),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawMonsterTemplate {
    name: String,
    health: f64,
    damage: f64,
    damage_radius: f64,
    viewing_radius: f64,
    speed: f64,
    attack_speed: f64,
    width: f64,
    height: f64,
}

#[derive(Debug)]
pub struct MonsterCatalog {
    templates: BTreeMap<i32, RawMonsterTemplate>,
}

impl MonsterCatalog {
    fn load(path: &str) -> Result<Self, AssetError> {
        let raw: BTreeMap<String, RawMonsterTemplate> = parse_toml(path)?;
        let mut templates = BTreeMap::new();
        for (key, template) in raw {
            templates.insert(parse_id(path, &key)?, template);
        }
        Ok(MonsterCatalog { templates })
    }

    /// New monster from a template, with its own shuffled wander cycle.
    pub fn spawn(&self, id: i32) -> Result<Monster, AssetError> {
        let t = self
            .templates
            .get(&id)
            .ok_or(AssetError::UnknownMonster(id))?;
        Ok(Monster::new(
            t.name.clone(),
            t.health,
            t.damage,
            t.damage_radius,
            t.viewing_radius,
            t.speed,
            t.attack_speed,
            t.width,
            t.height,
        ))
    }

    pub fn empty() -> Self {
        MonsterCatalog {
            templates: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawTilePalette {
    symbols: BTreeMap<String, bool>,
}

/// Maps map-file symbols to tiles.
#[derive(Debug)]
pub struct TilePalette {
    symbols: BTreeMap<char, bool>,
}

impl TilePalette {
    fn load(path: &str) -> Result<Self, AssetError> {
        let raw: RawTilePalette = parse_toml(path)?;
        let mut symbols = BTreeMap::new();
        for (key, passable) in raw.symbols {
            let mut chars = key.chars();
            match (chars.next(), chars.next()) {
                (Some(symbol), None) => {
                    symbols.insert(symbol, passable);
                }
                _ => {
                    return Err(AssetError::Parse {
                        path: path.to_string(),
                        reason: format!("tile symbol must be one character, got {:?}", key),
                    })
                }
            }
        }
        Ok(TilePalette { symbols })
    }

    pub fn tile(&self, symbol: char) -> Result<Tile, AssetError> {
        let passable = *self
            .symbols
            .get(&symbol)
            .ok_or(AssetError::UnknownTile(symbol))?;
        Ok(Tile { symbol, passable })
    }

    pub fn empty() -> Self {
        TilePalette {
            symbols: BTreeMap::new(),
        }
    }
}

/// Everything loaded once at startup.
#[derive(Debug)]
pub struct Assets {
    pub config: GameConfig,
    pub items: ItemCatalog,
    pub monsters: MonsterCatalog,
    pub tiles: TilePalette,
}

impl Assets {
    pub fn load(dir: &str) -> Result<Self, AssetError> {
        let config_path = format!("{}/config.toml", dir);
        let raw_config: RawGameConfig = parse_toml(&config_path)?;
        Ok(Assets {
            config: GameConfig::from_raw(&config_path, raw_config)?,
            items: ItemCatalog::load(&format!("{}/items.toml", dir))?,
            monsters: MonsterCatalog::load(&format!("{}/monsters.toml", dir))?,
            tiles: TilePalette::load(&format!("{}/tiles.toml", dir))?,
        })
    }

    pub fn empty() -> Self {
        Assets {
            config: GameConfig::empty(),
            items: ItemCatalog::empty(),
            monsters: MonsterCatalog::empty(),
            tiles: TilePalette::empty(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawSpawn {
    template: i32,
    x: i32,
    y: i32,
}

#[derive(Debug, Deserialize)]
struct RawPortal {
    id: i32,
    x: i32,
    y: i32,
    width: f64,
    height: f64,
    target_location: i32,
    target_x: i32,
    target_y: i32,
}

#[derive(Debug, Deserialize)]
struct RawLocation {
    name: String,
    #[serde(default)]
    monsters: Vec<RawSpawn>,
    #[serde(default)]
    items: Vec<RawSpawn>,
    #[serde(default)]
    portals: Vec<RawPortal>,
}

fn parse_tile_map(text: &str, palette: &TilePalette) -> Result<TileMap, AssetError> {
    let lines: Vec<&str> = text.lines().collect();
    let height = lines.len() as i32;
    let width = lines.iter().map(|line| line.chars().count()).max().unwrap_or(0) as i32;
    let mut map = TileMap::new(width, height);
    for (y, line) in lines.iter().enumerate() {
        for (x, symbol) in line.chars().enumerate() {
            // short lines stay padded with the blocked sentinel
            map.set_tile(x as i32, y as i32, palette.tile(symbol)?);
        }
    }
    Ok(map)
}

/// Loads one location: its map grid plus the monster, item and portal
/// populations named in the descriptor. Unknown template ids fail here,
/// before the location ever becomes playable.
pub fn load_location(dir: &str, id: i32, assets: &Assets) -> Result<Location, AssetError> {
    let descriptor_path = format!("{}/locations/{}.toml", dir, id);
    let raw: RawLocation = parse_toml(&descriptor_path)?;
    let map_path = format!("{}/locations/{}.map", dir, id);
    let tile_map = parse_tile_map(&read_file(&map_path)?, &assets.tiles)?;
    let mut location = Location::new(id, raw.name, tile_map);
    for spawn in &raw.monsters {
        let mut monster = assets.monsters.spawn(spawn.template)?;
        monster.sprite.set_position(
            TileMap::tile_to_pixel(spawn.x),
            TileMap::tile_to_pixel(spawn.y),
        );
        location.add_monster(monster);
    }
    for spawn in &raw.items {
        let item = assets.items.build(spawn.template)?;
        let (width, height) = assets.items.sprite_size(spawn.template)?;
        let mut sprite = crate::cmtp::Sprite::new(width, height, 0.0, 0.0);
        sprite.set_position(
            TileMap::tile_to_pixel(spawn.x),
            TileMap::tile_to_pixel(spawn.y),
        );
        location.add_item(GroundItem { sprite, item });
    }
    for raw_portal in &raw.portals {
        let mut sprite = crate::cmtp::Sprite::new(raw_portal.width, raw_portal.height, 0.0, 0.0);
        sprite.set_position(
            TileMap::tile_to_pixel(raw_portal.x),
            TileMap::tile_to_pixel(raw_portal.y),
        );
        location.add_portal(Portal {
            sprite,
            portal_id: raw_portal.id,
            target_location: raw_portal.target_location,
            target_tile_x: raw_portal.target_x,
            target_tile_y: raw_portal.target_y,
        });
    }
    Ok(location)
}

/// On-disk snapshot of the player. Field names stay camelCase for
/// compatibility with older save files.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRecord {
    pub name: String,
    pub initial_health: f64,
    pub health: f64,
    pub damage: f64,
    pub armor: f64,
    pub damage_radius: f64,
    pub location_id: i32,
    pub position_x: i32,
    pub position_y: i32,
    /// `-1` marks an empty slot.
    pub equipped_weapon_id: i32,
    pub equipped_armor_id: i32,
    pub inventory: Vec<i32>,
}

pub fn load_player_record(path: &str) -> Result<PlayerRecord, AssetError> {
    serde_json::from_str(&read_file(path)?).map_err(|err| AssetError::Parse {
        path: path.to_string(),
        reason: err.to_string(),
    })
}

pub fn save_player_record(path: &str, record: &PlayerRecord) -> Result<(), AssetError> {
    let into_io = |source| AssetError::Io {
        path: path.to_string(),
        source,
    };
    if let Some(parent) = Path::new(path).parent() {
        fs::create_dir_all(parent).map_err(into_io)?;
    }
    let json = serde_json::to_string_pretty(record).map_err(|err| AssetError::Parse {
        path: path.to_string(),
        reason: err.to_string(),
    })?;
    fs::write(path, json).map_err(into_io)
}

pub fn has_save(path: &str) -> bool {
    Path::new(path).exists()
}
