use crate::cmtp::{AppState, ChangeEvent, GroundItem, Key, Player, Sprite};
use crate::game::{self, World};

/// One row of the inventory screen. Equipped items list first; rows are
/// keyed by the item copy, not its template.
pub struct Entry {
    pub instance: u32,
    pub equipped: bool,
    pub label: String,
}

pub fn listing(player: &Player) -> Vec<Entry> {
    let mut entries = Vec::new();
    for item in player.equipment.weapon.iter().chain(player.equipment.armor.iter()) {
        entries.push(Entry {
            instance: item.instance,
            equipped: true,
            label: format!("{} [equipped]", item.name),
        });
    }
    for item in player.inventory.items() {
        entries.push(Entry {
            instance: item.instance,
            equipped: false,
            label: item.name.clone(),
        });
    }
    entries
}

/// The inventory scene: cursor over equipped-then-bagged rows, with
/// equip/use/drop acting on the focused row.
pub fn update(world: &mut World) {
    if world.app_state != AppState::Inventory {
        return;
    }
    if world.input.was_pressed(Key::Inventory) {
        world.app_state = AppState::Game;
        return;
    }
    if world.input.was_pressed(Key::Cancel) {
        game::end_session(world);
        world.app_state = AppState::MainMenu;
        world.main_menu.cursor = 0;
        return;
    }
    let entries = match world.player.as_ref() {
        Some(player) => listing(player),
        None => return,
    };
    if world.inventory_menu.cursor >= entries.len() && !entries.is_empty() {
        world.inventory_menu.cursor = entries.len() - 1;
    }
    world.inventory_menu.move_cursor(&world.input, entries.len());
    let focused = match entries.get(world.inventory_menu.cursor) {
        Some(entry) => entry,
        None => return,
    };
    if world.input.was_pressed(Key::Equip) {
        toggle_equip(world, focused.instance, focused.equipped);
    } else if world.input.was_pressed(Key::UseItem) && !focused.equipped {
        let world = &mut *world;
        if let Some(player) = world.player.as_mut() {
            game::use_item(player, focused.instance, &mut world.events);
        }
    } else if world.input.was_pressed(Key::Drop) && !focused.equipped {
        drop_item(world, focused.instance);
    }
}

fn toggle_equip(world: &mut World, instance: u32, equipped: bool) {
    let world = &mut *world;
    let player = match world.player.as_mut() {
        Some(player) => player,
        None => return,
    };
    let changed = if equipped {
        player.equipment.unequip(instance, &mut player.inventory)
    } else {
        player.equipment.equip(instance, &mut player.inventory)
    };
    if changed {
        world.events.push(ChangeEvent::EquipmentChanged);
        world.events.push(ChangeEvent::InventoryChanged {
            quantity: player.inventory.quantity(),
            capacity: player.inventory.capacity(),
        });
    }
}

/// The dropped item lands at the player's feet in the current location.
fn drop_item(world: &mut World, instance: u32) {
    let world = &mut *world;
    let player = match world.player.as_mut() {
        Some(player) => player,
        None => return,
    };
    let location = match world.locations.get_mut(&world.current_location) {
        Some(location) => location,
        None => return,
    };
    let item = match player.inventory.remove(instance) {
        Some(item) => item,
        None => return,
    };
    let name = item.name.clone();
    let (width, height) = world.assets.items.sprite_size(item.id).unwrap_or((32.0, 32.0));
    let mut sprite = Sprite::new(width, height, 0.0, 0.0);
    sprite.set_position(player.sprite.x, player.sprite.y);
    location.add_item(GroundItem { sprite, item });
    world.events.push(ChangeEvent::ItemDropped { name });
    world.events.push(ChangeEvent::InventoryChanged {
        quantity: player.inventory.quantity(),
        capacity: player.inventory.capacity(),
    });
}
