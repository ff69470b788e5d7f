use crate::cmtp::{AiState, AppState, ChangeEvent, TileMap};
use crate::game::{self, World};

/// Resolves entity intersections after movement: item pickup, monster
/// aggro activation, then portal activation.
pub fn update(world: &mut World) {
    if world.app_state != AppState::Game {
        return;
    }
    if world.player.is_none() {
        return;
    }
    pick_up_items(world);
    activate_aggro(world);
    activate_portal(world);
}

fn pick_up_items(world: &mut World) {
    let world = &mut *world;
    let player = match world.player.as_mut() {
        Some(player) => player,
        None => return,
    };
    let location = match world.locations.get_mut(&world.current_location) {
        Some(location) => location,
        None => return,
    };
    let feet = player.move_box();
    let touched: Vec<u32> = location
        .items
        .iter()
        .filter(|(_, ground)| ground.sprite.collision_box().intersects(&feet))
        .map(|(id, _)| *id)
        .collect();
    for id in touched {
        let item = match location.items.get(&id) {
            Some(ground) => ground.item.clone(),
            None => continue,
        };
        let name = item.name.clone();
        // a full inventory leaves the item on the ground, no error
        if !player.inventory.add(item) {
            log::debug!("inventory full, {} stays on the ground", name);
            continue;
        }
        location.remove_item(id);
        world.events.push(ChangeEvent::ItemPickedUp { name });
        world.events.push(ChangeEvent::InventoryChanged {
            quantity: player.inventory.quantity(),
            capacity: player.inventory.capacity(),
        });
    }
}

fn activate_aggro(world: &mut World) {
    let world = &mut *world;
    let player = match world.player.as_ref() {
        Some(player) => player,
        None => return,
    };
    let location = match world.locations.get_mut(&world.current_location) {
        Some(location) => location,
        None => return,
    };
    let player_box = player.sprite.collision_box();
    for monster in location.monsters.values_mut() {
        if monster.sprite.dead || (monster.ai == AiState::Pursuing) {
            continue;
        }
        if monster.viewing_box().intersects(&player_box) {
            monster.ai = AiState::Pursuing;
        }
    }
}

fn activate_portal(world: &mut World) {
    let target = {
        let player = match world.player.as_ref() {
            Some(player) => player,
            None => return,
        };
        let location = match world.locations.get(&world.current_location) {
            Some(location) => location,
            None => return,
        };
        let feet = player.move_box();
        location
            .portals
            .values()
            .find(|portal| portal.sprite.collision_box().intersects(&feet))
            .map(|portal| {
                (
                    portal.target_location,
                    portal.target_tile_x,
                    portal.target_tile_y,
                )
            })
    };
    let (location_id, tile_x, tile_y) = match target {
        Some(target) => target,
        None => return,
    };
    if let Err(err) = game::set_location(world, location_id) {
        log::error!("portal to location {} failed: {}", location_id, err);
        world.must_exit = true;
        return;
    }
    if let Some(player) = world.player.as_mut() {
        player.sprite.set_position(
            TileMap::tile_to_pixel(tile_x),
            TileMap::tile_to_pixel(tile_y),
        );
    }
    // the location changed under us; let the next tick see a clean state
}
