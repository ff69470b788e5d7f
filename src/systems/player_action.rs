use crate::cmtp::{AppState, Key};
use crate::game::{self, World};

/// Handles the player's one-shot actions while the Game scene runs:
/// pausing, opening the inventory, and swinging at monsters in reach.
pub fn update(world: &mut World) {
    if world.app_state != AppState::Game {
        return;
    }
    if world.input.was_pressed(Key::Cancel) {
        world.app_state = AppState::GameMenu;
        world.game_menu.cursor = 0;
        world.input.held.clear();
        return;
    }
    if world.input.was_pressed(Key::Inventory) {
        world.app_state = AppState::Inventory;
        world.inventory_menu.cursor = 0;
        world.input.held.clear();
        return;
    }
    if !world.input.was_pressed(Key::Attack) {
        return;
    }
    let world = &mut *world;
    let player = match world.player.as_mut() {
        Some(player) => player,
        None => return,
    };
    let location = match world.locations.get_mut(&world.current_location) {
        Some(location) => location,
        None => return,
    };
    let reach = player.attack_box();
    for monster in location.monsters.values_mut() {
        if monster.sprite.dead || !monster.sprite.collision_box().intersects(&reach) {
            continue;
        }
        game::attack_monster(player, monster, world.clock, &mut world.events);
        break;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::test_support::*;

    fn game_world_with_player() -> World {
        let mut world = world_with_open_location(8, 8);
        world.app_state = AppState::Game;
        let mut player = plain_player();
        player.sprite.set_position(100.0, 100.0);
        world.player = Some(player);
        world
    }

    #[test]
    fn attack_hits_a_monster_in_reach() {
        let mut world = game_world_with_player();
        let mut monster = plain_monster(100.0, 0.0);
        monster.sprite.set_position(150.0, 100.0);
        let id = world.location_mut().unwrap().add_monster(monster);
        world.input.pressed.push(Key::Attack);
        update(&mut world);
        assert_eq!(world.location().unwrap().monsters[&id].health, 80.0);
    }

    #[test]
    fn attack_misses_a_monster_out_of_reach() {
        let mut world = game_world_with_player();
        let mut monster = plain_monster(100.0, 0.0);
        monster.sprite.set_position(400.0, 400.0);
        let id = world.location_mut().unwrap().add_monster(monster);
        world.input.pressed.push(Key::Attack);
        update(&mut world);
        assert_eq!(world.location().unwrap().monsters[&id].health, 100.0);
    }

    #[test]
    fn pause_key_opens_the_game_menu_and_clears_held_keys() {
        let mut world = game_world_with_player();
        world.input.held.push(Key::Right);
        world.input.pressed.push(Key::Cancel);
        update(&mut world);
        assert_eq!(world.app_state, AppState::GameMenu);
        assert!(world.input.held.is_empty());
    }

    #[test]
    fn inventory_key_opens_the_inventory_scene() {
        let mut world = game_world_with_player();
        world.input.pressed.push(Key::Inventory);
        update(&mut world);
        assert_eq!(world.app_state, AppState::Inventory);
    }
}
