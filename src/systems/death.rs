use crate::cmtp::AppState;
use crate::game::World;

/// Sweeps dead monsters out of the directory and ends the run when the
/// player's health pool is depleted.
pub fn update(world: &mut World) {
    if world.app_state != AppState::Game {
        return;
    }
    let world = &mut *world;
    if let Some(location) = world.locations.get_mut(&world.current_location) {
        let dead: Vec<u32> = location
            .monsters
            .iter()
            .filter(|(_, monster)| monster.sprite.dead)
            .map(|(id, _)| *id)
            .collect();
        for id in dead {
            location.remove_monster(id);
        }
    }
    if let Some(player) = world.player.as_mut() {
        if player.hp.is_depleted() {
            player.sprite.dead = true;
            world.app_state = AppState::GameOver;
            world.game_over_menu.cursor = 0;
            world.input.held.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmtp::EntityKey;
    use crate::game::test_support::*;

    #[test]
    fn dead_monsters_leave_the_directory() {
        let mut world = world_with_open_location(4, 4);
        world.app_state = AppState::Game;
        world.player = Some(plain_player());
        let mut monster = plain_monster(10.0, 1.0);
        monster.sprite.dead = true;
        let id = world.location_mut().unwrap().add_monster(monster);
        update(&mut world);
        let location = world.location().unwrap();
        assert!(location.monsters.get(&id).is_none());
        assert!(!location.draw_order.contains(&EntityKey::Monster(id)));
    }

    #[test]
    fn depleted_player_ends_the_run() {
        let mut world = world_with_open_location(4, 4);
        world.app_state = AppState::Game;
        let mut player = plain_player();
        player.hp.reduce(1000.0);
        world.player = Some(player);
        update(&mut world);
        assert_eq!(world.app_state, AppState::GameOver);
        assert!(world.player.as_ref().unwrap().sprite.dead);
    }

    #[test]
    fn healthy_player_keeps_playing() {
        let mut world = world_with_open_location(4, 4);
        world.app_state = AppState::Game;
        world.player = Some(plain_player());
        update(&mut world);
        assert_eq!(world.app_state, AppState::Game);
    }
}
