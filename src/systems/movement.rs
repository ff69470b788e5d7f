use crate::cmtp::{AppState, Direction, Key, Sprite, TileMap};
use crate::game::World;

/// Moves a sprite one step along an axis if the step stays inside the
/// map bounds and both leading move-box corners land on passable tiles.
pub fn step_sprite(sprite: &mut Sprite, map: &TileMap, direction: Direction, step: f64) -> bool {
    let feet = sprite.move_box();
    let passable =
        |x: f64, y: f64| map.tile(TileMap::pixel_to_tile(x), TileMap::pixel_to_tile(y)).passable;
    let clear = match direction {
        Direction::Top => {
            let edge = feet.y - step;
            (edge > 0.0) && passable(feet.x, edge) && passable(feet.max_x(), edge)
        }
        Direction::Bottom => {
            let edge = feet.max_y() + step;
            (edge < map.map_height()) && passable(feet.x, edge) && passable(feet.max_x(), edge)
        }
        Direction::Left => {
            let edge = feet.x - step;
            (edge > 0.0) && passable(edge, feet.y) && passable(edge, feet.max_y())
        }
        Direction::Right => {
            let edge = feet.max_x() + step;
            (edge < map.map_width()) && passable(edge, feet.y) && passable(edge, feet.max_y())
        }
    };
    if clear {
        match direction {
            Direction::Top => sprite.y -= step,
            Direction::Bottom => sprite.y += step,
            Direction::Left => sprite.x -= step,
            Direction::Right => sprite.x += step,
        }
    }
    clear
}

/// Movement covers whole pixels; fractional remainders are dropped.
pub fn step_size(speed: f64, delta: f64) -> f64 {
    (speed * delta) as i32 as f64
}

/// Resolves held movement keys against the current map. Axes resolve
/// independently, so diagonal movement slides along walls.
pub fn update(world: &mut World) {
    if world.app_state != AppState::Game {
        return;
    }
    let world = &mut *world;
    let player = match world.player.as_mut() {
        Some(player) => player,
        None => return,
    };
    let map = match world.locations.get(&world.current_location) {
        Some(location) => &location.tile_map,
        None => return,
    };
    let step = step_size(player.sprite.speed, world.delta);
    if step <= 0.0 {
        return;
    }
    let bindings = [
        (Key::Up, Direction::Top),
        (Key::Down, Direction::Bottom),
        (Key::Left, Direction::Left),
        (Key::Right, Direction::Right),
    ];
    for (key, direction) in &bindings {
        if world.input.is_held(*key) && step_sprite(&mut player.sprite, map, *direction, step) {
            player.direction = *direction;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cfg;
    use crate::cmtp::Tile;
    use crate::game::test_support::*;

    fn wall() -> Tile {
        Tile {
            symbol: '#',
            passable: false,
        }
    }

    #[test]
    fn step_onto_open_tile_is_accepted() {
        let map = open_map(8, 8);
        let mut sprite = Sprite::new(48.0, 48.0, 100.0, 1.0);
        sprite.set_position(128.0, 128.0);
        assert!(step_sprite(&mut sprite, &map, Direction::Right, 10.0));
        assert_eq!(sprite.x, 138.0);
    }

    #[test]
    fn step_into_wall_is_rejected_without_motion() {
        let mut map = open_map(8, 8);
        map.set_tile(3, 2, wall());
        let mut sprite = Sprite::new(48.0, 48.0, 100.0, 1.0);
        // feet slice ends up in tile row 2 with the wall directly right
        sprite.set_position(128.0, 96.0);
        assert!(!step_sprite(&mut sprite, &map, Direction::Right, 30.0));
        assert_eq!(sprite.x, 128.0);
    }

    #[test]
    fn map_edges_are_hard_bounds() {
        let map = open_map(4, 4);
        let mut sprite = Sprite::new(48.0, 48.0, 100.0, 1.0);
        sprite.set_position(2.0, 2.0);
        assert!(!step_sprite(&mut sprite, &map, Direction::Top, 40.0));
        sprite.set_position((4 * cfg::TILE_SIZE - 50) as f64, 2.0);
        assert!(!step_sprite(&mut sprite, &map, Direction::Right, 40.0));
    }

    #[test]
    fn step_size_truncates_to_whole_pixels() {
        assert_eq!(step_size(250.0, 1.0 / 60.0), 4.0);
        assert_eq!(step_size(10.0, 0.016), 0.0);
    }

    #[test]
    fn held_key_moves_the_player_and_turns_them() {
        let mut world = world_with_open_location(8, 8);
        let mut player = plain_player();
        player.sprite.set_position(128.0, 128.0);
        world.player = Some(player);
        world.app_state = AppState::Game;
        world.delta = 1.0 / 50.0;
        world.input.held.push(Key::Right);
        update(&mut world);
        let player = world.player.as_ref().unwrap();
        assert_eq!(player.sprite.x, 133.0);
        assert_eq!(player.direction, Direction::Right);
    }

    #[test]
    fn no_movement_outside_the_game_scene() {
        let mut world = world_with_open_location(8, 8);
        let mut player = plain_player();
        player.sprite.set_position(128.0, 128.0);
        world.player = Some(player);
        world.delta = 1.0 / 50.0;
        world.input.held.push(Key::Right);
        update(&mut world);
        assert_eq!(world.player.as_ref().unwrap().sprite.x, 128.0);
    }
}
