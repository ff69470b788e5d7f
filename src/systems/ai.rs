use crate::cfg;
use crate::cmtp::{AiState, AppState, Monster, Player, TileMap};
use crate::game::{self, World};
use crate::systems::movement;

/// Re-sorts the draw order by depth, then drives every living monster
/// of the current location in that order.
pub fn update(world: &mut World) {
    if world.app_state != AppState::Game {
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
    location.sort_draw_order(Some(&*player));
    let map = &location.tile_map;
    for monster in location.monsters.values_mut() {
        if monster.sprite.dead {
            continue;
        }
        match monster.ai {
            AiState::Wandering => wander(monster, map, world.delta),
            AiState::Pursuing => {
                pursue(monster, player, map, world.clock, world.delta, &mut world.events)
            }
        }
    }
}

/// Wait, walk the current direction of the shuffled cycle, advance to
/// the next direction, wait again.
fn wander(monster: &mut Monster, map: &TileMap, delta: f64) {
    if monster.waiting_timer > 0.0 {
        monster.waiting_timer -= delta;
        return;
    }
    monster.moving_timer -= delta;
    if monster.moving_timer <= 0.0 {
        monster.waiting_timer = cfg::RESET_WAITING_TIME;
        monster.moving_timer = cfg::RESET_MOVING_TIME;
        monster.current_direction = (monster.current_direction + 1) % 4;
        return;
    }
    let step = movement::step_size(monster.sprite.speed, delta);
    if step <= 0.0 {
        return;
    }
    let direction = monster.direction_sequence[monster.current_direction];
    movement::step_sprite(&mut monster.sprite, map, direction, step);
}

/// Close in per axis while the gap is wide, swing once in range. The
/// monster keeps pursuing until an outside signal clears it.
fn pursue(
    monster: &mut Monster,
    player: &mut Player,
    map: &TileMap,
    now: f64,
    delta: f64,
    events: &mut Vec<crate::cmtp::ChangeEvent>,
) {
    if monster.damage_box().intersects(&player.sprite.collision_box()) {
        game::attack_player(monster, player, now, events);
        return;
    }
    let step = movement::step_size(monster.sprite.speed, delta);
    if step <= 0.0 {
        return;
    }
    let dx = player.sprite.x - monster.sprite.x;
    let dy = player.sprite.y - monster.sprite.y;
    if dx.abs() > cfg::MINIMUM_PURSUIT_DISTANCE {
        let direction = if dx > 0.0 {
            crate::cmtp::Direction::Right
        } else {
            crate::cmtp::Direction::Left
        };
        movement::step_sprite(&mut monster.sprite, map, direction, step);
    }
    if dy.abs() > cfg::MINIMUM_PURSUIT_DISTANCE {
        let direction = if dy > 0.0 {
            crate::cmtp::Direction::Bottom
        } else {
            crate::cmtp::Direction::Top
        };
        movement::step_sprite(&mut monster.sprite, map, direction, step);
    }
}
