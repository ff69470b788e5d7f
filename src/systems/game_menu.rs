use crate::cmtp::{AppState, Key};
use crate::game::{self, World};

pub const OPTIONS: [&str; 4] = ["Resume", "Save", "Main Menu", "Exit"];

pub fn update(world: &mut World) {
    if world.app_state != AppState::GameMenu {
        return;
    }
    if world.input.was_pressed(Key::Cancel) {
        world.app_state = AppState::Game;
        return;
    }
    if world.input.was_pressed(Key::Inventory) {
        world.app_state = AppState::Inventory;
        world.inventory_menu.cursor = 0;
        // consume the edge so the inventory system, which runs later in
        // the same tick, does not treat it as a close request
        world.input.pressed.clear();
        return;
    }
    world.game_menu.move_cursor(&world.input, OPTIONS.len());
    if !world.input.was_pressed(Key::Confirm) {
        return;
    }
    match world.game_menu.cursor {
        0 => world.app_state = AppState::Game,
        1 => {
            if let Err(err) = game::save_game(world) {
                log::error!("save failed: {}", err);
            }
        }
        2 => {
            game::end_session(world);
            world.app_state = AppState::MainMenu;
            world.main_menu.cursor = 0;
        }
        _ => world.must_exit = true,
    }
}
