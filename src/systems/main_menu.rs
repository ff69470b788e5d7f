use crate::asset;
use crate::cfg;
use crate::cmtp::{AppState, Key};
use crate::game::{self, World};

pub const OPTIONS: [&str; 3] = ["New Game", "Load Game", "Exit"];

pub fn update(world: &mut World) {
    if world.app_state != AppState::MainMenu {
        return;
    }
    world.main_menu.move_cursor(&world.input, OPTIONS.len());
    if !world.input.was_pressed(Key::Confirm) {
        return;
    }
    match world.main_menu.cursor {
        0 => start(world, false),
        1 => {
            if !asset::has_save(cfg::SAVE_PATH) {
                log::warn!("no save file at {}", cfg::SAVE_PATH);
                return;
            }
            start(world, true);
        }
        _ => world.must_exit = true,
    }
}

fn start(world: &mut World, from_save: bool) {
    if let Err(err) = game::start_game(world, from_save) {
        log::error!("could not start the game: {}", err);
        world.must_exit = true;
    }
}
