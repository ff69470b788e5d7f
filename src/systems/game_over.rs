use crate::cmtp::{AppState, Key};
use crate::game::{self, World};

pub const OPTIONS: [&str; 2] = ["Main Menu", "Exit"];

pub fn update(world: &mut World) {
    if world.app_state != AppState::GameOver {
        return;
    }
    world.game_over_menu.move_cursor(&world.input, OPTIONS.len());
    if !world.input.was_pressed(Key::Confirm) {
        return;
    }
    match world.game_over_menu.cursor {
        0 => {
            game::end_session(world);
            world.app_state = AppState::MainMenu;
            world.main_menu.cursor = 0;
        }
        _ => world.must_exit = true,
    }
}
