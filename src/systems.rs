pub mod ai;
pub mod death;
pub mod game_menu;
pub mod game_over;
pub mod input;
pub mod interaction;
pub mod inventory;
pub mod main_menu;
pub mod movement;
pub mod player_action;
pub mod render;
