// tile grid
pub const TILE_SIZE: i32 = 64;

// frame pacing: the simulation only advances when at least one
// target frame interval has elapsed
pub const TARGET_FRAME_RATE: f64 = 60.0;
pub const FRAME_TIME: f64 = 1.0 / TARGET_FRAME_RATE;

// player
pub const PLAYER_WIDTH: f64 = 48.0;
pub const PLAYER_HEIGHT: f64 = 48.0;
pub const PLAYER_SPEED: f64 = 250.0;
pub const PLAYER_ATTACK_SPEED: f64 = 0.3;
pub const MAX_INVENTORY_SIZE: usize = 14;

// combat
pub const PERCENTAGE_BASE: f64 = 100.0;

// monster wandering and pursuit
pub const RESET_WAITING_TIME: f64 = 3.0;
pub const RESET_MOVING_TIME: f64 = 2.0;
pub const RANDOM_WAITING_TIME_MAX: f64 = 3.0;
pub const MINIMUM_PURSUIT_DISTANCE: f64 = 10.0;

// move box: a narrow slice at the sprite's feet, used for tile collision
pub const MOVE_BOX_X_INSET: f64 = 0.25;
pub const MOVE_BOX_HEIGHT: f64 = 1.0 / 3.0;

pub const ASSETS_DIR: &str = "assets";
pub const SAVE_PATH: &str = "save/player.json";

// sentinel id for an empty equipment slot in the save record
pub const NO_ITEM_ID: i32 = -1;
