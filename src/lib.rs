pub mod asset;
pub mod cfg;
pub mod cmtp;
pub mod game;
pub mod systems;
