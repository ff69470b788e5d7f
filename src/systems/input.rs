use crate::cmtp::InputEvent;
use crate::game::{Frontend, World};

/// Drains raw frontend events into the logical input state. `pressed`
/// carries one-shot edges for this tick only; `held` tracks keys until
/// their release arrives.
pub fn update(world: &mut World, frontend: &mut dyn Frontend) {
    world.input.pressed.clear();
    for event in frontend.poll_events() {
        match event {
            InputEvent::Pressed(raw) => {
                if let Some(key) = world.assets.config.resolve(raw) {
                    // key-repeat delivers Pressed again without a Released
                    if !world.input.held.contains(&key) {
                        world.input.held.push(key);
                        world.input.pressed.push(key);
                    }
                }
            }
            InputEvent::Released(raw) => {
                if let Some(key) = world.assets.config.resolve(raw) {
                    world.input.held.retain(|held| *held != key);
                }
            }
        }
    }
}
