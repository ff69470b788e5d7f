use crate::cmtp::{
    AppState, EntityKey, Frame, LocationFrame, MenuFrame, Sprite, SpriteDraw, SpriteKind,
};
use crate::game::{Frontend, World};
use crate::systems::{game_menu, game_over, inventory, main_menu};

/// Assembles the frame for this tick and hands it to the frontend,
/// draining the pending change events into it.
pub fn update(world: &mut World, frontend: &mut dyn Frontend) {
    let frame = Frame {
        state: world.app_state,
        location: build_location_frame(world),
        menu: build_menu_frame(world),
        events: std::mem::take(&mut world.events),
    };
    frontend.render(&frame);
}

fn draw(kind: SpriteKind, label: &str, sprite: &Sprite) -> SpriteDraw {
    SpriteDraw {
        kind,
        label: label.to_string(),
        x: sprite.x,
        y: sprite.y,
        width: sprite.width,
        height: sprite.height,
    }
}

fn build_location_frame(world: &World) -> Option<LocationFrame> {
    let player = world.player.as_ref()?;
    let location = world.location()?;
    let mut sprites = Vec::with_capacity(location.draw_order.len());
    for key in &location.draw_order {
        match key {
            EntityKey::Player => {
                sprites.push(draw(SpriteKind::Player, &player.name, &player.sprite));
            }
            EntityKey::Monster(id) => {
                if let Some(monster) = location.monsters.get(id) {
                    sprites.push(draw(SpriteKind::Monster, &monster.name, &monster.sprite));
                }
            }
            EntityKey::Item(id) => {
                if let Some(ground) = location.items.get(id) {
                    sprites.push(draw(SpriteKind::Item, &ground.item.name, &ground.sprite));
                }
            }
            EntityKey::Portal(id) => {
                if let Some(portal) = location.portals.get(id) {
                    sprites.push(draw(SpriteKind::Portal, "Portal", &portal.sprite));
                }
            }
        }
    }
    Some(LocationFrame {
        name: location.name.clone(),
        player_health: (player.hp.current(), player.hp.initial()),
        sprites,
    })
}

fn build_menu_frame(world: &World) -> Option<MenuFrame> {
    let from_options = |title: &str, options: &[&str], cursor: usize| {
        Some(MenuFrame {
            title: title.to_string(),
            options: options.iter().map(|option| option.to_string()).collect(),
            cursor,
        })
    };
    match world.app_state {
        AppState::MainMenu => from_options(
            &world.assets.config.window_name,
            &main_menu::OPTIONS,
            world.main_menu.cursor,
        ),
        AppState::GameMenu => from_options("Paused", &game_menu::OPTIONS, world.game_menu.cursor),
        AppState::GameOver => {
            from_options("Game Over", &game_over::OPTIONS, world.game_over_menu.cursor)
        }
        AppState::Inventory => {
            let player = world.player.as_ref()?;
            Some(MenuFrame {
                title: String::from("Inventory"),
                options: inventory::listing(player)
                    .into_iter()
                    .map(|entry| entry.label)
                    .collect(),
                cursor: world.inventory_menu.cursor,
            })
        }
        AppState::Game => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::Assets;
    use crate::cmtp::InputEvent;
    use crate::game::test_support::*;

    struct CaptureFrontend {
        last: Option<Frame>,
    }

    impl Frontend for CaptureFrontend {
        fn poll_events(&mut self) -> Vec<InputEvent> {
            Vec::new()
        }

        fn render(&mut self, frame: &Frame) {
            self.last = Some(frame.clone());
        }
    }

    #[test]
    fn game_frame_carries_the_sorted_scene() {
        let mut world = world_with_open_location(8, 8);
        world.app_state = AppState::Game;
        let mut player = plain_player();
        player.sprite.set_position(100.0, 200.0);
        world.player = Some(player);
        let mut monster = plain_monster(10.0, 1.0);
        monster.sprite.set_position(100.0, 50.0);
        {
            let location = world.location_mut().unwrap();
            location.add_monster(monster);
            location.attach_player();
        }
        let player_ref = world.player.clone();
        world
            .location_mut()
            .unwrap()
            .sort_draw_order(player_ref.as_ref());
        let mut frontend = CaptureFrontend { last: None };
        update(&mut world, &mut frontend);
        let frame = frontend.last.unwrap();
        let location = frame.location.unwrap();
        assert_eq!(location.sprites.len(), 2);
        assert_eq!(location.sprites[0].kind, SpriteKind::Monster);
        assert_eq!(location.sprites[1].kind, SpriteKind::Player);
        assert!(frame.menu.is_none());
    }

    #[test]
    fn menu_frame_matches_the_scene_state() {
        let mut world = crate::game::World::new(Assets::empty());
        let mut frontend = CaptureFrontend { last: None };
        update(&mut world, &mut frontend);
        let frame = frontend.last.unwrap();
        let menu = frame.menu.unwrap();
        assert_eq!(menu.options, vec!["New Game", "Load Game", "Exit"]);
        assert_eq!(menu.cursor, 0);
        assert!(frame.location.is_none());
    }

    #[test]
    fn events_are_drained_into_the_frame() {
        let mut world = world_with_open_location(4, 4);
        world
            .events
            .push(crate::cmtp::ChangeEvent::EquipmentChanged);
        let mut frontend = CaptureFrontend { last: None };
        update(&mut world, &mut frontend);
        assert_eq!(frontend.last.unwrap().events.len(), 1);
        assert!(world.events.is_empty());
    }
}
