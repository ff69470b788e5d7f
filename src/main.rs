use gridvale::asset::Assets;
use gridvale::cfg;
use gridvale::cmtp::{Frame, InputEvent, RawKey};
use gridvale::game::{self, Frontend, World};
use std::time::{Duration, Instant};

/// Headless frontend that replays a fixed input script, one batch per
/// poll. Stands in for a real windowed frontend.
struct ScriptedFrontend {
    tick: u64,
    last_state: Option<gridvale::cmtp::AppState>,
}

impl ScriptedFrontend {
    fn new() -> Self {
        ScriptedFrontend {
            tick: 0,
            last_state: None,
        }
    }

    fn tap(key: RawKey) -> Vec<InputEvent> {
        vec![InputEvent::Pressed(key), InputEvent::Released(key)]
    }
}

impl Frontend for ScriptedFrontend {
    fn poll_events(&mut self) -> Vec<InputEvent> {
        let tick = self.tick;
        self.tick += 1;
        match tick {
            // start a new game
            5 => Self::tap(RawKey::Enter),
            // walk east for a while
            10 => vec![InputEvent::Pressed(RawKey::Char('d'))],
            70 => vec![InputEvent::Released(RawKey::Char('d'))],
            // swing at whatever is close
            75 => Self::tap(RawKey::Char('j')),
            // peek into the inventory and close it again
            85 => Self::tap(RawKey::Char('i')),
            95 => Self::tap(RawKey::Char('i')),
            // pause and pick Exit
            105 => Self::tap(RawKey::Escape),
            110 | 115 | 120 => Self::tap(RawKey::Char('s')),
            125 => Self::tap(RawKey::Enter),
            _ => Vec::new(),
        }
    }

    fn render(&mut self, frame: &Frame) {
        if self.last_state != Some(frame.state) {
            log::info!("scene: {:?}", frame.state);
            self.last_state = Some(frame.state);
        }
        for event in &frame.events {
            log::info!("event: {:?}", event);
        }
    }
}

fn main() {
    env_logger::init();
    let assets = match Assets::load(cfg::ASSETS_DIR) {
        Ok(assets) => assets,
        Err(err) => {
            log::error!("failed to load assets: {}", err);
            std::process::exit(1);
        }
    };
    let mut world = World::new(assets);
    let mut frontend = ScriptedFrontend::new();
    let mut previous = Instant::now();
    while !world.must_exit {
        let now = Instant::now();
        let delta = now.duration_since(previous).as_secs_f64();
        if delta < cfg::FRAME_TIME {
            std::thread::sleep(Duration::from_secs_f64(cfg::FRAME_TIME - delta));
            continue;
        }
        previous = now;
        game::tick(&mut world, &mut frontend, delta);
    }
}
