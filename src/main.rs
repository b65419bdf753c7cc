//! Block Arcade entry point
//!
//! Native: runs the host headlessly on a simulated 60 Hz clock and prints the grid.
//! Web: drives the host from requestAnimationFrame and renders the grid as text.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Element, KeyboardEvent};

    use block_arcade::audio::{AudioManager, WebAudioPlayer};
    use block_arcade::persistence::{LocalStorage, MemoryStorage, Storage};
    use block_arcade::platform::Key;
    use block_arcade::{AppContext, Arcade, games};

    struct Screen {
        arcade: Arcade,
        grid: Element,
        score: Option<Element>,
    }

    fn open_storage() -> Box<dyn Storage> {
        match LocalStorage::open() {
            Ok(storage) => Box::new(storage),
            Err(e) => {
                log::warn!("{e}, progress will not be saved");
                Box::new(MemoryStorage::new())
            }
        }
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);

        log::info!("Block Arcade starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        // Hide loading indicator
        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let grid = document.get_element_by_id("grid").ok_or("no #grid element")?;
        let score = document.get_element_by_id("score");

        let mut audio = AudioManager::new();
        if !WebAudioPlayer::register_all(&mut audio) {
            audio = AudioManager::with_log_players();
        }
        let app = AppContext::new(open_storage(), audio, rand::random());
        let screen = Rc::new(RefCell::new(Screen {
            arcade: Arcade::new(app, games::registry()),
            grid,
            score,
        }));

        // Keyboard
        for (event_name, down) in [("keydown", true), ("keyup", false)] {
            let screen = screen.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let Some(key) = Key::from_code(&event.code()) else {
                    return;
                };
                event.prevent_default();
                let mut s = screen.borrow_mut();
                if down {
                    s.arcade.app_mut().keyboard.press(key);
                } else {
                    s.arcade.app_mut().keyboard.release(key);
                }
            });
            window.add_event_listener_with_callback(event_name, closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        request_animation_frame(screen);
        Ok(())
    }

    fn request_animation_frame(screen: Rc<RefCell<Screen>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(screen, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(screen: Rc<RefCell<Screen>>, time: f64) {
        {
            let mut s = screen.borrow_mut();
            s.arcade.frame(time);

            let text = s.arcade.render();
            s.grid.set_text_content(Some(&text));
            let score = s.arcade.score().map(|score| score.text().to_owned()).unwrap_or_default();
            if let Some(el) = &s.score {
                el.set_text_content(Some(&score));
            }
        }

        request_animation_frame(screen);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run()
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use block_arcade::audio::AudioManager;
    use block_arcade::persistence::FileStorage;
    use block_arcade::platform::Key;
    use block_arcade::{AppContext, Arcade, games};

    /// Simulated display refresh
    const FRAME_MS: f64 = 1000.0 / 60.0;
    const FRAMES_PER_PRINT: u64 = 60;

    env_logger::init();
    log::info!("Block Arcade (native) starting...");

    // block-arcade [game-id] [seconds]
    let mut args = std::env::args().skip(1);
    let game = args.next().unwrap_or_else(|| games::pong::ID.to_owned());
    let seconds = args.next().and_then(|s| s.parse::<f64>().ok()).unwrap_or(10.0);

    let data_dir = std::env::var("BLOCK_ARCADE_DATA").unwrap_or_else(|_| ".block-arcade".to_owned());
    log::info!("Saving to {data_dir}");
    let app = AppContext::new(
        Box::new(FileStorage::new(data_dir)),
        AudioManager::with_log_players(),
        rand::random(),
    );
    let mut arcade = Arcade::new(app, games::registry());
    if !arcade.registry().contains(&game) {
        log::warn!("Unknown game {game}, the menu will come up instead");
    }

    // Skip the splash screen, then ask for the game
    arcade.app_mut().keyboard.press(Key::Enter);
    arcade.frame(0.0);
    arcade.app_mut().keyboard.release(Key::Enter);
    arcade.app_mut().request_game(game);

    let end = seconds * 1000.0;
    let mut now = 0.0;
    let mut frame = 0u64;
    while now < end {
        now += FRAME_MS;
        frame += 1;

        // Tap space once a second: serves, jumps and fires
        let tap = frame % FRAMES_PER_PRINT == 0;
        if tap {
            arcade.app_mut().keyboard.press(Key::Space);
        }
        arcade.frame(now);
        if tap {
            arcade.app_mut().keyboard.release(Key::Space);
        }

        if frame % FRAMES_PER_PRINT == 0 {
            let id = arcade.active_id().unwrap_or("loading");
            let score = arcade.score().map(|s| s.text().to_owned()).unwrap_or_default();
            println!("{:>6.1}s {id} [{score}]", now / 1000.0);
            println!("{}", arcade.render());
        }
    }

    log::info!("Stopped after {seconds}s");
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
