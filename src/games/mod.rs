//! The bundled games and screens
//!
//! Every playable game registers here under its id; the menu lists them in registration
//! order. The splash screen and the menu itself are not registered, the host creates them.

pub mod car_racing;
pub mod flappy_brick;
pub mod menu;
pub mod pairing;
pub mod pong;
pub mod shoot_bricks;
pub mod splash;

pub use menu::GameMenu;
pub use splash::SplashScreen;

use crate::sim::loader::GameRegistry;

/// Registry of every bundled game, in menu order
pub fn registry() -> GameRegistry {
    let mut registry = GameRegistry::new();
    registry.register_ready(pong::ID, "Pong", pong::create, pong::menu_art);
    registry.register_ready(car_racing::ID, "Car Racing", car_racing::create, car_racing::menu_art);
    registry.register_ready(flappy_brick::ID, "Flappy Brick", flappy_brick::create, flappy_brick::menu_art);
    registry.register_ready(shoot_bricks::ID, "Shoot Bricks", shoot_bricks::create, shoot_bricks::menu_art);
    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_order_and_names() {
        let registry = registry();
        let ids: Vec<&str> = registry.ids().collect();
        assert_eq!(ids, vec!["pong", "car-racing", "flappy-brick", "shoot-bricks"]);
        assert_eq!(registry.name("flappy-brick"), Some("Flappy Brick"));
        assert!(!registry.contains(menu::ID));
    }

    #[test]
    fn test_every_game_loads_and_identifies_itself() {
        let registry = registry();
        for id in registry.ids() {
            let factory = registry.load_game(id).poll().unwrap().unwrap();
            assert_eq!(factory().id(), id);

            let art = registry.load_menu_art(id).poll().unwrap().unwrap();
            assert!(art.clear_square.is_some());
        }
    }
}
