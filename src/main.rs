//! Chase Tap entry point
//!
//! Headless driver: plays one real-time round with an automatic tapper and
//! prints the scoreboard. Usage: `chase-tap [player]`.

use std::thread;
use std::time::Duration;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use chase_tap::platform::FrameClock;
use chase_tap::{GamePhase, GameSession, ScoreStore, Scoreboard, Settings};

/// Frame pacing for the driver loop (~60 Hz)
const FRAME: Duration = Duration::from_millis(16);
/// Chance per frame that the auto-tapper lands a tap
const TAP_CHANCE: f64 = 0.05;

fn main() {
    env_logger::init();
    log::info!("Chase Tap (headless) starting...");

    let settings_path = Settings::default_path();
    let mut settings = Settings::load(&settings_path);

    let player = std::env::args()
        .nth(1)
        .or_else(|| settings.last_player.clone())
        .unwrap_or_else(|| "Player".to_string());

    // A broken scoreboard must not stop the round from being played
    let store = match ScoreStore::open(settings.scoreboard_path()) {
        Ok(store) => {
            log::info!("Scores saved to {}", store.location());
            Some(store)
        }
        Err(e) => {
            log::error!("{}", e);
            None
        }
    };

    let mut session = GameSession::new(player.clone(), settings.session.clone(), store.as_ref());
    if !session.start() {
        log::error!("Round did not start");
        return;
    }

    let mut tapper = Pcg32::seed_from_u64(settings.session.seed.unwrap_or(0x5eed));
    let mut clock = FrameClock::new();
    let mut last_countdown = session.countdown();

    while session.phase() == GamePhase::Running {
        thread::sleep(FRAME);
        if tapper.random_bool(TAP_CHANCE) {
            session.on_tap();
        }
        session.advance(clock.tick());

        let state = session.current_state();
        if state.countdown != last_countdown {
            last_countdown = state.countdown;
            println!(
                "Time: {:>2}  Score: {:>3}  Speed: {:>5.1}  Target: ({:.0}, {:.0})",
                state.countdown, state.score, state.speed, state.position.x, state.position.y
            );
        }
    }

    println!("\n{} scored {}", session.player(), session.score());
    drop(session);

    match store.as_ref().map(ScoreStore::scoreboard) {
        Some(Scoreboard::Available(entries)) => {
            println!("\nScoreboard");
            for (rank, entry) in entries.iter().enumerate() {
                let marker = if entry.name == player { ">" } else { " " };
                println!("{} {:>3}. {:<32} {:>5}", marker, rank + 1, entry.name, entry.score);
            }
        }
        _ => println!("\nScoreboard unavailable"),
    }

    settings.last_player = Some(player);
    if let Err(e) = settings.save(&settings_path) {
        log::warn!("Settings not saved: {}", e);
    }
}
