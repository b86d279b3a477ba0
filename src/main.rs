//! Challenge Coin entry point
//!
//! Handles platform-specific initialization. The web build hands control to
//! the page script through `platform::web::WebTracker`.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    challenge_coin::platform::web::init();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use challenge_coin::Tracker;
    use challenge_coin::persistence::MemoryStore;

    env_logger::init();
    log::info!("Challenge Coin (native) starting...");
    log::info!("Native mode has no UI - run with `trunk serve` for the web version");

    // Smoke run against an in-memory store
    let mut tracker = Tracker::load(Box::new(MemoryStore::new()));
    let outcome = tracker.add_account().and_then(|index| {
        tracker.open_account(index)?;
        tracker.add_challenge()?;
        for _ in 0..3 {
            tracker.add_coin();
        }
        tracker.exchange(2)
    });

    match outcome {
        Ok(receipt) => println!(
            "Exchanged {} coins for {}",
            receipt.coins,
            tracker.settings().format_reward(receipt.reward)
        ),
        Err(e) => log::error!("Smoke run failed: {}", e),
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
