#![no_main]

use std::sync::Arc;
use std::time::Duration;

use emospy::config::schema::{GameConfig, ThemeId};
use emospy::game::PhaseMachine;
use libfuzzer_sys::fuzz_target;

// Each byte is one intent; rejected intents must never panic.
fuzz_target!(|data: &[u8]| {
    let Some((&seed, intents)) = data.split_first() else {
        return;
    };
    let config = Arc::new(GameConfig {
        discussion: Duration::from_secs(u64::from(seed % 4)),
        ..GameConfig::default()
    });
    let mut machine = PhaseMachine::new(config).with_seed(u64::from(seed));

    for &byte in intents {
        match byte % 9 {
            0 => {
                let names: Vec<String> = (0..byte / 9 % 8).map(|i| format!("p{i}")).collect();
                let catalog = Arc::clone(machine.catalog());
                let _ = machine.start_round(&names, catalog);
            }
            1 => {
                let _ = machine.toggle_current_reveal();
            }
            2 => {
                let _ = machine.advance_turn();
            }
            3 => {
                let _ = machine.tick();
            }
            4 => {
                let _ = machine.skip_timer();
            }
            5 => {
                let _ = machine.confirm_review();
            }
            6 => {
                let id = machine
                    .catalog()
                    .themes
                    .get(usize::from(byte / 9 % 8))
                    .map_or_else(|| ThemeId::new("nope"), |t| t.id.clone());
                let _ = machine.submit_outsider_guess(&id);
            }
            7 => machine.restart(),
            _ => {
                let _ = machine.play_again();
            }
        }
        let _ = machine.current_turn();
        let _ = machine.take_transitions();
    }
});
