//! Property tests for the game engine: assignment fairness invariants
//! and transactional rejection of intents.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

use emospy::config::schema::{Catalog, ContextEntry, GameConfig, ThemeEntry, ThemeId};
use emospy::game::{
    Outcome, Phase, PhaseMachine, PhaseTransition, PlayerId, Role, RoundSummary, TransitionReason,
    TurnView, create_round,
};

fn catalog(themes: usize, contexts: usize) -> Catalog {
    Catalog::new(
        (0..themes)
            .map(|i| ThemeEntry::new(&format!("t{i}"), &format!("Theme {i}"), ""))
            .collect(),
        (0..contexts)
            .map(|i| ContextEntry::new(&format!("c{i}"), &format!("Context {i}"), ""))
            .collect(),
    )
}

proptest! {
    #[test]
    fn every_round_has_one_outsider_and_distinct_contexts(
        players in 3_usize..=6,
        extra_contexts in 0_usize..6,
        themes in 1_usize..8,
        seed in any::<u64>(),
    ) {
        let catalog = catalog(themes, players + extra_contexts);
        let mut rng = StdRng::seed_from_u64(seed);
        let round = create_round(players, &catalog, &mut rng).unwrap();

        let outsiders = (0..players)
            .filter(|&i| round.role_of(PlayerId(i)) == Role::Outsider)
            .count();
        prop_assert_eq!(outsiders, 1);
        prop_assert!(round.outsider().index() < players);

        prop_assert!(catalog.theme(&round.theme().id).is_some());

        let contexts: HashSet<_> = (0..players)
            .map(|i| round.context_of(PlayerId(i)).id.clone())
            .collect();
        prop_assert_eq!(contexts.len(), players);
        for id in &contexts {
            prop_assert!(catalog.contexts.iter().any(|c| &c.id == id));
        }
    }

    #[test]
    fn out_of_range_counts_always_rejected(players in prop_oneof![0_usize..3, 7_usize..64]) {
        let mut rng = StdRng::seed_from_u64(0);
        let err = create_round(players, &Catalog::default(), &mut rng).unwrap_err();
        prop_assert!(err.is_invalid_player_count());
    }
}

// ============================================================================
// Intent sequences
// ============================================================================

#[derive(Debug, Clone)]
enum Intent {
    Start(usize),
    Toggle,
    Advance,
    Tick,
    Skip,
    Confirm,
    Guess(usize),
    Restart,
    PlayAgain,
}

fn intent() -> impl Strategy<Value = Intent> {
    prop_oneof![
        1 => (0_usize..9).prop_map(Intent::Start),
        1 => Just(Intent::Toggle),
        3 => Just(Intent::Advance),
        2 => Just(Intent::Tick),
        1 => Just(Intent::Skip),
        1 => Just(Intent::Confirm),
        1 => (0_usize..8).prop_map(Intent::Guess),
        1 => Just(Intent::Restart),
        1 => Just(Intent::PlayAgain),
    ]
}

/// Everything observable from outside the machine.
#[derive(Debug, PartialEq)]
struct Snapshot {
    phase: Phase,
    turn: Option<TurnView>,
    remaining: Option<u64>,
    outcome: Option<Outcome>,
    summary: Option<RoundSummary>,
    round: u64,
    names: Vec<String>,
}

fn snapshot(m: &PhaseMachine) -> Snapshot {
    Snapshot {
        phase: m.phase(),
        turn: m.current_turn(),
        remaining: m.remaining_seconds(),
        outcome: m.outcome().cloned(),
        summary: m.summary(),
        round: m.round_number(),
        names: m.player_names().to_vec(),
    }
}

fn apply(m: &mut PhaseMachine, intent: &Intent) -> bool {
    let names: Vec<String> = match intent {
        Intent::Start(n) => (0..*n).map(|i| format!("p{i}")).collect(),
        _ => Vec::new(),
    };
    match intent {
        Intent::Start(_) => {
            let catalog = Arc::clone(m.catalog());
            m.start_round(&names, catalog).is_ok()
        }
        Intent::Toggle => m.toggle_current_reveal().is_ok(),
        Intent::Advance => m.advance_turn().is_ok(),
        Intent::Tick => m.tick().is_ok(),
        Intent::Skip => m.skip_timer().is_ok(),
        Intent::Confirm => m.confirm_review().is_ok(),
        Intent::Guess(i) => {
            // Index 6 and 7 fall outside the built-in catalog.
            let id = m
                .catalog()
                .themes
                .get(*i)
                .map_or_else(|| ThemeId::new(format!("unknown-{i}")), |t| t.id.clone());
            m.submit_outsider_guess(&id).is_ok()
        }
        Intent::Restart => {
            m.restart();
            true
        }
        Intent::PlayAgain => m.play_again().is_ok(),
    }
}

fn is_legal(t: &PhaseTransition) -> bool {
    if t.reason == TransitionReason::Restarted {
        return t.to == Phase::Setup;
    }
    matches!(
        (t.from, t.to),
        (Phase::Setup, Phase::Reveal)
            | (Phase::Reveal, Phase::Discussion)
            | (Phase::Discussion, Phase::SelfReview)
            | (Phase::SelfReview, Phase::OutsiderGuess)
            | (Phase::OutsiderGuess, Phase::Resolved)
    )
}

proptest! {
    #[test]
    fn rejected_intents_change_nothing(
        intents in prop::collection::vec(intent(), 1..80),
        discussion in 0_u64..4,
        seed in any::<u64>(),
    ) {
        let config = Arc::new(GameConfig {
            discussion: Duration::from_secs(discussion),
            ..GameConfig::default()
        });
        let mut m = PhaseMachine::new(config).with_seed(seed);

        for intent in &intents {
            let before = snapshot(&m);
            let accepted = apply(&mut m, intent);
            let transitions = m.take_transitions();

            if !accepted {
                prop_assert_eq!(&snapshot(&m), &before, "rejected {:?} mutated state", intent);
                prop_assert!(transitions.is_empty());
            }
            for t in &transitions {
                prop_assert!(is_legal(t), "illegal edge {:?}", t);
            }
        }
    }

    #[test]
    fn outcome_is_never_overwritten(seed in any::<u64>(), guesses in prop::collection::vec(0_usize..6, 2..5)) {
        let config = Arc::new(GameConfig {
            discussion: Duration::ZERO,
            ..GameConfig::default()
        });
        let mut m = PhaseMachine::new(config).with_seed(seed);
        let catalog = Arc::clone(m.catalog());
        m.start_round(&["a", "b", "c"], catalog).unwrap();
        for _ in 0..3 {
            m.advance_turn().unwrap();
        }
        m.confirm_review().unwrap();

        let first = m.catalog().themes[guesses[0]].id.clone();
        let outcome = m.submit_outsider_guess(&first).unwrap();
        for &g in &guesses[1..] {
            let id = m.catalog().themes[g].id.clone();
            prop_assert!(m.submit_outsider_guess(&id).unwrap_err().is_illegal_transition());
            prop_assert_eq!(m.outcome(), Some(&outcome));
        }
    }
}

// ============================================================================
// Scenario checks
// ============================================================================

#[test]
fn countdown_at_zero_does_not_reraise() {
    let config = Arc::new(GameConfig {
        discussion: Duration::from_secs(2),
        ..GameConfig::default()
    });
    let mut m = PhaseMachine::new(config).with_seed(5);
    let catalog = Arc::clone(m.catalog());
    m.start_round(&["a", "b", "c"], catalog).unwrap();
    for _ in 0..3 {
        m.advance_turn().unwrap();
    }
    m.tick().unwrap();
    m.tick().unwrap();
    assert_eq!(m.phase(), Phase::SelfReview);

    let expiries = m
        .take_transitions()
        .iter()
        .filter(|t| t.reason == TransitionReason::TimerExpired)
        .count();
    assert_eq!(expiries, 1);
    assert_eq!(m.remaining_seconds(), Some(0));
}

#[test]
fn worried_guess_against_worried_theme() {
    let mut m = PhaseMachine::new(Arc::new(GameConfig {
        discussion: Duration::ZERO,
        ..GameConfig::default()
    }));
    let only_worried = Arc::new(Catalog::new(
        vec![ThemeEntry::new("worried", "Worried", "/images/worried.jpg")],
        Catalog::default().contexts,
    ));
    m.start_round(&["a", "b", "c", "d", "e", "f"], only_worried).unwrap();
    for _ in 0..6 {
        m.advance_turn().unwrap();
    }
    m.confirm_review().unwrap();
    let outcome = m.submit_outsider_guess(&ThemeId::new("worried")).unwrap();
    assert!(outcome.outsider_won);
    assert_eq!(m.summary().unwrap().theme.id, ThemeId::new("worried"));
}
