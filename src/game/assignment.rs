//! Round assignment engine
//!
//! Draws the hidden outsider seat, the shared theme, and one distinct
//! context per player. All randomness goes through an injected [`Rng`]
//! so rounds are reproducible under a seed.
//!
//! Every draw is unbiased: the outsider seat and the theme use a uniform
//! index, and contexts come from a Fisher–Yates permutation of the
//! catalog truncated to the table size.

use std::collections::HashSet;

use rand::Rng;
use rand::seq::SliceRandom;

use crate::config::defaults::{MAX_PLAYERS, MIN_PLAYERS};
use crate::config::schema::{Catalog, ContextEntry, ThemeEntry};
use crate::error::{CatalogKind, GameError};

use super::state::{PlayerId, Role};

/// Hidden assignment for one round. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundAssignment {
    outsider: PlayerId,
    theme: ThemeEntry,
    contexts: Vec<ContextEntry>,
}

impl RoundAssignment {
    /// Number of players the round was dealt for.
    #[must_use]
    pub fn player_count(&self) -> usize {
        self.contexts.len()
    }

    /// The outsider's seat.
    #[must_use]
    pub const fn outsider(&self) -> PlayerId {
        self.outsider
    }

    /// Role of the given player.
    #[must_use]
    pub fn role_of(&self, player: PlayerId) -> Role {
        if player == self.outsider {
            Role::Outsider
        } else {
            Role::Regular
        }
    }

    /// The theme shared by every regular player.
    #[must_use]
    pub const fn theme(&self) -> &ThemeEntry {
        &self.theme
    }

    /// Context dealt to the given player.
    ///
    /// The outsider's seat is dealt a context too, so that every seat
    /// consumes one entry of the permutation; it is never shown.
    #[must_use]
    pub fn context_of(&self, player: PlayerId) -> &ContextEntry {
        &self.contexts[player.index()]
    }
}

/// Deals a new round for `player_count` players.
///
/// # Errors
///
/// - `GameError::InvalidPlayerCount` if `player_count` is outside `3..=6`
/// - `GameError::EmptyCatalog` if either catalog list is empty
/// - `GameError::DuplicateContext` if two contexts share an id
/// - `GameError::InsufficientContexts` if there are fewer contexts than
///   players
pub fn create_round<R: Rng>(
    player_count: usize,
    catalog: &Catalog,
    rng: &mut R,
) -> Result<RoundAssignment, GameError> {
    if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&player_count) {
        return Err(GameError::InvalidPlayerCount {
            count: player_count,
            min: MIN_PLAYERS,
            max: MAX_PLAYERS,
        });
    }
    if catalog.themes.is_empty() {
        return Err(GameError::EmptyCatalog {
            kind: CatalogKind::Themes,
        });
    }
    if catalog.contexts.is_empty() {
        return Err(GameError::EmptyCatalog {
            kind: CatalogKind::Contexts,
        });
    }
    let mut seen = HashSet::with_capacity(catalog.contexts.len());
    if let Some(dup) = catalog.contexts.iter().find(|c| !seen.insert(&c.id)) {
        return Err(GameError::DuplicateContext { id: dup.id.clone() });
    }
    if catalog.contexts.len() < player_count {
        return Err(GameError::InsufficientContexts {
            needed: player_count,
            available: catalog.contexts.len(),
        });
    }

    let outsider = PlayerId(rng.random_range(0..player_count));
    let theme = catalog.themes[rng.random_range(0..catalog.themes.len())].clone();

    // Shuffle indices rather than entries so the catalog stays untouched.
    let mut order: Vec<usize> = (0..catalog.contexts.len()).collect();
    order.shuffle(rng);
    let contexts = order
        .into_iter()
        .take(player_count)
        .map(|i| catalog.contexts[i].clone())
        .collect();

    Ok(RoundAssignment {
        outsider,
        theme,
        contexts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::defaults::builtin_catalog;
    use crate::config::schema::{ContextId, ThemeId};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashMap;

    fn catalog(themes: usize, contexts: usize) -> Catalog {
        Catalog::new(
            (0..themes)
                .map(|i| ThemeEntry::new(&format!("t{i}"), &format!("T{i}"), ""))
                .collect(),
            (0..contexts)
                .map(|i| ContextEntry::new(&format!("c{i}"), &format!("C{i}"), ""))
                .collect(),
        )
    }

    #[test]
    fn one_outsider_and_distinct_contexts() {
        let mut rng = StdRng::seed_from_u64(7);
        let catalog = builtin_catalog();
        for n in 3..=6 {
            let round = create_round(n, &catalog, &mut rng).unwrap();
            assert_eq!(round.player_count(), n);

            let outsiders = (0..n)
                .filter(|&i| round.role_of(PlayerId(i)) == Role::Outsider)
                .count();
            assert_eq!(outsiders, 1);

            let ids: HashSet<_> = (0..n).map(|i| &round.context_of(PlayerId(i)).id).collect();
            assert_eq!(ids.len(), n);
        }
    }

    #[test]
    fn rejects_bad_counts() {
        let mut rng = StdRng::seed_from_u64(1);
        for n in [0, 2, 7] {
            assert!(matches!(
                create_round(n, &builtin_catalog(), &mut rng),
                Err(GameError::InvalidPlayerCount { count, .. }) if count == n
            ));
        }
    }

    #[test]
    fn rejects_empty_catalogs() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(
            create_round(3, &catalog(0, 6), &mut rng).unwrap_err(),
            GameError::EmptyCatalog {
                kind: CatalogKind::Themes
            }
        );
        assert_eq!(
            create_round(3, &catalog(2, 0), &mut rng).unwrap_err(),
            GameError::EmptyCatalog {
                kind: CatalogKind::Contexts
            }
        );
    }

    #[test]
    fn rejects_short_context_list() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(
            create_round(5, &catalog(2, 4), &mut rng).unwrap_err(),
            GameError::InsufficientContexts {
                needed: 5,
                available: 4
            }
        );
    }

    #[test]
    fn rejects_repeated_context_ids() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut catalog = catalog(1, 5);
        catalog.contexts[3] = ContextEntry::new("c1", "Again", "");
        assert_eq!(
            create_round(4, &catalog, &mut rng).unwrap_err(),
            GameError::DuplicateContext {
                id: ContextId::new("c1")
            }
        );
    }

    #[test]
    fn exact_context_count_uses_every_entry() {
        let mut rng = StdRng::seed_from_u64(3);
        let catalog = catalog(1, 4);
        let round = create_round(4, &catalog, &mut rng).unwrap();
        let ids: HashSet<_> = (0..4).map(|i| round.context_of(PlayerId(i)).id.clone()).collect();
        assert_eq!(ids.len(), 4);
        assert_eq!(round.theme().id, ThemeId::new("t0"));
    }

    #[test]
    fn same_seed_same_round() {
        let catalog = builtin_catalog();
        let a = create_round(5, &catalog, &mut StdRng::seed_from_u64(99)).unwrap();
        let b = create_round(5, &catalog, &mut StdRng::seed_from_u64(99)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn outsider_seat_is_uniform() {
        let mut rng = StdRng::seed_from_u64(2024);
        let catalog = builtin_catalog();
        let trials = 60_000;
        let mut seats = [0_u32; 6];
        for _ in 0..trials {
            let round = create_round(6, &catalog, &mut rng).unwrap();
            seats[round.outsider().index()] += 1;
        }
        // Expected 10_000 per seat; allow 5%.
        for count in seats {
            assert!((9_500..=10_500).contains(&count), "seat counts {seats:?}");
        }
    }

    #[test]
    fn context_permutations_are_uniform() {
        // Three contexts dealt to three players: each of the 6 orderings
        // should appear about equally often.
        let mut rng = StdRng::seed_from_u64(11);
        let catalog = catalog(1, 3);
        let trials = 60_000;
        let mut seen: HashMap<Vec<String>, u32> = HashMap::new();
        for _ in 0..trials {
            let round = create_round(3, &catalog, &mut rng).unwrap();
            let order = (0..3)
                .map(|i| round.context_of(PlayerId(i)).id.0.clone())
                .collect();
            *seen.entry(order).or_default() += 1;
        }
        assert_eq!(seen.len(), 6);
        for count in seen.values() {
            assert!((9_500..=10_500).contains(count), "permutation counts {seen:?}");
        }
    }
}
