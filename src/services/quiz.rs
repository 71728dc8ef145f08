/// Quiz candidate selection
///
/// Pure logic with no I/O: which movies are still eligible for the quiz, which
/// one is shown next, and when a quiz run is complete. Random choice goes
/// through an injected `Rng` so tests can seed it.
use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::models::{Movie, UserRating};

/// Ratings collected per quiz run.
pub const QUIZ_LENGTH: usize = 10;

/// Filters the catalog down to movies whose title has not been rated yet.
/// Order-preserving; titles compare case-sensitively, matching the backend.
pub fn candidate_pool(catalog: Vec<Movie>, rated_titles: &HashSet<String>) -> Vec<Movie> {
    catalog
        .into_iter()
        .filter(|movie| !rated_titles.contains(&movie.title))
        .collect()
}

/// Picks one candidate uniformly at random, or `None` on an empty pool.
pub fn pick_random<R: Rng>(pool: &[Movie], rng: &mut R) -> Option<Movie> {
    pool.choose(rng).cloned()
}

pub fn is_complete(ratings: &[UserRating]) -> bool {
    ratings.len() >= QUIZ_LENGTH
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn movie(title: &str, imdb_id: &str) -> Movie {
        Movie {
            title: title.to_string(),
            imdb_id: imdb_id.to_string(),
            ..Movie::default()
        }
    }

    fn rating(title: &str) -> UserRating {
        UserRating::new(title.to_string(), 3, None)
    }

    #[test]
    fn test_candidate_pool_excludes_rated_titles() {
        let catalog = vec![movie("A", "tt1"), movie("B", "tt2"), movie("C", "tt3")];
        let rated: HashSet<String> = ["A".to_string()].into_iter().collect();

        let pool = candidate_pool(catalog, &rated);

        let titles: Vec<&str> = pool.iter().map(|m| m.title.as_str()).collect();
        assert_eq!(titles, vec!["B", "C"]);
    }

    #[test]
    fn test_candidate_pool_keeps_everything_when_nothing_rated() {
        let catalog = vec![movie("A", "tt1"), movie("B", "tt2")];
        let pool = candidate_pool(catalog.clone(), &HashSet::new());
        assert_eq!(pool, catalog);
    }

    #[test]
    fn test_candidate_pool_is_case_sensitive() {
        let catalog = vec![movie("Alien", "tt1")];
        let rated: HashSet<String> = ["alien".to_string()].into_iter().collect();

        let pool = candidate_pool(catalog, &rated);
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn test_pick_random_empty_pool() {
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(pick_random(&[], &mut rng), None);
    }

    #[test]
    fn test_pick_random_draws_from_pool() {
        let pool = vec![movie("A", "tt1"), movie("B", "tt2"), movie("C", "tt3")];
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..20 {
            let picked = pick_random(&pool, &mut rng).unwrap();
            assert!(pool.contains(&picked));
        }
    }

    #[test]
    fn test_pick_random_eventually_covers_pool() {
        let pool = vec![movie("A", "tt1"), movie("B", "tt2"), movie("C", "tt3")];
        let mut rng = StdRng::seed_from_u64(7);

        let mut seen = HashSet::new();
        for _ in 0..100 {
            seen.insert(pick_random(&pool, &mut rng).unwrap().imdb_id);
        }
        assert_eq!(seen.len(), pool.len());
    }

    #[test]
    fn test_is_complete_boundary() {
        let nine: Vec<UserRating> = (0..9).map(|i| rating(&format!("m{}", i))).collect();
        let ten: Vec<UserRating> = (0..10).map(|i| rating(&format!("m{}", i))).collect();

        assert!(!is_complete(&nine));
        assert!(is_complete(&ten));
    }
}
