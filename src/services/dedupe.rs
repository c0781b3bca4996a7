use rand::{seq::SliceRandom, Rng};
use std::collections::HashSet;

use crate::models::{CandidateBook, FavoriteBook};

/// Most recommendations kept per genre
pub const RECOMMENDATION_CAP: usize = 20;

/// Drops candidates without an identifier, already favorited, or seen earlier
/// in `raw_candidates`. Keeps the first occurrence and the input order.
pub fn dedupe(
    raw_candidates: Vec<CandidateBook>,
    exclude_ids: &HashSet<String>,
) -> Vec<CandidateBook> {
    let mut seen: HashSet<String> = HashSet::with_capacity(raw_candidates.len());
    raw_candidates
        .into_iter()
        .filter(|book| match book.identifier() {
            Some(id) => !exclude_ids.contains(id) && seen.insert(id.to_string()),
            None => false,
        })
        .collect()
}

/// Uniformly shuffles `books` with `rng` and keeps at most `cap` of them
pub fn shuffle_and_cap<R>(mut books: Vec<CandidateBook>, rng: &mut R, cap: usize) -> Vec<CandidateBook>
where
    R: Rng + ?Sized,
{
    books.shuffle(rng);
    books.truncate(cap);
    books
}

/// ISBNs of the user's favorites, used as the exclusion set
pub fn favorite_isbns(favorites: &[FavoriteBook]) -> HashSet<String> {
    favorites.iter().map(|book| book.isbn.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn candidate(id: Option<&str>) -> CandidateBook {
        CandidateBook {
            id: id.map(str::to_string),
            title: format!("Title {}", id.unwrap_or("?")),
            authors: vec![],
            image_link: None,
            categories: vec![],
        }
    }

    fn ids(books: &[CandidateBook]) -> Vec<&str> {
        books.iter().filter_map(|b| b.identifier()).collect()
    }

    #[test]
    fn test_dedupe_excludes_and_keeps_first() {
        let raw = vec![
            candidate(Some("A")),
            candidate(Some("B")),
            candidate(Some("A")),
            candidate(Some("C")),
        ];
        let exclude: HashSet<String> = ["B".to_string()].into_iter().collect();

        let unique = dedupe(raw, &exclude);
        assert_eq!(ids(&unique), vec!["A", "C"]);
    }

    #[test]
    fn test_dedupe_then_shuffle_is_permutation() {
        let raw = vec![
            candidate(Some("A")),
            candidate(Some("B")),
            candidate(Some("A")),
            candidate(Some("C")),
        ];
        let exclude: HashSet<String> = ["B".to_string()].into_iter().collect();
        let mut rng = StdRng::seed_from_u64(7);

        let list = shuffle_and_cap(dedupe(raw, &exclude), &mut rng, RECOMMENDATION_CAP);
        let mut got = ids(&list);
        got.sort();
        assert_eq!(got, vec!["A", "C"]);
    }

    #[test]
    fn test_dedupe_drops_missing_identifiers() {
        let raw = vec![candidate(None), candidate(Some("")), candidate(Some("X"))];
        let unique = dedupe(raw, &HashSet::new());
        assert_eq!(ids(&unique), vec!["X"]);
    }

    #[test]
    fn test_dedupe_empty_input() {
        assert!(dedupe(vec![], &HashSet::new()).is_empty());
    }

    #[test]
    fn test_shuffle_caps_length() {
        let books: Vec<CandidateBook> = (0..35)
            .map(|i| candidate(Some(&i.to_string())))
            .collect();
        let mut rng = StdRng::seed_from_u64(42);

        let capped = shuffle_and_cap(books, &mut rng, RECOMMENDATION_CAP);
        assert_eq!(capped.len(), RECOMMENDATION_CAP);

        let unique: HashSet<&str> = ids(&capped).into_iter().collect();
        assert_eq!(unique.len(), RECOMMENDATION_CAP);
    }

    #[test]
    fn test_shuffle_keeps_short_lists_whole() {
        let books = vec![candidate(Some("A")), candidate(Some("B"))];
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(shuffle_and_cap(books, &mut rng, RECOMMENDATION_CAP).len(), 2);
    }

    #[test]
    fn test_same_seed_same_order() {
        let books: Vec<CandidateBook> = (0..10)
            .map(|i| candidate(Some(&i.to_string())))
            .collect();
        let first = shuffle_and_cap(books.clone(), &mut StdRng::seed_from_u64(3), 5);
        let second = shuffle_and_cap(books, &mut StdRng::seed_from_u64(3), 5);
        assert_eq!(first, second);
    }
}
