use serde::Serialize;
use std::collections::HashMap;

use crate::models::FavoriteBook;

/// Shelf used for books without categories
pub const DEFAULT_SHELF: &str = "Fiction";

pub const DEFAULT_BOOKS_PER_ROW: usize = 15;
pub const MIN_BOOKS_PER_ROW: usize = 5;
pub const MAX_BOOKS_PER_ROW: usize = 20;

/// Many-to-one mapping from top-level catalog categories to shelf names
#[derive(Debug, Clone)]
pub struct CategoryAliases(HashMap<String, String>);

const DEFAULT_ALIASES: &[(&str, &str)] = &[
    ("Body, Mind & Spirit", "Self-Help"),
    ("Body, Mind, Spirit", "Self-Help"),
    ("Self-Help", "Self-Help"),
    ("Health & Fitness", "Self-Help"),
    ("Psychology", "Self-Help"),
    ("Philosophy", "Self-Help"),
    ("Religion", "Self-Help"),
    ("Juvenile Fiction", "Young Adult"),
    ("Juvenile Nonfiction", "Young Adult"),
    ("Young Adult Fiction", "Young Adult"),
    ("Young Adult Nonfiction", "Young Adult"),
    ("Comics & Graphic Novels", "Graphic Novels"),
    ("True Crime", "Crime"),
    ("Literary Criticism", "Non-Fiction"),
    ("Literary Collections", "Non-Fiction"),
    ("Cooking", "Non-Fiction"),
    ("Travel", "Non-Fiction"),
    ("Business & Economics", "Non-Fiction"),
    ("Political Science", "Non-Fiction"),
    ("Social Science", "Non-Fiction"),
    ("Science", "Non-Fiction"),
    ("Technology & Engineering", "Non-Fiction"),
    ("Mathematics", "Non-Fiction"),
    ("Medical", "Non-Fiction"),
    ("Law", "Non-Fiction"),
    ("Education", "Non-Fiction"),
    ("Architecture", "Non-Fiction"),
    ("Art", "Non-Fiction"),
    ("Music", "Non-Fiction"),
    ("Performing Arts", "Non-Fiction"),
    ("Photography", "Non-Fiction"),
    ("Crafts & Hobbies", "Non-Fiction"),
    ("Games & Activities", "Non-Fiction"),
    ("Gardening", "Non-Fiction"),
    ("House & Home", "Non-Fiction"),
    ("Nature", "Non-Fiction"),
    ("Pets", "Non-Fiction"),
    ("Sports & Recreation", "Non-Fiction"),
    ("Transportation", "Non-Fiction"),
];

impl Default for CategoryAliases {
    fn default() -> Self {
        Self::new(
            DEFAULT_ALIASES
                .iter()
                .map(|(from, to)| (from.to_string(), to.to_string()))
                .collect(),
        )
    }
}

impl CategoryAliases {
    pub fn new(aliases: HashMap<String, String>) -> Self {
        Self(aliases)
    }

    /// Shelf name for a top-level category, or the category itself
    pub fn resolve<'a>(&'a self, category: &'a str) -> &'a str {
        self.0.get(category).map(String::as_str).unwrap_or(category)
    }
}

/// Favorites sharing a shelf
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Shelf {
    pub genre: String,
    pub books: Vec<FavoriteBook>,
}

/// Shelf a favorite belongs on: the first segment of its first category,
/// through the alias table. Books without categories go to [`DEFAULT_SHELF`];
/// an empty segment is kept as an unnamed "" shelf.
pub fn shelf_key(book: &FavoriteBook, aliases: &CategoryAliases) -> String {
    match book.categories.first() {
        Some(category) => {
            let segment = category.split('/').next().map_or("", str::trim);
            aliases.resolve(segment).to_string()
        }
        None => DEFAULT_SHELF.to_string(),
    }
}

/// Groups favorites into shelves, ordered by first appearance
pub fn group_by_category(favorites: &[FavoriteBook], aliases: &CategoryAliases) -> Vec<Shelf> {
    let mut shelves: Vec<Shelf> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for book in favorites {
        let key = shelf_key(book, aliases);
        match positions.get(&key) {
            Some(&index) => shelves[index].books.push(book.clone()),
            None => {
                positions.insert(key.clone(), shelves.len());
                shelves.push(Shelf {
                    genre: key,
                    books: vec![book.clone()],
                });
            }
        }
    }

    shelves
}

/// Shelf names in alphabetical order, for the genre filter
pub fn shelf_names(shelves: &[Shelf]) -> Vec<String> {
    let mut names: Vec<String> = shelves.iter().map(|shelf| shelf.genre.clone()).collect();
    names.sort();
    names
}

/// Splits a shelf into rows of `per_row` books (clamped to 5..=20)
pub fn split_into_rows(books: &[FavoriteBook], per_row: usize) -> Vec<Vec<FavoriteBook>> {
    let per_row = per_row.clamp(MIN_BOOKS_PER_ROW, MAX_BOOKS_PER_ROW);
    books.chunks(per_row).map(<[FavoriteBook]>::to_vec).collect()
}
