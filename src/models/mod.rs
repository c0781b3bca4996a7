pub mod book;
pub mod genre;
pub mod user;

pub use book::{BookDetails, CandidateBook, FavoriteBook, NewFavorite};
pub use genre::{Genre, KNOWN_GENRES};
pub use user::{NewUser, UserProfile, DEMO_USER_ID};
