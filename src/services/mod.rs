pub mod bookshelf;
pub mod catalog;
pub mod dedupe;
pub mod matcher;
pub mod recommendations;
pub mod session;
pub mod window;

pub use catalog::{BookCatalog, GoogleBooksCatalog};
pub use recommendations::Recommender;
pub use session::{BrowsingSession, SessionRegistry};
