pub mod cache;

mod macros;

pub use cache::{
    create_redis_client, Cache, CacheKey, CacheWriterHandle, ISBN_LOOKUP_TTL, SUBJECT_SEARCH_TTL,
};
