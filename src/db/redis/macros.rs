/// Read-through caching around a catalog fetch.
///
/// Returns the cached value on a hit. On a miss (or when Redis cannot be
/// read) awaits `$fetch`, queues the result for caching, and returns it.
/// Fetch errors propagate and are not cached.
///
/// # Example
/// ```rust,ignore
/// cached!(cache, CacheKey::IsbnLookup(isbn.to_string()), ISBN_LOOKUP_TTL, self.fetch(isbn))
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $fetch:expr) => {{
        let key = $key;
        let hit = match $cache.get_from_cache(&key).await {
            Ok(hit) => hit,
            Err(e) => {
                tracing::warn!(error = %e, key = %key, "Cache read failed, fetching instead");
                None
            }
        };

        match hit {
            Some(value) => {
                tracing::debug!(key = %key, "Cache hit");
                Ok(value)
            }
            None => {
                let value = $fetch.await?;
                $cache.set_in_background(&key, &value, $ttl);
                Ok(value)
            }
        }
    }};
}
