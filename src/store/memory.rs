//! Thread-safe in-memory [`TokenStore`] implementation for local development and tests.

// self
use crate::{
	_prelude::*,
	auth::Token,
	store::{StoreFuture, StoreKey, TokenStore},
};

#[derive(Clone, Debug)]
struct Entry {
	token: Token,
	deadline: Option<OffsetDateTime>,
}

type StoreMap = Arc<RwLock<HashMap<StoreKey, Entry>>>;

/// Thread-safe cache backend that keeps tokens in-process for tests and demos.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(StoreMap);
impl MemoryStore {
	fn get_now(map: StoreMap, key: StoreKey) -> Option<Token> {
		let now = OffsetDateTime::now_utc();
		let mut guard = map.write();
		let stale = guard
			.get(&key)
			.is_some_and(|entry| entry.deadline.is_some_and(|deadline| now >= deadline));

		if stale {
			guard.remove(&key);

			return None;
		}

		guard.get(&key).map(|entry| entry.token.clone())
	}

	fn set_now(map: StoreMap, key: StoreKey, token: Token, ttl: Option<Duration>) {
		let deadline = ttl.map(|ttl| OffsetDateTime::now_utc() + ttl);

		map.write().insert(key, Entry { token, deadline });
	}
}
impl TokenStore for MemoryStore {
	fn get<'a>(&'a self, key: &'a StoreKey) -> StoreFuture<'a, Option<Token>> {
		let map = self.0.clone();
		let key = key.to_owned();

		Box::pin(async move { Ok(Self::get_now(map, key)) })
	}

	fn set(&self, key: StoreKey, token: Token, ttl: Option<Duration>) -> StoreFuture<'_, ()> {
		let map = self.0.clone();

		Box::pin(async move {
			Self::set_now(map, key, token, ttl);

			Ok(())
		})
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::credentials::ClientCredentials;

	fn key(id: &str) -> StoreKey {
		let endpoint =
			Url::parse("https://auth.example.com/token").expect("Endpoint fixture should parse.");

		StoreKey::for_credentials(&ClientCredentials::new(id, "secret", endpoint))
	}

	#[tokio::test]
	async fn set_then_get_round_trips() {
		let store = MemoryStore::default();
		let token = Token::new("cached", "bearer");

		store
			.set(key("svc"), token.clone(), Some(Duration::minutes(5)))
			.await
			.expect("Memory store writes should succeed.");

		let fetched = store.get(&key("svc")).await.expect("Memory store reads should succeed.");

		assert_eq!(fetched, Some(token));
	}

	#[tokio::test]
	async fn entries_without_ttl_persist() {
		let store = MemoryStore::default();

		store
			.set(key("svc"), Token::new("forever", "bearer"), None)
			.await
			.expect("Memory store writes should succeed.");

		let fetched = store.get(&key("svc")).await.expect("Memory store reads should succeed.");

		assert!(fetched.is_some());
	}

	#[tokio::test]
	async fn elapsed_ttl_evicts_the_entry() {
		let store = MemoryStore::default();

		store
			.set(key("svc"), Token::new("stale", "bearer"), Some(Duration::ZERO))
			.await
			.expect("Memory store writes should succeed.");

		let fetched = store.get(&key("svc")).await.expect("Memory store reads should succeed.");

		assert_eq!(fetched, None);
	}

	#[tokio::test]
	async fn unknown_key_misses() {
		let store = MemoryStore::default();

		assert_eq!(
			store.get(&key("missing")).await.expect("Memory store reads should succeed."),
			None
		);
	}
}
