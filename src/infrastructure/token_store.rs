use std::collections::HashSet;
use std::sync::RwLock;

use crate::domain::patient_data::AccessToken;

/// Registry of issued access tokens.
pub trait TokenStore: Send + Sync {
    /// Add a token. Returns `false` if it was already present.
    fn register(&self, token: &AccessToken) -> bool;
    fn is_valid(&self, token: &AccessToken) -> bool;
}

/// Process-local token set. Cleared on restart; tokens never expire.
#[derive(Debug, Default)]
pub struct InMemoryTokenStore {
    tokens: RwLock<HashSet<AccessToken>>,
}

impl InMemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tokens
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TokenStore for InMemoryTokenStore {
    fn register(&self, token: &AccessToken) -> bool {
        // The set is only ever inserted into, so a poisoned lock still holds
        // a consistent value.
        self.tokens
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(token.clone())
    }

    fn is_valid(&self, token: &AccessToken) -> bool {
        self.tokens
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .contains(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_register_and_validate() {
        let store = InMemoryTokenStore::new();
        let token = AccessToken::generate();

        assert!(!store.is_valid(&token));
        assert!(store.register(&token));
        assert!(store.is_valid(&token));
        assert!(!store.register(&token));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_unknown_token_is_invalid() {
        let store = InMemoryTokenStore::new();
        store.register(&AccessToken::generate());
        let other = AccessToken::from_header_value("6f1c2e7a-0000-4000-8000-000000000000").unwrap();
        assert!(!store.is_valid(&other));
    }

    #[test]
    fn test_concurrent_registration() {
        let store = Arc::new(InMemoryTokenStore::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                std::thread::spawn(move || {
                    for _ in 0..50 {
                        store.register(&AccessToken::generate());
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(store.len(), 400);
    }
}
