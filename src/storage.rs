//! Browser Token Storage
//!
//! Persists the bearer token in `localStorage` so a reload keeps the session.

use trainit_core::{TokenStore, TOKEN_STORAGE_KEY};

#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorage;

fn storage() -> Option<web_sys::Storage> {
    web_sys::window()?.local_storage().ok().flatten()
}

impl TokenStore for LocalStorage {
    fn load(&self) -> Option<String> {
        storage()?.get_item(TOKEN_STORAGE_KEY).ok().flatten()
    }

    fn save(&self, token: &str) {
        match storage() {
            Some(s) => {
                if s.set_item(TOKEN_STORAGE_KEY, token).is_err() {
                    log::warn!("[STORAGE] could not persist token");
                }
            }
            None => log::warn!("[STORAGE] localStorage unavailable, session will not survive reload"),
        }
    }

    fn clear(&self) {
        if let Some(s) = storage() {
            if s.remove_item(TOKEN_STORAGE_KEY).is_err() {
                log::warn!("[STORAGE] could not remove token");
            }
        }
    }
}
