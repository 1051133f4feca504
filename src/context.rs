//! Application Context
//!
//! Session shell shared via the Leptos Context API: the token, the current
//! route and the means to build an API client that logs out on 401.

use leptos::prelude::*;
use wasm_bindgen::JsValue;

use trainit_core::auth::AuthGrant;
use trainit_core::{ApiClient, ApiConfig, HttpTransport, Route, Session};

use crate::storage::LocalStorage;

/// App-wide signals provided via context
#[derive(Clone, Copy)]
pub struct AppContext {
    /// Token and user - read
    pub session: ReadSignal<Session>,
    /// Token and user - write
    set_session: WriteSignal<Session>,
    /// Page being shown - read
    pub route: ReadSignal<Route>,
    /// Page being shown - write
    set_route: WriteSignal<Route>,
    config: StoredValue<ApiConfig>,
}

impl AppContext {
    pub fn new(
        session: (ReadSignal<Session>, WriteSignal<Session>),
        route: (ReadSignal<Route>, WriteSignal<Route>),
        config: ApiConfig,
    ) -> Self {
        Self {
            session: session.0,
            set_session: session.1,
            route: route.0,
            set_route: route.1,
            config: StoredValue::new(config),
        }
    }

    /// Current token, tracked
    pub fn token(&self) -> Option<String> {
        self.session.with(|s| s.token().map(str::to_string))
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.with_untracked(|s| s.is_authenticated())
    }

    /// Client carrying the current token. A 401 from any authorized call
    /// ends the session.
    pub fn api(&self) -> ApiClient<HttpTransport> {
        let ctx = *self;
        let token = self.session.with_untracked(|s| s.token().map(str::to_string));
        ApiClient::new(HttpTransport::new(self.config.get_value()))
            .with_token(token)
            .on_unauthorized(move || ctx.logout())
    }

    pub fn login(&self, grant: AuthGrant) {
        self.set_session
            .update(|s| s.login(&LocalStorage, grant.token, grant.user));
        self.navigate(Route::Landing);
    }

    pub fn logout(&self) {
        self.set_session.update(|s| s.logout(&LocalStorage));
        self.navigate(Route::Login);
    }

    /// Show a page and record it in the browser history
    pub fn navigate(&self, requested: Route) {
        let route = self.show(Some(requested));
        if current_path().as_deref() != Some(route.path()) {
            push_history(route);
        }
    }

    /// Show the page a requested route resolves to, without touching history
    pub fn show(&self, requested: Option<Route>) -> Route {
        let route = Route::resolve(requested, self.is_authenticated());
        if self.route.get_untracked() != route {
            log::debug!("[APP] route -> {}", route.path());
            self.set_route.set(route);
        }
        route
    }
}

// ========================
// Browser history
// ========================

pub fn current_path() -> Option<String> {
    web_sys::window()?.location().pathname().ok()
}

pub fn location_route() -> Option<Route> {
    current_path().and_then(|path| Route::from_path(&path))
}

fn push_history(route: Route) {
    if let Some(history) = web_sys::window().and_then(|w| w.history().ok()) {
        if let Err(e) = history.push_state_with_url(&JsValue::NULL, "", Some(route.path())) {
            log::warn!("[APP] pushState to {} failed: {:?}", route.path(), e);
        }
    }
}

/// Rewrite the address bar without adding an entry
pub fn replace_history(route: Route) {
    if let Some(history) = web_sys::window().and_then(|w| w.history().ok()) {
        if let Err(e) = history.replace_state_with_url(&JsValue::NULL, "", Some(route.path())) {
            log::warn!("[APP] replaceState to {} failed: {:?}", route.path(), e);
        }
    }
}
