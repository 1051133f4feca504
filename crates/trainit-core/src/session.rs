//! Session and Route Gating
//!
//! The session owns the bearer token and user identity. The token is
//! mirrored to a [`TokenStore`] (browser local storage in the app) so a
//! reload starts in the authenticated route tree.

use crate::models::User;

/// Persistent home of the bearer token
pub trait TokenStore {
    fn load(&self) -> Option<String>;
    fn save(&self, token: &str);
    fn clear(&self);
}

/// Process-memory store shared by clones
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct MemoryTokenStore {
    token: std::rc::Rc<std::cell::RefCell<Option<String>>>,
}

#[cfg(test)]
impl MemoryTokenStore {
    pub fn with_token(token: &str) -> Self {
        Self {
            token: std::rc::Rc::new(std::cell::RefCell::new(Some(token.to_string()))),
        }
    }
}

#[cfg(test)]
impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Option<String> {
        self.token.borrow().clone()
    }

    fn save(&self, token: &str) {
        *self.token.borrow_mut() = Some(token.to_string());
    }

    fn clear(&self) {
        *self.token.borrow_mut() = None;
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Session {
    token: Option<String>,
    user: Option<User>,
}

impl Session {
    /// Pick up a token persisted by an earlier visit
    pub fn restore(store: &impl TokenStore) -> Self {
        Self {
            token: store.load().filter(|t| !t.is_empty()),
            user: None,
        }
    }

    pub fn login(&mut self, store: &impl TokenStore, token: String, user: User) {
        log::info!("[SESSION] logged in as {}", user.email);
        store.save(&token);
        self.token = Some(token);
        self.user = Some(user);
    }

    pub fn logout(&mut self, store: &impl TokenStore) {
        if self.token.is_some() {
            log::info!("[SESSION] logged out");
        }
        store.clear();
        self.token = None;
        self.user = None;
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

/// Pages of the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Signup,
    Landing,
    Animals,
    PlanBuilder,
    PlanExplorer,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Signup => "/signup",
            Route::Landing => "/",
            Route::Animals => "/animals",
            Route::PlanBuilder => "/training-plans",
            Route::PlanExplorer => "/view-plans",
        }
    }

    pub fn from_path(path: &str) -> Option<Route> {
        let trimmed = path.trim_end_matches('/');
        match trimmed {
            "" => Some(Route::Landing),
            "/login" => Some(Route::Login),
            "/signup" => Some(Route::Signup),
            "/animals" => Some(Route::Animals),
            "/training-plans" => Some(Route::PlanBuilder),
            "/view-plans" => Some(Route::PlanExplorer),
            _ => None,
        }
    }

    /// Reachable without a token
    pub fn is_public(&self) -> bool {
        matches!(self, Route::Login | Route::Signup)
    }

    /// Page actually rendered for a requested route.
    ///
    /// Without a token only the auth pages exist and everything else falls
    /// back to login. With a token every page is reachable and unknown
    /// paths land on the dashboard.
    pub fn resolve(requested: Option<Route>, authenticated: bool) -> Route {
        match (requested, authenticated) {
            (Some(route), true) => route,
            (None, true) => Route::Landing,
            (Some(route), false) if route.is_public() => route,
            (_, false) => Route::Login,
        }
    }
}
