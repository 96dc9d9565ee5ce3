//! Route awareness for the 401 handler.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Route of the login screen.
pub const LOGIN_ROUTE: &str = "/login";

/// What the adapter needs to know about the presentation layer's routing.
pub trait Navigator: Send + Sync {
    /// A 401 received here is a wrong-password answer, not an expired session.
    fn on_login_route(&self) -> bool;

    /// Send the user to the login screen.
    fn redirect_to_login(&self);
}

/// Keeps the current route in memory.
#[derive(Debug)]
pub struct RouteNavigator {
    route: Mutex<String>,
    redirects: AtomicUsize,
}

impl Default for RouteNavigator {
    fn default() -> Self {
        Self::new("/")
    }
}

impl RouteNavigator {
    pub fn new(route: impl Into<String>) -> Self {
        Self {
            route: Mutex::new(route.into()),
            redirects: AtomicUsize::new(0),
        }
    }

    pub fn navigate(&self, route: impl Into<String>) {
        let route = route.into();
        tracing::trace!(%route, "navigate");
        *self.route.lock().unwrap_or_else(std::sync::PoisonError::into_inner) = route;
    }

    #[must_use]
    pub fn current_route(&self) -> String {
        self.route
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    /// How many times the 401 handler sent the user to login.
    #[must_use]
    pub fn redirect_count(&self) -> usize {
        self.redirects.load(Ordering::SeqCst)
    }
}

impl Navigator for RouteNavigator {
    fn on_login_route(&self) -> bool {
        self.current_route() == LOGIN_ROUTE
    }

    fn redirect_to_login(&self) {
        self.redirects.fetch_add(1, Ordering::SeqCst);
        self.navigate(LOGIN_ROUTE);
    }
}
