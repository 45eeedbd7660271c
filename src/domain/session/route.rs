//! Navigation targets the session subsystem can request.

use std::fmt;

/// A surface of the admin client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    /// The sign-in surface (`/login`).
    SignIn,
    /// The authenticated home surface (`/home`).
    Home,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::SignIn => "/login",
            Route::Home => "/home",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}
