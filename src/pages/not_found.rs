use crate::router::Route;

/// Catch-all for unknown paths; public
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotFoundPage {
    pub path: String,
}

impl NotFoundPage {
    pub const TITLE: &'static str = "404: Page Not Found";
    pub const MESSAGE: &'static str =
        "Oops! The page you are looking for does not exist. It might have been moved or deleted.";

    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    pub fn home(&self) -> Route {
        Route::Dashboard
    }
}
