use url::Url;

use crate::error::AppResult;
use crate::router::Route;

use super::PageContext;

pub struct LoginPage {
    ctx: PageContext,
}

impl LoginPage {
    pub fn new(ctx: PageContext) -> Self {
        Self { ctx }
    }

    /// Signed-in visitors are sent on to the dashboard
    pub fn enter(&self) -> Option<Route> {
        self.ctx.session.identity().map(|_| Route::Dashboard)
    }

    pub fn sign_in_with_google(&self) -> AppResult<Url> {
        self.ctx
            .session
            .login_with_google()
            .inspect_err(|_| self.ctx.app.notify_error("Google Sign-In failed. Please try again."))
    }
}
