//! Load and mutate helpers shared by every page.
//!
//! A load marks the page loading, fetches, stores the result and clears the
//! flag. A failed load raises an error notification and keeps whatever was
//! shown before. A mutation holds a busy guard for its duration and announces
//! the outcome; callers follow a successful mutation with a full reload.

use std::future::Future;

use crate::error::{AppError, AppResult};

use super::PageContext;

/// Page-local data slot
#[derive(Debug, Clone, PartialEq)]
pub struct PageData<T> {
    data: Option<T>,
    loading: bool,
}

impl<T> Default for PageData<T> {
    fn default() -> Self {
        Self {
            data: None,
            loading: false,
        }
    }
}

impl<T> PageData<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }
}

impl PageContext {
    pub async fn load<T, F>(&self, slot: &mut PageData<T>, failure: &str, fetch: F) -> AppResult<()>
    where
        F: Future<Output = AppResult<T>>,
    {
        slot.loading = true;
        let result = fetch.await;
        slot.loading = false;
        match result {
            Ok(data) => {
                slot.data = Some(data);
                Ok(())
            }
            Err(e) => Err(self.report(failure, e)),
        }
    }

    pub async fn mutate<R, F>(&self, success: &str, failure: &str, action: F) -> AppResult<R>
    where
        F: Future<Output = AppResult<R>>,
    {
        let _busy = self.app.begin_busy();
        match action.await {
            Ok(value) => {
                self.app.notify_success(success);
                Ok(value)
            }
            Err(e) => Err(self.report(failure, e)),
        }
    }

    /// Shows the failure and hands the error back
    pub(crate) fn report(&self, failure: &str, err: AppError) -> AppError {
        self.session.invalidate_on(&err);
        self.app.notify_error(format!("{}: {}", failure, err));
        err
    }
}
