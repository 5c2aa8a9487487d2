pub mod app;
pub mod session;

pub use app::{AppState, BusyGuard, FilePreferences, MemoryPreferences, Notification, PreferenceStore, Severity, ThemeMode};
pub use session::{SessionContext, SessionState, SessionStatus};
