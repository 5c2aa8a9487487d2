pub mod project;
pub mod task;
pub mod user;

pub use project::{NewProject, Project, ProjectPatch, ProjectStatus};
pub use task::{NewTask, Task, TaskFilters, TaskPatch, TaskPriority, TaskSort, TaskStatus};
pub use user::{initials, Identity, Role, Session, User};

use serde::{Deserialize, Deserializer};

/// The backend sends `null` for unset list attributes
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
