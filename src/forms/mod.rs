pub mod project_form;
pub mod task_form;

pub use project_form::ProjectForm;
pub use task_form::TaskForm;
