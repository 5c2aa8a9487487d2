use chrono::{DateTime, Utc};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::error::AppResult;
use crate::models::{NewProject, Project, ProjectPatch, ProjectStatus};

/// Staged project edits; nothing leaves the form until `submit` passes
#[derive(Debug, Clone, Default, PartialEq, Validate)]
pub struct ProjectForm {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    pub description: String,
    #[validate(required(message = "Start date is required"))]
    pub start_date: Option<DateTime<Utc>>,
    #[validate(required(message = "End date is required"))]
    pub end_date: Option<DateTime<Utc>>,
    pub status: ProjectStatus,
}

impl ProjectForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prefill for edit mode
    pub fn from_project(project: &Project) -> Self {
        Self {
            name: project.name.clone(),
            description: project.description.clone().unwrap_or_default(),
            start_date: Some(project.start_date),
            end_date: Some(project.end_date),
            status: project.status,
        }
    }

    fn check(&self) -> AppResult<(DateTime<Utc>, DateTime<Utc>)> {
        let mut errors = match self.validate() {
            Ok(()) => ValidationErrors::new(),
            Err(errors) => errors,
        };
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if end < start {
                errors.add(
                    "end_date",
                    ValidationError::new("date_order").with_message("End Date cannot be before Start Date.".into()),
                );
            }
        }
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) if errors.is_empty() => Ok((start, end)),
            _ => Err(errors.into()),
        }
    }

    fn description(&self) -> Option<String> {
        if self.description.is_empty() {
            None
        } else {
            Some(self.description.clone())
        }
    }

    /// Create payload owned by `owner_id`
    pub fn submit(&self, owner_id: &str) -> AppResult<NewProject> {
        let (start_date, end_date) = self.check()?;
        Ok(NewProject {
            name: self.name.clone(),
            description: self.description(),
            start_date,
            end_date,
            status: self.status,
            owner_id: owner_id.to_string(),
        })
    }

    /// Edit payload with every form field; a blank description is sent as null.
    /// The owner is never changed.
    pub fn submit_patch(&self) -> AppResult<ProjectPatch> {
        let (start_date, end_date) = self.check()?;
        Ok(ProjectPatch {
            name: Some(self.name.clone()),
            description: Some(self.description()),
            start_date: Some(start_date),
            end_date: Some(end_date),
            status: Some(self.status),
            member_ids: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use chrono::TimeZone;

    fn day(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn missing_fields_are_reported() {
        let err = ProjectForm::new().submit("u1").unwrap_err();
        let fields: Vec<&str> = err.field_errors().iter().map(|f| f.field.as_str()).collect();
        assert_eq!(fields, vec!["end_date", "name", "start_date"]);
        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[test]
    fn end_before_start_is_rejected() {
        let form = ProjectForm {
            name: "Alpha".into(),
            start_date: Some(day(2024, 6, 1)),
            end_date: Some(day(2024, 1, 1)),
            ..Default::default()
        };
        let err = form.submit("u1").unwrap_err();
        assert_eq!(err.to_string(), "End Date cannot be before Start Date.");
    }

    #[test]
    fn same_day_is_valid() {
        let form = ProjectForm {
            name: "Alpha".into(),
            start_date: Some(day(2024, 1, 1)),
            end_date: Some(day(2024, 1, 1)),
            ..Default::default()
        };
        let payload = form.submit("u1").unwrap();
        assert_eq!(payload.owner_id, "u1");
        assert_eq!(payload.description, None);
        assert_eq!(payload.status, ProjectStatus::Active);
    }

    #[test]
    fn blank_description_clears_on_edit() {
        let form = ProjectForm {
            name: "Alpha".into(),
            start_date: Some(day(2024, 1, 1)),
            end_date: Some(day(2024, 2, 1)),
            ..Default::default()
        };
        let patch = form.submit_patch().unwrap();
        assert_eq!(patch.description, Some(None));
        let wire = serde_json::to_value(&patch).unwrap();
        assert!(wire["description"].is_null());
        assert!(wire.as_object().unwrap().contains_key("description"));
    }
}
