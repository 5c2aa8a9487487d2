use crate::backend::{document, unique_id, BackendClient, Collection, Query};
use crate::error::AppResult;
use crate::models::{NewProject, Project, ProjectPatch};

/// Project CRUD. Each method is one backend call; errors are logged and returned as-is.
#[derive(Clone)]
pub struct ProjectService {
    backend: BackendClient,
}

impl ProjectService {
    pub fn new(backend: BackendClient) -> Self {
        Self { backend }
    }

    pub async fn create(&self, data: &NewProject) -> AppResult<Project> {
        let result: AppResult<Project> = async {
            let payload = document::to_data(data)?;
            self.backend
                .collection(Collection::Projects)
                .create(&unique_id(), payload)
                .await?
                .into_record()
        }
        .await;
        result.inspect_err(|e| tracing::error!("Error creating project: {}", e))
    }

    pub async fn get(&self, id: &str) -> AppResult<Project> {
        let result: AppResult<Project> = async {
            self.backend
                .collection(Collection::Projects)
                .get(id)
                .await?
                .into_record()
        }
        .await;
        result.inspect_err(|e| tracing::error!("Error fetching project {}: {}", id, e))
    }

    /// Newest first. Visibility is left to the backend's document permissions:
    /// `user_id` and `is_admin` are accepted for callers but not turned into queries.
    pub async fn list(&self, user_id: &str, is_admin: bool) -> AppResult<Vec<Project>> {
        tracing::debug!(user_id, is_admin, "listing projects");
        let queries = [Query::order_desc("$createdAt")];
        let result: AppResult<Vec<Project>> = async {
            self.backend
                .collection(Collection::Projects)
                .list(&queries)
                .await?
                .into_records()
        }
        .await;
        result.inspect_err(|e| tracing::error!("Error listing projects: {}", e))
    }

    pub async fn update(&self, id: &str, patch: &ProjectPatch) -> AppResult<Project> {
        let result: AppResult<Project> = async {
            let payload = document::to_data(patch)?;
            self.backend
                .collection(Collection::Projects)
                .update(id, payload)
                .await?
                .into_record()
        }
        .await;
        result.inspect_err(|e| tracing::error!("Error updating project {}: {}", id, e))
    }

    /// Tasks and milestones referencing the project are left in place
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        self.backend
            .collection(Collection::Projects)
            .delete(id)
            .await
            .inspect_err(|e| tracing::error!("Error deleting project {}: {}", id, e))
    }

    /// No backend call when the user is already a member
    pub async fn add_member(&self, project: &Project, user_id: &str) -> AppResult<Project> {
        if project.has_member(user_id) {
            return Ok(project.clone());
        }
        let mut members = project.member_ids.clone();
        members.push(user_id.to_string());
        self.update(&project.id, &ProjectPatch::members(members))
            .await
            .inspect_err(|e| tracing::error!("Error adding member to project: {}", e))
    }

    /// No backend call when the user is not a member
    pub async fn remove_member(&self, project: &Project, user_id: &str) -> AppResult<Project> {
        if !project.has_member(user_id) {
            return Ok(project.clone());
        }
        let members: Vec<String> = project
            .member_ids
            .iter()
            .filter(|m| *m != user_id)
            .cloned()
            .collect();
        self.update(&project.id, &ProjectPatch::members(members))
            .await
            .inspect_err(|e| tracing::error!("Error removing member from project: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::ProjectStatus;
    use crate::testing::MemoryBackend;
    use chrono::{TimeZone, Utc};

    fn alpha() -> NewProject {
        NewProject {
            name: "Alpha".to_string(),
            description: Some("First".to_string()),
            start_date: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            end_date: Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap(),
            status: ProjectStatus::Active,
            owner_id: "u1".to_string(),
        }
    }

    #[tokio::test]
    async fn create_then_get_round_trips_fields() {
        let backend = MemoryBackend::new();
        let service = ProjectService::new(backend.client());

        let created = service.create(&alpha()).await.unwrap();
        let fetched = service.get(&created.id).await.unwrap();

        assert_eq!(fetched.name, "Alpha");
        assert_eq!(fetched.start_date, alpha().start_date);
        assert_eq!(fetched.end_date, alpha().end_date);
        assert_eq!(fetched.status, ProjectStatus::Active);
        assert_eq!(fetched.created_at, created.created_at);
    }

    #[tokio::test]
    async fn update_merges_single_field() {
        let backend = MemoryBackend::new();
        let service = ProjectService::new(backend.client());
        let created = service.create(&alpha()).await.unwrap();

        service
            .update(&created.id, &ProjectPatch::status(ProjectStatus::Completed))
            .await
            .unwrap();
        let fetched = service.get(&created.id).await.unwrap();

        assert_eq!(fetched.status, ProjectStatus::Completed);
        assert_eq!(fetched.name, created.name);
        assert_eq!(fetched.description, created.description);
        assert_eq!(fetched.start_date, created.start_date);
        assert_eq!(fetched.owner_id, created.owner_id);
    }

    #[tokio::test]
    async fn delete_then_get_is_not_found() {
        let backend = MemoryBackend::new();
        let service = ProjectService::new(backend.client());
        let created = service.create(&alpha()).await.unwrap();

        service.delete(&created.id).await.unwrap();
        assert!(matches!(service.get(&created.id).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn list_is_newest_first_and_ignores_owner() {
        let backend = MemoryBackend::new();
        let service = ProjectService::new(backend.client());
        let first = service.create(&alpha()).await.unwrap();
        let mut other = alpha();
        other.name = "Beta".to_string();
        other.owner_id = "u2".to_string();
        let second = service.create(&other).await.unwrap();

        let listed = service.list("u1", false).await.unwrap();
        let ids: Vec<&str> = listed.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec![second.id.as_str(), first.id.as_str()]);
    }

    #[tokio::test]
    async fn membership_changes_only_when_needed() {
        let backend = MemoryBackend::new();
        let service = ProjectService::new(backend.client());
        let project = service.create(&alpha()).await.unwrap();

        let with_member = service.add_member(&project, "u9").await.unwrap();
        assert_eq!(with_member.member_ids, vec!["u9".to_string()]);

        let calls_before = backend.calls().len();
        let unchanged = service.add_member(&with_member, "u9").await.unwrap();
        assert_eq!(unchanged, with_member);
        assert_eq!(backend.calls().len(), calls_before);

        let removed = service.remove_member(&with_member, "u9").await.unwrap();
        assert!(removed.member_ids.is_empty());
    }

    #[tokio::test]
    async fn errors_propagate_unchanged() {
        let backend = MemoryBackend::new();
        let service = ProjectService::new(backend.client());
        backend.fail_next(AppError::remote(403, Some("user_unauthorized".into()), "denied"));

        match service.list("u1", false).await {
            Err(AppError::Remote { status, message, .. }) => {
                assert_eq!(status, 403);
                assert_eq!(message, "denied");
            }
            other => panic!("unexpected: {:?}", other.map(|p| p.len())),
        }
    }
}
