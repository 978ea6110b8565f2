use crate::{
    entities::project::{Project, ProjectDraft, ProjectInsert, ProjectUpdate},
    errors::AppError,
    repositories::project::ProjectRepository,
    utils::valid_id::valid_row_id,
};

pub struct PortfolioHandler<R>
where
    R: ProjectRepository,
{
    pub project_repo: R,
}

impl<R> PortfolioHandler<R>
where
    R: ProjectRepository,
{
    pub fn new(project_repo: R) -> Self {
        PortfolioHandler { project_repo }
    }

    /// Projects newest first; `None` lists all of them.
    pub async fn projects(&self, limit: Option<usize>) -> Result<Vec<Project>, AppError> {
        self.project_repo.list_recent(limit).await
    }

    pub async fn project_draft(&self, id: &str) -> Result<ProjectDraft, AppError> {
        let id = valid_row_id(id)?;
        let project = self.project_repo.get_by_id(id).await?;
        Ok(ProjectDraft::from(&project))
    }

    pub async fn create_project(&self, draft: ProjectDraft, token: &str) -> Result<Project, AppError> {
        let insert = ProjectInsert::try_from(draft)?;
        let project = self.project_repo.create(&insert, token).await?;

        tracing::info!(project_id = project.id, slug = %project.slug, "project created");
        Ok(project)
    }

    pub async fn update_project(&self, id: &str, draft: ProjectDraft, token: &str) -> Result<Project, AppError> {
        let id = valid_row_id(id)?;
        let update = ProjectUpdate::try_from(draft)?;
        self.project_repo.update(id, &update, token).await
    }

    pub async fn delete_project(&self, id: &str, token: &str) -> Result<(), AppError> {
        let id = valid_row_id(id)?;
        self.project_repo.delete(id, token).await
    }
}
