use crate::{
    entities::contact::{ContactDraft, ContactInsert, ContactSubmission, StatusChangeRequest},
    errors::AppError,
    repositories::contact::ContactRepository,
    utils::valid_id::valid_uuid,
};

pub struct ContactHandler<R>
where
    R: ContactRepository,
{
    pub contact_repo: R,
}

impl<R> ContactHandler<R>
where
    R: ContactRepository,
{
    pub fn new(contact_repo: R) -> Self {
        ContactHandler { contact_repo }
    }

    /// Validates and stores a public contact form submission. Invalid drafts
    /// never reach the backend.
    pub async fn submit(&self, draft: ContactDraft) -> Result<(), AppError> {
        let insert = ContactInsert::try_from(draft)?;
        self.contact_repo.create(&insert).await?;

        tracing::info!("contact submission received");
        Ok(())
    }

    pub async fn submissions(&self, token: &str) -> Result<Vec<ContactSubmission>, AppError> {
        self.contact_repo.list_all(token).await
    }

    /// Sets the requested status, or advances to the next one in the cycle.
    pub async fn change_status(
        &self,
        id: &str,
        request: StatusChangeRequest,
        token: &str,
    ) -> Result<ContactSubmission, AppError> {
        let id = valid_uuid(id)?;
        let status = match request.status {
            Some(status) => status,
            None => self.contact_repo.get_by_id(id, token).await?.status.next(),
        };
        self.contact_repo.set_status(id, status, token).await
    }
}
