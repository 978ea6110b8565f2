use serde::Serialize;

use crate::{
    entities::category::Category,
    errors::{AppError, FieldError},
};

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PageState {
    Ready,
    Error,
}

/// A list page. Read failures are logged and rendered as an empty list in
/// the `error` state.
#[derive(Debug, Serialize)]
pub struct ListView<T> {
    pub state: PageState,
    pub items: Vec<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ListView<T> {
    pub fn load<U>(result: Result<Vec<U>, AppError>, what: &str, render: impl Fn(&U) -> T) -> Self {
        match result {
            Ok(rows) => ListView {
                state: PageState::Ready,
                items: rows.iter().map(render).collect(),
                error: None,
            },
            Err(e) => {
                tracing::error!(error = %e, "failed to load {}", what);
                ListView {
                    state: PageState::Error,
                    items: Vec::new(),
                    error: None,
                }
            }
        }
    }

    /// Attaches the error of the mutation that preceded this refetch.
    pub fn with_error(mut self, error: Option<String>) -> Self {
        self.error = error;
        self
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FormState {
    Idle,
    Error,
}

/// A create/edit form with its draft echoed back.
#[derive(Debug, Serialize)]
pub struct FormView<D> {
    pub state: FormState,
    pub draft: D,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub field_errors: Vec<FieldError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<Category>>,
}

impl<D> FormView<D> {
    pub fn idle(draft: D) -> Self {
        FormView {
            state: FormState::Idle,
            draft,
            error: None,
            field_errors: Vec::new(),
            categories: None,
        }
    }

    pub fn failed(draft: D, error: &AppError) -> Self {
        let field_errors = match error {
            AppError::ValidationError(fields) => fields.clone(),
            _ => Vec::new(),
        };
        FormView {
            state: FormState::Error,
            draft,
            error: Some(error.to_string()),
            field_errors,
            categories: None,
        }
    }

    pub fn with_categories(mut self, categories: Vec<Category>) -> Self {
        self.categories = Some(categories);
        self
    }
}
