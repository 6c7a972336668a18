// Error types shared by the services and the planner board

use thiserror::Error;

use crate::services::store::StoreError;

/// Operator input rejected before any store call is attempted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Debes indicar una causa para mover la tarea.")]
    EmptyMoveReason,
    #[error("Debes indicar el motivo de la eliminacion.")]
    EmptyDeleteReason,
    #[error("El comentario no puede estar vacio.")]
    EmptyComment,
    #[error("Campo requerido: {0}")]
    MissingField(&'static str),
}

/// Failure of a single user-initiated board action.
#[derive(Debug, Error)]
pub enum PlannerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("store request failed: {0}")]
    Store(#[from] StoreError),
    #[error("{0} requires administrative capability")]
    Unauthorized(&'static str),
    #[error("{resource} #{id} is not loaded on the board")]
    NotLoaded { resource: &'static str, id: i64 },
    #[error("no {0} dialog is open")]
    NoActiveDialog(&'static str),
}

impl PlannerError {
    pub fn is_validation(&self) -> bool {
        matches!(self, PlannerError::Validation(_))
    }
}

pub type PlannerResult<T> = Result<T, PlannerError>;
