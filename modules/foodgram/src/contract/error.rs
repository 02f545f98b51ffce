use thiserror::Error;

/// Errors that are safe to expose to other modules
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FoodgramError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: i32 },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Authentication required")]
    Unauthorized,

    #[error("Permission denied")]
    Forbidden,

    #[error("Internal error")]
    Internal,
}

impl FoodgramError {
    pub fn not_found(entity: &'static str, id: i32) -> Self {
        Self::NotFound { entity, id }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

impl From<crate::domain::error::DomainError> for FoodgramError {
    fn from(domain_error: crate::domain::error::DomainError) -> Self {
        use crate::domain::error::DomainError::*;
        match domain_error {
            RecipeNotFound { id } => Self::not_found("recipe", id),
            UserNotFound { id } => Self::not_found("user", id),
            IngredientNotFound { id } => Self::not_found("ingredient", id),
            NotInRelation { recipe_id, .. } => Self::not_found("recipe", recipe_id),
            NotSubscribed { author_id } => Self::not_found("subscription", author_id),
            Validation { field, message } => Self::validation(format!("{field}: {message}")),
            e @ (AlreadyInRelation { .. }
            | SelfSubscription
            | AlreadySubscribed { .. }
            | EmailAlreadyExists { .. }
            | UsernameAlreadyExists { .. }
            | InvalidCredentials
            | AvatarMissing) => Self::validation(e.to_string()),
            InvalidToken => Self::Unauthorized,
            NotAuthor { .. } => Self::Forbidden,
            Database { .. } | Storage { .. } | Internal { .. } => Self::Internal,
        }
    }
}
