use thiserror::Error;

use crate::contract::model::RecipeRelation;

/// Domain-specific errors using thiserror
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Recipe not found: {id}")]
    RecipeNotFound { id: i32 },

    #[error("User not found: {id}")]
    UserNotFound { id: i32 },

    #[error("Ingredient not found: {id}")]
    IngredientNotFound { id: i32 },

    #[error("Validation failed: {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Recipe {recipe_id} is already in {}", .relation.label())]
    AlreadyInRelation {
        relation: RecipeRelation,
        recipe_id: i32,
    },

    #[error("Recipe {recipe_id} is not in {}", .relation.label())]
    NotInRelation {
        relation: RecipeRelation,
        recipe_id: i32,
    },

    #[error("Cannot subscribe to yourself")]
    SelfSubscription,

    #[error("Already subscribed to author {author_id}")]
    AlreadySubscribed { author_id: i32 },

    #[error("Not subscribed to author {author_id}")]
    NotSubscribed { author_id: i32 },

    #[error("User with email '{email}' already exists")]
    EmailAlreadyExists { email: String },

    #[error("User with username '{username}' already exists")]
    UsernameAlreadyExists { username: String },

    #[error("Unable to log in with provided credentials")]
    InvalidCredentials,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Only the author may modify recipe {recipe_id}")]
    NotAuthor { recipe_id: i32 },

    #[error("User has no avatar")]
    AvatarMissing,

    #[error("Database error: {message}")]
    Database { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn recipe_not_found(id: i32) -> Self {
        Self::RecipeNotFound { id }
    }

    pub fn user_not_found(id: i32) -> Self {
        Self::UserNotFound { id }
    }

    pub fn ingredient_not_found(id: i32) -> Self {
        Self::IngredientNotFound { id }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}
