use axum::http::StatusCode;
use modkit::api::problem::{Problem, ProblemResponse};

use crate::domain::error::DomainError;

/// Helper to create a ProblemResponse with less boilerplate
pub fn from_parts(
    status: StatusCode,
    code: &str,
    title: &str,
    detail: impl Into<String>,
    instance: &str,
) -> ProblemResponse {
    ProblemResponse(problem(status, code, title, detail, instance))
}

fn problem(
    status: StatusCode,
    code: &str,
    title: &str,
    detail: impl Into<String>,
    instance: &str,
) -> Problem {
    Problem::new(status, title, detail)
        .with_type(format!("https://errors.example.com/{code}"))
        .with_code(code)
        .with_instance(instance)
}

fn validation(code: &str, field: &str, detail: impl Into<String>, instance: &str) -> ProblemResponse {
    let detail = detail.into();
    ProblemResponse(
        problem(
            StatusCode::BAD_REQUEST,
            code,
            "Validation error",
            detail.clone(),
            instance,
        )
        .with_field_error(field, detail),
    )
}

/// 401 for endpoints that require a token when none was sent.
pub fn not_authenticated(instance: &str) -> ProblemResponse {
    from_parts(
        StatusCode::UNAUTHORIZED,
        "FOODGRAM_NOT_AUTHENTICATED",
        "Not authenticated",
        "Authentication credentials were not provided.",
        instance,
    )
}

/// Map domain error to RFC9457 ProblemResponse
pub fn map_domain_error(e: &DomainError, instance: &str) -> ProblemResponse {
    match e {
        DomainError::RecipeNotFound { .. } => from_parts(
            StatusCode::NOT_FOUND,
            "FOODGRAM_RECIPE_NOT_FOUND",
            "Recipe not found",
            e.to_string(),
            instance,
        ),
        DomainError::UserNotFound { .. } => from_parts(
            StatusCode::NOT_FOUND,
            "FOODGRAM_USER_NOT_FOUND",
            "User not found",
            e.to_string(),
            instance,
        ),
        DomainError::IngredientNotFound { .. } => from_parts(
            StatusCode::NOT_FOUND,
            "FOODGRAM_INGREDIENT_NOT_FOUND",
            "Ingredient not found",
            e.to_string(),
            instance,
        ),
        DomainError::NotInRelation { .. } => from_parts(
            StatusCode::NOT_FOUND,
            "FOODGRAM_NOT_IN_RELATION",
            "Not found",
            e.to_string(),
            instance,
        ),
        DomainError::NotSubscribed { .. } => from_parts(
            StatusCode::NOT_FOUND,
            "FOODGRAM_NOT_SUBSCRIBED",
            "Subscription not found",
            e.to_string(),
            instance,
        ),
        DomainError::Validation { field, message } => {
            validation("FOODGRAM_VALIDATION", field, message.clone(), instance)
        }
        DomainError::AlreadyInRelation { .. } => {
            validation("FOODGRAM_ALREADY_ADDED", "status", e.to_string(), instance)
        }
        DomainError::SelfSubscription | DomainError::AlreadySubscribed { .. } => {
            validation("FOODGRAM_SUBSCRIPTION", "status", e.to_string(), instance)
        }
        DomainError::EmailAlreadyExists { .. } => {
            validation("FOODGRAM_EMAIL_TAKEN", "email", e.to_string(), instance)
        }
        DomainError::UsernameAlreadyExists { .. } => {
            validation("FOODGRAM_USERNAME_TAKEN", "username", e.to_string(), instance)
        }
        DomainError::AvatarMissing => {
            validation("FOODGRAM_AVATAR_MISSING", "avatar", e.to_string(), instance)
        }
        DomainError::InvalidCredentials => from_parts(
            StatusCode::BAD_REQUEST,
            "FOODGRAM_INVALID_CREDENTIALS",
            "Invalid credentials",
            e.to_string(),
            instance,
        ),
        DomainError::InvalidToken => from_parts(
            StatusCode::UNAUTHORIZED,
            "FOODGRAM_INVALID_TOKEN",
            "Invalid token",
            "Invalid token.",
            instance,
        ),
        DomainError::NotAuthor { .. } => from_parts(
            StatusCode::FORBIDDEN,
            "FOODGRAM_FORBIDDEN",
            "Forbidden",
            "You do not have permission to perform this action.",
            instance,
        ),
        DomainError::Database { .. } => {
            // Log the internal error details but don't expose them to the client
            tracing::error!(error = ?e, "Database error occurred");
            from_parts(
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_DB",
                "Internal error",
                "An internal database error occurred",
                instance,
            )
        }
        DomainError::Storage { .. } | DomainError::Internal { .. } => {
            tracing::error!(error = ?e, "Internal error occurred");
            from_parts(
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL",
                "Internal error",
                "An internal error occurred",
                instance,
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::model::RecipeRelation;

    #[test]
    fn validation_carries_field_pointer() {
        let resp = map_domain_error(
            &DomainError::validation("cooking_time", "Cooking time must be between 1 and 32000."),
            "/api/recipes",
        );
        assert_eq!(resp.0.status, 400);
        assert_eq!(resp.0.code, "FOODGRAM_VALIDATION");
        assert_eq!(resp.0.instance, "/api/recipes");
        let errors = resp.0.errors.unwrap();
        assert_eq!(errors[0].pointer, "/cooking_time");
    }

    #[test]
    fn status_codes_follow_error_kind() {
        let cases = [
            (DomainError::recipe_not_found(1), 404),
            (
                DomainError::NotInRelation {
                    relation: RecipeRelation::Favorite,
                    recipe_id: 1,
                },
                404,
            ),
            (
                DomainError::AlreadyInRelation {
                    relation: RecipeRelation::ShoppingCart,
                    recipe_id: 1,
                },
                400,
            ),
            (DomainError::SelfSubscription, 400),
            (DomainError::InvalidCredentials, 400),
            (DomainError::InvalidToken, 401),
            (DomainError::NotAuthor { recipe_id: 1 }, 403),
            (DomainError::AvatarMissing, 400),
        ];
        for (err, status) in cases {
            assert_eq!(map_domain_error(&err, "/x").0.status, status, "{err}");
        }
    }

    #[test]
    fn internal_details_are_hidden() {
        let resp = map_domain_error(&DomainError::database("disk I/O error at page 7"), "/x");
        assert_eq!(resp.0.status, 500);
        assert!(!resp.0.detail.contains("disk"));
    }
}
