use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info, instrument, warn};

use super::{auth, db_error, storage_error, Service};
use crate::contract::model::{NewUser, Page, PageSpec, User, UserProfile};
use crate::domain::error::DomainError;
use crate::domain::image::DecodedImage;
use crate::domain::ports::ImageKind;
use crate::domain::repo::NewUserRecord;

const MAX_EMAIL_LENGTH: usize = 254;
const MAX_NAME_LENGTH: usize = 150;
/// Collides with the `/users/me` route.
const RESERVED_USERNAME: &str = "me";

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));
static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w.@+-]+$").expect("valid username regex"));

impl Service {
    #[instrument(
        name = "foodgram.service.register_user",
        skip(self, new_user),
        fields(email = %new_user.email, username = %new_user.username)
    )]
    pub async fn register_user(&self, new_user: NewUser) -> Result<User, DomainError> {
        info!("Registering user");

        let new_user = NewUser {
            email: new_user.email.trim().to_string(),
            username: new_user.username.trim().to_string(),
            first_name: new_user.first_name.trim().to_string(),
            last_name: new_user.last_name.trim().to_string(),
            password: new_user.password,
        };
        self.validate_new_user(&new_user)?;

        if self
            .repos
            .users
            .email_exists(&new_user.email)
            .await
            .map_err(db_error)?
        {
            return Err(DomainError::EmailAlreadyExists {
                email: new_user.email,
            });
        }
        if self
            .repos
            .users
            .username_exists(&new_user.username)
            .await
            .map_err(db_error)?
        {
            return Err(DomainError::UsernameAlreadyExists {
                username: new_user.username,
            });
        }

        let password_hash = auth::hash_password(new_user.password, self.config.bcrypt_cost).await?;
        let user = self
            .repos
            .users
            .insert(NewUserRecord {
                email: new_user.email,
                username: new_user.username,
                first_name: new_user.first_name,
                last_name: new_user.last_name,
                password_hash,
            })
            .await
            .map_err(db_error)?;

        info!(user_id = user.id, "Registered user");
        Ok(user)
    }

    #[instrument(name = "foodgram.service.get_user", skip(self))]
    pub async fn get_user(&self, id: i32) -> Result<User, DomainError> {
        self.repos
            .users
            .find_by_id(id)
            .await
            .map_err(db_error)?
            .ok_or_else(|| DomainError::user_not_found(id))
    }

    /// A user as seen by `viewer`.
    #[instrument(name = "foodgram.service.get_profile", skip(self))]
    pub async fn get_profile(&self, viewer: Option<i32>, id: i32) -> Result<UserProfile, DomainError> {
        let user = self.get_user(id).await?;
        self.profile_of(viewer, user).await
    }

    #[instrument(name = "foodgram.service.list_profiles", skip(self))]
    pub async fn list_profiles(
        &self,
        viewer: Option<i32>,
        page: PageSpec,
    ) -> Result<Page<UserProfile>, DomainError> {
        let users = self.repos.users.list_page(page).await.map_err(db_error)?;
        let mut items = Vec::with_capacity(users.items.len());
        for user in users.items {
            items.push(self.profile_of(viewer, user).await?);
        }
        debug!("Listed {} of {} users", items.len(), users.total);
        Ok(Page {
            items,
            total: users.total,
        })
    }

    #[instrument(
        name = "foodgram.service.set_password",
        skip(self, current_password, new_password)
    )]
    pub async fn set_password(
        &self,
        user_id: i32,
        current_password: String,
        new_password: String,
    ) -> Result<(), DomainError> {
        let stored = self
            .repos
            .users
            .password_hash(user_id)
            .await
            .map_err(db_error)?
            .ok_or_else(|| DomainError::user_not_found(user_id))?;

        if !auth::verify_password(current_password, stored).await? {
            return Err(DomainError::validation("current_password", "Invalid password."));
        }
        self.validate_password("new_password", &new_password)?;

        let hash = auth::hash_password(new_password, self.config.bcrypt_cost).await?;
        self.repos
            .users
            .set_password_hash(user_id, hash)
            .await
            .map_err(db_error)?;
        info!(user_id, "Password changed");
        Ok(())
    }

    /// Replace the avatar with a base64 image; returns the updated user.
    #[instrument(name = "foodgram.service.set_avatar", skip(self, user, raw), fields(user_id = user.id))]
    pub async fn set_avatar(&self, user: &User, raw: &str) -> Result<User, DomainError> {
        let image = DecodedImage::from_base64(raw, "avatar")?;
        let path = self
            .images
            .save(ImageKind::Avatar, image)
            .await
            .map_err(storage_error)?;

        if let Err(e) = self
            .repos
            .users
            .set_avatar(user.id, Some(path.clone()))
            .await
        {
            self.discard_image(&path).await;
            return Err(db_error(e));
        }
        if let Some(old) = &user.avatar {
            self.discard_image(old).await;
        }

        info!("Avatar updated");
        Ok(User {
            avatar: Some(path),
            ..user.clone()
        })
    }

    #[instrument(name = "foodgram.service.delete_avatar", skip(self, user), fields(user_id = user.id))]
    pub async fn delete_avatar(&self, user: &User) -> Result<(), DomainError> {
        let Some(old) = &user.avatar else {
            return Err(DomainError::AvatarMissing);
        };
        self.repos
            .users
            .set_avatar(user.id, None)
            .await
            .map_err(db_error)?;
        self.discard_image(old).await;
        info!("Avatar removed");
        Ok(())
    }

    pub(super) async fn profile_of(
        &self,
        viewer: Option<i32>,
        user: User,
    ) -> Result<UserProfile, DomainError> {
        let is_subscribed = match viewer {
            Some(v) if v != user.id => self
                .repos
                .subscriptions
                .exists(v, user.id)
                .await
                .map_err(db_error)?,
            _ => false,
        };
        Ok(UserProfile {
            user,
            is_subscribed,
        })
    }

    /// Best-effort removal of a stored image; failures are only logged.
    pub(super) async fn discard_image(&self, path: &str) {
        if let Err(e) = self.images.remove(path).await {
            warn!(path, error = %e, "Failed to remove stored image");
        }
    }

    fn validate_new_user(&self, u: &NewUser) -> Result<(), DomainError> {
        if u.email.is_empty() {
            return Err(DomainError::validation("email", "This field is required."));
        }
        if u.email.chars().count() > MAX_EMAIL_LENGTH || !EMAIL_RE.is_match(&u.email) {
            return Err(DomainError::validation("email", "Enter a valid email address."));
        }

        if u.username.is_empty() {
            return Err(DomainError::validation("username", "This field is required."));
        }
        if u.username.chars().count() > MAX_NAME_LENGTH {
            return Err(DomainError::validation(
                "username",
                format!("Ensure this field has no more than {MAX_NAME_LENGTH} characters."),
            ));
        }
        if !USERNAME_RE.is_match(&u.username) {
            return Err(DomainError::validation(
                "username",
                "Username may contain only letters, digits and @/./+/-/_ characters.",
            ));
        }
        if u.username.eq_ignore_ascii_case(RESERVED_USERNAME) {
            return Err(DomainError::validation(
                "username",
                format!("Username '{RESERVED_USERNAME}' is reserved."),
            ));
        }

        for (field, value) in [("first_name", &u.first_name), ("last_name", &u.last_name)] {
            if value.is_empty() {
                return Err(DomainError::validation(field, "This field is required."));
            }
            if value.chars().count() > MAX_NAME_LENGTH {
                return Err(DomainError::validation(
                    field,
                    format!("Ensure this field has no more than {MAX_NAME_LENGTH} characters."),
                ));
            }
        }

        self.validate_password("password", &u.password)
    }

    fn validate_password(&self, field: &str, password: &str) -> Result<(), DomainError> {
        let min = self.config.min_password_length;
        if password.chars().count() < min {
            return Err(DomainError::validation(
                field,
                format!("This password is too short. It must contain at least {min} characters."),
            ));
        }
        if password.chars().all(|c| c.is_ascii_digit()) {
            return Err(DomainError::validation(field, "This password is entirely numeric."));
        }
        Ok(())
    }
}
