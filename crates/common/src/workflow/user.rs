//! User workflow
//!
//! Registration, login credentials, and profile updates. The profile
//! update request enumerates exactly the fields a user may change -
//! anything else is rejected at the API boundary, not filtered here.

use crate::auth::{self, Role};
use crate::db::models::*;
use crate::db::{is_unique_violation, DbPool, Repository};
use crate::errors::{AppError, Result};
use crate::slug::slugify;
use sea_orm::{ActiveModelTrait, Set};
use tracing::info;

/// Input for user registration
#[derive(Debug)]
pub struct RegisterUser {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Input for profile update; only these fields may change
#[derive(Debug, Default)]
pub struct UpdateProfile {
    pub name: Option<String>,
    pub bio: Option<Option<String>>,
    pub avatar: Option<Option<String>>,
}

/// Orchestrates user mutations
pub struct UserWorkflow {
    db: DbPool,
}

impl UserWorkflow {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    fn repo(&self) -> Repository {
        Repository::new(self.db.clone())
    }

    /// Register a new reader account
    pub async fn register(&self, input: RegisterUser) -> Result<User> {
        let repo = self.repo();

        if repo.find_user_by_email(&input.email).await?.is_some() {
            return Err(AppError::DuplicateEmail {
                email: input.email,
            });
        }

        let password_hash = auth::hash_password(&input.password)?;
        let profile_slug = repo.unique_profile_slug(&slugify(&input.name)).await?;
        let now = chrono::Utc::now();

        let user = UserActiveModel {
            name: Set(input.name),
            email: Set(input.email),
            password_hash: Set(password_hash),
            avatar: Set(None),
            bio: Set(None),
            profile_slug: Set(profile_slug),
            role: Set(Role::Reader.as_str().to_string()),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            ..Default::default()
        };

        let user = match user.insert(self.db.write()).await {
            Ok(user) => user,
            Err(e) if is_unique_violation(&e) => {
                return Err(AppError::Duplicate {
                    message: "Email or profile slug already taken".to_string(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        info!(user_id = user.id, "User registered");
        Ok(user)
    }

    /// Verify credentials, returning the user on success
    pub async fn login(&self, email: &str, password: &str) -> Result<User> {
        let user = self
            .repo()
            .find_user_by_email(email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !auth::verify_password(password, &user.password_hash) {
            return Err(AppError::InvalidCredentials);
        }

        Ok(user)
    }

    /// Update profile fields (name, bio, avatar only)
    pub async fn update_profile(&self, user: User, input: UpdateProfile) -> Result<User> {
        let user_id = user.id;

        let mut active: UserActiveModel = user.into();
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(bio) = input.bio {
            active.bio = Set(bio);
        }
        if let Some(avatar) = input.avatar {
            active.avatar = Set(avatar);
        }
        active.updated_at = Set(chrono::Utc::now().into());

        let user = active.update(self.db.write()).await?;

        info!(user_id, "Profile updated");
        Ok(user)
    }

    /// Replace the stored password hash
    pub async fn update_password(&self, user: User, new_password: &str) -> Result<User> {
        let user_id = user.id;

        let mut active: UserActiveModel = user.into();
        active.password_hash = Set(auth::hash_password(new_password)?);
        active.updated_at = Set(chrono::Utc::now().into());

        let user = active.update(self.db.write()).await?;

        info!(user_id, "Password updated");
        Ok(user)
    }
}
