use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use time::OffsetDateTime;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::password::PasswordHasher;
use crate::users::pagination::Page;
use crate::users::repo::{RepoError, UserRepo};
use crate::users::repo_types::{self, Filters, UserRow};

/// Domain user. Carries no password material.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub country: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            country: row.country,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Request to create a user. `password` is plaintext.
#[derive(Clone, PartialEq)]
pub struct AddUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub country: String,
    pub password: String,
}

/// Full overwrite of a user's mutable fields. `password` is plaintext.
#[derive(Clone, PartialEq)]
pub struct UpdateUser {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub country: String,
    pub password: String,
}

#[derive(Debug, Error)]
pub enum ServiceError {
    /// Passed through untouched from the storage layer.
    #[error("user not found")]
    NotFound,
    #[error("hashing password: {0}")]
    Hashing(anyhow::Error),
    #[error("{context}: {source}")]
    Storage {
        context: &'static str,
        #[source]
        source: RepoError,
    },
}

impl ServiceError {
    fn storage(context: &'static str) -> impl FnOnce(RepoError) -> Self {
        move |source| match source {
            RepoError::NotFound => Self::NotFound,
            source => Self::Storage { context, source },
        }
    }
}

#[async_trait]
pub trait UserService: Send + Sync {
    async fn add_user(&self, user: AddUser) -> Result<User, ServiceError>;
    async fn delete_user(&self, id: &str) -> Result<(), ServiceError>;
    async fn update_user(&self, user: UpdateUser) -> Result<User, ServiceError>;
    /// Returns one page of users, optionally filtered by country.
    async fn search_user(
        &self,
        page: i64,
        page_size: i64,
        country: String,
    ) -> Result<Vec<User>, ServiceError>;
}

pub struct UserServiceImpl {
    repo: Arc<dyn UserRepo>,
    hasher: Arc<dyn PasswordHasher>,
}

impl UserServiceImpl {
    pub fn new(repo: Arc<dyn UserRepo>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { repo, hasher }
    }

    fn hash(&self, plain: &str) -> Result<String, ServiceError> {
        self.hasher.hash(plain).map_err(ServiceError::Hashing)
    }
}

#[async_trait]
impl UserService for UserServiceImpl {
    #[instrument(skip(self, user))]
    async fn add_user(&self, user: AddUser) -> Result<User, ServiceError> {
        let password = self.hash(&user.password)?;
        let row = self
            .repo
            .insert_user(repo_types::InsertUser {
                first_name: user.first_name,
                last_name: user.last_name,
                email: user.email,
                country: user.country,
                password,
            })
            .await
            .map_err(ServiceError::storage("adding user"))?;

        info!(user_id = %row.id, "user added");
        Ok(row.into())
    }

    #[instrument(skip(self))]
    async fn delete_user(&self, id: &str) -> Result<(), ServiceError> {
        self.repo
            .delete_user(id)
            .await
            .map_err(ServiceError::storage("user storage"))
    }

    #[instrument(skip(self, user), fields(user_id = %user.id))]
    async fn update_user(&self, user: UpdateUser) -> Result<User, ServiceError> {
        let password = self.hash(&user.password)?;
        let row = self
            .repo
            .update_user(repo_types::UpdateUser {
                id: user.id,
                first_name: user.first_name,
                last_name: user.last_name,
                email: user.email,
                country: user.country,
                password,
            })
            .await
            .map_err(ServiceError::storage("updating user"))?;

        info!(user_id = %row.id, "user updated");
        Ok(row.into())
    }

    #[instrument(skip(self))]
    async fn search_user(
        &self,
        page: i64,
        page_size: i64,
        country: String,
    ) -> Result<Vec<User>, ServiceError> {
        let page = Page::new(page, page_size);
        let rows = self
            .repo
            .search_user(Filters { country }, page.offset(), page.limit())
            .await
            .map_err(ServiceError::storage("search user storage"))?;

        Ok(rows.into_iter().map(User::from).collect())
    }
}
