use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::users::repo_types::{Filters, InsertUser, UpdateUser, UserRow};

const USER_COLUMNS: &str =
    "id, first_name, last_name, email, country, password, created_at, updated_at";

#[derive(Debug, Error)]
pub enum RepoError {
    /// The targeted row does not exist.
    #[error("object doesn't exist in db")]
    NotFound,
    #[error("{context}: {source}")]
    Db {
        context: &'static str,
        #[source]
        source: sqlx::Error,
    },
}

impl RepoError {
    fn db(context: &'static str) -> impl FnOnce(sqlx::Error) -> Self {
        move |source| Self::Db { context, source }
    }
}

/// Persistence of user rows. Every write runs in its own transaction.
#[async_trait]
pub trait UserRepo: Send + Sync {
    async fn insert_user(&self, user: InsertUser) -> Result<UserRow, RepoError>;
    async fn delete_user(&self, id: &str) -> Result<(), RepoError>;
    async fn update_user(&self, user: UpdateUser) -> Result<UserRow, RepoError>;
    async fn search_user(
        &self,
        filters: Filters,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<UserRow>, RepoError>;
}

#[derive(Clone)]
pub struct PgUserRepo {
    db: PgPool,
}

impl PgUserRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepo for PgUserRepo {
    async fn insert_user(&self, user: InsertUser) -> Result<UserRow, RepoError> {
        let mut tx = self
            .db
            .begin()
            .await
            .map_err(RepoError::db("starting transaction"))?;

        let inserted = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            INSERT INTO users (id, first_name, last_name, email, country, password, created_at, updated_at)
            VALUES (gen_random_uuid(), $1, $2, $3, $4, $5, NOW(), NOW())
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(&user.country)
        .bind(&user.password)
        .fetch_one(&mut *tx)
        .await;

        let row = match inserted {
            Ok(row) => row,
            Err(e) => {
                let _ = tx.rollback().await;
                return Err(RepoError::db("inserting user")(e));
            }
        };

        tx.commit()
            .await
            .map_err(RepoError::db("transaction commit"))?;
        Ok(row)
    }

    async fn delete_user(&self, id: &str) -> Result<(), RepoError> {
        // A non-uuid id cannot match any row.
        let Ok(id) = Uuid::parse_str(id) else {
            return Ok(());
        };

        let mut tx = self
            .db
            .begin()
            .await
            .map_err(RepoError::db("starting transaction"))?;

        let deleted = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await;

        match deleted {
            Ok(res) => debug!(%id, rows = res.rows_affected(), "user delete"),
            Err(e) => {
                let _ = tx.rollback().await;
                return Err(RepoError::db("deleting user")(e));
            }
        }

        tx.commit()
            .await
            .map_err(RepoError::db("transaction commit"))?;
        Ok(())
    }

    async fn update_user(&self, user: UpdateUser) -> Result<UserRow, RepoError> {
        let Ok(id) = Uuid::parse_str(&user.id) else {
            return Err(RepoError::NotFound);
        };

        let mut tx = self
            .db
            .begin()
            .await
            .map_err(RepoError::db("starting transaction"))?;

        // created_at is left untouched, so RETURNING yields the original value.
        let updated = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            UPDATE users
               SET first_name = $1, last_name = $2, email = $3, country = $4,
                   password = $5, updated_at = NOW()
             WHERE id = $6
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(&user.country)
        .bind(&user.password)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await;

        let row = match updated {
            Ok(Some(row)) => row,
            Ok(None) => {
                let _ = tx.rollback().await;
                return Err(RepoError::NotFound);
            }
            Err(e) => {
                let _ = tx.rollback().await;
                return Err(RepoError::db("updating user")(e));
            }
        };

        tx.commit()
            .await
            .map_err(RepoError::db("transaction commit"))?;
        Ok(row)
    }

    async fn search_user(
        &self,
        filters: Filters,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<UserRow>, RepoError> {
        let mut query = search_query(filters, offset, limit);
        let rows = query
            .build_query_as::<UserRow>()
            .fetch_all(&self.db)
            .await
            .map_err(RepoError::db("searching users"))?;
        debug!(count = rows.len(), offset, limit, "user search");
        Ok(rows)
    }
}

fn search_query(filters: Filters, offset: i64, limit: i64) -> QueryBuilder<'static, Postgres> {
    let mut query = QueryBuilder::new(format!("SELECT {USER_COLUMNS} FROM users"));
    if !filters.country.is_empty() {
        query.push(" WHERE country ILIKE ").push_bind(filters.country);
    }
    query
        .push(" OFFSET ")
        .push_bind(offset)
        .push(" LIMIT ")
        .push_bind(limit);
    query
}
