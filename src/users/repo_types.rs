use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// User record in the database.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub country: String,
    pub password: String, // argon2 PHC string, never plaintext
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InsertUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub country: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateUser {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub country: String,
    pub password: String,
}

/// Search filters. An empty country means no restriction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filters {
    pub country: String,
}
