use async_trait::async_trait;
use sqlx::PgPool;

use crate::backend::UserRepository;
use crate::errors::AppError;
use crate::models::user::{NewUser, User};

#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE LOWER(email) = LOWER($1)")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn insert(&self, user: NewUser) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (email, password, confirmation_token) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.confirmation_token)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| {
            let duplicate = err
                .as_database_error()
                .map_or(false, |db_err| db_err.is_unique_violation());
            if duplicate {
                AppError::Conflict("User already registered".to_string())
            } else {
                AppError::from(err)
            }
        })
    }

    async fn confirm(&self, token: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "UPDATE users SET confirmed_at = now(), confirmation_token = NULL \
             WHERE confirmation_token = $1 RETURNING *",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }
}
