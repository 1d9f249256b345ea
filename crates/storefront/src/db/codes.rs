//! One-time login code repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use sneaker_store_core::{Email, LoginCode, OneTimeCodeId};

use super::{OneTimeCodeStore, RepositoryError};
use crate::models::OneTimeCode;

#[derive(sqlx::FromRow)]
struct CodeRow {
    id: i32,
    email: String,
    code: String,
    issued_at: DateTime<Utc>,
    verified: bool,
}

impl TryFrom<CodeRow> for OneTimeCode {
    type Error = RepositoryError;

    fn try_from(row: CodeRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        let code = LoginCode::parse(&row.code).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid login code in database: {e}"))
        })?;

        Ok(Self {
            id: OneTimeCodeId::new(row.id),
            email,
            code,
            issued_at: row.issued_at,
            verified: row.verified,
        })
    }
}

/// `PostgreSQL`-backed [`OneTimeCodeStore`].
#[derive(Clone)]
pub struct OneTimeCodeRepository {
    pool: PgPool,
}

impl OneTimeCodeRepository {
    /// Create a new code repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OneTimeCodeStore for OneTimeCodeRepository {
    async fn replace(
        &self,
        email: &Email,
        code: &LoginCode,
        issued_at: DateTime<Utc>,
    ) -> Result<OneTimeCode, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM store.one_time_code WHERE email = $1")
            .bind(email.as_str())
            .execute(&mut *tx)
            .await?;

        let row: CodeRow = sqlx::query_as(
            r"
            INSERT INTO store.one_time_code (email, code, issued_at, verified)
            VALUES ($1, $2, $3, FALSE)
            RETURNING id, email, code, issued_at, verified
            ",
        )
        .bind(email.as_str())
        .bind(code.as_str())
        .bind(issued_at)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        row.try_into()
    }

    async fn find_unverified(
        &self,
        email: &Email,
        code: &LoginCode,
    ) -> Result<Option<OneTimeCode>, RepositoryError> {
        let row: Option<CodeRow> = sqlx::query_as(
            r"
            SELECT id, email, code, issued_at, verified
            FROM store.one_time_code
            WHERE email = $1 AND code = $2 AND verified = FALSE
            ORDER BY issued_at DESC
            LIMIT 1
            ",
        )
        .bind(email.as_str())
        .bind(code.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(OneTimeCode::try_from).transpose()
    }

    async fn mark_verified(&self, id: OneTimeCodeId) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "UPDATE store.one_time_code SET verified = TRUE WHERE id = $1 AND verified = FALSE",
        )
        .bind(id.as_i32())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn purge_stale(&self, issued_before: DateTime<Utc>) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            "DELETE FROM store.one_time_code WHERE verified = TRUE OR issued_at < $1",
        )
        .bind(issued_before)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
