//! Repository layer for database operations
//!
//! Each submodule adds `<domain>_*` methods to [`Repository`]. Methods that
//! take an executor can run either on the pool or inside a transaction
//! obtained from [`Repository::begin`].

pub mod activities;
pub mod assets;
pub mod departments;
pub mod labs;
pub mod requests;
pub mod stats;
pub mod tickets;
pub mod users;

use chrono::{Datelike, Utc};
use sqlx::{PgExecutor, Pool, Postgres, Transaction};

use crate::error::AppResult;

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Start a transaction
    pub async fn begin(&self) -> AppResult<Transaction<'static, Postgres>> {
        Ok(self.pool.begin().await?)
    }

    /// Database round trip used by the readiness probe
    pub async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Next value of a numbering sequence
    pub(crate) async fn next_number<'e>(
        &self,
        executor: impl PgExecutor<'e>,
        sequence: NumberSequence,
    ) -> AppResult<i64> {
        let sql = match sequence {
            NumberSequence::Ticket => "SELECT nextval('ticket_number_seq')",
            NumberSequence::Request => "SELECT nextval('request_number_seq')",
        };
        let value: i64 = sqlx::query_scalar(sql).fetch_one(executor).await?;
        Ok(value)
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum NumberSequence {
    Ticket,
    Request,
}

/// `PREFIX-YYYY-0001` style numbers for tickets and requests
pub(crate) fn yearly_number(prefix: &str, value: i64) -> String {
    format!("{}-{}-{:04}", prefix, Utc::now().year(), value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yearly_numbers_are_zero_padded() {
        let year = Utc::now().year();
        assert_eq!(yearly_number("REQ", 7), format!("REQ-{}-0007", year));
        assert_eq!(yearly_number("TKT", 12345), format!("TKT-{}-12345", year));
    }
}
