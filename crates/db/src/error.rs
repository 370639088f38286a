use sqlx::error::ErrorKind;
use thiserror::Error;

/// SQLite extended result codes for constraint failures
/// (primary key, unique, foreign key, not null, check) and the base code.
const SQLITE_CONSTRAINT_CODES: &[&str] = &["19", "1555", "2067", "787", "1299", "275"];

/// Failure of a single statement.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("constraint violation: {0}")]
    Constraint(#[source] sqlx::Error),

    #[error("statement failed: {0}")]
    Statement(#[source] sqlx::Error),
}

impl DbError {
    pub fn is_constraint(&self) -> bool {
        matches!(self, DbError::Constraint(_))
    }
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        if violates_constraint(&err) {
            DbError::Constraint(err)
        } else {
            DbError::Statement(err)
        }
    }
}

fn violates_constraint(err: &sqlx::Error) -> bool {
    let sqlx::Error::Database(db_err) = err else {
        return false;
    };

    if matches!(
        db_err.kind(),
        ErrorKind::UniqueViolation
            | ErrorKind::ForeignKeyViolation
            | ErrorKind::NotNullViolation
            | ErrorKind::CheckViolation
    ) {
        return true;
    }

    // Postgres SQLSTATE class 23 is "integrity constraint violation".
    db_err.code().is_some_and(|code| {
        (code.len() == 5 && code.starts_with("23")) || SQLITE_CONSTRAINT_CODES.contains(&&*code)
    })
}
