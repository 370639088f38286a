use std::ops::{Deref, DerefMut};

use shelf_kernel::settings::{DatabaseAuth, DatabaseDriver, DatabaseSettings};
use sqlx::{AnyConnection, Connection};

/// Opens one database connection per call from static settings.
#[derive(Debug, Clone)]
pub struct ConnectionProvider {
    url: String,
    /// Connection target without credentials, for logs.
    target: String,
}

impl ConnectionProvider {
    pub fn new(settings: &DatabaseSettings) -> Self {
        sqlx::any::install_default_drivers();

        Self {
            url: connection_url(settings),
            target: connection_target(settings),
        }
    }

    /// Where connections go, without credentials.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Attempt a single connection. Failures are logged and yield `None`.
    pub async fn open(&self) -> Option<DbConnection> {
        match AnyConnection::connect(&self.url).await {
            Ok(conn) => {
                tracing::debug!(target: "shelf-db", database = %self.target, "connection opened");
                Some(DbConnection { conn })
            }
            Err(error) => {
                tracing::error!(
                    target: "shelf-db",
                    database = %self.target,
                    %error,
                    "database connection failed"
                );
                None
            }
        }
    }
}

/// An open connection owned by one request.
///
/// Dropping it releases the connection, so every early return or `?` in a
/// handler closes it. `close` does the same and reports close failures.
pub struct DbConnection {
    conn: AnyConnection,
}

impl DbConnection {
    pub async fn close(self) {
        match self.conn.close().await {
            Ok(()) => tracing::debug!(target: "shelf-db", "connection closed"),
            Err(error) => {
                tracing::warn!(target: "shelf-db", %error, "failed to close connection cleanly")
            }
        }
    }
}

impl Deref for DbConnection {
    type Target = AnyConnection;

    fn deref(&self) -> &Self::Target {
        &self.conn
    }
}

impl DerefMut for DbConnection {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.conn
    }
}

/// Render the connection URL for the configured driver.
pub fn connection_url(settings: &DatabaseSettings) -> String {
    match settings.driver {
        // `mode=rw`: a missing database file is a connection failure, not a new database.
        DatabaseDriver::Sqlite => format!("sqlite://{}?mode=rw", settings.database),
        DatabaseDriver::Postgres => match &settings.auth {
            DatabaseAuth::Integrated => {
                format!("postgres://{}/{}", settings.server, settings.database)
            }
            DatabaseAuth::Password { username, password } => format!(
                "postgres://{}:{}@{}/{}",
                username, password, settings.server, settings.database
            ),
        },
    }
}

fn connection_target(settings: &DatabaseSettings) -> String {
    match settings.driver {
        DatabaseDriver::Sqlite => format!("sqlite:{}", settings.database),
        DatabaseDriver::Postgres => {
            format!("postgres:{}/{}", settings.server, settings.database)
        }
    }
}
