use mongodb::bson::doc;
use mongodb::sync::{Client, Database};

use crate::settings::AppSettings;

/// Process-wide database handle. `Database` owns a clone of the driver client,
/// so holding it keeps the connection pool alive.
#[derive(Debug, Clone)]
pub struct Connection {
    pub database: Database,
    pub db_name: String,
}

/// Opens the single long-lived handle used by the whole application.
///
/// The driver connects lazily, so a `ping` is issued to surface an unreachable
/// or misconfigured endpoint before any UI is built.
pub fn connect(settings: &AppSettings) -> Result<Connection, String> {
    let db_name = settings.database_name.trim().to_string();
    if db_name.is_empty() {
        return Err(String::from("database name is empty"));
    }

    log::info!("Connecting to {}", redact_uri(&settings.connection_uri));
    let client =
        Client::with_uri_str(settings.connection_uri.trim()).map_err(|err| err.to_string())?;
    let database = client.database(&db_name);
    database.run_command(doc! { "ping": 1 }).run().map_err(|err| err.to_string())?;

    Ok(Connection { database, db_name })
}

/// Hides the password part of a connection string before it reaches the log.
pub fn redact_uri(uri: &str) -> String {
    let trimmed = uri.trim();
    let Some((scheme, rest)) = trimmed.split_once("://") else {
        return trimmed.to_string();
    };

    let authority_end = rest.find(['/', '?']).unwrap_or(rest.len());
    let (authority, tail) = rest.split_at(authority_end);
    match authority.rsplit_once('@') {
        Some((credentials, host)) => {
            let user = credentials.split(':').next().unwrap_or(credentials);
            format!("{scheme}://{user}:***@{host}{tail}")
        }
        None => trimmed.to_string(),
    }
}
