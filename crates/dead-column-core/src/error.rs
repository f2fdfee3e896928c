use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Metadata query failed for {context}: {source}")]
    MetadataQuery {
        context: String,
        #[source]
        source: BackendError,
    },

    #[error("Probe query failed for column {schema}.{table}.{column}: {source}")]
    ProbeQuery {
        schema: String,
        table: String,
        column: String,
        #[source]
        source: BackendError,
    },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Configuration error: {0}")]
    ConfigLoad(#[from] config::ConfigError),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Cannot write report to {target}: {source}")]
    OutputSink {
        target: String,
        #[source]
        source: SinkError,
    },
}

/// Failure raised by a catalog or probe backend.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] diesel::result::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("schema '{0}' does not exist")]
    UnknownSchema(String),
}

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
