mod node;
mod node_log;

pub use node::{Node, NodeTable};
pub use node_log::{NodeLog, NodeLogTable};

use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use time::OffsetDateTime;

pub trait Table {
    /// The name of the table
    fn name(&self) -> &'static str;

    /// The SQL statement to create the table
    fn create(&self) -> String;

    /// The SQL statement to dispose the table
    fn dispose(&self) -> String;

    /// The tables this one references
    fn dependencies(&self) -> Vec<&'static str>;
}

/// Read a nullable unix-seconds column as a timestamp.
pub(crate) fn timestamp_column(
    row: &SqliteRow,
    column: &str,
) -> Result<Option<OffsetDateTime>, sqlx::Error> {
    row.try_get::<Option<i64>, _>(column)?
        .map(|secs| {
            OffsetDateTime::from_unix_timestamp(secs).map_err(|err| {
                sqlx::Error::ColumnDecode {
                    index: column.to_string(),
                    source: Box::new(err),
                }
            })
        })
        .transpose()
}
