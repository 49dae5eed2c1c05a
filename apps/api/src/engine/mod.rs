// Query Execution Engine
// Wraps one in-memory SQLite connection: initialize once, execute many.
// User SQL failures are returned as data; only setup failures are `Err`.

pub mod result;
pub mod value;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures_util::TryStreamExt;
use sqlx::sqlite::SqliteRow;
use sqlx::{Column, Connection, Either, Executor, Row as _, SqliteConnection, TypeInfo, ValueRef};
use thiserror::Error;
use tracing::{debug, warn};

pub use result::{ExecutionErrorKind, ExecutionFailure, QueryResult, ResultSet, Row};
pub use value::ScalarValue;

const IN_MEMORY_URL: &str = "sqlite::memory:";

/// VM instructions between interrupt checks.
const INTERRUPT_CHECK_OPS: i32 = 1000;

/// Setup failures. These point at broken challenge content, not at the
/// learner, and leave no usable handle behind.
#[derive(Debug, Error)]
pub enum InitError {
    #[error("Could not open in-memory database: {0}")]
    Connect(#[source] sqlx::Error),

    #[error("Schema statements failed: {0}")]
    Schema(#[source] sqlx::Error),

    #[error("Seed statements failed: {0}")]
    Seed(#[source] sqlx::Error),

    #[error("Seeded database does not match challenge content: {0}")]
    SchemaMismatch(String),
}

/// An owned, seeded database. One per challenge session; not shared.
pub struct DatabaseHandle {
    conn: SqliteConnection,
    interrupted: Arc<AtomicBool>,
}

/// Aborts whatever statement the handle is running, from any task. Once
/// raised it stays raised: every later statement on that handle fails.
#[derive(Debug, Clone)]
pub struct QueryInterrupt(Arc<AtomicBool>);

impl QueryInterrupt {
    pub fn interrupt(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_interrupted(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

impl DatabaseHandle {
    /// Opens a fresh in-memory database, applies `schema`, then `seed`.
    pub async fn initialize(schema: &str, seed: &str) -> Result<Self, InitError> {
        let mut conn = SqliteConnection::connect(IN_MEMORY_URL)
            .await
            .map_err(InitError::Connect)?;

        // SQLite keeps stepping a statement after its future is dropped; the
        // progress handler is the only way to stop it.
        let interrupted = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&interrupted);
        conn.lock_handle()
            .await
            .map_err(InitError::Connect)?
            .set_progress_handler(INTERRUPT_CHECK_OPS, move || !flag.load(Ordering::Relaxed));

        conn.execute(schema).await.map_err(InitError::Schema)?;
        if !seed.trim().is_empty() {
            conn.execute(seed).await.map_err(InitError::Seed)?;
        }

        debug!("In-memory database initialized");
        Ok(Self { conn, interrupted })
    }

    pub fn interrupter(&self) -> QueryInterrupt {
        QueryInterrupt(Arc::clone(&self.interrupted))
    }

    /// Runs `query` against the current state. Never fails: database errors
    /// come back as [`QueryResult::Failure`] with the diagnostic verbatim.
    ///
    /// Every statement in the text runs, but only the rows of the first
    /// statement that returned any are reported.
    pub async fn execute(&mut self, query: &str) -> QueryResult {
        let rows = match first_row_set(&mut self.conn, query).await {
            Ok(rows) => rows,
            Err(e) => return QueryResult::Failure(failure_from(e)),
        };

        match decode_rows(&rows) {
            Ok(set) => {
                debug!(
                    columns = set.columns.len(),
                    rows = set.rows.len(),
                    "Query executed"
                );
                QueryResult::Success(set)
            }
            Err(e) => QueryResult::Failure(failure_from(e)),
        }
    }

    /// Declared column names of `table`, in definition order. Empty when the
    /// table does not exist.
    pub async fn table_columns(&mut self, table: &str) -> Result<Vec<String>, sqlx::Error> {
        let rows = sqlx::query("SELECT name FROM pragma_table_info(?1) ORDER BY cid")
            .bind(table)
            .fetch_all(&mut self.conn)
            .await?;

        rows.iter()
            .map(|row| row.try_get::<String, _>("name"))
            .collect()
    }

    pub async fn close(self) {
        if let Err(e) = self.conn.close().await {
            warn!("Failed to close in-memory database: {e}");
        }
    }
}

fn failure_from(err: sqlx::Error) -> ExecutionFailure {
    match err {
        sqlx::Error::Database(db) => ExecutionFailure::from_message(db.message()),
        other => ExecutionFailure::from_message(other.to_string()),
    }
}

async fn first_row_set(
    conn: &mut SqliteConnection,
    query: &str,
) -> Result<Vec<SqliteRow>, sqlx::Error> {
    let mut stream = conn.fetch_many(query);
    let mut kept: Option<Vec<SqliteRow>> = None;
    let mut current = Vec::new();

    while let Some(step) = stream.try_next().await? {
        match step {
            Either::Right(row) if kept.is_none() => current.push(row),
            Either::Right(_) => {}
            // End of one statement.
            Either::Left(_) => {
                if kept.is_none() && !current.is_empty() {
                    kept = Some(std::mem::take(&mut current));
                }
            }
        }
    }

    Ok(kept.unwrap_or(current))
}

fn decode_rows(rows: &[SqliteRow]) -> Result<ResultSet, sqlx::Error> {
    // A statement that yields no rows reports no columns either.
    let Some(first) = rows.first() else {
        return Ok(ResultSet::default());
    };

    let columns: Vec<String> = first
        .columns()
        .iter()
        .map(|c| c.name().to_string())
        .collect();

    let mut decoded = Vec::with_capacity(rows.len());
    for row in rows {
        let mut out = Row::new();
        for (index, column) in columns.iter().enumerate() {
            out.insert(column.clone(), decode_value(row, index)?);
        }
        decoded.push(out);
    }

    Ok(ResultSet {
        columns,
        rows: decoded,
    })
}

/// Decodes by the value's storage class, not the column's declared type.
fn decode_value(row: &SqliteRow, index: usize) -> Result<ScalarValue, sqlx::Error> {
    let raw = row.try_get_raw(index)?;
    if raw.is_null() {
        return Ok(ScalarValue::Null);
    }
    let storage = raw.type_info().name().to_string();

    let value = match storage.as_str() {
        "INTEGER" | "BOOLEAN" => ScalarValue::Integer(row.try_get_unchecked::<i64, _>(index)?),
        "REAL" | "NUMERIC" => ScalarValue::Real(row.try_get_unchecked::<f64, _>(index)?),
        "BLOB" => ScalarValue::Blob(row.try_get_unchecked::<Vec<u8>, _>(index)?),
        _ => ScalarValue::Text(row.try_get_unchecked::<String, _>(index)?),
    };
    Ok(value)
}
