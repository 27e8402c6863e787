//! ODBC connection adapter for SAP HANA.
//!
//! **Requirements:**
//! - The `odbc` feature must be enabled
//! - The SAP HANA ODBC driver (`HDBODBC`, part of the HANA client) and an ODBC
//!   driver manager (unixODBC on Linux/macOS) must be installed
//!
//! The DSN is passed verbatim as ODBC connection string, e.g.
//! `DRIVER=HDBODBC;SERVERNODE=hana.example.com:30015;UID=MIGRATOR;PWD=secret`.

use async_trait::async_trait;
use odbc_api::handles::StatementImpl;
use odbc_api::{
    buffers::TextRowSet, ConnectionOptions, Cursor, CursorImpl, Environment, ResultSetMetadata,
};
use once_cell::sync::OnceCell;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::core::traits::Connection;
use crate::core::value::{Row, Rows};
use crate::error::ConnError;

/// Rows fetched per round-trip.
const FETCH_BATCH_SIZE: usize = 1000;

/// Upper bound for a single text value in bytes.
const MAX_TEXT_LEN: usize = 4096;

/// The ODBC environment is process-wide and lives for the whole process, which
/// lets connections borrow it for `'static`.
static ODBC_ENV: OnceCell<Environment> = OnceCell::new();

fn environment() -> Result<&'static Environment, ConnError> {
    ODBC_ENV.get_or_try_init(Environment::new).map_err(|e| {
        ConnError::Driver(format!(
            "Failed to create ODBC environment: {}. \
             Make sure an ODBC driver manager and the SAP HANA ODBC driver are installed.",
            e
        ))
    })
}

/// HANA implementation of [`Connection`] over ODBC.
pub struct OdbcConnection {
    /// ODBC handles are not safe for concurrent use; serialize access.
    conn: Mutex<odbc_api::Connection<'static>>,
}

impl OdbcConnection {
    /// Open one ODBC connection from a connection string.
    pub async fn connect(dsn: &str) -> Result<Self, ConnError> {
        let env = environment()?;
        let conn = env
            .connect_with_connection_string(dsn, ConnectionOptions::default())
            .map_err(|e| ConnError::Driver(format!("Failed to connect via ODBC: {}", e)))?;

        info!("Connected to HANA via ODBC");

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

/// Run `sql` binding at most one integer parameter, which is all the
/// bookkeeping statements need.
fn run<'c>(
    conn: &'c odbc_api::Connection<'static>,
    sql: &str,
    params: &[i64],
) -> Result<Option<CursorImpl<StatementImpl<'c>>>, ConnError> {
    let cursor = match params {
        [] => conn.execute(sql, ())?,
        [version] => conn.execute(sql, version)?,
        _ => {
            return Err(ConnError::Driver(format!(
                "expected at most one parameter, got {}",
                params.len()
            )))
        }
    };
    Ok(cursor)
}

#[async_trait]
impl Connection for OdbcConnection {
    async fn execute(&self, sql: &str, params: &[i64]) -> Result<(), ConnError> {
        debug!("odbc execute: {}", sql);
        let conn = self.conn.lock().await;
        run(&conn, sql, params)?;
        Ok(())
    }

    async fn query(&self, sql: &str, params: &[i64]) -> Result<Rows, ConnError> {
        debug!("odbc query: {}", sql);
        let conn = self.conn.lock().await;

        let mut rows = Vec::new();

        if let Some(mut cursor) = run(&conn, sql, params)? {
            let num_cols = cursor.num_result_cols()? as usize;

            let mut buffers =
                TextRowSet::for_cursor(FETCH_BATCH_SIZE, &mut cursor, Some(MAX_TEXT_LEN))?;
            let mut row_cursor = cursor.bind_buffer(&mut buffers)?;

            while let Some(batch) = row_cursor.fetch()? {
                for row_idx in 0..batch.num_rows() {
                    let mut row = Vec::with_capacity(num_cols);
                    for col_idx in 0..num_cols {
                        let value = batch
                            .at(col_idx, row_idx)
                            .map(|bytes| String::from_utf8_lossy(bytes).to_string());
                        row.push(value);
                    }
                    rows.push(Row::new(row));
                }
            }
        }

        Ok(Rows::new(rows))
    }

    fn driver_name(&self) -> &'static str {
        "odbc"
    }
}
