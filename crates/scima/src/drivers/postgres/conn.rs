//! PostgreSQL connection adapter.
//!
//! Wraps a single client checked out of a one-connection deadpool pool and
//! exposes it through the [`Connection`] trait. The client is held for the
//! whole invocation, so every statement runs on the same session.

use async_trait::async_trait;
use deadpool_postgres::{Manager, ManagerConfig, Object, Pool, RecyclingMethod};
use tokio_postgres::types::{ToSql, Type};
use tokio_postgres::{Config as PgConfig, NoTls};
use tracing::{debug, info};

use crate::core::traits::Connection;
use crate::core::value::{Row, Rows};
use crate::error::ConnError;

/// PostgreSQL implementation of [`Connection`].
pub struct PgConnection {
    client: Object,
    // Keeps the pool alive for as long as the checked-out client.
    _pool: Pool,
}

impl PgConnection {
    /// Connect using a libpq-style connection string or `postgres://` URL.
    pub async fn connect(dsn: &str) -> Result<Self, ConnError> {
        let pg_config: PgConfig = dsn.parse()?;

        let mgr_config = ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        };
        let mgr = Manager::from_config(pg_config.clone(), NoTls, mgr_config);
        let pool = Pool::builder(mgr)
            .max_size(1)
            .build()
            .map_err(|e| ConnError::Pool(format!("Failed to create pool: {}", e)))?;

        let client = pool
            .get()
            .await
            .map_err(|e| ConnError::Pool(format!("Failed to get connection: {}", e)))?;

        info!(
            "Connected to PostgreSQL: {}/{}",
            describe_hosts(&pg_config),
            pg_config.get_dbname().unwrap_or_default()
        );

        Ok(Self {
            client,
            _pool: pool,
        })
    }
}

#[async_trait]
impl Connection for PgConnection {
    async fn execute(&self, sql: &str, params: &[i64]) -> Result<(), ConnError> {
        debug!("postgres execute: {}", sql);
        if params.is_empty() {
            // simple protocol: allows multi-statement migration files
            self.client.batch_execute(sql).await?;
        } else {
            let refs = param_refs(params);
            self.client.execute(sql, &refs).await?;
        }
        Ok(())
    }

    async fn query(&self, sql: &str, params: &[i64]) -> Result<Rows, ConnError> {
        debug!("postgres query: {}", sql);
        let refs = param_refs(params);
        let rows = self.client.query(sql, &refs).await?;

        rows.iter().map(decode_row).collect()
    }

    fn driver_name(&self) -> &'static str {
        "postgres"
    }
}

fn param_refs(params: &[i64]) -> Vec<&(dyn ToSql + Sync)> {
    params.iter().map(|p| p as &(dyn ToSql + Sync)).collect()
}

/// Decode a row to text values based on column types.
fn decode_row(row: &tokio_postgres::Row) -> Result<Row, ConnError> {
    let mut values = Vec::with_capacity(row.len());
    for (idx, column) in row.columns().iter().enumerate() {
        let decode_err = |e: tokio_postgres::Error| ConnError::Decode {
            column: idx,
            message: e.to_string(),
        };
        let value = match *column.type_() {
            Type::INT8 => row
                .try_get::<_, Option<i64>>(idx)
                .map_err(decode_err)?
                .map(|v| v.to_string()),
            Type::INT4 => row
                .try_get::<_, Option<i32>>(idx)
                .map_err(decode_err)?
                .map(|v| v.to_string()),
            Type::INT2 => row
                .try_get::<_, Option<i16>>(idx)
                .map_err(decode_err)?
                .map(|v| v.to_string()),
            Type::BOOL => row
                .try_get::<_, Option<bool>>(idx)
                .map_err(decode_err)?
                .map(|v| v.to_string()),
            Type::FLOAT8 => row
                .try_get::<_, Option<f64>>(idx)
                .map_err(decode_err)?
                .map(|v| v.to_string()),
            _ => row.try_get::<_, Option<String>>(idx).map_err(decode_err)?,
        };
        values.push(value);
    }
    Ok(Row::new(values))
}

fn describe_hosts(config: &PgConfig) -> String {
    use tokio_postgres::config::Host;

    let ports = config.get_ports();
    config
        .get_hosts()
        .iter()
        .enumerate()
        .map(|(i, host)| {
            let name = match host {
                Host::Tcp(name) => name.clone(),
                #[cfg(unix)]
                Host::Unix(path) => path.display().to_string(),
            };
            match ports.get(i).or_else(|| ports.first()) {
                Some(port) => format!("{}:{}", name, port),
                None => name,
            }
        })
        .collect::<Vec<_>>()
        .join(",")
}
