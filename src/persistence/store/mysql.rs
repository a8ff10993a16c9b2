//! MySQL document store
//!
//! Every mapped table has the shape `(id BIGINT AUTO_INCREMENT, document JSON)`.
//! Unique fields are projected into stored generated columns carrying a
//! UNIQUE KEY, so the database enforces them on commit.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::types::Json;
use sqlx::{MySql, MySqlPool, Transaction};

use super::{Change, CommitReceipt, Store};
use crate::core::entity::{EntityId, Record};
use crate::core::error::{StoreError, StoreResult};
use crate::persistence::model::{Model, TableModel};

pub struct MySqlStore {
    pool: MySqlPool,
    model: Model,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool, model: Model) -> Self {
        Self { pool, model }
    }

    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }

    /// Create missing tables for every mapped entity.
    pub async fn ensure_schema(&self) -> StoreResult<()> {
        for (table, mapping) in self.model.tables() {
            let ddl = create_table_sql(table, mapping);
            sqlx::query(&ddl).execute(&self.pool).await?;
            tracing::debug!(table, "Ensured table exists");
        }
        Ok(())
    }

    async fn apply(tx: &mut Transaction<'_, MySql>, change: &Change, receipt: &mut CommitReceipt) -> StoreResult<()> {
        match change {
            Change::Insert { table, document } => {
                let result = sqlx::query(&format!("INSERT INTO {} (document) VALUES (?)", table))
                    .bind(Json(document))
                    .execute(&mut **tx)
                    .await?;
                receipt.inserted_ids.push(result.last_insert_id() as EntityId);
                receipt.affected += result.rows_affected();
            }
            Change::Update { table, id, document } => {
                let result = sqlx::query(&format!("UPDATE {} SET document = ? WHERE id = ?", table))
                    .bind(Json(document))
                    .bind(id)
                    .execute(&mut **tx)
                    .await?;
                if result.rows_affected() == 0 {
                    return Err(StoreError::ConcurrencyConflict { table: *table, id: *id });
                }
                receipt.affected += result.rows_affected();
            }
            Change::Delete { table, id } => {
                let result = sqlx::query(&format!("DELETE FROM {} WHERE id = ?", table))
                    .bind(id)
                    .execute(&mut **tx)
                    .await?;
                if result.rows_affected() == 0 {
                    return Err(StoreError::ConcurrencyConflict { table: *table, id: *id });
                }
                receipt.affected += result.rows_affected();
            }
        }
        Ok(())
    }
}

#[async_trait]
impl Store for MySqlStore {
    fn model(&self) -> &Model {
        &self.model
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn find(&self, table: &'static str, id: EntityId) -> StoreResult<Option<Record>> {
        let row = sqlx::query_as::<_, (i64, Json<Value>)>(&format!(
            "SELECT id, document FROM {} WHERE id = ?",
            table
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(id, Json(document))| Record::new(id, document)))
    }

    async fn scan(&self, table: &'static str) -> StoreResult<Vec<Record>> {
        let rows = sqlx::query_as::<_, (i64, Json<Value>)>(&format!(
            "SELECT id, document FROM {} ORDER BY id",
            table
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, Json(document))| Record::new(id, document))
            .collect())
    }

    async fn commit(&self, changes: &[Change]) -> StoreResult<CommitReceipt> {
        let mut tx = self.pool.begin().await?;
        let mut receipt = CommitReceipt::default();

        for change in changes {
            // Dropping `tx` on the error path rolls the transaction back
            Self::apply(&mut tx, change, &mut receipt).await?;
        }

        tx.commit().await?;
        Ok(receipt)
    }
}

fn create_table_sql(table: &str, mapping: &TableModel) -> String {
    let mut columns = vec![
        "id BIGINT NOT NULL AUTO_INCREMENT PRIMARY KEY".to_string(),
        "document JSON NOT NULL".to_string(),
    ];

    for field in &mapping.unique {
        columns.push(format!(
            "u_{field} VARCHAR(255) AS (JSON_UNQUOTE(JSON_EXTRACT(document, '$.{field}'))) STORED"
        ));
        columns.push(format!(
            "UNIQUE KEY {} (u_{field})",
            Model::unique_index_name(table, field)
        ));
    }

    format!(
        "CREATE TABLE IF NOT EXISTS {} ({}) ENGINE=InnoDB",
        table,
        columns.join(", ")
    )
}
