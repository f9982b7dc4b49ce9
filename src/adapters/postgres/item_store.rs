//! PostgreSQL implementation of ItemStore.
//!
//! One `items` table holds every record. The secondary index is a plain
//! b-tree on `(gsi1pk, gsi1sk)`. Create-if-absent guards are
//! `INSERT .. ON CONFLICT DO NOTHING` inside a transaction; zero affected
//! rows rolls the whole transaction back.

use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, Transaction};

use crate::domain::foundation::DomainError;
use crate::ports::{Item, ItemKey, ItemStore, PutRequest, WriteCondition, WriteOutcome};

pub struct PostgresItemStore {
    pool: PgPool,
}

impl PostgresItemStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Applies pending migrations from `migrations/`.
    pub async fn migrate(&self) -> Result<(), DomainError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| DomainError::database(format!("Failed to run migrations: {}", e)))
    }
}

/// Database row representation of an item.
#[derive(Debug, sqlx::FromRow)]
struct ItemRow {
    pk: String,
    sk: String,
    gsi1pk: Option<String>,
    gsi1sk: Option<String>,
    attributes: Json<Map<String, Value>>,
}

impl From<ItemRow> for Item {
    fn from(row: ItemRow) -> Self {
        let index_key = match (row.gsi1pk, row.gsi1sk) {
            (Some(pk), Some(sk)) => Some(ItemKey::new(pk, sk)),
            _ => None,
        };
        Item {
            key: ItemKey::new(row.pk, row.sk),
            index_key,
            attributes: row.attributes.0,
        }
    }
}

fn db_error(context: &str, e: sqlx::Error) -> DomainError {
    DomainError::database(format!("{}: {}", context, e))
}

fn index_parts(item: &Item) -> (Option<&str>, Option<&str>) {
    match &item.index_key {
        Some(k) => (Some(k.pk.as_str()), Some(k.sk.as_str())),
        None => (None, None),
    }
}

async fn insert_if_absent(
    tx: &mut Transaction<'_, Postgres>,
    item: &Item,
) -> Result<bool, DomainError> {
    let (gsi1pk, gsi1sk) = index_parts(item);
    let result = sqlx::query(
        r#"
        INSERT INTO items (pk, sk, gsi1pk, gsi1sk, attributes)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (pk, sk) DO NOTHING
        "#,
    )
    .bind(&item.key.pk)
    .bind(&item.key.sk)
    .bind(gsi1pk)
    .bind(gsi1sk)
    .bind(Json(&item.attributes))
    .execute(&mut **tx)
    .await
    .map_err(|e| db_error("Failed to insert item", e))?;

    Ok(result.rows_affected() == 1)
}

async fn upsert(tx: &mut Transaction<'_, Postgres>, item: &Item) -> Result<(), DomainError> {
    let (gsi1pk, gsi1sk) = index_parts(item);
    sqlx::query(
        r#"
        INSERT INTO items (pk, sk, gsi1pk, gsi1sk, attributes)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (pk, sk) DO UPDATE SET
            gsi1pk = EXCLUDED.gsi1pk,
            gsi1sk = EXCLUDED.gsi1sk,
            attributes = EXCLUDED.attributes
        "#,
    )
    .bind(&item.key.pk)
    .bind(&item.key.sk)
    .bind(gsi1pk)
    .bind(gsi1sk)
    .bind(Json(&item.attributes))
    .execute(&mut **tx)
    .await
    .map_err(|e| db_error("Failed to upsert item", e))?;

    Ok(())
}

#[async_trait]
impl ItemStore for PostgresItemStore {
    async fn get(&self, key: &ItemKey) -> Result<Option<Item>, DomainError> {
        let row: Option<ItemRow> = sqlx::query_as(
            r#"
            SELECT pk, sk, gsi1pk, gsi1sk, attributes
            FROM items
            WHERE pk = $1 AND sk = $2
            "#,
        )
        .bind(&key.pk)
        .bind(&key.sk)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to read item", e))?;

        Ok(row.map(Item::from))
    }

    async fn put(&self, item: Item) -> Result<(), DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin transaction", e))?;
        upsert(&mut tx, &item).await?;
        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit item", e))
    }

    async fn query_partition(&self, pk: &str, sk_prefix: &str) -> Result<Vec<Item>, DomainError> {
        let rows: Vec<ItemRow> = sqlx::query_as(
            r#"
            SELECT pk, sk, gsi1pk, gsi1sk, attributes
            FROM items
            WHERE pk = $1 AND starts_with(sk, $2)
            ORDER BY sk
            "#,
        )
        .bind(pk)
        .bind(sk_prefix)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to query partition", e))?;

        Ok(rows.into_iter().map(Item::from).collect())
    }

    async fn query_index(
        &self,
        index_pk: &str,
        index_sk_prefix: Option<&str>,
    ) -> Result<Vec<Item>, DomainError> {
        let rows: Vec<ItemRow> = sqlx::query_as(
            r#"
            SELECT pk, sk, gsi1pk, gsi1sk, attributes
            FROM items
            WHERE gsi1pk = $1
              AND ($2::text IS NULL OR starts_with(gsi1sk, $2))
            ORDER BY gsi1sk, pk, sk
            "#,
        )
        .bind(index_pk)
        .bind(index_sk_prefix)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to query index", e))?;

        Ok(rows.into_iter().map(Item::from).collect())
    }

    async fn transact_put(&self, puts: Vec<PutRequest>) -> Result<WriteOutcome, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin transaction", e))?;

        for put in &puts {
            match put.condition {
                WriteCondition::NotExists => {
                    if !insert_if_absent(&mut tx, &put.item).await? {
                        tx.rollback()
                            .await
                            .map_err(|e| db_error("Failed to roll back", e))?;
                        return Ok(WriteOutcome::ConditionFailed);
                    }
                }
                WriteCondition::None => upsert(&mut tx, &put.item).await?,
            }
        }

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit transaction", e))?;
        Ok(WriteOutcome::Applied)
    }

    async fn update_attributes(
        &self,
        key: &ItemKey,
        attributes: Map<String, Value>,
    ) -> Result<WriteOutcome, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE items
            SET attributes = attributes || $3
            WHERE pk = $1 AND sk = $2
            "#,
        )
        .bind(&key.pk)
        .bind(&key.sk)
        .bind(Json(&attributes))
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to update item", e))?;

        if result.rows_affected() == 0 {
            return Ok(WriteOutcome::ConditionFailed);
        }
        Ok(WriteOutcome::Applied)
    }
}
