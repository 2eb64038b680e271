use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use async_trait::async_trait;
use num_bigint::BigUint;
use sqlx::{sqlite::SqlitePoolOptions, FromRow, SqliteConnection, SqlitePool};

use crate::config::Chain;
use crate::merge::{rank_entries, Limit, ScanSink};
use crate::models::{ContractBurn, RankedEntry, ScanResult};
use crate::protocols::ProtocolTable;

pub type DbPool = SqlitePool;

pub async fn init_pool(database_url: &str) -> Result<DbPool> {
    ensure_dir_exists(database_url)?;

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await
        .context("failed to connect to SQLite")?;

    apply_schema(&pool).await?;
    Ok(pool)
}

fn ensure_dir_exists(database_url: &str) -> Result<()> {
    if let Some(path) = database_url.strip_prefix("sqlite://") {
        if path != ":memory:" {
            if let Some(dir) = Path::new(path).parent() {
                std::fs::create_dir_all(dir)
                    .with_context(|| format!("failed creating db directory {:?}", dir))?;
            }
        }
    }
    Ok(())
}

async fn apply_schema(pool: &SqlitePool) -> Result<()> {
    // score is a decimal string; burns routinely exceed SQLite's 64-bit INTEGER.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS hot_contracts (
            chain TEXT NOT NULL,
            address TEXT NOT NULL,
            score TEXT NOT NULL,
            hits INTEGER NOT NULL DEFAULT 0,
            last_block INTEGER,
            updated_at INTEGER NOT NULL,
            PRIMARY KEY (chain, address)
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_hot_contracts_chain ON hot_contracts(chain);
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Rolling per-contract burn across scan cycles, keyed by `(chain, address)`.
#[derive(Clone)]
pub struct HotStore {
    pool: DbPool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HotContract {
    pub chain: String,
    pub address: String,
    pub score: BigUint,
    pub hits: i64,
    pub last_block: Option<i64>,
}

impl HotStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self> {
        Ok(Self::new(init_pool(database_url).await?))
    }

    /// Add `burn` to the contract's running score.
    ///
    /// Takes the write lock before reading (`BEGIN IMMEDIATE`); other writers
    /// on the same file wait on the busy timeout.
    pub async fn add_burn(
        &self,
        chain: &str,
        burn: &ContractBurn,
        block_number: Option<u64>,
    ) -> Result<BigUint> {
        let mut conn = self.pool.acquire().await?;
        sqlx::query("BEGIN IMMEDIATE;").execute(&mut *conn).await?;

        match accumulate(&mut conn, chain, burn, block_number).await {
            Ok(score) => {
                sqlx::query("COMMIT;").execute(&mut *conn).await?;
                Ok(score)
            }
            Err(e) => {
                if let Err(rollback) = sqlx::query("ROLLBACK;").execute(&mut *conn).await {
                    tracing::warn!("rollback of hot score update failed: {}", rollback);
                }
                Err(e)
            }
        }
    }

    /// Highest scores for one chain; ties by address.
    pub async fn top_for_chain(&self, chain: &str, limit: i64) -> Result<Vec<HotContract>> {
        #[derive(FromRow)]
        struct Row {
            chain: String,
            address: String,
            score: String,
            hits: i64,
            last_block: Option<i64>,
        }

        // Canonical decimal strings order numerically by (length, text).
        let rows = sqlx::query_as::<_, Row>(
            r#"
            SELECT chain, address, score, hits, last_block
            FROM hot_contracts
            WHERE chain = ?1
            ORDER BY LENGTH(score) DESC, score DESC, address ASC
            LIMIT ?2;
            "#,
        )
        .bind(chain)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                Ok(HotContract {
                    score: parse_score(&row.score)?,
                    chain: row.chain,
                    address: row.address,
                    hits: row.hits,
                    last_block: row.last_block,
                })
            })
            .collect()
    }

    /// Top entries of every chain merged into one ranking.
    pub async fn hot_ranking(
        &self,
        chains: &[Chain],
        protocols: &ProtocolTable,
        limit: Limit,
    ) -> Result<Vec<RankedEntry>> {
        let per_chain = i64::try_from(limit.get()).unwrap_or(i64::MAX);
        let lookups = chains.iter().map(|chain| async move {
            self.top_for_chain(&chain.id, per_chain)
                .await
                .map(|rows| (chain, rows))
        });

        let mut entries = Vec::new();
        for result in futures_util::future::join_all(lookups).await {
            let (chain, rows) = result?;
            entries.extend(rows.into_iter().map(|row| {
                protocols.enrich(
                    chain,
                    ContractBurn {
                        address: row.address,
                        gas: row.score,
                    },
                )
            }));
        }

        Ok(rank_entries(entries, limit))
    }
}

#[async_trait]
impl ScanSink for HotStore {
    async fn record(&self, result: &ScanResult) -> Result<()> {
        let Some(top) = &result.top_entry else {
            return Ok(());
        };
        let score = self.add_burn(&result.chain, top, result.block_number).await?;
        tracing::debug!(
            "hot score for {}:{} is now {}",
            result.chain,
            top.address,
            score
        );
        Ok(())
    }
}

async fn accumulate(
    conn: &mut SqliteConnection,
    chain: &str,
    burn: &ContractBurn,
    block_number: Option<u64>,
) -> Result<BigUint> {
    let current: Option<(String,)> =
        sqlx::query_as("SELECT score FROM hot_contracts WHERE chain = ?1 AND address = ?2;")
            .bind(chain)
            .bind(&burn.address)
            .fetch_optional(&mut *conn)
            .await?;
    let previous = match current {
        Some((raw,)) => parse_score(&raw)?,
        None => BigUint::default(),
    };
    let score = previous + &burn.gas;

    sqlx::query(
        r#"
        INSERT INTO hot_contracts (chain, address, score, hits, last_block, updated_at)
        VALUES (?1, ?2, ?3, 1, ?4, ?5)
        ON CONFLICT(chain, address) DO UPDATE SET
            score = excluded.score,
            hits = hits + 1,
            last_block = COALESCE(excluded.last_block, last_block),
            updated_at = excluded.updated_at;
        "#,
    )
    .bind(chain)
    .bind(&burn.address)
    .bind(score.to_str_radix(10))
    .bind(block_number.and_then(|n| i64::try_from(n).ok()))
    .bind(unix_now())
    .execute(&mut *conn)
    .await?;

    Ok(score)
}

fn parse_score(raw: &str) -> Result<BigUint> {
    BigUint::parse_bytes(raw.as_bytes(), 10)
        .with_context(|| format!("corrupt score {:?} in hot_contracts", raw))
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}
