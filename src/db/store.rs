//! Postgres access: order/customer rows, customer profiles and the document
//! URL columns.
//!
//! Rows are fetched whole as `jsonb` so the normalizer sees every historical
//! column, whichever schema version produced the row.

use async_trait::async_trait;
use log::debug;
use moka::future::Cache;
use serde_json::Value;
use sqlx::PgPool;
use std::future::Future;
use std::time::Duration;

use super::RecordSource;
use crate::documents::distribution::{append_url_history, DistributionError, DocumentLedger, LedgerTarget};
use crate::documents::normalizer::{profile_from_customer_record, CustomerDirectory, CustomerProfile};

const PROFILE_TTL: Duration = Duration::from_secs(60);

/// Short-lived cache of found profiles. Misses are never stored, so a
/// customer created after a failed lookup is seen on the next request.
pub(crate) struct ProfileCache {
    inner: Cache<String, CustomerProfile>,
}

impl ProfileCache {
    pub(crate) fn new(ttl: Duration) -> Self {
        Self {
            inner: Cache::builder().time_to_live(ttl).max_capacity(1_000).build(),
        }
    }

    pub(crate) async fn get_or_fetch<F>(&self, key: String, fetch: F) -> Result<Option<CustomerProfile>, String>
    where
        F: Future<Output = Result<Option<CustomerProfile>, String>>,
    {
        if let Some(profile) = self.inner.get(&key).await {
            debug!("profile cache hit for {}", key);
            return Ok(Some(profile));
        }
        let profile = fetch.await?;
        if let Some(found) = &profile {
            self.inner.insert(key, found.clone()).await;
        }
        Ok(profile)
    }
}

pub struct PgStore {
    pool: PgPool,
    profile_cache: ProfileCache,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            profile_cache: ProfileCache::new(PROFILE_TTL),
        }
    }

    async fn fetch_row(&self, sql: &str, id: &str) -> Result<Option<Value>, sqlx::Error> {
        sqlx::query_scalar::<_, Value>(sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn cached_profile(&self, cache_key: String, sql: &str, id: &str) -> Result<Option<CustomerProfile>, String> {
        self.profile_cache
            .get_or_fetch(cache_key, async {
                self.fetch_row(sql, id)
                    .await
                    .map(|row| row.map(|row| profile_from_customer_record(&row)))
                    .map_err(|e| format!("customer lookup failed: {e}"))
            })
            .await
    }

    async fn append_quote_url(&self, order_id: &str, url: &str) -> Result<u64, sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        let history: Option<Option<String>> =
            sqlx::query_scalar("SELECT quote_urls FROM orders WHERE id::text = $1 FOR UPDATE")
                .bind(order_id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some(history) = history else {
            tx.rollback().await?;
            return Ok(0);
        };
        let updated = append_url_history(history.as_deref(), url);
        let result = sqlx::query("UPDATE orders SET quote_urls = $1 WHERE id::text = $2")
            .bind(&updated)
            .bind(order_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl RecordSource for PgStore {
    async fn order_record(&self, order_id: &str) -> Result<Option<Value>, String> {
        self.fetch_row("SELECT to_jsonb(o) FROM orders o WHERE o.id::text = $1", order_id)
            .await
            .map_err(|e| format!("order lookup failed: {e}"))
    }

    async fn customer_record(&self, customer_id: &str) -> Result<Option<Value>, String> {
        self.fetch_row("SELECT to_jsonb(c) FROM customers c WHERE c.id::text = $1", customer_id)
            .await
            .map_err(|e| format!("customer lookup failed: {e}"))
    }
}

#[async_trait]
impl CustomerDirectory for PgStore {
    async fn find_by_customer_id(&self, customer_id: i64) -> Result<Option<CustomerProfile>, String> {
        let id = customer_id.to_string();
        self.cached_profile(
            format!("id:{id}"),
            "SELECT to_jsonb(c) FROM customers c WHERE c.id::text = $1",
            &id,
        )
        .await
    }

    async fn find_by_auth_id(&self, auth_id: &str) -> Result<Option<CustomerProfile>, String> {
        self.cached_profile(
            format!("auth:{auth_id}"),
            "SELECT to_jsonb(c) FROM customers c WHERE c.user_id::text = $1",
            auth_id,
        )
        .await
    }
}

#[async_trait]
impl DocumentLedger for PgStore {
    async fn record(&self, target: LedgerTarget, owner_id: &str, url: &str) -> Result<(), DistributionError> {
        let result = match target {
            LedgerTarget::QuoteHistory => self.append_quote_url(owner_id, url).await,
            LedgerTarget::OrderContract => {
                overwrite(&self.pool, "UPDATE orders SET contract_url = $1 WHERE id::text = $2", owner_id, url).await
            }
            LedgerTarget::OrderConfirmation => {
                overwrite(&self.pool, "UPDATE orders SET confirmation_url = $1 WHERE id::text = $2", owner_id, url).await
            }
            LedgerTarget::CustomerContract => {
                overwrite(&self.pool, "UPDATE customers SET contract_url = $1 WHERE id::text = $2", owner_id, url).await
            }
        };

        match result {
            Ok(0) => Err(DistributionError::Ledger(format!(
                "no row {} to record {} in",
                owner_id,
                target.column()
            ))),
            Ok(_) => Ok(()),
            Err(e) => Err(DistributionError::Ledger(e.to_string())),
        }
    }
}

async fn overwrite(pool: &PgPool, sql: &str, owner_id: &str, url: &str) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(sql).bind(url).bind(owner_id).execute(pool).await?;
    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn profile() -> CustomerProfile {
        CustomerProfile::new(Some("12.345.678-5".to_string()), None)
    }

    #[tokio::test]
    async fn test_found_profile_is_cached() {
        let cache = ProfileCache::new(PROFILE_TTL);
        let fetches = AtomicUsize::new(0);

        for _ in 0..2 {
            let found = cache
                .get_or_fetch("id:10".to_string(), async {
                    fetches.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, String>(Some(profile()))
                })
                .await
                .unwrap();
            assert_eq!(found, Some(profile()));
        }
        assert_eq!(fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_miss_is_not_cached() {
        let cache = ProfileCache::new(PROFILE_TTL);

        let missing = cache
            .get_or_fetch("auth:new".to_string(), async { Ok::<_, String>(None) })
            .await
            .unwrap();
        assert_eq!(missing, None);

        let created = cache
            .get_or_fetch("auth:new".to_string(), async { Ok::<_, String>(Some(profile())) })
            .await
            .unwrap();
        assert_eq!(created, Some(profile()));
    }

    #[tokio::test]
    async fn test_lookup_error_is_not_cached() {
        let cache = ProfileCache::new(PROFILE_TTL);

        let err = cache
            .get_or_fetch("id:3".to_string(), async { Err::<Option<CustomerProfile>, _>("connection reset".to_string()) })
            .await
            .unwrap_err();
        assert_eq!(err, "connection reset");

        let found = cache
            .get_or_fetch("id:3".to_string(), async { Ok::<_, String>(Some(profile())) })
            .await
            .unwrap();
        assert!(found.is_some());
    }
}
