//! Employee roster lookups. Employee records themselves live in the HRM core.

use std::collections::HashSet;
use std::time::Duration;

use futures::FutureExt;
use futures::future::BoxFuture;
use moka::future::Cache;
use sqlx::MySqlPool;

use crate::error::StoreResult;

pub trait EmployeeRoster: Send + Sync {
    fn employee_exists(&self, employee_id: u64) -> BoxFuture<'_, StoreResult<bool>>;
}

/// Reads the `employees` table. Employees are never hard-deleted, so a
/// positive answer is cached; misses always go to the database.
pub struct MySqlRoster {
    pool: MySqlPool,
    known: Cache<u64, ()>,
}

impl MySqlRoster {
    pub fn new(pool: MySqlPool, ttl: Duration) -> Self {
        Self {
            pool,
            known: Cache::builder()
                .max_capacity(100_000)
                .time_to_live(ttl)
                .build(),
        }
    }
}

impl EmployeeRoster for MySqlRoster {
    fn employee_exists(&self, employee_id: u64) -> BoxFuture<'_, StoreResult<bool>> {
        async move {
            if self.known.get(&employee_id).await.is_some() {
                return Ok(true);
            }

            let found = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM employees WHERE id = ?")
                .bind(employee_id)
                .fetch_one(&self.pool)
                .await?;
            let exists = found > 0;

            if exists {
                self.known.insert(employee_id, ()).await;
            }
            Ok(exists)
        }
        .boxed()
    }
}

/// Fixed set of employee ids, for the in-memory backend.
#[derive(Debug, Default, Clone)]
pub struct MemoryRoster {
    ids: HashSet<u64>,
}

impl MemoryRoster {
    pub fn new(ids: impl IntoIterator<Item = u64>) -> Self {
        Self {
            ids: ids.into_iter().collect(),
        }
    }
}

impl EmployeeRoster for MemoryRoster {
    fn employee_exists(&self, employee_id: u64) -> BoxFuture<'_, StoreResult<bool>> {
        let exists = self.ids.contains(&employee_id);
        async move { Ok(exists) }.boxed()
    }
}
