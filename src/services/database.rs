use crate::config::Config;
use crate::error::{AppError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use surrealdb::engine::remote::http::{Client, Http};
use surrealdb::opt::auth::Root;
use surrealdb::{Response, Surreal};
use tracing::{error, info};

/// Database service. Thin wrapper over the SurrealDB HTTP client; all
/// mutual exclusion relies on single-statement atomic updates, never on
/// app-level read-modify-write.
#[derive(Clone)]
pub struct Database {
    client: Surreal<Client>,
    pub config: Config,
}

impl Database {
    pub async fn new(config: &Config) -> Result<Self> {
        info!("Initializing database connection to {}", config.database_url);

        let address = config
            .database_url
            .trim_start_matches("http://")
            .trim_start_matches("https://");

        let client = Surreal::new::<Http>(address).await?;
        client
            .signin(Root {
                username: &config.database_username,
                password: &config.database_password,
            })
            .await?;
        client
            .use_ns(&config.database_namespace)
            .use_db(&config.database_name)
            .await?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    pub async fn verify_connection(&self) -> Result<()> {
        match self.client.query("INFO FOR DB").await {
            Ok(_) => {
                info!("Database connection verified successfully");
                Ok(())
            }
            Err(e) => {
                error!("Failed to verify database connection: {}", e);
                Err(AppError::from(e))
            }
        }
    }

    /// Executes a query with bound parameters.
    pub async fn query_with_params<P>(&self, sql: &str, params: P) -> Result<Response>
    where
        P: Serialize,
    {
        self.client
            .query(sql)
            .bind(params)
            .await
            .map_err(AppError::from)
    }

    /// Executes a query and deserializes the first statement's rows.
    pub async fn select_with_params<T, P>(&self, sql: &str, params: P) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
        P: Serialize,
    {
        let mut response = self.query_with_params(sql, params).await?;
        let rows: Vec<T> = response.take(0)?;
        Ok(rows)
    }

    /// Creates a record keyed by the id carried in its content.
    pub async fn create<T>(&self, table: &str, id: &str, data: T) -> Result<T>
    where
        T: Serialize + DeserializeOwned + Send + Sync + Clone + Debug + 'static,
    {
        let created: Option<T> = self.client.create((table, id)).content(data).await?;
        created.ok_or_else(|| AppError::internal("Failed to create record"))
    }

    pub async fn get_by_id<T>(&self, table: &str, id: &str) -> Result<Option<T>>
    where
        T: DeserializeOwned + Send + Sync + Debug,
    {
        let record: Option<T> = self.client.select((table, id)).await?;
        Ok(record)
    }

    /// Merges the given fields into a record. For counter fields, prefer
    /// an increment statement via [`query_with_params`] instead.
    pub async fn merge_by_id<T>(
        &self,
        table: &str,
        id: &str,
        updates: serde_json::Value,
    ) -> Result<Option<T>>
    where
        T: DeserializeOwned + Send + Sync + Debug,
    {
        let updated: Option<T> = self.client.update((table, id)).merge(updates).await?;
        Ok(updated)
    }

    pub async fn delete_by_id(&self, table: &str, id: &str) -> Result<()> {
        let _: Option<serde_json::Value> = self.client.delete((table, id)).await?;
        Ok(())
    }

    /// Total-count probe used by the shared pagination convention.
    pub async fn count<P>(&self, sql: &str, params: P) -> Result<usize>
    where
        P: Serialize,
    {
        #[derive(Debug, Deserialize)]
        struct CountRow {
            count: usize,
        }

        let mut response = self.query_with_params(sql, params).await?;
        let rows: Vec<CountRow> = response.take(0)?;
        Ok(rows.first().map(|r| r.count).unwrap_or(0))
    }
}

/// UPDATE statement scoped to an already existing record, bound to `$id`.
/// Targeting `type::thing(..)` directly would create the record when the
/// id does not exist; the WHERE form leaves missing ids untouched and
/// returns no rows.
pub fn update_existing(table: &str, set_clause: &str) -> String {
    format!("UPDATE {table} SET {set_clause} WHERE id = type::thing('{table}', $id)")
}

/// SET clause moving `$blog` into or out of an array field. Additions go
/// through array::union so the list stays duplicate-free.
pub fn array_membership(field: &str, add: bool) -> String {
    if add {
        format!("{field} = array::union({field}, [$blog])")
    } else {
        format!("{field} -= $blog")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_existing_never_targets_a_record_pointer_directly() {
        let sql = update_existing("blog", "activity.total_likes += $delta");
        assert_eq!(
            sql,
            "UPDATE blog SET activity.total_likes += $delta \
             WHERE id = type::thing('blog', $id)"
        );
        assert!(!sql.starts_with("UPDATE type::thing"));
    }

    #[test]
    fn array_membership_adds_without_duplicates_and_pulls_on_remove() {
        assert_eq!(
            array_membership("liked_blogs", true),
            "liked_blogs = array::union(liked_blogs, [$blog])"
        );
        assert_eq!(
            array_membership("read_later_blogs", false),
            "read_later_blogs -= $blog"
        );
    }
}
