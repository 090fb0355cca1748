//! # jobly
//!
//! Data-access core for the Jobly job board (companies, jobs, users) on
//! PostgreSQL.
//!
//! ## Features
//!
//! - **Partial updates**: [`sql_for_partial_update`] turns any non-empty subset
//!   of an entity's fields into a `SET` clause with `$1..$n` placeholders
//! - **Search filters**: [`sql_for_filter`] composes an entity's optional
//!   criteria into one `WHERE` predicate with contiguous placeholders
//! - **Explicit connections**: entity operations take `&impl GenericClient`,
//!   so they run on a plain client, a pooled client, or a transaction
//!
//! Both builders are pure: they return a [`Fragment`] (clause text plus
//! ordered values) and never touch the database.
//!
//! ```ignore
//! use jobly::models::{Job, JobFilter, JobUpdate};
//!
//! let pool = jobly::create_pool(&jobly::DbConfig::from_env()?)?;
//! let client = pool.get().await?;
//!
//! let filter: JobFilter = jobly::parse_filter(serde_json::json!({"minSalary": 150}))?;
//! let jobs = Job::find_all(&client, &filter).await?;
//!
//! let patch = JobUpdate { title: Some("Senior".into()), ..Default::default() };
//! let job = Job::update(&client, jobs[0].id, &patch).await?;
//! ```

pub mod client;
pub mod columns;
pub mod config;
pub mod error;
pub mod filter;
pub mod fragment;
pub mod models;
pub mod partial_update;
pub mod row;
pub mod value;

pub use client::GenericClient;
pub use columns::{ColumnMap, quote_column};
pub use config::DbConfig;
pub use error::{ErrorClass, JoblyError, JoblyResult};
pub use filter::{Filter, FilterField, parse_filter, sql_for_filter};
pub use fragment::Fragment;
pub use partial_update::{FieldUpdates, sql_for_partial_update};
pub use row::{FromRow, RowExt};
pub use value::Value;

#[cfg(feature = "pool")]
pub mod pool;

#[cfg(feature = "pool")]
pub use pool::create_pool;
