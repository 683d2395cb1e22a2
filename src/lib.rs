//! # dbmux
//!
//! A read/write-splitting connection router that presents one master and N
//! replica database connections as a single logical handle.
//!
//! ## Features
//!
//! - **Read/Write Split** - writes always route to the master, reads are
//!   load-balanced across replicas
//! - **Pluggable Balancing** - round robin (default), random, or
//!   least-recently-used replica selection
//! - **Scatter-Gather Lifecycle** - close and ping fan out to every physical
//!   connection concurrently and report the lowest-index failure
//! - **Async/Await** - built on Tokio for high-performance async operations
//! - **Opaque Endpoints** - anything implementing [`Connection`] can be
//!   routed; parsing, transactions, pooling, and the wire protocol stay
//!   inside the endpoint
//!
//! ## Quick Start
//!
//! Add to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! dbmux = "0.1"
//! tokio = { version = "1", features = ["full"] }
//! ```
//!
//! ## Basic Usage
//!
//! ```rust,ignore
//! use dbmux::{BalancePolicy, Cluster, Value};
//!
//! // Build a cluster from already-established physical connections.
//! // The first connection is the master, the rest are replicas.
//! let cluster = Cluster::builder()
//!     .master(master_conn)
//!     .replica(replica_a)
//!     .replica(replica_b)
//!     .policy(BalancePolicy::RoundRobin)
//!     .build()?;
//!
//! // Writes go to the master
//! cluster
//!     .execute("INSERT INTO users (name) VALUES (?)", &[Value::from("alice")])
//!     .await?;
//!
//! // Reads are balanced across the replicas
//! let rows = cluster.query("SELECT id, name FROM users", &[]).await?;
//!
//! // A prepared statement spans every physical connection
//! let stmt = cluster.prepare("SELECT name FROM users WHERE id = ?").await?;
//! let row = stmt.query_one(&[Value::from(1i64)]).await;
//!
//! // Close fans out to every connection and waits for all of them
//! stmt.close().await?;
//! cluster.close().await?;
//! ```
//!
//! ## Routing Rules
//!
//! | Operation | Routed to |
//! |-----------|-----------|
//! | `execute` / `execute_with` | master |
//! | `query` / `query_with` | one replica, chosen by the balance policy |
//! | `query_one` / `query_one_with` | one replica, chosen by the balance policy |
//! | `begin` / `begin_with` | master |
//! | `ping` / `ping_with` | every connection, concurrently |
//! | `prepare` / `prepare_with` | every connection, concurrently |
//! | `close` | every connection, concurrently |
//!
//! No query text is ever inspected: the split is decided entirely by which
//! method the caller invoked. A write issued through `query*` is routed to a
//! replica and may fail or silently not persist. With zero replicas every
//! read falls back to the master.
//!
//! ## Read-Your-Writes
//!
//! There is no consistency mode spanning master and replicas. A read that
//! must observe a preceding write goes through the [`Cluster::master`]
//! accessor explicitly:
//!
//! ```rust,ignore
//! cluster.execute("UPDATE accounts SET balance = 0 WHERE id = ?", &args).await?;
//! let rows = cluster.master().query("SELECT balance FROM accounts", &[]).await?;
//! ```
//!
//! ## Cancellation
//!
//! The `*_with` variants take a [`CancellationToken`] that is passed through
//! unchanged to the one physical connection selected for the operation.
//! `close` takes no token: it always waits for every physical close to
//! finish, even when some of them fail.
//!
//! ```rust,ignore
//! use dbmux::CancellationToken;
//!
//! let ctx = CancellationToken::new();
//! let rows = cluster.query_with(&ctx, "SELECT * FROM events", &[]).await?;
//! ```
//!
//! ## Modules
//!
//! - [`Cluster`] / [`ClusterStatement`] - the logical handles
//! - [`Connection`] / [`Statement`] - the capability surface an endpoint
//!   implements
//! - [`ReplicaSelector`] / [`BalancePolicy`] - replica selection
//! - [`scatter`] - the fan-out-with-first-error primitive
//!

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod cluster;
mod connection;
mod error;
mod policy;
mod scatter;
mod statement;
mod value;

#[cfg(test)]
mod testkit;

// Re-exports for convenience
pub use cluster::{Cluster, ClusterBuilder, ClusterMetrics};
pub use connection::{Connection, ExecSummary, Statement};
pub use error::{RouterError, RouterResult};
pub use policy::{BalancePolicy, ReplicaSelector};
pub use scatter::scatter;
pub use statement::ClusterStatement;
pub use value::Value;

/// 컨텍스트 변형 메서드가 받는 취소 토큰
pub use tokio_util::sync::CancellationToken;

/// 인자 목록 생성 매크로
#[macro_export]
macro_rules! args {
    () => {
        Vec::<$crate::Value>::new()
    };
    ($($value:expr),+ $(,)?) => {
        vec![$($crate::Value::from($value)),+]
    };
}
