//! Taskforge local stack
//!
//! Brings up the local Taskforge environment (PostgreSQL, Redis, server, worker)
//! with docker compose, and manages it afterwards.
//!
//! # Architecture
//!
//! ```text
//! Stack::init
//!   ├─ env::reconcile        .env (secrets generated once)
//!   ├─ topology::reconcile   docker-compose.yml (written once unless forced)
//!   ├─ sync_credentials      CLI config token
//!   └─ ComposeCli            pull → up deps → wait → migrate → up
//!        └─ CommandRunner    SystemRunner / test doubles
//! ```

pub mod bringup;
pub mod compose;
pub mod env;
pub mod error;
pub mod fsutil;
pub mod lifecycle;
pub mod runner;
pub mod stack;
pub mod topology;
pub mod waiter;

pub use bringup::{
    BringupStage, InitOptions, InitReport, NullObserver, StageObserver, sync_credentials,
};
pub use compose::{ComposeCli, ComposeStyle, LogsOptions, PluginStyle, StandaloneStyle};
pub use env::{EnvFile, Reconciled};
pub use error::{Result, StackError};
pub use runner::{CommandOutput, CommandRunner, CommandSpec, SystemRunner};
pub use stack::{Stack, StackPaths};
pub use topology::TopologyDecision;
pub use waiter::{ReadinessConfig, ReadinessProbe};
