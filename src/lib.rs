//! td - Personal Task Tracking Library
//!
//! This library provides the core functionality for the td CLI tool:
//! an owner-scoped task store with a filtering, sorting, paginating,
//! and statistics-computing query engine.
//!
//! # Core Concepts
//!
//! - **Owner scoping**: every task belongs to exactly one owner, and
//!   every query carries an explicit owner id; there is no ambient
//!   "current user" inside the core
//! - **Predicates**: storage-neutral AND-combined filter conditions
//!   over task fields (search, priority, completion, category, tag,
//!   deadline range)
//! - **Query engine**: one call filters, sorts (stable), paginates, and
//!   computes dashboard statistics over the owner's full task set
//! - **Statistics**: global counts (total, completed, per-priority,
//!   overdue) independent of the active filters
//!
//! # Module Organization
//!
//! - `cli`: Command-line interface using clap
//! - `config`: Configuration loading from `config.toml`
//! - `error`: Error types and result aliases
//! - `lock`: File locking for store mutations
//! - `output`: Human and JSON output envelopes
//! - `owner`: Owner identity resolution
//! - `query`: Predicate, sorting, pagination, statistics, query engine
//! - `storage`: Data directory layout and atomic file I/O
//! - `store`: TaskStore trait with file-backed and in-memory stores
//! - `task`: Task data model

pub mod cli;
pub mod config;
pub mod error;
pub mod lock;
pub mod output;
pub mod owner;
pub mod query;
pub mod storage;
pub mod store;
pub mod task;

pub use error::{Error, Result};
