//! cookbook-graph: The graph access layer for the Cookbook recipe graph.
//!
//! Every domain read and write is one method of [`RecipeStore`] and runs as
//! a single transaction. This crate owns the consistency rules of the graph:
//! upsert-by-name for ingredients and categories, delete-then-recreate for
//! recipe relationships, email uniqueness for users, and detach-delete.
//!
//! Two stores implement the trait: [`GraphClient`] talks to Neo4j over bolt,
//! [`MemoryGraph`] keeps the graph in process.

pub mod client;
pub mod memory;
pub mod mutations;
pub mod queries;
pub mod store;

pub use client::{GraphClient, GraphConfig, GraphError};
pub use memory::MemoryGraph;
pub use store::RecipeStore;
