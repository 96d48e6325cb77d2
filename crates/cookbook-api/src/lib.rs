//! cookbook-api: Query and mutation resolvers for the Cookbook recipe graph.
//!
//! Each resolver checks the operation's access level, validates its input,
//! and delegates to a [`cookbook_graph::RecipeStore`]. Registration and login
//! go through the credential service from `cookbook-auth`.

pub mod config;
pub mod context;
pub mod request;
pub mod resolvers;
pub mod validate;

pub use config::ServiceConfig;
pub use context::RequestContext;
pub use request::{dispatch, RecipeUpdate, Request, Response};
pub use resolvers::Resolvers;
