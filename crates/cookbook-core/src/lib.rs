//! cookbook-core: Shared types, identifiers, and error handling for the Cookbook recipe graph.
//!
//! This crate provides the foundational types used across all Cookbook components:
//! - Entity and response shapes (Recipe, Ingredient, Category, User)
//! - Node labels and relationship kinds of the property graph
//! - External identifiers and the identity allocator
//! - The per-operation authorization table
//! - The API error taxonomy

pub mod access;
pub mod error;
pub mod id;
pub mod types;

pub use access::{Access, Operation};
pub use error::ApiError;
pub use id::{EntityId, IdAllocator, UuidAllocator};
pub use types::{
    AuthPayload, Category, Ingredient, IngredientRef, NewRecipe, NewUser, NodeLabel, Recipe,
    RecipePatch, RecipeRef, Relation, User, UserRecord, UserRef,
};
