//! Core domain types for the recipe graph.
//!
//! Response shapes are explicit projections of node properties: adding a
//! property to a node in the store never changes what the API returns.
//! Field names serialize in camelCase to match the query/mutation surface.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::id::EntityId;

// ── Graph Schema ──────────────────────────────────────────────────

/// Node kinds stored in the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeLabel {
    Recipe,
    Ingredient,
    Category,
    User,
}

impl NodeLabel {
    /// The Cypher label for this node kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Recipe => "Recipe",
            Self::Ingredient => "Ingredient",
            Self::Category => "Category",
            Self::User => "User",
        }
    }
}

impl fmt::Display for NodeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Relationship kinds. All of them start at a Recipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    /// Recipe -> Ingredient (possession).
    HasIngredient,
    /// Recipe -> Category (membership).
    BelongsTo,
    /// Recipe -> User (creation).
    Created,
}

impl Relation {
    /// The Cypher relationship type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HasIngredient => "HAS_INGREDIENT",
            Self::BelongsTo => "BELONGS_TO",
            Self::Created => "CREATED",
        }
    }

    /// Label of the node at the far end of the relationship.
    pub fn target(&self) -> NodeLabel {
        match self {
            Self::HasIngredient => NodeLabel::Ingredient,
            Self::BelongsTo => NodeLabel::Category,
            Self::Created => NodeLabel::User,
        }
    }
}

// ── Response Shapes ───────────────────────────────────────────────

/// A recipe joined with its ingredients, category, and creator.
///
/// A recipe without a category or creator is still a complete recipe; those
/// fields are `None`, never omitted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: EntityId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub difficulty: Option<String>,
    /// Time estimate in minutes.
    #[serde(default)]
    pub time: Option<i64>,
    #[serde(default)]
    pub ingredients: Vec<IngredientRef>,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub created_by: Option<UserRef>,
}

impl Recipe {
    /// Ingredient names in the order they were returned.
    pub fn ingredient_names(&self) -> Vec<&str> {
        self.ingredients.iter().map(|i| i.name.as_str()).collect()
    }
}

/// Ingredient as embedded in a recipe.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct IngredientRef {
    pub id: EntityId,
    pub name: String,
}

/// An ingredient with the recipes that use it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Ingredient {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub recipes: Vec<RecipeRef>,
}

/// Recipe as back-referenced from an ingredient.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct RecipeRef {
    pub id: EntityId,
    pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Category {
    pub id: EntityId,
    pub name: String,
}

/// Creator as embedded in a recipe.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct UserRef {
    pub id: EntityId,
    pub username: String,
}

/// Public view of a user account. Never carries the password hash.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: EntityId,
    pub username: String,
    pub email: String,
}

/// Stored user account including the password hash.
///
/// Only used between the graph layer and the login flow; it has no
/// `Serialize` impl so it cannot end up in a response.
#[derive(Clone, Deserialize, PartialEq, Eq)]
pub struct UserRecord {
    pub id: EntityId,
    pub username: String,
    pub email: String,
    #[serde(rename = "password")]
    pub password_hash: String,
}

impl UserRecord {
    pub fn to_user(&self) -> User {
        User {
            id: self.id.clone(),
            username: self.username.clone(),
            email: self.email.clone(),
        }
    }
}

impl fmt::Debug for UserRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserRecord")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password_hash", &"<redacted>")
            .finish()
    }
}

/// Result of a successful registration or login.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AuthPayload {
    pub token: String,
    pub user: User,
}

// ── Inputs ────────────────────────────────────────────────────────

/// Parameters of `createRecipe`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewRecipe {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub time: Option<i64>,
    /// Ingredient names, resolved by exact-match upsert.
    #[serde(default)]
    pub ingredients: Vec<String>,
    /// Category name, resolved by exact-match upsert.
    #[serde(default)]
    pub category: Option<String>,
    /// Existing user to link as creator.
    #[serde(default)]
    pub created_by_user_id: Option<EntityId>,
}

/// Parameters of `updateRecipe`.
///
/// `None` means "leave unchanged", not "clear". A supplied ingredient list or
/// category replaces every existing link of that kind.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecipePatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub time: Option<i64>,
    #[serde(default)]
    pub ingredients: Option<Vec<String>>,
    #[serde(default)]
    pub category: Option<String>,
}

impl RecipePatch {
    /// True when the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.difficulty.is_none()
            && self.time.is_none()
            && self.ingredients.is_none()
            && self.category.is_none()
    }
}

/// Parameters of the graph-level `createUser`; the password is already hashed.
#[derive(Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

impl fmt::Debug for NewUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewUser")
            .field("username", &self.username)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}
