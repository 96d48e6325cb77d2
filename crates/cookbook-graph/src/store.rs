//! The graph access contract shared by every backing store.

use std::future::Future;

use cookbook_core::{
    Category, EntityId, Ingredient, NewRecipe, NewUser, Recipe, RecipePatch, User, UserRecord,
};

use crate::client::{GraphClient, GraphError};

/// One method per domain action. Each call is a single atomic transaction:
/// either every statement takes effect or none does.
///
/// Lookups by id fail with [`GraphError::NotFound`]; listings return an empty
/// vector on an empty graph; deletes report whether a node existed.
pub trait RecipeStore: Send + Sync {
    // ── Reads ────────────────────────────────────────────────────

    fn get_recipes(&self) -> impl Future<Output = Result<Vec<Recipe>, GraphError>> + Send;

    fn get_recipe(&self, id: &EntityId) -> impl Future<Output = Result<Recipe, GraphError>> + Send;

    fn get_ingredients(&self) -> impl Future<Output = Result<Vec<Ingredient>, GraphError>> + Send;

    fn get_ingredient(
        &self,
        id: &EntityId,
    ) -> impl Future<Output = Result<Ingredient, GraphError>> + Send;

    fn get_category(
        &self,
        id: &EntityId,
    ) -> impl Future<Output = Result<Category, GraphError>> + Send;

    fn get_users(&self) -> impl Future<Output = Result<Vec<User>, GraphError>> + Send;

    fn get_user(&self, id: &EntityId) -> impl Future<Output = Result<User, GraphError>> + Send;

    /// Stored account, password hash included, for credential checks.
    fn find_user_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<Option<UserRecord>, GraphError>> + Send;

    // ── Writes ───────────────────────────────────────────────────

    /// Create a recipe. Ingredients and category are upserted by name; the
    /// creator, when given, must already exist.
    fn create_recipe(
        &self,
        input: &NewRecipe,
    ) -> impl Future<Output = Result<Recipe, GraphError>> + Send;

    /// Apply only the supplied fields; a supplied ingredient list or category
    /// replaces all existing links of that kind.
    fn update_recipe(
        &self,
        id: &EntityId,
        patch: &RecipePatch,
    ) -> impl Future<Output = Result<Recipe, GraphError>> + Send;

    fn delete_recipe(&self, id: &EntityId) -> impl Future<Output = Result<bool, GraphError>> + Send;

    /// Idempotent: the same name always yields the same ingredient.
    fn create_ingredient(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Ingredient, GraphError>> + Send;

    fn update_ingredient(
        &self,
        id: &EntityId,
        name: &str,
    ) -> impl Future<Output = Result<Ingredient, GraphError>> + Send;

    fn delete_ingredient(
        &self,
        id: &EntityId,
    ) -> impl Future<Output = Result<bool, GraphError>> + Send;

    /// Idempotent: the same name always yields the same category.
    fn create_category(&self, name: &str)
        -> impl Future<Output = Result<Category, GraphError>> + Send;

    fn update_category(
        &self,
        id: &EntityId,
        name: &str,
    ) -> impl Future<Output = Result<Category, GraphError>> + Send;

    fn delete_category(&self, id: &EntityId)
        -> impl Future<Output = Result<bool, GraphError>> + Send;

    /// Fails with [`GraphError::Conflict`] when the email is taken.
    fn create_user(&self, input: &NewUser) -> impl Future<Output = Result<User, GraphError>> + Send;

    fn update_user(
        &self,
        id: &EntityId,
        username: &str,
    ) -> impl Future<Output = Result<User, GraphError>> + Send;

    fn delete_user(&self, id: &EntityId) -> impl Future<Output = Result<bool, GraphError>> + Send;

    /// Cheap reachability check.
    fn health_check(&self) -> impl Future<Output = Result<(), GraphError>> + Send;
}

impl RecipeStore for GraphClient {
    async fn get_recipes(&self) -> Result<Vec<Recipe>, GraphError> {
        GraphClient::get_recipes(self).await
    }

    async fn get_recipe(&self, id: &EntityId) -> Result<Recipe, GraphError> {
        GraphClient::get_recipe(self, id).await
    }

    async fn get_ingredients(&self) -> Result<Vec<Ingredient>, GraphError> {
        GraphClient::get_ingredients(self).await
    }

    async fn get_ingredient(&self, id: &EntityId) -> Result<Ingredient, GraphError> {
        GraphClient::get_ingredient(self, id).await
    }

    async fn get_category(&self, id: &EntityId) -> Result<Category, GraphError> {
        GraphClient::get_category(self, id).await
    }

    async fn get_users(&self) -> Result<Vec<User>, GraphError> {
        GraphClient::get_users(self).await
    }

    async fn get_user(&self, id: &EntityId) -> Result<User, GraphError> {
        GraphClient::get_user(self, id).await
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, GraphError> {
        GraphClient::find_user_by_email(self, email).await
    }

    async fn create_recipe(&self, input: &NewRecipe) -> Result<Recipe, GraphError> {
        GraphClient::create_recipe(self, input).await
    }

    async fn update_recipe(&self, id: &EntityId, patch: &RecipePatch) -> Result<Recipe, GraphError> {
        GraphClient::update_recipe(self, id, patch).await
    }

    async fn delete_recipe(&self, id: &EntityId) -> Result<bool, GraphError> {
        GraphClient::delete_recipe(self, id).await
    }

    async fn create_ingredient(&self, name: &str) -> Result<Ingredient, GraphError> {
        GraphClient::create_ingredient(self, name).await
    }

    async fn update_ingredient(&self, id: &EntityId, name: &str) -> Result<Ingredient, GraphError> {
        GraphClient::update_ingredient(self, id, name).await
    }

    async fn delete_ingredient(&self, id: &EntityId) -> Result<bool, GraphError> {
        GraphClient::delete_ingredient(self, id).await
    }

    async fn create_category(&self, name: &str) -> Result<Category, GraphError> {
        GraphClient::create_category(self, name).await
    }

    async fn update_category(&self, id: &EntityId, name: &str) -> Result<Category, GraphError> {
        GraphClient::update_category(self, id, name).await
    }

    async fn delete_category(&self, id: &EntityId) -> Result<bool, GraphError> {
        GraphClient::delete_category(self, id).await
    }

    async fn create_user(&self, input: &NewUser) -> Result<User, GraphError> {
        GraphClient::create_user(self, input).await
    }

    async fn update_user(&self, id: &EntityId, username: &str) -> Result<User, GraphError> {
        GraphClient::update_user(self, id, username).await
    }

    async fn delete_user(&self, id: &EntityId) -> Result<bool, GraphError> {
        GraphClient::delete_user(self, id).await
    }

    async fn health_check(&self) -> Result<(), GraphError> {
        self.ping().await
    }
}
