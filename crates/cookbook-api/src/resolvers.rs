//! Domain resolvers: one method per query or mutation.
//!
//! Every resolver follows the same order: authorize against the operation
//! table, validate input, then call the store. Store failures other than
//! `NotFound` and `Conflict` are logged with their detail and reported to the
//! caller only as "Failed to <action>".

use cookbook_auth::{AuthError, Claims, CredentialService, HashedCredential};
use cookbook_core::{
    ApiError, AuthPayload, Category, EntityId, Ingredient, NewRecipe, NewUser, Operation, Recipe,
    RecipePatch, User,
};
use cookbook_graph::{GraphError, RecipeStore};

use crate::context::RequestContext;
use crate::validate;

type Result<T> = std::result::Result<T, ApiError>;

/// Translate a store failure into the caller-facing taxonomy.
fn store_error(operation: Operation, err: GraphError) -> ApiError {
    match err {
        GraphError::NotFound { label, id } => ApiError::NotFound {
            entity: label.as_str(),
            id,
        },
        GraphError::Conflict(message) => ApiError::Conflict(message),
        other => {
            tracing::error!(operation = %operation, error = %other, "Store operation failed");
            ApiError::Store {
                operation: operation.action(),
            }
        }
    }
}

/// Credential failures are never caused by caller input here; log and hide.
fn credential_error(operation: Operation, err: AuthError) -> ApiError {
    tracing::error!(operation = %operation, error = %err, "Credential service failed");
    ApiError::Store {
        operation: operation.action(),
    }
}

/// Resolvers bound to a store and a credential service.
pub struct Resolvers<S> {
    store: S,
    credentials: CredentialService,
}

impl<S: RecipeStore> Resolvers<S> {
    pub fn new(store: S, credentials: CredentialService) -> Self {
        Self { store, credentials }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Context for a request carrying this `Authorization` header value.
    pub fn context(&self, authorization: Option<&str>) -> RequestContext {
        RequestContext::from_authorization_header(authorization, self.credentials.tokens())
    }

    // ── Queries ──────────────────────────────────────────────────

    /// The account behind the caller's token.
    pub async fn get_user_information(&self, ctx: &RequestContext) -> Result<User> {
        let op = Operation::GetUserInformation;
        ctx.authorize(op)?;
        let claims = ctx
            .claims()
            .ok_or_else(|| ApiError::Unauthorized("Authentication required".to_string()))?;
        self.store
            .get_user(&claims.id)
            .await
            .map_err(|e| store_error(op, e))
    }

    pub async fn get_recipes(&self, ctx: &RequestContext) -> Result<Vec<Recipe>> {
        let op = Operation::GetRecipes;
        ctx.authorize(op)?;
        self.store.get_recipes().await.map_err(|e| store_error(op, e))
    }

    pub async fn get_recipe_by_id(&self, ctx: &RequestContext, id: &EntityId) -> Result<Recipe> {
        let op = Operation::GetRecipeById;
        ctx.authorize(op)?;
        self.store.get_recipe(id).await.map_err(|e| store_error(op, e))
    }

    pub async fn get_ingredients(&self, ctx: &RequestContext) -> Result<Vec<Ingredient>> {
        let op = Operation::GetIngredients;
        ctx.authorize(op)?;
        self.store
            .get_ingredients()
            .await
            .map_err(|e| store_error(op, e))
    }

    pub async fn get_ingredient_by_id(
        &self,
        ctx: &RequestContext,
        id: &EntityId,
    ) -> Result<Ingredient> {
        let op = Operation::GetIngredientById;
        ctx.authorize(op)?;
        self.store
            .get_ingredient(id)
            .await
            .map_err(|e| store_error(op, e))
    }

    pub async fn get_category_by_id(&self, ctx: &RequestContext, id: &EntityId) -> Result<Category> {
        let op = Operation::GetCategoryById;
        ctx.authorize(op)?;
        self.store
            .get_category(id)
            .await
            .map_err(|e| store_error(op, e))
    }

    pub async fn get_users(&self, ctx: &RequestContext) -> Result<Vec<User>> {
        let op = Operation::GetUsers;
        ctx.authorize(op)?;
        self.store.get_users().await.map_err(|e| store_error(op, e))
    }

    pub async fn get_user_by_id(&self, ctx: &RequestContext, id: &EntityId) -> Result<User> {
        let op = Operation::GetUserById;
        ctx.authorize(op)?;
        self.store.get_user(id).await.map_err(|e| store_error(op, e))
    }

    // ── Accounts ─────────────────────────────────────────────────

    /// Create an account and sign the caller in.
    pub async fn register_user(
        &self,
        ctx: &RequestContext,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthPayload> {
        let op = Operation::RegisterUser;
        ctx.authorize(op)?;
        validate::non_blank("username", username)?;
        validate::email(email)?;
        validate::password(password)?;

        let hashed = self.hash_password(op, password).await?;
        let user = self
            .store
            .create_user(&NewUser {
                username: username.to_string(),
                email: email.to_string(),
                password_hash: hashed.into_string(),
            })
            .await
            .map_err(|e| store_error(op, e))?;

        let payload = self.sign_in(op, user)?;
        tracing::info!(user_id = %payload.user.id, "User registered");
        Ok(payload)
    }

    /// Exchange email and password for a token.
    ///
    /// An unknown email and a wrong password are indistinguishable to the
    /// caller.
    pub async fn login_user(
        &self,
        ctx: &RequestContext,
        email: &str,
        password: &str,
    ) -> Result<AuthPayload> {
        let op = Operation::LoginUser;
        ctx.authorize(op)?;

        let Some(record) = self
            .store
            .find_user_by_email(email)
            .await
            .map_err(|e| store_error(op, e))?
        else {
            tracing::debug!("Login for unknown email");
            return Err(ApiError::InvalidCredentials);
        };

        let stored = HashedCredential::from_stored(record.password_hash.clone());
        if !self.verify_password(op, password, stored).await? {
            tracing::debug!(user_id = %record.id, "Login with wrong password");
            return Err(ApiError::InvalidCredentials);
        }

        let payload = self.sign_in(op, record.to_user())?;
        tracing::info!(user_id = %payload.user.id, "User logged in");
        Ok(payload)
    }

    pub async fn update_user(
        &self,
        ctx: &RequestContext,
        id: &EntityId,
        username: &str,
    ) -> Result<User> {
        let op = Operation::UpdateUser;
        ctx.authorize(op)?;
        validate::non_blank("username", username)?;
        self.store
            .update_user(id, username)
            .await
            .map_err(|e| store_error(op, e))
    }

    pub async fn delete_user(&self, ctx: &RequestContext, id: &EntityId) -> Result<bool> {
        let op = Operation::DeleteUser;
        ctx.authorize(op)?;
        self.store.delete_user(id).await.map_err(|e| store_error(op, e))
    }

    // ── Recipes ──────────────────────────────────────────────────

    pub async fn create_recipe(&self, ctx: &RequestContext, input: &NewRecipe) -> Result<Recipe> {
        let op = Operation::CreateRecipe;
        ctx.authorize(op)?;
        validate::new_recipe(input)?;
        self.store
            .create_recipe(input)
            .await
            .map_err(|e| store_error(op, e))
    }

    pub async fn update_recipe(
        &self,
        ctx: &RequestContext,
        id: &EntityId,
        patch: &RecipePatch,
    ) -> Result<Recipe> {
        let op = Operation::UpdateRecipe;
        ctx.authorize(op)?;
        validate::recipe_patch(patch)?;
        self.store
            .update_recipe(id, patch)
            .await
            .map_err(|e| store_error(op, e))
    }

    pub async fn delete_recipe(&self, ctx: &RequestContext, id: &EntityId) -> Result<bool> {
        let op = Operation::DeleteRecipe;
        ctx.authorize(op)?;
        self.store
            .delete_recipe(id)
            .await
            .map_err(|e| store_error(op, e))
    }

    // ── Ingredients & Categories ─────────────────────────────────

    pub async fn create_ingredient(&self, ctx: &RequestContext, name: &str) -> Result<Ingredient> {
        let op = Operation::CreateIngredient;
        ctx.authorize(op)?;
        validate::non_blank("name", name)?;
        self.store
            .create_ingredient(name)
            .await
            .map_err(|e| store_error(op, e))
    }

    pub async fn update_ingredient(
        &self,
        ctx: &RequestContext,
        id: &EntityId,
        name: &str,
    ) -> Result<Ingredient> {
        let op = Operation::UpdateIngredient;
        ctx.authorize(op)?;
        validate::non_blank("name", name)?;
        self.store
            .update_ingredient(id, name)
            .await
            .map_err(|e| store_error(op, e))
    }

    pub async fn delete_ingredient(&self, ctx: &RequestContext, id: &EntityId) -> Result<bool> {
        let op = Operation::DeleteIngredient;
        ctx.authorize(op)?;
        self.store
            .delete_ingredient(id)
            .await
            .map_err(|e| store_error(op, e))
    }

    pub async fn create_category(&self, ctx: &RequestContext, name: &str) -> Result<Category> {
        let op = Operation::CreateCategory;
        ctx.authorize(op)?;
        validate::non_blank("name", name)?;
        self.store
            .create_category(name)
            .await
            .map_err(|e| store_error(op, e))
    }

    pub async fn update_category(
        &self,
        ctx: &RequestContext,
        id: &EntityId,
        name: &str,
    ) -> Result<Category> {
        let op = Operation::UpdateCategory;
        ctx.authorize(op)?;
        validate::non_blank("name", name)?;
        self.store
            .update_category(id, name)
            .await
            .map_err(|e| store_error(op, e))
    }

    pub async fn delete_category(&self, ctx: &RequestContext, id: &EntityId) -> Result<bool> {
        let op = Operation::DeleteCategory;
        ctx.authorize(op)?;
        self.store
            .delete_category(id)
            .await
            .map_err(|e| store_error(op, e))
    }

    // ── Credential Helpers ───────────────────────────────────────

    /// bcrypt is deliberately slow; keep it off the async workers.
    async fn hash_password(&self, op: Operation, password: &str) -> Result<HashedCredential> {
        let hasher = self.credentials.hasher();
        let password = password.to_string();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| {
                tracing::error!(operation = %op, error = %e, "Hashing task failed");
                ApiError::Store {
                    operation: op.action(),
                }
            })?
            .map_err(|e| credential_error(op, e))
    }

    async fn verify_password(
        &self,
        op: Operation,
        password: &str,
        stored: HashedCredential,
    ) -> Result<bool> {
        let hasher = self.credentials.hasher();
        let password = password.to_string();
        tokio::task::spawn_blocking(move || hasher.verify(&password, &stored))
            .await
            .map_err(|e| {
                tracing::error!(operation = %op, error = %e, "Verification task failed");
                ApiError::Store {
                    operation: op.action(),
                }
            })
    }

    fn sign_in(&self, op: Operation, user: User) -> Result<AuthPayload> {
        let claims = Claims {
            id: user.id.clone(),
            email: user.email.clone(),
            username: user.username.clone(),
        };
        let token = self
            .credentials
            .tokens()
            .issue(&claims)
            .map_err(|e| credential_error(op, e))?;
        Ok(AuthPayload {
            token: token.into_string(),
            user,
        })
    }
}
