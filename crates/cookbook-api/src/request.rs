//! Typed request surface.
//!
//! A request names one operation and its parameters:
//!
//! ```json
//! { "operation": "getRecipeById", "params": { "id": "…" } }
//! ```
//!
//! Parameterless operations may omit `params`. The reply is either
//! `{"data": …}` or `{"error": {"code": …, "message": …}}`.

use cookbook_core::error::ErrorBody;
use cookbook_core::{ApiError, EntityId, NewRecipe, Operation, RecipePatch};
use cookbook_graph::RecipeStore;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::context::RequestContext;
use crate::resolvers::Resolvers;

/// Parameters of `updateRecipe`: the target id beside the patch fields.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RecipeUpdate {
    pub id: EntityId,
    #[serde(flatten)]
    pub patch: RecipePatch,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "operation", content = "params", rename_all = "camelCase")]
pub enum Request {
    GetUserInformation,
    GetRecipes,
    GetRecipeById {
        id: EntityId,
    },
    GetIngredients,
    GetIngredientById {
        id: EntityId,
    },
    GetCategoryById {
        id: EntityId,
    },
    GetUsers,
    GetUserById {
        id: EntityId,
    },
    RegisterUser {
        username: String,
        email: String,
        password: String,
    },
    LoginUser {
        email: String,
        password: String,
    },
    CreateRecipe(NewRecipe),
    UpdateRecipe(RecipeUpdate),
    DeleteRecipe {
        id: EntityId,
    },
    CreateIngredient {
        name: String,
    },
    UpdateIngredient {
        id: EntityId,
        name: String,
    },
    DeleteIngredient {
        id: EntityId,
    },
    CreateCategory {
        name: String,
    },
    UpdateCategory {
        id: EntityId,
        name: String,
    },
    DeleteCategory {
        id: EntityId,
    },
    UpdateUser {
        id: EntityId,
        username: String,
    },
    DeleteUser {
        id: EntityId,
    },
}

impl Request {
    pub fn operation(&self) -> Operation {
        match self {
            Self::GetUserInformation => Operation::GetUserInformation,
            Self::GetRecipes => Operation::GetRecipes,
            Self::GetRecipeById { .. } => Operation::GetRecipeById,
            Self::GetIngredients => Operation::GetIngredients,
            Self::GetIngredientById { .. } => Operation::GetIngredientById,
            Self::GetCategoryById { .. } => Operation::GetCategoryById,
            Self::GetUsers => Operation::GetUsers,
            Self::GetUserById { .. } => Operation::GetUserById,
            Self::RegisterUser { .. } => Operation::RegisterUser,
            Self::LoginUser { .. } => Operation::LoginUser,
            Self::CreateRecipe(_) => Operation::CreateRecipe,
            Self::UpdateRecipe(_) => Operation::UpdateRecipe,
            Self::DeleteRecipe { .. } => Operation::DeleteRecipe,
            Self::CreateIngredient { .. } => Operation::CreateIngredient,
            Self::UpdateIngredient { .. } => Operation::UpdateIngredient,
            Self::DeleteIngredient { .. } => Operation::DeleteIngredient,
            Self::CreateCategory { .. } => Operation::CreateCategory,
            Self::UpdateCategory { .. } => Operation::UpdateCategory,
            Self::DeleteCategory { .. } => Operation::DeleteCategory,
            Self::UpdateUser { .. } => Operation::UpdateUser,
            Self::DeleteUser { .. } => Operation::DeleteUser,
        }
    }
}

/// Reply envelope.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Response {
    Data(Value),
    Error(ErrorBody),
}

impl From<Result<Value, ApiError>> for Response {
    fn from(result: Result<Value, ApiError>) -> Self {
        match result {
            Ok(value) => Self::Data(value),
            Err(e) => Self::Error(e.to_body()),
        }
    }
}

fn encode<T: Serialize>(operation: Operation, value: T) -> Result<Value, ApiError> {
    serde_json::to_value(value).map_err(|e| {
        tracing::error!(operation = %operation, error = %e, "Response encoding failed");
        ApiError::Store {
            operation: operation.action(),
        }
    })
}

/// Route a request to its resolver and encode the result.
pub async fn dispatch<S: RecipeStore>(
    resolvers: &Resolvers<S>,
    ctx: &RequestContext,
    request: Request,
) -> Result<Value, ApiError> {
    let op = request.operation();
    if op.is_query() {
        tracing::debug!(operation = %op, "Dispatching query");
    } else {
        tracing::info!(operation = %op, "Dispatching mutation");
    }

    match request {
        Request::GetUserInformation => encode(op, resolvers.get_user_information(ctx).await?),
        Request::GetRecipes => encode(op, resolvers.get_recipes(ctx).await?),
        Request::GetRecipeById { id } => encode(op, resolvers.get_recipe_by_id(ctx, &id).await?),
        Request::GetIngredients => encode(op, resolvers.get_ingredients(ctx).await?),
        Request::GetIngredientById { id } => {
            encode(op, resolvers.get_ingredient_by_id(ctx, &id).await?)
        }
        Request::GetCategoryById { id } => {
            encode(op, resolvers.get_category_by_id(ctx, &id).await?)
        }
        Request::GetUsers => encode(op, resolvers.get_users(ctx).await?),
        Request::GetUserById { id } => encode(op, resolvers.get_user_by_id(ctx, &id).await?),
        Request::RegisterUser {
            username,
            email,
            password,
        } => encode(
            op,
            resolvers
                .register_user(ctx, &username, &email, &password)
                .await?,
        ),
        Request::LoginUser { email, password } => {
            encode(op, resolvers.login_user(ctx, &email, &password).await?)
        }
        Request::CreateRecipe(input) => encode(op, resolvers.create_recipe(ctx, &input).await?),
        Request::UpdateRecipe(RecipeUpdate { id, patch }) => {
            encode(op, resolvers.update_recipe(ctx, &id, &patch).await?)
        }
        Request::DeleteRecipe { id } => encode(op, resolvers.delete_recipe(ctx, &id).await?),
        Request::CreateIngredient { name } => {
            encode(op, resolvers.create_ingredient(ctx, &name).await?)
        }
        Request::UpdateIngredient { id, name } => {
            encode(op, resolvers.update_ingredient(ctx, &id, &name).await?)
        }
        Request::DeleteIngredient { id } => {
            encode(op, resolvers.delete_ingredient(ctx, &id).await?)
        }
        Request::CreateCategory { name } => encode(op, resolvers.create_category(ctx, &name).await?),
        Request::UpdateCategory { id, name } => {
            encode(op, resolvers.update_category(ctx, &id, &name).await?)
        }
        Request::DeleteCategory { id } => encode(op, resolvers.delete_category(ctx, &id).await?),
        Request::UpdateUser { id, username } => {
            encode(op, resolvers.update_user(ctx, &id, &username).await?)
        }
        Request::DeleteUser { id } => encode(op, resolvers.delete_user(ctx, &id).await?),
    }
}
