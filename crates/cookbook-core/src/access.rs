//! Per-operation authorization table.
//!
//! Every query and mutation is listed here together with the access level it
//! requires. Resolvers consult this table before doing any work, so the
//! authorization boundary is readable in one place.

use std::fmt;

/// Access level required by an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Any caller, with or without a token.
    Public,
    /// Caller must present a valid, unexpired bearer token.
    Authenticated,
}

/// Every operation of the query/mutation surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    // Queries
    GetUserInformation,
    GetRecipes,
    GetRecipeById,
    GetIngredients,
    GetIngredientById,
    GetCategoryById,
    GetUsers,
    GetUserById,
    // Mutations
    RegisterUser,
    LoginUser,
    CreateRecipe,
    UpdateRecipe,
    DeleteRecipe,
    CreateIngredient,
    UpdateIngredient,
    DeleteIngredient,
    CreateCategory,
    UpdateCategory,
    DeleteCategory,
    UpdateUser,
    DeleteUser,
}

impl Operation {
    /// Access level the operation requires.
    ///
    /// Mutations are open to any caller. Tightening any of these entries is
    /// a product decision, not a bug fix; change it here and nowhere else.
    pub fn access(&self) -> Access {
        match self {
            Self::GetUserInformation => Access::Authenticated,
            Self::GetRecipes
            | Self::GetRecipeById
            | Self::GetIngredients
            | Self::GetIngredientById
            | Self::GetCategoryById
            | Self::GetUsers
            | Self::GetUserById
            | Self::RegisterUser
            | Self::LoginUser
            | Self::CreateRecipe
            | Self::UpdateRecipe
            | Self::DeleteRecipe
            | Self::CreateIngredient
            | Self::UpdateIngredient
            | Self::DeleteIngredient
            | Self::CreateCategory
            | Self::UpdateCategory
            | Self::DeleteCategory
            | Self::UpdateUser
            | Self::DeleteUser => Access::Public,
        }
    }

    /// Operation name as exposed on the API surface.
    pub fn name(&self) -> &'static str {
        match self {
            Self::GetUserInformation => "getUserInformation",
            Self::GetRecipes => "getRecipes",
            Self::GetRecipeById => "getRecipeById",
            Self::GetIngredients => "getIngredients",
            Self::GetIngredientById => "getIngredientById",
            Self::GetCategoryById => "getCategoryById",
            Self::GetUsers => "getUsers",
            Self::GetUserById => "getUserById",
            Self::RegisterUser => "registerUser",
            Self::LoginUser => "loginUser",
            Self::CreateRecipe => "createRecipe",
            Self::UpdateRecipe => "updateRecipe",
            Self::DeleteRecipe => "deleteRecipe",
            Self::CreateIngredient => "createIngredient",
            Self::UpdateIngredient => "updateIngredient",
            Self::DeleteIngredient => "deleteIngredient",
            Self::CreateCategory => "createCategory",
            Self::UpdateCategory => "updateCategory",
            Self::DeleteCategory => "deleteCategory",
            Self::UpdateUser => "updateUser",
            Self::DeleteUser => "deleteUser",
        }
    }

    /// True for operations that only read.
    pub fn is_query(&self) -> bool {
        self.name().starts_with("get")
    }

    /// Verb phrase for failure messages: "Failed to {action}".
    pub fn action(&self) -> &'static str {
        match self {
            Self::GetUserInformation => "fetch user information",
            Self::GetRecipes => "fetch recipes",
            Self::GetRecipeById => "fetch recipe",
            Self::GetIngredients => "fetch ingredients",
            Self::GetIngredientById => "fetch ingredient",
            Self::GetCategoryById => "fetch category",
            Self::GetUsers => "fetch users",
            Self::GetUserById => "fetch user",
            Self::RegisterUser => "register user",
            Self::LoginUser => "log in",
            Self::CreateRecipe => "create recipe",
            Self::UpdateRecipe => "update recipe",
            Self::DeleteRecipe => "delete recipe",
            Self::CreateIngredient => "create ingredient",
            Self::UpdateIngredient => "update ingredient",
            Self::DeleteIngredient => "delete ingredient",
            Self::CreateCategory => "create category",
            Self::UpdateCategory => "update category",
            Self::DeleteCategory => "delete category",
            Self::UpdateUser => "update user",
            Self::DeleteUser => "delete user",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
