//! Input checks applied before any store access.
//!
//! Names are matched exactly by the graph layer, so nothing here trims or
//! normalizes; blank values are rejected outright.

use cookbook_core::{ApiError, NewRecipe, RecipePatch};

type Result<T = ()> = std::result::Result<T, ApiError>;

fn invalid(message: impl Into<String>) -> ApiError {
    ApiError::Validation(message.into())
}

pub fn non_blank(field: &str, value: &str) -> Result {
    if value.trim().is_empty() {
        return Err(invalid(format!("{field} must not be blank")));
    }
    Ok(())
}

pub fn email(value: &str) -> Result {
    non_blank("email", value)?;
    match value.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(invalid("email must contain '@'")),
    }
}

pub fn password(value: &str) -> Result {
    if value.is_empty() {
        return Err(invalid("password must not be empty"));
    }
    Ok(())
}

/// Time estimate in minutes; absent is fine.
pub fn time(value: Option<i64>) -> Result {
    match value {
        Some(minutes) if minutes < 0 => Err(invalid("time must not be negative")),
        _ => Ok(()),
    }
}

pub fn ingredient_names(names: &[String]) -> Result {
    names
        .iter()
        .try_for_each(|name| non_blank("ingredient name", name))
}

pub fn new_recipe(input: &NewRecipe) -> Result {
    non_blank("title", &input.title)?;
    time(input.time)?;
    ingredient_names(&input.ingredients)?;
    if let Some(category) = &input.category {
        non_blank("category name", category)?;
    }
    Ok(())
}

/// Only supplied fields are checked.
pub fn recipe_patch(patch: &RecipePatch) -> Result {
    if let Some(title) = &patch.title {
        non_blank("title", title)?;
    }
    time(patch.time)?;
    if let Some(names) = &patch.ingredients {
        ingredient_names(names)?;
    }
    if let Some(category) = &patch.category {
        non_blank("category name", category)?;
    }
    Ok(())
}
