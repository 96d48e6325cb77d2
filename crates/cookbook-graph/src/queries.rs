//! Read operations against the recipe graph.
//!
//! Every read projects node properties into an explicit typed shape inside
//! Cypher (`n { .id, .name }`), so only named properties leave the store.

use cookbook_core::{
    Category, EntityId, Ingredient, NodeLabel, Recipe, Relation, User, UserRecord,
};
use neo4rs::{query, Txn};

use crate::client::{column, fetch_all, fetch_one, finish, GraphClient, GraphError};

/// Map projection of a recipe `r` with its ingredients, category, and creator.
///
/// Pattern comprehensions keep the joins optional: a recipe with no links
/// still yields one row with empty/null fields.
pub(crate) fn recipe_projection() -> String {
    format!(
        "r {{
           .id, .title, .description, .difficulty, .time,
           ingredients: [(r)-[:{has}]->(i:Ingredient) | i {{ .id, .name }}],
           category: head([(r)-[:{belongs}]->(c:Category) | c {{ .id, .name }}]),
           createdBy: head([(r)-[:{created}]->(u:User) | u {{ .id, .username }}])
         }}",
        has = Relation::HasIngredient.as_str(),
        belongs = Relation::BelongsTo.as_str(),
        created = Relation::Created.as_str(),
    )
}

fn ingredient_projection() -> String {
    format!(
        "i {{ .id, .name, recipes: [(r:Recipe)-[:{has}]->(i) | r {{ .id, .title }}] }}",
        has = Relation::HasIngredient.as_str(),
    )
}

impl GraphClient {
    pub async fn get_recipes(&self) -> Result<Vec<Recipe>, GraphError> {
        let mut txn = self.start_txn().await?;
        let result = fetch_recipes(&mut txn).await;
        finish(txn, result).await
    }

    pub async fn get_recipe(&self, id: &EntityId) -> Result<Recipe, GraphError> {
        let mut txn = self.start_txn().await?;
        let result = fetch_recipe(&mut txn, id)
            .await
            .and_then(|found| found.ok_or_else(|| GraphError::not_found(NodeLabel::Recipe, id.as_str())));
        finish(txn, result).await
    }

    pub async fn get_ingredients(&self) -> Result<Vec<Ingredient>, GraphError> {
        let mut txn = self.start_txn().await?;
        let result = fetch_ingredients(&mut txn).await;
        finish(txn, result).await
    }

    pub async fn get_ingredient(&self, id: &EntityId) -> Result<Ingredient, GraphError> {
        let mut txn = self.start_txn().await?;
        let result = fetch_ingredient(&mut txn, id).await.and_then(|found| {
            found.ok_or_else(|| GraphError::not_found(NodeLabel::Ingredient, id.as_str()))
        });
        finish(txn, result).await
    }

    pub async fn get_category(&self, id: &EntityId) -> Result<Category, GraphError> {
        let mut txn = self.start_txn().await?;
        let result = fetch_category(&mut txn, id).await.and_then(|found| {
            found.ok_or_else(|| GraphError::not_found(NodeLabel::Category, id.as_str()))
        });
        finish(txn, result).await
    }

    pub async fn get_users(&self) -> Result<Vec<User>, GraphError> {
        let mut txn = self.start_txn().await?;
        let result = fetch_users(&mut txn).await;
        finish(txn, result).await
    }

    pub async fn get_user(&self, id: &EntityId) -> Result<User, GraphError> {
        let mut txn = self.start_txn().await?;
        let result = fetch_user(&mut txn, id)
            .await
            .and_then(|found| found.ok_or_else(|| GraphError::not_found(NodeLabel::User, id.as_str())));
        finish(txn, result).await
    }

    /// Look up a user account, password hash included, by email.
    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, GraphError> {
        let mut txn = self.start_txn().await?;
        let q = query(
            "MATCH (u:User {email: $email})
             RETURN u { .id, .username, .email, .password } AS user
             LIMIT 1",
        )
        .param("email", email);

        let result = match fetch_one(&mut txn, q).await {
            Ok(Some(row)) => column::<UserRecord>(&row, "user").map(Some),
            Ok(None) => Ok(None),
            Err(e) => Err(e),
        };
        finish(txn, result).await
    }
}

// ── In-Transaction Reads ─────────────────────────────────────────

pub(crate) async fn fetch_recipes(txn: &mut Txn) -> Result<Vec<Recipe>, GraphError> {
    let cypher = format!(
        "MATCH (r:Recipe)
         RETURN {} AS recipe
         ORDER BY recipe.title, recipe.id",
        recipe_projection()
    );
    let rows = fetch_all(txn, query(&cypher)).await?;
    rows.iter().map(|row| column(row, "recipe")).collect()
}

pub(crate) async fn fetch_recipe(txn: &mut Txn, id: &EntityId) -> Result<Option<Recipe>, GraphError> {
    let cypher = format!(
        "MATCH (r:Recipe {{id: $id}})
         RETURN {} AS recipe",
        recipe_projection()
    );
    match fetch_one(txn, query(&cypher).param("id", id.as_str())).await? {
        Some(row) => column(&row, "recipe").map(Some),
        None => Ok(None),
    }
}

pub(crate) async fn fetch_ingredients(txn: &mut Txn) -> Result<Vec<Ingredient>, GraphError> {
    let cypher = format!(
        "MATCH (i:Ingredient)
         RETURN {} AS ingredient
         ORDER BY ingredient.name",
        ingredient_projection()
    );
    let rows = fetch_all(txn, query(&cypher)).await?;
    rows.iter().map(|row| column(row, "ingredient")).collect()
}

pub(crate) async fn fetch_ingredient(
    txn: &mut Txn,
    id: &EntityId,
) -> Result<Option<Ingredient>, GraphError> {
    let cypher = format!(
        "MATCH (i:Ingredient {{id: $id}})
         RETURN {} AS ingredient",
        ingredient_projection()
    );
    match fetch_one(txn, query(&cypher).param("id", id.as_str())).await? {
        Some(row) => column(&row, "ingredient").map(Some),
        None => Ok(None),
    }
}

pub(crate) async fn fetch_category(
    txn: &mut Txn,
    id: &EntityId,
) -> Result<Option<Category>, GraphError> {
    let q = query(
        "MATCH (c:Category {id: $id})
         RETURN c { .id, .name } AS category",
    )
    .param("id", id.as_str());

    match fetch_one(txn, q).await? {
        Some(row) => column(&row, "category").map(Some),
        None => Ok(None),
    }
}

pub(crate) async fn fetch_users(txn: &mut Txn) -> Result<Vec<User>, GraphError> {
    let q = query(
        "MATCH (u:User)
         RETURN u { .id, .username, .email } AS user
         ORDER BY user.username, user.id",
    );
    let rows = fetch_all(txn, q).await?;
    rows.iter().map(|row| column(row, "user")).collect()
}

pub(crate) async fn fetch_user(txn: &mut Txn, id: &EntityId) -> Result<Option<User>, GraphError> {
    let q = query(
        "MATCH (u:User {id: $id})
         RETURN u { .id, .username, .email } AS user",
    )
    .param("id", id.as_str());

    match fetch_one(txn, q).await? {
        Some(row) => column(&row, "user").map(Some),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recipe_projection_joins_all_relations() {
        let projection = recipe_projection();
        assert!(projection.contains("[:HAS_INGREDIENT]"));
        assert!(projection.contains("[:BELONGS_TO]"));
        assert!(projection.contains("[:CREATED]"));
        assert!(projection.contains("createdBy:"));
        // The password never appears in a recipe projection.
        assert!(!projection.contains("password"));
    }

    #[test]
    fn test_ingredient_projection_back_references_recipes() {
        let projection = ingredient_projection();
        assert!(projection.contains("(r:Recipe)-[:HAS_INGREDIENT]->(i)"));
        assert!(projection.contains("r { .id, .title }"));
    }
}
