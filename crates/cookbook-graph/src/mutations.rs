//! Write operations against the recipe graph.
//!
//! Each public method runs in exactly one transaction. Ingredients and
//! categories are resolved by exact-match name: an existing node is reused,
//! otherwise one is created with a freshly allocated id. Recipe relationship
//! updates delete every prior edge of the kind, then relink.

use cookbook_core::{
    Category, EntityId, Ingredient, NewRecipe, NewUser, NodeLabel, Recipe, RecipePatch, Relation,
    User,
};
use neo4rs::{query, Txn};

use crate::client::{column, fetch_one, finish, nullable, GraphClient, GraphError};
use crate::queries::{fetch_category, fetch_ingredient, fetch_recipe};

impl GraphClient {
    // ── Recipes ──────────────────────────────────────────────────

    /// Create a recipe and link its ingredients, category, and creator.
    pub async fn create_recipe(&self, input: &NewRecipe) -> Result<Recipe, GraphError> {
        let mut txn = self.start_txn().await?;
        let result = self.create_recipe_in(&mut txn, input).await;
        finish(txn, result).await
    }

    async fn create_recipe_in(&self, txn: &mut Txn, input: &NewRecipe) -> Result<Recipe, GraphError> {
        if let Some(creator) = &input.created_by_user_id {
            require_node(txn, NodeLabel::User, creator).await?;
        }

        let id = self.ids().new_id();
        let q = query(
            "CREATE (r:Recipe {
               id: $id, title: $title, description: $description,
               difficulty: $difficulty, time: $time
             })",
        )
        .param("id", id.as_str())
        .param("title", input.title.as_str())
        .param("description", nullable(input.description.as_deref()))
        .param("difficulty", nullable(input.difficulty.as_deref()))
        .param("time", nullable(input.time));
        txn.run(q).await?;

        self.link_ingredients(txn, &id, &input.ingredients).await?;
        if let Some(category) = &input.category {
            self.link_category(txn, &id, category).await?;
        }
        if let Some(creator) = &input.created_by_user_id {
            link(txn, &id, Relation::Created, creator).await?;
        }

        let recipe = fetch_recipe(txn, &id)
            .await?
            .ok_or_else(|| GraphError::not_found(NodeLabel::Recipe, id.as_str()))?;
        tracing::info!(
            recipe_id = %id,
            ingredients = recipe.ingredients.len(),
            "Recipe created"
        );
        Ok(recipe)
    }

    /// Patch a recipe's properties and replace any supplied relationship sets.
    pub async fn update_recipe(
        &self,
        id: &EntityId,
        patch: &RecipePatch,
    ) -> Result<Recipe, GraphError> {
        let mut txn = self.start_txn().await?;
        let result = self.update_recipe_in(&mut txn, id, patch).await;
        finish(txn, result).await
    }

    async fn update_recipe_in(
        &self,
        txn: &mut Txn,
        id: &EntityId,
        patch: &RecipePatch,
    ) -> Result<Recipe, GraphError> {
        // coalesce keeps the stored value when a field was not supplied.
        let q = query(
            "MATCH (r:Recipe {id: $id})
             SET r.title = coalesce($title, r.title),
                 r.description = coalesce($description, r.description),
                 r.difficulty = coalesce($difficulty, r.difficulty),
                 r.time = coalesce($time, r.time)
             RETURN r.id AS id",
        )
        .param("id", id.as_str())
        .param("title", nullable(patch.title.as_deref()))
        .param("description", nullable(patch.description.as_deref()))
        .param("difficulty", nullable(patch.difficulty.as_deref()))
        .param("time", nullable(patch.time));

        if fetch_one(txn, q).await?.is_none() {
            return Err(GraphError::not_found(NodeLabel::Recipe, id.as_str()));
        }

        if let Some(names) = &patch.ingredients {
            unlink_all(txn, id, Relation::HasIngredient).await?;
            self.link_ingredients(txn, id, names).await?;
        }
        if let Some(category) = &patch.category {
            unlink_all(txn, id, Relation::BelongsTo).await?;
            self.link_category(txn, id, category).await?;
        }

        let recipe = fetch_recipe(txn, id)
            .await?
            .ok_or_else(|| GraphError::not_found(NodeLabel::Recipe, id.as_str()))?;
        tracing::info!(recipe_id = %id, "Recipe updated");
        Ok(recipe)
    }

    pub async fn delete_recipe(&self, id: &EntityId) -> Result<bool, GraphError> {
        self.detach_delete(NodeLabel::Recipe, id).await
    }

    // ── Ingredients & Categories ─────────────────────────────────

    /// Return the ingredient with this name, creating it if absent.
    pub async fn create_ingredient(&self, name: &str) -> Result<Ingredient, GraphError> {
        let mut txn = self.start_txn().await?;
        let result: Result<Ingredient, GraphError> = async {
            let id = self.upsert_named(&mut txn, NodeLabel::Ingredient, name).await?;
            fetch_ingredient(&mut txn, &id)
                .await?
                .ok_or_else(|| GraphError::not_found(NodeLabel::Ingredient, id.as_str()))
        }
        .await;
        finish(txn, result).await
    }

    pub async fn update_ingredient(
        &self,
        id: &EntityId,
        name: &str,
    ) -> Result<Ingredient, GraphError> {
        let mut txn = self.start_txn().await?;
        let result: Result<Ingredient, GraphError> = async {
            rename_named(&mut txn, NodeLabel::Ingredient, id, name).await?;
            fetch_ingredient(&mut txn, id)
                .await?
                .ok_or_else(|| GraphError::not_found(NodeLabel::Ingredient, id.as_str()))
        }
        .await;
        finish(txn, result).await
    }

    pub async fn delete_ingredient(&self, id: &EntityId) -> Result<bool, GraphError> {
        self.detach_delete(NodeLabel::Ingredient, id).await
    }

    /// Return the category with this name, creating it if absent.
    pub async fn create_category(&self, name: &str) -> Result<Category, GraphError> {
        let mut txn = self.start_txn().await?;
        let result: Result<Category, GraphError> = async {
            let id = self.upsert_named(&mut txn, NodeLabel::Category, name).await?;
            fetch_category(&mut txn, &id)
                .await?
                .ok_or_else(|| GraphError::not_found(NodeLabel::Category, id.as_str()))
        }
        .await;
        finish(txn, result).await
    }

    pub async fn update_category(&self, id: &EntityId, name: &str) -> Result<Category, GraphError> {
        let mut txn = self.start_txn().await?;
        let result: Result<Category, GraphError> = async {
            rename_named(&mut txn, NodeLabel::Category, id, name).await?;
            fetch_category(&mut txn, id)
                .await?
                .ok_or_else(|| GraphError::not_found(NodeLabel::Category, id.as_str()))
        }
        .await;
        finish(txn, result).await
    }

    pub async fn delete_category(&self, id: &EntityId) -> Result<bool, GraphError> {
        self.detach_delete(NodeLabel::Category, id).await
    }

    // ── Users ────────────────────────────────────────────────────

    /// Create a user account; the email must not be taken.
    ///
    /// The email check and the insert share one transaction.
    pub async fn create_user(&self, input: &NewUser) -> Result<User, GraphError> {
        let mut txn = self.start_txn().await?;
        let result: Result<User, GraphError> = async {
            let existing = query("MATCH (u:User {email: $email}) RETURN u.id AS id LIMIT 1")
                .param("email", input.email.as_str());
            if fetch_one(&mut txn, existing).await?.is_some() {
                return Err(GraphError::Conflict(format!(
                    "User with email {} already exists",
                    input.email
                )));
            }

            let id = self.ids().new_id();
            let q = query(
                "CREATE (u:User {id: $id, username: $username, email: $email, password: $password})
                 RETURN u { .id, .username, .email } AS user",
            )
            .param("id", id.as_str())
            .param("username", input.username.as_str())
            .param("email", input.email.as_str())
            .param("password", input.password_hash.as_str());

            let row = fetch_one(&mut txn, q)
                .await?
                .ok_or_else(|| GraphError::not_found(NodeLabel::User, id.as_str()))?;
            column::<User>(&row, "user")
        }
        .await;

        let user = finish(txn, result).await?;
        tracing::info!(user_id = %user.id, "User created");
        Ok(user)
    }

    pub async fn update_user(&self, id: &EntityId, username: &str) -> Result<User, GraphError> {
        let mut txn = self.start_txn().await?;
        let q = query(
            "MATCH (u:User {id: $id})
             SET u.username = $username
             RETURN u { .id, .username, .email } AS user",
        )
        .param("id", id.as_str())
        .param("username", username);

        let result = match fetch_one(&mut txn, q).await {
            Ok(Some(row)) => column::<User>(&row, "user"),
            Ok(None) => Err(GraphError::not_found(NodeLabel::User, id.as_str())),
            Err(e) => Err(e),
        };
        finish(txn, result).await
    }

    pub async fn delete_user(&self, id: &EntityId) -> Result<bool, GraphError> {
        self.detach_delete(NodeLabel::User, id).await
    }

    // ── Shared Write Paths ───────────────────────────────────────

    /// Delete a node and every relationship it participates in.
    /// Returns whether a node existed.
    async fn detach_delete(&self, label: NodeLabel, id: &EntityId) -> Result<bool, GraphError> {
        let mut txn = self.start_txn().await?;
        let cypher = format!(
            "MATCH (n:{label} {{id: $id}})
             DETACH DELETE n
             RETURN count(n) AS deleted"
        );
        let result = match fetch_one(&mut txn, query(&cypher).param("id", id.as_str())).await {
            Ok(Some(row)) => column::<i64>(&row, "deleted").map(|n| n > 0),
            Ok(None) => Ok(false),
            Err(e) => Err(e),
        };

        let deleted = finish(txn, result).await?;
        tracing::info!(label = %label, id = %id, deleted, "Detach delete");
        Ok(deleted)
    }

    /// Resolve a name to a node id, creating the node only when absent.
    ///
    /// The explicit lookup keeps id allocation to genuinely new nodes; the
    /// MERGE plus the name uniqueness constraint settles a concurrent creator.
    async fn upsert_named(
        &self,
        txn: &mut Txn,
        label: NodeLabel,
        name: &str,
    ) -> Result<EntityId, GraphError> {
        let lookup = format!("MATCH (n:{label} {{name: $name}}) RETURN n.id AS id LIMIT 1");
        if let Some(row) = fetch_one(txn, query(&lookup).param("name", name)).await? {
            return column(&row, "id");
        }

        let candidate = self.ids().new_id();
        let merge = format!(
            "MERGE (n:{label} {{name: $name}})
             ON CREATE SET n.id = $id
             RETURN n.id AS id"
        );
        let row = fetch_one(
            txn,
            query(&merge)
                .param("name", name)
                .param("id", candidate.as_str()),
        )
        .await?
        .ok_or_else(|| GraphError::Serialization(format!("MERGE on {label} returned no row")))?;

        let id: EntityId = column(&row, "id")?;
        tracing::debug!(label = %label, id = %id, node_name = name, "Named node created");
        Ok(id)
    }

    async fn link_ingredients(
        &self,
        txn: &mut Txn,
        recipe_id: &EntityId,
        names: &[String],
    ) -> Result<(), GraphError> {
        for name in names {
            let ingredient_id = self.upsert_named(txn, NodeLabel::Ingredient, name).await?;
            link(txn, recipe_id, Relation::HasIngredient, &ingredient_id).await?;
        }
        Ok(())
    }

    async fn link_category(
        &self,
        txn: &mut Txn,
        recipe_id: &EntityId,
        name: &str,
    ) -> Result<(), GraphError> {
        let category_id = self.upsert_named(txn, NodeLabel::Category, name).await?;
        link(txn, recipe_id, Relation::BelongsTo, &category_id).await
    }
}

// ── Helpers ──────────────────────────────────────────────────────

/// Fail with `NotFound` unless a node with this label and id exists.
async fn require_node(txn: &mut Txn, label: NodeLabel, id: &EntityId) -> Result<(), GraphError> {
    let cypher = format!("MATCH (n:{label} {{id: $id}}) RETURN n.id AS id");
    match fetch_one(txn, query(&cypher).param("id", id.as_str())).await? {
        Some(_) => Ok(()),
        None => Err(GraphError::not_found(label, id.as_str())),
    }
}

/// Link a recipe to a target node; MERGE keeps the link unique.
async fn link(
    txn: &mut Txn,
    recipe_id: &EntityId,
    relation: Relation,
    target_id: &EntityId,
) -> Result<(), GraphError> {
    let cypher = format!(
        "MATCH (r:Recipe {{id: $recipe_id}})
         MATCH (t:{target} {{id: $target_id}})
         MERGE (r)-[:{rel}]->(t)",
        target = relation.target(),
        rel = relation.as_str(),
    );
    txn.run(
        query(&cypher)
            .param("recipe_id", recipe_id.as_str())
            .param("target_id", target_id.as_str()),
    )
    .await?;
    Ok(())
}

/// Remove every outgoing relationship of one kind from a recipe.
async fn unlink_all(txn: &mut Txn, recipe_id: &EntityId, relation: Relation) -> Result<(), GraphError> {
    let cypher = format!(
        "MATCH (r:Recipe {{id: $recipe_id}})-[rel:{rel}]->()
         DELETE rel",
        rel = relation.as_str(),
    );
    txn.run(query(&cypher).param("recipe_id", recipe_id.as_str()))
        .await?;
    Ok(())
}

/// Rename an ingredient or category in place, keeping names unique.
async fn rename_named(
    txn: &mut Txn,
    label: NodeLabel,
    id: &EntityId,
    name: &str,
) -> Result<(), GraphError> {
    require_node(txn, label, id).await?;

    let clash = format!(
        "MATCH (n:{label} {{name: $name}})
         WHERE n.id <> $id
         RETURN n.id AS id LIMIT 1"
    );
    let clash_query = query(&clash).param("name", name).param("id", id.as_str());
    if fetch_one(txn, clash_query).await?.is_some() {
        return Err(GraphError::Conflict(format!(
            "{label} named {name:?} already exists"
        )));
    }

    let rename = format!("MATCH (n:{label} {{id: $id}}) SET n.name = $name");
    txn.run(query(&rename).param("id", id.as_str()).param("name", name))
        .await?;
    tracing::info!(label = %label, id = %id, "Renamed");
    Ok(())
}
