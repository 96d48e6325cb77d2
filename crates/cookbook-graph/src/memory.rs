//! In-process recipe graph.
//!
//! Implements [`RecipeStore`] with the same semantics as the Neo4j client.
//! A single async mutex serializes operations; each write works on a copy of
//! the graph that replaces the committed state only when the operation
//! succeeds, so a failed operation leaves nothing behind.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use cookbook_core::{
    Category, EntityId, IdAllocator, Ingredient, IngredientRef, NewRecipe, NewUser, NodeLabel,
    Recipe, RecipePatch, RecipeRef, User, UserRecord, UserRef, UuidAllocator,
};
use tokio::sync::Mutex;

use crate::client::GraphError;
use crate::store::RecipeStore;

type Edges = BTreeSet<(EntityId, EntityId)>;

#[derive(Debug, Clone)]
struct RecipeProps {
    title: String,
    description: Option<String>,
    difficulty: Option<String>,
    time: Option<i64>,
}

/// Node kinds deduplicated by name.
#[derive(Debug, Clone, Copy)]
enum Named {
    Ingredient,
    Category,
}

impl Named {
    fn label(self) -> NodeLabel {
        match self {
            Self::Ingredient => NodeLabel::Ingredient,
            Self::Category => NodeLabel::Category,
        }
    }
}

#[derive(Debug, Clone, Default)]
struct GraphState {
    recipes: BTreeMap<EntityId, RecipeProps>,
    ingredients: BTreeMap<EntityId, String>,
    categories: BTreeMap<EntityId, String>,
    users: BTreeMap<EntityId, UserRecord>,
    /// (recipe, ingredient)
    has_ingredient: Edges,
    /// (recipe, category)
    belongs_to: Edges,
    /// (recipe, user)
    created: Edges,
}

impl GraphState {
    fn names(&self, kind: Named) -> &BTreeMap<EntityId, String> {
        match kind {
            Named::Ingredient => &self.ingredients,
            Named::Category => &self.categories,
        }
    }

    fn names_mut(&mut self, kind: Named) -> &mut BTreeMap<EntityId, String> {
        match kind {
            Named::Ingredient => &mut self.ingredients,
            Named::Category => &mut self.categories,
        }
    }

    fn find_named(&self, kind: Named, name: &str) -> Option<EntityId> {
        self.names(kind)
            .iter()
            .find(|(_, existing)| existing.as_str() == name)
            .map(|(id, _)| id.clone())
    }

    /// Reuse the node with this exact name or create one with a new id.
    fn upsert_named(&mut self, kind: Named, name: &str, ids: &dyn IdAllocator) -> EntityId {
        if let Some(id) = self.find_named(kind, name) {
            return id;
        }
        let id = ids.new_id();
        self.names_mut(kind).insert(id.clone(), name.to_string());
        tracing::debug!(label = %kind.label(), id = %id, node_name = name, "Named node created");
        id
    }

    fn rename_named(&mut self, kind: Named, id: &EntityId, name: &str) -> Result<(), GraphError> {
        if !self.names(kind).contains_key(id) {
            return Err(GraphError::not_found(kind.label(), id.as_str()));
        }
        if let Some(other) = self.find_named(kind, name) {
            if &other != id {
                return Err(GraphError::Conflict(format!(
                    "{} named {name:?} already exists",
                    kind.label()
                )));
            }
        }
        self.names_mut(kind).insert(id.clone(), name.to_string());
        Ok(())
    }

    fn link_ingredients(&mut self, recipe_id: &EntityId, names: &[String], ids: &dyn IdAllocator) {
        for name in names {
            let ingredient_id = self.upsert_named(Named::Ingredient, name, ids);
            self.has_ingredient.insert((recipe_id.clone(), ingredient_id));
        }
    }

    fn link_category(&mut self, recipe_id: &EntityId, name: &str, ids: &dyn IdAllocator) {
        let category_id = self.upsert_named(Named::Category, name, ids);
        self.belongs_to.insert((recipe_id.clone(), category_id));
    }

    /// Remove a node id from every edge set, at either end.
    fn detach(&mut self, id: &EntityId) {
        for edges in [
            &mut self.has_ingredient,
            &mut self.belongs_to,
            &mut self.created,
        ] {
            edges.retain(|(from, to)| from != id && to != id);
        }
    }

    fn project_recipe(&self, id: &EntityId) -> Option<Recipe> {
        let props = self.recipes.get(id)?;

        let mut ingredients: Vec<IngredientRef> = targets(&self.has_ingredient, id)
            .filter_map(|iid| {
                self.ingredients.get(iid).map(|name| IngredientRef {
                    id: iid.clone(),
                    name: name.clone(),
                })
            })
            .collect();
        ingredients.sort_by(|a, b| a.name.cmp(&b.name));

        let category = targets(&self.belongs_to, id).find_map(|cid| {
            self.categories.get(cid).map(|name| Category {
                id: cid.clone(),
                name: name.clone(),
            })
        });

        let created_by = targets(&self.created, id).find_map(|uid| {
            self.users.get(uid).map(|user| UserRef {
                id: uid.clone(),
                username: user.username.clone(),
            })
        });

        Some(Recipe {
            id: id.clone(),
            title: props.title.clone(),
            description: props.description.clone(),
            difficulty: props.difficulty.clone(),
            time: props.time,
            ingredients,
            category,
            created_by,
        })
    }

    fn project_ingredient(&self, id: &EntityId) -> Option<Ingredient> {
        let name = self.ingredients.get(id)?;
        let mut recipes: Vec<RecipeRef> = self
            .has_ingredient
            .iter()
            .filter(|(_, iid)| iid == id)
            .filter_map(|(rid, _)| {
                self.recipes.get(rid).map(|props| RecipeRef {
                    id: rid.clone(),
                    title: props.title.clone(),
                })
            })
            .collect();
        recipes.sort_by(|a, b| a.title.cmp(&b.title).then_with(|| a.id.cmp(&b.id)));

        Some(Ingredient {
            id: id.clone(),
            name: name.clone(),
            recipes,
        })
    }

    fn project_category(&self, id: &EntityId) -> Option<Category> {
        self.categories.get(id).map(|name| Category {
            id: id.clone(),
            name: name.clone(),
        })
    }
}

/// Outgoing edge targets of `from`.
fn targets<'a>(edges: &'a Edges, from: &'a EntityId) -> impl Iterator<Item = &'a EntityId> + 'a {
    edges
        .iter()
        .filter(move |(source, _)| source == from)
        .map(|(_, target)| target)
}

/// Recipe graph held in process memory.
///
/// Clones share the same graph.
#[derive(Clone)]
pub struct MemoryGraph {
    state: Arc<Mutex<GraphState>>,
    ids: Arc<dyn IdAllocator>,
}

impl MemoryGraph {
    pub fn new() -> Self {
        Self::with_allocator(Arc::new(UuidAllocator))
    }

    pub fn with_allocator(ids: Arc<dyn IdAllocator>) -> Self {
        Self {
            state: Arc::new(Mutex::new(GraphState::default())),
            ids,
        }
    }

    /// Total number of nodes of the given kind.
    pub async fn count_nodes(&self, label: NodeLabel) -> usize {
        let state = self.state.lock().await;
        match label {
            NodeLabel::Recipe => state.recipes.len(),
            NodeLabel::Ingredient => state.ingredients.len(),
            NodeLabel::Category => state.categories.len(),
            NodeLabel::User => state.users.len(),
        }
    }

    /// Total number of relationships of every kind.
    pub async fn count_edges(&self) -> usize {
        let state = self.state.lock().await;
        state.has_ingredient.len() + state.belongs_to.len() + state.created.len()
    }

    async fn read<T>(
        &self,
        op: impl FnOnce(&GraphState) -> Result<T, GraphError> + Send,
    ) -> Result<T, GraphError> {
        let state = self.state.lock().await;
        op(&state)
    }

    /// Run `op` against a working copy; commit it only on success.
    async fn write<T>(
        &self,
        op: impl FnOnce(&mut GraphState, &dyn IdAllocator) -> Result<T, GraphError> + Send,
    ) -> Result<T, GraphError> {
        let mut committed = self.state.lock().await;
        let mut working = committed.clone();
        let value = op(&mut working, self.ids.as_ref())?;
        *committed = working;
        Ok(value)
    }

    async fn detach_delete(&self, label: NodeLabel, id: &EntityId) -> Result<bool, GraphError> {
        let deleted = self
            .write(|state, _| {
                let existed = match label {
                    NodeLabel::Recipe => state.recipes.remove(id).is_some(),
                    NodeLabel::Ingredient => state.ingredients.remove(id).is_some(),
                    NodeLabel::Category => state.categories.remove(id).is_some(),
                    NodeLabel::User => state.users.remove(id).is_some(),
                };
                if existed {
                    state.detach(id);
                }
                Ok(existed)
            })
            .await?;
        tracing::info!(label = %label, id = %id, deleted, "Detach delete");
        Ok(deleted)
    }
}

impl Default for MemoryGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl RecipeStore for MemoryGraph {
    async fn get_recipes(&self) -> Result<Vec<Recipe>, GraphError> {
        self.read(|state| {
            let mut recipes: Vec<Recipe> = state
                .recipes
                .keys()
                .filter_map(|id| state.project_recipe(id))
                .collect();
            recipes.sort_by(|a, b| a.title.cmp(&b.title).then_with(|| a.id.cmp(&b.id)));
            Ok(recipes)
        })
        .await
    }

    async fn get_recipe(&self, id: &EntityId) -> Result<Recipe, GraphError> {
        self.read(|state| {
            state
                .project_recipe(id)
                .ok_or_else(|| GraphError::not_found(NodeLabel::Recipe, id.as_str()))
        })
        .await
    }

    async fn get_ingredients(&self) -> Result<Vec<Ingredient>, GraphError> {
        self.read(|state| {
            let mut ingredients: Vec<Ingredient> = state
                .ingredients
                .keys()
                .filter_map(|id| state.project_ingredient(id))
                .collect();
            ingredients.sort_by(|a, b| a.name.cmp(&b.name));
            Ok(ingredients)
        })
        .await
    }

    async fn get_ingredient(&self, id: &EntityId) -> Result<Ingredient, GraphError> {
        self.read(|state| {
            state
                .project_ingredient(id)
                .ok_or_else(|| GraphError::not_found(NodeLabel::Ingredient, id.as_str()))
        })
        .await
    }

    async fn get_category(&self, id: &EntityId) -> Result<Category, GraphError> {
        self.read(|state| {
            state
                .project_category(id)
                .ok_or_else(|| GraphError::not_found(NodeLabel::Category, id.as_str()))
        })
        .await
    }

    async fn get_users(&self) -> Result<Vec<User>, GraphError> {
        self.read(|state| {
            let mut users: Vec<User> = state.users.values().map(UserRecord::to_user).collect();
            users.sort_by(|a, b| a.username.cmp(&b.username).then_with(|| a.id.cmp(&b.id)));
            Ok(users)
        })
        .await
    }

    async fn get_user(&self, id: &EntityId) -> Result<User, GraphError> {
        self.read(|state| {
            state
                .users
                .get(id)
                .map(UserRecord::to_user)
                .ok_or_else(|| GraphError::not_found(NodeLabel::User, id.as_str()))
        })
        .await
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, GraphError> {
        self.read(|state| Ok(state.users.values().find(|u| u.email == email).cloned()))
            .await
    }

    async fn create_recipe(&self, input: &NewRecipe) -> Result<Recipe, GraphError> {
        let recipe = self
            .write(|state, ids| {
                if let Some(creator) = &input.created_by_user_id {
                    if !state.users.contains_key(creator) {
                        return Err(GraphError::not_found(NodeLabel::User, creator.as_str()));
                    }
                }

                let id = ids.new_id();
                state.recipes.insert(
                    id.clone(),
                    RecipeProps {
                        title: input.title.clone(),
                        description: input.description.clone(),
                        difficulty: input.difficulty.clone(),
                        time: input.time,
                    },
                );
                state.link_ingredients(&id, &input.ingredients, ids);
                if let Some(category) = &input.category {
                    state.link_category(&id, category, ids);
                }
                if let Some(creator) = &input.created_by_user_id {
                    state.created.insert((id.clone(), creator.clone()));
                }

                state
                    .project_recipe(&id)
                    .ok_or_else(|| GraphError::not_found(NodeLabel::Recipe, id.as_str()))
            })
            .await?;

        tracing::info!(
            recipe_id = %recipe.id,
            ingredients = recipe.ingredients.len(),
            "Recipe created"
        );
        Ok(recipe)
    }

    async fn update_recipe(&self, id: &EntityId, patch: &RecipePatch) -> Result<Recipe, GraphError> {
        let recipe = self
            .write(|state, ids| {
                let props = state
                    .recipes
                    .get_mut(id)
                    .ok_or_else(|| GraphError::not_found(NodeLabel::Recipe, id.as_str()))?;
                if let Some(title) = &patch.title {
                    props.title = title.clone();
                }
                if let Some(description) = &patch.description {
                    props.description = Some(description.clone());
                }
                if let Some(difficulty) = &patch.difficulty {
                    props.difficulty = Some(difficulty.clone());
                }
                if let Some(time) = patch.time {
                    props.time = Some(time);
                }

                if let Some(names) = &patch.ingredients {
                    state.has_ingredient.retain(|(rid, _)| rid != id);
                    state.link_ingredients(id, names, ids);
                }
                if let Some(category) = &patch.category {
                    state.belongs_to.retain(|(rid, _)| rid != id);
                    state.link_category(id, category, ids);
                }

                state
                    .project_recipe(id)
                    .ok_or_else(|| GraphError::not_found(NodeLabel::Recipe, id.as_str()))
            })
            .await?;

        tracing::info!(recipe_id = %id, "Recipe updated");
        Ok(recipe)
    }

    async fn delete_recipe(&self, id: &EntityId) -> Result<bool, GraphError> {
        self.detach_delete(NodeLabel::Recipe, id).await
    }

    async fn create_ingredient(&self, name: &str) -> Result<Ingredient, GraphError> {
        self.write(|state, ids| {
            let id = state.upsert_named(Named::Ingredient, name, ids);
            state
                .project_ingredient(&id)
                .ok_or_else(|| GraphError::not_found(NodeLabel::Ingredient, id.as_str()))
        })
        .await
    }

    async fn update_ingredient(&self, id: &EntityId, name: &str) -> Result<Ingredient, GraphError> {
        self.write(|state, _| {
            state.rename_named(Named::Ingredient, id, name)?;
            state
                .project_ingredient(id)
                .ok_or_else(|| GraphError::not_found(NodeLabel::Ingredient, id.as_str()))
        })
        .await
    }

    async fn delete_ingredient(&self, id: &EntityId) -> Result<bool, GraphError> {
        self.detach_delete(NodeLabel::Ingredient, id).await
    }

    async fn create_category(&self, name: &str) -> Result<Category, GraphError> {
        self.write(|state, ids| {
            let id = state.upsert_named(Named::Category, name, ids);
            state
                .project_category(&id)
                .ok_or_else(|| GraphError::not_found(NodeLabel::Category, id.as_str()))
        })
        .await
    }

    async fn update_category(&self, id: &EntityId, name: &str) -> Result<Category, GraphError> {
        self.write(|state, _| {
            state.rename_named(Named::Category, id, name)?;
            state
                .project_category(id)
                .ok_or_else(|| GraphError::not_found(NodeLabel::Category, id.as_str()))
        })
        .await
    }

    async fn delete_category(&self, id: &EntityId) -> Result<bool, GraphError> {
        self.detach_delete(NodeLabel::Category, id).await
    }

    async fn create_user(&self, input: &NewUser) -> Result<User, GraphError> {
        let user = self
            .write(|state, ids| {
                if state.users.values().any(|u| u.email == input.email) {
                    return Err(GraphError::Conflict(format!(
                        "User with email {} already exists",
                        input.email
                    )));
                }
                let record = UserRecord {
                    id: ids.new_id(),
                    username: input.username.clone(),
                    email: input.email.clone(),
                    password_hash: input.password_hash.clone(),
                };
                let user = record.to_user();
                state.users.insert(record.id.clone(), record);
                Ok(user)
            })
            .await?;

        tracing::info!(user_id = %user.id, "User created");
        Ok(user)
    }

    async fn update_user(&self, id: &EntityId, username: &str) -> Result<User, GraphError> {
        self.write(|state, _| {
            let record = state
                .users
                .get_mut(id)
                .ok_or_else(|| GraphError::not_found(NodeLabel::User, id.as_str()))?;
            record.username = username.to_string();
            Ok(record.to_user())
        })
        .await
    }

    async fn delete_user(&self, id: &EntityId) -> Result<bool, GraphError> {
        self.detach_delete(NodeLabel::User, id).await
    }

    async fn health_check(&self) -> Result<(), GraphError> {
        Ok(())
    }
}
