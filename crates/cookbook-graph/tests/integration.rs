//! Integration tests for cookbook-graph against a live Neo4j instance.
//!
//! Run with: cargo test --package cookbook-graph --test integration -- --ignored
//!
//! Skipped automatically if Neo4j is not available.

use cookbook_core::{EntityId, NewRecipe, NewUser, RecipePatch};
use cookbook_graph::{GraphClient, GraphConfig, GraphError, RecipeStore};

async fn connect_or_skip() -> Option<GraphClient> {
    let config = GraphConfig::default();
    let client = match GraphClient::connect(&config).await {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Skipping integration test (Neo4j not available): {e}");
            return None;
        }
    };
    if let Err(e) = client.ensure_constraints().await {
        eprintln!("Skipping integration test (constraints failed): {e}");
        return None;
    }
    Some(client)
}

/// Names unique to one test run so concurrent tests never share nodes.
fn unique(prefix: &str) -> String {
    format!("{prefix}-{}", EntityId::random())
}

#[tokio::test]
#[ignore = "requires live Neo4j"]
async fn test_ping() {
    let Some(client) = connect_or_skip().await else {
        return;
    };
    client.ping().await.unwrap();
}

#[tokio::test]
#[ignore = "requires live Neo4j"]
async fn test_create_ingredient_is_idempotent() {
    let Some(client) = connect_or_skip().await else {
        return;
    };
    let name = unique("salt");

    let first = client.create_ingredient(&name).await.unwrap();
    let second = client.create_ingredient(&name).await.unwrap();
    assert_eq!(first.id, second.id);

    assert!(client.delete_ingredient(&first.id).await.unwrap());
}

#[tokio::test]
#[ignore = "requires live Neo4j"]
async fn test_recipe_lifecycle() {
    let Some(client) = connect_or_skip().await else {
        return;
    };
    let flour = unique("flour");
    let water = unique("water");
    let yeast = unique("yeast");
    let category = unique("Baking");

    let created = client
        .create_recipe(&NewRecipe {
            title: "Bread".to_string(),
            time: Some(180),
            ingredients: vec![flour.clone(), water.clone()],
            category: Some(category.clone()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(created.ingredients.len(), 2);
    assert_eq!(created.category.as_ref().unwrap().name, category);
    assert!(created.created_by.is_none());

    // Partial patch: title only, links untouched.
    let renamed = client
        .update_recipe(
            &created.id,
            &RecipePatch {
                title: Some("Sourdough".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(renamed.title, "Sourdough");
    assert_eq!(renamed.time, Some(180));
    assert_eq!(renamed.ingredients.len(), 2);

    // Supplied ingredient list replaces the old set.
    let replaced = client
        .update_recipe(
            &created.id,
            &RecipePatch {
                ingredients: Some(vec![yeast.clone()]),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let names: Vec<&str> = replaced.ingredient_names();
    assert_eq!(names, vec![yeast.as_str()]);

    assert!(client.delete_recipe(&created.id).await.unwrap());
    assert!(!client.delete_recipe(&created.id).await.unwrap());
    assert!(matches!(
        client.get_recipe(&created.id).await,
        Err(GraphError::NotFound { .. })
    ));

    // Ingredient nodes outlive the recipe.
    for ingredient in created.ingredients.iter().chain(replaced.ingredients.iter()) {
        let found = client.get_ingredient(&ingredient.id).await.unwrap();
        assert!(found.recipes.is_empty());
        client.delete_ingredient(&ingredient.id).await.unwrap();
    }
    client
        .delete_category(&created.category.unwrap().id)
        .await
        .unwrap();
}

#[tokio::test]
#[ignore = "requires live Neo4j"]
async fn test_duplicate_email_conflicts() {
    let Some(client) = connect_or_skip().await else {
        return;
    };
    let email = format!("{}@example.com", unique("ada"));
    let input = NewUser {
        username: "ada".to_string(),
        email: email.clone(),
        password_hash: "$2b$04$not-a-real-hash".to_string(),
    };

    let user = client.create_user(&input).await.unwrap();
    assert!(matches!(
        client.create_user(&input).await,
        Err(GraphError::Conflict(_))
    ));

    let record = client.find_user_by_email(&email).await.unwrap().unwrap();
    assert_eq!(record.id, user.id);
    assert_eq!(record.password_hash, input.password_hash);

    assert!(client.delete_user(&user.id).await.unwrap());
}

#[tokio::test]
#[ignore = "requires live Neo4j"]
async fn test_unknown_creator_rolls_back() {
    let Some(client) = connect_or_skip().await else {
        return;
    };
    let ingredient = unique("orphan");

    let err = client
        .create_recipe(&NewRecipe {
            title: "Orphan".to_string(),
            ingredients: vec![ingredient.clone()],
            created_by_user_id: Some(EntityId::random()),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, GraphError::NotFound { .. }));

    let leaked = client
        .get_ingredients()
        .await
        .unwrap()
        .into_iter()
        .any(|i| i.name == ingredient);
    assert!(!leaked);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
#[ignore = "requires live Neo4j"]
async fn test_concurrent_creations_share_named_nodes() {
    let Some(client) = connect_or_skip().await else {
        return;
    };
    let ingredient = unique("salt");
    let category = unique("Soups");

    let tasks: Vec<_> = (0..16)
        .map(|n| {
            let client = client.clone();
            let input = NewRecipe {
                title: format!("Soup {n}"),
                ingredients: vec![ingredient.clone(), ingredient.clone()],
                category: Some(category.clone()),
                ..Default::default()
            };
            tokio::spawn(async move { RecipeStore::create_recipe(&client, &input).await })
        })
        .collect();

    let mut recipes = Vec::new();
    for task in tasks {
        recipes.push(task.await.unwrap().unwrap());
    }

    let ingredient_ids: Vec<EntityId> = client
        .get_ingredients()
        .await
        .unwrap()
        .into_iter()
        .filter(|i| i.name == ingredient)
        .map(|i| i.id)
        .collect();
    assert_eq!(ingredient_ids.len(), 1);

    let category_ids: std::collections::HashSet<EntityId> = recipes
        .iter()
        .map(|r| r.category.as_ref().unwrap().id.clone())
        .collect();
    assert_eq!(category_ids.len(), 1);

    for recipe in &recipes {
        client.delete_recipe(&recipe.id).await.unwrap();
    }
    client.delete_ingredient(&ingredient_ids[0]).await.unwrap();
    for id in &category_ids {
        client.delete_category(id).await.unwrap();
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
#[ignore = "requires live Neo4j"]
async fn test_concurrent_registrations_conflict_not_fail() {
    let Some(client) = connect_or_skip().await else {
        return;
    };
    let email = format!("{}@example.com", unique("race"));

    let tasks: Vec<_> = (0..8)
        .map(|n| {
            let client = client.clone();
            let input = NewUser {
                username: format!("user{n}"),
                email: email.clone(),
                password_hash: "$2b$04$not-a-real-hash".to_string(),
            };
            tokio::spawn(async move { RecipeStore::create_user(&client, &input).await })
        })
        .collect();

    let mut created = Vec::new();
    for task in tasks {
        match task.await.unwrap() {
            Ok(user) => created.push(user),
            Err(GraphError::Conflict(_)) => {}
            Err(other) => panic!("duplicate email must be a conflict, got: {other}"),
        }
    }
    assert_eq!(created.len(), 1);

    client.delete_user(&created[0].id).await.unwrap();
}
