//! Store contract exercised against the in-process graph.

use cookbook_core::{EntityId, NewRecipe, NewUser, NodeLabel, RecipePatch};
use cookbook_graph::{GraphError, MemoryGraph, RecipeStore};

fn new_recipe(title: &str, ingredients: &[&str], category: Option<&str>) -> NewRecipe {
    NewRecipe {
        title: title.to_string(),
        ingredients: ingredients.iter().map(|s| s.to_string()).collect(),
        category: category.map(String::from),
        ..Default::default()
    }
}

fn sorted(names: Vec<&str>) -> Vec<String> {
    let mut names: Vec<String> = names.into_iter().map(String::from).collect();
    names.sort();
    names
}

#[tokio::test]
async fn test_empty_graph_lists_are_empty() {
    let graph = MemoryGraph::new();
    assert!(graph.get_recipes().await.unwrap().is_empty());
    assert!(graph.get_ingredients().await.unwrap().is_empty());
    assert!(graph.get_users().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_unknown_ids_are_not_found() {
    let graph = MemoryGraph::new();
    let missing = EntityId::from("missing");

    assert!(matches!(
        graph.get_recipe(&missing).await,
        Err(GraphError::NotFound { label: NodeLabel::Recipe, .. })
    ));
    assert!(matches!(
        graph.get_ingredient(&missing).await,
        Err(GraphError::NotFound { label: NodeLabel::Ingredient, .. })
    ));
    assert!(matches!(
        graph.get_category(&missing).await,
        Err(GraphError::NotFound { label: NodeLabel::Category, .. })
    ));
    assert!(matches!(
        graph.get_user(&missing).await,
        Err(GraphError::NotFound { label: NodeLabel::User, .. })
    ));
    assert!(matches!(
        graph.update_recipe(&missing, &RecipePatch::default()).await,
        Err(GraphError::NotFound { .. })
    ));
    assert!(matches!(
        graph.update_user(&missing, "nobody").await,
        Err(GraphError::NotFound { .. })
    ));
    assert!(!graph.delete_recipe(&missing).await.unwrap());
}

#[tokio::test]
async fn test_recipes_share_ingredients_by_name() {
    let graph = MemoryGraph::new();
    let soup = graph
        .create_recipe(&new_recipe("Soup", &["salt", "water"], Some("Soups")))
        .await
        .unwrap();
    let stew = graph
        .create_recipe(&new_recipe("Stew", &["salt", "beef"], Some("Soups")))
        .await
        .unwrap();

    assert_eq!(graph.count_nodes(NodeLabel::Ingredient).await, 3);
    assert_eq!(graph.count_nodes(NodeLabel::Category).await, 1);
    assert_eq!(soup.category, stew.category);

    let salt_id = soup
        .ingredients
        .iter()
        .find(|i| i.name == "salt")
        .map(|i| i.id.clone())
        .unwrap();
    let salt = graph.get_ingredient(&salt_id).await.unwrap();
    let titles: Vec<&str> = salt.recipes.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["Soup", "Stew"]);
}

#[tokio::test]
async fn test_partial_patch_keeps_unsupplied_fields() {
    let graph = MemoryGraph::new();
    let mut input = new_recipe("Pancakes", &["flour", "egg"], Some("Breakfast"));
    input.description = Some("Fluffy".to_string());
    input.difficulty = Some("easy".to_string());
    input.time = Some(20);
    let created = graph.create_recipe(&input).await.unwrap();

    let patched = graph
        .update_recipe(
            &created.id,
            &RecipePatch {
                time: Some(25),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(patched.time, Some(25));
    assert_eq!(patched.title, "Pancakes");
    assert_eq!(patched.description.as_deref(), Some("Fluffy"));
    assert_eq!(patched.difficulty.as_deref(), Some("easy"));
    assert_eq!(patched.category, created.category);
    assert_eq!(
        sorted(patched.ingredient_names()),
        sorted(created.ingredient_names())
    );
}

#[tokio::test]
async fn test_supplied_relations_replace_existing() {
    let graph = MemoryGraph::new();
    let created = graph
        .create_recipe(&new_recipe("Salad", &["lettuce", "tomato"], Some("Sides")))
        .await
        .unwrap();

    let patched = graph
        .update_recipe(
            &created.id,
            &RecipePatch {
                ingredients: Some(vec!["cucumber".to_string()]),
                category: Some("Mains".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(patched.ingredient_names(), vec!["cucumber"]);
    assert_eq!(patched.category.unwrap().name, "Mains");
    // Unlinked nodes stay in the graph.
    assert_eq!(graph.count_nodes(NodeLabel::Ingredient).await, 3);
    assert_eq!(graph.count_nodes(NodeLabel::Category).await, 2);

    let emptied = graph
        .update_recipe(
            &created.id,
            &RecipePatch {
                ingredients: Some(vec![]),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(emptied.ingredients.is_empty());
}

#[tokio::test]
async fn test_delete_recipe_keeps_linked_nodes() {
    let graph = MemoryGraph::new();
    let created = graph
        .create_recipe(&new_recipe("Toast", &["bread", "butter"], Some("Breakfast")))
        .await
        .unwrap();

    assert!(graph.delete_recipe(&created.id).await.unwrap());
    assert!(!graph.delete_recipe(&created.id).await.unwrap());
    assert_eq!(graph.count_edges().await, 0);

    let ingredients = graph.get_ingredients().await.unwrap();
    assert_eq!(ingredients.len(), 2);
    assert!(ingredients.iter().all(|i| i.recipes.is_empty()));
    let category = created.category.unwrap();
    assert_eq!(graph.get_category(&category.id).await.unwrap(), category);
}

#[tokio::test]
async fn test_delete_ingredient_detaches_from_recipes() {
    let graph = MemoryGraph::new();
    let created = graph
        .create_recipe(&new_recipe("Tea", &["tea", "milk"], None))
        .await
        .unwrap();
    let milk = created
        .ingredients
        .iter()
        .find(|i| i.name == "milk")
        .unwrap()
        .clone();

    assert!(graph.delete_ingredient(&milk.id).await.unwrap());
    let after = graph.get_recipe(&created.id).await.unwrap();
    assert_eq!(after.ingredient_names(), vec!["tea"]);
}

#[tokio::test]
async fn test_user_email_is_unique() {
    let graph = MemoryGraph::new();
    let input = NewUser {
        username: "ada".to_string(),
        email: "ada@example.com".to_string(),
        password_hash: "hash".to_string(),
    };
    let user = graph.create_user(&input).await.unwrap();

    let clash = NewUser {
        username: "other".to_string(),
        ..input.clone()
    };
    assert!(matches!(
        graph.create_user(&clash).await,
        Err(GraphError::Conflict(_))
    ));
    assert_eq!(graph.get_users().await.unwrap(), vec![user.clone()]);

    let record = graph
        .find_user_by_email("ada@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.to_user(), user);
    assert!(graph
        .find_user_by_email("nobody@example.com")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_update_user_changes_only_username() {
    let graph = MemoryGraph::new();
    let user = graph
        .create_user(&NewUser {
            username: "ada".to_string(),
            email: "ada@example.com".to_string(),
            password_hash: "hash".to_string(),
        })
        .await
        .unwrap();

    let updated = graph.update_user(&user.id, "countess").await.unwrap();
    assert_eq!(updated.username, "countess");
    assert_eq!(updated.email, user.email);
    assert_eq!(updated.id, user.id);
}

#[tokio::test]
async fn test_category_rename_conflict() {
    let graph = MemoryGraph::new();
    let soups = graph.create_category("Soups").await.unwrap();
    graph.create_category("Stews").await.unwrap();

    assert!(matches!(
        graph.update_category(&soups.id, "Stews").await,
        Err(GraphError::Conflict(_))
    ));
    let renamed = graph.update_category(&soups.id, "Broths").await.unwrap();
    assert_eq!(renamed.id, soups.id);
    assert_eq!(renamed.name, "Broths");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_creations_share_named_nodes() {
    let graph = MemoryGraph::new();

    let tasks: Vec<_> = (0..64)
        .map(|n| {
            let graph = graph.clone();
            let input = new_recipe(&format!("Soup {n}"), &["salt", "salt"], Some("Soups"));
            tokio::spawn(async move { graph.create_recipe(&input).await })
        })
        .collect();

    for task in tasks {
        task.await.unwrap().unwrap();
    }

    assert_eq!(graph.count_nodes(NodeLabel::Recipe).await, 64);
    assert_eq!(graph.count_nodes(NodeLabel::Ingredient).await, 1);
    assert_eq!(graph.count_nodes(NodeLabel::Category).await, 1);

    let ingredients = graph.get_ingredients().await.unwrap();
    assert_eq!(ingredients[0].recipes.len(), 64);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_registrations_admit_one_email() {
    let graph = MemoryGraph::new();

    let tasks: Vec<_> = (0..16)
        .map(|n| {
            let graph = graph.clone();
            let input = NewUser {
                username: format!("user{n}"),
                email: "race@example.com".to_string(),
                password_hash: "hash".to_string(),
            };
            tokio::spawn(async move { graph.create_user(&input).await })
        })
        .collect();

    let mut created = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(_) => created += 1,
            Err(GraphError::Conflict(_)) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
    assert_eq!(created, 1);
    assert_eq!(graph.count_nodes(NodeLabel::User).await, 1);
}
