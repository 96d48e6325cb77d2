//! Resolver behaviour end to end against the in-process graph.

use std::time::Duration;

use chrono::Utc;
use cookbook_api::{dispatch, Request, RequestContext, Resolvers};
use cookbook_auth::{
    issue_token_at, verify_token, Claims, CredentialService, PasswordHasher, TokenService,
};
use cookbook_core::{ApiError, EntityId, NewRecipe, NodeLabel, RecipePatch};
use cookbook_graph::MemoryGraph;
use serde_json::json;

const SECRET: &[u8] = b"resolver-test-secret";

fn resolvers() -> Resolvers<MemoryGraph> {
    let credentials = CredentialService::new(
        PasswordHasher::new(PasswordHasher::MIN_COST).unwrap(),
        TokenService::new(SECRET, Duration::from_secs(300)).unwrap(),
    );
    Resolvers::new(MemoryGraph::new(), credentials)
}

fn anon() -> RequestContext {
    RequestContext::anonymous()
}

fn recipe(title: &str, ingredients: &[&str], category: &str) -> NewRecipe {
    NewRecipe {
        title: title.to_string(),
        description: Some("A classic".to_string()),
        difficulty: Some("easy".to_string()),
        time: Some(30),
        ingredients: ingredients.iter().map(|s| s.to_string()).collect(),
        category: Some(category.to_string()),
        created_by_user_id: None,
    }
}

fn sorted_names(names: Vec<&str>) -> Vec<String> {
    let mut names: Vec<String> = names.into_iter().map(String::from).collect();
    names.sort();
    names
}

#[tokio::test]
async fn test_create_ingredient_twice_yields_same_id() {
    let r = resolvers();
    let first = r.create_ingredient(&anon(), "salt").await.unwrap();
    let second = r.create_ingredient(&anon(), "salt").await.unwrap();
    assert_eq!(first.id, second.id);

    let a = r.create_recipe(&anon(), &recipe("Soup", &["salt"], "Soups")).await.unwrap();
    let b = r.create_recipe(&anon(), &recipe("Stew", &["salt"], "Soups")).await.unwrap();
    assert_eq!(a.ingredients[0].id, first.id);
    assert_eq!(b.ingredients[0].id, first.id);
    assert_eq!(r.store().count_nodes(NodeLabel::Ingredient).await, 1);
}

#[tokio::test]
async fn test_update_title_only_changes_title() {
    let r = resolvers();
    let created = r
        .create_recipe(&anon(), &recipe("Old", &["egg", "flour"], "Baking"))
        .await
        .unwrap();

    let patch = RecipePatch {
        title: Some("New".to_string()),
        ..Default::default()
    };
    let updated = r.update_recipe(&anon(), &created.id, &patch).await.unwrap();

    assert_eq!(updated.title, "New");
    assert_eq!(updated.description, created.description);
    assert_eq!(updated.difficulty, created.difficulty);
    assert_eq!(updated.time, created.time);
    assert_eq!(updated.category, created.category);
    assert_eq!(
        sorted_names(updated.ingredient_names()),
        sorted_names(created.ingredient_names())
    );
}

#[tokio::test]
async fn test_ingredient_replacement_is_total() {
    let r = resolvers();
    let created = r
        .create_recipe(&anon(), &recipe("Omelette", &["egg", "flour"], "Breakfast"))
        .await
        .unwrap();

    let patch = RecipePatch {
        ingredients: Some(vec!["egg".to_string()]),
        ..Default::default()
    };
    let updated = r.update_recipe(&anon(), &created.id, &patch).await.unwrap();
    assert_eq!(updated.ingredient_names(), vec!["egg"]);

    let reread = r.get_recipe_by_id(&anon(), &created.id).await.unwrap();
    assert_eq!(reread.ingredients.len(), 1);
}

#[tokio::test]
async fn test_delete_recipe_keeps_neighbours() {
    let r = resolvers();
    let user = r
        .register_user(&anon(), "ada", "ada@example.com", "secret")
        .await
        .unwrap()
        .user;
    let mut input = recipe("Bread", &["flour", "water"], "Baking");
    input.created_by_user_id = Some(user.id.clone());
    let created = r.create_recipe(&anon(), &input).await.unwrap();
    assert_eq!(created.created_by.as_ref().unwrap().id, user.id);

    assert!(r.delete_recipe(&anon(), &created.id).await.unwrap());
    assert!(!r.delete_recipe(&anon(), &created.id).await.unwrap());
    assert_eq!(r.store().count_edges().await, 0);

    for ingredient in &created.ingredients {
        let found = r.get_ingredient_by_id(&anon(), &ingredient.id).await.unwrap();
        assert!(found.recipes.is_empty());
    }
    let category = created.category.unwrap();
    assert_eq!(
        r.get_category_by_id(&anon(), &category.id).await.unwrap(),
        category
    );
    assert_eq!(r.get_user_by_id(&anon(), &user.id).await.unwrap(), user);
}

#[tokio::test]
async fn test_registration_rejects_duplicate_email() {
    let r = resolvers();
    r.register_user(&anon(), "a", "dup@x.com", "p1").await.unwrap();

    let err = r
        .register_user(&anon(), "b", "dup@x.com", "p2")
        .await
        .unwrap_err();
    assert_eq!(err.code(), "CONFLICT");

    let users = r.get_users(&anon()).await.unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].username, "a");
}

#[tokio::test]
async fn test_login_round_trip() {
    let r = resolvers();
    let registered = r
        .register_user(&anon(), "a", "a@x.com", "secret")
        .await
        .unwrap();

    let login = r.login_user(&anon(), "a@x.com", "secret").await.unwrap();
    assert_eq!(login.user, registered.user);
    let claims = verify_token(&login.token, SECRET).unwrap();
    assert_eq!(claims.id, registered.user.id);
    assert_eq!(claims.email, "a@x.com");
    assert_eq!(claims.username, "a");

    assert_eq!(
        r.login_user(&anon(), "a@x.com", "wrong").await,
        Err(ApiError::InvalidCredentials)
    );
    assert_eq!(
        r.login_user(&anon(), "nobody@x.com", "secret").await,
        Err(ApiError::InvalidCredentials)
    );
}

#[tokio::test]
async fn test_not_found_and_empty_lists() {
    let r = resolvers();
    let missing = EntityId::from("nonexistent-id");

    let err = r.get_recipe_by_id(&anon(), &missing).await.unwrap_err();
    assert_eq!(err.code(), "NOT_FOUND");
    assert_eq!(err.to_string(), "Recipe not found: nonexistent-id");

    assert!(r.get_recipes(&anon()).await.unwrap().is_empty());
    assert!(r.get_users(&anon()).await.unwrap().is_empty());
    assert!(r.get_ingredients(&anon()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_user_information_requires_valid_token() {
    let r = resolvers();
    let payload = r
        .register_user(&anon(), "ada", "ada@example.com", "secret")
        .await
        .unwrap();

    assert!(matches!(
        r.get_user_information(&anon()).await,
        Err(ApiError::Unauthorized(_))
    ));

    let header = format!("Bearer {}", payload.token);
    let ctx = r.context(Some(&header));
    assert_eq!(r.get_user_information(&ctx).await.unwrap(), payload.user);

    // A correctly signed token past its expiry is rejected.
    let claims = Claims {
        id: payload.user.id.clone(),
        email: payload.user.email.clone(),
        username: payload.user.username.clone(),
    };
    let issued = Utc::now() - chrono::Duration::hours(1);
    let stale = issue_token_at(&claims, SECRET, Duration::from_secs(60), issued).unwrap();
    let ctx = r.context(Some(&format!("Bearer {stale}")));
    assert_eq!(
        r.get_user_information(&ctx).await,
        Err(ApiError::Unauthorized("Token has expired".to_string()))
    );
}

#[tokio::test]
async fn test_user_information_for_deleted_account() {
    let r = resolvers();
    let payload = r
        .register_user(&anon(), "ada", "ada@example.com", "secret")
        .await
        .unwrap();
    assert!(r.delete_user(&anon(), &payload.user.id).await.unwrap());

    let ctx = r.context(Some(&format!("Bearer {}", payload.token)));
    let err = r.get_user_information(&ctx).await.unwrap_err();
    assert_eq!(err.code(), "NOT_FOUND");
}

#[tokio::test]
async fn test_validation_runs_before_store() {
    let r = resolvers();
    assert!(matches!(
        r.register_user(&anon(), "ada", "not-an-email", "secret").await,
        Err(ApiError::Validation(_))
    ));
    assert!(matches!(
        r.register_user(&anon(), " ", "ada@example.com", "secret").await,
        Err(ApiError::Validation(_))
    ));
    assert!(matches!(
        r.create_recipe(&anon(), &recipe("", &["salt"], "Soups")).await,
        Err(ApiError::Validation(_))
    ));
    assert!(matches!(
        r.create_ingredient(&anon(), "").await,
        Err(ApiError::Validation(_))
    ));
    assert_eq!(r.store().count_nodes(NodeLabel::User).await, 0);
    assert_eq!(r.store().count_nodes(NodeLabel::Recipe).await, 0);
    assert_eq!(r.store().count_nodes(NodeLabel::Ingredient).await, 0);
}

#[tokio::test]
async fn test_unknown_creator_is_not_found() {
    let r = resolvers();
    let mut input = recipe("Orphan", &["salt"], "Soups");
    input.created_by_user_id = Some(EntityId::from("ghost"));

    let err = r.create_recipe(&anon(), &input).await.unwrap_err();
    assert_eq!(
        err,
        ApiError::NotFound {
            entity: "User",
            id: "ghost".to_string()
        }
    );
    assert_eq!(r.store().count_nodes(NodeLabel::Ingredient).await, 0);
}

#[tokio::test]
async fn test_dispatch_round_trip() {
    let r = resolvers();
    let ctx = anon();

    let request: Request = serde_json::from_value(json!({
        "operation": "createRecipe",
        "params": { "title": "Toast", "ingredients": ["bread"], "category": "Breakfast" }
    }))
    .unwrap();
    let created = dispatch(&r, &ctx, request).await.unwrap();
    assert_eq!(created["title"], "Toast");
    assert_eq!(created["category"]["name"], "Breakfast");
    assert_eq!(created["createdBy"], serde_json::Value::Null);

    let id = created["id"].as_str().unwrap().to_string();
    let request: Request = serde_json::from_value(json!({
        "operation": "updateRecipe",
        "params": { "id": id, "time": 5 }
    }))
    .unwrap();
    let updated = dispatch(&r, &ctx, request).await.unwrap();
    assert_eq!(updated["time"], 5);
    assert_eq!(updated["title"], "Toast");

    let request: Request = serde_json::from_value(json!({
        "operation": "deleteRecipe",
        "params": { "id": id }
    }))
    .unwrap();
    assert_eq!(dispatch(&r, &ctx, request).await.unwrap(), json!(true));

    let request: Request =
        serde_json::from_value(json!({ "operation": "getUserInformation" })).unwrap();
    let err = dispatch(&r, &ctx, request).await.unwrap_err();
    assert_eq!(err.code(), "UNAUTHORIZED");
}
