mod common;

use anyhow::Result;
use chrono::{TimeZone, Utc};
use foodgram::contract::model::{
    IngredientInput, NewIngredient, PageSpec, RecipeFilter, RecipeInput, RecipeRelation, User,
};
use foodgram::domain::error::DomainError;
use foodgram::domain::service::Service;

use common::{create_test_service, png_data_uri, register, seed_ingredients};

fn recipe_input(name: &str, lines: &[(i32, i64)]) -> RecipeInput {
    RecipeInput {
        ingredients: Some(
            lines
                .iter()
                .map(|&(id, amount)| IngredientInput { id, amount })
                .collect(),
        ),
        image: Some(png_data_uri()),
        name: Some(name.to_string()),
        text: Some("Mix and serve.".to_string()),
        cooking_time: Some(10),
    }
}

async fn create(svc: &Service, author: &User, name: &str, lines: &[(i32, i64)]) -> i32 {
    svc.create_recipe(author, recipe_input(name, lines))
        .await
        .expect("create recipe")
        .recipe
        .id
}

const FIRST_PAGE: PageSpec = PageSpec {
    offset: 0,
    limit: 100,
};

#[tokio::test]
async fn registration_rejects_duplicates_and_bad_input() -> Result<()> {
    let (svc, _media) = create_test_service().await;
    let (alice, _) = register(&svc, "alice").await;
    assert_eq!(alice.username, "alice");

    let mut dup_email = common::new_user("alice2");
    dup_email.email = "alice@example.com".to_string();
    let err = svc.register_user(dup_email).await.unwrap_err();
    assert!(matches!(err, DomainError::EmailAlreadyExists { .. }));

    let mut dup_name = common::new_user("alice");
    dup_name.email = "other@example.com".to_string();
    let err = svc.register_user(dup_name).await.unwrap_err();
    assert!(matches!(err, DomainError::UsernameAlreadyExists { .. }));

    let err = svc.register_user(common::new_user("me")).await.unwrap_err();
    assert!(matches!(err, DomainError::Validation { ref field, .. } if field == "username"));

    let mut numeric = common::new_user("bob");
    numeric.password = "12345678".to_string();
    let err = svc.register_user(numeric).await.unwrap_err();
    assert!(matches!(err, DomainError::Validation { ref field, .. } if field == "password"));
    Ok(())
}

#[tokio::test]
async fn login_reuses_token_until_logout() -> Result<()> {
    let (svc, _media) = create_test_service().await;
    let (alice, token) = register(&svc, "alice").await;

    let again = svc.login("alice@example.com", "s3cret-pass".to_string()).await?;
    assert_eq!(again, token);
    assert_eq!(svc.authenticate(&token).await?.id, alice.id);

    let err = svc
        .login("alice@example.com", "wrong-pass".to_string())
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::InvalidCredentials));

    svc.logout(alice.id).await?;
    assert!(matches!(
        svc.authenticate(&token).await.unwrap_err(),
        DomainError::InvalidToken
    ));
    Ok(())
}

#[tokio::test]
async fn set_password_checks_current_password() -> Result<()> {
    let (svc, _media) = create_test_service().await;
    let (alice, _) = register(&svc, "alice").await;

    let err = svc
        .set_password(alice.id, "nope".to_string(), "another-pass".to_string())
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation { ref field, .. } if field == "current_password"));

    svc.set_password(alice.id, "s3cret-pass".to_string(), "another-pass".to_string())
        .await?;
    svc.login("alice@example.com", "another-pass".to_string()).await?;
    Ok(())
}

#[tokio::test]
async fn avatar_round_trip() -> Result<()> {
    let (svc, media) = create_test_service().await;
    let (alice, _) = register(&svc, "alice").await;

    let err = svc.delete_avatar(&alice).await.unwrap_err();
    assert!(matches!(err, DomainError::AvatarMissing));

    let updated = svc.set_avatar(&alice, &png_data_uri()).await?;
    let path = updated.avatar.clone().expect("avatar path");
    assert!(path.starts_with("users/") && path.ends_with(".png"));
    assert!(media.path().join(&path).exists());

    svc.delete_avatar(&updated).await?;
    assert!(svc.get_user(alice.id).await?.avatar.is_none());
    assert!(!media.path().join(&path).exists());
    Ok(())
}

#[tokio::test]
async fn users_are_listed_by_username() -> Result<()> {
    let (svc, _media) = create_test_service().await;
    let (zed, _) = register(&svc, "zed").await;
    register(&svc, "amy").await;
    register(&svc, "kim").await;

    let page = svc.list_profiles(Some(zed.id), FIRST_PAGE).await?;
    assert_eq!(page.total, 3);
    let names: Vec<&str> = page.items.iter().map(|p| p.user.username.as_str()).collect();
    assert_eq!(names, vec!["amy", "kim", "zed"]);

    let second = PageSpec {
        offset: 1,
        limit: 1,
    };
    let page = svc.list_profiles(None, second).await?;
    assert_eq!(page.items[0].user.username, "kim");
    Ok(())
}

#[tokio::test]
async fn ingredient_search_is_case_insensitive_substring() -> Result<()> {
    let (svc, _media) = create_test_service().await;
    let items = [("Potato", "g"), ("Sweet Potato", "g"), ("Tomato", "g")]
        .into_iter()
        .map(|(name, unit)| NewIngredient {
            name: name.to_string(),
            measurement_unit: unit.to_string(),
        })
        .collect::<Vec<_>>();
    assert_eq!(svc.import_ingredients(items.clone()).await?, 3);
    // existing pairs are skipped
    assert_eq!(svc.import_ingredients(items).await?, 0);

    let found: Vec<String> = svc
        .search_ingredients(Some("potat"))
        .await?
        .into_iter()
        .map(|i| i.name)
        .collect();
    assert_eq!(found, vec!["Potato", "Sweet Potato"]);

    assert_eq!(svc.search_ingredients(Some("  ")).await?.len(), 3);
    Ok(())
}

#[tokio::test]
async fn ingredient_search_folds_non_ascii_case() -> Result<()> {
    let (svc, _media) = create_test_service().await;
    let items = [("Картофель", "г"), ("Морковь", "г"), ("Épinard", "g")]
        .into_iter()
        .map(|(name, unit)| NewIngredient {
            name: name.to_string(),
            measurement_unit: unit.to_string(),
        })
        .collect::<Vec<_>>();
    assert_eq!(svc.import_ingredients(items).await?, 3);

    for query in ["картоф", "Картоф", "КАРТОФЕЛЬ"] {
        let found = svc.search_ingredients(Some(query)).await?;
        assert_eq!(found.len(), 1, "query {query}");
        assert_eq!(found[0].name, "Картофель");
    }
    let found = svc.search_ingredients(Some("épin")).await?;
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "Épinard");
    Ok(())
}

#[tokio::test]
async fn recipe_create_validates_ingredient_lines() -> Result<()> {
    let (svc, _media) = create_test_service().await;
    let (alice, _) = register(&svc, "alice").await;
    let ids = seed_ingredients(&svc).await;

    let empty = svc.create_recipe(&alice, recipe_input("Soup", &[])).await;
    assert!(matches!(empty, Err(DomainError::Validation { ref field, .. }) if field == "ingredients"));

    let repeated = svc
        .create_recipe(&alice, recipe_input("Soup", &[(ids[0], 1), (ids[0], 2)]))
        .await;
    assert!(matches!(repeated, Err(DomainError::Validation { ref field, .. }) if field == "ingredients"));

    let zero = svc
        .create_recipe(&alice, recipe_input("Soup", &[(ids[0], 0)]))
        .await;
    assert!(matches!(zero, Err(DomainError::Validation { .. })));

    let unknown = svc
        .create_recipe(&alice, recipe_input("Soup", &[(9_999, 1)]))
        .await;
    assert!(matches!(unknown, Err(DomainError::Validation { .. })));

    let mut slow = recipe_input("Soup", &[(ids[0], 1)]);
    slow.cooking_time = Some(0);
    let err = svc.create_recipe(&alice, slow).await.unwrap_err();
    assert!(matches!(err, DomainError::Validation { ref field, .. } if field == "cooking_time"));
    Ok(())
}

#[tokio::test]
async fn update_replaces_ingredients_and_keeps_omitted_fields() -> Result<()> {
    let (svc, _media) = create_test_service().await;
    let (alice, _) = register(&svc, "alice").await;
    let (bob, _) = register(&svc, "bob").await;
    let ids = seed_ingredients(&svc).await;

    let id = create(&svc, &alice, "Soup", &[(ids[0], 5), (ids[1], 2)]).await;

    let patch = RecipeInput {
        ingredients: Some(vec![IngredientInput {
            id: ids[2],
            amount: 300,
        }]),
        image: Some(png_data_uri()),
        ..RecipeInput::default()
    };
    let err = svc.update_recipe(&bob, id, patch.clone()).await.unwrap_err();
    assert!(matches!(err, DomainError::NotAuthor { .. }));

    let updated = svc.update_recipe(&alice, id, patch).await?;
    assert_eq!(updated.recipe.name, "Soup");
    assert_eq!(updated.recipe.cooking_time, 10);
    let lines: Vec<(i32, i32)> = updated
        .ingredients
        .iter()
        .map(|l| (l.ingredient.id, l.amount))
        .collect();
    assert_eq!(lines, vec![(ids[2], 300)]);

    let missing_image = RecipeInput {
        ingredients: Some(vec![IngredientInput { id: ids[0], amount: 1 }]),
        ..RecipeInput::default()
    };
    let err = svc.update_recipe(&alice, id, missing_image).await.unwrap_err();
    assert!(matches!(err, DomainError::Validation { ref field, .. } if field == "image"));
    Ok(())
}

#[tokio::test]
async fn delete_checks_existence_before_authorship() -> Result<()> {
    let (svc, _media) = create_test_service().await;
    let (alice, _) = register(&svc, "alice").await;
    let (bob, _) = register(&svc, "bob").await;
    let ids = seed_ingredients(&svc).await;
    let id = create(&svc, &alice, "Soup", &[(ids[0], 1)]).await;

    assert!(matches!(
        svc.delete_recipe(&bob, 9_999).await.unwrap_err(),
        DomainError::RecipeNotFound { .. }
    ));
    assert!(matches!(
        svc.delete_recipe(&bob, id).await.unwrap_err(),
        DomainError::NotAuthor { .. }
    ));
    svc.delete_recipe(&alice, id).await?;
    assert!(matches!(
        svc.get_recipe(None, id).await.unwrap_err(),
        DomainError::RecipeNotFound { .. }
    ));
    Ok(())
}

#[tokio::test]
async fn relations_reject_repeats() -> Result<()> {
    let (svc, _media) = create_test_service().await;
    let (alice, _) = register(&svc, "alice").await;
    let ids = seed_ingredients(&svc).await;
    let id = create(&svc, &alice, "Soup", &[(ids[0], 1)]).await;

    for relation in [RecipeRelation::Favorite, RecipeRelation::ShoppingCart] {
        let summary = svc.add_to(relation, alice.id, id).await?;
        assert_eq!(summary.author_username, "alice");
        assert!(matches!(
            svc.add_to(relation, alice.id, id).await.unwrap_err(),
            DomainError::AlreadyInRelation { .. }
        ));
        svc.remove_from(relation, alice.id, id).await?;
        assert!(matches!(
            svc.remove_from(relation, alice.id, id).await.unwrap_err(),
            DomainError::NotInRelation { .. }
        ));
    }

    assert!(matches!(
        svc.add_to(RecipeRelation::Favorite, alice.id, 9_999)
            .await
            .unwrap_err(),
        DomainError::RecipeNotFound { .. }
    ));
    Ok(())
}

#[tokio::test]
async fn listing_filters_by_viewer_relations() -> Result<()> {
    let (svc, _media) = create_test_service().await;
    let (alice, _) = register(&svc, "alice").await;
    let (bob, _) = register(&svc, "bob").await;
    let ids = seed_ingredients(&svc).await;
    let soup = create(&svc, &alice, "Soup", &[(ids[0], 1)]).await;
    let cake = create(&svc, &bob, "Cake", &[(ids[1], 1)]).await;
    svc.add_to(RecipeRelation::Favorite, alice.id, cake).await?;

    let favorited = RecipeFilter {
        is_favorited: Some("1".to_string()),
        ..RecipeFilter::default()
    };
    let page = svc.list_recipes(Some(alice.id), &favorited, FIRST_PAGE).await?;
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].recipe.id, cake);
    assert!(page.items[0].is_favorited);

    let not_favorited = RecipeFilter {
        is_favorited: Some("0".to_string()),
        ..RecipeFilter::default()
    };
    let page = svc
        .list_recipes(Some(alice.id), &not_favorited, FIRST_PAGE)
        .await?;
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].recipe.id, soup);

    // anonymous viewers get the unfiltered set
    let page = svc.list_recipes(None, &favorited, FIRST_PAGE).await?;
    assert_eq!(page.total, 2);
    // newest first
    assert_eq!(page.items[0].recipe.id, cake);
    assert!(!page.items[0].is_favorited);

    svc.add_to(RecipeRelation::ShoppingCart, alice.id, soup).await?;
    let in_cart = RecipeFilter {
        is_in_shopping_cart: Some("1".to_string()),
        ..RecipeFilter::default()
    };
    let page = svc.list_recipes(Some(alice.id), &in_cart, FIRST_PAGE).await?;
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].recipe.id, soup);
    assert!(page.items[0].is_in_shopping_cart);
    assert!(!page.items[0].is_favorited);

    let not_in_cart = RecipeFilter {
        is_in_shopping_cart: Some("0".to_string()),
        ..RecipeFilter::default()
    };
    let page = svc.list_recipes(Some(alice.id), &not_in_cart, FIRST_PAGE).await?;
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].recipe.id, cake);

    // bob's cart is empty
    let page = svc.list_recipes(Some(bob.id), &in_cart, FIRST_PAGE).await?;
    assert_eq!(page.total, 0);
    let page = svc.list_recipes(None, &in_cart, FIRST_PAGE).await?;
    assert_eq!(page.total, 2);
    assert!(page.items.iter().all(|d| !d.is_in_shopping_cart));

    // filters compose
    let favorited_in_cart = RecipeFilter {
        is_favorited: Some("1".to_string()),
        is_in_shopping_cart: Some("1".to_string()),
        ..RecipeFilter::default()
    };
    let page = svc
        .list_recipes(Some(alice.id), &favorited_in_cart, FIRST_PAGE)
        .await?;
    assert_eq!(page.total, 0);

    let by_author = RecipeFilter {
        author: Some(alice.id),
        ..RecipeFilter::default()
    };
    let page = svc.list_recipes(None, &by_author, FIRST_PAGE).await?;
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].recipe.id, soup);
    Ok(())
}

#[tokio::test]
async fn subscriptions_reject_self_and_duplicates() -> Result<()> {
    let (svc, _media) = create_test_service().await;
    let (alice, _) = register(&svc, "alice").await;
    let (bob, _) = register(&svc, "bob").await;
    let ids = seed_ingredients(&svc).await;
    for name in ["One", "Two", "Three", "Four"] {
        create(&svc, &bob, name, &[(ids[0], 1)]).await;
    }

    assert!(matches!(
        svc.subscribe(&alice, alice.id).await.unwrap_err(),
        DomainError::SelfSubscription
    ));
    assert!(matches!(
        svc.subscribe(&alice, 9_999).await.unwrap_err(),
        DomainError::UserNotFound { .. }
    ));

    let receipt = svc.subscribe(&alice, bob.id).await?;
    assert_eq!(receipt.author, "bob");
    assert_eq!(receipt.user, "alice");
    assert!(matches!(
        svc.subscribe(&alice, bob.id).await.unwrap_err(),
        DomainError::AlreadySubscribed { .. }
    ));
    assert!(svc.get_profile(Some(alice.id), bob.id).await?.is_subscribed);

    let page = svc.subscriptions(alice.id, FIRST_PAGE, Some("2")).await?;
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].recipes.len(), 2);
    assert_eq!(page.items[0].recipes_count, 4);
    assert_eq!(page.items[0].recipes[0].recipe.name, "Four");
    // full read form, scoped to the subscriber
    assert_eq!(page.items[0].recipes[0].author.user.id, bob.id);
    assert!(page.items[0].recipes[0].author.is_subscribed);
    assert_eq!(page.items[0].recipes[0].ingredients.len(), 1);

    // invalid or missing limits fall back to the configured default
    let page = svc.subscriptions(alice.id, FIRST_PAGE, Some("lots")).await?;
    assert_eq!(page.items[0].recipes.len(), 3);
    let page = svc.subscriptions(alice.id, FIRST_PAGE, None).await?;
    assert_eq!(page.items[0].recipes.len(), 3);

    svc.unsubscribe(&alice, bob.id).await?;
    assert!(matches!(
        svc.unsubscribe(&alice, bob.id).await.unwrap_err(),
        DomainError::NotSubscribed { .. }
    ));
    Ok(())
}

#[tokio::test]
async fn explicit_recipes_limit_is_honored_above_default() -> Result<()> {
    let (svc, _media) = create_test_service().await;
    let (alice, _) = register(&svc, "alice").await;
    let (bob, _) = register(&svc, "bob").await;
    let ids = seed_ingredients(&svc).await;
    for name in ["One", "Two", "Three", "Four", "Five"] {
        create(&svc, &bob, name, &[(ids[0], 1)]).await;
    }
    svc.subscribe(&alice, bob.id).await?;

    let page = svc.subscriptions(alice.id, FIRST_PAGE, Some("5")).await?;
    assert_eq!(page.items[0].recipes.len(), 5);
    assert_eq!(page.items[0].recipes_count, 5);

    let page = svc.subscriptions(alice.id, FIRST_PAGE, Some("0")).await?;
    assert!(page.items[0].recipes.is_empty());

    assert_eq!(svc.recipes_limit(Some("5")), 5);
    assert_eq!(svc.recipes_limit(Some("-1")), 3);
    assert_eq!(svc.recipes_limit(Some("100000")), 100);
    Ok(())
}

#[tokio::test]
async fn shopping_list_sums_same_ingredient_across_recipes() -> Result<()> {
    let (svc, _media) = create_test_service().await;
    let (alice, _) = register(&svc, "alice").await;
    let ids = seed_ingredients(&svc).await;
    let salt = ids[0];
    let a = create(&svc, &alice, "Recipe A", &[(salt, 5)]).await;
    let b = create(&svc, &alice, "Recipe B", &[(salt, 3), (ids[2], 200)]).await;
    svc.add_to(RecipeRelation::ShoppingCart, alice.id, a).await?;
    svc.add_to(RecipeRelation::ShoppingCart, alice.id, b).await?;

    let list = svc.shopping_list(alice.id).await?;
    let salt_line = list
        .items
        .iter()
        .find(|i| i.name == "salt")
        .expect("salt line");
    assert_eq!(salt_line.total_amount, 8);
    assert_eq!(list.items.len(), 2);
    assert_eq!(list.recipes.len(), 2);

    let at = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
    let text = svc.render_shopping_list(alice.id, at).await?;
    assert!(text.starts_with("Shopping list for 01-03-2025 12:00:00"));
    assert_eq!(text.matches("Salt (g) - 8").count(), 1);
    assert!(text.contains("- Recipe A (@alice)"));
    assert!(text.contains("- Recipe B (@alice)"));
    Ok(())
}

#[tokio::test]
async fn short_link_points_at_recipe_page() -> Result<()> {
    let (svc, _media) = create_test_service().await;
    let (alice, _) = register(&svc, "alice").await;
    let ids = seed_ingredients(&svc).await;
    let id = create(&svc, &alice, "Soup", &[(ids[0], 1)]).await;

    assert_eq!(svc.short_link_target(id).await?, format!("/recipes/{id}"));
    assert!(svc.short_link_target(id + 1).await.is_err());
    Ok(())
}
