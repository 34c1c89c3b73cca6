//! Repository contract: local reads, remote-first writes, sync and the
//! cascade rules of the local schema.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use atomo_app::error::RepositoryError;
use atomo_app::local::Table;
use atomo_app::remote::dto::{DishDto, MenuDto, ShopDto};
use atomo_integration_tests::{
    TestContext, dish, menu, menu_category, owner, product, shop, shop_category,
};

// =============================================================================
// Reads after writes
// =============================================================================

#[tokio::test]
async fn test_create_then_get_returns_the_entity() {
    let ctx = TestContext::new().await.unwrap();
    let menus = ctx.state.menus();
    let lunch = menu("m1", "Lunch");

    menus.create(&lunch).await.unwrap();

    let details = menus.get(&lunch.id).await.unwrap().unwrap();
    assert_eq!(details.menu, lunch);
    assert!(details.categories.is_empty());
    assert!(details.dishes.is_empty());
}

#[tokio::test]
async fn test_children_are_exactly_the_parents_rows_in_sort_order() {
    let ctx = TestContext::new().await.unwrap();
    let menus = ctx.state.menus();
    let lunch = menu("m1", "Lunch");
    let dinner = menu("m2", "Dinner");
    menus.create(&lunch).await.unwrap();
    menus.create(&dinner).await.unwrap();

    for (id, order) in [("c3", 3), ("c1", 1), ("c2", 2)] {
        menus
            .create_category(&menu_category(id, &lunch.id, order))
            .await
            .unwrap();
    }
    for (id, order) in [("d2", 20), ("d1", 10)] {
        menus.create_dish(&dish(id, &lunch.id, order)).await.unwrap();
    }
    menus.create_dish(&dish("other", &dinner.id, 0)).await.unwrap();

    let details = menus.get(&lunch.id).await.unwrap().unwrap();

    let categories: Vec<_> = details.categories.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(categories, ["c1", "c2", "c3"]);
    let dishes: Vec<_> = details.dishes.iter().map(|d| d.id.as_str()).collect();
    assert_eq!(dishes, ["d1", "d2"]);
}

// =============================================================================
// Sync
// =============================================================================

#[tokio::test]
async fn test_sync_overwrites_local_divergence() {
    let ctx = TestContext::new().await.unwrap();
    let menus = ctx.state.menus();
    let lunch = menu("m1", "Lunch");
    menus.create(&lunch).await.unwrap();
    menus.create_dish(&dish("d1", &lunch.id, 0)).await.unwrap();

    // Someone edits both rows on another device.
    let mut renamed = lunch.clone();
    renamed.name = "Brunch".to_owned();
    ctx.seed_remote(Table::Menus, serde_json::to_value(MenuDto::from(&renamed)).unwrap())
        .await;
    let mut sold_out = dish("d1", &lunch.id, 0);
    sold_out.is_available = false;
    ctx.seed_remote(Table::Dishes, serde_json::to_value(DishDto::from(&sold_out)).unwrap())
        .await;

    let synced = menus.sync(&owner()).await.unwrap();
    assert_eq!(synced, [renamed.clone()]);

    let details = menus.get(&lunch.id).await.unwrap().unwrap();
    assert_eq!(details.menu, renamed);
    assert_eq!(details.dishes, [sold_out]);
}

#[tokio::test]
async fn test_sync_pulls_rows_created_elsewhere() {
    let ctx = TestContext::new().await.unwrap();
    let corner = shop("s1", "Corner store");
    ctx.seed_remote(Table::Shops, serde_json::to_value(ShopDto::from(&corner)).unwrap())
        .await;

    assert!(ctx.state.shops().list(&owner()).await.unwrap().is_empty());

    ctx.state.shops().sync(&owner()).await.unwrap();

    assert_eq!(ctx.state.shops().list(&owner()).await.unwrap(), [corner]);
}

// =============================================================================
// Deletes
// =============================================================================

#[tokio::test]
async fn test_deleting_a_parent_cascades_to_children() {
    let ctx = TestContext::new().await.unwrap();
    let menus = ctx.state.menus();
    let lunch = menu("m1", "Lunch");
    menus.create(&lunch).await.unwrap();
    menus
        .create_category(&menu_category("c1", &lunch.id, 0))
        .await
        .unwrap();
    menus.create_dish(&dish("d1", &lunch.id, 0)).await.unwrap();

    menus.delete(&lunch.id).await.unwrap();

    assert_eq!(menus.get(&lunch.id).await.unwrap(), None);
    assert_eq!(menus.count(&owner()).await.unwrap(), 0);
}

#[tokio::test]
async fn test_deleting_a_category_keeps_its_products() {
    let ctx = TestContext::new().await.unwrap();
    let shops = ctx.state.shops();
    let corner = shop("s1", "Corner store");
    let drinks = shop_category("sc1", &corner.id);
    shops.create(&corner).await.unwrap();
    shops.create_category(&drinks).await.unwrap();
    let soda = product("p1", &corner.id, Some(&drinks.id));
    shops.create_product(&soda).await.unwrap();

    shops.delete_category(&drinks.id).await.unwrap();

    let kept = shops.get_product(&soda.id).await.unwrap().unwrap();
    assert_eq!(kept.category_id, None);
    assert_eq!(kept.name, soda.name);

    let details = shops.get(&corner.id).await.unwrap().unwrap();
    assert!(details.categories.is_empty());
    assert_eq!(details.products.len(), 1);
}

// =============================================================================
// Failed remote writes
// =============================================================================

#[tokio::test]
async fn test_failed_remote_write_leaves_local_untouched() {
    let ctx = TestContext::new().await.unwrap();
    let menus = ctx.state.menus();
    let lunch = menu("m1", "Lunch");
    menus.create(&lunch).await.unwrap();

    ctx.backend.fail_writes(true);

    let mut renamed = lunch.clone();
    renamed.name = "Brunch".to_owned();
    let update = menus.update(&renamed).await;
    assert!(matches!(update, Err(RepositoryError::Remote(_))));

    let insert = menus.create(&menu("m2", "Dinner")).await;
    assert!(matches!(insert, Err(RepositoryError::Remote(_))));

    let delete = menus.delete(&lunch.id).await;
    assert!(matches!(delete, Err(RepositoryError::Remote(_))));

    let cached = menus.list(&owner()).await.unwrap();
    assert_eq!(cached, [lunch]);
}

#[tokio::test]
async fn test_remote_holds_what_was_written() {
    let ctx = TestContext::new().await.unwrap();
    ctx.state.menus().create(&menu("m1", "Lunch")).await.unwrap();

    let rows = ctx.backend.rows(Table::Menus).await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["name"], "Lunch");
    assert_eq!(rows[0]["user_id"], "user_1");
}
