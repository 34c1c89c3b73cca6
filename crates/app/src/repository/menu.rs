//! Menu repository: menus with their categories and dishes.

use futures::Stream;
use tracing::{info, instrument, warn};

use atomo_core::{Dish, DishId, Menu, MenuCategory, MenuCategoryId, MenuDetails, MenuId, ProfileId};

use super::watch_tables;
use crate::conversions::try_convert_all;
use crate::error::RepositoryError;
use crate::local::dao::MenuDao;
use crate::local::entities::{DishEntity, MenuCategoryEntity, MenuEntity};
use crate::local::{LocalStore, Table};
use crate::remote::dto::{DishDto, MenuCategoryDto, MenuDto};
use crate::remote::{self, Filter, RemoteBackend};

const TABLES: &[Table] = &[Table::Menus, Table::MenuCategories, Table::Dishes];

/// Local-first access to menus.
#[derive(Clone)]
pub struct MenuRepository<R> {
    local: LocalStore,
    remote: R,
}

impl<R: RemoteBackend + Clone> MenuRepository<R> {
    pub const fn new(local: LocalStore, remote: R) -> Self {
        Self { local, remote }
    }

    fn dao(&self) -> MenuDao<'_> {
        MenuDao::new(&self.local)
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// A cached menu with its categories and dishes.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Local` if a query fails, or
    /// `RepositoryError::DataCorruption` if a cached price does not parse.
    pub async fn get(&self, id: &MenuId) -> Result<Option<MenuDetails>, RepositoryError> {
        match self.dao().get(id).await? {
            Some(row) => Ok(Some(load_details(&self.local, row).await?)),
            None => Ok(None),
        }
    }

    /// The owner's cached menus, without children.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Local` if the query fails.
    pub async fn list(&self, owner: &ProfileId) -> Result<Vec<Menu>, RepositoryError> {
        let rows = self.dao().list_by_owner(owner).await?;
        Ok(rows.into_iter().map(Menu::from).collect())
    }

    /// Number of cached menus the owner has.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Local` if the query fails.
    pub async fn count(&self, owner: &ProfileId) -> Result<u32, RepositoryError> {
        Ok(self.dao().count_by_owner(owner).await?)
    }

    /// Every menu the owner has, re-emitted whenever a menu, category or
    /// dish changes.
    pub fn observe(&self, owner: &ProfileId) -> impl Stream<Item = Vec<MenuDetails>> + Send + 'static {
        let store = self.local.clone();
        let owner = owner.clone();

        watch_tables(&self.local, TABLES, move || {
            let store = store.clone();
            let owner = owner.clone();
            async move {
                load_all(&store, &owner).await.unwrap_or_else(|e| {
                    warn!(error = %e, owner = %owner, "Failed to load menus");
                    Vec::new()
                })
            }
        })
    }

    // =========================================================================
    // Menu writes
    // =========================================================================

    /// # Errors
    ///
    /// Returns `RepositoryError::Remote` if the backend rejects the menu, or
    /// `RepositoryError::Local` if caching it fails.
    #[instrument(skip(self, menu), fields(menu_id = %menu.id))]
    pub async fn create(&self, menu: &Menu) -> Result<Menu, RepositoryError> {
        let stored: Menu = remote::insert(&self.remote, Table::Menus, &MenuDto::from(menu))
            .await?
            .into();
        self.dao().upsert_all(&[MenuEntity::from(&stored)]).await?;
        Ok(stored)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Remote` if the backend rejects the menu, or
    /// `RepositoryError::Local` if caching it fails.
    #[instrument(skip(self, menu), fields(menu_id = %menu.id))]
    pub async fn update(&self, menu: &Menu) -> Result<Menu, RepositoryError> {
        let stored: Menu =
            remote::update(&self.remote, Table::Menus, menu.id.as_str(), &MenuDto::from(menu))
                .await?
                .into();
        self.dao().upsert_all(&[MenuEntity::from(&stored)]).await?;
        Ok(stored)
    }

    /// Delete a menu. Its categories and dishes go with it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Remote` if the backend refuses, or
    /// `RepositoryError::Local` if the cached copy cannot be removed.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: &MenuId) -> Result<(), RepositoryError> {
        remote::delete(&self.remote, Table::Menus, id.as_str()).await?;
        self.dao().delete(id).await?;
        Ok(())
    }

    // =========================================================================
    // Category writes
    // =========================================================================

    /// # Errors
    ///
    /// Returns `RepositoryError` if the backend or the cache write fails.
    #[instrument(skip(self, category), fields(category_id = %category.id, menu_id = %category.menu_id))]
    pub async fn create_category(
        &self,
        category: &MenuCategory,
    ) -> Result<MenuCategory, RepositoryError> {
        let stored: MenuCategory = remote::insert(
            &self.remote,
            Table::MenuCategories,
            &MenuCategoryDto::from(category),
        )
        .await?
        .into();
        self.dao()
            .upsert_categories(&[MenuCategoryEntity::from(&stored)])
            .await?;
        Ok(stored)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError` if the backend or the cache write fails.
    #[instrument(skip(self, category), fields(category_id = %category.id))]
    pub async fn update_category(
        &self,
        category: &MenuCategory,
    ) -> Result<MenuCategory, RepositoryError> {
        let stored: MenuCategory = remote::update(
            &self.remote,
            Table::MenuCategories,
            category.id.as_str(),
            &MenuCategoryDto::from(category),
        )
        .await?
        .into();
        self.dao()
            .upsert_categories(&[MenuCategoryEntity::from(&stored)])
            .await?;
        Ok(stored)
    }

    /// Delete a category. Its dishes stay on the menu, uncategorized.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the backend or the cache write fails.
    #[instrument(skip(self))]
    pub async fn delete_category(&self, id: &MenuCategoryId) -> Result<(), RepositoryError> {
        remote::delete(&self.remote, Table::MenuCategories, id.as_str()).await?;
        self.dao().delete_category(id).await?;
        Ok(())
    }

    // =========================================================================
    // Dish writes
    // =========================================================================

    /// # Errors
    ///
    /// Returns `RepositoryError` if the backend or the cache write fails.
    #[instrument(skip(self, dish), fields(dish_id = %dish.id, menu_id = %dish.menu_id))]
    pub async fn create_dish(&self, dish: &Dish) -> Result<Dish, RepositoryError> {
        let stored: Dish = remote::insert(&self.remote, Table::Dishes, &DishDto::from(dish))
            .await?
            .into();
        self.dao().upsert_dishes(&[DishEntity::from(&stored)]).await?;
        Ok(stored)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError` if the backend or the cache write fails.
    #[instrument(skip(self, dish), fields(dish_id = %dish.id))]
    pub async fn update_dish(&self, dish: &Dish) -> Result<Dish, RepositoryError> {
        let stored: Dish =
            remote::update(&self.remote, Table::Dishes, dish.id.as_str(), &DishDto::from(dish))
                .await?
                .into();
        self.dao().upsert_dishes(&[DishEntity::from(&stored)]).await?;
        Ok(stored)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError` if the backend or the cache write fails.
    #[instrument(skip(self))]
    pub async fn delete_dish(&self, id: &DishId) -> Result<(), RepositoryError> {
        remote::delete(&self.remote, Table::Dishes, id.as_str()).await?;
        self.dao().delete_dish(id).await?;
        Ok(())
    }

    // =========================================================================
    // Sync
    // =========================================================================

    /// Pull the owner's menus, then each menu's categories and dishes.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` on the first failed pull or cache write.
    /// Rows already cached stay cached.
    #[instrument(skip(self), fields(owner = %owner))]
    pub async fn sync(&self, owner: &ProfileId) -> Result<Vec<Menu>, RepositoryError> {
        let dtos: Vec<MenuDto> =
            remote::fetch(&self.remote, Table::Menus, &[Filter::eq("user_id", owner)]).await?;
        let menus: Vec<Menu> = dtos.into_iter().map(Menu::from).collect();

        let rows: Vec<MenuEntity> = menus.iter().map(MenuEntity::from).collect();
        self.dao().upsert_all(&rows).await?;

        let mut category_count = 0usize;
        let mut dish_count = 0usize;

        for menu in &menus {
            let by_menu = [Filter::eq("menu_id", &menu.id)];

            let categories: Vec<MenuCategoryDto> =
                remote::fetch(&self.remote, Table::MenuCategories, &by_menu).await?;
            let rows: Vec<MenuCategoryEntity> = categories
                .into_iter()
                .map(|dto| MenuCategoryEntity::from(&MenuCategory::from(dto)))
                .collect();
            category_count += rows.len();
            self.dao().upsert_categories(&rows).await?;

            let dishes: Vec<DishDto> = remote::fetch(&self.remote, Table::Dishes, &by_menu).await?;
            let rows: Vec<DishEntity> = dishes
                .into_iter()
                .map(|dto| DishEntity::from(&Dish::from(dto)))
                .collect();
            dish_count += rows.len();
            self.dao().upsert_dishes(&rows).await?;
        }

        info!(
            menus = menus.len(),
            categories = category_count,
            dishes = dish_count,
            "Synced menus"
        );
        Ok(menus)
    }
}

async fn load_details(store: &LocalStore, row: MenuEntity) -> Result<MenuDetails, RepositoryError> {
    let dao = MenuDao::new(store);
    let categories = dao.list_categories(&row.id).await?;
    let dishes = try_convert_all(dao.list_dishes(&row.id).await?)?;

    Ok(MenuDetails {
        menu: Menu::from(row),
        categories: categories.into_iter().map(MenuCategory::from).collect(),
        dishes,
    })
}

async fn load_all(store: &LocalStore, owner: &ProfileId) -> Result<Vec<MenuDetails>, RepositoryError> {
    let rows = MenuDao::new(store).list_by_owner(owner).await?;

    let mut all = Vec::with_capacity(rows.len());
    for row in rows {
        all.push(load_details(store, row).await?);
    }
    Ok(all)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use futures::StreamExt;
    use rust_decimal::Decimal;

    use super::*;
    use crate::remote::MemoryBackend;

    async fn repository() -> (MenuRepository<MemoryBackend>, MemoryBackend) {
        let store = LocalStore::in_memory().await.unwrap();
        let backend = MemoryBackend::new();
        (MenuRepository::new(store, backend.clone()), backend)
    }

    fn menu(owner: &str) -> Menu {
        Menu {
            id: MenuId::generate(),
            user_id: ProfileId::new(owner),
            name: "Lunch".to_string(),
            description: None,
            logo_url: None,
            primary_color: "#112233".to_string(),
            font_family: "Inter".to_string(),
            is_published: false,
            created_at: Utc::now(),
        }
    }

    fn dish(menu: &Menu, name: &str, sort_order: i32) -> Dish {
        Dish {
            id: DishId::generate(),
            menu_id: menu.id.clone(),
            category_id: None,
            name: name.to_string(),
            description: None,
            price: Decimal::new(850, 2),
            image_url: None,
            is_available: true,
            sort_order,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_create_then_get_returns_menu() {
        let (repo, backend) = repository().await;
        let menu = menu("user_1");

        repo.create(&menu).await.unwrap();

        let details = repo.get(&menu.id).await.unwrap().unwrap();
        assert_eq!(details.menu, menu);
        assert!(details.dishes.is_empty());
        assert_eq!(backend.rows(Table::Menus).await.len(), 1);
    }

    #[tokio::test]
    async fn test_dishes_come_back_in_sort_order() {
        let (repo, _) = repository().await;
        let menu = menu("user_1");
        repo.create(&menu).await.unwrap();

        repo.create_dish(&dish(&menu, "Dessert", 2)).await.unwrap();
        repo.create_dish(&dish(&menu, "Starter", 0)).await.unwrap();
        repo.create_dish(&dish(&menu, "Main", 1)).await.unwrap();

        let names: Vec<String> = repo
            .get(&menu.id)
            .await
            .unwrap()
            .unwrap()
            .dishes
            .into_iter()
            .map(|d| d.name)
            .collect();
        assert_eq!(names, ["Starter", "Main", "Dessert"]);
    }

    #[tokio::test]
    async fn test_failed_remote_write_leaves_cache_untouched() {
        let (repo, backend) = repository().await;
        backend.fail_writes(true);

        let menu = menu("user_1");
        assert!(matches!(
            repo.create(&menu).await,
            Err(RepositoryError::Remote(_))
        ));
        assert!(repo.get(&menu.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_sync_pulls_menus_and_children() {
        let (repo, backend) = repository().await;
        let menu = menu("user_1");
        let dish = dish(&menu, "Soup", 0);
        backend
            .seed(Table::Menus, serde_json::to_value(MenuDto::from(&menu)).unwrap())
            .await;
        backend
            .seed(Table::Dishes, serde_json::to_value(DishDto::from(&dish)).unwrap())
            .await;

        let synced = repo.sync(&menu.user_id).await.unwrap();
        assert_eq!(synced, vec![menu.clone()]);

        let details = repo.get(&menu.id).await.unwrap().unwrap();
        assert_eq!(details.dishes, vec![dish]);
    }

    #[tokio::test]
    async fn test_observe_emits_after_create() {
        let (repo, _) = repository().await;
        let owner = ProfileId::new("user_1");
        let mut stream = Box::pin(repo.observe(&owner));

        assert!(stream.next().await.unwrap().is_empty());

        let menu = menu("user_1");
        repo.create(&menu).await.unwrap();

        let emitted = stream.next().await.unwrap();
        assert_eq!(emitted.len(), 1);
        assert_eq!(emitted.first().map(|d| &d.menu), Some(&menu));
    }
}
