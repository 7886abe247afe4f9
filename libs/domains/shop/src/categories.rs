//! Category commands and queries.

use async_trait::async_trait;
use mediator::{CancellationToken, Request, RequestHandler, Validator, rules};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::context::{ShopContext, UnitOfWork};
use crate::error::{PersistenceError, ShopError, ShopResult};
use crate::models::Category;
use crate::store::Change;

pub const MAX_NAME_CHARS: usize = 100;

#[derive(Debug, Clone)]
pub struct CreateCategory {
    pub name: String,
}

impl Request for CreateCategory {
    type Response = Category;
    type Error = ShopError;
    const NAME: &'static str = "CreateCategory";
}

pub fn create_category_validator() -> Validator<CreateCategory> {
    Validator::new()
        .rule("name", |r: &CreateCategory| rules::not_blank(&r.name))
        .rule("name", |r: &CreateCategory| {
            rules::max_chars(r.name.trim(), MAX_NAME_CHARS)
        })
}

/// Looks a category up by UUID or, when the value is not one, by slug.
#[derive(Debug, Clone)]
pub struct GetCategory {
    pub id_or_slug: String,
}

impl Request for GetCategory {
    type Response = Category;
    type Error = ShopError;
    const NAME: &'static str = "GetCategory";
}

#[derive(Debug, Clone, Default)]
pub struct ListCategories;

impl Request for ListCategories {
    type Response = Vec<Category>;
    type Error = ShopError;
    const NAME: &'static str = "ListCategories";
}

/// Resolves `id_or_slug` against the store.
///
/// A value that parses as a UUID is tried as an id first and then as a
/// slug, since a category named like a UUID gets that slug.
pub(crate) async fn resolve_category(uow: &UnitOfWork, id_or_slug: &str) -> ShopResult<Category> {
    if let Ok(id) = Uuid::parse_str(id_or_slug) {
        if let Some(category) = uow.category(id).await? {
            return Ok(category);
        }
    }
    uow.category_by_slug(&id_or_slug.to_lowercase())
        .await?
        .ok_or_else(|| ShopError::not_found("category", id_or_slug))
}

pub struct CreateCategoryHandler {
    context: ShopContext,
}

impl CreateCategoryHandler {
    pub fn new(context: ShopContext) -> Self {
        Self { context }
    }
}

#[async_trait]
impl RequestHandler<CreateCategory> for CreateCategoryHandler {
    #[instrument(skip(self, cancel), fields(name = %request.name))]
    async fn handle(
        &self,
        request: CreateCategory,
        cancel: &CancellationToken,
    ) -> ShopResult<Category> {
        let mut uow = self.context.begin(cancel);
        let name = request.name.trim().to_string();

        if uow.category_by_name(&name).await?.is_some() {
            return Err(ShopError::CategoryExists(name));
        }

        let mut category = Category::new(&name);
        if uow.category_by_slug(&category.slug).await?.is_some() {
            category.disambiguate_slug();
        }

        uow.stage(Change::InsertCategory(category.clone()));
        // A concurrent insert of the same name loses here.
        uow.save_changes().await.map_err(|e| match e {
            PersistenceError::UniqueViolation(_) => ShopError::CategoryExists(name),
            other => other.into(),
        })?;

        info!(category_id = %category.id, slug = %category.slug, "Created category");
        Ok(category)
    }
}

pub struct GetCategoryHandler {
    context: ShopContext,
}

impl GetCategoryHandler {
    pub fn new(context: ShopContext) -> Self {
        Self { context }
    }
}

#[async_trait]
impl RequestHandler<GetCategory> for GetCategoryHandler {
    async fn handle(&self, request: GetCategory, cancel: &CancellationToken) -> ShopResult<Category> {
        let uow = self.context.begin(cancel);
        resolve_category(&uow, &request.id_or_slug).await
    }
}

pub struct ListCategoriesHandler {
    context: ShopContext,
}

impl ListCategoriesHandler {
    pub fn new(context: ShopContext) -> Self {
        Self { context }
    }
}

#[async_trait]
impl RequestHandler<ListCategories> for ListCategoriesHandler {
    async fn handle(
        &self,
        _request: ListCategories,
        cancel: &CancellationToken,
    ) -> ShopResult<Vec<Category>> {
        Ok(self.context.begin(cancel).categories().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::shop;

    #[tokio::test]
    async fn test_create_category() {
        let shop = shop();
        let category = shop
            .send(CreateCategory {
                name: " Electronics ".into(),
            })
            .await
            .unwrap();

        assert_eq!(category.name, "Electronics");
        assert_eq!(category.slug, "electronics");
    }

    #[tokio::test]
    async fn test_duplicate_name_is_case_insensitive() {
        let shop = shop();
        shop.send(CreateCategory {
            name: "Electronics".into(),
        })
        .await
        .unwrap();

        let err = shop
            .send(CreateCategory {
                name: "ELECTRONICS".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ShopError::CategoryExists(_)));
    }

    #[tokio::test]
    async fn test_blank_and_long_names_are_rejected() {
        let shop = shop();
        let long = "x".repeat(MAX_NAME_CHARS + 1);

        for name in ["", "   ", long.as_str()] {
            let err = shop
                .send(CreateCategory {
                    name: name.to_string(),
                })
                .await
                .unwrap_err();
            let ShopError::Validation(errors) = err else {
                panic!("expected validation error for {name:?}");
            };
            assert!(errors.field_errors().contains_key("name"));
        }
    }

    #[tokio::test]
    async fn test_name_limit_counts_chars_before_lowercasing() {
        let shop = shop();
        let name = "İ".repeat(MAX_NAME_CHARS);

        let category = shop.send(CreateCategory { name: name.clone() }).await.unwrap();

        assert_eq!(category.name, name);
        assert_eq!(category.slug, category.id.simple().to_string());
    }

    #[tokio::test]
    async fn test_colliding_slug_is_disambiguated() {
        let shop = shop();
        let first = shop.send(CreateCategory { name: "C".into() }).await.unwrap();
        let second = shop.send(CreateCategory { name: "C++".into() }).await.unwrap();

        assert_eq!(first.slug, "c");
        assert_ne!(second.slug, first.slug);
        assert!(second.slug.starts_with("c-"));
    }

    #[tokio::test]
    async fn test_uuid_shaped_slug_is_reachable() {
        let shop = shop();
        let odd = shop
            .send(CreateCategory {
                name: "550e8400-e29b-41d4-a716-446655440000".into(),
            })
            .await
            .unwrap();
        assert_eq!(odd.slug, "550e8400-e29b-41d4-a716-446655440000");

        let by_slug = shop
            .send(GetCategory {
                id_or_slug: odd.slug.clone(),
            })
            .await
            .unwrap();
        assert_eq!(by_slug, odd);

        let by_id = shop
            .send(GetCategory {
                id_or_slug: odd.id.to_string(),
            })
            .await
            .unwrap();
        assert_eq!(by_id, odd);
    }

    #[tokio::test]
    async fn test_get_by_id_or_slug_and_list() {
        let shop = shop();
        let books = shop
            .send(CreateCategory {
                name: "Books".into(),
            })
            .await
            .unwrap();
        shop.send(CreateCategory {
            name: "Art".into(),
        })
        .await
        .unwrap();

        let by_id = shop
            .send(GetCategory {
                id_or_slug: books.id.to_string(),
            })
            .await
            .unwrap();
        let by_slug = shop
            .send(GetCategory {
                id_or_slug: "BOOKS".into(),
            })
            .await
            .unwrap();
        assert_eq!(by_id, books);
        assert_eq!(by_slug, books);

        let missing = shop
            .send(GetCategory {
                id_or_slug: "toys".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(missing, ShopError::NotFound { .. }));

        let names: Vec<String> = shop
            .send(ListCategories)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Art", "Books"]);
    }
}
