//! Seed the catalog from a YAML file.
//!
//! ```bash
//! ec-cli seed catalog.seed.yaml
//! ```
//!
//! Products reference categories by slug:
//!
//! ```yaml
//! categories:
//!   - name: Women
//!     slug: women
//!     children:
//!       - { name: Dresses, slug: dresses }
//! products:
//!   - name: Linen Wrap Dress
//!     slug: linen-wrap-dress
//!     price: 4500
//!     category: women
//!     subCategory: dresses
//! colors:
//!   - { name: Red, hex: "#C0392B" }
//! ```
//!
//! Every document goes through the same validation as an admin write.
//! Categories and products are matched by slug, so re-running a seed
//! updates them in place. FAQs, colors and sizes are only seeded into an
//! empty collection. Settings singletons are overwritten when present.

use std::collections::HashMap;
use std::path::Path;

use elegant_closet_admin::services::documents::{self, DocumentError, Managed};
use elegant_closet_core::models::{
    About, Category, ColorOption, ContactSettings, Faq, HeroSettings, Product, SizeOption,
};
use elegant_closet_core::store::{
    Document, DocumentStore, IndexRegistry, PgDocumentStore, Query, StoreError, query_documents,
    save_singleton,
};
use elegant_closet_core::types::CategoryId;
use elegant_closet_core::validation::ValidationErrors;
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("{0}")]
    MissingEnvVar(&'static str),

    #[error("Failed to read seed file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid seed file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("{context}: {source}")]
    Document {
        context: String,
        source: DocumentError,
    },

    #[error("{context}: {source}")]
    Validation {
        context: &'static str,
        source: ValidationErrors,
    },

    #[error("product {product} references unknown category {slug}")]
    UnknownCategory { product: String, slug: String },
}

/// A top-level category with its sub-categories.
#[derive(Debug, Deserialize)]
pub struct SeedCategory {
    #[serde(flatten)]
    pub category: Category,
    #[serde(default)]
    pub children: Vec<Category>,
}

/// A product whose categories are given by slug.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedProduct {
    #[serde(flatten)]
    pub product: Product,
    pub category: String,
    #[serde(default)]
    pub sub_category: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SeedFile {
    #[serde(default)]
    pub categories: Vec<SeedCategory>,
    #[serde(default)]
    pub products: Vec<SeedProduct>,
    #[serde(default)]
    pub faqs: Vec<Faq>,
    #[serde(default)]
    pub colors: Vec<ColorOption>,
    #[serde(default)]
    pub sizes: Vec<SizeOption>,
    #[serde(default)]
    pub hero: Option<HeroSettings>,
    #[serde(default)]
    pub contact: Option<ContactSettings>,
    #[serde(default)]
    pub about: Option<About>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
    pub settings: usize,
}

fn doc_error(collection: &str, label: &str) -> impl FnOnce(DocumentError) -> SeedError {
    let context = format!("{collection} {label}");
    move |source| SeedError::Document { context, source }
}

/// Create `doc`, or overwrite the document that already has its slug.
async fn upsert_by_slug<T: Managed, S: DocumentStore>(
    store: &S,
    doc: T,
    report: &mut SeedReport,
) -> Result<T, SeedError> {
    let slug = doc.unique_slug().unwrap_or_default().to_string();
    let on_error = doc_error(T::COLLECTION, &slug);
    let query = Query::new(T::COLLECTION).where_eq("slug", slug.as_str()).limit(1);
    let existing = store.query(&query).await?;

    let saved = match existing.first() {
        Some(found) => {
            report.updated += 1;
            documents::update(store, &found.id, doc).await
        }
        None => {
            report.created += 1;
            documents::create(store, doc).await
        }
    };
    saved.map_err(on_error)
}

/// Create every document, but only into an empty collection.
async fn seed_if_empty<T: Managed, S: DocumentStore>(
    store: &S,
    docs: Vec<T>,
    report: &mut SeedReport,
) -> Result<(), SeedError> {
    if docs.is_empty() {
        return Ok(());
    }
    if !store.query(&Query::new(T::COLLECTION).limit(1)).await?.is_empty() {
        info!(collection = T::COLLECTION, count = docs.len(), "Collection not empty, skipping");
        report.skipped += docs.len();
        return Ok(());
    }
    for (i, doc) in docs.into_iter().enumerate() {
        documents::create(store, doc)
            .await
            .map_err(doc_error(T::COLLECTION, &format!("#{}", i + 1)))?;
        report.created += 1;
    }
    Ok(())
}

/// Write a parsed seed file into `store`.
///
/// # Errors
///
/// Stops at the first invalid document. Documents written before it stay.
pub async fn seed_into<S: DocumentStore>(
    store: &S,
    file: SeedFile,
) -> Result<SeedReport, SeedError> {
    let mut report = SeedReport::default();

    for entry in file.categories {
        let parent = upsert_by_slug(store, entry.category, &mut report).await?;
        for mut child in entry.children {
            child.parent_id = Some(parent.id.clone());
            upsert_by_slug(store, child, &mut report).await?;
        }
    }

    let by_slug: HashMap<String, CategoryId> =
        query_documents::<Category, S>(store, &Query::new(Category::COLLECTION))
            .await?
            .into_iter()
            .map(|c| (c.slug, c.id))
            .collect();
    let resolve = |product: &str, slug: &str| {
        by_slug
            .get(slug)
            .cloned()
            .ok_or_else(|| SeedError::UnknownCategory {
                product: product.to_string(),
                slug: slug.to_string(),
            })
    };

    for entry in file.products {
        let mut product = entry.product;
        product.category_id = resolve(&product.slug, &entry.category)?;
        product.sub_category_id = entry
            .sub_category
            .as_deref()
            .map(|slug| resolve(&product.slug, slug))
            .transpose()?;
        upsert_by_slug(store, product, &mut report).await?;
    }

    seed_if_empty(store, file.faqs, &mut report).await?;
    seed_if_empty(store, file.colors, &mut report).await?;
    seed_if_empty(store, file.sizes, &mut report).await?;

    if let Some(hero) = file.hero {
        hero.validate()
            .map_err(|source| SeedError::Validation { context: "hero", source })?;
        save_singleton(store, &hero).await?;
        report.settings += 1;
    }
    if let Some(contact) = file.contact {
        contact
            .validate()
            .map_err(|source| SeedError::Validation { context: "contact", source })?;
        save_singleton(store, &contact).await?;
        report.settings += 1;
    }
    if let Some(about) = file.about {
        about
            .validate()
            .map_err(|source| SeedError::Validation { context: "about", source })?;
        save_singleton(store, &about).await?;
        report.settings += 1;
    }

    Ok(report)
}

/// Seed the database from a YAML file.
///
/// # Errors
///
/// Returns an error if the file is unreadable or invalid, or a write fails.
pub async fn run(path: &Path) -> Result<SeedReport, SeedError> {
    info!(path = %path.display(), "Loading seed file");
    let content = tokio::fs::read_to_string(path).await?;
    let file: SeedFile = serde_yaml::from_str(&content)?;

    let database_url = super::database_url().map_err(SeedError::MissingEnvVar)?;
    let pool = elegant_closet_admin::db::create_pool(&database_url).await?;
    info!("Connected to database");

    // Seeding only runs equality queries, which need no composite index
    let store = PgDocumentStore::new(pool, IndexRegistry::default());
    let report = seed_into(&store, file).await?;

    info!(
        created = report.created,
        updated = report.updated,
        skipped = report.skipped,
        settings = report.settings,
        "Seeding complete"
    );
    Ok(report)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use elegant_closet_core::store::{InMemoryStore, get_singleton};

    use super::*;

    const SEED: &str = r##"
categories:
  - name: Women
    slug: women
    children:
      - name: Dresses
        slug: dresses
products:
  - name: Linen Wrap Dress
    slug: linen-wrap-dress
    price: 4500
    salePrice: 3600
    colors: [Red, Navy]
    sizes: [S, M]
    status: published
    category: women
    subCategory: dresses
faqs:
  - question: Do you deliver islandwide?
    answer: Yes, within 3-5 working days.
colors:
  - name: Red
    hex: "#C0392B"
about:
  title: Our Story
"##;

    fn parse(yaml: &str) -> SeedFile {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[tokio::test]
    async fn test_seed_resolves_categories_by_slug() {
        let store = InMemoryStore::default();
        let report = seed_into(&store, parse(SEED)).await.unwrap();
        assert_eq!(report.created, 5);
        assert_eq!(report.settings, 1);

        let products: Vec<Product> =
            query_documents(&store, &Query::new(Product::COLLECTION)).await.unwrap();
        let categories: Vec<Category> =
            query_documents(&store, &Query::new(Category::COLLECTION)).await.unwrap();
        let women = categories.iter().find(|c| c.slug == "women").unwrap();
        let dresses = categories.iter().find(|c| c.slug == "dresses").unwrap();
        assert_eq!(dresses.parent_id.as_ref(), Some(&women.id));
        assert_eq!(products[0].category_id, women.id);
        assert_eq!(products[0].sub_category_id.as_ref(), Some(&dresses.id));

        let about: About = get_singleton(&store).await.unwrap();
        assert_eq!(about.title, "Our Story");
    }

    #[tokio::test]
    async fn test_reseed_updates_in_place() {
        let store = InMemoryStore::default();
        seed_into(&store, parse(SEED)).await.unwrap();
        let report = seed_into(&store, parse(SEED)).await.unwrap();
        assert_eq!(report.created, 0);
        assert_eq!(report.updated, 3);
        assert_eq!(report.skipped, 2);
        assert_eq!(store.count(Product::COLLECTION), 1);
        assert_eq!(store.count(Category::COLLECTION), 2);
    }

    #[tokio::test]
    async fn test_unknown_category_stops_the_seed() {
        let store = InMemoryStore::default();
        let file = parse(
            r"
products:
  - name: Wrap
    slug: wrap
    price: 100
    category: nowhere
",
        );
        assert!(matches!(
            seed_into(&store, file).await,
            Err(SeedError::UnknownCategory { ref slug, .. }) if slug == "nowhere"
        ));
    }

    #[tokio::test]
    async fn test_invalid_product_names_the_slug() {
        let store = InMemoryStore::default();
        let file = parse(
            r"
categories:
  - { name: Women, slug: women }
products:
  - name: Wrap
    slug: wrap
    price: 100
    salePrice: 150
    category: women
",
        );
        let err = seed_into(&store, file).await.unwrap_err();
        assert!(err.to_string().starts_with("products wrap"));
    }
}
