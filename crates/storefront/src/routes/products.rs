//! Product route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, Query, State};
use elegant_closet_core::catalog::{CategoryTree, whatsapp};
use elegant_closet_core::models::{Category, Product};
use serde::Deserialize;
use tracing::instrument;

use super::listing::ListingParams;
use super::{chrome, parse_currency, whatsapp_number};
use crate::error::{AppError, Result};
use crate::filters;
use crate::state::AppState;
use crate::views::{
    Chrome, FacetOption, MenuLink, PLACEHOLDER_IMAGE, PriceView, ProductCard, SelectOption,
    display_amount, facet_options, sort_options,
};

/// Image display data for templates.
#[derive(Clone)]
pub struct ImageView {
    pub url: String,
    pub alt: String,
}

/// Product listing page, shared by `/products` and `/categories/{slug}`.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ListingTemplate {
    pub chrome: Chrome,
    pub title: String,
    pub description: String,
    /// Path the filter form submits to.
    pub action: String,
    pub breadcrumbs: Vec<MenuLink>,
    pub products: Vec<ProductCard>,
    pub loaded: usize,
    pub sub_categories: Vec<SelectOption>,
    pub colors: Vec<FacetOption>,
    pub sizes: Vec<FacetOption>,
    pub sorts: Vec<SelectOption>,
    pub min: String,
    pub max: String,
    pub price_hint: String,
    pub search: String,
    pub sale_only: bool,
    pub notice: String,
    pub failed: bool,
    pub next_href: String,
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub chrome: Chrome,
    pub breadcrumbs: Vec<MenuLink>,
    pub name: String,
    pub sku: String,
    pub description: String,
    pub price: PriceView,
    pub images: Vec<ImageView>,
    pub colors: Vec<SelectOption>,
    pub sizes: Vec<SelectOption>,
    pub quantity: u32,
    pub in_stock: bool,
    pub order_link: String,
    pub related: Vec<ProductCard>,
}

/// Selections on the product page.
#[derive(Debug, Default, Deserialize)]
pub struct ProductQuery {
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub qty: Option<u32>,
    #[serde(default)]
    pub currency: Option<String>,
}

/// Upper bound for the quantity selector.
const MAX_QUANTITY: u32 = 20;

/// Category path for a product or category page.
pub(super) fn crumbs(categories: &[&Category]) -> Vec<MenuLink> {
    let mut links = vec![MenuLink {
        name: "Shop".to_string(),
        href: "/products".to_string(),
        children: Vec::new(),
    }];
    links.extend(categories.iter().map(|c| MenuLink {
        name: c.name.clone(),
        href: format!("/categories/{}", c.slug),
        children: Vec::new(),
    }));
    links
}

fn options(values: &[String], selected: Option<&str>) -> Vec<SelectOption> {
    values
        .iter()
        .map(|v| SelectOption {
            value: v.clone(),
            label: v.clone(),
            selected: selected == Some(v.as_str()),
        })
        .collect()
}

/// Load and render one listing page.
///
/// `scope` restricts the listing to a category; its children become the
/// sub-category choices.
pub(super) async fn render_listing(
    state: &AppState,
    params: &ListingParams,
    tree: &CategoryTree,
    scope: Option<&Category>,
    action: String,
) -> Result<ListingTemplate> {
    let currency = parse_currency(params.currency.as_deref())?;
    let filters = params.filter_state(tree, scope)?;
    let cursor = params.cursor()?;

    let listing = state.catalog().listing(&filters, cursor).await?;
    let rates = state.catalog().rates().await?;
    let chrome = chrome(state, currency, &rates).await?;

    let (title, description, breadcrumbs) = match scope {
        Some(category) => (
            category.name.clone(),
            category.description.clone().unwrap_or_default(),
            crumbs(&tree.breadcrumbs(category)),
        ),
        None => ("All Products".to_string(), String::new(), crumbs(&[])),
    };

    let sub_categories = filters
        .category
        .as_ref()
        .map(|parent| {
            tree.children_of(parent)
                .into_iter()
                .filter(|c| c.is_active())
                .map(|c| SelectOption {
                    value: c.slug.clone(),
                    label: c.name.clone(),
                    selected: filters.criteria.sub_category.as_ref() == Some(&c.id),
                })
                .collect()
        })
        .unwrap_or_default();

    let price_hint = listing
        .price_bounds
        .map(|range| {
            format!(
                "{} - {}",
                display_amount(range.min, currency, &rates.table),
                display_amount(range.max, currency, &rates.table)
            )
        })
        .unwrap_or_default();

    let next_href = listing
        .next_token
        .as_deref()
        .map(|token| format!("{action}?{}", params.next_page_query(token)))
        .unwrap_or_default();

    Ok(ListingTemplate {
        chrome,
        title,
        description,
        action,
        breadcrumbs,
        products: ProductCard::all(&listing.products, currency, &rates.table),
        loaded: listing.loaded,
        sub_categories,
        colors: facet_options(&listing.facets.colors, &filters.criteria.colors),
        sizes: facet_options(&listing.facets.sizes, &filters.criteria.sizes),
        sorts: sort_options(filters.sort),
        min: params.min.clone().unwrap_or_default(),
        max: params.max.clone().unwrap_or_default(),
        price_hint,
        search: filters.criteria.search.clone().unwrap_or_default(),
        sale_only: filters.criteria.sale_only,
        notice: listing
            .degradation
            .as_ref()
            .map(|d| d.message())
            .unwrap_or_default(),
        failed: listing.state.is_failed(),
        next_href,
    })
}

/// Display the product listing page.
///
/// # Errors
///
/// Returns 400 for malformed filter parameters.
#[instrument(skip(state, params))]
pub async fn index(
    State(state): State<AppState>,
    Query(params): Query<ListingParams>,
) -> Result<ListingTemplate> {
    let tree = state.catalog().categories().await?;
    render_listing(&state, &params, &tree, None, "/products".to_string()).await
}

/// Display the product detail page.
///
/// # Errors
///
/// Returns 404 if no published product has this slug.
#[instrument(skip(state, query))]
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<ProductQuery>,
) -> Result<ProductShowTemplate> {
    let product = state
        .catalog()
        .product_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound(slug.clone()))?;
    state.catalog().record_view(&product.id);

    let currency = parse_currency(query.currency.as_deref())?;
    let rates = state.catalog().rates().await?;
    let chrome = chrome(&state, currency, &rates).await?;
    let tree = state.catalog().categories().await?;
    let related = state.catalog().related(&product).await?;

    let size = query
        .size
        .as_deref()
        .filter(|s| product.sizes.iter().any(|v| v == s));
    let color = query
        .color
        .as_deref()
        .filter(|c| product.colors.iter().any(|v| v == c));
    let quantity = query.qty.unwrap_or(1).clamp(1, MAX_QUANTITY);

    let order_link = whatsapp_number(&state)
        .await?
        .and_then(|number| {
            let line = whatsapp::OrderLine {
                product: &product,
                size,
                color,
                quantity,
            };
            let url = state
                .config()
                .absolute_url(&format!("/products/{}", product.slug));
            whatsapp::deep_link(
                &number,
                &whatsapp::product_message(&line, &url, currency, &rates.table),
            )
        })
        .unwrap_or_default();

    Ok(ProductShowTemplate {
        chrome,
        breadcrumbs: crumbs(&product_path(&tree, &product)),
        name: product.name.clone(),
        sku: product.sku.clone(),
        description: product.description.clone(),
        price: PriceView::new(&product, currency, &rates.table),
        images: images(&product),
        colors: options(&product.colors, color),
        sizes: options(&product.sizes, size),
        quantity,
        in_stock: product.in_stock,
        order_link,
        related: ProductCard::all(&related, currency, &rates.table),
    })
}

fn product_path<'a>(tree: &'a CategoryTree, product: &Product) -> Vec<&'a Category> {
    let category = tree.get(&product.category_id);
    let sub = product.sub_category_id.as_ref().and_then(|id| tree.get(id));
    category.into_iter().chain(sub).collect()
}

fn images(product: &Product) -> Vec<ImageView> {
    let images: Vec<ImageView> = product
        .ordered_images()
        .into_iter()
        .map(|img| ImageView {
            url: img.url.clone(),
            alt: if img.alt.is_empty() {
                product.name.clone()
            } else {
                img.alt.clone()
            },
        })
        .collect();
    if images.is_empty() {
        vec![ImageView {
            url: PLACEHOLDER_IMAGE.to_string(),
            alt: product.name.clone(),
        }]
    } else {
        images
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use elegant_closet_core::models::ProductImage;
    use elegant_closet_core::types::CategoryId;

    use super::*;

    #[test]
    fn test_product_path_and_crumbs() {
        let tree = CategoryTree::new(vec![
            Category {
                id: CategoryId::new("dresses"),
                name: "Dresses".to_string(),
                slug: "dresses".to_string(),
                ..Category::default()
            },
            Category {
                id: CategoryId::new("maxi"),
                name: "Maxi".to_string(),
                slug: "maxi".to_string(),
                parent_id: Some(CategoryId::new("dresses")),
                ..Category::default()
            },
        ]);
        let product = Product {
            category_id: CategoryId::new("dresses"),
            sub_category_id: Some(CategoryId::new("maxi")),
            ..Product::default()
        };
        let links = crumbs(&product_path(&tree, &product));
        let hrefs: Vec<&str> = links.iter().map(|l| l.href.as_str()).collect();
        assert_eq!(hrefs, ["/products", "/categories/dresses", "/categories/maxi"]);
    }

    #[test]
    fn test_images_fall_back_to_placeholder() {
        let mut product = Product {
            name: "Silk Scarf".to_string(),
            ..Product::default()
        };
        assert_eq!(images(&product)[0].url, PLACEHOLDER_IMAGE);

        product.images.push(ProductImage {
            url: "https://i.ibb.co/scarf.jpg".to_string(),
            alt: String::new(),
            order: 0,
        });
        let views = images(&product);
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].alt, "Silk Scarf");
    }

    #[test]
    fn test_options_mark_only_known_selection() {
        let sizes = vec!["S".to_string(), "M".to_string()];
        let opts = options(&sizes, Some("M"));
        assert!(!opts[0].selected);
        assert!(opts[1].selected);
        assert!(options(&sizes, None).iter().all(|o| !o.selected));
    }
}
