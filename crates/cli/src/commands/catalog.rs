//! Catalog commands.
//!
//! # Usage
//!
//! ```bash
//! katcakes catalog list --category cake
//! katcakes catalog show 2
//! katcakes catalog export -f catalog.yaml
//! ```
//!
//! A catalog file is a YAML list of products in the same shape `export`
//! writes, so the exported file is the easiest starting point for edits.

use std::path::Path;

use katcakes_core::{CatalogItem, Category, ProductId};
use katcakes_storefront::catalog::{CatalogLookup, StaticCatalog};
use katcakes_storefront::error::{AppError, Result};

use super::{Context, print_json};

/// Read a catalog file.
///
/// # Errors
///
/// Returns `AppError::BadRequest` if the file cannot be read, is not a list
/// of products, or repeats a product id.
pub fn load(path: &Path) -> Result<StaticCatalog> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| AppError::BadRequest(format!("cannot read {}: {e}", path.display())))?;
    let items: Vec<CatalogItem> = serde_yaml::from_str(&content)
        .map_err(|e| AppError::BadRequest(format!("invalid catalog {}: {e}", path.display())))?;

    for (index, item) in items.iter().enumerate() {
        if items.iter().skip(index + 1).any(|other| other.id == item.id) {
            return Err(AppError::BadRequest(format!(
                "duplicate product id {} in {}",
                item.id,
                path.display()
            )));
        }
    }

    tracing::info!(path = %path.display(), products = items.len(), "loaded catalog file");
    Ok(StaticCatalog::new(items))
}

/// List products, optionally restricted to one category.
pub fn list(ctx: &Context, category: Option<Category>) -> Result<()> {
    let items = match category {
        Some(category) => ctx.catalog.get_by_category(category),
        None => ctx.catalog.all().to_vec(),
    };
    print_items(ctx, &items)
}

/// List featured products.
pub fn featured(ctx: &Context) -> Result<()> {
    print_items(ctx, &ctx.catalog.get_featured())
}

/// Show one product.
pub fn show(ctx: &Context, id: &str) -> Result<()> {
    let item = ctx
        .catalog
        .get_by_id(&ProductId::new(id))
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    if ctx.json {
        return print_json(&item);
    }
    println!("{}", format_item(&item));
    println!("    {}", item.description);
    if let Some(details) = &item.details {
        if let Some(size) = details.size {
            println!("    tamanho: {size}");
        }
        if let Some(flavor) = &details.flavor {
            println!("    sabor: {flavor}");
        }
        if let Some(filling) = &details.filling {
            println!("    recheio: {filling}");
        }
    }
    Ok(())
}

/// Write the catalog to a YAML file.
pub fn export(ctx: &Context, file: &Path) -> Result<()> {
    let yaml = serde_yaml::to_string(ctx.catalog.all())
        .map_err(|e| AppError::Internal(format!("failed to encode catalog: {e}")))?;
    std::fs::write(file, yaml)
        .map_err(|e| AppError::BadRequest(format!("cannot write {}: {e}", file.display())))?;

    tracing::info!(path = %file.display(), products = ctx.catalog.all().len(), "catalog exported");
    Ok(())
}

fn print_items(ctx: &Context, items: &[CatalogItem]) -> Result<()> {
    if ctx.json {
        return print_json(items);
    }
    for item in items {
        println!("{}", format_item(item));
    }
    Ok(())
}

fn format_item(item: &CatalogItem) -> String {
    let star = if item.featured { " *" } else { "" };
    format!(
        "{:>3}  {:<8} {:<28} {:>10}{star}",
        item.id.as_str(),
        item.category.as_str(),
        item.name,
        item.price.to_string()
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_exported_catalog_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.yaml");
        let bakery = StaticCatalog::bakery();

        let yaml = serde_yaml::to_string(bakery.all()).unwrap();
        std::fs::write(&path, yaml).unwrap();

        let loaded = load(&path).unwrap();
        assert_eq!(loaded.all(), bakery.all());
    }

    #[test]
    fn test_catalog_file_with_duplicate_ids_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.yaml");
        let item = StaticCatalog::bakery().all()[0].clone();
        std::fs::write(&path, serde_yaml::to_string(&[item.clone(), item]).unwrap()).unwrap();

        let err = load(&path).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(msg) if msg.contains("duplicate product id")));
    }

    #[test]
    fn test_missing_catalog_file() {
        let err = load(Path::new("/nonexistent/catalog.yaml")).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn test_format_marks_featured_products() {
        let catalog = StaticCatalog::bakery();
        let featured = &catalog.get_featured()[0];
        assert!(format_item(featured).ends_with(" *"));
        assert!(format_item(featured).contains(&featured.name));
    }
}
