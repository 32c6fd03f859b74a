//! Cart commands.
//!
//! # Usage
//!
//! ```bash
//! katcakes cart add 3 -n 2
//! katcakes cart quantity <entry-id> 4
//! katcakes cart show --json
//! ```
//!
//! # Environment Variables
//!
//! - `KATCAKES_STORAGE_PATH` - Storage document shared with the storefront
//!
//! # Checkout
//!
//! `checkout` only previews the summary. The CLI cannot reach the account
//! service, so it trusts the customer id stored on the document instead of
//! restoring the session; placing the order is left to the storefront, which
//! verifies the session first.

use katcakes_core::{EntryId, ProductId};
use katcakes_storefront::cart::{CartEntry, CartStore};
use katcakes_storefront::catalog::CatalogLookup;
use katcakes_storefront::error::{AppError, Result};

use super::{Context, print_json};

/// Show the cart lines and total.
pub fn show(ctx: &Context) -> Result<()> {
    print_cart(ctx, &ctx.cart())
}

/// Add `count` units of a catalog product.
///
/// # Errors
///
/// Returns `AppError::NotFound` if the product is not in the catalog, and
/// `AppError::BadRequest` if the count is zero or the product id is already
/// used by a custom order line.
pub fn add(ctx: &Context, product_id: &str, count: u32) -> Result<()> {
    let item = ctx
        .catalog
        .get_by_id(&ProductId::new(product_id))
        .ok_or_else(|| AppError::NotFound(format!("product {product_id}")))?;

    let mut cart = ctx.cart();
    if !cart.add_catalog_items(&item, count) {
        return Err(AppError::BadRequest(format!(
            "cannot add {count} x product {product_id} to the cart"
        )));
    }
    print_cart(ctx, &cart)
}

/// Remove a line.
///
/// # Errors
///
/// Returns `AppError::NotFound` if no line has the id.
pub fn remove(ctx: &Context, entry_id: &str) -> Result<()> {
    let mut cart = ctx.cart();
    if !cart.remove_entry(&EntryId::new(entry_id)) {
        return Err(AppError::NotFound(format!("cart entry {entry_id}")));
    }
    print_cart(ctx, &cart)
}

/// Change the quantity of a line.
///
/// # Errors
///
/// Returns `AppError::NotFound` if no line has the id, and
/// `AppError::BadRequest` if the quantity is outside what the line allows.
pub fn set_quantity(ctx: &Context, entry_id: &str, quantity: u32) -> Result<()> {
    let mut cart = ctx.cart();
    let id = EntryId::new(entry_id);
    if cart.get(&id).is_none() {
        return Err(AppError::NotFound(format!("cart entry {entry_id}")));
    }
    if !cart.set_quantity(&id, quantity) {
        return Err(AppError::BadRequest(format!(
            "quantity {quantity} is not allowed for entry {entry_id}"
        )));
    }
    print_cart(ctx, &cart)
}

/// Empty the cart.
pub fn clear(ctx: &Context) -> Result<()> {
    let mut cart = ctx.cart();
    cart.clear();
    tracing::info!("cart cleared");
    Ok(())
}

/// Preview the checkout summary for the customer id stored on this storage
/// document. The id is not verified; see the module docs.
///
/// # Errors
///
/// Returns `AppError::Checkout` when nobody is signed in or the cart is empty.
pub fn checkout(ctx: &Context) -> Result<()> {
    let user = ctx.session_user()?;
    let summary = ctx.cart().checkout_summary(user.as_ref())?;

    if ctx.json {
        return print_json(&summary);
    }
    println!("Cliente: {}", summary.user_id);
    for line in &summary.lines {
        println!(
            "  {:<30} x{:<3} {:>12}{}",
            line.name,
            line.quantity,
            line.line_total.to_string(),
            quote_marker(line.quote_pending)
        );
    }
    println!("Total ({} itens): {}", summary.item_count, summary.total);
    if summary.awaiting_quote {
        println!("O total inclui valores provisórios; enviaremos um orçamento.");
    }
    Ok(())
}

fn print_cart(ctx: &Context, cart: &CartStore) -> Result<()> {
    if ctx.json {
        return print_json(cart.entries());
    }
    if cart.is_empty() {
        println!("O seu carrinho está vazio");
        return Ok(());
    }
    for entry in cart.entries() {
        println!("{}", format_entry(entry));
    }
    println!("Total ({} itens): {}", cart.item_count(), cart.total());
    Ok(())
}

fn format_entry(entry: &CartEntry) -> String {
    format!(
        "{}  {:<30} {:>3} x {:>10} = {:>12}{}",
        entry.id(),
        entry.name(),
        entry.quantity(),
        entry.unit_price().to_string(),
        entry.line_total().to_string(),
        quote_marker(entry.quote_pending())
    )
}

const fn quote_marker(pending: bool) -> &'static str {
    if pending { " (aguarda orçamento)" } else { "" }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use katcakes_core::Price;
    use katcakes_storefront::catalog::StaticCatalog;
    use katcakes_storefront::config::StorefrontConfig;
    use katcakes_storefront::storage::{DurableStorage, keys};

    use super::*;

    fn context(dir: &tempfile::TempDir) -> Context {
        let config = StorefrontConfig {
            storage_path: dir.path().join("storage.json"),
            ..StorefrontConfig::default()
        };
        Context::open(&config, None, false).unwrap()
    }

    #[test]
    fn test_cart_survives_between_invocations() {
        let dir = tempfile::tempdir().unwrap();

        add(&context(&dir), "3", 2).unwrap();
        add(&context(&dir), "3", 1).unwrap();

        let cart = context(&dir).cart();
        assert_eq!(cart.entries().len(), 1);
        assert_eq!(cart.item_count(), 3);
        let unit = StaticCatalog::bakery()
            .get_by_id(&ProductId::new("3"))
            .unwrap()
            .price;
        assert_eq!(cart.total(), unit.times(3));
    }

    #[test]
    fn test_unknown_product_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = add(&context(&dir), "99", 1).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn test_catalog_id_clashing_with_custom_line_is_refused() {
        use katcakes_core::CatalogItem;
        use katcakes_storefront::orders::{CupcakeDraft, add_to_cart};

        let dir = tempfile::tempdir().unwrap();
        let order = add_to_cart(&CupcakeDraft::new(), &mut context(&dir).cart()).unwrap();

        let mut clash: CatalogItem = StaticCatalog::bakery().all()[0].clone();
        clash.id = ProductId::new(order.id().as_str());
        let catalog_path = dir.path().join("catalog.yaml");
        std::fs::write(&catalog_path, serde_yaml::to_string(&[clash]).unwrap()).unwrap();

        let config = StorefrontConfig {
            storage_path: dir.path().join("storage.json"),
            ..StorefrontConfig::default()
        };
        let ctx = Context::open(&config, Some(&catalog_path), false).unwrap();
        let err = add(&ctx, order.id().as_str(), 1).unwrap_err();

        assert!(matches!(err, AppError::BadRequest(_)));
        assert_eq!(ctx.cart().entries().len(), 1);
        assert_eq!(ctx.cart().total(), order.price());
    }

    #[test]
    fn test_quantity_and_remove_need_an_existing_line() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(&dir);
        assert!(matches!(
            set_quantity(&ctx, "missing", 2).unwrap_err(),
            AppError::NotFound(_)
        ));
        assert!(matches!(
            remove(&ctx, "missing").unwrap_err(),
            AppError::NotFound(_)
        ));
    }

    #[test]
    fn test_quantity_zero_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(&dir);
        add(&ctx, "1", 1).unwrap();
        let id = ctx.cart().entries()[0].id();

        assert!(matches!(
            set_quantity(&ctx, id.as_str(), 0).unwrap_err(),
            AppError::BadRequest(_)
        ));
        assert_eq!(ctx.cart().item_count(), 1);

        remove(&ctx, id.as_str()).unwrap();
        assert!(ctx.cart().is_empty());
        assert_eq!(ctx.cart().total(), Price::ZERO);
    }

    #[test]
    fn test_checkout_needs_a_session() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(&dir);
        add(&ctx, "1", 1).unwrap();
        assert!(matches!(
            checkout(&ctx).unwrap_err(),
            AppError::Checkout(_)
        ));

        ctx.storage.set(keys::SESSION_USER_ID, "user-1").unwrap();
        checkout(&ctx).unwrap();
    }

    #[test]
    fn test_quote_marker() {
        assert_eq!(quote_marker(false), "");
        assert!(quote_marker(true).contains("orçamento"));
    }
}
