//! Several tabs sharing one storage document.
//!
//! Run with: cargo test -p katcakes-integration-tests

#![allow(clippy::unwrap_used)]

use katcakes_core::ProductId;
use katcakes_integration_tests::TestContext;
use katcakes_storefront::catalog::CatalogLookup;
use katcakes_storefront::orders::CupcakeDraft;
use katcakes_storefront::storage::{DurableStorage, keys};

fn product(ctx: &TestContext, id: &str) -> katcakes_core::CatalogItem {
    ctx.catalog.get_by_id(&ProductId::new(id)).unwrap()
}

#[tokio::test]
async fn test_quantity_change_in_one_tab_reprices_in_the_other() {
    let ctx = TestContext::new();
    let mut first = ctx.open_cart();
    let mut second = ctx.open_cart();
    let mut badge = first.subscribe();

    let order = ctx
        .order_desk()
        .submit(&CupcakeDraft::new(), &mut first, None)
        .await
        .unwrap();
    assert!(second.sync());
    assert_eq!(second.total(), order.price());

    assert!(second.set_quantity(order.id(), 12));
    assert!(first.sync());
    assert_eq!(first.item_count(), 12);
    assert_eq!(first.total(), order.unit_price().times(12));

    // One snapshot for the local submit, one for the synced change.
    assert_eq!(badge.try_recv().unwrap().item_count, 6);
    assert_eq!(badge.try_recv().unwrap().item_count, 12);
    assert!(badge.try_recv().is_err());
}

#[test]
fn test_last_write_wins_between_tabs() {
    let ctx = TestContext::new();
    let mut first = ctx.open_cart();
    let mut second = ctx.open_cart();

    first.add_catalog_item(&product(&ctx, "1"));
    second.add_catalog_item(&product(&ctx, "2"));

    assert!(first.sync());
    assert_eq!(first.entries(), second.entries());
    assert_eq!(first.entries().len(), 1);
    assert_eq!(first.entries()[0].name(), product(&ctx, "2").name);
}

#[tokio::test]
async fn test_reopened_tab_restores_custom_orders() {
    let ctx = TestContext::new();
    let mut cart = ctx.open_cart();
    let mut cupcakes = CupcakeDraft::new();
    cupcakes.set_quantity(24);
    let order = ctx
        .order_desk()
        .submit(&cupcakes, &mut cart, None)
        .await
        .unwrap();
    drop(cart);

    let reopened = ctx.open_cart();
    let entry = reopened.get(order.id()).unwrap();
    assert_eq!(entry.quantity(), 24);
    assert_eq!(entry.line_total(), order.price());

    let stored = ctx.storage.get(keys::CART).unwrap().unwrap();
    let json: serde_json::Value = serde_json::from_str(&stored).unwrap();
    assert_eq!(json[0]["kind"], "custom");
}

#[test]
fn test_corrupt_snapshot_from_another_writer_is_ignored() {
    let ctx = TestContext::new();
    let mut cart = ctx.open_cart();
    cart.add_catalog_item(&product(&ctx, "3"));

    ctx.storage.set(keys::CART, "{not json").unwrap();
    assert!(!cart.sync());
    assert_eq!(cart.item_count(), 1);

    assert!(ctx.open_cart().is_empty());
}
