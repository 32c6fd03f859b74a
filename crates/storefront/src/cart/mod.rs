//! Shopping cart.
//!
//! [`CartStore`] is the single source of truth for what the shopper intends
//! to buy. The entry list is kept in insertion order and written to durable
//! storage as a whole after every mutation. Two kinds of observers are
//! notified:
//!
//! - in-tab subscribers (e.g. a header badge) receive a [`CartSnapshot`]
//!   synchronously through [`CartStore::subscribe`]
//! - other stores sharing the same storage see a storage change event and
//!   pick up the new snapshot with [`CartStore::sync`]
//!
//! Cross-tab writes are not merged. The last snapshot written wins.
//!
//! Mutations never fail: invalid quantities and unknown ids are no-ops, and
//! a storage write failure is reported to Sentry while the in-memory cart
//! stays authoritative for the tab.

mod entry;

pub use entry::{CartEntry, CatalogLine};

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::TryRecvError;

use katcakes_core::{CatalogItem, EntryId, Price, UserId};

use crate::error::add_breadcrumb;
use crate::orders::CustomOrder;
use crate::storage::{DurableStorage, StorageError, StorageEvent, keys};

const SNAPSHOT_CHANNEL_CAPACITY: usize = 16;

/// What in-tab observers receive after every change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartSnapshot {
    pub entries: Vec<CartEntry>,
    pub item_count: u32,
    pub total: Price,
}

/// Why a checkout summary could not be produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    #[error("Você precisa estar logado para fazer um pedido")]
    NotLoggedIn,

    #[error("O seu carrinho está vazio")]
    EmptyCart,
}

/// One line of a checkout summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutLine {
    pub id: EntryId,
    pub name: String,
    pub quantity: u32,
    pub unit_price: Price,
    pub line_total: Price,
    pub quote_pending: bool,
}

/// Read-only view of the cart presented before an order is placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSummary {
    pub user_id: UserId,
    pub lines: Vec<CheckoutLine>,
    pub item_count: u32,
    pub total: Price,
    /// Some line carries a placeholder price; the total is provisional.
    pub awaiting_quote: bool,
}

/// The shopping cart of one tab.
pub struct CartStore {
    storage: Arc<dyn DurableStorage>,
    entries: Vec<CartEntry>,
    storage_events: broadcast::Receiver<StorageEvent>,
    snapshots: broadcast::Sender<CartSnapshot>,
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("entries", &self.entries)
            .finish_non_exhaustive()
    }
}

impl CartStore {
    /// Initialise the cart from durable storage.
    ///
    /// A missing, unreadable or corrupt snapshot yields an empty cart.
    #[must_use]
    pub fn load(storage: Arc<dyn DurableStorage>) -> Self {
        let storage_events = storage.subscribe();
        let entries = read_snapshot(storage.as_ref()).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "discarding unreadable cart snapshot");
            Vec::new()
        });
        let (snapshots, _) = broadcast::channel(SNAPSHOT_CHANNEL_CAPACITY);

        tracing::debug!(entries = entries.len(), "cart loaded");
        Self {
            storage,
            entries,
            storage_events,
            snapshots,
        }
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Add one unit of a catalog product. Returns whether it was added.
    pub fn add_catalog_item(&mut self, item: &CatalogItem) -> bool {
        self.add_catalog_items(item, 1)
    }

    /// Add `count` units of a catalog product. Returns whether anything
    /// changed.
    ///
    /// An existing line for the same product is incremented and keeps its
    /// unit price; otherwise a new line is appended. A count of zero is a
    /// no-op, and so is a product whose id is already taken by a custom
    /// order line.
    pub fn add_catalog_items(&mut self, item: &CatalogItem, count: u32) -> bool {
        if count == 0 {
            return false;
        }
        let taken_by_custom = self.entries.iter().any(|entry| {
            matches!(entry, CartEntry::Custom(order) if order.id().as_str() == item.id.as_str())
        });
        if taken_by_custom {
            tracing::warn!(product_id = %item.id, "product id collides with a custom order line");
            return false;
        }

        let existing = self.entries.iter_mut().find_map(|entry| match entry {
            CartEntry::Catalog(line) if line.item.id == item.id => Some(line),
            _ => None,
        });
        match existing {
            Some(line) => line.quantity = line.quantity.saturating_add(count),
            None => self.entries.push(CartEntry::Catalog(CatalogLine {
                item: item.clone(),
                quantity: count,
            })),
        }

        let count = count.to_string();
        add_breadcrumb(
            "cart",
            "Added catalog item",
            Some(&[("product_id", item.id.as_str()), ("count", count.as_str())]),
        );
        self.commit();
        true
    }

    /// Append a custom order as its own line and return the stored copy.
    ///
    /// Custom orders are never merged, even with an identical configuration.
    pub fn add_custom_order(&mut self, mut order: CustomOrder) -> CustomOrder {
        while self.entries.iter().any(|entry| entry.is(order.id())) {
            tracing::warn!(entry_id = %order.id(), "custom order id already in cart, regenerating");
            order.regenerate_id();
        }
        self.entries.push(CartEntry::Custom(order.clone()));

        add_breadcrumb(
            "cart",
            "Added custom order",
            Some(&[
                ("entry_id", order.id().as_str()),
                ("category", order.category().as_str()),
            ]),
        );
        self.commit();
        order
    }

    /// Change the quantity of a line. Returns whether anything changed.
    ///
    /// Quantities below one are ignored. Custom cakes and cupcakes are
    /// repriced from their configuration and rejected outside their
    /// category's bounds; catalog lines and pending quotes keep their unit
    /// price.
    pub fn set_quantity(&mut self, id: &EntryId, quantity: u32) -> bool {
        if quantity < 1 {
            tracing::debug!(entry_id = %id, "ignoring quantity below one");
            return false;
        }
        let Some(entry) = self.entries.iter_mut().find(|entry| entry.is(id)) else {
            return false;
        };

        match entry {
            CartEntry::Catalog(line) => line.quantity = quantity,
            CartEntry::Custom(order) => {
                if let Err(e) = order.set_quantity(quantity) {
                    tracing::debug!(entry_id = %id, error = %e, "quantity rejected");
                    return false;
                }
            }
        }

        let quantity = quantity.to_string();
        add_breadcrumb(
            "cart",
            "Changed quantity",
            Some(&[("entry_id", id.as_str()), ("quantity", quantity.as_str())]),
        );
        self.commit();
        true
    }

    /// Remove a line. Returns whether it was present.
    pub fn remove_entry(&mut self, id: &EntryId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| !entry.is(id));
        if self.entries.len() == before {
            return false;
        }

        add_breadcrumb("cart", "Removed entry", Some(&[("entry_id", id.as_str())]));
        self.commit();
        true
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.entries.clear();
        add_breadcrumb("cart", "Cleared cart", None);
        self.commit();
    }

    /// Apply the latest snapshot written by another store sharing the same
    /// storage. Returns whether the cart changed.
    pub fn sync(&mut self) -> bool {
        let mut stale = false;
        loop {
            match self.storage_events.try_recv() {
                Ok(event) => stale |= event.key == keys::CART,
                Err(TryRecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "storage events lagged");
                    stale = true;
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => break,
            }
        }
        if !stale {
            return false;
        }

        let entries = match read_snapshot(self.storage.as_ref()) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(error = %e, "ignoring unreadable cart snapshot");
                return false;
            }
        };
        if entries == self.entries {
            return false;
        }

        self.entries = entries;
        self.notify();
        true
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Lines in insertion order.
    #[must_use]
    pub fn entries(&self) -> &[CartEntry] {
        &self.entries
    }

    #[must_use]
    pub fn get(&self, id: &EntryId) -> Option<&CartEntry> {
        self.entries.iter().find(|entry| entry.is(id))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of line totals.
    #[must_use]
    pub fn total(&self) -> Price {
        self.entries.iter().map(CartEntry::line_total).sum()
    }

    /// Sum of quantities, as shown on the cart badge.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.entries
            .iter()
            .fold(0_u32, |count, entry| count.saturating_add(entry.quantity()))
    }

    #[must_use]
    pub fn snapshot(&self) -> CartSnapshot {
        CartSnapshot {
            entries: self.entries.clone(),
            item_count: self.item_count(),
            total: self.total(),
        }
    }

    /// Receive a snapshot after every change made through this store.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<CartSnapshot> {
        self.snapshots.subscribe()
    }

    /// Summarise the cart for checkout. Requires a signed-in customer.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::NotLoggedIn` without a session and
    /// `CheckoutError::EmptyCart` when there is nothing to order.
    pub fn checkout_summary(
        &self,
        session: Option<&UserId>,
    ) -> Result<CheckoutSummary, CheckoutError> {
        let user_id = session.ok_or(CheckoutError::NotLoggedIn)?;
        if self.entries.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let lines: Vec<CheckoutLine> = self
            .entries
            .iter()
            .map(|entry| CheckoutLine {
                id: entry.id(),
                name: entry.name(),
                quantity: entry.quantity(),
                unit_price: entry.unit_price(),
                line_total: entry.line_total(),
                quote_pending: entry.quote_pending(),
            })
            .collect();

        Ok(CheckoutSummary {
            user_id: user_id.clone(),
            awaiting_quote: lines.iter().any(|line| line.quote_pending),
            lines,
            item_count: self.item_count(),
            total: self.total(),
        })
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    fn commit(&self) {
        if let Err(e) = self.persist() {
            let event_id = sentry::capture_error(&e);
            tracing::error!(error = %e, sentry_event_id = %event_id, "failed to persist cart");
        }
        self.notify();
    }

    fn persist(&self) -> Result<(), StorageError> {
        let json = serde_json::to_string(&self.entries)?;
        self.storage.set(keys::CART, &json)
    }

    fn notify(&self) {
        // No subscribers is not an error.
        let _ = self.snapshots.send(self.snapshot());
    }
}

fn read_snapshot(storage: &dyn DurableStorage) -> Result<Vec<CartEntry>, StorageError> {
    match storage.get(keys::CART)? {
        Some(json) => Ok(serde_json::from_str(&json)?),
        None => Ok(Vec::new()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use katcakes_core::{CakeSize, ProductId};

    use super::*;
    use crate::catalog::{CatalogLookup, StaticCatalog};
    use crate::orders::{CakeDraft, CupcakeDraft, OrderForm, OtherDraft};
    use crate::storage::MemoryStorage;

    fn item(id: &str) -> CatalogItem {
        StaticCatalog::bakery()
            .get_by_id(&ProductId::new(id))
            .unwrap()
    }

    fn custom(form: &impl OrderForm) -> CustomOrder {
        CustomOrder::from_request(form.validate().unwrap()).unwrap()
    }

    fn cake(size: CakeSize) -> CustomOrder {
        let mut draft = CakeDraft::new();
        draft.set_size(size);
        custom(&draft)
    }

    fn empty_cart() -> (Arc<MemoryStorage>, CartStore) {
        let storage = Arc::new(MemoryStorage::new());
        let cart = CartStore::load(storage.clone());
        (storage, cart)
    }

    #[test]
    fn test_same_catalog_item_merges() {
        let (_, mut cart) = empty_cart();
        let vanilla = item("1");

        cart.add_catalog_item(&vanilla);
        cart.add_catalog_item(&vanilla);

        assert_eq!(cart.entries().len(), 1);
        assert_eq!(cart.entries()[0].quantity(), 2);
        assert_eq!(cart.entries()[0].unit_price(), Price::new(2500));
    }

    #[test]
    fn test_explicit_count_is_added() {
        let (_, mut cart) = empty_cart();
        cart.add_catalog_items(&item("8"), 12);
        cart.add_catalog_items(&item("8"), 3);
        assert!(!cart.add_catalog_items(&item("8"), 0));
        assert_eq!(cart.item_count(), 15);
    }

    #[test]
    fn test_catalog_item_cannot_take_a_custom_line_id() {
        let (storage, mut cart) = empty_cart();
        let order = cart.add_custom_order(cake(CakeSize::Cm20));

        let mut clash = item("1");
        clash.id = ProductId::new(order.id().as_str());
        assert!(!cart.add_catalog_items(&clash, 2));

        assert_eq!(cart.entries().len(), 1);
        assert_eq!(cart.get(order.id()).unwrap().quantity(), 1);
        assert_eq!(CartStore::load(storage).entries(), cart.entries());
    }

    #[test]
    fn test_identical_custom_orders_stay_separate() {
        let (_, mut cart) = empty_cart();
        let a = cart.add_custom_order(cake(CakeSize::Cm20));
        let b = cart.add_custom_order(cake(CakeSize::Cm20));

        assert_eq!(cart.entries().len(), 2);
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_duplicate_custom_order_id_is_regenerated() {
        let (_, mut cart) = empty_cart();
        let order = cake(CakeSize::Cm18);
        cart.add_custom_order(order.clone());
        let again = cart.add_custom_order(order.clone());

        assert_ne!(again.id(), order.id());
        assert_eq!(cart.entries().len(), 2);
    }

    #[test]
    fn test_total_mixes_catalog_and_custom_lines() {
        let (_, mut cart) = empty_cart();
        cart.add_catalog_item(&item("1"));
        let cupcakes = cart.add_custom_order(custom(&CupcakeDraft::new()));

        assert_eq!(cupcakes.price(), Price::new(900));
        assert_eq!(cart.total(), Price::new(3400));
        assert_eq!(cart.item_count(), 7);
    }

    #[test]
    fn test_remove_missing_entry_is_noop() {
        let (_, mut cart) = empty_cart();
        cart.add_catalog_item(&item("1"));

        assert!(!cart.remove_entry(&EntryId::new("nope")));
        assert_eq!(cart.entries().len(), 1);

        assert!(cart.remove_entry(&EntryId::new("1")));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_zero_quantity_is_ignored() {
        let (_, mut cart) = empty_cart();
        cart.add_catalog_items(&item("2"), 3);
        let order = cart.add_custom_order(cake(CakeSize::Cm22));

        assert!(!cart.set_quantity(&EntryId::new("2"), 0));
        assert!(!cart.set_quantity(order.id(), 0));

        assert_eq!(cart.get(&EntryId::new("2")).unwrap().quantity(), 3);
        assert_eq!(cart.get(order.id()).unwrap().quantity(), 1);
    }

    #[test]
    fn test_custom_quantity_change_keeps_unit_economics() {
        let (_, mut cart) = empty_cart();
        let order = cart.add_custom_order(cake(CakeSize::Cm30));

        assert!(cart.set_quantity(order.id(), 2));
        let entry = cart.get(order.id()).unwrap();
        assert_eq!(entry.unit_price(), Price::new(5500));
        assert_eq!(entry.line_total(), Price::new(11_000));

        assert!(!cart.set_quantity(order.id(), 11));
        assert_eq!(cart.get(order.id()).unwrap().quantity(), 2);
    }

    #[test]
    fn test_cupcake_minimum_holds_in_cart() {
        let (_, mut cart) = empty_cart();
        let order = cart.add_custom_order(custom(&CupcakeDraft::new()));

        assert!(!cart.set_quantity(order.id(), 5));
        assert!(cart.set_quantity(order.id(), 12));
        assert_eq!(cart.total(), Price::new(1800));
    }

    #[test]
    fn test_quote_placeholder_is_not_rederived() {
        let (_, mut cart) = empty_cart();
        let mut draft = OtherDraft::new();
        draft.set_special_requests("Mesa de doces para casamento");
        let order = cart.add_custom_order(custom(&draft));

        assert!(cart.set_quantity(order.id(), 3));
        let entry = cart.get(order.id()).unwrap();
        assert_eq!(entry.unit_price(), Price::new(1000));
        assert!(entry.quote_pending());
    }

    #[test]
    fn test_every_mutation_is_persisted() {
        let (storage, mut cart) = empty_cart();
        cart.add_catalog_item(&item("3"));

        let reloaded = CartStore::load(storage.clone());
        assert_eq!(reloaded.entries(), cart.entries());

        cart.clear();
        let reloaded = CartStore::load(storage);
        assert!(reloaded.is_empty());
    }

    #[test]
    fn test_corrupt_snapshot_loads_empty() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set(keys::CART, "{broken").unwrap();
        assert!(CartStore::load(storage).is_empty());
    }

    #[test]
    fn test_subscribers_see_every_change() {
        let (_, mut cart) = empty_cart();
        let mut badge = cart.subscribe();

        cart.add_catalog_item(&item("5"));
        cart.add_catalog_item(&item("5"));

        assert_eq!(badge.try_recv().unwrap().item_count, 1);
        let latest = badge.try_recv().unwrap();
        assert_eq!(latest.item_count, 2);
        assert_eq!(latest.total, Price::new(300));
        assert!(badge.try_recv().is_err());
    }

    #[test]
    fn test_sync_applies_last_write_from_other_tab() {
        let (storage, mut tab_a) = empty_cart();
        let mut tab_b = CartStore::load(storage.clone());
        let mut badge_b = tab_b.subscribe();

        tab_a.add_catalog_item(&item("1"));
        tab_a.add_catalog_item(&item("4"));

        assert!(tab_b.sync());
        assert_eq!(tab_b.entries(), tab_a.entries());
        assert_eq!(badge_b.try_recv().unwrap().item_count, 2);

        // Nothing new to apply.
        assert!(!tab_b.sync());

        // B writes last, so A converges on B's snapshot.
        tab_b.clear();
        assert!(tab_a.sync());
        assert!(tab_a.is_empty());
    }

    #[test]
    fn test_checkout_requires_session() {
        let (_, mut cart) = empty_cart();
        assert_eq!(
            cart.checkout_summary(None),
            Err(CheckoutError::NotLoggedIn)
        );
        let user = UserId::new("u-1");
        assert_eq!(
            cart.checkout_summary(Some(&user)),
            Err(CheckoutError::EmptyCart)
        );

        cart.add_catalog_item(&item("1"));
        let mut draft = OtherDraft::new();
        draft.set_special_requests("Bolachas com o logotipo");
        cart.add_custom_order(custom(&draft));

        let summary = cart.checkout_summary(Some(&user)).unwrap();
        assert_eq!(summary.lines.len(), 2);
        assert_eq!(summary.lines[0].name, "Classic Vanilla Cake");
        assert_eq!(summary.lines[1].name, "Pedido especial");
        assert_eq!(summary.total, Price::new(3500));
        assert!(summary.awaiting_quote);
    }
}
