//! Custom-order configuration and order history.
//!
//! A form ([`CakeDraft`], [`CupcakeDraft`], [`OtherDraft`]) is validated into
//! an [`OrderRequest`], priced into a [`CustomOrder`] and handed to the cart
//! by [`OrderDesk::submit`]. Signed-in customers also get a best-effort copy
//! in the remote order log.

mod draft;
pub mod options;

pub use draft::{CakeDraft, CupcakeDraft, MIN_REQUEST_LENGTH, OrderForm, OrderRequest, OtherDraft};

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;

use katcakes_core::{
    CakeSize, Category, CustomOrderDetails, EntryId, OrderRecordId, OrderStatus, Price, UserId,
};

use crate::backend::{BackendError, OrderLog, OrderRecord};
use crate::cart::{CartEntry, CartStore};
use crate::config::{RemoteOperation, Timeouts};
use crate::pricing::{self, PricingError};
use crate::validation::ValidationErrors;

/// Errors from submitting an order or reading the history.
#[derive(Debug, Error)]
pub enum OrderError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error(transparent)]
    Pricing(#[from] PricingError),

    #[error("{0} timed out")]
    Timeout(RemoteOperation),

    #[error("backend error: {0}")]
    Backend(#[from] BackendError),
}

/// A priced, customer-configured product.
///
/// The unit price is always derived from the category and configuration by
/// the pricing rules; only the quantity changes after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomOrder {
    id: EntryId,
    category: Category,
    details: CustomOrderDetails,
    unit_price: Price,
    quantity: u32,
}

impl CustomOrder {
    /// Price a validated request under a fresh id.
    ///
    /// # Errors
    ///
    /// Returns `PricingError` if the quantity is out of bounds or a cake has
    /// no size.
    pub fn from_request(request: OrderRequest) -> Result<Self, PricingError> {
        pricing::check_quantity(request.category, request.quantity)?;
        let unit_price = pricing::unit_price(request.category, request.details.size)?;
        Ok(Self {
            id: EntryId::generate(),
            category: request.category,
            details: request.details,
            unit_price,
            quantity: request.quantity,
        })
    }

    #[must_use]
    pub const fn id(&self) -> &EntryId {
        &self.id
    }

    #[must_use]
    pub const fn category(&self) -> Category {
        self.category
    }

    #[must_use]
    pub const fn details(&self) -> &CustomOrderDetails {
        &self.details
    }

    #[must_use]
    pub const fn unit_price(&self) -> Price {
        self.unit_price
    }

    #[must_use]
    pub const fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Line total: unit price times quantity.
    #[must_use]
    pub fn price(&self) -> Price {
        self.unit_price.times(self.quantity)
    }

    /// Whether the price is a placeholder awaiting a manual quote.
    #[must_use]
    pub const fn quote_pending(&self) -> bool {
        pricing::is_quote_pending(self.category)
    }

    /// Display name for the line.
    #[must_use]
    pub fn label(&self) -> String {
        match self.category {
            Category::Cake => {
                let size = self.details.size.map_or("", CakeSize::as_str);
                format!("Bolo personalizado {size}").trim_end().to_owned()
            }
            Category::Cupcake => "Cupcakes personalizados".to_owned(),
            Category::Other => "Pedido especial".to_owned(),
        }
    }

    /// Change the quantity, re-deriving the unit price for cakes and cupcakes.
    /// The placeholder price of a pending quote is left alone.
    pub(crate) fn set_quantity(&mut self, quantity: u32) -> Result<(), PricingError> {
        pricing::check_quantity(self.category, quantity)?;
        if !self.quote_pending() {
            self.unit_price = pricing::unit_price(self.category, self.details.size)?;
        }
        self.quantity = quantity;
        Ok(())
    }

    pub(crate) fn regenerate_id(&mut self) {
        self.id = EntryId::generate();
    }
}

/// Validate and price a form, then add it to the cart, without touching the
/// order log.
///
/// # Errors
///
/// Returns `OrderError::Validation` with every failing field, or
/// `OrderError::Pricing` if the request cannot be priced. Nothing is added
/// to the cart in either case.
pub fn add_to_cart<F: OrderForm + ?Sized>(
    form: &F,
    cart: &mut CartStore,
) -> Result<CustomOrder, OrderError> {
    let request = form.validate()?;
    let order = cart.add_custom_order(CustomOrder::from_request(request)?);
    tracing::info!(entry_id = %order.id(), price = %order.price(), "custom order added to cart");
    Ok(order)
}

/// Submits custom orders and reads order history.
pub struct OrderDesk {
    log: Arc<dyn OrderLog>,
    timeouts: Timeouts,
}

impl OrderDesk {
    #[must_use]
    pub fn new(log: Arc<dyn OrderLog>, timeouts: Timeouts) -> Self {
        Self { log, timeouts }
    }

    /// Validate and price a form, then add it to the cart.
    ///
    /// When `user` is signed in, the order is also mirrored to the order log
    /// with status `cart`. Mirroring is best-effort: a failure or timeout is
    /// logged and the submission still succeeds.
    ///
    /// # Errors
    ///
    /// See [`add_to_cart`].
    #[instrument(skip_all, fields(category = %form.category()))]
    pub async fn submit<F: OrderForm + ?Sized>(
        &self,
        form: &F,
        cart: &mut CartStore,
        user: Option<&UserId>,
    ) -> Result<CustomOrder, OrderError> {
        let order = add_to_cart(form, cart)?;

        if let Some(user_id) = user {
            self.mirror(user_id, &order).await;
        }
        Ok(order)
    }

    async fn mirror(&self, user_id: &UserId, order: &CustomOrder) {
        let record = OrderRecord {
            id: OrderRecordId::generate(),
            user_id: user_id.clone(),
            entries: vec![CartEntry::Custom(order.clone())],
            total: order.price(),
            status: OrderStatus::Cart,
            created_at: Utc::now(),
        };
        let deadline = self.timeouts.for_operation(RemoteOperation::OrderMirror);

        match tokio::time::timeout(deadline, self.log.append(&record)).await {
            Ok(Ok(())) => {
                tracing::debug!(record_id = %record.id, "order mirrored");
            }
            Ok(Err(e)) => {
                tracing::warn!(error = %e, entry_id = %order.id(), "failed to mirror order");
            }
            Err(_) => {
                tracing::warn!(entry_id = %order.id(), ?deadline, "order mirror timed out");
            }
        }
    }

    /// Orders of a customer, newest first.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Timeout` if the log does not answer in time, or
    /// `OrderError::Backend` if it rejects the query.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn order_history(&self, user_id: &UserId) -> Result<Vec<OrderRecord>, OrderError> {
        let operation = RemoteOperation::OrderHistory;
        let mut records =
            tokio::time::timeout(self.timeouts.for_operation(operation), self.log.list_for_user(user_id))
                .await
                .map_err(|_| OrderError::Timeout(operation))??;
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }
}
