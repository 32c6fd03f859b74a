//! Custom-order forms.
//!
//! Each draft holds the customer's in-progress choices for one category and
//! keeps its displayed price in step with them: every setter that touches
//! size or quantity reprices before returning. Drafts accept any input;
//! [`OrderForm::validate`] decides whether the configuration can be
//! submitted.

use katcakes_core::{
    CakeSize, CakeTopping, Category, CupcakeTopping, CustomOrderDetails, Price, Shape, Topping,
};

use super::options::{DEFAULT_CAKE_FILLING, DEFAULT_CAKE_FLAVOR, DEFAULT_CUPCAKE_FLAVOR};
use crate::pricing::{self, CUPCAKE_UNIT_PRICE, PricingError, QUOTE_PLACEHOLDER};
use crate::validation::ValidationErrors;

/// Minimum length of the description on an "other" order.
pub const MIN_REQUEST_LENGTH: usize = 10;

/// A configuration that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRequest {
    pub category: Category,
    pub details: CustomOrderDetails,
    pub quantity: u32,
}

/// A category-specific order form.
pub trait OrderForm {
    fn category(&self) -> Category;

    /// Price shown next to the form for the current choices.
    fn price(&self) -> Price;

    /// Check every field and produce the order request.
    ///
    /// # Errors
    ///
    /// Returns every failing field at once.
    fn validate(&self) -> Result<OrderRequest, ValidationErrors>;
}

fn optional_text(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

fn check_quantity(errors: &mut ValidationErrors, category: Category, quantity: u32) {
    if let Err(PricingError::QuantityOutOfRange { min, max, .. }) =
        pricing::check_quantity(category, quantity)
    {
        let message = if category == Category::Cupcake && quantity < min {
            format!("O pedido mínimo é de {min} cupcakes")
        } else {
            format!("A quantidade deve estar entre {min} e {max}")
        };
        errors.push("quantity", message);
    }
}

// =============================================================================
// Cake
// =============================================================================

/// Custom cake form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CakeDraft {
    shape: Shape,
    size: CakeSize,
    flavor: String,
    filling: String,
    topping: CakeTopping,
    quantity: u32,
    special_requests: String,
    allergies: String,
    price: Price,
}

impl Default for CakeDraft {
    fn default() -> Self {
        let mut draft = Self {
            shape: Shape::Round,
            size: CakeSize::Cm20,
            flavor: DEFAULT_CAKE_FLAVOR.to_owned(),
            filling: DEFAULT_CAKE_FILLING.to_owned(),
            topping: CakeTopping::Buttercream,
            quantity: 1,
            special_requests: String::new(),
            allergies: String::new(),
            price: Price::ZERO,
        };
        draft.reprice();
        draft
    }
}

impl CakeDraft {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn reprice(&mut self) {
        self.price = pricing::cake_size_price(self.size).times(self.quantity);
    }

    pub const fn set_shape(&mut self, shape: Shape) {
        self.shape = shape;
    }

    pub fn set_size(&mut self, size: CakeSize) {
        self.size = size;
        self.reprice();
    }

    pub fn set_quantity(&mut self, quantity: u32) {
        self.quantity = quantity;
        self.reprice();
    }

    pub fn set_flavor(&mut self, flavor: impl Into<String>) {
        self.flavor = flavor.into();
    }

    pub fn set_filling(&mut self, filling: impl Into<String>) {
        self.filling = filling.into();
    }

    pub const fn set_topping(&mut self, topping: CakeTopping) {
        self.topping = topping;
    }

    pub fn set_special_requests(&mut self, text: impl Into<String>) {
        self.special_requests = text.into();
    }

    pub fn set_allergies(&mut self, text: impl Into<String>) {
        self.allergies = text.into();
    }

    #[must_use]
    pub const fn size(&self) -> CakeSize {
        self.size
    }

    #[must_use]
    pub const fn quantity(&self) -> u32 {
        self.quantity
    }
}

impl OrderForm for CakeDraft {
    fn category(&self) -> Category {
        Category::Cake
    }

    fn price(&self) -> Price {
        self.price
    }

    fn validate(&self) -> Result<OrderRequest, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check(self.flavor.trim().is_empty(), "flavor", "Escolha um sabor");
        errors.check(self.filling.trim().is_empty(), "filling", "Escolha um recheio");
        check_quantity(&mut errors, Category::Cake, self.quantity);

        errors.into_result(OrderRequest {
            category: Category::Cake,
            details: CustomOrderDetails {
                shape: Some(self.shape),
                size: Some(self.size),
                flavor: optional_text(&self.flavor),
                filling: optional_text(&self.filling),
                topping: Some(Topping::Cake(self.topping)),
                special_requests: optional_text(&self.special_requests),
                allergies: optional_text(&self.allergies),
            },
            quantity: self.quantity,
        })
    }
}

// =============================================================================
// Cupcake
// =============================================================================

/// Custom cupcake box form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CupcakeDraft {
    flavor: String,
    topping: CupcakeTopping,
    quantity: u32,
    special_requests: String,
    allergies: String,
    price: Price,
}

impl Default for CupcakeDraft {
    fn default() -> Self {
        let mut draft = Self {
            flavor: DEFAULT_CUPCAKE_FLAVOR.to_owned(),
            topping: CupcakeTopping::VanillaButtercream,
            quantity: *pricing::CUPCAKE_QUANTITY.start(),
            special_requests: String::new(),
            allergies: String::new(),
            price: Price::ZERO,
        };
        draft.reprice();
        draft
    }
}

impl CupcakeDraft {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn reprice(&mut self) {
        self.price = CUPCAKE_UNIT_PRICE.times(self.quantity);
    }

    pub fn set_quantity(&mut self, quantity: u32) {
        self.quantity = quantity;
        self.reprice();
    }

    pub fn set_flavor(&mut self, flavor: impl Into<String>) {
        self.flavor = flavor.into();
    }

    pub const fn set_topping(&mut self, topping: CupcakeTopping) {
        self.topping = topping;
    }

    pub fn set_special_requests(&mut self, text: impl Into<String>) {
        self.special_requests = text.into();
    }

    pub fn set_allergies(&mut self, text: impl Into<String>) {
        self.allergies = text.into();
    }

    #[must_use]
    pub const fn quantity(&self) -> u32 {
        self.quantity
    }
}

impl OrderForm for CupcakeDraft {
    fn category(&self) -> Category {
        Category::Cupcake
    }

    fn price(&self) -> Price {
        self.price
    }

    fn validate(&self) -> Result<OrderRequest, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check(self.flavor.trim().is_empty(), "flavor", "Escolha um sabor");
        check_quantity(&mut errors, Category::Cupcake, self.quantity);

        errors.into_result(OrderRequest {
            category: Category::Cupcake,
            details: CustomOrderDetails {
                flavor: optional_text(&self.flavor),
                topping: Some(Topping::Cupcake(self.topping)),
                special_requests: optional_text(&self.special_requests),
                allergies: optional_text(&self.allergies),
                ..CustomOrderDetails::default()
            },
            quantity: self.quantity,
        })
    }
}

// =============================================================================
// Other sweets
// =============================================================================

/// Free-form request for anything outside the cake and cupcake ranges.
///
/// Its price is a placeholder until the bakery sends a quote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtherDraft {
    flavor: String,
    special_requests: String,
    allergies: String,
    quantity: u32,
    price: Price,
}

impl Default for OtherDraft {
    fn default() -> Self {
        let mut draft = Self {
            flavor: String::new(),
            special_requests: String::new(),
            allergies: String::new(),
            quantity: 1,
            price: Price::ZERO,
        };
        draft.reprice();
        draft
    }
}

impl OtherDraft {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn reprice(&mut self) {
        self.price = QUOTE_PLACEHOLDER.times(self.quantity);
    }

    pub fn set_quantity(&mut self, quantity: u32) {
        self.quantity = quantity;
        self.reprice();
    }

    pub fn set_flavor(&mut self, flavor: impl Into<String>) {
        self.flavor = flavor.into();
    }

    pub fn set_special_requests(&mut self, text: impl Into<String>) {
        self.special_requests = text.into();
    }

    pub fn set_allergies(&mut self, text: impl Into<String>) {
        self.allergies = text.into();
    }
}

impl OrderForm for OtherDraft {
    fn category(&self) -> Category {
        Category::Other
    }

    fn price(&self) -> Price {
        self.price
    }

    fn validate(&self) -> Result<OrderRequest, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check(
            self.special_requests.trim().chars().count() < MIN_REQUEST_LENGTH,
            "specialRequests",
            format!("Descreva o seu pedido com pelo menos {MIN_REQUEST_LENGTH} caracteres"),
        );
        check_quantity(&mut errors, Category::Other, self.quantity);

        errors.into_result(OrderRequest {
            category: Category::Other,
            details: CustomOrderDetails {
                flavor: optional_text(&self.flavor),
                special_requests: optional_text(&self.special_requests),
                allergies: optional_text(&self.allergies),
                ..CustomOrderDetails::default()
            },
            quantity: self.quantity,
        })
    }
}
