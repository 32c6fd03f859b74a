//! Custom order commands.
//!
//! # Usage
//!
//! ```bash
//! katcakes order cake --shape rectangle --size 22cm --flavor "Chocolate"
//! katcakes order cupcake --topping "Cream Cheese Frosting" -q 12
//! katcakes order other --requests "Mesa de doces para 40 pessoas"
//! ```
//!
//! The CLI has no connection to the remote order log, so orders are only
//! added to the cart and never mirrored.

use katcakes_core::{CakeSize, CakeTopping, CupcakeTopping, Shape};
use katcakes_storefront::error::Result;
use katcakes_storefront::orders::{
    CakeDraft, CupcakeDraft, CustomOrder, OrderForm, OtherDraft, add_to_cart,
};

use super::{Context, print_json};

/// Options of `order cake`. Unset fields keep the form's defaults.
#[derive(Debug, Default)]
pub struct CakeArgs {
    pub shape: Option<Shape>,
    pub size: Option<CakeSize>,
    pub flavor: Option<String>,
    pub filling: Option<String>,
    pub topping: Option<CakeTopping>,
    pub quantity: Option<u32>,
    pub requests: Option<String>,
    pub allergies: Option<String>,
}

/// Options of `order cupcake`.
#[derive(Debug, Default)]
pub struct CupcakeArgs {
    pub flavor: Option<String>,
    pub topping: Option<CupcakeTopping>,
    pub quantity: Option<u32>,
    pub requests: Option<String>,
    pub allergies: Option<String>,
}

/// Options of `order other`.
#[derive(Debug, Default)]
pub struct OtherArgs {
    pub requests: String,
    pub flavor: Option<String>,
    pub quantity: Option<u32>,
    pub allergies: Option<String>,
}

impl CakeArgs {
    fn into_draft(self) -> CakeDraft {
        let mut draft = CakeDraft::new();
        if let Some(shape) = self.shape {
            draft.set_shape(shape);
        }
        if let Some(size) = self.size {
            draft.set_size(size);
        }
        if let Some(flavor) = self.flavor {
            draft.set_flavor(flavor);
        }
        if let Some(filling) = self.filling {
            draft.set_filling(filling);
        }
        if let Some(topping) = self.topping {
            draft.set_topping(topping);
        }
        if let Some(quantity) = self.quantity {
            draft.set_quantity(quantity);
        }
        if let Some(text) = self.requests {
            draft.set_special_requests(text);
        }
        if let Some(text) = self.allergies {
            draft.set_allergies(text);
        }
        draft
    }
}

impl CupcakeArgs {
    fn into_draft(self) -> CupcakeDraft {
        let mut draft = CupcakeDraft::new();
        if let Some(flavor) = self.flavor {
            draft.set_flavor(flavor);
        }
        if let Some(topping) = self.topping {
            draft.set_topping(topping);
        }
        if let Some(quantity) = self.quantity {
            draft.set_quantity(quantity);
        }
        if let Some(text) = self.requests {
            draft.set_special_requests(text);
        }
        if let Some(text) = self.allergies {
            draft.set_allergies(text);
        }
        draft
    }
}

impl OtherArgs {
    fn into_draft(self) -> OtherDraft {
        let mut draft = OtherDraft::new();
        draft.set_special_requests(self.requests);
        if let Some(flavor) = self.flavor {
            draft.set_flavor(flavor);
        }
        if let Some(quantity) = self.quantity {
            draft.set_quantity(quantity);
        }
        if let Some(text) = self.allergies {
            draft.set_allergies(text);
        }
        draft
    }
}

/// Configure a custom cake and add it to the cart.
pub fn cake(ctx: &Context, args: CakeArgs) -> Result<()> {
    submit(ctx, &args.into_draft())?;
    Ok(())
}

/// Configure a cupcake batch and add it to the cart.
pub fn cupcake(ctx: &Context, args: CupcakeArgs) -> Result<()> {
    submit(ctx, &args.into_draft())?;
    Ok(())
}

/// Describe a special request and add it to the cart.
pub fn other(ctx: &Context, args: OtherArgs) -> Result<()> {
    submit(ctx, &args.into_draft())?;
    Ok(())
}

fn submit(ctx: &Context, form: &dyn OrderForm) -> Result<CustomOrder> {
    tracing::debug!(category = %form.category(), price = %form.price(), "submitting custom order");

    let mut cart = ctx.cart();
    let order = add_to_cart(form, &mut cart)?;

    if ctx.json {
        print_json(&order)?;
    } else {
        println!("{} adicionado ao carrinho: {}", order.label(), order.price());
        if order.quote_pending() {
            println!("Valor provisório; entraremos em contacto com um orçamento.");
        }
        println!("Total do carrinho: {}", cart.total());
    }
    Ok(order)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use katcakes_core::{Category, Price};
    use katcakes_storefront::config::StorefrontConfig;
    use katcakes_storefront::error::AppError;
    use katcakes_storefront::pricing::{QUOTE_PLACEHOLDER, cake_size_price};

    use super::*;

    fn context(dir: &tempfile::TempDir) -> Context {
        let config = StorefrontConfig {
            storage_path: dir.path().join("storage.json"),
            ..StorefrontConfig::default()
        };
        Context::open(&config, None, false).unwrap()
    }

    #[test]
    fn test_cake_order_lands_in_the_cart() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(&dir);

        let args = CakeArgs {
            size: Some(CakeSize::Cm30),
            quantity: Some(2),
            ..CakeArgs::default()
        };
        let order = submit(&ctx, &args.into_draft()).unwrap();

        assert_eq!(order.category(), Category::Cake);
        assert_eq!(order.price(), cake_size_price(CakeSize::Cm30).times(2));
        assert_eq!(context(&dir).cart().total(), order.price());
    }

    #[test]
    fn test_small_cupcake_batch_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(&dir);

        let args = CupcakeArgs {
            quantity: Some(4),
            ..CupcakeArgs::default()
        };
        let err = cupcake(&ctx, args).unwrap_err();

        assert!(matches!(err, AppError::Order(_)));
        assert!(ctx.cart().is_empty());
    }

    #[test]
    fn test_special_request_is_quote_pending() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(&dir);

        let args = OtherArgs {
            requests: "Mesa de doces para 40 pessoas".to_owned(),
            ..OtherArgs::default()
        };
        let order = submit(&ctx, &args.into_draft()).unwrap();

        assert!(order.quote_pending());
        assert_eq!(order.price(), QUOTE_PLACEHOLDER);
        assert_ne!(order.price(), Price::ZERO);
    }

    #[test]
    fn test_unset_options_keep_form_defaults() {
        let draft = CakeArgs::default().into_draft();
        assert_eq!(draft.size(), CakeSize::Cm20);
        assert_eq!(draft.quantity(), 1);
        assert_eq!(CupcakeArgs::default().into_draft().quantity(), 6);
    }
}
