//! Read-only product catalog.
//!
//! The catalog is a small fixed dataset held in memory; there is no
//! pagination and nothing to invalidate.

use katcakes_core::{
    CakeSize, CakeTopping, CatalogItem, Category, Price, ProductDetails, ProductId, Shape,
    Topping,
};

/// Lookup service over catalog products.
pub trait CatalogLookup: Send + Sync {
    /// Find a product by id.
    fn get_by_id(&self, id: &ProductId) -> Option<CatalogItem>;

    /// All products in a category, in catalog order.
    fn get_by_category(&self, category: Category) -> Vec<CatalogItem>;

    /// Products flagged as featured, in catalog order.
    fn get_featured(&self) -> Vec<CatalogItem>;
}

/// Catalog backed by a fixed list.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    items: Vec<CatalogItem>,
}

impl StaticCatalog {
    /// Build a catalog from a list of products.
    #[must_use]
    pub const fn new(items: Vec<CatalogItem>) -> Self {
        Self { items }
    }

    /// The bakery's product range.
    #[must_use]
    pub fn bakery() -> Self {
        let cake = |id: &str,
                    name: &str,
                    description: &str,
                    price: u64,
                    image: &str,
                    featured: bool,
                    flavor: &str,
                    filling: &str,
                    topping: CakeTopping| CatalogItem {
            id: ProductId::new(id),
            name: name.to_owned(),
            description: description.to_owned(),
            price: Price::new(price),
            image: image.to_owned(),
            category: Category::Cake,
            featured,
            details: Some(ProductDetails {
                shape: Some(Shape::Round),
                size: Some(CakeSize::Cm20),
                flavor: Some(flavor.to_owned()),
                filling: Some(filling.to_owned()),
                topping: Some(Topping::Cake(topping)),
            }),
        };
        let plain = |id: &str,
                     name: &str,
                     description: &str,
                     price: u64,
                     image: &str,
                     category: Category,
                     featured: bool| CatalogItem {
            id: ProductId::new(id),
            name: name.to_owned(),
            description: description.to_owned(),
            price: Price::new(price),
            image: image.to_owned(),
            category,
            featured,
            details: None,
        };

        Self::new(vec![
            cake(
                "1",
                "Classic Vanilla Cake",
                "A timeless vanilla cake with silky buttercream frosting.",
                2500,
                "https://images.unsplash.com/photo-1578985545062-69928b1d9587",
                true,
                "Vanilla",
                "Vanilla Buttercream",
                CakeTopping::Buttercream,
            ),
            cake(
                "2",
                "Chocolate Decadence",
                "Rich chocolate cake with velvety ganache, a chocolate lover's dream.",
                2800,
                "https://images.unsplash.com/photo-1606890737304-57a1ca8a5b62",
                true,
                "Chocolate",
                "Chocolate Ganache",
                CakeTopping::Ganache,
            ),
            cake(
                "3",
                "Strawberry Bliss",
                "Light vanilla cake with fresh strawberry filling and cream cheese frosting.",
                2700,
                "https://images.unsplash.com/photo-1464349095431-e9a21285b5c3",
                true,
                "Vanilla",
                "Strawberry",
                CakeTopping::Buttercream,
            ),
            cake(
                "4",
                "Red Velvet Elegance",
                "Classic red velvet cake with cream cheese frosting, beautifully decorated.",
                2900,
                "https://images.unsplash.com/photo-1586788680434-30d324626f4c",
                false,
                "Red Velvet",
                "Cream Cheese",
                CakeTopping::Buttercream,
            ),
            plain(
                "5",
                "Vanilla Cupcakes",
                "Classic vanilla cupcakes with silky buttercream frosting.",
                150,
                "https://images.unsplash.com/photo-1563729784474-d77dbb933a9e",
                Category::Cupcake,
                true,
            ),
            plain(
                "6",
                "Chocolate Cupcakes",
                "Rich chocolate cupcakes with velvety chocolate ganache.",
                180,
                "https://images.unsplash.com/photo-1614707267537-b85aaf00c4b7",
                Category::Cupcake,
                false,
            ),
            plain(
                "7",
                "Lemon Tart",
                "Tangy lemon tart with a buttery crust.",
                220,
                "https://images.unsplash.com/photo-1519869325930-281384150729",
                Category::Other,
                false,
            ),
            plain(
                "8",
                "Chocolate Chip Cookies",
                "Classic chocolate chip cookies, soft in the center with crispy edges.",
                50,
                "https://images.unsplash.com/photo-1499636136210-6f4ee915583e",
                Category::Other,
                false,
            ),
        ])
    }

    /// Every product, in catalog order.
    #[must_use]
    pub fn all(&self) -> &[CatalogItem] {
        &self.items
    }
}

impl CatalogLookup for StaticCatalog {
    fn get_by_id(&self, id: &ProductId) -> Option<CatalogItem> {
        self.items.iter().find(|item| &item.id == id).cloned()
    }

    fn get_by_category(&self, category: Category) -> Vec<CatalogItem> {
        self.items
            .iter()
            .filter(|item| item.category == category)
            .cloned()
            .collect()
    }

    fn get_featured(&self) -> Vec<CatalogItem> {
        self.items.iter().filter(|item| item.featured).cloned().collect()
    }
}
