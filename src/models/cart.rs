use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Subtotal at or above which the shipping fee is waived.
pub const FREE_SHIPPING_MIN: Decimal = dec!(1000);

/// Flat shipping fee charged below the free-shipping threshold.
pub const FLAT_SHIPPING_FEE: Decimal = dec!(50);

/// A single cart line as returned by `GET /api/cart`.
///
/// `product_name`, `product_image` and `category` are denormalized
/// display-only copies. `line_total` is the server's copy; totals are
/// recomputed client-side from `unit_price * quantity` and never read
/// from it (see [`CartTotals::from_items`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    #[serde(rename = "cartItemId")]
    pub item_id: i64,
    pub product_id: i64,
    #[serde(default)]
    pub product_name: String,
    #[serde(default)]
    pub product_image: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(rename = "price")]
    pub unit_price: Decimal,
    pub quantity: u32,
    #[serde(rename = "totalPrice", default)]
    pub line_total: Decimal,
}

impl CartItem {
    /// Line total derived from the authoritative unit price and quantity.
    pub fn derived_line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Derived cart totals.
///
/// Invariants: `total == subtotal + shipping`, and `shipping == 0` iff
/// `subtotal >= FREE_SHIPPING_MIN` or the cart is empty, else the flat fee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartTotals {
    pub item_count: u32,
    pub subtotal: Decimal,
    pub shipping: Decimal,
    pub total: Decimal,
}

impl CartTotals {
    /// Recomputes every derived figure from the item list. The server's
    /// aggregate fields are deliberately ignored; the item list is the
    /// single source of truth.
    pub fn from_items(items: &[CartItem]) -> Self {
        let subtotal: Decimal = items.iter().map(CartItem::derived_line_total).sum();
        let item_count: u32 = items.iter().map(|item| item.quantity).sum();

        let shipping = if subtotal >= FREE_SHIPPING_MIN || items.is_empty() {
            Decimal::ZERO
        } else {
            FLAT_SHIPPING_FEE
        };

        Self {
            item_count,
            subtotal,
            shipping,
            total: subtotal + shipping,
        }
    }

    pub fn empty() -> Self {
        Self {
            item_count: 0,
            subtotal: Decimal::ZERO,
            shipping: Decimal::ZERO,
            total: Decimal::ZERO,
        }
    }
}

/// Wire envelope of `GET /api/cart`. The aggregate fields the server also
/// sends are dropped here on purpose.
#[derive(Debug, Clone, Deserialize)]
pub struct CartEnvelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub items: Vec<CartItem>,
}

/// Wire envelope of `GET /api/cart/count`.
#[derive(Debug, Clone, Deserialize)]
pub struct CartCountEnvelope {
    #[serde(default)]
    pub count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(item_id: i64, unit_price: Decimal, quantity: u32) -> CartItem {
        CartItem {
            item_id,
            product_id: item_id * 10,
            product_name: format!("Product {}", item_id),
            product_image: None,
            category: None,
            unit_price,
            quantity,
            line_total: Decimal::ZERO,
        }
    }

    #[test]
    fn empty_cart_has_zero_totals() {
        let totals = CartTotals::from_items(&[]);
        assert_eq!(totals, CartTotals::empty());
    }

    #[test]
    fn flat_fee_below_threshold() {
        let totals = CartTotals::from_items(&[item(1, dec!(500), 1)]);
        assert_eq!(totals.subtotal, dec!(500));
        assert_eq!(totals.shipping, dec!(50));
        assert_eq!(totals.total, dec!(550));
        assert_eq!(totals.item_count, 1);
    }

    #[test]
    fn free_shipping_at_exact_threshold() {
        let totals = CartTotals::from_items(&[item(1, dec!(500), 2)]);
        assert_eq!(totals.subtotal, dec!(1000));
        assert_eq!(totals.shipping, Decimal::ZERO);
        assert_eq!(totals.total, dec!(1000));
        assert_eq!(totals.item_count, 2);
    }

    #[test]
    fn flat_fee_just_below_threshold() {
        let totals = CartTotals::from_items(&[item(1, dec!(999.99), 1)]);
        assert_eq!(totals.shipping, dec!(50));
        assert_eq!(totals.total, dec!(1049.99));
    }

    #[test]
    fn totals_ignore_server_line_total() {
        // Stale aggregate from the server must not leak into totals
        let mut stale = item(1, dec!(100), 2);
        stale.line_total = dec!(999);

        let totals = CartTotals::from_items(&[stale]);
        assert_eq!(totals.subtotal, dec!(200));
    }

    #[test]
    fn item_count_sums_quantities() {
        let totals =
            CartTotals::from_items(&[item(1, dec!(100), 3), item(2, dec!(250), 2)]);
        assert_eq!(totals.item_count, 5);
        assert_eq!(totals.subtotal, dec!(800));
    }

    #[test]
    fn total_is_subtotal_plus_shipping() {
        for (price, quantity) in [(dec!(10), 1), (dec!(499.50), 2), (dec!(2000), 1)] {
            let totals = CartTotals::from_items(&[item(1, price, quantity)]);
            assert_eq!(totals.total, totals.subtotal + totals.shipping);
        }
    }
}
