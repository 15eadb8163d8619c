pub mod address;
pub mod cart;
pub mod order;
pub mod payment;

pub use address::{Address, AddressInput};
pub use cart::{CartItem, CartTotals, FLAT_SHIPPING_FEE, FREE_SHIPPING_MIN};
pub use order::{CheckoutReceipt, Order, OrderItem, PaymentMethod};
pub use payment::{GatewayPayment, PaymentIntent, VerifyOutcome};
