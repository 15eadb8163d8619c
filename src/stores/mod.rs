pub mod cart;
pub mod checkout;

pub use cart::{CartState, CartStore};
pub use checkout::{CheckoutState, CheckoutStep, CheckoutStore};

/// Blocking yes/no prompt consulted before destructive operations
/// (remove item, clear cart, delete address). The request is only issued
/// after the user explicitly confirms.
pub trait ConfirmationPrompt: Send + Sync {
    fn confirm(&self, message: &str) -> bool;
}

/// Prompt that approves everything; for embedders whose UI handles
/// confirmation before calling into the store.
#[derive(Debug, Default)]
pub struct AlwaysConfirm;

impl ConfirmationPrompt for AlwaysConfirm {
    fn confirm(&self, _message: &str) -> bool {
        true
    }
}

/// Severity of a store's banner message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Success,
    Error,
}

/// Dismissible banner message held in store state. Store operations catch
/// their own failures and convert them into one of these instead of
/// letting errors escape to the rendering layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub kind: StatusKind,
    pub text: String,
}

impl StatusMessage {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Success,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Error,
            text: text.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == StatusKind::Error
    }
}
