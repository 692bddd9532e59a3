//! User Aggregate

use crate::domain::aggregates::Cart;

/// A named customer at the counter and the cart they are filling.
#[derive(Clone, Debug)]
pub struct User {
    name: String,
    cart: Cart,
}

impl User {
    pub fn new(name: impl Into<String>) -> Self { Self { name: name.into(), cart: Cart::new() } }

    pub fn name(&self) -> &str { &self.name }
    pub fn cart(&self) -> &Cart { &self.cart }
    pub fn cart_mut(&mut self) -> &mut Cart { &mut self.cart }
}
