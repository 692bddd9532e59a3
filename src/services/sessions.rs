//! User session registry.
//!
//! Users live for the whole process. Switching the active user never touches any cart.

use rand::Rng;
use tracing::info;

use crate::domain::aggregates::User;

#[derive(Debug, Default)]
pub struct SessionRegistry {
    users: Vec<User>,
    active: Option<usize>,
}

impl SessionRegistry {
    pub fn new() -> Self { Self::default() }

    /// Activates the user called `name`, registering them with an empty cart on first use.
    /// A blank name gets a fresh `Guest-NNNN` name.
    pub fn select_or_create(&mut self, name: &str) -> &User {
        let name = match name.trim() {
            "" => self.guest_name(),
            trimmed => trimmed.to_string(),
        };
        let idx = match self.position(&name) {
            Some(idx) => idx,
            None => {
                info!(user = %name, "user registered");
                self.users.push(User::new(name));
                self.users.len() - 1
            }
        };
        self.active = Some(idx);
        &self.users[idx]
    }

    pub fn active(&self) -> Option<&User> { self.active.and_then(|idx| self.users.get(idx)) }
    pub fn get(&self, name: &str) -> Option<&User> { self.users.iter().find(|u| u.name() == name) }
    pub fn get_mut(&mut self, name: &str) -> Option<&mut User> { self.users.iter_mut().find(|u| u.name() == name) }

    /// Registered names in registration order.
    pub fn names(&self) -> Vec<String> { self.users.iter().map(|u| u.name().to_string()).collect() }

    fn position(&self, name: &str) -> Option<usize> { self.users.iter().position(|u| u.name() == name) }

    fn guest_name(&self) -> String {
        let mut rng = rand::thread_rng();
        loop {
            let candidate = format!("Guest-{}", rng.gen_range(1000..=9999));
            if self.position(&candidate).is_none() { return candidate; }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::{CatalogItem, Category};
    use crate::domain::value_objects::Money;
    use rust_decimal::Decimal;

    #[test]
    fn test_select_or_create_trims_and_reuses() {
        let mut sessions = SessionRegistry::new();
        assert!(sessions.active().is_none());
        assert_eq!(sessions.select_or_create("  Asha ").name(), "Asha");
        sessions.select_or_create("Ravi");
        assert_eq!(sessions.select_or_create("Asha").name(), "Asha");
        assert_eq!(sessions.names(), vec!["Asha".to_string(), "Ravi".to_string()]);
        assert_eq!(sessions.active().unwrap().name(), "Asha");
    }

    #[test]
    fn test_blank_name_becomes_guest() {
        let mut sessions = SessionRegistry::new();
        let name = sessions.select_or_create("   ").name().to_string();
        assert!(name.starts_with("Guest-"));
        let digits = name.trim_start_matches("Guest-");
        assert_eq!(digits.len(), 4);
        assert!(digits.chars().all(|c| c.is_ascii_digit()));
        let other = sessions.select_or_create("").name().to_string();
        assert_ne!(name, other);
        assert_eq!(sessions.names().len(), 2);
    }

    #[test]
    fn test_switching_preserves_carts() {
        let tomato = CatalogItem::new("Tomato", "टमाटर", Money::new(Decimal::new(40, 0)), Category::Vegetable);
        let mut sessions = SessionRegistry::new();
        sessions.select_or_create("A");
        sessions.get_mut("A").unwrap().cart_mut().add_line(&tomato, Decimal::new(250, 0)).unwrap();
        sessions.select_or_create("B");
        sessions.get_mut("B").unwrap().cart_mut().add_line(&tomato, Decimal::new(500, 0)).unwrap();
        let a = sessions.select_or_create("A");
        assert_eq!(a.cart().len(), 1);
        assert_eq!(a.cart().lines()[0].quantity_kg().value(), Decimal::new(25, 2));
        assert_eq!(sessions.get("B").unwrap().cart().len(), 1);
    }
}
