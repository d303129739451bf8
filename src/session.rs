//! Per-tab session state.
//!
//! Seeded once by the server render, then owned by the running client.
//! Passed around explicitly; there is no global instance.

use serde::{Deserialize, Serialize};

use crate::identity::{CartItem, EnrolledCourse, Identity};
use crate::theme::Theme;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionContext {
    pub user_data: Option<Identity>,
    pub theme: Theme,
    pub cart_data: Vec<CartItem>,
    pub enrolled_courses: Vec<EnrolledCourse>,
}

impl SessionContext {
    pub fn new(user_data: Option<Identity>, theme: Theme) -> Self {
        Self {
            user_data,
            theme,
            cart_data: Vec::new(),
            enrolled_courses: Vec::new(),
        }
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_data
            .as_ref()
            .map(|u| u.id.as_str())
            .filter(|id| !id.is_empty())
    }

    pub fn is_admin(&self) -> bool {
        self.user_data.as_ref().is_some_and(Identity::is_admin)
    }

    pub fn toggle_theme(&mut self) -> Theme {
        self.theme = self.theme.toggled();
        self.theme
    }

    /// Add an item unless one with the same id is already in the cart.
    /// Returns whether the cart changed.
    pub fn add_to_cart(&mut self, item: CartItem) -> bool {
        if self.cart_data.iter().any(|existing| existing.id == item.id) {
            return false;
        }
        self.cart_data.push(item);
        true
    }

    pub fn remove_from_cart(&mut self, item_id: &str) -> bool {
        let before = self.cart_data.len();
        self.cart_data.retain(|item| item.id != item_id);
        self.cart_data.len() != before
    }

    pub fn is_enrolled(&self, course_id: &str) -> bool {
        self.enrolled_courses.iter().any(|c| c.id == course_id)
    }

    /// Drop everything tied to the signed-in user. Theme is kept.
    pub fn sign_out(&mut self) {
        self.user_data = None;
        self.cart_data.clear();
        self.enrolled_courses.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::Role;

    #[test]
    fn test_cart_dedupes_by_id() {
        let mut ctx = SessionContext::default();
        assert!(ctx.add_to_cart(CartItem::new("a")));
        assert!(!ctx.add_to_cart(CartItem::new("a")));
        assert!(ctx.add_to_cart(CartItem::new("b")));
        assert_eq!(ctx.cart_data.len(), 2);

        assert!(ctx.remove_from_cart("a"));
        assert!(!ctx.remove_from_cart("a"));
        assert_eq!(ctx.cart_data, vec![CartItem::new("b")]);
    }

    #[test]
    fn test_sign_out_keeps_theme() {
        let mut ctx = SessionContext::new(Some(Identity::new("u1", "Ada", Role::Admin)), Theme::Dark);
        ctx.add_to_cart(CartItem::new("a"));
        ctx.enrolled_courses.push(EnrolledCourse::new("c1"));
        assert!(ctx.is_admin());
        assert!(ctx.is_enrolled("c1"));

        ctx.sign_out();
        assert!(ctx.user_id().is_none());
        assert!(ctx.cart_data.is_empty());
        assert!(!ctx.is_enrolled("c1"));
        assert_eq!(ctx.theme, Theme::Dark);
    }

    #[test]
    fn test_hydration_field_names() {
        let ctx = SessionContext::default();
        let json = serde_json::to_value(&ctx).unwrap();
        assert!(json["userData"].is_null());
        assert_eq!(json["theme"], "light");
        assert!(json["cartData"].as_array().unwrap().is_empty());
        assert!(json["enrolledCourses"].as_array().unwrap().is_empty());
    }
}
