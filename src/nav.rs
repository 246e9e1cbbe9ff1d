//! Navigation disclosure: the collapsible header menu.
//!
//! Two states, closed at start and never persisted. The state is written to
//! `data-state` on the nav root and mirrored for assistive technology into
//! `aria-expanded` on the trigger and `aria-hidden` on the menu panel.

use crate::page::{ids, Document};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavDisclosure {
    open: bool,
}

impl NavDisclosure {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Set the state to `explicit`, or flip it when `None`. Returns the new state.
    pub fn toggle(&mut self, document: &mut Document, explicit: Option<bool>) -> bool {
        self.open = explicit.unwrap_or(!self.open);
        self.render(document);
        self.open
    }

    pub fn render(&self, document: &mut Document) {
        let (state, expanded, hidden) = if self.open {
            ("open", "true", "false")
        } else {
            ("closed", "false", "true")
        };

        if let Some(nav) = document.get_mut(ids::NAV) {
            nav.set_attr("data-state", state);
        }
        if let Some(trigger) = document.get_mut(ids::NAV_TOGGLE) {
            trigger.set_attr("aria-expanded", expanded);
        }
        if let Some(menu) = document.get_mut(ids::NAV_MENU) {
            menu.set_attr("aria-hidden", hidden);
        }
    }

    /// React to a click on `target`. Returns the new state when it changed.
    ///
    /// - the trigger flips the menu
    /// - a link inside the open menu closes it
    /// - a click anywhere outside the nav closes an open menu
    pub fn on_click(&mut self, document: &mut Document, target: &str) -> Option<bool> {
        if target == ids::NAV_TOGGLE {
            return Some(self.toggle(document, None));
        }

        if !self.open {
            return None;
        }

        let is_menu_link = document.is_within(target, ids::NAV_MENU)
            && document.get(target).is_some_and(|el| el.tag == "a");
        let is_outside = !document.is_within(target, ids::NAV);

        if is_menu_link || is_outside {
            return Some(self.toggle(document, Some(false)));
        }
        None
    }
}
