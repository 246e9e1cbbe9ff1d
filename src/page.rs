//! In-memory page model.
//!
//! `Document` stands in for the browser DOM: an element tree rooted at
//! `<html>`, plus the document-level state the engine touches (title, focus,
//! pending navigation). Elements are addressed by `id`; everything the
//! controllers need (attributes, classes, text content, form values, custom
//! validity) lives on `Element`.

use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    pub tag: String,
    pub id: Option<String>,
    attributes: BTreeMap<String, String>,
    classes: BTreeSet<String>,
    /// Text content
    pub text: String,
    /// Current value of form controls
    pub value: String,
    /// Message set through the constraint-validation API; non-empty means invalid
    pub custom_validity: String,
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn with_class(mut self, class: &str) -> Self {
        self.add_class(class);
        self
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = Element>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    pub fn set_attr(&mut self, name: &str, value: &str) {
        self.attributes.insert(name.to_string(), value.to_string());
    }

    pub fn remove_attr(&mut self, name: &str) {
        self.attributes.remove(name);
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.contains(class)
    }

    pub fn add_class(&mut self, class: &str) {
        self.classes.insert(class.to_string());
    }

    pub fn remove_class(&mut self, class: &str) {
        self.classes.remove(class);
    }

    /// Add or remove `class` depending on `on`.
    pub fn toggle_class(&mut self, class: &str, on: bool) {
        if on {
            self.add_class(class);
        } else {
            self.remove_class(class);
        }
    }

    pub fn is(&self, id: &str) -> bool {
        self.id.as_deref() == Some(id)
    }

    /// Pre-order walk over this element and its descendants.
    pub fn walk<'a>(&'a self, f: &mut impl FnMut(&'a Element)) {
        f(self);
        for child in &self.children {
            child.walk(f);
        }
    }

    pub fn walk_mut(&mut self, f: &mut impl FnMut(&mut Element)) {
        f(self);
        for child in &mut self.children {
            child.walk_mut(f);
        }
    }

    pub fn find(&self, id: &str) -> Option<&Element> {
        if self.is(id) {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut Element> {
        if self.is(id) {
            return Some(self);
        }
        self.children.iter_mut().find_map(|child| child.find_mut(id))
    }

    /// Whether an element with `id` is this element or one of its descendants.
    pub fn contains(&self, id: &str) -> bool {
        self.find(id).is_some()
    }

    /// Form controls (`input`, `textarea`, `select`) in this subtree.
    pub fn controls(&self) -> Vec<&Element> {
        let mut out = Vec::new();
        self.walk(&mut |el| {
            if el.is_control() {
                out.push(el);
            }
        });
        out
    }

    pub fn is_control(&self) -> bool {
        matches!(self.tag.as_str(), "input" | "textarea" | "select")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub title: String,
    /// The `<html>` element
    pub root: Element,
    /// Id of the element holding input focus
    pub focused: Option<String>,
    /// Path of a navigation requested by the page, if any
    pub location: Option<String>,
}

impl Document {
    pub fn new(root: Element) -> Self {
        Self {
            title: String::new(),
            root,
            focused: None,
            location: None,
        }
    }

    pub fn get(&self, id: &str) -> Option<&Element> {
        self.root.find(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Element> {
        self.root.find_mut(id)
    }

    /// Text content of the element with `id`, if present.
    pub fn text_of(&self, id: &str) -> Option<&str> {
        self.get(id).map(|el| el.text.as_str())
    }

    pub fn lang(&self) -> Option<&str> {
        self.root.attr("lang")
    }

    pub fn dir(&self) -> Option<&str> {
        self.root.attr("dir")
    }

    /// The `<meta name="description">` element.
    pub fn meta_description(&self) -> Option<&Element> {
        let mut found = None;
        self.root.walk(&mut |el| {
            if found.is_none() && is_meta_description(el) {
                found = Some(el);
            }
        });
        found
    }

    pub fn set_meta_description(&mut self, content: &str) -> bool {
        let mut updated = false;
        self.root.walk_mut(&mut |el| {
            if !updated && is_meta_description(el) {
                el.set_attr("content", content);
                updated = true;
            }
        });
        updated
    }

    /// Whether the element with `id` sits inside the element with `ancestor`
    /// (or is it). Unknown ids are never inside anything.
    pub fn is_within(&self, id: &str, ancestor: &str) -> bool {
        self.get(ancestor).is_some_and(|el| el.contains(id))
    }
}

fn is_meta_description(el: &Element) -> bool {
    el.tag == "meta" && el.attr("name") == Some("description")
}

/// Element ids the engine addresses directly.
pub mod ids {
    pub const LANG_TOGGLE: &str = "langToggle";
    pub const THEME_TOGGLE: &str = "themeToggle";

    pub const NAV: &str = "siteNav";
    pub const NAV_TOGGLE: &str = "navToggle";
    pub const NAV_MENU: &str = "navMenu";

    pub const PRIMARY_BUTTON: &str = "primaryBtn";
    pub const SECONDARY_BUTTON: &str = "secondaryBtn";

    pub const CHAT_WIDGET: &str = "chatWidget";
    pub const CHAT_TOGGLE: &str = "chatToggle";
    pub const CHAT_PANEL: &str = "chatPanel";
    pub const CHAT_CLOSE: &str = "chatClose";
    pub const CHAT_LOG: &str = "chatLog";
    pub const CHAT_FORM: &str = "chatForm";
    pub const CHAT_INPUT: &str = "chatInput";

    pub const CONTACT_FORM: &str = "contactForm";
}

fn text_marked(tag: &str, id: &str, key: &str, text: &str) -> Element {
    Element::new(tag)
        .with_id(id)
        .with_attr("data-i18n", key)
        .with_text(text)
}

fn field(label_id: &str, label_key: &str, label: &str, control: Element) -> Element {
    Element::new("div")
        .with_class("field")
        .with_child(text_marked("label", label_id, label_key, label))
        .with_child(control)
        .with_child(Element::new("small").with_class("error").with_attr("aria-live", "polite"))
}

/// The site's standard page: header with toggles and collapsible nav, hero,
/// cards, stats, products, contact form and chat widget, all carrying
/// translation markers. Text starts out in English.
pub fn skeleton() -> Document {
    let head = Element::new("head").with_child(
        Element::new("meta")
            .with_attr("name", "description")
            .with_attr("content", ""),
    );

    let nav = Element::new("nav")
        .with_id(ids::NAV)
        .with_attr("data-state", "closed")
        .with_child(
            Element::new("button")
                .with_id(ids::NAV_TOGGLE)
                .with_attr("aria-controls", ids::NAV_MENU)
                .with_attr("aria-expanded", "false")
                .with_attr("data-i18n-aria-label", "header.menu")
                .with_attr("aria-label", "Menu"),
        )
        .with_child(
            Element::new("ul")
                .with_id(ids::NAV_MENU)
                .with_attr("aria-hidden", "true")
                .with_children([
                    Element::new("li").with_child(
                        text_marked("a", "navProducts", "header.nav_products", "Products")
                            .with_attr("href", "/products"),
                    ),
                    Element::new("li").with_child(
                        text_marked("a", "navContact", "header.nav_contact", "Contact")
                            .with_attr("href", "/contact"),
                    ),
                    Element::new("li").with_child(
                        text_marked("a", "ctaQuote", "header.cta_quote", "Get a quote")
                            .with_attr("href", "/contact"),
                    ),
                ]),
        );

    let header = Element::new("header")
        .with_child(text_marked("a", "brand", "header.brand", "Brand").with_attr("href", "/"))
        .with_child(Element::new("button").with_id(ids::LANG_TOGGLE).with_text("EN"))
        .with_child(Element::new("button").with_id(ids::THEME_TOGGLE))
        .with_child(nav);

    let hero = Element::new("section")
        .with_id("hero")
        .with_child(text_marked("p", "eyebrow", "hero.eyebrow", ""))
        .with_child(text_marked("h1", "title", "hero.title", ""))
        .with_child(text_marked("p", "subtitle", "hero.subtitle", ""))
        .with_child(text_marked("button", ids::PRIMARY_BUTTON, "hero.primary", ""))
        .with_child(text_marked("button", ids::SECONDARY_BUTTON, "hero.secondary", ""));

    let cards = Element::new("section").with_id("cards").with_children((0..3).map(|i| {
        Element::new("article")
            .with_id(&format!("card{}", i + 1))
            .with_class("reveal")
            .with_child(
                Element::new("h3").with_attr("data-i18n", &format!("sections.cards[{}].title", i)),
            )
            .with_child(
                Element::new("p").with_attr("data-i18n", &format!("sections.cards[{}].desc", i)),
            )
    }));

    let stats = Element::new("section").with_id("stats").with_children((0..3).map(|i| {
        Element::new("div")
            .with_id(&format!("stat{}", i + 1))
            .with_child(
                Element::new("span")
                    .with_class("k")
                    .with_attr("data-i18n", &format!("sections.stats[{}].k", i)),
            )
            .with_child(
                Element::new("span")
                    .with_class("v")
                    .with_attr("data-i18n", &format!("sections.stats[{}].v", i)),
            )
    }));

    let products = Element::new("section")
        .with_id("products")
        .with_child(text_marked("h2", "productsTitle", "products.title", "Products"));

    let contact_form = Element::new("form")
        .with_id(ids::CONTACT_FORM)
        .with_attr("novalidate", "")
        .with_child(field(
            "nameLabel",
            "contact.name",
            "Name",
            Element::new("input")
                .with_id("name")
                .with_attr("name", "name")
                .with_attr("type", "text")
                .with_attr("required", "")
                .with_attr("data-i18n-placeholder", "contact.name_placeholder"),
        ))
        .with_child(field(
            "phoneLabel",
            "contact.phone",
            "Phone",
            Element::new("input")
                .with_id("phone")
                .with_attr("name", "phone")
                .with_attr("type", "tel")
                .with_attr("required", "")
                .with_attr("data-i18n-placeholder", "contact.phone_placeholder"),
        ))
        .with_child(field(
            "emailLabel",
            "contact.email",
            "Email",
            Element::new("input")
                .with_id("email")
                .with_attr("name", "email")
                .with_attr("type", "email")
                .with_attr("required", "")
                .with_attr("data-i18n-placeholder", "contact.email_placeholder"),
        ))
        .with_child(field(
            "messageLabel",
            "contact.message",
            "Message",
            Element::new("textarea")
                .with_id("message")
                .with_attr("name", "message")
                .with_attr("required", "")
                .with_attr("maxlength", "2000")
                .with_attr("data-i18n-placeholder", "contact.message_placeholder"),
        ))
        .with_child(
            text_marked("button", "sendBtn", "contact.send", "Send").with_attr("type", "submit"),
        );

    let contact = Element::new("section")
        .with_id("contact")
        .with_child(text_marked("h2", "contactTitle", "contact.title", "Contact"))
        .with_child(contact_form);

    let chat = Element::new("div")
        .with_id(ids::CHAT_WIDGET)
        .with_attr("data-state", "closed")
        .with_child(
            Element::new("button")
                .with_id(ids::CHAT_TOGGLE)
                .with_attr("aria-controls", ids::CHAT_PANEL)
                .with_attr("aria-expanded", "false")
                .with_attr("data-i18n-aria-label", "chat.open"),
        )
        .with_child(
            Element::new("div")
                .with_id(ids::CHAT_PANEL)
                .with_attr("role", "dialog")
                .with_attr("aria-hidden", "true")
                .with_child(text_marked("h4", "chatTitle", "chat.title", "Chat"))
                .with_child(
                    Element::new("button")
                        .with_id(ids::CHAT_CLOSE)
                        .with_attr("data-i18n-aria-label", "chat.close")
                        .with_text("×"),
                )
                .with_child(
                    Element::new("div")
                        .with_id(ids::CHAT_LOG)
                        .with_attr("role", "log")
                        .with_attr("aria-live", "polite")
                        .with_attr("data-i18n-aria-description", "chat.log"),
                )
                .with_child(
                    Element::new("form")
                        .with_id(ids::CHAT_FORM)
                        .with_child(
                            Element::new("input")
                                .with_id(ids::CHAT_INPUT)
                                .with_attr("type", "text")
                                .with_attr("data-i18n-placeholder", "chat.placeholder"),
                        )
                        .with_child(
                            text_marked("button", "chatSend", "chat.send", "Send")
                                .with_attr("type", "submit"),
                        ),
                ),
        );

    let body = Element::new("body")
        .with_attr("data-page", "home")
        .with_child(header)
        .with_child(
            Element::new("main")
                .with_child(hero)
                .with_child(cards)
                .with_child(stats)
                .with_child(products)
                .with_child(contact),
        )
        .with_child(chat);

    Document::new(Element::new("html").with_child(head).with_child(body))
}
