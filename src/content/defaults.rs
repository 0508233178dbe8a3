//! Canonical default documents.
//!
//! Every editor page falls back to a default document when nothing has been
//! saved under its key yet. Those defaults live here, in one registry keyed
//! by content key, instead of being duplicated per page.

use serde_json::Value;

use super::models::*;

/// The content keys owned by editor pages.
///
/// Ownership is convention: the store accepts any valid key, but these are
/// the keys the admin panel edits and the registry has defaults for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKey {
  Home,
  Navigation,
  Footer,
  Board,
  Services,
  News,
  Careers,
  Contact,
}

impl ContentKey {
  pub const ALL: [ContentKey; 8] = [
    ContentKey::Home,
    ContentKey::Navigation,
    ContentKey::Footer,
    ContentKey::Board,
    ContentKey::Services,
    ContentKey::News,
    ContentKey::Careers,
    ContentKey::Contact,
  ];

  pub fn as_str(&self) -> &'static str {
    match self {
      ContentKey::Home => "home",
      ContentKey::Navigation => "navigation",
      ContentKey::Footer => "footer",
      ContentKey::Board => "board",
      ContentKey::Services => "services",
      ContentKey::News => "news",
      ContentKey::Careers => "careers",
      ContentKey::Contact => "contact",
    }
  }

  pub fn parse(s: &str) -> Option<ContentKey> {
    Self::ALL.iter().copied().find(|k| k.as_str() == s)
  }
}

impl std::fmt::Display for ContentKey {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Returns the default document for `key`.
///
/// Serialization of the typed models cannot fail, so this is infallible.
pub fn default_document(key: ContentKey) -> Value {
  let value = match key {
    ContentKey::Home => serde_json::to_value(default_home()),
    ContentKey::Navigation => serde_json::to_value(default_navigation()),
    ContentKey::Footer => serde_json::to_value(default_footer()),
    ContentKey::Board => serde_json::to_value(BoardContent::default()),
    ContentKey::Services => serde_json::to_value(default_services()),
    ContentKey::News => serde_json::to_value(NewsContent::default()),
    ContentKey::Careers => serde_json::to_value(default_careers()),
    ContentKey::Contact => serde_json::to_value(default_contact()),
  };
  value.unwrap_or(Value::Null)
}

fn default_home() -> HomeContent {
  HomeContent {
    hero: HeroContent {
      title: "Backing founders who build what lasts".to_string(),
      subtitle: "Early-stage capital and operating support for enduring companies.".to_string(),
      cta_label: "Meet the team".to_string(),
      cta_href: "/team".to_string(),
      background_image: None,
    },
    intro: String::new(),
    highlights: Vec::new(),
  }
}

fn default_navigation() -> NavigationContent {
  NavigationContent {
    items: vec![
      nav("nav-about", "About", "/about"),
      nav("nav-team", "Team", "/team"),
      nav("nav-portfolio", "Portfolio", "/portfolio"),
      nav("nav-news", "News", "/news"),
      nav("nav-contact", "Contact", "/contact"),
    ],
  }
}

fn default_footer() -> FooterContent {
  FooterContent {
    quick_links: vec![
      link("ql-about", "About", "/about"),
      link("ql-team", "Team", "/team"),
      link("ql-portfolio", "Portfolio", "/portfolio"),
      link("ql-careers", "Careers", "/careers"),
      link("ql-contact", "Contact", "/contact"),
    ],
    social: Vec::new(),
    address: String::new(),
    legal: "All rights reserved.".to_string(),
  }
}

fn default_services() -> ServicesContent {
  ServicesContent {
    heading: "How we work with founders".to_string(),
    cards: Vec::new(),
  }
}

fn default_careers() -> CareersContent {
  CareersContent {
    intro: "We are always looking for exceptional people.".to_string(),
    jobs: Vec::new(),
  }
}

fn default_contact() -> ContactContent {
  ContactContent {
    email: "hello@example.com".to_string(),
    phone: String::new(),
    address: String::new(),
  }
}

fn nav(id: &str, label: &str, href: &str) -> NavItem {
  NavItem {
    id: id.to_string(),
    label: label.to_string(),
    href: href.to_string(),
    children: Vec::new(),
  }
}

fn link(id: &str, label: &str, href: &str) -> QuickLink {
  QuickLink {
    id: id.to_string(),
    label: label.to_string(),
    href: href.to_string(),
  }
}
