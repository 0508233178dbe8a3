//! Typed document shapes, one per content key.
//!
//! The store itself is schemaless; these structs are the canonical shape each
//! editor page owns, and the source of the default documents in
//! [`super::defaults`]. Unknown fields are preserved only at the JSON level,
//! so pages that round-trip through these types should do so deliberately.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HeroContent {
  #[serde(default)]
  pub title: String,
  #[serde(default)]
  pub subtitle: String,
  #[serde(default)]
  pub cta_label: String,
  #[serde(default)]
  pub cta_href: String,
  /// Inline `data:` URI, see the image capture module.
  #[serde(default)]
  pub background_image: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HomeContent {
  #[serde(default)]
  pub hero: HeroContent,
  #[serde(default)]
  pub intro: String,
  #[serde(default)]
  pub highlights: Vec<ServiceCard>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NavItem {
  pub id: String,
  #[serde(default)]
  pub label: String,
  #[serde(default)]
  pub href: String,
  #[serde(default)]
  pub children: Vec<NavItem>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NavigationContent {
  #[serde(default)]
  pub items: Vec<NavItem>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuickLink {
  pub id: String,
  #[serde(default)]
  pub label: String,
  #[serde(default)]
  pub href: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FooterContent {
  #[serde(default)]
  pub quick_links: Vec<QuickLink>,
  #[serde(default)]
  pub social: Vec<QuickLink>,
  #[serde(default)]
  pub address: String,
  #[serde(default)]
  pub legal: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BoardMember {
  pub id: String,
  #[serde(default)]
  pub name: String,
  #[serde(default)]
  pub title: String,
  #[serde(default)]
  pub bio: String,
  /// Inline `data:` URI.
  #[serde(default)]
  pub photo: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BoardContent {
  #[serde(default)]
  pub directors: Vec<BoardMember>,
  #[serde(default)]
  pub partners: Vec<BoardMember>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceCard {
  pub id: String,
  #[serde(default)]
  pub title: String,
  #[serde(default)]
  pub description: String,
  #[serde(default)]
  pub icon: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServicesContent {
  #[serde(default)]
  pub heading: String,
  #[serde(default)]
  pub cards: Vec<ServiceCard>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Article {
  pub id: String,
  #[serde(default)]
  pub title: String,
  #[serde(default)]
  pub date: String,
  #[serde(default)]
  pub summary: String,
  #[serde(default)]
  pub body: String,
  #[serde(default)]
  pub image: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewsContent {
  #[serde(default)]
  pub articles: Vec<Article>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobListing {
  pub id: String,
  #[serde(default)]
  pub title: String,
  #[serde(default)]
  pub location: String,
  #[serde(default)]
  pub department: String,
  #[serde(default)]
  pub description: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CareersContent {
  #[serde(default)]
  pub intro: String,
  #[serde(default)]
  pub jobs: Vec<JobListing>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactContent {
  #[serde(default)]
  pub email: String,
  #[serde(default)]
  pub phone: String,
  #[serde(default)]
  pub address: String,
}
