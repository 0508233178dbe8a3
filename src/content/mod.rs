mod binding;
mod defaults;
mod image;
pub mod list;
mod models;

pub use binding::{ContentBinding, DocumentOrigin, LoadOptions};
pub use defaults::{default_document, ContentKey};
pub use image::{capture, ImageError, ImagePolicy};
pub use models::{
  Article, BoardContent, BoardMember, CareersContent, ContactContent, FooterContent, HeroContent,
  HomeContent, JobListing, NavItem, NavigationContent, NewsContent, QuickLink, ServiceCard,
  ServicesContent,
};
