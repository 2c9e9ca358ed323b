//! Configuration module

mod contentful;
mod site;

pub use contentful::ContentfulConfig;
pub use site::SiteConfig;
