//! Helper functions shared by the page plan and the templates

mod case;
mod url;

pub use case::kebab_case;
pub use url::*;
