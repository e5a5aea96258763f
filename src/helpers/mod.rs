//! Helper functions for pages and templates
//!
//! Date formatting, reading-time estimation, HTML escaping and URL building
//! shared by page assembly, templates and the generator.

mod date;
mod html;
mod reading;
mod url;

pub use date::*;
pub use html::*;
pub use reading::*;
pub use url::*;
