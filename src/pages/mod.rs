//! Page assembly: fetch and shape the data each page renders

pub mod home;
pub mod post;

pub use home::{HomeProps, Listing};
pub use post::{get_static_paths, PostProps};
