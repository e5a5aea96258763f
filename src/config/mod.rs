//! Configuration module

mod site;

pub use site::ContentApiConfig;
pub use site::HomeConfig;
pub use site::PostConfig;
pub use site::PreviewConfig;
pub use site::SiteConfig;
