//! Configuration module

mod site;

pub use site::ContactConfig;
pub use site::HighlightConfig;
pub use site::Profile;
pub use site::ReadingConfig;
pub use site::Role;
pub use site::SiteConfig;
pub use site::SocialLink;
pub use site::ACCESS_KEY_ENV;
