mod category;
mod post;
mod settings;
mod theme;
mod user;

pub use self::{
    category::Category,
    post::Post,
    settings::{FeatureFlags, SeoSettings, SiteSettings, SocialLinks, ThemeColors},
    theme::ThemeRecord,
    user::{Role, User},
};
