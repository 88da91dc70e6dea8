use serde::{Deserialize, Serialize};

/// Site-wide settings document, stored as JSON. Every level defaults so a
/// partial or missing file still yields a complete document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteSettings {
    pub site_title: String,
    pub site_description: String,
    pub site_keywords: String,
    pub site_author: String,
    pub social_links: SocialLinks,
    pub seo: SeoSettings,
    pub features: FeatureFlags,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<ThemeColors>,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            site_title: "Memory Blog".into(),
            site_description: "A personal blog about technology and life".into(),
            site_keywords: "blog,technology,programming,life".into(),
            site_author: "Blogger".into(),
            social_links: SocialLinks::default(),
            seo: SeoSettings::default(),
            features: FeatureFlags::default(),
            theme: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SocialLinks {
    pub github: String,
    pub twitter: String,
    pub weibo: String,
    pub zhihu: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeoSettings {
    pub baidu_verification: String,
    pub google_verification: String,
    pub ga_measurement_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureFlags {
    pub comments_enabled: bool,
    pub rss_enabled: bool,
    pub toc_enabled: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            comments_enabled: true,
            rss_enabled: true,
            toc_enabled: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeColors {
    pub primary_color: String,
    pub background_color: String,
    pub text_color: String,
}
