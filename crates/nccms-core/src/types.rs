//! Domain types for the CMS admin client

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of value held by the token store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Short-lived bearer credential
    Access,
    /// Longer-lived credential exchanged for new access tokens
    Refresh,
    /// Username kept by "remember me"
    RememberedUsername,
}

impl TokenKind {
    /// All kinds, in storage order
    pub const ALL: [Self; 3] = [Self::Access, Self::Refresh, Self::RememberedUsername];

    /// Fixed key under which the value is persisted
    #[must_use]
    pub const fn storage_key(self) -> &'static str {
        match self {
            Self::Access => "nc_jwt_access",
            Self::Refresh => "nc_jwt_refresh",
            Self::RememberedUsername => "nc_jwt_username",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.storage_key())
    }
}

/// Snapshot of the persisted session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Current access token
    pub access_token: Option<String>,
    /// Current refresh token
    pub refresh_token: Option<String>,
    /// Username remembered at login
    pub remembered_username: Option<String>,
}

impl Session {
    /// Whether an access token is present
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }

    /// Value stored for `kind`
    #[must_use]
    pub fn get(&self, kind: TokenKind) -> Option<&str> {
        match kind {
            TokenKind::Access => self.access_token.as_deref(),
            TokenKind::Refresh => self.refresh_token.as_deref(),
            TokenKind::RememberedUsername => self.remembered_username.as_deref(),
        }
    }
}

/// Background style of a hero section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BgType {
    /// Decorative pattern
    #[default]
    Pattern,
    /// Background image from the media flow
    Image,
    /// Solid colour
    Solid,
}

impl fmt::Display for BgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pattern => "pattern",
            Self::Image => "image",
            Self::Solid => "solid",
        })
    }
}

impl FromStr for BgType {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pattern" => Ok(Self::Pattern),
            "image" => Ok(Self::Image),
            "solid" => Ok(Self::Solid),
            other => Err(crate::Error::validation(
                "bg_type",
                format!("expected pattern, image or solid, got '{other}'"),
            )),
        }
    }
}

/// Hero section as stored by the CMS
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hero {
    /// Server-assigned identifier
    pub id: i64,
    /// Headline
    #[serde(default)]
    pub title: String,
    /// Sub-headline
    #[serde(default)]
    pub subtitle: Option<String>,
    /// Primary call-to-action label
    #[serde(default)]
    pub cta_primary_label: Option<String>,
    /// Primary call-to-action link
    #[serde(default)]
    pub cta_primary_href: Option<String>,
    /// Secondary call-to-action label
    #[serde(default)]
    pub cta_secondary_label: Option<String>,
    /// Secondary call-to-action link
    #[serde(default)]
    pub cta_secondary_href: Option<String>,
    /// Background style
    #[serde(default)]
    pub bg_type: BgType,
    /// Background media URL, set through the media flow
    #[serde(default, skip_serializing)]
    pub bg_media_url: Option<String>,
    /// Whether this hero is shown on the public site
    #[serde(default)]
    pub is_active: bool,
}

impl Hero {
    /// Title for display, never empty
    #[must_use]
    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            "Untitled hero"
        } else {
            &self.title
        }
    }
}

/// Content collections managed by the CMS
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// Global site settings
    SiteSettings,
    /// Hero sections
    Hero,
    /// Navigation menu entries
    NavigationMenu,
    /// Footer links
    FooterLinks,
    /// Pricing plans
    PricingPlans,
    /// Customer testimonials
    Testimonials,
    /// FAQ entries
    FaqItems,
}

impl ResourceKind {
    /// All collections, in dashboard order
    pub const ALL: [Self; 7] = [
        Self::SiteSettings,
        Self::Hero,
        Self::NavigationMenu,
        Self::FooterLinks,
        Self::PricingPlans,
        Self::Testimonials,
        Self::FaqItems,
    ];

    /// Collection path segment under the CMS prefix
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::SiteSettings => "site-settings",
            Self::Hero => "hero",
            Self::NavigationMenu => "navigation-menu",
            Self::FooterLinks => "footer-links",
            Self::PricingPlans => "pricing-plans",
            Self::Testimonials => "testimonials",
            Self::FaqItems => "faq-items",
        }
    }

    /// Human title used on dashboard cards
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::SiteSettings => "Site Settings",
            Self::Hero => "Hero Blocks",
            Self::NavigationMenu => "Navigation Items",
            Self::FooterLinks => "Footer Links",
            Self::PricingPlans => "Pricing Plans",
            Self::Testimonials => "Testimonials",
            Self::FaqItems => "FAQ Entries",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

impl FromStr for ResourceKind {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().trim_matches('/').replace('_', "-").to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.path() == wanted)
            .ok_or_else(|| {
                crate::Error::validation("resource", format!("unknown CMS collection '{s}'"))
            })
    }
}
