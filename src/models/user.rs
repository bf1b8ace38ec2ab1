//! Fields shared by followers and followed accounts

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex_lite::Regex;
use serde::{Deserialize, Serialize};

/// A user appearing in one of the relationship lists
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Stable platform id (identity of the record)
    pub id: String,
    /// Handle without the leading @
    pub username: String,
    /// Display name
    pub display_name: String,
    /// Avatar URL
    pub avatar_url: Option<String>,
    /// Verified badge
    pub is_verified: bool,
    /// Their own follower count
    pub follower_count: u64,
    /// Profile bio
    pub bio: String,
    /// Content category inferred from the bio
    pub content_category: ContentCategory,
}

impl UserRecord {
    /// Minimal record with only an id; everything else empty
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: String::new(),
            display_name: String::new(),
            avatar_url: None,
            is_verified: false,
            follower_count: 0,
            bio: String::new(),
            content_category: ContentCategory::default(),
        }
    }

    /// Best human-readable name: display name, then @username, then id
    pub fn label(&self) -> String {
        if !self.display_name.trim().is_empty() {
            self.display_name.clone()
        } else if !self.username.is_empty() {
            format!("@{}", self.username)
        } else {
            self.id.clone()
        }
    }
}

/// Common view over followers and followed accounts
pub trait Relationship {
    /// The user on the other side of the relationship
    fn user(&self) -> &UserRecord;

    /// When the relationship started
    fn followed_at(&self) -> DateTime<Utc>;

    /// Stable id of the other user
    fn id(&self) -> &str {
        &self.user().id
    }
}

/// Rough topic of an account, inferred from its bio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ContentCategory {
    /// Software, gadgets, startups
    Tech,
    /// Musicians, DJs, producers
    Music,
    /// Training, wellness
    Fitness,
    /// Cooking, restaurants
    Food,
    /// Travel and adventure
    Travel,
    /// Games and streaming
    Gaming,
    /// Visual arts, photography, design
    Art,
    /// Fashion and beauty
    Fashion,
    /// Entrepreneurs and marketing
    Business,
    /// Teachers, science, learning
    Education,
    /// Everything else
    #[default]
    Lifestyle,
}

static CATEGORY_RULES: LazyLock<Vec<(ContentCategory, Regex)>> = LazyLock::new(|| {
    [
        (
            ContentCategory::Tech,
            r"(?i)\b(tech|developer|engineer|software|code|coding|programmer|ai|startup)\b",
        ),
        (
            ContentCategory::Music,
            r"(?i)\b(music|musician|singer|dj|producer|band|songwriter|rapper)\b",
        ),
        (
            ContentCategory::Fitness,
            r"(?i)\b(fitness|gym|workout|trainer|yoga|running|athlete|wellness)\b",
        ),
        (
            ContentCategory::Food,
            r"(?i)\b(food|foodie|chef|cooking|recipes?|baker|restaurant)\b",
        ),
        (
            ContentCategory::Travel,
            r"(?i)\b(travel|traveler|traveller|wanderlust|explorer|nomad)\b",
        ),
        (
            ContentCategory::Gaming,
            r"(?i)\b(gaming|gamer|streamer|esports|twitch)\b",
        ),
        (
            ContentCategory::Art,
            r"(?i)\b(art|artist|illustrator|photographer|photography|designer|painter)\b",
        ),
        (
            ContentCategory::Fashion,
            r"(?i)\b(fashion|style|stylist|beauty|makeup|model)\b",
        ),
        (
            ContentCategory::Business,
            r"(?i)\b(business|entrepreneur|founder|ceo|marketing|investor)\b",
        ),
        (
            ContentCategory::Education,
            r"(?i)\b(teacher|education|science|scientist|professor|student|learning)\b",
        ),
    ]
    .into_iter()
    .filter_map(|(category, pattern)| Regex::new(pattern).ok().map(|re| (category, re)))
    .collect()
});

impl ContentCategory {
    /// Infer a category from free-form bio text; first matching rule wins
    pub fn infer(bio: &str) -> Self {
        CATEGORY_RULES
            .iter()
            .find(|(_, re)| re.is_match(bio))
            .map_or(Self::Lifestyle, |(category, _)| *category)
    }

    /// Display name
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Tech => "Tech",
            Self::Music => "Music",
            Self::Fitness => "Fitness",
            Self::Food => "Food",
            Self::Travel => "Travel",
            Self::Gaming => "Gaming",
            Self::Art => "Art",
            Self::Fashion => "Fashion",
            Self::Business => "Business",
            Self::Education => "Education",
            Self::Lifestyle => "Lifestyle",
        }
    }
}

impl std::fmt::Display for ContentCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
