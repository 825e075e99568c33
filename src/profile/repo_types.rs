use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

/// Platforms a profile may link to. Anything else in a request is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SocialPlatform {
    Youtube,
    Twitter,
    Facebook,
    Linkedin,
    Instagram,
}

impl SocialPlatform {
    pub const ALL: [SocialPlatform; 5] = [
        SocialPlatform::Youtube,
        SocialPlatform::Twitter,
        SocialPlatform::Facebook,
        SocialPlatform::Linkedin,
        SocialPlatform::Instagram,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SocialPlatform::Youtube => "youtube",
            SocialPlatform::Twitter => "twitter",
            SocialPlatform::Facebook => "facebook",
            SocialPlatform::Linkedin => "linkedin",
            SocialPlatform::Instagram => "instagram",
        }
    }
}

pub type SocialLinks = BTreeMap<SocialPlatform, String>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Experience {
    pub id: Uuid,
    pub title: String,
    pub company: String,
    pub location: Option<String>,
    #[serde(with = "iso_date")]
    pub from: Date,
    #[serde(with = "iso_date::option", default)]
    pub to: Option<Date>,
    pub current: bool,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Education {
    pub id: Uuid,
    pub school: String,
    pub degree: String,
    pub fieldofstudy: String,
    #[serde(with = "iso_date")]
    pub from: Date,
    #[serde(with = "iso_date::option", default)]
    pub to: Option<Date>,
    pub current: bool,
    pub description: Option<String>,
}

/// Embedded entries share removal-by-id.
pub trait Entry {
    fn id(&self) -> Uuid;
}

impl Entry for Experience {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Entry for Education {
    fn id(&self) -> Uuid {
        self.id
    }
}

/// Owner fields joined in from the users table on every read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileOwner {
    pub id: Uuid,
    pub name: String,
    pub avatar: String,
}

/// Profile document as returned to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub user: ProfileOwner,
    pub handle: String,
    pub company: Option<String>,
    pub website: Option<String>,
    pub location: Option<String>,
    pub status: String,
    pub bio: Option<String>,
    pub githubusername: Option<String>,
    pub skills: Vec<String>,
    pub social: SocialLinks,
    pub experience: Vec<Experience>,
    pub education: Vec<Education>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Allow-listed write set produced from a validated request.
///
/// `handle`, `status`, `skills` and `social` are always written; the optional
/// text fields are only written when present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileFields {
    pub handle: String,
    pub status: String,
    pub skills: Vec<String>,
    pub company: Option<String>,
    pub website: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub githubusername: Option<String>,
    pub social: SocialLinks,
}

/// Row shape of the profiles/users join.
#[derive(Debug, FromRow)]
pub struct ProfileRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub user_name: String,
    pub user_avatar: String,
    pub handle: String,
    pub company: Option<String>,
    pub website: Option<String>,
    pub location: Option<String>,
    pub status: String,
    pub bio: Option<String>,
    pub githubusername: Option<String>,
    pub skills: Vec<String>,
    pub social: Json<SocialLinks>,
    pub experience: Json<Vec<Experience>>,
    pub education: Json<Vec<Education>>,
    pub created_at: OffsetDateTime,
}

impl From<ProfileRow> for Profile {
    fn from(r: ProfileRow) -> Self {
        Self {
            id: r.id,
            user: ProfileOwner {
                id: r.user_id,
                name: r.user_name,
                avatar: r.user_avatar,
            },
            handle: r.handle,
            company: r.company,
            website: r.website,
            location: r.location,
            status: r.status,
            bio: r.bio,
            githubusername: r.githubusername,
            skills: r.skills,
            social: r.social.0,
            experience: r.experience.0,
            education: r.education.0,
            created_at: r.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn social_links_serialize_with_platform_names() {
        let mut social = SocialLinks::new();
        social.insert(SocialPlatform::Linkedin, "https://linkedin.com/in/ada".into());
        let json = serde_json::to_value(&social).expect("serialize");
        assert_eq!(json["linkedin"], "https://linkedin.com/in/ada");
    }

    #[test]
    fn entry_dates_use_iso_form() {
        let exp = Experience {
            id: Uuid::nil(),
            title: "Engineer".into(),
            company: "Acme".into(),
            location: None,
            from: date!(2019 - 03 - 01),
            to: None,
            current: true,
            description: None,
        };
        let json = serde_json::to_value(&exp).expect("serialize");
        assert_eq!(json["from"], "2019-03-01");
        assert!(json["to"].is_null());
        let back: Experience = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back, exp);
    }
}
