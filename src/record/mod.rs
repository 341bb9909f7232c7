//! Record domain shared by every module of the affairs dashboard.
//!
//! Each module (partners, campus visits, memberships, ...) is an
//! independent collection of [`Record`]s. The collections share one
//! structural contract, so the lifecycle engine, the expiry evaluator and
//! the statistics aggregator are written once and parameterized by
//! [`EntityType`], whose static [`EntitySchema`] and [`StatsProfile`]
//! describe what differs between modules.

pub mod activity;
pub mod core;
pub mod expiry;
pub mod lifecycle;
pub mod query;
pub mod schema;
pub mod stats;
pub mod store;

pub use self::core::actor::{Actor, Role};
pub use self::core::clock::{Clock, FixedClock, SystemClock};
pub use self::core::error::RecordError;
pub use self::core::id::RecordId;
pub use self::core::model::{Fields, LifecycleStatus, Record, RecordStatus};
pub use self::lifecycle::LifecycleEngine;
pub use self::schema::EntitySchema;
pub use self::stats::{StatsAggregator, StatsProfile, StatsSummary};
pub use self::store::{FileStore, MemoryStore, RecordStore};

use serde::{Deserialize, Serialize};

/// Module discriminator. Serialized as the module's collection name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityType {
    #[serde(rename = "partners")]
    Partner,
    #[serde(rename = "campus-visits")]
    CampusVisit,
    #[serde(rename = "events")]
    Event,
    #[serde(rename = "conferences")]
    Conference,
    #[serde(rename = "mou-signing-ceremonies")]
    MouSigningCeremony,
    #[serde(rename = "scholars-in-residence")]
    ScholarInResidence,
    #[serde(rename = "mou-updates")]
    MouUpdate,
    #[serde(rename = "immersion-programs")]
    ImmersionProgram,
    #[serde(rename = "student-exchange")]
    StudentExchange,
    #[serde(rename = "masters-abroad")]
    MastersAbroad,
    #[serde(rename = "memberships")]
    Membership,
    #[serde(rename = "digital-media")]
    DigitalMedia,
    #[serde(rename = "outreach")]
    Outreach,
    #[serde(rename = "social-media")]
    SocialMedia,
}

impl EntityType {
    /// Every module, in dashboard order.
    pub const ALL: [EntityType; 14] = [
        EntityType::Partner,
        EntityType::CampusVisit,
        EntityType::Event,
        EntityType::Conference,
        EntityType::MouSigningCeremony,
        EntityType::ScholarInResidence,
        EntityType::MouUpdate,
        EntityType::ImmersionProgram,
        EntityType::StudentExchange,
        EntityType::MastersAbroad,
        EntityType::Membership,
        EntityType::DigitalMedia,
        EntityType::Outreach,
        EntityType::SocialMedia,
    ];

    /// Collection name used for storage folders and routes.
    #[must_use]
    pub fn collection(self) -> &'static str {
        match self {
            EntityType::Partner => "partners",
            EntityType::CampusVisit => "campus-visits",
            EntityType::Event => "events",
            EntityType::Conference => "conferences",
            EntityType::MouSigningCeremony => "mou-signing-ceremonies",
            EntityType::ScholarInResidence => "scholars-in-residence",
            EntityType::MouUpdate => "mou-updates",
            EntityType::ImmersionProgram => "immersion-programs",
            EntityType::StudentExchange => "student-exchange",
            EntityType::MastersAbroad => "masters-abroad",
            EntityType::Membership => "memberships",
            EntityType::DigitalMedia => "digital-media",
            EntityType::Outreach => "outreach",
            EntityType::SocialMedia => "social-media",
        }
    }

    /// Model name as the dashboard labels it (e.g. `ScholarInResidence`).
    #[must_use]
    pub fn model_name(self) -> &'static str {
        match self {
            EntityType::Partner => "Partner",
            EntityType::CampusVisit => "CampusVisit",
            EntityType::Event => "Event",
            EntityType::Conference => "Conference",
            EntityType::MouSigningCeremony => "MouSigningCeremony",
            EntityType::ScholarInResidence => "ScholarInResidence",
            EntityType::MouUpdate => "MouUpdate",
            EntityType::ImmersionProgram => "ImmersionProgram",
            EntityType::StudentExchange => "StudentExchange",
            EntityType::MastersAbroad => "MastersAbroad",
            EntityType::Membership => "Membership",
            EntityType::DigitalMedia => "DigitalMedia",
            EntityType::Outreach => "Outreach",
            EntityType::SocialMedia => "SocialMedia",
        }
    }

    /// Static schema for this module.
    #[must_use]
    pub fn schema(self) -> &'static EntitySchema {
        schema::definitions::schema_for(self)
    }

    /// Static statistics profile for this module.
    #[must_use]
    pub fn stats_profile(self) -> &'static StatsProfile {
        stats::profiles::profile_for(self)
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.collection())
    }
}

impl std::str::FromStr for EntityType {
    type Err = RecordError;

    /// Accepts the collection name (`scholars-in-residence`) or the model
    /// name in any case and separator style (`ScholarInResidence`,
    /// `scholar_in_residence`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize_name(s);
        EntityType::ALL
            .into_iter()
            .find(|entity| {
                normalize_name(entity.collection()) == wanted
                    || normalize_name(entity.model_name()) == wanted
            })
            .ok_or_else(|| RecordError::UnknownEntity(s.to_string()))
    }
}

fn normalize_name(s: &str) -> String {
    s.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}
