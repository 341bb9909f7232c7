//! Statistics registry: one [`StatsProfile`] per module.

use super::profile::{
    DistributionSpec, Eligibility, ExpirySpec, Predicate, RecentSpec, StatsProfile,
};
use crate::record::EntityType;

const SOCIAL_PLATFORMS: &[(&str, &str)] = &[
    ("Facebook", "fbLink"),
    ("Instagram", "instaLink"),
    ("LinkedIn", "linkedinLink"),
    ("VK", "vkLink"),
];

static PARTNER: StatsProfile = StatsProfile {
    entity: EntityType::Partner,
    eligibility: Eligibility::ActiveOnly,
    trend_field: Some("signingDate"),
    distinct: &[("countries", "country"), ("universities", "university")],
    counters: &[("active", Predicate::FieldEquals("activeStatus", "Active"))],
    distributions: &[
        DistributionSpec::field("countryDistribution", "country"),
        DistributionSpec::field("agreementTypeDistribution", "agreementType"),
        DistributionSpec::field("mouStatusDistribution", "mouStatus"),
        DistributionSpec::email_domain("emailDomainDistribution", "email"),
    ],
    sums: &[],
    averages: &[],
    expiry: Some(ExpirySpec {
        list_key: "expiringPartners",
    }),
    recent: None,
};

static CAMPUS_VISIT: StatsProfile = StatsProfile {
    entity: EntityType::CampusVisit,
    eligibility: Eligibility::ActiveOnly,
    trend_field: Some("date"),
    distinct: &[("countries", "country"), ("universities", "universityName")],
    counters: &[],
    distributions: &[
        DistributionSpec::field("countryDistribution", "country"),
        DistributionSpec::field("departmentDistribution", "department"),
        DistributionSpec::field("typeDistribution", "type"),
        DistributionSpec::field("purposeDistribution", "purpose"),
    ],
    sums: &[],
    averages: &[],
    expiry: None,
    recent: Some(RecentSpec {
        key: "recentVisits",
        date_field: "date",
    }),
};

static EVENT: StatsProfile = StatsProfile {
    entity: EntityType::Event,
    eligibility: Eligibility::All,
    trend_field: Some("date"),
    distinct: &[("eventTypes", "type"), ("departments", "department")],
    counters: &[],
    distributions: &[
        DistributionSpec::field("eventTypeDistribution", "type"),
        DistributionSpec::field("departmentDistribution", "department"),
        DistributionSpec::field("campusDistribution", "campus"),
    ],
    sums: &[],
    averages: &[],
    expiry: None,
    recent: Some(RecentSpec {
        key: "recentEvents",
        date_field: "date",
    }),
};

static CONFERENCE: StatsProfile = StatsProfile {
    entity: EntityType::Conference,
    eligibility: Eligibility::ActiveOnly,
    trend_field: Some("date"),
    distinct: &[("countries", "country"), ("departments", "department")],
    counters: &[],
    distributions: &[
        DistributionSpec::field("countryDistribution", "country"),
        DistributionSpec::field("departmentDistribution", "department"),
    ],
    sums: &[],
    averages: &[],
    expiry: None,
    recent: None,
};

static MOU_SIGNING_CEREMONY: StatsProfile = StatsProfile {
    entity: EntityType::MouSigningCeremony,
    eligibility: Eligibility::ActiveOnly,
    trend_field: Some("date"),
    distinct: &[("universities", "university"), ("departments", "department")],
    counters: &[],
    distributions: &[
        DistributionSpec::field("departmentDistribution", "department"),
        DistributionSpec::field("typeDistribution", "type"),
    ],
    sums: &[],
    averages: &[],
    expiry: None,
    recent: None,
};

static SCHOLAR_IN_RESIDENCE: StatsProfile = StatsProfile {
    entity: EntityType::ScholarInResidence,
    eligibility: Eligibility::ActiveOnly,
    trend_field: Some("fromDate"),
    distinct: &[("countries", "country"), ("departments", "department")],
    counters: &[("active", Predicate::RecordStatusActive)],
    distributions: &[
        DistributionSpec::field("countryDistribution", "country"),
        DistributionSpec::field("departmentDistribution", "department"),
    ],
    sums: &[],
    averages: &[],
    expiry: Some(ExpirySpec {
        list_key: "endingResidencies",
    }),
    recent: Some(RecentSpec {
        key: "recentScholars",
        date_field: "fromDate",
    }),
};

static MOU_UPDATE: StatsProfile = StatsProfile {
    entity: EntityType::MouUpdate,
    eligibility: Eligibility::ActiveOnly,
    trend_field: Some("date"),
    distinct: &[("countries", "country"), ("universities", "university")],
    counters: &[("active", Predicate::RecordStatusActive)],
    distributions: &[
        DistributionSpec::field("countryDistribution", "country"),
        DistributionSpec::field("statusDistribution", "mouStatus"),
    ],
    sums: &[],
    averages: &[],
    expiry: Some(ExpirySpec {
        list_key: "expiringMous",
    }),
    recent: None,
};

static IMMERSION_PROGRAM: StatsProfile = StatsProfile {
    entity: EntityType::ImmersionProgram,
    eligibility: Eligibility::ActiveOnly,
    trend_field: Some("arrivalDate"),
    distinct: &[("countries", "country"), ("universities", "university")],
    counters: &[
        ("active", Predicate::RecordStatusActive),
        ("incoming", Predicate::FieldEquals("direction", "Incoming")),
        ("outgoing", Predicate::FieldEquals("direction", "Outgoing")),
    ],
    distributions: &[
        DistributionSpec::field("countryDistribution", "country"),
        DistributionSpec::field("statusDistribution", "programStatus"),
    ],
    sums: &[("totalPax", "numberOfPax")],
    averages: &[("avgFeesPerPax", "feesPerPax")],
    expiry: Some(ExpirySpec {
        list_key: "endingPrograms",
    }),
    recent: None,
};

static STUDENT_EXCHANGE: StatsProfile = StatsProfile {
    entity: EntityType::StudentExchange,
    eligibility: Eligibility::ActiveOnly,
    trend_field: Some("fromDate"),
    distinct: &[("universities", "exchangeUniversity"), ("countries", "country")],
    counters: &[
        ("active", Predicate::RecordStatusActive),
        ("incoming", Predicate::FieldEquals("direction", "Incoming")),
        ("outgoing", Predicate::FieldEquals("direction", "Outgoing")),
    ],
    distributions: &[
        DistributionSpec::field("universityDistribution", "exchangeUniversity"),
        DistributionSpec::field("countryDistribution", "country"),
        DistributionSpec::field("statusDistribution", "exchangeStatus"),
    ],
    sums: &[],
    averages: &[],
    expiry: Some(ExpirySpec {
        list_key: "endingExchanges",
    }),
    recent: None,
};

static MASTERS_ABROAD: StatsProfile = StatsProfile {
    entity: EntityType::MastersAbroad,
    eligibility: Eligibility::ActiveOnly,
    trend_field: None,
    distinct: &[("countries", "country"), ("universities", "university")],
    counters: &[],
    distributions: &[
        DistributionSpec::field("countryDistribution", "country"),
        DistributionSpec::field("universityDistribution", "university"),
        DistributionSpec::field("schoolDistribution", "schoolOfStudy"),
    ],
    sums: &[],
    averages: &[("avgCgpa", "cgpa")],
    expiry: None,
    recent: None,
};

static MEMBERSHIP: StatsProfile = StatsProfile {
    entity: EntityType::Membership,
    eligibility: Eligibility::ActiveOnly,
    trend_field: Some("startDate"),
    distinct: &[("countries", "country")],
    counters: &[("active", Predicate::RecordStatusActive)],
    distributions: &[
        DistributionSpec::field("countryDistribution", "country"),
        DistributionSpec::field("statusDistribution", "membershipStatus"),
    ],
    sums: &[],
    averages: &[],
    expiry: Some(ExpirySpec {
        list_key: "expiringMemberships",
    }),
    recent: None,
};

static DIGITAL_MEDIA: StatsProfile = StatsProfile {
    entity: EntityType::DigitalMedia,
    eligibility: Eligibility::ActiveOnly,
    trend_field: Some("date"),
    distinct: &[("channels", "channel")],
    counters: &[],
    distributions: &[DistributionSpec::field("channelDistribution", "channel")],
    sums: &[],
    averages: &[],
    expiry: None,
    recent: Some(RecentSpec {
        key: "recentCoverage",
        date_field: "date",
    }),
};

static OUTREACH: StatsProfile = StatsProfile {
    entity: EntityType::Outreach,
    eligibility: Eligibility::ActiveOnly,
    trend_field: None,
    distinct: &[("countries", "country")],
    counters: &[
        ("responses", Predicate::FieldPresent("reply")),
        ("nonResponses", Predicate::FieldAbsent("reply")),
    ],
    distributions: &[
        DistributionSpec::field("countryDistribution", "country"),
        DistributionSpec::field("partnershipTypeDistribution", "partnershipType"),
        DistributionSpec::field("departmentDistribution", "department"),
        DistributionSpec::email_domain("emailDomainDistribution", "email"),
    ],
    sums: &[],
    averages: &[],
    expiry: None,
    recent: None,
};

static SOCIAL_MEDIA: StatsProfile = StatsProfile {
    entity: EntityType::SocialMedia,
    eligibility: Eligibility::ActiveOnly,
    trend_field: None,
    distinct: &[],
    counters: &[],
    distributions: &[DistributionSpec::presence("platformDistribution", SOCIAL_PLATFORMS)],
    sums: &[],
    averages: &[],
    expiry: None,
    recent: None,
};

/// Look up the statistics profile for a module.
#[must_use]
pub fn profile_for(entity: EntityType) -> &'static StatsProfile {
    match entity {
        EntityType::Partner => &PARTNER,
        EntityType::CampusVisit => &CAMPUS_VISIT,
        EntityType::Event => &EVENT,
        EntityType::Conference => &CONFERENCE,
        EntityType::MouSigningCeremony => &MOU_SIGNING_CEREMONY,
        EntityType::ScholarInResidence => &SCHOLAR_IN_RESIDENCE,
        EntityType::MouUpdate => &MOU_UPDATE,
        EntityType::ImmersionProgram => &IMMERSION_PROGRAM,
        EntityType::StudentExchange => &STUDENT_EXCHANGE,
        EntityType::MastersAbroad => &MASTERS_ABROAD,
        EntityType::Membership => &MEMBERSHIP,
        EntityType::DigitalMedia => &DIGITAL_MEDIA,
        EntityType::Outreach => &OUTREACH,
        EntityType::SocialMedia => &SOCIAL_MEDIA,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::schema::ExpiryRule;
    use crate::record::stats::profile::DistributionSource;
    use std::collections::HashSet;

    fn referenced_fields(profile: &StatsProfile) -> Vec<&'static str> {
        let mut fields: Vec<&'static str> = Vec::new();
        fields.extend(profile.trend_field);
        fields.extend(profile.distinct.iter().map(|(_, f)| *f));
        fields.extend(profile.sums.iter().map(|(_, f)| *f));
        fields.extend(profile.averages.iter().map(|(_, f)| *f));
        fields.extend(profile.recent.map(|r| r.date_field));
        for (_, predicate) in profile.counters {
            match predicate {
                Predicate::FieldEquals(f, _) | Predicate::FieldPresent(f) | Predicate::FieldAbsent(f) => {
                    fields.push(f);
                }
                Predicate::RecordStatusActive => {}
            }
        }
        for spec in profile.distributions {
            match spec.source {
                DistributionSource::Field(f) | DistributionSource::EmailDomain(f) => fields.push(f),
                DistributionSource::Presence(pairs) => fields.extend(pairs.iter().map(|(_, f)| *f)),
            }
        }
        fields
    }

    #[test]
    fn test_profiles_reference_schema_fields() {
        for entity in EntityType::ALL {
            let profile = profile_for(entity);
            assert_eq!(profile.entity, entity);
            let schema = entity.schema();
            for field in referenced_fields(profile) {
                assert!(schema.field(field).is_some(), "{entity}: {field}");
            }
        }
    }

    #[test]
    fn test_output_keys_unique_per_profile() {
        for entity in EntityType::ALL {
            let profile = profile_for(entity);
            let mut keys: Vec<&str> = Vec::new();
            keys.extend(profile.distinct.iter().map(|(k, _)| *k));
            keys.extend(profile.counters.iter().map(|(k, _)| *k));
            keys.extend(profile.distributions.iter().map(|d| d.key));
            keys.extend(profile.sums.iter().map(|(k, _)| *k));
            keys.extend(profile.averages.iter().map(|(k, _)| *k));
            keys.extend(profile.expiry.map(|e| e.list_key));
            keys.extend(profile.recent.map(|r| r.key));
            let unique: HashSet<&str> = keys.iter().copied().collect();
            assert_eq!(unique.len(), keys.len(), "{entity}");
        }
    }

    #[test]
    fn test_expiry_outputs_match_terminal_modules() {
        for entity in EntityType::ALL {
            let terminal = matches!(entity.schema().expiry, ExpiryRule::Terminal { .. });
            assert_eq!(profile_for(entity).expiry.is_some(), terminal, "{entity}");
        }
    }

    #[test]
    fn test_only_events_count_everything() {
        for entity in EntityType::ALL {
            let all = profile_for(entity).eligibility == Eligibility::All;
            assert_eq!(all, entity == EntityType::Event, "{entity}");
        }
    }
}
