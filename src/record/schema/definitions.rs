//! Schema registry: one static [`EntitySchema`] per module.

use super::{EntitySchema, ExpiryRule, FieldDefault, FieldSpec};
use crate::record::EntityType;

const ACTIVE_STATUS: &[&str] = &["Active", "Inactive"];
const DIRECTION: &[&str] = &["Incoming", "Outgoing"];

static PARTNER: EntitySchema = EntitySchema {
    entity: EntityType::Partner,
    display_name: "Partners",
    fields: &[
        FieldSpec::text("country").required(),
        FieldSpec::text("university").required(),
        FieldSpec::text("school"),
        FieldSpec::text("mouStatus"),
        FieldSpec::choice("activeStatus", ACTIVE_STATUS).with_default(FieldDefault::Text("Active")),
        FieldSpec::text("contactPerson"),
        FieldSpec::text("email"),
        FieldSpec::text("phoneNumber"),
        FieldSpec::text("agreementType"),
        FieldSpec::text("link"),
        FieldSpec::date("completedOn"),
        FieldSpec::date("submitted"),
        FieldSpec::date("signingDate"),
        FieldSpec::date("expiringDate"),
    ],
    label_fields: &["university", "country"],
    search_fields: &["university", "school", "country", "contactPerson", "agreementType"],
    approval_gated: true,
    expiry: ExpiryRule::Terminal {
        start: Some("signingDate"),
        end: "expiringDate",
    },
};

static CAMPUS_VISIT: EntitySchema = EntitySchema {
    entity: EntityType::CampusVisit,
    display_name: "Campus Visits",
    fields: &[
        FieldSpec::date("date").required(),
        FieldSpec::text("visitorName").required(),
        FieldSpec::text("universityName").required(),
        FieldSpec::text("country").required(),
        FieldSpec::text("type"),
        FieldSpec::text("department"),
        FieldSpec::text("campus"),
        FieldSpec::text("summary"),
        FieldSpec::text("purpose"),
        FieldSpec::text("driveLink"),
    ],
    label_fields: &["visitorName", "universityName"],
    search_fields: &[
        "visitorName",
        "universityName",
        "department",
        "country",
        "summary",
    ],
    approval_gated: true,
    expiry: ExpiryRule::None,
};

static EVENT: EntitySchema = EntitySchema {
    entity: EntityType::Event,
    display_name: "Events",
    fields: &[
        FieldSpec::date("date").required(),
        FieldSpec::text("type"),
        FieldSpec::text("title").required(),
        FieldSpec::text("dignitaries"),
        FieldSpec::text("department"),
        FieldSpec::text("campus"),
        FieldSpec::text("eventSummary"),
        FieldSpec::text("universityCountry"),
        FieldSpec::text("driveLink"),
    ],
    label_fields: &["title"],
    search_fields: &[
        "title",
        "eventSummary",
        "department",
        "campus",
        "universityCountry",
        "dignitaries",
    ],
    approval_gated: false,
    expiry: ExpiryRule::None,
};

static CONFERENCE: EntitySchema = EntitySchema {
    entity: EntityType::Conference,
    display_name: "Conferences",
    fields: &[
        FieldSpec::date("date").required(),
        FieldSpec::text("conferenceName").required(),
        FieldSpec::text("country").required(),
        FieldSpec::text("department"),
        FieldSpec::text("campus"),
    ],
    label_fields: &["conferenceName", "country"],
    search_fields: &["conferenceName", "department", "country", "campus"],
    approval_gated: true,
    expiry: ExpiryRule::None,
};

static MOU_SIGNING_CEREMONY: EntitySchema = EntitySchema {
    entity: EntityType::MouSigningCeremony,
    display_name: "MoU Signing Ceremonies",
    fields: &[
        FieldSpec::date("date").required(),
        FieldSpec::text("type"),
        FieldSpec::text("visitorName").required(),
        FieldSpec::text("university").required(),
        FieldSpec::text("department"),
        FieldSpec::text("eventSummary"),
        FieldSpec::text("campus"),
        FieldSpec::text("driveLink"),
    ],
    label_fields: &["university", "visitorName"],
    search_fields: &["visitorName", "university", "department", "eventSummary"],
    approval_gated: true,
    expiry: ExpiryRule::PinnedActive,
};

static SCHOLAR_IN_RESIDENCE: EntitySchema = EntitySchema {
    entity: EntityType::ScholarInResidence,
    display_name: "Scholars in Residence",
    fields: &[
        FieldSpec::text("scholarName").required(),
        FieldSpec::text("country").required(),
        FieldSpec::text("department"),
        FieldSpec::date("fromDate").required(),
        FieldSpec::date("toDate").required(),
    ],
    label_fields: &["scholarName", "country"],
    search_fields: &["scholarName", "country", "department"],
    approval_gated: true,
    expiry: ExpiryRule::Terminal {
        start: Some("fromDate"),
        end: "toDate",
    },
};

static MOU_UPDATE: EntitySchema = EntitySchema {
    entity: EntityType::MouUpdate,
    display_name: "MoU Updates",
    fields: &[
        FieldSpec::date("date").required(),
        FieldSpec::text("university").required(),
        FieldSpec::text("country").required(),
        FieldSpec::text("contactPerson"),
        FieldSpec::text("contactEmail"),
        FieldSpec::text("mouStatus"),
        FieldSpec::text("validityStatus"),
        FieldSpec::date("expiryDate"),
    ],
    label_fields: &["university", "country"],
    search_fields: &["university", "country", "contactPerson", "mouStatus"],
    approval_gated: true,
    expiry: ExpiryRule::Terminal {
        start: Some("date"),
        end: "expiryDate",
    },
};

static IMMERSION_PROGRAM: EntitySchema = EntitySchema {
    entity: EntityType::ImmersionProgram,
    display_name: "Immersion Programs",
    fields: &[
        FieldSpec::choice("direction", DIRECTION).required(),
        FieldSpec::text("programStatus"),
        FieldSpec::text("university").required(),
        FieldSpec::text("country").required(),
        FieldSpec::number("numberOfPax").with_default(FieldDefault::Number(0.0)),
        FieldSpec::text("department"),
        FieldSpec::date("arrivalDate"),
        FieldSpec::date("departureDate"),
        FieldSpec::text("summary"),
        FieldSpec::number("feesPerPax"),
        FieldSpec::text("driveLink"),
    ],
    label_fields: &["university", "country"],
    search_fields: &["university", "country", "department", "summary"],
    approval_gated: true,
    expiry: ExpiryRule::Terminal {
        start: Some("arrivalDate"),
        end: "departureDate",
    },
};

static STUDENT_EXCHANGE: EntitySchema = EntitySchema {
    entity: EntityType::StudentExchange,
    display_name: "Student Exchange",
    fields: &[
        FieldSpec::choice("direction", DIRECTION).required(),
        FieldSpec::text("studentName").required(),
        FieldSpec::text("exchangeUniversity").required(),
        FieldSpec::text("country"),
        FieldSpec::text("course"),
        FieldSpec::text("semesterYear"),
        FieldSpec::text("usnNo"),
        FieldSpec::date("fromDate"),
        FieldSpec::date("toDate"),
        FieldSpec::text("exchangeStatus"),
        FieldSpec::text("driveLink"),
    ],
    label_fields: &["studentName", "exchangeUniversity"],
    search_fields: &["studentName", "exchangeUniversity", "country", "course"],
    approval_gated: true,
    expiry: ExpiryRule::Terminal {
        start: Some("fromDate"),
        end: "toDate",
    },
};

static MASTERS_ABROAD: EntitySchema = EntitySchema {
    entity: EntityType::MastersAbroad,
    display_name: "Masters Abroad",
    fields: &[
        FieldSpec::text("studentName").required(),
        FieldSpec::text("country").required(),
        FieldSpec::text("university").required(),
        FieldSpec::text("courseStudying"),
        FieldSpec::text("courseTenure"),
        FieldSpec::text("usnNumber"),
        FieldSpec::number("cgpa"),
        FieldSpec::text("schoolOfStudy"),
    ],
    label_fields: &["studentName", "university"],
    search_fields: &["studentName", "university", "country", "courseStudying"],
    approval_gated: true,
    expiry: ExpiryRule::None,
};

static MEMBERSHIP: EntitySchema = EntitySchema {
    entity: EntityType::Membership,
    display_name: "Memberships",
    fields: &[
        FieldSpec::text("name").required(),
        FieldSpec::text("country"),
        FieldSpec::text("membershipStatus"),
        FieldSpec::text("membershipDuration"),
        FieldSpec::date("startDate").required(),
        FieldSpec::date("endDate"),
    ],
    label_fields: &["name"],
    search_fields: &["name", "country", "membershipStatus"],
    approval_gated: true,
    expiry: ExpiryRule::Terminal {
        start: Some("startDate"),
        end: "endDate",
    },
};

static DIGITAL_MEDIA: EntitySchema = EntitySchema {
    entity: EntityType::DigitalMedia,
    display_name: "Digital Media",
    fields: &[
        FieldSpec::date("date").required(),
        FieldSpec::text("channel"),
        FieldSpec::text("articleTopic").required(),
        FieldSpec::text("articleLink"),
        FieldSpec::text("amountPaid"),
        FieldSpec::text("summary"),
        FieldSpec::text("driveLink"),
    ],
    label_fields: &["articleTopic", "channel"],
    search_fields: &["articleTopic", "channel", "summary"],
    approval_gated: true,
    expiry: ExpiryRule::None,
};

static OUTREACH: EntitySchema = EntitySchema {
    entity: EntityType::Outreach,
    display_name: "Outreach",
    fields: &[
        FieldSpec::text("name").required(),
        FieldSpec::text("country").required(),
        FieldSpec::text("university"),
        FieldSpec::text("contactPerson"),
        FieldSpec::text("contactName"),
        FieldSpec::text("email"),
        FieldSpec::text("phone"),
        FieldSpec::text("website"),
        FieldSpec::text("partnershipType"),
        FieldSpec::text("reply"),
        FieldSpec::text("notes"),
        FieldSpec::text("department"),
    ],
    label_fields: &["name", "university"],
    search_fields: &["name", "university", "country", "department", "contactPerson"],
    approval_gated: true,
    expiry: ExpiryRule::None,
};

static SOCIAL_MEDIA: EntitySchema = EntitySchema {
    entity: EntityType::SocialMedia,
    display_name: "Social Media",
    fields: &[
        FieldSpec::text("postName").required(),
        FieldSpec::text("caption"),
        FieldSpec::text("fbLink"),
        FieldSpec::text("instaLink"),
        FieldSpec::text("linkedinLink"),
        FieldSpec::text("vkLink"),
    ],
    label_fields: &["postName"],
    search_fields: &["postName", "caption"],
    approval_gated: true,
    expiry: ExpiryRule::None,
};

/// Look up the schema for a module.
#[must_use]
pub fn schema_for(entity: EntityType) -> &'static EntitySchema {
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
    use crate::record::schema::{ExpiryRule, FieldKind};
    use std::collections::HashSet;

    #[test]
    fn test_registry_is_keyed_by_entity() {
        for entity in EntityType::ALL {
            assert_eq!(schema_for(entity).entity, entity);
        }
    }

    #[test]
    fn test_field_names_unique_and_references_resolve() {
        for entity in EntityType::ALL {
            let schema = schema_for(entity);
            let names: HashSet<&str> = schema.fields.iter().map(|f| f.name).collect();
            assert_eq!(names.len(), schema.fields.len(), "{entity}");
            for name in schema.label_fields.iter().chain(schema.search_fields) {
                assert!(names.contains(name), "{entity}: {name}");
            }
            if let ExpiryRule::Terminal { start, end } = schema.expiry {
                assert_eq!(schema.field(end).map(|f| f.kind), Some(FieldKind::Date));
                if let Some(start) = start {
                    assert_eq!(schema.field(start).map(|f| f.kind), Some(FieldKind::Date));
                }
            }
        }
    }

    #[test]
    fn test_only_events_skip_approval() {
        for entity in EntityType::ALL {
            assert_eq!(
                schema_for(entity).approval_gated,
                entity != EntityType::Event,
                "{entity}"
            );
        }
    }

    #[test]
    fn test_expiry_tracking_modules() {
        let tracked: Vec<EntityType> = EntityType::ALL
            .into_iter()
            .filter(|e| matches!(schema_for(*e).expiry, ExpiryRule::Terminal { .. }))
            .collect();
        assert_eq!(
            tracked,
            vec![
                EntityType::Partner,
                EntityType::ScholarInResidence,
                EntityType::MouUpdate,
                EntityType::ImmersionProgram,
                EntityType::StudentExchange,
                EntityType::Membership,
            ]
        );
    }
}
