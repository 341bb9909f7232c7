//! Caller identity from request metadata.

use tonic::metadata::MetadataMap;
use tonic::Status;

use crate::record::{Actor, Role};

/// Metadata key carrying the authenticated user id.
pub const ACTOR_ID_HEADER: &str = "x-actor-id";
/// Metadata key carrying the user's role claim.
pub const ACTOR_ROLE_HEADER: &str = "x-actor-role";

/// Read the acting user set by the upstream access-control layer.
///
/// A missing or blank id is `UNAUTHENTICATED`. A missing role is treated as
/// an unrecognized, non-privileged role.
pub fn actor_from_metadata(metadata: &MetadataMap) -> Result<Actor, Status> {
    let id = metadata
        .get(ACTOR_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| Status::unauthenticated(format!("missing {ACTOR_ID_HEADER} metadata")))?;
    let role = metadata
        .get(ACTOR_ROLE_HEADER)
        .and_then(|v| v.to_str().ok())
        .map_or(Role::Guest, Role::from_claim);
    Ok(Actor::new(id, role))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tonic::Code;

    fn metadata(pairs: &[(&'static str, &'static str)]) -> MetadataMap {
        let mut map = MetadataMap::new();
        for (key, value) in pairs {
            map.insert(*key, value.parse().unwrap());
        }
        map
    }

    #[test]
    fn test_reads_id_and_role() {
        let actor =
            actor_from_metadata(&metadata(&[("x-actor-id", "u-7"), ("x-actor-role", "Admin")])).unwrap();
        assert_eq!(actor.id, "u-7");
        assert!(actor.is_privileged());
    }

    #[test]
    fn test_missing_role_is_unprivileged() {
        let actor = actor_from_metadata(&metadata(&[("x-actor-id", "u-7")])).unwrap();
        assert_eq!(actor.role, Role::Guest);
        assert!(!actor.is_privileged());
    }

    #[test]
    fn test_missing_id_is_unauthenticated() {
        let status = actor_from_metadata(&metadata(&[("x-actor-role", "admin")])).unwrap_err();
        assert_eq!(status.code(), Code::Unauthenticated);
        let status = actor_from_metadata(&metadata(&[("x-actor-id", "  ")])).unwrap_err();
        assert_eq!(status.code(), Code::Unauthenticated);
    }
}
