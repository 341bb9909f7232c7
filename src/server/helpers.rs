use tonic::{Response, Status};
use tracing::debug;

use super::proto::{
    ApproveRecordResponse, DeleteRecordResponse, ExportRecordsResponse, GetDashboardResponse,
    GetPendingCountResponse, GetPendingSummaryResponse, GetStatsResponse, ListActivityResponse,
    ListPendingResponse, ListRecordsResponse, ReconcileExpiryResponse, RecordResponse,
    RejectRecordResponse,
};
use super::structured_error::to_error_json;
use crate::record::{EntityType, RecordError};

/// Convert an empty string to `None`, anything else to its trimmed form.
pub fn nonempty(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

/// Protobuf `uint32` where 0 means "not set".
pub fn nonzero(v: u32) -> Option<usize> {
    (v != 0).then(|| usize::try_from(v).unwrap_or(usize::MAX))
}

pub fn to_u64(n: usize) -> u64 {
    u64::try_from(n).unwrap_or(u64::MAX)
}

pub fn to_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

pub fn parse_entity(s: &str) -> Result<EntityType, RecordError> {
    s.parse()
}

/// A response that can carry an in-band failure.
pub trait FailureResponse: Sized {
    fn failure(error: String) -> Self;
}

macro_rules! impl_failure_response {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FailureResponse for $ty {
                fn failure(error: String) -> Self {
                    Self {
                        success: false,
                        error,
                        ..Default::default()
                    }
                }
            }
        )*
    };
}

impl_failure_response!(
    ListRecordsResponse,
    RecordResponse,
    DeleteRecordResponse,
    ExportRecordsResponse,
    GetPendingCountResponse,
    ListPendingResponse,
    GetPendingSummaryResponse,
    ApproveRecordResponse,
    RejectRecordResponse,
    GetStatsResponse,
    GetDashboardResponse,
    ListActivityResponse,
    ReconcileExpiryResponse,
);

/// Wrap a handler result. Domain errors become `success = false` with a
/// structured error; transport status is reserved for authentication.
pub fn respond<T: FailureResponse>(
    entity: &str,
    result: Result<T, RecordError>,
) -> Result<Response<T>, Status> {
    match result {
        Ok(body) => Ok(Response::new(body)),
        Err(e) => {
            debug!(entity = %entity, error = %e, "Request failed");
            Ok(Response::new(T::failure(to_error_json(entity, &e))))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nonempty() {
        assert_eq!(nonempty(""), None);
        assert_eq!(nonempty("   "), None);
        assert_eq!(nonempty(" asc "), Some("asc".to_string()));
    }

    #[test]
    fn test_nonzero() {
        assert_eq!(nonzero(0), None);
        assert_eq!(nonzero(25), Some(25));
    }

    #[test]
    fn test_respond_wraps_errors_in_band() {
        let response: Response<GetStatsResponse> =
            respond("events", Err(RecordError::UnknownEntity("evnts".into()))).unwrap();
        let body = response.into_inner();
        assert!(!body.success);
        assert!(body.error.contains("UNKNOWN_ENTITY"));
        assert!(body.stats_json.is_empty());
    }
}
