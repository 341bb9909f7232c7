use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Operations slower than this are logged at `warn`.
pub const SLOW_OPERATION: Duration = Duration::from_millis(500);

/// Logs how long an RPC handler took when dropped.
///
/// ```ignore
/// async fn approve_record(&self, request: Request<ApproveRecordRequest>) -> Result<Response<ApproveRecordResponse>, Status> {
///     let _timer = OperationTimer::new("approve_record");
///     // ...
/// }
/// ```
pub struct OperationTimer {
    name: &'static str,
    start: Instant,
}

impl OperationTimer {
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            start: Instant::now(),
        }
    }

    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for OperationTimer {
    fn drop(&mut self) {
        let duration = self.start.elapsed();
        if duration >= SLOW_OPERATION {
            warn!(
                operation = %self.name,
                duration_ms = %duration.as_millis(),
                "Slow operation"
            );
        } else {
            info!(
                operation = %self.name,
                duration_ms = %duration.as_millis(),
                "Operation completed"
            );
        }
    }
}

/// Short request id for correlating log lines of one call.
#[must_use]
pub fn generate_request_id() -> String {
    let uuid_str = uuid::Uuid::new_v4().simple().to_string();
    uuid_str.get(..8).unwrap_or(&uuid_str).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_timer_measures() {
        let timer = OperationTimer::new("list_records");
        assert_eq!(timer.name, "list_records");
        assert!(timer.elapsed() < SLOW_OPERATION);
    }

    #[test]
    fn test_generate_request_id_format() {
        let id = generate_request_id();
        assert_eq!(id.len(), 8);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_generate_request_id_unique() {
        assert_ne!(generate_request_id(), generate_request_id());
    }
}
