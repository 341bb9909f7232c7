use std::sync::Arc;
use tonic::{Response, Status};
use tracing::info;

use crate::record::activity::{ActivityAction, ActivityFilter};
use crate::record::expiry::reconcile;
use crate::record::{Actor, Clock, LifecycleEngine, RecordError, RecordStore};
use crate::server::convert::{activity_to_proto, sweep_entry_to_proto};
use crate::server::helpers::{nonempty, nonzero, parse_entity, respond};
use crate::server::proto::{
    ListActivityRequest, ListActivityResponse, ReconcileExpiryResponse,
};

pub async fn list_activity(
    engine: &LifecycleEngine,
    actor: &Actor,
    req: &ListActivityRequest,
) -> Result<Response<ListActivityResponse>, Status> {
    let result = async {
        let mut filter = ActivityFilter::new();
        if let Some(entity) = nonempty(&req.entity_type) {
            filter = filter.with_entity(parse_entity(&entity)?);
        }
        if let Some(actor_id) = nonempty(&req.actor_id) {
            filter = filter.with_actor(actor_id);
        }
        if let Some(action) = nonempty(&req.action) {
            filter = filter.with_action(action.parse::<ActivityAction>()?);
        }
        if let Some(limit) = nonzero(req.limit) {
            filter = filter.with_limit(limit);
        }
        let entries = engine.journal().list(actor, &filter).await?;
        Ok(ListActivityResponse {
            success: true,
            error: String::new(),
            entries: entries.iter().map(activity_to_proto).collect(),
        })
    }
    .await;
    respond("activity", result)
}

pub async fn reconcile_expiry(
    store: &Arc<dyn RecordStore>,
    clock: &Arc<dyn Clock>,
    actor: &Actor,
) -> Result<Response<ReconcileExpiryResponse>, Status> {
    let result = async {
        if !actor.is_privileged() {
            return Err(RecordError::forbidden("Only admins can reconcile expiry"));
        }
        let report = reconcile(store.as_ref(), clock.now()).await?;
        info!(actor = %actor.id, changed = report.changed(), "Manual expiry reconciliation");
        Ok(ReconcileExpiryResponse {
            success: true,
            error: String::new(),
            entries: report.entries.iter().map(sweep_entry_to_proto).collect(),
        })
    }
    .await;
    respond("expiry", result)
}
