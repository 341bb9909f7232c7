use tonic::{Response, Status};

use crate::record::lifecycle::ApproveOutcome;
use crate::record::{Actor, LifecycleEngine};
use crate::server::convert::{pending_summary_to_proto, record_to_proto};
use crate::server::helpers::{nonempty, parse_entity, respond, to_u64};
use crate::server::proto::{
    ApproveRecordRequest, ApproveRecordResponse, GetPendingCountResponse,
    GetPendingSummaryResponse, ListPendingResponse, PendingRequest, RejectRecordRequest,
    RejectRecordResponse,
};

/// Entity label used in errors for cross-module calls.
const ALL_MODULES: &str = "all";

pub async fn pending_count(
    engine: &LifecycleEngine,
    actor: &Actor,
    req: &PendingRequest,
) -> Result<Response<GetPendingCountResponse>, Status> {
    let result = async {
        let entity = parse_entity(&req.entity_type)?;
        let count = engine.pending_count(entity, actor).await?;
        Ok(GetPendingCountResponse {
            success: true,
            error: String::new(),
            count: to_u64(count),
        })
    }
    .await;
    respond(&req.entity_type, result)
}

pub async fn list_pending(
    engine: &LifecycleEngine,
    actor: &Actor,
    req: &PendingRequest,
) -> Result<Response<ListPendingResponse>, Status> {
    let result = async {
        let entity = parse_entity(&req.entity_type)?;
        let records = engine.pending(entity, actor).await?;
        Ok(ListPendingResponse {
            success: true,
            error: String::new(),
            records: records.iter().map(record_to_proto).collect(),
        })
    }
    .await;
    respond(&req.entity_type, result)
}

pub async fn pending_summary(
    engine: &LifecycleEngine,
    actor: &Actor,
) -> Result<Response<GetPendingSummaryResponse>, Status> {
    let result = async {
        let summary = engine.pending_summary(actor).await?;
        let total = summary.iter().map(|entry| entry.count).sum();
        Ok(GetPendingSummaryResponse {
            success: true,
            error: String::new(),
            entries: summary.iter().map(pending_summary_to_proto).collect(),
            total: to_u64(total),
        })
    }
    .await;
    respond(ALL_MODULES, result)
}

pub async fn my_requests(
    engine: &LifecycleEngine,
    actor: &Actor,
) -> Result<Response<ListPendingResponse>, Status> {
    let result = async {
        let records = engine.my_requests(actor).await?;
        Ok(ListPendingResponse {
            success: true,
            error: String::new(),
            records: records.iter().map(record_to_proto).collect(),
        })
    }
    .await;
    respond(ALL_MODULES, result)
}

pub async fn approve(
    engine: &LifecycleEngine,
    actor: &Actor,
    req: &ApproveRecordRequest,
) -> Result<Response<ApproveRecordResponse>, Status> {
    let result = async {
        let entity = parse_entity(&req.entity_type)?;
        let outcome = engine.approve(entity, &req.id, actor).await?;
        let message = outcome.message().to_string();
        let (deleted, record) = match outcome {
            ApproveOutcome::Applied(record) => (false, Some(record_to_proto(&record))),
            ApproveOutcome::Deleted { .. } => (true, None),
        };
        Ok(ApproveRecordResponse {
            success: true,
            error: String::new(),
            message,
            deleted,
            record,
        })
    }
    .await;
    respond(&req.entity_type, result)
}

pub async fn reject(
    engine: &LifecycleEngine,
    actor: &Actor,
    req: &RejectRecordRequest,
) -> Result<Response<RejectRecordResponse>, Status> {
    let result = async {
        let entity = parse_entity(&req.entity_type)?;
        let outcome = engine
            .reject(entity, &req.id, nonempty(&req.reason), actor)
            .await?;
        Ok(RejectRecordResponse {
            success: true,
            error: String::new(),
            message: outcome.message().to_string(),
            record: Some(record_to_proto(&outcome.record)),
            rejection_reason: outcome.reason.unwrap_or_default(),
        })
    }
    .await;
    respond(&req.entity_type, result)
}
