use std::sync::Arc;
use tonic::{Response, Status};

use crate::record::lifecycle::DeleteOutcome;
use crate::record::{Actor, Clock, LifecycleEngine, RecordError};
use crate::server::convert::{list_query_from_proto, page_to_proto, parse_fields, record_to_proto};
use crate::server::helpers::{nonempty, parse_entity, respond, to_u64};
use crate::server::proto::{
    CreateRecordRequest, DeleteRecordRequest, DeleteRecordResponse, ExportRecordsRequest,
    ExportRecordsResponse, GetRecordRequest, ListRecordsRequest, ListRecordsResponse,
    RecordResponse, UpdateRecordRequest,
};

pub async fn list_records(
    engine: &LifecycleEngine,
    req: &ListRecordsRequest,
) -> Result<Response<ListRecordsResponse>, Status> {
    let result = async {
        let entity = parse_entity(&req.entity_type)?;
        let query = list_query_from_proto(&req)?;
        let page = engine.list(entity, &query).await?;
        Ok(ListRecordsResponse {
            success: true,
            error: String::new(),
            records: page.data.iter().map(record_to_proto).collect(),
            pagination: Some(page_to_proto(&page)),
        })
    }
    .await;
    respond(&req.entity_type, result)
}

pub async fn get_record(
    engine: &LifecycleEngine,
    req: &GetRecordRequest,
) -> Result<Response<RecordResponse>, Status> {
    let result = async {
        let entity = parse_entity(&req.entity_type)?;
        let record = engine.get(entity, &req.id).await?;
        Ok(RecordResponse {
            success: true,
            record: Some(record_to_proto(&record)),
            ..Default::default()
        })
    }
    .await;
    respond(&req.entity_type, result)
}

pub async fn create_record(
    engine: &LifecycleEngine,
    actor: &Actor,
    req: &CreateRecordRequest,
) -> Result<Response<RecordResponse>, Status> {
    let result = async {
        let entity = parse_entity(&req.entity_type)?;
        let fields = parse_fields(&req.fields_json)?;
        let record = engine.create(entity, &fields, actor).await?;
        Ok(RecordResponse {
            success: true,
            message: "Record created successfully".to_string(),
            record: Some(record_to_proto(&record)),
            ..Default::default()
        })
    }
    .await;
    respond(&req.entity_type, result)
}

pub async fn update_record(
    engine: &LifecycleEngine,
    actor: &Actor,
    req: &UpdateRecordRequest,
) -> Result<Response<RecordResponse>, Status> {
    let result = async {
        let entity = parse_entity(&req.entity_type)?;
        let changes = parse_fields(&req.fields_json)?;
        let outcome = engine.update(entity, &req.id, &changes, actor).await?;
        Ok(RecordResponse {
            success: true,
            error: String::new(),
            message: outcome.message().to_string(),
            staged: outcome.is_staged(),
            record: Some(record_to_proto(outcome.record())),
        })
    }
    .await;
    respond(&req.entity_type, result)
}

pub async fn delete_record(
    engine: &LifecycleEngine,
    actor: &Actor,
    req: &DeleteRecordRequest,
) -> Result<Response<DeleteRecordResponse>, Status> {
    let result = async {
        let entity = parse_entity(&req.entity_type)?;
        let outcome = engine
            .delete(entity, &req.id, nonempty(&req.reason), actor)
            .await?;
        let record = match &outcome {
            DeleteOutcome::Staged(record) => Some(record_to_proto(record)),
            DeleteOutcome::Deleted { .. } => None,
        };
        Ok(DeleteRecordResponse {
            success: true,
            error: String::new(),
            message: outcome.message().to_string(),
            staged: outcome.is_staged(),
            record,
        })
    }
    .await;
    respond(&req.entity_type, result)
}

pub async fn export_records(
    engine: &LifecycleEngine,
    clock: &Arc<dyn Clock>,
    actor: &Actor,
    req: &ExportRecordsRequest,
) -> Result<Response<ExportRecordsResponse>, Status> {
    let result = async {
        let entity = parse_entity(&req.entity_type)?;
        let export = engine.export(entity, actor).await?;
        let rows_json = serde_json::to_string(&export.rows)
            .map_err(|e| RecordError::validation(format!("Export failed: {e}")))?;
        Ok(ExportRecordsResponse {
            success: true,
            error: String::new(),
            rows_json,
            count: to_u64(export.rows.len()),
            suggested_filename: export.suggested_filename(clock.now().date_naive(), "csv"),
        })
    }
    .await;
    respond(&req.entity_type, result)
}
