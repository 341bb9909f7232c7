use tonic::{Response, Status};

use crate::record::{RecordError, StatsAggregator};
use crate::server::helpers::{parse_entity, respond};
use crate::server::proto::{GetDashboardResponse, GetStatsRequest, GetStatsResponse};

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, RecordError> {
    serde_json::to_string(value).map_err(|e| RecordError::Aggregation(e.to_string()))
}

pub async fn get_stats(
    stats: &StatsAggregator,
    req: &GetStatsRequest,
) -> Result<Response<GetStatsResponse>, Status> {
    let result = async {
        let entity = parse_entity(&req.entity_type)?;
        let summary = stats.compute(entity).await?;
        Ok(GetStatsResponse {
            success: true,
            error: String::new(),
            stats_json: to_json(&summary)?,
        })
    }
    .await;
    respond(&req.entity_type, result)
}

pub async fn get_dashboard(
    stats: &StatsAggregator,
) -> Result<Response<GetDashboardResponse>, Status> {
    let result = async {
        let dashboard = stats.dashboard().await?;
        Ok(GetDashboardResponse {
            success: true,
            error: String::new(),
            dashboard_json: to_json(&dashboard)?,
        })
    }
    .await;
    respond("dashboard", result)
}
