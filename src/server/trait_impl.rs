use crate::metrics::{generate_request_id, OperationTimer};
use tonic::{Request, Response, Status};
use tracing::instrument;

use super::actor::actor_from_metadata;
use super::handlers;
use super::proto::affairs_daemon_server::AffairsDaemon;
use super::proto::{
    ApproveRecordRequest, ApproveRecordResponse, CreateRecordRequest, DeleteRecordRequest,
    DeleteRecordResponse, ExportRecordsRequest, ExportRecordsResponse, GetDashboardRequest,
    GetDashboardResponse, GetPendingCountResponse, GetPendingSummaryRequest,
    GetPendingSummaryResponse, GetRecordRequest, GetStatsRequest, GetStatsResponse,
    ListActivityRequest, ListActivityResponse, ListMyRequestsRequest, ListPendingResponse,
    ListRecordsRequest, ListRecordsResponse, PendingRequest, ReconcileExpiryRequest,
    ReconcileExpiryResponse, RecordResponse, RejectRecordRequest, RejectRecordResponse,
    UpdateRecordRequest,
};
use super::AffairsDaemonService;

// Reads are open to any caller; writes and admin views need an identity.

#[tonic::async_trait]
impl AffairsDaemon for AffairsDaemonService {
    #[instrument(
        name = "grpc.list_records",
        skip(self, request),
        fields(request_id = %generate_request_id())
    )]
    async fn list_records(
        &self,
        request: Request<ListRecordsRequest>,
    ) -> Result<Response<ListRecordsResponse>, Status> {
        let _timer = OperationTimer::new("list_records");
        let req = request.into_inner();
        handlers::records::list_records(&self.engine, &req).await
    }

    #[instrument(
        name = "grpc.get_record",
        skip(self, request),
        fields(request_id = %generate_request_id())
    )]
    async fn get_record(
        &self,
        request: Request<GetRecordRequest>,
    ) -> Result<Response<RecordResponse>, Status> {
        let _timer = OperationTimer::new("get_record");
        let req = request.into_inner();
        handlers::records::get_record(&self.engine, &req).await
    }

    #[instrument(
        name = "grpc.create_record",
        skip(self, request),
        fields(request_id = %generate_request_id())
    )]
    async fn create_record(
        &self,
        request: Request<CreateRecordRequest>,
    ) -> Result<Response<RecordResponse>, Status> {
        let _timer = OperationTimer::new("create_record");
        let actor = actor_from_metadata(request.metadata())?;
        let req = request.into_inner();
        handlers::records::create_record(&self.engine, &actor, &req).await
    }

    #[instrument(
        name = "grpc.update_record",
        skip(self, request),
        fields(request_id = %generate_request_id())
    )]
    async fn update_record(
        &self,
        request: Request<UpdateRecordRequest>,
    ) -> Result<Response<RecordResponse>, Status> {
        let _timer = OperationTimer::new("update_record");
        let actor = actor_from_metadata(request.metadata())?;
        let req = request.into_inner();
        handlers::records::update_record(&self.engine, &actor, &req).await
    }

    #[instrument(
        name = "grpc.delete_record",
        skip(self, request),
        fields(request_id = %generate_request_id())
    )]
    async fn delete_record(
        &self,
        request: Request<DeleteRecordRequest>,
    ) -> Result<Response<DeleteRecordResponse>, Status> {
        let _timer = OperationTimer::new("delete_record");
        let actor = actor_from_metadata(request.metadata())?;
        let req = request.into_inner();
        handlers::records::delete_record(&self.engine, &actor, &req).await
    }

    #[instrument(
        name = "grpc.export_records",
        skip(self, request),
        fields(request_id = %generate_request_id())
    )]
    async fn export_records(
        &self,
        request: Request<ExportRecordsRequest>,
    ) -> Result<Response<ExportRecordsResponse>, Status> {
        let _timer = OperationTimer::new("export_records");
        let actor = actor_from_metadata(request.metadata())?;
        let req = request.into_inner();
        handlers::records::export_records(&self.engine, &self.clock, &actor, &req).await
    }

    #[instrument(
        name = "grpc.get_pending_count",
        skip(self, request),
        fields(request_id = %generate_request_id())
    )]
    async fn get_pending_count(
        &self,
        request: Request<PendingRequest>,
    ) -> Result<Response<GetPendingCountResponse>, Status> {
        let _timer = OperationTimer::new("get_pending_count");
        let actor = actor_from_metadata(request.metadata())?;
        let req = request.into_inner();
        handlers::workflow::pending_count(&self.engine, &actor, &req).await
    }

    #[instrument(
        name = "grpc.list_pending",
        skip(self, request),
        fields(request_id = %generate_request_id())
    )]
    async fn list_pending(
        &self,
        request: Request<PendingRequest>,
    ) -> Result<Response<ListPendingResponse>, Status> {
        let _timer = OperationTimer::new("list_pending");
        let actor = actor_from_metadata(request.metadata())?;
        let req = request.into_inner();
        handlers::workflow::list_pending(&self.engine, &actor, &req).await
    }

    #[instrument(
        name = "grpc.get_pending_summary",
        skip(self, request),
        fields(request_id = %generate_request_id())
    )]
    async fn get_pending_summary(
        &self,
        request: Request<GetPendingSummaryRequest>,
    ) -> Result<Response<GetPendingSummaryResponse>, Status> {
        let _timer = OperationTimer::new("get_pending_summary");
        let actor = actor_from_metadata(request.metadata())?;
        handlers::workflow::pending_summary(&self.engine, &actor).await
    }

    #[instrument(
        name = "grpc.list_my_requests",
        skip(self, request),
        fields(request_id = %generate_request_id())
    )]
    async fn list_my_requests(
        &self,
        request: Request<ListMyRequestsRequest>,
    ) -> Result<Response<ListPendingResponse>, Status> {
        let _timer = OperationTimer::new("list_my_requests");
        let actor = actor_from_metadata(request.metadata())?;
        handlers::workflow::my_requests(&self.engine, &actor).await
    }

    #[instrument(
        name = "grpc.approve_record",
        skip(self, request),
        fields(request_id = %generate_request_id())
    )]
    async fn approve_record(
        &self,
        request: Request<ApproveRecordRequest>,
    ) -> Result<Response<ApproveRecordResponse>, Status> {
        let _timer = OperationTimer::new("approve_record");
        let actor = actor_from_metadata(request.metadata())?;
        let req = request.into_inner();
        handlers::workflow::approve(&self.engine, &actor, &req).await
    }

    #[instrument(
        name = "grpc.reject_record",
        skip(self, request),
        fields(request_id = %generate_request_id())
    )]
    async fn reject_record(
        &self,
        request: Request<RejectRecordRequest>,
    ) -> Result<Response<RejectRecordResponse>, Status> {
        let _timer = OperationTimer::new("reject_record");
        let actor = actor_from_metadata(request.metadata())?;
        let req = request.into_inner();
        handlers::workflow::reject(&self.engine, &actor, &req).await
    }

    #[instrument(
        name = "grpc.get_stats",
        skip(self, request),
        fields(request_id = %generate_request_id())
    )]
    async fn get_stats(
        &self,
        request: Request<GetStatsRequest>,
    ) -> Result<Response<GetStatsResponse>, Status> {
        let _timer = OperationTimer::new("get_stats");
        let req = request.into_inner();
        handlers::stats::get_stats(&self.stats, &req).await
    }

    #[instrument(
        name = "grpc.get_dashboard",
        skip(self, _request),
        fields(request_id = %generate_request_id())
    )]
    async fn get_dashboard(
        &self,
        _request: Request<GetDashboardRequest>,
    ) -> Result<Response<GetDashboardResponse>, Status> {
        let _timer = OperationTimer::new("get_dashboard");
        handlers::stats::get_dashboard(&self.stats).await
    }

    #[instrument(
        name = "grpc.list_activity",
        skip(self, request),
        fields(request_id = %generate_request_id())
    )]
    async fn list_activity(
        &self,
        request: Request<ListActivityRequest>,
    ) -> Result<Response<ListActivityResponse>, Status> {
        let _timer = OperationTimer::new("list_activity");
        let actor = actor_from_metadata(request.metadata())?;
        let req = request.into_inner();
        handlers::maintenance::list_activity(&self.engine, &actor, &req).await
    }

    #[instrument(
        name = "grpc.reconcile_expiry",
        skip(self, request),
        fields(request_id = %generate_request_id())
    )]
    async fn reconcile_expiry(
        &self,
        request: Request<ReconcileExpiryRequest>,
    ) -> Result<Response<ReconcileExpiryResponse>, Status> {
        let _timer = OperationTimer::new("reconcile_expiry");
        let actor = actor_from_metadata(request.metadata())?;
        handlers::maintenance::reconcile_expiry(&self.store, &self.clock, &actor).await
    }
}
