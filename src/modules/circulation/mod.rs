pub mod models;

use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use time::OffsetDateTime;
use uuid::Uuid;

use libris_circulation::model::{BookCopy, Fine, Issue, Reservation};
use libris_circulation::{
    CirculationService, IssueRequest, ManualFineRequest, ReturnOutcome, ReturnRequest,
};
use libris_http::error::AppError;
use libris_kernel::{InitCtx, Module};
use libris_store::MemoryStore;

type Service = Arc<CirculationService<MemoryStore>>;

/// Circulation module: the lending desk's HTTP surface.
pub struct CirculationModule {
    service: Service,
}

impl CirculationModule {
    pub fn new(service: Service) -> Self {
        Self { service }
    }
}

#[async_trait]
impl Module for CirculationModule {
    fn name(&self) -> &'static str {
        "circulation"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            max_open_issues = self.service.policy().max_open_issues,
            renewal_cap = self.service.policy().renewal_cap,
            daily_fine = self.service.policy().daily_fine,
            "circulation module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/issues", post(issue_copy))
            .route("/issues/overdue", get(overdue_issues))
            .route("/issues/{id}/renew", post(renew_issue))
            .route("/issues/{id}/return", post(return_copy))
            .route("/copies/{id}/lost", post(mark_lost))
            .route("/copies/{id}/damaged", post(mark_damaged))
            .route("/fines", post(assess_fine))
            .route("/fines/{id}/payments", post(pay_fine))
            .route("/reservations", post(reserve))
            .route("/reservations/expire", post(expire_reservations))
            .route("/reservations/{id}/cancel", post(cancel_reservation))
            .route("/readers/{id}/issues", get(reader_issues))
            .route("/readers/{id}/fines", get(reader_fines))
            .route("/readers/{id}/debt", get(reader_debt))
            .route("/titles/{id}/reservations", get(reservation_queue))
            .with_state(self.service.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(serde_json::json!({
            "paths": {
                "/issues": {
                    "post": {
                        "summary": "Issue a copy to a reader",
                        "tags": ["Circulation"],
                        "responses": {
                            "201": {
                                "description": "Loan opened",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/Issue" }
                                    }
                                }
                            },
                            "409": {
                                "description": "Denied by business rules or lost race",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                                    }
                                }
                            },
                            "422": {
                                "description": "Validation error",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                                    }
                                }
                            }
                        }
                    }
                },
                "/issues/{id}/renew": {
                    "post": {
                        "summary": "Extend an open loan's due date",
                        "tags": ["Circulation"],
                        "responses": {
                            "200": {
                                "description": "Renewed loan",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/Issue" }
                                    }
                                }
                            },
                            "409": {
                                "description": "Closed loan or renewal cap reached",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                                    }
                                }
                            }
                        }
                    }
                },
                "/issues/{id}/return": {
                    "post": {
                        "summary": "Take a copy back, assess fines, serve the queue",
                        "tags": ["Circulation"],
                        "responses": {
                            "200": {
                                "description": "Final state of the loan, fine, and copy",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/ReturnOutcome" }
                                    }
                                }
                            }
                        }
                    }
                },
                "/reservations": {
                    "post": {
                        "summary": "Queue a reader for the next copy of a title",
                        "tags": ["Reservations"],
                        "responses": {
                            "201": {
                                "description": "Reservation queued",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/Reservation" }
                                    }
                                }
                            },
                            "409": {
                                "description": "Duplicate claim or a copy is on the shelf",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                                    }
                                }
                            }
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Issue": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "string", "format": "uuid" },
                            "reader_id": { "type": "string", "format": "uuid" },
                            "copy_id": { "type": "string", "format": "uuid" },
                            "issued_at": { "type": "string", "format": "date-time" },
                            "due_at": { "type": "string", "format": "date-time" },
                            "returned_at": { "type": "string", "format": "date-time", "nullable": true },
                            "renewal_count": { "type": "integer" }
                        },
                        "required": ["id", "reader_id", "copy_id", "issued_at", "due_at"]
                    },
                    "Reservation": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "string", "format": "uuid" },
                            "reader_id": { "type": "string", "format": "uuid" },
                            "title_id": { "type": "string", "format": "uuid" },
                            "status": {
                                "type": "string",
                                "enum": ["waiting", "ready", "fulfilled", "expired", "cancelled"]
                            }
                        },
                        "required": ["id", "reader_id", "title_id", "status"]
                    },
                    "ReturnOutcome": {
                        "type": "object",
                        "properties": {
                            "issue": { "$ref": "#/components/schemas/Issue" },
                            "fine": { "nullable": true },
                            "copy": { "type": "object" },
                            "readied_reservation": { "nullable": true }
                        },
                        "required": ["issue", "copy"]
                    }
                }
            }
        }))
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "circulation module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "circulation module stopped");
        Ok(())
    }
}

/// Issue a copy to a reader
async fn issue_copy(
    State(service): State<Service>,
    Json(body): Json<models::IssueBody>,
) -> Result<(StatusCode, Json<Issue>), AppError> {
    let issue = service.issue(
        IssueRequest {
            reader_id: body.reader_id.into(),
            copy_code: body.copy_code,
            due_days: body.due_days,
            staff_id: body.staff_id.into(),
            notes: body.notes,
        },
        OffsetDateTime::now_utc(),
    )?;
    Ok((StatusCode::CREATED, Json(issue)))
}

/// Extend an open loan
async fn renew_issue(
    State(service): State<Service>,
    Path(id): Path<Uuid>,
    Json(body): Json<models::RenewBody>,
) -> Result<Json<Issue>, AppError> {
    let issue = service.renew(id.into(), body.extension_days)?;
    Ok(Json(issue))
}

/// Close a loan and serve the reservation queue
async fn return_copy(
    State(service): State<Service>,
    Path(id): Path<Uuid>,
    Json(body): Json<models::ReturnBody>,
) -> Result<Json<ReturnOutcome>, AppError> {
    let outcome = service.return_copy(
        ReturnRequest {
            issue_id: id.into(),
            returned_at: body.returned_at,
            staff_id: body.staff_id.into(),
        },
        OffsetDateTime::now_utc(),
    )?;
    Ok(Json(outcome))
}

/// Report a copy lost
async fn mark_lost(
    State(service): State<Service>,
    Path(id): Path<Uuid>,
    Json(body): Json<models::MarkCopyBody>,
) -> Result<Json<BookCopy>, AppError> {
    let copy = service.mark_lost(id.into(), body.staff_id.into(), OffsetDateTime::now_utc())?;
    Ok(Json(copy))
}

/// Report a copy damaged
async fn mark_damaged(
    State(service): State<Service>,
    Path(id): Path<Uuid>,
    Json(body): Json<models::MarkCopyBody>,
) -> Result<Json<BookCopy>, AppError> {
    let copy = service.mark_damaged(id.into(), body.staff_id.into(), OffsetDateTime::now_utc())?;
    Ok(Json(copy))
}

/// Assess a manual fine
async fn assess_fine(
    State(service): State<Service>,
    Json(body): Json<models::ManualFineBody>,
) -> Result<(StatusCode, Json<Fine>), AppError> {
    let fine = service.assess_manual_fine(
        ManualFineRequest {
            reader_id: body.reader_id.into(),
            issue_id: body.issue_id.map(Into::into),
            amount: body.amount,
            reason: body.reason,
            staff_id: body.staff_id.into(),
        },
        OffsetDateTime::now_utc(),
    )?;
    Ok((StatusCode::CREATED, Json(fine)))
}

/// Record a fine payment
async fn pay_fine(
    State(service): State<Service>,
    Path(id): Path<Uuid>,
    Json(body): Json<models::PaymentBody>,
) -> Result<Json<Fine>, AppError> {
    let paid_at = body.paid_at.unwrap_or_else(OffsetDateTime::now_utc);
    let fine = service.pay_fine(id.into(), body.amount, paid_at)?;
    Ok(Json(fine))
}

/// Queue a reservation
async fn reserve(
    State(service): State<Service>,
    Json(body): Json<models::ReserveBody>,
) -> Result<(StatusCode, Json<Reservation>), AppError> {
    let reservation = service.reserve(
        body.reader_id.into(),
        body.title_id.into(),
        OffsetDateTime::now_utc(),
    )?;
    Ok((StatusCode::CREATED, Json(reservation)))
}

/// Cancel a reservation
async fn cancel_reservation(
    State(service): State<Service>,
    Path(id): Path<Uuid>,
) -> Result<Json<Reservation>, AppError> {
    let reservation = service.cancel_reservation(id.into(), OffsetDateTime::now_utc())?;
    Ok(Json(reservation))
}

/// Expire lapsed pickup holds (invoked by the scheduler's periodic job)
async fn expire_reservations(
    State(service): State<Service>,
) -> Result<Json<Vec<Reservation>>, AppError> {
    let expired = service.expire_reservations(OffsetDateTime::now_utc())?;
    Ok(Json(expired))
}

/// Open loans for one reader
async fn reader_issues(
    State(service): State<Service>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Issue>>, AppError> {
    Ok(Json(service.active_issues(id.into())?))
}

/// Unpaid fines for one reader
async fn reader_fines(
    State(service): State<Service>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Fine>>, AppError> {
    Ok(Json(service.unpaid_fines(id.into())?))
}

/// Outstanding debt for one reader
async fn reader_debt(
    State(service): State<Service>,
    Path(id): Path<Uuid>,
) -> Result<Json<models::DebtResponse>, AppError> {
    let total_debt = service.total_debt(id.into())?;
    Ok(Json(models::DebtResponse {
        reader_id: id,
        total_debt,
    }))
}

/// Every open loan past its due date
async fn overdue_issues(State(service): State<Service>) -> Result<Json<Vec<Issue>>, AppError> {
    Ok(Json(service.overdue_issues(OffsetDateTime::now_utc())?))
}

/// Waiting reservations for a title, in fulfillment order
async fn reservation_queue(
    State(service): State<Service>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Reservation>>, AppError> {
    Ok(Json(service.reservation_queue(id.into())?))
}

/// Create a new instance of the circulation module
pub fn create_module(service: Service) -> Arc<dyn Module> {
    Arc::new(CirculationModule::new(service))
}
