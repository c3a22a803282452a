pub mod models;

use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use time::OffsetDateTime;
use uuid::Uuid;

use libris_circulation::model::{BookCopy, Reader, Title};
use libris_circulation::store::{Datastore, TxnOps};
use libris_http::error::AppError;
use libris_kernel::{InitCtx, Module};
use libris_store::MemoryStore;

/// Catalog module: the minimal data-entry surface the desk needs —
/// titles, copies, and readers. Everything else about the catalog lives
/// outside this service.
pub struct CatalogModule {
    store: MemoryStore,
}

impl CatalogModule {
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Module for CatalogModule {
    fn name(&self) -> &'static str {
        "catalog"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "catalog module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/titles", post(create_title))
            .route("/titles/{id}/copies", get(list_copies))
            .route("/copies", post(create_copy))
            .route("/readers", post(create_reader))
            .route("/readers/{id}/active", put(set_reader_active))
            .with_state(self.store.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(serde_json::json!({
            "paths": {
                "/titles": {
                    "post": {
                        "summary": "Register a title",
                        "tags": ["Catalog"],
                        "responses": {
                            "201": {
                                "description": "Title registered",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/Title" }
                                    }
                                }
                            }
                        }
                    }
                },
                "/copies": {
                    "post": {
                        "summary": "Accession a physical copy",
                        "tags": ["Catalog"],
                        "responses": {
                            "201": {
                                "description": "Copy accessioned",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/BookCopy" }
                                    }
                                }
                            },
                            "422": {
                                "description": "Duplicate copy code",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                                    }
                                }
                            }
                        }
                    }
                },
                "/readers": {
                    "post": {
                        "summary": "Register a reader",
                        "tags": ["Catalog"],
                        "responses": {
                            "201": {
                                "description": "Reader registered"
                            }
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Title": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "string", "format": "uuid" },
                            "title": { "type": "string" },
                            "author": { "type": "string" }
                        },
                        "required": ["id", "title", "author"]
                    },
                    "BookCopy": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "string", "format": "uuid" },
                            "title_id": { "type": "string", "format": "uuid" },
                            "code": { "type": "string" },
                            "status": {
                                "type": "string",
                                "enum": ["available", "issued", "reserved", "lost", "damaged"]
                            }
                        },
                        "required": ["id", "title_id", "code", "status"]
                    }
                }
            }
        }))
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "catalog module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "catalog module stopped");
        Ok(())
    }
}

/// Register a title
async fn create_title(
    State(store): State<MemoryStore>,
    Json(body): Json<models::CreateTitleBody>,
) -> Result<(StatusCode, Json<Title>), AppError> {
    let title = Title::new(body.title, body.author);
    store.transaction(|txn| {
        txn.insert_title(title.clone())?;
        Ok(())
    })?;
    Ok((StatusCode::CREATED, Json(title)))
}

/// Accession a copy of a registered title
async fn create_copy(
    State(store): State<MemoryStore>,
    Json(body): Json<models::CreateCopyBody>,
) -> Result<(StatusCode, Json<BookCopy>), AppError> {
    let mut copy = BookCopy::new(body.title_id.into(), body.code, OffsetDateTime::now_utc());
    copy.location = body.location;

    let copy = store.transaction(|txn| {
        if !txn.title_exists(copy.title_id) {
            return Err(libris_circulation::CirculationError::not_found(
                "title",
                copy.title_id,
            ));
        }
        txn.insert_copy(copy.clone())?;
        Ok(copy.clone())
    })?;
    Ok((StatusCode::CREATED, Json(copy)))
}

/// Copies of a title
async fn list_copies(
    State(store): State<MemoryStore>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<BookCopy>>, AppError> {
    let copies = store.transaction(|txn| Ok(txn.copies_of_title(id.into())))?;
    Ok(Json(copies))
}

/// Register a reader
async fn create_reader(
    State(store): State<MemoryStore>,
    Json(body): Json<models::CreateReaderBody>,
) -> Result<(StatusCode, Json<Reader>), AppError> {
    let reader = Reader::new(body.name);
    store.transaction(|txn| {
        txn.insert_reader(reader.clone())?;
        Ok(())
    })?;
    Ok((StatusCode::CREATED, Json(reader)))
}

/// Activate or deactivate a reader
async fn set_reader_active(
    State(store): State<MemoryStore>,
    Path(id): Path<Uuid>,
    Json(body): Json<models::ReaderActiveBody>,
) -> Result<Json<Reader>, AppError> {
    let reader = store.transaction(|txn| {
        txn.set_reader_active(id.into(), body.active)?;
        txn.reader(id.into())
            .ok_or_else(|| libris_circulation::CirculationError::not_found("reader", id))
    })?;
    Ok(Json(reader))
}

/// Create a new instance of the catalog module
pub fn create_module(store: MemoryStore) -> Arc<dyn Module> {
    Arc::new(CatalogModule::new(store))
}
