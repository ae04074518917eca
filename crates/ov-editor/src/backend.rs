//! The persistence seam.
//!
//! The editor talks to the overlay backend only through [`Backend`]. The
//! HTTP client implements it for production; [`crate::memory::MemoryBackend`]
//! implements it for tests and offline replays.

use ov_core::error::ModelError;
use ov_core::id::ShapeId;
use ov_core::model::Shape;
use ov_core::wire::{
    DrawingRecord, DrawingUpdate, NewDrawing, NewTextRegion, RegionUpdate, TextRegionRecord,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// One page of one project.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageRef {
    pub project_id: String,
    pub page_number: u32,
}

impl PageRef {
    pub fn new(project_id: impl Into<String>, page_number: u32) -> Self {
        Self {
            project_id: project_id.into(),
            page_number,
        }
    }
}

impl fmt::Display for PageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.project_id, self.page_number)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BackendError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("backend returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("could not decode response: {0}")]
    Decode(String),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("no record with id {0}")]
    NotFound(String),

    #[error("shape {0} has no backend record yet")]
    NotPersisted(ShapeId),

    #[error("invalid record: {0}")]
    Model(#[from] ModelError),
}

/// Async CRUD over one project's overlay records, plus recomposition.
///
/// Futures must be `Send`: the synchronizer drives each call on a spawned
/// task.
pub trait Backend: Send + Sync + 'static {
    fn list_regions(
        &self,
        page: &PageRef,
    ) -> impl Future<Output = Result<Vec<TextRegionRecord>, BackendError>> + Send;

    fn create_region(
        &self,
        page: &PageRef,
        body: &NewTextRegion,
    ) -> impl Future<Output = Result<TextRegionRecord, BackendError>> + Send;

    fn update_region(
        &self,
        page: &PageRef,
        id: &str,
        body: &RegionUpdate,
    ) -> impl Future<Output = Result<TextRegionRecord, BackendError>> + Send;

    fn delete_region(
        &self,
        page: &PageRef,
        id: &str,
    ) -> impl Future<Output = Result<(), BackendError>> + Send;

    fn list_drawings(
        &self,
        page: &PageRef,
    ) -> impl Future<Output = Result<Vec<DrawingRecord>, BackendError>> + Send;

    fn create_drawing(
        &self,
        page: &PageRef,
        body: &NewDrawing,
    ) -> impl Future<Output = Result<DrawingRecord, BackendError>> + Send;

    fn update_drawing(
        &self,
        page: &PageRef,
        id: &str,
        body: &DrawingUpdate,
    ) -> impl Future<Output = Result<DrawingRecord, BackendError>> + Send;

    fn delete_drawing(
        &self,
        page: &PageRef,
        id: &str,
    ) -> impl Future<Output = Result<(), BackendError>> + Send;

    /// Re-render the composed page image. Idempotent.
    fn recompose(&self, page: &PageRef) -> impl Future<Output = Result<(), BackendError>> + Send;
}

/// A record of either family, as returned by a create or update.
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeRecord {
    Region(TextRegionRecord),
    Drawing(DrawingRecord),
}

impl ShapeRecord {
    pub fn remote_id(&self) -> &str {
        match self {
            ShapeRecord::Region(r) => &r.id,
            ShapeRecord::Drawing(d) => &d.id,
        }
    }

    /// Convert to a shape keyed by the local `id`.
    pub fn to_shape(&self, id: ShapeId) -> Result<Shape, ModelError> {
        match self {
            ShapeRecord::Region(r) => {
                let mut region = r.to_region()?;
                region.id = id;
                Ok(Shape::Region(region))
            }
            ShapeRecord::Drawing(d) => {
                let mut drawing = d.to_drawing()?;
                drawing.id = id;
                Ok(Shape::Drawing(drawing))
            }
        }
    }
}
