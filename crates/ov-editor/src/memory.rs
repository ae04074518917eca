//! An in-process backend.
//!
//! Stores records per page, assigns fresh ids on create and applies
//! partial updates the way the real service does. Every call is counted,
//! and latency or failures can be injected per operation, which is what
//! the synchronizer tests lean on. Also used by `ov-replay --offline`.

use crate::backend::{Backend, BackendError, PageRef};
use ov_core::wire::{
    DrawingRecord, DrawingUpdate, NewDrawing, NewTextRegion, RegionUpdate, TextRegionRecord,
};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Backend operations, for counting and failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    ListRegions,
    CreateRegion,
    UpdateRegion,
    DeleteRegion,
    ListDrawings,
    CreateDrawing,
    UpdateDrawing,
    DeleteDrawing,
    Recompose,
}

impl Op {
    pub const MUTATIONS: [Op; 6] = [
        Op::CreateRegion,
        Op::UpdateRegion,
        Op::DeleteRegion,
        Op::CreateDrawing,
        Op::UpdateDrawing,
        Op::DeleteDrawing,
    ];
}

#[derive(Default)]
struct PageData {
    regions: Vec<TextRegionRecord>,
    drawings: Vec<DrawingRecord>,
}

#[derive(Default)]
struct State {
    pages: HashMap<PageRef, PageData>,
    next_id: u64,
    calls: HashMap<Op, usize>,
    fail_next: HashMap<Op, usize>,
    fail_always: HashSet<Op>,
    latency: Duration,
    integer_coordinates: bool,
    region_updates: Vec<(String, RegionUpdate)>,
    drawing_updates: Vec<(String, DrawingUpdate)>,
}

impl State {
    fn fresh_id(&mut self) -> String {
        self.next_id += 1;
        format!("mem-{}", self.next_id)
    }

    fn page(&mut self, page: &PageRef) -> &mut PageData {
        self.pages.entry(page.clone()).or_default()
    }
}

/// Cloning shares the same store.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    state: Arc<Mutex<State>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Round every stored coordinate to whole pixels, so responses differ
    /// from what the client sent.
    pub fn with_integer_coordinates(self) -> Self {
        self.lock().integer_coordinates = true;
        self
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn seed_region(&self, page: &PageRef, record: TextRegionRecord) {
        self.lock().page(page).regions.push(record);
    }

    pub fn seed_drawing(&self, page: &PageRef, record: DrawingRecord) {
        self.lock().page(page).drawings.push(record);
    }

    pub fn regions(&self, page: &PageRef) -> Vec<TextRegionRecord> {
        self.lock().page(page).regions.clone()
    }

    pub fn drawings(&self, page: &PageRef) -> Vec<DrawingRecord> {
        self.lock().page(page).drawings.clone()
    }

    pub fn calls(&self, op: Op) -> usize {
        self.lock().calls.get(&op).copied().unwrap_or(0)
    }

    /// Creates, updates and deletes across both families.
    pub fn mutation_calls(&self) -> usize {
        Op::MUTATIONS.iter().map(|op| self.calls(*op)).sum()
    }

    /// Every region PATCH body received, in arrival order.
    pub fn region_updates(&self) -> Vec<(String, RegionUpdate)> {
        self.lock().region_updates.clone()
    }

    pub fn drawing_updates(&self) -> Vec<(String, DrawingUpdate)> {
        self.lock().drawing_updates.clone()
    }

    /// Fail the next `n` calls of `op` with a 500.
    pub fn fail_next(&self, op: Op, n: usize) {
        *self.lock().fail_next.entry(op).or_default() += n;
    }

    pub fn fail_always(&self, op: Op, failing: bool) {
        let mut state = self.lock();
        if failing {
            state.fail_always.insert(op);
        } else {
            state.fail_always.remove(&op);
        }
    }

    /// Delay applied to every call before it takes effect.
    pub fn set_latency(&self, latency: Duration) {
        self.lock().latency = latency;
    }

    async fn enter(&self, op: Op) -> Result<(), BackendError> {
        let latency = {
            let mut state = self.lock();
            *state.calls.entry(op).or_default() += 1;
            state.latency
        };
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        let mut state = self.lock();
        let injected = state.fail_always.contains(&op)
            || match state.fail_next.get_mut(&op) {
                Some(n) if *n > 0 => {
                    *n -= 1;
                    true
                }
                _ => false,
            };
        if injected {
            log::debug!("memory backend: injected failure for {op:?}");
            return Err(BackendError::Status {
                status: 500,
                body: format!("injected {op:?} failure"),
            });
        }
        Ok(())
    }
}

fn round_all(values: &mut [f64]) {
    for v in values {
        *v = v.round();
    }
}

impl Backend for MemoryBackend {
    async fn list_regions(&self, page: &PageRef) -> Result<Vec<TextRegionRecord>, BackendError> {
        self.enter(Op::ListRegions).await?;
        Ok(self.regions(page))
    }

    async fn create_region(
        &self,
        page: &PageRef,
        body: &NewTextRegion,
    ) -> Result<TextRegionRecord, BackendError> {
        self.enter(Op::CreateRegion).await?;
        let mut state = self.lock();
        let id = state.fresh_id();
        let mut record = TextRegionRecord::from_new(id, page.page_number, body);
        if state.integer_coordinates {
            round_all(&mut record.bbox);
        }
        state.page(page).regions.push(record.clone());
        Ok(record)
    }

    async fn update_region(
        &self,
        page: &PageRef,
        id: &str,
        body: &RegionUpdate,
    ) -> Result<TextRegionRecord, BackendError> {
        self.enter(Op::UpdateRegion).await?;
        let mut state = self.lock();
        state.region_updates.push((id.to_string(), body.clone()));
        let round = state.integer_coordinates;
        let record = state
            .page(page)
            .regions
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| BackendError::NotFound(id.to_string()))?;
        record.apply(body);
        if round {
            round_all(&mut record.bbox);
        }
        Ok(record.clone())
    }

    async fn delete_region(&self, page: &PageRef, id: &str) -> Result<(), BackendError> {
        self.enter(Op::DeleteRegion).await?;
        let mut state = self.lock();
        let regions = &mut state.page(page).regions;
        let before = regions.len();
        regions.retain(|r| r.id != id);
        if regions.len() == before {
            return Err(BackendError::NotFound(id.to_string()));
        }
        Ok(())
    }

    async fn list_drawings(&self, page: &PageRef) -> Result<Vec<DrawingRecord>, BackendError> {
        self.enter(Op::ListDrawings).await?;
        Ok(self.drawings(page))
    }

    async fn create_drawing(
        &self,
        page: &PageRef,
        body: &NewDrawing,
    ) -> Result<DrawingRecord, BackendError> {
        self.enter(Op::CreateDrawing).await?;
        let mut state = self.lock();
        let id = state.fresh_id();
        let mut record = DrawingRecord::from_new(id, page.page_number, body);
        if state.integer_coordinates {
            round_all(&mut record.points);
        }
        state.page(page).drawings.push(record.clone());
        Ok(record)
    }

    async fn update_drawing(
        &self,
        page: &PageRef,
        id: &str,
        body: &DrawingUpdate,
    ) -> Result<DrawingRecord, BackendError> {
        self.enter(Op::UpdateDrawing).await?;
        let mut state = self.lock();
        state.drawing_updates.push((id.to_string(), body.clone()));
        let round = state.integer_coordinates;
        let record = state
            .page(page)
            .drawings
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| BackendError::NotFound(id.to_string()))?;
        record.apply(body);
        if round {
            round_all(&mut record.points);
        }
        Ok(record.clone())
    }

    async fn delete_drawing(&self, page: &PageRef, id: &str) -> Result<(), BackendError> {
        self.enter(Op::DeleteDrawing).await?;
        let mut state = self.lock();
        let drawings = &mut state.page(page).drawings;
        let before = drawings.len();
        drawings.retain(|d| d.id != id);
        if drawings.len() == before {
            return Err(BackendError::NotFound(id.to_string()));
        }
        Ok(())
    }

    async fn recompose(&self, _page: &PageRef) -> Result<(), BackendError> {
        self.enter(Op::Recompose).await
    }
}
