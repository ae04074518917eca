//! Optimistic persistence: local shapes ↔ backend records.
//!
//! Every local change lands in the [`ShapeStore`] immediately and is then
//! queued on the shape's **lane**, a spawned task that runs that shape's
//! requests strictly one after another. Different shapes never wait on
//! each other. Each request is bounded by the configured timeout.
//!
//! Results come back over a channel and are applied on the editor's side
//! by [`SyncEngine::pump`] (or awaited with [`SyncEngine::settle`]):
//!
//! - success: the server's record becomes the confirmed version, and it
//!   replaces the local one unless the user changed the shape again since
//! - failed update: the shape rolls back to its confirmed version
//! - failed create: the shape disappears
//! - failed delete: the shape comes back at its old position
//!
//! Failures also produce a [`Notice`] for the host to show.
//!
//! Previews (drag and resize frames) only touch the store. They never
//! reach the backend.

use crate::backend::{Backend, BackendError, PageRef, ShapeRecord};
use crate::compose::ComposeScheduler;
use crate::config::EditorConfig;
use crate::store::{Entry, ShapeStore};
use ov_core::error::ModelError;
use ov_core::id::ShapeId;
use ov_core::model::{MinSize, Shape, ShapeFamily};
use ov_core::patch::ShapePatch;
use ov_core::wire::{DrawingUpdate, NewDrawing, NewTextRegion, RegionUpdate};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::runtime::{Handle, TryCurrentError};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Identifies one queued backend request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ticket(u64);

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("persistence needs a running tokio runtime: {0}")]
    NoRuntime(#[from] TryCurrentError),

    #[error("loading page {page} failed: {source}")]
    Load {
        page: PageRef,
        #[source]
        source: BackendError,
    },
}

/// Something the user should be told about.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    CreateFailed { id: ShapeId, error: BackendError },
    UpdateFailed { id: ShapeId, error: BackendError },
    DeleteFailed { id: ShapeId, error: BackendError },
    /// A record from the backend could not be turned into a shape.
    RecordSkipped { remote_id: String, error: ModelError },
    /// The composed page image was refreshed.
    Composed,
    ComposeFailed { error: BackendError },
}

impl Notice {
    pub fn is_error(&self) -> bool {
        !matches!(self, Notice::Composed)
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::CreateFailed { error, .. } => write!(f, "Could not save the new shape: {error}"),
            Notice::UpdateFailed { error, .. } => write!(f, "Could not save your change: {error}"),
            Notice::DeleteFailed { error, .. } => write!(f, "Could not delete the shape: {error}"),
            Notice::RecordSkipped { remote_id, error } => {
                write!(f, "Skipped unreadable record {remote_id}: {error}")
            }
            Notice::Composed => f.write_str("Page image updated"),
            Notice::ComposeFailed { error } => write!(f, "Could not update the page image: {error}"),
        }
    }
}

/// A deleted shape and where it sat in its family's list.
#[derive(Debug, Clone, PartialEq)]
pub struct Removed {
    pub shape: Shape,
    pub index: usize,
}

/// Run `fut`, giving up after `limit`.
pub(crate) async fn bounded<T>(
    limit: Duration,
    fut: impl Future<Output = Result<T, BackendError>>,
) -> Result<T, BackendError> {
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(BackendError::Timeout(limit)),
    }
}

// ─── Lanes ───────────────────────────────────────────────────────────────

enum CreateBody {
    Region(NewTextRegion),
    Drawing(NewDrawing),
}

enum UpdateBody {
    Region(RegionUpdate),
    Drawing(DrawingUpdate),
}

enum JobKind {
    Create(CreateBody),
    Update(UpdateBody),
    Delete { tombstone: Entry, index: usize },
}

struct Job {
    ticket: Ticket,
    generation: u64,
    kind: JobKind,
}

enum LaneResult {
    Created(Result<ShapeRecord, BackendError>),
    Updated(Result<ShapeRecord, BackendError>),
    Deleted {
        result: Result<(), BackendError>,
        tombstone: Entry,
        index: usize,
        remote: Option<String>,
    },
}

impl LaneResult {
    fn succeeded(&self) -> bool {
        match self {
            LaneResult::Created(r) | LaneResult::Updated(r) => r.is_ok(),
            LaneResult::Deleted { result, .. } => result.is_ok(),
        }
    }
}

pub(crate) struct LaneOutcome {
    id: ShapeId,
    epoch: u64,
    ticket: Ticket,
    generation: u64,
    result: LaneResult,
}

pub(crate) enum Outcome {
    Lane(LaneOutcome),
    Composed(Result<(), BackendError>),
}

struct Lane {
    tx: UnboundedSender<Job>,
    epoch: u64,
}

struct LaneWorker<B> {
    backend: Arc<B>,
    page: PageRef,
    id: ShapeId,
    family: ShapeFamily,
    epoch: u64,
    remote: Option<String>,
    timeout: Duration,
    outcomes: UnboundedSender<Outcome>,
    compose: Arc<ComposeScheduler<B>>,
}

impl<B: Backend> LaneWorker<B> {
    async fn run(mut self, mut jobs: UnboundedReceiver<Job>) {
        while let Some(job) = jobs.recv().await {
            let ticket = job.ticket;
            let generation = job.generation;
            let result = self.process(job.kind).await;
            if result.succeeded() {
                self.compose.touch();
            }
            let outcome = Outcome::Lane(LaneOutcome {
                id: self.id,
                epoch: self.epoch,
                ticket,
                generation,
                result,
            });
            if self.outcomes.send(outcome).is_err() {
                break;
            }
        }
        log::trace!("lane {} (epoch {}) closed", self.id, self.epoch);
    }

    async fn process(&mut self, kind: JobKind) -> LaneResult {
        let limit = self.timeout;
        match kind {
            JobKind::Create(body) => {
                let result = match &body {
                    CreateBody::Region(b) => bounded(limit, self.backend.create_region(&self.page, b))
                        .await
                        .map(ShapeRecord::Region),
                    CreateBody::Drawing(b) => {
                        bounded(limit, self.backend.create_drawing(&self.page, b))
                            .await
                            .map(ShapeRecord::Drawing)
                    }
                };
                if let Ok(record) = &result {
                    self.remote = Some(record.remote_id().to_string());
                }
                LaneResult::Created(result)
            }
            JobKind::Update(body) => {
                let result = match (&self.remote, &body) {
                    (None, _) => Err(BackendError::NotPersisted(self.id)),
                    (Some(remote), UpdateBody::Region(b)) => {
                        bounded(limit, self.backend.update_region(&self.page, remote, b))
                            .await
                            .map(ShapeRecord::Region)
                    }
                    (Some(remote), UpdateBody::Drawing(b)) => {
                        bounded(limit, self.backend.update_drawing(&self.page, remote, b))
                            .await
                            .map(ShapeRecord::Drawing)
                    }
                };
                LaneResult::Updated(result)
            }
            JobKind::Delete { tombstone, index } => {
                // A shape whose create never succeeded has nothing to delete.
                let result = match (&self.remote, self.family) {
                    (None, _) => Ok(()),
                    (Some(remote), ShapeFamily::Region) => {
                        bounded(limit, self.backend.delete_region(&self.page, remote)).await
                    }
                    (Some(remote), ShapeFamily::Drawing) => {
                        bounded(limit, self.backend.delete_drawing(&self.page, remote)).await
                    }
                };
                LaneResult::Deleted {
                    result,
                    tombstone,
                    index,
                    remote: self.remote.clone(),
                }
            }
        }
    }
}

/// Fields the backend does not store for a family are carried over from
/// the local shape.
fn keep_local_only(server: &mut Shape, local: &Shape) {
    if let (Shape::Drawing(s), Shape::Drawing(l)) = (server, local) {
        s.locked = s.locked || l.locked;
    }
}

/// Make the geometry of `patch` match `shape` after normalization.
fn with_geometry_of(patch: &ShapePatch, shape: &Shape) -> ShapePatch {
    let mut patch = patch.clone();
    match (&mut patch, shape) {
        (ShapePatch::Region(p), Shape::Region(r)) if p.bbox.is_some() => p.bbox = Some(r.bbox),
        (ShapePatch::Drawing(p), Shape::Drawing(d)) if p.kind.is_some() => {
            p.kind = Some(d.kind.clone());
        }
        _ => {}
    }
    patch
}

// ─── Engine ──────────────────────────────────────────────────────────────

/// Owns the local shapes of one page and keeps them in step with the
/// backend.
pub struct SyncEngine<B: Backend> {
    backend: Arc<B>,
    page: PageRef,
    runtime: Handle,
    store: ShapeStore,
    lanes: HashMap<ShapeId, Lane>,
    next_epoch: u64,
    next_ticket: u64,
    next_generation: u64,
    in_flight: HashSet<Ticket>,
    outcome_tx: UnboundedSender<Outcome>,
    outcome_rx: UnboundedReceiver<Outcome>,
    compose: Arc<ComposeScheduler<B>>,
    notices: Vec<Notice>,
    timeout: Duration,
    region_min: MinSize,
}

impl<B: Backend> SyncEngine<B> {
    /// Create an engine with an empty store.
    ///
    /// Must be called from within a tokio runtime; lanes are spawned on it.
    pub fn new(backend: Arc<B>, page: PageRef, config: &EditorConfig) -> Result<Self, SyncError> {
        let runtime = Handle::try_current()?;
        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();
        let compose = Arc::new(ComposeScheduler::new(
            Arc::clone(&backend),
            page.clone(),
            config.compose_delay(),
            config.request_timeout(),
            config.auto_compose,
            outcome_tx.clone(),
            runtime.clone(),
        ));
        Ok(Self {
            backend,
            page,
            runtime,
            store: ShapeStore::default(),
            lanes: HashMap::new(),
            next_epoch: 0,
            next_ticket: 0,
            next_generation: 0,
            in_flight: HashSet::new(),
            outcome_tx,
            outcome_rx,
            compose,
            notices: Vec::new(),
            timeout: config.request_timeout(),
            region_min: config.region_min,
        })
    }

    pub fn page(&self) -> &PageRef {
        &self.page
    }

    pub fn store(&self) -> &ShapeStore {
        &self.store
    }

    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    /// Replace the store with the backend's current records.
    ///
    /// Records that do not convert are skipped with a notice. Outstanding
    /// results from before the reload are ignored when they arrive.
    pub async fn load(&mut self) -> Result<(), SyncError> {
        let limit = self.timeout;
        let backend = Arc::clone(&self.backend);
        let page = self.page.clone();
        let (regions, drawings) = tokio::try_join!(
            bounded(limit, backend.list_regions(&page)),
            bounded(limit, backend.list_drawings(&page)),
        )
        .map_err(|source| SyncError::Load {
            page: page.clone(),
            source,
        })?;

        self.lanes.clear();
        self.store.clear();
        self.in_flight.clear();

        for record in regions {
            let shape = record.to_region().map(Shape::Region);
            self.insert_loaded(record.id, shape);
        }
        for record in drawings {
            let shape = record.to_drawing().map(Shape::Drawing);
            self.insert_loaded(record.id, shape);
        }
        log::info!(
            "loaded {} regions and {} drawings for {}",
            self.store.len(ShapeFamily::Region),
            self.store.len(ShapeFamily::Drawing),
            self.page
        );
        Ok(())
    }

    fn insert_loaded(&mut self, remote_id: String, shape: Result<Shape, ModelError>) {
        match shape {
            Ok(shape) => {
                let generation = self.bump();
                if !self.store.insert(Entry::loaded(shape, remote_id.clone(), generation), None) {
                    log::warn!("duplicate record {remote_id} on {}", self.page);
                }
            }
            Err(error) => {
                log::warn!("skipping record {remote_id}: {error}");
                self.notices.push(Notice::RecordSkipped { remote_id, error });
            }
        }
    }

    fn bump(&mut self) -> u64 {
        self.next_generation += 1;
        self.next_generation
    }

    // ─── Local changes ───────────────────────────────────────────────────

    /// Show `shape` in place of the stored one without persisting it.
    /// Unknown ids are ignored.
    pub fn preview(&mut self, shape: Shape) -> bool {
        let generation = self.bump();
        match self.store.entry_mut(shape.id()) {
            Some(entry) if entry.shape.family() == shape.family() => {
                entry.shape = shape;
                entry.generation = generation;
                true
            }
            _ => false,
        }
    }

    /// Apply `patch` locally and queue it for the backend.
    ///
    /// Region boxes are grown to the minimum size first; the request
    /// carries the normalized geometry. Returns `None` (and changes
    /// nothing) for unknown ids, family mismatches and non-finite values.
    pub fn commit(&mut self, id: ShapeId, patch: &ShapePatch) -> Option<Ticket> {
        if patch.is_empty() {
            return None;
        }
        if !patch.is_finite() {
            log::warn!("refusing non-finite patch for {id}");
            return None;
        }
        let Some(entry) = self.store.entry(id) else {
            log::warn!("commit for unknown shape {id}");
            return None;
        };
        let mut next = entry.shape.clone();
        if let Err(error) = patch.apply(&mut next) {
            log::warn!("commit for {id} rejected: {error}");
            return None;
        }
        let next = next.normalized(self.region_min);
        let sent = with_geometry_of(patch, &next);
        let body = match &sent {
            ShapePatch::Region(p) => UpdateBody::Region(RegionUpdate::from(p)),
            ShapePatch::Drawing(p) => UpdateBody::Drawing(DrawingUpdate::from(p)),
        };
        let generation = self.bump();
        let family = next.family();
        if let Some(entry) = self.store.entry_mut(id) {
            entry.shape = next;
            entry.generation = generation;
        }
        log::debug!("commit {id} (generation {generation})");
        Some(self.enqueue(id, family, generation, JobKind::Update(body)))
    }

    /// Add a new shape at the end of its family's list and persist it.
    pub fn create(&mut self, shape: Shape) -> Option<Ticket> {
        self.create_at(shape, None)
    }

    /// Add a new shape at `index` in its family's list and persist it.
    ///
    /// The shape keeps its local id for its whole life; the backend id is
    /// tracked separately once the create is acknowledged.
    pub fn create_at(&mut self, shape: Shape, index: Option<usize>) -> Option<Ticket> {
        let shape = shape.normalized(self.region_min);
        if !shape.is_finite() {
            log::warn!("refusing non-finite shape {}", shape.id());
            return None;
        }
        let id = shape.id();
        let family = shape.family();
        let body = match &shape {
            Shape::Region(r) => CreateBody::Region(NewTextRegion::from(r)),
            Shape::Drawing(d) => CreateBody::Drawing(NewDrawing::from(d)),
        };
        let generation = self.bump();
        if !self.store.insert(Entry::pending(shape, generation), index) {
            log::warn!("create for existing shape {id}");
            return None;
        }
        // A recreated shape must not reuse the lane of its previous life.
        self.lanes.remove(&id);
        log::debug!("create {id}");
        Some(self.enqueue(id, family, generation, JobKind::Create(body)))
    }

    /// Remove a shape locally and queue its deletion.
    pub fn delete(&mut self, id: ShapeId) -> Option<(Ticket, Removed)> {
        let family = self.store.get(id)?.family();
        // The lane picks up the backend id from the store, so it has to
        // exist before the entry goes away.
        self.lane(id, family);
        let (tombstone, index) = self.store.remove(id)?;
        let removed = Removed {
            shape: tombstone.shape.clone(),
            index,
        };
        let generation = self.bump();
        log::debug!("delete {id}");
        let ticket = self.enqueue(id, family, generation, JobKind::Delete { tombstone, index });
        // Later work for this id goes to a fresh lane.
        self.lanes.remove(&id);
        Some((ticket, removed))
    }

    /// Drop shapes from the local store without touching the backend.
    pub fn forget(&mut self, ids: &[ShapeId]) {
        for id in ids {
            self.store.remove(*id);
            self.lanes.remove(id);
        }
    }

    /// Recompose now instead of waiting for the quiet window.
    pub fn compose_now(&self) {
        self.compose.flush();
    }

    fn enqueue(&mut self, id: ShapeId, family: ShapeFamily, generation: u64, kind: JobKind) -> Ticket {
        self.next_ticket += 1;
        let ticket = Ticket(self.next_ticket);
        let job = Job {
            ticket,
            generation,
            kind,
        };
        let job = match self.lane(id, family).send(job) {
            Ok(()) => None,
            Err(mpsc::error::SendError(job)) => Some(job),
        };
        if let Some(job) = job {
            // The worker is gone; start over on a new lane.
            log::warn!("lane for {id} closed unexpectedly, respawning");
            self.lanes.remove(&id);
            if self.lane(id, family).send(job).is_err() {
                log::error!("could not queue request for {id}");
                return ticket;
            }
        }
        self.in_flight.insert(ticket);
        ticket
    }

    fn lane(&mut self, id: ShapeId, family: ShapeFamily) -> UnboundedSender<Job> {
        if let Some(lane) = self.lanes.get(&id) {
            return lane.tx.clone();
        }
        self.next_epoch += 1;
        let epoch = self.next_epoch;
        let (tx, rx) = mpsc::unbounded_channel();
        let worker = LaneWorker {
            backend: Arc::clone(&self.backend),
            page: self.page.clone(),
            id,
            family,
            epoch,
            remote: self.store.remote_id(id).map(str::to_string),
            timeout: self.timeout,
            outcomes: self.outcome_tx.clone(),
            compose: Arc::clone(&self.compose),
        };
        self.runtime.spawn(worker.run(rx));
        self.lanes.insert(id, Lane { tx: tx.clone(), epoch });
        tx
    }

    // ─── Results ─────────────────────────────────────────────────────────

    /// Apply every result that has arrived so far. Never blocks.
    pub fn pump(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(outcome) = self.outcome_rx.try_recv() {
            self.apply(outcome);
            applied += 1;
        }
        applied
    }

    /// Wait until every queued request has been answered and applied.
    pub async fn settle(&mut self) {
        self.pump();
        while !self.in_flight.is_empty() {
            match self.outcome_rx.recv().await {
                Some(outcome) => self.apply(outcome),
                None => break,
            }
        }
    }

    pub fn is_settled(&self, ticket: Ticket) -> bool {
        !self.in_flight.contains(&ticket)
    }

    /// Requests queued or running.
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    fn is_current(&self, id: ShapeId, epoch: u64) -> bool {
        self.lanes.get(&id).is_some_and(|lane| lane.epoch == epoch)
    }

    fn apply(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Composed(Ok(())) => {
                log::debug!("recomposed {}", self.page);
                self.notices.push(Notice::Composed);
            }
            Outcome::Composed(Err(error)) => {
                log::warn!("recompose of {} failed: {error}", self.page);
                self.notices.push(Notice::ComposeFailed { error });
            }
            Outcome::Lane(outcome) => self.apply_lane(outcome),
        }
    }

    fn apply_lane(&mut self, outcome: LaneOutcome) {
        let LaneOutcome {
            id,
            epoch,
            ticket,
            generation,
            result,
        } = outcome;
        self.in_flight.remove(&ticket);
        let current = self.is_current(id, epoch);

        match result {
            LaneResult::Created(Ok(record)) => {
                if current {
                    self.confirm(id, generation, &record, true);
                }
            }
            LaneResult::Updated(Ok(record)) => {
                if current {
                    self.confirm(id, generation, &record, false);
                }
            }
            LaneResult::Created(Err(error)) => {
                if !current {
                    log::debug!("stale create failure for {id}: {error}");
                    return;
                }
                log::warn!("create of {id} failed: {error}");
                self.store.remove(id);
                self.lanes.remove(&id);
                self.notices.push(Notice::CreateFailed { id, error });
            }
            LaneResult::Updated(Err(error)) => {
                if !current {
                    log::debug!("stale update failure for {id}: {error}");
                    return;
                }
                log::warn!("update of {id} failed: {error}");
                if let Some(entry) = self.store.entry_mut(id)
                    && entry.generation == generation
                    && let Some(confirmed) = &entry.confirmed
                {
                    entry.shape = confirmed.clone();
                }
                self.notices.push(Notice::UpdateFailed { id, error });
            }
            LaneResult::Deleted { result: Ok(()), .. } => {
                log::debug!("deleted {id}");
            }
            LaneResult::Deleted {
                result: Err(error),
                mut tombstone,
                index,
                remote,
            } => {
                log::warn!("delete of {id} failed: {error}");
                if !self.store.contains(id) {
                    tombstone.remote = remote.or(tombstone.remote);
                    tombstone.generation = self.bump();
                    self.lanes.remove(&id);
                    self.store.insert(tombstone, Some(index));
                }
                self.notices.push(Notice::DeleteFailed { id, error });
            }
        }
    }

    /// Adopt the server's version of a shape.
    fn confirm(&mut self, id: ShapeId, generation: u64, record: &ShapeRecord, created: bool) {
        let Some(entry) = self.store.entry_mut(id) else {
            return;
        };
        if created {
            entry.remote = Some(record.remote_id().to_string());
        }
        match record.to_shape(id) {
            Ok(mut server) => {
                keep_local_only(&mut server, &entry.shape);
                if entry.generation == generation {
                    entry.shape = server.clone();
                }
                entry.confirmed = Some(server);
            }
            Err(error) => {
                log::warn!("unreadable response for {id}: {error}");
                entry.confirmed = Some(entry.shape.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryBackend, Op};
    use kurbo::{Point, Rect};
    use ov_core::model::{DrawStyle, Drawing, DrawingKind, TextRegion};
    use ov_core::patch::{DrawingPatch, RegionPatch};
    use pretty_assertions::assert_eq;

    fn page() -> PageRef {
        PageRef::new("proj", 1)
    }

    fn engine(backend: &MemoryBackend) -> SyncEngine<MemoryBackend> {
        SyncEngine::new(Arc::new(backend.clone()), page(), &EditorConfig::default()).unwrap()
    }

    fn rect(bounds: Rect) -> Shape {
        Shape::Drawing(Drawing::new(
            ShapeId::local(),
            1,
            DrawingKind::Rect { bounds },
            DrawStyle::default(),
        ))
    }

    #[test]
    fn needs_a_runtime() {
        let backend = MemoryBackend::new();
        let result = SyncEngine::new(Arc::new(backend), page(), &EditorConfig::default());
        assert!(matches!(result, Err(SyncError::NoRuntime(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn create_then_confirm_keeps_local_id() {
        let backend = MemoryBackend::new();
        let mut sync = engine(&backend);
        let shape = rect(Rect::new(0.0, 0.0, 40.0, 40.0));
        let id = shape.id();
        let ticket = sync.create(shape).unwrap();
        assert!(!sync.is_settled(ticket));
        sync.settle().await;
        assert!(sync.is_settled(ticket));
        assert!(sync.store().contains(id));
        let remote = sync.store().remote_id(id).unwrap().to_string();
        assert_eq!(backend.drawings(&page())[0].id, remote);
    }

    #[tokio::test(start_paused = true)]
    async fn region_commit_sends_normalized_box() {
        let backend = MemoryBackend::new();
        let mut sync = engine(&backend);
        let region = Shape::Region(TextRegion::manual(
            ShapeId::local(),
            1,
            Rect::new(10.0, 10.0, 110.0, 40.0),
        ));
        let id = region.id();
        sync.create(region);
        let patch = ShapePatch::Region(RegionPatch {
            bbox: Some(Rect::new(10.0, 10.0, 12.0, 12.0)),
            ..RegionPatch::default()
        });
        sync.commit(id, &patch).unwrap();
        assert_eq!(sync.store().get(id).unwrap().bounds(), Rect::new(10.0, 10.0, 30.0, 20.0));
        sync.settle().await;
        let (_, sent) = &backend.region_updates()[0];
        assert_eq!(sent.bbox, Some([10.0, 10.0, 30.0, 20.0]));
    }

    #[tokio::test(start_paused = true)]
    async fn non_finite_patch_is_refused() {
        let backend = MemoryBackend::new();
        let mut sync = engine(&backend);
        let shape = rect(Rect::new(0.0, 0.0, 40.0, 40.0));
        let id = shape.id();
        sync.create(shape);
        sync.settle().await;
        let patch = ShapePatch::Drawing(DrawingPatch {
            kind: Some(DrawingKind::Line {
                from: Point::new(f64::NAN, 0.0),
                to: Point::new(1.0, 1.0),
            }),
            ..DrawingPatch::default()
        });
        assert!(sync.commit(id, &patch).is_none());
        assert_eq!(backend.calls(Op::UpdateDrawing), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_create_removes_shape() {
        let backend = MemoryBackend::new();
        backend.fail_next(Op::CreateDrawing, 1);
        let mut sync = engine(&backend);
        let shape = rect(Rect::new(0.0, 0.0, 40.0, 40.0));
        let id = shape.id();
        sync.create(shape);
        assert!(sync.store().contains(id));
        sync.settle().await;
        assert!(!sync.store().contains(id));
        assert!(matches!(
            sync.drain_notices().as_slice(),
            [Notice::CreateFailed { .. }]
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn unreadable_records_are_skipped_on_load() {
        let backend = MemoryBackend::new();
        backend.seed_drawing(
            &page(),
            serde_json::from_str(r#"{"id":"bad","element_type":"hexagon","points":[0,0]}"#).unwrap(),
        );
        backend.seed_drawing(
            &page(),
            serde_json::from_str(r#"{"id":"good","element_type":"line","points":[0,0,5,5]}"#)
                .unwrap(),
        );
        let mut sync = engine(&backend);
        sync.load().await.unwrap();
        assert_eq!(sync.store().len(ShapeFamily::Drawing), 1);
        assert!(matches!(
            sync.drain_notices().as_slice(),
            [Notice::RecordSkipped { remote_id, .. }] if remote_id == "bad"
        ));
    }
}
