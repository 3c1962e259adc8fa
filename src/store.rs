//! Core store type and builder.

use crate::entity::{find_collision, fresh_token, Entity, Tokenized};
use crate::error::Rejection;
use crate::mover::{MoveStrategy, RenameMove};
use crate::persist::{load, write_durable};
use crate::serializer::JsonSerializer;
use parking_lot::{Mutex, MutexGuard};
use std::collections::HashSet;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Durable JSON-file-backed collection of one entity kind.
///
/// Keeps the whole snapshot in memory and rewrites the backing file after
/// every successful mutation. Every read hands out owned copies, so callers
/// can't reach into the snapshot.
///
/// Each operation holds an internal lock for its whole
/// read-validate-mutate-persist sequence, so concurrent calls on one instance
/// don't lose updates or hand out the same id twice. Two instances (or two
/// processes) on the same file still clobber each other.
///
/// Mutations report their in-memory outcome. A failed write is logged and
/// shows up in [`is_durable`](Self::is_durable), but the mutation stays.
pub struct EntityStore<E> {
    path: PathBuf,
    serializer: JsonSerializer,
    mover: Arc<dyn MoveStrategy>,
    state: Mutex<State<E>>,
}

struct State<E> {
    snapshot: Option<Vec<E>>,
    high_water: i64,
    durable: bool,
}

impl<E: Entity> State<E> {
    /// Installs `records` as the snapshot, repairing identifiers that are
    /// missing, negative, or repeated. Returns whether anything was repaired.
    fn install(&mut self, mut records: Vec<E>) -> bool {
        let mut seen = HashSet::new();
        let mut orphans = Vec::new();
        for (pos, record) in records.iter().enumerate() {
            match record.id() {
                Some(id) if id >= 0 && seen.insert(id) => {}
                Some(id) if id < 0 => {
                    warn!(kind = E::KIND, id, "negative id on load; reassigning");
                    orphans.push(pos);
                }
                Some(id) => {
                    warn!(kind = E::KIND, id, "repeated id on load; reassigning");
                    orphans.push(pos);
                }
                None => {
                    warn!(kind = E::KIND, pos, "record without id on load; assigning one");
                    orphans.push(pos);
                }
            }
        }
        let max = seen.iter().copied().max().unwrap_or(0);
        self.high_water = self.high_water.max(max);

        let repaired = !orphans.is_empty();
        let mut exhausted = Vec::new();
        for pos in orphans {
            match self.next_id() {
                Some(id) => records[pos].set_id(id),
                None => exhausted.push(pos),
            }
        }
        if !exhausted.is_empty() {
            error!(kind = E::KIND, dropped = exhausted.len(), "no identifiers left; dropping records without a usable id");
            let mut pos = 0;
            records.retain(|_| {
                let keep = !exhausted.contains(&pos);
                pos += 1;
                keep
            });
        }
        self.snapshot = Some(records);
        repaired
    }

    fn records(&mut self) -> &mut Vec<E> {
        self.snapshot.get_or_insert_with(Vec::new)
    }

    fn next_id(&mut self) -> Option<i64> {
        let id = self.high_water.checked_add(1)?;
        self.high_water = id;
        Some(id)
    }
}

impl<E: Entity> EntityStore<E> {
    /// Open (or create) a store at `path` with compact JSON and the default
    /// rename-based move strategy.
    pub fn open(path: impl AsRef<Path>) -> Self {
        Self::builder(path).build()
    }

    /// Start configuring a new store. Call
    /// [`.build()`](EntityStoreBuilder::build) when ready.
    pub fn builder(path: impl AsRef<Path>) -> EntityStoreBuilder<E> {
        EntityStoreBuilder::new(path)
    }

    // ---- reads ----

    /// Copy of every live entity, in insertion order.
    #[must_use]
    pub fn list(&self) -> Vec<E> {
        self.lock().records().clone()
    }

    /// The entity with identifier `id`. Negative ids are never found.
    #[must_use]
    pub fn find(&self, id: i64) -> Option<E> {
        if id < 0 {
            return None;
        }
        self.lock().records().iter().find(|e| e.id() == Some(id)).cloned()
    }

    /// First entity matching `pred`.
    #[must_use]
    pub fn find_where<P>(&self, pred: P) -> Option<E>
    where
        P: Fn(&E) -> bool,
    {
        self.lock().records().iter().find(|e| pred(e)).cloned()
    }

    /// Every entity matching `pred`, in insertion order.
    #[must_use]
    pub fn filter<P>(&self, pred: P) -> Vec<E>
    where
        P: Fn(&E) -> bool,
    {
        self.lock().records().iter().filter(|e| pred(e)).cloned().collect()
    }

    /// Number of live entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().records().len()
    }

    /// `true` when the store has no entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Path to the backing JSON file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the backing file matched the snapshot after the last load or
    /// write. `false` means the store is running ahead of the disk.
    #[must_use]
    pub fn is_durable(&self) -> bool {
        self.state.lock().durable
    }

    // ---- writes ----

    /// Validate `draft`, assign it the next identifier and kind defaults,
    /// append it, and persist. Any id already on `draft` is ignored.
    ///
    /// Fails with [`Rejection::IdsExhausted`] once `i64::MAX` has been handed out.
    pub fn create(&self, mut draft: E) -> Result<E, Rejection> {
        if let Err(rejection) = draft.check_required() {
            return Err(rejected::<E>("create", rejection));
        }
        let mut state = self.lock();
        if let Some(field) = find_collision(state.records(), &draft, None) {
            return Err(rejected::<E>("create", Rejection::Duplicate { field }));
        }
        let Some(id) = state.next_id() else {
            return Err(rejected::<E>("create", Rejection::IdsExhausted));
        };
        draft.set_id(id);
        draft.init_defaults();
        state.records().push(draft.clone());
        if self.persist(&mut state) {
            info!(kind = E::KIND, id, "created");
        }
        Ok(draft)
    }

    /// Merge `patch` into the stored entity with the same identifier.
    ///
    /// Absent or blank fields in `patch` keep their stored values, so an
    /// update that doesn't mention a token never wipes it.
    pub fn update(&self, patch: E) -> Result<(), Rejection> {
        let Some(id) = patch.id() else {
            return Err(rejected::<E>("update", Rejection::MissingId));
        };
        let mut state = self.lock();
        let records = state.records();
        let Some(pos) = records.iter().position(|e| e.id() == Some(id)) else {
            return Err(rejected::<E>("update", Rejection::NotFound { id }));
        };
        if let Err(rejection) = patch.check_patch() {
            return Err(rejected::<E>("update", rejection));
        }
        let mut merged = records[pos].clone();
        merged.apply_patch(patch);
        if let Some(field) = find_collision(records, &merged, Some(id)) {
            return Err(rejected::<E>("update", Rejection::Duplicate { field }));
        }
        records[pos] = merged;
        if self.persist(&mut state) {
            info!(kind = E::KIND, id, "updated");
        }
        Ok(())
    }

    /// Delete the entity with identifier `id`. Returns whether it existed.
    pub fn remove(&self, id: i64) -> bool {
        let mut state = self.lock();
        let records = state.records();
        let Some(pos) = records.iter().position(|e| e.id() == Some(id)) else {
            warn!(kind = E::KIND, id, "remove: no such entity");
            return false;
        };
        records.remove(pos);
        if self.persist(&mut state) {
            info!(kind = E::KIND, id, "removed");
        }
        true
    }

    /// Mutate the entity at `id` in place and persist. Returns the updated
    /// copy, or `None` if it doesn't exist.
    ///
    /// `f` must not touch the identifier or any unique field; those go
    /// through [`update`](Self::update).
    pub(crate) fn modify<F>(&self, id: i64, f: F) -> Option<E>
    where
        F: FnOnce(&mut E),
    {
        let mut state = self.lock();
        let Some(record) = state.records().iter_mut().find(|e| e.id() == Some(id)) else {
            warn!(kind = E::KIND, id, "modify: no such entity");
            return None;
        };
        f(record);
        let updated = record.clone();
        if self.persist(&mut state) {
            info!(kind = E::KIND, id, "modified");
        }
        Some(updated)
    }

    // ---- snapshot lifecycle ----

    /// Drop the in-memory snapshot. The next operation reloads it from disk.
    pub fn invalidate(&self) {
        self.state.lock().snapshot = None;
    }

    /// Replace the in-memory snapshot with what's on disk now.
    pub fn reload(&self) {
        let mut state = self.state.lock();
        self.load_into(&mut state);
    }

    // ---- internal ----

    fn lock(&self) -> MutexGuard<'_, State<E>> {
        let mut state = self.state.lock();
        if state.snapshot.is_none() {
            self.load_into(&mut state);
        }
        state
    }

    fn load_into(&self, state: &mut State<E>) {
        let loaded = load::<E, _>(&self.path, &self.serializer);
        state.durable = loaded.in_sync;
        if state.install(loaded.records) && self.persist(state) {
            info!(kind = E::KIND, path = %self.path.display(), "rewrote backing file with repaired ids");
        }
    }

    fn persist(&self, state: &mut State<E>) -> bool {
        let ok = match &state.snapshot {
            Some(records) => write_durable(&self.path, records, &self.serializer, self.mover.as_ref()),
            None => false,
        };
        state.durable = ok;
        ok
    }
}

impl<E: Tokenized> EntityStore<E> {
    /// Give the entity at `id` a new random token, different from its current
    /// one, and persist. Returns the new token.
    pub fn rotate_token(&self, id: i64) -> Option<String> {
        let mut state = self.lock();
        let Some(record) = state.records().iter_mut().find(|e| e.id() == Some(id)) else {
            warn!(kind = E::KIND, id, "rotate: no such entity");
            return None;
        };
        let token = fresh_token(record.token());
        record.set_token(token.clone());
        if self.persist(&mut state) {
            info!(kind = E::KIND, id, "rotated token");
        }
        Some(token)
    }
}

fn rejected<E: Entity>(op: &'static str, rejection: Rejection) -> Rejection {
    warn!(kind = E::KIND, op, reason = %rejection, "rejected");
    rejection
}

impl<E> std::fmt::Debug for EntityStore<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityStore")
            .field("path", &self.path)
            .field("serializer", &self.serializer)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Configures and opens an [`EntityStore`].
///
/// ```rust,no_run
/// use json_entities::{Client, EntityStore};
///
/// let clients = EntityStore::<Client>::builder("data/clients.json")
///     .pretty(true)
///     .build();
/// ```
pub struct EntityStoreBuilder<E> {
    path: PathBuf,
    pretty: bool,
    mover: Arc<dyn MoveStrategy>,
    _marker: PhantomData<E>,
}

impl<E: Entity> EntityStoreBuilder<E> {
    fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            pretty: false,
            mover: Arc::new(RenameMove),
            _marker: PhantomData,
        }
    }

    /// Write human-readable JSON with indentation (default: compact).
    pub fn pretty(mut self, yes: bool) -> Self {
        self.pretty = yes;
        self
    }

    /// Replace the default [`RenameMove`] strategy.
    pub fn move_strategy<M: MoveStrategy + 'static>(mut self, mover: M) -> Self {
        self.mover = Arc::new(mover);
        self
    }

    /// Load (or create) the backing file and return the store. Never fails:
    /// load problems are logged and leave an empty snapshot.
    pub fn build(self) -> EntityStore<E> {
        let serializer = if self.pretty {
            JsonSerializer::pretty()
        } else {
            JsonSerializer::new()
        };
        let store = EntityStore {
            path: self.path,
            serializer,
            mover: self.mover,
            state: Mutex::new(State {
                snapshot: None,
                high_water: 0,
                durable: true,
            }),
        };
        store.reload();
        info!(kind = E::KIND, path = %store.path.display(), count = store.len(), "store initialized");
        store
    }
}

impl<E> std::fmt::Debug for EntityStoreBuilder<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityStoreBuilder")
            .field("path", &self.path)
            .field("pretty", &self.pretty)
            .finish_non_exhaustive()
    }
}
