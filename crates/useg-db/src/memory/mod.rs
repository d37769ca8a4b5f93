//! In-memory store for tests and local runs.
//!
//! Implements both repository traits over shared state guarded by a
//! `parking_lot::RwLock`. Transactions buffer their writes and apply them
//! atomically on commit; dropping an uncommitted transaction discards them.
//! Foreign keys and the membership primary key are enforced the same way the
//! PostgreSQL schema enforces them.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use useg_core::entities::MembershipPeriod;
use useg_core::error::DomainError;
use useg_core::traits::{
    IdentityRepository, MembershipRepository, MembershipTransaction, RepoResult,
};
use useg_core::value_objects::{SegmentKey, SegmentName, UserId};

#[derive(Debug, Clone, Copy)]
struct MembershipRow {
    user_id: UserId,
    segment: SegmentKey,
    period: MembershipPeriod,
}

impl MembershipRow {
    /// Primary key of the `user2seg` table
    fn start_key(&self) -> (UserId, SegmentKey, DateTime<Utc>) {
        (self.user_id, self.segment, self.period.started_at)
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    users: BTreeSet<UserId>,
    segments: HashMap<SegmentName, SegmentKey>,
    next_segment_id: i64,
    memberships: Vec<MembershipRow>,
    /// Membership inserts allowed before every further one fails
    write_budget: Option<usize>,
}

impl MemoryState {
    fn has_segment(&self, key: SegmentKey) -> bool {
        self.segments.values().any(|k| *k == key)
    }

    fn segment_names(&self) -> HashMap<SegmentKey, SegmentName> {
        self.segments
            .iter()
            .map(|(name, key)| (*key, name.clone()))
            .collect()
    }
}

/// Shared in-memory implementation of the repository traits
///
/// Clones share the same underlying state.
///
/// # Example
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use useg_db::InMemoryStore;
///
/// let store = InMemoryStore::new();
/// let identity: Arc<dyn IdentityRepository> = Arc::new(store.clone());
/// let memberships: Arc<dyn MembershipRepository> = Arc::new(store);
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<MemoryState>>,
}

impl InMemoryStore {
    /// Creates a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Let `n` more membership inserts succeed, then fail every later one
    /// with a database error.
    pub fn fail_writes_after(&self, n: usize) {
        self.state.write().write_budget = Some(n);
    }

    /// Number of committed membership rows, expired ones included
    pub fn membership_count(&self) -> usize {
        self.state.read().memberships.len()
    }

    /// Users currently in the named segment, in ascending order
    pub fn members_of(&self, name: &SegmentName) -> Vec<UserId> {
        let state = self.state.read();
        let Some(key) = state.segments.get(name).copied() else {
            return Vec::new();
        };
        let now = Utc::now();

        let members: BTreeSet<UserId> = state
            .memberships
            .iter()
            .filter(|row| row.segment == key && row.period.is_active_at(now))
            .map(|row| row.user_id)
            .collect();
        members.into_iter().collect()
    }
}

#[async_trait]
impl IdentityRepository for InMemoryStore {
    async fn segment_key(&self, name: &SegmentName) -> RepoResult<Option<SegmentKey>> {
        Ok(self.state.read().segments.get(name).copied())
    }

    async fn create_segment(&self, name: &SegmentName) -> RepoResult<()> {
        let mut state = self.state.write();
        if state.segments.contains_key(name) {
            return Err(DomainError::SegmentAlreadyExists(name.clone()));
        }
        state.next_segment_id += 1;
        let key = SegmentKey::new(state.next_segment_id);
        state.segments.insert(name.clone(), key);
        Ok(())
    }

    async fn delete_segment(&self, name: &SegmentName) -> RepoResult<()> {
        let mut state = self.state.write();
        if let Some(key) = state.segments.remove(name) {
            state.memberships.retain(|row| row.segment != key);
        }
        Ok(())
    }

    async fn user_exists(&self, id: UserId) -> RepoResult<bool> {
        Ok(self.state.read().users.contains(&id))
    }

    async fn create_user(&self, id: UserId) -> RepoResult<()> {
        if self.state.write().users.insert(id) {
            Ok(())
        } else {
            Err(DomainError::UserAlreadyExists(id))
        }
    }

    async fn all_user_ids(&self) -> RepoResult<Vec<UserId>> {
        Ok(self.state.read().users.iter().copied().collect())
    }

    async fn ping(&self) -> RepoResult<()> {
        Ok(())
    }
}

#[async_trait]
impl MembershipRepository for InMemoryStore {
    async fn begin(&self) -> RepoResult<Box<dyn MembershipTransaction>> {
        Ok(Box::new(InMemoryTransaction {
            state: Arc::clone(&self.state),
            pending: Vec::new(),
            staged: None,
        }))
    }

    async fn user_segments(&self, user_id: UserId, at: DateTime<Utc>) -> RepoResult<Vec<SegmentName>> {
        let state = self.state.read();
        let names = state.segment_names();

        let current: BTreeSet<SegmentName> = state
            .memberships
            .iter()
            .filter(|row| row.user_id == user_id && row.period.is_active_at(at))
            .filter_map(|row| names.get(&row.segment).cloned())
            .collect();
        Ok(current.into_iter().collect())
    }
}

#[derive(Debug, Clone, Copy)]
enum PendingWrite {
    Insert(MembershipRow),
    Delete { user_id: UserId, segment: SegmentKey },
}

/// Membership rows as one transaction sees them, indexed by primary key
struct StagedRows {
    rows: Vec<MembershipRow>,
    starts: HashSet<(UserId, SegmentKey, DateTime<Utc>)>,
}

impl StagedRows {
    fn new(rows: &[MembershipRow]) -> Self {
        Self {
            starts: rows.iter().map(MembershipRow::start_key).collect(),
            rows: rows.to_vec(),
        }
    }

    /// Apply one write, returning how many rows it touched
    fn apply(&mut self, state: &MemoryState, write: PendingWrite) -> RepoResult<u64> {
        match write {
            PendingWrite::Insert(row) => {
                if !state.users.contains(&row.user_id) || !state.has_segment(row.segment) {
                    return Err(DomainError::DatabaseError(format!(
                        "foreign key violation inserting membership for user {}",
                        row.user_id
                    )));
                }
                if !self.starts.insert(row.start_key()) {
                    return Err(DomainError::MembershipConflict(row.user_id));
                }
                self.rows.push(row);
                Ok(1)
            }
            PendingWrite::Delete { user_id, segment } => {
                let before = self.rows.len();
                let starts = &mut self.starts;
                self.rows.retain(|r| {
                    let hit = r.user_id == user_id && r.segment == segment;
                    if hit {
                        starts.remove(&r.start_key());
                    }
                    !hit
                });
                Ok((before - self.rows.len()) as u64)
            }
        }
    }
}

/// Buffered writes against an [`InMemoryStore`]
pub struct InMemoryTransaction {
    state: Arc<RwLock<MemoryState>>,
    pending: Vec<PendingWrite>,
    /// Committed rows as of the first write, plus every staged write
    staged: Option<StagedRows>,
}

impl InMemoryTransaction {
    /// Stage a write after checking it against the transaction's view
    fn stage(&mut self, write: PendingWrite) -> RepoResult<u64> {
        let state = self.state.read();
        let staged = self
            .staged
            .get_or_insert_with(|| StagedRows::new(&state.memberships));
        let touched = staged.apply(&state, write)?;
        drop(state);

        self.pending.push(write);
        Ok(touched)
    }
}

#[async_trait]
impl MembershipTransaction for InMemoryTransaction {
    async fn segment_key(&mut self, name: &SegmentName) -> RepoResult<Option<SegmentKey>> {
        Ok(self.state.read().segments.get(name).copied())
    }

    async fn add_membership(
        &mut self,
        user_id: UserId,
        segment: SegmentKey,
        period: MembershipPeriod,
    ) -> RepoResult<()> {
        {
            let mut state = self.state.write();
            if let Some(budget) = state.write_budget.as_mut() {
                if *budget == 0 {
                    return Err(DomainError::DatabaseError("injected failure".to_string()));
                }
                *budget -= 1;
            }
        }

        self.stage(PendingWrite::Insert(MembershipRow {
            user_id,
            segment,
            period,
        }))?;
        Ok(())
    }

    async fn remove_membership(&mut self, user_id: UserId, segment: SegmentKey) -> RepoResult<u64> {
        self.stage(PendingWrite::Delete { user_id, segment })
    }

    async fn commit(self: Box<Self>) -> RepoResult<()> {
        // Replay against the rows committed since the view was taken
        let mut state = self.state.write();
        let mut rows = StagedRows::new(&state.memberships);
        for write in &self.pending {
            rows.apply(&state, *write)?;
        }
        state.memberships = rows.rows;
        Ok(())
    }
}
