use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use fingerprint::{CandidateProfile, Clock, ConsentLevel, SystemClock};
use matcher::MatchResult;
use tracing::debug;
use uuid::Uuid;

use crate::error::RepositoryError;
use crate::record::MatchRecord;

/// Default bound on the number of candidates fetched per scan.
pub const DEFAULT_POOL_LIMIT: usize = 1000;

/// Source of candidate profiles and store of persisted match records.
#[async_trait]
pub trait PoolRepository: Send + Sync {
    /// Candidates eligible for matching: not `excluding`, consent other than
    /// none, fingerprint present. Most recently updated first, at most `limit`.
    async fn fetch_eligible_profiles(
        &self,
        excluding: Uuid,
        limit: usize,
    ) -> Result<Vec<CandidateProfile>, RepositoryError>;

    /// Unexpired records for `user`, similarity descending.
    async fn cached_match_records(&self, user: Uuid) -> Result<Vec<MatchRecord>, RepositoryError>;

    /// Replace every earlier record of `user` with `matches`, tagged with the
    /// content hash of the fingerprint they were computed from.
    async fn save_match_records(
        &self,
        matches: &[MatchResult],
        user: Uuid,
        content_hash: u64,
    ) -> Result<(), RepositoryError>;

    /// Remove expired records of one user, or of everyone when `user` is
    /// `None`. Returns how many records were removed.
    async fn delete_expired_match_records(
        &self,
        user: Option<Uuid>,
    ) -> Result<usize, RepositoryError>;

    /// Remove every record of `user`.
    async fn invalidate_match_records(&self, user: Uuid) -> Result<(), RepositoryError>;
}

/// Lock-guarded in-process pool repository.
pub struct InMemoryPoolRepository {
    profiles: RwLock<HashMap<Uuid, CandidateProfile>>,
    records: RwLock<HashMap<Uuid, Vec<MatchRecord>>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryPoolRepository {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            profiles: RwLock::new(HashMap::new()),
            records: RwLock::new(HashMap::new()),
            clock,
        }
    }

    /// Insert or replace a candidate profile.
    pub fn upsert_profile(&self, profile: CandidateProfile) -> Result<(), RepositoryError> {
        self.profiles
            .write()
            .map_err(|_| RepositoryError::Poisoned("profiles"))?
            .insert(profile.id, profile);
        Ok(())
    }

    pub fn remove_profile(&self, id: Uuid) -> Result<Option<CandidateProfile>, RepositoryError> {
        Ok(self
            .profiles
            .write()
            .map_err(|_| RepositoryError::Poisoned("profiles"))?
            .remove(&id))
    }

    pub fn profile_count(&self) -> Result<usize, RepositoryError> {
        Ok(self
            .profiles
            .read()
            .map_err(|_| RepositoryError::Poisoned("profiles"))?
            .len())
    }

    /// Stored records of `user`, expired ones included.
    pub fn record_count(&self, user: Uuid) -> Result<usize, RepositoryError> {
        Ok(self
            .records
            .read()
            .map_err(|_| RepositoryError::Poisoned("records"))?
            .get(&user)
            .map_or(0, Vec::len))
    }
}

impl Default for InMemoryPoolRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PoolRepository for InMemoryPoolRepository {
    async fn fetch_eligible_profiles(
        &self,
        excluding: Uuid,
        limit: usize,
    ) -> Result<Vec<CandidateProfile>, RepositoryError> {
        let guard = self
            .profiles
            .read()
            .map_err(|_| RepositoryError::Poisoned("profiles"))?;

        let mut eligible: Vec<CandidateProfile> = guard
            .values()
            .filter(|p| {
                p.id != excluding && p.consent != ConsentLevel::None && p.fingerprint.is_some()
            })
            .cloned()
            .collect();
        drop(guard);

        eligible.sort_by(|a, b| {
            b.updated_at
                .cmp(&a.updated_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        eligible.truncate(limit);

        debug!(excluding = %excluding, eligible = eligible.len(), "pool_fetch");
        Ok(eligible)
    }

    async fn cached_match_records(&self, user: Uuid) -> Result<Vec<MatchRecord>, RepositoryError> {
        let now = self.clock.now();
        let guard = self
            .records
            .read()
            .map_err(|_| RepositoryError::Poisoned("records"))?;

        let mut records: Vec<MatchRecord> = guard
            .get(&user)
            .map(|rs| rs.iter().filter(|r| !r.is_expired(now)).cloned().collect())
            .unwrap_or_default();
        records.sort_by(|a, b| {
            b.similarity
                .total_cmp(&a.similarity)
                .then_with(|| a.candidate_id.cmp(&b.candidate_id))
        });
        Ok(records)
    }

    async fn save_match_records(
        &self,
        matches: &[MatchResult],
        user: Uuid,
        content_hash: u64,
    ) -> Result<(), RepositoryError> {
        let now = self.clock.now();
        let records: Vec<MatchRecord> = matches
            .iter()
            .map(|m| MatchRecord::from_match(m, user, content_hash, now))
            .collect();

        let mut guard = self
            .records
            .write()
            .map_err(|_| RepositoryError::Poisoned("records"))?;
        let replaced = guard.insert(user, records).map_or(0, |old| old.len());
        debug!(user = %user, saved = matches.len(), replaced, "match_records_saved");
        Ok(())
    }

    async fn delete_expired_match_records(
        &self,
        user: Option<Uuid>,
    ) -> Result<usize, RepositoryError> {
        let now = self.clock.now();
        let mut guard = self
            .records
            .write()
            .map_err(|_| RepositoryError::Poisoned("records"))?;

        let mut removed = 0;
        let mut prune = |records: &mut Vec<MatchRecord>| {
            let before = records.len();
            records.retain(|r| !r.is_expired(now));
            removed += before - records.len();
        };
        match user {
            Some(id) => {
                if let Some(records) = guard.get_mut(&id) {
                    prune(records);
                }
            }
            None => guard.values_mut().for_each(&mut prune),
        }
        guard.retain(|_, records| !records.is_empty());

        debug!(user = ?user, removed, "expired_match_records_deleted");
        Ok(removed)
    }

    async fn invalidate_match_records(&self, user: Uuid) -> Result<(), RepositoryError> {
        self.records
            .write()
            .map_err(|_| RepositoryError::Poisoned("records"))?
            .remove(&user);
        Ok(())
    }
}
