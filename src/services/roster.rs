use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::models::user::Role;
use crate::services::auth::SessionManager;
use crate::services::gateway::ApiGateway;

/// Lifecycle of a controller's canonical collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListState {
    Idle,
    Loading,
    Loaded,
    Failed,
}

/// What a record type must provide to be managed by a `ListController`.
pub trait RosterRecord: Clone + DeserializeOwned {
    type Input: Serialize;

    /// Collection segment under the API base URL.
    const COLLECTION: &'static str;
    /// Whether plain reads carry the bearer header. Mutations always do.
    const AUTHENTICATED_READS: bool;
    /// Field named in duplicate errors.
    const DUPLICATE_FIELD: &'static str;

    fn id(&self) -> Option<i64>;
    fn validate(input: &Self::Input) -> Result<()>;
    /// Pre-submission duplicate check against one canonical record.
    /// Returning `false` unconditionally delegates uniqueness entirely
    /// to the service.
    fn conflicts_with(&self, input: &Self::Input) -> bool;
    /// Match against the lowercased filter needle. Which fields take
    /// part is declared per resource type.
    fn matches_filter(&self, needle: &str) -> bool;
}

/// Owns the canonical in-memory collection for one resource type and
/// mediates every operation against the remote store. The collection is
/// never mutated optimistically: each successful write is followed by a
/// full refetch within the same call, so the canonical list always
/// reflects the last successful fetch and two operations never
/// interleave their refetches.
pub struct ListController<R: RosterRecord> {
    gateway: ApiGateway,
    session: Arc<SessionManager>,
    state: ListState,
    canonical: Vec<R>,
    filter: String,
    page: usize,
    page_size: usize,
}

impl<R: RosterRecord> ListController<R> {
    pub fn new(
        http: reqwest::Client,
        base_url: &str,
        session: Arc<SessionManager>,
        page_size: usize,
    ) -> Self {
        let gateway = ApiGateway::new(
            http,
            base_url,
            R::COLLECTION,
            session.clone(),
            R::AUTHENTICATED_READS,
        );
        Self {
            gateway,
            session,
            state: ListState::Idle,
            canonical: Vec::new(),
            filter: String::new(),
            page: 0,
            page_size,
        }
    }

    pub fn state(&self) -> ListState {
        self.state
    }

    pub fn records(&self) -> &[R] {
        &self.canonical
    }

    /// Replace the canonical collection wholesale. On failure the
    /// previous collection is kept; `Error::Unauthorized` here means
    /// the session is no longer honoured and the caller should route
    /// back to login.
    pub async fn fetch_all(&mut self) -> Result<()> {
        self.state = ListState::Loading;
        match self.gateway.fetch_all().await {
            Ok(records) => {
                debug!(
                    collection = R::COLLECTION,
                    count = records.len(),
                    "collection refreshed"
                );
                self.canonical = records;
                self.state = ListState::Loaded;
                Ok(())
            }
            Err(e) => {
                warn!(collection = R::COLLECTION, error = %e, "fetch failed");
                self.state = ListState::Failed;
                Err(e)
            }
        }
    }

    /// Role gate, then field validation, then the duplicate pre-check
    /// against the canonical list, then the remote write and refetch.
    pub async fn create(&mut self, input: R::Input) -> Result<()> {
        self.require_privileged()?;
        R::validate(&input)?;
        if self.has_local_duplicate(&input, None) {
            return Err(Error::Duplicate(format!(
                "this {} is already in use",
                R::DUPLICATE_FIELD
            )));
        }
        self.gateway.create(&input).await?;
        self.fetch_all().await
    }

    /// Same pipeline as `create`; the duplicate pre-check skips the
    /// record being edited.
    pub async fn update(&mut self, id: i64, input: R::Input) -> Result<()> {
        self.require_privileged()?;
        R::validate(&input)?;
        if self.has_local_duplicate(&input, Some(id)) {
            return Err(Error::Duplicate(format!(
                "this {} is already in use",
                R::DUPLICATE_FIELD
            )));
        }
        self.gateway.update(id, &input).await?;
        self.fetch_all().await
    }

    /// Callers are expected to confirm with the user before invoking.
    /// On failure the canonical list is untouched.
    pub async fn delete(&mut self, id: i64) -> Result<()> {
        self.require_privileged()?;
        self.gateway.delete(id).await?;
        self.fetch_all().await
    }

    /// Case-insensitive needle applied to the resource's declared
    /// filter fields. Purely local; resets the page window.
    pub fn apply_filter(&mut self, query: &str) {
        self.filter = query.trim().to_lowercase();
        self.page = 0;
    }

    pub fn active_filter(&self) -> &str {
        &self.filter
    }

    pub fn visible(&self) -> Vec<&R> {
        if self.filter.is_empty() {
            self.canonical.iter().collect()
        } else {
            self.canonical
                .iter()
                .filter(|r| r.matches_filter(&self.filter))
                .collect()
        }
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page;
    }

    /// The current page of the filtered view.
    pub fn page_window(&self) -> Vec<&R> {
        self.visible()
            .into_iter()
            .skip(self.page * self.page_size)
            .take(self.page_size)
            .collect()
    }

    fn require_privileged(&self) -> Result<()> {
        if self.session.current_role() == Role::Admin.to_string() {
            Ok(())
        } else {
            Err(Error::Permission(Role::Admin.to_string()))
        }
    }

    fn has_local_duplicate(&self, input: &R::Input, editing: Option<i64>) -> bool {
        self.canonical.iter().any(|record| {
            if editing.is_some() && record.id() == editing {
                return false;
            }
            record.conflicts_with(input)
        })
    }
}
