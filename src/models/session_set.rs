use crate::models::pagination::{PaginatedResponse, PaginationParams};
use crate::models::session::Session;
use std::sync::Arc;

/// Snapshot of a session query. Iterating is lazy and can be repeated; later store
/// writes are not reflected.
#[derive(Debug, Clone)]
pub struct SessionSet {
    sessions: Arc<[Session]>,
}

impl SessionSet {
    pub fn new(sessions: Vec<Session>) -> Self {
        Self { sessions: sessions.into() }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Session> {
        self.sessions.iter()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// One page of the snapshot. Without pagination params the whole set is returned.
    pub fn page(&self, params: &PaginationParams) -> PaginatedResponse<Session> {
        let total = self.sessions.len();
        match (params.offset(), params.effective_limit()) {
            (Some(offset), Some(limit)) => {
                let data = self.iter().skip(offset).take(limit).cloned().collect();
                PaginatedResponse::new(data, params.page.unwrap_or(1).max(1), limit, total)
            }
            _ => PaginatedResponse::new(self.sessions.to_vec(), 1, total, total),
        }
    }
}

impl<'a> IntoIterator for &'a SessionSet {
    type Item = &'a Session;
    type IntoIter = std::slice::Iter<'a, Session>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
