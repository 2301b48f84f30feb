//! The platform notification center, seen through a trait.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::error::NotificationError;

use super::request::PendingNotification;

/// Where pending notification requests live.
///
/// Adding a request whose identifier is already pending replaces it. Stores
/// that never see deliveries happen keep fired requests around until
/// [`remove_delivered`](NotificationCenter::remove_delivered) drops them.
pub trait NotificationCenter {
    /// All requests still held by the center.
    fn pending_requests(&self) -> Result<Vec<PendingNotification>, NotificationError>;

    /// Schedule (or replace) a request.
    fn add(&mut self, request: PendingNotification) -> Result<(), NotificationError>;

    /// Remove pending requests by identifier. Unknown identifiers are ignored.
    fn remove(&mut self, identifiers: &[String]) -> Result<(), NotificationError>;

    /// Drop one-shot requests whose trigger is at or before `now`. Returns
    /// how many were removed.
    fn remove_delivered(&mut self, now: DateTime<Utc>) -> Result<usize, NotificationError> {
        let delivered: Vec<String> = self
            .pending_requests()?
            .into_iter()
            .filter(|r| r.is_delivered_by(now))
            .map(|r| r.identifier)
            .collect();
        if !delivered.is_empty() {
            self.remove(&delivered)?;
        }
        Ok(delivered.len())
    }

    /// Remove everything.
    fn remove_all(&mut self) -> Result<(), NotificationError> {
        let identifiers: Vec<String> = self
            .pending_requests()?
            .into_iter()
            .map(|r| r.identifier)
            .collect();
        self.remove(&identifiers)
    }
}

/// Process-local center, ordered by identifier.
#[derive(Debug, Clone, Default)]
pub struct InMemoryNotificationCenter {
    requests: BTreeMap<String, PendingNotification>,
}

impl InMemoryNotificationCenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}

impl NotificationCenter for InMemoryNotificationCenter {
    fn pending_requests(&self) -> Result<Vec<PendingNotification>, NotificationError> {
        Ok(self.requests.values().cloned().collect())
    }

    fn add(&mut self, request: PendingNotification) -> Result<(), NotificationError> {
        self.requests.insert(request.identifier.clone(), request);
        Ok(())
    }

    fn remove(&mut self, identifiers: &[String]) -> Result<(), NotificationError> {
        for id in identifiers {
            self.requests.remove(id);
        }
        Ok(())
    }
}
