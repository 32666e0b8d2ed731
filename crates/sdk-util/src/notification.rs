//! In-process notification center shared through cheap cloneable handles.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use keyed_archive::ArchiveValue;
use tracing::trace;

/// A posted notification.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub name: String,
    pub user_info: Option<ArchiveValue>,
}

/// Identifies a registered observer for later removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverToken(u64);

type Observer = Arc<dyn Fn(&Notification) + Send + Sync>;

struct Entry {
    token: ObserverToken,
    name: Option<String>,
    observer: Observer,
}

#[derive(Default)]
struct Observers {
    next_token: u64,
    entries: Vec<Entry>,
}

/// Dispatches notifications to observers, synchronously on the posting thread.
///
/// Clones share the same observer list. Observers run outside the internal
/// lock, so they may post or (un)register themselves.
#[derive(Clone, Default)]
pub struct NotificationCenter {
    inner: Arc<Mutex<Observers>>,
}

impl NotificationCenter {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Observers> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers `observer` for notifications called `name`, or for every
    /// notification when `name` is `None`.
    pub fn add_observer<F>(&self, name: Option<&str>, observer: F) -> ObserverToken
    where
        F: Fn(&Notification) + Send + Sync + 'static,
    {
        let mut observers = self.lock();
        let token = ObserverToken(observers.next_token);
        observers.next_token += 1;
        observers.entries.push(Entry {
            token,
            name: name.map(str::to_owned),
            observer: Arc::new(observer),
        });
        token
    }

    /// Returns `false` when `token` was not registered.
    pub fn remove_observer(&self, token: ObserverToken) -> bool {
        let mut observers = self.lock();
        let before = observers.entries.len();
        observers.entries.retain(|entry| entry.token != token);
        observers.entries.len() != before
    }

    /// Posts a notification and returns how many observers received it.
    pub fn post(&self, name: &str, user_info: Option<ArchiveValue>) -> usize {
        let targets: Vec<Observer> = self
            .lock()
            .entries
            .iter()
            .filter(|entry| entry.name.as_deref().map_or(true, |n| n == name))
            .map(|entry| Arc::clone(&entry.observer))
            .collect();
        trace!(name, observers = targets.len(), "posting notification");

        let notification = Notification {
            name: name.to_owned(),
            user_info,
        };
        for observer in &targets {
            observer(&notification);
        }
        targets.len()
    }

    pub fn observer_count(&self) -> usize {
        self.lock().entries.len()
    }

    /// Whether both handles point at the same center.
    pub fn same_center(&self, other: &NotificationCenter) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for NotificationCenter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationCenter")
            .field("observers", &self.observer_count())
            .finish()
    }
}
