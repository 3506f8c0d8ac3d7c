//! Next-tick batching and reload versioning

/// Work collected during one tick and run together on flush.
///
/// Tasks deferred while a batch is being run land in a fresh queue and wait
/// for the next flush.
#[derive(Debug)]
pub struct DeferredQueue<T> {
    pending: Option<Vec<T>>,
}

impl<T> Default for DeferredQueue<T> {
    fn default() -> Self {
        Self { pending: None }
    }
}

impl<T: PartialEq> DeferredQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `task` for the next flush. A task already queued is not added
    /// twice.
    pub fn defer(&mut self, task: T) {
        let batch = self.pending.get_or_insert_with(Vec::new);
        if !batch.contains(&task) {
            batch.push(task);
        }
    }

    pub fn is_scheduled(&self) -> bool {
        self.pending.is_some()
    }

    /// Hand over the current batch and start a new, empty tick
    pub fn take_batch(&mut self) -> Vec<T> {
        self.pending.take().unwrap_or_default()
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }
}

/// Version stamp of one reload request
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReloadToken(u64);

impl ReloadToken {
    pub fn new(version: u64) -> Self {
        Self(version)
    }

    pub fn version(&self) -> u64 {
        self.0
    }
}

/// Issues reload tokens and tells whether a response is still wanted
#[derive(Debug, Default)]
pub struct ReloadTracker {
    latest: u64,
}

impl ReloadTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&mut self) -> ReloadToken {
        self.latest += 1;
        ReloadToken(self.latest)
    }

    pub fn latest(&self) -> ReloadToken {
        ReloadToken(self.latest)
    }

    pub fn is_current(&self, token: ReloadToken) -> bool {
        token.0 == self.latest
    }
}
