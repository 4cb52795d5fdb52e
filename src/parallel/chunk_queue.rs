use crate::error::{Result, SplitError};
use bytes::Bytes;
use std::collections::VecDeque;
use std::sync::{Condvar, Mutex, MutexGuard};

/// How queued chunks are assigned to shards.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Dispatch {
    /// One lane shared by every shard. Whichever worker asks first gets the
    /// next chunk, so shard contents differ between runs.
    #[default]
    Shared,
    /// One lane per shard, filled in strict rotation. Chunk `k` always lands
    /// in shard `k % shards`.
    RoundRobin,
}

/// Represents the operational state of the chunk queue
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ChunkQueueState {
    /// Chunks can be added and processed
    Open,
    /// No more chunks can be added; queued chunks still drain
    Closed,
    /// A participant failed. Every blocked caller wakes up and bails out.
    Cancelled,
}

/// Inner state of the chunk queue, protected by a mutex
#[derive(Debug)]
struct ChunkQueueInner {
    /// One lane in shared mode, one lane per shard in round-robin mode
    lanes: Vec<VecDeque<Bytes>>,
    /// Operational state of the queue
    state: ChunkQueueState,
    /// Maximum number of chunks per lane before pushing blocks
    lane_capacity: usize,
    /// Lane the next pushed chunk goes to
    next_lane: usize,
}

/// A bounded, cancellation-aware hand-off queue for line chunks.
///
/// Producers block in [`push_back`](Self::push_back) while the target lane is
/// full, and consumers block in [`read_front`](Self::read_front) while their
/// lane is empty. Both kinds of waiters wake up when the queue is closed or
/// cancelled, so nobody can stall on a queue that nobody serves anymore.
#[derive(Debug)]
pub struct ChunkQueue {
    /// Inner state protected by mutex
    inner: Mutex<ChunkQueueInner>,
    /// Condition variable for signaling queue state changes
    signal: Condvar,
    dispatch: Dispatch,
}

#[inline]
fn queue_closed_err(msg: &str) -> SplitError {
    SplitError::QueueClosed(msg.to_string())
}

impl ChunkQueue {
    /// Acquires the inner lock and maps mutex errors to SplitError
    #[inline]
    fn acquire_lock(&self) -> Result<MutexGuard<'_, ChunkQueueInner>> {
        self.inner
            .lock()
            .map_err(|e| SplitError::Other(e.to_string()))
    }

    /// Wait on condition variable and map errors
    #[inline]
    fn await_signal<'a>(
        &'a self,
        inner: MutexGuard<'a, ChunkQueueInner>,
    ) -> Result<MutexGuard<'a, ChunkQueueInner>> {
        self.signal
            .wait(inner)
            .map_err(|e| SplitError::Other(e.to_string()))
    }

    #[inline]
    fn check_cancelled(inner: &ChunkQueueInner) -> Result<()> {
        if inner.state == ChunkQueueState::Cancelled {
            Err(SplitError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Check if queue accepts pushes and return appropriate error
    #[inline]
    fn check_writable(inner: &ChunkQueueInner, msg: &str) -> Result<()> {
        match inner.state {
            ChunkQueueState::Open => Ok(()),
            ChunkQueueState::Closed => Err(queue_closed_err(msg)),
            ChunkQueueState::Cancelled => Err(SplitError::Cancelled),
        }
    }

    /// Create a shared queue holding at most `capacity` chunks.
    pub fn new(capacity: usize) -> Self {
        Self::with_dispatch(Dispatch::Shared, 1, capacity)
    }

    /// Create a queue for `shards` consumers.
    ///
    /// In shared mode the single lane holds `shards * capacity_factor`
    /// chunks. In round-robin mode each shard's lane holds `capacity_factor`
    /// chunks. Capacities are clamped to at least one.
    pub fn for_shards(dispatch: Dispatch, shards: usize, capacity_factor: usize) -> Self {
        let shards = shards.max(1);
        let capacity_factor = capacity_factor.max(1);
        match dispatch {
            Dispatch::Shared => Self::with_dispatch(dispatch, 1, shards * capacity_factor),
            Dispatch::RoundRobin => Self::with_dispatch(dispatch, shards, capacity_factor),
        }
    }

    fn with_dispatch(dispatch: Dispatch, lanes: usize, lane_capacity: usize) -> Self {
        Self {
            inner: Mutex::new(ChunkQueueInner {
                lanes: (0..lanes).map(|_| VecDeque::new()).collect(),
                state: ChunkQueueState::Open,
                lane_capacity: lane_capacity.max(1),
                next_lane: 0,
            }),
            signal: Condvar::new(),
            dispatch,
        }
    }

    /// The dispatch policy of this queue.
    pub fn dispatch(&self) -> Dispatch {
        self.dispatch
    }

    #[inline]
    fn lane_for(&self, inner: &ChunkQueueInner, shard: usize) -> usize {
        match self.dispatch {
            Dispatch::Shared => 0,
            Dispatch::RoundRobin => shard % inner.lanes.len(),
        }
    }

    /// Add a chunk to the back of the queue, blocking while the target lane is full.
    ///
    /// Fails with [`SplitError::Cancelled`] if the queue is cancelled before or
    /// while waiting, and with [`SplitError::QueueClosed`] if it was closed.
    pub fn push_back(&self, chunk: Bytes) -> Result<()> {
        let mut inner = self.acquire_lock()?;

        Self::check_writable(&inner, "Cannot add to a closed queue")?;

        let lane = inner.next_lane;
        while inner.lanes[lane].len() >= inner.lane_capacity {
            inner = self.await_signal(inner)?;

            // After waking up, check if we should still be pushing
            Self::check_writable(&inner, "Queue was closed while waiting for space")?;
        }

        inner.lanes[lane].push_back(chunk);
        inner.next_lane = (lane + 1) % inner.lanes.len();
        self.signal.notify_all();

        Ok(())
    }

    /// Try to add a chunk without blocking
    ///
    /// Returns Ok(true) if the chunk was added, Ok(false) if the target lane is full.
    pub fn try_push_back(&self, chunk: Bytes) -> Result<bool> {
        let mut inner = self.acquire_lock()?;

        Self::check_writable(&inner, "Cannot add to a closed queue")?;

        let lane = inner.next_lane;
        if inner.lanes[lane].len() >= inner.lane_capacity {
            return Ok(false);
        }

        inner.lanes[lane].push_back(chunk);
        inner.next_lane = (lane + 1) % inner.lanes.len();
        self.signal.notify_all();

        Ok(true)
    }

    /// Read the next chunk for `shard`
    ///
    /// Blocks until a chunk is available, the queue is closed and drained
    /// ([`SplitError::QueueClosed`]) or the queue is cancelled
    /// ([`SplitError::Cancelled`]). Cancellation wins over queued chunks.
    pub fn read_front(&self, shard: usize) -> Result<Bytes> {
        let mut inner = self.acquire_lock()?;
        let lane = self.lane_for(&inner, shard);

        loop {
            Self::check_cancelled(&inner)?;

            match inner.lanes[lane].pop_front() {
                Some(chunk) => {
                    // Wake a producer waiting for space
                    self.signal.notify_all();
                    return Ok(chunk);
                }
                None => {
                    if inner.state == ChunkQueueState::Closed {
                        return Err(queue_closed_err("Queue is closed and empty"));
                    }

                    inner = self.await_signal(inner)?;
                }
            }
        }
    }

    /// Try to read the next chunk for `shard` without blocking
    ///
    /// Returns Ok(None) if the lane is empty but the queue is still open.
    pub fn try_read_front(&self, shard: usize) -> Result<Option<Bytes>> {
        let mut inner = self.acquire_lock()?;
        let lane = self.lane_for(&inner, shard);

        Self::check_cancelled(&inner)?;

        match inner.lanes[lane].pop_front() {
            Some(chunk) => {
                self.signal.notify_all();
                Ok(Some(chunk))
            }
            None if inner.state == ChunkQueueState::Closed => {
                Err(queue_closed_err("Queue is closed and empty"))
            }
            None => Ok(None),
        }
    }

    /// Close the queue
    ///
    /// This prevents new chunks from being added, but allows queued chunks
    /// to be drained. Closing a cancelled queue keeps it cancelled.
    pub fn close(&self) -> Result<()> {
        let mut inner = self.acquire_lock()?;
        if inner.state == ChunkQueueState::Open {
            inner.state = ChunkQueueState::Closed;
        }

        // Notify all waiters so they can check the closed state
        self.signal.notify_all();

        Ok(())
    }

    /// Cancel the queue
    ///
    /// Every blocked producer and consumer wakes up with
    /// [`SplitError::Cancelled`]. Queued chunks are dropped.
    pub fn cancel(&self) -> Result<()> {
        let mut inner = self.acquire_lock()?;
        inner.state = ChunkQueueState::Cancelled;
        for lane in inner.lanes.iter_mut() {
            lane.clear();
        }

        self.signal.notify_all();

        Ok(())
    }

    /// Check if the queue was cancelled
    pub fn is_cancelled(&self) -> Result<bool> {
        let inner = self.acquire_lock()?;
        Ok(inner.state == ChunkQueueState::Cancelled)
    }

    /// Current state of the queue
    pub fn state(&self) -> Result<ChunkQueueState> {
        let inner = self.acquire_lock()?;
        Ok(inner.state)
    }

    /// Check if no chunks are queued
    pub fn is_empty(&self) -> Result<bool> {
        let inner = self.acquire_lock()?;
        Ok(inner.lanes.iter().all(VecDeque::is_empty))
    }

    /// Check if the queue is done (empty and no longer open)
    pub fn is_done(&self) -> Result<bool> {
        let inner = self.acquire_lock()?;
        Ok(inner.state != ChunkQueueState::Open && inner.lanes.iter().all(VecDeque::is_empty))
    }

    /// Get the number of queued chunks across all lanes
    pub fn len(&self) -> Result<usize> {
        let inner = self.acquire_lock()?;
        Ok(inner.lanes.iter().map(VecDeque::len).sum())
    }

    /// Get the total number of chunks the queue holds before pushing blocks
    pub fn capacity(&self) -> Result<usize> {
        let inner = self.acquire_lock()?;
        Ok(inner.lane_capacity * inner.lanes.len())
    }
}
