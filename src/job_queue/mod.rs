//! Job queue
//!
//! FIFO queue of pending reaction jobs. Jobs are appended on enqueue,
//! popped from the front on drain, and executed at most once. There is no
//! priority and no cancellation: once enqueued, a job always runs.

use crate::promise::Reaction;
use crate::value::Value;
use serde::Serialize;
use std::collections::VecDeque;
use tracing::trace;

/// A queued, ready-to-run unit of work binding one reaction to the
/// settlement value it reacts to.
#[derive(Debug, Clone)]
pub struct Job {
    /// The reaction to run
    pub reaction: Reaction,
    /// The settlement value captured at enqueue time
    pub value: Value,
}

/// Runtime statistics for the job queue
#[derive(Debug, Clone, Default, Serialize)]
pub struct QueueStats {
    /// Total jobs enqueued
    pub jobs_enqueued: u64,
    /// Total jobs dequeued for execution
    pub jobs_processed: u64,
    /// High-water mark of the queue length
    pub max_queue_len: u64,
}

/// FIFO queue of pending reaction jobs
#[derive(Default)]
pub struct JobQueue {
    jobs: VecDeque<Job>,
    stats: QueueStats,
}

impl JobQueue {
    /// Create a new empty queue
    pub fn new() -> Self {
        Self {
            jobs: VecDeque::new(),
            stats: QueueStats::default(),
        }
    }

    /// Append a job to the back of the queue
    pub fn enqueue(&mut self, job: Job) {
        trace!(kind = ?job.reaction.kind, queued = self.jobs.len(), "job enqueued");
        self.jobs.push_back(job);
        self.stats.jobs_enqueued += 1;
        let len = self.jobs.len() as u64;
        if len > self.stats.max_queue_len {
            self.stats.max_queue_len = len;
        }
    }

    /// Pop the next job from the front of the queue
    pub fn dequeue(&mut self) -> Option<Job> {
        let job = self.jobs.pop_front();
        if job.is_some() {
            self.stats.jobs_processed += 1;
        }
        job
    }

    /// Number of queued jobs
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    /// Check if the queue is empty
    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Drop all queued jobs (teardown)
    pub fn clear(&mut self) {
        self.jobs.clear();
    }

    /// Get a snapshot of the queue statistics
    pub fn stats(&self) -> QueueStats {
        self.stats.clone()
    }

    /// Reset all queue statistics to zero
    pub fn reset_stats(&mut self) {
        self.stats = QueueStats::default();
    }
}
