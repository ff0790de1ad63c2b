/// Delayed and repeating task scheduling.
///
/// Provides a [`Scheduler`] trait with two implementations:
/// [`TokioScheduler`] runs tasks on tokio timers, and [`ManualScheduler`]
/// runs them against a virtual clock that tests move forward explicitly.

use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Source of the current time for timestamps
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Factory for the future a repeating task runs on every tick
pub type RepeatingTask = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

/// Cancel handle returned for every scheduled task.
///
/// A task cancelled before its due time never runs; a cancelled repeating
/// task stops after the run in progress, if any.
#[derive(Debug)]
pub struct TaskHandle {
    cancelled: Arc<AtomicBool>,
    finished: Arc<AtomicBool>,
    abort: Option<tokio::task::AbortHandle>,
}

impl TaskHandle {
    fn new(
        cancelled: Arc<AtomicBool>,
        finished: Arc<AtomicBool>,
        abort: Option<tokio::task::AbortHandle>,
    ) -> Self {
        TaskHandle {
            cancelled,
            finished,
            abort,
        }
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        if let Some(abort) = &self.abort {
            abort.abort();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// True once the task can no longer run: a one-shot task that completed,
    /// or any cancelled task. Repeating tasks only finish by cancellation.
    pub fn is_finished(&self) -> bool {
        self.is_cancelled() || self.finished.load(Ordering::SeqCst)
    }
}

/// Wrap a one-shot task so it raises `finished` when it completes
fn mark_finished(
    task: BoxFuture<'static, ()>,
    finished: Arc<AtomicBool>,
) -> BoxFuture<'static, ()> {
    async move {
        task.await;
        finished.store(true, Ordering::SeqCst);
    }
    .boxed()
}

pub trait Scheduler: Send + Sync {
    /// Run `task` once after `delay`
    fn schedule_once(&self, delay: Duration, task: BoxFuture<'static, ()>) -> TaskHandle;

    /// Run a fresh future from `task` every `interval`, first run one interval from now
    fn schedule_every(&self, interval: Duration, task: RepeatingTask) -> TaskHandle;
}

/// Scheduler backed by tokio timers
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioScheduler;

impl Scheduler for TokioScheduler {
    fn schedule_once(&self, delay: Duration, task: BoxFuture<'static, ()>) -> TaskHandle {
        let cancelled = Arc::new(AtomicBool::new(false));
        let finished = Arc::new(AtomicBool::new(false));
        let flag = cancelled.clone();
        let task = mark_finished(task, finished.clone());

        let join = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if !flag.load(Ordering::SeqCst) {
                task.await;
            }
        });

        TaskHandle::new(cancelled, finished, Some(join.abort_handle()))
    }

    fn schedule_every(&self, interval: Duration, task: RepeatingTask) -> TaskHandle {
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = cancelled.clone();
        let interval = interval.max(MIN_INTERVAL);

        let join = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The first tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if flag.load(Ordering::SeqCst) {
                    break;
                }
                task().await;
            }
        });

        let finished = Arc::new(AtomicBool::new(false));
        TaskHandle::new(cancelled, finished, Some(join.abort_handle()))
    }
}

const MIN_INTERVAL: Duration = Duration::from_millis(1);

enum Job {
    Once(BoxFuture<'static, ()>),
    Every {
        interval: Duration,
        task: RepeatingTask,
    },
}

struct Pending {
    due: Duration,
    seq: u64,
    cancelled: Arc<AtomicBool>,
    job: Job,
}

#[derive(Default)]
struct ManualState {
    elapsed: Duration,
    next_seq: u64,
    pending: Vec<Pending>,
}

impl ManualState {
    fn push(&mut self, due: Duration, cancelled: Arc<AtomicBool>, job: Job) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.push(Pending {
            due,
            seq,
            cancelled,
            job,
        });
    }
}

/// Scheduler driven by virtual time.
///
/// Nothing runs until [`ManualScheduler::advance`] is awaited. It doubles as
/// the [`Clock`] so timestamps follow the virtual time.
pub struct ManualScheduler {
    start: DateTime<Utc>,
    state: Mutex<ManualState>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::starting_at(Utc::now())
    }

    pub fn starting_at(start: DateTime<Utc>) -> Self {
        ManualScheduler {
            start,
            state: Mutex::new(ManualState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ManualState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Virtual time elapsed since creation
    pub fn elapsed(&self) -> Duration {
        self.lock().elapsed
    }

    /// Number of tasks still waiting to run (cancelled ones included)
    pub fn pending_tasks(&self) -> usize {
        self.lock().pending.len()
    }

    /// Move virtual time forward by `by`, running every task that falls due.
    ///
    /// Tasks run one at a time in due-time order, ties broken by schedule
    /// order, with the clock set to each task's due time while it runs.
    pub async fn advance(&self, by: Duration) {
        let target = self.lock().elapsed + by;

        while let Some(task) = self.pop_due(target) {
            task.await;
        }

        let mut state = self.lock();
        state.elapsed = state.elapsed.max(target);
    }

    fn pop_due(&self, target: Duration) -> Option<BoxFuture<'static, ()>> {
        let mut state = self.lock();
        loop {
            let index = state
                .pending
                .iter()
                .enumerate()
                .filter(|(_, p)| p.due <= target)
                .min_by_key(|(_, p)| (p.due, p.seq))
                .map(|(i, _)| i)?;

            let pending = state.pending.remove(index);
            state.elapsed = state.elapsed.max(pending.due);

            if pending.cancelled.load(Ordering::SeqCst) {
                continue;
            }

            return Some(match pending.job {
                Job::Once(task) => task,
                Job::Every { interval, task } => {
                    let run = task();
                    state.push(
                        pending.due + interval,
                        pending.cancelled,
                        Job::Every { interval, task },
                    );
                    run
                }
            });
        }
    }
}

impl Default for ManualScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualScheduler {
    fn now(&self) -> DateTime<Utc> {
        let elapsed = self.elapsed();
        self.start + chrono::Duration::milliseconds(elapsed.as_millis() as i64)
    }
}

impl Scheduler for ManualScheduler {
    fn schedule_once(&self, delay: Duration, task: BoxFuture<'static, ()>) -> TaskHandle {
        let cancelled = Arc::new(AtomicBool::new(false));
        let finished = Arc::new(AtomicBool::new(false));
        let task = mark_finished(task, finished.clone());
        let mut state = self.lock();
        let due = state.elapsed + delay;
        state.push(due, cancelled.clone(), Job::Once(task));
        TaskHandle::new(cancelled, finished, None)
    }

    fn schedule_every(&self, interval: Duration, task: RepeatingTask) -> TaskHandle {
        let cancelled = Arc::new(AtomicBool::new(false));
        let interval = interval.max(MIN_INTERVAL);
        let mut state = self.lock();
        let due = state.elapsed + interval;
        state.push(due, cancelled.clone(), Job::Every { interval, task });
        TaskHandle::new(cancelled, Arc::new(AtomicBool::new(false)), None)
    }
}
