use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

/// A deferred task that can be called off before it runs.
pub trait ScheduledTask {
    /// Cancel the task. A no-op if it already ran.
    fn cancel(self);
}

/// Runs a task once after a delay, on the same thread.
pub trait Scheduler {
    type Handle: ScheduledTask;

    fn schedule(&self, delay_ms: u32, task: Box<dyn FnOnce()>) -> Self::Handle;
}

/// Collapses bursts of [`trigger`](Self::trigger) calls into one call of the
/// action, `delay_ms` after the last trigger, with the last trigger's
/// arguments.
///
/// At most one invocation is pending at any time. Dropping the debouncer
/// cancels it.
pub struct Debouncer<S: Scheduler, A: 'static> {
    scheduler: S,
    delay_ms: u32,
    action: Rc<dyn Fn(A)>,
    pending: RefCell<Option<S::Handle>>,
    // Cleared by the task itself, so the stored handle can outlive the run.
    armed: Rc<Cell<bool>>,
}

impl<S: Scheduler, A: 'static> Debouncer<S, A> {
    pub fn new(scheduler: S, delay_ms: u32, action: impl Fn(A) + 'static) -> Self {
        Self {
            scheduler,
            delay_ms,
            action: Rc::new(action),
            pending: RefCell::new(None),
            armed: Rc::new(Cell::new(false)),
        }
    }

    /// Supersede any pending call and restart the quiet interval.
    pub fn trigger(&self, args: A) {
        self.cancel();

        let action = Rc::clone(&self.action);
        let armed = Rc::clone(&self.armed);
        armed.set(true);
        let handle = self.scheduler.schedule(
            self.delay_ms,
            Box::new(move || {
                armed.set(false);
                action(args);
            }),
        );
        *self.pending.borrow_mut() = Some(handle);
    }

    pub fn cancel(&self) {
        let handle = self.pending.borrow_mut().take();
        if let Some(handle) = handle {
            handle.cancel();
        }
        self.armed.set(false);
    }

    pub fn is_pending(&self) -> bool {
        self.armed.get()
    }
}

impl<S: Scheduler, A: 'static> Drop for Debouncer<S, A> {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Virtual-clock scheduler. Nothing runs until [`advance`](Self::advance).
#[derive(Clone, Default)]
pub struct ManualScheduler {
    state: Rc<RefCell<ManualState>>,
}

#[derive(Default)]
struct ManualState {
    now_ms: u64,
    next_id: u64,
    queue: Vec<QueuedTask>,
}

struct QueuedTask {
    id: u64,
    due_ms: u64,
    task: Box<dyn FnOnce()>,
}

pub struct ManualTask {
    id: u64,
    state: Weak<RefCell<ManualState>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_ms(&self) -> u64 {
        self.state.borrow().now_ms
    }

    pub fn pending_count(&self) -> usize {
        self.state.borrow().queue.len()
    }

    /// Move the clock forward, running every task that comes due in order.
    /// Returns how many ran.
    pub fn advance(&self, ms: u64) -> usize {
        let target = self.now_ms() + ms;
        let mut ran = 0;
        loop {
            let next = {
                let mut state = self.state.borrow_mut();
                let earliest = state
                    .queue
                    .iter()
                    .enumerate()
                    .filter(|(_, queued)| queued.due_ms <= target)
                    .min_by_key(|(_, queued)| (queued.due_ms, queued.id))
                    .map(|(idx, _)| idx);
                earliest.map(|idx| {
                    let queued = state.queue.remove(idx);
                    state.now_ms = queued.due_ms;
                    queued.task
                })
            };
            // The borrow is released so the task may schedule more work.
            let Some(task) = next else {
                break;
            };
            task();
            ran += 1;
        }
        self.state.borrow_mut().now_ms = target;
        ran
    }
}

impl Scheduler for ManualScheduler {
    type Handle = ManualTask;

    fn schedule(&self, delay_ms: u32, task: Box<dyn FnOnce()>) -> ManualTask {
        let mut state = self.state.borrow_mut();
        let id = state.next_id;
        state.next_id += 1;
        let due_ms = state.now_ms + u64::from(delay_ms);
        state.queue.push(QueuedTask { id, due_ms, task });
        ManualTask {
            id,
            state: Rc::downgrade(&self.state),
        }
    }
}

impl ScheduledTask for ManualTask {
    fn cancel(self) {
        drop(self);
    }
}

impl Drop for ManualTask {
    fn drop(&mut self) {
        let Some(state) = self.state.upgrade() else {
            return;
        };
        // Already borrowed only while the scheduler itself is mutating the queue.
        let Ok(mut state) = state.try_borrow_mut() else {
            return;
        };
        state.queue.retain(|queued| queued.id != self.id);
    }
}
