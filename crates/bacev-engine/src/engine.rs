//! # bacev-engine::engine
//!
//! The cooperative evaluation scheduler. All evaluation, property writes,
//! and notification dispatch run on one logical executor; there are no
//! locks. Property changes enqueue the owning algorithm at most once per
//! settled epoch, and the execute-enabled guard keeps an evaluator's own
//! writes from re-enqueueing it.

use crate::binding::PropertyChange;
use crate::event::EventAlgorithm;
use crate::store::{MonitorId, Object};
use bacev_api::{Notification, NotificationSink};
use bacev_types::metrics::{
    LBL_GROUP, MET_EVALUATIONS, MET_EVALUATION_ERRORS, MET_NOTIFICATIONS_FAILED,
    MET_NOTIFICATIONS_SENT, MET_TRANSITIONS,
};
use bacev_types::property::PropertyIdentifier;
use std::cell::{Cell, Ref, RefCell};
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

/// Transient evaluation flags shared between the scheduler and the
/// property monitors.
pub(crate) struct EvalFlags {
    /// While false, property changes neither record nor re-schedule; this
    /// is what stops an evaluator's own writes from feeding back.
    pub enabled: Cell<bool>,
    /// True between the first change of an epoch and the evaluation it
    /// triggered; later changes in the same epoch only append.
    pub scheduled: Cell<bool>,
}

impl EvalFlags {
    fn new() -> Self {
        Self {
            enabled: Cell::new(true),
            scheduled: Cell::new(false),
        }
    }
}

/// Restores the execute-enabled flag on every exit path of `evaluate`,
/// including error returns.
struct ExecuteGuard<'a> {
    flags: &'a EvalFlags,
}

impl<'a> ExecuteGuard<'a> {
    fn disable(flags: &'a EvalFlags) -> Self {
        flags.enabled.set(false);
        Self { flags }
    }
}

impl Drop for ExecuteGuard<'_> {
    fn drop(&mut self) {
        self.flags.enabled.set(true);
    }
}

/// A bound property monitor recorded for teardown.
pub(crate) struct Subscription {
    pub object: Rc<Object>,
    pub property: PropertyIdentifier,
    pub monitor: MonitorId,
}

/// One registered algorithm: the instance proper plus the transient
/// scheduling state the monitors touch without borrowing the instance.
pub struct AlgorithmCell {
    pub(crate) flags: EvalFlags,
    pub(crate) pending: RefCell<Vec<PropertyChange>>,
    pub(crate) detached: Cell<bool>,
    pub(crate) subscriptions: RefCell<Vec<Subscription>>,
    pub(crate) algorithm: RefCell<EventAlgorithm>,
}

impl std::fmt::Debug for AlgorithmCell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlgorithmCell").finish()
    }
}

impl AlgorithmCell {
    pub(crate) fn new(algorithm: EventAlgorithm) -> Rc<Self> {
        Rc::new(Self {
            flags: EvalFlags::new(),
            pending: RefCell::new(Vec::new()),
            detached: Cell::new(false),
            subscriptions: RefCell::new(Vec::new()),
            algorithm: RefCell::new(algorithm),
        })
    }

    /// Read access to the algorithm, for inspection.
    pub fn algorithm(&self) -> Ref<'_, EventAlgorithm> {
        self.algorithm.borrow()
    }

    /// True once the instance has been torn down.
    pub fn is_detached(&self) -> bool {
        self.detached.get()
    }

    pub(crate) fn teardown(&self) {
        self.detached.set(true);
        for sub in self.subscriptions.borrow_mut().drain(..) {
            sub.object.remove_monitor(sub.property, sub.monitor);
        }
        self.pending.borrow_mut().clear();
    }
}

/// Context handed to an evaluation: the engine (for notification emission)
/// and the snapshot of changes that triggered this epoch.
pub struct EvalCtx<'a> {
    pub engine: &'a EventEngine,
    pub changes: &'a [PropertyChange],
}

/// The single-threaded evaluation executor.
///
/// Algorithms are registered by [`EventAlgorithm::attach`]; property
/// monitors enqueue them here and `run_until_settled` drains the queue,
/// running each algorithm's evaluator at most once per settled epoch.
pub struct EventEngine {
    queue: RefCell<VecDeque<Weak<AlgorithmCell>>>,
    algorithms: RefCell<Vec<Rc<AlgorithmCell>>>,
    sink: Box<dyn NotificationSink>,
}

impl EventEngine {
    pub fn new(sink: Box<dyn NotificationSink>) -> Rc<Self> {
        Rc::new(Self {
            queue: RefCell::new(VecDeque::new()),
            algorithms: RefCell::new(Vec::new()),
            sink,
        })
    }

    pub(crate) fn register(&self, cell: Rc<AlgorithmCell>) {
        self.algorithms.borrow_mut().push(cell);
    }

    pub(crate) fn enqueue(&self, cell: &Rc<AlgorithmCell>) {
        self.queue.borrow_mut().push_back(Rc::downgrade(cell));
    }

    /// Tears one algorithm down: cancels its pending evaluation and removes
    /// every bound property monitor.
    pub fn detach(&self, cell: &Rc<AlgorithmCell>) {
        cell.teardown();
        self.algorithms
            .borrow_mut()
            .retain(|c| !Rc::ptr_eq(c, cell));
    }

    /// The number of registered, still-attached algorithms.
    pub fn algorithm_count(&self) -> usize {
        self.algorithms.borrow().len()
    }

    /// Drains the run queue until no evaluation is pending. Evaluations
    /// may themselves schedule further work (through property writes that
    /// other algorithms monitor); the loop runs until that settles.
    ///
    /// Returns the number of evaluations performed.
    pub fn run_until_settled(&self) -> usize {
        let mut evaluations = 0;
        loop {
            let next = self.queue.borrow_mut().pop_front();
            let Some(weak) = next else { break };
            let Some(cell) = weak.upgrade() else { continue };
            if cell.detached.get() {
                continue;
            }

            // Snapshot and clear the pending set, then run the evaluator
            // with its own monitors disabled.
            let changes = std::mem::take(&mut *cell.pending.borrow_mut());
            cell.flags.scheduled.set(false);
            let result = {
                let _guard = ExecuteGuard::disable(&cell.flags);
                cell.algorithm.borrow_mut().evaluate(&EvalCtx {
                    engine: self,
                    changes: &changes,
                })
            };

            evaluations += 1;
            metrics::counter!(MET_EVALUATIONS).increment(1);
            if let Err(err) = result {
                metrics::counter!(MET_EVALUATION_ERRORS).increment(1);
                tracing::error!(error = %err, "event evaluation failed");
            }
        }
        evaluations
    }

    /// Hands a committed transition to the downstream sink. The state has
    /// already committed; a delivery failure is reported, not retried.
    pub(crate) fn emit(&self, notification: Notification) {
        tracing::info!(
            object = %notification.initiating_object,
            state = %notification.new_state,
            group = %notification.group,
            "event transition"
        );
        metrics::counter!(MET_TRANSITIONS, LBL_GROUP => notification.group.to_string())
            .increment(1);
        match self.sink.deliver(notification) {
            Ok(()) => {
                metrics::counter!(MET_NOTIFICATIONS_SENT).increment(1);
            }
            Err(err) => {
                metrics::counter!(MET_NOTIFICATIONS_FAILED).increment(1);
                tracing::warn!(error = %err, "notification delivery failed");
            }
        }
    }
}

/// Installs a change monitor that records `(name, old, new)` into the
/// owning algorithm's pending set and schedules it, enqueueing at most
/// once per epoch. Both captures are weak so a dropped algorithm or
/// engine silently unhooks.
pub(crate) fn subscribe(
    engine: &Rc<EventEngine>,
    cell: &Rc<AlgorithmCell>,
    name: &'static str,
    object: &Rc<Object>,
    property: PropertyIdentifier,
) {
    let weak_cell = Rc::downgrade(cell);
    let weak_engine = Rc::downgrade(engine);
    let monitor = object.add_monitor(property, move |old, new| {
        let (Some(cell), Some(engine)) = (weak_cell.upgrade(), weak_engine.upgrade()) else {
            return;
        };
        if cell.detached.get() || !cell.flags.enabled.get() {
            return;
        }
        cell.pending.borrow_mut().push(PropertyChange {
            name,
            old: old.clone(),
            new: new.clone(),
        });
        if !cell.flags.scheduled.replace(true) {
            engine.enqueue(&cell);
        }
    });
    cell.subscriptions.borrow_mut().push(Subscription {
        object: object.clone(),
        property,
        monitor,
    });
}
