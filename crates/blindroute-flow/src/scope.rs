//! Per-step owned resources.
//!
//! A `StepScope` lives exactly as long as one step instance. Every child task of the step
//! (gateway calls, timers, the arrival poller, a recognition session) is owned here, so
//! replacing the scope on a transition aborts all of them at once, and any result already
//! in flight carries a generation the new scope rejects.

use crate::event::{Inbound, StepEmitter};
use blindroute_voice::AbortOnDrop;
use std::future::Future;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::warn;

pub(crate) struct StepScope {
    generation: u64,
    tx: mpsc::UnboundedSender<Inbound>,
    action: Option<AbortOnDrop<()>>,
    busy_until: Option<Instant>,
    held: bool,
    debounce_until: Option<Instant>,
    first_announcement: bool,
    poller: Option<AbortOnDrop<()>>,
    listener: Option<AbortOnDrop<()>>,
    tasks: Vec<AbortOnDrop<()>>,
}

impl StepScope {
    pub(crate) fn new(tx: mpsc::UnboundedSender<Inbound>) -> Self {
        Self::with_generation(tx, 1)
    }

    fn with_generation(tx: mpsc::UnboundedSender<Inbound>, generation: u64) -> Self {
        Self {
            generation,
            tx,
            action: None,
            busy_until: None,
            held: false,
            debounce_until: None,
            first_announcement: true,
            poller: None,
            listener: None,
            tasks: Vec::new(),
        }
    }

    /// Replace this scope with a fresh one for the next step instance.
    pub(crate) fn renew(&mut self) {
        *self = Self::with_generation(self.tx.clone(), self.generation + 1);
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }

    pub(crate) fn accepts(&self, generation: u64) -> bool {
        generation == self.generation
    }

    pub(crate) fn emitter(&self) -> StepEmitter {
        StepEmitter::new(self.tx.clone(), self.generation)
    }

    /// Run the step's lookup. The step is busy until `end_busy` or until `timeout` elapses;
    /// at the deadline the lookup is dropped, so its result never lands. False (and nothing
    /// spawned) if the step is already busy.
    pub(crate) fn start_action<F>(&mut self, timeout: Duration, action: F) -> bool
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if self.is_busy() {
            return false;
        }
        let generation = self.generation;
        self.busy_until = Some(Instant::now() + timeout);
        self.action = Some(AbortOnDrop::spawn(async move {
            if tokio::time::timeout(timeout, action).await.is_err() {
                warn!("[STEP] action of step {} abandoned after {:?}", generation, timeout);
            }
        }));
        true
    }

    /// Run a reservation. It is never abandoned: the step stays busy until `end_busy` (or the
    /// step is left), and `commit` must finish by emitting the event that leads there.
    pub(crate) fn start_commit<F>(&mut self, commit: F) -> bool
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if self.is_busy() {
            return false;
        }
        self.busy_until = None;
        self.action = Some(AbortOnDrop::spawn(commit));
        true
    }

    pub(crate) fn end_busy(&mut self) {
        self.action = None;
        self.busy_until = None;
    }

    /// Block gestures and taps until the step is left.
    pub(crate) fn hold(&mut self) {
        self.held = true;
    }

    pub(crate) fn is_held(&self) -> bool {
        self.held
    }

    pub(crate) fn is_busy(&self) -> bool {
        if self.held {
            return true;
        }
        match (&self.action, self.busy_until) {
            (None, _) => false,
            (Some(_), None) => true,
            (Some(_), Some(deadline)) => Instant::now() < deadline,
        }
    }

    pub(crate) fn debounce(&mut self, window: Duration) {
        self.debounce_until = Some(Instant::now() + window);
    }

    pub(crate) fn gestures_blocked(&self) -> bool {
        self.is_busy()
            || self
                .debounce_until
                .is_some_and(|deadline| Instant::now() < deadline)
    }

    /// True exactly once per step instance.
    pub(crate) fn take_first_announcement(&mut self) -> bool {
        std::mem::replace(&mut self.first_announcement, false)
    }

    pub(crate) fn spawn<F>(&mut self, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.tasks.retain(|t| !t.is_finished());
        self.tasks.push(AbortOnDrop::spawn(future));
    }

    pub(crate) fn set_poller(&mut self, poller: AbortOnDrop<()>) {
        self.poller = Some(poller);
    }

    pub(crate) fn stop_poller(&mut self) {
        self.poller = None;
    }

    pub(crate) fn is_polling(&self) -> bool {
        self.poller.as_ref().is_some_and(|p| !p.is_finished())
    }

    pub(crate) fn set_listener(&mut self, listener: AbortOnDrop<()>) {
        self.listener = Some(listener);
    }

    /// Cancel the recognition session of this step, if any.
    pub(crate) fn stop_listening(&mut self) {
        self.listener = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::FlowEvent;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    fn scope() -> (StepScope, mpsc::UnboundedReceiver<Inbound>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (StepScope::new(tx), rx)
    }

    #[tokio::test(start_paused = true)]
    async fn lookup_is_abandoned_at_the_timeout() {
        let (mut scope, mut rx) = scope();
        let emitter = scope.emitter();
        assert!(scope.start_action(Duration::from_secs(10), async move {
            tokio::time::sleep(Duration::from_secs(12)).await;
            emitter.emit(FlowEvent::EmptyQuery);
        }));
        assert!(!scope.start_action(Duration::from_secs(10), async {}));
        assert!(scope.is_busy());

        tokio::time::sleep(Duration::from_millis(10_100)).await;
        assert!(!scope.is_busy());
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(rx.try_recv().is_err());

        assert!(scope.start_action(Duration::from_secs(10), async {}));
        scope.end_busy();
        assert!(!scope.gestures_blocked());
    }

    #[tokio::test(start_paused = true)]
    async fn commit_stays_busy_until_resolved() {
        let (mut scope, mut rx) = scope();
        let emitter = scope.emitter();
        assert!(scope.start_commit(async move {
            tokio::time::sleep(Duration::from_secs(12)).await;
            emitter.emit(FlowEvent::EmptyQuery);
        }));
        tokio::time::sleep(Duration::from_millis(10_100)).await;
        assert!(scope.is_busy());
        assert!(!scope.start_commit(async {}));

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(matches!(
            rx.try_recv(),
            Ok(Inbound::Step { generation: 1, event: FlowEvent::EmptyQuery })
        ));
        assert!(scope.is_busy());
        scope.end_busy();
        assert!(!scope.is_busy());
    }

    #[tokio::test(start_paused = true)]
    async fn debounce_blocks_gestures_briefly() {
        let (mut scope, _rx) = scope();
        scope.debounce(Duration::from_millis(250));
        assert!(scope.gestures_blocked());
        tokio::time::advance(Duration::from_millis(251)).await;
        assert!(!scope.gestures_blocked());
    }

    #[tokio::test(start_paused = true)]
    async fn renew_aborts_children_and_bumps_generation() {
        let (mut scope, _rx) = scope();
        let ran = Arc::new(AtomicBool::new(false));
        let flag = ran.clone();
        scope.spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            flag.store(true, Ordering::SeqCst);
        });
        scope.hold();
        assert!(scope.is_held());
        assert!(scope.take_first_announcement());
        assert!(!scope.take_first_announcement());

        scope.renew();
        assert_eq!(scope.generation(), 2);
        assert!(!scope.accepts(1));
        assert!(!scope.is_busy());
        assert!(!scope.is_held());
        assert!(scope.take_first_announcement());

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(!ran.load(Ordering::SeqCst));
    }
}
