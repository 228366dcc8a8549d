//! What a flow needs to run, how it ends, and the handle a screen holds on it.

use crate::event::{ContentRegion, Inbound, UserInput};
use blindroute_core::{FlowTimings, NavigationRequest, TransitGateway};
use blindroute_voice::{AbortOnDrop, SwipeIntent, VoiceCoordinator};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::warn;

/// Collaborators shared by the transit flows.
#[derive(Clone)]
pub struct FlowContext {
    pub gateway: Arc<dyn TransitGateway>,
    pub voice: Arc<VoiceCoordinator>,
    pub timings: FlowTimings,
}

impl FlowContext {
    pub fn new(gateway: Arc<dyn TransitGateway>, voice: Arc<VoiceCoordinator>, timings: FlowTimings) -> Self {
        Self {
            gateway,
            voice,
            timings,
        }
    }
}

/// How a flow ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowExit {
    /// Backed out of the first step.
    Home,
    /// Alighting reservation confirmed.
    Completed,
    /// The assistant resolved a start and destination.
    Navigate(NavigationRequest),
}

/// Screen-side handle on a running flow. Dropping it stops the flow and everything it owns.
pub struct FlowHandle<V> {
    tx: mpsc::UnboundedSender<Inbound>,
    view: watch::Receiver<V>,
    task: AbortOnDrop<FlowExit>,
}

impl<V: Clone> FlowHandle<V> {
    pub(crate) fn new(
        tx: mpsc::UnboundedSender<Inbound>,
        view: watch::Receiver<V>,
        task: AbortOnDrop<FlowExit>,
    ) -> Self {
        Self { tx, view, task }
    }

    /// Deliver user input. False once the flow has ended.
    pub fn send(&self, input: UserInput) -> bool {
        self.tx.send(Inbound::User(input)).is_ok()
    }

    pub fn swipe(&self, intent: SwipeIntent) -> bool {
        self.send(UserInput::Swipe(intent))
    }

    pub fn tap(&self, region: ContentRegion) -> bool {
        self.send(UserInput::Tap(region))
    }

    /// Latest published view.
    pub fn view(&self) -> V {
        self.view.borrow().clone()
    }

    /// Subscribe to view changes.
    pub fn subscribe(&self) -> watch::Receiver<V> {
        self.view.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the flow to end.
    pub async fn finished(self) -> FlowExit {
        match self.task.await {
            Ok(exit) => exit,
            Err(e) => {
                warn!("[FLOW] flow task ended abnormally: {}", e);
                FlowExit::Home
            }
        }
    }
}
