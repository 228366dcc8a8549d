//! Events a flow task consumes: user input from the screen, and results its child tasks
//! post back tagged with the generation of the step that spawned them.

use blindroute_core::{
    BoardingRequest, BusArrival, BusList, ChatMode, ChatReply, CoreResult, ReservationOutcome,
    StationSearch,
};
use blindroute_voice::{PointerEvent, SwipeIntent, VoiceOutcome};
use tokio::sync::mpsc;

/// Tappable regions of a screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentRegion {
    /// The main information panel of a step.
    Content,
    /// The assistant screen's echo of what the user said.
    UserMessage,
    /// The assistant's latest reply.
    AssistantMessage,
}

/// Input from the screen.
#[derive(Debug, Clone, PartialEq)]
pub enum UserInput {
    /// Raw pointer event; run through the flow's swipe detector.
    Pointer(PointerEvent),
    /// Already classified swipe.
    Swipe(SwipeIntent),
    Tap(ContentRegion),
    /// Typed text (station name, chat message).
    Text(String),
    /// The voice-input button.
    StartListening,
}

/// Results of child tasks.
#[derive(Debug)]
pub(crate) enum FlowEvent {
    Heard(VoiceOutcome),
    EmptyQuery,
    StationsFound {
        query: String,
        search: StationSearch,
    },
    BusesListed(BusList),
    Reserved {
        request: BoardingRequest,
        outcome: ReservationOutcome,
    },
    Snapshot(BusArrival),
    ArrivalConfirmed {
        veh_id: String,
    },
    CancelSpoken,
    Alighted(ReservationOutcome),
    AlightAnnounced,
    ChatReplied {
        mode: ChatMode,
        reply: CoreResult<ChatReply>,
    },
}

#[derive(Debug)]
pub(crate) enum Inbound {
    User(UserInput),
    Step { generation: u64, event: FlowEvent },
}

/// Posts child-task results back into the flow, stamped with one step generation.
#[derive(Debug, Clone)]
pub(crate) struct StepEmitter {
    tx: mpsc::UnboundedSender<Inbound>,
    generation: u64,
}

impl StepEmitter {
    pub(crate) fn new(tx: mpsc::UnboundedSender<Inbound>, generation: u64) -> Self {
        Self { tx, generation }
    }

    pub(crate) fn emit(&self, event: FlowEvent) {
        let _ = self.tx.send(Inbound::Step {
            generation: self.generation,
            event,
        });
    }
}
