//! The assistant screen: free conversation, switching into route collection when the
//! chat service detects a navigation request, then handing off with the start and
//! destination it extracted.

use crate::context::{FlowExit, FlowHandle};
use crate::event::{ContentRegion, FlowEvent, Inbound, UserInput};
use crate::scope::StepScope;
use crate::script;
use blindroute_core::{ChatAssistant, ChatMode, ChatReply, CoreResult, FlowTimings, NavigationRequest};
use blindroute_voice::{AbortOnDrop, Gesture, HapticCue, SwipeDetector, SwipeIntent, VoiceCoordinator, VoiceOutcome};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

/// Longest spoken chat message kept from one recognition session.
pub const CHAT_MESSAGE_MAX_SPOKEN: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssistantView {
    pub mode: ChatMode,
    pub user_message: Option<String>,
    pub assistant_message: Option<String>,
    pub waiting_reply: bool,
}

pub struct AssistantFlow {
    chat: Arc<dyn ChatAssistant>,
    voice: Arc<VoiceCoordinator>,
    timings: FlowTimings,
    scope: StepScope,
    detector: SwipeDetector,
    mode: ChatMode,
    user_message: Option<String>,
    assistant_message: Option<String>,
    view_tx: watch::Sender<AssistantView>,
}

impl AssistantFlow {
    pub fn spawn(
        chat: Arc<dyn ChatAssistant>,
        voice: Arc<VoiceCoordinator>,
        timings: FlowTimings,
    ) -> FlowHandle<AssistantView> {
        let (tx, rx) = mpsc::unbounded_channel();
        let (view_tx, view_rx) = watch::channel(AssistantView {
            mode: ChatMode::Chat,
            user_message: None,
            assistant_message: None,
            waiting_reply: false,
        });
        let flow = Self {
            chat,
            voice,
            timings,
            scope: StepScope::new(tx.clone()),
            detector: SwipeDetector::default(),
            mode: ChatMode::Chat,
            user_message: None,
            assistant_message: None,
            view_tx,
        };
        let task = AbortOnDrop::spawn(flow.run(rx));
        FlowHandle::new(tx, view_rx, task)
    }

    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<Inbound>) -> FlowExit {
        info!("[ASSISTANT] session started");
        self.reply_with(script::CHAT_GREETING);
        self.publish();
        while let Some(inbound) = rx.recv().await {
            let exit = match inbound {
                Inbound::User(input) => self.on_input(input),
                Inbound::Step { generation, event } if self.scope.accepts(generation) => {
                    self.on_event(event)
                }
                Inbound::Step { .. } => None,
            };
            self.publish();
            if let Some(exit) = exit {
                info!("[ASSISTANT] session finished: {:?}", exit);
                return exit;
            }
        }
        FlowExit::Home
    }

    fn publish(&self) {
        let view = AssistantView {
            mode: self.mode,
            user_message: self.user_message.clone(),
            assistant_message: self.assistant_message.clone(),
            waiting_reply: self.scope.is_busy(),
        };
        self.view_tx.send_if_modified(|current| {
            if *current == view {
                false
            } else {
                *current = view;
                true
            }
        });
    }

    /// Show and speak an assistant line.
    fn reply_with(&mut self, text: &str) {
        self.assistant_message = Some(text.to_string());
        self.voice.announce(text);
    }

    fn on_input(&mut self, input: UserInput) -> Option<FlowExit> {
        match input {
            UserInput::Pointer(event) => match self.detector.feed(event) {
                Some(Gesture::Swipe(direction)) => self.on_swipe(direction.intent()),
                Some(Gesture::Tap { .. }) => {
                    self.on_tap(ContentRegion::AssistantMessage);
                    None
                }
                None => None,
            },
            UserInput::Swipe(intent) => self.on_swipe(intent),
            UserInput::Tap(region) => {
                self.on_tap(region);
                None
            }
            UserInput::Text(text) => {
                self.submit(text);
                None
            }
            UserInput::StartListening => {
                self.start_listening();
                None
            }
        }
    }

    fn on_swipe(&mut self, intent: SwipeIntent) -> Option<FlowExit> {
        match intent {
            SwipeIntent::Backward => {
                self.scope.stop_listening();
                Some(FlowExit::Home)
            }
            _ => None,
        }
    }

    fn on_tap(&self, region: ContentRegion) {
        let text = match region {
            ContentRegion::UserMessage => self.user_message.as_deref(),
            ContentRegion::AssistantMessage | ContentRegion::Content => {
                self.assistant_message.as_deref()
            }
        };
        if let Some(text) = text.filter(|t| !t.is_empty()) {
            self.voice.announce(text);
        }
    }

    fn start_listening(&mut self) {
        let Some(session) = self.voice.listen(CHAT_MESSAGE_MAX_SPOKEN) else {
            debug!("[ASSISTANT] already listening");
            return;
        };
        self.voice.cue(HapticCue::ScreenEntry);
        let emitter = self.scope.emitter();
        self.scope.set_listener(AbortOnDrop::spawn(async move {
            let outcome = session.outcome().await;
            emitter.emit(FlowEvent::Heard(outcome));
        }));
    }

    fn submit(&mut self, message: String) {
        let message = message.trim().to_string();
        if message.is_empty() {
            return;
        }
        let chat = self.chat.clone();
        let mode = self.mode;
        let emitter = self.scope.emitter();
        let request = message.clone();
        let started = self.scope.start_action(self.timings.busy_timeout, async move {
            let reply = chat.reply(&request, mode).await;
            emitter.emit(FlowEvent::ChatReplied { mode, reply });
        });
        if !started {
            debug!("[ASSISTANT] reply pending, message dropped");
            return;
        }
        self.user_message = Some(message);
        self.assistant_message = Some(String::new());
    }

    fn on_event(&mut self, event: FlowEvent) -> Option<FlowExit> {
        match event {
            FlowEvent::Heard(VoiceOutcome::Result(text)) => self.submit(text),
            FlowEvent::Heard(VoiceOutcome::AutoStopped) => {}
            FlowEvent::ChatReplied { mode, reply } => {
                self.scope.end_busy();
                return self.on_reply(mode, reply);
            }
            _ => {}
        }
        None
    }

    fn on_reply(&mut self, mode: ChatMode, reply: CoreResult<ChatReply>) -> Option<FlowExit> {
        let reply = match reply {
            Ok(reply) => reply,
            Err(e) => {
                warn!("[ASSISTANT] chat request failed: {}", e);
                let fallback = match mode {
                    ChatMode::Chat => script::CHAT_NOT_UNDERSTOOD,
                    ChatMode::Blindroute => script::CHAT_ROUTE_RETRY,
                };
                self.reply_with(fallback);
                return None;
            }
        };
        match mode {
            ChatMode::Chat if reply.chat_mode == ChatMode::Blindroute => {
                info!("[ASSISTANT] navigation intent detected");
                self.mode = ChatMode::Blindroute;
                self.reply_with(script::CHAT_NAVIGATION_START);
            }
            ChatMode::Chat if reply.message.is_empty() => self.reply_with(script::CHAT_NOT_UNDERSTOOD),
            ChatMode::Chat => self.reply_with(&reply.message),
            ChatMode::Blindroute => match NavigationRequest::from_pair(&reply.message) {
                Some(request) => {
                    info!("[ASSISTANT] navigating to {}", request.to_path());
                    return Some(FlowExit::Navigate(request));
                }
                None => self.reply_with(script::CHAT_ROUTE_RETRY),
            },
        }
        None
    }
}

impl Drop for AssistantFlow {
    fn drop(&mut self) {
        self.voice.silence();
    }
}
