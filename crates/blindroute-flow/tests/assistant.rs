mod common;

use blindroute_core::{ChatMode, FlowTimings, NavigationRequest};
use blindroute_flow::{AssistantFlow, ContentRegion, FlowExit, UserInput};
use blindroute_voice::SwipeIntent;
use common::{rig, settle, FakeChat, FakeGateway};
use std::sync::Arc;
use std::time::Duration;

fn spoken_count(speech: &blindroute_voice::PlaceholderSpeech, text: &str) -> usize {
    speech.spoken_content().iter().filter(|s| *s == text).count()
}

#[tokio::test(start_paused = true)]
async fn conversation_switches_into_navigation() {
    let rig = rig(FakeGateway::default());
    let chat = Arc::new(FakeChat::default());
    chat.push(ChatMode::Chat, "오늘 서울은 맑습니다.");
    chat.push(ChatMode::Blindroute, "");
    chat.push(ChatMode::Blindroute, "강남역,서울역");
    let handle = AssistantFlow::spawn(chat.clone(), rig.voice.clone(), FlowTimings::default());
    settle(10).await;
    assert_eq!(
        spoken_count(&rig.speech, "안녕하세요, 저는 당신의 AI 비서 에이닷입니다."),
        1
    );

    handle.send(UserInput::Text("오늘 날씨 어때?".into()));
    settle(10).await;
    let view = handle.view();
    assert_eq!(view.mode, ChatMode::Chat);
    assert_eq!(view.user_message.as_deref(), Some("오늘 날씨 어때?"));
    assert_eq!(view.assistant_message.as_deref(), Some("오늘 서울은 맑습니다."));

    handle.send(UserInput::Text("서울역 가는 길 알려줘".into()));
    settle(10).await;
    assert_eq!(handle.view().mode, ChatMode::Blindroute);
    assert_eq!(
        spoken_count(
            &rig.speech,
            "시각장애인 전용 길안내를 시작하겠습니다. 출발지와 목적지를 말해주세요."
        ),
        1
    );

    handle.send(UserInput::Text("강남역에서 서울역".into()));
    assert_eq!(
        handle.finished().await,
        FlowExit::Navigate(NavigationRequest::new("강남역", "서울역"))
    );
    let modes: Vec<ChatMode> = chat.requests().into_iter().map(|(_, m)| m).collect();
    assert_eq!(modes, vec![ChatMode::Chat, ChatMode::Chat, ChatMode::Blindroute]);
}

#[tokio::test(start_paused = true)]
async fn fallbacks_are_spoken() {
    let rig = rig(FakeGateway::default());
    let chat = Arc::new(FakeChat::default());
    chat.push(ChatMode::Chat, "");
    chat.push_error();
    chat.push(ChatMode::Blindroute, "");
    chat.push(ChatMode::Blindroute, "서울역");
    let handle = AssistantFlow::spawn(chat.clone(), rig.voice.clone(), FlowTimings::default());

    handle.send(UserInput::Text("음".into()));
    settle(10).await;
    handle.send(UserInput::Text("음".into()));
    settle(10).await;
    assert_eq!(spoken_count(&rig.speech, "이해를 잘 못했습니다. 다시 말해주세요."), 2);

    handle.send(UserInput::Text("길 안내".into()));
    settle(10).await;
    handle.send(UserInput::Text("서울역".into()));
    settle(10).await;
    assert_eq!(handle.view().mode, ChatMode::Blindroute);
    assert_eq!(spoken_count(&rig.speech, "출발지와 도착지를 다시 말해주세요."), 1);
    assert!(!handle.is_finished());
}

#[tokio::test(start_paused = true)]
async fn late_reply_is_dropped_after_the_busy_timeout() {
    let rig = rig(FakeGateway::default());
    let chat = Arc::new(FakeChat::default());
    chat.push(ChatMode::Blindroute, "");
    chat.push(ChatMode::Chat, "반가워요.");
    chat.delays.lock().unwrap().push_back(Duration::from_secs(12));
    let handle = AssistantFlow::spawn(chat.clone(), rig.voice.clone(), FlowTimings::default());

    handle.send(UserInput::Text("길 좀 알려줘".into()));
    settle(5_000).await;
    handle.send(UserInput::Text("무시될 메시지".into()));
    settle(5_100).await;
    assert_eq!(chat.requests().len(), 1);

    handle.send(UserInput::Text("안녕".into()));
    settle(30_000).await;
    assert_eq!(
        chat.requests(),
        vec![
            ("길 좀 알려줘".to_string(), ChatMode::Chat),
            ("안녕".to_string(), ChatMode::Chat),
        ]
    );
    let view = handle.view();
    assert_eq!(view.mode, ChatMode::Chat);
    assert_eq!(view.user_message.as_deref(), Some("안녕"));
    assert_eq!(view.assistant_message.as_deref(), Some("반가워요."));
    assert!(!view.waiting_reply);
    assert_eq!(
        spoken_count(
            &rig.speech,
            "시각장애인 전용 길안내를 시작하겠습니다. 출발지와 목적지를 말해주세요."
        ),
        0
    );
}

#[tokio::test(start_paused = true)]
async fn voice_input_is_submitted_once() {
    let rig = rig(FakeGateway::default());
    rig.recognizer.push_text("안녕");
    let chat = Arc::new(FakeChat::default());
    chat.push(ChatMode::Chat, "반가워요.");
    let handle = AssistantFlow::spawn(chat.clone(), rig.voice.clone(), FlowTimings::default());

    handle.send(UserInput::StartListening);
    handle.send(UserInput::StartListening);
    settle(2_100).await;
    assert_eq!(rig.recognizer.sessions(), 1);
    assert_eq!(chat.requests(), vec![("안녕".to_string(), ChatMode::Chat)]);
    assert_eq!(handle.view().assistant_message.as_deref(), Some("반가워요."));
}

#[tokio::test(start_paused = true)]
async fn taps_repeat_messages() {
    let rig = rig(FakeGateway::default());
    let chat = Arc::new(FakeChat::default());
    chat.push(ChatMode::Chat, "반가워요.");
    let handle = AssistantFlow::spawn(chat.clone(), rig.voice.clone(), FlowTimings::default());
    handle.send(UserInput::Text("안녕".into()));
    settle(10).await;
    let before = handle.view();

    handle.tap(ContentRegion::UserMessage);
    settle(10).await;
    handle.tap(ContentRegion::AssistantMessage);
    settle(10).await;
    handle.tap(ContentRegion::AssistantMessage);
    settle(10).await;
    assert_eq!(spoken_count(&rig.speech, "안녕"), 1);
    assert_eq!(spoken_count(&rig.speech, "반가워요."), 3);
    assert_eq!(handle.view(), before);

    handle.swipe(SwipeIntent::Backward);
    assert_eq!(handle.finished().await, FlowExit::Home);
}
