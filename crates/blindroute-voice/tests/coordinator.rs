//! Coordinator behavior across announcer, channel and haptics.

use blindroute_voice::{
    ChannelState, HapticCue, PlaceholderRecognizer, PlaceholderSpeech, PlaceholderVibration,
    SpeechOutput, VoiceCoordinator, VoiceOutcome,
};
use std::sync::Arc;
use std::time::Duration;

struct Rig {
    voice: VoiceCoordinator,
    speech: Arc<PlaceholderSpeech>,
    recognizer: Arc<PlaceholderRecognizer>,
    motor: Arc<PlaceholderVibration>,
}

fn rig(playback: Duration, latency: Duration) -> Rig {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("debug")
        .with_test_writer()
        .try_init();
    let speech = Arc::new(PlaceholderSpeech::with_playback(playback));
    let recognizer = Arc::new(PlaceholderRecognizer::with_latency(latency));
    let motor = Arc::new(PlaceholderVibration::new());
    Rig {
        voice: VoiceCoordinator::new(speech.clone(), recognizer.clone(), motor.clone()),
        speech,
        recognizer,
        motor,
    }
}

#[tokio::test(start_paused = true)]
async fn listening_cuts_off_the_announcement() {
    let rig = rig(Duration::from_secs(5), Duration::from_secs(2));
    rig.recognizer.push_text("강남역에서 서울역까지 가고 싶어");

    rig.voice.announce("안녕하세요, 저는 당신의 AI 비서 에이닷입니다.");
    tokio::time::sleep(Duration::from_millis(100)).await;

    let session = rig.voice.listen(100).expect("session");
    assert_eq!(rig.voice.channel_state(), ChannelState::Listening);
    assert!(rig.voice.listen(100).is_none());
    // announcer stop + channel stop
    assert_eq!(rig.speech.stop_count(), 2);

    let outcome = session.outcome().await;
    assert_eq!(outcome, VoiceOutcome::Result("강남역에서 서울역까지 가고 싶어".into()));
    assert_eq!(rig.recognizer.sessions(), 1);
    assert_eq!(rig.voice.channel_state(), ChannelState::Idle);
}

#[tokio::test(start_paused = true)]
async fn repeated_announcements_speak_each_time() {
    let rig = rig(Duration::ZERO, Duration::ZERO);
    for _ in 0..3 {
        rig.voice.announce("\"160번\", 도봉산 방면.");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(rig.speech.spoken_content(), vec!["\"160번\", 도봉산 방면."; 3]);
}

#[tokio::test(start_paused = true)]
async fn cues_reach_the_motor() {
    let rig = rig(Duration::ZERO, Duration::ZERO);
    rig.voice.cue(HapticCue::ScreenEntry);
    rig.voice.cue(HapticCue::Arrival);
    assert_eq!(
        rig.motor.pulses(),
        vec![Duration::from_millis(500), Duration::from_millis(8000)]
    );
}

#[tokio::test]
async fn placeholder_speech_is_ok() {
    let speech = PlaceholderSpeech::new();
    tokio_test::assert_ok!(speech.speak("버스가 도착했습니다.").await);
}
