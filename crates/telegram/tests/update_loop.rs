mod common;

use std::sync::Arc;

use pharmabot_core::config::BotProfile;
use pharmabot_core::flows::FormState;
use pharmabot_db::SessionStore;
use pharmabot_telegram::api::{Chat, Message};
use pharmabot_telegram::replies;
use pharmabot_telegram::{
    BotApiError, DispatchOutcome, PollingRunner, ReconnectPolicy, Update, UpdateDispatcher,
};

use common::{harness, products, text_update, ScriptedBotApi, ADMIN, CHAT};

#[tokio::test]
async fn update_without_message_is_skipped() {
    let h = harness(BotProfile::Wholesale, products(), None);
    let api = Arc::new(ScriptedBotApi::default());
    let dispatcher = UpdateDispatcher::new(h.router.clone(), api.clone());

    let outcome = dispatcher.dispatch(&Update { update_id: 1, message: None }).await;

    assert_eq!(outcome, DispatchOutcome::NoMessage);
    assert!(api.sent.lock().await.is_empty());
}

#[tokio::test]
async fn message_without_text_is_ignored() {
    let h = harness(BotProfile::Wholesale, products(), None);
    let api = Arc::new(ScriptedBotApi::default());
    let dispatcher = UpdateDispatcher::new(h.router.clone(), api.clone());

    let photo = Update {
        update_id: 2,
        message: Some(Message { message_id: 2, chat: Chat { id: CHAT }, text: None }),
    };

    assert_eq!(dispatcher.dispatch(&photo).await, DispatchOutcome::Ignored);
    assert_eq!(dispatcher.dispatch(&text_update(3, CHAT, "   ")).await, DispatchOutcome::Ignored);
}

#[tokio::test]
async fn padded_text_is_classified_trimmed_but_recorded_verbatim() {
    let h = harness(BotProfile::Wholesale, products(), None);
    let api = Arc::new(ScriptedBotApi::default());
    let dispatcher = UpdateDispatcher::new(h.router.clone(), api.clone());

    let padded_label = format!(" {} \n", replies::ORDER_LABEL);
    dispatcher.dispatch(&text_update(1, CHAT, &padded_label)).await;
    dispatcher.dispatch(&text_update(2, CHAT, "  Ko Aung  ")).await;

    let session = h.sessions.load(CHAT).await;
    assert_eq!(session.state, FormState::Phone);
    assert_eq!(session.draft.name.as_deref(), Some("  Ko Aung  "));
}

#[tokio::test]
async fn send_failures_are_counted_not_raised() {
    let h = harness(BotProfile::Wholesale, products(), Some(ADMIN));
    let api = Arc::new(ScriptedBotApi::failing_for(vec![ADMIN]));
    let dispatcher = UpdateDispatcher::new(h.router.clone(), api.clone());

    let script = [replies::ORDER_LABEL, "Ko Aung", "09", "Mandalay", "Amlodipine 5mg x 1"];
    for (index, text) in script.iter().enumerate() {
        dispatcher.dispatch(&text_update(index as i64, CHAT, text)).await;
    }

    let outcome = dispatcher.dispatch(&text_update(10, CHAT, replies::CONFIRM_LABEL)).await;

    assert_eq!(outcome, DispatchOutcome::Handled { sent: 1, failed: 1 });
    assert_eq!(h.orders.records().await.len(), 1);
    let sent = api.sent.lock().await;
    assert_eq!(sent.last().map(|message| message.text.as_str()), Some(replies::ORDER_ACCEPTED));
}

#[tokio::test]
async fn polling_advances_offset_and_survives_transport_errors() {
    let h = harness(BotProfile::Wholesale, products(), None);
    let api = Arc::new(ScriptedBotApi::with_batches(vec![
        Err(BotApiError::Transport("connection reset".to_owned())),
        Ok(vec![text_update(5, CHAT, "/start"), Update { update_id: 6, message: None }]),
        Ok(vec![text_update(7, CHAT, "hello there")]),
    ]));
    let dispatcher = Arc::new(UpdateDispatcher::new(h.router.clone(), api.clone()));
    let runner = PollingRunner::new(
        api.clone(),
        dispatcher,
        ReconnectPolicy { base_delay_ms: 0, max_delay_ms: 0 },
        0,
    );

    let exhausted = api.exhausted.clone();
    let offset = runner
        .run_until(async move { exhausted.notified().await })
        .await
        .expect("polling loop should stop cleanly");

    assert_eq!(offset, 8);
    let offsets = api.offsets.lock().await;
    assert_eq!(&offsets[..4], &[0, 0, 7, 8]);

    let sent = api.sent.lock().await;
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].keyboard, Some(pharmabot_telegram::ReplyKeyboard::order()));
    assert_eq!(sent[1].text, "echo: hello there");
}
