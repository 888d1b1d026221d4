use crate::{
    IndicatorImage, LifecycleController, MenuItemId, ServiceAction, ServiceState,
    tests::support::{CommandReply, RecordingSink, Reply, ScriptedController, test_config},
};

use std::{sync::Arc, time::Duration};

type TestController = LifecycleController<Arc<ScriptedController>, Arc<RecordingSink>>;

#[allow(clippy::unwrap_used)]
fn controller(process: &Arc<ScriptedController>, sink: &Arc<RecordingSink>) -> TestController {
    LifecycleController::new(test_config(), Arc::clone(process), Arc::clone(sink)).unwrap()
}

/// WHAT: Construction shows the placeholder Stopped state
/// WHY: The indicator must never be blank before the first probe lands
#[tokio::test(start_paused = true)]
async fn given_new_controller_when_constructed_then_static_stopped_is_displayed() {
    // Given: A controller whose service is running
    let process = ScriptedController::new("active");
    let sink = RecordingSink::new();

    // When: Constructing without starting the monitor
    let controller = controller(&process, &sink);

    // Then: Placeholder Stopped is shown statically and nothing was probed
    assert_eq!(controller.state(), ServiceState::Stopped);
    assert_eq!(
        sink.last_image(),
        Some(IndicatorImage::Static(ServiceState::Stopped))
    );
    assert_eq!(sink.last_title().as_deref(), Some("Ollama - Stopped"));
    assert_eq!(process.query_count(), 0);
}

/// WHAT: Construction outside a runtime is rejected
/// WHY: Tickers and actions need somewhere to run
#[test]
fn given_no_runtime_when_constructing_then_runtime_unavailable_error() {
    // Given: No tokio runtime on this thread
    let process = ScriptedController::new("active");
    let sink = RecordingSink::new();

    // When: Constructing the controller
    let result = LifecycleController::new(test_config(), process, sink);

    // Then: RuntimeUnavailable is reported
    assert!(matches!(
        result,
        Err(crate::CoreError::RuntimeUnavailable { .. })
    ));
}

/// WHAT: An "active" probe yields Running with Stop and Restart enabled
/// WHY: Only a running service can be stopped or restarted
#[tokio::test(start_paused = true)]
async fn given_active_probe_when_refreshing_then_running_with_stop_and_restart_enabled() {
    // Given: A service reporting active
    let process = ScriptedController::new("active");
    let sink = RecordingSink::new();
    let controller = controller(&process, &sink);

    // When: Refreshing
    let state = controller.refresh().await;

    // Then: Running, with toggle labelled Stop and both affordances enabled
    assert_eq!(state, ServiceState::Running);
    let menu = controller.menu();
    assert_eq!(menu.toggle, "Stop Ollama");
    assert!(menu.toggle_enabled);
    assert!(menu.restart_enabled);
    assert_eq!(sink.last_enabled(MenuItemId::Toggle), Some(true));
    assert_eq!(sink.last_enabled(MenuItemId::Restart), Some(true));
    assert_eq!(
        sink.last_label(MenuItemId::Toggle).as_deref(),
        Some("Stop Ollama")
    );
    assert_eq!(
        sink.last_image(),
        Some(IndicatorImage::Static(ServiceState::Running))
    );
}

/// WHAT: Toggle from Running is Stopping immediately, then Stopped after three polls
/// WHY: Settle-polling stops at the first probe that reports the target
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_running_when_toggled_then_stopping_immediately_and_stopped_after_three_polls() {
    // Given: A running service that takes three polls to report inactive
    let process = ScriptedController::new("active");
    let sink = RecordingSink::new();
    let controller = controller(&process, &sink);
    controller.refresh().await;
    process.push_statuses(&["active", "active", "inactive"]);

    // When: Toggling
    let action = controller.toggle().unwrap();

    // Then: Stopping is observable before the action resolves
    assert_eq!(controller.state(), ServiceState::Stopping);
    assert!(controller.is_animating());
    assert!(!controller.menu().toggle_enabled);
    assert!(
        sink.notifications()
            .contains(&("Ollama".to_string(), "Stopping Ollama...".to_string()))
    );

    // And: It settles on Stopped after exactly three settle probes
    let final_state = action.await.unwrap();
    assert_eq!(final_state, ServiceState::Stopped);
    assert_eq!(controller.state(), ServiceState::Stopped);
    assert_eq!(process.query_count(), 1 + 3);
    assert_eq!(process.commands(), vec![ServiceAction::Stop]);
    assert!(!controller.is_animating());
    assert!(!controller.action_in_flight());
    assert_eq!(
        sink.last_image(),
        Some(IndicatorImage::Static(ServiceState::Stopped))
    );
}

/// WHAT: A failing start command goes straight to Error without polling
/// WHY: A failed command will not settle, and its diagnostic must reach the user
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_stopped_when_start_exits_non_zero_then_error_without_settle_polling() {
    // Given: A stopped service whose start command fails
    let process = ScriptedController::new("inactive");
    process.set_command(CommandReply::exit(1, "", "unit not found"));
    let sink = RecordingSink::new();
    let controller = controller(&process, &sink);
    controller.refresh().await;

    // When: Toggling
    let final_state = controller.toggle().unwrap().await.unwrap();

    // Then: Error with the stderr text, and no settle probes were made
    assert_eq!(final_state, ServiceState::Error);
    let snapshot = controller.snapshot();
    assert_eq!(snapshot.state, ServiceState::Error);
    assert!(
        snapshot
            .last_error
            .as_deref()
            .unwrap()
            .contains("unit not found")
    );
    assert_eq!(process.query_count(), 1);
    assert!(
        sink.notifications()
            .iter()
            .any(|(_, body)| body.starts_with("Failed to start:"))
    );
    assert!(controller.menu().show_error_enabled);
}

/// WHAT: Exhausted settle budget adopts the final probe, even if transitional
/// WHY: The display must not claim a state it never observed
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_start_never_settles_when_budget_exhausted_then_final_probe_is_adopted() {
    // Given: A stopped service that reports activating forever after start
    let process = ScriptedController::new("activating");
    process.push_statuses(&["inactive"]);
    let sink = RecordingSink::new();
    let controller = controller(&process, &sink);
    controller.refresh().await;

    // When: Toggling and waiting for the action
    let final_state = controller.toggle().unwrap().await.unwrap();

    // Then: Twenty settle probes plus one final probe, ending in Starting
    assert_eq!(final_state, ServiceState::Starting);
    assert_eq!(controller.state(), ServiceState::Starting);
    assert_eq!(process.query_count(), 1 + 20 + 1);
    assert!(!controller.action_in_flight());

    // And: The existing animation continues rather than restarting
    assert!(controller.is_animating());
    assert_eq!(controller.tickers_started(), 1);
}

/// WHAT: Show last error with nothing recorded is a no-op
/// WHY: An empty notification tells the user nothing
#[tokio::test(start_paused = true)]
async fn given_no_last_error_when_showing_last_error_then_nothing_is_notified() {
    // Given: A healthy controller
    let process = ScriptedController::new("active");
    let sink = RecordingSink::new();
    let controller = controller(&process, &sink);
    controller.refresh().await;

    // When: Requesting the last error
    let shown = controller.show_last_error();

    // Then: Nothing happens
    assert!(!shown);
    assert!(sink.notifications().is_empty());
    assert!(!controller.menu().show_error_enabled);
}

/// WHAT: Show last error notifies the first 200 characters
/// WHY: Notifications have limited room
#[tokio::test(start_paused = true)]
async fn given_long_last_error_when_showing_last_error_then_truncated_notification() {
    // Given: A recorded error longer than the notification limit
    let process = ScriptedController::new("active");
    let sink = RecordingSink::new();
    let controller = controller(&process, &sink);
    controller.set_state(ServiceState::Error, Some("x".repeat(450)));

    // When: Requesting the last error
    let shown = controller.show_last_error();

    // Then: One notification with a 200 character body
    assert!(shown);
    let notifications = sink.notifications();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].0, "Ollama Error");
    assert_eq!(notifications[0].1.chars().count(), 200);
}

/// WHAT: last_error survives later non-error transitions
/// WHY: It is diagnostic history, not part of the active state
#[tokio::test(start_paused = true)]
async fn given_recorded_error_when_service_recovers_then_last_error_is_sticky() {
    // Given: An error was recorded
    let process = ScriptedController::new("active");
    let sink = RecordingSink::new();
    let controller = controller(&process, &sink);
    controller.set_state(ServiceState::Error, Some("boom".to_string()));

    // When: The service recovers
    controller.set_state(ServiceState::Running, None);

    // Then: The error is kept until cleared
    assert_eq!(controller.snapshot().last_error.as_deref(), Some("boom"));
    assert_eq!(
        sink.last_label(MenuItemId::ShowLastError).as_deref(),
        Some("Show Last Error")
    );

    controller.clear_last_error();
    assert_eq!(controller.snapshot().last_error, None);
    assert_eq!(sink.last_enabled(MenuItemId::ShowLastError), Some(false));
}

/// WHAT: Toggle and restart are rejected during a transition
/// WHY: Only one action may be in flight
#[tokio::test(start_paused = true)]
async fn given_transitional_state_when_toggling_or_restarting_then_rejected() {
    // Given: A transition in progress
    let process = ScriptedController::new("active");
    let sink = RecordingSink::new();
    let controller = controller(&process, &sink);
    controller.set_state(ServiceState::Starting, None);

    // When/Then: Both commands are rejected without touching the service
    assert!(controller.toggle().is_none());
    assert!(controller.restart().is_none());
    assert!(process.commands().is_empty());
    assert_eq!(controller.state(), ServiceState::Starting);
}

/// WHAT: A second toggle while the first is in flight is rejected
/// WHY: Commands are not queued
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_action_in_flight_when_toggling_again_then_rejected() {
    // Given: A stop in flight
    let process = ScriptedController::new("active");
    let sink = RecordingSink::new();
    let controller = controller(&process, &sink);
    controller.refresh().await;
    let first = controller.toggle().unwrap();

    // When: Toggling again
    let second = controller.toggle();

    // Then: Only the first is accepted
    assert!(second.is_none());
    process.push_statuses(&["inactive"]);
    first.await.unwrap();
    assert_eq!(process.commands(), vec![ServiceAction::Stop]);
}

/// WHAT: Restart from Running passes through Starting back to Running
/// WHY: Restart shares the start settle target
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_running_when_restarted_then_starting_then_running() {
    // Given: A running service
    let process = ScriptedController::new("active");
    let sink = RecordingSink::new();
    let controller = controller(&process, &sink);
    controller.refresh().await;
    process.push_statuses(&["activating"]);

    // When: Restarting
    let action = controller.restart().unwrap();
    assert_eq!(controller.state(), ServiceState::Starting);

    // Then: Settles on Running on the second poll
    assert_eq!(action.await.unwrap(), ServiceState::Running);
    assert_eq!(process.commands(), vec![ServiceAction::Restart]);
    assert_eq!(process.query_count(), 1 + 2);
    assert!(
        sink.notifications()
            .contains(&("Ollama".to_string(), "Restarting Ollama...".to_string()))
    );
}

/// WHAT: Restart is unavailable unless Running
/// WHY: Restarting a stopped service is a start, which toggle covers
#[tokio::test(start_paused = true)]
async fn given_stopped_when_restarting_then_rejected() {
    // Given: A stopped service
    let process = ScriptedController::new("inactive");
    let sink = RecordingSink::new();
    let controller = controller(&process, &sink);
    controller.refresh().await;

    // When/Then: Restart is rejected
    assert!(controller.restart().is_none());
    assert!(!controller.menu().restart_enabled);
}

/// WHAT: A probe error during settle-polling ends the action in Error
/// WHY: Polling must not continue through a failure
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_start_when_service_fails_while_settling_then_error_with_detail() {
    // Given: A service that fails on the second poll after start
    let process = ScriptedController::new("activating");
    process.push_statuses(&["inactive", "activating", "failed"]);
    process.set_detail(Reply::text("main process exited, code=1"));
    let sink = RecordingSink::new();
    let controller = controller(&process, &sink);
    controller.refresh().await;

    // When: Toggling
    let final_state = controller.toggle().unwrap().await.unwrap();

    // Then: Error carrying the extended status, after two polls
    assert_eq!(final_state, ServiceState::Error);
    assert_eq!(process.query_count(), 1 + 2);
    let last_error = controller.snapshot().last_error.unwrap();
    assert!(last_error.starts_with("Service failed:\n"));
    assert!(last_error.contains("main process exited"));
    assert!(!controller.is_animating());
}

/// WHAT: Toggle from Running never flips back to Running without evidence
/// WHY: Stop resolves to Stopped or Error only
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_stop_command_times_out_when_toggled_then_error_not_running() {
    // Given: A running service whose stop command hangs
    let process = ScriptedController::new("active");
    process.set_command(CommandReply::Hang);
    let sink = RecordingSink::new();
    let controller = controller(&process, &sink);
    controller.refresh().await;

    // When: Toggling
    let final_state = controller.toggle().unwrap().await.unwrap();

    // Then: Error after the action timeout, never Running
    assert_eq!(final_state, ServiceState::Error);
    assert_eq!(
        controller.snapshot().last_error.as_deref(),
        Some("Timeout running stop command")
    );
    assert!(
        sink.images()
            .iter()
            .skip_while(|i| **i != IndicatorImage::Animated {
                state: ServiceState::Stopping,
                frame: 0
            })
            .all(|i| i.state() != ServiceState::Running)
    );
}

/// WHAT: Details are fetched when an action settles on Running
/// WHY: The details line should not wait for the next monitor tick
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_start_when_running_then_details_line_lists_entries() {
    // Given: A stopped service with four installed models
    let process = ScriptedController::new("active");
    process.push_statuses(&["inactive"]);
    process.set_listing(&["llama3", "mistral", "phi3", "gemma"]);
    let sink = RecordingSink::new();
    let controller = controller(&process, &sink);
    controller.refresh().await;
    assert_eq!(controller.menu().details, "Models: (offline)");

    // When: Starting and letting the listing land
    controller.toggle().unwrap().await.unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;

    // Then: The first three are listed with an ellipsis
    assert_eq!(
        sink.last_label(MenuItemId::Details).as_deref(),
        Some("Models: llama3, mistral, phi3...")
    );
}

/// WHAT: Actions finishing after shutdown leave the display alone
/// WHY: No indicator updates may be enqueued once shutdown begins
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_action_in_flight_when_shut_down_then_result_is_not_displayed() {
    // Given: A stop in flight
    let process = ScriptedController::new("inactive");
    process.push_statuses(&["active"]);
    let sink = RecordingSink::new();
    let controller = controller(&process, &sink);
    controller.refresh().await;
    let action = controller.toggle().unwrap();

    // When: Shutting down before it resolves
    controller.shutdown();
    let events_at_shutdown = sink.events().len();
    let final_state = action.await.unwrap();

    // Then: The action completed, but nothing more reached the sink
    assert_eq!(final_state, ServiceState::Stopped);
    assert_eq!(controller.state(), ServiceState::Stopping);
    assert_eq!(sink.events().len(), events_at_shutdown);
    assert!(!controller.is_animating());

    // And: Later commands are rejected
    controller.set_state(ServiceState::Running, None);
    assert_eq!(controller.state(), ServiceState::Stopping);
    assert!(controller.toggle().is_none());
}

/// WHAT: A slow details listing does not hold back the settled state
/// WHY: Running must show as soon as a probe confirms it
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_slow_listing_when_start_settles_then_running_shown_before_details() {
    // Given: A stopped service whose listing takes two seconds
    let process = ScriptedController::new("active");
    process.push_statuses(&["inactive"]);
    process.set_listing(&["llama3"]);
    process.set_listing_delay(Duration::from_secs(2));
    let sink = RecordingSink::new();
    let controller = controller(&process, &sink);
    controller.refresh().await;
    let started = tokio::time::Instant::now();

    // When: Starting
    let final_state = controller.toggle().unwrap().await.unwrap();

    // Then: Running is displayed after the first settle probe
    assert_eq!(final_state, ServiceState::Running);
    assert_eq!(started.elapsed(), Duration::from_millis(500));
    assert_eq!(controller.state(), ServiceState::Running);
    assert!(!controller.is_animating());
    assert!(controller.menu().toggle_enabled);
    assert_eq!(
        sink.last_image(),
        Some(IndicatorImage::Static(ServiceState::Running))
    );
    assert_eq!(controller.menu().details, "Models: (none)");

    // And: The listing follows once it completes
    tokio::time::sleep(Duration::from_millis(2_010)).await;
    assert_eq!(
        sink.last_label(MenuItemId::Details).as_deref(),
        Some("Models: llama3")
    );
}

/// WHAT: A listing that completes after the service left Running is dropped
/// WHY: Details belong to the run they were fetched for
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_pending_listing_when_service_stopped_then_listing_discarded() {
    // Given: A running service whose listing takes two seconds
    let process = ScriptedController::new("inactive");
    process.push_statuses(&["active"]);
    process.set_listing(&["llama3"]);
    process.set_listing_delay(Duration::from_secs(2));
    let sink = RecordingSink::new();
    let controller = controller(&process, &sink);
    assert_eq!(controller.refresh().await, ServiceState::Running);

    // When: Stopping before the listing arrives
    let final_state = controller.toggle().unwrap().await.unwrap();
    tokio::time::sleep(Duration::from_secs(3)).await;

    // Then: The stopped display keeps the offline details line
    assert_eq!(final_state, ServiceState::Stopped);
    assert_eq!(controller.snapshot().details, None);
    assert_eq!(
        sink.last_label(MenuItemId::Details).as_deref(),
        Some("Models: (offline)")
    );
}
