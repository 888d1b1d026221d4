//! Scripted process controller and recording indicator sink.

#![allow(clippy::unwrap_used)]

use crate::{
    CommandOutput, ControllerError, ControllerResult, IndicatorImage, IndicatorSink,
    LifecycleConfig, MenuItemId, MenuLabels, ProcessController, ServiceAction,
};

use std::{
    collections::VecDeque,
    panic::Location,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use error_location::ErrorLocation;

/// Long enough to trip any timeout used in tests.
const HANG: Duration = Duration::from_secs(3600);

/// Scripted answer to a status or detail query.
#[derive(Debug, Clone)]
pub(crate) enum Reply {
    Text(String),
    /// Answers `text` once `delay` has elapsed.
    Delayed(Duration, String),
    Hang,
    Fail(String),
}

impl Reply {
    pub(crate) fn text(s: &str) -> Self {
        Self::Text(s.to_string())
    }

    pub(crate) fn after(delay: Duration, s: &str) -> Self {
        Self::Delayed(delay, s.to_string())
    }

    async fn resolve(self) -> ControllerResult<String> {
        match self {
            Self::Text(text) => Ok(text),
            Self::Delayed(delay, text) => {
                tokio::time::sleep(delay).await;
                Ok(text)
            }
            Self::Hang => {
                tokio::time::sleep(HANG).await;
                Ok(String::new())
            }
            Self::Fail(reason) => Err(io_error(reason)),
        }
    }
}

/// Scripted answer to a start/stop/restart command.
#[derive(Debug, Clone)]
pub(crate) enum CommandReply {
    Exit {
        code: i32,
        stdout: String,
        stderr: String,
    },
    Hang,
    Fail(String),
}

impl CommandReply {
    pub(crate) fn ok() -> Self {
        Self::Exit {
            code: 0,
            stdout: String::new(),
            stderr: String::new(),
        }
    }

    pub(crate) fn exit(code: i32, stdout: &str, stderr: &str) -> Self {
        Self::Exit {
            code,
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
        }
    }
}

/// Process controller answering from a queue of status tokens, then a
/// fallback token once the queue is empty.
pub(crate) struct ScriptedController {
    statuses: Mutex<VecDeque<Reply>>,
    fallback: Mutex<Reply>,
    detail: Mutex<Reply>,
    command: Mutex<CommandReply>,
    listing: Mutex<Vec<String>>,
    listing_delay: Mutex<Duration>,
    queries: AtomicUsize,
    commands: Mutex<Vec<ServiceAction>>,
}

impl ScriptedController {
    pub(crate) fn new(fallback: &str) -> Arc<Self> {
        Self::with_fallback(Reply::text(fallback))
    }

    pub(crate) fn with_fallback(fallback: Reply) -> Arc<Self> {
        Arc::new(Self {
            statuses: Mutex::new(VecDeque::new()),
            fallback: Mutex::new(fallback),
            detail: Mutex::new(Reply::text("")),
            command: Mutex::new(CommandReply::ok()),
            listing: Mutex::new(Vec::new()),
            listing_delay: Mutex::new(Duration::ZERO),
            queries: AtomicUsize::new(0),
            commands: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn push_statuses(&self, tokens: &[&str]) {
        let mut statuses = self.statuses.lock().unwrap();
        statuses.extend(tokens.iter().map(|t| Reply::text(t)));
    }

    pub(crate) fn push_replies(&self, replies: &[Reply]) {
        let mut statuses = self.statuses.lock().unwrap();
        statuses.extend(replies.iter().cloned());
    }

    pub(crate) fn set_fallback(&self, reply: Reply) {
        *self.fallback.lock().unwrap() = reply;
    }

    pub(crate) fn set_detail(&self, reply: Reply) {
        *self.detail.lock().unwrap() = reply;
    }

    pub(crate) fn set_command(&self, reply: CommandReply) {
        *self.command.lock().unwrap() = reply;
    }

    pub(crate) fn set_listing(&self, entries: &[&str]) {
        *self.listing.lock().unwrap() = entries.iter().map(|e| e.to_string()).collect();
    }

    pub(crate) fn set_listing_delay(&self, delay: Duration) {
        *self.listing_delay.lock().unwrap() = delay;
    }

    pub(crate) fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    pub(crate) fn commands(&self) -> Vec<ServiceAction> {
        self.commands.lock().unwrap().clone()
    }
}

impl ProcessController for ScriptedController {
    async fn query(&self, _service: &str, _timeout: Duration) -> ControllerResult<String> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        let reply = {
            let mut statuses = self.statuses.lock().unwrap();
            statuses
                .pop_front()
                .unwrap_or_else(|| self.fallback.lock().unwrap().clone())
        };
        reply.resolve().await
    }

    async fn status_detail(&self, _service: &str, _timeout: Duration) -> ControllerResult<String> {
        let reply = self.detail.lock().unwrap().clone();
        reply.resolve().await
    }

    async fn command(
        &self,
        action: ServiceAction,
        _service: &str,
        _timeout: Duration,
    ) -> ControllerResult<CommandOutput> {
        self.commands.lock().unwrap().push(action);
        let reply = self.command.lock().unwrap().clone();
        match reply {
            CommandReply::Exit {
                code,
                stdout,
                stderr,
            } => Ok(CommandOutput {
                exit_code: Some(code),
                stdout,
                stderr,
            }),
            CommandReply::Hang => {
                tokio::time::sleep(HANG).await;
                Ok(CommandOutput::default())
            }
            CommandReply::Fail(reason) => Err(io_error(reason)),
        }
    }

    async fn list_details(&self, _service: &str, _timeout: Duration) -> ControllerResult<Vec<String>> {
        let delay = *self.listing_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        Ok(self.listing.lock().unwrap().clone())
    }
}

#[track_caller]
fn io_error(reason: String) -> ControllerError {
    ControllerError::Io {
        reason,
        location: ErrorLocation::from(Location::caller()),
    }
}

/// Everything the controller pushed to the indicator, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SinkEvent {
    Image(IndicatorImage),
    Title(String),
    Enabled(MenuItemId, bool),
    Label(MenuItemId, String),
    Notify { title: String, body: String },
}

#[derive(Default)]
pub(crate) struct RecordingSink {
    events: Mutex<Vec<SinkEvent>>,
}

impl RecordingSink {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn events(&self) -> Vec<SinkEvent> {
        self.events.lock().unwrap().clone()
    }

    pub(crate) fn images(&self) -> Vec<IndicatorImage> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                SinkEvent::Image(image) => Some(image),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn last_image(&self) -> Option<IndicatorImage> {
        self.images().last().copied()
    }

    pub(crate) fn last_title(&self) -> Option<String> {
        self.events().into_iter().rev().find_map(|e| match e {
            SinkEvent::Title(title) => Some(title),
            _ => None,
        })
    }

    pub(crate) fn last_enabled(&self, item: MenuItemId) -> Option<bool> {
        self.events().into_iter().rev().find_map(|e| match e {
            SinkEvent::Enabled(i, enabled) if i == item => Some(enabled),
            _ => None,
        })
    }

    pub(crate) fn last_label(&self, item: MenuItemId) -> Option<String> {
        self.events().into_iter().rev().find_map(|e| match e {
            SinkEvent::Label(i, label) if i == item => Some(label),
            _ => None,
        })
    }

    pub(crate) fn notifications(&self) -> Vec<(String, String)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                SinkEvent::Notify { title, body } => Some((title, body)),
                _ => None,
            })
            .collect()
    }

    fn record(&self, event: SinkEvent) {
        self.events.lock().unwrap().push(event);
    }
}

impl IndicatorSink for RecordingSink {
    fn set_image(&self, image: IndicatorImage) {
        self.record(SinkEvent::Image(image));
    }

    fn set_title(&self, title: &str) {
        self.record(SinkEvent::Title(title.to_string()));
    }

    fn set_menu_enabled(&self, item: MenuItemId, enabled: bool) {
        self.record(SinkEvent::Enabled(item, enabled));
    }

    fn set_menu_label(&self, item: MenuItemId, label: &str) {
        self.record(SinkEvent::Label(item, label.to_string()));
    }

    fn notify(&self, title: &str, body: &str) {
        self.record(SinkEvent::Notify {
            title: title.to_string(),
            body: body.to_string(),
        });
    }
}

/// Reference tunables with Ollama naming.
pub(crate) fn test_config() -> LifecycleConfig {
    LifecycleConfig {
        labels: MenuLabels {
            display_name: "Ollama".to_string(),
            detail_label: "Models".to_string(),
            max_details: 3,
        },
        ..LifecycleConfig::new("ollama")
    }
}
