//! Notification log for handler discovery.
//!
//! Discovery reports its outcome through an [`EventLog`] instead of printing: one
//! [`EventKind::HandlerFound`] carrying both tokens on success, one
//! [`EventKind::HandlerNotFound`] on failure, and optional
//! [`EventKind::AmbiguousHandler`] warnings depending on the configured policy.
//!
//! Every recorded event is also forwarded to the [`log`] facade at the matching level, so a
//! binary that installs a logger sees discovery without inspecting the log itself.
//!
//! # Example
//!
//! ```rust
//! use vmscope::{EventKind, EventLog, Token};
//!
//! let log = EventLog::new();
//! log.record(EventKind::HandlerFound)
//!     .vm_type(Token::new(0x0200_0011))
//!     .method(Token::new(0x0600_0123))
//!     .message("found");
//!
//! assert!(log.has(EventKind::HandlerFound));
//! assert_eq!(log.len(), 1);
//! ```

use std::fmt;

use serde::Serialize;

use crate::metadata::token::Token;

/// Categories of events that can be logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// The VM function handler and its type were located.
    HandlerFound,
    /// No type contained a method matching any handler signature.
    HandlerNotFound,
    /// More than one type contained a qualifying method.
    AmbiguousHandler,
}

impl EventKind {
    /// Returns a human-readable description of this event kind.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::HandlerFound => "handler found",
            Self::HandlerNotFound => "handler not found",
            Self::AmbiguousHandler => "ambiguous handler",
        }
    }

    /// Level at which events of this kind are forwarded to the `log` facade.
    #[must_use]
    pub fn level(&self) -> log::Level {
        match self {
            Self::HandlerFound => log::Level::Info,
            Self::AmbiguousHandler => log::Level::Warn,
            Self::HandlerNotFound => log::Level::Error,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// A single logged event.
#[derive(Debug, Clone, Serialize)]
pub struct Event {
    /// The type of event.
    pub kind: EventKind,
    /// The type the event refers to (if applicable).
    pub vm_type: Option<Token>,
    /// The method the event refers to (if applicable).
    pub method: Option<Token>,
    /// Human-readable description.
    pub message: String,
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}

/// Builder for creating events with a fluent API.
///
/// Created by [`EventLog::record`]. The event is automatically added
/// to the log when the builder is dropped.
pub struct EventBuilder<'a> {
    log: &'a EventLog,
    kind: EventKind,
    vm_type: Option<Token>,
    method: Option<Token>,
    message: Option<String>,
}

impl<'a> EventBuilder<'a> {
    fn new(log: &'a EventLog, kind: EventKind) -> Self {
        Self {
            log,
            kind,
            vm_type: None,
            method: None,
            message: None,
        }
    }

    /// Sets the type the event refers to.
    pub fn vm_type(mut self, token: Token) -> Self {
        self.vm_type = Some(token);
        self
    }

    /// Sets the method the event refers to.
    pub fn method(mut self, token: Token) -> Self {
        self.method = Some(token);
        self
    }

    /// Sets a custom message describing the event.
    pub fn message(mut self, msg: impl Into<String>) -> Self {
        self.message = Some(msg.into());
        self
    }
}

impl Drop for EventBuilder<'_> {
    fn drop(&mut self) {
        let message = self
            .message
            .take()
            .unwrap_or_else(|| self.kind.description().to_string());

        self.log.push(Event {
            kind: self.kind,
            vm_type: self.vm_type.take(),
            method: self.method.take(),
            message,
        });
    }
}

/// Collection of events from handler discovery.
///
/// This type is thread-safe: events can be appended concurrently from
/// multiple threads using shared references (`&self`).
#[derive(Debug)]
pub struct EventLog {
    events: boxcar::Vec<Event>,
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}

impl EventLog {
    /// Creates an empty event log.
    #[must_use]
    pub fn new() -> Self {
        Self {
            events: boxcar::Vec::new(),
        }
    }

    /// Returns true if no events have been logged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.count() == 0
    }

    /// Returns the total number of events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.count()
    }

    /// Starts building a new event of the given kind.
    ///
    /// The event is automatically added when the builder is dropped.
    pub fn record(&self, kind: EventKind) -> EventBuilder<'_> {
        EventBuilder::new(self, kind)
    }

    /// Merges another event log into this one.
    ///
    /// Merged events are not forwarded to the `log` facade a second time.
    pub fn merge(&self, other: &EventLog) {
        for event in other {
            self.events.push(event.clone());
        }
    }

    /// Returns true if any event of the given kind exists.
    #[must_use]
    pub fn has(&self, kind: EventKind) -> bool {
        self.iter().any(|e| e.kind == kind)
    }

    /// Counts events of the given kind.
    #[must_use]
    pub fn count_kind(&self, kind: EventKind) -> usize {
        self.iter().filter(|e| e.kind == kind).count()
    }

    /// Returns an iterator over all events.
    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.events.iter().map(|(_, e)| e)
    }

    /// Returns an iterator over events of a specific kind.
    pub fn filter_kind(&self, kind: EventKind) -> impl Iterator<Item = &Event> + '_ {
        self.iter().filter(move |e| e.kind == kind)
    }

    /// Returns an iterator over warning-level events.
    pub fn warnings(&self) -> impl Iterator<Item = &Event> + '_ {
        self.iter().filter(|e| e.kind.level() == log::Level::Warn)
    }

    fn push(&self, event: Event) {
        log::log!(target: "vmscope", event.kind.level(), "{}", event.message);
        self.events.push(event);
    }
}

/// Iterator wrapper for EventLog that yields &Event
pub struct EventLogIter<'a> {
    inner: boxcar::Iter<'a, Event>,
}

impl<'a> Iterator for EventLogIter<'a> {
    type Item = &'a Event;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, e)| e)
    }
}

impl<'a> IntoIterator for &'a EventLog {
    type Item = &'a Event;
    type IntoIter = EventLogIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        EventLogIter {
            inner: self.events.iter(),
        }
    }
}
