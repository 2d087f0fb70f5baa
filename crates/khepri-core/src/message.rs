//! Diagnostic messages emitted by the pipeline.
//!
//! The pipeline never panics and never returns errors from draw entry points;
//! anything noteworthy (out-of-range draw parameters, vertex-count parity
//! warnings) is reported through the context's message callback. With no
//! callback installed, messages land on the [`log`] facade instead so they
//! are never silently lost.

/// What kind of event a [`Message`] describes.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum MessageType {
    Error,
    Warning,
    Info,
}

/// How much the receiver should care.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum MessageSeverity {
    High,
    Medium,
    Low,
}

/// A single diagnostic event.
///
/// `source` names the pipeline operation that produced the message
/// (e.g. `"draw_buffer"`); `text` is human-readable.
#[derive(Debug)]
pub struct Message<'a> {
    pub ty: MessageType,
    pub severity: MessageSeverity,
    pub source: &'a str,
    pub text: &'a str,
}

pub(crate) type MessageCallback = Box<dyn FnMut(&Message<'_>)>;

/// Owns the optional user callback and the fallback routing to `log`.
#[derive(Default)]
pub(crate) struct MessageSink {
    callback: Option<MessageCallback>,
}

impl MessageSink {
    pub fn set_callback(&mut self, callback: Option<MessageCallback>) {
        self.callback = callback;
    }

    pub fn emit(&mut self, ty: MessageType, severity: MessageSeverity, source: &str, text: &str) {
        match &mut self.callback {
            Some(callback) => callback(&Message {
                ty,
                severity,
                source,
                text,
            }),
            None => match ty {
                MessageType::Error => log::error!(target: "khepri", "{source}: {text}"),
                MessageType::Warning => log::warn!(target: "khepri", "{source}: {text}"),
                MessageType::Info => log::info!(target: "khepri", "{source}: {text}"),
            },
        }
    }
}
