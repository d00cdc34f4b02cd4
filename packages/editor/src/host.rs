//! Host-supplied confirmation and prompt capabilities.
//!
//! Destructive table commands and media link entry route through these
//! injected hooks; the core decides *when* to ask, the host decides how the
//! question is rendered.

/// Confirmation/prompt surface supplied by the hosting form.
pub trait HostPrompts {
    /// Ask the user to confirm a destructive operation.
    fn confirm(&self, message: &str) -> bool;

    /// Ask the user for a string value. `None` means cancelled.
    fn prompt(&self, message: &str) -> Option<String>;
}

/// Prompt surface that answers every question the same way. Useful as a
/// default and in tests.
#[derive(Debug, Clone, Default)]
pub struct StaticPrompts {
    /// Answer given to every `confirm` call.
    pub accept: bool,
    /// Answer given to every `prompt` call.
    pub reply: Option<String>,
}

impl HostPrompts for StaticPrompts {
    fn confirm(&self, _message: &str) -> bool {
        self.accept
    }

    fn prompt(&self, _message: &str) -> Option<String> {
        self.reply.clone()
    }
}
