//! # Editor Session
//!
//! The boundary between the editing core and its hosting form. A session
//! owns the live document, the selection, the transient media-drag state,
//! and the pending drop reads. It notifies the host after every committed
//! mutation and once more on blur, and it never persists anything itself:
//! the host holds the latest serialized content until an explicit save
//! outside this core.

use crate::commands::{Applied, Command};
use crate::document::Document;
use crate::drop::{DropMediator, DroppedFile, ObjectUrlRegistry, PendingImageRead};
use crate::errors::EditorError;
use crate::host::HostPrompts;
use crate::media::MediaInteraction;
use pressroom_schema::{has_color_styles, sanitize, Align, MediaAttrs, Node, NodeId};
use tracing::debug;

/// Current selection: the focused node, if any.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    pub focus: Option<NodeId>,
}

/// What the host should do with a paste event.
#[derive(Debug, Clone, PartialEq)]
pub enum PasteOutcome {
    /// Color-free paste: the default insertion path handles it.
    Default,

    /// The pasted HTML carried color styles. The event must be superseded
    /// by one carrying this cleaned HTML and the original text fallback,
    /// and default handling skipped.
    Synthesized { html: String, text: String },
}

/// One editing session over one article body.
pub struct EditorSession {
    document: Document,
    selection: Selection,
    media: MediaInteraction,
    drops: DropMediator,
    media_urls: ObjectUrlRegistry,
    prompts: Box<dyn HostPrompts>,
    on_change: Option<Box<dyn FnMut(&str)>>,
    placeholder: String,
}

impl EditorSession {
    /// Create a session from externally supplied content. The content is
    /// sanitized unconditionally before it enters the document.
    pub fn new(content: &str, prompts: Box<dyn HostPrompts>) -> Self {
        Self {
            document: Document::from_markup(content),
            selection: Selection::default(),
            media: MediaInteraction::new(),
            drops: DropMediator::new(),
            media_urls: ObjectUrlRegistry::new(),
            prompts,
            on_change: None,
            placeholder: String::new(),
        }
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    /// Register the host's change listener. Called with the serialized
    /// content after every committed mutation and on blur.
    pub fn set_on_change(&mut self, listener: impl FnMut(&str) + 'static) {
        self.on_change = Some(Box::new(listener));
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn serialize(&self) -> String {
        self.document.serialize()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn set_selection(&mut self, focus: Option<NodeId>) {
        self.selection.focus = focus;
    }

    /// Apply a command; a committed mutation bumps the version, reconciles
    /// object handles, and notifies the host.
    pub fn apply(&mut self, command: Command) -> Result<Applied, EditorError> {
        let applied = command.apply(&mut self.document, &self.selection)?;
        if applied == Applied::Mutated {
            self.document.version += 1;
            debug!(version = self.document.version, ?command, "command applied");
            self.commit();
        }
        Ok(applied)
    }

    fn commit(&mut self) {
        let in_use = self.document.media_srcs();
        self.media_urls.retain_used(&in_use);
        self.emit_change();
    }

    fn emit_change(&mut self) {
        let markup = self.document.serialize();
        if let Some(listener) = self.on_change.as_mut() {
            listener(&markup);
        }
    }

    /// Focus left the editor: emit one final change notification with the
    /// current content, even if the last edit already emitted one.
    pub fn on_blur(&mut self) {
        self.emit_change();
    }

    /// The externally supplied content value changed.
    ///
    /// Resets the document when it is empty or the sanitized external
    /// value differs from the current serialization. History and transient
    /// interaction state do not survive the reset.
    pub fn set_content(&mut self, external: &str) {
        let clean = sanitize(external);
        if !self.document.is_empty() && clean == self.document.serialize() {
            return;
        }
        debug!("external content change, resetting document");
        self.document = Document::from_markup(&clean);
        self.selection = Selection::default();
        self.media.clear();
        self.drops.clear();
        self.media_urls.release_all();
    }

    /// Clipboard paste. Only HTML carrying color declarations goes through
    /// sanitization; everything else stays on the default insertion path.
    pub fn on_paste(&mut self, html: Option<&str>, text: &str) -> PasteOutcome {
        let Some(html) = html else {
            return PasteOutcome::Default;
        };
        if !has_color_styles(html) {
            return PasteOutcome::Default;
        }

        let clean = sanitize(html);
        let nodes = self.document.parse_fragment(&clean);
        if !nodes.is_empty() {
            self.insert_blocks(nodes);
        }
        PasteOutcome::Synthesized {
            html: clean,
            text: text.to_string(),
        }
    }

    fn insert_blocks(&mut self, nodes: Vec<Node>) {
        let mut at = self
            .selection
            .focus
            .as_deref()
            .and_then(|id| self.document.top_level_index(id))
            .map(|i| i + 1)
            .unwrap_or(self.document.nodes().len());
        for node in nodes {
            self.document.insert_at_path(&[at], node);
            at += 1;
        }
        self.document.version += 1;
        self.commit();
    }

    // ---- Drop mediation -------------------------------------------------

    /// Files dropped onto the document. Returns whether the event was
    /// consumed; unconsumed events fall through to default drop handling.
    ///
    /// Only the first file is considered. Images are read asynchronously by
    /// the host (redeem with [`complete_image_read`]); videos get an object
    /// handle synchronously and are inserted at once. The asymmetry is
    /// intentional.
    ///
    /// [`complete_image_read`]: EditorSession::complete_image_read
    pub fn on_drop(&mut self, files: &[DroppedFile], position: Option<&str>) -> bool {
        let Some(file) = files.first() else {
            return false;
        };
        if !file.is_image() && !file.is_video() {
            // Unconsumed: default handling takes over, selection untouched.
            return false;
        }
        if let Some(target) = position {
            self.selection.focus = Some(target.to_string());
        }

        if file.is_image() {
            let token = self.drops.begin_image_read(file);
            debug!(token, file = %file.name, "image drop, read pending");
        } else {
            let url = self.media_urls.create(&file.name);
            let id = self.document.new_id();
            let node = Node::Video {
                id,
                attrs: MediaAttrs::new(url),
            };
            // Insertion errors cannot occur for ReplaceSelection.
            let _ = self.apply(Command::ReplaceSelection { node });
        }
        true
    }

    /// The host finished reading a dropped image into a data URI. Inserts
    /// at whatever the selection is *now*, not at drop time.
    pub fn complete_image_read(&mut self, token: u64, data_uri: &str) -> bool {
        if self.drops.take_pending(token).is_none() {
            return false;
        }
        let id = self.document.new_id();
        let node = Node::Image {
            id,
            attrs: MediaAttrs::new(data_uri),
        };
        let _ = self.apply(Command::ReplaceSelection { node });
        true
    }

    pub fn pending_image_reads(&self) -> &[PendingImageRead] {
        self.drops.pending_reads()
    }

    /// Live object handles (for leak assertions and host cleanup).
    pub fn live_object_urls(&self) -> usize {
        self.media_urls.live_count()
    }

    // ---- Media interaction ----------------------------------------------

    pub fn begin_media_resize(&mut self, id: &str, pointer_x: f64) {
        self.media.begin_resize(&self.document, id, pointer_x);
    }

    /// Pointer moved during a resize drag: write the clamped width on every
    /// sample.
    pub fn media_resize_moved(&mut self, id: &str, pointer_x: f64) {
        if let Some(width) = self.media.resize_width(id, pointer_x) {
            let _ = self.apply(Command::SetMediaWidth {
                id: id.to_string(),
                width,
            });
        }
    }

    pub fn end_media_resize(&mut self, id: &str) {
        self.media.end_resize(id);
    }

    pub fn set_media_align(&mut self, id: &str, align: Align) -> Result<Applied, EditorError> {
        self.apply(Command::SetMediaAlign {
            id: id.to_string(),
            align,
        })
    }

    /// Single link toggle on a media node. Without an existing link, prompt
    /// for a URL (empty or localhost answers change nothing); with one, a
    /// pure detach, no prompt.
    pub fn toggle_media_link(&mut self, id: &str) -> Result<Applied, EditorError> {
        let has_link = self
            .document
            .find(id)
            .and_then(|n| n.media_attrs())
            .is_some_and(|a| a.href.is_some());

        if has_link {
            return self.apply(Command::ClearMediaHref { id: id.to_string() });
        }

        match self.prompts.prompt("Enter link URL") {
            Some(href) if !href.trim().is_empty() => self.apply(Command::SetMediaHref {
                id: id.to_string(),
                href,
            }),
            _ => Ok(Applied::Noop),
        }
    }

    // ---- Table commands -------------------------------------------------

    pub fn insert_table(&mut self, rows: usize, cols: usize) -> Result<Applied, EditorError> {
        self.apply(Command::InsertTable { rows, cols })
    }

    pub fn add_row_before(&mut self) -> Result<Applied, EditorError> {
        self.apply(Command::AddRowBefore)
    }

    pub fn add_row_after(&mut self) -> Result<Applied, EditorError> {
        self.apply(Command::AddRowAfter)
    }

    pub fn add_column_before(&mut self) -> Result<Applied, EditorError> {
        self.apply(Command::AddColumnBefore)
    }

    pub fn add_column_after(&mut self) -> Result<Applied, EditorError> {
        self.apply(Command::AddColumnAfter)
    }

    /// Destructive: gated behind the host's confirmation.
    pub fn delete_row(&mut self) -> Result<Applied, EditorError> {
        self.confirm_then("Delete this row?", Command::DeleteRow)
    }

    pub fn delete_column(&mut self) -> Result<Applied, EditorError> {
        self.confirm_then("Delete this column?", Command::DeleteColumn)
    }

    pub fn delete_table(&mut self) -> Result<Applied, EditorError> {
        self.confirm_then("Delete this table?", Command::DeleteTable)
    }

    fn confirm_then(&mut self, message: &str, command: Command) -> Result<Applied, EditorError> {
        if !self.prompts.confirm(message) {
            return Ok(Applied::Noop);
        }
        self.apply(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::StaticPrompts;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn session(content: &str) -> EditorSession {
        EditorSession::new(content, Box::new(StaticPrompts::default()))
    }

    fn recording(session: &mut EditorSession) -> Rc<RefCell<Vec<String>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        session.set_on_change(move |markup| sink.borrow_mut().push(markup.to_string()));
        seen
    }

    #[test]
    fn test_session_creation_sanitizes_content() {
        let session = session(r#"<p style="color: red">x</p>"#);
        assert!(!session.serialize().contains("color"));
        assert_eq!(session.document().version, 0);
    }

    #[test]
    fn test_mutations_notify_host() {
        let mut session = session("<p>x</p>");
        let seen = recording(&mut session);

        let id = session.document().nodes()[0].id().to_string();
        session.set_selection(Some(id));
        session
            .apply(Command::ToggleHeading { level: 2 })
            .unwrap();

        assert_eq!(seen.borrow().len(), 1);
        assert!(seen.borrow()[0].contains("<h2>"));
    }

    #[test]
    fn test_noops_do_not_notify() {
        let mut session = session("<p>x</p>");
        let seen = recording(&mut session);

        let focus = session.document().nodes()[0].id().to_string();
        session.set_selection(Some(focus));
        session.add_row_after().unwrap();

        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn test_blur_always_emits() {
        let mut session = session("<p>x</p>");
        let seen = recording(&mut session);

        session.on_blur();
        session.on_blur();

        assert_eq!(seen.borrow().len(), 2);
        assert_eq!(seen.borrow()[0], "<p>x</p>");
    }

    #[test]
    fn test_set_content_resets_only_on_difference() {
        let mut session = session("<p>same</p>");
        let before = session.document().nodes()[0].id().to_string();

        // Identical content: no reset, node IDs survive.
        session.set_content("<p>same</p>");
        assert_eq!(session.document().nodes()[0].id(), before);

        // Different content: reset.
        session.set_content("<p>changed</p>");
        assert_eq!(session.serialize(), "<p>changed</p>");
    }

    #[test]
    fn test_paste_without_color_is_default() {
        let mut session = session("");
        let outcome = session.on_paste(Some("<p>plain</p>"), "plain");
        assert_eq!(outcome, PasteOutcome::Default);
        assert_eq!(session.on_paste(None, "plain"), PasteOutcome::Default);
    }

    #[test]
    fn test_paste_with_color_is_synthesized_clean() {
        let mut session = session("");
        let seen = recording(&mut session);

        let outcome = session.on_paste(
            Some(r#"<p style="color: red">hot take</p>"#),
            "hot take",
        );

        let PasteOutcome::Synthesized { html, text } = outcome else {
            panic!("expected synthesized paste");
        };
        assert!(!html.contains("color"));
        assert_eq!(text, "hot take");
        assert_eq!(seen.borrow().len(), 1);
        assert!(session.serialize().contains("hot take"));
    }
}
