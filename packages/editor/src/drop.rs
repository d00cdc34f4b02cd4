//! # Drop/Insert Mediation
//!
//! Converts dropped local files into embedded media nodes. Image files are
//! read asynchronously by the host (the read is registered here and
//! completed later); video files get a synchronous object handle and are
//! inserted immediately. The asymmetry is deliberate: the video path never
//! waits on a read.

use std::collections::HashSet;

/// Metadata for a file handed to the editor by a drop event. The bytes stay
/// with the host; the core only decides what to do with the file.
#[derive(Debug, Clone, PartialEq)]
pub struct DroppedFile {
    pub name: String,
    pub mime: String,
}

impl DroppedFile {
    pub fn new(name: impl Into<String>, mime: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
        }
    }

    pub fn is_image(&self) -> bool {
        self.mime.starts_with("image/")
    }

    pub fn is_video(&self) -> bool {
        self.mime.starts_with("video/")
    }
}

/// An image read the host still owes the editor. Once started it cannot be
/// cancelled; completion inserts at whatever the selection is then.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingImageRead {
    pub token: u64,
    pub file_name: String,
}

/// Issues tokens for in-flight image reads.
#[derive(Debug, Default)]
pub struct DropMediator {
    next_token: u64,
    pending: Vec<PendingImageRead>,
}

impl DropMediator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an image read; the returned token redeems the data URI.
    pub fn begin_image_read(&mut self, file: &DroppedFile) -> u64 {
        self.next_token += 1;
        let token = self.next_token;
        self.pending.push(PendingImageRead {
            token,
            file_name: file.name.clone(),
        });
        token
    }

    /// Take the pending read for `token`, if it is still outstanding.
    pub fn take_pending(&mut self, token: u64) -> Option<PendingImageRead> {
        let index = self.pending.iter().position(|p| p.token == token)?;
        Some(self.pending.remove(index))
    }

    pub fn pending_reads(&self) -> &[PendingImageRead] {
        &self.pending
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

/// Owned object handles for dropped video files.
///
/// The source environment leaned on ambient, process-wide object URLs; here
/// the handles are an explicit resource with a documented release point:
/// a handle is revoked when its node leaves the document or the document is
/// discarded.
#[derive(Debug, Default)]
pub struct ObjectUrlRegistry {
    next: u64,
    live: HashSet<String>,
}

impl ObjectUrlRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive a fresh handle for a dropped file. Synchronous by design.
    pub fn create(&mut self, file_name: &str) -> String {
        self.next += 1;
        let url = format!("blob:pressroom/{}-{}", self.next, file_name);
        self.live.insert(url.clone());
        url
    }

    pub fn is_object_url(url: &str) -> bool {
        url.starts_with("blob:pressroom/")
    }

    pub fn release(&mut self, url: &str) -> bool {
        self.live.remove(url)
    }

    /// Release every handle not in `in_use` (nodes deleted since the last
    /// sweep).
    pub fn retain_used(&mut self, in_use: &[String]) {
        self.live.retain(|url| in_use.iter().any(|u| u == url));
    }

    pub fn release_all(&mut self) {
        self.live.clear();
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn is_live(&self, url: &str) -> bool {
        self.live.contains(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_classification() {
        assert!(DroppedFile::new("a.png", "image/png").is_image());
        assert!(DroppedFile::new("a.mp4", "video/mp4").is_video());
        assert!(!DroppedFile::new("a.pdf", "application/pdf").is_image());
        assert!(!DroppedFile::new("a.pdf", "application/pdf").is_video());
    }

    #[test]
    fn test_pending_reads_redeem_once() {
        let mut drops = DropMediator::new();
        let token = drops.begin_image_read(&DroppedFile::new("a.png", "image/png"));

        assert_eq!(drops.pending_reads().len(), 1);
        assert!(drops.take_pending(token).is_some());
        assert!(drops.take_pending(token).is_none());
    }

    #[test]
    fn test_object_urls_are_unique_and_tracked() {
        let mut urls = ObjectUrlRegistry::new();
        let a = urls.create("clip.mp4");
        let b = urls.create("clip.mp4");

        assert_ne!(a, b);
        assert!(ObjectUrlRegistry::is_object_url(&a));
        assert_eq!(urls.live_count(), 2);

        assert!(urls.release(&a));
        assert!(!urls.release(&a));
        assert_eq!(urls.live_count(), 1);
    }

    #[test]
    fn test_retain_used_releases_orphans() {
        let mut urls = ObjectUrlRegistry::new();
        let keep = urls.create("keep.mp4");
        let _drop = urls.create("drop.mp4");

        urls.retain_used(&[keep.clone()]);
        assert_eq!(urls.live_count(), 1);
        assert!(urls.is_live(&keep));
    }
}
