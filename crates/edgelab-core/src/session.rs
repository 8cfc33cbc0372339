//! The editing session: one open image, its undo history and its view.
//!
//! `EditSession` is the single entry point a UI drives. Crop, undo, resize
//! and export run synchronously on the caller's thread. Edge filters run on a
//! worker thread and report back through a [`JobHandle`].
//!
//! # Commit rules
//!
//! The current image and the history live together behind one lock. Every
//! mutation (a synchronous edit, or a filter result landing) happens under
//! that lock, and every mutation bumps a generation counter. A filter result
//! is committed only if, at the moment it takes the lock, the counter still
//! equals the id the job was started with and the job hasn't been cancelled.
//! Anything else is discarded and the job ends `Cancelled`, so a late result
//! can never overwrite newer state.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;

use crate::config::SessionConfig;
use crate::decode::{decode_first, decode_image, DecodeError, PixelBuffer};
use crate::encode::{encode_snapshot, EncodeError, ExportFormat};
use crate::filter::{CancelToken, EdgeAlgorithm, EdgeFilterJob, FilterError, JobHandle, JobId};
use crate::geometry::{
    apply_crop, fit_layout, map_crop_to_image_space, CropError, DisplayRect, LayoutPlacement,
    Overlay, Viewport,
};
use crate::history::HistoryStack;

/// Errors reported by [`EditSession`] operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Crop(#[from] CropError),

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    /// The operation needs an image and none is loaded.
    #[error("No image loaded")]
    NoImage,

    /// Undo with nothing to restore.
    #[error("Nothing to undo")]
    Empty,

    /// Resize factor is not a positive finite number.
    #[error("Invalid scale factor: {0}")]
    InvalidScale(f64),
}

#[derive(Debug, Default)]
struct Document {
    current: Option<Arc<PixelBuffer>>,
    history: HistoryStack,
}

/// One open image and everything needed to edit it.
pub struct EditSession {
    config: SessionConfig,
    document: Arc<Mutex<Document>>,
    generation: Arc<AtomicU64>,
    active_job: Option<JobHandle>,
    zoom: f64,
    placement: Option<LayoutPlacement>,
}

impl Default for EditSession {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl EditSession {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            document: Arc::new(Mutex::new(Document::default())),
            generation: Arc::new(AtomicU64::new(0)),
            active_job: None,
            zoom: 1.0,
            placement: None,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Decode `bytes` and make the result the current image.
    ///
    /// Clears the history and resets the view to a 1× fit.
    pub fn load_image(&mut self, bytes: &[u8]) -> Result<Arc<PixelBuffer>, SessionError> {
        let buffer = decode_image(bytes)?;
        self.load_buffer(buffer)
    }

    /// Load the first decodable image among archive members.
    pub fn load_first_image<'a, I>(
        &mut self,
        members: I,
    ) -> Result<Arc<PixelBuffer>, SessionError>
    where
        I: IntoIterator<Item = &'a [u8]>,
    {
        let buffer = decode_first(members)?;
        self.load_buffer(buffer)
    }

    /// Make an already decoded buffer the current image.
    pub fn load_buffer(&mut self, buffer: PixelBuffer) -> Result<Arc<PixelBuffer>, SessionError> {
        buffer.validate()?;
        if buffer.is_empty() {
            return Err(DecodeError::EmptyInput.into());
        }
        let image = Arc::new(buffer);

        {
            let mut doc = self.document.lock();
            self.supersede("load");
            doc.current = Some(Arc::clone(&image));
            doc.history.clear();
        }

        self.zoom = 1.0;
        self.refresh_layout(image.width, image.height);
        log::info!(
            "loaded {}x{} {:?} image",
            image.width,
            image.height,
            image.layout
        );
        Ok(image)
    }

    /// Crop the current image to a rectangle dragged over `viewport`.
    ///
    /// On success the previous image is pushed to the history and the view is
    /// refitted to the new size. On rejection nothing changes.
    pub fn request_crop(
        &mut self,
        rect: &DisplayRect,
        viewport: &Viewport,
    ) -> Result<Arc<PixelBuffer>, SessionError> {
        let document = Arc::clone(&self.document);
        let mut doc = document.lock();

        let current = doc.current.clone().ok_or(SessionError::NoImage)?;
        let region = map_crop_to_image_space(rect, viewport, current.width, current.height)?;
        let cropped = Arc::new(apply_crop(&current, &region)?);

        self.supersede("crop");
        doc.history.push(current);
        doc.current = Some(Arc::clone(&cropped));
        drop(doc);

        self.refresh_layout(cropped.width, cropped.height);
        log::info!(
            "cropped to {}x{} at ({}, {})",
            region.width,
            region.height,
            region.x,
            region.y
        );
        Ok(cropped)
    }

    /// Crop using the session's own current placement as the viewport.
    pub fn request_crop_in_view(
        &mut self,
        rect: &DisplayRect,
    ) -> Result<Arc<PixelBuffer>, SessionError> {
        let viewport = self.viewport().ok_or(SessionError::NoImage)?;
        self.request_crop(rect, &viewport)
    }

    /// Start an edge filter over the current image on a worker thread.
    ///
    /// Any job still in flight is cancelled, and the new job doesn't start
    /// computing until that one has stopped.
    pub fn request_filter(
        &mut self,
        algorithm: EdgeAlgorithm,
        strength: i32,
    ) -> Result<JobHandle, SessionError> {
        let (id, input) = {
            let doc = self.document.lock();
            let input = doc.current.clone().ok_or(SessionError::NoImage)?;
            let id = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            (id, input)
        };

        let mut job = EdgeFilterJob::new(id, input, algorithm, strength);
        if let Some(previous) = self.active_job.take() {
            if !previous.is_finished() {
                log::debug!("job {} supersedes job {}", id, previous.id());
                previous.cancel();
            }
            job = job.after(previous);
        }

        let commit = self.committer(id, job.handle().cancel_token());
        let handle = job.spawn(commit)?;
        self.active_job = Some(handle.clone());

        log::info!("started job {}: {} strength {}", id, algorithm, strength);
        Ok(handle)
    }

    /// [`request_filter`](Self::request_filter) at the configured default
    /// strength.
    pub fn request_default_filter(
        &mut self,
        algorithm: EdgeAlgorithm,
    ) -> Result<JobHandle, SessionError> {
        self.request_filter(algorithm, self.config.default_strength)
    }

    /// Cancel the in-flight job, if any.
    ///
    /// Returns `false` when there is nothing left to stop: no job, a finished
    /// job, or one whose result has already been committed.
    pub fn cancel_filter(&mut self) -> bool {
        match &self.active_job {
            Some(job) if job.cancel() => {
                log::debug!("cancelled job {}", job.id());
                true
            }
            _ => false,
        }
    }

    /// The most recently started job.
    pub fn active_job(&self) -> Option<&JobHandle> {
        self.active_job.as_ref()
    }

    /// Restore the image from before the most recent edit.
    pub fn undo(&mut self) -> Result<Arc<PixelBuffer>, SessionError> {
        let document = Arc::clone(&self.document);
        let mut doc = document.lock();

        let restored = doc.history.pop().ok_or(SessionError::Empty)?;
        self.supersede("undo");
        doc.current = Some(Arc::clone(&restored));
        let remaining = doc.history.len();
        drop(doc);

        self.refresh_layout(restored.width, restored.height);
        log::info!(
            "undo restored {}x{} ({} left)",
            restored.width,
            restored.height,
            remaining
        );
        Ok(restored)
    }

    pub fn can_undo(&self) -> bool {
        self.document.lock().history.can_undo()
    }

    pub fn history_len(&self) -> usize {
        self.document.lock().history.len()
    }

    /// Refit the view with the pane's target size multiplied by `factor`.
    ///
    /// Only the placement changes; pixels are untouched.
    pub fn resize(&mut self, factor: f64) -> Result<LayoutPlacement, SessionError> {
        if !factor.is_finite() || factor <= 0.0 {
            return Err(SessionError::InvalidScale(factor));
        }
        let current = self.current().ok_or(SessionError::NoImage)?;

        self.zoom = factor;
        let placement = fit_layout(factor, &self.config.container, current.width, current.height);
        self.placement = Some(placement);
        log::debug!("resized view to {}x (scale {:.3})", factor, placement.scale);
        Ok(placement)
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn placement(&self) -> Option<LayoutPlacement> {
        self.placement
    }

    /// The viewport a crop drag over the current view maps through.
    pub fn viewport(&self) -> Option<Viewport> {
        self.placement.map(|p| p.to_viewport())
    }

    /// Place an image-space overlay in the current view.
    pub fn place_overlay(&self, overlay: &Overlay) -> Option<Overlay> {
        self.placement.map(|p| p.place_overlay(overlay))
    }

    pub fn current(&self) -> Option<Arc<PixelBuffer>> {
        self.document.lock().current.clone()
    }

    /// The current image, for the caller to rasterize and store.
    pub fn export_snapshot(&self) -> Result<Arc<PixelBuffer>, SessionError> {
        self.current().ok_or(SessionError::NoImage)
    }

    /// Encode the current image with the configured export options.
    pub fn export_encoded(&self) -> Result<Vec<u8>, SessionError> {
        let snapshot = self.export_snapshot()?;
        Ok(encode_snapshot(&snapshot, &self.config.export)?)
    }

    /// Encode the current image in the format named by `file_name`'s
    /// extension.
    pub fn export_as(&self, file_name: &str) -> Result<Vec<u8>, SessionError> {
        let format = ExportFormat::from_file_name(file_name)?;
        let snapshot = self.export_snapshot()?;
        let options = self.config.export.with_format(format);
        Ok(encode_snapshot(&snapshot, &options)?)
    }

    /// Invalidate whatever filter result is still in flight.
    ///
    /// Callers hold the document lock.
    fn supersede(&self, reason: &str) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(job) = &self.active_job {
            if !job.is_finished() {
                log::debug!("{} supersedes job {}", reason, job.id());
                job.cancel();
            }
        }
    }

    /// Commit step for job `id`: swap the result in if it is still wanted.
    fn committer(
        &self,
        id: JobId,
        token: CancelToken,
    ) -> impl FnOnce(Arc<PixelBuffer>) -> bool + Send + 'static {
        let document = Arc::clone(&self.document);
        let generation = Arc::clone(&self.generation);
        move |output| {
            let mut doc = document.lock();
            if generation.load(Ordering::SeqCst) != id || !token.commit() {
                return false;
            }
            if let Some(previous) = doc.current.take() {
                doc.history.push(previous);
            }
            doc.current = Some(output);
            true
        }
    }

    fn refresh_layout(&mut self, width: u32, height: u32) {
        self.placement = Some(fit_layout(self.zoom, &self.config.container, width, height));
    }
}

impl Drop for EditSession {
    fn drop(&mut self) {
        let _doc = self.document.lock();
        self.supersede("drop");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::PixelLayout;
    use crate::encode::{encode_image, ExportFormat};
    use crate::filter::{apply_edge_filter, JobOutcome, JobState};
    use crate::geometry::ImageRect;

    fn gradient(width: u32, height: u32) -> PixelBuffer {
        let pixels = (0..height)
            .flat_map(|y| (0..width).map(move |x| ((x + y) % 256) as u8))
            .collect();
        PixelBuffer::gray(width, height, pixels)
    }

    fn step_image() -> PixelBuffer {
        let pixels = (0..16).map(|i| if i % 4 < 2 { 0 } else { 255 }).collect();
        PixelBuffer::gray(4, 4, pixels)
    }

    /// Park a never-started job in the active slot so the next request has
    /// to wait behind it.
    fn park_blocker(session: &mut EditSession) -> EdgeFilterJob {
        let input = session.current().unwrap();
        let blocker = EdgeFilterJob::new(0, input, EdgeAlgorithm::Sobel, 50);
        session.active_job = Some(blocker.handle());
        blocker
    }

    fn wait_while_pending(handle: &JobHandle) -> JobState {
        loop {
            match handle.state() {
                JobState::Pending => std::thread::yield_now(),
                state => return state,
            }
        }
    }

    fn release(blocker: EdgeFilterJob) {
        blocker.handle().cancel();
        assert_eq!(blocker.run(|_| false), JobOutcome::Cancelled);
    }

    #[test]
    fn test_crop_end_to_end_identity_scale() {
        let mut session = EditSession::default();
        session.load_buffer(gradient(100, 100)).unwrap();

        let rect = DisplayRect::new(10.0, 10.0, 60.0, 60.0);
        let viewport = Viewport::new(100.0, 100.0, 0.0, 0.0);
        let cropped = session.request_crop(&rect, &viewport).unwrap();

        let expected = apply_crop(&gradient(100, 100), &ImageRect::new(10, 10, 50, 50)).unwrap();
        assert_eq!(*cropped, expected);
        assert_eq!(session.current().unwrap(), cropped);
        assert!(session.can_undo());
    }

    #[test]
    fn test_rejected_crop_changes_nothing() {
        let mut session = EditSession::default();
        let original = session.load_buffer(gradient(100, 100)).unwrap();

        let rect = DisplayRect::new(10.0, 10.0, 13.0, 80.0);
        let viewport = Viewport::new(100.0, 100.0, 0.0, 0.0);
        let result = session.request_crop(&rect, &viewport);

        assert!(matches!(
            result,
            Err(SessionError::Crop(CropError::RegionTooSmall { .. }))
        ));
        assert!(Arc::ptr_eq(&session.current().unwrap(), &original));
        assert!(!session.can_undo());
    }

    #[test]
    fn test_operations_need_an_image() {
        let mut session = EditSession::default();
        let rect = DisplayRect::new(0.0, 0.0, 50.0, 50.0);
        let viewport = Viewport::new(100.0, 100.0, 0.0, 0.0);

        assert!(matches!(
            session.request_crop(&rect, &viewport),
            Err(SessionError::NoImage)
        ));
        assert!(matches!(
            session.request_filter(EdgeAlgorithm::Sobel, 50),
            Err(SessionError::NoImage)
        ));
        assert!(matches!(session.resize(1.0), Err(SessionError::NoImage)));
        assert!(matches!(
            session.export_snapshot(),
            Err(SessionError::NoImage)
        ));
        assert!(session.viewport().is_none());
    }

    #[test]
    fn test_undo_on_empty_history() {
        let mut session = EditSession::default();
        let original = session.load_buffer(gradient(10, 10)).unwrap();

        assert!(matches!(session.undo(), Err(SessionError::Empty)));
        assert!(Arc::ptr_eq(&session.current().unwrap(), &original));
    }

    #[test]
    fn test_undo_walks_back_through_edits() {
        let mut session = EditSession::default();
        let original = session.load_buffer(gradient(100, 100)).unwrap();
        let viewport = Viewport::new(100.0, 100.0, 0.0, 0.0);

        session
            .request_crop(&DisplayRect::new(0.0, 0.0, 80.0, 80.0), &viewport)
            .unwrap();
        let viewport = Viewport::new(80.0, 80.0, 0.0, 0.0);
        session
            .request_crop(&DisplayRect::new(0.0, 0.0, 40.0, 40.0), &viewport)
            .unwrap();
        assert_eq!(session.history_len(), 2);

        assert_eq!(session.undo().unwrap().width, 80);
        let restored = session.undo().unwrap();
        assert!(Arc::ptr_eq(&restored, &original));
        assert!(matches!(session.undo(), Err(SessionError::Empty)));
    }

    #[test]
    fn test_load_resets_history() {
        let mut session = EditSession::default();
        session.load_buffer(gradient(100, 100)).unwrap();
        session
            .request_crop(
                &DisplayRect::new(0.0, 0.0, 50.0, 50.0),
                &Viewport::new(100.0, 100.0, 0.0, 0.0),
            )
            .unwrap();
        assert!(session.can_undo());

        session.load_buffer(gradient(20, 20)).unwrap();
        assert!(!session.can_undo());
    }

    #[test]
    fn test_load_rejects_bad_buffers() {
        let mut session = EditSession::default();
        let malformed = PixelBuffer {
            width: 4,
            height: 4,
            layout: PixelLayout::Rgb8,
            pixels: vec![0; 3],
        };
        assert!(matches!(
            session.load_buffer(malformed),
            Err(SessionError::Decode(DecodeError::MalformedBuffer { .. }))
        ));
        assert!(matches!(
            session.load_buffer(PixelBuffer::gray(0, 0, Vec::new())),
            Err(SessionError::Decode(DecodeError::EmptyInput))
        ));
        assert!(session.current().is_none());
    }

    #[test]
    fn test_load_image_from_bytes() {
        let png = encode_image(&gradient(6, 3), ExportFormat::Png, 90).unwrap();
        let mut session = EditSession::default();

        let image = session.load_image(&png).unwrap();
        assert_eq!(*image, gradient(6, 3));
        assert!(matches!(
            session.load_image(b"not an image"),
            Err(SessionError::Decode(_))
        ));
    }

    #[test]
    fn test_load_first_image_skips_garbage() {
        let png = encode_image(&gradient(5, 5), ExportFormat::Png, 90).unwrap();
        let members: [&[u8]; 3] = [b"readme", &[], &png];
        let mut session = EditSession::default();

        let image = session.load_first_image(members).unwrap();
        assert_eq!((image.width, image.height), (5, 5));
    }

    #[test]
    fn test_filter_commits_and_undoes() {
        let mut session = EditSession::default();
        let original = session.load_buffer(step_image()).unwrap();

        let handle = session.request_filter(EdgeAlgorithm::Sobel, 50).unwrap();
        let JobOutcome::Succeeded(output) = handle.wait() else {
            panic!("filter should succeed");
        };

        assert_eq!(output.pixel(1, 1), &[255]);
        assert!(Arc::ptr_eq(&session.current().unwrap(), &output));
        assert_eq!(session.history_len(), 1);

        let restored = session.undo().unwrap();
        assert!(Arc::ptr_eq(&restored, &original));
    }

    #[test]
    fn test_default_strength_comes_from_config() {
        let config = SessionConfig {
            default_strength: 100,
            ..SessionConfig::default()
        };
        let mut session = EditSession::new(config);
        session.load_buffer(PixelBuffer::gray(2, 2, vec![40, 0, 0, 0])).unwrap();

        let handle = session.request_default_filter(EdgeAlgorithm::Roberts).unwrap();
        assert_eq!(handle.strength(), 100);
        let output = handle.wait().into_result().unwrap();
        assert_eq!(output.pixel(0, 0), &[80]);
    }

    #[test]
    fn test_second_filter_cancels_pending_first() {
        let mut session = EditSession::default();
        let original = session.load_buffer(gradient(1200, 1200)).unwrap();
        let blocker = park_blocker(&mut session);

        let first = session.request_filter(EdgeAlgorithm::Sobel, 50).unwrap();
        let second = session.request_filter(EdgeAlgorithm::Laplacian, 80).unwrap();

        assert!(first.cancel_requested());
        assert_eq!(first.state(), JobState::Pending);
        assert_eq!(second.state(), JobState::Pending);

        release(blocker);

        assert_eq!(first.wait(), JobOutcome::Cancelled);
        let JobOutcome::Succeeded(output) = second.wait() else {
            panic!("second filter should succeed");
        };

        let expected = apply_edge_filter(&original, EdgeAlgorithm::Laplacian, 80).unwrap();
        assert_eq!(*output, expected);
        assert!(Arc::ptr_eq(&session.current().unwrap(), &output));
        assert_eq!(session.history_len(), 1);
    }

    #[test]
    fn test_second_filter_cancels_running_first() {
        let mut session = EditSession::default();
        let original = session.load_buffer(gradient(2048, 2048)).unwrap();

        let first = session.request_filter(EdgeAlgorithm::Sobel, 50).unwrap();
        assert_eq!(wait_while_pending(&first), JobState::Running);
        let second = session.request_filter(EdgeAlgorithm::Laplacian, 80).unwrap();

        assert_eq!(first.wait(), JobOutcome::Cancelled);
        let JobOutcome::Succeeded(output) = second.wait() else {
            panic!("second filter should succeed");
        };

        let expected = apply_edge_filter(&original, EdgeAlgorithm::Laplacian, 80).unwrap();
        assert_eq!(*output, expected);
        assert!(Arc::ptr_eq(&session.current().unwrap(), &output));
        assert_eq!(session.history_len(), 1);
    }

    #[test]
    fn test_cancel_after_commit_reports_nothing_to_stop() {
        let mut session = EditSession::default();
        session.load_buffer(step_image()).unwrap();

        let id = session.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let job = EdgeFilterJob::new(id, session.current().unwrap(), EdgeAlgorithm::Sobel, 50);
        session.active_job = Some(job.handle());

        // Result committed, job not yet terminal
        let committed = Arc::new(PixelBuffer::gray(4, 4, vec![7; 16]));
        let commit = session.committer(id, job.handle().cancel_token());
        assert!(commit(Arc::clone(&committed)));
        assert!(!session.cancel_filter());
        assert!(!job.handle().cancel_requested());
        assert!(Arc::ptr_eq(&session.current().unwrap(), &committed));

        assert_eq!(job.run(|_| true).state(), JobState::Succeeded);
        assert!(!session.cancel_filter());
    }

    #[test]
    fn test_superseded_result_is_discarded() {
        let mut session = EditSession::default();
        let original = session.load_buffer(step_image()).unwrap();

        // A result computed for an id that is no longer the latest
        let stale_id = session.generation.load(Ordering::SeqCst);
        session.generation.fetch_add(1, Ordering::SeqCst);
        let commit = session.committer(stale_id, CancelToken::new());
        assert!(!commit(Arc::new(PixelBuffer::gray(4, 4, vec![9; 16]))));

        assert!(Arc::ptr_eq(&session.current().unwrap(), &original));
        assert!(!session.can_undo());
    }

    #[test]
    fn test_cancelled_token_blocks_commit() {
        let session = EditSession::default();
        let id = session.generation.load(Ordering::SeqCst);
        let token = CancelToken::new();
        token.cancel();

        let commit = session.committer(id, token);
        assert!(!commit(Arc::new(step_image())));
        assert!(session.current().is_none());
    }

    #[test]
    fn test_crop_supersedes_in_flight_filter() {
        let mut session = EditSession::default();
        session.load_buffer(gradient(100, 100)).unwrap();
        let blocker = park_blocker(&mut session);
        let job = session.request_filter(EdgeAlgorithm::Roberts, 50).unwrap();

        let cropped = session
            .request_crop(
                &DisplayRect::new(0.0, 0.0, 50.0, 50.0),
                &Viewport::new(100.0, 100.0, 0.0, 0.0),
            )
            .unwrap();
        release(blocker);

        assert_eq!(job.wait(), JobOutcome::Cancelled);
        assert!(Arc::ptr_eq(&session.current().unwrap(), &cropped));
        assert_eq!(session.history_len(), 1);
    }

    #[test]
    fn test_explicit_cancel() {
        let mut session = EditSession::default();
        let original = session.load_buffer(gradient(64, 64)).unwrap();
        let blocker = park_blocker(&mut session);
        let job = session.request_filter(EdgeAlgorithm::Sobel, 50).unwrap();

        assert!(session.cancel_filter());
        release(blocker);

        assert_eq!(job.wait(), JobOutcome::Cancelled);
        assert!(!session.cancel_filter());
        assert!(Arc::ptr_eq(&session.current().unwrap(), &original));
    }

    #[test]
    fn test_failed_filter_leaves_state() {
        let mut session = EditSession::default();
        let malformed = Arc::new(PixelBuffer {
            width: 8,
            height: 8,
            layout: PixelLayout::Rgb8,
            pixels: vec![0; 10],
        });
        session.document.lock().current = Some(Arc::clone(&malformed));

        let job = session.request_filter(EdgeAlgorithm::Sobel, 50).unwrap();
        assert!(matches!(
            job.wait(),
            JobOutcome::Failed(FilterError::MalformedBuffer { .. })
        ));
        assert!(Arc::ptr_eq(&session.current().unwrap(), &malformed));
        assert!(!session.can_undo());
    }

    #[test]
    fn test_drop_cancels_in_flight_job() {
        let mut session = EditSession::default();
        session.load_buffer(gradient(32, 32)).unwrap();
        let blocker = park_blocker(&mut session);
        let job = session.request_filter(EdgeAlgorithm::Sobel, 50).unwrap();

        drop(session);
        assert!(job.cancel_requested());
        release(blocker);
        assert_eq!(job.wait(), JobOutcome::Cancelled);
    }

    #[test]
    fn test_initial_placement_fits_default_pane() {
        let mut session = EditSession::default();
        session.load_buffer(gradient(400, 300)).unwrap();

        let placement = session.placement().unwrap();
        assert_eq!(placement.scale, 2.0);
        assert_eq!((placement.x, placement.y), (150.0, 60.0));
        assert_eq!((placement.width, placement.height), (800.0, 600.0));
    }

    #[test]
    fn test_resize_recenters() {
        let mut session = EditSession::default();
        let original = session.load_buffer(gradient(400, 300)).unwrap();

        let placement = session.resize(0.5).unwrap();
        assert_eq!(placement.scale, 1.0);
        assert_eq!((placement.x, placement.y), (350.0, 210.0));
        assert_eq!(session.viewport(), Some(Viewport::new(400.0, 300.0, 350.0, 210.0)));
        assert!(Arc::ptr_eq(&session.current().unwrap(), &original));

        assert!(matches!(
            session.resize(0.0),
            Err(SessionError::InvalidScale(_))
        ));
        assert!(matches!(
            session.resize(f64::NAN),
            Err(SessionError::InvalidScale(_))
        ));
        assert_eq!(session.zoom(), 0.5);
    }

    #[test]
    fn test_crop_in_view_refits() {
        let mut session = EditSession::default();
        session.load_buffer(gradient(400, 300)).unwrap();

        // Top-left quarter of the on-screen image
        let rect = DisplayRect::new(150.0, 60.0, 550.0, 360.0);
        let cropped = session.request_crop_in_view(&rect).unwrap();
        assert_eq!((cropped.width, cropped.height), (200, 150));

        let placement = session.placement().unwrap();
        assert_eq!(placement.scale, 4.0);
        assert_eq!(placement.width, 800.0);

        session.undo().unwrap();
        assert_eq!(session.placement().unwrap().scale, 2.0);
    }

    #[test]
    fn test_overlay_follows_view() {
        let mut session = EditSession::default();
        assert!(session.place_overlay(&Overlay::default()).is_none());

        session.load_buffer(gradient(400, 300)).unwrap();
        let watermark = Overlay {
            x: 10.0,
            y: 10.0,
            font_size: 12.0,
        };
        let placed = session.place_overlay(&watermark).unwrap();
        assert_eq!(placed.x, 150.0 + 20.0);
        assert_eq!(placed.font_size, 24.0);
    }

    #[test]
    fn test_export_encoded_uses_config() {
        let mut session = EditSession::default();
        session.load_buffer(gradient(4, 4)).unwrap();

        let png = session.export_encoded().unwrap();
        let decoded = decode_image(&png).unwrap();
        assert_eq!((decoded.width, decoded.height), (20, 20));

        let jpeg = session.export_as("edges.JPG").unwrap();
        assert_eq!(&jpeg[0..2], &[0xFF, 0xD8]);

        assert!(matches!(
            session.export_as("edges.gif"),
            Err(SessionError::Encode(EncodeError::UnsupportedFormat(_)))
        ));
    }

    #[test]
    fn test_export_snapshot_is_current() {
        let mut session = EditSession::default();
        let image = session.load_buffer(gradient(8, 8)).unwrap();
        assert!(Arc::ptr_eq(&session.export_snapshot().unwrap(), &image));
    }
}
