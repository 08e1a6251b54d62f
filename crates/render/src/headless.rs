//! In-memory surface for tests and headless runs.

use std::cell::{Ref, RefCell};
use std::rc::Rc;

use aurum_field::Point;
use glam::Mat4;

use crate::{Frame, FrameSurface, RenderError, SurfaceHost, SurfaceSize, SurfaceSpec};

/// Everything a headless surface has been asked to do.
#[derive(Debug, Clone, Default)]
pub struct HeadlessRecord {
    pub spec: Option<SurfaceSpec>,
    pub acquired: u32,
    pub releases: u32,
    pub resizes: u32,
    pub presents: u64,
    pub uploads: u64,
    pub size: SurfaceSize,
    pub last_positions: Vec<Point>,
    pub last_model: Mat4,
    pub last_view_proj: Mat4,
}

/// Shared view of a [`HeadlessRecord`] that outlives the surface itself.
#[derive(Debug, Clone, Default)]
pub struct HeadlessProbe(Rc<RefCell<HeadlessRecord>>);

impl HeadlessProbe {
    /// Snapshot of the record.
    pub fn record(&self) -> HeadlessRecord {
        self.0.borrow().clone()
    }

    /// Borrow the record without copying the position buffer.
    pub fn borrow(&self) -> Ref<'_, HeadlessRecord> {
        self.0.borrow()
    }
}

/// Host that hands out [`HeadlessSurface`]s, or refuses to.
#[derive(Debug, Clone)]
pub struct HeadlessHost {
    probe: HeadlessProbe,
    supported: bool,
    failing_frames: u32,
}

impl HeadlessHost {
    pub fn new() -> Self {
        Self {
            probe: HeadlessProbe::default(),
            supported: true,
            failing_frames: 0,
        }
    }

    /// A host without rendering capability; acquisition always fails.
    pub fn unsupported() -> Self {
        Self {
            supported: false,
            ..Self::new()
        }
    }

    /// Make the first `count` presents fail.
    pub fn failing_frames(mut self, count: u32) -> Self {
        self.failing_frames = count;
        self
    }

    pub fn probe(&self) -> HeadlessProbe {
        self.probe.clone()
    }
}

impl Default for HeadlessHost {
    fn default() -> Self {
        Self::new()
    }
}

impl SurfaceHost for HeadlessHost {
    type Surface = HeadlessSurface;

    fn acquire(self, spec: &SurfaceSpec) -> Result<HeadlessSurface, RenderError> {
        if !self.supported {
            return Err(RenderError::CapabilityMissing(
                "headless host has no render capability".into(),
            ));
        }
        {
            let mut record = self.probe.0.borrow_mut();
            record.acquired += 1;
            record.size = spec.size;
            record.spec = Some(spec.clone());
            record.last_positions.reserve(spec.particle_count);
        }
        Ok(HeadlessSurface {
            probe: self.probe,
            failing_frames: self.failing_frames,
        })
    }
}

/// Surface that records uploads and presents instead of drawing.
#[derive(Debug)]
pub struct HeadlessSurface {
    probe: HeadlessProbe,
    failing_frames: u32,
}

impl HeadlessSurface {
    pub fn probe(&self) -> HeadlessProbe {
        self.probe.clone()
    }
}

impl FrameSurface for HeadlessSurface {
    fn resize(&mut self, size: SurfaceSize) {
        let mut record = self.probe.0.borrow_mut();
        record.resizes += 1;
        record.size = size;
    }

    fn present(&mut self, frame: &Frame<'_>) -> Result<(), RenderError> {
        if self.failing_frames > 0 {
            self.failing_frames -= 1;
            return Err(RenderError::Frame("headless surface lost".into()));
        }
        let mut record = self.probe.0.borrow_mut();
        if let Some(positions) = frame.positions {
            record.last_positions.clear();
            record.last_positions.extend_from_slice(positions);
            record.uploads += 1;
        }
        record.last_model = frame.model;
        record.last_view_proj = frame.view_proj;
        record.presents += 1;
        Ok(())
    }

    fn release(&mut self) {
        self.probe.0.borrow_mut().releases += 1;
    }
}
