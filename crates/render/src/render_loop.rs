use aurum_common::{FieldConfig, Viewport};
use aurum_field::{Clock, ParticleSet, SystemClock, WaveDistortion};
use aurum_input::{InputTracker, PointerState};

use crate::{
    CameraRig, FrameScheduler, FrameSurface, PointMaterial, RenderContext, RenderError,
    SurfaceHost, SurfaceSize, SurfaceSpec,
};

/// Lifecycle of a [`RenderLoop`]. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Uninitialized,
    Running,
    Disposed,
}

/// What a call to [`RenderLoop::tick`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Frame submitted and the next tick requested.
    Presented,
    /// Frame failed; the next tick was still requested.
    Skipped,
    /// The loop is not running; nothing happened.
    Inactive,
}

/// Per-loop counters for instrumentation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopStats {
    pub ticks: u64,
    pub frames_presented: u64,
    pub frames_skipped: u64,
    pub frames_requested: u64,
    /// Consecutive skipped frames up to the latest tick; zero after a present.
    pub skip_streak: u64,
}

/// Drives the particle field: one tick per display refresh while running.
pub struct RenderLoop<S: FrameSurface, C: Clock = SystemClock> {
    config: FieldConfig,
    state: LoopState,
    clock: C,
    wave: WaveDistortion,
    input: InputTracker,
    viewport: Viewport,
    pixel_ratio: f32,
    surface_size: SurfaceSize,
    context: Option<RenderContext<S>>,
    stats: LoopStats,
}

impl<S: FrameSurface> RenderLoop<S, SystemClock> {
    /// Build an uninitialized loop timed by the wall clock.
    pub fn new(config: FieldConfig, viewport: Viewport) -> Result<Self, RenderError> {
        Self::with_clock(config, viewport, SystemClock::new())
    }
}

impl<S: FrameSurface, C: Clock> RenderLoop<S, C> {
    /// Build an uninitialized loop with an explicit clock. The config is
    /// validated here, so nothing after construction can fail on it.
    pub fn with_clock(
        config: FieldConfig,
        viewport: Viewport,
        clock: C,
    ) -> Result<Self, RenderError> {
        config.validate()?;
        if !viewport.is_valid() {
            return Err(RenderError::InvalidViewport {
                width: viewport.width,
                height: viewport.height,
            });
        }
        let input = InputTracker::from_config(&config)?;
        let pixel_ratio = viewport.capped_pixel_ratio(config.max_pixel_ratio);
        Ok(Self {
            wave: WaveDistortion::from(&config),
            input,
            viewport,
            pixel_ratio,
            surface_size: SurfaceSize::from_viewport(&viewport, pixel_ratio),
            clock,
            config,
            state: LoopState::Uninitialized,
            context: None,
            stats: LoopStats::default(),
        })
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    pub fn stats(&self) -> LoopStats {
        self.stats
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn aspect(&self) -> f32 {
        self.viewport.aspect()
    }

    pub fn pixel_ratio(&self) -> f32 {
        self.pixel_ratio
    }

    pub fn surface_size(&self) -> SurfaceSize {
        self.surface_size
    }

    pub fn pointer(&self) -> PointerState {
        self.input.state()
    }

    /// The render context, present only while running.
    pub fn context(&self) -> Option<&RenderContext<S>> {
        self.context.as_ref()
    }

    pub fn particles(&self) -> Option<&ParticleSet> {
        self.context.as_ref().map(RenderContext::particles)
    }

    /// Acquire the surface, build geometry and material, enter `Running` and
    /// request the first tick.
    ///
    /// On failure the loop moves straight to `Disposed`; the caller should
    /// leave the visual layer out.
    pub fn init<H>(
        &mut self,
        host: H,
        scheduler: &mut impl FrameScheduler,
    ) -> Result<(), RenderError>
    where
        H: SurfaceHost<Surface = S>,
    {
        if self.state != LoopState::Uninitialized {
            return Err(RenderError::InvalidTransition {
                state: self.state,
                action: "init",
            });
        }

        let particles = ParticleSet::from_config(&self.config);
        let camera = CameraRig::from_config(&self.config, self.aspect())?;
        let material = PointMaterial::from(&self.config);
        let spec = SurfaceSpec {
            size: self.surface_size,
            material,
            particle_count: particles.count(),
            clear_color: self.config.clear_color,
            antialias: self.config.antialias,
            transparent: self.config.transparent,
        };

        let surface = match host.acquire(&spec) {
            Ok(surface) => surface,
            Err(e) => {
                self.state = LoopState::Disposed;
                tracing::error!("render surface unavailable: {e}");
                return Err(e);
            }
        };

        self.context = Some(RenderContext::new(surface, particles, camera, material));
        self.state = LoopState::Running;
        tracing::info!(
            particles = spec.particle_count,
            width = spec.size.width,
            height = spec.size.height,
            "render loop running"
        );
        self.request_next(scheduler);
        Ok(())
    }

    /// Run one frame. Requests the next tick only while still running.
    pub fn tick(&mut self, scheduler: &mut impl FrameScheduler) -> TickOutcome {
        if self.state != LoopState::Running {
            return TickOutcome::Inactive;
        }
        let Some(context) = self.context.as_mut() else {
            return TickOutcome::Inactive;
        };
        let _span = tracing::trace_span!("tick", n = self.stats.ticks).entered();

        let t = self.clock.elapsed_secs();
        let smoothed = self.input.smooth();
        let result = context.render_frame(&self.wave, t, smoothed);

        self.stats.ticks += 1;
        let outcome = match result {
            Ok(()) => {
                if self.stats.skip_streak > 0 {
                    tracing::info!(skipped = self.stats.skip_streak, "frames resumed");
                }
                self.stats.skip_streak = 0;
                self.stats.frames_presented += 1;
                tracing::trace!(t, "frame presented");
                TickOutcome::Presented
            }
            Err(e) => {
                self.stats.frames_skipped += 1;
                self.stats.skip_streak += 1;
                // Warn once per streak; a minimized window fails every frame.
                if self.stats.skip_streak == 1 {
                    tracing::warn!("{e}");
                } else {
                    tracing::debug!(streak = self.stats.skip_streak, "{e}");
                }
                TickOutcome::Skipped
            }
        };

        if self.state == LoopState::Running {
            self.request_next(scheduler);
        }
        outcome
    }

    /// Apply a new viewport. Zero, negative or non-finite dimensions are
    /// rejected and the previous state is kept. Returns whether it applied.
    pub fn resize(&mut self, viewport: Viewport) -> bool {
        if self.state == LoopState::Disposed {
            return false;
        }
        if !viewport.is_valid() {
            tracing::debug!(
                width = viewport.width,
                height = viewport.height,
                "ignoring degenerate viewport"
            );
            return false;
        }

        self.viewport = viewport;
        self.pixel_ratio = viewport.capped_pixel_ratio(self.config.max_pixel_ratio);
        self.surface_size = SurfaceSize::from_viewport(&viewport, self.pixel_ratio);
        if let Some(context) = self.context.as_mut() {
            context.resize(viewport.aspect(), self.surface_size);
        }
        tracing::debug!(
            width = self.surface_size.width,
            height = self.surface_size.height,
            pixel_ratio = self.pixel_ratio,
            "viewport resized"
        );
        true
    }

    /// Record a pointer position in logical pixels from the viewport's
    /// top-left corner. Only the raw offset changes.
    pub fn pointer_moved(&mut self, x: f32, y: f32) {
        if self.state == LoopState::Disposed {
            return;
        }
        self.input.pointer_moved(x, y, &self.viewport);
    }

    /// Stop scheduling and release the render context. A second call is a no-op.
    pub fn dispose(&mut self) {
        if self.state == LoopState::Disposed {
            tracing::debug!("render loop already disposed");
            return;
        }
        self.state = LoopState::Disposed;
        // Dropping the context releases the surface.
        self.context = None;
        tracing::info!(ticks = self.stats.ticks, "render loop disposed");
    }

    fn request_next(&mut self, scheduler: &mut impl FrameScheduler) {
        scheduler.request_frame();
        self.stats.frames_requested += 1;
    }
}
