use std::{
    path::PathBuf,
    time::{Duration, Instant},
};

use anyhow::Result;
use winit::{
    dpi::{LogicalSize, PhysicalSize},
    event::{ElementState, Event, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::Window,
};

use crate::{
    assets::AssetManager,
    audio::AudioSystem,
    input::{InputState, KeyTransition},
    render::{Renderer, TextureHandle},
};

/// Longest stretch of wall-clock time a single frame may feed into updates.
const MAX_ACCUMULATED: Duration = Duration::from_millis(250);

/// Configuration values for the engine window and runtime behavior.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub vsync: bool,
    /// Fixed updates per second.
    pub update_rate: f64,
    /// Directory relative asset paths resolve against.
    pub asset_root: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            title: "coinclimb".into(),
            width: 1280,
            height: 720,
            vsync: true,
            update_rate: 60.0,
            asset_root: PathBuf::from("assets"),
        }
    }
}

/// Main entrypoint for running an application.
pub struct Engine {
    config: EngineConfig,
}

impl Engine {
    /// Create a new engine instance with default configuration.
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
        }
    }

    /// Override the window title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.config.title = title.into();
        self
    }

    /// Override the initial window size in logical pixels.
    #[must_use]
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.config.width = width;
        self.config.height = height;
        self
    }

    /// Enable or disable vertical sync.
    #[must_use]
    pub fn with_vsync(mut self, vsync: bool) -> Self {
        self.config.vsync = vsync;
        self
    }

    /// Number of fixed updates per second.
    #[must_use]
    pub fn with_update_rate(mut self, rate: f64) -> Self {
        self.config.update_rate = rate;
        self
    }

    #[must_use]
    pub fn with_asset_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.config.asset_root = root.into();
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Open the window, run `setup`, then drive the callbacks until the
    /// window closes, Escape is pressed or a callback fails.
    #[allow(deprecated)]
    pub fn run<A: ApplicationCallbacks + 'static>(self, mut app: A) -> Result<()> {
        let config = self.config;

        let event_loop = EventLoop::new()?;
        let mut window_attributes = Window::default_attributes();
        window_attributes.title = config.title.clone();
        window_attributes.inner_size = Some(LogicalSize::new(config.width, config.height).into());
        let window = event_loop.create_window(window_attributes)?;

        // The window lives for the rest of the process; leaking it gives the
        // renderer's surface a 'static borrow.
        let window: &'static Window = Box::leak(Box::new(window));

        let mut ctx = EngineContext::new(window, &config)?;
        app.setup(&mut ctx)?;
        log::info!("Running '{}' at {} updates/s", config.title, config.update_rate);

        let mut last_frame = Instant::now();
        event_loop.run(move |event, elwt| {
            if ctx.exited {
                return;
            }
            match event {
                Event::NewEvents(_) => {
                    ctx.input.begin_frame();
                }
                Event::WindowEvent { event, .. } => match event {
                    WindowEvent::CloseRequested => {
                        shutdown(&mut app, &mut ctx, elwt);
                    }
                    WindowEvent::KeyboardInput { event, .. } => {
                        if is_escape_pressed(&event) {
                            shutdown(&mut app, &mut ctx, elwt);
                            return;
                        }
                        let result = match ctx.input.handle_key(&event) {
                            Some(KeyTransition::Pressed(key)) => app.on_key_down(&mut ctx, key),
                            Some(KeyTransition::Released(key)) => app.on_key_up(&mut ctx, key),
                            None => Ok(()),
                        };
                        if let Err(err) = result {
                            log::error!("Encountered error during key handling: {err:?}");
                            shutdown(&mut app, &mut ctx, elwt);
                        }
                    }
                    WindowEvent::Resized(new_size) => {
                        ctx.resize_renderer(new_size);
                    }
                    WindowEvent::RedrawRequested => {
                        if let Err(err) = app.on_draw(&mut ctx) {
                            log::error!("Encountered error during draw: {err:?}");
                            shutdown(&mut app, &mut ctx, elwt);
                        }
                    }
                    _ => {}
                },
                Event::AboutToWait => {
                    let now = Instant::now();
                    ctx.update_time(now - last_frame);
                    last_frame = now;

                    let dt = ctx.timestep.step().as_secs_f32();
                    while ctx.timestep.next_tick() {
                        if let Err(err) = app.on_update(&mut ctx, dt) {
                            log::error!("Encountered error during update: {err:?}");
                            shutdown(&mut app, &mut ctx, elwt);
                            return;
                        }
                    }

                    ctx.window.request_redraw();
                }
                _ => {}
            }
        })?;

        Ok(())
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

/// Run `on_exit` once and stop the event loop.
fn shutdown<A: ApplicationCallbacks>(
    app: &mut A,
    ctx: &mut EngineContext<'_>,
    elwt: &ActiveEventLoop,
) {
    if ctx.exited {
        return;
    }
    ctx.exited = true;
    if let Err(err) = app.on_exit(ctx) {
        log::error!("Encountered error during exit: {err:?}");
    }
    elwt.exit();
}

fn is_escape_pressed(event: &KeyEvent) -> bool {
    event.state == ElementState::Pressed
        && matches!(event.physical_key, PhysicalKey::Code(KeyCode::Escape))
}

/// Fixed-timestep accumulator.
///
/// Wall-clock time is added every frame and drained one `step` at a time.
/// The backlog is capped so a long stall replays at most a quarter second.
#[derive(Clone, Copy, Debug)]
pub struct FixedTimestep {
    step: Duration,
    accumulator: Duration,
}

impl FixedTimestep {
    /// `rate` updates per second; non-positive rates fall back to 60.
    pub fn new(rate: f64) -> Self {
        let rate = if rate > 0.0 { rate } else { 60.0 };
        Self {
            step: Duration::from_secs_f64(1.0 / rate),
            accumulator: Duration::ZERO,
        }
    }

    pub fn step(&self) -> Duration {
        self.step
    }

    pub fn accumulate(&mut self, delta: Duration) {
        self.accumulator = (self.accumulator + delta).min(MAX_ACCUMULATED);
    }

    /// Consume one step if enough time has accumulated.
    pub fn next_tick(&mut self) -> bool {
        if self.accumulator >= self.step {
            self.accumulator -= self.step;
            true
        } else {
            false
        }
    }
}

/// Shared context provided to application callbacks.
pub struct EngineContext<'window> {
    window: &'window Window,
    timestep: FixedTimestep,
    exited: bool,
    input: InputState,
    renderer: Renderer<'window>,
    assets: AssetManager,
    audio: AudioSystem,
}

impl<'window> EngineContext<'window> {
    fn new(window: &'window Window, config: &EngineConfig) -> Result<Self> {
        let renderer = Renderer::new(window, config.vsync)?;
        // Audio initialization is graceful - engine continues even if audio fails
        let audio = AudioSystem::new()?;

        Ok(Self {
            window,
            timestep: FixedTimestep::new(config.update_rate),
            exited: false,
            input: InputState::new(),
            renderer,
            assets: AssetManager::new(config.asset_root.clone()),
            audio,
        })
    }

    fn update_time(&mut self, delta: Duration) {
        self.timestep.accumulate(delta);
    }

    fn resize_renderer(&mut self, new_size: PhysicalSize<u32>) {
        self.renderer.resize(new_size);
    }

    /// Physical pixels per logical pixel.
    pub fn scale_factor(&self) -> f32 {
        self.window.scale_factor() as f32
    }

    /// Access the renderer for drawing operations.
    pub fn renderer(&mut self) -> &mut Renderer<'window> {
        &mut self.renderer
    }

    /// Access the asset manager for loading and caching assets.
    pub fn assets(&mut self) -> &mut AssetManager {
        &mut self.assets
    }

    /// Renderer and asset manager together, for drawing code that loads
    /// textures lazily.
    pub fn graphics(&mut self) -> (&mut Renderer<'window>, &mut AssetManager) {
        (&mut self.renderer, &mut self.assets)
    }

    /// Load a texture through the asset cache.
    pub fn load_texture(&mut self, path: &str) -> Result<TextureHandle> {
        self.assets.load_texture(&mut self.renderer, path)
    }

    /// Load an image and its horizontal mirror through the asset cache.
    pub fn load_texture_pair(&mut self, path: &str) -> Result<[TextureHandle; 2]> {
        self.assets.load_texture_pair(&mut self.renderer, path)
    }

    /// Load a font file through the asset cache.
    pub fn load_font(&mut self, path: &str) -> Result<crate::render::FontHandle> {
        self.assets.load_font(&mut self.renderer, path)
    }

    /// Access the audio system for playing sounds and music.
    pub fn audio(&mut self) -> &mut AudioSystem {
        &mut self.audio
    }
}

/// Hooks an application implements to be driven by [`Engine::run`].
pub trait ApplicationCallbacks {
    /// Called once after the window is created but before the first frame.
    fn setup(&mut self, ctx: &mut EngineContext<'_>) -> Result<()>;

    /// One fixed-timestep update; `dt` is the step length in seconds.
    fn on_update(&mut self, ctx: &mut EngineContext<'_>, dt: f32) -> Result<()>;

    /// Draw the current frame.
    fn on_draw(&mut self, ctx: &mut EngineContext<'_>) -> Result<()>;

    /// A key went down. OS auto-repeat is not reported.
    fn on_key_down(&mut self, _ctx: &mut EngineContext<'_>, _key: KeyCode) -> Result<()> {
        Ok(())
    }

    /// A key went up.
    fn on_key_up(&mut self, _ctx: &mut EngineContext<'_>, _key: KeyCode) -> Result<()> {
        Ok(())
    }

    /// The loop is about to end. Called exactly once.
    fn on_exit(&mut self, _ctx: &mut EngineContext<'_>) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_tick_per_step() {
        let mut timestep = FixedTimestep::new(60.0);
        timestep.accumulate(Duration::from_millis(40));
        let mut ticks = 0;
        while timestep.next_tick() {
            ticks += 1;
        }
        assert_eq!(ticks, 2);
        assert!(timestep.accumulator > Duration::ZERO);
        assert!(timestep.accumulator < timestep.step());
    }

    #[test]
    fn stalls_are_capped() {
        let mut timestep = FixedTimestep::new(60.0);
        timestep.accumulate(Duration::from_secs(5));
        let mut ticks = 0;
        while timestep.next_tick() {
            ticks += 1;
        }
        // 250 ms holds 15 steps of 1/60 s, give or take nanosecond rounding.
        assert!((14..=15).contains(&ticks));
    }

    #[test]
    fn invalid_rate_falls_back_to_sixty() {
        let timestep = FixedTimestep::new(0.0);
        assert_eq!(timestep.step(), Duration::from_secs_f64(1.0 / 60.0));
    }

    #[test]
    fn builder_overrides_defaults() {
        let engine = Engine::new()
            .with_title("Platformer")
            .with_size(1000, 650)
            .with_update_rate(30.0)
            .with_asset_root("data");
        let config = engine.config();
        assert_eq!(config.title, "Platformer");
        assert_eq!((config.width, config.height), (1000, 650));
        assert_eq!(config.update_rate, 30.0);
        assert_eq!(config.asset_root, PathBuf::from("data"));
    }
}
