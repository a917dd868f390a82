use anyhow::{Context, Result};
use clap::Parser;
use dicefield_common::{Face, TextureImage};
use dicefield_geometry::{InstancedCube, InstancedCustomMesh, InstancedSquare};
use dicefield_render_wgpu::{PerspectiveCamera, WgpuRenderer};
use dicefield_scene::{Light, Scene};
use glam::Vec3;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{
    DeviceEvent, ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent,
};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

#[derive(Parser)]
#[command(name = "dicefield-viewer", about = "Fly-camera viewer for instanced dice fields")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Seed for the scattered demo scene
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Wavefront OBJ file to add to the scene
    #[arg(long)]
    obj: Option<PathBuf>,

    /// Texture image for the OBJ mesh (checkerboard if omitted)
    #[arg(long)]
    texture: Option<PathBuf>,
}

const MOUSE_SENSITIVITY: f32 = 0.003;
const FOV_MIN: f32 = 30.0 * std::f32::consts::PI / 180.0;
const FOV_MAX: f32 = 110.0 * std::f32::consts::PI / 180.0;

/// Accelerate toward the held direction, 0.05 per frame up to unit speed.
/// Releasing the key (or reversing) stops immediately.
fn ramp(velocity: f32, held: f32) -> f32 {
    if held == 0.0 || velocity * held < 0.0 {
        0.0
    } else if velocity <= -1.0 || velocity >= 1.0 {
        velocity
    } else {
        velocity + 0.05 * held
    }
}

/// Splitmix64, for a reproducible demo scene layout.
fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

fn rand_below(state: &mut u64, n: u64) -> u64 {
    splitmix64(state) % n
}

/// Held-key state and the ramped velocity along each camera-local axis.
#[derive(Default)]
struct MotionState {
    left: bool,
    right: bool,
    forward: bool,
    back: bool,
    up: bool,
    down: bool,
    vx: f32,
    vy: f32,
    vz: f32,
}

impl MotionState {
    fn set_key(&mut self, key: KeyCode, pressed: bool) {
        match key {
            KeyCode::KeyA => self.left = pressed,
            KeyCode::KeyD => self.right = pressed,
            KeyCode::KeyW => self.forward = pressed,
            KeyCode::KeyS => self.back = pressed,
            KeyCode::Space => self.up = pressed,
            KeyCode::ShiftLeft => self.down = pressed,
            _ => {}
        }
    }

    /// Advance the velocity ramps and return the motion for this frame,
    /// in camera-local axes (forward is -z).
    fn step(&mut self, dt_ms: f32) -> Vec3 {
        let axis = |pos, neg| (pos as i32 - neg as i32) as f32;
        self.vx = ramp(self.vx, axis(self.right, self.left));
        self.vy = ramp(self.vy, axis(self.up, self.down));
        self.vz = ramp(self.vz, axis(self.back, self.forward));
        Vec3::new(self.vx, self.vy, self.vz) * (dt_ms / 50.0)
    }
}

/// Filters out the spurious large jumps some mice report after small moves.
#[derive(Default)]
struct MouseFilter {
    last_dx: f64,
    last_dy: f64,
}

impl MouseFilter {
    fn accept(&mut self, dx: f64, dy: f64) -> bool {
        if (self.last_dx.abs() < 15.0 && dx.abs() > 50.0)
            || (self.last_dy.abs() < 15.0 && dy.abs() > 50.0)
        {
            return false;
        }
        self.last_dx = dx;
        self.last_dy = dy;
        true
    }
}

/// Two fields of dice cubes and one field of textured squares, scattered on
/// integer coordinates, plus an optional OBJ mesh.
fn build_scene(cli: &Cli) -> Result<Scene> {
    let mut scene = Scene::new();
    scene.add_light(Light::new(1.0, 2.0, 3.0));
    scene.add_light(Light::new(-1.0, -2.0, -3.0));

    let mut rng = cli.seed;

    // 4x3 cross atlas so each cube face lands on a distinct quadrant.
    let mut dice = InstancedCube::new();
    dice.set_texture_images(vec![TextureImage::checkerboard(
        256,
        192,
        32,
        [230, 230, 230, 255],
        [180, 40, 40, 255],
    )]);
    for _ in 0..100 {
        let position = Vec3::new(
            rand_below(&mut rng, 10) as f32,
            rand_below(&mut rng, 10) as f32,
            rand_below(&mut rng, 10) as f32,
        );
        let face = Face::try_from(rand_below(&mut rng, 6) as u32)?;
        dice.add_instance(position, 0, face);
    }
    scene.add_mesh(Arc::new(dice));

    let mut dice2 = InstancedCube::new();
    dice2.set_texture_images(vec![TextureImage::checkerboard(
        256,
        192,
        32,
        [40, 40, 180, 255],
        [230, 230, 230, 255],
    )]);
    for _ in 0..100 {
        let position = Vec3::new(
            rand_below(&mut rng, 10) as f32 + 10.0,
            rand_below(&mut rng, 10) as f32 + 10.0,
            rand_below(&mut rng, 10) as f32 + 10.0,
        );
        dice2.add_instance(position, 0, Face::default());
    }
    scene.add_mesh(Arc::new(dice2));

    let mut squares = InstancedSquare::new();
    squares.set_texture_images(vec![
        TextureImage::solid(64, 64, [255, 255, 255, 255]),
        TextureImage::solid(64, 64, [240, 220, 60, 255]),
    ]);
    for _ in 0..100 {
        let position = Vec3::new(
            rand_below(&mut rng, 10) as f32 - 10.0,
            rand_below(&mut rng, 10) as f32 - 10.0,
            rand_below(&mut rng, 10) as f32 - 10.0,
        );
        let texture_id = rand_below(&mut rng, 2) as u32;
        let face = Face::try_from(rand_below(&mut rng, 6) as u32)?;
        squares.add_instance(position, texture_id, face);
    }
    scene.add_mesh(Arc::new(squares));

    if let Some(obj_path) = &cli.obj {
        let face_set = dicefield_assets::load_obj(obj_path)
            .with_context(|| format!("loading {}", obj_path.display()))?;
        let mut mesh = InstancedCustomMesh::from_face_set(&face_set)?;
        let texture = match &cli.texture {
            Some(path) => dicefield_assets::load_image(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => TextureImage::checkerboard(
                64,
                64,
                8,
                [230, 230, 230, 255],
                [60, 60, 60, 255],
            ),
        };
        mesh.set_texture_images(vec![texture]);
        scene.add_mesh(Arc::new(mesh));
        tracing::info!(path = %obj_path.display(), "added obj mesh");
    }

    Ok(scene)
}

struct AppState {
    scene: Scene,
    camera: PerspectiveCamera,
    motion: MotionState,
    mouse_filter: MouseFilter,
    mouse_captured: bool,
    last_frame: Instant,
}

impl AppState {
    fn new(scene: Scene) -> Self {
        Self {
            scene,
            camera: PerspectiveCamera::new(
                Vec3::new(0.0, 0.0, 10.0),
                Vec3::ZERO,
                70.0_f32.to_radians(),
                16.0 / 9.0,
                0.5,
                100.0,
            ),
            motion: MotionState::default(),
            mouse_filter: MouseFilter::default(),
            mouse_captured: false,
            last_frame: Instant::now(),
        }
    }

    fn update(&mut self, dt_ms: f32) {
        let motion = self.motion.step(dt_ms);
        self.camera.move_local(motion);
    }

    fn look(&mut self, dx: f64, dy: f64) {
        if !self.mouse_captured || !self.mouse_filter.accept(dx, dy) {
            return;
        }
        // Vertical cursor motion drives pitch (the rotation's x component).
        self.camera.rotate(Vec3::new(
            dy as f32 * MOUSE_SENSITIVITY,
            dx as f32 * MOUSE_SENSITIVITY,
            0.0,
        ));
    }

    fn zoom(&mut self, delta: f32) {
        self.camera.fov = (self.camera.fov + delta).clamp(FOV_MIN, FOV_MAX);
    }
}

struct GpuApp {
    state: AppState,
    window: Option<Arc<Window>>,
    surface: Option<wgpu::Surface<'static>>,
    device: Option<wgpu::Device>,
    queue: Option<wgpu::Queue>,
    config: Option<wgpu::SurfaceConfiguration>,
    renderer: Option<WgpuRenderer>,
}

impl GpuApp {
    fn new(state: AppState) -> Self {
        Self {
            state,
            window: None,
            surface: None,
            device: None,
            queue: None,
            config: None,
            renderer: None,
        }
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attrs = Window::default_attributes()
            .with_title("dicefield")
            .with_inner_size(PhysicalSize::new(1280u32, 720));
        let window = Arc::new(event_loop.create_window(attrs).expect("create window"));

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .expect("create surface");

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .expect("find adapter");

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("dicefield_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .expect("create device");

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        self.state.camera.aspect = size.width as f32 / size.height.max(1) as f32;

        let renderer = WgpuRenderer::new(&device, surface_format, size.width, size.height);

        self.window = Some(window);
        self.surface = Some(surface);
        self.device = Some(device);
        self.queue = Some(queue);
        self.config = Some(config);
        self.renderer = Some(renderer);

        tracing::info!(
            "GPU initialized with {} backend",
            adapter.get_info().backend.to_str()
        );
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let (Some(surface), Some(device), Some(config)) =
                    (&self.surface, &self.device, &mut self.config)
                {
                    config.width = new_size.width.max(1);
                    config.height = new_size.height.max(1);
                    surface.configure(device, config);
                    self.state.camera.aspect =
                        config.width as f32 / config.height.max(1) as f32;
                    if let Some(renderer) = &mut self.renderer {
                        renderer.resize(device, config.width, config.height);
                    }
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: key_state,
                        ..
                    },
                ..
            } => {
                let pressed = key_state == ElementState::Pressed;
                self.state.motion.set_key(key, pressed);
                if key == KeyCode::Escape && pressed {
                    self.state.mouse_captured = false;
                    if let Some(window) = &self.window {
                        window.set_cursor_visible(true);
                    }
                }
            }
            WindowEvent::MouseInput {
                button: MouseButton::Right,
                state: btn_state,
                ..
            } => {
                self.state.mouse_captured = btn_state == ElementState::Pressed;
                if let Some(window) = &self.window {
                    window.set_cursor_visible(!self.state.mouse_captured);
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let amount = match delta {
                    // One wheel line maps to the same step as ~100 px.
                    MouseScrollDelta::LineDelta(_, y) => -y * 0.1,
                    MouseScrollDelta::PixelDelta(p) => -p.y as f32 * 0.001,
                };
                self.state.zoom(amount);
            }
            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                let dt_ms = (now - self.state.last_frame).as_secs_f32() * 1000.0;
                self.state.last_frame = now;
                self.state.update(dt_ms.min(100.0));

                let (Some(surface), Some(device), Some(queue)) =
                    (&self.surface, &self.device, &self.queue)
                else {
                    return;
                };

                let output = match surface.get_current_texture() {
                    Ok(t) => t,
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        if let Some(config) = &self.config {
                            surface.configure(device, config);
                        }
                        return;
                    }
                    Err(e) => {
                        tracing::error!("surface error: {e}");
                        return;
                    }
                };

                let view = output
                    .texture
                    .create_view(&wgpu::TextureViewDescriptor::default());

                if let Some(renderer) = &mut self.renderer {
                    if let Err(e) =
                        renderer.render(device, queue, &view, &self.state.scene, &self.state.camera)
                    {
                        tracing::error!("render failed: {e}");
                        event_loop.exit();
                        return;
                    }
                }

                output.present();
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta } = event {
            self.state.look(delta.0, delta.1);
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("dicefield-viewer starting");

    let scene = build_scene(&cli)?;
    tracing::info!(
        meshes = scene.mesh_count(),
        lights = scene.light_count(),
        "scene built"
    );

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GpuApp::new(AppState::new(scene));
    event_loop.run_app(&mut app)?;

    Ok(())
}
