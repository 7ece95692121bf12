/// Terminal front end for the SR3D pipeline
use anyhow::Context;
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self},
};
use log::{info, warn};
use nalgebra::{Vector2, Vector3};
use sr3d_core::{math, obj, CameraController, Engine, Mesh, Movement, PitchPolicy, RigidBody, Viewport};
use std::io::{stdout, Write};
use std::rc::Rc;
use std::time::{Duration, Instant};

pub mod config;
pub mod renderer;

pub use config::AppConfig;
pub use renderer::AsciiRenderer;

/// Terminal cells are about twice as tall as they are wide
const CELL_ASPECT: f32 = 0.5;
/// Pointer-equivalent offset of one arrow key press (3 degrees)
const LOOK_KEY_STEP: f32 = 25.0;
const FOV_STEP_DEGREES: f32 = 5.0;
const FOLLOW_DISTANCE: f32 = 4.0;
const SPIN_VELOCITY: (f32, f32) = (0.7, 0.45);

/// Viewport covering a terminal of `width` x `height` cells.
pub fn terminal_viewport(width: usize, height: usize) -> sr3d_core::Result<Viewport> {
    Viewport::with_pixel_aspect(width.max(1) as f32, height.max(1) as f32, CELL_ASPECT)
}

/// Build the engine and scene described by `config`: the OBJ models it
/// names, or a dodecahedron and a cube when it names none.
pub fn build_scene(config: &AppConfig) -> anyhow::Result<Engine> {
    let mut engine = Engine::new(terminal_viewport(80, 24)?)?;

    let camera = engine.active_camera_mut();
    camera
        .set_fov(math::radians(config.fov_degrees))
        .context("invalid --fov")?;
    camera
        .set_clip_range(config.near_z, config.far_z)
        .context("invalid --near/--far")?;

    let meshes: Vec<Rc<Mesh>> = if config.models.is_empty() {
        vec![
            Rc::new(Mesh::dodecahedron(1.0, sr3d_core::Color::rgb(80, 160, 255))),
            Rc::new(Mesh::cube(1.2, sr3d_core::Color::rgb(255, 160, 60))),
        ]
    } else {
        config
            .models
            .iter()
            .map(|path| {
                obj::load_obj(path)
                    .map(Rc::new)
                    .with_context(|| format!("loading {}", path.display()))
            })
            .collect::<anyhow::Result<_>>()?
    };

    let count = meshes.len();
    for (i, mesh) in meshes.into_iter().enumerate() {
        let x = (i as f32 - (count as f32 - 1.0) / 2.0) * 3.0;
        let mut body = RigidBody::new(mesh).with_position(Vector3::new(x, 0.0, 5.0));

        if config.spin {
            let direction = if i % 2 == 0 { 1.0 } else { -1.0 };
            body = body.with_rotation_velocity(Vector2::new(SPIN_VELOCITY.0, SPIN_VELOCITY.1) * direction);
            body.object_mut().set_pitch_policy(PitchPolicy::Free);
        }
        engine.add_body(body);
    }

    info!("scene ready: {count} bodies");
    Ok(engine)
}

/// Main application struct for terminal 3D rendering
pub struct TerminalApp {
    engine: Engine,
    controller: CameraController,
    renderer: AsciiRenderer,
    frame_time: Duration,
    running: bool,
    last_update: Instant,
    last_fps_sample: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    pub fn new(engine: Engine, config: &AppConfig) -> anyhow::Result<Self> {
        let (width, height) = terminal::size()?;
        Self::with_size(engine, config, width as usize, height as usize)
    }

    pub fn with_size(mut engine: Engine, config: &AppConfig, width: usize, height: usize) -> anyhow::Result<Self> {
        engine.set_viewport(terminal_viewport(width, height)?)?;

        Ok(Self {
            engine,
            controller: CameraController::new(),
            renderer: AsciiRenderer::new(width, height),
            frame_time: Duration::from_secs_f32(1.0 / config.fps as f32),
            running: true,
            last_update: Instant::now(),
            last_fps_sample: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        })
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn run(&mut self) -> anyhow::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;

        let result = self.main_loop();

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(stdout(), terminal::LeaveAlternateScreen, cursor::Show)?;

        result
    }

    fn main_loop(&mut self) -> anyhow::Result<()> {
        while self.running {
            let frame_start = Instant::now();

            // Handle input
            while event::poll(Duration::ZERO)? {
                self.handle_event(event::read()?)?;
            }

            // Update
            let now = Instant::now();
            let ts = (now - self.last_update).as_secs_f32();
            self.last_update = now;
            self.update(ts);

            // Render
            self.render()?;

            // Frame timing
            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < self.frame_time {
                std::thread::sleep(self.frame_time - elapsed);
            }

            // Update FPS counter
            let now = Instant::now();
            if (now - self.last_fps_sample).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_fps_sample).as_secs_f32();
                self.frame_count = 0;
                self.last_fps_sample = now;
            }
        }

        Ok(())
    }

    fn handle_event(&mut self, event: Event) -> anyhow::Result<()> {
        match event {
            Event::Key(KeyEvent { code, kind, .. }) if kind != KeyEventKind::Release => {
                self.handle_key(code);
            }
            Event::Resize(width, height) => {
                self.renderer.resize(width as usize, height as usize);
                self.engine
                    .set_viewport(terminal_viewport(width as usize, height as usize)?)?;
            }
            _ => {}
        }
        Ok(())
    }

    /// Apply one key press. Movement keys only last for the next update.
    pub fn handle_key(&mut self, code: KeyCode) {
        let movement = &mut self.controller.movement;
        match code {
            KeyCode::Char('q') | KeyCode::Esc => self.running = false,

            KeyCode::Char('w') => movement.forward = true,
            KeyCode::Char('s') => movement.backward = true,
            KeyCode::Char('a') => movement.left = true,
            KeyCode::Char('d') => movement.right = true,
            KeyCode::Char('r') => movement.up = true,
            KeyCode::Char('f') => movement.down = true,
            KeyCode::Char('x') => movement.fast = !movement.fast,

            KeyCode::Left => self.look(-LOOK_KEY_STEP, 0.0),
            KeyCode::Right => self.look(LOOK_KEY_STEP, 0.0),
            KeyCode::Up => self.look(0.0, -LOOK_KEY_STEP),
            KeyCode::Down => self.look(0.0, LOOK_KEY_STEP),

            KeyCode::Char('o') => {
                let show = !self.engine.settings().debug.triangle.outlines.show;
                self.engine.settings_mut().set_outlines(show);
            }
            KeyCode::Char('n') => {
                let show = !self.engine.settings().debug.triangle.normals.show;
                self.engine.settings_mut().set_normals(show);
            }
            KeyCode::Char('v') => {
                let frustums = &mut self.engine.settings_mut().debug.frustums;
                frustums.show = !frustums.show;
            }
            KeyCode::Char('g') => {
                let grid = &mut self.engine.settings_mut().debug.grid;
                grid.show = !grid.show;
            }

            KeyCode::Char('c') => {
                if let Err(e) = self.engine.create_camera() {
                    warn!("cannot create camera: {e}");
                }
            }
            KeyCode::Tab => self.cycle_camera(),
            KeyCode::Char('t') => self.toggle_follow(),

            KeyCode::Char('+') | KeyCode::Char('=') => self.change_fov(FOV_STEP_DEGREES),
            KeyCode::Char('-') => self.change_fov(-FOV_STEP_DEGREES),

            _ => {}
        }
    }

    fn look(&mut self, x_offset: f32, y_offset: f32) {
        self.controller
            .handle_mouse_movement(self.engine.active_camera_mut(), x_offset, y_offset);
    }

    fn cycle_camera(&mut self) {
        let ids: Vec<_> = self.engine.camera_ids().collect();
        let active = self.engine.active_camera_id();
        let next = ids
            .iter()
            .position(|&id| id == active)
            .map(|i| ids[(i + 1) % ids.len()]);

        if let Some(next) = next {
            if let Err(e) = self.engine.set_active_camera(next) {
                warn!("cannot switch camera: {e}");
            }
        }
    }

    /// Follow the first body from behind, or stop following.
    fn toggle_follow(&mut self) {
        let camera = self.engine.active_camera_id();

        let result = if self.engine.active_camera().object().is_attached() {
            self.engine.detach_camera(camera)
        } else {
            let first_body = self.engine.world().ids().next();
            match first_body {
                Some(body) => self.engine.attach_camera(camera, body, Some(FOLLOW_DISTANCE)),
                None => return,
            }
        };

        if let Err(e) = result {
            warn!("cannot toggle follow mode: {e}");
        }
    }

    fn change_fov(&mut self, delta_degrees: f32) {
        let camera = self.engine.active_camera_mut();
        let fov = camera.fov() + math::radians(delta_degrees);
        if let Err(e) = camera.set_fov(fov) {
            warn!("{e}");
        }
    }

    pub fn update(&mut self, ts: f32) {
        self.controller.update(ts, self.engine.active_camera_mut());
        self.controller.movement = Movement {
            fast: self.controller.movement.fast,
            ..Movement::default()
        };

        self.engine.update(ts);
    }

    /// Draw the scene into the character buffer without touching the
    /// terminal.
    pub fn render_frame(&mut self) -> anyhow::Result<()> {
        self.renderer.clear();
        self.engine.draw()?.submit(&mut self.renderer);
        Ok(())
    }

    pub fn renderer(&self) -> &AsciiRenderer {
        &self.renderer
    }

    fn render(&mut self) -> anyhow::Result<()> {
        self.render_frame()?;

        // Output to terminal
        let mut stdout = stdout();
        self.renderer.draw(&mut stdout)?;

        // Draw UI overlay
        let status: String = self.status_line().chars().take(self.renderer.width()).collect();
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::Yellow),
            Print(status),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }

    fn status_line(&self) -> String {
        let active = self.engine.active_camera_id();
        let camera_index = self
            .engine
            .camera_ids()
            .position(|id| id == active)
            .unwrap_or(0);
        let camera = self.engine.active_camera();
        let stats = self.engine.stats();

        format!(
            "SR3D | FPS: {:.1} | cam {}/{}{} fov {:.0} | tris {} culled {} clipped {} | \
             WASD/RF move, arrows look, X fast, O/N/V/G overlays, C/Tab/T cameras, +/- fov, Q quit",
            self.fps,
            camera_index + 1,
            self.engine.camera_ids().count(),
            if camera.object().is_attached() { " (follow)" } else { "" },
            math::degrees(camera.fov()),
            stats.triangles,
            stats.culled,
            stats.clipped,
        )
    }
}
