use std::time::{Duration, Instant};

use anyhow::Result;

use trigon_engine::core::{App, AppControl, FrameCtx, WindowCtx};
use trigon_engine::device::GpuInit;
use trigon_engine::geom::{vec3, Shape, Square, Triangle, Vector3};
use trigon_engine::input::{Controls, Key};
use trigon_engine::logging::{init_logging, LoggingConfig};
use trigon_engine::render::{
    AttributeType, GfxContext, Shader, ShaderProgram, ShaderStage, Uniform, VertexAttribute,
    VertexBuffer,
};
use trigon_engine::time::Countdown;
use trigon_engine::window::{Runtime, RuntimeConfig};

const WINDOW_TITLE: &str = "Trigon";
const WINDOW_WIDTH: u32 = 600;
const WINDOW_HEIGHT: u32 = 400;

const VERTEX_SRC: &str = include_str!("../shaders/demo.vert.wgsl");
const FRAGMENT_SRC: &str = include_str!("../shaders/demo.frag.wgsl");

const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.3,
    g: 0.3,
    b: 0.5,
    a: 1.0,
};

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    Runtime::run(
        RuntimeConfig {
            title: WINDOW_TITLE.to_owned(),
            initial_size: (WINDOW_WIDTH, WINDOW_HEIGHT),
        },
        GpuInit::default(),
        Demo::default(),
    )
}

#[derive(Default)]
struct Demo {
    scene: Option<Scene>,
}

/// Everything the demo draws, created lazily on the first frame (the GPU
/// context only exists once the window does).
struct Scene {
    gfx: GfxContext,
    _program: ShaderProgram,
    buffer: VertexBuffer,
    time: Uniform<f32>,
    tint: Uniform<Vector3>,
    controls: Controls,
    started: Instant,
    close_timer: Option<Countdown>,
}

impl Scene {
    fn create(ctx: &FrameCtx<'_, '_>) -> Result<Self> {
        let mut gfx = GfxContext::for_gpu(ctx.gpu);

        let program = ShaderProgram::builder()
            .attach_shader(Shader::new(ShaderStage::Vertex, VERTEX_SRC)?)
            .attach_shader(Shader::new(ShaderStage::Fragment, FRAGMENT_SRC)?)
            .build(&mut gfx)?;
        program.bind(&mut gfx);

        let time = program.uniform::<f32>("u_time");
        let tint = program.uniform::<Vector3>("u_tint");
        tint.set(vec3(1.0, 0.6, 0.2));

        let position = VertexAttribute::builder()
            .name("position")
            .size(3)
            .ty(AttributeType::F32)
            .stride(3 * std::mem::size_of::<f32>() as u32)
            .build();

        let mut buffer = VertexBuffer::new(&mut gfx);
        buffer.add_attribute(&mut gfx, &position)?;

        let shapes = [
            Shape::from(Triangle::new(
                vec3(-0.5, -0.5, 0.0),
                vec3(0.5, -0.5, 0.0),
                vec3(0.0, 0.5, 0.0),
            )),
            Shape::from(Square::new(vec3(0.55, 0.55, 0.0), vec3(0.9, 0.9, 0.0))),
        ];
        for shape in &shapes {
            shape.buffer_to(&mut gfx, &mut buffer);
        }
        log::info!(
            "scene ready: {} vertices ({} bytes buffered)",
            buffer.vertex_count(),
            buffer.len()
        );

        let controls = Controls::new();
        let window_id = ctx.window.id;
        controls.add_binding([Key::Escape], move |runtime| {
            runtime.close_window(window_id);
        });
        controls.add_binding([Key::Shift, Key::Q], |runtime| {
            runtime.exit();
        });

        Ok(Self {
            gfx,
            _program: program,
            buffer,
            time,
            tint,
            controls,
            started: Instant::now(),
            close_timer: None,
        })
    }
}

impl App for Demo {
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        let scene = match &mut self.scene {
            Some(scene) => scene,
            None => match Scene::create(ctx) {
                Ok(scene) => self.scene.insert(scene),
                Err(err) => {
                    log::error!("failed to set up the scene: {err:#}");
                    return AppControl::Exit;
                }
            },
        };

        scene.controls.process(ctx.input, ctx.runtime);

        // Space arms a delayed close; the timer always fires once armed.
        if ctx.input_frame.keys_pressed.contains(&Key::Space) && scene.close_timer.is_none() {
            log::info!("closing in 2 seconds");
            scene.close_timer = Some(Countdown::start(Duration::from_secs(2)));
        }
        if scene.close_timer.as_ref().is_some_and(Countdown::is_elapsed) {
            ctx.runtime.close_window(ctx.window.id);
        }

        // Arrow keys nudge the tint while held.
        let tint = scene.tint.value();
        if ctx.input.key_down(Key::ArrowUp) {
            scene.tint.set(tint + ctx.time.dt * 0.5);
        } else if ctx.input.key_down(Key::ArrowDown) {
            scene.tint.set(tint - ctx.time.dt * 0.5);
        }

        scene.time.set(scene.started.elapsed().as_secs_f32());

        let gfx = &mut scene.gfx;
        let buffer = &scene.buffer;
        ctx.render(CLEAR_COLOR, |target| {
            if let Err(err) = gfx.draw(target, 0..buffer.vertex_count()) {
                log::warn!("draw skipped: {err}");
            }
        })
    }

    fn on_resize(&mut self, window: &WindowCtx<'_>, _old: (u32, u32), new: (u32, u32)) {
        window.set_title(&format!("{WINDOW_TITLE} {}x{}", new.0, new.1));
    }
}
