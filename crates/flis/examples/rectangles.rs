//! Rectangles — a grid of colored quads, more than one batch's worth.
//!
//! Usage: `cargo run --example rectangles [config.json]`
//!
//! The grid holds more rectangles than the batch capacity, so every frame
//! flushes several times. Every third rectangle spins. Batch statistics are
//! logged once per second.

use std::sync::Arc;
use std::time::Instant;

use flis::prelude::*;
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

const CELL: u32 = 24;

struct Demo {
    config: BatchConfig,
    window: Option<Arc<Window>>,
    batch: Option<SpriteBatch<WgpuBackend>>,
    started: Instant,
    last_report: Instant,
}

impl Demo {
    fn new(config: BatchConfig) -> Self {
        Self {
            config,
            window: None,
            batch: None,
            started: Instant::now(),
            last_report: Instant::now(),
        }
    }

    fn draw_frame(&mut self) -> Result<(), RenderError> {
        let Some(batch) = self.batch.as_mut() else {
            return Ok(());
        };
        let (width, height) = batch.backend().viewport_size();
        let t = self.started.elapsed().as_secs_f32();

        batch.begin()?;
        let mut i = 0u32;
        for row in 0..height / CELL {
            for col in 0..width / CELL {
                let x = (col * CELL + CELL / 2) as f32;
                let y = (row * CELL + CELL / 2) as f32;
                let color = Color::rgb((col * 7 % 256) as u8, (row * 11 % 256) as u8, 200);
                let mut rect = Rectangle::new(x, y, CELL - 4, CELL - 4, color);
                if i % 3 == 0 {
                    rect = rect.rotated(t * 90.0).scaled(0.8);
                }
                batch.submit(rect)?;
                i += 1;
            }
        }
        batch.end()?;
        batch.backend_mut().present()?;

        if self.last_report.elapsed().as_secs() >= 1 {
            log::info!("{}", batch.take_stats());
            self.last_report = Instant::now();
        }
        Ok(())
    }
}

impl ApplicationHandler for Demo {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let attrs = Window::default_attributes()
            .with_title("flis rectangles")
            .with_inner_size(winit::dpi::LogicalSize::new(1280.0, 720.0));
        let window = match event_loop.create_window(attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        let batch = GpuContext::new(window.clone(), &self.config).and_then(|gpu| {
            let backend = WgpuBackend::new(gpu, self.config.clear_color);
            SpriteBatch::new(backend, self.config.capacity)
        });
        match batch {
            Ok(batch) => self.batch = Some(batch),
            Err(e) => {
                log::error!("Renderer setup failed: {e}");
                event_loop.exit();
                return;
            }
        }

        window.request_redraw();
        self.window = Some(window);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("Window close requested, exiting.");
                if let Some(batch) = self.batch.take() {
                    batch.dispose();
                }
                event_loop.exit();
            }

            WindowEvent::Resized(size) => {
                if let Some(batch) = self.batch.as_mut() {
                    batch.backend_mut().resize(size.width, size.height);
                }
            }

            WindowEvent::RedrawRequested => {
                match self.draw_frame() {
                    Ok(()) => {}
                    Err(RenderError::SurfaceTexture(
                        wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated,
                    )) => {
                        if let Some(batch) = self.batch.as_mut() {
                            batch.backend_mut().reconfigure();
                        }
                    }
                    Err(RenderError::SurfaceTexture(wgpu::SurfaceError::Timeout)) => {
                        log::warn!("Surface timeout, skipping frame");
                    }
                    Err(e) => {
                        log::error!("Render failed: {e}");
                        event_loop.exit();
                    }
                }

                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }

            _ => {}
        }
    }
}

fn main() {
    init_logger();

    let config = match std::env::args().nth(1) {
        Some(path) => match BatchConfig::load(&path) {
            Ok(config) => config,
            Err(e) => {
                log::error!("{e}");
                std::process::exit(1);
            }
        },
        None => BatchConfig::default(),
    };

    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(e) => {
            log::error!("Failed to create event loop: {e}");
            std::process::exit(1);
        }
    };
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut demo = Demo::new(config);
    if let Err(e) = event_loop.run_app(&mut demo) {
        log::error!("Event loop error: {e}");
    }
}
