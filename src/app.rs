//! The viewer's event loop.
//!
//! Per-iteration order: poll input, tick frame timing, apply movement to
//! the pan offsets, recompute the aspect correction from the current
//! surface size, then render. Escape or a window close request ends the
//! loop; there is no other exit path.

use std::sync::Arc;
use std::time::Instant;

use winit::{
    dpi::PhysicalSize,
    event::{ElementState, Event, WindowEvent},
    event_loop::{ControlFlow, EventLoop},
    keyboard::PhysicalKey,
    window::WindowBuilder,
};

use crate::camera::{FrameTiming, PanCamera};
use crate::error::{ViewerError, ViewerResult};
use crate::geometry::PolygonMesh;
use crate::input::InputState;
use crate::renderer::Renderer;
use crate::ViewerConfig;

/// Create the window and renderer, then run the render loop until an
/// exit request.
pub fn run(config: ViewerConfig) -> ViewerResult<()> {
    let event_loop = EventLoop::new()
        .map_err(|e| ViewerError::EventLoopCreationFailed(e.to_string()))?;

    // Size the window to the primary display's current mode, falling back
    // to the configured size where no monitor is reported.
    let size = event_loop
        .primary_monitor()
        .map(|monitor| monitor.size())
        .filter(|size| size.width > 0 && size.height > 0)
        .unwrap_or_else(|| PhysicalSize::new(config.width, config.height));

    let window = Arc::new(
        WindowBuilder::new()
            .with_title(&config.title)
            .with_inner_size(size)
            .build(&event_loop)
            .map_err(|e| ViewerError::WindowCreationFailed(e.to_string()))?,
    );

    let mesh = PolygonMesh::demo_shape();
    debug_assert!(mesh.indices_in_bounds());

    let mut renderer = Renderer::new(Arc::clone(&window), &mesh, &config)?;

    let mut input = InputState::new();
    let mut camera = PanCamera::new();
    let started = Instant::now();
    let mut timing = FrameTiming::new(0.0);

    log::info!("entering render loop");

    event_loop
        .run(move |event, elwt| {
            elwt.set_control_flow(ControlFlow::Poll);

            match event {
                Event::WindowEvent { event, .. } => match event {
                    WindowEvent::CloseRequested => elwt.exit(),
                    WindowEvent::Resized(new_size) => {
                        renderer.resize(new_size.width, new_size.height);
                    }
                    WindowEvent::KeyboardInput { event, .. } => {
                        if let PhysicalKey::Code(code) = event.physical_key {
                            input.handle_key(code, event.state == ElementState::Pressed);
                        }
                        if input.exit_requested {
                            elwt.exit();
                        }
                    }
                    WindowEvent::RedrawRequested => {
                        let step = timing.tick(started.elapsed().as_secs_f64());
                        camera.apply_movement(&input, step);

                        let (width, height) = renderer.surface_size();
                        camera.set_aspect(width as f32, height as f32);

                        if let Err(e) = renderer.render(&camera.uniform_data()) {
                            log::error!("render error: {e}");
                        }
                    }
                    _ => {}
                },
                Event::AboutToWait => window.request_redraw(),
                _ => {}
            }
        })
        .map_err(|e| ViewerError::EventLoopFailed(e.to_string()))?;

    Ok(())
}
