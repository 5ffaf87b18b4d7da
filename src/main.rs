pub mod state;
pub mod camera;
pub mod config;
pub mod input;
pub mod rig;
pub mod texture;
pub mod mesh;

use winit::{
    dpi::LogicalSize,
    event::*,
    event_loop::{ControlFlow, EventLoop},
    window::WindowBuilder,
};
use anyhow::Result;
use log::{error, info};
use crate::config::Config;

#[async_std::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let config = Config::load(&config::config_path())?;
    let event_loop = EventLoop::new();
    let window = WindowBuilder::new()
        .with_title(config.window.title.as_str())
        .with_inner_size(LogicalSize::new(config.window.width, config.window.height))
        .build(&event_loop)?;
    let mut state = state::State::new(&window, &config).await?;
    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Poll;
        match event {
            Event::WindowEvent {
                ref event,
                window_id,
            } if window_id == window.id() => {
                match event {
                    WindowEvent::CloseRequested =>
                        *control_flow = ControlFlow::Exit,
                    WindowEvent::KeyboardInput {
                        input: KeyboardInput {
                            state: ElementState::Pressed,
                            virtual_keycode: Some(VirtualKeyCode::Escape),
                            ..
                        },
                        ..
                    } => *control_flow = ControlFlow::Exit,
                    WindowEvent::Resized(physical_size) => {
                        state.resize(*physical_size);
                    }
                    WindowEvent::ScaleFactorChanged { new_inner_size, .. } => {
                        state.resize(**new_inner_size);
                    }
                    _ => {
                        state.input(event);
                    }
                }
            },
            Event::DeviceEvent { ref event, .. } => {
                state.device_input(event);
            },
            Event::MainEventsCleared => {
                window.request_redraw();
            },
            Event::RedrawRequested(_) => {
                state.update();
                match state.render() {
                    Ok(_) => {},
                    Err(wgpu::SwapChainError::Lost) => state.resize(state.size),
                    Err(wgpu::SwapChainError::OutOfMemory) => {
                        error!("swap chain out of memory");
                        *control_flow = ControlFlow::Exit
                    }
                    Err(e) => error!("{:?}", e),
                }
            },
            Event::LoopDestroyed => info!("shutting down"),
            _ => (),
        }
    });
}
