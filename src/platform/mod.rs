//=========================================================================
// Platform Subsystem
//
// Bridges winit (OS-level events) with the engine's core thread.
//
// Architecture:
// ```text
//  Main Thread:                     Logic Thread:
//  ┌──────────────────────────┐    ┌──────────────────┐
//  │  winit Event Loop        │    │  Core Systems    │
//  │   ↓                      │    │                  │
//  │  InputProcessor          │    │  InputSystem     │
//  │   ├─ keys, mouse, touch  │    │  ↓               │
//  │   └─ sticky modifiers    │    │  Scenes          │
//  │   ↓                      │    │                  │
//  │  InputBuffer             │    └──────────────────┘
//  │   ↓                      │             ↑
//  │  RedrawRequested (flush) │             │
//  │   ↓                      │             │
//  │  crossbeam channel ──────┼─────────────┘
//  └──────────────────────────┘    PlatformEvent
// ```
//
// The window is only an input surface; nothing is drawn into it.
// RedrawRequested is the frame boundary: everything buffered since the
// last one is sent as a single batch. Once the core thread has stopped
// (scene stack emptied, or the channel disconnected) the event loop exits
// and the window closes with it.
//
//=========================================================================

//=== Submodules ==========================================================

mod input_buffer;
mod input_processor;

//=== External Crates =====================================================

use crossbeam_channel::Sender;
use log::*;
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    window::{Window, WindowAttributes, WindowId},
};

//=== Internal Imports ====================================================

use crate::core::platform_bridge::{CoreLiveness, PlatformError, PlatformEvent};
use input_buffer::InputBuffer;
use input_processor::InputProcessor;

//=== WindowSpec ==========================================================

/// Title and logical size of the input window.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct WindowSpec {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowSpec {
    fn default() -> Self {
        Self {
            title: "Woodcat Arcade".to_string(),
            width: 800,
            height: 600,
        }
    }
}

//=== Platform ============================================================

/// Window manager and input event aggregator.
///
/// Runs on the main thread (winit requirement on macOS/iOS). Not `Send`;
/// all communication goes through the channel sender.
pub(crate) struct Platform {
    window: Option<Window>,
    spec: WindowSpec,
    buffer: InputBuffer,
    event_sender: Sender<PlatformEvent>,
    input_processor: InputProcessor,
    core: CoreLiveness,
}

impl Platform {
    //--- Construction -----------------------------------------------------

    /// Creates the platform. The window itself is created in `resumed()`.
    pub(crate) fn new(event_sender: Sender<PlatformEvent>, spec: WindowSpec, core: CoreLiveness) -> Self {
        info!(target: "platform", "Platform subsystem initialized");
        Self {
            window: None,
            spec,
            buffer: InputBuffer::new(),
            event_sender,
            input_processor: InputProcessor::new(),
            core,
        }
    }

    //--- Execution --------------------------------------------------------

    /// Runs the winit event loop until the window closes.
    pub(crate) fn run(mut self) -> Result<(), PlatformError> {
        debug!(target: "platform", "Starting winit event loop");

        let event_loop = EventLoop::new().map_err(PlatformError::EventLoopCreation)?;

        event_loop
            .run_app(&mut self)
            .map_err(PlatformError::EventLoopExecution)
    }

    //--- Internal Helpers -------------------------------------------------

    /// Sends buffered input to the core thread. Empty frames are skipped.
    fn flush_input_buffer(&mut self) {
        let Some((discrete, continuous)) = self.buffer.drain() else {
            return;
        };

        let discrete_count = discrete.len();
        let continuous_count = continuous.len();

        trace!(
            target: "platform::input",
            "Flushing {} discrete + {} continuous events",
            discrete_count,
            continuous_count
        );

        if self
            .event_sender
            .send(PlatformEvent::Inputs { discrete, continuous })
            .is_err()
        {
            warn!(
                target: "platform::input",
                "Channel disconnected, dropping {} events",
                discrete_count + continuous_count
            );
            self.core.mark_stopped();
        }
    }

    fn notify(&self, event: PlatformEvent) {
        if self.event_sender.send(event).is_err() {
            debug!(target: "platform", "Core thread gone, notification dropped");
            self.core.mark_stopped();
        }
    }

    fn core_stopped(&self) -> bool {
        !self.core.is_alive()
    }
}

//=== Winit Integration ===================================================

impl ApplicationHandler for Platform {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            debug!(target: "platform", "Window already exists (mobile resume?)");
            return;
        }

        let attrs = WindowAttributes::default()
            .with_title(self.spec.title.clone())
            .with_inner_size(LogicalSize::new(self.spec.width, self.spec.height));

        match event_loop.create_window(attrs) {
            Ok(window) => {
                info!(
                    target: "platform",
                    "Window created: {}x{} @ {}x DPI",
                    window.inner_size().width,
                    window.inner_size().height,
                    window.scale_factor()
                );
                self.input_processor.set_scale_factor(window.scale_factor());
                window.request_redraw();
                self.window = Some(window);
            }
            Err(e) => {
                error!(target: "platform", "Window creation failed: {}", e);
                self.notify(PlatformEvent::WindowClosed);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match &event {
            WindowEvent::CloseRequested => {
                info!(target: "platform", "Window close requested");
                self.flush_input_buffer();
                self.notify(PlatformEvent::WindowClosed);
                event_loop.exit();
            }

            WindowEvent::Focused(false) => {
                debug!(target: "platform", "Window lost focus");
                self.flush_input_buffer();
                self.notify(PlatformEvent::FocusLost);
            }

            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                debug!(target: "platform", "Scale factor changed to {}", scale_factor);
                self.input_processor.set_scale_factor(*scale_factor);
            }

            WindowEvent::ModifiersChanged(state) => {
                trace!(target: "platform::input", "Modifiers changed: {:?}", state);
                self.input_processor.update_modifiers(state.state());
            }

            WindowEvent::CursorMoved { position, .. } => {
                let event = self
                    .input_processor
                    .process_pointer_move(*position);
                self.buffer.push_continuous(event);
            }

            WindowEvent::KeyboardInput { event: key_event, .. } => {
                if key_event.repeat {
                    return;
                }
                match self.input_processor.process_key_event(key_event) {
                    Some(event) => self.buffer.push_discrete(event),
                    None => trace!(target: "platform::input", "Unmapped key ignored"),
                }
            }

            WindowEvent::MouseInput { state, button, .. } => {
                let event = self.input_processor.process_mouse_button(*button, *state);
                self.buffer.push_discrete(event);
            }

            WindowEvent::Touch(touch) => {
                for event in self.input_processor.process_touch(touch) {
                    if event.is_discrete() {
                        self.buffer.push_discrete(event);
                    } else {
                        self.buffer.push_continuous(event);
                    }
                }
            }

            WindowEvent::RedrawRequested => {
                self.flush_input_buffer();

                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }

            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.core_stopped() && !event_loop.exiting() {
            info!(target: "platform", "Core thread stopped, closing window");
            event_loop.exit();
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
