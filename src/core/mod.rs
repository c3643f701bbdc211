pub mod clock;
pub mod frame;
pub mod gpu_context;
pub mod input_adapter;
pub mod render_loop;
pub mod surface;
pub mod window;

pub use clock::{VirtualClock, CLOCK_STEP};
pub use frame::FrameInfo;
pub use gpu_context::GpuContext;
pub use input_adapter::{InputAction, InputAdapter};
pub use render_loop::{FrameTask, LoopState, RenderLoop};
pub use surface::Surface;
pub use window::{HeadlessHost, HostEnvironment, Viewport};
