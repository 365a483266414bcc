mod context;
mod screenshot;
mod surface;

pub use context::VulkanContext;
pub use screenshot::capture_to_buffer;
pub use surface::SurfaceManager;
