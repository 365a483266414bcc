use anyhow::{Context, Result};
use std::sync::Arc;
use vulkano::{
    buffer::{Buffer, BufferCreateInfo, BufferUsage, Subbuffer},
    command_buffer::{AutoCommandBufferBuilder, CopyImageToBufferInfo, PrimaryAutoCommandBuffer},
    format::Format,
    image::Image,
    memory::allocator::{AllocationCreateInfo, MemoryTypeFilter, StandardMemoryAllocator},
};

/// Record a copy of a rendered swapchain image into a host-visible buffer.
///
/// Must be recorded after the render pass has ended. The returned buffer can
/// only be read once the submitted work has completed.
pub fn capture_to_buffer(
    builder: &mut AutoCommandBufferBuilder<PrimaryAutoCommandBuffer>,
    memory_allocator: Arc<StandardMemoryAllocator>,
    image: Arc<Image>,
) -> Result<CaptureBuffer> {
    let format = image.format();
    let [width, height, _] = image.extent();
    let buffer_size = width as u64 * height as u64 * format.block_size();

    let buffer = Buffer::from_iter(
        memory_allocator,
        BufferCreateInfo {
            usage: BufferUsage::TRANSFER_DST,
            ..Default::default()
        },
        AllocationCreateInfo {
            memory_type_filter: MemoryTypeFilter::PREFER_HOST
                | MemoryTypeFilter::HOST_RANDOM_ACCESS,
            ..Default::default()
        },
        (0..buffer_size as usize).map(|_| 0u8),
    )
    .context("Failed to create capture buffer")?;

    builder
        .copy_image_to_buffer(CopyImageToBufferInfo::image_buffer(image, buffer.clone()))
        .context("Failed to record image copy")?;

    Ok(CaptureBuffer {
        buffer,
        width,
        height,
        format,
    })
}

/// Host-visible copy of a rendered frame, pending GPU completion
pub struct CaptureBuffer {
    buffer: Subbuffer<[u8]>,
    width: u32,
    height: u32,
    format: Format,
}

impl CaptureBuffer {
    /// Convert the captured bytes to an RGBA image.
    ///
    /// The scene writes sRGB color constants directly, so float framebuffers
    /// already hold display-ready values and only need clamping to 8-bit.
    pub fn to_image(&self) -> Result<image::RgbaImage> {
        let content = self.buffer.read().context("Failed to read capture buffer")?;

        let rgba: Vec<u8> = match self.format {
            Format::R16G16B16A16_SFLOAT => {
                use half::f16;
                content
                    .chunks(8)
                    .flat_map(|px| {
                        let channel = |i: usize| {
                            let v = f16::from_le_bytes([px[i], px[i + 1]]).to_f32();
                            (v.clamp(0.0, 1.0) * 255.0) as u8
                        };
                        [channel(0), channel(2), channel(4), channel(6)]
                    })
                    .collect()
            }
            Format::B8G8R8A8_SRGB | Format::B8G8R8A8_UNORM => content
                .chunks(4)
                .flat_map(|bgra| [bgra[2], bgra[1], bgra[0], bgra[3]])
                .collect(),
            _ => content.to_vec(),
        };

        image::RgbaImage::from_raw(self.width, self.height, rgba)
            .context("Capture buffer size mismatch")
    }
}
