//! Font-atlas text rendering.
//!
//! Rasterizes the ASCII range with fontdue into a single-channel atlas at
//! startup, then lays glyph quads out on the CPU. The atlas is built at
//! `atlas_scale` (the window's scale factor at creation); when the window
//! moves to a monitor with a different scale, quads are resized by
//! `render_scale / atlas_scale` instead of rebuilding the atlas.

use anyhow::{anyhow, Context, Result};
use bytemuck::{Pod, Zeroable};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use vulkano::{
    buffer::{Buffer, BufferCreateInfo, BufferUsage, Subbuffer},
    command_buffer::{AutoCommandBufferBuilder, CopyBufferToImageInfo, PrimaryAutoCommandBuffer},
    descriptor_set::{
        allocator::StandardDescriptorSetAllocator, DescriptorSet, WriteDescriptorSet,
    },
    device::DeviceOwned,
    format::Format,
    image::{
        sampler::{Filter, Sampler, SamplerCreateInfo},
        view::ImageView,
        Image, ImageCreateInfo, ImageType, ImageUsage,
    },
    memory::allocator::{AllocationCreateInfo, MemoryTypeFilter, StandardMemoryAllocator},
    pipeline::{
        graphics::{
            color_blend::{AttachmentBlend, ColorBlendAttachmentState, ColorBlendState},
            input_assembly::InputAssemblyState,
            multisample::MultisampleState,
            rasterization::RasterizationState,
            vertex_input::{Vertex, VertexDefinition},
            viewport::{Viewport, ViewportState},
            GraphicsPipelineCreateInfo,
        },
        layout::PipelineDescriptorSetLayoutCreateInfo,
        GraphicsPipeline, Pipeline, PipelineBindPoint, PipelineLayout,
        PipelineShaderStageCreateInfo,
    },
    render_pass::{RenderPass, Subpass},
};

/// Vertex for text rendering
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Pod, Zeroable, Vertex)]
pub struct TextVertex {
    #[format(R32G32_SFLOAT)]
    pub position: [f32; 2],
    #[format(R32G32_SFLOAT)]
    pub tex_coord: [f32; 2],
    #[format(R32G32B32A32_SFLOAT)]
    pub color: [f32; 4],
}

/// Cached glyph placement within the atlas, all in atlas pixels.
struct GlyphInfo {
    tex_x: f32,
    tex_y: f32,
    tex_w: f32,
    tex_h: f32,
    width: f32,
    height: f32,
    /// Left side bearing from the pen position.
    bearing_x: f32,
    /// Offset from the baseline to the TOP of the glyph quad (negative up).
    bearing_y: f32,
    advance: f32,
}

const BASE_FONT_SIZE: f32 = 14.0;

/// System font candidates, tried in order. Overridable for odd distros.
const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/TTF/Roboto-Regular.ttf",
    "/usr/share/fonts/truetype/roboto/unhinted/RobotoTTF/Roboto-Regular.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/noto/NotoSans-Regular.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
];

fn load_font_bytes() -> Result<Vec<u8>> {
    if let Ok(path) = std::env::var("ARBOR_FONT") {
        return std::fs::read(&path).with_context(|| format!("Failed to read font {path}"));
    }
    for candidate in FONT_CANDIDATES {
        if Path::new(candidate).exists() {
            return std::fs::read(candidate)
                .with_context(|| format!("Failed to read font {candidate}"));
        }
    }
    Err(anyhow!(
        "No usable font found; set ARBOR_FONT to a .ttf path"
    ))
}

pub struct TextRenderer {
    pipeline: Arc<GraphicsPipeline>,
    font_texture: Arc<ImageView>,
    sampler: Arc<Sampler>,
    descriptor_set_allocator: Arc<StandardDescriptorSetAllocator>,
    memory_allocator: Arc<StandardMemoryAllocator>,
    glyphs: HashMap<char, GlyphInfo>,
    /// Line height and ascent in atlas pixels
    line_height: f32,
    ascent: f32,
    atlas_scale: f32,
    render_scale: f32,
}

mod vs {
    vulkano_shaders::shader! {
        ty: "vertex",
        src: r"
            #version 450

            layout(location = 0) in vec2 position;
            layout(location = 1) in vec2 tex_coord;
            layout(location = 2) in vec4 color;

            layout(location = 0) out vec2 v_tex_coord;
            layout(location = 1) out vec4 v_color;

            layout(push_constant) uniform PushConstants {
                vec2 screen_size;
            } pc;

            void main() {
                vec2 ndc = (position / pc.screen_size) * 2.0 - 1.0;
                gl_Position = vec4(ndc.x, ndc.y, 0.0, 1.0);
                v_tex_coord = tex_coord;
                v_color = color;
            }
        ",
    }
}

mod fs {
    vulkano_shaders::shader! {
        ty: "fragment",
        src: r"
            #version 450

            layout(location = 0) in vec2 v_tex_coord;
            layout(location = 1) in vec4 v_color;

            layout(location = 0) out vec4 f_color;

            layout(set = 0, binding = 0) uniform sampler2D font_atlas;

            void main() {
                float alpha = texture(font_atlas, v_tex_coord).r;
                f_color = vec4(v_color.rgb, v_color.a * alpha);
            }
        ",
    }
}

impl TextRenderer {
    pub fn new(
        memory_allocator: Arc<StandardMemoryAllocator>,
        render_pass: Arc<RenderPass>,
        command_buffer_builder: &mut AutoCommandBufferBuilder<PrimaryAutoCommandBuffer>,
        scale_factor: f64,
    ) -> Result<Self> {
        let device = memory_allocator.device().clone();

        let font_bytes = load_font_bytes()?;
        let font = fontdue::Font::from_bytes(font_bytes.as_slice(), fontdue::FontSettings::default())
            .map_err(|e| anyhow!("Failed to parse font: {e}"))?;

        let atlas_scale = scale_factor as f32;
        let px = BASE_FONT_SIZE * atlas_scale;
        let line_metrics = font
            .horizontal_line_metrics(px)
            .context("Font has no horizontal metrics")?;
        let line_height = line_metrics.new_line_size;
        let ascent = line_metrics.ascent;

        let chars: Vec<char> = (32u8..127u8).map(|c| c as char).collect();

        // Rasterize everything once, then pack into a single row.
        let rasterized: Vec<(char, fontdue::Metrics, Vec<u8>)> = chars
            .iter()
            .map(|&c| {
                let (metrics, bitmap) = font.rasterize(c, px);
                (c, metrics, bitmap)
            })
            .collect();

        let padding = 2u32;
        let mut total_width = 0u32;
        let mut max_height = 0u32;
        for (_, metrics, _) in &rasterized {
            total_width += metrics.width as u32 + padding;
            max_height = max_height.max(metrics.height as u32 + padding);
        }

        let atlas_width = total_width.next_power_of_two().max(256);
        let atlas_height = max_height.next_power_of_two().max(64);

        let mut atlas_data = vec![0u8; (atlas_width * atlas_height) as usize];
        let mut glyphs = HashMap::new();
        let mut x_offset = 0u32;

        for (c, metrics, bitmap) in &rasterized {
            let glyph_w = metrics.width as u32;
            let glyph_h = metrics.height as u32;

            for y in 0..glyph_h {
                for x in 0..glyph_w {
                    let px_x = x_offset + x;
                    if px_x < atlas_width && y < atlas_height {
                        atlas_data[(y * atlas_width + px_x) as usize] =
                            bitmap[(y * glyph_w + x) as usize];
                    }
                }
            }

            // fontdue's ymin is the bottom of the bitmap relative to the
            // baseline, y-up; in screen space the quad top sits at
            // baseline - (ymin + height).
            glyphs.insert(
                *c,
                GlyphInfo {
                    tex_x: x_offset as f32 / atlas_width as f32,
                    tex_y: 0.0,
                    tex_w: glyph_w as f32 / atlas_width as f32,
                    tex_h: glyph_h as f32 / atlas_height as f32,
                    width: glyph_w as f32,
                    height: glyph_h as f32,
                    bearing_x: metrics.xmin as f32,
                    bearing_y: -(metrics.ymin as f32 + glyph_h as f32),
                    advance: metrics.advance_width,
                },
            );

            x_offset += glyph_w + padding;
        }

        let upload_buffer = Buffer::from_iter(
            memory_allocator.clone(),
            BufferCreateInfo {
                usage: BufferUsage::TRANSFER_SRC,
                ..Default::default()
            },
            AllocationCreateInfo {
                memory_type_filter: MemoryTypeFilter::PREFER_HOST
                    | MemoryTypeFilter::HOST_SEQUENTIAL_WRITE,
                ..Default::default()
            },
            atlas_data,
        )
        .context("Failed to create atlas upload buffer")?;

        let font_image = Image::new(
            memory_allocator.clone(),
            ImageCreateInfo {
                image_type: ImageType::Dim2d,
                format: Format::R8_UNORM,
                extent: [atlas_width, atlas_height, 1],
                usage: ImageUsage::TRANSFER_DST | ImageUsage::SAMPLED,
                ..Default::default()
            },
            AllocationCreateInfo::default(),
        )
        .context("Failed to create font texture")?;

        command_buffer_builder
            .copy_buffer_to_image(CopyBufferToImageInfo::buffer_image(
                upload_buffer,
                font_image.clone(),
            ))
            .context("Failed to copy atlas to image")?;

        let font_texture =
            ImageView::new_default(font_image).context("Failed to create atlas view")?;

        let sampler = Sampler::new(
            device.clone(),
            SamplerCreateInfo {
                mag_filter: Filter::Linear,
                min_filter: Filter::Linear,
                ..Default::default()
            },
        )
        .context("Failed to create sampler")?;

        let vs = vs::load(device.clone()).context("Failed to load vertex shader")?;
        let fs = fs::load(device.clone()).context("Failed to load fragment shader")?;

        let vs_entry = vs.entry_point("main").context("Missing vs entry point")?;
        let fs_entry = fs.entry_point("main").context("Missing fs entry point")?;

        let vertex_input_state = TextVertex::per_vertex()
            .definition(&vs_entry)
            .context("Vertex definition mismatch")?;

        let stages = [
            PipelineShaderStageCreateInfo::new(vs_entry),
            PipelineShaderStageCreateInfo::new(fs_entry),
        ];

        let layout = PipelineLayout::new(
            device.clone(),
            PipelineDescriptorSetLayoutCreateInfo::from_stages(&stages)
                .into_pipeline_layout_create_info(device.clone())
                .context("Failed to create pipeline layout info")?,
        )
        .context("Failed to create pipeline layout")?;

        let subpass = Subpass::from(render_pass, 0).context("Failed to get subpass")?;

        let pipeline = GraphicsPipeline::new(
            device.clone(),
            None,
            GraphicsPipelineCreateInfo {
                stages: stages.into_iter().collect(),
                vertex_input_state: Some(vertex_input_state),
                input_assembly_state: Some(InputAssemblyState::default()),
                viewport_state: Some(ViewportState {
                    viewports: [Viewport::default()].into_iter().collect(),
                    ..Default::default()
                }),
                rasterization_state: Some(RasterizationState::default()),
                multisample_state: Some(MultisampleState::default()),
                color_blend_state: Some(ColorBlendState::with_attachment_states(
                    subpass.num_color_attachments(),
                    ColorBlendAttachmentState {
                        blend: Some(AttachmentBlend::alpha()),
                        ..Default::default()
                    },
                )),
                dynamic_state: [vulkano::pipeline::DynamicState::Viewport].into_iter().collect(),
                subpass: Some(subpass.into()),
                ..GraphicsPipelineCreateInfo::layout(layout)
            },
        )
        .context("Failed to create text pipeline")?;

        let descriptor_set_allocator = Arc::new(StandardDescriptorSetAllocator::new(
            device.clone(),
            Default::default(),
        ));

        Ok(Self {
            pipeline,
            font_texture,
            sampler,
            descriptor_set_allocator,
            memory_allocator,
            glyphs,
            line_height,
            ascent,
            atlas_scale,
            render_scale: atlas_scale,
        })
    }

    /// Ratio of current display scale to atlas scale.
    fn scale_ratio(&self) -> f32 {
        self.render_scale / self.atlas_scale
    }

    /// Update the render scale (call when moving between monitors).
    pub fn set_render_scale(&mut self, scale: f64) {
        self.render_scale = scale as f32;
    }

    /// Create vertices for a text string. `y` is the TOP of the line; the
    /// baseline is derived from the font's ascent.
    pub fn layout_text(&self, text: &str, x: f32, y: f32, color: [f32; 4]) -> Vec<TextVertex> {
        self.layout_text_scaled(text, x, y, color, 1.0)
    }

    /// Layout text at 85% size for secondary labels.
    pub fn layout_text_small(&self, text: &str, x: f32, y: f32, color: [f32; 4]) -> Vec<TextVertex> {
        self.layout_text_scaled(text, x, y, color, 0.85)
    }

    /// Layout text at an arbitrary scale relative to normal size. Reuses the
    /// atlas, only the quads shrink or grow.
    pub fn layout_text_scaled(
        &self,
        text: &str,
        x: f32,
        y: f32,
        color: [f32; 4],
        text_scale: f32,
    ) -> Vec<TextVertex> {
        let ratio = self.scale_ratio() * text_scale;
        let mut vertices = Vec::new();
        let mut cursor_x = x;
        let baseline_y = y + self.ascent * ratio;

        for c in text.chars() {
            if let Some(glyph) = self.glyphs.get(&c) {
                if glyph.width > 0.0 {
                    let x0 = cursor_x + glyph.bearing_x * ratio;
                    let y0 = baseline_y + glyph.bearing_y * ratio;
                    let x1 = x0 + glyph.width * ratio;
                    let y1 = y0 + glyph.height * ratio;

                    let u0 = glyph.tex_x;
                    let v0 = glyph.tex_y;
                    let u1 = glyph.tex_x + glyph.tex_w;
                    let v1 = glyph.tex_y + glyph.tex_h;

                    vertices.push(TextVertex { position: [x0, y0], tex_coord: [u0, v0], color });
                    vertices.push(TextVertex { position: [x1, y0], tex_coord: [u1, v0], color });
                    vertices.push(TextVertex { position: [x0, y1], tex_coord: [u0, v1], color });

                    vertices.push(TextVertex { position: [x1, y0], tex_coord: [u1, v0], color });
                    vertices.push(TextVertex { position: [x1, y1], tex_coord: [u1, v1], color });
                    vertices.push(TextVertex { position: [x0, y1], tex_coord: [u0, v1], color });
                }

                cursor_x += glyph.advance * ratio;
            }
        }

        vertices
    }

    pub fn line_height(&self) -> f32 {
        self.line_height * self.scale_ratio()
    }

    pub fn line_height_small(&self) -> f32 {
        self.line_height() * 0.85
    }

    pub fn measure_text(&self, text: &str) -> f32 {
        self.measure_text_scaled(text, 1.0)
    }

    pub fn measure_text_scaled(&self, text: &str, text_scale: f32) -> f32 {
        let ratio = self.scale_ratio() * text_scale;
        text.chars()
            .filter_map(|c| self.glyphs.get(&c))
            .map(|g| g.advance * ratio)
            .sum()
    }

    pub fn create_vertex_buffer(&self, vertices: Vec<TextVertex>) -> Result<Subbuffer<[TextVertex]>> {
        Buffer::from_iter(
            self.memory_allocator.clone(),
            BufferCreateInfo {
                usage: BufferUsage::VERTEX_BUFFER,
                ..Default::default()
            },
            AllocationCreateInfo {
                memory_type_filter: MemoryTypeFilter::PREFER_DEVICE
                    | MemoryTypeFilter::HOST_SEQUENTIAL_WRITE,
                ..Default::default()
            },
            vertices,
        )
        .context("Failed to create text vertex buffer")
    }

    pub fn draw(
        &self,
        builder: &mut AutoCommandBufferBuilder<PrimaryAutoCommandBuffer>,
        vertex_buffer: Subbuffer<[TextVertex]>,
        viewport: Viewport,
    ) -> Result<()> {
        let layout = self.pipeline.layout().clone();
        let descriptor_set_layouts = layout.set_layouts();

        let descriptor_set = DescriptorSet::new(
            self.descriptor_set_allocator.clone(),
            descriptor_set_layouts[0].clone(),
            [WriteDescriptorSet::image_view_sampler(
                0,
                self.font_texture.clone(),
                self.sampler.clone(),
            )],
            [],
        )
        .context("Failed to create descriptor set")?;

        let vertex_count = vertex_buffer.len() as u32;

        builder
            .bind_pipeline_graphics(self.pipeline.clone())
            .context("Failed to bind pipeline")?
            .bind_descriptor_sets(
                PipelineBindPoint::Graphics,
                layout.clone(),
                0,
                descriptor_set,
            )
            .context("Failed to bind descriptor sets")?
            .push_constants(layout, 0, vs::PushConstants {
                screen_size: [viewport.extent[0], viewport.extent[1]],
            })
            .context("Failed to push constants")?
            .set_viewport(0, [viewport].into_iter().collect())
            .context("Failed to set viewport")?
            .bind_vertex_buffers(0, vertex_buffer)
            .context("Failed to bind vertex buffers")?;

        // SAFETY: pipeline, descriptor sets and vertex buffers are bound and
        // the vertex count matches the buffer length
        unsafe {
            builder.draw(vertex_count, 1, 0, 0).context("Failed to draw")?;
        }

        Ok(())
    }
}
