mod config;
mod crash_log;
mod diagram;
mod input;
mod messages;
mod renderer;
mod store;
mod ui;
mod views;

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;

use vulkano::{
    command_buffer::{
        AutoCommandBufferBuilder, CommandBufferUsage, PrimaryAutoCommandBuffer,
        RenderPassBeginInfo,
    },
    instance::{Instance, InstanceCreateInfo},
    pipeline::graphics::viewport::Viewport,
    swapchain::{acquire_next_image, Surface, SwapchainPresentInfo},
    sync::{self, GpuFuture},
    Validated, VulkanError, VulkanLibrary,
};
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use crate::config::Config;
use crate::diagram::geometry::accent_for;
use crate::input::{InputEvent, InputState};
use crate::messages::{handle_app_message, AppMessage, MessageViewState};
use crate::renderer::{capture_to_buffer, SurfaceManager, VulkanContext};
use crate::store::{demo_projects, worktrees_for_project, Project, Worktree};
use crate::ui::widget::theme;
use crate::ui::widgets::{HeaderAction, HeaderBar};
use crate::ui::{Rect, ScreenLayout, SplineRenderer, TextRenderer, Widget, WidgetOutput};
use crate::views::{BranchPanel, MindmapAction, MindmapView, PanelAction};

/// CLI arguments for headless/screenshot mode
#[derive(Default)]
struct CliArgs {
    /// Path to save screenshot (enables screenshot mode)
    screenshot: Option<PathBuf>,
    /// Project id to open
    project: Option<String>,
}

fn parse_args() -> CliArgs {
    let mut args = CliArgs::default();
    let mut iter = std::env::args().skip(1);

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--screenshot" => {
                args.screenshot = iter.next().map(PathBuf::from);
            }
            "--project" => {
                args.project = iter.next();
            }
            other if !other.starts_with('-') => {
                // Positional arg = project id
                args.project = Some(other.to_string());
            }
            _ => {}
        }
    }

    args
}

fn main() -> Result<()> {
    crash_log::init();
    crash_log::install_panic_hook();
    crash_log::prune_crash_logs(10);
    if let Some(report) = crash_log::has_crash_since_last_exit() {
        eprintln!("Previous session crashed; report at {}", report.display());
    }

    let cli_args = parse_args();

    let event_loop = EventLoop::new().context("Failed to create event loop")?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(&event_loop, cli_args)?;

    event_loop.run_app(&mut app).context("Event loop error")?;

    Ok(())
}

struct App {
    instance: Arc<Instance>,
    cli_args: CliArgs,
    config: Config,
    project: Project,
    project_index: usize,
    worktrees: Vec<Worktree>,
    renderer: Option<Renderer>,
}

impl App {
    fn new(event_loop: &EventLoop<()>, cli_args: CliArgs) -> Result<Self> {
        let library = VulkanLibrary::new().context("No Vulkan library found")?;

        let required_extensions = Surface::required_extensions(event_loop)
            .context("Failed to get required surface extensions")?;

        let instance = Instance::new(
            library,
            InstanceCreateInfo {
                enabled_extensions: required_extensions,
                ..Default::default()
            },
        )
        .context("Failed to create Vulkan instance")?;

        let mut config = Config::load();

        let projects = demo_projects();
        let requested = cli_args
            .project
            .clone()
            .or_else(|| config.recent_projects.first().cloned());
        let (project_index, project) = requested
            .and_then(|id| {
                projects
                    .iter()
                    .enumerate()
                    .find(|(_, p)| p.id == id)
                    .map(|(i, p)| (i, p.clone()))
            })
            .unwrap_or_else(|| (0, projects[0].clone()));

        let worktrees = worktrees_for_project(&project.id);
        config.add_recent_project(&project.id);
        crash_log::breadcrumb(format!(
            "opened project {} with {} worktrees",
            project.id,
            worktrees.len()
        ));

        Ok(Self {
            instance,
            cli_args,
            config,
            project,
            project_index,
            worktrees,
            renderer: None,
        })
    }

    fn init_renderer(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let window = Arc::new(
            event_loop
                .create_window(
                    Window::default_attributes()
                        .with_title(format!("Arbor - {}", self.project.name))
                        .with_inner_size(winit::dpi::LogicalSize::new(1280, 720)),
                )
                .context("Failed to create window")?,
        );

        let surface = Surface::from_window(self.instance.clone(), window.clone())
            .context("Failed to create surface")?;

        let ctx = VulkanContext::with_surface(self.instance.clone(), &surface)?;
        let surface_manager = SurfaceManager::new(&ctx, surface, window.inner_size())?;

        let spline_renderer = SplineRenderer::new(
            ctx.memory_allocator.clone(),
            surface_manager.render_pass.clone(),
        )?;

        // Font atlas upload needs a one-shot command buffer
        let mut upload_builder = AutoCommandBufferBuilder::primary(
            ctx.command_buffer_allocator.clone(),
            ctx.queue.queue_family_index(),
            CommandBufferUsage::OneTimeSubmit,
        )
        .context("Failed to create upload command buffer")?;

        let text_renderer = TextRenderer::new(
            ctx.memory_allocator.clone(),
            surface_manager.render_pass.clone(),
            &mut upload_builder,
            window.scale_factor(),
        )
        .context("Failed to create text renderer")?;

        let upload_buffer = upload_builder.build().context("Failed to build upload buffer")?;
        let upload_future = sync::now(ctx.device.clone())
            .then_execute(ctx.queue.clone(), upload_buffer)
            .context("Failed to execute upload")?
            .then_signal_fence_and_flush()
            .map_err(Validated::unwrap)
            .context("Failed to flush upload")?;

        upload_future.wait(None).context("Failed to wait for upload")?;

        let mut header_bar = HeaderBar::new();
        header_bar.set_project(
            self.project.name.clone(),
            self.project.icon_glyph.clone(),
            accent_for(self.project_index),
        );
        header_bar.worktree_count = self.worktrees.len();

        let mut mindmap_view = MindmapView::new();
        if self.config.fit_on_open {
            mindmap_view.request_fit();
        }

        let previous_frame_end = Some(sync::now(ctx.device.clone()).boxed());

        self.renderer = Some(Renderer {
            window,
            ctx,
            surface: surface_manager,
            spline_renderer,
            text_renderer,
            input_state: InputState::new(),
            header_bar,
            mindmap_view,
            branch_panel: BranchPanel::new(),
            panel_visible: self.config.panel_visible,
            previous_frame_end,
            frame_count: 0,
        });

        Ok(())
    }

    fn shutdown(&mut self) {
        if let Some(renderer) = &self.renderer {
            self.config.panel_visible = renderer.panel_visible;
        }
        self.config.save();
        crash_log::mark_clean_exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.renderer.is_none() {
            if let Err(e) = self.init_renderer(event_loop) {
                eprintln!("Failed to initialize renderer: {e:?}");
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(renderer) = &mut self.renderer else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                self.shutdown();
                event_loop.exit();
            }
            WindowEvent::Resized(_) => {
                renderer.surface.needs_recreate = true;
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                renderer.text_renderer.set_render_scale(scale_factor);
                renderer.surface.needs_recreate = true;
            }
            WindowEvent::RedrawRequested => {
                if let Err(e) = renderer.draw(&self.worktrees) {
                    eprintln!("Draw error: {e:?}");
                }

                // Screenshot mode: capture after a few frames for stability
                if let Some(ref screenshot_path) = self.cli_args.screenshot {
                    if renderer.frame_count == 3 {
                        match renderer.capture_screenshot(&self.worktrees) {
                            Ok(img) => {
                                if let Err(e) = img.save(screenshot_path) {
                                    eprintln!("Failed to save screenshot: {e}");
                                } else {
                                    println!("Screenshot saved to: {}", screenshot_path.display());
                                }
                            }
                            Err(e) => eprintln!("Failed to capture screenshot: {e:?}"),
                        }
                        self.shutdown();
                        event_loop.exit();
                        return;
                    }
                }

                renderer.window.request_redraw();
            }
            other => {
                if let Some(input_event) = renderer.input_state.handle_window_event(&other) {
                    let messages = renderer.route_event(&input_event, &self.worktrees);
                    for msg in messages {
                        let mut view_state = MessageViewState {
                            mindmap_view: &mut renderer.mindmap_view,
                            branch_panel: &mut renderer.branch_panel,
                            header_bar: &mut renderer.header_bar,
                            panel_visible: &mut renderer.panel_visible,
                        };
                        handle_app_message(msg, &mut self.worktrees, &mut view_state);
                    }
                }
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(renderer) = &self.renderer {
            renderer.window.request_redraw();
        }
    }
}

struct Renderer {
    window: Arc<Window>,
    ctx: VulkanContext,
    surface: SurfaceManager,
    spline_renderer: SplineRenderer,
    text_renderer: TextRenderer,
    input_state: InputState,
    header_bar: HeaderBar,
    mindmap_view: MindmapView,
    branch_panel: BranchPanel,
    panel_visible: bool,
    previous_frame_end: Option<Box<dyn GpuFuture>>,
    frame_count: u32,
}

impl Renderer {
    fn screen_layout(&self) -> ScreenLayout {
        let extent = self.surface.extent();
        let bounds = Rect::from_size(extent[0] as f32, extent[1] as f32);
        let scale = self.window.scale_factor() as f32;
        ScreenLayout::compute_scaled(bounds, scale, self.panel_visible)
    }

    /// Route an input event through the UI layers, top-most first, and
    /// collect the application messages it produced.
    fn route_event(&mut self, event: &InputEvent, worktrees: &[Worktree]) -> Vec<AppMessage> {
        let screen = self.screen_layout();

        let mut response = self.header_bar.handle_event(event, screen.header);
        if !response.is_consumed() && self.panel_visible {
            response = self.branch_panel.handle_event(event, screen.side_panel);
        }
        if !response.is_consumed() {
            self.mindmap_view.handle_event(event, screen.canvas, worktrees);
        }

        let mut messages = Vec::new();

        if let Some(HeaderAction::TogglePanel) = self.header_bar.take_action() {
            messages.push(AppMessage::TogglePanel);
        }

        if let Some(action) = self.branch_panel.take_action() {
            messages.push(match action {
                PanelAction::OpenBranch { worktree_id, name } => {
                    AppMessage::OpenBranch { worktree_id, name }
                }
                PanelAction::NewIngestion { worktree_id, name } => {
                    AppMessage::NewIngestion { worktree_id, name }
                }
            });
        }

        for action in self.mindmap_view.take_actions() {
            messages.push(match action {
                MindmapAction::RenameWorktree { id, new_name } => {
                    AppMessage::RenameWorktree { id, new_name }
                }
                MindmapAction::RenameBranch { worktree_id, old_name, new_name } => {
                    AppMessage::RenameBranch { worktree_id, old_name, new_name }
                }
                MindmapAction::AddBranch { worktree_id } => {
                    AppMessage::AddBranch { worktree_id }
                }
                MindmapAction::ForkBranch { worktree_id, source } => {
                    AppMessage::ForkBranch { worktree_id, source }
                }
                MindmapAction::AddWorktree => AppMessage::AddWorktree,
                MindmapAction::DuplicateWorktree { id } => {
                    AppMessage::DuplicateWorktree { id }
                }
                MindmapAction::DeleteWorktree { id } => AppMessage::DeleteWorktree { id },
                MindmapAction::OpenBranch { worktree_id, name } => {
                    AppMessage::OpenBranch { worktree_id, name }
                }
                MindmapAction::SelectBranch { worktree_id, name } => {
                    AppMessage::SelectBranch { worktree_id, name }
                }
                MindmapAction::HoverBranch { worktree_id, name } => {
                    AppMessage::HoverBranch { worktree_id, name }
                }
            });
        }

        messages
    }

    /// Lay out every visible layer into a single vertex batch
    fn build_scene(&mut self, worktrees: &[Worktree]) -> WidgetOutput {
        let screen = self.screen_layout();

        let mut output = WidgetOutput::new();
        output.extend(
            self.mindmap_view
                .layout(&self.text_renderer, screen.canvas, worktrees),
        );
        if self.panel_visible {
            output.extend(self.branch_panel.layout(&self.text_renderer, screen.side_panel));
        }
        output.extend(self.header_bar.layout(&self.text_renderer, screen.header));
        output
    }

    fn record_scene(
        &mut self,
        builder: &mut AutoCommandBufferBuilder<PrimaryAutoCommandBuffer>,
        image_index: u32,
        worktrees: &[Worktree],
    ) -> Result<()> {
        let output = self.build_scene(worktrees);

        let extent = self.surface.extent();
        let viewport = Viewport {
            offset: [0.0, 0.0],
            extent: [extent[0] as f32, extent[1] as f32],
            depth_range: 0.0..=1.0,
        };

        builder
            .begin_render_pass(
                RenderPassBeginInfo {
                    clear_values: vec![Some(theme::BACKGROUND.to_array().into())],
                    ..RenderPassBeginInfo::framebuffer(
                        self.surface.framebuffers[image_index as usize].clone(),
                    )
                },
                Default::default(),
            )
            .context("Failed to begin render pass")?;

        if !output.spline_vertices.is_empty() {
            let vertex_buffer = self
                .spline_renderer
                .create_vertex_buffer(output.spline_vertices)?;
            self.spline_renderer
                .draw(builder, vertex_buffer, viewport.clone())?;
        }
        if !output.text_vertices.is_empty() {
            let vertex_buffer = self.text_renderer.create_vertex_buffer(output.text_vertices)?;
            self.text_renderer.draw(builder, vertex_buffer, viewport)?;
        }

        builder
            .end_render_pass(Default::default())
            .context("Failed to end render pass")?;

        Ok(())
    }

    fn draw(&mut self, worktrees: &[Worktree]) -> Result<()> {
        self.previous_frame_end
            .as_mut()
            .unwrap()
            .cleanup_finished();

        if self.surface.needs_recreate {
            self.surface.recreate(self.window.inner_size())?;
        }

        let (image_index, suboptimal, acquire_future) =
            match acquire_next_image(self.surface.swapchain.clone(), None)
                .map_err(Validated::unwrap)
            {
                Ok(r) => r,
                Err(VulkanError::OutOfDate) => {
                    self.surface.needs_recreate = true;
                    return Ok(());
                }
                Err(e) => anyhow::bail!("Failed to acquire next image: {e:?}"),
            };

        if suboptimal {
            self.surface.needs_recreate = true;
        }

        let mut builder = AutoCommandBufferBuilder::primary(
            self.ctx.command_buffer_allocator.clone(),
            self.ctx.queue.queue_family_index(),
            CommandBufferUsage::OneTimeSubmit,
        )
        .context("Failed to create command buffer builder")?;

        self.record_scene(&mut builder, image_index, worktrees)?;

        let command_buffer = builder.build().context("Failed to build command buffer")?;

        let future = self
            .previous_frame_end
            .take()
            .unwrap()
            .join(acquire_future)
            .then_execute(self.ctx.queue.clone(), command_buffer)
            .context("Failed to execute command buffer")?
            .then_swapchain_present(
                self.ctx.queue.clone(),
                SwapchainPresentInfo::swapchain_image_index(
                    self.surface.swapchain.clone(),
                    image_index,
                ),
            )
            .then_signal_fence_and_flush();

        match future.map_err(Validated::unwrap) {
            Ok(future) => {
                self.previous_frame_end = Some(future.boxed());
            }
            Err(VulkanError::OutOfDate) => {
                self.surface.needs_recreate = true;
                self.previous_frame_end = Some(sync::now(self.ctx.device.clone()).boxed());
            }
            Err(e) => {
                self.previous_frame_end = Some(sync::now(self.ctx.device.clone()).boxed());
                anyhow::bail!("Failed to flush: {e:?}");
            }
        }

        self.frame_count += 1;
        Ok(())
    }

    fn capture_screenshot(&mut self, worktrees: &[Worktree]) -> Result<image::RgbaImage> {
        self.previous_frame_end
            .as_mut()
            .unwrap()
            .cleanup_finished();

        let (image_index, _suboptimal, acquire_future) =
            acquire_next_image(self.surface.swapchain.clone(), None)
                .map_err(Validated::unwrap)
                .context("Failed to acquire image for screenshot")?;

        let mut builder = AutoCommandBufferBuilder::primary(
            self.ctx.command_buffer_allocator.clone(),
            self.ctx.queue.queue_family_index(),
            CommandBufferUsage::OneTimeSubmit,
        )
        .context("Failed to create command buffer")?;

        self.record_scene(&mut builder, image_index, worktrees)?;

        // Copy must be recorded outside the render pass
        let capture = capture_to_buffer(
            &mut builder,
            self.ctx.memory_allocator.clone(),
            self.surface.images[image_index as usize].clone(),
        )?;

        let command_buffer = builder.build().context("Failed to build command buffer")?;

        let future = self
            .previous_frame_end
            .take()
            .unwrap()
            .join(acquire_future)
            .then_execute(self.ctx.queue.clone(), command_buffer)
            .context("Failed to execute")?
            .then_signal_fence_and_flush()
            .map_err(Validated::unwrap)
            .context("Failed to flush")?;

        future.wait(None).context("Failed to wait for GPU")?;
        self.previous_frame_end = Some(sync::now(self.ctx.device.clone()).boxed());

        capture.to_image()
    }
}
