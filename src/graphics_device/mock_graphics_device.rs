/// Mock graphics device for unit tests
///
/// Implements the whole device seam in memory. Buffers store real bytes,
/// command lists record readable strings, and every resource decrements a
/// live counter when dropped so tests can assert nothing leaks across a
/// recreation cascade.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use winit::window::Window;

use crate::error::{Error, Result};
use crate::graphics_device::{
    AddressMode, Buffer, BufferDesc, ClearValue, CommandList, DescriptorBinding, DescriptorPool,
    DescriptorPoolDesc, DescriptorSet, Framebuffer, FramebufferDesc, FrontFace, GraphicsDevice,
    ImageLayout, IndexType, Pipeline, PipelineDesc, PolygonMode, PrimitiveTopology, RenderPass,
    RenderPassDesc, Sampler, SamplerDesc, Shader, ShaderDesc, Swapchain, Texture, TextureDesc,
    TextureFormat, TextureInfo, TextureUsage, CullMode,
};

#[path = "mock_graphics_device_tests.rs"]
mod tests;

// ===== LIVE-RESOURCE TRACKING =====

/// Decrements a shared counter when dropped
struct CountGuard(Arc<AtomicUsize>);

impl CountGuard {
    fn new(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(Arc::clone(counter))
    }

    /// Guard on a private counter nobody observes
    fn detached() -> Self {
        Self::new(&Arc::new(AtomicUsize::new(0)))
    }
}

impl Drop for CountGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// One live counter per resource category
#[derive(Default)]
struct LiveCounts {
    buffers: Arc<AtomicUsize>,
    textures: Arc<AtomicUsize>,
    samplers: Arc<AtomicUsize>,
    shaders: Arc<AtomicUsize>,
    pipelines: Arc<AtomicUsize>,
    render_passes: Arc<AtomicUsize>,
    framebuffers: Arc<AtomicUsize>,
    descriptor_pools: Arc<AtomicUsize>,
    descriptor_sets: Arc<AtomicUsize>,
    command_lists: Arc<AtomicUsize>,
}

/// Snapshot of fixed-function state captured at pipeline creation
#[derive(Debug, Clone)]
pub struct PipelineRecord {
    pub topology: PrimitiveTopology,
    pub polygon_mode: PolygonMode,
    pub cull_mode: CullMode,
    pub front_face: FrontFace,
    pub blend_enable: bool,
    pub has_fragment_shader: bool,
    pub extent: (u32, u32),
    pub descriptor_bindings: usize,
}

// ===== DEVICE =====

pub struct MockGraphicsDevice {
    live: LiveCounts,
    created_pipelines: Mutex<Vec<PipelineRecord>>,
    created_texture_formats: Mutex<Vec<TextureFormat>>,
    set_writes: Arc<Mutex<Vec<Vec<String>>>>,
    command_streams: Mutex<Vec<Arc<Mutex<Vec<String>>>>>,
    begin_count: Arc<AtomicUsize>,
}

impl MockGraphicsDevice {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            live: LiveCounts::default(),
            created_pipelines: Mutex::new(Vec::new()),
            created_texture_formats: Mutex::new(Vec::new()),
            set_writes: Arc::new(Mutex::new(Vec::new())),
            command_streams: Mutex::new(Vec::new()),
            begin_count: Arc::new(AtomicUsize::new(0)),
        })
    }

    // Live-resource counters

    pub fn live_buffers(&self) -> usize {
        self.live.buffers.load(Ordering::SeqCst)
    }

    pub fn live_textures(&self) -> usize {
        self.live.textures.load(Ordering::SeqCst)
    }

    pub fn live_samplers(&self) -> usize {
        self.live.samplers.load(Ordering::SeqCst)
    }

    pub fn live_shaders(&self) -> usize {
        self.live.shaders.load(Ordering::SeqCst)
    }

    pub fn live_pipelines(&self) -> usize {
        self.live.pipelines.load(Ordering::SeqCst)
    }

    pub fn live_render_passes(&self) -> usize {
        self.live.render_passes.load(Ordering::SeqCst)
    }

    pub fn live_framebuffers(&self) -> usize {
        self.live.framebuffers.load(Ordering::SeqCst)
    }

    pub fn live_descriptor_pools(&self) -> usize {
        self.live.descriptor_pools.load(Ordering::SeqCst)
    }

    pub fn live_descriptor_sets(&self) -> usize {
        self.live.descriptor_sets.load(Ordering::SeqCst)
    }

    pub fn live_command_lists(&self) -> usize {
        self.live.command_lists.load(Ordering::SeqCst)
    }

    // Creation/recording inspection

    pub fn created_pipelines(&self) -> Vec<PipelineRecord> {
        self.created_pipelines.lock().unwrap().clone()
    }

    pub fn created_texture_formats(&self) -> Vec<TextureFormat> {
        self.created_texture_formats.lock().unwrap().clone()
    }

    /// Binding writes of each allocated descriptor set, in allocation order
    pub fn descriptor_set_writes(&self) -> Vec<Vec<String>> {
        self.set_writes.lock().unwrap().clone()
    }

    /// Number of command lists created so far
    pub fn command_stream_count(&self) -> usize {
        self.command_streams.lock().unwrap().len()
    }

    /// Commands recorded into the `index`-th created command list
    pub fn command_stream(&self, index: usize) -> Vec<String> {
        self.command_streams.lock().unwrap()[index].lock().unwrap().clone()
    }

    /// Total `begin()` calls across all command lists ever created
    pub fn total_begins(&self) -> usize {
        self.begin_count.load(Ordering::SeqCst)
    }
}

impl GraphicsDevice for MockGraphicsDevice {
    fn create_buffer(&self, desc: &BufferDesc) -> Result<Arc<dyn Buffer>> {
        if desc.size == 0 {
            return Err(Error::InvalidResource("zero-sized buffer".to_string()));
        }
        Ok(Arc::new(MockBuffer {
            _guard: CountGuard::new(&self.live.buffers),
            data: Mutex::new(vec![0u8; desc.size as usize]),
            size: desc.size,
        }))
    }

    fn create_texture(&self, desc: &TextureDesc) -> Result<Arc<dyn Texture>> {
        if !self.is_format_supported(desc.format) {
            return Err(Error::InvalidResource(format!(
                "unsupported texture format {:?}",
                desc.format
            )));
        }
        if let Some(data) = &desc.data {
            let expected =
                desc.width as usize * desc.height as usize * desc.format.bytes_per_pixel() as usize;
            if data.len() != expected {
                return Err(Error::InvalidResource(format!(
                    "texture data is {} bytes, expected {}",
                    data.len(),
                    expected
                )));
            }
        }
        self.created_texture_formats.lock().unwrap().push(desc.format);
        Ok(Arc::new(MockTexture {
            _guard: CountGuard::new(&self.live.textures),
            info: TextureInfo {
                width: desc.width,
                height: desc.height,
                format: desc.format,
                usage: desc.usage,
            },
        }))
    }

    fn create_sampler(&self, _desc: &SamplerDesc) -> Result<Arc<dyn Sampler>> {
        Ok(Arc::new(MockSampler {
            _guard: CountGuard::new(&self.live.samplers),
        }))
    }

    fn create_shader(&self, desc: &ShaderDesc) -> Result<Arc<dyn Shader>> {
        if desc.code.is_empty() {
            return Err(Error::InvalidResource(format!(
                "shader '{}' has empty bytecode",
                desc.name
            )));
        }
        Ok(Arc::new(MockShader {
            _guard: CountGuard::new(&self.live.shaders),
        }))
    }

    fn create_pipeline(&self, desc: &PipelineDesc) -> Result<Arc<dyn Pipeline>> {
        self.created_pipelines.lock().unwrap().push(PipelineRecord {
            topology: desc.topology,
            polygon_mode: desc.rasterization.polygon_mode,
            cull_mode: desc.rasterization.cull_mode,
            front_face: desc.rasterization.front_face,
            blend_enable: desc.color_blend.blend_enable,
            has_fragment_shader: desc.fragment_shader.is_some(),
            extent: desc.extent,
            descriptor_bindings: desc.descriptor_layout.len(),
        });
        Ok(Arc::new(MockPipeline {
            _guard: CountGuard::new(&self.live.pipelines),
        }))
    }

    fn create_render_pass(&self, _desc: &RenderPassDesc) -> Result<Arc<dyn RenderPass>> {
        Ok(Arc::new(MockRenderPass {
            _guard: CountGuard::new(&self.live.render_passes),
        }))
    }

    fn create_framebuffer(&self, desc: &FramebufferDesc) -> Result<Arc<dyn Framebuffer>> {
        Ok(Arc::new(MockFramebuffer {
            _guard: CountGuard::new(&self.live.framebuffers),
            width: desc.width,
            height: desc.height,
        }))
    }

    fn create_descriptor_pool(&self, desc: &DescriptorPoolDesc) -> Result<Box<dyn DescriptorPool>> {
        if desc.max_sets == 0 {
            return Err(Error::InvalidResource("descriptor pool with max_sets = 0".to_string()));
        }
        Ok(Box::new(MockDescriptorPool {
            _guard: CountGuard::new(&self.live.descriptor_pools),
            set_counter: Arc::clone(&self.live.descriptor_sets),
            writes_log: Arc::clone(&self.set_writes),
        }))
    }

    fn create_command_list(&self) -> Result<Box<dyn CommandList>> {
        let stream = Arc::new(Mutex::new(Vec::new()));
        self.command_streams.lock().unwrap().push(Arc::clone(&stream));
        Ok(Box::new(MockCommandList {
            _guard: CountGuard::new(&self.live.command_lists),
            stream,
            begin_count: Arc::clone(&self.begin_count),
            recording: false,
            in_render_pass: false,
        }))
    }

    fn create_swapchain(&self, _window: &Window) -> Result<Box<dyn Swapchain>> {
        Err(Error::InitializationFailed(
            "mock device cannot create a window surface".to_string(),
        ))
    }

    fn copy_buffer_blocking(
        &self,
        src: &Arc<dyn Buffer>,
        dst: &Arc<dyn Buffer>,
        size: u64,
    ) -> Result<()> {
        let bytes = src.read_back(0, size)?;
        dst.update(0, &bytes)
    }

    fn is_format_supported(&self, format: TextureFormat) -> bool {
        // 24-bit RGB is the classic gap in real drivers; reproduce it here
        // so the fallback path gets exercised.
        format != TextureFormat::R8G8B8_UNORM
    }

    fn min_uniform_offset_alignment(&self) -> u64 {
        256
    }

    fn wait_idle(&self) -> Result<()> {
        Ok(())
    }
}

// ===== RESOURCES =====

struct MockBuffer {
    _guard: CountGuard,
    data: Mutex<Vec<u8>>,
    size: u64,
}

impl Buffer for MockBuffer {
    fn update(&self, offset: u64, data: &[u8]) -> Result<()> {
        let end = offset as usize + data.len();
        let mut bytes = self.data.lock().unwrap();
        if end > bytes.len() {
            return Err(Error::InvalidResource(format!(
                "buffer write of {} bytes at offset {} overflows size {}",
                data.len(),
                offset,
                bytes.len()
            )));
        }
        bytes[offset as usize..end].copy_from_slice(data);
        Ok(())
    }

    fn read_back(&self, offset: u64, len: u64) -> Result<Vec<u8>> {
        let end = (offset + len) as usize;
        let bytes = self.data.lock().unwrap();
        if end > bytes.len() {
            return Err(Error::InvalidResource(format!(
                "buffer read of {} bytes at offset {} overflows size {}",
                len,
                offset,
                bytes.len()
            )));
        }
        Ok(bytes[offset as usize..end].to_vec())
    }

    fn size(&self) -> u64 {
        self.size
    }
}

struct MockTexture {
    _guard: CountGuard,
    info: TextureInfo,
}

impl MockTexture {
    /// Texture outside any device's live count (swapchain images)
    fn detached(info: TextureInfo) -> Arc<dyn Texture> {
        Arc::new(Self {
            _guard: CountGuard::detached(),
            info,
        })
    }
}

impl Texture for MockTexture {
    fn info(&self) -> &TextureInfo {
        &self.info
    }
}

struct MockSampler {
    _guard: CountGuard,
}

impl Sampler for MockSampler {}

struct MockShader {
    _guard: CountGuard,
}

impl Shader for MockShader {}

struct MockPipeline {
    _guard: CountGuard,
}

impl Pipeline for MockPipeline {}

struct MockRenderPass {
    _guard: CountGuard,
}

impl RenderPass for MockRenderPass {}

struct MockFramebuffer {
    _guard: CountGuard,
    width: u32,
    height: u32,
}

impl Framebuffer for MockFramebuffer {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }
}

// ===== DESCRIPTORS =====

struct MockDescriptorPool {
    _guard: CountGuard,
    set_counter: Arc<AtomicUsize>,
    writes_log: Arc<Mutex<Vec<Vec<String>>>>,
}

impl DescriptorPool for MockDescriptorPool {
    fn allocate_set(&self, bindings: &[DescriptorBinding]) -> Result<Arc<dyn DescriptorSet>> {
        let writes = bindings
            .iter()
            .map(|b| match b {
                DescriptorBinding::UniformBuffer { binding, .. } => {
                    format!("uniform@{binding}")
                }
                DescriptorBinding::DynamicUniformBuffer { binding, .. } => {
                    format!("dynamic_uniform@{binding}")
                }
                DescriptorBinding::CombinedImageSampler { binding, .. } => {
                    format!("texture@{binding}")
                }
            })
            .collect();
        self.writes_log.lock().unwrap().push(writes);
        Ok(Arc::new(MockDescriptorSet {
            _guard: CountGuard::new(&self.set_counter),
        }))
    }
}

struct MockDescriptorSet {
    _guard: CountGuard,
}

impl DescriptorSet for MockDescriptorSet {}

// ===== COMMAND LIST =====

struct MockCommandList {
    _guard: CountGuard,
    stream: Arc<Mutex<Vec<String>>>,
    begin_count: Arc<AtomicUsize>,
    recording: bool,
    in_render_pass: bool,
}

impl MockCommandList {
    fn push(&self, command: String) -> Result<()> {
        if !self.recording {
            return Err(Error::InvalidResource(format!(
                "'{command}' recorded outside begin/end"
            )));
        }
        self.stream.lock().unwrap().push(command);
        Ok(())
    }
}

impl CommandList for MockCommandList {
    fn begin(&mut self) -> Result<()> {
        if self.recording {
            return Err(Error::InvalidResource("begin() while already recording".to_string()));
        }
        self.recording = true;
        self.begin_count.fetch_add(1, Ordering::SeqCst);
        let mut stream = self.stream.lock().unwrap();
        stream.clear();
        stream.push("begin".to_string());
        Ok(())
    }

    fn end(&mut self) -> Result<()> {
        if !self.recording {
            return Err(Error::InvalidResource("end() without begin()".to_string()));
        }
        if self.in_render_pass {
            return Err(Error::InvalidResource("end() inside a render pass".to_string()));
        }
        self.recording = false;
        self.stream.lock().unwrap().push("end".to_string());
        Ok(())
    }

    fn begin_render_pass(
        &mut self,
        _render_pass: &Arc<dyn RenderPass>,
        _framebuffer: &Arc<dyn Framebuffer>,
        clear_values: &[ClearValue],
    ) -> Result<()> {
        if self.in_render_pass {
            return Err(Error::InvalidResource("nested render pass".to_string()));
        }
        let clears: Vec<String> = clear_values
            .iter()
            .map(|c| match c {
                ClearValue::Color(_) => "color".to_string(),
                ClearValue::DepthStencil { depth, .. } => format!("depth={depth}"),
            })
            .collect();
        self.push(format!("begin_render_pass [{}]", clears.join(", ")))?;
        self.in_render_pass = true;
        Ok(())
    }

    fn end_render_pass(&mut self) -> Result<()> {
        if !self.in_render_pass {
            return Err(Error::InvalidResource(
                "end_render_pass() outside a render pass".to_string(),
            ));
        }
        self.push("end_render_pass".to_string())?;
        self.in_render_pass = false;
        Ok(())
    }

    fn bind_pipeline(&mut self, _pipeline: &Arc<dyn Pipeline>) -> Result<()> {
        self.push("bind_pipeline".to_string())
    }

    fn bind_descriptor_set(
        &mut self,
        _pipeline: &Arc<dyn Pipeline>,
        _set: &Arc<dyn DescriptorSet>,
        dynamic_offsets: &[u32],
    ) -> Result<()> {
        self.push(format!("bind_descriptor_set offsets={dynamic_offsets:?}"))
    }

    fn bind_vertex_buffer(&mut self, _buffer: &Arc<dyn Buffer>, offset: u64) -> Result<()> {
        self.push(format!("bind_vertex_buffer offset={offset}"))
    }

    fn bind_index_buffer(
        &mut self,
        _buffer: &Arc<dyn Buffer>,
        offset: u64,
        index_type: IndexType,
    ) -> Result<()> {
        self.push(format!("bind_index_buffer offset={offset} {index_type:?}"))
    }

    fn draw(
        &mut self,
        vertex_count: u32,
        instance_count: u32,
        _first_vertex: u32,
        _first_instance: u32,
    ) -> Result<()> {
        self.push(format!("draw {vertex_count}x{instance_count}"))
    }

    fn draw_indexed(
        &mut self,
        index_count: u32,
        instance_count: u32,
        _first_index: u32,
        _vertex_offset: i32,
        _first_instance: u32,
    ) -> Result<()> {
        self.push(format!("draw_indexed {index_count}x{instance_count}"))
    }

    fn transition_texture(
        &mut self,
        _texture: &Arc<dyn Texture>,
        from: ImageLayout,
        to: ImageLayout,
    ) -> Result<()> {
        if self.in_render_pass {
            return Err(Error::InvalidResource(
                "texture transition inside a render pass".to_string(),
            ));
        }
        self.push(format!("transition {from:?}->{to:?}"))
    }
}

// ===== SWAPCHAIN =====

/// Mock swapchain, constructed directly by tests (no window needed)
pub struct MockSwapchain {
    image_count: usize,
    width: u32,
    height: u32,
    images: Vec<Arc<dyn Texture>>,
    next_image: u32,
    /// Image count applied by the next `recreate()`; 0 keeps the current count
    pending_image_count: Arc<AtomicUsize>,
}

impl MockSwapchain {
    pub fn new(image_count: usize, width: u32, height: u32) -> Self {
        Self {
            image_count,
            width,
            height,
            images: Self::make_images(image_count, width, height),
            next_image: 0,
            pending_image_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Handle for changing the image count across a later `recreate()`
    pub fn pending_image_count_handle(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.pending_image_count)
    }

    fn make_images(count: usize, width: u32, height: u32) -> Vec<Arc<dyn Texture>> {
        (0..count)
            .map(|_| {
                MockTexture::detached(TextureInfo {
                    width,
                    height,
                    format: TextureFormat::B8G8R8A8_UNORM,
                    usage: TextureUsage::RenderTarget,
                })
            })
            .collect()
    }
}

impl Swapchain for MockSwapchain {
    fn acquire_next_image(&mut self) -> Result<u32> {
        let index = self.next_image;
        self.next_image = (self.next_image + 1) % self.image_count as u32;
        Ok(index)
    }

    fn present(&mut self, image_index: u32) -> Result<()> {
        if image_index as usize >= self.image_count {
            return Err(Error::InvalidResource(format!(
                "present of image {image_index} with only {} images",
                self.image_count
            )));
        }
        Ok(())
    }

    fn recreate(&mut self, width: u32, height: u32) -> Result<()> {
        let pending = self.pending_image_count.swap(0, Ordering::SeqCst);
        if pending != 0 {
            self.image_count = pending;
        }
        self.width = width;
        self.height = height;
        self.images = Self::make_images(self.image_count, width, height);
        self.next_image = 0;
        Ok(())
    }

    fn image_count(&self) -> usize {
        self.image_count
    }

    fn image(&self, index: usize) -> Result<Arc<dyn Texture>> {
        self.images
            .get(index)
            .cloned()
            .ok_or_else(|| Error::InvalidResource(format!("swapchain image {index} out of range")))
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn format(&self) -> TextureFormat {
        TextureFormat::B8G8R8A8_UNORM
    }
}
