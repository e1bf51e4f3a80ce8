use crate::{
    core::{
        config::ViewerConfig,
        geo::{Point, Size},
        transform::Transformation,
    },
    input::TransformationProvider,
    prelude::Arc,
    rendering::{TileCanvas, TileImage},
    runtime::AsyncSpawner,
    tiles::{FrameScheduler, ImageCache, ImageFetcher, RenderStats, TileRenderer},
    Result,
};

/// Owns the view state of one map surface and draws it on demand.
///
/// The view does not animate or interpret input: gestures reach it through
/// [`TransformationProvider`], and the host calls [`MapView::on_frame`] from
/// its animation-frame callback.
pub struct MapView<F: ImageFetcher> {
    config: ViewerConfig,
    transformation: Transformation,
    size: Size,
    device_pixel_ratio: f64,
    origin: Point,
    renderer: TileRenderer,
    cache: ImageCache<F>,
    needs_render: bool,
    last_stats: RenderStats,
}

impl<F> MapView<F>
where
    F: ImageFetcher,
    F::Image: TileImage,
{
    pub fn new(
        config: ViewerConfig,
        fetcher: Arc<F>,
        spawner: Arc<dyn AsyncSpawner>,
        scheduler: Arc<dyn FrameScheduler>,
    ) -> Result<Self> {
        config.validate()?;
        let cache = ImageCache::new(
            config.base_url.clone(),
            config.cache.clone(),
            fetcher,
            spawner,
            scheduler,
        );
        Ok(Self {
            origin: config.origin_pixel(),
            renderer: TileRenderer::from_config(&config),
            config,
            transformation: Transformation::IDENTITY,
            size: Size::new(0.0, 0.0),
            device_pixel_ratio: 1.0,
            cache,
            needs_render: false,
            last_stats: RenderStats::default(),
        })
    }

    /// Records a new viewport size in CSS pixels and the display's device
    /// pixel ratio.
    pub fn set_size(&mut self, size: Size, device_pixel_ratio: f64) {
        self.size = size;
        self.device_pixel_ratio = if device_pixel_ratio > 0.0 {
            device_pixel_ratio
        } else {
            1.0
        };
        self.needs_render = true;
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn device_pixel_ratio(&self) -> f64 {
        self.device_pixel_ratio
    }

    /// Pixel dimensions the host should give its drawing surface
    pub fn backing_size(&self) -> (u32, u32) {
        let ratio = if self.config.high_quality {
            self.device_pixel_ratio
        } else {
            1.0
        };
        (
            (self.size.width * ratio).round() as u32,
            (self.size.height * ratio).round() as u32,
        )
    }

    pub fn transformation(&self) -> Transformation {
        self.transformation
    }

    /// Whether the view changed since the last render
    pub fn needs_render(&self) -> bool {
        self.needs_render
    }

    /// Draws the current view
    pub fn render<C>(&mut self, canvas: &mut C) -> RenderStats
    where
        C: TileCanvas<F::Image>,
    {
        self.needs_render = false;
        self.last_stats = self.renderer.render(
            canvas,
            &mut self.cache,
            &self.transformation,
            self.size,
            self.device_pixel_ratio,
            self.origin,
        );
        self.last_stats
    }

    /// Animation-frame callback: collects finished loads and redraws when
    /// images arrived or the view changed.
    pub fn on_frame<C>(&mut self, canvas: &mut C) -> Option<RenderStats>
    where
        C: TileCanvas<F::Image>,
    {
        if self.cache.handle_frame() {
            self.needs_render = true;
        }
        if self.needs_render {
            Some(self.render(canvas))
        } else {
            None
        }
    }

    pub fn last_stats(&self) -> RenderStats {
        self.last_stats
    }

    /// Global pixel the world origin is anchored to
    pub fn origin(&self) -> Point {
        self.origin
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn cache(&self) -> &ImageCache<F> {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut ImageCache<F> {
        &mut self.cache
    }
}

impl<F: ImageFetcher> TransformationProvider for MapView<F> {
    fn get(&self) -> Transformation {
        self.transformation
    }

    fn set(&mut self, transformation: Transformation) {
        log::trace!("view transformation {:?}", transformation);
        self.transformation = transformation;
        self.needs_render = true;
    }
}
