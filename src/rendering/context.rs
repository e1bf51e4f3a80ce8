use crate::core::geo::{Rect, Size};

/// Pixel dimensions of a decoded tile image
pub trait TileImage {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
}

/// The drawing surface tiles are composited onto.
///
/// Mirrors a 2D canvas context: state is saved and restored around a pass,
/// and `transform` post-multiplies the current matrix.
pub trait TileCanvas<I> {
    /// Erases the given area in CSS pixels
    fn clear(&mut self, size: Size);

    fn save(&mut self);

    fn restore(&mut self);

    /// Uniform scale of the current matrix, used for the device pixel ratio
    fn scale(&mut self, factor: f64);

    /// Multiplies the current matrix by `[a c e; b d f]`
    fn transform(&mut self, matrix: [f64; 6]);

    /// Draws the whole image stretched over `dest`
    fn draw_image(&mut self, image: &I, dest: Rect);

    /// Draws the `source` region of the image, in image pixels, stretched over `dest`
    fn draw_image_cropped(&mut self, image: &I, source: Rect, dest: Rect);
}

/// Commands that can be issued to the render context
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand<I> {
    Clear(Size),
    Save,
    Restore,
    Scale(f64),
    Transform([f64; 6]),
    Image {
        image: I,
        /// Sub-region of the image in pixels, `None` for the whole image
        source: Option<Rect>,
        dest: Rect,
    },
}

/// Rendering context that records every drawing call.
///
/// Used for headless rendering and by hosts that replay the queue onto
/// their own surface once per frame.
#[derive(Debug, Clone)]
pub struct RenderContext<I> {
    /// Drawing commands in submission order
    pub drawing_queue: Vec<DrawCommand<I>>,
    depth: usize,
}

impl<I> RenderContext<I> {
    pub fn new() -> Self {
        Self {
            drawing_queue: Vec::new(),
            depth: 0,
        }
    }

    /// Begin a frame
    pub fn begin_frame(&mut self) {
        self.drawing_queue.clear();
        self.depth = 0;
    }

    /// Get the current drawing queue
    pub fn get_drawing_queue(&self) -> &[DrawCommand<I>] {
        &self.drawing_queue
    }

    /// Number of unmatched `save` calls
    pub fn save_depth(&self) -> usize {
        self.depth
    }

    /// Iterates over the image draws of the queue as `(image, source, dest)`
    pub fn images(&self) -> impl Iterator<Item = (&I, Option<Rect>, Rect)> {
        self.drawing_queue.iter().filter_map(|command| match command {
            DrawCommand::Image {
                image,
                source,
                dest,
            } => Some((image, *source, *dest)),
            _ => None,
        })
    }
}

impl<I> Default for RenderContext<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: Clone> TileCanvas<I> for RenderContext<I> {
    fn clear(&mut self, size: Size) {
        self.drawing_queue.push(DrawCommand::Clear(size));
    }

    fn save(&mut self) {
        self.depth += 1;
        self.drawing_queue.push(DrawCommand::Save);
    }

    fn restore(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        self.drawing_queue.push(DrawCommand::Restore);
    }

    fn scale(&mut self, factor: f64) {
        self.drawing_queue.push(DrawCommand::Scale(factor));
    }

    fn transform(&mut self, matrix: [f64; 6]) {
        self.drawing_queue.push(DrawCommand::Transform(matrix));
    }

    fn draw_image(&mut self, image: &I, dest: Rect) {
        self.drawing_queue.push(DrawCommand::Image {
            image: image.clone(),
            source: None,
            dest,
        });
    }

    fn draw_image_cropped(&mut self, image: &I, source: Rect, dest: Rect) {
        self.drawing_queue.push(DrawCommand::Image {
            image: image.clone(),
            source: Some(source),
            dest,
        });
    }
}
