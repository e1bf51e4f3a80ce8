pub mod cache;
pub mod loader;
pub mod renderer;
pub mod visibility;

// Re-exports for convenience
pub use cache::{FrameScheduler, ImageCache};
#[cfg(feature = "http")]
pub use loader::HttpImageFetcher;
pub use loader::ImageFetcher;
pub use renderer::{RenderStats, TileRenderer};
pub use visibility::{visible_tiles, TileDescriptor, TileIndex};
