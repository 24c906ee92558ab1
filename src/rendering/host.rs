use crate::error::HostError;
use crate::models::DrawTarget;
use async_trait::async_trait;

/// Image decoding and 2D drawing primitives of a rendering environment.
///
/// The pipeline reaches the environment only through this trait. Everything
/// runs on one thread; the async primitives are expected to suspend at least
/// once before completing.
#[async_trait(?Send)]
pub trait Host {
    /// A decoded image with a known natural size
    type Image;
    /// An off-screen drawing surface
    type Surface;
    /// Exported, not yet read, raster data
    type Blob;

    /// Decode the image behind a `data:` locator.
    async fn load_image(&self, locator: &str) -> Result<Self::Image, HostError>;

    /// Natural `(width, height)` of a decoded image in pixels.
    fn natural_size(&self, image: &Self::Image) -> (u32, u32);

    /// Allocate a transparent surface. The host decides which sizes it accepts.
    fn create_surface(&self, width: f32, height: f32) -> Result<Self::Surface, HostError>;

    fn draw_image(
        &self,
        surface: &mut Self::Surface,
        image: &Self::Image,
        target: &DrawTarget,
    ) -> Result<(), HostError>;

    /// Encode the surface as `mime` at `quality`.
    ///
    /// `Ok(None)` is a null export. A host may substitute another format for
    /// a MIME type it does not support.
    async fn export(
        &self,
        surface: &Self::Surface,
        mime: &str,
        quality: f32,
    ) -> Result<Option<Self::Blob>, HostError>;

    async fn read_blob(&self, blob: Self::Blob) -> Result<Vec<u8>, HostError>;
}
