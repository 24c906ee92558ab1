//! Scripted host for pipeline tests.
//!
//! Records every primitive it is asked to run and can be told to fail at any
//! point of the pipeline.

use async_trait::async_trait;
use std::cell::RefCell;
use svg2raster::models::DrawTarget;
use svg2raster::{Host, HostError};

/// Where the scripted host should fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailAt {
    Load,
    Surface,
    Draw,
    Export,
    NullExport,
    Read,
    EmptyRead,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MockSurface {
    pub width: f32,
    pub height: f32,
}

pub struct ScriptedHost {
    natural: (u32, u32),
    fail_at: Option<FailAt>,
    calls: RefCell<Vec<&'static str>>,
    surfaces: RefCell<Vec<MockSurface>>,
    targets: RefCell<Vec<DrawTarget>>,
}

impl ScriptedHost {
    pub fn new(natural: (u32, u32)) -> Self {
        Self {
            natural,
            fail_at: None,
            calls: RefCell::new(Vec::new()),
            surfaces: RefCell::new(Vec::new()),
            targets: RefCell::new(Vec::new()),
        }
    }

    pub fn failing_at(mut self, fail_at: FailAt) -> Self {
        self.fail_at = Some(fail_at);
        self
    }

    /// Primitives called so far, in order
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.borrow().clone()
    }

    /// Sizes of every surface created so far
    pub fn surfaces(&self) -> Vec<MockSurface> {
        self.surfaces.borrow().clone()
    }

    pub fn targets(&self) -> Vec<DrawTarget> {
        self.targets.borrow().clone()
    }

    fn record(&self, call: &'static str) {
        self.calls.borrow_mut().push(call);
    }

    fn fails_at(&self, point: FailAt) -> bool {
        self.fail_at == Some(point)
    }
}

/// PNG signature followed by the surface size, enough for format sniffing
pub fn fake_png(surface: &MockSurface) -> Vec<u8> {
    let mut bytes = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    bytes.extend_from_slice(&(surface.width as u32).to_be_bytes());
    bytes.extend_from_slice(&(surface.height as u32).to_be_bytes());
    bytes
}

#[async_trait(?Send)]
impl Host for ScriptedHost {
    type Image = (u32, u32);
    type Surface = MockSurface;
    type Blob = Vec<u8>;

    async fn load_image(&self, locator: &str) -> Result<(u32, u32), HostError> {
        self.record("load_image");
        tokio::task::yield_now().await;
        assert!(locator.starts_with("data:image/svg+xml"));
        if self.fails_at(FailAt::Load) {
            return Err(HostError::SvgParse("scripted".to_string()));
        }
        Ok(self.natural)
    }

    fn natural_size(&self, image: &(u32, u32)) -> (u32, u32) {
        *image
    }

    fn create_surface(&self, width: f32, height: f32) -> Result<MockSurface, HostError> {
        self.record("create_surface");
        if self.fails_at(FailAt::Surface) {
            return Err(HostError::InvalidSurface { width, height });
        }
        let surface = MockSurface { width, height };
        self.surfaces.borrow_mut().push(surface);
        Ok(surface)
    }

    fn draw_image(
        &self,
        _surface: &mut MockSurface,
        _image: &(u32, u32),
        target: &DrawTarget,
    ) -> Result<(), HostError> {
        self.record("draw_image");
        if self.fails_at(FailAt::Draw) {
            return Err(HostError::InvalidGeometry("scripted".to_string()));
        }
        self.targets.borrow_mut().push(*target);
        Ok(())
    }

    async fn export(
        &self,
        surface: &MockSurface,
        _mime: &str,
        _quality: f32,
    ) -> Result<Option<Vec<u8>>, HostError> {
        self.record("export");
        tokio::task::yield_now().await;
        if self.fails_at(FailAt::Export) {
            return Err(HostError::Encode("scripted".to_string()));
        }
        if self.fails_at(FailAt::NullExport) {
            return Ok(None);
        }
        Ok(Some(fake_png(surface)))
    }

    async fn read_blob(&self, blob: Vec<u8>) -> Result<Vec<u8>, HostError> {
        self.record("read_blob");
        tokio::task::yield_now().await;
        if self.fails_at(FailAt::Read) {
            return Err(HostError::Encode("scripted".to_string()));
        }
        if self.fails_at(FailAt::EmptyRead) {
            return Ok(Vec::new());
        }
        Ok(blob)
    }
}
