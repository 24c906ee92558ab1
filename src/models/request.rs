/// Output parameters for one conversion.
///
/// Quality and geometry are passed through to the host untouched; the host
/// alone decides which values it rejects.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertOptions {
    /// Requested MIME type, e.g. `"image/jpeg"`. Support depends on the host.
    pub format: String,
    /// Encoder quality in `0.0..=1.0`.
    pub quality: f32,
    pub x: f32,
    pub y: f32,
    /// Output width. Set together with `height`, or leave both at zero to use
    /// the decoded image's natural size.
    pub width: f32,
    pub height: f32,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            format: "image/png".to_string(),
            quality: 1.0,
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
        }
    }
}

impl ConvertOptions {
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    pub fn with_quality(mut self, quality: f32) -> Self {
        self.quality = quality;
        self
    }

    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    pub fn sized(mut self, width: f32, height: f32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Where and how large the decoded image is drawn.
    pub fn draw_target(&self) -> DrawTarget {
        DrawTarget {
            x: self.x,
            y: self.y,
            size: self.explicit_size(),
        }
    }

    /// The explicit output size, if both dimensions are set.
    ///
    /// Zero and NaN both count as "not set".
    pub fn explicit_size(&self) -> Option<(f32, f32)> {
        (is_set(self.width) && is_set(self.height)).then_some((self.width, self.height))
    }
}

fn is_set(value: f32) -> bool {
    value != 0.0 && !value.is_nan()
}

/// Placement of the decoded image on the drawing surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawTarget {
    pub x: f32,
    pub y: f32,
    /// Scale the image into this size; `None` draws at natural size.
    pub size: Option<(f32, f32)>,
}

/// One issued conversion, consumed once by the stage executor.
#[derive(Debug, Clone)]
pub struct ConversionRequest {
    pub markup: Vec<u8>,
    pub options: ConvertOptions,
}

impl ConversionRequest {
    pub fn new(markup: impl Into<Vec<u8>>, options: ConvertOptions) -> Self {
        Self {
            markup: markup.into(),
            options,
        }
    }
}
