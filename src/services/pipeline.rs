use std::fmt::Display;
use std::rc::Rc;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::bridge::{Completion, Token};
use crate::error::{HostError, RasterError};
use crate::models::{ConversionRequest, ConvertOptions};
use crate::rendering::Host;
use crate::services::validator;

/// Prefix of the data locator handed to the host's image decoder.
pub const LOCATOR_PREFIX: &str = "data:image/svg+xml;charset=utf8,";

/// Everything except the characters a URI component may carry unescaped.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// One phase of the conversion pipeline, each with its own failure code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Encoding,
    Loading,
    Drawing,
    Exporting,
}

impl Stage {
    pub const ALL: [Stage; 4] = [
        Stage::Encoding,
        Stage::Loading,
        Stage::Drawing,
        Stage::Exporting,
    ];

    /// The error a run reports when it fails in this stage.
    pub fn failure(self) -> RasterError {
        match self {
            Stage::Encoding => RasterError::UriEncodingFailed,
            Stage::Loading => RasterError::ImgLoadingFailed,
            Stage::Drawing => RasterError::CanvasDrawingFailed,
            Stage::Exporting => RasterError::BlobExportFailed,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Stage::Encoding => "encoding",
            Stage::Loading => "loading",
            Stage::Drawing => "drawing",
            Stage::Exporting => "exporting",
        }
    }
}

/// Percent-encode raw markup into a `data:` locator.
///
/// Only the markup before its first NUL terminator is encoded. Fails only
/// when that part is not valid UTF-8.
pub fn encode_locator(markup: &[u8]) -> Result<String, std::str::Utf8Error> {
    let text = std::str::from_utf8(validator::terminated(markup))?;
    Ok(format!(
        "{LOCATOR_PREFIX}{}",
        utf8_percent_encode(text, URI_COMPONENT)
    ))
}

/// Non-terminal states; the terminal ones are the returned [`Completion`].
enum State<H: Host> {
    Encoding,
    Loading(String),
    Drawing(H::Image),
    Exporting(H::Surface),
}

impl<H: Host> State<H> {
    fn stage(&self) -> Stage {
        match self {
            State::Encoding => Stage::Encoding,
            State::Loading(_) => Stage::Loading,
            State::Drawing(_) => Stage::Drawing,
            State::Exporting(_) => Stage::Exporting,
        }
    }
}

/// Runs one request through encode → load → draw → export.
///
/// Stages only move forward and nothing is retried: every run ends in
/// exactly one [`Completion`].
pub struct StageExecutor<H> {
    host: Rc<H>,
}

impl<H> Clone for StageExecutor<H> {
    fn clone(&self) -> Self {
        Self {
            host: Rc::clone(&self.host),
        }
    }
}

impl<H: Host> StageExecutor<H> {
    pub fn new(host: Rc<H>) -> Self {
        Self { host }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub async fn run(&self, token: Token, request: ConversionRequest) -> Completion {
        let ConversionRequest { markup, options } = request;
        let mut state = State::<H>::Encoding;

        loop {
            state = match state {
                State::Encoding => match encode_locator(&markup) {
                    Ok(locator) => State::Loading(locator),
                    Err(e) => return fail(token, Stage::Encoding, e),
                },
                State::Loading(locator) => match self.host.load_image(&locator).await {
                    Ok(image) => State::Drawing(image),
                    Err(e) => return fail(token, Stage::Loading, e),
                },
                State::Drawing(image) => match self.draw(&image, &options) {
                    Ok(surface) => State::Exporting(surface),
                    Err(e) => return fail(token, Stage::Drawing, e),
                },
                State::Exporting(surface) => {
                    return match self.export(&surface, &options).await {
                        Ok(bytes) => {
                            tracing::debug!(%token, size = bytes.len(), "Conversion done");
                            Completion::Done(bytes)
                        }
                        Err(e) => fail(token, Stage::Exporting, e),
                    };
                }
            };
            tracing::debug!(%token, stage = state.stage().name(), "Entered stage");
        }
    }

    /// Size a fresh surface and draw the decoded image onto it.
    fn draw(&self, image: &H::Image, options: &ConvertOptions) -> Result<H::Surface, HostError> {
        let target = options.draw_target();
        let (width, height) = match target.size {
            Some(size) => size,
            None => {
                let (width, height) = self.host.natural_size(image);
                (width as f32, height as f32)
            }
        };

        let mut surface = self.host.create_surface(width, height)?;
        self.host.draw_image(&mut surface, image, &target)?;
        Ok(surface)
    }

    async fn export(
        &self,
        surface: &H::Surface,
        options: &ConvertOptions,
    ) -> Result<Vec<u8>, HostError> {
        let blob = self
            .host
            .export(surface, &options.format, options.quality)
            .await?
            .ok_or_else(|| HostError::Encode("host returned no data".to_string()))?;

        let bytes = self.host.read_blob(blob).await?;
        if bytes.is_empty() {
            return Err(HostError::Encode("host exported zero bytes".to_string()));
        }
        Ok(bytes)
    }
}

fn fail(token: Token, stage: Stage, error: impl Display) -> Completion {
    let failure = stage.failure();
    tracing::warn!(
        %token,
        stage = stage.name(),
        error = %error,
        "Conversion failed: {}",
        failure.label()
    );
    Completion::Failed(failure)
}
