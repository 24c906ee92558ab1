pub mod converter;
pub mod pipeline;
pub mod validator;

pub use converter::Converter;
pub use pipeline::{encode_locator, Stage, StageExecutor};
pub use validator::validate;
