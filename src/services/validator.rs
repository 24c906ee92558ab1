use crate::error::RasterError;

/// The markup up to, not including, its first NUL terminator.
///
/// Markup is a NUL-terminated string; anything after the terminator is
/// never read.
pub fn terminated(markup: &[u8]) -> &[u8] {
    match markup.iter().position(|&b| b == 0) {
        Some(end) => &markup[..end],
        None => markup,
    }
}

/// Checks a request can be made before anything crosses to the host.
///
/// Only missing input is detectable here: markup that is empty once cut at
/// its terminator. Malformed markup is left for the host to reject.
pub fn validate(markup: &[u8]) -> Result<(), RasterError> {
    if terminated(markup).is_empty() {
        return Err(RasterError::NoInputData);
    }
    Ok(())
}
