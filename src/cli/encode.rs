use crate::diag::check_mime_type;
use crate::envelope::Envelope;
use crate::error::{FanowireError, Result};
use crate::sender::{build_envelope, SenderOptions};
use std::path::{Path, PathBuf};

/// Options shared by the commands that read an input file and build an envelope
#[derive(Debug, Clone, Default)]
pub struct EncodeOptions {
    pub sender: SenderOptions,
    /// Skip the image MIME type check
    pub any_type: bool,
}

/// Read the input file, rejecting non-image paths unless `any_type` is set
pub fn read_input(path: &Path, any_type: bool) -> Result<Vec<u8>> {
    if !any_type && !check_mime_type(path) {
        return Err(FanowireError::NotAnImage(path.to_path_buf()));
    }
    Ok(std::fs::read(path)?)
}

/// Build an envelope for `input` with a codec matching the options
pub fn encode_input(input: &Path, options: &EncodeOptions) -> Result<Envelope> {
    let data = read_input(input, options.any_type)?;
    let codec = options.sender.codec()?;
    build_envelope(&data, &codec, &options.sender)
}

/// `<input>.envelope.json`
pub fn default_envelope_path(input: &Path) -> PathBuf {
    let mut os = input.as_os_str().to_os_string();
    os.push(".envelope.json");
    PathBuf::from(os)
}

/// Encode a file and write its envelope as JSON
pub fn encode_file(input: &Path, output: &Path, options: &EncodeOptions) -> Result<Envelope> {
    let envelope = encode_input(input, options)?;
    std::fs::write(output, envelope.to_json()?)?;
    Ok(envelope)
}
