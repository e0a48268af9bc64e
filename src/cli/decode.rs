use crate::envelope::{DecodeFailure, DecodeResponse, Envelope};
use crate::error::Result;
use crate::pipeline::OrthogonalCodec;
use crate::receiver::open_envelope;
use std::path::Path;

/// Decode an envelope file. The codec is built for the block width the
/// envelope declares. Decoding problems come back as a failure response;
/// only IO errors are returned as `Err`.
pub fn decode_file(envelope_path: &Path, output: Option<&Path>) -> Result<DecodeResponse> {
    let body = std::fs::read(envelope_path)?;

    let received = Envelope::from_json(&body).and_then(|envelope| {
        let codec = OrthogonalCodec::new(envelope.parameters.encoding_params.n)?;
        open_envelope(&envelope, &codec)
    });

    match received {
        Ok(received) => {
            if let Some(path) = output {
                std::fs::write(path, &received.data)?;
            }
            Ok(DecodeResponse::Success(received.report))
        }
        Err(e) => Ok(DecodeResponse::Failure(DecodeFailure::new(&e))),
    }
}
