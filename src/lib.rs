//! Fanowire - entropy coding over an error-correcting channel
//!
//! A byte buffer is squeezed with a Shannon-Fano prefix code built from its
//! own symbol frequencies, then spread over a Hadamard block code so that
//! bit flips on the way to the receiver can be corrected. The receiver
//! reverses both layers and checks the SHA-256 of what it recovered.
//!
//! ## Transform Pipeline
//!
//! ```text
//! Input → Fano compress → Pack/Pad → Orthogonal encode → Channel noise → Envelope
//! Envelope → Orthogonal decode → Unpad → Fano decompress → Verify → Output
//! ```
//!
//! - **Fano compress**: per-message prefix code, table travels in the envelope
//! - **Pack/Pad**: byte-align the bit stream, pad to a fixed byte block
//! - **Orthogonal encode**: each `n`-bit block becomes a `2^n`-bit Hadamard row
//! - **Channel noise**: optional, flips a percentage of bits at random
//! - **Envelope**: base64 payload plus everything needed to undo each step
//!
//! ## Example
//!
//! ```
//! use fanowire::pipeline::OrthogonalCodec;
//! use fanowire::receiver::open_envelope;
//! use fanowire::sender::{build_envelope, SenderOptions};
//!
//! let codec = OrthogonalCodec::new(7).unwrap();
//! let options = SenderOptions {
//!     error_percentage: 5.0,
//!     seed: Some(1),
//!     ..Default::default()
//! };
//! let envelope = build_envelope(b"hello, noisy world", &codec, &options).unwrap();
//! let received = open_envelope(&envelope, &codec).unwrap();
//! assert_eq!(received.data, b"hello, noisy world");
//! assert!(received.report.sha256_match);
//! ```

pub mod bits;
pub mod cli;
pub mod diag;
pub mod envelope;
pub mod error;
pub mod pipeline;
pub mod receiver;
pub mod sender;
pub mod server;
pub mod transport;

pub use bits::BitString;
pub use envelope::{DecodeResponse, Envelope};
pub use error::{FanowireError, Result};
