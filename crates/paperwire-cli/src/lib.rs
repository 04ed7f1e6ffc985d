//! Paperwire CLI - File trees over QR stacks and printable text
//!
//! This crate provides the four commands of the `paperwire` binary:
//! - `pack` / `unpack` move a file tree through a stack of QR images
//! - `seal` / `open` move single files through password-encrypted text
//!
//! The byte-level pipelines live in `paperwire-core`; this crate adds the
//! channel collaborators around them (QR rendering and scanning, digit
//! extraction, password entry) and the command plumbing.

pub mod open;
pub mod pack;
pub mod password;
pub mod qr;
pub mod seal;
pub mod source;
pub mod unpack;

pub use source::{DigitSource, QrScanSource, RawDigitSource};
