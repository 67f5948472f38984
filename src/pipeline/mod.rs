//! Pipeline stages for splitting a label PDF by SKU.
//!
//! Each submodule implements exactly one step and is independently
//! testable against an in-memory [`crate::document::LabelDocument`].
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ mode ──▶ group ──▶ write ──▶ verify
//! (path)   (page 2)  (locate   (one PDF   (found vs
//!                     per page) per SKU)   written)
//! ```
//!
//! 1. [`input`]  resolve the file or folder, derive shipment id and
//!    output directory names
//! 2. [`mode`]   probe the second page to pick Standard or Interleaved
//! 3. [`group`]  run [`locate`] on every page, fold the discovery map,
//!    derive the output map for the mode
//! 4. [`write`]  export each SKU's pages to its own file
//! 5. [`verify`] compare labelled pages with written pages

pub mod group;
pub mod input;
pub mod locate;
pub mod mode;
pub mod verify;
pub mod write;
