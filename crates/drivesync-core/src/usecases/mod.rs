//! Use cases (interactors) for drivesync
//!
//! Use cases are thin coordinators that delegate I/O to ports.
//!
//! ## Use Cases
//!
//! - [`ResolveFolderUseCase`] - Find or create the well-known remote folder

pub mod resolve_folder;

pub use resolve_folder::ResolveFolderUseCase;
