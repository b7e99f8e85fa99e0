//! Client-side synchronization for Stonecross.
//!
//! Players poll room documents; the operator pushes full documents with a
//! version precondition; character sheets autosave after a quiet period.
//! Everything talks to the server through the [`transport`] traits, with
//! `reqwest` implementations in [`http`].

pub mod autosave;
pub mod cursor;
pub mod error;
pub mod http;
pub mod poller;
pub mod transport;
pub mod writer;

pub use autosave::{AUTOSAVE_DELAY, Autosave};
pub use cursor::SyncCursor;
pub use error::SyncError;
pub use http::{HttpDocumentTransport, HttpSheetSink};
pub use poller::{POLL_INTERVAL, Poller};
pub use transport::{DocumentTransport, SheetSink};
pub use writer::{DocumentWriter, SaveStatus};
