//! Test execution session bridge.
//!
//! The remote rules service runs tests as an asynchronous, session-bound
//! workflow: the start response carries server-assigned correlation
//! headers, and every later result fetch must present them again. This
//! module reconstructs that session locally between otherwise independent
//! tool calls:
//!
//! - [`SessionStore`] keeps the most recent captured headers per project.
//! - [`TestRunLauncher`] starts runs (auto-opening a closed project once)
//!   and commits the captured headers.
//! - [`ResultsPoller`] reads results with session affinity on every call.
//! - [`wait_for_completion`] layers a bounded backoff loop on top.

pub mod launcher;
pub mod poller;
pub mod session;
pub mod wait;

#[cfg(test)]
pub(crate) mod testing;

pub use launcher::{StartReport, TestRunLauncher};
pub use poller::{ResultsPoller, ResultsPage, RunSummary, TableResults};
pub use session::{HeaderCapture, SessionRecord, SessionStore};
pub use wait::{wait_for_completion, WaitOutcome, WaitPolicy};
