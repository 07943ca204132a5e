//! Lambda@Edge Workspace - integration tests for edge event building and
//! handler validation.
//!
//! This is a virtual package that provides workspace-level integration tests.
//! The actual functionality is provided by the workspace member crates:
//!
//! - `lambda-edge-event`: builds Lambda@Edge events and validates handler payloads
//! - `edge-handler-example`: example edge handlers driven by the harness
