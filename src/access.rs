//! Access gate consulted before the widget mounts.
//!
//! Authentication lives outside this crate. The surrounding application
//! decides who may chat and hands the decision in as an [`AccessGate`];
//! the controller never inspects credentials itself.

/// Authorization signal supplied by the hosting application.
pub trait AccessGate: Send + Sync {
    /// Whether the current viewer may use the chat widget.
    fn is_authorized(&self) -> bool;
}

/// Gate that admits everyone. Used by the CLI, where whoever runs the
/// binary is the reader.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenAccess;

impl AccessGate for OpenAccess {
    fn is_authorized(&self) -> bool {
        true
    }
}

/// Gate with a fixed answer, for hosts that resolve the session up front.
#[derive(Debug, Clone, Copy)]
pub struct StaticGate(pub bool);

impl AccessGate for StaticGate {
    fn is_authorized(&self) -> bool {
        self.0
    }
}
