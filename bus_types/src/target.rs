//! Remote object targets.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Names one remote object on the bus: service, object path, interface.
///
/// Targets are built once (either in the static method registry or ad hoc
/// for per-window objects) and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceTarget {
    /// Bus name of the owning service
    pub service: String,
    /// Object path within the service
    pub path: String,
    /// Interface the method or property belongs to
    pub interface: String,
}

impl ServiceTarget {
    /// Creates a new target.
    pub fn new(
        service: impl Into<String>,
        path: impl Into<String>,
        interface: impl Into<String>,
    ) -> Self {
        Self {
            service: service.into(),
            path: path.into(),
            interface: interface.into(),
        }
    }
}

impl fmt::Display for ServiceTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ({})", self.service, self.path, self.interface)
    }
}
