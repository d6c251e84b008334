//! Method registry: the fixed table of outbound method descriptors.

use bus_types::{ServiceTarget, TypeTag};

/// Bus daemon (sender identity resolution).
pub const BUS_DAEMON_SERVICE: &str = "org.freedesktop.DBus";
pub const BUS_DAEMON_PATH: &str = "/org/freedesktop/DBus";
pub const BUS_DAEMON_INTERFACE: &str = "org.freedesktop.DBus";

/// Privileged package manager on the system bus.
pub const PKG_MANAGER_SERVICE: &str = "org.pandagen.PackageManager1";
pub const PKG_MANAGER_PATH: &str = "/org/pandagen/PackageManager1";
pub const PKG_MANAGER_INTERFACE: &str = "org.pandagen.PackageManager1.Manager";

/// Session event log collector.
pub const EVENT_LOG_SERVICE: &str = "org.pandagen.EventLog";
pub const EVENT_LOG_PATH: &str = "/org/pandagen/EventLog";
pub const EVENT_LOG_INTERFACE: &str = "org.pandagen.EventLog";

/// Session notification daemon.
pub const NOTIFICATION_SERVICE: &str = "org.freedesktop.Notifications";
pub const NOTIFICATION_PATH: &str = "/org/freedesktop/Notifications";
pub const NOTIFICATION_INTERFACE: &str = "org.freedesktop.Notifications";

/// Session network settings service.
pub const NETWORK_SERVICE: &str = "org.pandagen.Network";
pub const NETWORK_PATH: &str = "/org/pandagen/Network";
pub const NETWORK_INTERFACE: &str = "org.pandagen.Network";

/// Session window manager.
pub const WINDOW_MANAGER_SERVICE: &str = "org.pandagen.WindowManager";
pub const WINDOW_MANAGER_PATH: &str = "/org/pandagen/WindowManager";
pub const WINDOW_MANAGER_INTERFACE: &str = "org.pandagen.WindowManager";

/// Per-window objects: "{WINDOW_PATH_PREFIX}_{window id}".
pub const WINDOW_PATH_PREFIX: &str = "/org/pandagen/WindowManager/Window";
pub const WINDOW_INTERFACE: &str = "org.pandagen.WindowManager.Window";

/// Session control center.
pub const CONTROL_CENTER_SERVICE: &str = "org.pandagen.ControlCenter";
pub const CONTROL_CENTER_PATH: &str = "/org/pandagen/ControlCenter";
pub const CONTROL_CENTER_INTERFACE: &str = "org.pandagen.ControlCenter";

/// Standard properties interface for property reads.
pub const PROPERTIES_INTERFACE: &str = "org.freedesktop.DBus.Properties";

/// Identifies one entry in the registry.
///
/// Lookup is by enum, so an out-of-range id cannot be expressed at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MethodId {
    /// Submit a log line to the event log collector
    ReportLog,
    /// Close a notification by id
    CloseNotification,
    /// Resolve a sender's numeric unix user
    ConnectionIdentity,
    /// Read the configured proxy mode
    ProxyMode,
    /// Read host and port for one proxy kind
    ProxyEndpoint,
    /// Read credentials and enabled flag for one proxy kind
    ProxyCredentials,
    /// Read the active window id
    ActiveWindow,
    /// Forward a notification to the notification daemon
    SendNotification,
}

impl MethodId {
    /// All registry entries, in table order.
    pub const ALL: [MethodId; 8] = [
        MethodId::ReportLog,
        MethodId::CloseNotification,
        MethodId::ConnectionIdentity,
        MethodId::ProxyMode,
        MethodId::ProxyEndpoint,
        MethodId::ProxyCredentials,
        MethodId::ActiveWindow,
        MethodId::SendNotification,
    ];

    fn index(self) -> usize {
        match self {
            MethodId::ReportLog => 0,
            MethodId::CloseNotification => 1,
            MethodId::ConnectionIdentity => 2,
            MethodId::ProxyMode => 3,
            MethodId::ProxyEndpoint => 4,
            MethodId::ProxyCredentials => 5,
            MethodId::ActiveWindow => 6,
            MethodId::SendNotification => 7,
        }
    }
}

/// Input schema of the notification forward call.
pub const SEND_NOTIFICATION_SCHEMA: &[TypeTag] = &[
    TypeTag::STRING,                     // app name
    TypeTag::UINT32,                     // replaces id
    TypeTag::STRING,                     // icon
    TypeTag::STRING,                     // summary
    TypeTag::STRING,                     // body
    TypeTag::ArrayOfString,              // actions
    TypeTag::DictStringToVariantString,  // hints
    TypeTag::INT32,                      // expire timeout
];

const STRING_ARG: &[TypeTag] = &[TypeTag::STRING];
const UINT32_ARG: &[TypeTag] = &[TypeTag::UINT32];
const NO_ARGS: &[TypeTag] = &[];

/// Immutable record naming a remote method and its input schema.
///
/// The schema must exactly match the order and arity of the values supplied
/// at every call site; the encoder enforces this per call.
#[derive(Debug, Clone)]
pub struct MethodDescriptor {
    /// Registry id, or `None` for descriptors built at runtime
    pub id: Option<MethodId>,
    /// Remote object the method lives on
    pub target: ServiceTarget,
    /// Method name
    pub method: String,
    /// Ordered input schema
    pub schema: &'static [TypeTag],
}

impl MethodDescriptor {
    /// Builds a descriptor outside the registry, for objects whose paths are
    /// only known at runtime (per-window objects, property reads).
    pub fn ad_hoc(
        target: ServiceTarget,
        method: impl Into<String>,
        schema: &'static [TypeTag],
    ) -> Self {
        Self {
            id: None,
            target,
            method: method.into(),
            schema,
        }
    }
}

/// Read-only table of the eight well-known outbound methods.
///
/// Built once at startup and handed to the [`CallGateway`]; shared freely
/// afterwards, no locking needed.
///
/// [`CallGateway`]: crate::gateway::CallGateway
#[derive(Debug)]
pub struct MethodRegistry {
    descriptors: Vec<MethodDescriptor>,
}

impl MethodRegistry {
    /// Builds the built-in descriptor table.
    pub fn builtin() -> Self {
        let entry = |id: MethodId,
                     service: &str,
                     path: &str,
                     interface: &str,
                     method: &str,
                     schema: &'static [TypeTag]| MethodDescriptor {
            id: Some(id),
            target: ServiceTarget::new(service, path, interface),
            method: method.to_string(),
            schema,
        };

        let descriptors = vec![
            entry(
                MethodId::ReportLog,
                EVENT_LOG_SERVICE,
                EVENT_LOG_PATH,
                EVENT_LOG_INTERFACE,
                "ReportLog",
                STRING_ARG,
            ),
            entry(
                MethodId::CloseNotification,
                NOTIFICATION_SERVICE,
                NOTIFICATION_PATH,
                NOTIFICATION_INTERFACE,
                "CloseNotification",
                UINT32_ARG,
            ),
            entry(
                MethodId::ConnectionIdentity,
                BUS_DAEMON_SERVICE,
                BUS_DAEMON_PATH,
                BUS_DAEMON_INTERFACE,
                "GetConnectionUnixUser",
                STRING_ARG,
            ),
            entry(
                MethodId::ProxyMode,
                NETWORK_SERVICE,
                NETWORK_PATH,
                NETWORK_INTERFACE,
                "GetProxyMethod",
                NO_ARGS,
            ),
            entry(
                MethodId::ProxyEndpoint,
                NETWORK_SERVICE,
                NETWORK_PATH,
                NETWORK_INTERFACE,
                "GetProxy",
                STRING_ARG,
            ),
            entry(
                MethodId::ProxyCredentials,
                NETWORK_SERVICE,
                NETWORK_PATH,
                NETWORK_INTERFACE,
                "GetProxyAuthentication",
                STRING_ARG,
            ),
            entry(
                MethodId::ActiveWindow,
                WINDOW_MANAGER_SERVICE,
                WINDOW_MANAGER_PATH,
                WINDOW_MANAGER_INTERFACE,
                "ActiveWindow",
                NO_ARGS,
            ),
            entry(
                MethodId::SendNotification,
                NOTIFICATION_SERVICE,
                NOTIFICATION_PATH,
                NOTIFICATION_INTERFACE,
                "Notify",
                SEND_NOTIFICATION_SCHEMA,
            ),
        ];

        Self { descriptors }
    }

    /// Looks up a descriptor.
    pub fn descriptor(&self, id: MethodId) -> &MethodDescriptor {
        &self.descriptors[id.index()]
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Returns true if the table is empty (never, for the built-in table).
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

impl Default for MethodRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
