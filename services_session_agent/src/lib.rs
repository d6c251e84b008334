//! # Session Agent Service
//!
//! Session-side bridge between the privileged package manager and the user
//! session's services: the notification daemon, the network settings
//! service, the window manager and the control center.
//!
//! ## Philosophy
//!
//! - **One call at a time**: strictly synchronous; an inbound call is
//!   serviced to completion before the next one is looked at
//! - **Fail-closed authorization**: every inbound operation verifies the
//!   caller resolves to uid 0 before doing anything on its behalf
//! - **Best-effort fan-out**: where one inbound call fans out to several
//!   outbound ones, individual failures are logged and skipped; only the
//!   call the reply depends on fails the operation
//!
//! ## Inbound surface
//!
//! `CloseNotification(u)`, `GetManualProxy() -> a{ss}`, `ReportLog(s)` and
//! `SendNotify(susssasa{sv}i) -> u`, all dispatched through
//! [`SessionAgent::dispatch`]. The bus pump that reads messages and writes
//! replies lives outside this crate; it hands every inbound message here as
//! an [`InboundCall`].

pub mod auth;
pub mod notify;
pub mod proxy;
pub mod session;

pub use auth::AuthError;
pub use notify::{NotificationRequest, NotifyDecision};
pub use proxy::ProxyKind;
pub use session::{InspectError, SessionKind, WindowInspector, XpropInspector};

use bus_gateway::registry::{
    PKG_MANAGER_INTERFACE, PKG_MANAGER_PATH, PKG_MANAGER_SERVICE,
};
use bus_gateway::{BusConnection, CallError, CallGateway, MethodDescriptor, MethodId, MethodRegistry};
use bus_types::{ServiceTarget, TypeTag, Value};
use bus_wire::{decode_body, ReplyEnvelope};
use session::XpropInspector as DefaultInspector;
use thiserror::Error;

/// Object path this agent is reachable on.
pub const AGENT_OBJECT_PATH: &str = "/org/pandagen/PackageManager1/Agent";

/// Interface this agent exposes.
pub const AGENT_INTERFACE: &str = "org.pandagen.PackageManager1.Agent";

const REGISTER_AGENT_SCHEMA: &[TypeTag] = &[TypeTag::OBJECT_PATH];

/// Errors an inbound operation can surface to its caller.
#[derive(Debug, Error, PartialEq)]
pub enum AgentError {
    /// The caller could not be verified as privileged
    #[error(transparent)]
    Denied(#[from] AuthError),

    /// An outbound call the reply depends on failed
    #[error("failed to call {method}: {source}")]
    Call {
        method: String,
        #[source]
        source: CallError,
    },

    /// An outbound reply did not carry the expected values
    #[error("reply to {method} was missing or malformed")]
    Reply { method: String },

    /// The inbound request body did not carry the expected values
    #[error("malformed request: {0}")]
    Request(String),

    /// Foreground window inspection outside the bus failed
    #[error("window inspection failed: {0}")]
    Inspection(String),

    /// GetManualProxy only supports manual mode
    #[error("only manual proxy mode is supported, current mode is {mode:?}")]
    ProxyMode { mode: String },

    /// The inbound method name is not part of the agent's surface
    #[error("unknown method {0:?}")]
    UnknownMethod(String),
}

/// One inbound message, as handed over by the bus pump.
#[derive(Debug, Clone)]
pub struct InboundCall {
    /// Connection name of the sender, if the transport knows it
    pub sender: Option<String>,
    /// Method name on the agent interface
    pub method: String,
    /// Encoded argument body
    pub body: Vec<u8>,
}

impl InboundCall {
    /// Creates an inbound call record.
    pub fn new(sender: Option<String>, method: impl Into<String>, body: Vec<u8>) -> Self {
        Self {
            sender,
            method: method.into(),
            body,
        }
    }
}

/// The agent: two long-lived connections plus the call gateway.
///
/// Holds the session-scoped connection and the privileged system connection
/// behind separate handles. All handlers run on the caller's thread; there
/// is no interior concurrency.
pub struct SessionAgent<B: BusConnection> {
    gateway: CallGateway,
    session_bus: B,
    system_bus: B,
    session_kind: SessionKind,
    inspector: Box<dyn WindowInspector>,
}

impl<B: BusConnection> SessionAgent<B> {
    /// Creates an agent over the two bus connections.
    ///
    /// The session kind is read from the environment once, here, and fixed
    /// for the agent's lifetime.
    pub fn new(session_bus: B, system_bus: B) -> Self {
        Self {
            gateway: CallGateway::new(MethodRegistry::builtin()),
            session_bus,
            system_bus,
            session_kind: SessionKind::from_env(),
            inspector: Box::new(DefaultInspector),
        }
    }

    /// Overrides the session kind (tests, unusual sessions).
    pub fn with_session_kind(mut self, kind: SessionKind) -> Self {
        self.session_kind = kind;
        self
    }

    /// Overrides the window inspector used by the fallback strategy.
    pub fn with_inspector(mut self, inspector: Box<dyn WindowInspector>) -> Self {
        self.inspector = inspector;
        self
    }

    /// Borrows the gateway.
    pub fn gateway(&self) -> &CallGateway {
        &self.gateway
    }

    pub(crate) fn session_bus(&self) -> &B {
        &self.session_bus
    }

    pub(crate) fn system_bus(&self) -> &B {
        &self.system_bus
    }

    pub(crate) fn session_kind(&self) -> SessionKind {
        self.session_kind
    }

    pub(crate) fn inspector(&self) -> &dyn WindowInspector {
        self.inspector.as_ref()
    }

    /// Announces the agent's object path to the package manager.
    ///
    /// The bootstrap calls this once after both connections are up.
    pub fn register(&self) -> Result<(), AgentError> {
        let descriptor = MethodDescriptor::ad_hoc(
            ServiceTarget::new(PKG_MANAGER_SERVICE, PKG_MANAGER_PATH, PKG_MANAGER_INTERFACE),
            "RegisterAgent",
            REGISTER_AGENT_SCHEMA,
        );
        self.gateway
            .call_descriptor(
                &self.system_bus,
                &descriptor,
                &[Value::ObjectPath(AGENT_OBJECT_PATH.to_string())],
            )
            .map_err(|source| AgentError::Call {
                method: "RegisterAgent".to_string(),
                source,
            })?;
        Ok(())
    }

    /// Routes one inbound call to its handler and shapes the reply values.
    pub fn dispatch(&self, call: &InboundCall) -> Result<Vec<Value>, AgentError> {
        log::debug!("inbound {} from {:?}", call.method, call.sender);
        match call.method.as_str() {
            "CloseNotification" => {
                self.close_notification(call)?;
                Ok(Vec::new())
            }
            "GetManualProxy" => {
                let map = self.get_manual_proxy(call)?;
                Ok(vec![Value::Dict(map)])
            }
            "ReportLog" => {
                self.report_log(call)?;
                Ok(Vec::new())
            }
            "SendNotify" => {
                let sent = self.send_notify(call)?;
                Ok(sent.map(Value::Uint32).into_iter().collect())
            }
            other => Err(AgentError::UnknownMethod(other.to_string())),
        }
    }

    /// Forwards a notification close to the notification daemon, id as-is.
    pub fn close_notification(&self, call: &InboundCall) -> Result<(), AgentError> {
        self.authorize(call.sender.as_deref())?;
        let values = decode_request(&call.body)?;
        let id = values
            .first()
            .and_then(Value::as_u32)
            .ok_or_else(|| AgentError::Request("CloseNotification expects a uint32 id".into()))?;
        self.call_session(MethodId::CloseNotification, &[Value::Uint32(id)])?;
        Ok(())
    }

    /// Forwards a log line to the event log collector.
    pub fn report_log(&self, call: &InboundCall) -> Result<(), AgentError> {
        self.authorize(call.sender.as_deref())?;
        let values = decode_request(&call.body)?;
        let message = values
            .first()
            .and_then(Value::as_str)
            .ok_or_else(|| AgentError::Request("ReportLog expects a string message".into()))?;
        self.call_session(MethodId::ReportLog, &[Value::Str(message.to_string())])?;
        Ok(())
    }

    /// Calls a registry method on the session bus, mapping failure to the
    /// handler error taxonomy.
    pub(crate) fn call_session(
        &self,
        id: MethodId,
        args: &[Value],
    ) -> Result<ReplyEnvelope, AgentError> {
        let method = self.gateway.registry().descriptor(id).method.clone();
        self.gateway
            .call(&self.session_bus, id, args)
            .map_err(|source| AgentError::Call { method, source })
    }
}

/// Decodes an inbound request body; malformed bytes are the caller's fault.
pub(crate) fn decode_request(body: &[u8]) -> Result<Vec<Value>, AgentError> {
    decode_body(body)
        .map(|outcome| outcome.into_values())
        .map_err(|err| AgentError::Request(err.to_string()))
}

/// Decodes an outbound reply; partial decodes keep whatever was readable,
/// matching the wire contract's stop-at-unknown behavior.
pub(crate) fn decode_reply(reply: &ReplyEnvelope, method: &str) -> Result<Vec<Value>, AgentError> {
    reply
        .decode()
        .map(|outcome| outcome.into_values())
        .map_err(|_| AgentError::Reply {
            method: method.to_string(),
        })
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use bus_gateway::registry::BUS_DAEMON_SERVICE;
    use bus_gateway::testing::ScriptedBus;

    /// Agent over two scripted buses, Wayland session by default.
    pub(crate) fn scripted_agent() -> SessionAgent<ScriptedBus> {
        SessionAgent::new(ScriptedBus::new(), ScriptedBus::new())
            .with_session_kind(SessionKind::Wayland)
    }

    /// Scripts the identity resolution reply on the system bus.
    pub(crate) fn script_caller_uid(agent: &SessionAgent<ScriptedBus>, uid: u32) {
        agent.system_bus().enqueue_reply(
            BUS_DAEMON_SERVICE,
            "GetConnectionUnixUser",
            vec![Value::Uint32(uid)],
        );
    }

    pub(crate) fn call(method: &str, values: &[Value]) -> InboundCall {
        InboundCall::new(
            Some(":1.42".to_string()),
            method,
            bus_wire::encode_values(values),
        )
    }
}
