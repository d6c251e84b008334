//! Notification forwarding and suppression.
//!
//! `SendNotify` forwards a notification to the session's notification
//! daemon. One application name is special: the optional update notice. For
//! it the agent looks at what the user is currently doing and either drops
//! the notice or forwards it under the canonical application name.
//!
//! Every fallback in here leans towards showing the notification. Only a
//! positively identified "user is already looking at updates" or "screen is
//! locked" foreground suppresses it.

use crate::{decode_reply, AgentError, InboundCall, SessionAgent, SessionKind};
use bus_gateway::registry::{
    CONTROL_CENTER_INTERFACE, CONTROL_CENTER_PATH, CONTROL_CENTER_SERVICE, WINDOW_INTERFACE,
    WINDOW_MANAGER_SERVICE, WINDOW_PATH_PREFIX,
};
use bus_gateway::{BusConnection, MethodDescriptor, MethodId};
use bus_types::{Dictionary, ServiceTarget, TypeTag, Value};

/// Application name the update notice is forwarded under.
pub const UPDATE_NOTICE_CANONICAL: &str = "pandagen-control-center";

/// Application name marking a notice as suppressible.
pub const UPDATE_NOTICE_OPTIONAL: &str = "pandagen-control-center-optional";

/// Window class of the lock screen.
const LOCK_SCREEN_CLASS: &str = "pandagen-lock";

/// Control center module in which the update notice is redundant.
const UPDATE_MODULE: &str = "update";

const NO_ARGS: &[TypeTag] = &[];

/// One notification, decoded from the inbound body.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationRequest {
    pub app_name: String,
    pub replaces_id: u32,
    pub icon: String,
    pub summary: String,
    pub body: String,
    pub actions: Vec<String>,
    pub hints: Dictionary,
    pub expire_timeout: i32,
}

impl NotificationRequest {
    /// Builds a request from the eight decoded argument values.
    pub fn from_values(values: Vec<Value>) -> Result<Self, AgentError> {
        let malformed = || AgentError::Request("SendNotify expects (susssasa{sv}i)".to_string());
        let mut values = values.into_iter();
        let mut next = || values.next().ok_or_else(malformed);

        let request = Self {
            app_name: next()?.into_str().ok_or_else(malformed)?,
            replaces_id: next()?.as_u32().ok_or_else(malformed)?,
            icon: next()?.into_str().ok_or_else(malformed)?,
            summary: next()?.into_str().ok_or_else(malformed)?,
            body: next()?.into_str().ok_or_else(malformed)?,
            actions: match next()? {
                Value::StrArray(actions) => actions,
                _ => return Err(malformed()),
            },
            hints: match next()? {
                Value::VariantDict(hints) => hints,
                _ => return Err(malformed()),
            },
            expire_timeout: match next()? {
                Value::Int32(timeout) => timeout,
                _ => return Err(malformed()),
            },
        };
        if values.next().is_some() {
            return Err(malformed());
        }
        Ok(request)
    }

    /// Renders the request back into argument values, forward order.
    pub fn to_args(&self) -> Vec<Value> {
        vec![
            Value::Str(self.app_name.clone()),
            Value::Uint32(self.replaces_id),
            Value::Str(self.icon.clone()),
            Value::Str(self.summary.clone()),
            Value::Str(self.body.clone()),
            Value::StrArray(self.actions.clone()),
            Value::VariantDict(self.hints.clone()),
            Value::Int32(self.expire_timeout),
        ]
    }
}

/// What to do with an optional update notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyDecision {
    /// Drop the notice, reply without an id
    Suppress,
    /// Forward under the canonical application name
    SendRenamed,
}

impl<B: BusConnection> SessionAgent<B> {
    /// Forwards a notification, possibly suppressing or renaming it first.
    ///
    /// Returns the daemon's notification id, or `None` when the notice was
    /// suppressed.
    pub fn send_notify(&self, call: &InboundCall) -> Result<Option<u32>, AgentError> {
        self.authorize(call.sender.as_deref())?;
        let mut request = NotificationRequest::from_values(crate::decode_request(&call.body)?)?;

        if request.app_name == UPDATE_NOTICE_OPTIONAL {
            match self.decide_optional_notice() {
                NotifyDecision::Suppress => {
                    log::info!("suppressing optional update notice");
                    return Ok(None);
                }
                NotifyDecision::SendRenamed => {
                    request.app_name = UPDATE_NOTICE_CANONICAL.to_string();
                }
            }
        }

        let reply = self.call_session(MethodId::SendNotification, &request.to_args())?;
        let id = decode_reply(&reply, "Notify")?
            .first()
            .and_then(Value::as_u32)
            .ok_or_else(|| AgentError::Reply {
                method: "Notify".to_string(),
            })?;
        Ok(Some(id))
    }

    /// Decides the fate of an optional update notice from the foreground.
    ///
    /// A foreground that cannot be determined forwards the notice.
    fn decide_optional_notice(&self) -> NotifyDecision {
        let class = match self.foreground_class() {
            Ok(class) => class,
            Err(err) => {
                log::warn!("foreground window class unavailable: {}", err);
                return NotifyDecision::SendRenamed;
            }
        };

        if class.contains(UPDATE_NOTICE_CANONICAL) {
            return match self.control_center_module() {
                Some(module) if module == UPDATE_MODULE => NotifyDecision::Suppress,
                _ => NotifyDecision::SendRenamed,
            };
        }
        if class.contains(LOCK_SCREEN_CLASS) {
            return NotifyDecision::Suppress;
        }
        NotifyDecision::SendRenamed
    }

    /// Resolves the foreground window class for the fixed session kind.
    fn foreground_class(&self) -> Result<String, AgentError> {
        match self.session_kind() {
            SessionKind::Wayland => {
                let reply = self.call_session(MethodId::ActiveWindow, &[])?;
                let window_id = decode_reply(&reply, "ActiveWindow")?
                    .first()
                    .and_then(Value::as_u32)
                    .ok_or_else(|| AgentError::Reply {
                        method: "ActiveWindow".to_string(),
                    })?;

                let descriptor = MethodDescriptor::ad_hoc(
                    ServiceTarget::new(
                        WINDOW_MANAGER_SERVICE,
                        format!("{}_{}", WINDOW_PATH_PREFIX, window_id),
                        WINDOW_INTERFACE,
                    ),
                    "AppId",
                    NO_ARGS,
                );
                let reply = self
                    .gateway()
                    .call_descriptor(self.session_bus(), &descriptor, &[])
                    .map_err(|source| AgentError::Call {
                        method: "AppId".to_string(),
                        source,
                    })?;
                decode_reply(&reply, "AppId")?
                    .first()
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .ok_or(AgentError::Reply {
                        method: "AppId".to_string(),
                    })
            }
            SessionKind::X11 => self
                .inspector()
                .foreground_window_class()
                .map_err(|err| AgentError::Inspection(err.to_string())),
        }
    }

    /// Reads which module the control center is showing, if it answers.
    fn control_center_module(&self) -> Option<String> {
        let target = ServiceTarget::new(
            CONTROL_CENTER_SERVICE,
            CONTROL_CENTER_PATH,
            CONTROL_CENTER_INTERFACE,
        );
        match self
            .gateway()
            .get_string_property(self.session_bus(), &target, "CurrentModule")
        {
            Ok(module) => Some(module),
            Err(err) => {
                log::warn!("control center module unavailable: {}", err);
                None
            }
        }
    }
}
