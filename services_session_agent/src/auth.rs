//! Caller authorization.
//!
//! Every inbound operation runs through [`SessionAgent::authorize`] before
//! any side-effecting outbound call. The guard is fail-closed: a missing
//! sender, a failed identity lookup or a malformed identity reply all count
//! as denial, exactly like a resolved non-root uid.

use crate::SessionAgent;
use bus_gateway::{BusConnection, MethodId};
use bus_types::Value;
use thiserror::Error;

/// Numeric identity allowed to drive this agent.
const ROOT_UID: u32 = 0;

/// Authorization failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("caller {sender} is not permitted to call this method")]
    AccessDenied { sender: String },
}

impl<B: BusConnection> SessionAgent<B> {
    /// Verifies the inbound sender resolves to the privileged identity.
    ///
    /// Resolution goes through the bus daemon on the system connection; the
    /// result is never cached, it is only valid for this inbound call.
    pub(crate) fn authorize(&self, sender: Option<&str>) -> Result<(), AuthError> {
        let Some(sender) = sender else {
            log::warn!("inbound message carries no sender");
            return Err(AuthError::AccessDenied {
                sender: "<unknown>".to_string(),
            });
        };
        let denied = || AuthError::AccessDenied {
            sender: sender.to_string(),
        };

        let reply = self
            .gateway()
            .call(
                self.system_bus(),
                MethodId::ConnectionIdentity,
                &[Value::Str(sender.to_string())],
            )
            .map_err(|err| {
                log::warn!("identity resolution for {} failed: {}", sender, err);
                denied()
            })?;

        let uid = reply
            .decode()
            .ok()
            .and_then(|outcome| outcome.into_values().into_iter().next())
            .and_then(|value| value.as_u32());
        match uid {
            Some(ROOT_UID) => Ok(()),
            Some(other) => {
                log::warn!("caller {} resolved to uid {}, denying", sender, other);
                Err(denied())
            }
            None => {
                log::warn!("identity reply for {} was not a uid", sender);
                Err(denied())
            }
        }
    }
}
