//! The call gateway: descriptor + connection + arguments → one round trip.

use crate::connection::{BusConnection, CallError};
use crate::registry::{MethodDescriptor, MethodId, MethodRegistry, PROPERTIES_INTERFACE};
use bus_types::{ServiceTarget, TypeTag, Value};
use bus_wire::{encode, CallEnvelope, ReplyEnvelope};

const PROPERTY_GET_SCHEMA: &[TypeTag] = &[TypeTag::STRING, TypeTag::STRING];

/// Builds envelopes from registry descriptors and performs synchronous calls.
///
/// The gateway owns the registry; it never owns a connection. Replies come
/// back undecoded; what shape to expect is knowledge the caller has, not
/// the gateway.
#[derive(Debug, Default)]
pub struct CallGateway {
    registry: MethodRegistry,
}

impl CallGateway {
    /// Creates a gateway over a registry.
    pub fn new(registry: MethodRegistry) -> Self {
        Self { registry }
    }

    /// Borrows the registry.
    pub fn registry(&self) -> &MethodRegistry {
        &self.registry
    }

    /// Calls a registry method.
    pub fn call(
        &self,
        conn: &dyn BusConnection,
        id: MethodId,
        args: &[Value],
    ) -> Result<ReplyEnvelope, CallError> {
        let descriptor = self.registry.descriptor(id);
        self.call_descriptor(conn, descriptor, args)
    }

    /// Calls an arbitrary descriptor (registry entry or ad hoc).
    pub fn call_descriptor(
        &self,
        conn: &dyn BusConnection,
        descriptor: &MethodDescriptor,
        args: &[Value],
    ) -> Result<ReplyEnvelope, CallError> {
        let body = encode(descriptor.schema, args)?;
        let envelope =
            CallEnvelope::new(descriptor.target.clone(), descriptor.method.clone()).with_body(body);
        log::debug!("call {} on {}", descriptor.method, descriptor.target);
        Ok(conn.call(envelope)?)
    }

    /// Reads a string-valued property via the standard properties interface.
    pub fn get_string_property(
        &self,
        conn: &dyn BusConnection,
        target: &ServiceTarget,
        property: &str,
    ) -> Result<String, CallError> {
        let descriptor = MethodDescriptor::ad_hoc(
            ServiceTarget::new(
                target.service.clone(),
                target.path.clone(),
                PROPERTIES_INTERFACE,
            ),
            "Get",
            PROPERTY_GET_SCHEMA,
        );
        let reply = self.call_descriptor(
            conn,
            &descriptor,
            &[
                Value::Str(target.interface.clone()),
                Value::Str(property.to_string()),
            ],
        )?;
        let outcome = reply
            .decode()
            .map_err(|err| CallError::Remote(format!("property {} reply: {}", property, err)))?;
        outcome
            .values()
            .first()
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| {
                CallError::Remote(format!("property {} reply is not a string", property))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::TransportError;
    use crate::registry::{CONTROL_CENTER_INTERFACE, CONTROL_CENTER_PATH, CONTROL_CENTER_SERVICE};
    use crate::testing::ScriptedBus;
    use bus_wire::EncodeError;

    #[test]
    fn test_call_encodes_and_sends() {
        let bus = ScriptedBus::new();
        bus.enqueue_reply("org.freedesktop.Notifications", "CloseNotification", vec![]);

        let gateway = CallGateway::new(MethodRegistry::builtin());
        let reply = gateway
            .call(&bus, MethodId::CloseNotification, &[Value::Uint32(17)])
            .unwrap();
        assert!(reply.decode().unwrap().into_values().is_empty());

        let calls = bus.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].method, "CloseNotification");
        assert_eq!(
            bus_wire::decode_body(&calls[0].body).unwrap().into_values(),
            vec![Value::Uint32(17)]
        );
    }

    #[test]
    fn test_schema_violation_never_reaches_the_bus() {
        let bus = ScriptedBus::new();
        let gateway = CallGateway::new(MethodRegistry::builtin());

        let err = gateway
            .call(&bus, MethodId::CloseNotification, &[Value::Str("17".into())])
            .unwrap_err();
        assert!(matches!(err, CallError::Encode(EncodeError::TypeMismatch { .. })));
        assert_eq!(bus.call_count(), 0);
    }

    #[test]
    fn test_remote_error_maps_to_call_error() {
        let bus = ScriptedBus::new();
        bus.enqueue_error(
            "org.pandagen.Network",
            "GetProxyMethod",
            TransportError::Remote("no such method".into()),
        );

        let gateway = CallGateway::new(MethodRegistry::builtin());
        let err = gateway.call(&bus, MethodId::ProxyMode, &[]).unwrap_err();
        assert_eq!(err, CallError::Remote("no such method".into()));
    }

    #[test]
    fn test_get_string_property() {
        let bus = ScriptedBus::new();
        bus.enqueue_reply(
            CONTROL_CENTER_SERVICE,
            "Get",
            vec![Value::Str("update".into())],
        );

        let gateway = CallGateway::new(MethodRegistry::builtin());
        let target = ServiceTarget::new(
            CONTROL_CENTER_SERVICE,
            CONTROL_CENTER_PATH,
            CONTROL_CENTER_INTERFACE,
        );
        let value = gateway
            .get_string_property(&bus, &target, "CurrentModule")
            .unwrap();
        assert_eq!(value, "update");

        // The property read travels over the standard properties interface.
        let calls = bus.calls();
        assert_eq!(calls[0].interface, PROPERTIES_INTERFACE);
        assert_eq!(
            bus_wire::decode_body(&calls[0].body).unwrap().into_values(),
            vec![
                Value::Str(CONTROL_CENTER_INTERFACE.into()),
                Value::Str("CurrentModule".into()),
            ]
        );
    }

    #[test]
    fn test_get_string_property_rejects_non_string_reply() {
        let bus = ScriptedBus::new();
        bus.enqueue_reply(CONTROL_CENTER_SERVICE, "Get", vec![Value::Uint32(1)]);

        let gateway = CallGateway::new(MethodRegistry::builtin());
        let target = ServiceTarget::new(
            CONTROL_CENTER_SERVICE,
            CONTROL_CENTER_PATH,
            CONTROL_CENTER_INTERFACE,
        );
        assert!(gateway
            .get_string_property(&bus, &target, "CurrentModule")
            .is_err());
    }
}
