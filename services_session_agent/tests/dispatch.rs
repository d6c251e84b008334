//! End-to-end dispatch over scripted buses: every inbound method routed
//! through the agent's dispatch entry point, with the authorization guard in
//! front of each one.

use bus_gateway::registry::{
    BUS_DAEMON_SERVICE, EVENT_LOG_SERVICE, NETWORK_SERVICE, NOTIFICATION_SERVICE,
};
use bus_gateway::testing::ScriptedBus;
use bus_types::{Dictionary, Value};
use bus_wire::{decode_body, encode_values};
use services_session_agent::{AgentError, InboundCall, SessionAgent, SessionKind};

fn agent_over<'a>(
    session: &'a ScriptedBus,
    system: &'a ScriptedBus,
) -> SessionAgent<&'a ScriptedBus> {
    SessionAgent::new(session, system).with_session_kind(SessionKind::Wayland)
}

fn inbound(method: &str, values: &[Value]) -> InboundCall {
    InboundCall::new(Some(":1.50".to_string()), method, encode_values(values))
}

fn script_caller_uid(system: &ScriptedBus, uid: u32) {
    system.enqueue_reply(
        BUS_DAEMON_SERVICE,
        "GetConnectionUnixUser",
        vec![Value::Uint32(uid)],
    );
}

fn notice(app_name: &str) -> Vec<Value> {
    vec![
        Value::Str(app_name.to_string()),
        Value::Uint32(0),
        Value::Str("icon".into()),
        Value::Str("summary".into()),
        Value::Str("body".into()),
        Value::StrArray(vec!["default".into()]),
        Value::VariantDict(Dictionary::new()),
        Value::Int32(5000),
    ]
}

#[test]
fn test_dispatch_close_notification() {
    let (session, system) = (ScriptedBus::new(), ScriptedBus::new());
    let agent = agent_over(&session, &system);
    script_caller_uid(&system, 0);
    session.enqueue_reply(NOTIFICATION_SERVICE, "CloseNotification", vec![]);

    let reply = agent
        .dispatch(&inbound("CloseNotification", &[Value::Uint32(99)]))
        .unwrap();

    assert!(reply.is_empty());
    let calls = session.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].service, NOTIFICATION_SERVICE);
    assert_eq!(calls[0].method, "CloseNotification");
}

#[test]
fn test_dispatch_report_log() {
    let (session, system) = (ScriptedBus::new(), ScriptedBus::new());
    let agent = agent_over(&session, &system);
    script_caller_uid(&system, 0);
    session.enqueue_reply(EVENT_LOG_SERVICE, "ReportLog", vec![]);

    let reply = agent
        .dispatch(&inbound("ReportLog", &[Value::Str("upgrade done".into())]))
        .unwrap();

    assert!(reply.is_empty());
    assert_eq!(session.calls()[0].service, EVENT_LOG_SERVICE);
}

#[test]
fn test_dispatch_get_manual_proxy_shapes_a_dict_reply() {
    let (session, system) = (ScriptedBus::new(), ScriptedBus::new());
    let agent = agent_over(&session, &system);
    script_caller_uid(&system, 0);
    session.enqueue_reply(
        NETWORK_SERVICE,
        "GetProxyMethod",
        vec![Value::Str("manual".into())],
    );
    for _ in 0..4 {
        session.enqueue_reply(
            NETWORK_SERVICE,
            "GetProxy",
            vec![Value::Str("proxy.example".into()), Value::Str("3128".into())],
        );
        session.enqueue_reply(
            NETWORK_SERVICE,
            "GetProxyAuthentication",
            vec![
                Value::Str("".into()),
                Value::Str("".into()),
                Value::Bool(false),
            ],
        );
    }

    let reply = agent.dispatch(&inbound("GetManualProxy", &[])).unwrap();

    assert_eq!(reply.len(), 1);
    let map = reply[0].as_dict().expect("reply must be a dict");
    assert_eq!(map.get("http_proxy"), Some("http://proxy.example:3128"));
    assert_eq!(map.get("socks"), Some("http://proxy.example:3128"));
}

#[test]
fn test_dispatch_send_notify_returns_the_new_id() {
    let (session, system) = (ScriptedBus::new(), ScriptedBus::new());
    let agent = agent_over(&session, &system);
    script_caller_uid(&system, 0);
    session.enqueue_reply(NOTIFICATION_SERVICE, "Notify", vec![Value::Uint32(77)]);

    let reply = agent
        .dispatch(&inbound("SendNotify", &notice("some-app")))
        .unwrap();

    assert_eq!(reply, vec![Value::Uint32(77)]);
    let forwarded = decode_body(&session.calls()[0].body).unwrap().into_values();
    assert_eq!(forwarded, notice("some-app"));
}

#[test]
fn test_dispatch_suppressed_notify_replies_without_an_id() {
    let (session, system) = (ScriptedBus::new(), ScriptedBus::new());
    let agent = agent_over(&session, &system);
    script_caller_uid(&system, 0);
    session.enqueue_reply(
        "org.pandagen.WindowManager",
        "ActiveWindow",
        vec![Value::Uint32(4)],
    );
    session.enqueue_reply(
        "org.pandagen.WindowManager",
        "AppId",
        vec![Value::Str("pandagen-lock".into())],
    );

    let reply = agent
        .dispatch(&inbound(
            "SendNotify",
            &notice("pandagen-control-center-optional"),
        ))
        .unwrap();

    assert!(reply.is_empty());
    assert_eq!(session.calls_to("Notify"), 0);
}

#[test]
fn test_every_operation_is_denied_for_unprivileged_callers() {
    let bodies: [(&str, Vec<Value>); 4] = [
        ("CloseNotification", vec![Value::Uint32(1)]),
        ("GetManualProxy", vec![]),
        ("ReportLog", vec![Value::Str("line".into())]),
        ("SendNotify", notice("some-app")),
    ];

    for (method, values) in bodies {
        let (session, system) = (ScriptedBus::new(), ScriptedBus::new());
        let agent = agent_over(&session, &system);
        script_caller_uid(&system, 1000);

        let err = agent.dispatch(&inbound(method, &values)).unwrap_err();

        assert!(matches!(err, AgentError::Denied(_)), "{method} not denied");
        // the identity lookup is the only outbound traffic
        assert_eq!(session.call_count(), 0, "{method} leaked a session call");
        assert_eq!(system.call_count(), 1);
    }
}

#[test]
fn test_unknown_method_is_rejected_without_identity_lookup() {
    let (session, system) = (ScriptedBus::new(), ScriptedBus::new());
    let agent = agent_over(&session, &system);

    let err = agent.dispatch(&inbound("Reboot", &[])).unwrap_err();

    assert_eq!(err, AgentError::UnknownMethod("Reboot".to_string()));
    assert_eq!(session.call_count(), 0);
    assert_eq!(system.call_count(), 0);
}
