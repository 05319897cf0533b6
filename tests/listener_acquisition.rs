//! End-to-end listener acquisition tests.

use gatewayd::jail::NullJail;
use gatewayd::net::{AcceptorManager, InheritedFds};

fn manager() -> (AcceptorManager, NullJail, InheritedFds) {
    (AcceptorManager::new(80), NullJail, InheritedFds::new())
}

#[test]
fn wildcard_port_spec_binds_and_updates_display() {
    let (mut mgr, jail, mut fds) = manager();
    mgr.add_spec("127.0.0.1:0", &jail, &mut fds).unwrap();

    let entry = mgr.table().get(0).unwrap();
    let port = entry.addr().port();
    assert_ne!(port, 0, "OS-assigned port adopted into the address");
    assert_eq!(entry.endpoint(), format!("127.0.0.1:{port}"));
    assert!(entry.is_bound());
    assert!(fds.contains(entry.fd().unwrap()));

    // A later reopen reports success and the bound port stays put.
    assert_eq!(mgr.reopen_all(&jail, &mut fds), 0);
    let entry = mgr.table().get(0).unwrap();
    assert_eq!(entry.addr().port(), port);
    assert_eq!(entry.endpoint(), format!("127.0.0.1:{port}"));
}

#[test]
fn fixed_port_display_is_left_unchanged() {
    // Grab a free port first, then bind it as a concrete spec.
    let probe = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = probe.local_addr().unwrap().port();
    drop(probe);

    let (mut mgr, jail, mut fds) = manager();
    let spec = format!("127.0.0.1:{port}");
    mgr.add_spec(&spec, &jail, &mut fds).unwrap();

    let entry = mgr.table().get(0).unwrap();
    assert_eq!(entry.endpoint(), spec);
    assert_eq!(entry.addr().port(), port);
}

#[test]
fn duplicate_addresses_across_specs_are_rejected() {
    let (mut mgr, jail, mut fds) = manager();
    mgr.add_spec("first=127.0.0.1:0", &jail, &mut fds).unwrap();
    let port = mgr.table().get(0).unwrap().addr().port();

    let err = mgr
        .add_spec(&format!("second=127.0.0.1:{port}"), &jail, &mut fds)
        .unwrap_err();

    // The diagnostic names both endpoint texts for the operator.
    let message = err.to_string();
    assert!(message.contains(&format!("127.0.0.1:{port}")));
    assert!(message.contains("same address"));
    assert_eq!(mgr.table().len(), 1);
    assert_eq!(mgr.specs().len(), 1);
}

#[test]
fn specs_keep_insertion_order_in_the_snapshot() {
    let (mut mgr, jail, mut fds) = manager();
    mgr.add_spec("a=127.0.0.1:0", &jail, &mut fds).unwrap();
    mgr.add_spec("b=127.0.0.1:0,proxy", &jail, &mut fds).unwrap();

    let snapshot = mgr.table().snapshot();
    assert_eq!(snapshot.len(), 2);
    assert_eq!(snapshot[0].name, "a");
    assert_eq!(snapshot[0].transport, "http");
    assert_eq!(snapshot[1].name, "b");
    assert_eq!(snapshot[1].transport, "proxy");
    assert!(snapshot.iter().all(|s| s.fd.is_some()));

    // The snapshot is what the administrative interface serializes.
    let json = serde_json::to_value(&snapshot).unwrap();
    assert_eq!(json[0]["name"], "a");
    assert_eq!(json[1]["transport"], "proxy");
}

#[test]
fn spec_sockets_reference_table_entries() {
    let (mut mgr, jail, mut fds) = manager();
    mgr.add_spec("127.0.0.1:0", &jail, &mut fds).unwrap();
    mgr.add_spec("127.0.0.1:0", &jail, &mut fds).unwrap();

    for spec in mgr.specs() {
        for &index in spec.sockets() {
            let entry = mgr.table().get(index).unwrap();
            assert_eq!(entry.name(), spec.name());
            assert!(entry.is_bound());
        }
    }
}

#[test]
fn failed_spec_leaves_no_trace() {
    let (mut mgr, jail, mut fds) = manager();
    mgr.add_spec("127.0.0.1:0", &jail, &mut fds).unwrap();

    // TEST-NET-1 cannot be bound locally; the spec fails fatally.
    let err = mgr.add_spec("192.0.2.9:4711", &jail, &mut fds).unwrap_err();
    assert!(err.to_string().contains("192.0.2.9:4711"));

    assert_eq!(mgr.table().len(), 1);
    assert_eq!(mgr.specs().len(), 1);
    assert_eq!(fds.len(), 1);
}

#[test]
fn every_bound_descriptor_is_marked_for_inheritance() {
    let (mut mgr, jail, mut fds) = manager();
    mgr.add_spec("127.0.0.1:0", &jail, &mut fds).unwrap();
    mgr.add_spec("127.0.0.1:0", &jail, &mut fds).unwrap();

    assert_eq!(fds.len(), mgr.table().len());
    for entry in mgr.table().iter() {
        assert!(fds.contains(entry.fd().unwrap()));
    }
}
