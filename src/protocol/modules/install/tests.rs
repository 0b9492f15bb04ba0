use super::*;
use alloc::vec;

const PACKAGE: &[u8] = b"package0\x00\x00\x00\x00xxxx";

fn feed(module: &mut InstallModule, event: Event) -> Result<Vec<Event>, ModuleError> {
    let mut out = Vec::new();
    module.process(&event, &mut out)?;
    Ok(out)
}

#[test]
/// Request, send, then disconnect once the Newton reports success.
fn test_install_flow() {
    let mut module = InstallModule::new(PACKAGE);

    let out = feed(&mut module, Event::dock_in(DockCommand::APP_CONNECTED, [])).unwrap();
    assert_eq!(
        out,
        vec![Event::dock_out(DockCommand::REQUEST_TO_INSTALL, [])]
    );

    let out = feed(&mut module, Event::dock_in(DockCommand::RESULT, [0; 4])).unwrap();
    assert_eq!(out, vec![Event::dock_out(DockCommand::LOAD_PACKAGE, PACKAGE)]);
    assert_eq!(module.state(), InstallState::Sent);

    let out = feed(&mut module, Event::dock_in(DockCommand::RESULT, [0; 4])).unwrap();
    assert_eq!(out, vec![Event::dock_out(DockCommand::DISCONNECT, [])]);
    assert_eq!(module.state(), InstallState::Idle);
    assert!(module.installed());
}

#[test]
/// The Newton may cancel before the package is sent.
fn test_canceled() {
    let mut module = InstallModule::new(PACKAGE);
    feed(&mut module, Event::dock_in(DockCommand::APP_CONNECTED, [])).unwrap();
    let out = feed(
        &mut module,
        Event::dock_in(DockCommand::OPERATION_CANCELED, []),
    )
    .unwrap();
    assert_eq!(out, vec![Event::dock_out(DockCommand::OP_CANCELED_ACK, [])]);
    assert_eq!(module.state(), InstallState::Idle);
    assert!(!module.installed());
}

#[test]
/// A cancel that arrives while the package is in flight is acknowledged too,
/// and the late result is then ignored.
fn test_canceled_after_send() {
    let mut module = InstallModule::new(PACKAGE);
    feed(&mut module, Event::dock_in(DockCommand::APP_CONNECTED, [])).unwrap();
    feed(&mut module, Event::dock_in(DockCommand::RESULT, [0; 4])).unwrap();
    assert_eq!(module.state(), InstallState::Sent);

    let out = feed(
        &mut module,
        Event::dock_in(DockCommand::OPERATION_CANCELED, []),
    )
    .unwrap();
    assert_eq!(out, vec![Event::dock_out(DockCommand::OP_CANCELED_ACK, [])]);
    assert_eq!(module.state(), InstallState::Idle);

    let out = feed(&mut module, Event::dock_in(DockCommand::RESULT, [0; 4])).unwrap();
    assert!(out.is_empty());
    assert!(!module.installed());
}

#[test]
/// A failing install result surfaces the Newton's error code.
fn test_install_rejected() {
    let mut module = InstallModule::new(PACKAGE);
    feed(&mut module, Event::dock_in(DockCommand::APP_CONNECTED, [])).unwrap();
    feed(&mut module, Event::dock_in(DockCommand::RESULT, [0; 4])).unwrap();
    let err = feed(
        &mut module,
        Event::dock_in(DockCommand::RESULT, (-10_401i32).to_be_bytes()),
    )
    .unwrap_err();
    assert_eq!(
        err,
        ModuleError::Rejected {
            command: DockCommand::LOAD_PACKAGE,
            code: -10_401
        }
    );
    assert!(!module.installed());
}

#[test]
/// A result without a code is a malformed message.
fn test_short_result() {
    let mut module = InstallModule::new(PACKAGE);
    feed(&mut module, Event::dock_in(DockCommand::APP_CONNECTED, [])).unwrap();
    assert!(matches!(
        feed(&mut module, Event::dock_in(DockCommand::RESULT, [0; 2])),
        Err(ModuleError::Dock(_))
    ));
}

#[test]
/// Results arriving while idle are not install results.
fn test_idle_ignores_results() {
    let mut module = InstallModule::new(PACKAGE);
    let out = feed(&mut module, Event::dock_in(DockCommand::RESULT, [0; 4])).unwrap();
    assert!(out.is_empty());
    assert_eq!(module.state(), InstallState::Idle);
}
