use super::*;
use crate::core::Direction;
use crate::infra::codec::nsof::MAX_EXPANDED_NODES;
use alloc::vec;

fn store(name: &str, signature: i32) -> Value {
    Value::frame([
        ("name", Value::string(name)),
        ("signature", Value::Integer(signature)),
        ("kind", Value::string("Internal")),
    ])
}

fn feed(module: &mut InfoModule, command: DockCommand, payload: Vec<u8>) -> Vec<Event> {
    let mut out = Vec::new();
    module
        .process(&Event::dock_in(command, payload), &mut out)
        .unwrap();
    out
}

fn commands(events: &[Event]) -> Vec<DockCommand> {
    events
        .iter()
        .filter_map(|event| match event {
            Event::Dock {
                direction: Direction::Out,
                message,
            } => Some(message.command),
            _ => None,
        })
        .collect()
}

fn stores_payload() -> Vec<u8> {
    vec![store("Internal", 1), store("Card", 2)].to_nsof_bytes()
}

#[test]
/// The full exchange collects stores, soups and applications.
fn test_info_flow() {
    let mut module = InfoModule::new();

    let out = feed(&mut module, DockCommand::APP_CONNECTED, vec![]);
    assert_eq!(commands(&out), vec![DockCommand::GET_STORE_NAMES]);

    let out = feed(&mut module, DockCommand::STORE_NAMES, stores_payload());
    assert_eq!(
        out,
        vec![Event::dock_out(
            DockCommand::SET_CURRENT_STORE,
            store("Internal", 1).to_nsof_bytes()
        )]
    );
    assert_eq!(module.state(), InfoState::SelectingStore);

    let out = feed(&mut module, DockCommand::RESULT, vec![0; 4]);
    assert_eq!(commands(&out), vec![DockCommand::GET_SOUP_NAMES]);

    let soups = vec![String::from("Names"), String::from("Notes")];
    let out = feed(&mut module, DockCommand::SOUP_NAMES, soups.to_nsof_bytes());
    assert_eq!(
        out,
        vec![Event::dock_out(DockCommand::GET_APP_NAMES, [0, 0, 0, 0])]
    );

    let apps = vec![Value::frame([
        ("name", Value::string("Names")),
        ("soups", Value::PlainArray(vec![Value::string("Names")])),
    ])];
    let out = feed(&mut module, DockCommand::APP_NAMES, apps.to_nsof_bytes());
    assert_eq!(commands(&out), vec![DockCommand::OPERATION_DONE]);
    assert_eq!(module.state(), InfoState::Idle);

    let report = module.take_report();
    assert!(report.complete);
    assert_eq!(report.store_names().collect::<Vec<_>>(), vec!["Internal", "Card"]);
    assert_eq!(report.current_store(), Some(&store("Internal", 1)));
    assert_eq!(report.soups, soups);
    assert_eq!(report.apps, apps);
    assert_eq!(module.report(), &InfoReport::default());
}

#[test]
/// Cancellation is acknowledged from any active step.
fn test_operation_canceled() {
    let mut module = InfoModule::new();
    feed(&mut module, DockCommand::APP_CONNECTED, vec![]);
    feed(&mut module, DockCommand::STORE_NAMES, stores_payload());

    let out = feed(&mut module, DockCommand::OPERATION_CANCELED, vec![]);
    assert_eq!(commands(&out), vec![DockCommand::OP_CANCELED_ACK]);
    assert_eq!(module.state(), InfoState::Idle);
}

#[test]
/// Messages before the connection or out of sequence are ignored.
fn test_ignores_unrelated_messages() {
    let mut module = InfoModule::new();
    assert!(feed(&mut module, DockCommand::STORE_NAMES, stores_payload()).is_empty());
    assert!(feed(&mut module, DockCommand::OPERATION_CANCELED, vec![]).is_empty());

    feed(&mut module, DockCommand::APP_CONNECTED, vec![]);
    assert!(feed(&mut module, DockCommand::RESULT, vec![0; 4]).is_empty());
    assert_eq!(module.state(), InfoState::GettingStoreNames);
}

#[test]
/// A failed store selection is reported with the Newton's code.
fn test_store_rejected() {
    let mut module = InfoModule::new();
    feed(&mut module, DockCommand::APP_CONNECTED, vec![]);
    feed(&mut module, DockCommand::STORE_NAMES, stores_payload());

    let mut out = Vec::new();
    let err = module
        .process(
            &Event::dock_in(DockCommand::RESULT, (-10_005i32).to_be_bytes()),
            &mut out,
        )
        .unwrap_err();
    assert_eq!(
        err,
        ModuleError::Rejected {
            command: DockCommand::SET_CURRENT_STORE,
            code: -10_005
        }
    );
    assert!(out.is_empty());
}

#[test]
/// Undecodable or empty store lists abort the operation.
fn test_bad_store_list() {
    let mut module = InfoModule::new();
    feed(&mut module, DockCommand::APP_CONNECTED, vec![]);

    let mut out = Vec::new();
    let err = module
        .process(
            &Event::dock_in(DockCommand::STORE_NAMES, Vec::<Value>::new().to_nsof_bytes()),
            &mut out,
        )
        .unwrap_err();
    assert_eq!(
        err,
        ModuleError::Nsof(NsofError::UnexpectedValue("a non-empty store list"))
    );

    let err = module
        .process(&Event::dock_in(DockCommand::STORE_NAMES, [7, 0]), &mut out)
        .unwrap_err();
    assert_eq!(err, ModuleError::Nsof(NsofError::UnsupportedVersion(7)));
}

#[test]
/// An app list whose shared entries would expand past the node budget is
/// refused instead of being materialised.
fn test_oversized_app_list() {
    let mut module = InfoModule::new();
    feed(&mut module, DockCommand::APP_CONNECTED, vec![]);
    feed(&mut module, DockCommand::STORE_NAMES, stores_payload());
    feed(&mut module, DockCommand::RESULT, vec![0; 4]);
    feed(&mut module, DockCommand::SOUP_NAMES, Vec::<String>::new().to_nsof_bytes());

    // 24 arrays, each holding its child literally and again by precedent.
    let mut payload = vec![2];
    payload.extend([5, 2].repeat(24));
    payload.extend([0, 4]);
    for level in (1..=24u8).rev() {
        payload.extend([9, level]);
    }

    let err = module
        .process(
            &Event::dock_in(DockCommand::APP_NAMES, payload),
            &mut Vec::new(),
        )
        .unwrap_err();
    assert_eq!(
        err,
        ModuleError::Nsof(NsofError::ExpansionLimit(MAX_EXPANDED_NODES))
    );
}

#[test]
/// Quit abandons the operation.
fn test_quit_resets() {
    let mut module = InfoModule::new();
    feed(&mut module, DockCommand::APP_CONNECTED, vec![]);
    module.process(&Event::quit(), &mut Vec::new()).unwrap();
    assert_eq!(module.state(), InfoState::Idle);
}
