use serde_json::json;

use super::*;
use crate::constants::ADMIN_NAMESPACE;
use crate::Error;
use crate::MemberRecord;
use crate::MembershipDocument;

#[test]
fn step_down_document_puts_command_name_first() {
    let command = AdminCommand::ReplSetStepDown {
        avoid_election_for_secs: 90,
        force: false,
    };

    let doc = command.to_document().unwrap();
    let keys: Vec<&String> = doc.as_object().unwrap().keys().collect();

    assert_eq!(keys, vec!["replSetStepDown", "force"]);
    assert_eq!(doc["replSetStepDown"], json!(90));
    assert_eq!(doc["force"], json!(false));
}

#[test]
fn get_status_document_is_a_single_flag() {
    let doc = AdminCommand::ReplSetGetStatus.to_document().unwrap();
    assert_eq!(doc, json!({ "replSetGetStatus": 1 }));
}

#[test]
fn initiate_document_embeds_membership() {
    let membership = MembershipDocument {
        id: "rs".into(),
        version: 1,
        members: vec![
            MemberRecord {
                id: 0,
                host: "localhost:31000".into(),
                arbiter_only: false,
            },
            MemberRecord {
                id: 1,
                host: "localhost:31001".into(),
                arbiter_only: true,
            },
        ],
    };

    let doc = AdminCommand::ReplSetInitiate(membership).to_document().unwrap();

    assert_eq!(
        doc,
        json!({
            "replSetInitiate": {
                "_id": "rs",
                "version": 1,
                "members": [
                    { "_id": 0, "host": "localhost:31000" },
                    { "_id": 1, "host": "localhost:31001", "arbiterOnly": true }
                ]
            }
        })
    );
}

#[test]
fn reply_ok_accepts_integer_and_double() {
    assert!(reply_ok(&json!({ "ok": 1 })));
    assert!(reply_ok(&json!({ "ok": 1.0 })));
    assert!(!reply_ok(&json!({ "ok": 0 })));
    assert!(!reply_ok(&json!({ "errmsg": "no ok field" })));
}

#[test]
fn reply_ok_accepts_boolean_flag() {
    assert!(reply_ok(&json!({ "ok": true })));
    assert!(!reply_ok(&json!({ "ok": false })));
    assert!(!reply_ok(&json!({ "ok": "1" })));
}

#[tokio::test]
async fn run_admin_command_surfaces_rejection_verbatim() {
    let rejection = json!({
        "ok": 0,
        "errmsg": "No electable secondaries caught up",
        "code": 262,
        "codeName": "ExceededTimeLimit"
    });
    let expected = rejection.clone();

    let mut client = MockClusterClient::new();
    client
        .expect_command()
        .withf(|ns, doc, _| ns.to_string() == ADMIN_NAMESPACE && doc.get("replSetStepDown").is_some())
        .times(1)
        .returning(move |_, _, _| Ok(rejection.clone()));

    let command = AdminCommand::ReplSetStepDown {
        avoid_election_for_secs: 90,
        force: false,
    };
    let result = run_admin_command(&mut client, &command, CommandOptions::default()).await;

    match result {
        Err(Error::AdminCommand {
            command,
            code,
            message,
            reply,
        }) => {
            assert_eq!(command, "replSetStepDown");
            assert_eq!(code, Some(262));
            assert_eq!(message, "No electable secondaries caught up");
            assert_eq!(reply, expected);
        }
        other => panic!("expected AdminCommand error, got {:?}", other),
    }
}

#[tokio::test]
async fn open_client_maps_timeout_event() {
    let factory = |_: &crate::NodeAddress, _: &ClientOptions| -> Box<dyn ClusterClient> {
        let mut client = MockClusterClient::new();
        client.expect_connect().times(1).returning(|| ClientEvent::TimedOut);
        client.expect_close().times(1).returning(|| ());
        Box::new(client)
    };

    let address = crate::NodeAddress::new("localhost", 31000);
    let result = open_client(&factory, &address, &ClientOptions::default()).await;

    assert!(matches!(
        result,
        Err(Error::Transport(crate::TransportError::TimedOut { .. }))
    ));
}
