//! Frame encoder / incremental decoder behaviour.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use ipcbus_core::protocol::contract::{Contract, HistoryLoad};
use ipcbus_core::protocol::types::{IdRequest, PersistedSessionInfo};
use ipcbus_core::protocol::{decode, encode, new_message_id, FrameDecoder, Message, ReplyError};
use ipcbus_core::{ErrorCode, IpcBusError};
use serde_json::json;

#[test]
fn decode_inverts_encode() {
    let msgs = [
        Message::new("history/load", json!({"id": "s1"}), "m1".to_string()),
        Message::new("abort", json!(null), new_message_id()),
        Message::end_of_stream("llm/streamChat", "m2".to_string()),
        Message::error_reply(
            "history/load",
            "m3".to_string(),
            ReplyError::new(ErrorCode::HandlerFailure, "boom"),
        ),
    ];
    for m in msgs {
        let bytes = encode(&m).unwrap();
        assert_eq!(decode(&bytes).unwrap(), m);
    }
}

#[test]
fn fresh_ids_are_distinct() {
    assert_ne!(new_message_id(), new_message_id());
}

#[test]
fn decoder_handles_split_and_concatenated_records() {
    let a = r#"{"messageType":"history/list","data":null,"messageId":"a"}"#;
    let b = r#"{"messageType":"abort","data":null,"messageId":"b"}"#;
    let wire = format!("{a}{b}");
    let (head, tail) = wire.as_bytes().split_at(a.len() + 10);

    let mut dec = FrameDecoder::default();
    let first = dec.push(head);
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].as_ref().unwrap().message_id, "a");
    assert!(dec.pending() > 0);

    let second = dec.push(tail);
    assert_eq!(second.len(), 1);
    assert_eq!(second[0].as_ref().unwrap().message_type, "abort");
    assert_eq!(dec.pending(), 0);
}

#[test]
fn malformed_record_does_not_poison_stream() {
    let mut dec = FrameDecoder::default();
    let out = dec.push(
        b"{\"messageType\":\"abort\",\"data\":null}\n{\"messageType\":\"abort\",\"data\":null,\"messageId\":\"ok\"}\n",
    );
    assert_eq!(out.len(), 2);
    assert!(matches!(out[0], Err(IpcBusError::MalformedMessage(_))));
    assert_eq!(out[1].as_ref().unwrap().message_id, "ok");
}

#[test]
fn typed_payload_follows_contract() {
    let raw =
        decode(br#"{"messageType":"history/load","data":{"id":"s1"},"messageId":"m1"}"#).unwrap();
    assert_eq!(raw.message_type, HistoryLoad::name());
    let typed = raw.into_typed::<IdRequest>().unwrap();
    assert_eq!(typed.data.id, "s1");

    let wrong = decode(
        br#"{"messageType":"history/load","data":{"sessionId":"s1"},"messageId":"m1"}"#,
    )
    .unwrap()
    .into_typed::<IdRequest>()
    .unwrap_err();
    assert_eq!(wrong.code(), ErrorCode::MalformedMessage);
}

#[test]
fn persisted_session_uses_camel_case() {
    let v = json!({
        "sessionId": "s1",
        "title": "t",
        "workspaceDirectory": "/w",
        "history": [
            { "message": { "role": "user", "content": "hi" }, "contextItems": [] },
            { "message": { "role": "assistant", "content": [{ "type": "text", "text": "yo" }] } }
        ]
    });
    let s: PersistedSessionInfo = serde_json::from_value(v.clone()).unwrap();
    assert_eq!(s.history.len(), 2);
    assert_eq!(serde_json::to_value(&s).unwrap()["workspaceDirectory"], "/w");
}
