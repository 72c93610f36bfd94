//! Envelope decode vector tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use ipcbus_core::protocol::frame::decode;

use vector_loader::load;

#[test]
fn envelope_vectors() {
    let files = [
        "envelope_history_load.json",
        "envelope_null_data.json",
        "envelope_missing_id.json",
        "envelope_missing_data.json",
        "envelope_missing_type.json",
        "envelope_numeric_id.json",
        "envelope_not_object.json",
        "envelope_bad_json.json",
        "envelope_done_frame.json",
        "envelope_error_frame.json",
    ];

    for f in files {
        let v = load(f);
        let res = decode(v.frame.as_bytes());

        if let Some(err) = v.expect_error {
            let e = res.expect_err("expected error");
            assert_eq!(e.code().as_str(), err.code, "vector={}", v.description);
            continue;
        }

        let msg = res.expect("expected ok message");
        let ex = v.expect.expect("missing expect block");

        assert_eq!(
            msg.message_type,
            ex["messageType"].as_str().unwrap(),
            "vector={}",
            v.description
        );
        assert_eq!(
            msg.message_id,
            ex["messageId"].as_str().unwrap(),
            "vector={}",
            v.description
        );
        assert_eq!(msg.data, ex["data"], "vector={}", v.description);
        let done = ex.get("done").and_then(|d| d.as_bool()).unwrap_or(false);
        assert_eq!(msg.done, done, "vector={}", v.description);

        match ex.get("error_code").and_then(|c| c.as_str()) {
            Some(code) => assert_eq!(msg.error.unwrap().code, code, "vector={}", v.description),
            None => assert!(msg.error.is_none(), "vector={}", v.description),
        }
    }
}
