//! Framing and dispatch over bodies built with the test encoders.

use fafreplay_core::{
    decode_frame, next_frame, resolve_type, Command, CommandType, Cursor, LuaValue, ParseError,
    FRAME_HEADER_LEN,
};
use fafreplay_test_utils::{encode_command, encode_payload, fixtures, frame, BodyBuilder};

#[test]
fn body_of_every_command_frames_and_decodes_in_order() {
    let commands = fixtures::one_of_each();
    let body = BodyBuilder::new().commands(&commands).build();

    let mut cursor = Cursor::new(&body);
    let mut decoded = Vec::new();
    while cursor.remaining() >= FRAME_HEADER_LEN {
        let raw = next_frame(&mut cursor).unwrap();
        assert_eq!(raw.payload().len() + FRAME_HEADER_LEN, raw.len());
        decoded.push(decode_frame(&raw).unwrap());
    }

    assert!(cursor.is_empty());
    assert_eq!(decoded, commands);
}

#[test]
fn raw_frame_bytes_match_the_encoding() {
    let cmd = Command::DestroyEntity { entity_id: 77 };
    let encoded = encode_command(&cmd);
    let body = BodyBuilder::new().advance(1).command(&cmd).build();

    let mut cursor = Cursor::new(&body);
    next_frame(&mut cursor).unwrap();
    let raw = next_frame(&mut cursor).unwrap();
    assert_eq!(raw.bytes(), encoded.as_slice());
    assert_eq!(raw.payload(), encode_payload(&cmd).as_slice());
    assert_eq!(raw.offset(), 7);
}

#[test]
fn truncated_payload_inside_a_valid_frame_is_out_of_data() {
    // An IssueCommand whose frame is intact but whose order data is cut short.
    let full = encode_payload(&fixtures::one_of_each()[CommandType::IssueCommand.id() as usize]);
    let body = frame(CommandType::IssueCommand.id(), &full[..full.len() - 6]);

    let mut cursor = Cursor::new(&body);
    let raw = next_frame(&mut cursor).unwrap();
    let err = decode_frame(&raw).unwrap_err();
    match err {
        ParseError::OutOfData { offset, .. } => assert!(offset >= FRAME_HEADER_LEN),
        other => panic!("expected OutOfData, got {other}"),
    }
}

#[test]
fn bad_lua_tag_names_the_command() {
    let mut payload = b"GiveResourcesToPlayer\0".to_vec();
    payload.push(0x42);
    let body = frame(CommandType::LuaSimCallback.id(), &payload);

    let mut cursor = Cursor::new(&body);
    let raw = next_frame(&mut cursor).unwrap();
    assert!(matches!(
        decode_frame(&raw),
        Err(ParseError::MalformedPayload {
            command: CommandType::LuaSimCallback,
            ..
        })
    ));
}

#[test]
fn unknown_type_is_reported_at_its_frame() {
    let body = BodyBuilder::new().advance(2).raw(0x63, &[1, 2]).build();
    let mut cursor = Cursor::new(&body);
    next_frame(&mut cursor).unwrap();
    let raw = next_frame(&mut cursor).unwrap();
    assert_eq!(
        resolve_type(&raw).unwrap_err(),
        ParseError::UnknownCommandType {
            command_type: 0x63,
            offset: 7
        }
    );
}

#[test]
fn chat_callback_exposes_message_fields() {
    let body = BodyBuilder::new().chat("A", "B", "hi").build();
    let mut cursor = Cursor::new(&body);
    let raw = next_frame(&mut cursor).unwrap();
    let Command::LuaSimCallback { lua_name, lua, .. } = decode_frame(&raw).unwrap() else {
        panic!("expected LuaSimCallback");
    };
    assert_eq!(lua_name, "GiveResourcesToPlayer");
    assert_eq!(lua.get("Sender").and_then(LuaValue::as_str), Some("A"));
    let msg = lua.get("Msg").unwrap();
    assert_eq!(msg.get("to").and_then(LuaValue::as_str), Some("B"));
    assert_eq!(msg.get("text").and_then(LuaValue::as_str), Some("hi"));
}
