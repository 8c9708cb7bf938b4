//! Feed arbitrary frames to the responder.
//!
//! Replies only ever go back to the sender, and only RTS and MSG get one.

#![no_main]

use libfuzzer_sys::fuzz_target;
use telelink_core::{
    config::LinkConfig,
    proto::{Control, Packet},
    responder::Responder,
};

fuzz_target!(|frames: Vec<Vec<u8>>| {
    let config = LinkConfig::default().mirrored();
    let mut responder = Responder::new(&config);

    for frame in &frames {
        let Ok(packet) = Packet::decode(frame) else {
            continue;
        };
        if let Some(reply) = responder.handle(&packet) {
            assert_eq!(reply.destination, config.peer_id);
            assert!(matches!(packet.control, Control::Rts | Control::Msg));
        }
    }
});
