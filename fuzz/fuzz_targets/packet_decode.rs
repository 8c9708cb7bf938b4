//! Decode arbitrary bytes as a packet.
//!
//! Anything that decodes must encode back to the same bytes.

#![no_main]

use libfuzzer_sys::fuzz_target;
use telelink_proto::{PACKET_SIZE, Packet};

fuzz_target!(|data: &[u8]| {
    let Ok(packet) = Packet::decode(data) else {
        return;
    };

    assert!(data.len() <= PACKET_SIZE);
    assert_eq!(packet.encode(), data);
});
