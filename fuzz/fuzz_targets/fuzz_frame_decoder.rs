//! Fuzz target: `decode_frame`
//!
//! Drives arbitrary byte sequences into the DY-HV20T frame validator and
//! asserts that it never panics, never yields a data field longer than a
//! frame can carry, and that anything it accepts re-encodes to the same
//! bytes.
//!
//! cargo fuzz run fuzz_frame_decoder

#![no_main]

use diorama::audio::codec::{MAX_DATA_LEN, decode_frame, encode_frame};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(frame) = decode_frame(data) {
        assert!(frame.data.len() <= MAX_DATA_LEN, "data field exceeds frame capacity");
        let encoded = encode_frame(frame.cmd, frame.data).unwrap();
        assert_eq!(encoded.as_slice(), data, "re-encoding changed the frame");
    }
});
