//! Fuzz target: `decode_record`
//!
//! Feeds arbitrary storage images into the calibration record decoder
//! and asserts that it never panics and that anything it accepts is a
//! record safe to drive the motor with.
//!
//! cargo fuzz run fuzz_record_decoder

#![no_main]

use libfuzzer_sys::fuzz_target;
use servocal::calibration::store::{RECORD_CAPACITY, decode_record, encode_record};

fuzz_target!(|data: &[u8]| {
    if let Ok(record) = decode_record(data) {
        assert!(record.is_valid(), "decoder accepted out-of-range record");

        // Re-encoding an accepted record must decode to the same values.
        let mut buf = [0u8; RECORD_CAPACITY];
        let len = encode_record(&record, &mut buf).expect("valid record encodes");
        assert_eq!(decode_record(&buf[..len]), Ok(record));
    }
});
