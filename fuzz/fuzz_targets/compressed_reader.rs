#![no_main]
use std::io::Read;

use capfile::CompressedSource;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(source) = CompressedSource::new(data) {
        let mut sink = Vec::new();
        let _ = source.take(1 << 20).read_to_end(&mut sink);
    }
});
