#![no_main]

use std::path::Path;

use emospy::config::loader::ConfigLoader;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(yaml) = std::str::from_utf8(data) {
        let loader = ConfigLoader::default();
        // Errors are fine; panics are not.
        let _ = loader.load_str(yaml, Path::new("<fuzz>"));
    }
});
