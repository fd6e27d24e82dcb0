#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(content) = std::str::from_utf8(data) {
        let _ = gobom_resolver::listing::parse_module_list(content);
        let _ = gobom_resolver::listing::parse_package_list(content);
    }
});
