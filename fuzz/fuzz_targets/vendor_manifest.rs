#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(content) = std::str::from_utf8(data) {
        let modules = gobom_resolver::parse_vendor_manifest(content);
        // 중복 제거 불변식: 경로는 유일해야 한다
        let mut paths: Vec<&str> = modules.iter().map(|m| m.path.as_str()).collect();
        let before = paths.len();
        paths.sort_unstable();
        paths.dedup();
        assert_eq!(paths.len(), before);
    }
});
