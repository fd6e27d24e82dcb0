//! 벤더 매니페스트 파서
//!
//! 의존성이 소스 트리에 벤더링된 경우, 모듈 집합/그래프의 대체 소스인
//! 라인 지향 매니페스트를 파싱합니다. 모듈 레코드는 `# ` 로 시작하며
//! `path version` 또는 `parent [version] => replacement [version]`
//! 형식입니다 (버전 필드는 선택).
//!
//! 생성 도구는 치환 제약을 출력 끝에서 한 번 더 내보내므로, 부모 경로
//! 기준 첫 등장만 유지합니다. 메인 모듈은 이 매니페스트에 없으며
//! 호출자가 별도로 로드해 추가해야 합니다.

use std::collections::HashSet;

use tracing::debug;

use gobom_core::types::{Module, Replacement};

/// 벤더 트리 안에서 모듈 콘텐츠가 놓이는 위치 규약
const VENDOR_DIR_PREFIX: &str = "vendor";

/// 벤더 매니페스트를 모듈 목록으로 파싱합니다.
///
/// 인식할 수 없는 레코드 라인은 건너뜁니다 (패키지 라인, 마커 라인 등).
pub fn parse_vendor_manifest(content: &str) -> Vec<Module> {
    let mut modules = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    for line in content.lines() {
        // 모듈 레코드는 정확히 "# "로 시작한다 ("## explicit" 마커 제외)
        let Some(record) = line.strip_prefix("# ") else {
            continue;
        };
        if record.starts_with('#') {
            continue;
        }

        let tokens: Vec<&str> = record.split_whitespace().collect();
        let module = if let Some(arrow) = tokens.iter().position(|t| *t == "=>") {
            parse_replacement_record(&tokens[..arrow], &tokens[arrow + 1..])
        } else {
            parse_plain_record(&tokens)
        };
        let Some(module) = module else {
            debug!(line = %line, "skipping unrecognized vendor manifest line");
            continue;
        };

        // 치환 제약은 출력 끝에 한 번 더 나타난다: 첫 등장만 유지
        if !seen.insert(module.path.clone()) {
            continue;
        }
        modules.push(module);
    }
    modules
}

/// `path version` 레코드를 모듈로 변환합니다.
fn parse_plain_record(tokens: &[&str]) -> Option<Module> {
    match tokens {
        [path, version] => Some(vendored_module(path, version, None)),
        _ => None,
    }
}

/// `parent [version] => replacement [version]` 레코드를 모듈로 변환합니다.
fn parse_replacement_record(left: &[&str], right: &[&str]) -> Option<Module> {
    let (parent, parent_version) = match left {
        [path] => (*path, ""),
        [path, version] => (*path, *version),
        _ => return None,
    };
    let (target, target_version) = match right {
        [path] => (*path, ""),
        [path, version] => (*path, *version),
        _ => return None,
    };
    let replacement = Replacement::from_target(target, target_version, None);
    Some(vendored_module(parent, parent_version, Some(replacement)))
}

fn vendored_module(path: &str, version: &str, replace: Option<Replacement>) -> Module {
    let mut module = Module::new(path, version);
    module.vendored = true;
    module.dir = Some(format!("{VENDOR_DIR_PREFIX}/{path}"));
    module.replace = replace;
    module
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_records() {
        let content = "# example.com/dep v0.1.0\n\
                       ## explicit; go 1.22\n\
                       example.com/dep/pkg\n\
                       # example.com/other v1.2.3\n";
        let modules = parse_vendor_manifest(content);
        assert_eq!(modules.len(), 2);
        assert_eq!(modules[0].path, "example.com/dep");
        assert_eq!(modules[0].version, "v0.1.0");
        assert!(modules[0].vendored);
        assert_eq!(modules[0].dir.as_deref(), Some("vendor/example.com/dep"));
    }

    #[test]
    fn parses_replacement_records() {
        let content = "# example.com/old v1.0.0 => example.com/fork v1.1.0\n\
                       # example.com/local => ./patched\n";
        let modules = parse_vendor_manifest(content);
        assert_eq!(modules.len(), 2);

        let remote = modules[0].replace.as_ref().unwrap();
        assert_eq!(remote.path(), "example.com/fork");
        assert_eq!(remote.version(), "v1.1.0");

        let local = modules[1].replace.as_ref().unwrap();
        assert!(local.is_local());
        assert_eq!(modules[1].version, "");
    }

    #[test]
    fn replacement_reemission_keeps_first_occurrence() {
        let content = "# example.com/old v1.0.0 => example.com/fork v1.1.0\n\
                       # example.com/dep v0.1.0\n\
                       # example.com/old => example.com/fork v9.9.9\n";
        let modules = parse_vendor_manifest(content);
        assert_eq!(modules.len(), 2);
        let replace = modules[0].replace.as_ref().unwrap();
        assert_eq!(replace.version(), "v1.1.0");
    }

    #[test]
    fn package_lines_are_ignored() {
        let content = "example.com/dep/pkg\nexample.com/dep/internal\n";
        assert!(parse_vendor_manifest(content).is_empty());
    }

    #[test]
    fn single_token_records_are_skipped() {
        let content = "# example.com/incomplete\n";
        assert!(parse_vendor_manifest(content).is_empty());
    }

    #[test]
    fn empty_input_yields_no_modules() {
        assert!(parse_vendor_manifest("").is_empty());
    }
}
