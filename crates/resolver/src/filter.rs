//! 모듈 필터 -- 실제로 import되는 모듈만 남기기
//!
//! 후보 모듈을 배치로 묶어 외부 "why" 질의에 넘기고, 출력에서 모듈별
//! import 패키지 목록을 파싱하여 사용되지 않는 모듈을 제거하고 테스트
//! 전용 모듈을 분류합니다.
//!
//! 배치 크기는 프로세스 인자 길이를 묶는 보호 장치일 뿐 정합성 조건이
//! 아니므로 설정 가능한 상수로 다룹니다. 배치는 순차 처리되며 하나라도
//! 실패하면 전체 해석이 중단됩니다.

use std::collections::HashMap;
use std::path::Path;

use tracing::debug;

use gobom_core::types::ModuleSet;

use crate::error::ResolverError;
use crate::toolchain::GoToolchain;

/// 테스트 바이너리 패키지 경로 접미사
pub const TEST_BINARY_SUFFIX: &str = ".test";

/// "why" 질의 출력을 모듈 경로 -> import 패키지 목록 맵으로 파싱합니다.
///
/// 섹션은 `# ` 접두사 헤더 라인으로 시작합니다. 헤더 뒤에 패키지 라인이
/// 없으면 "필요 없음"을 뜻하고, `(main module does not need …)` 라인은
/// 빈 결과로 취급합니다.
pub fn parse_why_output(output: &str) -> HashMap<String, Vec<String>> {
    let mut sections: HashMap<String, Vec<String>> = HashMap::new();
    let mut current: Option<String> = None;

    for line in output.lines() {
        let line = line.trim();
        if line.is_empty() {
            current = None;
            continue;
        }
        if let Some(header) = line.strip_prefix("# ") {
            let module = header.trim().to_owned();
            sections.entry(module.clone()).or_default();
            current = Some(module);
            continue;
        }
        if line.starts_with("(main module does not need") {
            continue;
        }
        if let Some(module) = &current {
            sections
                .entry(module.clone())
                .or_default()
                .push(line.to_owned());
        }
    }
    sections
}

/// 집합에서 import되지 않는 모듈을 제거하고 테스트 전용 모듈을 분류합니다.
///
/// 메인 모듈은 질의 대상이 아니며 항상 유지됩니다. import 패키지 경로가
/// 전부 테스트 바이너리 접미사로 끝나면 `test_only`로 표시하고, 호출자가
/// 테스트 포함을 요청하지 않았으면 제거합니다.
pub fn filter_modules(
    set: &mut ModuleSet,
    toolchain: &dyn GoToolchain,
    dir: &Path,
    chunk_size: usize,
    include_tests: bool,
) -> Result<(), ResolverError> {
    let candidates: Vec<String> = set.dependencies().map(|m| m.path.clone()).collect();
    if candidates.is_empty() {
        return Ok(());
    }

    let chunk_size = chunk_size.max(1);
    let mut imports: HashMap<String, Vec<String>> = HashMap::new();
    for chunk in candidates.chunks(chunk_size) {
        let output = toolchain.module_why(dir, chunk)?;
        imports.extend(parse_why_output(&output));
    }

    set.modules.retain_mut(|module| {
        if module.main {
            return true;
        }
        let Some(packages) = imports.get(&module.path) else {
            debug!(module = %module.path, "dropping module: absent from why output");
            return false;
        };
        if packages.is_empty() {
            debug!(module = %module.path, "dropping module: not needed");
            return false;
        }
        let test_only = packages.iter().all(|p| p.ends_with(TEST_BINARY_SUFFIX));
        module.test_only = test_only;
        if test_only && !include_tests {
            debug!(module = %module.path, "dropping test-only module");
            return false;
        }
        true
    });

    Ok(())
}
