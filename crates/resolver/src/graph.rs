//! 그래프 빌더 -- 선택 집합과 전이 간선 목록의 결합
//!
//! 전이 간선 목록의 각 간선을 선택된 모듈 집합에 매칭하여 모듈별 직접
//! 의존성 목록을 채웁니다. 간선 좌표는 치환 적용 후의 좌표와 비교합니다.
//!
//! - 의존 주체(dependant) 매칭은 엄격: 좌표가 정확히 일치해야 하며,
//!   일치하지 않으면 최종 선택되지 않은 버전을 가리키는 간선이므로
//!   버립니다.
//! - 의존 대상(dependency) 매칭은 느슨: 정확 일치를 먼저 시도하고,
//!   실패하면 `path@` 접두사 일치를 허용합니다 (간선이 더 오래된 버전을
//!   가리킬 수 있음). 그래도 없으면 집합에서 잘려 나간 모듈이므로
//!   버립니다.
//!
//! 버려지는 간선은 정상적인 가지치기 잡음이므로 디버그 로그만 남깁니다.

use std::collections::HashMap;

use tracing::debug;

use gobom_core::types::{ModuleSet, compare_versions};

/// 간선 목록 출력을 (의존 주체, 의존 대상) 좌표 쌍으로 파싱합니다.
///
/// 컬럼이 2개가 아닌 라인은 건너뜁니다.
pub fn parse_edges(output: &str) -> Vec<(String, String)> {
    let mut edges = Vec::new();
    for line in output.lines() {
        let mut fields = line.split_whitespace();
        match (fields.next(), fields.next(), fields.next()) {
            (Some(dependant), Some(dependency), None) => {
                edges.push((dependant.to_owned(), dependency.to_owned()));
            }
            (None, _, _) => {} // 빈 라인
            _ => debug!(line = %line, "skipping malformed edge line"),
        }
    }
    edges
}

/// 간선 목록으로 각 모듈의 직접 의존성 목록을 채웁니다.
///
/// 기존 의존성 목록은 먼저 비워지므로 같은 입력에 대해 멱등입니다.
/// 최종적으로 각 목록은 경로 오름차순, 같은 경로는 버전 오름차순으로
/// 정렬됩니다.
pub fn build(set: &mut ModuleSet, edges: &[(String, String)]) {
    for module in &mut set.modules {
        module.dependencies.clear();
    }

    let mut by_coordinate: HashMap<String, usize> = HashMap::new();
    let mut by_path: HashMap<String, usize> = HashMap::new();
    for (index, module) in set.modules.iter().enumerate() {
        by_coordinate.entry(module.coordinate()).or_insert(index);
        by_path
            .entry(module.effective_path().to_owned())
            .or_insert(index);
    }

    for (dependant, dependency) in edges {
        // 엄격 매칭: 선택되지 않은 버전의 간선은 버린다
        let Some(&from) = by_coordinate.get(dependant) else {
            debug!(edge = %dependant, "dropping edge: dependant not in selected set");
            continue;
        };

        // 느슨한 매칭: 정확 일치 후 path@ 접두사 일치
        let to = by_coordinate.get(dependency).copied().or_else(|| {
            let path = dependency.split('@').next().unwrap_or(dependency);
            by_path.get(path).copied()
        });
        let Some(to) = to else {
            debug!(edge = %dependency, "dropping edge: dependency pruned from selected set");
            continue;
        };

        // 메인 모듈의 직접 의존성 목록에서 간접 의존성 잡음을 제거한다
        if set.modules[from].main && set.modules[to].indirect {
            debug!(edge = %dependency, "dropping indirect edge from main module");
            continue;
        }

        let dep_path = set.modules[to].path.clone();
        if !set.modules[from].dependencies.contains(&dep_path) {
            set.modules[from].dependencies.push(dep_path);
        }
    }

    let versions: HashMap<String, String> = set
        .modules
        .iter()
        .map(|m| (m.path.clone(), m.effective_version().to_owned()))
        .collect();
    let empty = String::new();
    for module in &mut set.modules {
        module.dependencies.sort_by(|a, b| {
            a.cmp(b).then_with(|| {
                let va = versions.get(a).unwrap_or(&empty);
                let vb = versions.get(b).unwrap_or(&empty);
                compare_versions(va, vb)
            })
        });
    }
}
