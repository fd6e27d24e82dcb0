//! 로컬 경로 치환 해석기
//!
//! 선택된 집합에서 치환 대상이 로컬 경로(`./`, `../`)인 모듈을 찾아,
//! 해당 디렉토리의 모듈 식별자(경로)를 로드하고 버전이 기록되어 있지
//! 않으면 [`VersionDetector`]로 추론합니다.
//!
//! 원격 좌표 치환은 건드리지 않습니다. 디렉토리가 모듈 루트가 아니거나
//! 버전 추론이 실패하는 경우는 경고만 남기고 계속 진행합니다. 일부
//! 디렉토리는 버전 관리 하에 있지 않기 때문입니다.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use gobom_core::types::{ModuleSet, Replacement, is_local_path};

use crate::error::ResolverError;
use crate::vcs::VersionDetector;

/// 자기 자신을 다시 로컬 디렉토리로 치환하는 체인의 최대 깊이
const MAX_IDENTITY_DEPTH: usize = 4;

/// 집합 내 모든 로컬 치환을 해석합니다.
///
/// `main_root`는 상대 치환 경로의 기준이 되는 메인 모듈 루트입니다.
/// `detect_versions`가 꺼져 있으면 버전 추론 단계를 건너뜁니다.
pub fn resolve_local_replacements(
    set: &mut ModuleSet,
    main_root: &Path,
    detector: &VersionDetector,
    detect_versions: bool,
) {
    for module in &mut set.modules {
        let Some(Replacement::Local { dir, path, version }) = &mut module.replace else {
            continue;
        };

        let target = if Path::new(dir.as_str()).is_absolute() {
            PathBuf::from(dir.as_str())
        } else {
            main_root.join(dir.as_str())
        };
        let target = std::fs::canonicalize(&target).unwrap_or(target);

        if !target.join("go.mod").is_file() {
            warn!(
                module = %module.path,
                dir = %target.display(),
                "local replacement target is not a module root, leaving unresolved",
            );
            continue;
        }

        let resolved_dir = match load_module_identity(&target, MAX_IDENTITY_DEPTH) {
            Ok((resolved_path, resolved_dir)) => {
                debug!(
                    module = %module.path,
                    resolved = %resolved_path,
                    "resolved local replacement identity",
                );
                *path = resolved_path;
                resolved_dir
            }
            Err(e) => {
                warn!(
                    module = %module.path,
                    dir = %target.display(),
                    error = %e,
                    "failed to load local replacement identity, leaving unresolved",
                );
                continue;
            }
        };

        if version.is_empty() && detect_versions {
            match detector.detect(&resolved_dir) {
                Ok(detected) => *version = detected,
                Err(e) => {
                    // 버전 관리 밖의 디렉토리는 정상적인 경우다
                    warn!(
                        module = %module.path,
                        dir = %resolved_dir.display(),
                        error = %e,
                        "failed to detect version for local replacement",
                    );
                }
            }
        }

        *dir = resolved_dir.display().to_string();
    }
}

/// 디렉토리의 모듈 식별자(경로)와 최종 디렉토리를 로드합니다.
///
/// 대상 모듈이 자기 자신을 또 다른 로컬 디렉토리로 치환하면 깊이
/// 한도 안에서 체인을 따라갑니다.
fn load_module_identity(dir: &Path, depth: usize) -> Result<(String, PathBuf), ResolverError> {
    let gomod = dir.join("go.mod");
    let content = std::fs::read_to_string(&gomod).map_err(|e| ResolverError::Io {
        path: gomod.display().to_string(),
        source: e,
    })?;

    let module_path = parse_module_directive(&content).ok_or_else(|| ResolverError::GoMod {
        path: gomod.display().to_string(),
        reason: "missing module directive".to_owned(),
    })?;

    if depth > 0
        && let Some(next_target) = find_self_local_replace(&content, &module_path)
    {
        let next = std::fs::canonicalize(dir.join(&next_target)).unwrap_or_else(|_| dir.join(&next_target));
        if next.join("go.mod").is_file() {
            return load_module_identity(&next, depth - 1);
        }
    }

    Ok((module_path, dir.to_path_buf()))
}

/// `module` 지시문에서 모듈 경로를 추출합니다.
fn parse_module_directive(content: &str) -> Option<String> {
    for line in content.lines() {
        let line = strip_comment(line).trim();
        if let Some(rest) = line.strip_prefix("module") {
            if !rest.starts_with(char::is_whitespace) {
                continue;
            }
            let path = rest.trim().trim_matches('"');
            if !path.is_empty() {
                return Some(path.to_owned());
            }
        }
    }
    None
}

/// 모듈이 자기 자신을 로컬 디렉토리로 치환하는 지시문을 찾습니다.
fn find_self_local_replace(content: &str, module_path: &str) -> Option<String> {
    let mut in_block = false;
    for line in content.lines() {
        let line = strip_comment(line).trim();
        let directive = if in_block {
            if line == ")" {
                in_block = false;
                continue;
            }
            line
        } else if let Some(rest) = line.strip_prefix("replace") {
            let rest = rest.trim();
            if rest == "(" {
                in_block = true;
                continue;
            }
            rest
        } else {
            continue;
        };

        let Some((left, right)) = directive.split_once("=>") else {
            continue;
        };
        let old_path = left.split_whitespace().next().unwrap_or("");
        let new_target = right.split_whitespace().next().unwrap_or("");
        if old_path == module_path && is_local_path(new_target) {
            return Some(new_target.to_owned());
        }
    }
    None
}

/// 라인 끝 주석을 제거합니다.
fn strip_comment(line: &str) -> &str {
    match line.find("//") {
        Some(index) => &line[..index],
        None => line,
    }
}
