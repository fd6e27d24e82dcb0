//! 내장 빌드 메타데이터 매니페스트 파서
//!
//! 컴파일된 아티팩트에 내장된 라인 지향 텍스트 블롭을 [`BuildInfo`]로
//! 디코딩합니다. 각 라인은 고정 키워드 접두사(`path`, `mod`, `dep`,
//! `=>`, `build`) 뒤에 탭으로 구분된 컬럼을 갖습니다.
//!
//! 기존 빌드 툴체인과의 상호 운용을 위해 문법을 바이트 단위로 동일하게
//! 재현해야 하며, 인식하지 못하는 접두사는 상위 호환을 위해 무시합니다.
//! 툴체인이 블롭을 덤프할 때 붙이는 프레이밍(라인당 탭 하나, 배너 라인)도
//! 그대로 받아들입니다.

use gobom_core::types::{BuildInfo, Module, Replacement};

use crate::error::ResolverError;

/// `=>` 라인이 붙을 수 있는 직전 모듈 위치
enum Pending {
    /// 직전 라인이 모듈 라인이 아님
    None,
    /// 직전 라인이 `mod` (메인 모듈)
    Main,
    /// 직전 라인이 `dep` (마지막 의존 모듈)
    Dep,
}

/// 빌드 메타데이터 블롭을 파싱하여 [`BuildInfo`]를 반환합니다.
///
/// # Errors
///
/// 잘못된 형식의 라인은 1부터 시작하는 라인 번호와 함께 전체 파싱을
/// 중단시킵니다. 파싱이 끝난 뒤 메인 모듈이 없으면
/// [`ResolverError::MissingMainModule`]을 반환합니다.
pub fn parse_build_info(data: &str) -> Result<BuildInfo, ResolverError> {
    let mut info = BuildInfo::default();
    let mut pending = Pending::None;

    for (index, raw_line) in data.lines().enumerate() {
        let line_no = index + 1;
        // 툴체인 덤프 프레이밍: 라인당 탭 하나가 앞에 붙는다
        let line = raw_line.strip_prefix('\t').unwrap_or(raw_line);
        if line.is_empty() {
            pending = Pending::None;
            continue;
        }

        let columns: Vec<&str> = line.split('\t').collect();
        match columns[0] {
            "path" => {
                if columns.len() != 2 {
                    return Err(ResolverError::ManifestLine {
                        line: line_no,
                        reason: format!("expected 1 column after 'path', got {}", columns.len() - 1),
                    });
                }
                info.path = columns[1].to_owned();
                pending = Pending::None;
            }
            "mod" => {
                info.main = parse_module_columns(&columns[1..], line_no, "mod")?;
                pending = Pending::Main;
            }
            "dep" => {
                let module = parse_module_columns(&columns[1..], line_no, "dep")?;
                info.deps.push(module);
                pending = Pending::Dep;
            }
            "=>" => {
                if columns.len() != 4 {
                    return Err(ResolverError::ManifestLine {
                        line: line_no,
                        reason: format!("expected 3 columns after '=>', got {}", columns.len() - 1),
                    });
                }
                let sum = if columns[3].is_empty() {
                    None
                } else {
                    Some(columns[3].to_owned())
                };
                let replacement = Replacement::from_target(columns[1], columns[2], sum);
                let target = match pending {
                    Pending::Main => Some(&mut info.main),
                    Pending::Dep => info.deps.last_mut(),
                    Pending::None => None,
                };
                let Some(target) = target else {
                    return Err(ResolverError::ReplacementWithoutModule { line: line_no });
                };
                target.replace = Some(replacement);
                // 하나의 치환 라인이 두 모듈에 붙을 수 없다
                pending = Pending::None;
            }
            "build" => {
                let value = columns[1..].join("\t");
                let (key, val) = value.split_once('=').ok_or(ResolverError::ManifestLine {
                    line: line_no,
                    reason: "build setting must be key=value".to_owned(),
                })?;
                if key.is_empty() {
                    return Err(ResolverError::ManifestLine {
                        line: line_no,
                        reason: "build setting key must not be empty".to_owned(),
                    });
                }
                info.settings.push((key.to_owned(), val.to_owned()));
                pending = Pending::None;
            }
            // 인식하지 못하는 접두사는 무시 (상위 호환)
            _ => {
                pending = Pending::None;
            }
        }
    }

    if info.main.path.is_empty() {
        return Err(ResolverError::MissingMainModule);
    }
    Ok(info)
}

/// `mod`/`dep` 키워드 뒤의 컬럼을 모듈로 변환합니다.
///
/// 2컬럼(경로, 버전) 또는 3컬럼(경로, 버전, 체크섬)만 허용합니다.
fn parse_module_columns(
    columns: &[&str],
    line_no: usize,
    keyword: &str,
) -> Result<Module, ResolverError> {
    match columns {
        [path, version] => Ok(Module::new(*path, *version)),
        [path, version, sum] => {
            let mut module = Module::new(*path, *version);
            if !sum.is_empty() {
                module.sum = Some((*sum).to_owned());
            }
            Ok(module)
        }
        _ => Err(ResolverError::ManifestLine {
            line: line_no,
            reason: format!(
                "expected 2 or 3 columns after '{keyword}', got {}",
                columns.len()
            ),
        }),
    }
}
