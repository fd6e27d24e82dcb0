//! 모듈/패키지 목록 JSON 스트림 파서
//!
//! 모듈 목록 프로세스는 연접된 JSON 오브젝트 스트림(오브젝트 사이 구분자
//! 없음)을 출력합니다. 이 모듈은 그 스트림을 [`ModuleSet`]과
//! [`Package`] 레코드로 변환합니다.
//!
//! 버전 선택 알고리즘은 여기서 재계산하지 않습니다. 선택된 집합은
//! 외부 해석 단계의 결과를 불투명한 입력으로 그대로 받아들입니다.

use serde::Deserialize;
use tracing::debug;

use gobom_core::types::{Module, ModuleSet, Package, Replacement};

use crate::error::ResolverError;

/// 모듈 목록 프로세스의 단일 레코드
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct ModuleRecord {
    path: String,
    version: String,
    main: bool,
    indirect: bool,
    dir: Option<String>,
    sum: Option<String>,
    replace: Option<Box<ReplaceRecord>>,
}

/// 모듈 레코드 내 치환 서브 레코드
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct ReplaceRecord {
    path: String,
    version: String,
    dir: Option<String>,
    sum: Option<String>,
}

/// 패키지 목록 프로세스의 단일 레코드
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct PackageRecord {
    import_path: String,
    module: Option<PackageModuleRef>,
    go_files: Vec<String>,
    test_go_files: Vec<String>,
    #[serde(rename = "XTestGoFiles")]
    x_test_go_files: Vec<String>,
}

/// 패키지 레코드의 소유 모듈 참조
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct PackageModuleRef {
    path: String,
}

impl From<ModuleRecord> for Module {
    fn from(record: ModuleRecord) -> Self {
        let mut module = Module::new(record.path, record.version);
        module.main = record.main;
        module.indirect = record.indirect;
        module.dir = record.dir;
        module.sum = record.sum;
        if let Some(replace) = record.replace {
            let replace = *replace;
            let mut replacement =
                Replacement::from_target(&replace.path, &replace.version, replace.sum);
            // 목록 프로세스가 이미 절대 디렉토리를 알고 있으면 그쪽을 쓴다
            if let (Replacement::Local { dir, .. }, Some(abs)) = (&mut replacement, replace.dir) {
                *dir = abs;
            }
            module.replace = Some(replacement);
        }
        module
    }
}

/// 모듈 목록 출력을 선택된 모듈 집합으로 파싱합니다.
///
/// 같은 경로가 두 번 나타나면 첫 레코드가 이깁니다. 메인 모듈이 없으면
/// 치명적 에러입니다.
pub fn parse_module_list(output: &str) -> Result<ModuleSet, ResolverError> {
    let mut set = ModuleSet::new();
    for record in serde_json::Deserializer::from_str(output).into_iter::<ModuleRecord>() {
        let record = record.map_err(|e| ResolverError::ListingParse {
            reason: format!("invalid module record: {e}"),
        })?;
        let module = Module::from(record);
        if !set.insert(module) {
            debug!("duplicate module path in listing, keeping first occurrence");
        }
    }
    if set.main().is_none() {
        return Err(ResolverError::MissingMainModule);
    }
    Ok(set)
}

/// 메인 모듈 단독 레코드를 파싱합니다.
pub fn parse_main_module(output: &str) -> Result<Module, ResolverError> {
    let record: ModuleRecord =
        serde_json::from_str(output.trim()).map_err(|e| ResolverError::ListingParse {
            reason: format!("invalid main module record: {e}"),
        })?;
    let mut module = Module::from(record);
    module.main = true;
    Ok(module)
}

/// 패키지 목록 출력을 패키지 레코드로 파싱합니다.
///
/// 소유 모듈이 없는 레코드(표준 라이브러리 패키지)는 건너뜁니다.
pub fn parse_package_list(output: &str) -> Result<Vec<Package>, ResolverError> {
    let mut packages = Vec::new();
    for record in serde_json::Deserializer::from_str(output).into_iter::<PackageRecord>() {
        let record = record.map_err(|e| ResolverError::ListingParse {
            reason: format!("invalid package record: {e}"),
        })?;
        let Some(module) = record.module else {
            continue;
        };
        let mut test_go_files = record.test_go_files;
        test_go_files.extend(record.x_test_go_files);
        packages.push(Package {
            import_path: record.import_path,
            module_path: module.path,
            go_files: record.go_files,
            test_go_files,
        });
    }
    Ok(packages)
}
