//! 도메인 타입 -- 모듈 그래프 해석 전용 데이터 구조
//!
//! 선택된 모듈 집합, 치환(replace) 정보, 패키지, 빌드 메타데이터 등
//! 해석 파이프라인 전체가 공유하는 핵심 타입을 정의합니다.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// 로컬 경로 치환 센티널 판별
///
/// 치환 대상 경로가 `./` 또는 `../`로 시작하면 파일시스템 경로로 취급합니다.
/// 그 외의 값은 모두 원격 모듈 좌표입니다.
pub fn is_local_path(target: &str) -> bool {
    target.starts_with("./") || target.starts_with("../")
}

/// 모듈 치환(replace) 정보
///
/// "로컬 디렉토리 또는 원격 좌표 중 정확히 하나"라는 불변식을
/// variant 구조로 강제합니다. 로컬 치환의 `path`/`version`은
/// 치환 해석기가 채워 넣기 전까지 비어 있을 수 있습니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Replacement {
    /// 다른 원격 모듈 좌표로의 치환
    Remote {
        /// 치환 모듈 경로
        path: String,
        /// 치환 모듈 버전
        version: String,
        /// 치환 모듈 체크섬 (`h1:` 형식, 있을 경우)
        sum: Option<String>,
    },
    /// 로컬 디렉토리 치환 (`./` 또는 `../` 센티널)
    Local {
        /// 원본 치환 대상 디렉토리 (상대 경로 그대로 보존)
        dir: String,
        /// 해석된 모듈 경로 (해석 전에는 비어 있음)
        path: String,
        /// 기록되었거나 VCS에서 추론된 버전 (없으면 비어 있음)
        version: String,
    },
}

impl Replacement {
    /// 치환 대상 문자열에서 치환 정보를 생성합니다.
    ///
    /// `target`이 로컬 경로 센티널로 시작하면 `Local`, 아니면 `Remote`가 됩니다.
    pub fn from_target(target: &str, version: &str, sum: Option<String>) -> Self {
        if is_local_path(target) {
            Self::Local {
                dir: target.to_owned(),
                path: String::new(),
                version: version.to_owned(),
            }
        } else {
            Self::Remote {
                path: target.to_owned(),
                version: version.to_owned(),
                sum,
            }
        }
    }

    /// 로컬 디렉토리 치환 여부를 반환합니다.
    pub fn is_local(&self) -> bool {
        matches!(self, Self::Local { .. })
    }

    /// 치환이 결정한 모듈 경로를 반환합니다.
    ///
    /// 아직 해석되지 않은 로컬 치환은 빈 문자열을 반환할 수 있습니다.
    pub fn path(&self) -> &str {
        match self {
            Self::Remote { path, .. } => path,
            Self::Local { path, .. } => path,
        }
    }

    /// 치환이 결정한 버전을 반환합니다.
    pub fn version(&self) -> &str {
        match self {
            Self::Remote { version, .. } => version,
            Self::Local { version, .. } => version,
        }
    }

    /// 치환 모듈의 체크섬을 반환합니다 (로컬 치환은 체크섬이 없음).
    pub fn sum(&self) -> Option<&str> {
        match self {
            Self::Remote { sum, .. } => sum.as_deref(),
            Self::Local { .. } => None,
        }
    }
}

impl fmt::Display for Replacement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remote { path, version, .. } => write!(f, "=> {path}@{version}"),
            Self::Local { dir, version, .. } if version.is_empty() => write!(f, "=> {dir}"),
            Self::Local { dir, version, .. } => write!(f, "=> {dir}@{version}"),
        }
    }
}

/// 소스 패키지 정보
///
/// 소유 모듈과의 연결은 포인터가 아니라 모듈 경로 키로 유지합니다.
/// 그룹핑 시점(`ModuleSet::attach_packages`) 이후에는 불변입니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    /// import 경로
    pub import_path: String,
    /// 소유 모듈 경로 (역참조 키)
    pub module_path: String,
    /// 일반 소스 파일 목록
    pub go_files: Vec<String>,
    /// 테스트 소스 파일 목록
    pub test_go_files: Vec<String>,
}

impl fmt::Display for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (module: {})", self.import_path, self.module_path)
    }
}

/// 해석 대상 모듈
///
/// 선택된 집합 안에서 `path`는 유일합니다. 그래프/간선 매칭에 쓰이는
/// 유효 좌표는 치환이 없으면 자기 자신, 있으면 치환 쪽이 권위를 가집니다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    /// 모듈 경로 (선택된 집합 내 유일 키)
    pub path: String,
    /// 시맨틱 버전 문자열 (빈 문자열 허용)
    pub version: String,
    /// 치환 정보 (있을 경우)
    pub replace: Option<Replacement>,
    /// 메인 모듈 여부
    pub main: bool,
    /// 간접 의존성 여부
    pub indirect: bool,
    /// 벤더 트리에서 로드된 모듈 여부
    pub vendored: bool,
    /// 테스트 전용 의존성 여부 (모듈 필터가 설정)
    pub test_only: bool,
    /// 모듈 루트 디렉토리 (알고 있을 경우)
    pub dir: Option<String>,
    /// 콘텐츠 체크섬 (`h1:` 형식, 있을 경우)
    pub sum: Option<String>,
    /// 이 모듈에 속한 패키지 목록 (그룹핑 후 채워짐)
    pub packages: Vec<Package>,
    /// 직접 의존 모듈 경로 목록 (같은 집합 내 약한 참조, 정렬됨)
    pub dependencies: Vec<String>,
}

impl Module {
    /// 경로와 버전만으로 모듈을 생성합니다. 나머지 필드는 기본값입니다.
    pub fn new(path: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            version: version.into(),
            replace: None,
            main: false,
            indirect: false,
            vendored: false,
            test_only: false,
            dir: None,
            sum: None,
            packages: Vec::new(),
            dependencies: Vec::new(),
        }
    }

    /// 치환을 반영한 유효 모듈 경로를 반환합니다.
    ///
    /// 로컬 치환이 아직 해석되지 않아 경로가 비어 있으면 원본 경로를 씁니다.
    pub fn effective_path(&self) -> &str {
        match &self.replace {
            Some(r) if !r.path().is_empty() => r.path(),
            _ => &self.path,
        }
    }

    /// 치환을 반영한 유효 버전을 반환합니다.
    pub fn effective_version(&self) -> &str {
        match &self.replace {
            Some(r) if !r.path().is_empty() => r.version(),
            _ => &self.version,
        }
    }

    /// 치환을 반영한 유효 체크섬을 반환합니다.
    pub fn effective_sum(&self) -> Option<&str> {
        match &self.replace {
            Some(r) if !r.path().is_empty() => r.sum(),
            _ => self.sum.as_deref(),
        }
    }

    /// 간선 매칭에 쓰이는 모듈 좌표(`path` 또는 `path@version`)를 반환합니다.
    pub fn coordinate(&self) -> String {
        let path = self.effective_path();
        let version = self.effective_version();
        if version.is_empty() {
            path.to_owned()
        } else {
            format!("{path}@{version}")
        }
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.coordinate())?;
        if let Some(replace) = &self.replace {
            write!(f, " {replace}")?;
        }
        Ok(())
    }
}

/// 선택된 모듈 집합
///
/// 외부 해석 단계가 이미 버전 선택을 끝낸, 경로당 한 항목인 모듈 목록입니다.
/// 메인 모듈도 집합 안에 포함되며 `main` 플래그로 구분합니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModuleSet {
    /// 모듈 목록 (경로 유일)
    pub modules: Vec<Module>,
}

impl ModuleSet {
    /// 빈 집합을 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 모듈을 집합에 추가합니다.
    ///
    /// 같은 경로가 이미 존재하면 추가하지 않고 `false`를 반환합니다
    /// (첫 항목 우선).
    pub fn insert(&mut self, module: Module) -> bool {
        if self.modules.iter().any(|m| m.path == module.path) {
            return false;
        }
        self.modules.push(module);
        true
    }

    /// 집합 내 모듈 수를 반환합니다.
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// 집합이 비어 있는지 여부를 반환합니다.
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// 메인 모듈을 반환합니다.
    pub fn main(&self) -> Option<&Module> {
        self.modules.iter().find(|m| m.main)
    }

    /// 메인 모듈의 인덱스를 반환합니다.
    pub fn main_index(&self) -> Option<usize> {
        self.modules.iter().position(|m| m.main)
    }

    /// 경로로 모듈을 검색합니다.
    pub fn find(&self, path: &str) -> Option<&Module> {
        self.modules.iter().find(|m| m.path == path)
    }

    /// 메인 모듈을 제외한 의존 모듈 목록을 반환합니다.
    pub fn dependencies(&self) -> impl Iterator<Item = &Module> {
        self.modules.iter().filter(|m| !m.main)
    }

    /// 패키지 목록을 소유 모듈 아래에 그룹핑합니다.
    ///
    /// 모듈 경로 -> 인덱스 맵을 한 번 만들어 사용하며, 소유 모듈이
    /// 집합에 없는 패키지는 버려집니다. 기존 패키지 목록은 대체됩니다.
    pub fn attach_packages(&mut self, packages: Vec<Package>) {
        let index: HashMap<String, usize> = self
            .modules
            .iter()
            .enumerate()
            .map(|(i, m)| (m.path.clone(), i))
            .collect();

        for module in &mut self.modules {
            module.packages.clear();
        }
        for package in packages {
            if let Some(&i) = index.get(&package.module_path) {
                self.modules[i].packages.push(package);
            }
        }
    }
}

impl fmt::Display for ModuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ModuleSet({} modules, main={})",
            self.modules.len(),
            self.main().map(|m| m.path.as_str()).unwrap_or("?"),
        )
    }
}

/// 빌드 메타데이터
///
/// 컴파일된 아티팩트에 내장된 빌드 정보를 구조화한 레코드입니다.
/// `path`는 서브 패키지 빌드에서 메인 모듈 경로와 다를 수 있습니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildInfo {
    /// 메인 패키지 경로
    pub path: String,
    /// 메인 모듈
    pub main: Module,
    /// 의존 모듈 목록
    pub deps: Vec<Module>,
    /// 빌드 설정 (키/값, 입력 순서 보존)
    pub settings: Vec<(String, String)>,
}

impl BuildInfo {
    /// 빌드 설정 값을 키로 조회합니다.
    pub fn setting(&self, key: &str) -> Option<&str> {
        self.settings
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// 메인 모듈과 의존 모듈을 합쳐 선택된 모듈 집합으로 변환합니다.
    pub fn to_module_set(&self) -> ModuleSet {
        let mut set = ModuleSet::new();
        let mut main = self.main.clone();
        main.main = true;
        set.insert(main);
        for dep in &self.deps {
            set.insert(dep.clone());
        }
        set
    }
}

impl fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "BuildInfo(path={}, main={}, {} deps, {} settings)",
            self.path,
            self.main.path,
            self.deps.len(),
            self.settings.len(),
        )
    }
}

/// 두 버전 문자열을 비교합니다.
///
/// `v` 접두사를 제거한 뒤 시맨틱 버전으로 비교하고, 어느 한쪽이라도
/// 시맨틱 버전이 아니면 문자열 비교로 폴백합니다.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let parse = |s: &str| semver::Version::parse(s.strip_prefix('v').unwrap_or(s)).ok();
    match (parse(a), parse(b)) {
        (Some(va), Some(vb)) => va.cmp(&vb),
        _ => a.cmp(b),
    }
}
