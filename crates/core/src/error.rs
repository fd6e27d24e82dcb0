//! 에러 타입 -- 도메인별 에러 정의

/// Gobom 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum GobomError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 모듈 그래프 해석 에러
    #[error("resolve error: {0}")]
    Resolve(#[from] ResolveError),

    /// SBOM 문서 조립 에러
    #[error("sbom error: {0}")]
    Sbom(#[from] SbomError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 모듈 그래프 해석 에러
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// 빌드 메타데이터 매니페스트 파싱 실패
    #[error("manifest parse failed: {0}")]
    ManifestParse(String),

    /// 모듈/그래프 목록 출력 파싱 실패
    #[error("listing parse failed: {0}")]
    ListingParse(String),

    /// 외부 도구 호출 실패
    #[error("tool invocation failed: {0}")]
    ToolFailed(String),

    /// 버전 관리 이력 조회 실패
    #[error("vcs detection failed: {0}")]
    VcsFailed(String),

    /// 파싱 후 메인 모듈 부재
    #[error("missing main module")]
    MissingMainModule,
}

/// SBOM 문서 조립 에러
#[derive(Debug, thiserror::Error)]
pub enum SbomError {
    /// 문서 조립 실패
    #[error("assembly failed: {0}")]
    AssemblyFailed(String),

    /// JSON 직렬화 실패
    #[error("serialization failed: {0}")]
    Serialization(String),
}
