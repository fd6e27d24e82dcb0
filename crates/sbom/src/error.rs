//! SBOM 조립 에러 타입

use gobom_core::error::{GobomError, SbomError};

/// SBOM 조립 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum SbomBuildError {
    /// 문서 조립 실패 (메인 모듈 부재 등)
    #[error("sbom assembly error: {0}")]
    Assembly(String),

    /// JSON 직렬화 실패
    #[error("sbom serialization error: {0}")]
    Serialization(String),

    /// 아티팩트 다이제스트 계산 실패
    #[error("artifact digest error: {path}: {source}")]
    ArtifactDigest {
        /// 아티팩트 경로
        path: String,
        /// 원본 I/O 에러
        source: std::io::Error,
    },
}

impl From<SbomBuildError> for GobomError {
    fn from(err: SbomBuildError) -> Self {
        match err {
            SbomBuildError::Assembly(msg) => GobomError::Sbom(SbomError::AssemblyFailed(msg)),
            SbomBuildError::Serialization(msg) => GobomError::Sbom(SbomError::Serialization(msg)),
            SbomBuildError::ArtifactDigest { .. } => {
                GobomError::Sbom(SbomError::AssemblyFailed(err.to_string()))
            }
        }
    }
}
