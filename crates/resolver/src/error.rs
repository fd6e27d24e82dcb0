//! 해석기 에러 타입
//!
//! [`ResolverError`]는 해석 파이프라인 내에서 발생할 수 있는 모든 에러를
//! 나타냅니다. `From<ResolverError> for GobomError` 구현을 통해 `?`
//! 연산자로 상위 에러 타입으로 자연스럽게 전파됩니다.

use gobom_core::error::{GobomError, ResolveError};

/// 해석기 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum ResolverError {
    /// 빌드 메타데이터 매니페스트의 잘못된 라인
    #[error("manifest line {line}: {reason}")]
    ManifestLine {
        /// 1부터 시작하는 라인 번호
        line: usize,
        /// 파싱 실패 사유
        reason: String,
    },

    /// 직전 라인에 모듈이 없는 치환 라인
    #[error("manifest line {line}: replacement with no module on previous line")]
    ReplacementWithoutModule {
        /// 1부터 시작하는 라인 번호
        line: usize,
    },

    /// 파싱 후 메인 모듈 부재
    #[error("missing main module")]
    MissingMainModule,

    /// 모듈/패키지 목록 출력 파싱 실패
    #[error("listing parse error: {reason}")]
    ListingParse {
        /// 파싱 실패 사유
        reason: String,
    },

    /// 벤더 매니페스트의 잘못된 레코드
    #[error("vendor manifest line {line}: {reason}")]
    VendorManifest {
        /// 1부터 시작하는 라인 번호
        line: usize,
        /// 파싱 실패 사유
        reason: String,
    },

    /// 모듈 정의 파일 해석 실패
    #[error("go.mod {path}: {reason}")]
    GoMod {
        /// 파일 경로
        path: String,
        /// 실패 사유
        reason: String,
    },

    /// 외부 도구 호출 실패
    #[error("tool '{command}' failed: {reason}")]
    Tool {
        /// 실행한 명령
        command: String,
        /// 실패 사유 (종료 코드, stderr 등)
        reason: String,
    },

    /// 버전 관리 저장소를 찾지 못함
    #[error("no repository found at or above {dir}")]
    VcsNotFound {
        /// 탐색 시작 디렉토리
        dir: String,
    },

    /// git 명령 실패 또는 출력 해석 실패
    #[error("git error: {reason}")]
    Git {
        /// 실패 사유
        reason: String,
    },

    /// 파일 I/O 에러
    #[error("io error: {path}: {source}")]
    Io {
        /// 관련 파일 경로
        path: String,
        /// 원본 I/O 에러
        source: std::io::Error,
    },
}

impl From<ResolverError> for GobomError {
    fn from(err: ResolverError) -> Self {
        match err {
            ResolverError::ManifestLine { .. } | ResolverError::ReplacementWithoutModule { .. } => {
                GobomError::Resolve(ResolveError::ManifestParse(err.to_string()))
            }
            ResolverError::MissingMainModule => {
                GobomError::Resolve(ResolveError::MissingMainModule)
            }
            ResolverError::ListingParse { .. }
            | ResolverError::VendorManifest { .. }
            | ResolverError::GoMod { .. } => {
                GobomError::Resolve(ResolveError::ListingParse(err.to_string()))
            }
            ResolverError::Tool { .. } => {
                GobomError::Resolve(ResolveError::ToolFailed(err.to_string()))
            }
            ResolverError::VcsNotFound { .. } | ResolverError::Git { .. } => {
                GobomError::Resolve(ResolveError::VcsFailed(err.to_string()))
            }
            ResolverError::Io { source, .. } => GobomError::Io(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_line_error_display() {
        let err = ResolverError::ManifestLine {
            line: 3,
            reason: "expected 2 or 3 columns, got 4".to_owned(),
        };
        let msg = err.to_string();
        assert!(msg.contains("line 3"));
        assert!(msg.contains("expected 2 or 3 columns"));
    }

    #[test]
    fn replacement_without_module_display() {
        let err = ResolverError::ReplacementWithoutModule { line: 7 };
        assert!(
            err.to_string()
                .contains("replacement with no module on previous line")
        );
    }

    #[test]
    fn tool_error_display() {
        let err = ResolverError::Tool {
            command: "go mod graph".to_owned(),
            reason: "exit status 1: go.mod not found".to_owned(),
        };
        let msg = err.to_string();
        assert!(msg.contains("go mod graph"));
        assert!(msg.contains("exit status 1"));
    }

    #[test]
    fn converts_to_gobom_error_manifest() {
        let err = ResolverError::ManifestLine {
            line: 1,
            reason: "bad".to_owned(),
        };
        let top: GobomError = err.into();
        assert!(matches!(
            top,
            GobomError::Resolve(ResolveError::ManifestParse(_))
        ));
    }

    #[test]
    fn converts_to_gobom_error_missing_main() {
        let top: GobomError = ResolverError::MissingMainModule.into();
        assert!(matches!(
            top,
            GobomError::Resolve(ResolveError::MissingMainModule)
        ));
    }

    #[test]
    fn converts_to_gobom_error_vcs() {
        let err = ResolverError::VcsNotFound {
            dir: "/tmp/x".to_owned(),
        };
        let top: GobomError = err.into();
        assert!(matches!(top, GobomError::Resolve(ResolveError::VcsFailed(_))));
    }

    #[test]
    fn converts_to_gobom_error_io() {
        let err = ResolverError::Io {
            path: "vendor/modules.txt".to_owned(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        let top: GobomError = err.into();
        assert!(matches!(top, GobomError::Io(_)));
    }
}
