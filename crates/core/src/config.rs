//! 설정 관리 -- gobom.toml 파싱 및 런타임 설정
//!
//! [`GobomConfig`]는 모든 크레이트의 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`GOBOM_RESOLVE_GO_BINARY=go1.22` 형식)
//! 3. 설정 파일 (`gobom.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```
//! use gobom_core::config::GobomConfig;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = GobomConfig::parse("[resolve]\nwhy_chunk_size = 10").unwrap();
//! assert_eq!(config.resolve.why_chunk_size, 10);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, GobomError};

/// Gobom 통합 설정
///
/// `gobom.toml` 파일의 최상위 구조를 나타냅니다.
/// 각 크레이트는 자기 섹션만 읽어 사용합니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GobomConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 해석 파이프라인 설정
    #[serde(default)]
    pub resolve: ResolveConfig,
    /// SBOM 출력 설정
    #[serde(default)]
    pub sbom: SbomOutputConfig,
}

impl GobomConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, GobomError> {
        let mut config = Self::from_file(path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, GobomError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                GobomError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                GobomError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, GobomError> {
        toml::from_str(toml_str).map_err(|e| {
            GobomError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `GOBOM_{SECTION}_{FIELD}`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "GOBOM_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "GOBOM_GENERAL_LOG_FORMAT");

        // Resolve
        override_string(&mut self.resolve.go_binary, "GOBOM_RESOLVE_GO_BINARY");
        override_string(&mut self.resolve.git_binary, "GOBOM_RESOLVE_GIT_BINARY");
        override_usize(
            &mut self.resolve.why_chunk_size,
            "GOBOM_RESOLVE_WHY_CHUNK_SIZE",
        );
        override_bool(
            &mut self.resolve.include_test_deps,
            "GOBOM_RESOLVE_INCLUDE_TEST_DEPS",
        );
        override_bool(
            &mut self.resolve.detect_local_versions,
            "GOBOM_RESOLVE_DETECT_LOCAL_VERSIONS",
        );

        // SBOM
        override_string(&mut self.sbom.tool_name, "GOBOM_SBOM_TOOL_NAME");
        override_string(&mut self.sbom.namespace_base, "GOBOM_SBOM_NAMESPACE_BASE");
        override_string(
            &mut self.sbom.property_prefix,
            "GOBOM_SBOM_PROPERTY_PREFIX",
        );
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), GobomError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            }
            .into());
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            }
            .into());
        }

        if self.resolve.go_binary.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "resolve.go_binary".to_owned(),
                reason: "must not be empty".to_owned(),
            }
            .into());
        }

        if self.resolve.git_binary.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "resolve.git_binary".to_owned(),
                reason: "must not be empty".to_owned(),
            }
            .into());
        }

        // 배치 크기는 프로세스 인자 길이 한도를 위한 값이므로 상한을 둔다
        if self.resolve.why_chunk_size == 0 || self.resolve.why_chunk_size > MAX_WHY_CHUNK_SIZE {
            return Err(ConfigError::InvalidValue {
                field: "resolve.why_chunk_size".to_owned(),
                reason: format!("must be 1-{MAX_WHY_CHUNK_SIZE}"),
            }
            .into());
        }

        if self.sbom.tool_name.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "sbom.tool_name".to_owned(),
                reason: "must not be empty".to_owned(),
            }
            .into());
        }

        if self.sbom.namespace_base.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "sbom.namespace_base".to_owned(),
                reason: "must not be empty".to_owned(),
            }
            .into());
        }

        Ok(())
    }
}

/// 설정 상한값 상수
const MAX_WHY_CHUNK_SIZE: usize = 100;

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "pretty".to_owned(),
        }
    }
}

/// 해석 파이프라인 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolveConfig {
    /// 모듈/그래프 목록 조회에 사용할 go 바이너리
    pub go_binary: String,
    /// 버전 추론에 사용할 git 바이너리
    pub git_binary: String,
    /// "why" 질의 배치 크기 (프로세스 인자 길이 한도)
    pub why_chunk_size: usize,
    /// 테스트 전용 의존성 포함 여부
    pub include_test_deps: bool,
    /// 로컬 치환 디렉토리의 버전을 VCS에서 추론할지 여부
    pub detect_local_versions: bool,
}

impl Default for ResolveConfig {
    fn default() -> Self {
        Self {
            go_binary: "go".to_owned(),
            git_binary: "git".to_owned(),
            why_chunk_size: 20,
            include_test_deps: false,
            detect_local_versions: true,
        }
    }
}

/// SBOM 출력 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SbomOutputConfig {
    /// 문서 생성 도구 이름 (creators / tools 필드)
    pub tool_name: String,
    /// SPDX 문서 네임스페이스 기본 URL
    pub namespace_base: String,
    /// CycloneDX 속성 키 접두사
    pub property_prefix: String,
}

impl Default for SbomOutputConfig {
    fn default() -> Self {
        Self {
            tool_name: "gobom".to_owned(),
            namespace_base: "https://gobom.dev/spdx".to_owned(),
            property_prefix: "gobom".to_owned(),
        }
    }
}

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(value) = std::env::var(env_key) {
        *target = value;
    }
}

fn override_bool(target: &mut bool, env_key: &str) {
    if let Ok(value) = std::env::var(env_key) {
        match value.to_lowercase().as_str() {
            "true" | "1" | "yes" => *target = true,
            "false" | "0" | "no" => *target = false,
            _ => tracing::warn!(key = env_key, value = %value, "ignoring invalid bool override"),
        }
    }
}

fn override_usize(target: &mut usize, env_key: &str) {
    if let Ok(value) = std::env::var(env_key) {
        match value.parse() {
            Ok(parsed) => *target = parsed,
            Err(_) => {
                tracing::warn!(key = env_key, value = %value, "ignoring invalid usize override");
            }
        }
    }
}
