//! SBOM 문서 타입 -- 형식, 문서, 조립 옵션

use std::fmt;

use serde::{Deserialize, Serialize};

use gobom_core::config::SbomOutputConfig;

/// SBOM 출력 형식
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SbomFormat {
    /// SPDX 2.3 JSON
    Spdx,
    /// CycloneDX 1.5 JSON
    CycloneDx,
}

impl fmt::Display for SbomFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Spdx => write!(f, "spdx"),
            Self::CycloneDx => write!(f, "cyclonedx"),
        }
    }
}

impl SbomFormat {
    /// 문자열에서 SBOM 형식을 파싱합니다 (대소문자 구분 없음).
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "spdx" => Some(Self::Spdx),
            "cyclonedx" | "cdx" => Some(Self::CycloneDx),
            _ => None,
        }
    }
}

/// SBOM 문서
///
/// 생성된 SBOM의 형식과 내용을 담습니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SbomDocument {
    /// SBOM 형식
    pub format: SbomFormat,
    /// JSON 문자열 내용
    pub content: String,
    /// 포함된 컴포넌트 수
    pub component_count: usize,
}

impl fmt::Display for SbomDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SbomDocument(format={}, components={})",
            self.format, self.component_count,
        )
    }
}

/// 컴파일된 아티팩트의 다이제스트 (소문자 hex)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactDigests {
    /// SHA-256 다이제스트
    pub sha256: String,
    /// SHA-512 다이제스트
    pub sha512: String,
}

/// SBOM 조립 옵션
#[derive(Debug, Clone)]
pub struct SbomOptions {
    /// 문서 생성 도구 이름
    pub tool_name: String,
    /// 문서 생성 도구 버전
    pub tool_version: String,
    /// SPDX 문서 네임스페이스 기본 URL
    pub namespace_base: String,
    /// CycloneDX 속성 키 접두사
    pub property_prefix: String,
}

impl Default for SbomOptions {
    fn default() -> Self {
        Self::from_config(&SbomOutputConfig::default())
    }
}

impl SbomOptions {
    /// 설정 섹션에서 옵션을 생성합니다.
    pub fn from_config(config: &SbomOutputConfig) -> Self {
        Self {
            tool_name: config.tool_name.clone(),
            tool_version: env!("CARGO_PKG_VERSION").to_owned(),
            namespace_base: config.namespace_base.clone(),
            property_prefix: config.property_prefix.clone(),
        }
    }
}
