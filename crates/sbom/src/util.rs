//! SBOM 생성 유틸리티 -- 공유 헬퍼 함수

use std::path::Path;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use sha2::{Digest, Sha256, Sha512};

use crate::error::SbomBuildError;
use crate::types::ArtifactDigests;

/// 모듈 콘텐츠 해시의 접두사 (base64 인코딩된 SHA-256)
const CONTENT_HASH_PREFIX: &str = "h1:";

/// purl 생태계 타입
const PURL_TYPE: &str = "golang";

/// 접두사형 콘텐츠 해시를 소문자 hex SHA-256 다이제스트로 변환합니다.
///
/// 순수 함수입니다. `h1:` 접두사가 아니거나 base64 디코딩 결과가 32바이트가
/// 아니면 `None`을 반환합니다 (SBOM에서 체크섬 항목이 생략됨).
pub fn translate_checksum(sum: &str) -> Option<String> {
    let encoded = sum.strip_prefix(CONTENT_HASH_PREFIX)?;
    let decoded = BASE64.decode(encoded).ok()?;
    if decoded.len() != 32 {
        return None;
    }
    Some(hex::encode(decoded))
}

/// purl(package-URL) 식별자를 생성합니다.
///
/// 예: `pkg:golang/example.com/dep@v0.1.0`. 버전이 비어 있으면 `@` 이후를
/// 생략합니다.
pub fn purl(path: &str, version: &str) -> String {
    if version.is_empty() {
        format!("pkg:{PURL_TYPE}/{path}")
    } else {
        format!("pkg:{PURL_TYPE}/{path}@{version}")
    }
}

/// 모듈 경로에서 SPDX 패키지 식별자를 만듭니다.
///
/// 경로 구분자 `/`는 `.`으로 바꾸고, 식별자에 허용되지 않는 나머지 문자는
/// `-`로 치환합니다.
pub fn spdx_id_for_path(path: &str) -> String {
    let sanitized: String = path
        .chars()
        .map(|c| match c {
            '/' => '.',
            c if c.is_alphanumeric() || c == '.' || c == '-' => c,
            _ => '-',
        })
        .collect();
    format!("SPDXRef-Package-{sanitized}")
}

/// 컴파일된 아티팩트의 다이제스트를 계산합니다.
pub fn artifact_digests(path: &Path) -> Result<ArtifactDigests, SbomBuildError> {
    let bytes = std::fs::read(path).map_err(|e| SbomBuildError::ArtifactDigest {
        path: path.display().to_string(),
        source: e,
    })?;
    Ok(ArtifactDigests {
        sha256: hex::encode(Sha256::digest(&bytes)),
        sha512: hex::encode(Sha512::digest(&bytes)),
    })
}

/// 현재 시각을 RFC3339 형식으로 반환합니다.
///
/// 시스템 시간을 가져올 수 없는 경우 epoch(1970-01-01T00:00:00Z)를 반환합니다.
pub fn current_timestamp() -> String {
    match std::time::SystemTime::now().duration_since(std::time::UNIX_EPOCH) {
        Ok(duration) => gobom_core::version::unix_to_rfc3339(duration.as_secs()),
        Err(_) => "1970-01-01T00:00:00Z".to_owned(),
    }
}
