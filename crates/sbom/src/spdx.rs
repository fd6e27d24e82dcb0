//! SPDX 2.3 JSON SBOM 조립
//!
//! [SPDX](https://spdx.dev/) 2.3 사양에 따른 패키지/관계 스타일 문서를
//! 생성합니다. 모듈당 패키지 하나, 문서->메인 `DESCRIBES` 관계 하나,
//! 그리고 메인 패키지에서 나머지 모든 패키지로의 `DEPENDS_ON` 관계를
//! 평탄화하여 출력합니다 (모듈별 세부 간선은 복제하지 않음).
//!
//! 알 수 없는 라이선스/저작권 필드는 생략하는 대신 명시적 `NOASSERTION`
//! 센티널로 출력합니다.

use metrics::counter;
use serde::Serialize;

use gobom_core::metrics as metric_names;
use gobom_core::types::{Module, ModuleSet};

use crate::error::SbomBuildError;
use crate::types::{SbomDocument, SbomFormat, SbomOptions};
use crate::util;

/// 값을 모르는 필드에 쓰는 명시적 센티널
const NOASSERTION: &str = "NOASSERTION";

/// SPDX 2.3 문서 루트 구조
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SpdxDocument {
    spdx_version: String,
    data_license: String,
    #[serde(rename = "SPDXID")]
    spdx_id: String,
    name: String,
    document_namespace: String,
    creation_info: SpdxCreationInfo,
    packages: Vec<SpdxPackage>,
    relationships: Vec<SpdxRelationship>,
}

/// SPDX 생성 정보
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SpdxCreationInfo {
    created: String,
    creators: Vec<String>,
}

/// SPDX 패키지
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SpdxPackage {
    #[serde(rename = "SPDXID")]
    spdx_id: String,
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    version_info: Option<String>,
    download_location: String,
    files_analyzed: bool,
    license_concluded: String,
    license_declared: String,
    copyright_text: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    external_refs: Vec<SpdxExternalRef>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    checksums: Vec<SpdxChecksum>,
}

/// SPDX 외부 참조
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SpdxExternalRef {
    reference_category: String,
    reference_type: String,
    reference_locator: String,
}

/// SPDX 체크섬
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SpdxChecksum {
    algorithm: String,
    checksum_value: String,
}

/// SPDX 관계
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SpdxRelationship {
    spdx_element_id: String,
    relationship_type: String,
    related_spdx_element: String,
}

/// 해석된 모듈 집합에서 SPDX 2.3 JSON 문서를 생성합니다.
pub fn generate(set: &ModuleSet, options: &SbomOptions) -> Result<SbomDocument, SbomBuildError> {
    let main = set
        .main()
        .ok_or_else(|| SbomBuildError::Assembly("module set has no main module".to_owned()))?;

    // 결정적 출력을 위해 의존 모듈은 경로 순으로 정렬한다
    let mut deps: Vec<&Module> = set.dependencies().collect();
    deps.sort_by(|a, b| a.path.cmp(&b.path));

    let mut packages = Vec::with_capacity(deps.len() + 1);
    packages.push(build_package(main));
    packages.extend(deps.iter().map(|m| build_package(m)));

    let main_id = util::spdx_id_for_path(main.effective_path());
    let mut relationships = vec![SpdxRelationship {
        spdx_element_id: "SPDXRef-DOCUMENT".to_owned(),
        relationship_type: "DESCRIBES".to_owned(),
        related_spdx_element: main_id.clone(),
    }];
    for dep in &deps {
        relationships.push(SpdxRelationship {
            spdx_element_id: main_id.clone(),
            relationship_type: "DEPENDS_ON".to_owned(),
            related_spdx_element: util::spdx_id_for_path(dep.effective_path()),
        });
    }

    let component_count = packages.len();
    let namespace = format!(
        "{}/{}",
        options.namespace_base.trim_end_matches('/'),
        uuid::Uuid::new_v4(),
    );

    let document = SpdxDocument {
        spdx_version: "SPDX-2.3".to_owned(),
        data_license: "CC0-1.0".to_owned(),
        spdx_id: "SPDXRef-DOCUMENT".to_owned(),
        name: format!("{}-{}", options.tool_name, main.effective_path()),
        document_namespace: namespace,
        creation_info: SpdxCreationInfo {
            created: util::current_timestamp(),
            creators: vec![format!(
                "Tool: {}-{}",
                options.tool_name, options.tool_version
            )],
        },
        packages,
        relationships,
    };

    let content = serde_json::to_string_pretty(&document)
        .map_err(|e| SbomBuildError::Serialization(format!("SPDX serialization failed: {e}")))?;

    counter!(metric_names::SBOM_DOCUMENTS_TOTAL).increment(1);
    Ok(SbomDocument {
        format: SbomFormat::Spdx,
        content,
        component_count,
    })
}

/// 모듈 하나를 SPDX 패키지로 변환합니다.
fn build_package(module: &Module) -> SpdxPackage {
    let path = module.effective_path();
    let version = module.effective_version();

    let external_refs = vec![SpdxExternalRef {
        reference_category: "PACKAGE_MANAGER".to_owned(),
        reference_type: "purl".to_owned(),
        reference_locator: util::purl(path, version),
    }];

    // 접두사형 콘텐츠 해시를 가진 모듈만 체크섬 항목을 얻는다
    let checksums = match module.effective_sum() {
        Some(sum) => match util::translate_checksum(sum) {
            Some(digest) => vec![SpdxChecksum {
                algorithm: "SHA256".to_owned(),
                checksum_value: digest,
            }],
            None => {
                tracing::debug!(module = %path, "unrecognized checksum format, omitting entry");
                Vec::new()
            }
        },
        None => Vec::new(),
    };

    SpdxPackage {
        spdx_id: util::spdx_id_for_path(path),
        name: path.to_owned(),
        version_info: (!version.is_empty()).then(|| version.to_owned()),
        download_location: NOASSERTION.to_owned(),
        files_analyzed: false,
        license_concluded: NOASSERTION.to_owned(),
        license_declared: NOASSERTION.to_owned(),
        copyright_text: NOASSERTION.to_owned(),
        external_refs,
        checksums,
    }
}
