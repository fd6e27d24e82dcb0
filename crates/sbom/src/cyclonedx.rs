//! CycloneDX 1.5 JSON SBOM 조립
//!
//! [CycloneDX](https://cyclonedx.org/) 1.5 사양에 따른 컴포넌트/의존성
//! 그래프 스타일 문서를 생성합니다. 메인 모듈은 `application`, 나머지는
//! `library` 컴포넌트가 되며, 의존성 섹션은 그래프 빌더가 만든 모듈별
//! 간선을 그대로 반영합니다.
//!
//! 컴포지션 선언은 메인 컴포넌트의 의존성 집합을 `complete`로, 의존
//! 모듈 간 관계를 `unknown`으로 표시합니다. 메타데이터 속성에는 컴파일된
//! 아티팩트의 다이제스트와 빌드 설정에서 파생된 값들이 들어갑니다.

use std::collections::HashMap;

use metrics::counter;
use serde::Serialize;

use gobom_core::metrics as metric_names;
use gobom_core::types::{BuildInfo, Module, ModuleSet};
use gobom_core::version::pseudo_version_with_timestamp;

use crate::error::SbomBuildError;
use crate::types::{ArtifactDigests, SbomDocument, SbomFormat, SbomOptions};
use crate::util;

/// 생태계의 개발 빌드 버전 센티널
const DEVEL_VERSION: &str = "(devel)";

/// CycloneDX 1.5 BOM 루트 구조
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CycloneDxBom {
    bom_format: String,
    spec_version: String,
    version: u32,
    metadata: CycloneDxMetadata,
    components: Vec<CycloneDxComponent>,
    dependencies: Vec<CycloneDxDependency>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    compositions: Vec<CycloneDxComposition>,
}

/// CycloneDX 메타데이터
#[derive(Serialize)]
struct CycloneDxMetadata {
    timestamp: String,
    tools: Vec<CycloneDxTool>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    properties: Vec<CycloneDxProperty>,
}

/// CycloneDX 도구 정보
#[derive(Serialize)]
struct CycloneDxTool {
    name: String,
    version: String,
}

/// CycloneDX 속성 (키/값)
#[derive(Serialize)]
struct CycloneDxProperty {
    name: String,
    value: String,
}

/// CycloneDX 컴포넌트
#[derive(Serialize)]
struct CycloneDxComponent {
    #[serde(rename = "type")]
    component_type: String,
    name: String,
    version: String,
    #[serde(rename = "bom-ref")]
    bom_ref: String,
    purl: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    hashes: Vec<CycloneDxHash>,
}

/// CycloneDX 해시 정보
#[derive(Serialize)]
struct CycloneDxHash {
    alg: String,
    content: String,
}

/// CycloneDX 의존성 항목 (ref -> dependsOn refs)
#[derive(Serialize)]
struct CycloneDxDependency {
    #[serde(rename = "ref")]
    reference: String,
    #[serde(rename = "dependsOn")]
    depends_on: Vec<String>,
}

/// CycloneDX 컴포지션 선언
#[derive(Serialize)]
struct CycloneDxComposition {
    aggregate: String,
    dependencies: Vec<String>,
}

/// 해석된 모듈 집합에서 CycloneDX 1.5 JSON 문서를 생성합니다.
///
/// `build`가 있으면 빌드 설정에서 파생된 메타데이터 속성을 추가하고,
/// 메인 버전이 개발 빌드 센티널이면 VCS 설정으로 의사 버전을 합성해
/// 대체합니다. `artifact`가 있으면 아티팩트 다이제스트 속성을 추가합니다.
pub fn generate(
    set: &ModuleSet,
    build: Option<&BuildInfo>,
    artifact: Option<&ArtifactDigests>,
    options: &SbomOptions,
) -> Result<SbomDocument, SbomBuildError> {
    let main = set
        .main()
        .ok_or_else(|| SbomBuildError::Assembly("module set has no main module".to_owned()))?;

    let mut deps: Vec<&Module> = set.dependencies().collect();
    deps.sort_by(|a, b| a.path.cmp(&b.path));

    let main_version = resolve_main_version(main, build);
    let main_ref = util::purl(main.effective_path(), &main_version);
    let dep_refs: Vec<String> = deps
        .iter()
        .map(|d| util::purl(d.effective_path(), d.effective_version()))
        .collect();

    // 의존성 섹션에서 공유하는 참조 맵 (집합 키 -> bom-ref)
    let mut refs: HashMap<&str, &str> = HashMap::new();
    refs.insert(main.path.as_str(), main_ref.as_str());
    for (dep, dep_ref) in deps.iter().zip(&dep_refs) {
        refs.insert(dep.path.as_str(), dep_ref.as_str());
    }

    let mut components = Vec::with_capacity(deps.len() + 1);
    components.push(build_component(main, "application", &main_ref));
    for (dep, dep_ref) in deps.iter().zip(&dep_refs) {
        components.push(build_component(dep, "library", dep_ref));
    }

    // 그래프 빌더가 만든 모듈별 간선을 그대로 반영한다
    let mut dependencies = Vec::with_capacity(deps.len() + 1);
    dependencies.push(dependency_entry(main, &main_ref, &refs));
    for (dep, dep_ref) in deps.iter().zip(&dep_refs) {
        dependencies.push(dependency_entry(dep, dep_ref, &refs));
    }

    let mut compositions = vec![CycloneDxComposition {
        aggregate: "complete".to_owned(),
        dependencies: vec![main_ref.clone()],
    }];
    if !deps.is_empty() {
        compositions.push(CycloneDxComposition {
            aggregate: "unknown".to_owned(),
            dependencies: dep_refs.clone(),
        });
    }

    let component_count = components.len();
    let bom = CycloneDxBom {
        bom_format: "CycloneDX".to_owned(),
        spec_version: "1.5".to_owned(),
        version: 1,
        metadata: CycloneDxMetadata {
            timestamp: util::current_timestamp(),
            tools: vec![CycloneDxTool {
                name: options.tool_name.clone(),
                version: options.tool_version.clone(),
            }],
            properties: build_properties(build, artifact, &options.property_prefix),
        },
        components,
        dependencies,
        compositions,
    };

    let content = serde_json::to_string_pretty(&bom).map_err(|e| {
        SbomBuildError::Serialization(format!("CycloneDX serialization failed: {e}"))
    })?;

    counter!(metric_names::SBOM_DOCUMENTS_TOTAL).increment(1);
    Ok(SbomDocument {
        format: SbomFormat::CycloneDx,
        content,
        component_count,
    })
}

/// 메인 컴포넌트의 버전을 결정합니다.
///
/// 보고된 버전이 개발 빌드 센티널이고 VCS 설정(리비전/시각)이 있으면
/// 리비전 12자리와 커밋 시각으로 의사 버전을 합성합니다.
fn resolve_main_version(main: &Module, build: Option<&BuildInfo>) -> String {
    let reported = main.effective_version();
    if reported != DEVEL_VERSION {
        return reported.to_owned();
    }
    let Some(build) = build else {
        return reported.to_owned();
    };
    let (Some(revision), Some(time)) = (build.setting("vcs.revision"), build.setting("vcs.time"))
    else {
        return reported.to_owned();
    };

    let rev: String = revision.chars().take(12).collect();
    let timestamp: String = time.chars().filter(char::is_ascii_digit).take(14).collect();
    if rev.is_empty() || timestamp.len() != 14 {
        return reported.to_owned();
    }
    pseudo_version_with_timestamp("v0", "", &timestamp, &rev)
}

/// 모듈 하나를 CycloneDX 컴포넌트로 변환합니다.
fn build_component(module: &Module, component_type: &str, bom_ref: &str) -> CycloneDxComponent {
    let hashes = match module.effective_sum() {
        Some(sum) => match util::translate_checksum(sum) {
            Some(digest) => vec![CycloneDxHash {
                alg: "SHA-256".to_owned(),
                content: digest,
            }],
            None => {
                tracing::debug!(module = %module.path, "unrecognized checksum format, omitting hash");
                Vec::new()
            }
        },
        None => Vec::new(),
    };

    // bom-ref(purl)에 이미 대체된 메인 버전이 들어 있으므로 그대로 따른다
    let version = bom_ref
        .rsplit_once('@')
        .map(|(_, v)| v.to_owned())
        .unwrap_or_else(|| module.effective_version().to_owned());

    CycloneDxComponent {
        component_type: component_type.to_owned(),
        name: module.effective_path().to_owned(),
        version,
        bom_ref: bom_ref.to_owned(),
        purl: bom_ref.to_owned(),
        hashes,
    }
}

/// 모듈의 간선을 의존성 섹션 항목으로 변환합니다.
///
/// 필터 단계에서 제거된 모듈을 가리키는 간선은 참조 맵에 없으므로
/// 조용히 걸러집니다.
fn dependency_entry(
    module: &Module,
    own_ref: &str,
    refs: &HashMap<&str, &str>,
) -> CycloneDxDependency {
    let depends_on = module
        .dependencies
        .iter()
        .filter_map(|path| refs.get(path.as_str()).map(|r| (*r).to_owned()))
        .collect();
    CycloneDxDependency {
        reference: own_ref.to_owned(),
        depends_on,
    }
}

/// 메타데이터 속성을 조립합니다.
fn build_properties(
    build: Option<&BuildInfo>,
    artifact: Option<&ArtifactDigests>,
    prefix: &str,
) -> Vec<CycloneDxProperty> {
    let mut properties = Vec::new();

    if let Some(digests) = artifact {
        properties.push(property(prefix, "binary:sha256", &digests.sha256));
        properties.push(property(prefix, "binary:sha512", &digests.sha512));
    }

    let Some(build) = build else {
        return properties;
    };

    // 대상 OS/아키텍처/컴파일러와 VCS 리비전/시각/변경 여부
    const SETTING_KEYS: [&str; 6] = [
        "GOOS",
        "GOARCH",
        "-compiler",
        "vcs.revision",
        "vcs.time",
        "vcs.modified",
    ];
    for key in SETTING_KEYS {
        if let Some(value) = build.setting(key) {
            let name = format!("build:{}", key.trim_start_matches('-'));
            properties.push(property(prefix, &name, value));
        }
    }

    // 빌드 태그는 태그당 속성 하나
    if let Some(tags) = build.setting("-tags") {
        for tag in tags.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            properties.push(property(prefix, "build:tag", tag));
        }
    }

    properties
}

fn property(prefix: &str, name: &str, value: &str) -> CycloneDxProperty {
    CycloneDxProperty {
        name: format!("{prefix}:{name}"),
        value: value.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_SUM: &str = "h1:MDEyMzQ1Njc4OWFiY2RlZjAxMjM0NTY3ODlhYmNkZWY=";

    fn sample_set() -> ModuleSet {
        let mut set = ModuleSet::new();
        let mut main = Module::new("example.com/app", "v1.0.0");
        main.main = true;
        main.dependencies = vec!["example.com/dep".to_owned()];
        set.insert(main);

        let mut dep = Module::new("example.com/dep", "v0.1.0");
        dep.sum = Some(SAMPLE_SUM.to_owned());
        dep.dependencies = vec!["example.com/leaf".to_owned()];
        set.insert(dep);

        set.insert(Module::new("example.com/leaf", "v0.0.1"));
        set
    }

    fn parse(doc: &SbomDocument) -> serde_json::Value {
        serde_json::from_str(&doc.content).unwrap()
    }

    #[test]
    fn main_is_application_others_are_libraries() {
        let doc = generate(&sample_set(), None, None, &SbomOptions::default()).unwrap();
        assert_eq!(doc.component_count, 3);

        let parsed = parse(&doc);
        let components = parsed["components"].as_array().unwrap();
        assert_eq!(components[0]["type"], "application");
        assert_eq!(components[0]["name"], "example.com/app");
        assert!(
            components[1..]
                .iter()
                .all(|c| c["type"] == "library")
        );
    }

    #[test]
    fn dependency_section_mirrors_graph_edges() {
        let doc = generate(&sample_set(), None, None, &SbomOptions::default()).unwrap();
        let parsed = parse(&doc);
        let dependencies = parsed["dependencies"].as_array().unwrap();
        assert_eq!(dependencies.len(), 3);

        let main_entry = dependencies
            .iter()
            .find(|d| d["ref"] == "pkg:golang/example.com/app@v1.0.0")
            .unwrap();
        assert_eq!(
            main_entry["dependsOn"],
            serde_json::json!(["pkg:golang/example.com/dep@v0.1.0"])
        );

        let dep_entry = dependencies
            .iter()
            .find(|d| d["ref"] == "pkg:golang/example.com/dep@v0.1.0")
            .unwrap();
        assert_eq!(
            dep_entry["dependsOn"],
            serde_json::json!(["pkg:golang/example.com/leaf@v0.0.1"])
        );
    }

    #[test]
    fn compositions_declare_complete_and_unknown() {
        let doc = generate(&sample_set(), None, None, &SbomOptions::default()).unwrap();
        let parsed = parse(&doc);
        let compositions = parsed["compositions"].as_array().unwrap();
        assert_eq!(compositions.len(), 2);
        assert_eq!(compositions[0]["aggregate"], "complete");
        assert_eq!(
            compositions[0]["dependencies"],
            serde_json::json!(["pkg:golang/example.com/app@v1.0.0"])
        );
        assert_eq!(compositions[1]["aggregate"], "unknown");
        assert_eq!(compositions[1]["dependencies"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn component_hashes_from_translated_checksum() {
        let doc = generate(&sample_set(), None, None, &SbomOptions::default()).unwrap();
        let parsed = parse(&doc);
        let components = parsed["components"].as_array().unwrap();
        let dep = components
            .iter()
            .find(|c| c["name"] == "example.com/dep")
            .unwrap();
        assert_eq!(dep["hashes"][0]["alg"], "SHA-256");
        assert_eq!(dep["hashes"][0]["content"].as_str().unwrap().len(), 64);
        // 체크섬 없는 컴포넌트는 hashes 필드 자체가 없다
        let leaf = components
            .iter()
            .find(|c| c["name"] == "example.com/leaf")
            .unwrap();
        assert!(leaf.get("hashes").is_none());
    }

    #[test]
    fn devel_version_is_substituted_from_vcs_settings() {
        let mut set = ModuleSet::new();
        let mut main = Module::new("example.com/app", DEVEL_VERSION);
        main.main = true;
        set.insert(main);

        let build = BuildInfo {
            path: "example.com/app".to_owned(),
            main: Module::new("example.com/app", DEVEL_VERSION),
            deps: vec![],
            settings: vec![
                (
                    "vcs.revision".to_owned(),
                    "abcdef123456789000000000000000000000dead".to_owned(),
                ),
                ("vcs.time".to_owned(), "2023-04-01T12:00:00Z".to_owned()),
            ],
        };

        let doc = generate(&set, Some(&build), None, &SbomOptions::default()).unwrap();
        let parsed = parse(&doc);
        assert_eq!(
            parsed["components"][0]["version"],
            "v0.0.0-20230401120000-abcdef123456"
        );
        assert_eq!(
            parsed["components"][0]["purl"],
            "pkg:golang/example.com/app@v0.0.0-20230401120000-abcdef123456"
        );
    }

    #[test]
    fn devel_version_without_vcs_settings_is_kept() {
        let mut set = ModuleSet::new();
        let mut main = Module::new("example.com/app", DEVEL_VERSION);
        main.main = true;
        set.insert(main);

        let build = BuildInfo {
            path: "example.com/app".to_owned(),
            main: Module::new("example.com/app", DEVEL_VERSION),
            deps: vec![],
            settings: vec![],
        };

        let doc = generate(&set, Some(&build), None, &SbomOptions::default()).unwrap();
        let parsed = parse(&doc);
        assert_eq!(parsed["components"][0]["version"], DEVEL_VERSION);
    }

    #[test]
    fn build_settings_become_properties() {
        let set = sample_set();
        let build = BuildInfo {
            path: "example.com/app".to_owned(),
            main: Module::new("example.com/app", "v1.0.0"),
            deps: vec![],
            settings: vec![
                ("GOOS".to_owned(), "linux".to_owned()),
                ("GOARCH".to_owned(), "arm64".to_owned()),
                ("-compiler".to_owned(), "gc".to_owned()),
                ("vcs.modified".to_owned(), "true".to_owned()),
                ("-tags".to_owned(), "netgo,osusergo".to_owned()),
            ],
        };

        let doc = generate(&set, Some(&build), None, &SbomOptions::default()).unwrap();
        let parsed = parse(&doc);
        let properties = parsed["metadata"]["properties"].as_array().unwrap();

        let find = |name: &str| -> Vec<&serde_json::Value> {
            properties.iter().filter(|p| p["name"] == name).collect()
        };
        assert_eq!(find("gobom:build:GOOS")[0]["value"], "linux");
        assert_eq!(find("gobom:build:GOARCH")[0]["value"], "arm64");
        assert_eq!(find("gobom:build:compiler")[0]["value"], "gc");
        assert_eq!(find("gobom:build:vcs.modified")[0]["value"], "true");
        // 태그당 속성 하나
        let tags = find("gobom:build:tag");
        assert_eq!(tags.len(), 2);
        assert_eq!(tags[0]["value"], "netgo");
        assert_eq!(tags[1]["value"], "osusergo");
    }

    #[test]
    fn artifact_digests_become_properties() {
        let digests = ArtifactDigests {
            sha256: "aa".repeat(32),
            sha512: "bb".repeat(64),
        };
        let doc = generate(&sample_set(), None, Some(&digests), &SbomOptions::default()).unwrap();
        let parsed = parse(&doc);
        let properties = parsed["metadata"]["properties"].as_array().unwrap();
        assert!(
            properties
                .iter()
                .any(|p| p["name"] == "gobom:binary:sha256" && p["value"] == "aa".repeat(32))
        );
        assert!(properties.iter().any(|p| p["name"] == "gobom:binary:sha512"));
    }

    #[test]
    fn document_header_fields() {
        let doc = generate(&sample_set(), None, None, &SbomOptions::default()).unwrap();
        let parsed = parse(&doc);
        assert_eq!(parsed["bomFormat"], "CycloneDX");
        assert_eq!(parsed["specVersion"], "1.5");
        assert_eq!(parsed["metadata"]["tools"][0]["name"], "gobom");
    }

    #[test]
    fn missing_main_module_is_assembly_error() {
        let mut set = ModuleSet::new();
        set.insert(Module::new("example.com/dep", "v0.1.0"));
        let err = generate(&set, None, None, &SbomOptions::default()).unwrap_err();
        assert!(matches!(err, SbomBuildError::Assembly(_)));
    }
}
