//! 해석 오케스트레이터 -- 전체 파이프라인 흐름 관리
//!
//! [`Resolver`]는 스펙상의 제어 흐름을 그대로 잇습니다:
//! 매니페스트 또는 모듈 목록 -> 치환 해석 -> 그래프 빌드 -> 모듈 필터.
//! 벤더 모드에서는 모듈 목록/그래프 대신 벤더 매니페스트를 사용합니다.
//!
//! 전 구간이 동기/순차 실행입니다. 외부 프로세스 호출 실패는 전체 해석을
//! 중단시키고, 항목 단위 보강 작업(로컬 치환 버전 추론, 패키지 그룹핑)은
//! 경고만 남기고 계속합니다.

use std::path::{Path, PathBuf};

use metrics::counter;
use tracing::{debug, info, warn};

use gobom_core::config::ResolveConfig;
use gobom_core::metrics as metric_names;
use gobom_core::types::{BuildInfo, ModuleSet};

use crate::error::ResolverError;
use crate::toolchain::{GoCommand, GoToolchain};
use crate::vcs::VersionDetector;
use crate::{filter, graph, listing, manifest, replace, vendor};

/// 모듈 그래프 해석 오케스트레이터
pub struct Resolver {
    /// 해석 설정
    config: ResolveConfig,
    /// 외부 도구 어댑터
    toolchain: Box<dyn GoToolchain>,
    /// 버전 탐지기
    detector: VersionDetector,
}

impl Resolver {
    /// 모듈 디렉토리에서 선택 집합을 로드하고 전체 파이프라인을 실행합니다.
    pub fn resolve_directory(&self, dir: &Path) -> Result<ModuleSet, ResolverError> {
        let listing_output = self.toolchain.module_list(dir)?;
        let mut set = listing::parse_module_list(&listing_output)?;
        info!(modules = set.len(), "loaded selected module set");

        // 패키지 그룹핑은 보강 정보이므로 실패해도 해석을 막지 않는다
        match self.toolchain.package_list(dir) {
            Ok(output) => match listing::parse_package_list(&output) {
                Ok(packages) => {
                    debug!(packages = packages.len(), "grouping packages under modules");
                    set.attach_packages(packages);
                }
                Err(e) => warn!(error = %e, "failed to parse package listing"),
            },
            Err(e) => warn!(error = %e, "failed to list packages"),
        }

        let main_root = set
            .main()
            .and_then(|m| m.dir.clone())
            .map(PathBuf::from)
            .unwrap_or_else(|| dir.to_path_buf());
        self.resolve_replacements(&mut set, &main_root);

        let graph_output = self.toolchain.module_graph(dir)?;
        graph::build(&mut set, &graph::parse_edges(&graph_output));

        let before = set.len();
        filter::filter_modules(
            &mut set,
            self.toolchain.as_ref(),
            dir,
            self.config.why_chunk_size,
            self.config.include_test_deps,
        )?;

        counter!(metric_names::RESOLVER_MODULES_DROPPED_TOTAL)
            .increment((before - set.len()) as u64);
        counter!(metric_names::RESOLVER_MODULES_TOTAL).increment(set.len() as u64);
        counter!(metric_names::RESOLVER_RUNS_TOTAL).increment(1);
        info!(modules = set.len(), dropped = before - set.len(), "resolution complete");
        Ok(set)
    }

    /// 컴파일된 바이너리의 내장 매니페스트에서 해석을 시작합니다.
    ///
    /// `dir`이 주어지면 해당 모듈 디렉토리에서 그래프 빌드와 필터까지
    /// 수행합니다. 없으면 간선 목록이 존재하지 않으므로 메인 모듈의
    /// 의존성 목록은 매니페스트의 의존 목록을 평탄화한 것이 됩니다.
    pub fn resolve_binary(
        &self,
        binary: &Path,
        dir: Option<&Path>,
    ) -> Result<(BuildInfo, ModuleSet), ResolverError> {
        let blob = self.toolchain.binary_manifest(binary)?;
        let info = manifest::parse_build_info(&blob)?;
        let mut set = info.to_module_set();
        info!(modules = set.len(), main = %info.main.path, "loaded embedded build manifest");

        let main_root = match dir {
            Some(dir) => dir.to_path_buf(),
            None => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        };
        self.resolve_replacements(&mut set, &main_root);

        if let Some(dir) = dir {
            let graph_output = self.toolchain.module_graph(dir)?;
            graph::build(&mut set, &graph::parse_edges(&graph_output));
            filter::filter_modules(
                &mut set,
                self.toolchain.as_ref(),
                dir,
                self.config.why_chunk_size,
                self.config.include_test_deps,
            )?;
        } else {
            // 간선 목록이 없으면 매니페스트 의존 목록 전체가 메인의 간선이 된다
            let mut direct: Vec<String> =
                set.dependencies().map(|m| m.path.clone()).collect();
            direct.sort_unstable();
            if let Some(index) = set.main_index() {
                set.modules[index].dependencies = direct;
            }
        }

        counter!(metric_names::RESOLVER_MODULES_TOTAL).increment(set.len() as u64);
        counter!(metric_names::RESOLVER_RUNS_TOTAL).increment(1);
        Ok((info, set))
    }

    /// 벤더링된 소스 트리에서 모듈 집합을 로드합니다.
    ///
    /// 메인 모듈은 벤더 매니페스트에 없으므로 별도로 로드해 추가합니다.
    /// 벤더 매니페스트는 간선 목록을 제공하지 않으므로 의존성 목록은
    /// 비어 있습니다.
    pub fn resolve_vendor(&self, dir: &Path) -> Result<ModuleSet, ResolverError> {
        let manifest_path = dir.join("vendor").join("modules.txt");
        let content = std::fs::read_to_string(&manifest_path).map_err(|e| ResolverError::Io {
            path: manifest_path.display().to_string(),
            source: e,
        })?;
        let modules = vendor::parse_vendor_manifest(&content);
        info!(modules = modules.len(), "loaded vendor manifest");

        let main_output = self.toolchain.main_module(dir)?;
        let main = listing::parse_main_module(&main_output)?;

        let mut set = ModuleSet::new();
        set.insert(main);
        for module in modules {
            if !set.insert(module) {
                debug!("duplicate module path in vendor manifest, keeping first occurrence");
            }
        }
        self.resolve_replacements(&mut set, dir);

        counter!(metric_names::RESOLVER_MODULES_TOTAL).increment(set.len() as u64);
        counter!(metric_names::RESOLVER_RUNS_TOTAL).increment(1);
        Ok(set)
    }

    /// 로컬 치환을 해석하고 해석된 개수를 계수합니다.
    fn resolve_replacements(&self, set: &mut ModuleSet, main_root: &Path) {
        replace::resolve_local_replacements(
            set,
            main_root,
            &self.detector,
            self.config.detect_local_versions,
        );
        let resolved = set
            .modules
            .iter()
            .filter_map(|m| m.replace.as_ref())
            .filter(|r| r.is_local() && !r.path().is_empty())
            .count();
        counter!(metric_names::RESOLVER_LOCAL_REPLACEMENTS_TOTAL).increment(resolved as u64);
    }
}

/// [`Resolver`] 빌더
///
/// 툴체인을 지정하지 않으면 설정된 go 바이너리를 호출하는 기본 구현을
/// 사용합니다. 테스트에서는 가짜 툴체인을 주입합니다.
#[derive(Default)]
pub struct ResolverBuilder {
    config: ResolveConfig,
    toolchain: Option<Box<dyn GoToolchain>>,
}

impl ResolverBuilder {
    /// 기본값을 가진 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 해석 설정을 지정합니다.
    pub fn config(mut self, config: ResolveConfig) -> Self {
        self.config = config;
        self
    }

    /// 외부 도구 어댑터를 교체합니다.
    pub fn toolchain(mut self, toolchain: Box<dyn GoToolchain>) -> Self {
        self.toolchain = Some(toolchain);
        self
    }

    /// 해석기를 빌드합니다.
    pub fn build(self) -> Resolver {
        let toolchain = self
            .toolchain
            .unwrap_or_else(|| Box::new(GoCommand::new(&self.config.go_binary)));
        let detector = VersionDetector::new(&self.config.git_binary);
        Resolver {
            config: self.config,
            toolchain,
            detector,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 준비된 출력 문자열을 돌려주는 가짜 툴체인
    struct FakeToolchain {
        manifest: String,
        modules: String,
        packages: String,
        graph: String,
    }

    impl Default for FakeToolchain {
        fn default() -> Self {
            Self {
                manifest: String::new(),
                modules: String::new(),
                packages: String::new(),
                graph: String::new(),
            }
        }
    }

    impl GoToolchain for FakeToolchain {
        fn binary_manifest(&self, _: &Path) -> Result<String, ResolverError> {
            Ok(self.manifest.clone())
        }
        fn main_module(&self, _: &Path) -> Result<String, ResolverError> {
            Ok(r#"{"Path": "example.com/app", "Main": true}"#.to_owned())
        }
        fn module_list(&self, _: &Path) -> Result<String, ResolverError> {
            Ok(self.modules.clone())
        }
        fn package_list(&self, _: &Path) -> Result<String, ResolverError> {
            Ok(self.packages.clone())
        }
        fn module_graph(&self, _: &Path) -> Result<String, ResolverError> {
            Ok(self.graph.clone())
        }
        fn module_why(&self, _: &Path, paths: &[String]) -> Result<String, ResolverError> {
            let mut output = String::new();
            for path in paths {
                output.push_str(&format!("# {path}\nexample.com/app\n{path}/pkg\n\n"));
            }
            Ok(output)
        }
    }

    fn build_resolver(toolchain: FakeToolchain) -> Resolver {
        ResolverBuilder::new()
            .config(ResolveConfig {
                detect_local_versions: false,
                ..ResolveConfig::default()
            })
            .toolchain(Box::new(toolchain))
            .build()
    }

    #[test]
    fn resolve_directory_runs_full_pipeline() {
        let toolchain = FakeToolchain {
            modules: r#"
{"Path": "example.com/app", "Main": true}
{"Path": "example.com/dep", "Version": "v0.1.0", "Sum": "h1:abc="}
"#
            .to_owned(),
            graph: "example.com/app example.com/dep@v0.1.0\n".to_owned(),
            ..FakeToolchain::default()
        };

        let resolver = build_resolver(toolchain);
        let set = resolver.resolve_directory(Path::new(".")).unwrap();

        assert_eq!(set.len(), 2);
        assert_eq!(
            set.main().unwrap().dependencies,
            vec!["example.com/dep"]
        );
    }

    #[test]
    fn resolve_directory_groups_packages() {
        let toolchain = FakeToolchain {
            modules: r#"{"Path": "example.com/app", "Main": true}"#.to_owned(),
            packages: r#"
{"ImportPath": "example.com/app/cmd", "Module": {"Path": "example.com/app"}, "GoFiles": ["main.go"]}
"#
            .to_owned(),
            ..FakeToolchain::default()
        };

        let resolver = build_resolver(toolchain);
        let set = resolver.resolve_directory(Path::new(".")).unwrap();
        assert_eq!(set.main().unwrap().packages.len(), 1);
    }

    #[test]
    fn resolve_binary_without_dir_flattens_deps() {
        let toolchain = FakeToolchain {
            manifest: "path\texample.com/app/cmd\n\
                       mod\texample.com/app\tv1.0.0\n\
                       dep\texample.com/zeta\tv0.2.0\th1:z=\n\
                       dep\texample.com/alpha\tv0.1.0\th1:a=\n\
                       build\tGOOS=linux\n"
                .to_owned(),
            ..FakeToolchain::default()
        };

        let resolver = build_resolver(toolchain);
        let (info, set) = resolver
            .resolve_binary(Path::new("/bin/app"), None)
            .unwrap();

        assert_eq!(info.path, "example.com/app/cmd");
        assert_eq!(info.setting("GOOS"), Some("linux"));
        assert_eq!(set.len(), 3);
        // 간선 목록이 없으므로 평탄화 + 정렬
        assert_eq!(
            set.main().unwrap().dependencies,
            vec!["example.com/alpha", "example.com/zeta"]
        );
    }

    #[test]
    fn resolve_vendor_appends_main_module() {
        let tmp = tempfile::tempdir().unwrap();
        let vendor_dir = tmp.path().join("vendor");
        std::fs::create_dir_all(&vendor_dir).unwrap();
        std::fs::write(
            vendor_dir.join("modules.txt"),
            "# example.com/dep v0.1.0\n## explicit; go 1.22\nexample.com/dep/pkg\n",
        )
        .unwrap();

        let resolver = build_resolver(FakeToolchain::default());
        let set = resolver.resolve_vendor(tmp.path()).unwrap();

        assert_eq!(set.len(), 2);
        assert_eq!(set.main().unwrap().path, "example.com/app");
        assert!(set.find("example.com/dep").unwrap().vendored);
    }

    #[test]
    fn resolve_vendor_without_manifest_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let resolver = build_resolver(FakeToolchain::default());
        let err = resolver.resolve_vendor(tmp.path()).unwrap_err();
        assert!(matches!(err, ResolverError::Io { .. }));
    }

    #[test]
    fn resolve_directory_propagates_listing_failure() {
        struct FailingToolchain;
        impl GoToolchain for FailingToolchain {
            fn binary_manifest(&self, _: &Path) -> Result<String, ResolverError> {
                unreachable!()
            }
            fn main_module(&self, _: &Path) -> Result<String, ResolverError> {
                unreachable!()
            }
            fn module_list(&self, _: &Path) -> Result<String, ResolverError> {
                Err(ResolverError::Tool {
                    command: "go list -m -json all".to_owned(),
                    reason: "exit status 1".to_owned(),
                })
            }
            fn package_list(&self, _: &Path) -> Result<String, ResolverError> {
                unreachable!()
            }
            fn module_graph(&self, _: &Path) -> Result<String, ResolverError> {
                unreachable!()
            }
            fn module_why(&self, _: &Path, _: &[String]) -> Result<String, ResolverError> {
                unreachable!()
            }
        }

        let resolver = ResolverBuilder::new()
            .toolchain(Box::new(FailingToolchain))
            .build();
        let err = resolver.resolve_directory(Path::new(".")).unwrap_err();
        assert!(matches!(err, ResolverError::Tool { .. }));
    }
}
