//! Integration tests for the resolution pipeline
//!
//! Tests the full flow: module listing / embedded manifest -> local
//! replacement resolution (against real git repositories) -> graph build ->
//! module filter.

use std::path::Path;
use std::process::Command;

use gobom_core::config::ResolveConfig;
use gobom_core::types::Replacement;
use gobom_resolver::{GoToolchain, ResolverBuilder, ResolverError, VersionDetector};

/// Run a git command inside a fixture repository with pinned commit dates.
fn run_git(dir: &Path, args: &[&str]) {
    let output = Command::new("git")
        .arg("-C")
        .arg(dir)
        .args(args)
        .env("GIT_AUTHOR_DATE", "2023-04-01T12:00:00Z")
        .env("GIT_COMMITTER_DATE", "2023-04-01T12:00:00Z")
        .output()
        .expect("git command should run");
    assert!(
        output.status.success(),
        "git {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

/// Create a git-backed module directory with a go.mod file.
fn init_module_repo(dir: &Path, module_path: &str) {
    std::fs::create_dir_all(dir).expect("create module dir");
    std::fs::write(dir.join("go.mod"), format!("module {module_path}\n\ngo 1.22\n"))
        .expect("write go.mod");
    run_git(dir, &["init", "-q"]);
    run_git(dir, &["config", "user.email", "test@example.com"]);
    run_git(dir, &["config", "user.name", "Test"]);
    run_git(dir, &["config", "commit.gpgsign", "false"]);
    run_git(dir, &["add", "."]);
    run_git(dir, &["commit", "-q", "-m", "initial"]);
}

/// A fake toolchain serving a small but complete module universe.
struct FakeToolchain {
    modules: String,
    graph: String,
    /// Modules the "why" facility reports as unneeded.
    unused: Vec<&'static str>,
    /// Modules imported only by test binaries.
    test_only: Vec<&'static str>,
}

impl Default for FakeToolchain {
    fn default() -> Self {
        Self {
            modules: String::new(),
            graph: String::new(),
            unused: Vec::new(),
            test_only: Vec::new(),
        }
    }
}

impl GoToolchain for FakeToolchain {
    fn binary_manifest(&self, _: &Path) -> Result<String, ResolverError> {
        Ok("path\texample.com/app/cmd\n\
            mod\texample.com/app\tv1.0.0\n\
            dep\texample.com/dep\tv0.1.0\th1:abcdef=\n\
            build\tGOOS=linux\n"
            .to_owned())
    }
    fn main_module(&self, _: &Path) -> Result<String, ResolverError> {
        Ok(r#"{"Path": "example.com/app", "Main": true}"#.to_owned())
    }
    fn module_list(&self, _: &Path) -> Result<String, ResolverError> {
        Ok(self.modules.clone())
    }
    fn package_list(&self, _: &Path) -> Result<String, ResolverError> {
        Ok(String::new())
    }
    fn module_graph(&self, _: &Path) -> Result<String, ResolverError> {
        Ok(self.graph.clone())
    }
    fn module_why(&self, _: &Path, paths: &[String]) -> Result<String, ResolverError> {
        let mut output = String::new();
        for path in paths {
            output.push_str(&format!("# {path}\n"));
            if self.unused.iter().any(|u| *u == path.as_str()) {
                output.push_str(&format!("(main module does not need module {path})\n"));
            } else if self.test_only.iter().any(|t| *t == path.as_str()) {
                output.push_str(&format!("{path}.test\n"));
            } else {
                output.push_str("example.com/app\n");
                output.push_str(&format!("{path}/pkg\n"));
            }
            output.push('\n');
        }
        Ok(output)
    }
}

fn resolver_with(toolchain: FakeToolchain, detect_versions: bool) -> gobom_resolver::Resolver {
    ResolverBuilder::new()
        .config(ResolveConfig {
            detect_local_versions: detect_versions,
            ..ResolveConfig::default()
        })
        .toolchain(Box::new(toolchain))
        .build()
}

#[test]
fn full_pipeline_filters_and_links() {
    let toolchain = FakeToolchain {
        modules: r#"
{"Path": "example.com/app", "Main": true}
{"Path": "example.com/dep", "Version": "v0.1.0", "Sum": "h1:abc="}
{"Path": "example.com/unused", "Version": "v0.2.0"}
{"Path": "example.com/testdep", "Version": "v0.3.0"}
{"Path": "example.com/hidden", "Version": "v0.4.0", "Indirect": true}
"#
        .to_owned(),
        graph: "example.com/app example.com/dep@v0.1.0\n\
                example.com/app example.com/hidden@v0.4.0\n\
                example.com/dep@v0.1.0 example.com/hidden@v0.4.0\n\
                example.com/dep@v0.1.0 example.com/pruned@v9.9.9\n"
            .to_owned(),
        unused: vec!["example.com/unused", "example.com/hidden"],
        test_only: vec!["example.com/testdep"],
    };

    let set = resolver_with(toolchain, false)
        .resolve_directory(Path::new("."))
        .unwrap();

    // unused / test-only / hidden은 제거되고 main + dep만 남는다
    assert_eq!(set.len(), 2);
    assert!(set.find("example.com/unused").is_none());
    assert!(set.find("example.com/testdep").is_none());

    // 메인의 간접 의존성 간선과 잘려 나간 간선은 버려진다
    assert_eq!(set.main().unwrap().dependencies, vec!["example.com/dep"]);
    // dep의 간선은 그래프 빌드 시점 기준이며, 이후 필터로 제거된 모듈을
    // 가리키는 참조는 문서 조립 단계에서 걸러진다
    let dep = set.find("example.com/dep").unwrap();
    assert_eq!(dep.dependencies, vec!["example.com/hidden"]);
}

#[test]
fn pipeline_keeps_test_deps_when_requested() {
    let toolchain = FakeToolchain {
        modules: r#"
{"Path": "example.com/app", "Main": true}
{"Path": "example.com/testdep", "Version": "v0.3.0"}
"#
        .to_owned(),
        test_only: vec!["example.com/testdep"],
        ..FakeToolchain::default()
    };

    let resolver = ResolverBuilder::new()
        .config(ResolveConfig {
            include_test_deps: true,
            detect_local_versions: false,
            ..ResolveConfig::default()
        })
        .toolchain(Box::new(toolchain))
        .build();

    let set = resolver.resolve_directory(Path::new(".")).unwrap();
    let module = set.find("example.com/testdep").unwrap();
    assert!(module.test_only);
}

#[test]
fn paths_are_unique_after_full_pipeline() {
    let toolchain = FakeToolchain {
        modules: r#"
{"Path": "example.com/app", "Main": true}
{"Path": "example.com/dep", "Version": "v0.1.0"}
{"Path": "example.com/dep", "Version": "v0.5.0"}
"#
        .to_owned(),
        ..FakeToolchain::default()
    };

    let set = resolver_with(toolchain, false)
        .resolve_directory(Path::new("."))
        .unwrap();

    let mut paths: Vec<&str> = set.modules.iter().map(|m| m.path.as_str()).collect();
    let before = paths.len();
    paths.sort_unstable();
    paths.dedup();
    assert_eq!(paths.len(), before);
}

#[test]
fn local_replacement_at_exact_tag_resolves_tag_version() {
    let tmp = tempfile::tempdir().unwrap();
    let sibling = tmp.path().join("sibling");
    init_module_repo(&sibling, "example.com/sibling");
    run_git(&sibling, &["tag", "v2.0.0"]);

    let app_dir = tmp.path().join("app");
    std::fs::create_dir_all(&app_dir).unwrap();

    let toolchain = FakeToolchain {
        modules: format!(
            r#"
{{"Path": "example.com/app", "Main": true, "Dir": {app_dir:?}}}
{{"Path": "example.com/sibling", "Version": "v0.0.0", "Replace": {{"Path": "../sibling"}}}}
"#
        ),
        ..FakeToolchain::default()
    };

    let set = resolver_with(toolchain, true)
        .resolve_directory(Path::new("."))
        .unwrap();

    let module = set.find("example.com/sibling").unwrap();
    match module.replace.as_ref().unwrap() {
        Replacement::Local { path, version, .. } => {
            assert_eq!(path, "example.com/sibling");
            assert_eq!(version, "v2.0.0");
        }
        other => panic!("expected local replacement, got {other}"),
    }
    assert_eq!(module.effective_version(), "v2.0.0");
}

#[test]
fn local_replacement_past_tag_resolves_pseudo_version() {
    let tmp = tempfile::tempdir().unwrap();
    let sibling = tmp.path().join("sibling");
    init_module_repo(&sibling, "example.com/sibling");
    run_git(&sibling, &["tag", "v2.0.0"]);
    std::fs::write(sibling.join("extra.txt"), "more").unwrap();
    run_git(&sibling, &["add", "."]);
    run_git(&sibling, &["commit", "-q", "-m", "second"]);

    let app_dir = tmp.path().join("app");
    std::fs::create_dir_all(&app_dir).unwrap();

    let toolchain = FakeToolchain {
        modules: format!(
            r#"
{{"Path": "example.com/app", "Main": true, "Dir": {app_dir:?}}}
{{"Path": "example.com/sibling", "Version": "v0.0.0", "Replace": {{"Path": "../sibling"}}}}
"#
        ),
        ..FakeToolchain::default()
    };

    let set = resolver_with(toolchain, true)
        .resolve_directory(Path::new("."))
        .unwrap();

    let module = set.find("example.com/sibling").unwrap();
    let version = module.effective_version();
    assert!(
        version.starts_with("v2.0.1-0.20230401120000-"),
        "expected v2-major pseudo-version, got {version}"
    );
}

#[test]
fn local_replacement_outside_version_control_keeps_empty_version() {
    let tmp = tempfile::tempdir().unwrap();
    let sibling = tmp.path().join("sibling");
    std::fs::create_dir_all(&sibling).unwrap();
    std::fs::write(sibling.join("go.mod"), "module example.com/sibling\n").unwrap();

    let app_dir = tmp.path().join("app");
    std::fs::create_dir_all(&app_dir).unwrap();

    let toolchain = FakeToolchain {
        modules: format!(
            r#"
{{"Path": "example.com/app", "Main": true, "Dir": {app_dir:?}}}
{{"Path": "example.com/sibling", "Version": "v0.0.0", "Replace": {{"Path": "../sibling"}}}}
"#
        ),
        ..FakeToolchain::default()
    };

    // tmpdir이 상위 저장소 아래에 있으면 버전이 추론될 수 있으므로
    // 경로 해석만 단언한다
    let set = resolver_with(toolchain, true)
        .resolve_directory(Path::new("."))
        .unwrap();
    let module = set.find("example.com/sibling").unwrap();
    assert_eq!(module.effective_path(), "example.com/sibling");
}

#[test]
fn binary_manifest_end_to_end() {
    let (info, set) = resolver_with(FakeToolchain::default(), false)
        .resolve_binary(Path::new("/bin/app"), None)
        .unwrap();

    assert_eq!(info.path, "example.com/app/cmd");
    assert_eq!(info.setting("GOOS"), Some("linux"));
    assert_eq!(set.len(), 2);
    assert_eq!(set.main().unwrap().dependencies, vec!["example.com/dep"]);
    assert_eq!(
        set.find("example.com/dep").unwrap().sum.as_deref(),
        Some("h1:abcdef=")
    );
}

#[test]
fn vendor_tree_end_to_end() {
    let tmp = tempfile::tempdir().unwrap();
    let vendor_dir = tmp.path().join("vendor");
    std::fs::create_dir_all(&vendor_dir).unwrap();
    std::fs::write(
        vendor_dir.join("modules.txt"),
        "# example.com/dep v0.1.0\n\
         ## explicit; go 1.22\n\
         example.com/dep/pkg\n\
         # example.com/old v1.0.0 => example.com/fork v1.1.0\n\
         ## explicit; go 1.22\n\
         example.com/old/pkg\n\
         # example.com/old => example.com/fork v9.9.9\n",
    )
    .unwrap();

    let set = resolver_with(FakeToolchain::default(), false)
        .resolve_vendor(tmp.path())
        .unwrap();

    assert_eq!(set.len(), 3);
    assert_eq!(set.main().unwrap().path, "example.com/app");

    let dep = set.find("example.com/dep").unwrap();
    assert!(dep.vendored);
    assert_eq!(dep.dir.as_deref(), Some("vendor/example.com/dep"));

    // 재방출된 치환 제약은 첫 등장이 이긴다
    let old = set.find("example.com/old").unwrap();
    assert_eq!(old.effective_version(), "v1.1.0");
}

#[test]
fn version_detector_walks_parents() {
    let tmp = tempfile::tempdir().unwrap();
    let repo = tmp.path().join("repo");
    init_module_repo(&repo, "example.com/repo");
    run_git(&repo, &["tag", "v1.5.0"]);

    let nested = repo.join("deeply/nested/dir");
    std::fs::create_dir_all(&nested).unwrap();

    let detector = VersionDetector::new("git");
    assert_eq!(detector.detect(&nested).unwrap(), "v1.5.0");
}
