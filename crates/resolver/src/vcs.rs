//! 버전 탐지기 -- 저장소 탐색과 태그/의사 버전 추론
//!
//! 디렉토리에서 시작해 부모 방향으로 버전 관리 저장소를 찾고, HEAD에서
//! 도달 가능한 최신 시맨틱 버전 태그를 고릅니다. HEAD가 태그 커밋과
//! 일치하면 태그 이름을 그대로, 아니면 태그(또는 무태그) 기준의 의사
//! 버전을 반환합니다.
//!
//! 저장소 접근은 설정된 `git` 바이너리를 블로킹 호출합니다. 태그 조회가
//! 개별적으로 실패하면 해당 태그만 건너뜁니다.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use gobom_core::version::{pseudo_version, tag_major};

use crate::error::ResolverError;

/// 커밋 메타데이터 (해시, 커미터 시각, 작성자 시각)
#[derive(Debug, Clone)]
struct CommitInfo {
    hash: String,
    commit_time: u64,
    author_time: u64,
}

/// 디렉토리의 버전을 저장소 이력에서 추론하는 탐지기
#[derive(Debug, Clone)]
pub struct VersionDetector {
    /// git 바이너리 이름 또는 경로
    git_binary: String,
}

impl VersionDetector {
    /// 지정한 git 바이너리로 탐지기를 생성합니다.
    pub fn new(git_binary: impl Into<String>) -> Self {
        Self {
            git_binary: git_binary.into(),
        }
    }

    /// 디렉토리의 버전 문자열을 추론합니다.
    ///
    /// 1. 디렉토리에서 시작해 부모 방향으로 저장소를 찾는다 (루트 도달 시 에러).
    /// 2. 시맨틱 버전 문법의 태그 중 커밋 시각이 HEAD보다 늦지 않은 최신
    ///    태그를 고른다 (동률은 먼저 찾은 쪽이 이긴다).
    /// 3. 태그가 없으면 HEAD 기준 `v0` 의사 버전, 태그 커밋이 HEAD면 태그
    ///    이름 그대로, 그 외에는 태그 기준 의사 버전을 반환한다.
    pub fn detect(&self, dir: &Path) -> Result<String, ResolverError> {
        let repo = find_repository(dir)?;
        let head = self.commit_info(&repo, "HEAD")?;

        let tag_output = self.git(&repo, &["tag", "--list"])?;
        let mut best: Option<(String, CommitInfo)> = None;
        for tag in tag_output.lines().map(str::trim) {
            if tag.is_empty() || !gobom_core::version::is_valid_tag(tag) {
                continue;
            }
            let info = match self.commit_info(&repo, tag) {
                Ok(info) => info,
                Err(e) => {
                    debug!(tag = %tag, error = %e, "skipping unreadable tag");
                    continue;
                }
            };
            if info.commit_time > head.commit_time {
                continue;
            }
            let better = match &best {
                None => true,
                Some((_, current)) => info.commit_time > current.commit_time,
            };
            if better {
                best = Some((tag.to_owned(), info));
            }
        }

        match best {
            None => Ok(pseudo_version(
                "v0",
                "",
                head.author_time,
                &head.hash[..12],
            )),
            Some((tag, info)) if info.hash == head.hash => Ok(tag),
            Some((tag, info)) => {
                let major = tag_major(&tag).unwrap_or_else(|| "v0".to_owned());
                Ok(pseudo_version(&major, &tag, info.author_time, &info.hash[..12]))
            }
        }
    }

    /// 리비전의 커밋 해시와 시각을 조회합니다.
    fn commit_info(&self, repo: &Path, rev: &str) -> Result<CommitInfo, ResolverError> {
        let output = self.git(repo, &["log", "-1", "--format=%H %ct %at", rev])?;
        let line = output.lines().next().unwrap_or("");
        let mut fields = line.split_whitespace();
        let (Some(hash), Some(commit_time), Some(author_time)) =
            (fields.next(), fields.next(), fields.next())
        else {
            return Err(ResolverError::Git {
                reason: format!("unexpected log output for '{rev}': {line}"),
            });
        };
        if hash.len() < 12 {
            return Err(ResolverError::Git {
                reason: format!("commit hash too short for '{rev}': {hash}"),
            });
        }
        let parse_time = |s: &str| {
            s.parse::<u64>().map_err(|_| ResolverError::Git {
                reason: format!("invalid commit time for '{rev}': {s}"),
            })
        };
        Ok(CommitInfo {
            hash: hash.to_owned(),
            commit_time: parse_time(commit_time)?,
            author_time: parse_time(author_time)?,
        })
    }

    /// 저장소 안에서 git 명령을 실행하고 stdout을 반환합니다.
    fn git(&self, repo: &Path, args: &[&str]) -> Result<String, ResolverError> {
        let output = Command::new(&self.git_binary)
            .arg("-C")
            .arg(repo)
            .args(args)
            .output()
            .map_err(|e| ResolverError::Git {
                reason: format!("failed to spawn {}: {e}", self.git_binary),
            })?;

        if !output.status.success() {
            return Err(ResolverError::Git {
                reason: format!(
                    "git {} ({}): {}",
                    args.join(" "),
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim(),
                ),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// 디렉토리에서 시작해 부모 방향으로 저장소 루트를 찾습니다.
///
/// 파일시스템 루트에 도달할 때까지 저장소가 없으면 에러입니다.
fn find_repository(start: &Path) -> Result<PathBuf, ResolverError> {
    let absolute = std::fs::canonicalize(start).map_err(|_| ResolverError::VcsNotFound {
        dir: start.display().to_string(),
    })?;

    let mut current = absolute.as_path();
    loop {
        // 워크트리에서는 .git이 파일일 수 있으므로 종류를 구분하지 않는다
        if current.join(".git").exists() {
            return Ok(current.to_path_buf());
        }
        match current.parent() {
            Some(parent) => current = parent,
            None => {
                return Err(ResolverError::VcsNotFound {
                    dir: start.display().to_string(),
                });
            }
        }
    }
}
