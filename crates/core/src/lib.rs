#![doc = include_str!("../README.md")]

pub mod config;
pub mod error;
pub mod metrics;
pub mod types;
pub mod version;

// --- 주요 타입 re-export ---
// 각 모듈의 핵심 타입을 크레이트 루트에서 바로 사용할 수 있도록 합니다.

// 에러
pub use error::{ConfigError, GobomError, ResolveError, SbomError};

// 설정
pub use config::GobomConfig;

// 도메인 타입
pub use types::{
    BuildInfo, Module, ModuleSet, Package, Replacement, compare_versions, is_local_path,
};

// 버전 유틸리티
pub use version::{
    is_valid_tag, pseudo_version, pseudo_version_with_timestamp, tag_major, unix_to_rfc3339,
};
