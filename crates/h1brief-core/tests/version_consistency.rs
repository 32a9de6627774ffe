//! Every workspace member inherits the workspace version, and the
//! version compiled into h1brief-core matches it.

use std::path::{Path, PathBuf};

fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .ancestors()
        .nth(2)
        .expect("crate lives two levels below the workspace root")
        .to_path_buf()
}

fn read_toml(path: &Path) -> toml::Value {
    let raw = std::fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("read {}: {}", path.display(), e));
    raw.parse()
        .unwrap_or_else(|e| panic!("parse {}: {}", path.display(), e))
}

fn members() -> Vec<String> {
    let root = read_toml(&workspace_root().join("Cargo.toml"));
    root["workspace"]["members"]
        .as_array()
        .expect("workspace.members")
        .iter()
        .map(|m| m.as_str().expect("member path").to_string())
        .collect()
}

#[test]
fn all_members_inherit_workspace_version() {
    let members = members();
    assert!(members.iter().any(|m| m.ends_with("h1brief-core")));

    for member in members {
        let manifest = read_toml(&workspace_root().join(&member).join("Cargo.toml"));
        let inherits = manifest
            .get("package")
            .and_then(|p| p.get("version"))
            .and_then(|v| v.get("workspace"))
            .and_then(|w| w.as_bool())
            == Some(true);
        assert!(inherits, "{} should use version.workspace = true", member);
    }
}

#[test]
fn compiled_version_matches_workspace() {
    let root = read_toml(&workspace_root().join("Cargo.toml"));
    let ws_version = root["workspace"]["package"]["version"]
        .as_str()
        .expect("workspace.package.version");
    assert_eq!(ws_version, h1brief_core::VERSION);
}

#[test]
fn internal_dependency_versions_match_workspace() {
    let root = read_toml(&workspace_root().join("Cargo.toml"));
    let ws_version = root["workspace"]["package"]["version"].as_str().unwrap();
    let deps = root["workspace"]["dependencies"].as_table().unwrap();

    for name in ["h1brief-core", "hackerone-api", "report-generator"] {
        let version = deps[name]["version"].as_str().unwrap();
        assert_eq!(version, ws_version, "{} pinned to {}", name, version);
    }
}
