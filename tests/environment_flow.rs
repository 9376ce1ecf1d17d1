//! Environment lifecycle and classpath behavior, end to end.
//!
//! Exercises the builder's filtering against realistic repository layouts,
//! the memoized index under concurrent first reads, reload semantics and the
//! seam between the index and the generators.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use javaforge::{EnvironmentBuilder, ForgeError, Resolvable};
use tempfile::TempDir;

/// Opt-in diagnostics: `RUST_LOG=javaforge=debug cargo test`.
fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn write_source(root: &Path, rel: &str, source: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, source).unwrap();
}

#[test]
fn exclude_regex_removes_only_matching_jars() {
    init_logging();
    let dir = TempDir::new().unwrap();
    let excluded = dir.path().join(".scout.sdk.core/target/foo.jar");
    let kept = dir.path().join("app/target/foo.jar");
    fs::create_dir_all(excluded.parent().unwrap()).unwrap();
    fs::create_dir_all(kept.parent().unwrap()).unwrap();
    fs::write(&excluded, b"").unwrap();
    fs::write(&kept, b"").unwrap();

    let env = EnvironmentBuilder::new()
        .with_running_classpath(false)
        .with_absolute_binary_path(&excluded)
        .with_absolute_binary_path(&kept)
        .exclude(".*\\.scout\\.sdk\\..*target/.*\\.jar")
        .build()
        .unwrap();

    let paths: Vec<_> = env.entries().iter().map(|e| e.path.clone()).collect();
    assert!(!paths.contains(&excluded));
    assert!(paths.contains(&kept));
}

#[test]
fn include_reverses_exclude_by_pattern_text() {
    let dir = TempDir::new().unwrap();
    let jar = dir.path().join("target/foo.jar");
    fs::create_dir_all(jar.parent().unwrap()).unwrap();
    fs::write(&jar, b"").unwrap();

    let pattern = ".*target/.*\\.jar";
    let env = EnvironmentBuilder::new()
        .with_running_classpath(false)
        .with_absolute_binary_path(&jar)
        .exclude(pattern)
        .include(pattern)
        .build()
        .unwrap();
    assert_eq!(env.entries().len(), 1);

    // a semantically equal but textually different pattern does not cancel
    let env = EnvironmentBuilder::new()
        .with_running_classpath(false)
        .with_absolute_binary_path(&jar)
        .exclude(pattern)
        .include(".*target/.*[.]jar")
        .build()
        .unwrap();
    assert!(env.entries().is_empty());
}

#[test]
fn concurrent_first_reads_converge_on_one_computation() {
    init_logging();
    let dir = TempDir::new().unwrap();
    write_source(
        dir.path(),
        "org/demo/Shared.java",
        "package org.demo; public class Shared { private int m_value; }",
    );
    let env = Arc::new(
        EnvironmentBuilder::new()
            .with_running_classpath(false)
            .with_absolute_source_path(dir.path())
            .build()
            .unwrap(),
    );

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let env = Arc::clone(&env);
            std::thread::spawn(move || env.find_type("org.demo.Shared").unwrap().unwrap())
        })
        .collect();
    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    // every thread sees the same memoized allocation
    for decl in &results[1..] {
        assert!(Arc::ptr_eq(&results[0], decl));
    }
}

#[test]
fn reload_is_idempotent_for_unchanged_files() {
    let dir = TempDir::new().unwrap();
    write_source(
        dir.path(),
        "org/demo/Stable.java",
        "package org.demo; public class Stable { public void run() { } }",
    );
    let env = EnvironmentBuilder::new()
        .with_running_classpath(false)
        .with_absolute_source_path(dir.path())
        .build()
        .unwrap();

    let before = env.require_type("org.demo.Stable").unwrap();
    env.reload().unwrap();
    let after = env.require_type("org.demo.Stable").unwrap();

    // a fresh computation, structurally equal to the first
    assert!(!Arc::ptr_eq(&before, &after));
    assert_eq!(*before, *after);
}

#[test]
fn scoped_run_closes_even_on_error() {
    let dir = TempDir::new().unwrap();
    let result: Result<(), _> = EnvironmentBuilder::new()
        .with_running_classpath(false)
        .with_absolute_source_path(dir.path())
        .run(|env| {
            env.require_type("org.demo.Missing")?;
            Ok(())
        });
    assert!(matches!(result, Err(ForgeError::TypeNotFound { .. })));
}

#[test]
fn references_resolve_through_the_index() {
    let dir = TempDir::new().unwrap();
    write_source(
        dir.path(),
        "org/demo/Base.java",
        "package org.demo; public abstract class Base { protected abstract void run(); }",
    );
    write_source(
        dir.path(),
        "org/demo/Child.java",
        "package org.demo; public class Child extends org.demo.Base { protected void run() { } }",
    );
    let env = EnvironmentBuilder::new()
        .with_running_classpath(false)
        .with_absolute_source_path(dir.path())
        .build()
        .unwrap();

    let child = env.require_type("org.demo.Child").unwrap();
    let super_ref = child.super_type.as_ref().unwrap();
    let base = super_ref.resolve(&env).unwrap().unwrap();
    assert_eq!(base.fqn, "org.demo.Base");
    assert!(base.flags.is_abstract());

    // unresolvable references are a miss, not an error
    assert!(javaforge::TypeRef::new("org.demo.Unknown")
        .resolve(&env)
        .unwrap()
        .is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn batch_queries_aggregate_failures() {
    let dir = TempDir::new().unwrap();
    write_source(
        dir.path(),
        "org/demo/Doc.java",
        "package org.demo; public class Doc { }",
    );
    let env = Arc::new(
        EnvironmentBuilder::new()
            .with_running_classpath(false)
            .with_absolute_source_path(dir.path())
            .build()
            .unwrap(),
    );

    let tasks: Vec<_> = ["org.demo.Doc", "org.demo.MissingA", "org.demo.MissingB"]
        .into_iter()
        .map(|fqn| {
            let env = Arc::clone(&env);
            javaforge::Task::spawn_blocking(move || env.require_type(fqn).map(|t| t.fqn.clone()))
        })
        .collect();

    let err = javaforge::await_all(tasks).await.unwrap_err();
    let nested = err.nested();
    assert_eq!(nested.len(), 2);
    assert!(nested
        .iter()
        .all(|e| matches!(e, ForgeError::TypeNotFound { .. })));
}
