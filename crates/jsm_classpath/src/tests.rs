use super::*;
use crate::runtime::interpret_version_token;
use std::fs;
use std::path::Path;
use test_case::test_case;

#[test_case(false, true => ClasspathBucket::SourceDirectory; "source directory")]
#[test_case(false, false => ClasspathBucket::SourceFile; "source file")]
#[test_case(true, true => ClasspathBucket::BinaryDirectory; "binary directory")]
#[test_case(true, false => ClasspathBucket::BinaryFile; "binary file")]
fn bucket_bits(is_binary: bool, is_directory: bool) -> ClasspathBucket {
    ClasspathBucket::from_bits(is_binary, is_directory)
}

#[test]
fn buckets_sort_sources_before_binaries() {
    let mut buckets = vec![
        ClasspathBucket::BinaryFile,
        ClasspathBucket::SourceFile,
        ClasspathBucket::BinaryDirectory,
        ClasspathBucket::SourceDirectory,
    ];
    buckets.sort();
    assert_eq!(
        buckets,
        vec![
            ClasspathBucket::SourceDirectory,
            ClasspathBucket::SourceFile,
            ClasspathBucket::BinaryDirectory,
            ClasspathBucket::BinaryFile,
        ]
    );
}

#[test]
fn entry_identity_ignores_module_and_dot_segments() {
    let dir = tempfile::tempdir().expect("tempdir");
    let plain = ClasspathEntry::source(dir.path().join("src")).expect("entry");
    let dotted = ClasspathEntry::source(dir.path().join("x").join("..").join(".").join("src"))
        .expect("entry")
        .with_module("client");
    assert_eq!(plain, dotted);
    assert_eq!(dotted.module(), Some("client"));

    let binary = ClasspathEntry::binary(dir.path().join("src")).expect("entry");
    assert_ne!(plain, binary);
}

#[test]
fn classify_reports_missing_path() {
    let dir = tempfile::tempdir().expect("tempdir");
    let missing = ClasspathEntry::binary(dir.path().join("missing.jar")).expect("entry");
    match ClasspathBucket::classify(&missing) {
        Err(ClasspathError::ClasspathProbe { path, .. }) => assert_eq!(path, missing.path()),
        other => panic!("expected probe error, got {other:?}"),
    }
}

#[test]
fn interpret_version_token_supports_both_formats() {
    assert_eq!(interpret_version_token("1.8.0_362"), Some(8));
    assert_eq!(interpret_version_token("21.0.2"), Some(21));
    assert_eq!(interpret_version_token("25-ea"), Some(25));
    assert_eq!(interpret_version_token("ea"), None);
}

#[test]
fn runtime_reads_release_file() {
    let home = tempfile::tempdir().expect("tempdir");
    write_file(&home.path().join("release"), "IMPLEMENTOR=\"x\"\nJAVA_VERSION=\"17.0.9\"\n");
    write_file(&home.path().join("jmods").join("java.base.jmod"), "JM");

    let runtime = runtime_from_home(home.path(), RuntimeSource::Explicit).expect("runtime");
    assert_eq!(runtime.version.as_deref(), Some("17.0.9"));
    assert_eq!(runtime.major_version, Some(17));

    let boot = runtime.boot_classpath().expect("boot classpath");
    assert_eq!(boot.len(), 1);
    assert_eq!(boot[0].module(), Some("java.base"));
    assert_eq!(boot[0].mode(), EntryMode::Binary);
}

#[test]
fn legacy_runtime_lists_rt_jar_first() {
    let home = tempfile::tempdir().expect("tempdir");
    let lib = home.path().join("jre").join("lib");
    write_file(&lib.join("charsets.jar"), "PK");
    write_file(&lib.join("rt.jar"), "PK");

    let runtime = runtime_from_home(home.path(), RuntimeSource::Explicit).expect("runtime");
    let boot = runtime.boot_classpath().expect("boot classpath");
    assert_eq!(boot.len(), 2);
    assert!(boot[0].path().ends_with("rt.jar"));
}

#[test]
fn empty_runtime_is_rejected() {
    let home = tempfile::tempdir().expect("tempdir");
    let runtime = runtime_from_home(home.path(), RuntimeSource::Explicit).expect("runtime");
    assert!(matches!(
        runtime.boot_classpath(),
        Err(ClasspathError::RuntimeNotFound(_))
    ));
}

#[test]
fn missing_explicit_home_is_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let error = discover_runtime(Some(&dir.path().join("nope"))).expect_err("missing home");
    assert!(matches!(error, ClasspathError::RuntimeNotFound(_)));
}

fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent");
    }
    fs::write(path, content).expect("write file");
}
