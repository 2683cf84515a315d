mod support;

use jsm_api::{ApiContext, ApiVersion};
use jsm_classpath::ClasspathEntry;
use jsm_model::{
    AnnotationValue, CompilationUnitInfo, Environment, EnvironmentConfig, EnvironmentError,
    OriginKind, TypeKind,
};
use std::path::{Path, PathBuf};
use support::{fake_jdk, write_archive, write_file, ClassFileBuilder, Element, ACC_PUBLIC, ACC_STATIC};
use tempfile::TempDir;

const PERSON_FORM: &str = r#"package com.acme.client;

import org.eclipse.scout.rt.platform.Outer;
import org.eclipse.scout.rt.client.dto.FormData;

@FormData(value = PersonFormData.class, sdkCommand = FormData.SdkCommand.CREATE)
public class PersonForm extends Outer implements Comparable<PersonForm> {
  public class MainBox {
    public class NameField {
    }
  }
}
"#;

const PERSON: &str = r#"package com.acme.client;

public class Person {
  private String name;

  public String getName() {
    return name;
  }
}
"#;

struct Fixture {
    _dir: TempDir,
    jdk: PathBuf,
    sources: PathBuf,
    jar: PathBuf,
}

fn fixture(with_manifest: bool) -> Fixture {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = dir.path();
    let jdk = fake_jdk(root);

    let sources = root.join("client").join("src").join("main").join("java");
    write_file(&sources.join("com/acme/client/PersonForm.java"), PERSON_FORM);
    write_file(&sources.join("com/acme/client/Person.java"), PERSON);
    write_file(
        &sources.join("module-info.java"),
        "module com.acme.client {\n  requires transitive org.eclipse.scout.rt.platform;\n}\n",
    );

    let platform = "org/eclipse/scout/rt/platform";
    let mut members = vec![
        (
            "module-info.class",
            ClassFileBuilder::module_info("org.eclipse.scout.rt.platform", &[("java.base", false)]).build(),
        ),
        (
            "org/eclipse/scout/rt/platform/Platform.class",
            ClassFileBuilder::class(&format!("{platform}/Platform"))
                .method(ACC_PUBLIC | ACC_STATIC, "get", "()Lorg/eclipse/scout/rt/platform/IPlatform;")
                .method(ACC_PUBLIC, "<init>", "()V")
                .field(ACC_PUBLIC | ACC_STATIC, "NAMES", "[Ljava/lang/String;")
                .annotation("Lorg/eclipse/scout/rt/platform/ApplicationScoped;", vec![])
                .annotation(
                    "Lorg/eclipse/scout/rt/platform/Order;",
                    vec![
                        ("value", Element::Int(10)),
                        ("tags", Element::Array(vec![Element::Str("a".into()), Element::Str("b".into())])),
                        (
                            "scope",
                            Element::Enum("Lorg/eclipse/scout/rt/platform/Scope;".into(), "GLOBAL".into()),
                        ),
                    ],
                )
                .build(),
        ),
        (
            "org/eclipse/scout/rt/platform/Outer.class",
            ClassFileBuilder::class(&format!("{platform}/Outer"))
                .inner_class(
                    &format!("{platform}/Outer$Inner"),
                    Some(&format!("{platform}/Outer")),
                    Some("Inner"),
                    ACC_PUBLIC | ACC_STATIC,
                )
                .build(),
        ),
        (
            "org/eclipse/scout/rt/platform/Outer$Inner.class",
            ClassFileBuilder::class(&format!("{platform}/Outer$Inner"))
                .access(ACC_PUBLIC)
                .inner_class(
                    &format!("{platform}/Outer$Inner"),
                    Some(&format!("{platform}/Outer")),
                    Some("Inner"),
                    ACC_PUBLIC | ACC_STATIC,
                )
                .build(),
        ),
        (
            "com/acme/client/Person.class",
            ClassFileBuilder::class("com/acme/client/Person").build(),
        ),
    ];
    if with_manifest {
        members.push((
            "META-INF/MANIFEST.MF",
            b"Manifest-Version: 1.0\r\nImplementation-Version: 22.0.7\r\n".to_vec(),
        ));
    }
    let jar = root.join("lib").join("org.eclipse.scout.rt.platform-22.0.5.jar");
    write_archive(&jar, &members);

    Fixture {
        _dir: dir,
        jdk,
        sources,
        jar,
    }
}

fn config(fixture: &Fixture) -> EnvironmentConfig {
    EnvironmentConfig::new([
        ClasspathEntry::source(&fixture.sources).expect("source entry"),
        ClasspathEntry::binary(&fixture.jar).expect("jar entry"),
    ])
    .with_runtime_home(&fixture.jdk)
}

fn unit_info(folder: &Path, simple_name: &str) -> CompilationUnitInfo {
    CompilationUnitInfo::new(Some(folder), Some("com.acme.client"), simple_name).expect("unit info")
}

#[test]
fn environment_is_lazy_until_first_lookup() {
    let fixture = fixture(true);
    let env = Environment::new(config(&fixture));
    let stats = env.cache_stats();
    assert!(!stats.compiler_initialized);
    assert!(!stats.classpath_initialized);

    assert!(env.find_type("com.acme.client.Missing").expect("lookup").is_none());
    let stats = env.cache_stats();
    assert!(stats.compiler_initialized && stats.classpath_initialized);
}

#[test]
fn source_types_resolve_names_against_imports_and_scope() {
    let fixture = fixture(true);
    let env = Environment::new(config(&fixture));
    let form = env
        .find_type("com.acme.client.PersonForm")
        .expect("lookup")
        .expect("form present");

    assert_eq!(form.kind, TypeKind::Class);
    assert_eq!(form.origin.kind, OriginKind::Source);
    assert_eq!(
        form.super_class.as_ref().map(|ty| ty.name.as_str()),
        Some("org.eclipse.scout.rt.platform.Outer")
    );
    assert_eq!(form.interfaces[0].name, "java.lang.Comparable");
    assert_eq!(form.interfaces[0].arguments[0].name, "com.acme.client.PersonForm");
    assert_eq!(form.nested, ["com.acme.client.PersonForm.MainBox"]);
    assert_eq!(form.module.as_deref(), Some("com.acme.client"));

    let field = env
        .find_type("com.acme.client.PersonForm.MainBox.NameField")
        .expect("lookup")
        .expect("nested present");
    assert_eq!(field.binary_name, "com.acme.client.PersonForm$MainBox$NameField");
    assert_eq!(field.declaring_type.as_deref(), Some("com.acme.client.PersonForm.MainBox"));
}

#[test]
fn source_annotations_decode_class_and_enum_values() {
    let fixture = fixture(true);
    let env = Environment::new(config(&fixture));
    let form = env
        .find_type("com.acme.client.PersonForm")
        .expect("lookup")
        .expect("form present");

    let form_data = env
        .annotation(&form, "org.eclipse.scout.rt.client.dto.FormData")
        .expect("decode")
        .expect("annotation present");
    assert_eq!(
        form_data.class_value("value").map(|ty| ty.name.as_str()),
        Some("com.acme.client.PersonFormData")
    );
    assert_eq!(
        form_data.get("sdkCommand"),
        Some(&AnnotationValue::Enum {
            type_name: "org.eclipse.scout.rt.client.dto.FormData.SdkCommand".into(),
            constant: "CREATE".into(),
        })
    );

    let stats = env.cache_stats();
    assert_eq!(stats.source_annotations, 1);
    assert_eq!(stats.binary_annotations, 0);
    assert!(env.annotation(&form, "java.lang.Deprecated").expect("decode").is_none());
}

#[test]
fn binary_types_come_from_archives() {
    let fixture = fixture(true);
    let env = Environment::new(config(&fixture));
    let platform = env
        .find_type("org.eclipse.scout.rt.platform.Platform")
        .expect("lookup")
        .expect("platform present");

    assert_eq!(platform.origin.kind, OriginKind::Binary);
    assert_eq!(platform.module.as_deref(), Some("org.eclipse.scout.rt.platform"));
    assert_eq!(platform.super_class.as_ref().map(|ty| ty.name.as_str()), Some("java.lang.Object"));
    let get = platform.method("get").expect("get");
    assert_eq!(
        get.return_type.as_ref().map(|ty| ty.name.as_str()),
        Some("org.eclipse.scout.rt.platform.IPlatform")
    );
    assert!(platform.method("Platform").expect("constructor").is_constructor());
    assert_eq!(platform.field("NAMES").map(|field| field.ty.dimensions), Some(1));

    let order = env
        .annotation(&platform, "org.eclipse.scout.rt.platform.Order")
        .expect("decode")
        .expect("order present");
    assert_eq!(order.value(), Some(&AnnotationValue::Integer(10)));
    assert_eq!(order.enum_value("scope"), Some("GLOBAL"));
    assert_eq!(
        order.get("tags"),
        Some(&AnnotationValue::Array(vec![
            AnnotationValue::String("a".into()),
            AnnotationValue::String("b".into()),
        ]))
    );
    assert_eq!(env.cache_stats().binary_annotations, 1);
}

#[test]
fn binary_member_types_use_inner_class_records() {
    let fixture = fixture(true);
    let env = Environment::new(config(&fixture));
    let outer = env
        .find_type("org.eclipse.scout.rt.platform.Outer")
        .expect("lookup")
        .expect("outer present");
    assert_eq!(outer.nested, ["org.eclipse.scout.rt.platform.Outer.Inner"]);

    let inner = env
        .find_type("org.eclipse.scout.rt.platform.Outer.Inner")
        .expect("lookup")
        .expect("inner present");
    assert_eq!(inner.simple_name, "Inner");
    assert_eq!(inner.binary_name, "org.eclipse.scout.rt.platform.Outer$Inner");
    assert_eq!(inner.declaring_type.as_deref(), Some("org.eclipse.scout.rt.platform.Outer"));
    assert!(inner.flags.is_static());
}

#[test]
fn source_folders_shadow_archives() {
    let fixture = fixture(true);
    let env = Environment::new(config(&fixture));
    let person = env
        .find_type("com.acme.client.Person")
        .expect("lookup")
        .expect("person present");
    assert_eq!(person.origin.kind, OriginKind::Source);
    assert!(person.field("name").is_some());
}

#[test]
fn runtime_types_are_visible() {
    let fixture = fixture(true);
    let env = Environment::new(config(&fixture));
    let string = env
        .find_type("java.lang.String")
        .expect("lookup")
        .expect("string present");
    assert_eq!(string.module.as_deref(), Some("java.base"));
    assert_eq!(string.interfaces[0].name, "java.lang.CharSequence");
}

#[test]
fn close_empties_caches_and_keeps_raw_classpath() {
    let fixture = fixture(true);
    let mut env = Environment::new(config(&fixture));
    let form = env
        .find_type("com.acme.client.PersonForm")
        .expect("lookup")
        .expect("form present");
    env.source_of(&form).expect("source").expect("text");
    env.annotation(&form, "org.eclipse.scout.rt.client.dto.FormData")
        .expect("decode");
    let platform = env
        .find_type("org.eclipse.scout.rt.platform.Platform")
        .expect("lookup")
        .expect("platform present");
    env.annotation(&platform, "org.eclipse.scout.rt.platform.Order")
        .expect("decode");

    let before = env.cache_stats();
    assert!(before.elements >= 2);
    assert_eq!(before.sources, 1);
    assert_eq!(before.source_annotations, 1);
    assert_eq!(before.binary_annotations, 1);
    let raw_before = env.raw_classpath().to_vec();

    env.close();
    env.close();

    let after = env.cache_stats();
    assert!(after.is_empty());
    assert!(!after.compiler_initialized);
    assert!(!after.classpath_initialized);
    assert!(!env.raw_classpath().is_empty());
    assert_eq!(env.raw_classpath(), raw_before.as_slice());
    assert!(matches!(
        env.find_type("com.acme.client.PersonForm"),
        Err(EnvironmentError::Closed)
    ));

    env.reload().expect("reload");
    assert!(env
        .find_type("com.acme.client.PersonForm")
        .expect("lookup")
        .is_some());
}

#[test]
fn overrides_registered_while_closed_apply_after_reload() {
    let fixture = fixture(true);
    let mut env = Environment::new(config(&fixture));
    env.close();

    env.register_compilation_unit_override(
        "package com.acme.client;\npublic class Address {\n  private String street;\n}\n",
        unit_info(&fixture.sources, "Address"),
    );
    assert!(env.cache_stats().is_empty());
    assert!(!env.cache_stats().compiler_initialized);
    assert!(env.find_type("com.acme.client.Address").is_err());

    env.reload().expect("reload");
    let address = env
        .find_type("com.acme.client.Address")
        .expect("lookup")
        .expect("address present");
    assert_eq!(address.origin.kind, OriginKind::WorkingCopy);
    assert_eq!(
        address.origin.entry.as_ref().map(|entry| entry.path().to_path_buf()),
        Some(fixture.sources.clone())
    );
    assert!(address.field("street").is_some());
}

#[test]
fn overrides_on_an_open_environment_shadow_files() {
    let fixture = fixture(true);
    let mut env = Environment::new(config(&fixture));
    let person = env
        .find_type("com.acme.client.Person")
        .expect("lookup")
        .expect("person present");
    assert!(person.field("name").is_some());

    env.register_compilation_unit_override(
        "package com.acme.client;\npublic class Person {\n  private int age;\n}\n",
        unit_info(&fixture.sources, "Person.java"),
    );
    let person = env
        .find_type("com.acme.client.Person")
        .expect("lookup")
        .expect("person present");
    assert!(person.field("name").is_none());
    assert!(person.field("age").is_some());
    assert_eq!(person.origin.kind, OriginKind::WorkingCopy);
    let text = env.source_of(&person).expect("source").expect("text");
    assert!(text.contains("private int age;"));

    // Unrelated types stay visible.
    assert!(env
        .find_type("com.acme.client.PersonForm")
        .expect("lookup")
        .is_some());
}

#[test]
fn api_version_prefers_manifest_then_archive_name() {
    let with_manifest = fixture(true);
    let env = Environment::new(config(&with_manifest));
    assert_eq!(
        env.detect_api_version().expect("detect"),
        Some(ApiVersion::new(vec![22, 0, 7]))
    );

    let without_manifest = fixture(false);
    let env = Environment::new(config(&without_manifest));
    assert_eq!(env.api_version(), Some(ApiVersion::new(vec![22, 0, 5])));

    let pinned = Environment::new(config(&without_manifest).with_api_version(ApiVersion::new(vec![10, 0])));
    assert_eq!(pinned.api_version(), Some(ApiVersion::new(vec![10, 0])));

    let unknown = Environment::new(config(&with_manifest).with_api_marker_type("com.example.Nothing"));
    assert_eq!(unknown.detect_api_version().expect("detect"), None);
}

#[test]
fn module_graph_combines_descriptors_entries_and_config() {
    let fixture = fixture(true);
    let env = Environment::new(
        config(&fixture).with_module_requires("com.acme.client", ["com.acme.shared"]),
    );
    let graph = env.module_graph().expect("graph");

    let client = graph.node("com.acme.client").expect("client module");
    assert_eq!(client.source_folders().count(), 1);
    let targets: Vec<(&str, bool)> = client
        .requires
        .iter()
        .map(|edge| {
            let target = graph.get(edge.target).expect("target node");
            (target.name.as_str(), edge.transitive)
        })
        .collect();
    assert_eq!(
        targets,
        [("org.eclipse.scout.rt.platform", true), ("com.acme.shared", false)]
    );

    let platform = graph.node("org.eclipse.scout.rt.platform").expect("platform module");
    assert_eq!(platform.requires.len(), 1);
    assert!(graph.node("java.base").is_some_and(|node| !node.entries.is_empty()));
    assert!(graph.node("com.acme.shared").is_some_and(|node| node.entries.is_empty()));
}

#[test]
fn source_folders_are_found_by_package() {
    let fixture = fixture(true);
    let env = Environment::new(config(&fixture));
    let folders = env
        .source_folders_with_package("com.acme.client")
        .expect("folders");
    assert_eq!(folders.len(), 1);
    assert_eq!(folders[0].path(), fixture.sources.as_path());
    assert!(env
        .source_folders_with_package("com.acme.nowhere")
        .expect("folders")
        .is_empty());
}
