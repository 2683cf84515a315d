use super::*;
use crate::annotation::decode_source;
use crate::classfile::{binary_to_fqn, parse_class, ClassParseError};
use crate::manifest::{file_name_version, manifest_version};
use crate::source::{parse_compilation_unit, tokenize, MemberKind, TokenKind};
use jsm_api::ApiVersion;
use std::path::Path;
use test_case::test_case;

const PERSON_FORM: &str = r#"
package com.acme.client;

import com.acme.shared.PersonFormData;
import org.eclipse.scout.rt.client.dto.FormData;
import org.eclipse.scout.rt.client.dto.FormData.SdkCommand;
import java.util.*;

/** Person editor. */
@FormData(value = PersonFormData.class, sdkCommand = SdkCommand.CREATE)
public class PersonForm extends AbstractForm implements IPersonForm<String> {
  private static final long serialVersionUID = 1L;
  private Map<String, Integer> counts = new HashMap<String, Integer>(), other = null;
  private String label = "} not a brace {";

  public PersonForm() {
    super();
  }

  @Override
  protected String getConfiguredTitle() {
    return "Person { }";
  }

  public class MainBox extends AbstractGroupBox {
    public class NameField extends AbstractStringField {
    }

    public class AgeField extends AbstractIntegerField {
      @Override
      protected Integer getConfiguredMaxValue() { return 120; }
    }
  }

  public enum Mode { NEW, EDIT("edit") { }, ; Mode() {} Mode(String s) {} }
}
"#;

#[test]
fn scanner_reads_declarations_and_spans() {
    let unit = parse_compilation_unit(PERSON_FORM).expect("scan");
    assert_eq!(unit.package.as_deref(), Some("com.acme.client"));
    assert_eq!(unit.imports.len(), 4);
    assert!(unit.imports[3].on_demand);
    assert_eq!(unit.imports[3].name, "java.util");

    let form = &unit.types[0];
    assert_eq!(form.name, "PersonForm");
    assert_eq!(form.kind, TypeKind::Class);
    assert!(form.flags.is_public());
    assert_eq!(form.super_class.as_ref().map(|t| t.name.as_str()), Some("AbstractForm"));
    assert_eq!(form.interfaces[0].name, "IPersonForm");
    assert_eq!(form.interfaces[0].arguments[0].name, "String");
    assert_eq!(form.annotations[0].name, "FormData");
    assert_eq!(
        form.annotations[0].arguments.as_deref(),
        Some("value = PersonFormData.class, sdkCommand = SdkCommand.CREATE")
    );

    let names: Vec<&str> = form.members.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(
        names,
        ["serialVersionUID", "counts", "other", "label", "PersonForm", "getConfiguredTitle"]
    );
    assert_eq!(form.members[4].kind, MemberKind::Constructor);
    assert_eq!(form.members[1].ty.as_ref().map(|t| t.arguments.len()), Some(2));

    assert_eq!(&PERSON_FORM[form.body_close()..form.body.end], "}");
    assert!(PERSON_FORM[..form.span.start].trim_end().ends_with("*/"));
    let method = form.member("getConfiguredTitle").expect("method");
    assert!(PERSON_FORM[method.span.start..method.span.end].starts_with("@Override"));
    assert!(PERSON_FORM[method.span.start..method.span.end].ends_with('}'));

    let main_box = form.nested_type("MainBox").expect("main box");
    let fields: Vec<&str> = main_box.nested.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(fields, ["NameField", "AgeField"]);

    let mode = form.nested_type("Mode").expect("enum");
    assert_eq!(mode.kind, TypeKind::Enum);
    assert!(mode.flags.is_static());
    let constants: Vec<&str> = mode
        .members
        .iter()
        .filter(|m| m.kind == MemberKind::EnumConstant)
        .map(|m| m.name.as_str())
        .collect();
    assert_eq!(constants, ["NEW", "EDIT"]);
    assert!(unit.find_type("PersonForm$MainBox$AgeField").is_some());
    assert!(unit.find_type("PersonForm.MainBox.NameField").is_some());
}

#[test]
fn scanner_handles_interfaces_records_and_annotation_types() {
    let text = r#"
        package p;
        public interface Shape<T extends Comparable<T>> extends Named, Sized {
            int SIDES = 3;
            double area();
            default String describe() { return "shape"; }
        }
        record Point(int x, int y) implements Shape<Point> {
            Point {
                if (x < 0) throw new IllegalArgumentException();
            }
        }
        @interface Marker { String value() default "m"; int[] sizes() default {1, 2}; }
    "#;
    let unit = parse_compilation_unit(text).expect("scan");
    let shape = &unit.types[0];
    assert_eq!(shape.kind, TypeKind::Interface);
    assert_eq!(shape.type_parameters, ["T"]);
    assert_eq!(shape.interfaces.len(), 2);
    assert!(shape.member("SIDES").expect("constant").flags.is_static());
    assert!(shape.member("area").expect("area").flags.is_abstract());
    assert!(!shape.member("describe").expect("describe").flags.is_abstract());

    let point = &unit.types[1];
    assert_eq!(point.kind, TypeKind::Record);
    let components: Vec<&str> = point.members.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(components, ["x", "y", "Point"]);

    let marker = &unit.types[2];
    assert_eq!(marker.kind, TypeKind::Annotation);
    assert_eq!(marker.members.len(), 2);
}

#[test]
fn scanner_reads_module_declarations() {
    let text = "/* header */ open module com.acme.client {\n requires transitive com.acme.shared;\n requires static lombok;\n exports com.acme.client.ui to x.y;\n uses a.b.C;\n}";
    let unit = parse_compilation_unit(text).expect("scan");
    let module = unit.module.expect("module");
    assert_eq!(module.name, "com.acme.client");
    assert_eq!(module.requires.len(), 2);
    assert!(module.requires[0].transitive);
    assert_eq!(module.requires[1].module, "lombok");
    assert!(!module.requires[1].transitive);
    assert_eq!(module.exports, ["com.acme.client.ui"]);
}

#[test]
fn scanner_reports_unbalanced_input() {
    let error = parse_compilation_unit("class A { void m() { ").expect_err("unbalanced");
    assert!(matches!(error, source::ScanError::UnexpectedEnd { .. }));
    let error = tokenize("String s = \"open").expect_err("unterminated");
    assert!(matches!(error, source::ScanError::Unterminated { what: "string", .. }));
}

#[test]
fn tokenizer_keeps_text_blocks_whole() {
    let text = "x = \"\"\"\n    a \"quoted\" }\n    b\"\"\"; // }";
    let tokens = tokenize(text).expect("tokens");
    let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        [TokenKind::Ident, TokenKind::Punct('='), TokenKind::TextBlock, TokenKind::Punct(';')]
    );
    assert_eq!(source::unescape_literal(&tokens[2], text), "a \"quoted\" }\nb");
}

#[test]
fn text_blocks_with_non_ascii_content() {
    let text = "package p;\npublic class C {\n  String s = \"\"\"\n      café \\é naïve\n      \"\"\";\n  String t = \"thé\";\n  void m() {\n  }\n}\n";
    let unit = parse_compilation_unit(text).expect("unit");
    let class = unit.find_type("C").expect("type C");
    assert!(class.declares("s"));
    assert!(class.declares("t"));
    assert!(class.declares("m"));
    assert_eq!(&text[class.body_close()..], "}\n");

    let tokens = tokenize("\"\"\"\nü\"\"\"").expect("tokens");
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].kind, TokenKind::TextBlock);
}

#[test]
fn overloads_are_distinct_members() {
    let existing = parse_compilation_unit(
        "class Page {\n  Row addRow() { return null; }\n  void setRows(Row[] rows) {}\n  String name;\n}\n",
    )
    .expect("existing");
    let template = parse_compilation_unit(
        "class Page {\n  Row addRow() { return null; }\n  Row addRow(int rowState) { return null; }\n  void setRows(p.Row[] rows) {}\n  void setRows(p.Row rows) {}\n  int name;\n}\n",
    )
    .expect("template");
    let existing = existing.find_type("Page").expect("existing Page");
    let template = template.find_type("Page").expect("template Page");

    let missing: Vec<(&str, usize)> = template
        .members
        .iter()
        .filter(|member| !existing.declares_member(member))
        .map(|member| (member.name.as_str(), member.parameters.len()))
        .collect();
    assert_eq!(missing, [("addRow", 1), ("setRows", 1)]);
    assert_eq!(
        template
            .members
            .iter()
            .filter(|member| member.kind == MemberKind::Method && !existing.declares_member(member))
            .filter_map(|member| member.parameters.first())
            .map(|parameter| parameter.dimensions)
            .collect::<Vec<_>>(),
        [0, 0]
    );
}

fn resolver(name: &str) -> Option<String> {
    match name {
        "FormData" => Some("org.eclipse.scout.rt.client.dto.FormData".into()),
        "SdkCommand" | "FormData.SdkCommand" => {
            Some("org.eclipse.scout.rt.client.dto.FormData.SdkCommand".into())
        }
        "Order" => Some("org.eclipse.scout.rt.platform.Order".into()),
        _ => None,
    }
}

#[test]
fn source_annotation_arguments_decode_to_values() {
    let context = NameContext {
        package: Some("com.acme.client".into()),
        ..NameContext::default()
    };
    let annotation = decode_source(
        "org.eclipse.scout.rt.client.dto.FormData",
        Some("value = PersonFormData.class, sdkCommand = FormData.SdkCommand.IGNORE, genericOrdinal = -1, interfaces = {A.class, java.io.Serializable.class}, label = \"a\" + \"b\", nested = @Order(10.5), flag = true, mask = 0x1F, raw = CONSTANT"),
        &context,
        &resolver,
    );

    assert_eq!(
        annotation.class_value("value").map(|t| t.name.as_str()),
        Some("com.acme.client.PersonFormData")
    );
    assert_eq!(
        annotation.get("sdkCommand"),
        Some(&AnnotationValue::Enum {
            type_name: "org.eclipse.scout.rt.client.dto.FormData.SdkCommand".into(),
            constant: "IGNORE".into(),
        })
    );
    assert_eq!(annotation.get("genericOrdinal"), Some(&AnnotationValue::Integer(-1)));
    let Some(AnnotationValue::Array(interfaces)) = annotation.get("interfaces") else {
        panic!("expected array");
    };
    assert_eq!(interfaces[1].as_class().map(|t| t.name.as_str()), Some("java.io.Serializable"));
    assert_eq!(annotation.get("label").and_then(AnnotationValue::as_str), Some("ab"));
    let Some(AnnotationValue::Annotation(order)) = annotation.get("nested") else {
        panic!("expected nested annotation");
    };
    assert_eq!(order.type_name, "org.eclipse.scout.rt.platform.Order");
    assert_eq!(order.value(), Some(&AnnotationValue::Float(10.5)));
    assert_eq!(annotation.get("flag"), Some(&AnnotationValue::Boolean(true)));
    assert_eq!(annotation.get("mask"), Some(&AnnotationValue::Integer(31)));
    assert_eq!(
        annotation.get("raw"),
        Some(&AnnotationValue::Unresolved("CONSTANT".into()))
    );
}

#[test]
fn single_value_and_marker_annotations() {
    let context = NameContext::default();
    let single = decode_source("a.Order", Some("42"), &context, &resolver);
    assert_eq!(single.value(), Some(&AnnotationValue::Integer(42)));
    let marker = decode_source("a.Marker", None, &context, &resolver);
    assert!(marker.elements.is_empty());
    let empty = decode_source("a.Marker", Some("  "), &context, &resolver);
    assert!(empty.elements.is_empty());
}

#[test]
fn unit_info_constructors_agree() {
    let folder = Path::new("/work/src/main/java");
    let by_package = CompilationUnitInfo::new(Some(folder), Some("com.acme"), "Person").expect("info");
    let by_path =
        CompilationUnitInfo::from_relative_path(folder, Path::new("com/acme/Person.java")).expect("info");

    assert_eq!(by_package, by_path);
    assert_eq!(by_package.file_name(), "Person.java");
    assert_eq!(by_package.package(), by_path.package());
    assert_eq!(by_package.target_directory(), by_path.target_directory());
    assert_eq!(by_package.target_file(), Path::new("/work/src/main/java/com/acme/Person.java"));
    assert_eq!(by_package.main_type_fqn(), "com.acme.Person");
    assert_eq!(by_package.unit_key(), UnitKey::new("com.acme", "Person.java"));
}

#[test]
fn unit_info_without_folder_or_package() {
    let info = CompilationUnitInfo::new(None, Some(""), "Main.java").expect("info");
    assert_eq!(info.package(), None);
    assert_eq!(info.source_folder(), None);
    assert_eq!(info.target_file(), Path::new("Main.java"));
    assert_eq!(info.main_type_fqn(), "Main");
    assert!(CompilationUnitInfo::new(None, None, " ").is_err());
}

#[test]
fn unit_info_equality_ignores_derived_fields() {
    let folder = Path::new("/work/src");
    let a = CompilationUnitInfo::new(Some(folder), Some("p"), "A.java").expect("info");
    let b = CompilationUnitInfo::new(Some(Path::new("/work/other")), Some("p"), "A.java").expect("info");
    assert_ne!(a, b);
}

#[test]
fn binary_candidates_replace_dots_from_the_right() {
    let candidates: Vec<String> = binary_candidates("a.Outer.Inner").collect();
    assert_eq!(candidates, ["a.Outer.Inner", "a.Outer$Inner", "a$Outer$Inner"]);
}

#[test_case("a.b.Outer$Inner", "a.b.Outer.Inner" ; "member class")]
#[test_case("a.b.Outer$1", "a.b.Outer$1" ; "anonymous class")]
#[test_case("a.b.$Proxy", "a.b.$Proxy" ; "leading dollar")]
fn binary_names_to_fqn(binary: &str, fqn: &str) {
    assert_eq!(binary_to_fqn(binary), fqn);
}

#[test]
fn manifest_attributes_select_version() {
    let manifest = "Manifest-Version: 1.0\r\nImplementation-Version: 22.0\r\n .3\r\n\r\nName: other\r\nImplementation-Version: 1.0\r\n";
    assert_eq!(manifest_version(manifest), Some(ApiVersion::new(vec![22, 0, 3])));
    let manifest = "Implementation-Version: 11.0.42-SNAPSHOT\nBundle-Version: 22.0\n";
    assert_eq!(manifest_version(manifest), Some(ApiVersion::new(vec![11, 0, 42])));
    assert_eq!(manifest_version("Manifest-Version: 1.0\n"), None);
}

#[test_case("org.eclipse.scout.rt.platform-22.0.5.jar", Some(vec![22, 0, 5]))]
#[test_case("scout-rt-platform-10.0.1-SNAPSHOT.jar", Some(vec![10, 0, 1]))]
#[test_case("platform.jar", None)]
fn archive_names_carry_versions(name: &str, expected: Option<Vec<u32>>) {
    assert_eq!(file_name_version(Path::new(name)), expected.map(ApiVersion::new));
}

#[test]
fn class_parser_rejects_foreign_bytes() {
    assert!(matches!(
        parse_class(b"PK\x03\x04rest"),
        Err(ClassParseError::InvalidMagic)
    ));
    assert!(matches!(
        parse_class(&[0xCA, 0xFE, 0xBA, 0xBE, 0, 0]),
        Err(ClassParseError::UnexpectedEof)
    ));
}

#[test]
fn type_refs_render_like_source() {
    let ty = TypeRef::new("java.util.Map")
        .with_arguments(vec![TypeRef::new("java.lang.String"), TypeRef::new("int").with_dimensions(1)]);
    assert_eq!(ty.to_string(), "java.util.Map<java.lang.String, int[]>");
    assert_eq!(ty.simple_name(), "Map");
    assert!(TypeRef::new("int").is_primitive());
}
