use crate::builder::SourceBuilder;
use crate::{DerivedResourceError, MirrorKind, SourceGenerator};
use jsm_model::source::{parse_compilation_unit, ScanError, SourceType, Span};
use jsm_model::{CompilationUnitInfo, TypeRef};
use std::sync::Arc;

const INDENT: &str = "  ";
const GENERATED_COMMENT: &str = "This class is auto generated. No manual modifications recommended.";

/// One value field of a form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldData {
    /// Simple name of the form field type, e.g. `NameField`.
    pub field_type: String,
    pub value_type: Option<TypeRef>,
}

impl FieldData {
    /// `NameField` becomes `Name`.
    pub fn data_name(&self) -> &str {
        match self.field_type.strip_suffix("Field") {
            Some(stripped) if !stripped.is_empty() => stripped,
            _ => &self.field_type,
        }
    }
}

/// One column of a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnData {
    /// Simple name of the column type, e.g. `NameColumn`.
    pub column_type: String,
    pub value_type: Option<TypeRef>,
}

impl ColumnData {
    /// `NameColumn` becomes `name`.
    pub fn property(&self) -> String {
        let base = match self.column_type.strip_suffix("Column") {
            Some(stripped) if !stripped.is_empty() => stripped,
            _ => &self.column_type,
        };
        let mut chars = base.chars();
        match chars.next() {
            Some(first) => first.to_lowercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    fn accessor_suffix(&self) -> String {
        let property = self.property();
        let mut chars = property.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MirrorContent {
    Form { fields: Vec<FieldData> },
    Page { columns: Vec<ColumnData> },
    Table { columns: Vec<ColumnData> },
}

impl MirrorContent {
    pub fn kind(&self) -> MirrorKind {
        match self {
            MirrorContent::Form { .. } => MirrorKind::Form,
            MirrorContent::Page { .. } => MirrorKind::Page,
            MirrorContent::Table { .. } => MirrorKind::Table,
        }
    }
}

/// Everything needed to render a mirror without looking at the model again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorTemplate {
    pub package: String,
    pub simple_name: String,
    pub model_type: String,
    pub super_class: String,
    pub generated_annotation: Option<String>,
    pub value_field_data: String,
    pub table_row_data: String,
    pub field_accessor: String,
    pub content: MirrorContent,
}

impl MirrorTemplate {
    /// Nested row type of a page mirror: `PersonTablePageData` has `PersonTableRowData`.
    pub fn row_type_name(&self) -> String {
        match self.simple_name.strip_suffix("PageData") {
            Some(stem) => format!("{stem}RowData"),
            None => format!("{}RowData", self.simple_name),
        }
    }
}

/// Full text of a new mirror compilation unit.
pub fn render(template: &MirrorTemplate) -> String {
    let mut out = SourceBuilder::new(INDENT);
    if !template.package.is_empty() {
        out.line(&format!("package {};", template.package));
        out.blank();
    }
    out.line("/**");
    out.line(&format!(" * {GENERATED_COMMENT}"));
    out.line(" */");
    if let Some(annotation) = &template.generated_annotation {
        out.line(&format!(
            "@{annotation}(value = \"{}\", comments = \"{GENERATED_COMMENT}\")",
            template.model_type
        ));
    }
    out.open(&format!(
        "public class {} extends {}",
        template.simple_name, template.super_class
    ));
    serial_version(&mut out);

    match &template.content {
        MirrorContent::Form { fields } => render_form(&mut out, template, fields),
        MirrorContent::Page { columns } => render_page(&mut out, template, columns),
        MirrorContent::Table { columns } => render_row_members(&mut out, columns),
    }

    out.close();
    out.build()
}

fn serial_version(out: &mut SourceBuilder) {
    out.line("private static final long serialVersionUID = 1L;");
}

fn render_form(out: &mut SourceBuilder, template: &MirrorTemplate, fields: &[FieldData]) {
    for field in fields {
        let name = field.data_name();
        out.blank();
        out.method(
            &[],
            &format!("public {name} get{name}()"),
            &format!("return {}({name}.class);", template.field_accessor),
        );
    }
    for field in fields {
        let value_type = type_text(field.value_type.as_ref());
        out.blank();
        out.open(&format!(
            "public static class {} extends {}<{value_type}>",
            field.data_name(),
            template.value_field_data
        ));
        serial_version(out);
        out.close();
    }
}

fn render_page(out: &mut SourceBuilder, template: &MirrorTemplate, columns: &[ColumnData]) {
    let row = template.row_type_name();
    let overrides = ["@Override"];
    out.blank();
    out.method(&overrides, &format!("public {row} addRow()"), &format!("return ({row}) super.addRow();"));
    out.blank();
    out.method(
        &overrides,
        &format!("public {row} addRow(int rowState)"),
        &format!("return ({row}) super.addRow(rowState);"),
    );
    out.blank();
    out.method(&overrides, &format!("public {row} createRow()"), &format!("return new {row}();"));
    out.blank();
    out.method(
        &overrides,
        &format!("public java.lang.Class<? extends {}> getRowType()", template.table_row_data),
        &format!("return {row}.class;"),
    );
    out.blank();
    out.method(&overrides, &format!("public {row}[] getRows()"), &format!("return ({row}[]) super.getRows();"));
    out.blank();
    out.method(
        &overrides,
        &format!("public {row} rowAt(int index)"),
        &format!("return ({row}) super.rowAt(index);"),
    );
    out.blank();
    out.method(&[], &format!("public void setRows({row}[] rows)"), "super.setRows(rows);");

    out.blank();
    out.open(&format!("public static class {row} extends {}", template.table_row_data));
    serial_version(out);
    render_row_members(out, columns);
    out.close();
}

fn render_row_members(out: &mut SourceBuilder, columns: &[ColumnData]) {
    for column in columns {
        let property = column.property();
        out.line(&format!("public static final java.lang.String {property} = \"{property}\";"));
    }
    for column in columns {
        out.line(&format!(
            "private {} m_{};",
            type_text(column.value_type.as_ref()),
            column.property()
        ));
    }
    for column in columns {
        let value_type = type_text(column.value_type.as_ref());
        let property = column.property();
        let suffix = column.accessor_suffix();
        out.blank();
        out.method(&[], &format!("public {value_type} get{suffix}()"), &format!("return m_{property};"));
        out.blank();
        out.method(
            &[],
            &format!("public void set{suffix}({value_type} new{suffix})"),
            &format!("m_{property} = new{suffix};"),
        );
    }
}

fn type_text(ty: Option<&TypeRef>) -> String {
    ty.map_or_else(|| "java.lang.Object".to_string(), ToString::to_string)
}

/// Insert every member of the generated mirror that `existing` does not
/// declare yet. Member types present on both sides are merged the same way,
/// so each addition lands before the closing brace of its own type.
/// Members already present, generated or hand-written, are left untouched.
pub fn merge(existing: &str, generated: &str, mirror_type: &str) -> Result<String, DerivedResourceError> {
    let scan_error = |source: ScanError| DerivedResourceError::Merge {
        mirror: mirror_type.to_string(),
        source,
    };
    let not_declared = || DerivedResourceError::MirrorNotDeclared {
        mirror: mirror_type.to_string(),
    };
    let simple_name = jsm_model::simple_name_of(mirror_type);

    let existing_unit = parse_compilation_unit(existing).map_err(scan_error)?;
    let generated_unit = parse_compilation_unit(generated).map_err(scan_error)?;
    let target = existing_unit.find_type(simple_name).ok_or_else(not_declared)?;
    let template = generated_unit.find_type(simple_name).ok_or_else(not_declared)?;

    let mut insertions = Vec::new();
    collect_insertions(target, template, 0, &mut insertions);
    if insertions.is_empty() {
        return Ok(existing.to_string());
    }
    insertions.sort_by_key(|insertion| insertion.close);

    let mut merged = String::with_capacity(existing.len() + generated.len());
    let mut cursor = 0;
    for insertion in &insertions {
        merged.push_str(existing[cursor..insertion.close].trim_end());
        merged.push('\n');
        for span in &insertion.spans {
            merged.push('\n');
            push_indent(&mut merged, insertion.depth + 1);
            merged.push_str(&generated[span.start..span.end]);
            merged.push('\n');
        }
        push_indent(&mut merged, insertion.depth);
        cursor = insertion.close;
    }
    merged.push_str(&existing[cursor..]);
    Ok(merged)
}

/// Generated declarations to add before the closing brace at `close`.
struct Insertion {
    close: usize,
    depth: usize,
    spans: Vec<Span>,
}

fn collect_insertions(target: &SourceType, template: &SourceType, depth: usize, out: &mut Vec<Insertion>) {
    let mut spans: Vec<Span> = template
        .members
        .iter()
        .filter(|member| !target.declares_member(member))
        .map(|member| member.span)
        .chain(
            template
                .nested
                .iter()
                .filter(|nested| target.nested_type(&nested.name).is_none())
                .map(|nested| nested.span),
        )
        .collect();
    spans.sort_by_key(|span| span.start);
    spans.dedup();
    if !spans.is_empty() {
        out.push(Insertion {
            close: target.body_close(),
            depth,
            spans,
        });
    }

    for nested in &template.nested {
        if let Some(existing) = target.nested_type(&nested.name) {
            collect_insertions(existing, nested, depth + 1, out);
        }
    }
}

fn push_indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}

/// Renders a mirror and merges it into the existing unit, if any.
#[derive(Debug, Clone)]
pub struct MirrorGenerator {
    mirror_type: String,
    template: MirrorTemplate,
    unit: CompilationUnitInfo,
    existing: Option<Arc<str>>,
}

impl MirrorGenerator {
    pub fn new(
        mirror_type: impl Into<String>,
        template: MirrorTemplate,
        unit: CompilationUnitInfo,
        existing: Option<Arc<str>>,
    ) -> Self {
        Self {
            mirror_type: mirror_type.into(),
            template,
            unit,
            existing,
        }
    }

    pub fn template(&self) -> &MirrorTemplate {
        &self.template
    }

    pub fn existing(&self) -> Option<&str> {
        self.existing.as_deref()
    }
}

impl SourceGenerator for MirrorGenerator {
    fn type_name(&self) -> &str {
        &self.mirror_type
    }

    fn unit(&self) -> &CompilationUnitInfo {
        &self.unit
    }

    fn generate(&self) -> Result<String, DerivedResourceError> {
        let generated = render(&self.template);
        match &self.existing {
            Some(existing) => merge(existing, &generated, &self.mirror_type),
            None => Ok(generated),
        }
    }
}
