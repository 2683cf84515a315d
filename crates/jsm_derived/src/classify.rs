use crate::MirrorConfig;
use jsm_model::{package_of, simple_name_of, Annotation, TypeDecl};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MirrorKind {
    Form,
    Page,
    Table,
}

impl MirrorKind {
    pub fn annotation<'c>(&self, config: &'c MirrorConfig) -> &'c str {
        match self {
            MirrorKind::Form => &config.form_data_annotation,
            MirrorKind::Page => &config.page_data_annotation,
            MirrorKind::Table => &config.data_annotation,
        }
    }
}

/// What to generate for one model type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorSpec {
    pub model_type: String,
    /// Fully qualified name of the mirror.
    pub mirror_type: String,
    /// Mirror of the nearest annotated super type, used as super class.
    pub super_mirror: Option<String>,
}

impl MirrorSpec {
    pub fn mirror_package(&self) -> &str {
        package_of(&self.mirror_type)
    }

    pub fn mirror_simple_name(&self) -> &str {
        simple_name_of(&self.mirror_type)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DerivedResource {
    FormMirror(MirrorSpec),
    PageMirror(MirrorSpec),
    TableMirror(MirrorSpec),
}

impl DerivedResource {
    pub fn kind(&self) -> MirrorKind {
        match self {
            DerivedResource::FormMirror(_) => MirrorKind::Form,
            DerivedResource::PageMirror(_) => MirrorKind::Page,
            DerivedResource::TableMirror(_) => MirrorKind::Table,
        }
    }

    pub fn spec(&self) -> &MirrorSpec {
        match self {
            DerivedResource::FormMirror(spec)
            | DerivedResource::PageMirror(spec)
            | DerivedResource::TableMirror(spec) => spec,
        }
    }

    pub fn spec_mut(&mut self) -> &mut MirrorSpec {
        match self {
            DerivedResource::FormMirror(spec)
            | DerivedResource::PageMirror(spec)
            | DerivedResource::TableMirror(spec) => spec,
        }
    }

    fn new(kind: MirrorKind, spec: MirrorSpec) -> Self {
        match kind {
            MirrorKind::Form => DerivedResource::FormMirror(spec),
            MirrorKind::Page => DerivedResource::PageMirror(spec),
            MirrorKind::Table => DerivedResource::TableMirror(spec),
        }
    }
}

/// Mirror named by the `kind` annotation among `annotations`, unless the
/// annotation is missing, has no class value or carries an ignored sdk command.
pub fn mirror_of(kind: MirrorKind, annotations: &[Arc<Annotation>], config: &MirrorConfig) -> Option<String> {
    let annotation = annotations
        .iter()
        .find(|annotation| annotation.type_name == kind.annotation(config))?;
    if let Some(command) = annotation.enum_value(&config.sdk_command_element) {
        if config.is_ignored_command(command) {
            return None;
        }
    }
    annotation.class_value("value").map(|ty| ty.name.clone())
}

/// Mirror a subtype should extend: the class value of the `kind` annotation
/// unless its sdk command is ignored for any reason other than reuse.
pub fn super_mirror_of(kind: MirrorKind, annotations: &[Arc<Annotation>], config: &MirrorConfig) -> Option<String> {
    let annotation = annotations
        .iter()
        .find(|annotation| annotation.type_name == kind.annotation(config))?;
    match annotation.enum_value(&config.sdk_command_element) {
        Some(command) if command != config.use_command && config.is_ignored_command(command) => None,
        _ => annotation.class_value("value").map(|ty| ty.name.clone()),
    }
}

/// Form, then page, then table; the first match wins.
pub fn classify(model: &TypeDecl, annotations: &[Arc<Annotation>], config: &MirrorConfig) -> Option<DerivedResource> {
    [MirrorKind::Form, MirrorKind::Page, MirrorKind::Table]
        .into_iter()
        .find_map(|kind| {
            let mirror_type = mirror_of(kind, annotations, config)?;
            Some(DerivedResource::new(
                kind,
                MirrorSpec {
                    model_type: model.fqn.clone(),
                    mirror_type,
                    super_mirror: None,
                },
            ))
        })
}
