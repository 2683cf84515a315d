//! Runtime API levels known to the generators.

use jsm_api::{ApiCatalog, ApiFunction, ApiImplementation, ApiVersion};
use std::sync::Arc;

/// Base classes of the generated mirrors.
pub trait DtoApi: Send + Sync {
    fn abstract_form_data(&self) -> &str;
    fn abstract_value_field_data(&self) -> &str;
    fn abstract_table_page_data(&self) -> &str;
    fn abstract_table_row_data(&self) -> &str;

    /// Accessor a form mirror uses to look up its field data.
    fn field_accessor(&self) -> &str {
        "getFieldByClass"
    }
}

/// Annotation stamped on generated types. Not every level has one.
pub trait GeneratedAnnotationApi: Send + Sync {
    fn annotation_type(&self) -> &str;
}

struct ScoutDtoApi;

impl DtoApi for ScoutDtoApi {
    fn abstract_form_data(&self) -> &str {
        "org.eclipse.scout.rt.shared.data.form.AbstractFormData"
    }

    fn abstract_value_field_data(&self) -> &str {
        "org.eclipse.scout.rt.shared.data.form.fields.AbstractValueFieldData"
    }

    fn abstract_table_page_data(&self) -> &str {
        "org.eclipse.scout.rt.shared.data.page.AbstractTablePageData"
    }

    fn abstract_table_row_data(&self) -> &str {
        "org.eclipse.scout.rt.shared.data.basic.table.AbstractTableRowData"
    }
}

struct GeneratedAnnotation(&'static str);

impl GeneratedAnnotationApi for GeneratedAnnotation {
    fn annotation_type(&self) -> &str {
        self.0
    }
}

/// The three runtime API levels the generators target, oldest first.
pub fn builtin_catalog() -> ApiCatalog {
    let dto: Arc<dyn DtoApi> = Arc::new(ScoutDtoApi);
    let javax: Arc<dyn GeneratedAnnotationApi> = Arc::new(GeneratedAnnotation("javax.annotation.Generated"));
    let jakarta: Arc<dyn GeneratedAnnotationApi> = Arc::new(GeneratedAnnotation("jakarta.annotation.Generated"));

    ApiCatalog::default()
        .with(ApiImplementation::new("Scout 10.0", ApiVersion::new(vec![10, 0])).with_facet(Arc::clone(&dto)))
        .with(
            ApiImplementation::new("Scout 11.0", ApiVersion::new(vec![11, 0]))
                .with_facet(Arc::clone(&dto))
                .with_facet(javax),
        )
        .with(
            ApiImplementation::new("Scout 22.0", ApiVersion::new(vec![22, 0]))
                .with_facet(dto)
                .with_facet(jakarta),
        )
}

/// Fully qualified name of the `@Generated` annotation, absent on levels without one.
pub fn generated_annotation() -> ApiFunction<String> {
    ApiFunction::optional_facet::<dyn GeneratedAnnotationApi>(|api| api.annotation_type().to_string())
}
