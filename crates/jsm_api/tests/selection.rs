use jsm_api::{ApiCatalog, ApiError, ApiFunction, ApiImplementation, ApiSpecification, ApiVersion};
use std::sync::Arc;

trait NamingApi: Send + Sync {
    fn base_class(&self) -> &'static str;
}

trait RecordApi: Send + Sync {
    fn record_support(&self) -> bool;
}

struct Naming(&'static str);

impl NamingApi for Naming {
    fn base_class(&self) -> &'static str {
        self.0
    }
}

struct Records;

impl RecordApi for Records {
    fn record_support(&self) -> bool {
        true
    }
}

fn v(text: &str) -> ApiVersion {
    ApiVersion::parse(text).expect("version")
}

fn catalog() -> ApiCatalog {
    ApiCatalog::default()
        .with(
            ApiImplementation::new("v8", v("8"))
                .with_facet::<dyn NamingApi>(Arc::new(Naming("org.example.v8.Base"))),
        )
        .with(
            ApiImplementation::new("v11", v("11"))
                .with_facet::<dyn NamingApi>(Arc::new(Naming("org.example.v11.Base"))),
        )
        .with(
            ApiImplementation::new("v13", v("13"))
                .with_facet::<dyn NamingApi>(Arc::new(Naming("org.example.v13.Base")))
                .with_facet::<dyn RecordApi>(Arc::new(Records)),
        )
}

#[test]
fn latest_applicable_implementation_is_selected() {
    let catalog = catalog();
    let selected = |requested: &str| {
        ApiSpecification::create(catalog.implementations(), &v(requested))
            .map(|specification| specification.name().to_string())
    };

    assert_eq!(selected("14").as_deref(), Some("v13"));
    assert_eq!(selected("13").as_deref(), Some("v13"));
    assert_eq!(selected("12.9.9").as_deref(), Some("v11"));
    assert_eq!(selected("8.0.1").as_deref(), Some("v8"));
    assert_eq!(selected("4"), None);
}

#[test]
fn selection_does_not_depend_on_list_order() {
    let mut implementations = catalog().implementations().to_vec();
    implementations.reverse();
    let specification = ApiSpecification::create(&implementations, &v("12")).expect("spec");
    assert_eq!(specification.name(), "v11");
    assert_eq!(specification.requested_version(), &v("12"));
    assert_eq!(specification.min_version(), &v("11"));
}

#[test]
fn mandatory_facet_fails_when_missing() {
    let specification = catalog().specification(&v("11")).expect("spec");
    let naming = specification.api::<dyn NamingApi>().expect("naming facet");
    assert_eq!(naming.base_class(), "org.example.v11.Base");

    match specification.api::<dyn RecordApi>() {
        Err(ApiError::MissingFacet { api, .. }) => assert_eq!(api, "v11"),
        other => panic!("expected missing facet, got {:?}", other.map(|_| ())),
    }
    assert!(specification.opt_api::<dyn RecordApi>().is_none());
}

#[test]
fn constant_function_ignores_context() {
    let function = ApiFunction::value("fixed".to_string());
    assert!(!function.requires_context());
    let value = function.apply(&catalog(), None).expect("value");
    assert_eq!(value.as_deref(), Some("fixed"));
}

#[test]
fn facet_function_requires_context() {
    let function = ApiFunction::facet::<dyn NamingApi>(|api| api.base_class().to_string());
    assert!(function.requires_context());
    let error = function.apply(&catalog(), None).expect_err("context required");
    assert!(matches!(error, ApiError::MissingContext { .. }));
}

#[test]
fn facet_function_resolves_against_context_version() {
    let function = ApiFunction::facet::<dyn NamingApi>(|api| api.base_class().to_string());
    let version = v("13.2");
    let value = function.apply(&catalog(), Some(&version)).expect("value");
    assert_eq!(value.as_deref(), Some("org.example.v13.Base"));
}

#[test]
fn optional_facet_function_yields_absent_when_facet_missing() {
    let function = ApiFunction::optional_facet::<dyn RecordApi>(|api| api.record_support());
    let old = v("11");
    assert_eq!(function.apply(&catalog(), Some(&old)).expect("absent"), None);

    let below = v("2");
    assert_eq!(function.apply(&catalog(), Some(&below)).expect("absent"), None);

    let new = v("13");
    assert_eq!(function.apply(&catalog(), Some(&new)).expect("present"), Some(true));
}

#[test]
fn mandatory_facet_function_reports_missing_facet() {
    let function = ApiFunction::facet::<dyn RecordApi>(|api| api.record_support());
    let old = v("11");
    let error = function
        .apply(&catalog(), Some(&old))
        .expect_err("facet is mandatory");
    assert!(matches!(error, ApiError::MissingFacet { .. }));

    let below = v("4");
    let error = function
        .apply(&catalog(), Some(&below))
        .expect_err("no version applies");
    assert_eq!(
        error,
        ApiError::NoApplicableVersion {
            requested: "4".to_string()
        }
    );
}

#[test]
fn version_deserializes_from_toml_string() {
    #[derive(serde::Deserialize)]
    struct Declared {
        version: ApiVersion,
    }
    let declared: Declared = toml::from_str("version = \"22.0.5-SNAPSHOT\"").expect("toml");
    assert_eq!(declared.version, v("22.0.5"));
}
