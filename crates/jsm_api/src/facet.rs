use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Capabilities offered by one API implementation, keyed by facet type.
///
/// A facet is usually a trait object type (`dyn FormDataApi`); it is stored as
/// `Arc<F>` and handed out as clones of that `Arc`.
#[derive(Default)]
pub struct FacetSet {
    facets: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
    names: Vec<&'static str>,
}

impl FacetSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<F>(&mut self, facet: Arc<F>)
    where
        F: ?Sized + Send + Sync + 'static,
    {
        if self.facets.insert(TypeId::of::<F>(), Box::new(facet)).is_none() {
            self.names.push(type_name::<F>());
        }
    }

    pub fn get<F>(&self) -> Option<Arc<F>>
    where
        F: ?Sized + Send + Sync + 'static,
    {
        self.facets
            .get(&TypeId::of::<F>())
            .and_then(|boxed| boxed.downcast_ref::<Arc<F>>())
            .cloned()
    }

    pub fn contains<F>(&self) -> bool
    where
        F: ?Sized + 'static,
    {
        self.facets.contains_key(&TypeId::of::<F>())
    }

    pub fn len(&self) -> usize {
        self.facets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facets.is_empty()
    }

    pub fn names(&self) -> &[&'static str] {
        &self.names
    }
}

impl fmt::Debug for FacetSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names.iter()).finish()
    }
}
