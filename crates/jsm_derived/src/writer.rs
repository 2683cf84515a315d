use crate::{DerivedResourceError, InFlightGuard, ProgressToken};
use futures::future::BoxFuture;
use jsm_classpath::ClasspathEntry;
use jsm_model::CompilationUnitInfo;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

/// Produces the text of one compilation unit.
pub trait SourceGenerator: Send + Sync + fmt::Debug {
    /// Fully qualified name of the primary type of the unit.
    fn type_name(&self) -> &str;

    fn unit(&self) -> &CompilationUnitInfo;

    fn generate(&self) -> Result<String, DerivedResourceError>;
}

/// A type whose compilation unit was written.
#[derive(Debug, Clone)]
pub struct GeneratedType {
    pub type_name: String,
    pub entry: ClasspathEntry,
    pub unit: CompilationUnitInfo,
}

pub type WriteFuture = BoxFuture<'static, Result<GeneratedType, DerivedResourceError>>;

/// Persists generated units. The execution substrate of the returned future
/// belongs to the implementation.
pub trait CompilationUnitWriter: Send + Sync {
    fn write(&self, generator: Box<dyn SourceGenerator>, target: &ClasspathEntry, progress: ProgressToken) -> WriteFuture;
}

/// A scheduled write. Holds the generation slot of its model type until the
/// write completes or the handle is dropped.
pub struct WriteHandle {
    model_type: String,
    mirror_type: String,
    future: WriteFuture,
    guard: Option<InFlightGuard>,
}

impl WriteHandle {
    pub(crate) fn new(model_type: String, mirror_type: String, future: WriteFuture, guard: InFlightGuard) -> Self {
        Self {
            model_type,
            mirror_type,
            future,
            guard: Some(guard),
        }
    }

    pub fn model_type(&self) -> &str {
        &self.model_type
    }

    pub fn mirror_type(&self) -> &str {
        &self.mirror_type
    }
}

impl Future for WriteHandle {
    type Output = Result<GeneratedType, DerivedResourceError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        let output = this.future.as_mut().poll(cx);
        if output.is_ready() {
            this.guard.take();
        }
        output
    }
}

impl fmt::Debug for WriteHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WriteHandle")
            .field("model_type", &self.model_type)
            .field("mirror_type", &self.mirror_type)
            .field("pending", &self.guard.is_some())
            .finish()
    }
}
