//! Generator configuration.

use crate::dialect::Dialect;
use crate::monitor::QueryHook;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Settings shared by the generators of one service.
///
/// Cheap to clone; pass one into every [`Generator`](crate::Generator) instead
/// of keeping process-wide state.
#[derive(Clone, Default)]
pub struct GeneratorConfig {
    /// Literal escaping and LIKE conventions.
    pub dialect: Dialect,
    /// Upper bound for a single execute call.
    pub query_timeout: Option<Duration>,
    /// Observer for executed statements.
    pub hook: Option<Arc<dyn QueryHook>>,
}

impl GeneratorConfig {
    /// Create a new configuration with defaults (Postgres, no timeout, no hook).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the dialect.
    pub fn dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// Set the per-call timeout.
    pub fn query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = Some(timeout);
        self
    }

    /// Install a hook.
    pub fn hook(mut self, hook: impl QueryHook + 'static) -> Self {
        self.hook = Some(Arc::new(hook));
        self
    }

    /// Log every statement through `tracing`.
    #[cfg(feature = "tracing")]
    pub fn with_tracing(self) -> Self {
        self.hook(crate::monitor::TracingSqlHook::default())
    }
}

impl fmt::Debug for GeneratorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratorConfig")
            .field("dialect", &self.dialect)
            .field("query_timeout", &self.query_timeout)
            .field("hook", &self.hook.is_some())
            .finish()
    }
}
