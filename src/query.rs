//! jq filters over the aggregated result, evaluated with jaq.

use std::fmt;
use std::iter;

use jaq_core::Filter;
use jaq_core::load::{Arena, File, Loader};
use jaq_core::{Compiler, Ctx, Native, RcIter};
use jaq_json::Val;
use serde_json::Value;

use crate::error::QueryError;

/// Lazily produced results of running a [`Query`].
pub type Outputs<'a> = Box<dyn Iterator<Item = Result<Value, QueryError>> + 'a>;

/// A jq filter that parsed and compiled against the standard definitions.
pub struct Query {
    source: String,
    filter: Filter<Native<Val>>,
    inputs: RcIter<iter::Empty<Result<Val, String>>>,
}

impl fmt::Debug for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query").field("source", &self.source).finish()
    }
}

impl Query {
    /// Parses and compiles `source`. Unknown functions are rejected here, so a
    /// query that fails never produces output.
    pub fn parse(source: &str) -> Result<Self, QueryError> {
        let loader = Loader::new(jaq_std::defs().chain(jaq_json::defs()));
        let arena = Arena::default();
        let modules = loader
            .load(&arena, File { code: source, path: () })
            .map_err(|errors| {
                QueryError::Parse(describe(errors.into_iter().map(|(_, error)| error)))
            })?;
        let filter = Compiler::default()
            .with_funs(jaq_std::funs().chain(jaq_json::funs()))
            .compile(modules)
            .map_err(|errors| {
                QueryError::Parse(describe(errors.into_iter().map(|(_, error)| error)))
            })?;

        Ok(Query {
            source: source.to_string(),
            filter,
            inputs: RcIter::new(iter::empty()),
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn run(&self, input: Value) -> Outputs<'_> {
        let outputs = self
            .filter
            .run((Ctx::new([], &self.inputs), Val::from(input)))
            .map(|output| {
                output
                    .map(Value::from)
                    .map_err(|error| QueryError::Runtime(error.to_string()))
            });
        Box::new(outputs)
    }
}

fn describe<E: fmt::Debug>(errors: impl Iterator<Item = E>) -> String {
    errors
        .map(|error| format!("{:?}", error))
        .collect::<Vec<_>>()
        .join("; ")
}
