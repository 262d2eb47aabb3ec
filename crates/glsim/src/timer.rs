//! Timer queries.
//!
//! A context runs at most one timer query at a time. Results are wall-clock
//! durations measured between [`TimerQueries::begin`] and
//! [`TimerQueries::finish`].

use crate::context::Context;
use crate::error::{GlError, GlResult};
use crate::object::{TimerQuery, kind};
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
pub(crate) struct TimerQueryRecord {
    started: Option<Instant>,
    elapsed: Option<Duration>,
}

/// Timer query operations of one context.
pub struct TimerQueries<'a> {
    context: &'a mut Context,
}

impl<'a> TimerQueries<'a> {
    pub(crate) fn new(context: &'a mut Context) -> Self {
        Self { context }
    }

    pub fn allocate(&mut self) -> GlResult<TimerQuery> {
        self.context.check_live()?;
        let query = self
            .context
            .insert::<kind::TimerQuery>(TimerQueryRecord::default());
        tracing::debug!("allocate {}", query);
        Ok(query)
    }

    /// Start timing. Fails if any query of this context is running.
    pub fn begin(&mut self, query: &TimerQuery) -> GlResult<()> {
        self.context.check_usable(query)?;
        if let Some(running) = self.context.bindings.running_query {
            return Err(GlError::QueryAlreadyRunning {
                running: running.to_string(),
            });
        }
        self.context.objects_mut().get_mut(query)?.started = Some(Instant::now());
        self.context.bindings.running_query = Some(*query);
        tracing::trace!("begin {}", query);
        Ok(())
    }

    /// Stop timing and record the elapsed time.
    pub fn finish(&mut self, query: &TimerQuery) -> GlResult<()> {
        self.context.check_usable(query)?;
        if self.context.bindings.running_query != Some(*query) {
            return Err(GlError::QueryNotRunning {
                query: query.to_string(),
            });
        }
        {
            let mut objects = self.context.objects_mut();
            let record = objects.get_mut(query)?;
            record.elapsed = record.started.take().map(|started| started.elapsed());
        }
        self.context.bindings.running_query = None;
        tracing::trace!("finish {}", query);
        Ok(())
    }

    pub fn is_running(&self, query: &TimerQuery) -> GlResult<bool> {
        self.context.check_usable(query)?;
        Ok(self.context.bindings.running_query == Some(*query))
    }

    /// Whether the query has finished at least once.
    pub fn result_available(&self, query: &TimerQuery) -> GlResult<bool> {
        self.context.check_usable(query)?;
        self.context
            .objects()
            .get(query)
            .map(|record| record.elapsed.is_some())
    }

    /// Elapsed time of the last completed run, in nanoseconds.
    pub fn result(&self, query: &TimerQuery) -> GlResult<u64> {
        self.context.check_usable(query)?;
        let elapsed = self.context.objects().get(query)?.elapsed;
        elapsed
            .map(|elapsed| u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX))
            .ok_or_else(|| GlError::QueryResultUnavailable {
                query: query.to_string(),
            })
    }

    /// Delete a query. A running query is stopped without a result.
    pub fn delete(&mut self, query: TimerQuery) -> GlResult<()> {
        self.context.check_usable(&query)?;
        if self.context.bindings.running_query == Some(query) {
            self.context.bindings.running_query = None;
        }
        self.context.objects_mut().remove(&query)?;
        tracing::debug!("delete {}", query);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{Context, ContextDescriptor, GlErrorKind};

    #[test]
    fn test_query_lifecycle() {
        let mut context = Context::new(ContextDescriptor::default());
        let mut queries = context.timer_queries();
        let query = queries.allocate().unwrap();
        assert!(!queries.result_available(&query).unwrap());
        assert_eq!(
            queries.result(&query).unwrap_err().kind(),
            GlErrorKind::QueryResultUnavailable
        );

        queries.begin(&query).unwrap();
        assert!(queries.is_running(&query).unwrap());
        queries.finish(&query).unwrap();
        assert!(queries.result_available(&query).unwrap());
        assert!(queries.result(&query).is_ok());
    }

    #[test]
    fn test_one_query_at_a_time() {
        let mut context = Context::new(ContextDescriptor::default());
        let mut queries = context.timer_queries();
        let first = queries.allocate().unwrap();
        let second = queries.allocate().unwrap();
        queries.begin(&first).unwrap();
        assert_eq!(
            queries.begin(&second).unwrap_err().kind(),
            GlErrorKind::QueryAlreadyRunning
        );
        assert_eq!(
            queries.finish(&second).unwrap_err().kind(),
            GlErrorKind::QueryNotRunning
        );
    }

    #[test]
    fn test_delete_stops_running_query() {
        let mut context = Context::new(ContextDescriptor::default());
        let mut queries = context.timer_queries();
        let first = queries.allocate().unwrap();
        let second = queries.allocate().unwrap();
        queries.begin(&first).unwrap();
        queries.delete(first).unwrap();
        queries.begin(&second).unwrap();
        assert_eq!(
            queries.begin(&first).unwrap_err().kind(),
            GlErrorKind::Deleted
        );
    }
}
