use std::sync::Arc;
use std::time::Instant;

use tracing::debug;

use super::Middleware;
use crate::error::RouteError;
use crate::message::{Request, Response};

/// Ordered middleware list with last-added-outermost execution
#[derive(Clone, Default)]
pub struct MiddlewareStack {
    middleware: Vec<Arc<dyn Middleware>>,
}

impl MiddlewareStack {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `mw`; it wraps everything added before it
    pub fn add(&mut self, mw: Arc<dyn Middleware>) {
        self.middleware.push(mw);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.middleware.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.middleware.is_empty()
    }

    /// Middleware in insertion order (innermost first)
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Middleware>> {
        self.middleware.iter()
    }

    /// Run the chain around `kernel`
    ///
    /// `before` hooks run outermost first until one returns a response. The kernel runs
    /// only if none did. `after` hooks then run innermost first, for every middleware
    /// whose `before` ran. An error from the kernel skips the `after` hooks.
    pub fn call<K>(
        &self,
        request: &Request,
        response: Response,
        kernel: K,
    ) -> Result<Response, RouteError>
    where
        K: FnOnce(&Request, Response) -> Result<Response, RouteError>,
    {
        let start = Instant::now();
        let mut entered = 0;
        let mut early: Option<Response> = None;

        for (idx, mw) in self.middleware.iter().enumerate().rev() {
            entered += 1;
            if let Some(resp) = mw.before(request) {
                debug!(
                    middleware_idx = idx,
                    middleware_name = std::any::type_name_of_val(mw.as_ref()),
                    status = resp.status,
                    "Middleware returned early response"
                );
                early = Some(resp);
                break;
            }
        }

        let mut response = match early {
            Some(resp) => resp,
            None => kernel(request, response)?,
        };

        let latency = start.elapsed();
        let first_entered = self.middleware.len() - entered;
        for mw in &self.middleware[first_entered..] {
            mw.after(request, &mut response, latency);
        }

        Ok(response)
    }
}
