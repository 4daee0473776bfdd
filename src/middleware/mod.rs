//! Middleware layer.
//!
//! Cross-cutting concerns applied to every dispatched request, independent of
//! which handler (if any) the router picked.

mod trace;

pub(crate) use trace::trace;
