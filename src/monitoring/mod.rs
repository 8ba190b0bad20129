/*!
 * Monitoring
 * Structured tracing initialization
 */

mod tracer;

pub use tracer::init_tracing;
