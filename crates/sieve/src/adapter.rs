//! Host adapter boundary.
//!
//! A host renders exactly one consumer of the engine's published state.
//! [`mount`] enforces that arity, subscribes the consumer and hands it the
//! initial state; every later mutation reaches it through the engine's
//! observer slot.

use tracing::debug;

use crate::engine::{Engine, Observer};
use crate::error::{Result, SieveError};
use crate::record::Record;

/// Attaches the single consumer to `engine` and publishes the initial state.
///
/// Fails with [`SieveError::ExactlyOneConsumer`] for zero or several
/// consumers, in which case nothing is subscribed.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use sieve::{adapter, Engine, EngineConfig, Observer, PublishedState};
///
/// type Json = serde_json::Value;
///
/// let mut engine = Engine::new(EngineConfig::new(vec![json!({"type": "a"})])).unwrap();
/// let consumer: Box<dyn Observer<Json>> = Box::new(|state: &PublishedState<'_, Json>| {
///     assert_eq!(state.collection.len(), 1);
/// });
/// adapter::mount(&mut engine, vec![consumer]).unwrap();
/// ```
pub fn mount<R, I>(engine: &mut Engine<R>, consumers: I) -> Result<()>
where
    R: Record,
    I: IntoIterator<Item = Box<dyn Observer<R>>>,
{
    let mut consumers: Vec<Box<dyn Observer<R>>> = consumers.into_iter().collect();
    let consumer = match consumers.len() {
        1 => consumers.remove(0),
        found => return Err(SieveError::ExactlyOneConsumer { found }),
    };

    engine.subscribe_boxed(consumer);
    debug!("consumer mounted");
    engine.publish();
    Ok(())
}
