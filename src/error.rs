use std::any::TypeId;

/// Error taxonomy for the engine's public entry points.
///
/// Nothing is recovered internally; there are no retries. Every fallible
/// operation fails loudly on the caller's thread without mutating the unit.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A caller-supplied argument violated a precondition (negative
    /// duration, out-of-range repeat count, a count exceeding a configured
    /// limit, `setProgress` outside `[0, 1]`, ...).
    #[error("bad argument: {0}")]
    BadArgument(String),

    /// An operation was attempted out of the order the engine requires
    /// (changing engine-wide limits after a unit exists, `cast` after
    /// initialization, ...).
    #[error("misuse: {0}")]
    MisuseOrder(String),

    /// A tween reached its first RUN entry without a registered accessor
    /// for its target's type.
    #[error("no accessor registered for type {type_id:?}")]
    MissingAccessor { type_id: TypeId },

    /// The state machine reached a branch that should be unreachable. This
    /// always indicates a bug in the engine, never caller misuse.
    #[error("internal invariant violated: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;
