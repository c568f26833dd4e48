//! Middleware modules for the Atelier API
//!
//! - `idempotency`: Idempotency key handling for safe command retries
//!
//! The idempotency layer sits directly around the command routes so a
//! replayed request never reaches the interpreter, while health and spec
//! endpoints stay outside it.

pub mod idempotency;

pub use idempotency::{
    idempotency_middleware, IdempotencyConfig, IdempotencyError, IdempotencyState,
    IDEMPOTENCY_KEY_HEADER, IDEMPOTENCY_REPLAY_HEADER,
};
