//! vesupro-gen reference dispatcher.
//!
//! Executes the dispatch semantics of the generated Go code directly from
//! an [`vesupro_types::ApiModel`], without compiling anything. Used as the
//! golden reference for generated dispatchers in tests.

pub mod convert;
pub mod dispatch;
pub mod error;
pub mod tokens;
pub mod value;

pub use convert::{NumError, NumErrorKind};
pub use dispatch::{AggregateDecoder, Dispatcher, JsonDecoder, Receiver};
pub use error::{DispatchError, DispatchResult};
pub use tokens::{TokenSource, TokenStream};
pub use value::{Argument, Invocation, Value};
