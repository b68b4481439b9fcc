//! vesupro-gen code generator: renders Go `Dispatch` routines from an
//! [`vesupro_types::ApiModel`].
//!
//! # Output
//!
//! One Go file per model. It starts with the generated-code marker, keeps
//! the package clause of the model and imports `fmt`, the vesupro runtime
//! and (only when a streamed dispatcher converts numbers) `strconv`.
//! Every receiver with at least one exported method gets
//!
//! ```go
//! func (r *T) Dispatch(methodName string, t vesupro.Tokenizer) (vesupro.VesuproObject, error)
//! ```
//!
//! or, with [`ArgumentSource::Listed`], a variant taking
//! `args []vesupro.Value`. Output is a pure function of the model.

pub mod dispatcher;
pub mod error;
pub mod writer;

pub use dispatcher::{
    generate, generate_with, is_reserved_name, ArgumentSource, GenerateOptions, DISPATCH_METHOD, GENERATED_MARKER,
    RUNTIME_IMPORT,
};
pub use error::{CodegenError, CodegenResult};
pub use writer::SourceWriter;
