//! Ribosome - Code Generation Runtime
//!
//! Expands text fragments containing embedded expressions, `@{ ... }`, into
//! generated output. Expressions are evaluated by an [`Evaluator`], and may
//! themselves emit text while they run, which then takes the place of the
//! expression. Expanded text is collected on a [`Stack`] of buffers and
//! flushed to a [`Sink`], which is either standard output or a file.
//!
//! The [`Engine`] is the built-in `Evaluator`, and templates that mix host
//! lines with output lines are read by [`Program`].
mod adjust;
mod compile;
mod data;
mod dna;
mod engine;
mod eval;
mod evaluate;
mod format;
mod log;
mod region;
mod scan;
mod session;
mod sink;
mod stack;
mod store;

pub mod filter;
pub mod function;

pub use adjust::adjust;
pub use compile::{compile, tree, Operator, Parser, Token};
pub use data::open_root;
pub use dna::{Instruction, Program};
pub use engine::Engine;
pub use eval::{is_truthy, Interpreter};
pub use evaluate::{Evaluation, Evaluator};
pub use filter::Filter;
pub use format::render_value;
pub use function::{Emitter, Function};
pub use log::{error_io, Error, Pointer, Visual};
pub use region::Region;
pub use scan::Scanner;
pub use session::Session;
pub use sink::Sink;
pub use stack::Stack;
pub use store::{Shadow, Store};
