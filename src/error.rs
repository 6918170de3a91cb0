use std::sync::atomic::{AtomicBool, Ordering};

use crate::object::Object;
use crate::token::{Location, Token, Type};

static HAD_ERROR: AtomicBool = AtomicBool::new(false);
static HAD_RUNTIME_ERROR: AtomicBool = AtomicBool::new(false);

/// Checks if any error occurred during scanning, parsing, resolving or
/// interpreting.
pub fn did_error() -> bool {
    did_static_error() || did_runtime_error()
}

/// Checks if an error occurred before execution started.
pub fn did_static_error() -> bool {
    HAD_ERROR.load(Ordering::Relaxed)
}

/// Checks if an error occurred during execution.
pub fn did_runtime_error() -> bool {
    HAD_RUNTIME_ERROR.load(Ordering::Relaxed)
}

/// Resets the error flags.
/// This is used to recover the interpreter between prompt lines.
pub fn reset_error() {
    HAD_ERROR.store(false, Ordering::Relaxed);
    HAD_RUNTIME_ERROR.store(false, Ordering::Relaxed);
}

/// Every error type must implement this trait.
pub trait Error {
    /// Prints the error message and sets the matching error flag.
    fn throw(&self);
}

/// Reports a static error at a token, in the shared
/// `[line L] Error at ...: message` shape.
fn report_at_token(token: &Token, message: &str) {
    if token.r#type == Type::EOF {
        eprintln!("[line {}] Error at end: {}", token.location.line, message);
    } else {
        eprintln!("[line {}] Error at '{}': {}", token.location.line, token.lexeme, message);
    }

    HAD_ERROR.store(true, Ordering::Relaxed);
}

/// Represents an error that occurs during scanning.
#[derive(Debug)]
pub struct ScanError {
    pub location: Location,
    pub message: String,
}

impl Error for ScanError {
    fn throw(&self) {
        eprintln!("[line {}] Error: {}", self.location.line, self.message);

        HAD_ERROR.store(true, Ordering::Relaxed);
    }
}

/// Represents an error that occurs during parsing.
#[derive(Debug)]
pub struct ParseError {
    pub token: Token,
    pub message: String,
}

impl Error for ParseError {
    fn throw(&self) {
        report_at_token(&self.token, &self.message);
    }
}

/// Represents an error that occurs during resolution.
#[derive(Debug)]
pub struct ResolveError {
    pub token: Token,
    pub message: String,
}

impl Error for ResolveError {
    fn throw(&self) {
        report_at_token(&self.token, &self.message);
    }
}

/// Represents an error that occurs during runtime.
#[derive(Debug)]
pub struct RuntimeError {
    pub token: Token,
    pub message: String,
}

impl Error for RuntimeError {
    fn throw(&self) {
        eprintln!("{} [line {}]", self.message, self.token.location.line);

        HAD_RUNTIME_ERROR.store(true, Ordering::Relaxed);
    }
}

/// A signal unwinding through statement execution.
///
/// A `return` statement unwinds with the returned value and is caught at the
/// nearest function call boundary. Runtime errors unwind all the way to the
/// top of the statement list, where they are reported.
#[derive(Debug)]
pub enum Unwind {
    Return(Object),
    Error(RuntimeError),
}

impl From<RuntimeError> for Unwind {
    fn from(error: RuntimeError) -> Self {
        Unwind::Error(error)
    }
}
