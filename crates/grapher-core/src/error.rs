//! Error types for the grapher engine.

use crate::host::EventSource;
use thiserror::Error;

/// A formula could not be parsed.
///
/// `position` is the byte offset of the offending token in the source text,
/// or the text length when input ended too early.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} at position {position}")]
pub struct ParseError {
    /// What went wrong.
    pub kind: ParseErrorKind,
    /// Byte offset into the formula text.
    pub position: usize,
}

impl ParseError {
    pub(crate) const fn new(kind: ParseErrorKind, position: usize) -> Self {
        Self { kind, position }
    }
}

/// Classification of parse failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    /// Nothing but whitespace.
    #[error("empty formula")]
    Empty,
    /// A character that starts no token.
    #[error("unexpected character '{0}'")]
    UnexpectedChar(char),
    /// A token in a place where it cannot appear.
    #[error("unexpected '{0}'")]
    UnexpectedToken(String),
    /// Input ended in the middle of an expression.
    #[error("unexpected end of formula")]
    UnexpectedEnd,
    /// Name that is neither `x`, a constant, nor a function.
    #[error("unknown name '{0}'")]
    UnknownIdentifier(String),
    /// Function called with the wrong number of arguments.
    #[error("'{name}' takes {expected} argument(s) but {found} were given")]
    Arity {
        /// Function name
        name: String,
        /// Declared argument count
        expected: usize,
        /// Supplied argument count
        found: usize,
    },
    /// A `(` or `|` without its closing partner.
    #[error("unclosed '{0}'")]
    Unbalanced(char),
    /// A numeric literal that does not fit an `f64`.
    #[error("invalid number '{0}'")]
    InvalidNumber(String),
    /// A function name used without an argument list.
    #[error("'{0}' needs parentheses")]
    MissingArguments(String),
    /// Nesting beyond the given number of levels.
    #[error("formula is nested more than {0} levels deep")]
    TooDeep(usize),
}

/// Evaluation is undefined at the requested input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DomainError {
    /// Division or remainder by zero.
    #[error("division by zero")]
    DivisionByZero,
    /// Argument outside the real domain of a function.
    #[error("{function} is undefined for this argument")]
    OutOfDomain {
        /// Function name
        function: &'static str,
    },
    /// Result overflowed or is not a real number.
    #[error("result is not a finite number")]
    NonFinite,
}

/// The session could not be started.
#[derive(Debug, Error)]
pub enum StartupError {
    /// No element with the requested id.
    #[error("canvas '{0}' not found")]
    CanvasNotFound(String),
    /// The element exists but is not a canvas.
    #[error("element '{0}' is not a canvas")]
    NotACanvas(String),
    /// The canvas has no usable 2d context.
    #[error("2d context unavailable: {0}")]
    ContextUnavailable(String),
    /// Window or document missing.
    #[error("host environment unavailable: {0}")]
    HostUnavailable(String),
    /// A callback could not be installed.
    #[error("failed to register {event:?} callback: {reason}")]
    Registration {
        /// Event source that failed
        event: EventSource,
        /// Host-provided reason
        reason: String,
    },
    /// A session is already bound to this canvas.
    #[error("canvas '{0}' already has a running grapher")]
    AlreadyRunning(String),
    /// Configuration rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The initial frame could not be drawn.
    #[error("initial render failed: {0}")]
    InitialRender(#[from] RenderError),
}

/// A frame could not be committed to the drawing surface.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// The surface is gone or lost its context.
    #[error("surface unavailable: {0}")]
    SurfaceUnavailable(String),
    /// The surface has zero width or height.
    #[error("surface has zero size")]
    EmptySurface,
    /// A drawing call was rejected by the surface.
    #[error("draw call failed: {0}")]
    DrawFailed(String),
}

/// Configuration could not be loaded.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Malformed JSON.
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// A field holds an unusable value.
    #[error("invalid value for '{field}': {message}")]
    InvalidValue {
        /// Field name
        field: &'static str,
        /// Error message
        message: String,
    },
}

/// Umbrella error for engine operations.
#[derive(Debug, Error)]
pub enum GraphError {
    /// Formula rejected
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// Evaluation undefined
    #[error(transparent)]
    Domain(#[from] DomainError),
    /// Startup failed
    #[error(transparent)]
    Startup(#[from] StartupError),
    /// Frame not drawn
    #[error(transparent)]
    Render(#[from] RenderError),
    /// Bad configuration
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Viewport bounds or size violate its invariant.
    #[error("invalid viewport: {0}")]
    InvalidViewport(String),
    /// No function slot at this index.
    #[error("function index {index} out of range (have {len})")]
    FunctionIndex {
        /// Requested index
        index: usize,
        /// Number of slots
        len: usize,
    },
    /// All function slots are in use.
    #[error("function limit of {0} reached")]
    FunctionLimit(usize),
}
