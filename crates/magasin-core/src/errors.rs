use magasin_core_types::{RequestContext, RequestId, TraceId};
use thiserror::Error;

/// Result type alias using MagasinError
pub type Result<T> = std::result::Result<T, MagasinError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Every failure surfaced by the repositories maps onto one of these kinds,
/// each with a stable code usable by callers and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Structural/Validation
    InvalidInput,
    InvalidQuantity,
    NotFound,
    AlreadyExists,
    /// Foreign key, uniqueness or check constraint rejected by the store
    ConstraintViolation,
    /// In-memory state disagrees with the stored rows mid-operation
    InvariantViolation,

    // Integration/IO
    Io,
    Serialization,
    Persistence,
    Configuration,
    Migration,
    Seed,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::InvalidQuantity => "ERR_INVALID_QUANTITY",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::AlreadyExists => "ERR_ALREADY_EXISTS",
            ExErrorKind::ConstraintViolation => "ERR_CONSTRAINT_VIOLATION",
            ExErrorKind::InvariantViolation => "ERR_INVARIANT_VIOLATION",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::Configuration => "ERR_CONFIGURATION",
            ExErrorKind::Migration => "ERR_MIGRATION",
            ExErrorKind::Seed => "ERR_SEED",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Carries a classification plus the context needed to debug a failed
/// persistence operation: which operation, which table/entity, which row.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    entity: Option<String>,
    entity_id: Option<String>,
    request_id: Option<RequestId>,
    trace_id: Option<TraceId>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            entity: None,
            entity_id: None,
            request_id: None,
            trace_id: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add entity (table) context
    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }

    /// Add entity ID context
    pub fn with_entity_id(mut self, id: impl ToString) -> Self {
        self.entity_id = Some(id.to_string());
        self
    }

    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    pub fn with_trace_id(mut self, trace_id: TraceId) -> Self {
        self.trace_id = Some(trace_id);
        self
    }

    /// Attach the request id and, when present, the trace id of a context
    pub fn with_context(self, ctx: &RequestContext) -> Self {
        let err = self.with_request_id(ctx.request_id.clone());
        match &ctx.trace_id {
            Some(trace_id) => err.with_trace_id(trace_id.clone()),
            None => err,
        }
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn entity(&self) -> Option<&str> {
        self.entity.as_deref()
    }

    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }

    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    pub fn trace_id(&self) -> Option<&TraceId> {
        self.trace_id.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(entity) = &self.entity {
            write!(f, " (entity: {})", entity)?;
        }
        if let Some(entity_id) = &self.entity_id {
            write!(f, " (entity_id: {})", entity_id)?;
        }
        if let Some(request_id) = &self.request_id {
            write!(f, " (request_id: {})", request_id)?;
        }
        if let Some(trace_id) = &self.trace_id {
            write!(f, " (trace_id: {})", trace_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

// ========== Domain Errors ==========

/// Domain-level failures raised before or around persistence
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MagasinError {
    #[error("Commande {famille} not found: {commande_id}")]
    CommandeNotFound { famille: String, commande_id: i64 },

    #[error("Commande {famille} already persisted with id {commande_id}")]
    CommandeAlreadyPersisted { famille: String, commande_id: i64 },

    #[error("Commande {famille} has no id; insert it before updating")]
    CommandeNotPersisted { famille: String },

    #[error("Row {row_id} of {table} is not stored for commande {commande_id}")]
    UnknownChildRow {
        table: String,
        commande_id: i64,
        row_id: i64,
    },

    #[error("Row {row_id} of {table} appears more than once in commande {commande_id}")]
    DuplicateChildRow {
        table: String,
        commande_id: i64,
        row_id: i64,
    },

    #[error("{entity} not found: {id}")]
    EntityNotFound { entity: String, id: i64 },

    #[error("{entity} has no id; insert it before updating")]
    EntityNotPersisted { entity: String },

    #[error("{entity} already persisted with id {id}")]
    EntityAlreadyPersisted { entity: String, id: i64 },

    #[error("Invalid quantity {quantite} for article {article_id}: must be positive")]
    InvalidQuantity { article_id: i64, quantite: i64 },

    #[error("Invalid reference {field}={value}: ids are positive integers")]
    InvalidReference { field: String, value: i64 },

    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl From<MagasinError> for ExError {
    fn from(err: MagasinError) -> Self {
        let message = err.to_string();
        match err {
            MagasinError::CommandeNotFound {
                famille,
                commande_id,
            } => ExError::new(ExErrorKind::NotFound)
                .with_entity(format!("commande_{}", famille))
                .with_entity_id(commande_id)
                .with_message(message),

            MagasinError::CommandeAlreadyPersisted {
                famille,
                commande_id,
            } => ExError::new(ExErrorKind::AlreadyExists)
                .with_entity(format!("commande_{}", famille))
                .with_entity_id(commande_id)
                .with_message(message),

            MagasinError::CommandeNotPersisted { famille } => {
                ExError::new(ExErrorKind::InvalidInput)
                    .with_entity(format!("commande_{}", famille))
                    .with_message(message)
            }

            MagasinError::UnknownChildRow { table, row_id, .. }
            | MagasinError::DuplicateChildRow { table, row_id, .. } => {
                ExError::new(ExErrorKind::InvariantViolation)
                    .with_entity(table)
                    .with_entity_id(row_id)
                    .with_message(message)
            }

            MagasinError::EntityNotFound { entity, id } => ExError::new(ExErrorKind::NotFound)
                .with_entity(entity)
                .with_entity_id(id)
                .with_message(message),

            MagasinError::EntityNotPersisted { entity } => {
                ExError::new(ExErrorKind::InvalidInput)
                    .with_entity(entity)
                    .with_message(message)
            }

            MagasinError::EntityAlreadyPersisted { entity, id } => {
                ExError::new(ExErrorKind::AlreadyExists)
                    .with_entity(entity)
                    .with_entity_id(id)
                    .with_message(message)
            }

            MagasinError::InvalidQuantity { article_id, .. } => {
                ExError::new(ExErrorKind::InvalidQuantity)
                    .with_entity("article")
                    .with_entity_id(article_id)
                    .with_message(message)
            }

            MagasinError::InvalidReference { .. } | MagasinError::InvalidInput { .. } => {
                ExError::new(ExErrorKind::InvalidInput).with_message(message)
            }

            MagasinError::Internal { .. } => {
                ExError::new(ExErrorKind::Internal).with_message(message)
            }
        }
    }
}
