//! Request Validation
//!
//! Field-presence checks applied before a request reaches the interpreter.
//! Serde already guarantees the shape; this layer rejects values that are
//! well-formed JSON but unusable: blank messages and nil identifiers.

use atelier_core::CommandRequest;

use crate::error::{ApiError, ApiResult};

/// Pre-flight validation for inbound command requests.
pub trait ValidateRequest {
    /// Reject a request whose fields cannot be dispatched.
    ///
    /// # Errors
    /// `ApiError::missing_field` for a blank `message`,
    /// `ApiError::invalid_input` for a nil organization or user id.
    fn validate(&self) -> ApiResult<()>;
}

impl ValidateRequest for CommandRequest {
    fn validate(&self) -> ApiResult<()> {
        if self.message.trim().is_empty() {
            return Err(ApiError::missing_field("message"));
        }
        // A nil UUID deserializes fine but would scope every write to the
        // zero tenant.
        if self.organization_id.is_nil() {
            return Err(ApiError::invalid_input("organizationId must not be nil"));
        }
        if self.user_id.is_nil() {
            return Err(ApiError::invalid_input("userId must not be nil"));
        }
        Ok(())
    }
}
