use uuid::Uuid;

use crate::{Error, Result};
use hub_storage::UserId;

/// The acting user. Passed explicitly to every operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
	user_id: UserId,
	display_name: Option<String>,
}
impl Session {
	pub fn new(user_id: Uuid) -> Result<Self> {
		let user_id = UserId::new(user_id).map_err(|_| Error::Unauthenticated {
			message: "Session user id must not be nil.".to_string(),
		})?;

		Ok(Self { user_id, display_name: None })
	}

	pub fn with_display_name(mut self, display_name: &str) -> Self {
		let trimmed = display_name.trim();

		self.display_name = (!trimmed.is_empty()).then(|| trimmed.to_string());

		self
	}

	pub fn user_id(&self) -> UserId {
		self.user_id
	}

	pub fn display_name(&self) -> Option<&str> {
		self.display_name.as_deref()
	}
}
