use super::{message_or, Phase};
use crate::models::{Validation, ValidationId, ValidationStatusInfo};

#[derive(Debug, Clone, PartialEq)]
pub enum ValidationEvent {
  FetchAll(Phase<Vec<Validation>>),
  FetchOne(ValidationId, Phase<Validation>),
  Create(Phase<Validation>),
  Update(ValidationId, Phase<Validation>),
  Delete(ValidationId, Phase<()>),
  Run(ValidationId, Phase<Validation>),
  Status(ValidationId, Phase<ValidationStatusInfo>),
  ClearError,
}

#[derive(Debug, Default)]
pub struct ValidationStore {
  validations: Vec<Validation>,
  current: Option<Validation>,
  loading: bool,
  error: Option<String>,
}

impl ValidationStore {
  pub fn all(&self) -> &[Validation] {
    &self.validations
  }

  pub fn get(&self, id: ValidationId) -> Option<&Validation> {
    self.validations.iter().find(|v| v.id == id)
  }

  pub fn current(&self) -> Option<&Validation> {
    self.current.as_ref()
  }

  pub fn is_loading(&self) -> bool {
    self.loading
  }

  pub fn error(&self) -> Option<&str> {
    self.error.as_deref()
  }

  /// Validations the backend currently reports as running.
  pub fn running_count(&self) -> usize {
    self.validations.iter().filter(|v| v.status == crate::models::ValidationStatus::Running).count()
  }

  pub fn reduce(&mut self, event: ValidationEvent) {
    match event {
      ValidationEvent::FetchAll(Phase::Pending) => self.loading = true,
      ValidationEvent::FetchAll(Phase::Fulfilled(validations)) => {
        self.loading = false;
        self.validations = validations;
      },
      ValidationEvent::FetchAll(Phase::Rejected(message)) => {
        self.loading = false;
        self.error = Some(message_or(message, "Failed to fetch validations"));
      },

      ValidationEvent::FetchOne(_, Phase::Pending) => {},
      ValidationEvent::FetchOne(_, Phase::Fulfilled(validation)) => self.current = Some(validation),
      ValidationEvent::FetchOne(_, Phase::Rejected(message)) => {
        self.error = Some(message_or(message, "Failed to fetch validation"));
      },

      ValidationEvent::Create(Phase::Pending)
      | ValidationEvent::Update(_, Phase::Pending)
      | ValidationEvent::Run(_, Phase::Pending) => {},
      ValidationEvent::Create(Phase::Fulfilled(validation)) | ValidationEvent::Update(_, Phase::Fulfilled(validation)) => {
        self.upsert(validation)
      },
      ValidationEvent::Create(Phase::Rejected(message)) => {
        self.error = Some(message_or(message, "Failed to create validation"));
      },
      ValidationEvent::Update(_, Phase::Rejected(message)) => {
        self.error = Some(message_or(message, "Failed to update validation"));
      },

      ValidationEvent::Delete(_, Phase::Pending) => {},
      ValidationEvent::Delete(id, Phase::Fulfilled(())) => {
        self.validations.retain(|v| v.id != id);
        if self.current.as_ref().is_some_and(|v| v.id == id) {
          self.current = None;
        }
      },
      ValidationEvent::Delete(_, Phase::Rejected(message)) => {
        self.error = Some(message_or(message, "Failed to delete validation"));
      },

      ValidationEvent::Run(_, Phase::Fulfilled(validation)) => {
        if let Some(existing) = self.validations.iter_mut().find(|v| v.id == validation.id) {
          *existing = validation.clone();
        }
        if self.current.as_ref().is_some_and(|v| v.id == validation.id) {
          self.current = Some(validation);
        }
      },
      ValidationEvent::Run(_, Phase::Rejected(message)) => {
        self.error = Some(message_or(message, "Failed to run validation"));
      },

      ValidationEvent::Status(_, Phase::Pending) => {},
      ValidationEvent::Status(_, Phase::Fulfilled(info)) => {
        for validation in self.validations.iter_mut().chain(self.current.iter_mut()).filter(|v| v.id == info.id) {
          validation.status = info.status;
          if info.updated_at.is_some() {
            validation.updated_at = info.updated_at;
          }
        }
      },
      ValidationEvent::Status(_, Phase::Rejected(message)) => {
        self.error = Some(message_or(message, "Failed to fetch validation status"));
      },

      ValidationEvent::ClearError => self.error = None,
    }
  }

  fn upsert(&mut self, validation: Validation) {
    match self.validations.iter_mut().find(|v| v.id == validation.id) {
      Some(existing) => *existing = validation,
      None => self.validations.push(validation),
    }
  }
}
