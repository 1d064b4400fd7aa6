use crate::error::AppointmentResult;
use crate::ids::next_id;
use crate::models::AppointmentKind;
use crate::repository::AppointmentRepository;
use std::sync::Arc;
use tracing::debug;

/// Hands out the next `app###` / `lapp###` identifier when booking
pub struct AppointmentIdAllocator {
    repository: Arc<dyn AppointmentRepository>,
}

impl AppointmentIdAllocator {
    pub fn new(repository: Arc<dyn AppointmentRepository>) -> Self {
        Self { repository }
    }

    /// Increment the highest stored id of `kind`, or start from the seed.
    ///
    /// # Errors
    ///
    /// Database failures and malformed stored ids are returned as-is; a
    /// booking cannot proceed without an id.
    pub async fn next_appointment_id(&self, kind: AppointmentKind) -> AppointmentResult<String> {
        let cfg = kind.config();
        let current_max = self.repository.max_appointment_id(kind).await?;
        let id = next_id(current_max.as_deref(), cfg.id_prefix.len(), cfg.id_seed)?;
        debug!(%kind, "Allocated appointment id {}", id);
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppointmentError;
    use crate::models::Appointment;
    use crate::repository::InMemoryAppointmentRepository;

    #[tokio::test]
    async fn test_seed_then_increment() {
        let repo = Arc::new(InMemoryAppointmentRepository::new());
        let allocator = AppointmentIdAllocator::new(repo.clone());

        assert_eq!(allocator.next_appointment_id(AppointmentKind::Clinical).await.unwrap(), "app001");
        assert_eq!(allocator.next_appointment_id(AppointmentKind::Lab).await.unwrap(), "lapp001");

        repo.insert_appointment(Appointment::new("app036", AppointmentKind::Clinical));
        repo.insert_appointment(Appointment::new("lapp009", AppointmentKind::Lab));
        assert_eq!(allocator.next_appointment_id(AppointmentKind::Clinical).await.unwrap(), "app037");
        assert_eq!(allocator.next_appointment_id(AppointmentKind::Lab).await.unwrap(), "lapp010");
    }

    #[tokio::test]
    async fn test_malformed_stored_id_is_fatal() {
        let repo = Arc::new(InMemoryAppointmentRepository::new());
        repo.insert_appointment(Appointment::new("app", AppointmentKind::Clinical));
        let allocator = AppointmentIdAllocator::new(repo);

        let result = allocator.next_appointment_id(AppointmentKind::Clinical).await;
        assert!(matches!(result, Err(AppointmentError::IdFormat(_))));
    }
}
