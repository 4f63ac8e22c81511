// =====================================================================================
// APPOINTMENT SERVICE - BOOKING & CANCELLATION FOR ONE PATIENT
// =====================================================================================
//
// scheduled -> cancelled is the only transition and only the owner can make
// it. Someone else's appointment is indistinguishable from a missing one.
//
// =====================================================================================

use std::sync::Arc;

use tracing::{debug, info, instrument};

use security_cell::FieldCipher;
use shared_database::ClinicStore;
use shared_models::appointment::{normalize_store_timestamp, AppointmentStatus, NewAppointment};
use shared_models::error::AppError;

use crate::models::{AppointmentView, BookingRequest};

pub struct AppointmentService {
    store: Arc<dyn ClinicStore>,
    cipher: Arc<FieldCipher>,
}

impl AppointmentService {
    pub fn new(store: Arc<dyn ClinicStore>, cipher: Arc<FieldCipher>) -> Self {
        Self { store, cipher }
    }

    #[instrument(skip(self, request), fields(doctor_id = ?request.doctor_id))]
    pub async fn book(&self, caller_id: i64, request: BookingRequest) -> Result<AppointmentView, AppError> {
        let (doctor_id, date, reason) = match (
            request.doctor_id,
            request.date.filter(|d| !d.trim().is_empty()),
            request.reason.filter(|r| !r.trim().is_empty()),
        ) {
            (Some(doctor_id), Some(date), Some(reason)) => (doctor_id, date, reason),
            _ => return Err(AppError::MissingFields),
        };

        let date = normalize_store_timestamp(&date)
            .ok_or_else(|| AppError::Validation(vec!["\"date\" must be a valid date".to_string()]))?;

        if !self.store.doctor_exists(doctor_id).await? {
            debug!("Booking rejected: doctor {} does not exist", doctor_id);
            return Err(AppError::DoctorNotFound);
        }

        let encrypted_reason = self.cipher.encrypt(&reason)?;

        let record = self
            .store
            .insert_appointment(NewAppointment {
                user_id: caller_id,
                doctor_id,
                date,
                reason: encrypted_reason,
                status: AppointmentStatus::Scheduled,
            })
            .await?;

        info!("Appointment {} booked by user {}", record.id, caller_id);

        // Echo the submitted reason rather than decrypting what was stored.
        Ok(AppointmentView::from_record(record, reason))
    }

    /// Newest first.
    #[instrument(skip(self))]
    pub async fn list_for_caller(&self, caller_id: i64) -> Result<Vec<AppointmentView>, AppError> {
        let records = self.store.list_appointments_for_user(caller_id).await?;

        records
            .into_iter()
            .map(|record| {
                let reason = self.cipher.decrypt(&record.reason)?;
                Ok(AppointmentView::from_record(record, reason))
            })
            .collect()
    }

    /// Idempotent for an already cancelled appointment.
    #[instrument(skip(self))]
    pub async fn cancel(&self, caller_id: i64, appointment_id: i64) -> Result<(), AppError> {
        let appointment = self
            .store
            .find_appointment_for_user(appointment_id, caller_id)
            .await?
            .ok_or(AppError::AppointmentNotFound)?;

        self.store
            .set_appointment_status(appointment.id, AppointmentStatus::Cancelled)
            .await?;

        info!("Appointment {} cancelled by user {}", appointment.id, caller_id);
        Ok(())
    }
}
