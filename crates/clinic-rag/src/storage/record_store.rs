//! Patient/doctor/visit record store
//!
//! The trait is the seam the API layer depends on; `JsonRecordStore` keeps
//! all records in memory and persists them to a single JSON registry file on
//! every mutation. Visit mutation is last-write-wins: concurrent appends to
//! the same visit are not guarded and one can be lost.

use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::types::record::{Doctor, FileRecord, Message, Patient, Visit};

/// Trait for patient/doctor/visit record storage
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Register a new patient
    async fn create_patient(&self, name: String, age: u32, gender: String) -> Result<Patient>;

    /// List all patients
    async fn list_patients(&self) -> Result<Vec<Patient>>;

    /// Fetch one patient
    async fn get_patient(&self, id: &Uuid) -> Result<Patient>;

    /// Register a new doctor
    async fn create_doctor(&self, name: String, specialty: Option<String>) -> Result<Doctor>;

    /// List all doctors
    async fn list_doctors(&self) -> Result<Vec<Doctor>>;

    /// Start a visit: increments the patient's `total_visits` and stamps the
    /// new visit with that count as its `visit_number`.
    async fn create_visit(&self, patient_id: &Uuid, doctor_id: Option<Uuid>) -> Result<Visit>;

    /// Fetch one visit
    async fn get_visit(&self, id: &Uuid) -> Result<Visit>;

    /// Visits for a patient, newest first
    async fn visits_for_patient(&self, patient_id: &Uuid) -> Result<Vec<Visit>>;

    /// Append a file record to a visit's history
    async fn append_file(&self, visit_id: &Uuid, file: FileRecord) -> Result<()>;

    /// Append a chat message to a visit's history
    async fn append_message(&self, visit_id: &Uuid, message: Message) -> Result<()>;
}

/// On-disk shape of the registry file
#[derive(Default, Serialize, Deserialize)]
struct Registry {
    patients: Vec<Patient>,
    doctors: Vec<Doctor>,
    visits: Vec<Visit>,
}

/// Record store persisted to a JSON registry file
pub struct JsonRecordStore {
    patients: DashMap<Uuid, Patient>,
    doctors: DashMap<Uuid, Doctor>,
    visits: DashMap<Uuid, Visit>,
    path: PathBuf,
}

impl JsonRecordStore {
    /// Open (or create) the registry at the given path
    pub fn open(path: PathBuf) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let store = Self {
            patients: DashMap::new(),
            doctors: DashMap::new(),
            visits: DashMap::new(),
            path,
        };
        store.load();
        Ok(store)
    }

    /// Load records from disk; a missing or unreadable file starts empty
    fn load(&self) {
        if !self.path.exists() {
            return;
        }

        match fs::read_to_string(&self.path) {
            Ok(content) => match serde_json::from_str::<Registry>(&content) {
                Ok(registry) => {
                    for patient in registry.patients {
                        self.patients.insert(patient.id, patient);
                    }
                    for doctor in registry.doctors {
                        self.doctors.insert(doctor.id, doctor);
                    }
                    for visit in registry.visits {
                        self.visits.insert(visit.id, visit);
                    }
                    tracing::info!(
                        "Loaded {} patients, {} visits from registry",
                        self.patients.len(),
                        self.visits.len()
                    );
                }
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {}", self.path.display(), e);
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read {}: {}", self.path.display(), e);
            }
        }
    }

    /// Save all records to disk
    fn save(&self) {
        let registry = Registry {
            patients: self.patients.iter().map(|e| e.value().clone()).collect(),
            doctors: self.doctors.iter().map(|e| e.value().clone()).collect(),
            visits: self.visits.iter().map(|e| e.value().clone()).collect(),
        };

        match serde_json::to_string_pretty(&registry) {
            Ok(content) => {
                if let Err(e) = fs::write(&self.path, content) {
                    tracing::error!("Failed to save {}: {}", self.path.display(), e);
                }
            }
            Err(e) => {
                tracing::error!("Failed to serialize registry: {}", e);
            }
        }
    }
}

#[async_trait]
impl RecordStore for JsonRecordStore {
    async fn create_patient(&self, name: String, age: u32, gender: String) -> Result<Patient> {
        let patient = Patient::new(name, age, gender);
        self.patients.insert(patient.id, patient.clone());
        self.save();
        Ok(patient)
    }

    async fn list_patients(&self) -> Result<Vec<Patient>> {
        let mut patients: Vec<Patient> =
            self.patients.iter().map(|e| e.value().clone()).collect();
        patients.sort_by_key(|p| p.created_at);
        Ok(patients)
    }

    async fn get_patient(&self, id: &Uuid) -> Result<Patient> {
        self.patients
            .get(id)
            .map(|p| p.clone())
            .ok_or(Error::PatientNotFound(*id))
    }

    async fn create_doctor(&self, name: String, specialty: Option<String>) -> Result<Doctor> {
        let doctor = Doctor::new(name, specialty);
        self.doctors.insert(doctor.id, doctor.clone());
        self.save();
        Ok(doctor)
    }

    async fn list_doctors(&self) -> Result<Vec<Doctor>> {
        Ok(self.doctors.iter().map(|e| e.value().clone()).collect())
    }

    async fn create_visit(&self, patient_id: &Uuid, doctor_id: Option<Uuid>) -> Result<Visit> {
        let visit_number = {
            let mut patient = self
                .patients
                .get_mut(patient_id)
                .ok_or(Error::PatientNotFound(*patient_id))?;
            patient.total_visits += 1;
            patient.total_visits
        };

        let visit = Visit::new(*patient_id, doctor_id, visit_number);
        self.visits.insert(visit.id, visit.clone());
        self.save();
        Ok(visit)
    }

    async fn get_visit(&self, id: &Uuid) -> Result<Visit> {
        self.visits
            .get(id)
            .map(|v| v.clone())
            .ok_or(Error::VisitNotFound(*id))
    }

    async fn visits_for_patient(&self, patient_id: &Uuid) -> Result<Vec<Visit>> {
        // Unknown patients are a 404, not an empty list
        self.get_patient(patient_id).await?;

        let mut visits: Vec<Visit> = self
            .visits
            .iter()
            .filter(|e| e.value().patient_id == *patient_id)
            .map(|e| e.value().clone())
            .collect();
        visits.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(visits)
    }

    async fn append_file(&self, visit_id: &Uuid, file: FileRecord) -> Result<()> {
        {
            let mut visit = self
                .visits
                .get_mut(visit_id)
                .ok_or(Error::VisitNotFound(*visit_id))?;
            visit.files.push(file);
        }
        self.save();
        Ok(())
    }

    async fn append_message(&self, visit_id: &Uuid, message: Message) -> Result<()> {
        {
            let mut visit = self
                .visits
                .get_mut(visit_id)
                .ok_or(Error::VisitNotFound(*visit_id))?;
            visit.messages.push(message);
        }
        self.save();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::record::Sender;

    fn temp_store() -> (JsonRecordStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonRecordStore::open(dir.path().join("records.json")).unwrap();
        (store, dir)
    }

    #[tokio::test]
    async fn visit_numbers_track_total_visits() {
        let (store, _dir) = temp_store();
        let patient = store
            .create_patient("Asha Rao".to_string(), 42, "female".to_string())
            .await
            .unwrap();

        for expected in 1..=4u32 {
            let visit = store.create_visit(&patient.id, None).await.unwrap();
            assert_eq!(visit.visit_number, expected);

            let reloaded = store.get_patient(&patient.id).await.unwrap();
            assert_eq!(reloaded.total_visits, expected);
        }
    }

    #[tokio::test]
    async fn history_is_newest_first() {
        let (store, _dir) = temp_store();
        let patient = store
            .create_patient("Vikram Shah".to_string(), 65, "male".to_string())
            .await
            .unwrap();

        let first = store.create_visit(&patient.id, None).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let second = store.create_visit(&patient.id, None).await.unwrap();

        let history = store.visits_for_patient(&patient.id).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].id, second.id);
        assert_eq!(history[1].id, first.id);
    }

    #[tokio::test]
    async fn unknown_patient_history_is_not_found() {
        let (store, _dir) = temp_store();
        let err = store.visits_for_patient(&Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, Error::PatientNotFound(_)));
    }

    #[tokio::test]
    async fn messages_append_in_order() {
        let (store, _dir) = temp_store();
        let patient = store
            .create_patient("Meera Iyer".to_string(), 29, "female".to_string())
            .await
            .unwrap();
        let visit = store.create_visit(&patient.id, None).await.unwrap();

        store
            .append_message(&visit.id, Message::doctor("Any allergies on record?"))
            .await
            .unwrap();
        store
            .append_message(&visit.id, Message::ai("No allergies were mentioned."))
            .await
            .unwrap();

        let visit = store.get_visit(&visit.id).await.unwrap();
        assert_eq!(visit.messages.len(), 2);
        assert_eq!(visit.messages[0].sender, Sender::Doctor);
        assert_eq!(visit.messages[1].sender, Sender::Ai);
    }

    #[tokio::test]
    async fn registry_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.json");

        let patient_id = {
            let store = JsonRecordStore::open(path.clone()).unwrap();
            let patient = store
                .create_patient("Ravi Menon".to_string(), 51, "male".to_string())
                .await
                .unwrap();
            store.create_visit(&patient.id, None).await.unwrap();
            patient.id
        };

        let store = JsonRecordStore::open(path).unwrap();
        let patient = store.get_patient(&patient_id).await.unwrap();
        assert_eq!(patient.total_visits, 1);
        assert_eq!(store.visits_for_patient(&patient_id).await.unwrap().len(), 1);
    }
}
