use chrono::{DateTime, NaiveDate, Utc};
use reqwest::StatusCode;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::collection::Collection;
use super::{GivenMedicine, PrescribedMedicine, Record};
use crate::domain::client::{ApiClient, ApiRequest};
use crate::domain::shared::ClientResult;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatientStatus {
    #[default]
    Active,
    Inactive,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub id: i64,
    pub full_name: String,
    pub age: i32,
    pub gender: String,
    pub area: String,
    pub mobile_number: String,
    #[serde(default)]
    pub status: PatientStatus,
    #[serde(default)]
    pub is_waiting: bool,
    #[serde(default)]
    pub records_count: i64,
    #[serde(default)]
    pub last_visit: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PastIllness {
    pub id: i64,
    pub description: String,
}

/// `GET /api/patients/{id}/`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientDetail {
    #[serde(flatten)]
    pub patient: Patient,
    #[serde(default)]
    pub past_illnesses: Vec<PastIllness>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub total_medicine_price: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPatient {
    pub full_name: String,
    pub age: i32,
    pub gender: String,
    pub area: String,
    pub mobile_number: String,
    #[serde(default)]
    pub status: PatientStatus,
    #[serde(default)]
    pub is_waiting: bool,
}

/// Fields for `PATCH /api/patients/{id}/`; unset fields are left alone
#[derive(Debug, Clone, Default, Serialize)]
pub struct PatientUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobile_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PatientStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_waiting: Option<bool>,
}

/// Outcome of creating a patient. The API deduplicates on name, age and
/// gender and hands back the existing record instead of a new one.
#[derive(Debug, Clone, PartialEq)]
pub enum PatientCreated {
    Created(Patient),
    AlreadyExists(Patient),
}

impl PatientCreated {
    pub fn patient(&self) -> &Patient {
        match self {
            Self::Created(p) | Self::AlreadyExists(p) => p,
        }
    }

    pub fn into_patient(self) -> Patient {
        match self {
            Self::Created(p) | Self::AlreadyExists(p) => p,
        }
    }
}

#[derive(Deserialize)]
struct CreatePatientBody {
    data: Patient,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PatientGivenMedicines {
    pub given_medicines: Vec<GivenMedicine>,
    #[serde(default)]
    pub total_price: Option<Decimal>,
}

#[derive(Deserialize)]
pub(crate) struct TotalMedicinePrice {
    #[serde(default)]
    pub total_medicine_price: Option<Decimal>,
}

pub struct PatientsApi<'a> {
    collection: Collection<'a>,
}

impl<'a> PatientsApi<'a> {
    pub const PATH: &'static str = "/api/patients/";

    pub fn new(client: &'a ApiClient) -> Self {
        Self {
            collection: Collection::new(client, Self::PATH),
        }
    }

    pub async fn list(&self) -> ClientResult<Vec<Patient>> {
        self.collection.list(self.collection.list_request()).await
    }

    pub async fn get(&self, id: i64) -> ClientResult<PatientDetail> {
        self.collection.get(id).await
    }

    pub async fn create(&self, patient: &NewPatient) -> ClientResult<PatientCreated> {
        let request = ApiRequest::post(self.collection.path(), patient)?;
        let response = self
            .collection
            .client()
            .send(&request)
            .await?
            .error_for_status(request.path())?;

        let body: CreatePatientBody = response.json()?;
        if response.status == StatusCode::CREATED {
            Ok(PatientCreated::Created(body.data))
        } else {
            tracing::debug!(patient_id = body.data.id, "Patient already registered");
            Ok(PatientCreated::AlreadyExists(body.data))
        }
    }

    pub async fn update(&self, id: i64, patient: &NewPatient) -> ClientResult<Patient> {
        self.collection.update(id, patient).await
    }

    pub async fn partial_update(&self, id: i64, changes: &PatientUpdate) -> ClientResult<Patient> {
        self.collection.partial_update(id, changes).await
    }

    pub async fn delete(&self, id: i64) -> ClientResult<()> {
        self.collection.delete(id).await
    }

    /// GET /api/patients/{id}/prescribed_medicines/
    pub async fn prescribed_medicines(&self, id: i64) -> ClientResult<Vec<PrescribedMedicine>> {
        let path = self.collection.action_path(id, "prescribed_medicines");
        self.collection.client().fetch(&ApiRequest::get(path)).await
    }

    /// GET /api/patients/{id}/records/
    pub async fn records(&self, id: i64) -> ClientResult<Vec<Record>> {
        let path = self.collection.action_path(id, "records");
        self.collection.client().fetch(&ApiRequest::get(path)).await
    }

    /// GET /api/patients/{id}/records/{record_id}/
    pub async fn record(&self, id: i64, record_id: i64) -> ClientResult<Record> {
        let path = format!("{}{}/", self.collection.action_path(id, "records"), record_id);
        self.collection.client().fetch(&ApiRequest::get(path)).await
    }

    /// GET /api/patients/{id}/total_medicine_price/
    pub async fn total_medicine_price(&self, id: i64) -> ClientResult<Decimal> {
        let path = self.collection.action_path(id, "total_medicine_price");
        let total: TotalMedicinePrice = self.collection.client().fetch(&ApiRequest::get(path)).await?;
        Ok(total.total_medicine_price.unwrap_or(Decimal::ZERO))
    }

    /// GET /api/patients/{id}/given_medicines/
    pub async fn given_medicines(&self, id: i64) -> ClientResult<PatientGivenMedicines> {
        let path = self.collection.action_path(id, "given_medicines");
        self.collection.client().fetch(&ApiRequest::get(path)).await
    }
}
