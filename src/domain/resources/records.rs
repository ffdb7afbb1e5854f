use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::collection::Collection;
use super::patients::TotalMedicinePrice;
use super::{PastIllness, PrescribedMedicine};
use crate::domain::client::{ApiClient, ApiRequest};
use crate::domain::shared::ClientResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: i64,
    pub patient: i64,
    #[serde(default)]
    pub doctor: Option<i64>,
    #[serde(default)]
    pub doctor_name: Option<String>,
    #[serde(default)]
    pub doctor_specialization: Option<String>,
    #[serde(default)]
    pub past_illness: Option<PastIllness>,
    #[serde(default)]
    pub vital_signs: String,
    pub issued_date: NaiveDate,
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub prescribed_medicines: Vec<PrescribedMedicine>,
    #[serde(default)]
    pub total_medicine_price: Option<Decimal>,
    #[serde(default)]
    pub total_prescribed_medicines: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRecord {
    pub patient: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doctor: Option<i64>,
    pub vital_signs: String,
    pub issued_date: NaiveDate,
}

/// Filters accepted by `GET /api/records/`
#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    pub patient: Option<i64>,
    pub doctor: Option<i64>,
    pub doctor_specialization: Option<String>,
    pub search: Option<String>,
}

pub struct RecordsApi<'a> {
    collection: Collection<'a>,
}

impl<'a> RecordsApi<'a> {
    pub const PATH: &'static str = "/api/records/";

    pub fn new(client: &'a ApiClient) -> Self {
        Self {
            collection: Collection::new(client, Self::PATH),
        }
    }

    pub async fn list(&self, filter: &RecordFilter) -> ClientResult<Vec<Record>> {
        let request = self
            .collection
            .list_request()
            .query_opt("patient", filter.patient)
            .query_opt("doctor", filter.doctor)
            .query_opt("doctor_specialization", filter.doctor_specialization.as_deref())
            .query_opt("search", filter.search.as_deref());
        self.collection.list(request).await
    }

    pub async fn get(&self, id: i64) -> ClientResult<Record> {
        self.collection.get(id).await
    }

    pub async fn create(&self, record: &NewRecord) -> ClientResult<Record> {
        self.collection.create(record).await
    }

    pub async fn update(&self, id: i64, record: &NewRecord) -> ClientResult<Record> {
        self.collection.update(id, record).await
    }

    pub async fn delete(&self, id: i64) -> ClientResult<()> {
        self.collection.delete(id).await
    }

    /// GET /api/records/{id}/prescribed_medicines/
    pub async fn prescribed_medicines(&self, id: i64) -> ClientResult<Vec<PrescribedMedicine>> {
        let path = self.collection.action_path(id, "prescribed_medicines");
        self.collection.client().fetch(&ApiRequest::get(path)).await
    }

    /// GET /api/records/{id}/total_medicine_price/
    pub async fn total_medicine_price(&self, id: i64) -> ClientResult<Decimal> {
        let path = self.collection.action_path(id, "total_medicine_price");
        let total: TotalMedicinePrice = self.collection.client().fetch(&ApiRequest::get(path)).await?;
        Ok(total.total_medicine_price.unwrap_or(Decimal::ZERO))
    }
}
