use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::collection::Collection;
use crate::domain::client::{ApiClient, ApiRequest};
use crate::domain::shared::ClientResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrescribedMedicine {
    pub id: i64,
    pub record: i64,
    pub medicine: i64,
    #[serde(default)]
    pub medicine_name: Option<String>,
    #[serde(default)]
    pub medicine_price: Option<Decimal>,
    #[serde(default)]
    pub dosage: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPrescribedMedicine {
    pub record: i64,
    pub medicine: i64,
    pub dosage: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GivenMedicine {
    pub id: i64,
    pub prescribed_medicine: i64,
    pub quantity: i64,
    pub given_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub medicine_name: Option<String>,
    #[serde(default)]
    pub total_price: Option<Decimal>,
}

/// A dispensing entry is either tied to an existing prescription or
/// prescribes the medicine on the spot.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum NewGivenMedicine {
    FromPrescription {
        patient: i64,
        prescribed_medicine: i64,
        quantity: i64,
    },
    Direct {
        patient: i64,
        medicine: i64,
        dosage: String,
        quantity: i64,
    },
}

/// Fields for `PUT`/`PATCH /api/given-medicines/{id}/`. A PUT must carry
/// the prescription and the quantity.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GivenMedicineUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prescribed_medicine: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportPeriod {
    Today,
    Month,
}

impl ReportPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Today => "today",
            Self::Month => "month",
        }
    }
}

/// Query for `GET /api/prescribed-medicines/report/`.
///
/// When `period` is set the server ignores the explicit date range.
#[derive(Debug, Clone, Default)]
pub struct ReportQuery {
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
    pub area: Option<String>,
    pub period: Option<ReportPeriod>,
}

impl ReportQuery {
    pub fn between(from_date: NaiveDate, to_date: NaiveDate) -> Self {
        Self {
            from_date: Some(from_date),
            to_date: Some(to_date),
            ..Default::default()
        }
    }

    pub fn for_period(period: ReportPeriod) -> Self {
        Self {
            period: Some(period),
            ..Default::default()
        }
    }

    pub fn in_area(mut self, area: impl Into<String>) -> Self {
        self.area = Some(area.into());
        self
    }

    fn to_request(&self, path: &str) -> ApiRequest {
        ApiRequest::get(path)
            .query_opt("from_date", self.from_date)
            .query_opt("to_date", self.to_date)
            .query_opt("area", self.area.as_deref())
            .query_opt("period", self.period.map(|p| p.as_str()))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReportFilters {
    #[serde(default)]
    pub area: Option<String>,
    #[serde(default)]
    pub period: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReportMetadata {
    #[serde(default)]
    pub from_date: Option<NaiveDate>,
    #[serde(default)]
    pub to_date: Option<NaiveDate>,
    pub total_price: Decimal,
    pub filters_applied: ReportFilters,
}

/// One line of the usage report, aggregated per medicine
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MedicineUsage {
    pub medicine_name: String,
    pub total_quantity: i64,
    pub price_per_unit: Decimal,
    pub total_price: Decimal,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MedicinesReport {
    pub metadata: ReportMetadata,
    pub medicines: Vec<MedicineUsage>,
}

pub struct PrescribedMedicinesApi<'a> {
    collection: Collection<'a>,
}

impl<'a> PrescribedMedicinesApi<'a> {
    pub const PATH: &'static str = "/api/prescribed-medicines/";

    pub fn new(client: &'a ApiClient) -> Self {
        Self {
            collection: Collection::new(client, Self::PATH),
        }
    }

    pub async fn list(
        &self,
        record: Option<i64>,
        medicine: Option<i64>,
    ) -> ClientResult<Vec<PrescribedMedicine>> {
        let request = self
            .collection
            .list_request()
            .query_opt("record", record)
            .query_opt("medicine", medicine);
        self.collection.list(request).await
    }

    pub async fn get(&self, id: i64) -> ClientResult<PrescribedMedicine> {
        self.collection.get(id).await
    }

    pub async fn create(&self, prescription: &NewPrescribedMedicine) -> ClientResult<PrescribedMedicine> {
        self.collection.create(prescription).await
    }

    pub async fn update(
        &self,
        id: i64,
        prescription: &NewPrescribedMedicine,
    ) -> ClientResult<PrescribedMedicine> {
        self.collection.update(id, prescription).await
    }

    pub async fn delete(&self, id: i64) -> ClientResult<()> {
        self.collection.delete(id).await
    }

    /// GET /api/prescribed-medicines/report/ - usage and cost per medicine
    pub async fn report(&self, query: &ReportQuery) -> ClientResult<MedicinesReport> {
        let path = format!("{}report/", self.collection.path());
        self.collection
            .client()
            .fetch(&query.to_request(&path))
            .await
    }
}

pub struct GivenMedicinesApi<'a> {
    collection: Collection<'a>,
}

impl<'a> GivenMedicinesApi<'a> {
    pub const PATH: &'static str = "/api/given-medicines/";

    pub fn new(client: &'a ApiClient) -> Self {
        Self {
            collection: Collection::new(client, Self::PATH),
        }
    }

    pub async fn list(
        &self,
        patient: Option<i64>,
        prescribed_medicine: Option<i64>,
    ) -> ClientResult<Vec<GivenMedicine>> {
        let request = self
            .collection
            .list_request()
            .query_opt("patient", patient)
            .query_opt("prescribed_medicine", prescribed_medicine);
        self.collection.list(request).await
    }

    pub async fn get(&self, id: i64) -> ClientResult<GivenMedicine> {
        self.collection.get(id).await
    }

    pub async fn create(&self, given: &NewGivenMedicine) -> ClientResult<GivenMedicine> {
        self.collection.create(given).await
    }

    pub async fn update(&self, id: i64, given: &GivenMedicineUpdate) -> ClientResult<GivenMedicine> {
        self.collection.update(id, given).await
    }

    pub async fn partial_update(
        &self,
        id: i64,
        changes: &GivenMedicineUpdate,
    ) -> ClientResult<GivenMedicine> {
        self.collection.partial_update(id, changes).await
    }

    pub async fn delete(&self, id: i64) -> ClientResult<()> {
        self.collection.delete(id).await
    }
}
