use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::collection::Collection;
use crate::domain::client::ApiClient;
use crate::domain::shared::ClientResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Doctor {
    pub id: i64,
    pub name: String,
    pub specialization: String,
    #[serde(default)]
    pub mobile_number: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Body for creating or replacing a doctor. `user` links the doctor to an
/// account with the doctor role and cannot be changed after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDoctor {
    pub name: String,
    pub specialization: String,
    pub mobile_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<i64>,
}

pub struct DoctorsApi<'a> {
    collection: Collection<'a>,
}

impl<'a> DoctorsApi<'a> {
    pub const PATH: &'static str = "/api/doctors/";

    pub fn new(client: &'a ApiClient) -> Self {
        Self {
            collection: Collection::new(client, Self::PATH),
        }
    }

    /// List doctors, optionally searching name, specialization and phone number
    pub async fn list(&self, search: Option<&str>) -> ClientResult<Vec<Doctor>> {
        let request = self.collection.list_request().query_opt("search", search);
        self.collection.list(request).await
    }

    pub async fn get(&self, id: i64) -> ClientResult<Doctor> {
        self.collection.get(id).await
    }

    pub async fn create(&self, doctor: &NewDoctor) -> ClientResult<Doctor> {
        self.collection.create(doctor).await
    }

    pub async fn update(&self, id: i64, doctor: &NewDoctor) -> ClientResult<Doctor> {
        self.collection.update(id, doctor).await
    }

    pub async fn delete(&self, id: i64) -> ClientResult<()> {
        self.collection.delete(id).await
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Medicine {
    pub id: i64,
    pub name: String,
    pub dose: String,
    #[serde(default)]
    pub scientific_name: String,
    #[serde(default)]
    pub company: String,
    pub price: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMedicine {
    pub name: String,
    pub dose: String,
    pub scientific_name: String,
    pub company: String,
    pub price: Decimal,
}

pub struct MedicinesApi<'a> {
    collection: Collection<'a>,
}

impl<'a> MedicinesApi<'a> {
    pub const PATH: &'static str = "/api/medicines/";

    pub fn new(client: &'a ApiClient) -> Self {
        Self {
            collection: Collection::new(client, Self::PATH),
        }
    }

    /// List medicines, optionally searching name, scientific name and company
    pub async fn list(&self, search: Option<&str>) -> ClientResult<Vec<Medicine>> {
        let request = self.collection.list_request().query_opt("search", search);
        self.collection.list(request).await
    }

    pub async fn get(&self, id: i64) -> ClientResult<Medicine> {
        self.collection.get(id).await
    }

    pub async fn create(&self, medicine: &NewMedicine) -> ClientResult<Medicine> {
        self.collection.create(medicine).await
    }

    pub async fn update(&self, id: i64, medicine: &NewMedicine) -> ClientResult<Medicine> {
        self.collection.update(id, medicine).await
    }

    pub async fn delete(&self, id: i64) -> ClientResult<()> {
        self.collection.delete(id).await
    }
}
