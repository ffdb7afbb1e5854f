mod collection;
pub mod patients;
pub mod prescriptions;
pub mod records;
pub mod staff;
pub mod users;

pub use collection::{ResultsPage, Saved};
pub use patients::{
    NewPatient, PastIllness, Patient, PatientCreated, PatientDetail, PatientGivenMedicines,
    PatientStatus, PatientUpdate, PatientsApi,
};
pub use prescriptions::{
    GivenMedicine, GivenMedicineUpdate, GivenMedicinesApi, MedicineUsage, MedicinesReport,
    NewGivenMedicine, NewPrescribedMedicine, PrescribedMedicine, PrescribedMedicinesApi,
    ReportFilters, ReportMetadata, ReportPeriod, ReportQuery,
};
pub use records::{NewRecord, Record, RecordFilter, RecordsApi};
pub use staff::{Doctor, DoctorsApi, Medicine, MedicinesApi, NewDoctor, NewMedicine};
pub use users::{NewUser, User, UserFilter, UserRole, UserUpdate, UsersApi};
