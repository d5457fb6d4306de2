use serde::{Deserialize, Serialize};

/// Category assigned to patients promoted from the outpatient dashboard.
pub const PATIENT_TYPE_OPD: &str = "OPD";

/// Full name broken into the portal's first/middle/last fields.
///
/// Tokenized on whitespace: first token is the first name, the last token is
/// the last name when there is more than one, and anything in between becomes
/// the middle name. A single token yields a first name only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientName {
    pub first: String,
    pub middle: String,
    pub last: String,
}

impl PatientName {
    pub fn split(full_name: &str) -> Self {
        let tokens: Vec<&str> = full_name.split_whitespace().collect();
        match tokens.as_slice() {
            [] => Self::default(),
            [first] => Self {
                first: (*first).to_string(),
                ..Self::default()
            },
            [first, middle @ .., last] => Self {
                first: (*first).to_string(),
                middle: middle.join(" "),
                last: (*last).to_string(),
            },
        }
    }
}

/// Intake record derived from an appointment at confirmation time. Ownership
/// passes to the portal's patient module once the create call succeeds; the
/// clinical and administrative flags all start out false/empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientIntake {
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub doctor_name: String,
    pub appointment_date: String,
    pub appointment_time: String,
    pub patient_type: String,
    pub is_visible: bool,
    pub consultation_started: bool,
    pub consultation_completed: bool,
    pub prescription: String,
    pub advice: String,
}

impl PatientIntake {
    pub fn from_booking(
        patient_name: &str,
        email: &str,
        phone: &str,
        doctor_name: &str,
        appointment_date: &str,
        appointment_time: &str,
    ) -> Self {
        let name = PatientName::split(patient_name);

        Self {
            first_name: name.first,
            middle_name: name.middle,
            last_name: name.last,
            email: email.to_string(),
            phone_number: phone.to_string(),
            doctor_name: doctor_name.to_string(),
            appointment_date: appointment_date.to_string(),
            appointment_time: appointment_time.to_string(),
            patient_type: PATIENT_TYPE_OPD.to_string(),
            is_visible: false,
            consultation_started: false,
            consultation_completed: false,
            prescription: String::new(),
            advice: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
pub enum PromotionError {
    #[error("Patient record creation failed: {0}")]
    CreateFailed(String),

    #[error("Patient record was created without an identifier")]
    MissingIdentifier,
}
