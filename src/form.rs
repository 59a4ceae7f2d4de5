//! Request bodies, validated before anything touches the store.

use crate::{record::require, Error, Result};
use chrono::{DateTime, NaiveDate};
use serde::Deserialize;
use serde_aux::field_attributes::deserialize_option_number_from_string;

/// Price of a mahaprasad booking.
pub const MAHAPRASAD_AMOUNT: i64 = 101;

fn trimmed(v: &Option<String>) -> Option<String> {
    v.as_ref()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(default, rename_all = "camelCase")]
pub struct DonationForm {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[serde(deserialize_with = "deserialize_option_number_from_string")]
    pub amount: Option<f64>,
    pub purpose: Option<String>,
    pub payment_method: Option<String>,
    pub message: Option<String>,
    pub user_id: Option<String>,
}

impl DonationForm {
    pub fn validate(&self) -> Result<()> {
        require(&[("name", self.name.as_deref())])?;
        match self.amount {
            Some(amount) if amount.is_finite() && amount > 0.0 => Ok(()),
            Some(_) => Err(Error::Validation("Amount must be a positive number".to_owned())),
            None => Err(Error::Validation("Missing required fields: amount".to_owned())),
        }
    }

    pub fn purpose(&self) -> String {
        trimmed(&self.purpose).unwrap_or_else(|| "General".to_owned())
    }
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(default, rename_all = "camelCase")]
pub struct EventForm {
    pub name: Option<String>,
    pub description: Option<String>,
    /// `2024-01-31` or RFC 3339
    pub date: Option<String>,
    pub time: Option<String>,
    pub location: Option<String>,
    #[serde(deserialize_with = "deserialize_option_number_from_string")]
    pub price: Option<f64>,
    #[serde(deserialize_with = "deserialize_option_number_from_string")]
    pub capacity: Option<i32>,
    pub image: Option<String>,
}

/// Unix seconds of an event date.
pub fn parse_date(raw: &str) -> Result<i64> {
    let raw = raw.trim();
    if let Ok(time) = DateTime::parse_from_rfc3339(raw) {
        return Ok(time.timestamp());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|d| d.and_utc().timestamp())
        .ok_or_else(|| Error::Validation(format!("Invalid date: {}", raw)))
}

impl EventForm {
    /// Checks shared by create and update.
    fn check(&self) -> Result<()> {
        if matches!(self.price, Some(p) if !(p.is_finite() && p >= 0.0)) {
            return Err(Error::Validation("Price must not be negative".to_owned()));
        }
        if matches!(self.capacity, Some(c) if c < 0) {
            return Err(Error::Validation("Capacity must not be negative".to_owned()));
        }
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(Error::Validation("Name must not be empty".to_owned()));
            }
        }
        Ok(())
    }

    /// Validate a new event, returning its date.
    pub fn validate_new(&self) -> Result<i64> {
        require(&[("name", self.name.as_deref()), ("date", self.date.as_deref())])?;
        self.check()?;
        parse_date(self.date.as_deref().unwrap_or_default())
    }

    /// Validate an update, returning the new date if present.
    pub fn validate_update(&self) -> Result<Option<i64>> {
        self.check()?;
        self.date.as_deref().map(parse_date).transpose()
    }
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(default, rename_all = "camelCase")]
pub struct JoinForm {
    pub name: Option<String>,
    pub father_name: Option<String>,
    pub religion: Option<String>,
    pub pincode: Option<String>,
    pub email: Option<String>,
    pub contact_no: Option<String>,
    pub notes: Option<String>,
}

/// Validated membership request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Join {
    pub name: String,
    pub father_name: String,
    pub religion: String,
    pub pincode: String,
    pub email: String,
    pub contact_no: String,
    pub notes: Option<String>,
}

impl JoinForm {
    pub fn into_join(self) -> Result<Join> {
        require(&[
            ("name", self.name.as_deref()),
            ("fatherName", self.father_name.as_deref()),
            ("religion", self.religion.as_deref()),
            ("pincode", self.pincode.as_deref()),
            ("email", self.email.as_deref()),
            ("contactNo", self.contact_no.as_deref()),
        ])?;
        Ok(Join {
            name: trimmed(&self.name).unwrap_or_default(),
            father_name: trimmed(&self.father_name).unwrap_or_default(),
            religion: trimmed(&self.religion).unwrap_or_default(),
            pincode: trimmed(&self.pincode).unwrap_or_default(),
            email: trimmed(&self.email).unwrap_or_default(),
            contact_no: trimmed(&self.contact_no).unwrap_or_default(),
            notes: trimmed(&self.notes),
        })
    }
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(default, rename_all = "camelCase")]
pub struct BookingForm {
    pub r#type: Option<String>,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub father_name: Option<String>,
    pub village: Option<String>,
    pub pincode: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
}

/// A booking carrying exactly the fields its type requires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Booking {
    Mahaprasad {
        name: String,
        phone: String,
        father_name: String,
        notes: Option<String>,
    },
    Prashad {
        name: String,
        phone: String,
        village: String,
        pincode: String,
        address: String,
        notes: Option<String>,
    },
}

impl Booking {
    pub fn amount(&self) -> i64 {
        match self {
            Booking::Mahaprasad { .. } => MAHAPRASAD_AMOUNT,
            Booking::Prashad { .. } => 0,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Booking::Mahaprasad { .. } => "Mahaprasad",
            Booking::Prashad { .. } => "Prashad",
        }
    }
}

impl BookingForm {
    pub fn into_booking(self) -> Result<Booking> {
        let name = self.name.as_deref();
        let phone = self.phone.as_deref();
        match self.r#type.as_deref().map(str::trim) {
            Some("mahaprasad") => {
                require(&[
                    ("name", name),
                    ("phone", phone),
                    ("fatherName", self.father_name.as_deref()),
                ])?;
                Ok(Booking::Mahaprasad {
                    name: trimmed(&self.name).unwrap_or_default(),
                    phone: trimmed(&self.phone).unwrap_or_default(),
                    father_name: trimmed(&self.father_name).unwrap_or_default(),
                    notes: trimmed(&self.notes),
                })
            }
            Some("prashad") => {
                require(&[
                    ("name", name),
                    ("phone", phone),
                    ("village", self.village.as_deref()),
                    ("pincode", self.pincode.as_deref()),
                    ("address", self.address.as_deref()),
                ])?;
                Ok(Booking::Prashad {
                    name: trimmed(&self.name).unwrap_or_default(),
                    phone: trimmed(&self.phone).unwrap_or_default(),
                    village: trimmed(&self.village).unwrap_or_default(),
                    pincode: trimmed(&self.pincode).unwrap_or_default(),
                    address: trimmed(&self.address).unwrap_or_default(),
                    notes: trimmed(&self.notes),
                })
            }
            _ => Err(Error::Validation(
                "Invalid booking type. Must be 'mahaprasad' or 'prashad'".to_owned(),
            )),
        }
    }
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(default)]
pub struct StatusForm {
    pub status: Option<String>,
    pub notes: Option<String>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(default, rename_all = "camelCase")]
pub struct ImagePatch {
    pub category: Option<String>,
    pub is_active: Option<bool>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Like {
    Like,
    Unlike,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct LikeForm {
    pub action: String,
}

impl Default for LikeForm {
    fn default() -> Self {
        Self {
            action: "like".to_owned(),
        }
    }
}

impl LikeForm {
    pub fn action(&self) -> Result<Like> {
        match self.action.as_str() {
            "like" => Ok(Like::Like),
            "unlike" => Ok(Like::Unlike),
            _ => Err(Error::Validation(
                "Action must be 'like' or 'unlike'".to_owned(),
            )),
        }
    }
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}
