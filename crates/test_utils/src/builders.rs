//! Test Data Builders
//!
//! Provides a builder for policy documents with sensible defaults. Tests set
//! only the fields they care about.

use chrono::NaiveDate;
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::{FirstName, LastName};
use fake::Fake;
use rust_decimal::Decimal;
use serde_json::{json, Map, Value};

/// One insured object of a document
#[derive(Debug, Clone)]
struct InsuredObject {
    region: String,
    covers: Vec<(String, Value)>,
}

/// Builder for raw policy documents
#[derive(Debug, Clone)]
pub struct PolicyDocumentBuilder {
    start_date: String,
    end_date: String,
    first_name: String,
    last_name: String,
    birth_date: Option<String>,
    email: String,
    phone: String,
    objects: Vec<InsuredObject>,
}

impl Default for PolicyDocumentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PolicyDocumentBuilder {
    /// Creates a builder for a two-week trip by a 34 year old holder
    pub fn new() -> Self {
        Self {
            start_date: "2024-07-01".to_string(),
            end_date: "2024-07-14".to_string(),
            first_name: "Ivan".to_string(),
            last_name: "Petrov".to_string(),
            birth_date: Some("1990-03-20".to_string()),
            email: "ivan.petrov@example.com".to_string(),
            phone: "+7 (916) 123-45-67".to_string(),
            objects: Vec::new(),
        }
    }

    /// Replaces the holder's name and email with generated ones
    pub fn with_random_holder(mut self) -> Self {
        self.first_name = FirstName().fake();
        self.last_name = LastName().fake();
        self.email = SafeEmail().fake();
        self
    }

    pub fn with_period(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start_date = start.to_string();
        self.end_date = end.to_string();
        self
    }

    /// Sets the period as raw text, formats not checked
    pub fn with_raw_period(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.start_date = start.into();
        self.end_date = end.into();
        self
    }

    pub fn with_birth_date(mut self, date: NaiveDate) -> Self {
        self.birth_date = Some(date.to_string());
        self
    }

    pub fn without_birth_date(mut self) -> Self {
        self.birth_date = None;
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = phone.into();
        self
    }

    /// Adds an insured object with `(cover code, sum insured)` covers
    pub fn with_object(mut self, region: impl Into<String>, covers: &[(&str, Decimal)]) -> Self {
        self.objects.push(InsuredObject {
            region: region.into(),
            covers: covers
                .iter()
                .map(|(code, sum)| (code.to_string(), json!(sum.to_string())))
                .collect(),
        });
        self
    }

    /// Adds an insured object whose cover sums are raw document values
    pub fn with_raw_object(mut self, region: impl Into<String>, covers: &[(&str, Value)]) -> Self {
        self.objects.push(InsuredObject {
            region: region.into(),
            covers: covers.iter().map(|(code, sum)| (code.to_string(), sum.clone())).collect(),
        });
        self
    }

    pub fn build(self) -> Value {
        let mut person = Map::new();
        person.insert("firstName".into(), json!(self.first_name));
        person.insert("lastName".into(), json!(self.last_name));
        if let Some(birth_date) = self.birth_date {
            person.insert("birthDate".into(), json!(birth_date));
        }

        let objects: Vec<Value> = self
            .objects
            .into_iter()
            .map(|object| {
                let covers: Vec<Value> = object
                    .covers
                    .into_iter()
                    .map(|(code, sum)| json!({ "code": code, "sumInsured": sum }))
                    .collect();
                json!({ "address": { "region": object.region }, "covers": covers })
            })
            .collect();

        json!({
            "startDate": self.start_date,
            "endDate": self.end_date,
            "policyHolder": {
                "person": Value::Object(person),
                "contacts": { "email": self.email, "phone": self.phone }
            },
            "insuredObjects": objects
        })
    }
}
