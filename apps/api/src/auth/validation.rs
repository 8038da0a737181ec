//! Signup and profile-update field validation.
//!
//! Every check runs before any remote call, and all failing fields are
//! reported together.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::models::{AccountMetadata, NewProfile, ProfileExtension, ProfileUpdate, Role};

pub const MIN_PASSWORD_LEN: usize = 6;
pub const MIN_GRADUATION_YEAR: i32 = 2020;
pub const MAX_GRADUATION_YEAR: i32 = 2030;

pub const DEGREES: &[&str] = &[
    "B.Tech", "M.Tech", "B.Sc", "M.Sc", "BE", "ME", "BCA", "MCA", "BBA", "MBA", "BA", "MA", "PhD",
    "Diploma", "B.Com", "M.Com", "BFA", "MFA",
];

pub const COMPANY_TYPES: &[&str] = &[
    "Startup",
    "MNC",
    "Government",
    "Non-Profit",
    "Consulting",
    "Product Company",
    "Service Company",
    "E-commerce",
    "Fintech",
    "Healthcare",
    "Education",
];

pub const DOMAINS: &[&str] = &[
    "Software Engineering",
    "Data Engineering",
    "Product Management",
    "Quality Assurance",
    "DevOps",
    "UI/UX Design",
    "Data Science",
    "Machine Learning",
    "Cybersecurity",
    "Cloud Engineering",
    "Mobile Development",
    "Frontend Development",
    "Backend Development",
    "Full Stack Development",
    "Business Analysis",
    "Project Management",
];

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"))
}

fn phone_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\+?[0-9]{7,15}$").expect("phone pattern compiles"))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StudentSignup {
    #[serde(default, alias = "name")]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub degree: String,
    #[serde(default)]
    pub graduation_year: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HrSignup {
    #[serde(default, alias = "name")]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub company_type: String,
    #[serde(default)]
    pub domain: String,
}

/// Role-specific signup input, tagged by `role` on the wire.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "role")]
pub enum SignupForm {
    Student(StudentSignup),
    #[serde(rename = "HR")]
    Hr(HrSignup),
}

/// A signup form that passed validation, split into what the identity
/// provider and the profile store each need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidSignup {
    pub email: String,
    pub password: String,
    pub metadata: AccountMetadata,
    pub profile: NewProfile,
}

impl ValidSignup {
    pub fn role(&self) -> Role {
        self.metadata.role
    }
}

pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_ascii_lowercase()
}

fn require(errors: &mut Vec<FieldError>, field: &str, value: &str, message: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        errors.push(FieldError::new(field, message));
    }
    trimmed.to_string()
}

fn require_choice(
    errors: &mut Vec<FieldError>,
    field: &str,
    value: &str,
    choices: &[&str],
    label: &str,
) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        errors.push(FieldError::new(field, format!("{label} is required")));
    } else if !choices.contains(&trimmed) {
        errors.push(FieldError::new(field, format!("Unknown {}", label.to_lowercase())));
    }
    trimmed.to_string()
}

fn check_email(errors: &mut Vec<FieldError>, raw: &str) -> String {
    let email = normalize_email(raw);
    if email.is_empty() {
        errors.push(FieldError::new("email", "Email is required"));
    } else if !email_regex().is_match(&email) {
        errors.push(FieldError::new("email", "Invalid email"));
    }
    email
}

fn check_password(errors: &mut Vec<FieldError>, password: &str) {
    if password.is_empty() {
        errors.push(FieldError::new("password", "Password is required"));
    } else if password.chars().count() < MIN_PASSWORD_LEN {
        errors.push(FieldError::new(
            "password",
            format!("Password must be at least {MIN_PASSWORD_LEN} characters"),
        ));
    }
}

/// Validates an optional phone number, returning it with separators
/// stripped. Blank input counts as absent.
fn check_phone(errors: &mut Vec<FieldError>, raw: Option<&str>) -> Option<String> {
    let raw = raw.map(str::trim).filter(|p| !p.is_empty())?;
    let compact: String = raw.chars().filter(|c| *c != ' ' && *c != '-').collect();
    if !phone_regex().is_match(&compact) {
        errors.push(FieldError::new("phone_number", "Invalid phone number"));
    }
    Some(compact)
}

fn check_graduation_year(errors: &mut Vec<FieldError>, year: Option<i32>) -> i32 {
    match year {
        None => {
            errors.push(FieldError::new(
                "graduation_year",
                "Graduation year is required",
            ));
            0
        }
        Some(y) if !(MIN_GRADUATION_YEAR..=MAX_GRADUATION_YEAR).contains(&y) => {
            errors.push(FieldError::new(
                "graduation_year",
                format!(
                    "Graduation year must be between {MIN_GRADUATION_YEAR} and {MAX_GRADUATION_YEAR}"
                ),
            ));
            y
        }
        Some(y) => y,
    }
}

impl SignupForm {
    /// Full validation for a new signup.
    pub fn validate(&self) -> Result<ValidSignup, Vec<FieldError>> {
        self.validate_inner(true)
    }

    /// Validation for re-creating a missing profile; the password belongs
    /// to an existing account and is not checked.
    pub fn validate_profile_fields(&self) -> Result<ValidSignup, Vec<FieldError>> {
        self.validate_inner(false)
    }

    fn validate_inner(&self, with_password: bool) -> Result<ValidSignup, Vec<FieldError>> {
        let mut errors = Vec::new();

        let (full_name, email, password, phone_number, extension) = match self {
            SignupForm::Student(f) => {
                let full_name = require(&mut errors, "full_name", &f.full_name, "Name is required");
                let email = check_email(&mut errors, &f.email);
                if with_password {
                    check_password(&mut errors, &f.password);
                }
                let phone = check_phone(&mut errors, f.phone_number.as_deref());
                let degree = require_choice(&mut errors, "degree", &f.degree, DEGREES, "Degree");
                let graduation_year = check_graduation_year(&mut errors, f.graduation_year);
                (
                    full_name,
                    email,
                    f.password.clone(),
                    phone,
                    ProfileExtension::Student {
                        degree,
                        graduation_year,
                    },
                )
            }
            SignupForm::Hr(f) => {
                let full_name = require(&mut errors, "full_name", &f.full_name, "Name is required");
                let email = check_email(&mut errors, &f.email);
                if with_password {
                    check_password(&mut errors, &f.password);
                }
                let phone = check_phone(&mut errors, f.phone_number.as_deref());
                let company_name = require(
                    &mut errors,
                    "company_name",
                    &f.company_name,
                    "Company name is required",
                );
                let location = require(&mut errors, "location", &f.location, "Location is required");
                let company_type = require_choice(
                    &mut errors,
                    "company_type",
                    &f.company_type,
                    COMPANY_TYPES,
                    "Company type",
                );
                let domain = require_choice(&mut errors, "domain", &f.domain, DOMAINS, "Domain");
                (
                    full_name,
                    email,
                    f.password.clone(),
                    phone,
                    ProfileExtension::Hr {
                        company_name,
                        location,
                        company_type,
                        domain,
                    },
                )
            }
        };

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(ValidSignup {
            metadata: AccountMetadata {
                role: extension.role(),
                full_name: full_name.clone(),
            },
            profile: NewProfile {
                full_name,
                phone_number,
                email: email.clone(),
                extension,
            },
            email,
            password,
        })
    }
}

/// Validates and normalises a self-service profile update.
pub fn validate_update(update: &ProfileUpdate) -> Result<ProfileUpdate, Vec<FieldError>> {
    let mut errors = Vec::new();

    let full_name = update.full_name.as_deref().map(|name| {
        require(&mut errors, "full_name", name, "Name is required")
    });
    let phone_number = check_phone(&mut errors, update.phone_number.as_deref());

    if !errors.is_empty() {
        return Err(errors);
    }
    Ok(ProfileUpdate {
        full_name,
        phone_number,
        role: update.role,
    })
}

/// Checks sign-in input is present. Returns the normalized email.
pub fn validate_sign_in(email: &str, password: &str) -> Result<String, Vec<FieldError>> {
    let mut errors = Vec::new();
    let email = require(&mut errors, "email", &normalize_email(email), "Email is required");
    if password.is_empty() {
        errors.push(FieldError::new("password", "Password is required"));
    }

    if !errors.is_empty() {
        return Err(errors);
    }
    Ok(email)
}
