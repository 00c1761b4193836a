use chrono::{Datelike, NaiveDate};

use crate::errors::{GymError, GymResult};

pub const MIN_TRAINER_AGE: i32 = 18;

/// Trims the number and makes sure it carries the international `+` prefix.
pub fn normalize_phone(phone: &str) -> GymResult<String> {
    let phone = phone.trim();
    let digits = phone.strip_prefix('+').unwrap_or(phone);

    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(GymError::InvalidInput(
            "Phone number may only contain digits and a leading +".to_string(),
        ));
    }

    if !(7..=15).contains(&digits.len()) {
        return Err(GymError::InvalidInput(
            "Phone number must have 7 to 15 digits".to_string(),
        ));
    }

    Ok(format!("+{digits}"))
}

/// Full years between `birth` and `today`
pub fn age_on(birth: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        age -= 1;
    }
    age
}

pub fn validate_birth_date(birth: NaiveDate, today: NaiveDate) -> GymResult<()> {
    if birth > today {
        return Err(GymError::InvalidInput(
            "Birth date cannot be in the future".to_string(),
        ));
    }
    Ok(())
}

pub fn validate_trainer_age(birth: NaiveDate, today: NaiveDate) -> GymResult<()> {
    validate_birth_date(birth, today)?;
    if age_on(birth, today) < MIN_TRAINER_AGE {
        return Err(GymError::InvalidInput(format!(
            "Trainer must be at least {MIN_TRAINER_AGE} years old"
        )));
    }
    Ok(())
}

/// Minimum length counted in characters, not bytes
pub fn validate_min_chars(field: &str, value: &str, min: usize) -> GymResult<()> {
    if value.trim().chars().count() < min {
        return Err(GymError::InvalidInput(format!(
            "{field} must be at least {min} characters long"
        )));
    }
    Ok(())
}
