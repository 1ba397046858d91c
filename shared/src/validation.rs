//! Input validation helpers shared by the backend services

use thiserror::Error;

/// A field-level validation failure with messages in both display languages
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message_en}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message_en: &'static str,
    pub message_fr: &'static str,
}

/// Validate a movement quantity (cartons); zero and negative are rejected
pub fn validate_quantity(quantity: i32) -> Result<(), ValidationError> {
    if quantity <= 0 {
        return Err(ValidationError {
            field: "quantity",
            message_en: "Quantity must be a positive integer",
            message_fr: "La quantité doit être un entier positif",
        });
    }
    Ok(())
}

/// Validate a display name (product, customer, family)
pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError {
            field: "name",
            message_en: "Name cannot be empty",
            message_fr: "Le nom ne peut pas être vide",
        });
    }
    if trimmed.len() > 120 {
        return Err(ValidationError {
            field: "name",
            message_en: "Name is too long (max 120 characters)",
            message_fr: "Le nom est trop long (120 caractères maximum)",
        });
    }
    Ok(())
}

/// Validate a login username: 3-32 characters, alphanumeric plus `._-`
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username.len() < 3 || username.len() > 32 {
        return Err(ValidationError {
            field: "username",
            message_en: "Username must be 3-32 characters",
            message_fr: "Le nom d'utilisateur doit faire 3 à 32 caractères",
        });
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
    {
        return Err(ValidationError {
            field: "username",
            message_en: "Username may only contain letters, digits, '.', '_' and '-'",
            message_fr: "Le nom d'utilisateur ne peut contenir que des lettres, chiffres, '.', '_' et '-'",
        });
    }
    Ok(())
}

/// Minimum password strength check
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.len() < 8 {
        return Err(ValidationError {
            field: "password",
            message_en: "Password must be at least 8 characters",
            message_fr: "Le mot de passe doit faire au moins 8 caractères",
        });
    }
    Ok(())
}

/// Validate an email address
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if validator::validate_email(email) {
        Ok(())
    } else {
        Err(ValidationError {
            field: "email",
            message_en: "Invalid email address",
            message_fr: "Adresse e-mail invalide",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantity_must_be_positive() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-5).is_err());
    }

    #[test]
    fn usernames_are_restricted() {
        assert!(validate_username("gerant.stock").is_ok());
        assert!(validate_username("ab").is_err());
        assert!(validate_username("bad user").is_err());
    }

    #[test]
    fn email_shapes() {
        assert!(validate_email("stock@condifri.ma").is_ok());
        assert!(validate_email("not-an-email").is_err());
    }

    #[test]
    fn errors_carry_both_languages() {
        let err = validate_quantity(0).unwrap_err();
        assert_eq!(err.field, "quantity");
        assert!(!err.message_en.is_empty());
        assert!(!err.message_fr.is_empty());
    }
}
