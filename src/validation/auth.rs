use super::{is_valid_email, text, Checks, Validation};
use crate::auth::dto::{LoginRequest, RegisterRequest};

pub fn validate_register(req: &RegisterRequest) -> Validation {
    let mut checks = Checks::default();

    let name = text(&req.name);
    if checks.required("name", name, "Name field is required") {
        checks.length("name", name, 2, 30, "Name must be between 2 and 30 characters");
    }

    let email = text(&req.email);
    if checks.required("email", email, "Email field is required") && !is_valid_email(email) {
        checks.fail("email", "Email is invalid");
    }

    // passwords are taken verbatim, whitespace included
    let password = req.password.as_deref().unwrap_or("");
    if checks.required("password", password, "Password field is required") {
        checks.length("password", password, 6, 30, "Password must be at least 6 characters");
    }

    let password2 = req.password2.as_deref().unwrap_or("");
    if checks.required("password2", password2, "Confirm password field is required")
        && password != password2
    {
        checks.fail("password2", "Passwords must match");
    }

    checks.finish()
}

pub fn validate_login(req: &LoginRequest) -> Validation {
    let mut checks = Checks::default();

    let email = text(&req.email);
    if checks.required("email", email, "Email field is required") && !is_valid_email(email) {
        checks.fail("email", "Email is invalid");
    }
    checks.required(
        "password",
        req.password.as_deref().unwrap_or(""),
        "Password field is required",
    );

    checks.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(name: &str, email: &str, password: &str, password2: &str) -> RegisterRequest {
        RegisterRequest {
            name: Some(name.into()),
            email: Some(email.into()),
            password: Some(password.into()),
            password2: Some(password2.into()),
        }
    }

    #[test]
    fn complete_registration_is_valid() {
        let outcome = validate_register(&register("Ada", "ada@example.com", "secret1", "secret1"));
        assert!(outcome.is_valid);
        assert!(outcome.errors.is_empty());
    }

    #[test]
    fn missing_fields_read_as_empty() {
        let outcome = validate_register(&RegisterRequest::default());
        assert!(!outcome.is_valid);
        assert_eq!(outcome.errors["name"], "Name field is required");
        assert_eq!(outcome.errors["email"], "Email field is required");
        assert_eq!(outcome.errors["password"], "Password field is required");
        assert_eq!(outcome.errors["password2"], "Confirm password field is required");
    }

    #[test]
    fn format_and_length_failures() {
        let outcome = validate_register(&register("A", "nope", "123", "124"));
        assert_eq!(outcome.errors["name"], "Name must be between 2 and 30 characters");
        assert_eq!(outcome.errors["email"], "Email is invalid");
        assert_eq!(outcome.errors["password"], "Password must be at least 6 characters");
        assert_eq!(outcome.errors["password2"], "Passwords must match");
    }

    #[test]
    fn login_requires_email_and_password() {
        let outcome = validate_login(&LoginRequest {
            email: Some("bad".into()),
            password: None,
        });
        assert_eq!(outcome.errors.len(), 2);
        assert_eq!(outcome.errors["email"], "Email is invalid");
        assert_eq!(outcome.errors["password"], "Password field is required");

        let ok = validate_login(&LoginRequest {
            email: Some("ada@example.com".into()),
            password: Some("x".into()),
        });
        assert!(ok.is_valid);
    }
}
