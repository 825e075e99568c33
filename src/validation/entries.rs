use super::{parse_date, text, Checks, Validation};
use crate::profile::dto::{EducationInput, ExperienceInput};

fn check_dates(checks: &mut Checks, from: &Option<String>, to: &Option<String>) {
    let from = text(from);
    if checks.required("from", from, "From date field is required") && parse_date(from).is_none() {
        checks.fail("from", "From date must be a YYYY-MM-DD date");
    }
    let to = text(to);
    if !to.is_empty() && parse_date(to).is_none() {
        checks.fail("to", "To date must be a YYYY-MM-DD date");
    }
}

pub fn validate_experience(input: &ExperienceInput) -> Validation {
    let mut checks = Checks::default();
    checks.required("title", text(&input.title), "Job title field is required");
    checks.required("company", text(&input.company), "Company field is required");
    check_dates(&mut checks, &input.from, &input.to);
    checks.finish()
}

pub fn validate_education(input: &EducationInput) -> Validation {
    let mut checks = Checks::default();
    checks.required("school", text(&input.school), "School field is required");
    checks.required("degree", text(&input.degree), "Degree field is required");
    checks.required(
        "fieldofstudy",
        text(&input.fieldofstudy),
        "Field of study field is required",
    );
    check_dates(&mut checks, &input.from, &input.to);
    checks.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn experience_required_fields() {
        let outcome = validate_experience(&ExperienceInput::default());
        assert_eq!(outcome.errors.len(), 3);
        assert_eq!(outcome.errors["title"], "Job title field is required");
        assert_eq!(outcome.errors["company"], "Company field is required");
        assert_eq!(outcome.errors["from"], "From date field is required");
    }

    #[test]
    fn to_before_from_is_not_checked() {
        let outcome = validate_experience(&ExperienceInput {
            title: Some("Engineer".into()),
            company: Some("Acme".into()),
            from: Some("2020-01-01".into()),
            to: Some("2010-01-01".into()),
            ..Default::default()
        });
        assert!(outcome.is_valid);
    }

    #[test]
    fn malformed_dates_rejected() {
        let outcome = validate_education(&EducationInput {
            school: Some("MIT".into()),
            degree: Some("BSc".into()),
            fieldofstudy: Some("CS".into()),
            from: Some("last year".into()),
            to: Some("2020-13-01".into()),
            ..Default::default()
        });
        assert_eq!(outcome.errors["from"], "From date must be a YYYY-MM-DD date");
        assert_eq!(outcome.errors["to"], "To date must be a YYYY-MM-DD date");
    }

    #[test]
    fn education_required_fields() {
        let outcome = validate_education(&EducationInput::default());
        for field in ["school", "degree", "fieldofstudy", "from"] {
            assert!(outcome.errors.contains_key(field), "missing {field}");
        }
    }
}
