use super::{is_valid_url, text, Checks, Validation};
use crate::profile::dto::ProfileInput;
use crate::profile::repo_types::SocialPlatform;

pub fn validate_profile(input: &ProfileInput) -> Validation {
    let mut checks = Checks::default();

    let handle = text(&input.handle);
    if checks.required("handle", handle, "Profile handle is required") {
        checks.length("handle", handle, 2, 40, "Handle needs to be between 2 and 40 characters");
    }
    checks.required("status", text(&input.status), "Status field is required");
    checks.required("skills", text(&input.skills), "Skills field is required");

    let website = text(&input.website);
    if !website.is_empty() && !is_valid_url(website) {
        checks.fail("website", "Not a valid URL");
    }
    for platform in SocialPlatform::ALL {
        let url = text(input.social(platform));
        if !url.is_empty() && !is_valid_url(url) {
            checks.fail(platform.as_str(), "Not a valid URL");
        }
    }

    checks.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal() -> ProfileInput {
        ProfileInput {
            handle: Some("ada".into()),
            status: Some("Developer".into()),
            skills: Some("rust,sql".into()),
            ..Default::default()
        }
    }

    #[test]
    fn minimal_profile_is_valid() {
        assert!(validate_profile(&minimal()).is_valid);
    }

    #[test]
    fn required_fields_reported() {
        let outcome = validate_profile(&ProfileInput::default());
        assert_eq!(outcome.errors["handle"], "Profile handle is required");
        assert_eq!(outcome.errors["status"], "Status field is required");
        assert_eq!(outcome.errors["skills"], "Skills field is required");
    }

    #[test]
    fn handle_length_bounds() {
        let mut input = minimal();
        input.handle = Some("a".into());
        assert!(validate_profile(&input).errors.contains_key("handle"));
        input.handle = Some("a".repeat(41));
        assert!(validate_profile(&input).errors.contains_key("handle"));
        input.handle = Some("a".repeat(40));
        assert!(validate_profile(&input).is_valid);
    }

    #[test]
    fn urls_checked_only_when_present() {
        let mut input = minimal();
        input.website = Some(String::new());
        input.twitter = Some("not a url".into());
        input.linkedin = Some("https://linkedin.com/in/ada".into());
        let outcome = validate_profile(&input);
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.errors["twitter"], "Not a valid URL");
    }
}
