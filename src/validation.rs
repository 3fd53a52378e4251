use crate::constants::MAX_PACKAGE_NAME_LEN;
use crate::error::AppError;

/// Validate a package identifier destined for the locked-app set.
/// Returns the trimmed identifier if valid.
pub fn validate_package_name(package: &str) -> Result<&str, AppError> {
    let err = |reason: String| AppError::InvalidInput {
        field: "package",
        reason,
    };

    let package = package.trim();
    if package.is_empty() {
        return Err(err("cannot be empty".into()));
    }
    if package.len() > MAX_PACKAGE_NAME_LEN {
        return Err(err(format!("cannot exceed {MAX_PACKAGE_NAME_LEN} characters")));
    }
    if let Some(bad) = package
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')))
    {
        return Err(err(format!("invalid character '{bad}'")));
    }

    Ok(package)
}

/// Validate every entry of a locked-app list, dropping duplicates while keeping order.
pub fn validate_package_list(packages: &[String]) -> Result<Vec<String>, AppError> {
    let mut validated: Vec<String> = Vec::with_capacity(packages.len());
    for package in packages {
        let package = validate_package_name(package)?;
        if !validated.iter().any(|p| p == package) {
            validated.push(package.to_string());
        }
    }
    Ok(validated)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_package_names() {
        assert_eq!(validate_package_name("com.example.app").unwrap(), "com.example.app");
        assert_eq!(validate_package_name("  org.foo_bar-2  ").unwrap(), "org.foo_bar-2");
        assert!(validate_package_name("firefox").is_ok());
    }

    #[test]
    fn test_rejects_empty() {
        assert!(validate_package_name("").is_err());
        assert!(validate_package_name("   ").is_err());
    }

    #[test]
    fn test_rejects_separator_and_whitespace() {
        // A comma would split into two entries once persisted
        assert!(validate_package_name("com.a,com.b").is_err());
        assert!(validate_package_name("com a").is_err());
    }

    #[test]
    fn test_rejects_overlong_name() {
        let name = "a".repeat(MAX_PACKAGE_NAME_LEN + 1);
        assert!(validate_package_name(&name).is_err());
        let name = "a".repeat(MAX_PACKAGE_NAME_LEN);
        assert!(validate_package_name(&name).is_ok());
    }

    #[test]
    fn test_package_list_dedupes_in_order() {
        let input = vec!["com.b".to_string(), "com.a".to_string(), " com.b".to_string()];
        assert_eq!(validate_package_list(&input).unwrap(), vec!["com.b", "com.a"]);
    }

    #[test]
    fn test_package_list_fails_on_any_invalid_entry() {
        let input = vec!["com.a".to_string(), String::new()];
        assert!(validate_package_list(&input).is_err());
    }
}
