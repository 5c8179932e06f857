//! Report identifier demangling and containment checks for matching test
//! reports against test source files.

/// Extension appended to every demangled test class name.
pub const SOURCE_EXTENSION: &str = ".js";

/// A report identifier split into its run prefix and test class.
///
/// JsTestDriver names each result `<browser>_<buildId>_<os>.<ClassName>`,
/// where the class name may be package qualified with dots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportIdentifier<'a> {
    pub browser: &'a str,
    pub build_id: &'a str,
    pub os: &'a str,
    pub class_name: &'a str,
}

impl<'a> ReportIdentifier<'a> {
    /// Split `identifier` into its parts.
    ///
    /// Returns `None` unless the text before the first `.` is exactly three
    /// non-empty `_`-separated tokens and a class name follows it.
    ///
    /// # Examples
    ///
    /// ```
    /// use jstd_path::ReportIdentifier;
    ///
    /// let id = ReportIdentifier::parse("Chrome_16091263_Windows.com.company.PersonTest").unwrap();
    /// assert_eq!(id.browser, "Chrome");
    /// assert_eq!(id.class_name, "com.company.PersonTest");
    /// assert!(ReportIdentifier::parse("PersonTest").is_none());
    /// ```
    #[must_use]
    pub fn parse(identifier: &'a str) -> Option<Self> {
        let (prefix, class_name) = identifier.split_once('.')?;
        if class_name.is_empty() {
            return None;
        }
        let mut tokens = prefix.split('_');
        let browser = tokens.next().filter(|t| !t.is_empty())?;
        let build_id = tokens.next().filter(|t| !t.is_empty())?;
        let os = tokens.next().filter(|t| !t.is_empty())?;
        if tokens.next().is_some() {
            return None;
        }
        Some(Self {
            browser,
            build_id,
            os,
            class_name,
        })
    }
}

/// Map a report identifier to the relative path of the test source file.
///
/// The run prefix is dropped, package dots become `/` and `.js` is
/// appended. Identifiers without a well-formed run prefix are kept whole as
/// a single file name.
///
/// # Examples
///
/// ```
/// use jstd_path::demangle;
///
/// assert_eq!(demangle("Chrome_16091263_Windows.com.company.PersonTest"), "com/company/PersonTest.js");
/// assert_eq!(demangle("Chrome_16091263_Windows.PersonTest"), "PersonTest.js");
/// assert_eq!(demangle("PersonTest"), "PersonTest.js");
/// ```
#[must_use]
pub fn demangle(identifier: &str) -> String {
    let identifier = identifier.trim();
    match ReportIdentifier::parse(identifier) {
        Some(id) => format!("{}{SOURCE_EXTENSION}", id.class_name.replace('.', "/")),
        None => format!("{identifier}{SOURCE_EXTENSION}"),
    }
}

/// Check that `path` stays strictly below the directory it is joined to,
/// returning it with forward slashes.
///
/// Both `/` and `\` separate components. Absolute paths, drive prefixes
/// and empty, `.` or `..` components are rejected.
///
/// # Examples
///
/// ```
/// use jstd_path::contained_path;
///
/// assert_eq!(
///     contained_path(r"com\company\PersonTest.js").as_deref(),
///     Some("com/company/PersonTest.js")
/// );
/// assert_eq!(contained_path("../../secret.js"), None);
/// assert_eq!(contained_path("/tmp/x.js"), None);
/// ```
#[must_use]
pub fn contained_path(path: &str) -> Option<String> {
    let components: Vec<&str> = path.split(['/', '\\']).collect();
    components
        .iter()
        .all(|c| !c.is_empty() && *c != "." && *c != ".." && !c.contains(':'))
        .then(|| components.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn demangle_packaged_class() {
        assert_eq!(
            demangle("Chrome_16091263_Windows.com.company.PersonTest"),
            "com/company/PersonTest.js"
        );
    }

    #[test]
    fn demangle_default_package_class() {
        assert_eq!(demangle("Chrome_16091263_Windows.PersonTest"), "PersonTest.js");
    }

    #[test]
    fn demangle_without_run_prefix_keeps_identifier_whole() {
        assert_eq!(demangle("com.company.PersonTest"), "com.company.PersonTest.js");
    }

    #[test]
    fn demangle_with_underscored_browser_keeps_identifier_whole() {
        assert_eq!(
            demangle("Mobile_Safari_6_iOS.PersonTest"),
            "Mobile_Safari_6_iOS.PersonTest.js"
        );
    }

    #[test]
    fn parse_rejects_empty_tokens() {
        assert!(ReportIdentifier::parse("Chrome__Windows.PersonTest").is_none());
        assert!(ReportIdentifier::parse("Chrome_1_Windows.").is_none());
    }

    #[test]
    fn escaping_identifiers_demangle_to_uncontained_paths() {
        assert_eq!(contained_path(&demangle("../../secret")), None);
        assert_eq!(demangle("Chrome_1_Windows..tmp.x"), "/tmp/x.js");
        assert_eq!(contained_path(&demangle("Chrome_1_Windows..tmp.x")), None);
        assert_eq!(contained_path("C:/x.js"), None);
        assert_eq!(contained_path("a//b.js"), None);
    }

    #[test]
    fn contained_path_accepts_package_paths() {
        assert_eq!(
            contained_path(&demangle("Chrome_1_Windows.com.company.PersonTest")).as_deref(),
            Some("com/company/PersonTest.js")
        );
    }

    proptest! {
        #[test]
        fn demangle_always_ends_with_extension(id in "\\PC*") {
            prop_assert!(demangle(&id).ends_with(SOURCE_EXTENSION));
        }

        #[test]
        fn contained_path_is_idempotent(path in "\\PC*") {
            if let Some(once) = contained_path(&path) {
                prop_assert_eq!(contained_path(&once), Some(once.clone()));
            }
        }
    }
}
