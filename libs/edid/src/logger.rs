use std::fmt::{Display, Write};

use crate::policy::{self, Rule, Severity};

/// Collects conformance failures for one section of the blob (the base
/// block, or one extension block) into a shared text report.
///
/// Logging a failure never stops decoding. The section header is written
/// lazily, so sections without failures leave no trace in the report.
pub(crate) struct FailureLogger<'a> {
    out: &'a mut String,
    section: String,
    initialized: bool,
}

impl<'a> FailureLogger<'a> {
    pub fn new(out: &'a mut String, section: impl Into<String>) -> Self {
        Self {
            out,
            section: section.into(),
            initialized: false,
        }
    }

    /// Runs `f` with a logger for another section writing into the same
    /// report. If that section logged anything, later failures of this
    /// section get a fresh header so they don't read as part of it.
    pub fn in_section<T>(
        &mut self,
        section: impl Into<String>,
        f: impl FnOnce(&mut FailureLogger<'_>) -> T,
    ) -> T {
        let mut nested = FailureLogger::new(&mut *self.out, section);
        let result = f(&mut nested);
        if nested.initialized {
            self.initialized = false;
        }
        result
    }

    pub fn add_failure(&mut self, message: impl Display) {
        log::debug!("{}: {}", self.section, message);

        if !self.initialized {
            if !self.out.is_empty() {
                self.out.push('\n');
            }
            // Writing into a String can't fail
            let _ = writeln!(self.out, "{}:", self.section);
            self.initialized = true;
        }

        let _ = writeln!(self.out, "  {}", message);
    }

    /// Looks up `rule` in the conformance policy for `revision`, logs the
    /// message if the policy says so and hands the verdict back to the
    /// caller. The message is only built when it is actually logged.
    pub fn check<M, F>(&mut self, rule: Rule, revision: u8, message: F) -> Severity
    where
        M: Display,
        F: FnOnce() -> M,
    {
        let severity = policy::severity(rule, revision);
        if severity.is_logged() {
            self.add_failure(message());
        }
        severity
    }
}

#[cfg(test)]
mod test {
    use super::FailureLogger;
    use crate::policy::{Rule, Severity};

    #[test]
    fn test_section_header_written_once() {
        let mut report = String::new();
        let mut logger = FailureLogger::new(&mut report, "Block 0, Base EDID");
        logger.add_failure("first");
        logger.add_failure("second");

        assert_eq!(report, "Block 0, Base EDID:\n  first\n  second\n");
    }

    #[test]
    fn test_sections_are_separated() {
        let mut report = String::new();
        {
            let mut base = FailureLogger::new(&mut report, "Block 0, Base EDID");
            base.add_failure("base failure");
            base.in_section("Block 1, CTA-861 Extension Block", |ext| {
                ext.add_failure("ext failure");
            });
        }

        assert_eq!(
            report,
            "Block 0, Base EDID:\n  base failure\n\nBlock 1, CTA-861 Extension Block:\n  ext failure\n"
        );
    }

    #[test]
    fn test_header_repeated_after_nested_section() {
        let mut report = String::new();
        {
            let mut base = FailureLogger::new(&mut report, "Block 0, Base EDID");
            base.add_failure("first");
            base.in_section("Block 1, CTA-861 Extension Block", |ext| {
                ext.add_failure("nested");
            });
            base.add_failure("second");
        }

        assert_eq!(
            report,
            "Block 0, Base EDID:\n  first\n\nBlock 1, CTA-861 Extension Block:\n  nested\n\nBlock 0, Base EDID:\n  second\n"
        );
    }

    #[test]
    fn test_quiet_section_leaves_no_header() {
        let mut report = String::new();
        {
            let mut base = FailureLogger::new(&mut report, "Block 0, Base EDID");
            base.in_section("Block 1, CTA-861 Extension Block", |_| ());
            base.add_failure("base only");
        }
        assert_eq!(report, "Block 0, Base EDID:\n  base only\n");
    }

    #[test]
    fn test_check_respects_policy() {
        let mut report = String::new();
        let mut logger = FailureLogger::new(&mut report, "Block 0, Base EDID");

        // Gated until revision 4
        let late = logger.check(Rule::InvalidManufactureWeek, 5, || "late");
        let early = logger.check(Rule::InvalidManufactureWeek, 3, || "early");

        assert_eq!(late, Severity::Ignore);
        assert_eq!(early, Severity::Soft);
        assert_eq!(report, "Block 0, Base EDID:\n  early\n");
    }
}
