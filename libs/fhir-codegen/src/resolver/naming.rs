//! Enum member naming and collision resolution

use crate::ir::EnumMember;
use heck::ToUpperCamelCase;

/// Fixed names for comparison operator codes
fn operator_name(code: &str) -> Option<&'static str> {
    match code {
        "=" => Some("Equals"),
        "<" => Some("LessThan"),
        "<=" => Some("LessThanOrEqual"),
        ">" => Some("GreaterThan"),
        ">=" => Some("GreaterThanOrEqual"),
        _ => None,
    }
}

fn starts_with_digit(text: &str) -> bool {
    text.chars().next().is_some_and(|c| c.is_ascii_digit())
}

/// Drop parenthesized runs, including nested ones
fn strip_parenthesized(text: &str) -> String {
    let mut depth = 0usize;
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            _ if depth == 0 => out.push(c),
            _ => {}
        }
    }
    out
}

/// Turn free text into an identifier, `None` when nothing usable remains
pub fn format_identifier(text: &str) -> Option<String> {
    let name = strip_parenthesized(text).to_upper_camel_case();
    if name.is_empty() {
        None
    } else if starts_with_digit(&name) {
        Some(format!("_{name}"))
    } else {
        Some(name)
    }
}

/// Assigns unique, identifier-safe names to enum members
#[derive(Debug, Clone, Copy)]
pub struct NameAllocator {
    max_len: usize,
}

impl NameAllocator {
    pub fn new(max_len: usize) -> Self {
        Self { max_len }
    }

    fn fits(&self, text: &str) -> bool {
        text.chars().count() < self.max_len
    }

    fn description_candidate(&self, member: &EnumMember) -> Option<String> {
        member
            .description
            .as_deref()
            .filter(|d| self.fits(d))
            .and_then(format_identifier)
    }

    /// First usable candidate among operator, display, code, description, raw code
    pub fn primary_name(&self, member: &EnumMember) -> String {
        let code = member.value.as_str();
        if let Some(name) = operator_name(code).and_then(format_identifier) {
            return name;
        }
        if let Some(display) = member.display.as_deref().map(str::trim) {
            if self.fits(display) {
                if let Some(name) = format_identifier(&display.replace('*', "Star")) {
                    return name;
                }
            }
        }
        if !starts_with_digit(code) {
            if let Some(name) = format_identifier(code) {
                return name;
            }
        }
        if let Some(name) = self.description_candidate(member) {
            return name;
        }
        format_identifier(code).unwrap_or_else(|| "_".to_string())
    }

    /// Fallback used when the primary name collides
    fn alternate_name(&self, member: &EnumMember) -> Option<String> {
        if starts_with_digit(&member.value) {
            self.description_candidate(member)
        } else {
            format_identifier(&member.value)
        }
    }

    /// Add a member, keeping names unique within `members`.
    ///
    /// Returns the index now holding the member. A member identical to the
    /// one already owning its name is dropped and that index is returned.
    pub fn insert(&self, members: &mut Vec<EnumMember>, mut member: EnumMember) -> usize {
        let taken = |members: &[EnumMember], name: &str| members.iter().any(|m| m.name == name);

        let Some(existing) = members.iter().position(|m| m.name == member.name) else {
            members.push(member);
            return members.len() - 1;
        };
        if members[existing].same_content(&member) {
            return existing;
        }

        if let Some(alternate) = self.alternate_name(&member) {
            if !taken(members, &alternate) {
                member.name = alternate;
                members.push(member);
                return members.len() - 1;
            }
        }

        if let Some(alternate) = self.alternate_name(&members[existing]) {
            if !taken(members, &alternate) {
                tracing::debug!(
                    from = %members[existing].name,
                    to = %alternate,
                    "Renaming colliding enum member"
                );
                members[existing].name = alternate;
                members.push(member);
                return members.len() - 1;
            }
        }

        let original = member.name.clone();
        let mut suffix = 1usize;
        loop {
            let candidate = format!("{original}_{suffix}");
            if !taken(members, &candidate) {
                member.name = candidate;
                members.push(member);
                return members.len() - 1;
            }
            suffix += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(code: &str, display: Option<&str>) -> EnumMember {
        let mut member = EnumMember::new(code);
        member.display = display.map(String::from);
        member
    }

    fn named(allocator: &NameAllocator, code: &str, display: Option<&str>) -> EnumMember {
        let mut m = member(code, display);
        m.name = allocator.primary_name(&m);
        m
    }

    #[test]
    fn test_format_identifier() {
        assert_eq!(format_identifier("entered-in-error").as_deref(), Some("EnteredInError"));
        assert_eq!(format_identifier("Active (Other)").as_deref(), Some("Active"));
        assert_eq!(format_identifier("3rd party").as_deref(), Some("_3rdParty"));
        assert_eq!(format_identifier("(only this)"), None);
        assert_eq!(format_identifier("<="), None);
    }

    #[test]
    fn test_operator_codes() {
        let allocator = NameAllocator::new(56);
        let m = member("<=", Some("Less than or equal to"));
        assert_eq!(allocator.primary_name(&m), "LessThanOrEqual");
        assert_eq!(allocator.primary_name(&member(">=", None)), "GreaterThanOrEqual");
    }

    #[test]
    fn test_display_preferred_and_star_replaced() {
        let allocator = NameAllocator::new(56);
        assert_eq!(allocator.primary_name(&member("m", Some(" Male "))), "Male");
        assert_eq!(allocator.primary_name(&member("*", Some("*"))), "Star");
    }

    #[test]
    fn test_long_display_falls_back_to_code() {
        let allocator = NameAllocator::new(10);
        let m = member("final", Some("The observation is complete"));
        assert_eq!(allocator.primary_name(&m), "Final");
    }

    #[test]
    fn test_digit_led_code_uses_description() {
        let allocator = NameAllocator::new(20);
        let mut m = member("8480-6", Some("Systolic blood pressure measured"));
        m.description = Some("Systolic BP".to_string());
        assert_eq!(allocator.primary_name(&m), "SystolicBp");

        m.description = None;
        assert_eq!(allocator.primary_name(&m), "_84806");
    }

    #[test]
    fn test_identical_member_is_dropped() {
        let allocator = NameAllocator::new(56);
        let mut members = Vec::new();
        let first = named(&allocator, "active", Some("Active"));
        assert_eq!(allocator.insert(&mut members, first.clone()), 0);
        assert_eq!(allocator.insert(&mut members, first), 0);
        assert_eq!(members.len(), 1);
    }

    #[test]
    fn test_collision_renames_new_member_to_code() {
        let allocator = NameAllocator::new(56);
        let mut members = Vec::new();
        allocator.insert(&mut members, named(&allocator, "a", Some("Same")));
        allocator.insert(&mut members, named(&allocator, "b", Some("Same")));

        let names: Vec<_> = members.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Same", "B"]);
    }

    #[test]
    fn test_collision_renames_existing_member() {
        let allocator = NameAllocator::new(56);
        let mut members = Vec::new();
        // Existing owns "Open"; the new member's code alternate is also "Open".
        allocator.insert(&mut members, named(&allocator, "initial", Some("Open")));
        allocator.insert(&mut members, named(&allocator, "open", Some("Open")));

        let names: Vec<_> = members.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Initial", "Open"]);
    }

    #[test]
    fn test_collision_falls_back_to_suffix() {
        let allocator = NameAllocator::new(56);
        let mut members = Vec::new();
        let mut first = named(&allocator, "active", Some("Active"));
        first.system = Some("http://example.org/a".to_string());
        let mut second = named(&allocator, "active", Some("Active (Other)"));
        second.system = Some("http://example.org/b".to_string());

        allocator.insert(&mut members, first);
        allocator.insert(&mut members, second);

        let names: Vec<_> = members.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Active", "Active_1"]);
    }
}
