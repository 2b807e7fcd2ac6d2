//! Textual comparison report

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::fmt::Write;

use super::{DiffResult, ParamDiff};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

const RULE_WIDTH: usize = 80;

/// Shown in place of the value of a parameter missing from one of the lists.
const MISSING: &str = "X";

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Render the comparison report.
///
/// Each row reads `NAME : value_1 <div> value_2`, where the divider is `<` for a parameter only in
/// the second list, `>` for a parameter only in the first list and `|` for a changed value.
pub fn render(result: &DiffResult, file_1: Option<&str>, file_2: Option<&str>) -> String {
    let file_1 = file_1.unwrap_or("List 1");
    let file_2 = file_2.unwrap_or("List 2");

    let mut name_len = 1;
    let mut value_1_len = file_1.len();
    let mut value_2_len = file_2.len();

    for diff in result.iter() {
        name_len = name_len.max(diff.name().len());
        value_1_len = value_1_len.max(value_1(diff).len());
        value_2_len = value_2_len.max(value_2(diff).len());
    }

    let mut out = String::new();
    let rule = "-".repeat(RULE_WIDTH);
    let double_rule = "=".repeat(RULE_WIDTH);

    // Writing into a String cannot fail
    let _ = writeln!(
        out,
        "{:n$} : {:v1$} | {:v2$}",
        "File comparison",
        file_1,
        file_2,
        n = name_len,
        v1 = value_1_len,
        v2 = value_2_len
    );
    let _ = writeln!(out, "{}", double_rule);

    for (id, diffs) in result.components() {
        if diffs.is_empty() {
            continue;
        }

        let _ = writeln!(out, "{}", rule);
        let _ = writeln!(out, "Component {}:", id);
        let _ = writeln!(out, "{}", rule);

        for diff in diffs {
            let _ = writeln!(
                out,
                "{:n$} : {:v1$} {} {:v2$}",
                diff.name(),
                value_1(diff),
                divider(diff),
                value_2(diff),
                n = name_len,
                v1 = value_1_len,
                v2 = value_2_len
            );
        }
    }

    let _ = writeln!(out, "{}", double_rule);
    let _ = writeln!(out, "{} parameters differ", result.count());

    out
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

fn value_1(diff: &ParamDiff) -> String {
    diff.old()
        .map(|p| p.pretty_value())
        .unwrap_or_else(|| MISSING.to_string())
}

fn value_2(diff: &ParamDiff) -> String {
    diff.new()
        .map(|p| p.pretty_value())
        .unwrap_or_else(|| MISSING.to_string())
}

fn divider(diff: &ParamDiff) -> char {
    match diff {
        ParamDiff::Added(_) => '<',
        ParamDiff::Removed(_) => '>',
        ParamDiff::Changed { .. } => '|',
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::compare::diff;
    use crate::test_utils::list;
    use params_if::ParamValue;

    #[test]
    fn test_render() {
        let a = list(&[("AA", ParamValue::Int(1)), ("B", ParamValue::Float(0.5))]);
        let b = list(&[("B", ParamValue::Float(0.25)), ("C", ParamValue::Int(3))]);

        let report = render(&diff(&a, &b, &[]), Some("a"), Some("b"));
        let lines: Vec<&str> = report.lines().collect();

        assert_eq!(lines[0], "File comparison : a   | b   ");
        assert_eq!(lines[1], "=".repeat(80));
        assert_eq!(lines[3], "Component 1-1:");
        assert_eq!(lines[5], "AA : 1   > X   ");
        assert_eq!(lines[6], "B  : 0.5 | 0.25");
        assert_eq!(lines[7], "C  : X   < 3   ");
        assert_eq!(lines[9], "3 parameters differ");
    }

    #[test]
    fn test_render_empty() {
        let a = list(&[("A", ParamValue::Int(1))]);
        let report = render(&diff(&a, &a, &[]), None, None);

        assert!(report.starts_with("File comparison : List 1 | List 2\n"));
        assert!(report.ends_with("0 parameters differ\n"));
        assert!(!report.contains("Component"));
    }
}
