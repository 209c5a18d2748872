//! HTML synthesis for reports
//!
//! The markup is deliberately plain (tables, headings, inline CSS) so that
//! both the built-in rasterizer and external HTML engines can consume it.

use super::rows::{
    AcademicRow, DepartmentReport, DepartmentStudentRow, EducationRow, PersonalRow, ReportRow,
    StudentReport,
};
use crate::config::{EMPTY_DEPARTMENT_MESSAGE, EMPTY_EDUCATION_MESSAGE, EMPTY_REPORT_MESSAGE};

const DEPARTMENT_STYLE: &str = "body{font-family:Arial,sans-serif;padding:20px}\
.report-title{text-align:center;font-size:22px;font-weight:bold;margin-bottom:15px;color:#2a2a2a}\
.department-title{background-color:#555;color:#fff;padding:8px;font-size:16px;margin-top:20px;margin-bottom:10px}\
.student-table{width:100%;border-collapse:collapse;margin-bottom:20px}\
.student-table th,.student-table td{border:1px solid #bbb;padding:8px;text-align:center;font-size:12px}\
.student-table th{background-color:#333;color:#fff}\
.empty-row td{color:#999;font-style:italic}";

const STUDENT_STYLE: &str = "body{font-family:Arial,sans-serif;margin:20px}\
.report-header{text-align:center;background-color:#4a4a4a;color:#fff;padding:15px}\
.section-title{color:#333;border-bottom:2px solid #ddd;margin-top:30px;padding-bottom:5px}\
.data-table{width:100%;border-collapse:collapse;margin-bottom:20px}\
.data-table th,.data-table td{border:1px solid #ddd;padding:12px;text-align:left}\
.data-table th{background-color:#4a4a4a;color:#fff}\
.empty-row td{color:#999;font-style:italic;text-align:center}";

/// Escape text for inclusion in HTML content or attribute values
pub fn html_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn push_document_start(out: &mut String, title: &str, style: &str) {
    out.push_str("<html><head><meta charset=\"utf-8\"><title>");
    out.push_str(&html_escape(title));
    out.push_str("</title><style>");
    out.push_str(style);
    out.push_str("</style></head><body>");
}

/// One table with a header row; an empty body gets a single placeholder
/// row spanning every column.
fn push_table<R: ReportRow>(out: &mut String, class: &str, rows: &[R], empty_message: &str) {
    out.push_str(&format!("<table class=\"{}\"><tr>", class));
    for column in R::COLUMNS {
        out.push_str(&format!("<th>{}</th>", html_escape(column)));
    }
    out.push_str("</tr>");

    if rows.is_empty() {
        out.push_str(&format!(
            "<tr class=\"empty-row\"><td colspan=\"{}\">{}</td></tr>",
            R::COLUMNS.len(),
            html_escape(empty_message)
        ));
    } else {
        for row in rows {
            out.push_str("<tr>");
            for cell in row.cells() {
                out.push_str(&format!("<td>{}</td>", html_escape(&cell)));
            }
            out.push_str("</tr>");
        }
    }

    out.push_str("</table>");
}

pub fn render_department_report(report: &DepartmentReport) -> String {
    let title = format!("Department Report - {}", report.label);
    let mut s = String::new();
    push_document_start(&mut s, &title, DEPARTMENT_STYLE);
    s.push_str(&format!("<div class=\"report-title\">{}</div>", html_escape(&title)));

    if report.student_count() == 0 {
        s.push_str(&format!(
            "<div class=\"department-title\">Department: {}</div>",
            html_escape(&report.label)
        ));
        push_table::<DepartmentStudentRow>(&mut s, "student-table", &[], EMPTY_REPORT_MESSAGE);
    } else {
        for group in &report.groups {
            s.push_str(&format!(
                "<div class=\"department-title\">Department: {}</div>",
                html_escape(&group.department)
            ));
            push_table(&mut s, "student-table", &group.rows, EMPTY_DEPARTMENT_MESSAGE);
        }
    }

    s.push_str("</body></html>");
    s
}

pub fn render_student_report(report: &StudentReport) -> String {
    let title = report.title();
    let mut s = String::new();
    push_document_start(&mut s, &title, STUDENT_STYLE);
    s.push_str(&format!(
        "<div class=\"report-header\"><h1>{}</h1></div>",
        html_escape(&title)
    ));

    s.push_str("<h2 class=\"section-title\">Personal Information</h2>");
    push_table::<PersonalRow>(
        &mut s,
        "data-table",
        std::slice::from_ref(&report.personal),
        "No personal information available",
    );

    s.push_str("<h2 class=\"section-title\">Academic Performance</h2>");
    push_table::<AcademicRow>(
        &mut s,
        "data-table",
        std::slice::from_ref(&report.academic),
        "No academic information available",
    );

    s.push_str("<h2 class=\"section-title\">Education History</h2>");
    push_table::<EducationRow>(&mut s, "data-table", &report.education, EMPTY_EDUCATION_MESSAGE);

    s.push_str("</body></html>");
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student_row(department: &str, name: &str) -> DepartmentStudentRow {
        DepartmentStudentRow {
            department: Some(department.to_string()),
            name: Some(name.to_string()),
            father_name: Some("Father".to_string()),
            age: 21,
            grade: Some("A".to_string()),
            total_marks: 500.0,
            obtained_marks: 437.5,
            percentage: 87.5,
        }
    }

    fn section<'a>(html: &'a str, heading: &str) -> &'a str {
        let start = html.find(heading).unwrap();
        let rest = &html[start..];
        let end = rest.find("</table>").unwrap();
        &rest[..end]
    }

    #[test]
    fn test_html_escape() {
        assert_eq!(html_escape("<b>O'Neil & Sons</b>"), "&lt;b&gt;O&#39;Neil &amp; Sons&lt;/b&gt;");
    }

    #[test]
    fn test_department_report_groups() {
        let scope = vec!["A".to_string(), "B".to_string()];
        let report = DepartmentReport::build(
            "ALL",
            &scope,
            vec![student_row("A", "First"), student_row("A", "Second")],
        );
        let html = render_department_report(&report);

        let a = section(&html, "Department: A</div>");
        assert_eq!(a.matches("<tr>").count(), 3, "header plus two data rows");
        assert!(a.contains(
            "<th>Name</th><th>Father Name</th><th>Age</th><th>Grade</th><th>Total Marks</th><th>Obtained Marks</th><th>Percentage</th>"
        ));
        assert!(a.contains("<td>87.50%</td>"));
        assert!(a.contains("<td>437.5</td>"));

        let b = section(&html, "Department: B</div>");
        assert_eq!(b.matches("<td colspan=\"7\">").count(), 1);
        assert!(b.contains("No students in this department"));
        assert!(!b.contains("<tr><td>"));
    }

    #[test]
    fn test_empty_department_report_has_single_placeholder_table() {
        let report = DepartmentReport::build("MATH", &["MATH".to_string()], vec![]);
        let html = render_department_report(&report);

        assert_eq!(html.matches("<table").count(), 1);
        assert!(html.contains("No student records found for this department"));
        assert!(html.contains("Department Report - MATH"));
    }

    #[test]
    fn test_student_report_sections_in_order() {
        let report = StudentReport {
            student_id: "s1".to_string(),
            student_name: Some("Ali".to_string()),
            personal: PersonalRow {
                name: Some("Ali".to_string()),
                father_name: None,
                age: Some(20),
                gender: Some("Male"),
                department: Some("BSCS".to_string()),
                grade: None,
            },
            academic: AcademicRow {
                total_marks: Some(100.0),
                obtained_marks: Some(87.5),
                percentage: Some(87.5),
            },
            education: vec![],
        };
        let html = render_student_report(&report);

        let personal = html.find("Personal Information").unwrap();
        let academic = html.find("Academic Performance").unwrap();
        let education = html.find("Education History").unwrap();
        assert!(personal < academic && academic < education);

        assert!(html.contains("<title>Student Report - Ali</title>"));
        let history = section(&html, "Education History");
        assert_eq!(history.matches("<td colspan=\"3\">").count(), 1);
        assert!(history.contains("No education history available"));
    }

    #[test]
    fn test_values_are_escaped() {
        let report = DepartmentReport::build("R&D", &[], vec![student_row("R&D", "<script>")]);
        let html = render_department_report(&report);

        assert!(html.contains("Department: R&amp;D"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }
}
