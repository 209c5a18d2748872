//! Typed report rows
//!
//! One struct per report section. Each row knows its fixed column set and
//! renders every column through a formatter from [`super::format`], so a
//! missing value never drops a column.

use super::format::{integer_cell, number_cell, percentage_cell, text_cell};
use crate::config::{
    ALL_DEPARTMENTS_LABEL, MAX_ATTACHMENT_NAME_LENGTH, NO_DEPARTMENT_LABEL, STUDENT_FILE_FALLBACK,
    UNKNOWN_STUDENT_TITLE,
};
use crate::database::{EducationDetail, StudentDetail};
use std::collections::BTreeMap;

/// A row with a fixed, ordered set of columns
pub trait ReportRow {
    const COLUMNS: &'static [&'static str];

    /// Formatted cells, one per entry of `COLUMNS`
    fn cells(&self) -> Vec<String>;
}

// ===== Department report =====

#[derive(Debug, Clone, PartialEq)]
pub struct DepartmentStudentRow {
    pub department: Option<String>,
    pub name: Option<String>,
    pub father_name: Option<String>,
    pub age: i64,
    pub grade: Option<String>,
    pub total_marks: f64,
    pub obtained_marks: f64,
    pub percentage: f64,
}

impl DepartmentStudentRow {
    /// Heading this row is grouped under
    pub fn group_label(&self) -> String {
        match self.department.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => NO_DEPARTMENT_LABEL.to_string(),
        }
    }
}

impl From<&StudentDetail> for DepartmentStudentRow {
    fn from(detail: &StudentDetail) -> Self {
        let s = &detail.student;
        Self {
            department: detail.department_name.clone(),
            name: Some(s.name.clone()),
            father_name: s.father_name.clone(),
            age: s.age,
            grade: s.grade.clone(),
            total_marks: s.total_marks,
            obtained_marks: s.obtained_marks,
            percentage: s.percentage,
        }
    }
}

impl ReportRow for DepartmentStudentRow {
    const COLUMNS: &'static [&'static str] = &[
        "Name",
        "Father Name",
        "Age",
        "Grade",
        "Total Marks",
        "Obtained Marks",
        "Percentage",
    ];

    fn cells(&self) -> Vec<String> {
        vec![
            text_cell(self.name.as_deref()),
            text_cell(self.father_name.as_deref()),
            // Zero is a recorded value; only missing values render the placeholder
            number_cell(self.age as f64),
            text_cell(self.grade.as_deref()),
            number_cell(self.total_marks),
            number_cell(self.obtained_marks),
            percentage_cell(self.percentage),
        ]
    }
}

/// Students of one department
#[derive(Debug, Clone, PartialEq)]
pub struct DepartmentGroup {
    pub department: String,
    pub rows: Vec<DepartmentStudentRow>,
}

/// Everything needed to render a department report
#[derive(Debug, Clone, PartialEq)]
pub struct DepartmentReport {
    /// Department name, or "ALL"
    pub label: String,
    pub groups: Vec<DepartmentGroup>,
}

impl DepartmentReport {
    /// Group rows by department name, ordered by name.
    ///
    /// Every department in `scope` gets a group even without students.
    pub fn build(label: &str, scope: &[String], rows: Vec<DepartmentStudentRow>) -> Self {
        let mut groups: BTreeMap<String, Vec<DepartmentStudentRow>> = BTreeMap::new();

        for department in scope {
            groups.entry(department.clone()).or_default();
        }
        for row in rows {
            groups.entry(row.group_label()).or_default().push(row);
        }

        Self {
            label: label.to_string(),
            groups: groups
                .into_iter()
                .map(|(department, rows)| DepartmentGroup { department, rows })
                .collect(),
        }
    }

    pub fn student_count(&self) -> usize {
        self.groups.iter().map(|g| g.rows.len()).sum()
    }

    pub fn is_all(&self) -> bool {
        self.label == ALL_DEPARTMENTS_LABEL
    }

    /// Attachment name, spaces replaced by underscores
    pub fn file_name(&self) -> String {
        bounded_file_name(
            &format!("Department_Report_{}", self.label.replace(' ', "_")),
            ".pdf",
        )
    }
}

// ===== Single student report =====

#[derive(Debug, Clone, PartialEq)]
pub struct PersonalRow {
    pub name: Option<String>,
    pub father_name: Option<String>,
    pub age: Option<i64>,
    pub gender: Option<&'static str>,
    pub department: Option<String>,
    pub grade: Option<String>,
}

impl ReportRow for PersonalRow {
    const COLUMNS: &'static [&'static str] =
        &["Name", "Father Name", "Age", "Gender", "Department", "Grade"];

    fn cells(&self) -> Vec<String> {
        vec![
            text_cell(self.name.as_deref()),
            text_cell(self.father_name.as_deref()),
            self.age
                .map(|age| number_cell(age as f64))
                .unwrap_or_else(|| text_cell(None)),
            text_cell(self.gender),
            text_cell(self.department.as_deref()),
            text_cell(self.grade.as_deref()),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AcademicRow {
    pub total_marks: Option<f64>,
    pub obtained_marks: Option<f64>,
    pub percentage: Option<f64>,
}

impl ReportRow for AcademicRow {
    const COLUMNS: &'static [&'static str] = &["Total Marks", "Obtained Marks", "Percentage"];

    fn cells(&self) -> Vec<String> {
        vec![
            super::format::optional_number_cell(self.total_marks),
            super::format::optional_number_cell(self.obtained_marks),
            percentage_cell(self.percentage.unwrap_or(0.0)),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EducationRow {
    pub institute: Option<String>,
    pub degree: Option<String>,
    pub passing_year: Option<i64>,
}

impl From<&EducationDetail> for EducationRow {
    fn from(detail: &EducationDetail) -> Self {
        Self {
            institute: detail.institute_name.clone(),
            degree: detail.degree_name.clone(),
            passing_year: detail.record.passing_year,
        }
    }
}

impl ReportRow for EducationRow {
    const COLUMNS: &'static [&'static str] = &["Institute", "Degree", "Passing Year"];

    fn cells(&self) -> Vec<String> {
        vec![
            text_cell(self.institute.as_deref()),
            text_cell(self.degree.as_deref()),
            integer_cell(self.passing_year),
        ]
    }
}

/// Everything needed to render a single student report
#[derive(Debug, Clone, PartialEq)]
pub struct StudentReport {
    pub student_id: String,
    pub student_name: Option<String>,
    pub personal: PersonalRow,
    pub academic: AcademicRow,
    pub education: Vec<EducationRow>,
}

impl StudentReport {
    pub fn build(detail: &StudentDetail, education: &[EducationDetail]) -> Self {
        let s = &detail.student;
        let name = Some(s.name.trim().to_string()).filter(|n| !n.is_empty());

        Self {
            student_id: s.id.clone(),
            student_name: name.clone(),
            personal: PersonalRow {
                name,
                father_name: s.father_name.clone(),
                age: Some(s.age),
                gender: s.gender.map(|g| g.label()),
                department: detail.department_name.clone(),
                grade: s.grade.clone(),
            },
            academic: AcademicRow {
                total_marks: Some(s.total_marks),
                obtained_marks: Some(s.obtained_marks),
                percentage: Some(s.percentage),
            },
            education: education.iter().map(EducationRow::from).collect(),
        }
    }

    /// Heading of the document
    pub fn title(&self) -> String {
        format!(
            "Student Report - {}",
            self.student_name.as_deref().unwrap_or(UNKNOWN_STUDENT_TITLE)
        )
    }

    pub fn file_name(&self) -> String {
        bounded_file_name(
            self.student_name.as_deref().unwrap_or(STUDENT_FILE_FALLBACK),
            "_Report.pdf",
        )
    }
}

/// Join stem and suffix, shortening the stem so the whole name fits the
/// attachment name limit. The suffix is never cut.
fn bounded_file_name(stem: &str, suffix: &str) -> String {
    let room = MAX_ATTACHMENT_NAME_LENGTH.saturating_sub(suffix.chars().count());
    let mut name: String = stem.chars().take(room).collect();
    name.push_str(suffix);
    name
}
